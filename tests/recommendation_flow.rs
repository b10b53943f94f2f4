mod backend_stub;
mod support;

use std::sync::Arc;

use backend_stub::{BackendStub, StubRoute};
use libraryai::api::Api;
use libraryai::app::recommend::RecommendationView;
use tokio_util::sync::CancellationToken;
use support::{TestIdentity, test_config};

fn rec_entry(id: &str, reason: &str) -> serde_json::Value {
    serde_json::json!({ "bookId": id, "reason": reason, "confidence": 0.8 })
}

fn book_route(id: &str, title: &str) -> StubRoute {
    StubRoute::json(
        "GET",
        &format!("/books/{id}"),
        200,
        serde_json::json!({ "id": id, "title": title }),
    )
}

fn api_with_token(stub: &BackendStub) -> Arc<Api> {
    Arc::new(Api::new(
        &test_config(&stub.base_url),
        Arc::new(TestIdentity::with_token("tok")),
    ))
}

#[tokio::test]
async fn gateway_unwraps_enveloped_response() {
    let inner = serde_json::json!([rec_entry("2", "spice")]).to_string();
    let stub = BackendStub::spawn(vec![StubRoute::json(
        "POST",
        "/recommendations",
        200,
        serde_json::json!({ "body": inner }),
    )]);
    let api = api_with_token(&stub);

    let recs = api.recommendations.request("something").await.unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].book_ref(), Some("2"));
    assert_eq!(recs[0].reason, "spice");
}

#[tokio::test]
async fn pairing_drops_unresolvable_books_and_keeps_order() {
    let recs = serde_json::json!({
        "recommendations": [
            rec_entry("1", "first"),
            rec_entry("2", "second"),
            rec_entry("3", "third"),
        ]
    });
    // Book 2 has no route; its lookup 404s and the reference is discarded.
    let stub = BackendStub::spawn(vec![
        StubRoute::json("POST", "/recommendations", 200, recs),
        book_route("1", "Dune"),
        book_route("3", "Hyperion"),
    ]);
    let api = api_with_token(&stub);

    let mut view = RecommendationView::new();
    let cancel = CancellationToken::new();
    view.submit(&api, "space operas", &cancel).await.unwrap();

    let items = view.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].book.title, "Dune");
    assert_eq!(items[0].reason, "first");
    assert_eq!(items[1].book.title, "Hyperion");
    assert_eq!(items[1].reason, "third");
    assert!(view.notice().is_none());
}

#[tokio::test]
async fn references_without_ids_do_not_misalign_pairing() {
    let recs = serde_json::json!([
        { "reason": "no id at all", "confidence": 0.9 },
        rec_entry("3", "the good one"),
    ]);
    let stub = BackendStub::spawn(vec![
        StubRoute::json("POST", "/recommendations", 200, recs),
        book_route("3", "Hyperion"),
    ]);
    let api = api_with_token(&stub);

    let mut view = RecommendationView::new();
    let cancel = CancellationToken::new();
    view.submit(&api, "anything", &cancel).await.unwrap();

    let items = view.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].book.title, "Hyperion");
    assert_eq!(items[0].reason, "the good one");
}

#[tokio::test]
async fn empty_query_is_rejected_before_any_request() {
    let stub = BackendStub::spawn(vec![]);
    let api = api_with_token(&stub);

    let mut view = RecommendationView::new();
    let cancel = CancellationToken::new();
    view.submit(&api, "   ", &cancel).await.unwrap();

    assert_eq!(view.notice(), Some("Please enter a query"));
    assert_eq!(stub.request_count(), 0);
}

#[tokio::test]
async fn empty_recommendation_set_sets_notice() {
    let stub = BackendStub::spawn(vec![StubRoute::json(
        "POST",
        "/recommendations",
        200,
        serde_json::json!({ "recommendations": [] }),
    )]);
    let api = api_with_token(&stub);

    let mut view = RecommendationView::new();
    let cancel = CancellationToken::new();
    view.submit(&api, "anything", &cancel).await.unwrap();

    assert!(view.items().is_empty());
    assert_eq!(view.notice(), Some("No recommendations returned from API."));
}

#[tokio::test]
async fn cancelled_submit_leaves_state_untouched() {
    let stub = BackendStub::spawn(vec![]);
    let api = api_with_token(&stub);

    let mut view = RecommendationView::new();
    let cancel = CancellationToken::new();
    cancel.cancel();
    view.submit(&api, "anything", &cancel).await.unwrap();

    assert!(view.items().is_empty());
    assert!(view.notice().is_none());
}
