use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::api::Api;
use crate::api::error::ApiError;
use crate::app::unless_cancelled;
use crate::model::Book;

/// A recommendation paired with the catalog entry it points at.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendedBook {
    pub book: Book,
    pub reason: String,
    pub confidence: f64,
}

/// Recommendation view: validates the query client-side, asks the backend,
/// then resolves every referenced book concurrently and keeps only the
/// references that resolve, in the backend's ranking order.
#[derive(Debug, Default)]
pub struct RecommendationView {
    items: Vec<RecommendedBook>,
    notice: Option<String>,
}

impl RecommendationView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[RecommendedBook] {
        &self.items
    }

    /// A user-facing message for the empty/degenerate cases; `None` when
    /// results are ready or nothing has been submitted.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub async fn submit(
        &mut self,
        api: &Arc<Api>,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<(), ApiError> {
        self.items.clear();
        self.notice = None;

        if query.trim().is_empty() {
            self.notice = Some("Please enter a query".to_owned());
            return Ok(());
        }

        let Some(result) = unless_cancelled(cancel, resolve(api, query)).await else {
            return Ok(());
        };
        let (items, notice) = result?;
        self.items = items;
        self.notice = notice;
        Ok(())
    }
}

async fn resolve(
    api: &Arc<Api>,
    query: &str,
) -> Result<(Vec<RecommendedBook>, Option<String>), ApiError> {
    let recs = api.recommendations.request(query).await?;
    if recs.is_empty() {
        return Ok((Vec::new(), Some("No recommendations returned from API.".to_owned())));
    }

    // Keep the originating index with each usable reference so pairing stays
    // aligned even when some entries carry no id at all.
    let refs: Vec<(usize, String)> = recs
        .iter()
        .enumerate()
        .filter_map(|(idx, rec)| rec.book_ref().map(|id| (idx, id.to_owned())))
        .collect();
    if refs.is_empty() {
        return Ok((
            Vec::new(),
            Some("Recommendations returned but no bookId/id found.".to_owned()),
        ));
    }

    // Per-book lookups run concurrently; results land in index-aligned slots
    // so ordering follows the backend ranking, not completion order.
    let mut join_set = JoinSet::new();
    for (slot, (_, id)) in refs.iter().enumerate() {
        let api = Arc::clone(api);
        let id = id.clone();
        join_set.spawn(async move {
            let book = match api.books.get(&id).await {
                Ok(book) => book,
                Err(err) => {
                    tracing::debug!(id, error = %err, "recommended book lookup failed");
                    None
                }
            };
            (slot, book)
        });
    }

    let mut fetched: Vec<Option<Book>> = vec![None; refs.len()];
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((slot, book)) => fetched[slot] = book,
            Err(err) => tracing::warn!(error = %err, "book lookup task failed"),
        }
    }

    let mut items = Vec::new();
    for (slot, (rec_idx, _)) in refs.iter().enumerate() {
        if let Some(book) = fetched[slot].take() {
            let rec = &recs[*rec_idx];
            items.push(RecommendedBook {
                book,
                reason: rec.reason.clone(),
                confidence: rec.confidence,
            });
        }
    }

    let notice = if items.is_empty() {
        Some("Recommendations returned, but no matching books found.".to_owned())
    } else {
        None
    };
    Ok((items, notice))
}
