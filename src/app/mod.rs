//! Per-view state controllers. Each owns its local state exclusively and
//! talks to the backend through the domain gateway; the only shared state is
//! the auth session, which views read but never mutate directly.

pub mod admin;
pub mod catalog;
pub mod detail;
pub mod recommend;
pub mod review;

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Run a view-scoped operation, discarding the result when the view's
/// lifetime token fires first. A request finishing after its view has gone
/// away must not update state.
pub(crate) async fn unless_cancelled<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = T>,
) -> Option<T> {
    tokio::select! {
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}
