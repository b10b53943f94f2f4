use tokio_util::sync::CancellationToken;

use crate::api::books::Catalog;
use crate::api::error::ApiError;
use crate::app::unless_cancelled;
use crate::model::Book;

/// Catalog listing view: one fetch-all on load, then purely client-side
/// filtering and sorting over the fetched set. Nothing here re-queries the
/// server.
#[derive(Debug, Default)]
pub struct CatalogView {
    books: Vec<Book>,
    visible: Vec<Book>,
    query: String,
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(
        &mut self,
        catalog: &Catalog,
        cancel: &CancellationToken,
    ) -> Result<(), ApiError> {
        let Some(result) = unless_cancelled(cancel, catalog.list()).await else {
            return Ok(());
        };
        self.books = result?;
        self.visible = filter_books(&self.books, &self.query);
        Ok(())
    }

    /// Re-derive the visible set from the full fetched collection. An empty
    /// query restores the original set in original order.
    pub fn search(&mut self, query: &str) {
        self.query = query.to_owned();
        self.visible = filter_books(&self.books, &self.query);
    }

    /// Sort the currently visible set. Unrecognized keys are a no-op.
    pub fn sort(&mut self, key: &str) {
        sort_books(&mut self.visible, key);
    }

    pub fn visible(&self) -> &[Book] {
        &self.visible
    }

    pub fn total(&self) -> usize {
        self.books.len()
    }
}

/// Case-insensitive substring match across title, author and genre. Fields
/// are plain strings (missing values deserialize to empty), so no lookup can
/// crash on absence.
pub fn filter_books(books: &[Book], query: &str) -> Vec<Book> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return books.to_vec();
    }
    books
        .iter()
        .filter(|book| {
            book.title.to_lowercase().contains(&q)
                || book.author.to_lowercase().contains(&q)
                || book.genre.to_lowercase().contains(&q)
        })
        .cloned()
        .collect()
}

/// Stable ascending sort by title or author; any other key leaves the order
/// untouched.
pub fn sort_books(books: &mut [Book], key: &str) {
    match key {
        "title" => books.sort_by(|a, b| a.title.cmp(&b.title)),
        "author" => books.sort_by(|a, b| a.author.cmp(&b.author)),
        _ => {}
    }
}
