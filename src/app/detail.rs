use tokio_util::sync::CancellationToken;

use crate::api::books::Catalog;
use crate::api::error::ApiError;
use crate::api::reading_lists::ReadingLists;
use crate::app::unless_cancelled;
use crate::model::{Book, NewReadingList, User};

/// Outcome of the detail fetch. `NotFound` is an expected state the caller
/// turns into a redirect, never an error banner.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailState {
    #[default]
    Loading,
    Found(Book),
    NotFound,
}

#[derive(Debug, Default)]
pub struct DetailView {
    state: DetailState,
}

impl DetailView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub async fn load(
        &mut self,
        catalog: &Catalog,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), ApiError> {
        let Some(result) = unless_cancelled(cancel, catalog.get(id)).await else {
            return Ok(());
        };
        match result? {
            Some(book) => self.state = DetailState::Found(book),
            None => self.state = DetailState::NotFound,
        }
        Ok(())
    }

    /// Add the displayed book to a fresh reading list for the given user.
    /// Requires a signed-in user and a loaded book.
    pub async fn add_to_reading_list(
        &self,
        lists: &ReadingLists,
        user: Option<&User>,
        cancel: &CancellationToken,
    ) -> anyhow::Result<()> {
        let DetailState::Found(book) = &self.state else {
            anyhow::bail!("no book loaded");
        };
        let Some(user) = user else {
            anyhow::bail!("you must be logged in");
        };

        let list = NewReadingList {
            user_id: user.id.clone(),
            name: "My Reading List".to_owned(),
            book_ids: Some(vec![book.id.clone()]),
        };
        match unless_cancelled(cancel, lists.create(&list)).await {
            None => Ok(()),
            Some(result) => {
                result?;
                Ok(())
            }
        }
    }
}
