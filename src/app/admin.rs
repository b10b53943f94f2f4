use chrono::Datelike as _;
use tokio_util::sync::CancellationToken;

use crate::api::books::Catalog;
use crate::app::unless_cancelled;
use crate::model::{Book, NewBook};

/// Admin "create book" form. Only title/author/description are collected;
/// the rest of the entry gets the catalog's placeholder defaults.
#[derive(Debug, Clone, Default)]
pub struct NewBookForm {
    pub title: String,
    pub author: String,
    pub description: String,
}

impl NewBookForm {
    pub fn build(&self) -> anyhow::Result<NewBook> {
        if self.title.trim().is_empty()
            || self.author.trim().is_empty()
            || self.description.trim().is_empty()
        {
            anyhow::bail!("all fields are required");
        }
        Ok(NewBook {
            title: self.title.clone(),
            author: self.author.clone(),
            description: self.description.clone(),
            genre: "Unknown".to_owned(),
            cover_image: String::new(),
            rating: 0.0,
            published_year: chrono::Utc::now().year(),
            isbn: String::new(),
        })
    }

    pub async fn submit(
        &self,
        catalog: &Catalog,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Option<Book>> {
        let book = self.build()?;
        match unless_cancelled(cancel, catalog.create(&book)).await {
            None => Ok(None),
            Some(result) => Ok(result?),
        }
    }
}
