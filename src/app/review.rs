use tokio_util::sync::CancellationToken;

use crate::api::reviews::Reviews;
use crate::app::unless_cancelled;
use crate::model::{NewReview, User};

/// Review submission form. Validation happens client-side before any request
/// is built; the attribution name is the session user's display chain.
#[derive(Debug, Clone)]
pub struct ReviewForm {
    pub rating: u8,
    pub comment: String,
}

impl ReviewForm {
    pub fn build(&self, book_id: &str, user: &User) -> anyhow::Result<NewReview> {
        if !(1..=5).contains(&self.rating) {
            anyhow::bail!("rating must be between 1 and 5");
        }
        if self.comment.trim().is_empty() {
            anyhow::bail!("comment must not be empty");
        }
        Ok(NewReview {
            book_id: book_id.to_owned(),
            user_id: user.id.clone(),
            username: user.display_name(),
            rating: self.rating,
            comment: self.comment.clone(),
        })
    }

    pub async fn submit(
        &self,
        reviews: &Reviews,
        book_id: &str,
        user: &User,
        cancel: &CancellationToken,
    ) -> anyhow::Result<()> {
        let review = self.build(book_id, user)?;
        match unless_cancelled(cancel, reviews.create(&review)).await {
            None => Ok(()),
            Some(result) => {
                result?;
                Ok(())
            }
        }
    }
}
