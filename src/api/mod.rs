pub mod books;
pub mod client;
pub mod error;
pub mod reading_lists;
pub mod recommendations;
pub mod reviews;

use std::sync::Arc;

use crate::config::Config;
use crate::identity::IdentityProvider;

pub use client::{ApiClient, Auth, Body};
pub use error::ApiError;

/// The domain gateway: one typed entry point per backend resource, all built
/// on the same request client and identity provider.
pub struct Api {
    pub books: books::Catalog,
    pub recommendations: recommendations::Recommender,
    pub reading_lists: reading_lists::ReadingLists,
    pub reviews: reviews::Reviews,
}

impl Api {
    pub fn new(config: &Config, identity: Arc<dyn IdentityProvider>) -> Self {
        let client = Arc::new(ApiClient::new(&config.api_url, identity));
        Self {
            books: books::Catalog::new(Arc::clone(&client), config.book_lookup),
            recommendations: recommendations::Recommender::new(Arc::clone(&client)),
            reading_lists: reading_lists::ReadingLists::new(Arc::clone(&client)),
            reviews: reviews::Reviews::new(client, config.reviews_require_auth),
        }
    }
}
