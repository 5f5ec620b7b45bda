use std::sync::Arc;

use crate::api::types::{PopularTagsResponse, Tag, TagsResponse};
use crate::api::{HttpClient, NetworkError, Request, TagEndpoint};

/// Limit used for popular tags when the caller has no preference.
pub const DEFAULT_POPULAR_LIMIT: u32 = 10;

pub struct TagService {
    client: Arc<HttpClient>,
}

impl TagService {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// GET /tags.
    pub async fn tags(&self) -> Result<Vec<Tag>, NetworkError> {
        let response: TagsResponse = self.client.execute(&Request::get(TagEndpoint::List)).await?;
        Ok(response.tags)
    }

    /// GET /tags?search=... A blank query lists every tag.
    pub async fn search_tags(&self, query: &str) -> Result<Vec<Tag>, NetworkError> {
        let query = query.trim();
        if query.is_empty() {
            return self.tags().await;
        }
        let request = Request::get(TagEndpoint::Search {
            query: query.to_string(),
        });
        let response: TagsResponse = self.client.execute(&request).await?;
        Ok(response.tags)
    }

    /// GET /tags/popular?limit=N.
    pub async fn popular_tags(&self, limit: u32) -> Result<Vec<Tag>, NetworkError> {
        let request = Request::get(TagEndpoint::Popular { limit });
        let response: PopularTagsResponse = self.client.execute(&request).await?;
        Ok(response.tags)
    }
}
