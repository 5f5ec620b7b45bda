use std::sync::Arc;

use crate::api::types::{Comment, CommentEnvelope, CommentsEnvelope, CreateCommentRequest};
use crate::api::{CommentEndpoint, HttpClient, NetworkError, NoContent, Request};

pub struct CommentService {
    client: Arc<HttpClient>,
}

impl CommentService {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// GET /comments?post_id={id}.
    pub async fn comments(&self, post_id: u64) -> Result<Vec<Comment>, NetworkError> {
        let request = Request::get(CommentEndpoint::List { post_id });
        let response: CommentsEnvelope = self.client.execute(&request).await?;
        Ok(response.into_comments())
    }

    /// POST /comments.
    pub async fn create_comment(&self, post_id: u64, body: &str) -> Result<Comment, NetworkError> {
        let payload = CreateCommentRequest::new(post_id, body)?;
        let request = Request::post(CommentEndpoint::Create).json(&payload)?;
        let response: CommentEnvelope = self.client.execute(&request).await?;
        let comment = response.into_comment();
        log::info!("Comment {} added to post {}", comment.id, post_id);
        Ok(comment)
    }

    /// DELETE /comments/{id}.
    pub async fn delete_comment(&self, id: u64) -> Result<(), NetworkError> {
        let request = Request::delete(CommentEndpoint::Comment { id });
        self.client.execute::<NoContent>(&request).await?;
        Ok(())
    }
}
