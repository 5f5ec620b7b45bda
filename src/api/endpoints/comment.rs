use super::{Endpoint, Query};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentEndpoint {
    /// Comments on one post: GET /comments?post_id={id}.
    List { post_id: u64 },
    /// POST /comments.
    Create,
    /// DELETE /comments/{id}.
    Comment { id: u64 },
}

impl Endpoint for CommentEndpoint {
    fn path(&self) -> String {
        match self {
            CommentEndpoint::List { .. } | CommentEndpoint::Create => "/comments".to_string(),
            CommentEndpoint::Comment { id } => format!("/comments/{id}"),
        }
    }

    fn query(&self) -> Option<Query> {
        match self {
            CommentEndpoint::List { post_id } => {
                Some(Query::from([("post_id".to_string(), post_id.to_string())]))
            }
            _ => None,
        }
    }
}
