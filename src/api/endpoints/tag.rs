use super::{Endpoint, Query};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEndpoint {
    List,
    Search { query: String },
    /// Most used tags, at most `limit` of them.
    Popular { limit: u32 },
}

impl Endpoint for TagEndpoint {
    fn path(&self) -> String {
        match self {
            TagEndpoint::Popular { .. } => "/tags/popular".to_string(),
            _ => "/tags".to_string(),
        }
    }

    fn query(&self) -> Option<Query> {
        match self {
            TagEndpoint::List => None,
            TagEndpoint::Popular { limit } => {
                Some(Query::from([("limit".to_string(), limit.to_string())]))
            }
            TagEndpoint::Search { query } => {
                Some(Query::from([("search".to_string(), query.clone())]))
            }
        }
    }
}
