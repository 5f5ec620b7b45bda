use super::Endpoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostEndpoint {
    /// The feed (GET) and post creation (POST).
    List,
    /// One post (GET, PATCH, DELETE).
    Show { id: u64 },
    /// Image upload, multipart POST.
    Uploads,
    /// The signed-in account.
    CurrentUser,
}

impl Endpoint for PostEndpoint {
    fn path(&self) -> String {
        match self {
            PostEndpoint::List => "/posts".to_string(),
            PostEndpoint::Show { id } => format!("/posts/{id}"),
            PostEndpoint::Uploads => "/uploads".to_string(),
            PostEndpoint::CurrentUser => "/users/me".to_string(),
        }
    }
}
