use super::Endpoint;

/// Profile and user routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileEndpoint {
    /// The signed-in user's own profile.
    Me,
    /// A profile by profile id (GET and PATCH).
    Profile { id: u64 },
    /// A user's public profile by user id.
    User { id: u64 },
    /// Follow (POST) or unfollow (DELETE) a user.
    Follow { user_id: u64 },
}

impl Endpoint for ProfileEndpoint {
    fn path(&self) -> String {
        match self {
            ProfileEndpoint::Me => "/me/profile".to_string(),
            ProfileEndpoint::Profile { id } => format!("/profiles/{id}"),
            ProfileEndpoint::User { id } => format!("/users/{id}"),
            ProfileEndpoint::Follow { user_id } => format!("/users/{user_id}/follow"),
        }
    }
}
