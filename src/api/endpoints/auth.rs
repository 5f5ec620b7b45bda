use super::Endpoint;

/// Session lifecycle routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEndpoint {
    SignIn,
    SignUp,
    SignOut,
    DeleteAccount,
}

impl Endpoint for AuthEndpoint {
    fn path(&self) -> String {
        match self {
            AuthEndpoint::SignIn => "/sign_in",
            AuthEndpoint::SignUp => "/sign_up",
            AuthEndpoint::SignOut => "/sign_out",
            AuthEndpoint::DeleteAccount => "/delete_account",
        }
        .to_string()
    }

    fn authorized(&self) -> bool {
        matches!(self, AuthEndpoint::SignOut | AuthEndpoint::DeleteAccount)
    }
}
