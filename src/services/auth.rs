use std::sync::Arc;

use crate::api::types::{AuthResponse, SignInRequest, SignUpRequest, UserWithProfile};
use crate::api::{AuthEndpoint, HttpClient, NetworkError, NoContent, Request};
use crate::keychain::Session;

/// Sign-in, registration and account lifecycle.
pub struct AuthService {
    client: Arc<HttpClient>,
    session: Arc<Session>,
}

impl AuthService {
    pub fn new(client: Arc<HttpClient>, session: Arc<Session>) -> Self {
        Self { client, session }
    }

    /// POST /sign_in. Stores the token and the user, returns the user.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserWithProfile, NetworkError> {
        log::info!("Signing in {}", email);
        let body = SignInRequest::new(email, password)?;
        let request = Request::post(AuthEndpoint::SignIn).json(&body)?;

        let response: AuthResponse = self.client.execute(&request).await.map_err(|e| {
            log::warn!("Sign-in failed: {}", e);
            e
        })?;
        self.remember(&response);
        Ok(response.user)
    }

    /// POST /sign_up. Stores the token and the user, returns the full response.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<AuthResponse, NetworkError> {
        log::info!("Registering {}", email);
        let body = SignUpRequest::new(email, password, password_confirmation)?;
        let request = Request::post(AuthEndpoint::SignUp).json(&body)?;

        let response: AuthResponse = self.client.execute(&request).await.map_err(|e| {
            log::warn!("Registration failed: {}", e);
            e
        })?;
        self.remember(&response);
        Ok(response)
    }

    /// POST /sign_out, then clear the stored session.
    ///
    /// Without a stored token this fails with `AuthenticationRequired` and
    /// sends nothing. On any server failure the session is kept.
    pub async fn sign_out(&self) -> Result<(), NetworkError> {
        self.require_token()?;
        let request = Request::post(AuthEndpoint::SignOut);
        self.client.execute::<NoContent>(&request).await?;
        self.session.clear();
        log::info!("Signed out");
        Ok(())
    }

    /// DELETE /delete_account, then clear the stored session.
    pub async fn delete_account(&self) -> Result<(), NetworkError> {
        self.require_token()?;
        let request = Request::delete(AuthEndpoint::DeleteAccount);
        self.client.execute::<NoContent>(&request).await?;
        self.session.clear();
        log::info!("Account deleted");
        Ok(())
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_signed_in()
    }

    pub fn current_user(&self) -> Option<UserWithProfile> {
        self.session.load_user()
    }

    fn require_token(&self) -> Result<(), NetworkError> {
        if self.session.load_token().is_none() {
            log::warn!("No stored token");
            return Err(NetworkError::AuthenticationRequired);
        }
        Ok(())
    }

    fn remember(&self, response: &AuthResponse) {
        self.session.store_token(&response.jwt);
        self.session.store_user(Some(&response.user));
    }
}
