use std::sync::Arc;

use crate::api::types::{Profile, ProfileResponse, ProfileUpdate, ProfileUpdateRequest};
use crate::api::{
    HttpClient, ImageSource, MultipartForm, NetworkError, NoContent, ProfileEndpoint, Request,
};
use crate::keychain::Session;

/// Multipart field the avatar image is sent under.
pub const AVATAR_FIELD: &str = "profile[avatar_url]";

pub struct ProfileService {
    client: Arc<HttpClient>,
    session: Arc<Session>,
}

impl ProfileService {
    pub fn new(client: Arc<HttpClient>, session: Arc<Session>) -> Self {
        Self { client, session }
    }

    /// GET /me/profile. Each of the profile's posts gets the author attached.
    pub async fn current_profile(&self) -> Result<Profile, NetworkError> {
        let response: ProfileResponse = self.client.execute(&Request::get(ProfileEndpoint::Me)).await?;
        let mut profile = response.profile;
        let author = profile.summary();
        for post in &mut profile.posts {
            post.profile = Some(author.clone());
        }
        log::info!("Profile loaded: {}", profile.username);
        Ok(profile)
    }

    /// GET /profiles/{id}.
    pub async fn profile(&self, id: u64) -> Result<Profile, NetworkError> {
        let response: ProfileResponse = self
            .client
            .execute(&Request::get(ProfileEndpoint::Profile { id }))
            .await?;
        Ok(response.profile)
    }

    /// GET /users/{id}: another user's public profile.
    pub async fn user_profile(&self, user_id: u64) -> Result<Profile, NetworkError> {
        let response: ProfileResponse = self
            .client
            .execute(&Request::get(ProfileEndpoint::User { id: user_id }))
            .await?;
        Ok(response.profile)
    }

    /// PATCH /profiles/{id} with a JSON body.
    pub async fn update_profile(&self, id: u64, update: ProfileUpdate) -> Result<Profile, NetworkError> {
        let body = ProfileUpdateRequest { profile: update };
        let request = Request::patch(ProfileEndpoint::Profile { id }).json(&body)?;
        let response: ProfileResponse = self.client.execute(&request).await?;
        self.refresh_cached_profile(&response.profile);
        Ok(response.profile)
    }

    /// PATCH /profiles/{id} as multipart, with a new avatar image.
    pub async fn update_profile_with_avatar(
        &self,
        id: u64,
        update: ProfileUpdate,
        avatar: ImageSource,
    ) -> Result<Profile, NetworkError> {
        let form = update
            .form_fields()
            .into_iter()
            .fold(MultipartForm::new(), |form, (name, value)| form.text(name, value))
            .image(AVATAR_FIELD, avatar);
        self.send_profile_form(id, form).await
    }

    /// Replace only the avatar of the signed-in user's profile.
    pub async fn upload_avatar(&self, avatar: ImageSource) -> Result<Profile, NetworkError> {
        let id = self
            .session
            .load_user()
            .and_then(|user| user.profile_id())
            .ok_or(NetworkError::AuthenticationRequired)?;
        self.send_profile_form(id, MultipartForm::new().image(AVATAR_FIELD, avatar))
            .await
    }

    /// POST /users/{id}/follow.
    pub async fn follow(&self, user_id: u64) -> Result<(), NetworkError> {
        let request = Request::post(ProfileEndpoint::Follow { user_id });
        self.client.execute::<NoContent>(&request).await?;
        Ok(())
    }

    /// DELETE /users/{id}/follow.
    pub async fn unfollow(&self, user_id: u64) -> Result<(), NetworkError> {
        let request = Request::delete(ProfileEndpoint::Follow { user_id });
        self.client.execute::<NoContent>(&request).await?;
        Ok(())
    }

    async fn send_profile_form(&self, id: u64, form: MultipartForm) -> Result<Profile, NetworkError> {
        let request = Request::patch(ProfileEndpoint::Profile { id }).multipart(form);
        let response: ProfileResponse = self.client.execute(&request).await.map_err(|e| {
            log::warn!("Avatar update failed: {}", e);
            e
        })?;
        self.refresh_cached_profile(&response.profile);
        Ok(response.profile)
    }

    /// Keep the keychain copy of the signed-in user in step with edits to their own profile.
    fn refresh_cached_profile(&self, profile: &Profile) {
        if let Some(mut user) = self.session.load_user() {
            if user.profile_id() == Some(profile.id) {
                user.profile = Some(profile.summary());
                self.session.store_user(Some(&user));
            }
        }
    }
}
