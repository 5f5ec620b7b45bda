use std::sync::Arc;

use crate::api::types::{
    CreatePostRequest, Post, PostChanges, PostDraft, PostEnvelope, PostsResponse,
    UpdatePostRequest, UploadResponse, User,
};
use crate::api::{HttpClient, ImageSource, MultipartForm, NetworkError, NoContent, PostEndpoint, Request};
use crate::keychain::Session;

/// Multipart field for POST /uploads.
pub const UPLOAD_FIELD: &str = "file";

pub struct PostService {
    client: Arc<HttpClient>,
    session: Arc<Session>,
}

impl PostService {
    pub fn new(client: Arc<HttpClient>, session: Arc<Session>) -> Self {
        Self { client, session }
    }

    /// GET /posts.
    pub async fn posts(&self) -> Result<Vec<Post>, NetworkError> {
        let response: PostsResponse = self.client.execute(&Request::get(PostEndpoint::List)).await?;
        log::info!("Loaded {} posts", response.posts.len());
        Ok(response.posts)
    }

    /// GET /posts/{id}.
    pub async fn post(&self, id: u64) -> Result<Post, NetworkError> {
        let response: PostEnvelope = self
            .client
            .execute(&Request::get(PostEndpoint::Show { id }))
            .await?;
        Ok(response.into_post())
    }

    /// POST /uploads. Returns the stored image URL.
    pub async fn upload_image(&self, image: ImageSource) -> Result<String, NetworkError> {
        let request = Request::post(PostEndpoint::Uploads)
            .multipart(MultipartForm::new().image(UPLOAD_FIELD, image));
        let response: UploadResponse = self.client.execute(&request).await?;
        log::info!("Image uploaded: {}", response.url);
        Ok(response.url)
    }

    /// Upload the image, then POST /posts authored by the signed-in user's profile.
    pub async fn create_post(&self, draft: PostDraft, image: ImageSource) -> Result<Post, NetworkError> {
        let profile_id = self
            .session
            .load_user()
            .and_then(|user| user.profile_id())
            .ok_or(NetworkError::AuthenticationRequired)?;

        let image_url = self.upload_image(image).await?;
        let body = CreatePostRequest::new(draft, image_url, profile_id);
        let request = Request::post(PostEndpoint::List).json(&body)?;
        let response: PostEnvelope = self.client.execute(&request).await?;
        let post = response.into_post();
        log::info!("Post created: {}", post.title);
        Ok(post)
    }

    /// PATCH /posts/{id}.
    pub async fn update_post(&self, id: u64, changes: PostChanges) -> Result<Post, NetworkError> {
        let body = UpdatePostRequest::new(changes)?;
        let request = Request::patch(PostEndpoint::Show { id }).json(&body)?;
        let response: PostEnvelope = self.client.execute(&request).await?;
        Ok(response.into_post())
    }

    /// DELETE /posts/{id}.
    pub async fn delete_post(&self, id: u64) -> Result<(), NetworkError> {
        let request = Request::delete(PostEndpoint::Show { id });
        self.client.execute::<NoContent>(&request).await?;
        log::info!("Post {} deleted", id);
        Ok(())
    }

    /// GET /users/me: the account behind the stored token.
    pub async fn current_user(&self) -> Result<User, NetworkError> {
        let user: User = self
            .client
            .execute(&Request::get(PostEndpoint::CurrentUser))
            .await?;
        log::info!("Current user loaded: {}", user.id);
        Ok(user)
    }
}
