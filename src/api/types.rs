//! Request and response types for the TUMBA backend API.
//!
//! All structs use the backend's snake_case JSON keys. Request bodies are
//! validated when they are constructed so a malformed body never reaches the wire.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::NetworkError;

// ── Accounts ─────────────────────────────────────────────────────────────

/// A bare account record as returned by `/users/*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub admin: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// The signed-in user together with their profile. Cached in the keychain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWithProfile {
    pub id: u64,
    pub email: String,
    pub admin: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub profile: Option<Profile>,
}

impl UserWithProfile {
    pub fn profile_id(&self) -> Option<u64> {
        self.profile.as_ref().map(|p| p.id)
    }
}

/// Response from POST /sign_in and POST /sign_up.
///
/// A top-level `profile` object, when the backend sends one, replaces the
/// user's nested profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AuthResponseWire")]
pub struct AuthResponse {
    pub messages: String,
    pub is_success: bool,
    pub jwt: String,
    pub user: UserWithProfile,
}

#[derive(Deserialize)]
struct AuthResponseWire {
    messages: String,
    is_success: bool,
    jwt: String,
    user: UserWithProfile,
    #[serde(default, deserialize_with = "lenient_option")]
    profile: Option<Profile>,
}

impl From<AuthResponseWire> for AuthResponse {
    fn from(wire: AuthResponseWire) -> Self {
        let mut user = wire.user;
        if let Some(profile) = wire.profile {
            user.profile = Some(profile);
        }
        Self {
            messages: wire.messages,
            is_success: wire.is_success,
            jwt: wire.jwt,
            user,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInCredentials {
    pub email: String,
    pub password: String,
}

/// Body for POST /sign_in: `{"user": {"email", "password"}}`.
#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    pub user: SignInCredentials,
}

impl SignInRequest {
    pub fn new(email: &str, password: &str) -> Result<Self, NetworkError> {
        validate_email(email)?;
        require("password", password)?;
        Ok(Self {
            user: SignInCredentials {
                email: email.trim().to_string(),
                password: password.to_string(),
            },
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Body for POST /sign_up.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub user: Registration,
}

impl SignUpRequest {
    pub fn new(email: &str, password: &str, confirmation: &str) -> Result<Self, NetworkError> {
        validate_email(email)?;
        require("password", password)?;
        if password != confirmation {
            return Err(NetworkError::InvalidRequest(
                "password confirmation does not match".to_string(),
            ));
        }
        Ok(Self {
            user: Registration {
                email: email.trim().to_string(),
                password: password.to_string(),
                password_confirmation: confirmation.to_string(),
            },
        })
    }
}

// ── Profiles ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub username: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_option")]
    pub bio: Option<String>,
    /// Either a plain string or `{"url": ...}` on the wire.
    #[serde(default, deserialize_with = "avatar_url")]
    pub avatar_url: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub posts: Vec<Post>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub items: Vec<Item>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub comments: Vec<Comment>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub likes: Vec<Like>,
}

impl Profile {
    /// Absolute avatar URL, resolving server-relative paths against `origin`.
    pub fn avatar_url_in(&self, origin: &str) -> Option<String> {
        self.avatar_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| absolute_asset_url(origin, url))
    }

    /// Copy of this profile without its nested posts, for back-references.
    pub fn summary(&self) -> Profile {
        Profile {
            posts: Vec::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub profile: Profile,
}

/// Editable profile fields.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    pub fn new(name: &str, username: &str) -> Result<Self, NetworkError> {
        require("name", name)?;
        require("username", username)?;
        Ok(Self {
            name: name.trim().to_string(),
            username: username.trim().to_string(),
            avatar_url: None,
        })
    }

    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    /// Multipart text fields (`profile[name]`, `profile[username]`).
    pub fn form_fields(&self) -> Vec<(String, String)> {
        vec![
            ("profile[name]".to_string(), self.name.clone()),
            ("profile[username]".to_string(), self.username.clone()),
        ]
    }
}

/// Body for PATCH /profiles/{id}.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdateRequest {
    pub profile: ProfileUpdate,
}

// ── Posts ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostImage {
    pub url: Option<String>,
}

impl PostImage {
    pub fn url_in(&self, origin: &str) -> Option<String> {
        self.url.as_deref().map(|url| absolute_asset_url(origin, url))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_option")]
    pub image_url: Option<PostImage>,
    #[serde(rename = "public", default)]
    pub is_public: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub profile: Option<Profile>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub items: Vec<Item>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub comments: Vec<Comment>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub likes: Vec<Like>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostsResponse {
    pub posts: Vec<Post>,
}

/// Single-post payload: the backend answers either `{"post": {...}}` or the bare post.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PostEnvelope {
    Wrapped { post: Post },
    Bare(Post),
}

impl PostEnvelope {
    pub fn into_post(self) -> Post {
        match self {
            PostEnvelope::Wrapped { post } | PostEnvelope::Bare(post) => post,
        }
    }
}

/// Response from POST /uploads.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// What the author fills in before the image is uploaded.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl PostDraft {
    pub fn new(title: &str, description: &str, tags: Vec<String>) -> Result<Self, NetworkError> {
        require("title", title)?;
        Ok(Self {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            tags: tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub tag_list: Vec<String>,
    pub image_url: String,
    pub profile_id: u64,
}

/// Body for POST /posts.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePostRequest {
    pub post: NewPost,
}

impl CreatePostRequest {
    pub fn new(draft: PostDraft, image_url: String, profile_id: u64) -> Self {
        Self {
            post: NewPost {
                title: draft.title,
                description: draft.description,
                tag_list: draft.tags,
                image_url,
                profile_id,
            },
        }
    }
}

/// Partial post update; absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_list: Option<Vec<String>>,
    #[serde(rename = "public", skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.tag_list.is_none()
            && self.is_public.is_none()
    }
}

/// Body for PATCH /posts/{id}.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatePostRequest {
    pub post: PostChanges,
}

impl UpdatePostRequest {
    pub fn new(changes: PostChanges) -> Result<Self, NetworkError> {
        if changes.is_empty() {
            return Err(NetworkError::InvalidRequest("no post fields to update".to_string()));
        }
        if let Some(title) = &changes.title {
            require("title", title)?;
        }
        Ok(Self { post: changes })
    }
}

/// A purchasable item linked to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub purchase_url: Option<String>,
    pub price: Option<String>,
    pub market_icon_url: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub id: u64,
    pub likeable_type: String,
    pub likeable_id: u64,
    pub created_at: Option<String>,
    pub profile_id: Option<u64>,
}

// ── Comments ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub body: String,
    pub commenter: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CommentsEnvelope {
    Wrapped { comments: Vec<Comment> },
    Bare(Vec<Comment>),
}

impl CommentsEnvelope {
    pub fn into_comments(self) -> Vec<Comment> {
        match self {
            CommentsEnvelope::Wrapped { comments } | CommentsEnvelope::Bare(comments) => comments,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CommentEnvelope {
    Wrapped { comment: Comment },
    Bare(Comment),
}

impl CommentEnvelope {
    pub fn into_comment(self) -> Comment {
        match self {
            CommentEnvelope::Wrapped { comment } | CommentEnvelope::Bare(comment) => comment,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub post_id: u64,
    pub body: String,
}

/// Body for POST /comments.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCommentRequest {
    pub comment: NewComment,
}

impl CreateCommentRequest {
    pub fn new(post_id: u64, body: &str) -> Result<Self, NetworkError> {
        require("comment body", body)?;
        Ok(Self {
            comment: NewComment {
                post_id,
                body: body.trim().to_string(),
            },
        })
    }
}

// ── Tags ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub taggings_count: u64,
    pub tag_category_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    pub tags: Vec<Tag>,
}

/// Response from GET /tags/popular. A missing `tags` key means no tags.
#[derive(Debug, Clone, Deserialize)]
pub struct PopularTagsResponse {
    #[serde(default)]
    pub tags: Vec<Tag>,
}

// ── Helpers ──────────────────────────────────────────────────────────────

/// Resolve a possibly server-relative asset path against the server origin.
pub fn absolute_asset_url(origin: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("{}{}", origin.trim_end_matches('/'), url)
    }
}

fn require(field: &str, value: &str) -> Result<(), NetworkError> {
    if value.trim().is_empty() {
        return Err(NetworkError::InvalidRequest(format!("{field} must not be empty")));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), NetworkError> {
    require("email", email)?;
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(NetworkError::InvalidRequest(format!("invalid email address: {email}"))),
    }
}

/// Decode a list, treating a missing, null or malformed value as empty.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

/// Decode an optional value, treating a malformed value as absent.
fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AvatarField {
    Plain(String),
    Object { url: Option<String> },
}

fn avatar_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<AvatarField> = lenient_option(deserializer)?;
    Ok(value.and_then(|field| match field {
        AvatarField::Plain(url) => Some(url),
        AvatarField::Object { url } => url,
    }))
}
