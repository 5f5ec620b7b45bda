//! Route descriptors for the TUMBA backend.
//!
//! A route is pure data: building one never touches the network or the
//! keychain. The bearer token is handed to [`Endpoint::headers`] by the
//! client at dispatch time, so a token stored between two requests is picked
//! up by the next one.

mod auth;
mod comment;
mod post;
mod profile;
mod tag;

pub use auth::AuthEndpoint;
pub use comment::CommentEndpoint;
pub use post::PostEndpoint;
pub use profile::ProfileEndpoint;
pub use tag::TagEndpoint;

use std::collections::BTreeMap;

/// Header name to value. Ordered so logs and tests are stable.
pub type Headers = BTreeMap<String, String>;

/// Query parameter name to value.
pub type Query = BTreeMap<String, String>;

pub const ACCEPT: &str = "Accept";
pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

/// Capabilities every route family provides.
pub trait Endpoint {
    /// Path relative to the configured base URL, starting with `/`.
    fn path(&self) -> String;

    /// Whether the stored bearer token should be attached.
    fn authorized(&self) -> bool {
        true
    }

    /// Static headers, plus `Authorization` when a token is given and the route wants one.
    fn headers(&self, token: Option<&str>) -> Headers {
        let mut headers = Headers::new();
        headers.insert(ACCEPT.to_string(), APPLICATION_JSON.to_string());
        if let Some(token) = token.filter(|_| self.authorized()) {
            headers.insert(AUTHORIZATION.to_string(), format!("Bearer {token}"));
        }
        headers
    }

    /// Query parameters the route always carries.
    fn query(&self) -> Option<Query> {
        None
    }
}

/// The closed set of route families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Auth(AuthEndpoint),
    Profile(ProfileEndpoint),
    Post(PostEndpoint),
    Comment(CommentEndpoint),
    Tag(TagEndpoint),
}

impl Route {
    fn inner(&self) -> &dyn Endpoint {
        match self {
            Route::Auth(e) => e,
            Route::Profile(e) => e,
            Route::Post(e) => e,
            Route::Comment(e) => e,
            Route::Tag(e) => e,
        }
    }
}

impl Endpoint for Route {
    fn path(&self) -> String {
        self.inner().path()
    }

    fn authorized(&self) -> bool {
        self.inner().authorized()
    }

    fn headers(&self, token: Option<&str>) -> Headers {
        self.inner().headers(token)
    }

    fn query(&self) -> Option<Query> {
        self.inner().query()
    }
}

macro_rules! route_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Route {
                fn from(endpoint: $ty) -> Self {
                    Route::$variant(endpoint)
                }
            }
        )*
    };
}

route_from! {
    Auth => AuthEndpoint,
    Profile => ProfileEndpoint,
    Post => PostEndpoint,
    Comment => CommentEndpoint,
    Tag => TagEndpoint,
}
