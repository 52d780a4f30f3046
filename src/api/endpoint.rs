//! Declarative endpoint table.
//!
//! Every logical operation of the API is described once by an
//! [`EndpointDef`]: HTTP method, path template, whether it needs the bearer
//! token, and which cache tags it provides (queries) or invalidates
//! (mutations). [`EndpointCall`] binds the template parameters, query,
//! body, and tag scope of one invocation and turns it into an
//! [`HttpRequest`].
//!
//! # Path Templates
//!
//! Templates use `{name}` placeholders, filled in with URL-encoded values:
//!
//! ```rust
//! use a1french_api::api::{build_path, Endpoint, EndpointCall};
//!
//! assert_eq!(build_path("/api/courses/{id}", &[("id", "c 1")]), "/api/courses/c%201");
//!
//! let call = EndpointCall::new(Endpoint::GetCourse).param("id", "c-1");
//! assert_eq!(call.path(), "/api/courses/c-1");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::clients::{HttpMethod, HttpRequest, InvalidHttpRequestError};

/// Kinds of cached data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagType {
    /// The current user.
    User,
    /// Course list and course details.
    Courses,
    /// Review lists.
    Reviews,
    /// The cart.
    Cart,
}

/// A cache tag, optionally scoped to one id.
///
/// An unscoped tag used for invalidation matches every tag of its kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheTag {
    /// What kind of data is tagged.
    pub kind: TagType,
    /// The id the data belongs to, if scoped.
    pub id: Option<String>,
}

impl CacheTag {
    /// An unscoped tag.
    #[must_use]
    pub const fn all(kind: TagType) -> Self {
        Self { kind, id: None }
    }

    /// A tag scoped to `id`.
    #[must_use]
    pub fn scoped(kind: TagType, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: Some(id.into()),
        }
    }

    /// Returns `true` when invalidating `self` must drop data tagged `provided`.
    #[must_use]
    pub fn matches(&self, provided: &Self) -> bool {
        self.kind == provided.kind && (self.id.is_none() || self.id == provided.id)
    }
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{:?}({id})", self.kind),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

/// Whether an endpoint reads (and is cached) or writes (and invalidates).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    /// Read operation; its result is cached.
    Query,
    /// Write operation; invalidates cached data on success.
    Mutation,
}

/// Every operation the client exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Create an account.
    Signup,
    /// Email and password login.
    LoginWithEmail,
    /// Google ID token login.
    GoogleAuth,
    /// Exchange a refresh token for a new pair.
    RefreshToken,
    /// End the server session.
    Logout,
    /// The signed-in user.
    GetCurrentUser,
    /// Update the signed-in user.
    UpdateProfile,
    /// List courses.
    GetCourses,
    /// One course.
    GetCourse,
    /// Reviews of one course.
    GetCourseReviews,
    /// Post a review.
    CreateReview,
    /// Edit a review.
    UpdateReview,
    /// Delete a review.
    DeleteReview,
    /// The cart with its total.
    GetCart,
    /// Add a course to the cart.
    AddToCart,
    /// Change an item's quantity.
    UpdateCartItem,
    /// Remove an item.
    RemoveFromCart,
    /// Empty the cart.
    ClearCart,
}

/// Static description of an endpoint.
#[derive(Debug, PartialEq, Eq)]
pub struct EndpointDef {
    /// The endpoint described.
    pub endpoint: Endpoint,
    /// Operation name, used in cache keys and logs.
    pub name: &'static str,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template.
    pub template: &'static str,
    /// Whether the bearer token is attached.
    pub requires_auth: bool,
    /// Query or mutation.
    pub kind: EndpointKind,
    /// Tags attached to cached results, scoped by the call's tag id if set.
    pub provides: &'static [TagType],
    /// Unscoped tags invalidated on success.
    pub invalidates: &'static [TagType],
    /// Tag invalidated on success, scoped by the call's tag id.
    pub invalidates_scoped: Option<TagType>,
}

const fn def(
    endpoint: Endpoint,
    name: &'static str,
    method: HttpMethod,
    template: &'static str,
    requires_auth: bool,
) -> EndpointDef {
    EndpointDef {
        endpoint,
        name,
        method,
        template,
        requires_auth,
        kind: match method {
            HttpMethod::Get => EndpointKind::Query,
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Delete => EndpointKind::Mutation,
        },
        provides: &[],
        invalidates: &[],
        invalidates_scoped: None,
    }
}

impl EndpointDef {
    const fn provides(mut self, tags: &'static [TagType]) -> Self {
        self.provides = tags;
        self
    }

    const fn invalidates(mut self, tags: &'static [TagType]) -> Self {
        self.invalidates = tags;
        self
    }

    const fn invalidates_scoped(mut self, tag: TagType) -> Self {
        self.invalidates_scoped = Some(tag);
        self
    }
}

use Endpoint as E;
use HttpMethod::{Delete, Get, Post, Put};
use TagType::{Cart, Courses, Reviews, User};

/// The endpoint table, in [`Endpoint`] declaration order.
pub static ENDPOINTS: [EndpointDef; 18] = [
    def(E::Signup, "signup", Post, "/api/signup", false).invalidates(&[User]),
    def(E::LoginWithEmail, "login_with_email", Post, "/api/login/email", false)
        .invalidates(&[User]),
    def(E::GoogleAuth, "google_auth", Post, "/api/login/google", false).invalidates(&[User]),
    def(E::RefreshToken, "refresh_token", Post, "/api/refresh", false),
    def(E::Logout, "logout", Post, "/api/logout", true).invalidates(&[User, Courses, Reviews]),
    def(E::GetCurrentUser, "get_current_user", Get, "/api/user/me", true).provides(&[User]),
    def(E::UpdateProfile, "update_profile", Put, "/api/user/me", true).invalidates(&[User]),
    def(E::GetCourses, "get_courses", Get, "/api/courses", true).provides(&[Courses]),
    def(E::GetCourse, "get_course", Get, "/api/courses/{id}", true).provides(&[Courses]),
    def(E::GetCourseReviews, "get_course_reviews", Get, "/api/reviews", true)
        .provides(&[Reviews]),
    def(E::CreateReview, "create_review", Post, "/api/reviews", true)
        .invalidates(&[Reviews])
        .invalidates_scoped(Reviews),
    def(E::UpdateReview, "update_review", Put, "/api/reviews/{id}", true)
        .invalidates(&[Reviews])
        .invalidates_scoped(Reviews),
    def(E::DeleteReview, "delete_review", Delete, "/api/reviews/{id}", true)
        .invalidates(&[Reviews]),
    def(E::GetCart, "get_cart", Get, "/api/cart", true).provides(&[Cart]),
    def(E::AddToCart, "add_to_cart", Post, "/api/cart/items", true).invalidates(&[Cart]),
    def(E::UpdateCartItem, "update_cart_item", Put, "/api/cart/items/{id}", true)
        .invalidates(&[Cart]),
    def(E::RemoveFromCart, "remove_from_cart", Delete, "/api/cart/items/{id}", true)
        .invalidates(&[Cart]),
    def(E::ClearCart, "clear_cart", Delete, "/api/cart", true).invalidates(&[Cart]),
];

impl Endpoint {
    /// All endpoints, in declaration order.
    pub const ALL: [Self; 18] = [
        Self::Signup,
        Self::LoginWithEmail,
        Self::GoogleAuth,
        Self::RefreshToken,
        Self::Logout,
        Self::GetCurrentUser,
        Self::UpdateProfile,
        Self::GetCourses,
        Self::GetCourse,
        Self::GetCourseReviews,
        Self::CreateReview,
        Self::UpdateReview,
        Self::DeleteReview,
        Self::GetCart,
        Self::AddToCart,
        Self::UpdateCartItem,
        Self::RemoveFromCart,
        Self::ClearCart,
    ];

    /// Returns the endpoint's static description.
    #[must_use]
    pub fn def(self) -> &'static EndpointDef {
        &ENDPOINTS[self as usize]
    }

    /// Returns the operation name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.def().name
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fills `{name}` placeholders in `template` with URL-encoded values.
///
/// Placeholders without a value are left in place.
#[must_use]
pub fn build_path(template: &str, params: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in params {
        let placeholder = format!("{{{key}}}");
        result = result.replace(&placeholder, &urlencoding::encode(value));
    }
    result
}

/// One invocation of an endpoint.
///
/// # Example
///
/// ```rust
/// use a1french_api::api::{CacheTag, Endpoint, EndpointCall, TagType};
///
/// let call = EndpointCall::new(Endpoint::GetCourseReviews)
///     .query_param("course_id", "c-1")
///     .tag_id("c-1");
///
/// assert_eq!(call.cache_key(), "get_course_reviews?course_id=c-1");
/// assert_eq!(call.provided_tags(), vec![CacheTag::scoped(TagType::Reviews, "c-1")]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EndpointCall {
    endpoint: Endpoint,
    params: Vec<(&'static str, String)>,
    query: BTreeMap<String, String>,
    body: Option<serde_json::Value>,
    tag_id: Option<String>,
}

impl EndpointCall {
    /// Starts a call to `endpoint`.
    #[must_use]
    pub const fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: Vec::new(),
            query: BTreeMap::new(),
            body: None,
            tag_id: None,
        }
    }

    /// Binds a path template parameter.
    #[must_use]
    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Scopes provided and invalidated tags to `id`.
    #[must_use]
    pub fn tag_id(mut self, id: impl Into<String>) -> Self {
        self.tag_id = Some(id.into());
        self
    }

    /// Returns the endpoint called.
    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Returns the interpolated path.
    #[must_use]
    pub fn path(&self) -> String {
        let params: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();
        build_path(self.endpoint.def().template, &params)
    }

    /// Returns the key the result is cached under: path plus sorted query.
    #[must_use]
    pub fn cache_key(&self) -> String {
        let mut key = self.endpoint.name().to_string();
        let path = self.path();
        if path != self.endpoint.def().template {
            key.push(' ');
            key.push_str(&path);
        }
        for (i, (k, v)) in self.query.iter().enumerate() {
            key.push(if i == 0 { '?' } else { '&' });
            key.push_str(k);
            key.push('=');
            key.push_str(v);
        }
        key
    }

    /// Returns the tags attached to this call's cached result.
    #[must_use]
    pub fn provided_tags(&self) -> Vec<CacheTag> {
        self.endpoint
            .def()
            .provides
            .iter()
            .map(|&kind| CacheTag {
                kind,
                id: self.tag_id.clone(),
            })
            .collect()
    }

    /// Returns the tags this call invalidates when it succeeds.
    #[must_use]
    pub fn invalidated_tags(&self) -> Vec<CacheTag> {
        let def = self.endpoint.def();
        let mut tags: Vec<CacheTag> = def.invalidates.iter().map(|&k| CacheTag::all(k)).collect();
        if let (Some(kind), Some(id)) = (def.invalidates_scoped, &self.tag_id) {
            tags.push(CacheTag::scoped(kind, id.clone()));
        }
        tags
    }

    /// Builds the HTTP request for this call.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if a POST or PUT has no body.
    pub fn to_request(&self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let def = self.endpoint.def();
        let mut builder = HttpRequest::builder(def.method, self.path()).requires_auth(def.requires_auth);
        for (key, value) in &self.query {
            builder = builder.query_param(key.clone(), value.clone());
        }
        if let Some(body) = &self.body {
            builder = builder.body(body.clone());
        }
        builder.build()
    }
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<EndpointDef>();
    assert_send_sync::<EndpointCall>();
};
