//! The high-level API client.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::api::cache::QueryCache;
use crate::api::endpoint::{CacheTag, Endpoint, EndpointCall, EndpointKind};
use crate::api::errors::ApiError;
use crate::api::models::{
    AddToCart, CartItem, CartSummary, Course, EmailCredentials, NewReview, Review, ReviewUpdate,
    SignupRequest,
};
use crate::auth::{
    AuthResponse, AuthSession, MemoryStorage, SessionState, SessionStorage, TokenPair, TokenStore,
    User, UserPatch,
};
use crate::clients::{HttpClient, HttpError, HttpResponse, ReauthClient, ReauthError};
use crate::config::ClientConfig;
use crate::validation;

/// Client for the course platform API.
///
/// Owns the transport stack (executor plus reauthentication wrapper), the
/// shared [`AuthSession`], and the query cache. Query operations read
/// through the cache; mutations invalidate the tags they affect once the
/// server accepts them.
///
/// When an authenticated call gets a `401` that cannot be recovered by a
/// token refresh, the session is logged out, the cache is cleared, and the
/// call fails with [`ApiError::SessionExpired`].
///
/// # Thread Safety
///
/// `ApiClient` is `Send + Sync`; wrap it in an `Arc` to share it.
///
/// # Example
///
/// ```rust,ignore
/// use a1french_api::{ApiClient, ClientConfig};
///
/// let client = ApiClient::with_memory_storage(&ClientConfig::from_env()?)?;
/// let user = client.login_with_email("a@b.com", "Secret12").await?;
/// println!("Welcome {}", user.name);
///
/// for course in client.get_courses().await? {
///     println!("{} {}", course.name, course.discounted_price());
/// }
/// ```
#[derive(Debug)]
pub struct ApiClient {
    transport: ReauthClient,
    session: Arc<AuthSession>,
    cache: QueryCache,
}

// Verify ApiClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiClient>();
};

fn decode<T: DeserializeOwned>(
    endpoint: Endpoint,
    body: &serde_json::Value,
) -> Result<T, ApiError> {
    T::deserialize(body).map_err(|source| ApiError::Decode {
        endpoint: endpoint.name(),
        source,
    })
}

fn to_body<T: serde::Serialize>(
    endpoint: Endpoint,
    value: &T,
) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|source| ApiError::Decode {
        endpoint: endpoint.name(),
        source,
    })
}

impl ApiClient {
    /// Creates a client whose session is persisted in `storage`.
    ///
    /// The session is initialized from whatever `storage` already holds;
    /// call [`restore_session`](Self::restore_session) to validate it
    /// against the server.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the HTTP client cannot be created.
    pub fn new(config: &ClientConfig, storage: Arc<dyn SessionStorage>) -> Result<Self, HttpError> {
        let tokens = Arc::new(TokenStore::new(storage));
        let session = Arc::new(AuthSession::from_storage(Arc::clone(&tokens)));
        let transport = ReauthClient::new(HttpClient::new(config, tokens)?);

        Ok(Self {
            transport,
            session,
            cache: QueryCache::new(),
        })
    }

    /// Creates a client with process-lifetime session storage.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the HTTP client cannot be created.
    pub fn with_memory_storage(config: &ClientConfig) -> Result<Self, HttpError> {
        Self::new(config, Arc::new(MemoryStorage::new()))
    }

    /// Returns the shared session.
    #[must_use]
    pub const fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    /// Returns the token store.
    #[must_use]
    pub const fn tokens(&self) -> &Arc<TokenStore> {
        self.transport.tokens()
    }

    /// Returns the query cache.
    #[must_use]
    pub const fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Drops cached queries matching any of `tags`; returns how many.
    pub fn invalidate(&self, tags: &[CacheTag]) -> usize {
        self.cache.invalidate(tags)
    }

    /// Drops every cached query.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    // -- Transport --------------------------------------------------------

    async fn send(&self, call: &EndpointCall) -> Result<HttpResponse, ApiError> {
        let request = call.to_request()?;
        match self.transport.request(&request).await {
            Ok(response) => Ok(response),
            Err(ReauthError::SessionExpired { reason }) => {
                tracing::warn!(
                    endpoint = call.endpoint().name(),
                    "Logging out after failed token refresh: {}",
                    reason
                );
                self.force_logout();
                Err(ApiError::SessionExpired)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn force_logout(&self) {
        if let Err(e) = self.session.logout() {
            tracing::warn!("Failed to clear session storage: {}", e);
        }
        self.cache.clear();
    }

    async fn query<T: DeserializeOwned>(&self, call: EndpointCall) -> Result<T, ApiError> {
        debug_assert_eq!(call.endpoint().def().kind, EndpointKind::Query);

        let key = call.cache_key();
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(key = %key, "Serving query from cache");
            return decode(call.endpoint(), &cached);
        }

        let response = self.send(&call).await?;
        let value = decode(call.endpoint(), &response.body)?;
        self.cache.insert(key, call.provided_tags(), response.body);
        Ok(value)
    }

    async fn mutate(&self, call: EndpointCall) -> Result<HttpResponse, ApiError> {
        let response = self.send(&call).await?;
        self.cache.invalidate(&call.invalidated_tags());
        Ok(response)
    }

    /// Stores `pair`, fetches the user if the server did not include one,
    /// and signs the session in.
    ///
    /// Cached queries belong to whoever was signed in before, so the cache
    /// is cleared first. Any failure leaves the session logged out.
    async fn establish_session(
        &self,
        pair: TokenPair,
        user: Option<User>,
    ) -> Result<User, ApiError> {
        self.cache.clear();

        if let Err(e) = self.tokens().set(&pair) {
            self.force_logout();
            return Err(e.into());
        }

        let user = match user {
            Some(user) => user,
            None => match self.fetch_current_user().await {
                Ok(user) => user,
                Err(e) => {
                    self.force_logout();
                    return Err(e);
                }
            },
        };

        if let Err(e) = self.session.set_credentials(user.clone(), &pair) {
            self.force_logout();
            return Err(e.into());
        }
        Ok(user)
    }

    async fn fetch_current_user(&self) -> Result<User, ApiError> {
        let call = EndpointCall::new(Endpoint::GetCurrentUser);
        let response = self.send(&call).await?;
        decode(call.endpoint(), &response.body)
    }

    // -- Session ----------------------------------------------------------

    /// Re-reads the persisted session and validates it with the server.
    ///
    /// Without a stored access token this only returns the logged-out
    /// state. Otherwise `GET /api/user/me` is called (refreshing the token
    /// if needed): on success the session is re-established with the fresh
    /// user, on any failure the session is logged out.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the session cannot be persisted.
    pub async fn restore_session(&self) -> Result<SessionState, ApiError> {
        let state = self.session.initialize_from_storage();
        if state.access_token.is_none() {
            return Ok(state);
        }

        match self.fetch_current_user().await {
            Ok(user) => {
                if let Some(pair) = self.tokens().token_pair() {
                    self.session.set_credentials(user, &pair)?;
                } else {
                    self.tokens().set_user(&user)?;
                    self.session.initialize_from_storage();
                }
                tracing::info!("Session restored");
            }
            Err(e) => {
                tracing::warn!("Stored session is no longer valid: {}", e);
                self.force_logout();
            }
        }
        Ok(self.session.snapshot())
    }

    // -- Auth -------------------------------------------------------------

    /// Creates an account.
    ///
    /// When the server issues tokens with the new account, the session is
    /// signed in and `user` is filled in on the returned response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an invalid name, email or
    /// password (no request is sent), or the request's error.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        validation::name(name)?;
        validation::email(email)?;
        validation::password(password)?;

        let body = SignupRequest {
            name: name.trim().to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let call = EndpointCall::new(Endpoint::Signup).body(to_body(Endpoint::Signup, &body)?);
        let response = self.mutate(call).await?;
        let mut auth: AuthResponse = decode(Endpoint::Signup, &response.body)?;

        if let Some(pair) = auth.token_pair() {
            let user = self.establish_session(pair, auth.user.take()).await?;
            auth.user = Some(user);
        }
        Ok(auth)
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an invalid email or empty
    /// password, [`ApiError::MissingTokens`] if the server issued no tokens,
    /// or the request's error.
    pub async fn login_with_email(&self, email: &str, password: &str) -> Result<User, ApiError> {
        validation::email(email)?;
        validation::required(password, "Password")?;

        let body = EmailCredentials::new(email, password);
        let call = EndpointCall::new(Endpoint::LoginWithEmail)
            .body(to_body(Endpoint::LoginWithEmail, &body)?);
        self.login(call).await
    }

    /// Signs in with a Google ID token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an empty token,
    /// [`ApiError::MissingTokens`] if the server issued no tokens, or the
    /// request's error.
    pub async fn login_with_google(&self, google_token: &str) -> Result<User, ApiError> {
        validation::required(google_token, "Google token")?;

        let call = EndpointCall::new(Endpoint::GoogleAuth)
            .body(json!({ "google_token": google_token }));
        self.login(call).await
    }

    async fn login(&self, call: EndpointCall) -> Result<User, ApiError> {
        let endpoint = call.endpoint();
        let response = self.mutate(call).await?;
        let auth: AuthResponse = decode(endpoint, &response.body)?;
        let pair = auth.token_pair().ok_or(ApiError::MissingTokens {
            endpoint: endpoint.name(),
        })?;
        self.establish_session(pair, auth.user).await
    }

    /// Exchanges the stored refresh token for a new pair.
    ///
    /// Authenticated calls refresh on their own; this is for callers that
    /// want to rotate tokens ahead of time.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::SessionExpired`] (after logging out) when no
    /// refresh token is stored, [`ApiError::MissingTokens`] if the response
    /// has no pair, or the request's error.
    pub async fn refresh_token(&self) -> Result<TokenPair, ApiError> {
        let Some(refresh_token) = self.tokens().refresh_token() else {
            self.force_logout();
            return Err(ApiError::SessionExpired);
        };

        let call = EndpointCall::new(Endpoint::RefreshToken)
            .body(json!({ "refresh_token": refresh_token }));
        let response = self.mutate(call).await?;
        let auth: AuthResponse = decode(Endpoint::RefreshToken, &response.body)?;
        let pair = auth.token_pair().ok_or(ApiError::MissingTokens {
            endpoint: Endpoint::RefreshToken.name(),
        })?;

        self.tokens().set(&pair)?;
        tracing::info!("Token pair rotated");
        Ok(pair)
    }

    /// Signs out.
    ///
    /// The server session is ended with the current access token. The local
    /// session and the whole cache are cleared even when that call fails.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if stored tokens cannot be removed.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Some(token) = self.tokens().access_token() {
            let call = EndpointCall::new(Endpoint::Logout).body(json!({ "token": token }));
            if let Err(e) = self.mutate(call).await {
                tracing::warn!("Server logout failed, clearing local session anyway: {}", e);
            }
        }

        self.cache.clear();
        self.session.logout()?;
        Ok(())
    }

    // -- User -------------------------------------------------------------

    /// Fetches the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn get_current_user(&self) -> Result<User, ApiError> {
        self.query(EndpointCall::new(Endpoint::GetCurrentUser)).await
    }

    /// Updates the signed-in user's profile.
    ///
    /// Only the fields set in `patch` are sent. On success they are also
    /// merged into the session's user.
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn update_profile(&self, patch: &UserPatch) -> Result<User, ApiError> {
        let call = EndpointCall::new(Endpoint::UpdateProfile)
            .body(to_body(Endpoint::UpdateProfile, patch)?);
        let response = self.mutate(call).await?;
        let user: User = decode(Endpoint::UpdateProfile, &response.body)?;
        self.session.update_user(patch)?;
        Ok(user)
    }

    // -- Courses ----------------------------------------------------------

    /// Lists courses.
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn get_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.query(EndpointCall::new(Endpoint::GetCourses)).await
    }

    /// Fetches one course.
    ///
    /// # Errors
    ///
    /// Returns the request's error; [`ApiError::is_not_found`] is `true`
    /// for an unknown id.
    pub async fn get_course(&self, id: &str) -> Result<Course, ApiError> {
        self.query(
            EndpointCall::new(Endpoint::GetCourse)
                .param("id", id)
                .tag_id(id),
        )
        .await
    }

    // -- Reviews ----------------------------------------------------------

    /// Lists the reviews of a course.
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn get_course_reviews(&self, course_id: &str) -> Result<Vec<Review>, ApiError> {
        self.query(
            EndpointCall::new(Endpoint::GetCourseReviews)
                .query_param("course_id", course_id)
                .tag_id(course_id),
        )
        .await
    }

    /// Posts a review.
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError> {
        let call = EndpointCall::new(Endpoint::CreateReview)
            .body(to_body(Endpoint::CreateReview, review)?)
            .tag_id(review.course_id.clone());
        let response = self.mutate(call).await?;
        decode(Endpoint::CreateReview, &response.body)
    }

    /// Edits a review.
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn update_review(&self, id: u64, update: &ReviewUpdate) -> Result<Review, ApiError> {
        let call = EndpointCall::new(Endpoint::UpdateReview)
            .param("id", id.to_string())
            .body(to_body(Endpoint::UpdateReview, update)?)
            .tag_id(update.course_id.clone());
        let response = self.mutate(call).await?;
        decode(Endpoint::UpdateReview, &response.body)
    }

    /// Deletes a review.
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn delete_review(&self, id: u64) -> Result<(), ApiError> {
        let call = EndpointCall::new(Endpoint::DeleteReview).param("id", id.to_string());
        self.mutate(call).await?;
        Ok(())
    }

    // -- Cart -------------------------------------------------------------

    /// Fetches the cart and its total.
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn get_cart(&self) -> Result<CartSummary, ApiError> {
        self.query(EndpointCall::new(Endpoint::GetCart)).await
    }

    /// Adds a course to the cart, or increases its quantity if present.
    ///
    /// # Errors
    ///
    /// Returns the request's error; a `404` means the course does not exist.
    pub async fn add_to_cart(&self, course_id: &str, quantity: u32) -> Result<CartItem, ApiError> {
        let body = AddToCart {
            course_id: course_id.to_string(),
            quantity,
        };
        let call =
            EndpointCall::new(Endpoint::AddToCart).body(to_body(Endpoint::AddToCart, &body)?);
        let response = self.mutate(call).await?;
        decode(Endpoint::AddToCart, &response.body)
    }

    /// Sets the quantity of a cart item.
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn update_cart_item(
        &self,
        item_id: &str,
        quantity: u32,
    ) -> Result<CartItem, ApiError> {
        let call = EndpointCall::new(Endpoint::UpdateCartItem)
            .param("id", item_id)
            .body(json!({ "quantity": quantity }));
        let response = self.mutate(call).await?;
        decode(Endpoint::UpdateCartItem, &response.body)
    }

    /// Removes an item from the cart.
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn remove_from_cart(&self, item_id: &str) -> Result<(), ApiError> {
        let call = EndpointCall::new(Endpoint::RemoveFromCart).param("id", item_id);
        self.mutate(call).await?;
        Ok(())
    }

    /// Empties the cart.
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn clear_cart(&self) -> Result<(), ApiError> {
        self.mutate(EndpointCall::new(Endpoint::ClearCart)).await?;
        Ok(())
    }
}
