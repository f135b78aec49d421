//! Authenticated context and token lifecycle.
//!
//! # Design
//! A `Session` is a cloneable handle: every repository object obtained
//! through it keeps a clone, and all clones see the same token pair. Tokens
//! are only ever replaced as a pair, after a round trip has fully succeeded.
//!
//! Token-rotating calls (refresh, account update, password change) go
//! through `Session::rotate`, which holds an async mutex for the whole round
//! trip. Overlapping rotations on one session therefore run one after the
//! other and each starts from the pair the previous one stored. Reads of the
//! current access token never wait on that mutex.
//!
//! Expiry is never detected locally. A 401 surfaces as
//! `ApiError::TokenExpired`; calling `refresh` (or logging in again) is the
//! caller's decision. `authenticated_call` never refreshes on its own.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::client::{path_segment, to_body, Client, Resource};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpResponse, Query};
use crate::status::{self, Operation};
use crate::types::{AccountRecord, Credentials, Signup, TokenPair};

struct SessionState {
    client: Client,
    tokens: Mutex<TokenPair>,
    rotation: tokio::sync::Mutex<()>,
}

#[derive(Clone)]
pub struct Session {
    state: Arc<SessionState>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.state.client.base_url())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Session over an already known token pair. No network call.
    pub fn from_tokens(client: Client, tokens: TokenPair) -> Self {
        Self {
            state: Arc::new(SessionState {
                client,
                tokens: Mutex::new(tokens),
                rotation: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// `POST /accounts/login`.
    pub async fn login(client: &Client, username: &str, password: &str) -> Result<(Session, AccountRecord), ApiError> {
        let body = to_body(&Credentials { username, password })?;
        let request = client
            .build(HttpMethod::Post, Resource::Accounts, "login")
            .with_json(body);
        let record: AccountRecord = client.fetch(request, Operation::Login).await?;
        info!(username, "logged in");
        Self::from_account(client, record)
    }

    /// `POST /accounts/`.
    pub async fn signup(client: &Client, profile: &Signup) -> Result<(Session, AccountRecord), ApiError> {
        let request = client
            .build(HttpMethod::Post, Resource::Accounts, "")
            .with_json(to_body(profile)?);
        let record: AccountRecord = client.fetch(request, Operation::General).await?;
        info!(username = %record.username, "signed up");
        Self::from_account(client, record)
    }

    /// Re-derive a session from an access token via `GET /accounts/`.
    ///
    /// When the server does not hand back a token pair the refresh token is
    /// unknown, and `refresh` fails with `TokenExpired` until the caller
    /// logs in again.
    pub async fn restore(client: &Client, access_token: &str) -> Result<(Session, AccountRecord), ApiError> {
        let request = client
            .build(HttpMethod::Get, Resource::Accounts, "")
            .with_bearer(Some(access_token));
        let mut record: AccountRecord = client.fetch(request, Operation::General).await?;
        let tokens = record
            .tokens
            .take()
            .unwrap_or_else(|| TokenPair::new(access_token, String::new()));
        Ok((Self::from_tokens(client.clone(), tokens), record))
    }

    fn from_account(client: &Client, mut record: AccountRecord) -> Result<(Session, AccountRecord), ApiError> {
        let tokens = record
            .tokens
            .take()
            .ok_or_else(|| ApiError::Deserialization("account response carries no tokens".to_string()))?;
        Ok((Self::from_tokens(client.clone(), tokens), record))
    }

    pub fn client(&self) -> &Client {
        &self.state.client
    }

    pub fn base_url(&self) -> &str {
        self.state.client.base_url()
    }

    /// Snapshot of the current pair.
    pub fn tokens(&self) -> TokenPair {
        self.state
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn access_token(&self) -> String {
        self.tokens().access
    }

    pub fn refresh_token(&self) -> String {
        self.tokens().refresh
    }

    fn store(&self, tokens: TokenPair) {
        *self.state.tokens.lock().unwrap_or_else(PoisonError::into_inner) = tokens;
    }

    /// Exchange the refresh token for a new pair via
    /// `GET /accounts/refresh/{refresh_token}`. On failure the current pair
    /// is left untouched.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let client = self.state.client.clone();
        self.rotate(|current| async move {
            if current.refresh.is_empty() {
                return Err(ApiError::TokenExpired);
            }
            let request = client.build(
                HttpMethod::Get,
                Resource::Accounts,
                &format!("refresh/{}", path_segment(&current.refresh)),
            );
            let pair: TokenPair = client.fetch(request, Operation::General).await?;
            Ok(((), pair))
        })
        .await
    }

    /// Run one token-rotating round trip.
    ///
    /// `f` receives the pair current at the time the rotation lock is taken
    /// and returns its result with the pair to store. Nothing is stored when
    /// `f` fails or its future is dropped.
    pub(crate) async fn rotate<T, F, Fut>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(TokenPair) -> Fut,
        Fut: Future<Output = Result<(T, TokenPair), ApiError>>,
    {
        let _guard = self.state.rotation.lock().await;
        let (value, tokens) = f(self.tokens()).await?;
        self.store(tokens);
        debug!("session tokens rotated");
        Ok(value)
    }

    /// One transport call carrying the current access token.
    ///
    /// Returns the raw response; a 401 is returned as data, not refreshed.
    pub async fn authenticated_call(
        &self,
        resource: Resource,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        query: Query,
    ) -> Result<HttpResponse, ApiError> {
        let token = self.access_token();
        let mut request = self
            .state
            .client
            .build(method, resource, path)
            .with_query(query)
            .with_bearer(Some(&token));
        if let Some(body) = body {
            request = request.with_json(body);
        }
        self.state.client.execute(request).await
    }

    /// Same as `authenticated_call` without an Authorization header.
    pub async fn anonymous_call(
        &self,
        resource: Resource,
        method: HttpMethod,
        path: &str,
        query: Query,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.state.client.build(method, resource, path).with_query(query);
        self.state.client.execute(request).await
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, resource: Resource, path: &str, query: Query) -> Result<T, ApiError> {
        let response = self
            .authenticated_call(resource, HttpMethod::Get, path, None, query)
            .await?;
        status::decode(response, Operation::General)
    }

    pub(crate) async fn get_anonymous<T: DeserializeOwned>(&self, resource: Resource, path: &str) -> Result<T, ApiError> {
        let response = self
            .anonymous_call(resource, HttpMethod::Get, path, Query::new())
            .await?;
        status::decode(response, Operation::General)
    }

    pub(crate) async fn post<T: DeserializeOwned>(&self, resource: Resource, path: &str, body: Value) -> Result<T, ApiError> {
        let response = self
            .authenticated_call(resource, HttpMethod::Post, path, Some(body), Query::new())
            .await?;
        status::decode(response, Operation::General)
    }

    pub(crate) async fn put<T: DeserializeOwned>(&self, resource: Resource, path: &str, body: Value) -> Result<T, ApiError> {
        let response = self
            .authenticated_call(resource, HttpMethod::Put, path, Some(body), Query::new())
            .await?;
        status::decode(response, Operation::General)
    }

    /// True when both handles share one token state.
    pub fn same_as(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}
