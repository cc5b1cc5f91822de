//! Session guard: validates the access/refresh token pair against the auth
//! service, exchanges the refresh token once per guarded request, and tears
//! the session down on any unrecoverable failure.

use crate::docsgate::{handlers::error_response, APP_USER_AGENT};
use anyhow::{Context, Result};
use axum::{
    extract::{Extension, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, instrument};

/// Cookie holding the short-lived access token.
pub const ACCESS_COOKIE: &str = "access_token";
/// Cookie holding the longer-lived refresh token.
pub const REFRESH_COOKIE: &str = "refresh_token";

pub const INTERNAL_ERROR: &str = "Something went wrong on our server. Please try again later.";
pub const LOGIN_REQUIRED: &str = "Please log in.";

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

/// Per-request guard decision. Never persisted.
#[derive(Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    Proceed,
    Rejected { status: StatusCode, message: String },
}

/// Token pair issued by the auth service on login.
#[derive(Deserialize, Debug)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Deserialize, Debug)]
struct RefreshResponse {
    access: String,
}

/// Client for the remote auth service. Every call is a single attempt with a
/// bounded timeout; a timeout counts as a non-success status.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    base_url: String,
    client: reqwest::Client,
}

impl SessionGuard {
    /// Build a guard talking to the auth service at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build auth service client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Ask the auth service whether `token` is valid. True iff the endpoint
    /// replies with a success status; network errors count as invalid.
    #[instrument(skip_all)]
    pub async fn verify(&self, token: &str) -> bool {
        match self
            .client
            .post(format!("{}/token/verify/", self.base_url))
            .json(&json!({ "token": token }))
            .send()
            .await
        {
            Ok(response) => {
                if response.status().is_success() {
                    true
                } else {
                    debug!("Token verification failed: {}", response.status());

                    false
                }
            }
            Err(e) => {
                error!("Error verifying token: {:?}", e);

                false
            }
        }
    }

    /// Decide whether the request may proceed to the refresh exchange.
    ///
    /// A missing refresh token is fatal before anything else: no refresh can
    /// be attempted regardless of the access token, so no remote call is
    /// made. Otherwise the pair is rejected only when neither token
    /// verifies; the refresh token is not verified when the access token
    /// already did.
    pub async fn check(&self, access: &str, refresh: &str) -> GuardOutcome {
        if refresh.is_empty() {
            error!("Missing refresh token");

            return GuardOutcome::Rejected {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: INTERNAL_ERROR.to_string(),
            };
        }

        if !self.verify(access).await && !self.verify(refresh).await {
            debug!("Neither token verified");

            return GuardOutcome::Rejected {
                status: StatusCode::UNAUTHORIZED,
                message: LOGIN_REQUIRED.to_string(),
            };
        }

        GuardOutcome::Proceed
    }

    /// Exchange the refresh token for a new access token. Non-success
    /// upstream statuses are propagated; network errors and malformed
    /// bodies fold into 500.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh: &str) -> Result<String, StatusCode> {
        let response = self
            .client
            .post(format!("{}/token/refresh/", self.base_url))
            .json(&json!({ "refresh": refresh }))
            .send()
            .await
            .map_err(|e| {
                error!("Error refreshing token: {:?}", e);

                StatusCode::INTERNAL_SERVER_ERROR
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            error!("Token refresh failed: {}", status);

            return Err(status);
        }

        let body: RefreshResponse = response.json().await.map_err(|e| {
            error!("Malformed refresh response: {:?}", e);

            StatusCode::INTERNAL_SERVER_ERROR
        })?;

        Ok(body.access)
    }

    /// Exchange credentials for a token pair at the auth service.
    ///
    /// # Errors
    /// Non-200 upstream responses are returned with their status and the
    /// upstream `detail` message when one is present.
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenPair, (StatusCode, String)> {
        let response = self
            .client
            .post(format!("{}/token/", self.base_url))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(|e| {
                error!("Error requesting token pair: {:?}", e);

                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            error!("Login rejected by auth service: {}", status);

            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("detail")
                        .and_then(serde_json::Value::as_str)
                        .map(String::from)
                })
                .unwrap_or_else(|| INTERNAL_ERROR.to_string());

            return Err((status, message));
        }

        response.json::<TokenPair>().await.map_err(|e| {
            error!("Malformed token response: {:?}", e);

            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
        })
    }
}

/// Middleware wrapping every protected route.
///
/// Flow: extract both cookies, run `check`, then unconditionally exchange
/// the refresh token. Only a successful exchange lets the inner handler
/// run, after which the `access_token` cookie on its response is replaced
/// with the newly issued token. The refresh exchange happens even when the
/// access token still verifies, so a transient refresh failure logs the
/// user out (see DESIGN.md).
pub async fn guard(
    Extension(guard): Extension<Arc<SessionGuard>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let access = cookie_value(&jar, ACCESS_COOKIE);
    let refresh = cookie_value(&jar, REFRESH_COOKIE);

    if let GuardOutcome::Rejected { status, message } = guard.check(&access, &refresh).await {
        return teardown(status, &message);
    }

    match guard.refresh(&refresh).await {
        Ok(new_access) => {
            let response = next.run(request).await;

            // Never hand back a stale access token once a refresh happened
            // in this request cycle. Refresh cookie stays untouched here.
            let jar = CookieJar::new().add(access_cookie(&new_access));

            (jar, response).into_response()
        }
        Err(status) => teardown(status, INTERNAL_ERROR),
    }
}

/// Clear both session cookies and render the error shape. The inner
/// handler's side effects never happen on this path.
pub fn teardown(status: StatusCode, message: &str) -> Response {
    let jar = CookieJar::new()
        .add(clear_access_cookie())
        .add(clear_refresh_cookie());

    (jar, error_response(status, message)).into_response()
}

fn cookie_value(jar: &CookieJar, name: &str) -> String {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .unwrap_or_default()
}

/// Build the http-only cookie carrying the access token.
#[must_use]
pub fn access_cookie(token: &str) -> Cookie<'static> {
    session_cookie(ACCESS_COOKIE, token.to_string())
}

/// Build the http-only cookie carrying the refresh token.
#[must_use]
pub fn refresh_cookie(token: &str) -> Cookie<'static> {
    session_cookie(REFRESH_COOKIE, token.to_string())
}

#[must_use]
pub fn clear_access_cookie() -> Cookie<'static> {
    clear_cookie(ACCESS_COOKIE)
}

#[must_use]
pub fn clear_refresh_cookie() -> Cookie<'static> {
    clear_cookie(REFRESH_COOKIE)
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

fn clear_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, String::new()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}
