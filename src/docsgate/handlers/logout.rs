use crate::docsgate::session::{clear_access_cookie, clear_refresh_cookie};
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::instrument;

/// Clear both session cookies. No remote call is made; the refresh token
/// simply ages out on the auth service side.
#[instrument(skip_all)]
pub async fn logout() -> Response {
    let jar = CookieJar::new()
        .add(clear_access_cookie())
        .add(clear_refresh_cookie());

    (jar, Json(json!({ "message": "Logged out" }))).into_response()
}
