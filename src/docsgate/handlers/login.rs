use crate::docsgate::{
    handlers::error_response,
    session::{access_cookie, refresh_cookie, SessionGuard},
};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Deserialize, Debug)]
pub struct UserLogin {
    username: String,
    password: String,
}

/// Exchange credentials for a token pair and store it as session cookies.
#[instrument(skip_all)]
pub async fn login(
    Extension(guard): Extension<Arc<SessionGuard>>,
    jar: CookieJar,
    payload: Option<Json<UserLogin>>,
) -> Response {
    let user = match payload {
        Some(Json(payload)) => payload,
        None => return error_response(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    match guard.login(&user.username, &user.password).await {
        Ok(pair) => {
            debug!("Login successful");

            let jar = jar
                .add(access_cookie(&pair.access))
                .add(refresh_cookie(&pair.refresh));

            (jar, Json(json!({ "message": "Login successful" }))).into_response()
        }

        Err((status, message)) => error_response(status, &message),
    }
}
