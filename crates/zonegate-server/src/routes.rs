//! Request handlers
//!
//! `GET /` answers the reverse proxy's auth subrequest: 200 with identity
//! headers when access is granted, a 302 to the login endpoint when the
//! subject has to authenticate first, and 403 for every other outcome.
//! Engine failures fail closed.

use crate::error::{Error, Result};
use crate::server::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{debug, error, warn};
use zonegate_authorization::{AccessOutcome, AuditOutcome, ZoneAccessReport};
use zonegate_core::{Action, UserRef};

/// URI the proxy was asked for
pub const HEADER_ORIGINAL_URI: &str = "x-original-uri";
/// Zone the proxy location belongs to
pub const HEADER_ZONE_NAME: &str = "x-zone-name";
/// Session token, when not sent as a cookie
pub const HEADER_SESSION: &str = "x-zone-session";
/// Zone used when the proxy does not name one
pub const DEFAULT_ZONE: &str = "default";

const HEADER_USERNAME: &str = "x-zone-username";
const HEADER_EMAIL: &str = "x-zone-email";
const HEADER_USER_ID: &str = "x-zone-user-id";
const HEADER_FIRST_NAME: &str = "x-zone-first-name";
const HEADER_LAST_NAME: &str = "x-zone-last-name";

/// Query parameters of the login and logout endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ZoneParams {
    /// Zone code
    #[serde(default)]
    pub zone: Option<String>,
    /// Local path to continue to after login
    #[serde(default)]
    pub next: Option<String>,
}

impl ZoneParams {
    fn zone(&self) -> &str {
        self.zone
            .as_deref()
            .filter(|zone| !zone.is_empty())
            .unwrap_or(DEFAULT_ZONE)
    }
}

/// Auth subrequest
pub async fn check_auth(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let original_uri = header_str(&headers, HEADER_ORIGINAL_URI).unwrap_or_default();
    let zone = header_str(&headers, HEADER_ZONE_NAME)
        .filter(|zone| !zone.is_empty())
        .unwrap_or(DEFAULT_ZONE);

    let user = match subject(&state, &headers).await {
        Ok(user) => user,
        Err(err) => {
            error!(zone = %zone, error = %err, "Session lookup failed; denying");
            return StatusCode::FORBIDDEN.into_response();
        }
    };

    match state.engine.process_access_request(zone, &user).await {
        Ok(outcome) => {
            report_audit_failure(zone, outcome.action, &outcome.audit);
            decision_response(&state, zone, original_uri, &user, &outcome)
        }
        Err(err) => {
            error!(zone = %zone, error = %err, "Access decision failed; denying");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// Access overview over every zone for the calling subject
pub async fn access_info(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ZoneAccessReport>>> {
    let user = authenticated_subject(&state, &headers).await?;
    Ok(Json(state.engine.access_overview(&user, None).await?))
}

/// Access overview for a single zone
pub async fn zone_info(
    State(state): State<AppState>,
    Path(zone): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ZoneAccessReport>> {
    let user = authenticated_subject(&state, &headers).await?;
    state
        .engine
        .access_overview(&user, Some(&zone))
        .await?
        .pop()
        .map(Json)
        .ok_or_else(|| Error::NotFound(format!("Unknown zone: {zone}")))
}

/// Complete a login for a zone
///
/// The session must already be established; the zone's rules decide whether
/// the subject may continue to `next`.
pub async fn login(
    State(state): State<AppState>,
    Query(params): Query<ZoneParams>,
    headers: HeaderMap,
) -> Result<Response> {
    let zone = params.zone();
    let user = authenticated_subject(&state, &headers).await?;

    let outcome = state.engine.process_login(zone, &user).await.map_err(|err| {
        error!(zone = %zone, error = %err, "Login gate failed; denying");
        Error::Forbidden(format!("zone '{zone}' is unavailable"))
    })?;
    report_audit_failure(zone, Action::Login, &outcome.audit);

    if !outcome.allowed {
        return Err(Error::Forbidden(format!(
            "login to zone '{zone}' is not allowed"
        )));
    }

    let target = params
        .next
        .as_deref()
        .filter(|next| is_safe_redirect(next))
        .unwrap_or("/");
    Ok(found(target))
}

/// Record a logout and clear the session cookie
pub async fn logout(
    State(state): State<AppState>,
    Query(params): Query<ZoneParams>,
    headers: HeaderMap,
) -> Result<Response> {
    let zone = params.zone();
    let user = subject(&state, &headers).await?;
    let audit = state.engine.process_logout(zone, &user).await?;
    report_audit_failure(zone, Action::Logout, &audit);

    let mut response = StatusCode::NO_CONTENT.into_response();
    let clear = format!("{}=; Max-Age=0; Path=/; HttpOnly", state.session_cookie);
    if let Ok(value) = HeaderValue::from_str(&clear) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    Ok(response)
}

/// Liveness probe
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Login endpoint URL carrying the original URI and zone
pub fn login_redirect(login_url: &str, next: &str, zone: &str) -> String {
    let separator = if login_url.contains('?') { '&' } else { '?' };
    format!(
        "{login_url}{separator}next={}&zone={}",
        urlencoding::encode(next),
        urlencoding::encode(zone)
    )
}

/// Whether `target` stays on this host
pub fn is_safe_redirect(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && !target.chars().any(char::is_control)
}

/// Session token from the configured cookie, else the session header
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().to_string());

    from_cookie
        .or_else(|| header_str(headers, HEADER_SESSION).map(str::to_string))
        .filter(|token| !token.is_empty())
}

async fn subject(state: &AppState, headers: &HeaderMap) -> zonegate_core::Result<UserRef> {
    let Some(token) = session_token(headers, &state.session_cookie) else {
        return Ok(UserRef::Anonymous);
    };
    match state.identity.resolve_session(&token).await? {
        Some(profile) => Ok(UserRef::with_session(profile, token)),
        None => {
            debug!("Unknown session token; treating subject as anonymous");
            Ok(UserRef::Anonymous)
        }
    }
}

async fn authenticated_subject(state: &AppState, headers: &HeaderMap) -> Result<UserRef> {
    let user = subject(state, headers).await?;
    if !user.is_authenticated() {
        return Err(Error::Unauthorized("no valid session".to_string()));
    }
    Ok(user)
}

fn decision_response(
    state: &AppState,
    zone: &str,
    original_uri: &str,
    user: &UserRef,
    outcome: &AccessOutcome,
) -> Response {
    match outcome.action {
        Action::Access => {
            let mut response = StatusCode::OK.into_response();
            if let UserRef::Authenticated { profile, session } = user {
                let headers = response.headers_mut();
                set_header(headers, HEADER_USERNAME, &profile.username);
                set_header(headers, HEADER_EMAIL, &profile.email);
                set_header(headers, HEADER_USER_ID, &profile.id.to_string());
                set_header(headers, HEADER_FIRST_NAME, &profile.first_name);
                set_header(headers, HEADER_LAST_NAME, &profile.last_name);
                if let Some(session) = session {
                    set_header(headers, HEADER_SESSION, session);
                }
            }
            response
        }
        Action::Login => found(&login_redirect(&state.login_url, original_uri, zone)),
        Action::AccessDenied | Action::ZoneDisabled | Action::ZoneUnknown | Action::Logout => {
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            error!(location = %location, "Redirect target is not a valid header value");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

fn set_header(headers: &mut HeaderMap, name: &'static str, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(HeaderName::from_static(name), value);
        }
        Err(_) => debug!(header = name, "Skipping header with non-visible characters"),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn report_audit_failure(zone: &str, action: Action, audit: &AuditOutcome) {
    if let Some(err) = &audit.error {
        warn!(zone = %zone, action = %action, error = %err, "Decision returned without audit record");
    }
}
