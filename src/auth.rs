//! Session gate for the admin path prefix.
//!
//! The gate itself is a pure function over the request-scoped credential;
//! the middleware only extracts the session cookie and acts on the decision.
//! There is no role or permission check beyond "a session exists".

use axum::{
    extract::Request,
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

pub const SESSION_COOKIE: &str = "session";
pub const LOGIN_PATH: &str = "/login";

/// Outcome of the admin gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectToLogin,
}

/// Decide whether a credential passes the admin gate.
///
/// Any non-blank session value passes.
// TODO: check a role claim here once sessions carry roles; today presence is
// the only requirement.
pub fn evaluate_session(credential: Option<&str>) -> GateDecision {
    match credential {
        Some(token) if !token.trim().is_empty() => GateDecision::Allow,
        _ => GateDecision::RedirectToLogin,
    }
}

/// Middleware applied to every route under `/admin`. Unauthenticated
/// callers are redirected to the login page; everyone else passes through
/// unchanged.
pub async fn session_gate(request: Request, next: Next) -> Response {
    let session = session_from_headers(request.headers());
    match evaluate_session(session.as_deref()) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::RedirectToLogin => Redirect::temporary(LOGIN_PATH).into_response(),
    }
}

/// Pull the session cookie value out of the request headers, if any.
fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_or_blank_credentials_redirect() {
        assert_eq!(evaluate_session(None), GateDecision::RedirectToLogin);
        assert_eq!(evaluate_session(Some("")), GateDecision::RedirectToLogin);
        assert_eq!(evaluate_session(Some("   ")), GateDecision::RedirectToLogin);
    }

    #[test]
    fn present_credential_allows() {
        assert_eq!(evaluate_session(Some("abc123")), GateDecision::Allow);
    }

    #[test]
    fn session_cookie_is_extracted_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=tok-1; lang=en"),
        );
        assert_eq!(session_from_headers(&headers).as_deref(), Some("tok-1"));
    }

    #[test]
    fn no_cookie_header_yields_none() {
        let headers = HeaderMap::new();
        assert_eq!(session_from_headers(&headers), None);
    }
}
