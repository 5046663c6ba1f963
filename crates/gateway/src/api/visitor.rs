//! Visitor identity (spec §4.10, C10): an opaque ownership tag carried in
//! a cookie, minted on first contact. Grounded on the gateway's existing
//! bearer-token middleware idiom (`api::auth`), adapted for cookies via
//! `axum-extra`'s typed jar instead of a header.

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;

use briefing_domain::visitor::VisitorTag;

pub const VISITOR_COOKIE: &str = "visitor_id";
const ONE_YEAR_SECS: i64 = 60 * 60 * 24 * 365;

/// Extractor pulling the [`VisitorTag`] the middleware below attached to
/// the request. Panics-free: the middleware always runs first, so the
/// extension is always present by the time a handler sees the request.
pub struct Visitor(pub VisitorTag);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = (axum::http::StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VisitorTag>()
            .copied()
            .map(Visitor)
            .ok_or((
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "visitor middleware did not run",
            ))
    }
}

/// Read the `visitor_id` cookie; mint a fresh 128-bit tag when absent.
/// Attaches the tag to the request's extensions for downstream extractors
/// and, when minted, sets the cookie on the response with a one-year
/// expiry, `SameSite=Lax`, not http-only, secure only in production.
pub async fn visitor_middleware(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let existing = jar
        .get(VISITOR_COOKIE)
        .and_then(|c| c.value().parse::<VisitorTag>().ok());

    let (tag, minted) = match existing {
        Some(tag) => (tag, false),
        None => (VisitorTag::new(), true),
    };

    request.extensions_mut().insert(tag);
    let response = next.run(request).await;

    if !minted {
        return response;
    }

    let mut cookie = Cookie::new(VISITOR_COOKIE, tag.as_str_repr());
    cookie.set_path("/");
    cookie.set_max_age(Some(time::Duration::seconds(ONE_YEAR_SECS)));
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(false);
    cookie.set_secure(is_production());

    (jar.add(cookie), response).into_response()
}

fn is_production() -> bool {
    std::env::var("BRIEFING_ENV").map(|v| v == "production").unwrap_or(false)
}
