use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::CookieDirective;
use crate::config::SessionConfig;

/// Session id carried by the request, if any
pub fn session_cookie(jar: &CookieJar, config: &SessionConfig) -> Option<String> {
    jar.get(&config.cookie_name).map(|c| c.value().to_string())
}

/// Apply a commit directive to the response jar
pub fn apply_directive(jar: CookieJar, directive: &CookieDirective, config: &SessionConfig) -> CookieJar {
    match directive {
        CookieDirective::Keep => jar,
        CookieDirective::Set(id) => jar.add(session_cookie_for(config, id.to_string())),
        CookieDirective::Expire => {
            let mut cookie = session_cookie_for(config, String::new());
            cookie.make_removal();
            jar.add(cookie)
        }
    }
}

fn session_cookie_for(config: &SessionConfig, value: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::session::SessionId;
    use axum::http::{header, HeaderMap, HeaderValue};
    use axum::response::IntoResponse;

    fn set_cookie_header(jar: CookieJar) -> Option<String> {
        let response = (jar, "").into_response();
        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    #[test]
    fn reads_named_cookie_among_others() {
        let config = AppConfig::development().session;
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; SCHOOLMATE_SESSID=abc-123; other=1"),
        );
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(session_cookie(&jar, &config).as_deref(), Some("abc-123"));
        assert_eq!(session_cookie(&CookieJar::new(), &config), None);
    }

    #[test]
    fn set_cookie_carries_session_attributes() {
        let mut config = AppConfig::development().session;
        let id = SessionId::generate();

        let set = set_cookie_header(apply_directive(CookieJar::new(), &CookieDirective::Set(id), &config)).unwrap();
        assert!(set.starts_with(&format!("SCHOOLMATE_SESSID={}", id)));
        assert!(set.contains("HttpOnly"));
        assert!(set.contains("SameSite=Lax"));
        assert!(set.contains("Path=/"));
        assert!(!set.contains("Secure"));

        config.cookie_secure = true;
        let expire = set_cookie_header(apply_directive(CookieJar::new(), &CookieDirective::Expire, &config)).unwrap();
        assert!(expire.starts_with("SCHOOLMATE_SESSID=;"));
        assert!(expire.contains("Max-Age=0"));
        assert!(expire.contains("Secure"));
    }

    #[test]
    fn keep_leaves_response_untouched() {
        let config = AppConfig::development().session;
        assert!(set_cookie_header(apply_directive(CookieJar::new(), &CookieDirective::Keep, &config)).is_none());
    }
}
