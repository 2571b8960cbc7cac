use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header,
    Form,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use tracing::{debug, warn};

use crate::sanitize::{flag_is_set, sanitize_field};

/// Raw form fields of one request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FormFields(HashMap<String, String>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Sanitized integer value, 0 when absent
    pub fn int(&self, name: &str) -> i64 {
        sanitize_field(self.get(name))
    }

    /// `name == 1` in the loose sense
    pub fn flag(&self, name: &str) -> bool {
        flag_is_set(self.get(name))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Posted fields from a url-encoded or multipart body.
///
/// Any other body (none at all, JSON, garbage) yields no fields, so the
/// request is dispatched like one that sent nothing.
#[async_trait]
impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim_start().starts_with("multipart/form-data"))
            .unwrap_or(false);

        if is_multipart {
            return Ok(match Multipart::from_request(req, state).await {
                Ok(multipart) => read_multipart(multipart).await,
                Err(e) => {
                    debug!("Ignoring unreadable multipart body: {}", e);
                    Self::new()
                }
            });
        }

        match Form::<FormFields>::from_request(req, state).await {
            Ok(Form(fields)) => Ok(fields),
            Err(e) => {
                debug!("Ignoring form body: {}", e);
                Ok(Self::new())
            }
        }
    }
}

/// Text parts only; uploaded files are skipped
async fn read_multipart(mut multipart: Multipart) -> FormFields {
    let mut fields = HashMap::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.file_name().is_some() {
                    continue;
                }
                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };
                match field.text().await {
                    Ok(value) => {
                        fields.insert(name, value);
                    }
                    Err(e) => warn!("Skipping multipart field '{}': {}", name, e),
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Stopped reading multipart body: {}", e);
                break;
            }
        }
    }
    FormFields(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(content_type: Option<&str>, body: &str) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/index.php");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn extract(content_type: Option<&str>, body: &str) -> FormFields {
        FormFields::from_request(request(content_type, body), &()).await.unwrap()
    }

    #[tokio::test]
    async fn reads_urlencoded_body() {
        let form = extract(Some("application/x-www-form-urlencoded"), "page=3&login=1").await;
        assert_eq!(form.int("page"), 3);
        assert!(form.flag("login"));
    }

    #[tokio::test]
    async fn reads_multipart_text_fields() {
        let body = concat!(
            "--XYZ\r\n",
            "Content-Disposition: form-data; name=\"page\"\r\n\r\n",
            "4\r\n",
            "--XYZ\r\n",
            "Content-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\n",
            "Content-Type: text/plain\r\n\r\n",
            "ignored\r\n",
            "--XYZ--\r\n",
        );
        let form = extract(Some("multipart/form-data; boundary=XYZ"), body).await;
        assert_eq!(form.int("page"), 4);
        assert_eq!(form.get("upload"), None);
    }

    #[tokio::test]
    async fn other_bodies_yield_no_fields() {
        assert_eq!(extract(None, "").await.int("page"), 0);
        assert_eq!(extract(Some("application/json"), "{\"page\":2}").await.int("page"), 0);
        assert_eq!(extract(Some("multipart/form-data"), "junk").await.int("page"), 0);
    }

    #[test]
    fn numeric_fields_are_sanitized() {
        let form: FormFields = [("page", "2\"><script>"), ("page2", "1337abc"), ("logout", "")]
            .into_iter()
            .collect();
        assert_eq!(form.int("page"), 2);
        assert_eq!(form.int("page2"), 1337);
        assert_eq!(form.int("missing"), 0);
        assert!(!form.flag("logout"));
        assert!(!form.flag("login"));
    }
}
