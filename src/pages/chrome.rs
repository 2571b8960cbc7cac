use async_trait::async_trait;

use super::html::{escape_html, DEFAULT_SCHOOL_NAME};
use super::PageHandler;
use crate::dispatch::RequestContext;
use crate::error::PageError;

/// Opens the document and shows the school banner
pub struct Header;

#[async_trait]
impl PageHandler for Header {
    async fn render(&self, ctx: &mut RequestContext<'_>) -> Result<String, PageError> {
        let school = ctx.db.school_info().await?;
        let name = school
            .as_ref()
            .map(|s| s.name.as_str())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_SCHOOL_NAME);
        let name = escape_html(name);

        let mut html = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{name}</title>\n</head>\n<body>\n<div class=\"header\">\n<h1>{name}</h1>\n"
        );
        if let Some(school) = &school {
            let contact: Vec<String> = [school.address.as_deref(), school.phone.as_deref()]
                .into_iter()
                .flatten()
                .filter(|s| !s.trim().is_empty())
                .map(escape_html)
                .collect();
            if !contact.is_empty() {
                html.push_str(&format!("<p class=\"contact\">{}</p>\n", contact.join(" | ")));
            }
        }
        html.push_str("</div>\n<div class=\"content\">\n");
        Ok(html)
    }
}

/// Closes the document
pub struct Footer;

#[async_trait]
impl PageHandler for Footer {
    async fn render(&self, _ctx: &mut RequestContext<'_>) -> Result<String, PageError> {
        Ok(format!(
            "</div>\n<div class=\"footer\">Powered by SchoolMate {}</div>\n</body>\n</html>\n",
            env!("CARGO_PKG_VERSION")
        ))
    }
}
