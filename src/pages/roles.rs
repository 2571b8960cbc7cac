use async_trait::async_trait;
use tracing::warn;

use super::html::escape_html;
use super::PageHandler;
use crate::dispatch::{OverrideRoute, RequestContext};
use crate::error::PageError;
use crate::types::Role;

/// Landing page of one role (pages 1-5)
pub struct RoleMainPage {
    role: Role,
}

impl RoleMainPage {
    pub fn new(role: Role) -> Self {
        Self { role }
    }
}

#[async_trait]
impl PageHandler for RoleMainPage {
    async fn render(&self, ctx: &mut RequestContext<'_>) -> Result<String, PageError> {
        let user = match ctx.session.user() {
            Some(user) => user.clone(),
            None => return Err(PageError::unauthorized("Please log in to continue.")),
        };
        if user.role != self.role {
            warn!(
                "User '{}' ({}) denied access to {} page",
                user.username, user.role, self.role
            );
            return Err(PageError::forbidden("Access denied."));
        }

        let mut html = format!(
            "<div class=\"main\">\n<h2>{} Main</h2>\n<p>Welcome, {}.</p>\n",
            self.role,
            escape_html(&user.username)
        );

        let announcements = ctx.db.announcements(ctx.config.pages.announcement_limit).await?;
        html.push_str("<h3>Announcements</h3>\n");
        if announcements.is_empty() {
            html.push_str("<p>No announcements.</p>\n");
        } else {
            html.push_str("<ul class=\"announcements\">\n");
            for a in &announcements {
                html.push_str(&format!(
                    "<li><strong>{}</strong> <em>{}</em><br>{}</li>\n",
                    escape_html(&a.title),
                    a.posted_on.format("%Y-%m-%d"),
                    escape_html(&a.message)
                ));
            }
            html.push_str("</ul>\n");
        }

        if self.role == Role::Student {
            if let Some(student) = ctx.db.student_for_user(user.user_id).await? {
                let semesters = ctx.db.semesters().await?;
                html.push_str(&report_card_form(student.id, &semesters));
            }
        }

        html.push_str(concat!(
            "<form name=\"logout\" action=\"index.php\" method=\"post\">\n",
            "<input type=\"hidden\" name=\"logout\" value=\"1\">\n",
            "<input type=\"submit\" value=\"Log Out\">\n",
            "</form>\n</div>\n",
        ));
        Ok(html)
    }
}

fn report_card_form(student_id: i64, semesters: &[crate::database::Semester]) -> String {
    let mut html = format!(
        "<h3>Report Card</h3>\n<form name=\"reportcard\" action=\"index.php\" method=\"post\">\n<input type=\"hidden\" name=\"page2\" value=\"{}\">\n<input type=\"hidden\" name=\"studentid\" value=\"{}\">\n<select name=\"semester\">\n",
        OverrideRoute::REPORT_CARDS_PAGE2,
        student_id
    );
    for semester in semesters {
        html.push_str(&format!(
            "<option value=\"{}\">{}</option>\n",
            semester.id,
            escape_html(&semester.title)
        ));
    }
    html.push_str("</select>\n<input type=\"submit\" value=\"View\">\n</form>\n");
    html
}
