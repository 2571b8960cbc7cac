use async_trait::async_trait;
use tracing::{info, warn};

use super::html::{escape_html, DEFAULT_SCHOOL_NAME};
use super::PageHandler;
use crate::database::{ReportCardRow, Semester, StudentRecord};
use crate::dispatch::RequestContext;
use crate::error::PageError;
use crate::session::SessionUser;
use crate::types::Role;

/// Report-card generator reached through the `page2` override route.
///
/// Produces a complete document of its own; the site header and footer are
/// never added around it.
pub struct ReportCardPage;

#[async_trait]
impl PageHandler for ReportCardPage {
    async fn render(&self, ctx: &mut RequestContext<'_>) -> Result<String, PageError> {
        let user = ctx
            .session
            .user()
            .cloned()
            .ok_or_else(|| PageError::unauthorized("Please log in to view report cards."))?;

        let student_id = ctx.form.int("studentid");
        let semester_id = ctx.form.int("semester");

        // Non-staff get the same answer for a missing student and someone else's
        let student = match ctx.db.student(student_id).await? {
            Some(student) if may_view(&user, &student) => student,
            None if user.role.is_staff() => return Err(PageError::not_found("Student not found.")),
            _ => {
                warn!(
                    "User '{}' ({}) denied report card of student {}",
                    user.username, user.role, student_id
                );
                return Err(PageError::forbidden("You may not view this report card."));
            }
        };

        let semester = ctx
            .db
            .semester(semester_id)
            .await?
            .ok_or_else(|| PageError::not_found("Semester not found."))?;

        let rows = ctx.db.report_card_rows(student.id, semester.id).await?;
        let school = ctx
            .db
            .school_info()
            .await?
            .map(|s| s.name)
            .unwrap_or_else(|| DEFAULT_SCHOOL_NAME.to_string());

        info!(
            "User '{}' generated report card for student {} semester {}",
            user.username, student.id, semester.id
        );
        Ok(render_document(&school, &student, &semester, &rows))
    }
}

/// Staff see everyone, students themselves, parents their children
fn may_view(user: &SessionUser, student: &StudentRecord) -> bool {
    match user.role {
        role if role.is_staff() => true,
        Role::Student => student.user_id == user.user_id,
        Role::Parent => student.parent_user_id == Some(user.user_id),
        _ => false,
    }
}

fn render_document(school: &str, student: &StudentRecord, semester: &Semester, rows: &[ReportCardRow]) -> String {
    let school = escape_html(school);
    let name = escape_html(&student.full_name());
    let term = escape_html(&semester.title);

    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Report Card - {name}</title>\n</head>\n<body class=\"reportcard\">\n<h1>{school}</h1>\n<h2>Report Card</h2>\n<p>Student: {name}<br>Semester: {term}</p>\n"
    );

    if rows.is_empty() {
        html.push_str("<p>No grades recorded for this semester.</p>\n");
    } else {
        html.push_str("<table>\n<tr><th>Class</th><th>Teacher</th><th>Grade</th><th>Percent</th><th>Comment</th></tr>\n");
        for row in rows {
            let percent = row
                .percentage
                .map(|p| format!("{:.1}%", p))
                .unwrap_or_default();
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&row.class_title),
                escape_html(&row.teacher_name),
                escape_html(&row.letter_grade),
                percent,
                escape_html(row.comment.as_deref().unwrap_or(""))
            ));
        }
        html.push_str("</table>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}
