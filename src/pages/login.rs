use async_trait::async_trait;
use tracing::{info, warn};

use super::html::escape_html;
use super::{LoginOutcome, LoginValidator, PageHandler};
use crate::auth::verify_password;
use crate::dispatch::RequestContext;
use crate::error::PageError;
use crate::session::SessionUser;

/// Login form (page 0)
pub struct LoginPage;

#[async_trait]
impl PageHandler for LoginPage {
    async fn render(&self, ctx: &mut RequestContext<'_>) -> Result<String, PageError> {
        let mut html = String::from("<div class=\"login\">\n<h2>Login</h2>\n");

        if let Some(message) = &ctx.login_error {
            html.push_str(&format!("<p class=\"error\">{}</p>\n", escape_html(message)));
        }

        // Already logged in: offer the way back to the role page
        if let Some(user) = ctx.session.user() {
            html.push_str(&format!(
                "<p>Logged in as {} ({}).</p>\n",
                escape_html(&user.username),
                user.role
            ));
        }

        html.push_str(concat!(
            "<form name=\"login\" action=\"index.php\" method=\"post\">\n",
            "<label>Username <input type=\"text\" name=\"username\"></label>\n",
            "<label>Password <input type=\"password\" name=\"password\"></label>\n",
            "<input type=\"hidden\" name=\"login\" value=\"1\">\n",
            "<input type=\"hidden\" name=\"page\" value=\"0\">\n",
            "<input type=\"submit\" value=\"Login\">\n",
            "</form>\n</div>\n",
        ));
        Ok(html)
    }
}

/// Checks `username`/`password` against the `users` table
pub struct CredentialValidator;

#[async_trait]
impl LoginValidator for CredentialValidator {
    async fn validate(&self, ctx: &mut RequestContext<'_>) -> Result<LoginOutcome, PageError> {
        let username = ctx.form.get("username").unwrap_or("").trim();
        let password = ctx.form.get("password").unwrap_or("");

        if username.is_empty() || password.is_empty() {
            warn!("Login rejected: missing username or password");
            return Ok(LoginOutcome::Rejected);
        }

        let user = match ctx.db.find_user(username).await? {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                warn!("Login rejected for user '{}'", username);
                return Ok(LoginOutcome::Rejected);
            }
        };

        info!("User '{}' logged in as {}", user.username, user.role);
        ctx.session.login(SessionUser {
            user_id: user.id,
            username: user.username,
            role: user.role,
        });
        Ok(LoginOutcome::Authenticated(user.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::{ConnectionProvider, MemoryConnectionProvider};
    use crate::dispatch::FormFields;
    use crate::session::{MemorySessionStore, Session};
    use crate::types::Role;
    use chrono::Duration;

    async fn validate(fields: &[(&str, &str)]) -> (LoginOutcome, Session) {
        let provider = MemoryConnectionProvider::demo().unwrap();
        let store = MemorySessionStore::new();
        let config = AppConfig::in_memory();
        let form: FormFields = fields.iter().copied().collect();
        let mut session = Session::start(&store, None, Duration::minutes(5)).await.unwrap();
        let mut db = provider.open().await.unwrap();
        let outcome = {
            let mut ctx = RequestContext {
                form: &form,
                session: &mut session,
                db: db.as_mut(),
                config: &config,
                login_error: None,
            };
            let outcome = CredentialValidator.validate(&mut ctx).await.unwrap();
            outcome
        };
        (outcome, session)
    }

    #[tokio::test]
    async fn accepts_demo_accounts() {
        let (outcome, session) = validate(&[("username", "teacher"), ("password", "teacher")]).await;
        assert_eq!(outcome, LoginOutcome::Authenticated(Role::Teacher));
        let user = session.user().unwrap();
        assert_eq!(user.username, "teacher");
        assert_eq!(user.role, Role::Teacher);
    }

    #[tokio::test]
    async fn rejects_wrong_password_and_unknown_user() {
        for fields in [
            [("username", "teacher"), ("password", "nope")],
            [("username", "ghost"), ("password", "ghost")],
            [("username", ""), ("password", "teacher")],
            [("username", "teacher"), ("password", "")],
        ] {
            let (outcome, session) = validate(&fields).await;
            assert_eq!(outcome, LoginOutcome::Rejected);
            assert!(session.user().is_none());
        }
    }

    #[tokio::test]
    async fn injected_username_is_just_a_miss() {
        let (outcome, _) = validate(&[("username", "' OR '1'='1"), ("password", "x")]).await;
        assert_eq!(outcome, LoginOutcome::Rejected);
    }
}
