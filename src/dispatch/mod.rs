//! Front controller.
//!
//! One call to [`Dispatcher::dispatch`] handles one request: it opens the
//! request's database handle, checks the `page2` override, then runs the
//! normal flow of header, login/logout side effects, one menu route and
//! footer. The database handle lives in a local binding and is released when
//! the call returns, on every path.

pub mod form;
pub mod routes;

use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::database::{ConnectionProvider, SchoolDb};
use crate::error::PageError;
use crate::pages::{Collaborators, LoginOutcome};
use crate::session::Session;

pub use form::FormFields;
pub use routes::{OverrideRoute, Route, RouteTable};

/// Everything a page handler may touch while serving one request
pub struct RequestContext<'a> {
    pub form: &'a FormFields,
    pub session: &'a mut Session,
    pub db: &'a mut dyn SchoolDb,
    pub config: &'a AppConfig,
    /// Message for the login page after a rejected login
    pub login_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Header,
    Body(Route),
    Footer,
    ReportCards,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    pub html: String,
}

/// Output of one dispatch, in emission order
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub status: StatusCode,
    pub sections: Vec<Section>,
}

impl RenderedPage {
    fn new() -> Self {
        Self {
            status: StatusCode::OK,
            sections: Vec::new(),
        }
    }

    fn push(&mut self, kind: SectionKind, html: String) {
        self.sections.push(Section { kind, html });
    }

    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }

    pub fn html(&self) -> String {
        self.sections.iter().map(|s| s.html.as_str()).collect()
    }
}

pub struct Dispatcher {
    collaborators: Collaborators,
    config: Arc<AppConfig>,
}

impl Dispatcher {
    pub fn new(collaborators: Collaborators, config: Arc<AppConfig>) -> Self {
        Self { collaborators, config }
    }

    pub async fn dispatch(
        &self,
        provider: &dyn ConnectionProvider,
        session: &mut Session,
        form: &FormFields,
    ) -> Result<RenderedPage, PageError> {
        let mut db = provider.open().await?;
        let mut ctx = RequestContext {
            form,
            session,
            db: db.as_mut(),
            config: &self.config,
            login_error: None,
        };

        let page2 = form.int("page2");
        if let Some(route) = OverrideRoute::from_page2(page2) {
            if self.config.routes.enable_report_card_override {
                return Ok(self.dispatch_override(route, &mut ctx).await);
            }
            warn!("Override route {:?} requested while disabled", route);
        }

        self.dispatch_menu(&mut ctx).await
    }

    async fn dispatch_override(&self, route: OverrideRoute, ctx: &mut RequestContext<'_>) -> RenderedPage {
        let mut page = RenderedPage::new();
        match route {
            OverrideRoute::ReportCards => {
                debug!("Dispatching override route {:?}", route);
                match self.collaborators.report_cards.render(ctx).await {
                    Ok(html) => page.push(SectionKind::ReportCards, html),
                    Err(e) => {
                        page.status = e.status_code();
                        page.push(SectionKind::ReportCards, e.to_document_html());
                    }
                }
            }
        }
        page
    }

    async fn dispatch_menu(&self, ctx: &mut RequestContext<'_>) -> Result<RenderedPage, PageError> {
        let mut page = RenderedPage::new();

        let header = self.collaborators.header.render(ctx).await?;
        page.push(SectionKind::Header, header);

        let mut page_code = ctx.form.int("page");

        if ctx.form.flag("login") {
            match self.collaborators.login_validator.validate(ctx).await? {
                LoginOutcome::Authenticated(role) => {
                    page_code = Route::for_role(role).page_code();
                }
                LoginOutcome::Rejected => {
                    ctx.login_error = Some("Invalid username or password".to_string());
                    page_code = Route::Login.page_code();
                }
            }
        }

        if ctx.form.flag("logout") {
            if let Some(user) = ctx.session.user() {
                info!("User '{}' logged out", user.username);
            }
            ctx.session.destroy();
            page_code = Route::Login.page_code();
        }

        match Route::from_page_code(page_code) {
            Some(route) => {
                debug!("Dispatching page {} to {}", page_code, route.name());
                let handler = self.collaborators.routes.handler(route);
                match handler.render(ctx).await {
                    Ok(body) => page.push(SectionKind::Body(route), body),
                    Err(e) => {
                        page.status = e.status_code();
                        page.push(SectionKind::Body(route), e.to_notice_html());
                    }
                }
            }
            None => {
                debug!("No route for page {}", page_code);
                page.status = StatusCode::NOT_FOUND;
            }
        }

        let footer = self.collaborators.footer.render(ctx).await?;
        page.push(SectionKind::Footer, footer);

        Ok(page)
    }
}
