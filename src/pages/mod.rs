// pages/mod.rs - Page handlers invoked by the dispatcher
//
// Each handler renders one HTML fragment from the request context. The
// dispatcher decides which ones run and in which order; handlers never call
// each other.

use async_trait::async_trait;
use std::sync::Arc;

use crate::dispatch::{RequestContext, RouteTable};
use crate::error::PageError;
use crate::types::Role;

pub mod chrome;
pub mod html;
pub mod login;
pub mod report_cards;
pub mod roles;

pub use chrome::{Footer, Header};
pub use login::{CredentialValidator, LoginPage};
pub use report_cards::ReportCardPage;
pub use roles::RoleMainPage;

/// Renders one fragment of the response
#[async_trait]
pub trait PageHandler: Send + Sync {
    async fn render(&self, ctx: &mut RequestContext<'_>) -> Result<String, PageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(Role),
    Rejected,
}

/// Checks submitted credentials and records the user in the session
#[async_trait]
pub trait LoginValidator: Send + Sync {
    async fn validate(&self, ctx: &mut RequestContext<'_>) -> Result<LoginOutcome, PageError>;
}

/// Everything the dispatcher delegates to
#[derive(Clone)]
pub struct Collaborators {
    pub header: Arc<dyn PageHandler>,
    pub footer: Arc<dyn PageHandler>,
    pub login_validator: Arc<dyn LoginValidator>,
    pub report_cards: Arc<dyn PageHandler>,
    pub routes: RouteTable,
}

impl Collaborators {
    /// The SchoolMate pages
    pub fn standard() -> Self {
        Self {
            header: Arc::new(Header),
            footer: Arc::new(Footer),
            login_validator: Arc::new(CredentialValidator),
            report_cards: Arc::new(ReportCardPage),
            routes: RouteTable {
                login: Arc::new(LoginPage),
                admin: Arc::new(RoleMainPage::new(Role::Admin)),
                teacher: Arc::new(RoleMainPage::new(Role::Teacher)),
                substitute: Arc::new(RoleMainPage::new(Role::Substitute)),
                student: Arc::new(RoleMainPage::new(Role::Student)),
                parent: Arc::new(RoleMainPage::new(Role::Parent)),
            },
        }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::standard()
    }
}
