use std::sync::Arc;

use crate::pages::PageHandler;
use crate::types::Role;

/// Menu routes selected by the `page` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    AdminMain,
    TeacherMain,
    SubstituteMain,
    StudentMain,
    ParentMain,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Login,
        Route::AdminMain,
        Route::TeacherMain,
        Route::SubstituteMain,
        Route::StudentMain,
        Route::ParentMain,
    ];

    pub fn from_page_code(page: i64) -> Option<Route> {
        match page {
            0 => Some(Route::Login),
            1 => Some(Route::AdminMain),
            2 => Some(Route::TeacherMain),
            3 => Some(Route::SubstituteMain),
            4 => Some(Route::StudentMain),
            5 => Some(Route::ParentMain),
            _ => None,
        }
    }

    pub fn page_code(&self) -> i64 {
        match self {
            Route::Login => 0,
            Route::AdminMain => 1,
            Route::TeacherMain => 2,
            Route::SubstituteMain => 3,
            Route::StudentMain => 4,
            Route::ParentMain => 5,
        }
    }

    /// Landing page of a role
    pub fn for_role(role: Role) -> Route {
        match role {
            Role::Admin => Route::AdminMain,
            Role::Teacher => Route::TeacherMain,
            Role::Substitute => Route::SubstituteMain,
            Role::Student => Route::StudentMain,
            Role::Parent => Route::ParentMain,
        }
    }

    /// Role a route belongs to; the login page belongs to nobody
    pub fn role(&self) -> Option<Role> {
        match self {
            Route::Login => None,
            Route::AdminMain => Some(Role::Admin),
            Route::TeacherMain => Some(Role::Teacher),
            Route::SubstituteMain => Some(Role::Substitute),
            Route::StudentMain => Some(Role::Student),
            Route::ParentMain => Some(Role::Parent),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::AdminMain => "AdminMain",
            Route::TeacherMain => "TeacherMain",
            Route::SubstituteMain => "SubstituteMain",
            Route::StudentMain => "StudentMain",
            Route::ParentMain => "ParentMain",
        }
    }
}

/// Routes reached through `page2`, outside the menu and the page chrome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverrideRoute {
    ReportCards,
}

impl OverrideRoute {
    /// `page2` value selecting the report-card generator
    pub const REPORT_CARDS_PAGE2: i64 = 1337;

    pub fn from_page2(page2: i64) -> Option<OverrideRoute> {
        match page2 {
            Self::REPORT_CARDS_PAGE2 => Some(OverrideRoute::ReportCards),
            _ => None,
        }
    }
}

/// One handler per menu route
#[derive(Clone)]
pub struct RouteTable {
    pub login: Arc<dyn PageHandler>,
    pub admin: Arc<dyn PageHandler>,
    pub teacher: Arc<dyn PageHandler>,
    pub substitute: Arc<dyn PageHandler>,
    pub student: Arc<dyn PageHandler>,
    pub parent: Arc<dyn PageHandler>,
}

impl RouteTable {
    pub fn handler(&self, route: Route) -> &Arc<dyn PageHandler> {
        match route {
            Route::Login => &self.login,
            Route::AdminMain => &self.admin,
            Route::TeacherMain => &self.teacher,
            Route::SubstituteMain => &self.substitute,
            Route::StudentMain => &self.student,
            Route::ParentMain => &self.parent,
        }
    }
}
