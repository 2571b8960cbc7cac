pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::{MemoryConnectionProvider, SchoolData};
pub use models::{Announcement, ReportCardRow, SchoolInfo, Semester, StudentRecord, UserRecord};
pub use postgres::PgConnectionProvider;

/// Opens request-scoped database handles.
///
/// A handle returned by `open` belongs to exactly one request and is released
/// when it is dropped, whichever way the request finishes.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn open(&self) -> Result<Box<dyn SchoolDb>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Queries the page handlers run against a request-scoped handle.
#[async_trait]
pub trait SchoolDb: Send {
    async fn find_user(&mut self, username: &str) -> Result<Option<UserRecord>, DatabaseError>;

    async fn school_info(&mut self) -> Result<Option<SchoolInfo>, DatabaseError>;

    /// Newest first
    async fn announcements(&mut self, limit: i64) -> Result<Vec<Announcement>, DatabaseError>;

    async fn semesters(&mut self) -> Result<Vec<Semester>, DatabaseError>;

    async fn semester(&mut self, semester_id: i64) -> Result<Option<Semester>, DatabaseError>;

    async fn student(&mut self, student_id: i64) -> Result<Option<StudentRecord>, DatabaseError>;

    async fn student_for_user(&mut self, user_id: i64) -> Result<Option<StudentRecord>, DatabaseError>;

    /// Ordered by class title
    async fn report_card_rows(
        &mut self,
        student_id: i64,
        semester_id: i64,
    ) -> Result<Vec<ReportCardRow>, DatabaseError>;
}
