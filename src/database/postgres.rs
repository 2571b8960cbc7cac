use async_trait::async_trait;
use sqlx::{pool::PoolConnection, Postgres, Row};
use tracing::{debug, error};

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{Announcement, ReportCardRow, SchoolInfo, Semester, StudentRecord, UserRecord};
use super::{ConnectionProvider, SchoolDb};
use crate::types::Role;

/// Hands out pooled Postgres connections, one per request
#[derive(Clone)]
pub struct PgConnectionProvider {
    manager: DatabaseManager,
}

impl PgConnectionProvider {
    pub fn new(manager: DatabaseManager) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl ConnectionProvider for PgConnectionProvider {
    async fn open(&self) -> Result<Box<dyn SchoolDb>, DatabaseError> {
        let conn = self.manager.pool().acquire().await.map_err(|e| {
            error!("Failed to acquire database connection: {}", e);
            DatabaseError::Sqlx(e)
        })?;
        debug!("Acquired database connection");
        Ok(Box::new(PgSchoolDb { conn }))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.manager.health_check().await
    }
}

/// Request-scoped handle; the connection returns to the pool on drop
pub struct PgSchoolDb {
    conn: PoolConnection<Postgres>,
}

impl Drop for PgSchoolDb {
    fn drop(&mut self) {
        debug!("Released database connection");
    }
}

#[async_trait]
impl SchoolDb for PgSchoolDb {
    async fn find_user(&mut self, username: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let row = sqlx::query("SELECT id, username, password_hash, role FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut *self.conn)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let role: String = row.try_get("role")?;
        let role = role
            .parse::<Role>()
            .map_err(|e| DatabaseError::QueryError(format!("users.role: {}", e)))?;

        Ok(Some(UserRecord {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            role,
        }))
    }

    async fn school_info(&mut self) -> Result<Option<SchoolInfo>, DatabaseError> {
        let info = sqlx::query_as::<_, SchoolInfo>("SELECT name, address, phone FROM school_info WHERE id = 1")
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(info)
    }

    async fn announcements(&mut self, limit: i64) -> Result<Vec<Announcement>, DatabaseError> {
        let rows = sqlx::query_as::<_, Announcement>(
            r#"
            SELECT id, title, message, posted_on
            FROM announcements
            ORDER BY posted_on DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows)
    }

    async fn semesters(&mut self) -> Result<Vec<Semester>, DatabaseError> {
        let rows = sqlx::query_as::<_, Semester>("SELECT id, title FROM semesters ORDER BY id")
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows)
    }

    async fn semester(&mut self, semester_id: i64) -> Result<Option<Semester>, DatabaseError> {
        let row = sqlx::query_as::<_, Semester>("SELECT id, title FROM semesters WHERE id = $1")
            .bind(semester_id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(row)
    }

    async fn student(&mut self, student_id: i64) -> Result<Option<StudentRecord>, DatabaseError> {
        let row = sqlx::query_as::<_, StudentRecord>(
            "SELECT id, user_id, parent_user_id, first_name, last_name FROM students WHERE id = $1",
        )
        .bind(student_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(row)
    }

    async fn student_for_user(&mut self, user_id: i64) -> Result<Option<StudentRecord>, DatabaseError> {
        let row = sqlx::query_as::<_, StudentRecord>(
            "SELECT id, user_id, parent_user_id, first_name, last_name FROM students WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(row)
    }

    async fn report_card_rows(
        &mut self,
        student_id: i64,
        semester_id: i64,
    ) -> Result<Vec<ReportCardRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ReportCardRow>(
            r#"
            SELECT
                c.title AS class_title,
                c.teacher_name,
                g.letter_grade,
                g.percentage,
                g.comment
            FROM grades g
            JOIN classes c ON c.id = g.class_id
            WHERE g.student_id = $1
            AND g.semester_id = $2
            ORDER BY c.title
            "#,
        )
        .bind(student_id)
        .bind(semester_id)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows)
    }
}
