use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Role;

/// Row of the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    /// Lowercase hex SHA-256 of the password
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SchoolInfo {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub posted_on: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Semester {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentRecord {
    pub id: i64,
    pub user_id: i64,
    pub parent_user_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
}

impl StudentRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One class line on a report card.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReportCardRow {
    pub class_title: String,
    pub teacher_name: String,
    pub letter_grade: String,
    pub percentage: Option<f64>,
    pub comment: Option<String>,
}
