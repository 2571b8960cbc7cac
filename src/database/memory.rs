//! In-memory school database.
//!
//! Backs the demo mode (`SCHOOLMATE_DATABASE_BACKEND=memory`) and the test
//! suites. The provider counts open handles so callers can check that every
//! request released its connection.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{Announcement, ReportCardRow, SchoolInfo, Semester, StudentRecord, UserRecord};
use super::{ConnectionProvider, SchoolDb};
use crate::auth::{hash_password_with_cost, AuthError, DEMO_HASH_COST};
use crate::types::Role;

#[derive(Debug, Clone)]
pub struct ClassRecord {
    pub id: i64,
    pub title: String,
    pub teacher_name: String,
}

#[derive(Debug, Clone)]
pub struct GradeRecord {
    pub student_id: i64,
    pub class_id: i64,
    pub semester_id: i64,
    pub letter_grade: String,
    pub percentage: Option<f64>,
    pub comment: Option<String>,
}

/// Table contents of the in-memory backend
#[derive(Debug, Clone, Default)]
pub struct SchoolData {
    pub school: Option<SchoolInfo>,
    pub users: Vec<UserRecord>,
    pub announcements: Vec<Announcement>,
    pub semesters: Vec<Semester>,
    pub students: Vec<StudentRecord>,
    pub classes: Vec<ClassRecord>,
    pub grades: Vec<GradeRecord>,
}

impl SchoolData {
    /// Demo school with one account per role; passwords equal usernames
    /// except the admin account `test`/`test`.
    pub fn demo() -> Result<Self, AuthError> {
        let mut data = SchoolData {
            school: Some(SchoolInfo {
                name: "SchoolMate Demo High".to_string(),
                address: Some("1 School Lane".to_string()),
                phone: Some("555-0100".to_string()),
            }),
            ..Default::default()
        };

        data.add_user("test", "test", Role::Admin)?;
        data.add_user("teacher", "teacher", Role::Teacher)?;
        data.add_user("substitute", "substitute", Role::Substitute)?;
        let student = data.add_user("student", "student", Role::Student)?;
        let parent = data.add_user("parent", "parent", Role::Parent)?;

        data.students.push(StudentRecord {
            id: 1,
            user_id: student,
            parent_user_id: Some(parent),
            first_name: "name".to_string(),
            last_name: "surname".to_string(),
        });
        data.semesters.push(Semester { id: 1, title: "semester".to_string() });

        data.classes.push(ClassRecord {
            id: 1,
            title: "Algebra".to_string(),
            teacher_name: "teacher teacher".to_string(),
        });
        data.classes.push(ClassRecord {
            id: 2,
            title: "Biology".to_string(),
            teacher_name: "teacher teacher".to_string(),
        });
        data.grades.push(GradeRecord {
            student_id: 1,
            class_id: 1,
            semester_id: 1,
            letter_grade: "A".to_string(),
            percentage: Some(94.5),
            comment: Some("Excellent work".to_string()),
        });
        data.grades.push(GradeRecord {
            student_id: 1,
            class_id: 2,
            semester_id: 1,
            letter_grade: "B+".to_string(),
            percentage: Some(88.0),
            comment: None,
        });

        if let Some(date) = NaiveDate::from_ymd_opt(2004, 8, 3) {
            data.announcements.push(Announcement {
                id: 1,
                title: "Welcome".to_string(),
                message: "Welcome to SchoolMate.".to_string(),
                posted_on: date,
            });
        }

        Ok(data)
    }

    /// Insert a user and return its id
    pub fn add_user(&mut self, username: &str, password: &str, role: Role) -> Result<i64, AuthError> {
        let password_hash = hash_password_with_cost(password, DEMO_HASH_COST)?;
        let id = self.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        self.users.push(UserRecord {
            id,
            username: username.to_string(),
            password_hash,
            role,
        });
        Ok(id)
    }
}

/// Provider over shared in-memory tables
#[derive(Clone)]
pub struct MemoryConnectionProvider {
    data: Arc<RwLock<SchoolData>>,
    open_handles: Arc<AtomicUsize>,
}

impl MemoryConnectionProvider {
    pub fn new(data: SchoolData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
            open_handles: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn demo() -> Result<Self, AuthError> {
        Ok(Self::new(SchoolData::demo()?))
    }

    /// Handles opened and not yet dropped
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionProvider for MemoryConnectionProvider {
    async fn open(&self) -> Result<Box<dyn SchoolDb>, DatabaseError> {
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySchoolDb {
            data: Arc::clone(&self.data),
            open_handles: Arc::clone(&self.open_handles),
        }))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

pub struct MemorySchoolDb {
    data: Arc<RwLock<SchoolData>>,
    open_handles: Arc<AtomicUsize>,
}

impl Drop for MemorySchoolDb {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SchoolDb for MemorySchoolDb {
    async fn find_user(&mut self, username: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.username == username).cloned())
    }

    async fn school_info(&mut self) -> Result<Option<SchoolInfo>, DatabaseError> {
        Ok(self.data.read().await.school.clone())
    }

    async fn announcements(&mut self, limit: i64) -> Result<Vec<Announcement>, DatabaseError> {
        let data = self.data.read().await;
        let mut rows = data.announcements.clone();
        rows.sort_by(|a, b| b.posted_on.cmp(&a.posted_on).then(b.id.cmp(&a.id)));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn semesters(&mut self) -> Result<Vec<Semester>, DatabaseError> {
        let mut rows = self.data.read().await.semesters.clone();
        rows.sort_by_key(|s| s.id);
        Ok(rows)
    }

    async fn semester(&mut self, semester_id: i64) -> Result<Option<Semester>, DatabaseError> {
        let data = self.data.read().await;
        Ok(data.semesters.iter().find(|s| s.id == semester_id).cloned())
    }

    async fn student(&mut self, student_id: i64) -> Result<Option<StudentRecord>, DatabaseError> {
        let data = self.data.read().await;
        Ok(data.students.iter().find(|s| s.id == student_id).cloned())
    }

    async fn student_for_user(&mut self, user_id: i64) -> Result<Option<StudentRecord>, DatabaseError> {
        let data = self.data.read().await;
        Ok(data.students.iter().find(|s| s.user_id == user_id).cloned())
    }

    async fn report_card_rows(
        &mut self,
        student_id: i64,
        semester_id: i64,
    ) -> Result<Vec<ReportCardRow>, DatabaseError> {
        let data = self.data.read().await;
        let mut rows: Vec<ReportCardRow> = data
            .grades
            .iter()
            .filter(|g| g.student_id == student_id && g.semester_id == semester_id)
            .filter_map(|g| {
                let class = data.classes.iter().find(|c| c.id == g.class_id)?;
                Some(ReportCardRow {
                    class_title: class.title.clone(),
                    teacher_name: class.teacher_name.clone(),
                    letter_grade: g.letter_grade.clone(),
                    percentage: g.percentage,
                    comment: g.comment.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| a.class_title.cmp(&b.class_title));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handles_are_counted_until_dropped() {
        let provider = MemoryConnectionProvider::demo().unwrap();
        let first = provider.open().await.unwrap();
        let second = provider.open().await.unwrap();
        assert_eq!(provider.open_handles(), 2);
        drop(first);
        assert_eq!(provider.open_handles(), 1);
        drop(second);
        assert_eq!(provider.open_handles(), 0);
    }

    #[tokio::test]
    async fn demo_data_has_one_account_per_role() {
        let provider = MemoryConnectionProvider::demo().unwrap();
        let mut db = provider.open().await.unwrap();
        for (username, role) in [
            ("test", Role::Admin),
            ("teacher", Role::Teacher),
            ("substitute", Role::Substitute),
            ("student", Role::Student),
            ("parent", Role::Parent),
        ] {
            let user = db.find_user(username).await.unwrap().expect(username);
            assert_eq!(user.role, role);
        }
        assert!(db.find_user("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn demo_passwords_are_salted_hashes() {
        let provider = MemoryConnectionProvider::demo().unwrap();
        let mut db = provider.open().await.unwrap();
        let teacher = db.find_user("teacher").await.unwrap().unwrap();
        let parent = db.find_user("parent").await.unwrap().unwrap();
        assert_ne!(teacher.password_hash, "teacher");
        assert!(crate::auth::verify_password("teacher", &teacher.password_hash));
        assert!(!crate::auth::verify_password("parent", &teacher.password_hash));
        assert!(crate::auth::verify_password("parent", &parent.password_hash));
    }

    #[tokio::test]
    async fn report_card_rows_are_sorted_by_class() {
        let provider = MemoryConnectionProvider::demo().unwrap();
        let mut db = provider.open().await.unwrap();
        let rows = db.report_card_rows(1, 1).await.unwrap();
        let titles: Vec<&str> = rows.iter().map(|r| r.class_title.as_str()).collect();
        assert_eq!(titles, vec!["Algebra", "Biology"]);
        assert!(db.report_card_rows(1, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn announcements_respect_limit() {
        let provider = MemoryConnectionProvider::demo().unwrap();
        let mut db = provider.open().await.unwrap();
        assert_eq!(db.announcements(10).await.unwrap().len(), 1);
        assert!(db.announcements(0).await.unwrap().is_empty());
        assert!(db.announcements(-1).await.unwrap().is_empty());
    }
}
