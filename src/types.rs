/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// User roles known to SchoolMate.
/// Stored in the `users.role` column using the names returned by `as_str`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Teacher,
    Substitute,
    Student,
    Parent,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Teacher,
        Role::Substitute,
        Role::Student,
        Role::Parent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Teacher => "Teacher",
            Role::Substitute => "Substitute",
            Role::Student => "Student",
            Role::Parent => "Parent",
        }
    }

    /// Page code of the role's landing page.
    pub fn page_code(&self) -> i64 {
        match self {
            Role::Admin => 1,
            Role::Teacher => 2,
            Role::Substitute => 3,
            Role::Student => 4,
            Role::Parent => 5,
        }
    }

    /// Staff roles may read any student's records.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Teacher | Role::Substitute)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown role '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_role_names_case_insensitively() {
        assert_eq!("teacher".parse::<Role>(), Ok(Role::Teacher));
        assert_eq!(" Parent ".parse::<Role>(), Ok(Role::Parent));
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn page_codes_cover_one_through_five() {
        let codes: Vec<i64> = Role::ALL.iter().map(Role::page_code).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5]);
    }
}
