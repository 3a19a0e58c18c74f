//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_roles_and_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STUDENT: &str = "student";

/// Seeded primary key of the `admin` role.
pub const ROLE_ADMIN_ID: i64 = 1;

/// Seeded primary key of the `student` role.
pub const ROLE_STUDENT_ID: i64 = 2;

pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_STUDENT];

pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}
