//! Capability checks for reading a student's data.
//!
//! Authentication happens elsewhere; callers hand in an already-resolved
//! [`Principal`] and the policy decides.

use std::str::FromStr;

use tracing::warn;
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Teacher,
    Parent,
    Student,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "parent" => Ok(Role::Parent),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }
}

pub trait AccessPolicy {
    fn can_view_student(&self, principal: &Principal, student_id: Uuid) -> bool;
}

/// Staff see everyone. Parent accounts are recognised by a `parent_` username
/// prefix. Students see only the record whose id matches their username.
#[derive(Debug, Default, Clone, Copy)]
pub struct RolePolicy;

impl AccessPolicy for RolePolicy {
    fn can_view_student(&self, principal: &Principal, student_id: Uuid) -> bool {
        match principal.role {
            Role::Admin | Role::Teacher => true,
            Role::Parent => principal.username.starts_with("parent_"),
            Role::Student => principal.username == student_id.to_string(),
        }
    }
}

pub fn ensure_can_view_student(
    policy: &impl AccessPolicy,
    principal: &Principal,
    student_id: Uuid,
) -> Result<()> {
    if policy.can_view_student(principal, student_id) {
        return Ok(());
    }

    warn!(user = %principal.username, role = ?principal.role, %student_id, "denied student data access");
    Err(Error::Forbidden(format!(
        "{} may not view data for student {student_id}",
        principal.username
    )))
}
