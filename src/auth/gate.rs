//! Authorization decisions.
//!
//! `authorize` is pure: handlers gather whatever facts an action needs
//! (target role, current super-admin count) and ask for a verdict before
//! touching a store. The stores enforce the super-admin invariant again
//! inside their own transactions.

use crate::database::models::Role;

/// The authenticated principal making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<'a> {
    /// List, view, create, update or delete teams.
    ManageTeams,
    /// Add, remove or re-permission team members.
    ManageTeamMembers,
    /// Enter user administration at all: listing, or before looking up a target.
    AdministerUsers,
    CreateUser,
    ChangeUserRole {
        target_role: Role,
        new_role: Role,
        super_admins: i64,
    },
    DeleteUser {
        target: &'a str,
        target_role: Role,
        super_admins: i64,
    },
    /// For callers that act on an account named in the request. The
    /// `/auth/*` routes read the subject from the token instead.
    ReadProfile {
        subject: &'a str,
    },
    ChangePassword {
        subject: &'a str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    InsufficientRole { required: Role },
    NotSubject,
    SelfDeletion,
    LastSuperAdmin,
}

impl DenyReason {
    pub fn message(&self) -> String {
        match self {
            DenyReason::InsufficientRole { required } => {
                format!("Insufficient permissions: {} role required", required)
            }
            DenyReason::NotSubject => "You can only act on your own account".to_string(),
            DenyReason::SelfDeletion => "Cannot delete your own account".to_string(),
            DenyReason::LastSuperAdmin => "Cannot remove the last super-admin".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(DenyReason),
}

fn require(caller: &Caller, required: Role) -> Verdict {
    if caller.role.satisfies(required) {
        Verdict::Allow
    } else {
        Verdict::Deny(DenyReason::InsufficientRole { required })
    }
}

pub fn authorize(caller: &Caller, action: &Action<'_>) -> Verdict {
    match action {
        Action::ManageTeams | Action::ManageTeamMembers => require(caller, Role::Admin),

        Action::AdministerUsers | Action::CreateUser => require(caller, Role::SuperAdmin),

        Action::ChangeUserRole {
            target_role,
            new_role,
            super_admins,
        } => {
            if let Verdict::Deny(reason) = require(caller, Role::SuperAdmin) {
                return Verdict::Deny(reason);
            }
            let demotes_super_admin =
                *target_role == Role::SuperAdmin && *new_role != Role::SuperAdmin;
            if demotes_super_admin && *super_admins <= 1 {
                return Verdict::Deny(DenyReason::LastSuperAdmin);
            }
            Verdict::Allow
        }

        Action::DeleteUser {
            target,
            target_role,
            super_admins,
        } => {
            if let Verdict::Deny(reason) = require(caller, Role::SuperAdmin) {
                return Verdict::Deny(reason);
            }
            if *target == caller.user_id {
                return Verdict::Deny(DenyReason::SelfDeletion);
            }
            if *target_role == Role::SuperAdmin && *super_admins <= 1 {
                return Verdict::Deny(DenyReason::LastSuperAdmin);
            }
            Verdict::Allow
        }

        Action::ReadProfile { subject } | Action::ChangePassword { subject } => {
            if *subject == caller.user_id {
                Verdict::Allow
            } else {
                Verdict::Deny(DenyReason::NotSubject)
            }
        }
    }
}
