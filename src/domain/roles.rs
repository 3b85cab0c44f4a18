//! Role-based access rules.
//!
//! The gates are pure functions over an explicit [`Requester`] so they can be
//! unit-tested without any HTTP or database machinery. Handlers resolve the
//! requester from the bearer token and call the gate that matches the
//! resource.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Moderator,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The authenticated identity a permission check runs against.
#[derive(Debug, Clone, Copy)]
pub struct Requester {
    pub user_id: i32,
    pub role: Role,
    pub is_superuser: bool,
}

impl Requester {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin) || self.is_superuser
    }

    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self.role, Role::Moderator) || self.is_admin()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    #[must_use]
    pub const fn is_write(self) -> bool {
        !matches!(self, Self::Read)
    }
}

/// Every action requires the admin role (or the superuser flag).
#[must_use]
pub fn admin_only(requester: Option<&Requester>) -> bool {
    requester.is_some_and(Requester::is_admin)
}

/// Reads are open to anyone; writes require admin.
#[must_use]
pub fn admin_or_read_only(requester: Option<&Requester>, action: Action) -> bool {
    if action.is_write() {
        admin_only(requester)
    } else {
        true
    }
}

/// Reads are open to anyone. Create requires any authenticated requester.
/// Update and delete require being the resource author, a moderator, or an
/// admin.
#[must_use]
pub fn author_or_staff_or_read_only(
    requester: Option<&Requester>,
    author_id: i32,
    action: Action,
) -> bool {
    match action {
        Action::Read => true,
        Action::Create => requester.is_some(),
        Action::Update | Action::Delete => {
            requester.is_some_and(|r| r.user_id == author_id || r.is_staff())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn requester(user_id: i32, role: Role) -> Requester {
        Requester {
            user_id,
            role,
            is_superuser: false,
        }
    }

    #[test]
    fn test_admin_only() {
        assert!(!admin_only(None));
        assert!(!admin_only(Some(&requester(1, Role::User))));
        assert!(!admin_only(Some(&requester(1, Role::Moderator))));
        assert!(admin_only(Some(&requester(1, Role::Admin))));

        let superuser = Requester {
            user_id: 1,
            role: Role::User,
            is_superuser: true,
        };
        assert!(admin_only(Some(&superuser)));
    }

    #[test]
    fn test_admin_or_read_only() {
        assert!(admin_or_read_only(None, Action::Read));
        assert!(!admin_or_read_only(None, Action::Create));
        assert!(!admin_or_read_only(
            Some(&requester(1, Role::Moderator)),
            Action::Delete
        ));
        assert!(admin_or_read_only(
            Some(&requester(1, Role::Admin)),
            Action::Create
        ));
    }

    #[test]
    fn test_author_can_edit_own_resource() {
        let author = requester(7, Role::User);
        assert!(author_or_staff_or_read_only(
            Some(&author),
            7,
            Action::Update
        ));
        assert!(author_or_staff_or_read_only(
            Some(&author),
            7,
            Action::Delete
        ));
    }

    #[test]
    fn test_non_author_plain_user_is_rejected() {
        let other = requester(8, Role::User);
        assert!(!author_or_staff_or_read_only(
            Some(&other),
            7,
            Action::Update
        ));
        assert!(!author_or_staff_or_read_only(
            Some(&other),
            7,
            Action::Delete
        ));
        // but reads and creates are fine
        assert!(author_or_staff_or_read_only(Some(&other), 7, Action::Read));
        assert!(author_or_staff_or_read_only(
            Some(&other),
            7,
            Action::Create
        ));
    }

    #[test]
    fn test_staff_can_edit_any_resource() {
        for role in [Role::Moderator, Role::Admin] {
            let staff = requester(99, role);
            assert!(author_or_staff_or_read_only(
                Some(&staff),
                7,
                Action::Update
            ));
            assert!(author_or_staff_or_read_only(
                Some(&staff),
                7,
                Action::Delete
            ));
        }
    }

    #[test]
    fn test_anonymous_read_only() {
        assert!(author_or_staff_or_read_only(None, 7, Action::Read));
        assert!(!author_or_staff_or_read_only(None, 7, Action::Create));
        assert!(!author_or_staff_or_read_only(None, 7, Action::Update));
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::User, Role::Moderator, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("owner".parse::<Role>().is_err());
    }
}
