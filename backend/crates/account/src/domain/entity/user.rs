//! User Entity
//!
//! Identity record: who the user is and how they authenticate.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email, leetcode_name::LeetcodeName, user_id::UserId, user_name::UserName,
    user_password::UserPassword,
};

/// User entity
///
/// `user_id` never changes. `email`, `user_name` and `leetcode_name` are each
/// unique across all users.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub email: Email,
    pub user_name: UserName,
    pub leetcode_name: Option<LeetcodeName>,
    pub password: UserPassword,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: Email,
        user_name: UserName,
        leetcode_name: Option<LeetcodeName>,
        password: UserPassword,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            email,
            user_name,
            leetcode_name,
            password,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a profile patch, bumping `updated_at` if anything changed
    pub fn apply_patch(&mut self, patch: &UserPatch, now: DateTime<Utc>) {
        let mut changed = false;

        if let Some(email) = &patch.email {
            if *email != self.email {
                self.email = email.clone();
                changed = true;
            }
        }

        if let Some(user_name) = &patch.user_name {
            if user_name.original() != self.user_name.original() {
                self.user_name = user_name.clone();
                changed = true;
            }
        }

        if let Some(leetcode_name) = &patch.leetcode_name {
            if self.leetcode_name.as_ref() != Some(leetcode_name) {
                self.leetcode_name = Some(leetcode_name.clone());
                changed = true;
            }
        }

        if changed {
            self.updated_at = now;
        }
    }

    pub fn set_password(&mut self, password: UserPassword) {
        self.password = password;
        self.updated_at = Utc::now();
    }
}

/// Partial profile update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<Email>,
    pub user_name: Option<UserName>,
    pub leetcode_name: Option<LeetcodeName>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.user_name.is_none() && self.leetcode_name.is_none()
    }

    /// Email to re-check for uniqueness (set and different from current)
    pub fn changed_email<'a>(&'a self, current: &User) -> Option<&'a Email> {
        self.email.as_ref().filter(|e| **e != current.email)
    }

    /// User name to re-check for uniqueness (canonical form differs)
    pub fn changed_user_name<'a>(&'a self, current: &User) -> Option<&'a UserName> {
        self.user_name
            .as_ref()
            .filter(|n| n.canonical() != current.user_name.canonical())
    }

    /// LeetCode name to re-check for uniqueness (canonical form differs)
    pub fn changed_leetcode_name<'a>(&'a self, current: &User) -> Option<&'a LeetcodeName> {
        self.leetcode_name.as_ref().filter(|n| {
            current
                .leetcode_name
                .as_ref()
                .is_none_or(|c| c.canonical() != n.canonical())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::HashParams;

    use crate::domain::value_object::user_password::RawPassword;

    fn user() -> User {
        let raw = RawPassword::new("pw123456".to_string()).unwrap();
        let password = UserPassword::from_raw(&raw, &HashParams::new(1, 1024, 1), None).unwrap();
        User::new(
            Email::new("a@x.com").unwrap(),
            UserName::new("alice").unwrap(),
            None,
            password,
        )
    }

    #[test]
    fn test_patch_same_values_is_not_a_change() {
        let mut u = user();
        let before = u.updated_at;
        let patch = UserPatch {
            email: Some(Email::new("A@X.com").unwrap()),
            user_name: Some(UserName::new("alice").unwrap()),
            leetcode_name: None,
        };

        assert!(patch.changed_email(&u).is_none());
        assert!(patch.changed_user_name(&u).is_none());

        u.apply_patch(&patch, before + chrono::Duration::seconds(5));
        assert_eq!(u.updated_at, before);
    }

    #[test]
    fn test_patch_case_change_keeps_uniqueness_key() {
        let u = user();
        let patch = UserPatch {
            user_name: Some(UserName::new("Alice").unwrap()),
            ..Default::default()
        };
        // Display form changes, canonical form does not
        assert!(patch.changed_user_name(&u).is_none());
    }

    #[test]
    fn test_patch_applies_changes() {
        let mut u = user();
        let later = u.updated_at + chrono::Duration::seconds(5);
        let patch = UserPatch {
            email: Some(Email::new("b@x.com").unwrap()),
            user_name: None,
            leetcode_name: Some(LeetcodeName::new("alice_lc").unwrap()),
        };

        assert!(patch.changed_email(&u).is_some());
        assert!(patch.changed_leetcode_name(&u).is_some());

        u.apply_patch(&patch, later);
        assert_eq!(u.email.as_str(), "b@x.com");
        assert_eq!(u.leetcode_name.as_ref().unwrap().original(), "alice_lc");
        assert_eq!(u.user_name.original(), "alice");
        assert_eq!(u.updated_at, later);
    }
}
