use shared::domain::{Role, User, UserId};
use tracing::debug;

use crate::{demo, store::PostStore};

const AVATAR_BASE: &str = "https://api.dicebear.com/7.x/avataaars/svg";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    pub fn demo() -> Self {
        Self::new(demo::demo_users())
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn get(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| &user.id == id)
    }

    pub fn name_of(&self, id: &UserId) -> Option<&str> {
        self.get(id).map(|user| user.name.as_str())
    }

    /// Appends a placeholder reviewer. The id is the directory size after
    /// the insert, so ids can repeat once users have been removed.
    pub fn add(&mut self) -> &User {
        let n = self.users.len() + 1;
        self.users.push(User {
            id: UserId::new(n.to_string()),
            name: "New User".into(),
            role: Role::Reviewer,
            avatar_url: Some(format!("{AVATAR_BASE}?seed=User{n}")),
        });
        debug!(user = n, "added directory user");
        &self.users[n - 1]
    }

    /// Returns whether a user was removed.
    pub fn remove(&mut self, id: &UserId) -> bool {
        let before = self.users.len();
        self.users.retain(|user| &user.id != id);
        before != self.users.len()
    }

    pub fn set_role(&mut self, id: &UserId, role: Role) -> bool {
        match self.users.iter_mut().find(|user| &user.id == id) {
            Some(user) => {
                user.role = role;
                true
            }
            None => false,
        }
    }
}

/// First letter of each word of the name, e.g. `"SC"` for Sarah Chen.
pub fn initials(user: &User) -> String {
    user.name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect()
}

pub fn contact_email(user: &User) -> String {
    format!("user{}@company.com", user.id)
}

/// Splits a comma separated keyword list, trimming each entry and dropping
/// blanks.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}

/// Puts the demo posts back, discarding every local edit.
pub fn reset_demo_data(store: &mut PostStore) {
    store.reset(demo::demo_posts());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Session;
    use shared::domain::{PostId, Status};

    #[test]
    fn add_uses_next_id_and_seeded_avatar() {
        let mut directory = UserDirectory::demo();
        let user = directory.add().clone();

        assert_eq!(user.id.as_str(), "5");
        assert_eq!(user.name, "New User");
        assert_eq!(user.role, Role::Reviewer);
        assert_eq!(
            user.avatar_url.as_deref(),
            Some("https://api.dicebear.com/7.x/avataaars/svg?seed=User5")
        );
        assert_eq!(directory.users().len(), 5);
    }

    #[test]
    fn remove_and_role_changes_report_misses() {
        let mut directory = UserDirectory::demo();

        assert!(directory.set_role(&"3".into(), Role::Admin));
        assert_eq!(directory.get(&"3".into()).map(|u| u.role), Some(Role::Admin));
        assert!(directory.remove(&"2".into()));
        assert!(!directory.remove(&"2".into()));
        assert!(!directory.set_role(&"2".into(), Role::Admin));
        assert_eq!(directory.name_of(&"2".into()), None);
        assert_eq!(directory.name_of(&"4".into()), Some("David Park"));
    }

    #[test]
    fn initials_and_email() {
        let directory = UserDirectory::demo();
        let sarah = directory.get(&"1".into()).expect("user");
        assert_eq!(initials(sarah), "SC");
        assert_eq!(contact_email(sarah), "user1@company.com");
    }

    #[test]
    fn keywords_are_trimmed_and_blanks_dropped() {
        assert_eq!(
            parse_keywords(" relapse, ,panic attack,, therapy cost "),
            vec!["relapse", "panic attack", "therapy cost"]
        );
        assert!(parse_keywords(" , ").is_empty());
    }

    #[test]
    fn reset_demo_data_discards_edits() {
        let mut store = PostStore::demo(Session::new("1"));
        store.set_status(&PostId::from("1"), Status::Converted);

        reset_demo_data(&mut store);

        assert_eq!(store.posts(), demo::demo_posts().as_slice());
    }
}
