use crate::core_auth::helper::verify_password;
use serde::{Deserialize, Serialize};

/// A configured account. `root` is the user's jail, relative to the server root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub username: String,
    pub password: String,
    pub root: String,
}

/// The set of users loaded from the configuration. Immutable once loaded.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct UserStore {
    users: Vec<User>,
}

impl UserStore {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    pub fn find(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|user| user.username == username)
    }

    /// Returns the user when `username` exists and `password` matches.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&User> {
        self.find(username)
            .filter(|user| verify_password(password, &user.password))
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> UserStore {
        UserStore::new(vec![
            User {
                username: "alice".into(),
                password: "wonderland".into(),
                root: "/alice".into(),
            },
            User {
                username: "bob".into(),
                password: "builder".into(),
                root: "/bob".into(),
            },
        ])
    }

    #[test]
    fn test_find_is_exact() {
        let store = store();
        assert_eq!(store.find("bob").map(|u| u.root.as_str()), Some("/bob"));
        assert!(store.find("Bob").is_none());
        assert!(store.find("carol").is_none());
    }

    #[test]
    fn test_authenticate() {
        let store = store();
        assert!(store.authenticate("alice", "wonderland").is_some());
        assert!(store.authenticate("alice", "builder").is_none());
        assert!(store.authenticate("carol", "wonderland").is_none());
    }
}
