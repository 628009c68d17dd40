use tracing::{info, warn};

use super::Repository;
use crate::auth::PasswordHash;
use crate::models::{NewUser, Session, UserAccount, UserUpdate};
use crate::seed;
use crate::store;

impl Repository {
    /// Authenticate against the users document as it is on disk right now.
    ///
    /// The in-memory user list is replaced by the fresh read (or by the
    /// built-in administrator when the document is missing, empty or
    /// unreadable). Failure never says whether the username exists.
    pub async fn login(&mut self, username: &str, password: &str) -> bool {
        let users = match self.store.load::<Vec<UserAccount>>(store::USERS).await {
            Ok(Some(users)) if !users.is_empty() => users,
            Ok(_) => self.seed_admin(),
            Err(e) => {
                warn!(error = %e, "users document unreadable; using built-in administrator");
                self.seed_admin()
            }
        };
        self.users = users;

        let matched = self
            .users
            .iter()
            .find(|u| u.matches(username) && u.credential.verify(password))
            .map(|u| (u.username.clone(), u.is_admin));

        match matched {
            Some((name, is_admin)) => {
                self.session = Session {
                    current_user: name,
                    is_admin,
                    is_logged_in: true,
                };
                info!(user = %self.session.current_user, "login succeeded");
                self.log("Login", if is_admin { "admin" } else { "user" });
                true
            }
            None => {
                info!("login rejected");
                false
            }
        }
    }

    /// Reset the session. Persisted data is untouched.
    pub fn logout(&mut self) {
        if self.session.is_logged_in {
            self.log("Logout", "");
        }
        self.session = Session::default();
    }

    fn seed_admin(&self) -> Vec<UserAccount> {
        seed::seed_users(
            &self.auth.admin_username,
            &self.auth.admin_password,
            self.auth.pbkdf2_iterations,
        )
    }

    pub fn user(&self, username: &str) -> Option<&UserAccount> {
        self.users.iter().find(|u| u.matches(username))
    }

    /// Add an account. Returns false, leaving the list untouched, when the
    /// username is blank or already taken (case-insensitive). Not persisted.
    pub fn create_user(&mut self, new_user: NewUser) -> bool {
        let username = new_user.username.trim();
        if username.is_empty() || self.user(username).is_some() {
            return false;
        }
        self.users.push(UserAccount {
            username: username.to_string(),
            credential: PasswordHash::create(&new_user.password, self.auth.pbkdf2_iterations),
            is_admin: new_user.is_admin,
            avatar: new_user.avatar,
        });
        self.log("CreateUser", username);
        true
    }

    /// Overwrite every field of `old_username`'s account, including the
    /// username. A rename onto another existing account is refused.
    /// Not persisted.
    pub fn update_user(&mut self, old_username: &str, update: UserUpdate) -> bool {
        let new_username = update.username.trim().to_string();
        if new_username.is_empty() {
            return false;
        }
        let Some(idx) = self.users.iter().position(|u| u.matches(old_username)) else {
            return false;
        };
        let collides = self
            .users
            .iter()
            .enumerate()
            .any(|(i, u)| i != idx && u.matches(&new_username));
        if collides {
            return false;
        }

        let iterations = self.auth.pbkdf2_iterations;
        let user = &mut self.users[idx];
        let old_name = std::mem::replace(&mut user.username, new_username);
        user.is_admin = update.is_admin;
        user.avatar = update.avatar;
        if let Some(password) = update.password {
            user.credential = PasswordHash::create(&password, iterations);
        }
        let details = format!("{} -> {}", old_name, user.username);
        self.log("UpdateUser", &details);
        true
    }

    /// Not persisted.
    pub fn remove_user(&mut self, username: &str) -> bool {
        let before = self.users.len();
        self.users.retain(|u| !u.matches(username));
        let removed = self.users.len() != before;
        if removed {
            self.log("RemoveUser", username);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use tempfile::TempDir;

    fn new_user(name: &str, password: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            password: password.to_string(),
            is_admin: false,
            avatar: None,
        }
    }

    #[tokio::test]
    async fn test_login_with_seeded_admin() {
        let dir = TempDir::new().unwrap();
        let mut repo = open_repo(dir.path());

        assert!(repo.login("ADMIN", "admin").await);
        let session = repo.session();
        assert!(session.is_logged_in);
        assert!(session.is_admin);
        assert_eq!(session.current_user, "admin");
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password_and_unknown_user() {
        let dir = TempDir::new().unwrap();
        let mut repo = open_repo(dir.path());

        assert!(!repo.login("admin", "Admin").await);
        assert!(!repo.login("nobody", "admin").await);
        assert_eq!(repo.session(), &Session::default());
    }

    #[tokio::test]
    async fn test_login_reads_users_from_disk() {
        let dir = TempDir::new().unwrap();
        let mut writer = loaded_repo(dir.path()).await;
        assert!(writer.create_user(new_user("mads", "pw")));
        writer.save().await.unwrap();

        // A second instance with stale in-memory users still sees the new account.
        let mut reader = open_repo(dir.path());
        assert!(reader.users().is_empty());
        assert!(reader.login("Mads", "pw").await);
        assert!(!reader.session().is_admin);
        assert_eq!(reader.users().len(), 2);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut repo = open_repo(dir.path());
        assert!(repo.login("admin", "admin").await);

        repo.logout();
        let once = repo.session().clone();
        repo.logout();
        assert_eq!(repo.session(), &once);
        assert_eq!(once, Session::default());
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicates() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded_repo(dir.path()).await;
        assert!(repo.create_user(new_user("mads", "one")));
        let before = repo.users().to_vec();

        assert!(!repo.create_user(new_user("mads", "two")));
        assert!(!repo.create_user(new_user("MADS", "three")));
        assert!(!repo.create_user(new_user("  ", "blank")));
        assert_eq!(repo.users(), before.as_slice());
    }

    #[tokio::test]
    async fn test_created_password_is_hashed() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded_repo(dir.path()).await;
        assert!(repo.create_user(new_user("lis", "hunter2")));
        repo.save().await.unwrap();

        let raw = std::fs::read_to_string(repo.store().path_for(store::USERS)).unwrap();
        assert!(!raw.contains("hunter2"));
        assert!(repo.user("lis").unwrap().credential.verify("hunter2"));
    }

    #[tokio::test]
    async fn test_update_user_renames_in_place() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded_repo(dir.path()).await;
        assert!(repo.create_user(new_user("mads", "pw")));

        let updated = repo.update_user(
            "mads",
            UserUpdate {
                username: "mads.k".into(),
                password: None,
                is_admin: true,
                avatar: Some("avatars/mads.png".into()),
            },
        );
        assert!(updated);
        assert!(repo.user("mads").is_none());
        let user = repo.user("mads.k").unwrap();
        assert!(user.is_admin);
        assert_eq!(user.avatar.as_deref(), Some("avatars/mads.png"));
        assert!(user.credential.verify("pw"));
    }

    #[tokio::test]
    async fn test_update_user_new_password_and_collision() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded_repo(dir.path()).await;
        assert!(repo.create_user(new_user("a", "pw-a")));
        assert!(repo.create_user(new_user("b", "pw-b")));

        let onto_b = UserUpdate {
            username: "B".into(),
            password: None,
            is_admin: false,
            avatar: None,
        };
        assert!(!repo.update_user("a", onto_b));

        let new_pw = UserUpdate {
            username: "a".into(),
            password: Some("fresh".into()),
            is_admin: false,
            avatar: None,
        };
        assert!(repo.update_user("a", new_pw));
        assert!(repo.user("a").unwrap().credential.verify("fresh"));
        assert!(!repo.update_user(
            "ghost",
            UserUpdate {
                username: "ghost".into(),
                password: None,
                is_admin: false,
                avatar: None,
            }
        ));
    }

    #[tokio::test]
    async fn test_remove_user() {
        let dir = TempDir::new().unwrap();
        let mut repo = loaded_repo(dir.path()).await;
        assert!(repo.create_user(new_user("temp", "pw")));
        assert!(repo.remove_user("TEMP"));
        assert!(!repo.remove_user("temp"));
        assert_eq!(repo.users().len(), 1);
    }
}
