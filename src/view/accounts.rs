use crate::errors::RepoError;
use crate::models::{NewUser, Session, UserAccount, UserUpdate};
use crate::repository::RepoHandle;

/// User administration screen. Unlike the raw repository calls, every
/// mutation here is saved, and the signed-in user cannot edit or remove
/// their own account.
pub struct AccountsView {
    repo: RepoHandle,
}

impl AccountsView {
    pub fn new(repo: RepoHandle) -> Self {
        Self { repo }
    }

    pub async fn login(&self, username: &str, password: &str) -> bool {
        self.repo.lock().await.login(username, password).await
    }

    pub async fn logout(&self) {
        self.repo.lock().await.logout();
    }

    pub async fn session(&self) -> Session {
        self.repo.lock().await.session().clone()
    }

    pub async fn users(&self) -> Vec<UserAccount> {
        self.repo.lock().await.users().to_vec()
    }

    /// `Ok(false)` when the username is blank or taken.
    pub async fn create(&self, new_user: NewUser) -> Result<bool, RepoError> {
        let mut repo = self.repo.lock().await;
        if !repo.create_user(new_user) {
            return Ok(false);
        }
        repo.save().await?;
        Ok(true)
    }

    pub async fn update(&self, username: &str, update: UserUpdate) -> Result<bool, RepoError> {
        let mut repo = self.repo.lock().await;
        if is_signed_in_as(repo.session(), username) {
            return Err(RepoError::SelfModification { action: "edit" });
        }
        if repo.user(username).is_none() {
            return Err(RepoError::UserNotFound {
                username: username.to_string(),
            });
        }
        if !repo.update_user(username, update) {
            return Ok(false);
        }
        repo.save().await?;
        Ok(true)
    }

    pub async fn remove(&self, username: &str) -> Result<bool, RepoError> {
        let mut repo = self.repo.lock().await;
        if is_signed_in_as(repo.session(), username) {
            return Err(RepoError::SelfModification { action: "remove" });
        }
        if !repo.remove_user(username) {
            return Ok(false);
        }
        repo.save().await?;
        Ok(true)
    }
}

fn is_signed_in_as(session: &Session, username: &str) -> bool {
    session.is_logged_in && session.current_user.eq_ignore_ascii_case(username.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Repository;
    use crate::repository::test_support::test_config;
    use tempfile::TempDir;

    async fn accounts(dir: &TempDir) -> AccountsView {
        let mut repo = Repository::open(&test_config(dir.path())).unwrap();
        repo.load().await;
        AccountsView::new(RepoHandle::new(repo))
    }

    fn user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            password: "pw".to_string(),
            is_admin: false,
            avatar: None,
        }
    }

    #[tokio::test]
    async fn test_signed_in_user_cannot_remove_self() {
        let dir = TempDir::new().unwrap();
        let view = accounts(&dir).await;
        assert!(view.login("admin", "admin").await);

        let err = view.remove("Admin").await.unwrap_err();
        assert_eq!(err.to_string(), "Unable to remove the signed-in user");
        assert_eq!(view.users().await.len(), 1);
    }

    #[tokio::test]
    async fn test_signed_in_user_cannot_edit_self() {
        let dir = TempDir::new().unwrap();
        let view = accounts(&dir).await;
        assert!(view.login("admin", "admin").await);

        let update = UserUpdate {
            username: "root".into(),
            password: None,
            is_admin: true,
            avatar: None,
        };
        let err = view.update("admin", update).await.unwrap_err();
        assert!(matches!(err, RepoError::SelfModification { action: "edit" }));
    }

    #[tokio::test]
    async fn test_create_is_persisted_for_next_login() {
        let dir = TempDir::new().unwrap();
        let view = accounts(&dir).await;
        assert!(view.create(user("lis")).await.unwrap());
        assert!(!view.create(user("LIS")).await.unwrap());

        let other = accounts(&dir).await;
        assert!(other.login("lis", "pw").await);
        assert_eq!(other.session().await.current_user, "lis");
    }

    #[tokio::test]
    async fn test_update_and_remove_other_user() {
        let dir = TempDir::new().unwrap();
        let view = accounts(&dir).await;
        assert!(view.login("admin", "admin").await);
        assert!(view.create(user("mads")).await.unwrap());

        let update = UserUpdate {
            username: "mads".into(),
            password: Some("new".into()),
            is_admin: true,
            avatar: None,
        };
        assert!(view.update("mads", update).await.unwrap());
        assert!(view.users().await.iter().any(|u| u.username == "mads" && u.is_admin));

        assert!(view.remove("mads").await.unwrap());
        assert!(!view.remove("mads").await.unwrap());
        let gone = UserUpdate {
            username: "mads".into(),
            password: None,
            is_admin: false,
            avatar: None,
        };
        assert!(matches!(
            view.update("mads", gone).await,
            Err(RepoError::UserNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_logout_lifts_self_modification_guard() {
        let dir = TempDir::new().unwrap();
        let view = accounts(&dir).await;
        assert!(view.create(user("temp")).await.unwrap());
        assert!(view.login("temp", "pw").await);
        assert!(view.remove("temp").await.is_err());

        view.logout().await;
        assert!(view.remove("temp").await.unwrap());
    }
}
