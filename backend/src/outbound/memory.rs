//! In-memory user directory.
//!
//! Backs the user and ground ports with plain maps behind a mutex. Used as
//! the default wiring until a database adapter lands, and by integration
//! tests that need a real directory without external services.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{DirectoryError, UserDirectory};
use crate::domain::{GroundMembership, PersonalAccessToken, User, UserPatch};

#[derive(Default)]
struct Inner {
    /// Users keyed by account id.
    users: HashMap<i32, User>,
    /// Ground memberships keyed by account id.
    memberships: HashMap<i32, Vec<GroundMembership>>,
    /// Stored personal access tokens keyed by account id.
    tokens: HashMap<i32, PersonalAccessToken>,
}

/// Mutex-backed [`UserDirectory`] implementation.
#[derive(Default)]
pub struct InMemoryDirectory {
    inner: Mutex<Inner>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the directory with a user and their ground memberships.
    pub fn insert_user(
        &self,
        user: User,
        memberships: Vec<GroundMembership>,
    ) -> Result<(), DirectoryError> {
        self.with_inner(|inner| {
            inner.memberships.insert(user.id, memberships);
            inner.users.insert(user.id, user);
            Ok(())
        })
    }

    fn with_inner<T>(
        &self,
        f: impl FnOnce(&mut Inner) -> Result<T, DirectoryError>,
    ) -> Result<T, DirectoryError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| DirectoryError::backend("directory lock poisoned"))?;
        f(&mut inner)
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_github_id(&self, github_id: i64) -> Result<Option<User>, DirectoryError> {
        self.with_inner(|inner| {
            Ok(inner
                .users
                .values()
                .find(|user| user.github_id == github_id)
                .cloned())
        })
    }

    async fn update_info(&self, user: &User, patch: UserPatch) -> Result<User, DirectoryError> {
        self.with_inner(|inner| {
            let stored = inner
                .users
                .get_mut(&user.id)
                .ok_or(DirectoryError::NoSuchUser)?;
            if let Some(nickname) = patch.nickname {
                stored.nickname = nickname;
            }
            if let Some(status_msg) = patch.status_msg {
                stored.status_msg = Some(status_msg);
            }
            Ok(stored.clone())
        })
    }

    async fn is_nickname_taken(
        &self,
        nickname: &str,
        requester: i32,
    ) -> Result<bool, DirectoryError> {
        self.with_inner(|inner| {
            Ok(inner
                .users
                .values()
                .any(|user| user.id != requester && user.nickname.as_ref() == nickname))
        })
    }

    async fn save_personal_access_token(
        &self,
        user: &User,
        token: PersonalAccessToken,
    ) -> Result<(), DirectoryError> {
        self.with_inner(|inner| {
            if !inner.users.contains_key(&user.id) {
                return Err(DirectoryError::NoSuchUser);
            }
            info!(
                user_id = user.id,
                token_fingerprint = %token.fingerprint(),
                "stored personal access token"
            );
            inner.tokens.insert(user.id, token);
            Ok(())
        })
    }

    async fn update_last_ground(&self, user: &User, ground_id: i32) -> Result<(), DirectoryError> {
        self.with_inner(|inner| {
            let stored = inner
                .users
                .get_mut(&user.id)
                .ok_or(DirectoryError::NoSuchUser)?;
            stored.last_ground_id = Some(ground_id);
            Ok(())
        })
    }

    async fn grounds(&self, user: &User) -> Result<Vec<GroundMembership>, DirectoryError> {
        self.with_inner(|inner| {
            if !inner.users.contains_key(&user.id) {
                return Err(DirectoryError::NoSuchUser);
            }
            Ok(inner.memberships.get(&user.id).cloned().unwrap_or_default())
        })
    }

    async fn clear_status_msg(&self, user: &User) -> Result<User, DirectoryError> {
        self.with_inner(|inner| {
            let stored = inner
                .users
                .get_mut(&user.id)
                .ok_or(DirectoryError::NoSuchUser)?;
            stored.status_msg = None;
            Ok(stored.clone())
        })
    }

    async fn remove_user(&self, user: &User) -> Result<(), DirectoryError> {
        self.with_inner(|inner| {
            inner
                .users
                .remove(&user.id)
                .ok_or(DirectoryError::NoSuchUser)?;
            inner.memberships.remove(&user.id);
            inner.tokens.remove(&user.id);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Ground, Nickname};

    fn user(id: i32, github_id: i64, nickname: &str) -> User {
        User {
            id,
            github_id,
            nickname: Nickname::new(nickname).expect("valid nickname"),
            status_msg: None,
            last_ground_id: None,
        }
    }

    fn seeded() -> (InMemoryDirectory, User) {
        let directory = InMemoryDirectory::new();
        let me = user(1, 100, "하나");
        directory
            .insert_user(
                me.clone(),
                vec![GroundMembership {
                    is_owner: true,
                    ground: Ground {
                        id: 11,
                        name: "메인 그라운드".to_owned(),
                    },
                }],
            )
            .expect("seed ok");
        directory
            .insert_user(user(2, 200, "둘"), Vec::new())
            .expect("seed ok");
        (directory, me)
    }

    #[actix_rt::test]
    async fn finds_users_by_github_id() {
        let (directory, me) = seeded();
        let found = directory.find_by_github_id(100).await.expect("lookup ok");
        assert_eq!(found, Some(me));
        assert_eq!(directory.find_by_github_id(999).await.expect("lookup ok"), None);
    }

    #[actix_rt::test]
    async fn update_info_applies_partial_patch() {
        let (directory, me) = seeded();
        let patch = UserPatch {
            nickname: None,
            status_msg: Some("코딩 중".to_owned()),
        };
        let updated = directory.update_info(&me, patch).await.expect("update ok");
        assert_eq!(updated.nickname.as_ref(), "하나");
        assert_eq!(updated.status_msg.as_deref(), Some("코딩 중"));
    }

    #[actix_rt::test]
    async fn nickname_taken_ignores_the_requester() {
        let (directory, me) = seeded();
        assert!(!directory.is_nickname_taken("하나", me.id).await.expect("check ok"));
        assert!(directory.is_nickname_taken("둘", me.id).await.expect("check ok"));
        assert!(!directory.is_nickname_taken("셋", me.id).await.expect("check ok"));
    }

    #[actix_rt::test]
    async fn grounds_lists_memberships() {
        let (directory, me) = seeded();
        let grounds = directory.grounds(&me).await.expect("list ok");
        assert_eq!(grounds.len(), 1);
        assert_eq!(grounds[0].ground.name, "메인 그라운드");
    }

    #[actix_rt::test]
    async fn remove_user_drops_all_traces() {
        let (directory, me) = seeded();
        directory
            .save_personal_access_token(
                &me,
                PersonalAccessToken::new("ghp_secret").expect("non-empty token"),
            )
            .await
            .expect("save ok");
        directory.remove_user(&me).await.expect("remove ok");

        assert_eq!(directory.find_by_github_id(100).await.expect("lookup ok"), None);
        let err = directory.grounds(&me).await.expect_err("must be gone");
        assert_eq!(err, DirectoryError::NoSuchUser);
    }

    #[actix_rt::test]
    async fn operations_on_unknown_users_report_no_such_user() {
        let (directory, _) = seeded();
        let ghost = user(99, 900, "유령");
        let err = directory
            .update_last_ground(&ghost, 1)
            .await
            .expect_err("must fail");
        assert_eq!(err, DirectoryError::NoSuchUser);
    }
}
