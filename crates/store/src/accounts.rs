//! Account directory: lookups, inserts, external-identity provisioning.

use std::sync::RwLock;

use async_trait::async_trait;

use fintrack_auth::{Account, ExternalProfile};

use crate::error::{StoreError, StoreResult};

/// Persistent directory of accounts.
///
/// `email` and `google_id` (when present) are unique; the store is the
/// enforcement point, surfacing violations as [`StoreError::Duplicate`].
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>>;
    async fn find_by_google_id(&self, subject: &str) -> StoreResult<Option<Account>>;

    async fn insert(&self, account: Account) -> StoreResult<()>;

    /// Idempotent: setting the image an account already has is a no-op.
    async fn set_profile_image(&self, username: &str, url: &str) -> StoreResult<()>;
}

/// Map an external subject to an account, creating one on first sight.
///
/// Concurrent first-logins race on the insert; the loser's uniqueness
/// violation is read as "already exists, re-fetch" rather than a failure, so
/// one subject can never yield two accounts.
pub async fn find_or_create_external(
    store: &dyn AccountStore,
    profile: &ExternalProfile,
) -> StoreResult<Account> {
    if let Some(existing) = store.find_by_google_id(&profile.subject).await? {
        return Ok(existing);
    }

    let account = Account::from_external(profile);
    match store.insert(account.clone()).await {
        Ok(()) => Ok(account),
        Err(StoreError::Duplicate(_)) => {
            tracing::debug!(subject = %profile.subject, "lost first-login race, re-fetching");
            store
                .find_by_google_id(&profile.subject)
                .await?
                .ok_or(StoreError::NotFound)
        }
        Err(e) => Err(e),
    }
}

/// In-memory account directory for dev/test.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<Vec<Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let accounts = self.inner.read().map_err(|_| StoreError::backend("lock poisoned"))?;
        Ok(accounts.iter().find(|a| a.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let accounts = self.inner.read().map_err(|_| StoreError::backend("lock poisoned"))?;
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_google_id(&self, subject: &str) -> StoreResult<Option<Account>> {
        let accounts = self.inner.read().map_err(|_| StoreError::backend("lock poisoned"))?;
        Ok(accounts
            .iter()
            .find(|a| a.google_id.as_deref() == Some(subject))
            .cloned())
    }

    async fn insert(&self, account: Account) -> StoreResult<()> {
        let mut accounts = self.inner.write().map_err(|_| StoreError::backend("lock poisoned"))?;

        // Check-then-insert is atomic under the write lock, matching the
        // uniqueness guarantee a document store's index would give.
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(StoreError::duplicate("email"));
        }
        if let Some(subject) = &account.google_id {
            if accounts.iter().any(|a| a.google_id.as_deref() == Some(subject)) {
                return Err(StoreError::duplicate("google_id"));
            }
        }

        accounts.push(account);
        Ok(())
    }

    async fn set_profile_image(&self, username: &str, url: &str) -> StoreResult<()> {
        let mut accounts = self.inner.write().map_err(|_| StoreError::backend("lock poisoned"))?;
        let account = accounts
            .iter_mut()
            .find(|a| a.username == username)
            .ok_or(StoreError::NotFound)?;

        if account.profile_image.as_deref() != Some(url) {
            account.profile_image = Some(url.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn profile(subject: &str) -> ExternalProfile {
        ExternalProfile {
            subject: subject.into(),
            name: "Alice".into(),
            email: Some("alice@example.com".into()),
            picture: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryAccountStore::new();
        let a = Account::with_password("alice".into(), "a@example.com".into(), "h".into());
        let b = Account::with_password("other".into(), "a@example.com".into(), "h".into());

        store.insert(a).await.unwrap();
        let err = store.insert(b).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(field) if field == "email"));
    }

    #[tokio::test]
    async fn external_provisioning_creates_then_reuses() {
        let store = InMemoryAccountStore::new();
        let first = find_or_create_external(&store, &profile("g-1")).await.unwrap();
        let second = find_or_create_external(&store, &profile("g-1")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(first.password_hash.is_none());
        assert_eq!(store.inner.read().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_first_logins_yield_one_account() {
        let store = Arc::new(InMemoryAccountStore::new());
        let p = profile("g-race");

        let (a, b) = tokio::join!(
            find_or_create_external(store.as_ref(), &p),
            find_or_create_external(store.as_ref(), &p),
        );

        assert_eq!(a.unwrap().id, b.unwrap().id);
        assert_eq!(store.inner.read().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn profile_image_update_is_idempotent() {
        let store = InMemoryAccountStore::new();
        let account = Account::with_password("alice".into(), "a@example.com".into(), "h".into());
        store.insert(account).await.unwrap();

        store.set_profile_image("alice", "http://x/1.png").await.unwrap();
        store.set_profile_image("alice", "http://x/1.png").await.unwrap();

        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.profile_image.as_deref(), Some("http://x/1.png"));
    }

    #[tokio::test]
    async fn profile_image_for_unknown_user_is_not_found() {
        let store = InMemoryAccountStore::new();
        let err = store.set_profile_image("ghost", "http://x/1.png").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
