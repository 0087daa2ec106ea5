//! Mongo-backed account directory.

use async_trait::async_trait;
use bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};
use serde::{Deserialize, Serialize};

use fintrack_auth::Account;
use fintrack_core::AccountId;

use crate::accounts::AccountStore;
use crate::error::{StoreError, StoreResult};
use crate::mongo::{backend, is_duplicate_key, MongoClient};

const COLLECTION: &str = "users";

/// Account document as persisted in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccountDoc {
    #[serde(rename = "_id")]
    id: String,
    username: String,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    password_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    google_id: Option<String>,
    created_at: bson::DateTime,
}

impl From<Account> for AccountDoc {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.to_string(),
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            profile_image: account.profile_image,
            google_id: account.google_id,
            created_at: bson::DateTime::from_chrono(account.created_at),
        }
    }
}

impl TryFrom<AccountDoc> for Account {
    type Error = StoreError;

    fn try_from(doc: AccountDoc) -> StoreResult<Account> {
        let id: AccountId = doc
            .id
            .parse()
            .map_err(|e| StoreError::backend(format!("bad account id in store: {e}")))?;

        Ok(Account {
            id,
            username: doc.username,
            email: doc.email,
            password_hash: doc.password_hash,
            profile_image: doc.profile_image,
            google_id: doc.google_id,
            created_at: doc.created_at.to_chrono(),
        })
    }
}

pub struct MongoAccountStore {
    accounts: Collection<AccountDoc>,
}

impl MongoAccountStore {
    pub fn new(client: &MongoClient) -> Self {
        Self {
            accounts: client.database().collection(COLLECTION),
        }
    }

    /// Create the uniqueness indexes the store relies on. Called once at
    /// startup; safe to repeat.
    pub async fn ensure_indexes(&self) -> StoreResult<()> {
        let email_unique = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        // Sparse so password accounts (no google_id) don't collide.
        let google_unique = IndexModel::builder()
            .keys(doc! { "google_id": 1 })
            .options(IndexOptions::builder().unique(true).sparse(true).build())
            .build();

        self.accounts
            .create_indexes([email_unique, google_unique])
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn find_one(&self, filter: bson::Document) -> StoreResult<Option<Account>> {
        self.accounts
            .find_one(filter)
            .await
            .map_err(backend)?
            .map(Account::try_from)
            .transpose()
    }
}

#[async_trait]
impl AccountStore for MongoAccountStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        self.find_one(doc! { "username": username }).await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        self.find_one(doc! { "email": email }).await
    }

    async fn find_by_google_id(&self, subject: &str) -> StoreResult<Option<Account>> {
        self.find_one(doc! { "google_id": subject }).await
    }

    async fn insert(&self, account: Account) -> StoreResult<()> {
        let doc = AccountDoc::from(account);
        match self.accounts.insert_one(doc).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::duplicate("email or google_id")),
            Err(e) => Err(backend(e)),
        }
    }

    async fn set_profile_image(&self, username: &str, url: &str) -> StoreResult<()> {
        let existing = self
            .find_by_username(username)
            .await?
            .ok_or(StoreError::NotFound)?;

        // Idempotent by caller contract; skip the write when unchanged.
        if existing.profile_image.as_deref() == Some(url) {
            return Ok(());
        }

        self.accounts
            .update_one(
                doc! { "username": username },
                doc! { "$set": { "profile_image": url } },
            )
            .await
            .map_err(backend)?;
        Ok(())
    }
}

// Integration coverage requires a running MongoDB; the in-memory store
// exercises the shared trait contract in crate tests.
