//! Service wiring: stores, token codec, and identity verifier behind one
//! [`AppServices`] handle injected into the router as an `Extension`.

use std::sync::Arc;

use fintrack_auth::SessionTokenCodec;
use fintrack_store::{AccountStore, InMemoryAccountStore, InMemoryLedgerStore, LedgerStore};

use crate::config::Config;
use crate::google::{GoogleTokenVerifier, IdentityVerifier};

pub struct AppServices {
    pub accounts: Arc<dyn AccountStore>,
    pub entries: Arc<dyn LedgerStore>,
    pub codec: Arc<SessionTokenCodec>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub config: Config,
}

impl AppServices {
    /// Wire explicit stores and verifier (used by tests to substitute stubs).
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        entries: Arc<dyn LedgerStore>,
        verifier: Arc<dyn IdentityVerifier>,
        config: Config,
    ) -> Self {
        Self {
            accounts,
            entries,
            codec: Arc::new(SessionTokenCodec::new(config.jwt_secret.as_bytes())),
            verifier,
            config,
        }
    }

    /// Everything in memory, verifier against the real provider.
    pub fn in_memory(config: Config) -> Self {
        let verifier = Arc::new(GoogleTokenVerifier::new(config.google_client_id.clone()));
        Self::new(
            Arc::new(InMemoryAccountStore::new()),
            Arc::new(InMemoryLedgerStore::new()),
            verifier,
            config,
        )
    }

    /// MongoDB-backed stores; connects and creates indexes up front.
    #[cfg(feature = "mongo")]
    pub async fn mongo(config: Config) -> anyhow::Result<Self> {
        use fintrack_store::mongo::{MongoAccountStore, MongoClient, MongoLedgerStore};

        let client = MongoClient::connect(&config.mongodb_uri, &config.mongodb_db).await?;
        let accounts = MongoAccountStore::new(&client);
        accounts.ensure_indexes().await?;
        let entries = MongoLedgerStore::new(&client);

        let verifier = Arc::new(GoogleTokenVerifier::new(config.google_client_id.clone()));
        Ok(Self::new(
            Arc::new(accounts),
            Arc::new(entries),
            verifier,
            config,
        ))
    }
}

/// Pick the store backend from configuration.
pub async fn build_services(config: Config) -> anyhow::Result<Arc<AppServices>> {
    if config.use_persistent_stores {
        #[cfg(feature = "mongo")]
        {
            tracing::info!(db = %config.mongodb_db, "using MongoDB stores");
            return Ok(Arc::new(AppServices::mongo(config).await?));
        }
        #[cfg(not(feature = "mongo"))]
        tracing::warn!(
            "USE_PERSISTENT_STORES is set but the binary was built without the \
             `mongo` feature; falling back to in-memory stores"
        );
    }

    tracing::info!("using in-memory stores");
    Ok(Arc::new(AppServices::in_memory(config)))
}
