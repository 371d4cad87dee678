use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    CredentialService, DescriptorMatcher, EuclideanMatcher, LogNotifier, ResetNotifier,
    ResetService, SeaOrmCredentialService, SeaOrmResetService,
};

/// Everything the serving paths share: the injected repository dependency and
/// the domain services built over it. Constructed once, before serving;
/// there is no process-wide singleton.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub credentials: Arc<dyn CredentialService>,

    pub reset: Arc<dyn ResetService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let matcher: Arc<dyn DescriptorMatcher> = Arc::new(EuclideanMatcher);
        let notifier: Arc<dyn ResetNotifier> = Arc::new(LogNotifier);

        let credentials: Arc<dyn CredentialService> = Arc::new(
            SeaOrmCredentialService::new(store.clone(), config.security.clone(), matcher)
                .await
                .map_err(|e| anyhow::anyhow!("failed to initialize credential service: {e}"))?,
        );

        let reset: Arc<dyn ResetService> = Arc::new(SeaOrmResetService::new(
            store.clone(),
            config.security.clone(),
            notifier,
        ));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            credentials,
            reset,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
