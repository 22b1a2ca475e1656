use std::sync::Arc;

use relay_node::{NodeClient, SyncService};
use relay_store::EntityStore;

use crate::config::AdminConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EntityStore>,
    pub sync: SyncService,
    pub config: Arc<AdminConfig>,
}

impl AppState {
    pub fn new(config: AdminConfig) -> Self {
        let store = Arc::new(EntityStore::new());
        Self::with_store(config, store)
    }

    pub fn with_store(config: AdminConfig, store: Arc<EntityStore>) -> Self {
        let sync = SyncService::new(store.clone(), NodeClient::new());
        Self {
            store,
            sync,
            config: Arc::new(config),
        }
    }
}
