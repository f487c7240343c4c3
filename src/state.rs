use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::{products::ProductStore, settings::SettingsStore, upload::UploadStore};

/// Everything a handler needs, built once in `main` and cloned per route.
/// No ambient globals: file locations live inside the stores.
#[derive(Clone)]
pub struct AppState {
    pub products: ProductStore,
    pub settings: SettingsStore,
    pub uploads: UploadStore,
    /// Admin session tokens → last-activity instant.
    pub sessions: Arc<RwLock<HashMap<String, Instant>>>,
}

impl AppState {
    pub fn new(products: ProductStore, settings: SettingsStore, uploads: UploadStore) -> Self {
        Self {
            products,
            settings,
            uploads,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
