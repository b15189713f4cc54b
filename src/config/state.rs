// Application state module
// Everything a request handler needs, shared behind an `Arc`

use std::sync::Arc;

use super::types::Config;
use crate::store::WidgetStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: WidgetStore,
}

impl AppState {
    pub fn new(config: Config, store: WidgetStore) -> Self {
        Self { config, store }
    }

    pub fn shared(config: Config, store: WidgetStore) -> Arc<Self> {
        Arc::new(Self::new(config, store))
    }
}
