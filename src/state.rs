//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the generation gateway, the translator chain, a handle to the
//! state-store worker and the request limits. Everything is built once in
//! `main` and cloned cheaply per request.

use std::sync::Arc;

use crate::config::LimitsConfig;
use crate::services::gateway::Gateway;
use crate::store::StoreHandle;
use crate::translate::Translator;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub translator: Arc<Translator>,
    pub store: StoreHandle,
    pub limits: LimitsConfig,
}

impl AppState {
    #[must_use]
    pub fn new(gateway: Gateway, translator: Translator, store: StoreHandle, limits: LimitsConfig) -> Self {
        Self { gateway: Arc::new(gateway), translator: Arc::new(translator), store, limits }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
