//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::middleware::AdmissionControl;
use crate::services::TokenService;
use crate::store::{CartStore, ProductStore, UserStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// stores, the token service, and the admission gate. It is built once by
/// the process entry point and injected into the router; nothing in the
/// crate reaches for process-wide storage.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    users: UserStore,
    products: ProductStore,
    carts: CartStore,
    tokens: TokenService,
    admission: AdmissionControl,
}

impl AppState {
    /// Create a new application state from configuration.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let tokens = TokenService::new(&config.token_secret);
        let admission = AdmissionControl::new(config.mode.is_production());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                users: UserStore::new(),
                products: ProductStore::new(),
                carts: CartStore::new(),
                tokens,
                admission,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the user store.
    #[must_use]
    pub fn users(&self) -> &UserStore {
        &self.inner.users
    }

    /// Get a reference to the product store.
    #[must_use]
    pub fn products(&self) -> &ProductStore {
        &self.inner.products
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn carts(&self) -> &CartStore {
        &self.inner.carts
    }

    /// Get a reference to the token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Get a reference to the admission gate.
    #[must_use]
    pub fn admission(&self) -> &AdmissionControl {
        &self.inner.admission
    }
}
