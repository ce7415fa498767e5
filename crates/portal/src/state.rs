//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::PortalConfig;
use crate::error::AppError;
use crate::multipass::MultipassIssuer;
use crate::roster::{CustomerRepository, RosterLimits};
use crate::shopify::AdminClient;

/// Application state shared across all handlers.
///
/// Holds only read-only values; every roster is fetched fresh per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    roster: CustomerRepository<AdminClient>,
    multipass: MultipassIssuer,
}

impl AppState {
    /// Build the state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the Shopify client cannot be built or the roster
    /// limits are out of range.
    pub fn new(config: PortalConfig) -> Result<Self, AppError> {
        let shopify = AdminClient::new(&config.shopify, &config.roster)?;
        let limits = RosterLimits::try_from(&config.roster)?;
        let multipass = MultipassIssuer::new(&config.multipass);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                roster: CustomerRepository::new(shopify, limits),
                multipass,
                config,
            }),
        })
    }

    /// Portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Customer roster repository.
    #[must_use]
    pub fn roster(&self) -> &CustomerRepository<AdminClient> {
        &self.inner.roster
    }

    /// Multipass token issuer.
    #[must_use]
    pub fn multipass(&self) -> &MultipassIssuer {
        &self.inner.multipass
    }
}
