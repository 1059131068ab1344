//! Access-code pepper sourced from configuration.

use guestlink_core::{Pepper, PepperProvider};
use guestlink_domain::TokenConfig;
use tracing::warn;

/// Pepper read once at startup. A missing or blank value disables
/// code-protected issuance until the process is restarted with one.
#[derive(Debug, Clone)]
pub struct ConfigPepperProvider {
    pepper: Option<Pepper>,
}

impl ConfigPepperProvider {
    pub fn new(value: Option<String>) -> Self {
        let pepper = value.and_then(Pepper::new);
        if pepper.is_none() {
            warn!("token pepper is not configured; code-protected links are disabled");
        }
        Self { pepper }
    }

    pub fn from_config(config: &TokenConfig) -> Self {
        Self::new(config.pepper.clone())
    }

    pub fn is_configured(&self) -> bool {
        self.pepper.is_some()
    }
}

impl PepperProvider for ConfigPepperProvider {
    fn pepper(&self) -> Option<Pepper> {
        self.pepper.clone()
    }
}
