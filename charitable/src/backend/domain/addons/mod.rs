//! Optional feature modules and the dispatcher that activates and loads them.

pub mod addon;
pub mod contact_consent;
pub mod dispatcher;

pub use addon::{Addon, AddonContext, AddonRegistry};
pub use contact_consent::ContactConsentAddon;
pub use dispatcher::{Activation, AddonDispatcher, Hook, HostEvent, LoadReport};

use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum AddonError {
    #[error("Addons can only be activated during '{expected}', not '{actual}'")]
    WrongHook {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Addon '{0}' is not registered")]
    NotRegistered(String),
    #[error("Addon '{0}' is already registered")]
    DuplicateSlug(String),
    #[error("Failed to activate addon '{slug}': {source}")]
    Activation {
        slug: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("Failed to load addon '{slug}': {source}")]
    Load {
        slug: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Registry of the addons bundled with this build
pub fn builtin_addons() -> AddonRegistry {
    let mut registry = AddonRegistry::new();
    let bundled: [Arc<dyn Addon>; 1] = [Arc::new(ContactConsentAddon)];
    for addon in bundled {
        if let Err(e) = registry.register(addon) {
            warn!("Skipping bundled addon: {}", e);
        }
    }
    registry
}
