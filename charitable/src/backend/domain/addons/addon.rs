use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::AddonError;
use crate::backend::config::Settings;
use crate::backend::domain::fields::FieldRegistry;

/// What an addon may touch while it is activated or loaded
pub struct AddonContext<'a> {
    pub fields: &'a mut FieldRegistry,
    pub settings: &'a Settings,
}

/// An optional feature module.
///
/// `activate` runs once, when the host signals that the addon has been
/// switched on. `load` runs on every startup while the addon is active.
pub trait Addon: Send + Sync {
    fn slug(&self) -> &str;

    fn activate(&self, ctx: &mut AddonContext<'_>) -> Result<()>;

    fn load(&self, ctx: &mut AddonContext<'_>) -> Result<()>;
}

/// Addons known to this build, keyed by slug
#[derive(Default, Clone)]
pub struct AddonRegistry {
    addons: BTreeMap<String, Arc<dyn Addon>>,
}

impl AddonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, addon: Arc<dyn Addon>) -> Result<(), AddonError> {
        let slug = addon.slug().to_string();
        if self.addons.contains_key(&slug) {
            return Err(AddonError::DuplicateSlug(slug));
        }
        self.addons.insert(slug, addon);
        Ok(())
    }

    pub fn get(&self, slug: &str) -> Option<Arc<dyn Addon>> {
        self.addons.get(slug).cloned()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.addons.contains_key(slug)
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.addons.keys().map(String::as_str)
    }
}

impl fmt::Debug for AddonRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.addons.keys()).finish()
    }
}
