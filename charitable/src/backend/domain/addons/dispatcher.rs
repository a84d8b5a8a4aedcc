use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::{AddonContext, AddonError, AddonRegistry};

/// Host events the dispatcher reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    ActivateAddon,
    PluginsLoaded,
}

impl Hook {
    pub fn name(&self) -> &'static str {
        match self {
            Hook::ActivateAddon => "charitable_activate_addon",
            Hook::PluginsLoaded => "plugins_loaded",
        }
    }
}

/// A fired host event with its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    ActivateAddon { slug: String },
    PluginsLoaded,
}

impl HostEvent {
    pub fn hook(&self) -> Hook {
        match self {
            HostEvent::ActivateAddon { .. } => Hook::ActivateAddon,
            HostEvent::PluginsLoaded => Hook::PluginsLoaded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Activated,
    AlreadyActivated,
}

/// Outcome of loading the active addons
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    /// Active slugs with no registered addon
    pub skipped: Vec<String>,
    /// Addons whose `load` returned an error, with the error message
    pub failed: Vec<(String, String)>,
}

/// Activates and loads addons in response to host events.
///
/// Unknown slugs are non-fatal on both paths: they are logged and skipped.
pub struct AddonDispatcher {
    registry: AddonRegistry,
    active_addons: Vec<String>,
    contract_ready: bool,
    activated: HashSet<String>,
    loaded: HashSet<String>,
}

impl AddonDispatcher {
    pub fn new(registry: AddonRegistry, active_addons: Vec<String>) -> Self {
        Self {
            registry,
            active_addons,
            contract_ready: false,
            activated: HashSet::new(),
            loaded: HashSet::new(),
        }
    }

    /// Route a host event. Failures are logged, never propagated.
    pub fn handle(&mut self, event: &HostEvent, ctx: &mut AddonContext<'_>) {
        match event {
            HostEvent::ActivateAddon { slug } => {
                if let Err(e) = self.activate_addon(event.hook(), slug, ctx) {
                    warn!("Addon activation failed: {}", e);
                }
            }
            HostEvent::PluginsLoaded => {
                let report = self.load_addons(ctx);
                info!(
                    "Loaded {} addons ({} skipped, {} failed)",
                    report.loaded.len(),
                    report.skipped.len(),
                    report.failed.len()
                );
            }
        }
    }

    /// Activate one addon. Only valid while the activation hook is firing.
    pub fn activate_addon(
        &mut self,
        current_hook: Hook,
        slug: &str,
        ctx: &mut AddonContext<'_>,
    ) -> Result<Activation, AddonError> {
        if current_hook != Hook::ActivateAddon {
            return Err(AddonError::WrongHook {
                expected: Hook::ActivateAddon.name(),
                actual: current_hook.name(),
            });
        }

        let addon = self.registry.get(slug).ok_or_else(|| {
            warn!("Addon '{}' is not registered, cannot activate it", slug);
            AddonError::NotRegistered(slug.to_string())
        })?;

        if self.activated.contains(slug) {
            debug!("Addon '{}' is already activated", slug);
            return Ok(Activation::AlreadyActivated);
        }

        self.prepare_contract();

        addon.activate(ctx).map_err(|source| AddonError::Activation {
            slug: slug.to_string(),
            source,
        })?;

        self.activated.insert(slug.to_string());
        info!("Activated addon '{}'", slug);
        Ok(Activation::Activated)
    }

    /// Load every active addon that has not been loaded yet
    pub fn load_addons(&mut self, ctx: &mut AddonContext<'_>) -> LoadReport {
        let mut report = LoadReport::default();

        if self.active_addons.is_empty() {
            debug!("No active addons");
            return report;
        }

        self.prepare_contract();

        for slug in self.active_addons.clone() {
            if self.loaded.contains(&slug) {
                continue;
            }

            let Some(addon) = self.registry.get(&slug) else {
                warn!("Active addon '{}' is not registered, skipping it", slug);
                report.skipped.push(slug);
                continue;
            };

            match addon.load(ctx) {
                Ok(()) => {
                    info!("Loaded addon '{}'", slug);
                    self.loaded.insert(slug.clone());
                    report.loaded.push(slug);
                }
                Err(source) => {
                    let error = AddonError::Load {
                        slug: slug.clone(),
                        source,
                    };
                    warn!("{}", error);
                    report.failed.push((slug, error.to_string()));
                }
            }
        }

        report
    }

    pub fn is_activated(&self, slug: &str) -> bool {
        self.activated.contains(slug)
    }

    pub fn is_loaded(&self, slug: &str) -> bool {
        self.loaded.contains(slug)
    }

    fn prepare_contract(&mut self) {
        if !self.contract_ready {
            debug!(
                "Addon contract ready for {} registered addons",
                self.registry.slugs().count()
            );
            self.contract_ready = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::config::Settings;
    use crate::backend::domain::addons::Addon;
    use crate::backend::domain::fields::{DonationField, FieldRegistry};
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// Collects formatted log output for assertions
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    struct LogWriter(Arc<Mutex<Vec<u8>>>);

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogWriter;

        fn make_writer(&'a self) -> Self::Writer {
            LogWriter(Arc::clone(&self.0))
        }
    }

    impl io::Write for LogWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut guard = self
                .0
                .lock()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "lock poisoned"))?;
            guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().expect("lock output").clone()).expect("utf8 log output")
        }
    }

    #[derive(Default)]
    struct CountingAddon {
        slug: String,
        activations: AtomicUsize,
        loads: AtomicUsize,
        fail_load: bool,
    }

    impl CountingAddon {
        fn new(slug: &str) -> Arc<Self> {
            Arc::new(Self {
                slug: slug.to_string(),
                ..Self::default()
            })
        }

        fn failing(slug: &str) -> Arc<Self> {
            Arc::new(Self {
                slug: slug.to_string(),
                fail_load: true,
                ..Self::default()
            })
        }
    }

    impl Addon for CountingAddon {
        fn slug(&self) -> &str {
            &self.slug
        }

        fn activate(&self, _ctx: &mut AddonContext<'_>) -> anyhow::Result<()> {
            self.activations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn load(&self, ctx: &mut AddonContext<'_>) -> anyhow::Result<()> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail_load {
                return Err(anyhow::anyhow!("missing dependency"));
            }
            let key = format!("{}_field", self.slug.replace('-', "_"));
            ctx.fields.register(DonationField::new(key, serde_json::json!({}))?)?;
            Ok(())
        }
    }

    fn dispatcher(addons: &[Arc<CountingAddon>], active: &[&str]) -> AddonDispatcher {
        let mut registry = AddonRegistry::new();
        for addon in addons {
            registry.register(addon.clone()).unwrap();
        }
        AddonDispatcher::new(registry, active.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_activate_registered_addon_once() {
        let addon = CountingAddon::new("gift-aid");
        let mut dispatcher = dispatcher(&[addon.clone()], &[]);
        let mut fields = FieldRegistry::new();
        let settings = Settings::default();
        let mut ctx = AddonContext { fields: &mut fields, settings: &settings };

        let first = dispatcher.activate_addon(Hook::ActivateAddon, "gift-aid", &mut ctx);
        assert_eq!(first.unwrap(), Activation::Activated);
        let second = dispatcher.activate_addon(Hook::ActivateAddon, "gift-aid", &mut ctx);
        assert_eq!(second.unwrap(), Activation::AlreadyActivated);

        assert_eq!(addon.activations.load(Ordering::SeqCst), 1);
        assert!(dispatcher.is_activated("gift-aid"));
    }

    #[test]
    fn test_activate_unknown_slug_invokes_nothing() {
        let addon = CountingAddon::new("gift-aid");
        let mut dispatcher = dispatcher(&[addon.clone()], &[]);
        let mut fields = FieldRegistry::new();
        let settings = Settings::default();
        let mut ctx = AddonContext { fields: &mut fields, settings: &settings };

        let result = dispatcher.activate_addon(Hook::ActivateAddon, "no-such-addon", &mut ctx);
        assert!(matches!(result, Err(AddonError::NotRegistered(slug)) if slug == "no-such-addon"));

        assert_eq!(addon.activations.load(Ordering::SeqCst), 0);
        assert_eq!(addon.loads.load(Ordering::SeqCst), 0);
        assert!(!dispatcher.is_activated("no-such-addon"));
    }

    #[test]
    fn test_activate_unknown_slug_logs_warning() {
        let addon = CountingAddon::new("gift-aid");
        let mut dispatcher = dispatcher(&[addon.clone()], &[]);
        let mut fields = FieldRegistry::new();
        let settings = Settings::default();

        let sink = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut ctx = AddonContext { fields: &mut fields, settings: &settings };
            let result = dispatcher.activate_addon(Hook::ActivateAddon, "no-such-addon", &mut ctx);
            assert!(result.is_err());
        });

        let logs = sink.contents();
        assert!(logs.contains("WARN"), "expected a warning, got: {}", logs);
        assert!(logs.contains("no-such-addon"));
        assert_eq!(addon.activations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_activate_outside_activation_hook_is_refused() {
        let addon = CountingAddon::new("gift-aid");
        let mut dispatcher = dispatcher(&[addon.clone()], &[]);
        let mut fields = FieldRegistry::new();
        let settings = Settings::default();
        let mut ctx = AddonContext { fields: &mut fields, settings: &settings };

        let result = dispatcher.activate_addon(Hook::PluginsLoaded, "gift-aid", &mut ctx);
        assert!(matches!(result, Err(AddonError::WrongHook { .. })));
        assert_eq!(addon.activations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_load_active_addons() {
        let active = CountingAddon::new("gift-aid");
        let inactive = CountingAddon::new("recurring");
        let mut dispatcher = dispatcher(&[active.clone(), inactive.clone()], &["gift-aid"]);
        let mut fields = FieldRegistry::new();
        let settings = Settings::default();
        let mut ctx = AddonContext { fields: &mut fields, settings: &settings };

        let report = dispatcher.load_addons(&mut ctx);
        assert_eq!(report.loaded, vec!["gift-aid".to_string()]);
        assert!(report.skipped.is_empty());

        // A second plugins_loaded does not load anything twice
        let report = dispatcher.load_addons(&mut ctx);
        assert!(report.loaded.is_empty());

        assert_eq!(active.loads.load(Ordering::SeqCst), 1);
        assert_eq!(inactive.loads.load(Ordering::SeqCst), 0);
        assert!(fields.get("gift_aid_field").is_some());
    }

    #[test]
    fn test_load_skips_unknown_and_reports_failures() {
        let good = CountingAddon::new("gift-aid");
        let bad = CountingAddon::failing("broken");
        let mut dispatcher = dispatcher(&[good.clone(), bad.clone()], &["ghost", "broken", "gift-aid"]);
        let mut fields = FieldRegistry::new();
        let settings = Settings::default();
        let mut ctx = AddonContext { fields: &mut fields, settings: &settings };

        let report = dispatcher.load_addons(&mut ctx);
        assert_eq!(report.loaded, vec!["gift-aid".to_string()]);
        assert_eq!(report.skipped, vec!["ghost".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "broken");
        assert!(!dispatcher.is_loaded("broken"));
    }

    #[test]
    fn test_no_active_addons_is_a_no_op() {
        let addon = CountingAddon::new("gift-aid");
        let mut dispatcher = dispatcher(&[addon.clone()], &[]);
        let mut fields = FieldRegistry::new();
        let settings = Settings::default();
        let mut ctx = AddonContext { fields: &mut fields, settings: &settings };

        assert_eq!(dispatcher.load_addons(&mut ctx), LoadReport::default());
        assert_eq!(addon.loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handle_routes_events() {
        let addon = CountingAddon::new("gift-aid");
        let mut dispatcher = dispatcher(&[addon.clone()], &["gift-aid"]);
        let mut fields = FieldRegistry::new();
        let settings = Settings::default();
        let mut ctx = AddonContext { fields: &mut fields, settings: &settings };

        dispatcher.handle(
            &HostEvent::ActivateAddon { slug: "gift-aid".to_string() },
            &mut ctx,
        );
        dispatcher.handle(&HostEvent::ActivateAddon { slug: "missing".to_string() }, &mut ctx);
        dispatcher.handle(&HostEvent::PluginsLoaded, &mut ctx);

        assert_eq!(addon.activations.load(Ordering::SeqCst), 1);
        assert_eq!(addon.loads.load(Ordering::SeqCst), 1);
    }
}
