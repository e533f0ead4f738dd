use super::events::{AshEvent, EventBus};
use super::registration::{
    PluginDescriptor, PluginLibrary, PluginRef, PluginRegistration, PluginType, ASH_DEFAULT,
};
use std::collections::BTreeMap;

/// Registry of converter, scanner and reporter plugins for one ASH invocation.
///
/// Constructed once at command start and passed by reference to whatever needs
/// to register or look up plugins. Registrations and subscriptions are additive;
/// nothing is ever removed for the lifetime of the manager.
#[derive(Debug)]
pub struct PluginManager {
    library: PluginLibrary,
    implementations: BTreeMap<PluginType, Vec<PluginDescriptor>>,
    events: EventBus,
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginManager {
    /// Manager holding the three `ash-default` package registrations and nothing else.
    pub fn new() -> Self {
        Self {
            library: PluginLibrary::with_defaults(),
            implementations: BTreeMap::new(),
            events: EventBus::new(),
        }
    }

    /// Manager with every built-in converter, scanner and reporter registered.
    pub fn with_builtin_plugins() -> Self {
        let mut manager = Self::new();
        crate::converters::register(&mut manager);
        crate::scanners::register(&mut manager);
        crate::reporters::register(&mut manager);
        manager
    }

    pub fn library(&self) -> &PluginLibrary {
        &self.library
    }

    pub fn registration(&self, plugin_type: PluginType, name: &str) -> Option<&PluginRegistration> {
        self.library.get(plugin_type).get(name)
    }

    /// Register a plugin under `plugin_type`.
    ///
    /// The name comes from the descriptor, or is the literal string. Conflicts are
    /// logged and skipped: `ash-default` is only accepted from the category's
    /// built-in module path, and the first registration of a name always wins.
    pub fn register_plugin_module<'a>(
        &mut self,
        plugin_type: PluginType,
        plugin: impl Into<PluginRef<'a>>,
        plugin_module_path: &str,
        version: Option<&str>,
        enabled: bool,
    ) {
        let plugin = plugin.into();
        let name = plugin.name();

        if name == ASH_DEFAULT && plugin_module_path != plugin_type.default_module_path() {
            tracing::error!(
                "{} is a protected plugin module name. Plugin module at path '{}' should register with a different name.",
                ASH_DEFAULT,
                plugin_module_path
            );
            return;
        }

        let registrations = self.library.get_mut(plugin_type);
        if registrations.contains_key(name) {
            tracing::warn!(
                "Plugin module '{}' already registered as a {}. Skipping.",
                name,
                plugin_type
            );
            return;
        }

        registrations.insert(
            name.to_string(),
            PluginRegistration {
                name: name.to_string(),
                plugin_module_path: plugin_module_path.to_string(),
                description: None,
                version: version.map(str::to_string),
                author: None,
                enabled,
            },
        );

        if let PluginRef::Plugin(descriptor) = plugin {
            self.implementations
                .entry(plugin_type)
                .or_default()
                .push(descriptor.clone());
        }

        tracing::debug!("Registered {} plugin module '{}'", plugin_type, name);
    }

    /// Implementations registered for `plugin_type`, in registration order.
    pub fn plugin_modules(&self, plugin_type: PluginType) -> Vec<&PluginDescriptor> {
        self.plugin_modules_where(plugin_type, |_| true)
    }

    /// Like [`plugin_modules`](Self::plugin_modules), keeping only entries accepted by `filter`.
    pub fn plugin_modules_where<F>(&self, plugin_type: PluginType, filter: F) -> Vec<&PluginDescriptor>
    where
        F: Fn(&PluginDescriptor) -> bool,
    {
        let all: Vec<&PluginDescriptor> = self
            .implementations
            .get(&plugin_type)
            .map(|descriptors| descriptors.iter().collect())
            .unwrap_or_default();
        filter_plugin_modules(all, |descriptor| filter(*descriptor))
    }

    pub fn subscribe<E, F>(&mut self, callback: F) -> F
    where
        E: AshEvent,
        F: Fn(&E) -> anyhow::Result<E::Response> + Clone + 'static,
    {
        self.events.subscribe(callback)
    }

    pub fn notify<E: AshEvent>(&self, event: &E) -> anyhow::Result<Vec<E::Response>> {
        self.events.notify(event)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

/// Keep the items `predicate` accepts, preserving order.
pub fn filter_plugin_modules<T, P>(items: Vec<T>, predicate: P) -> Vec<T>
where
    P: Fn(&T) -> bool,
{
    items.into_iter().filter(|item| predicate(item)).collect()
}
