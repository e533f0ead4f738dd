pub(crate) mod builtin;
pub mod events;
pub mod manager;
pub mod manifest;
pub mod registration;

pub use manager::{filter_plugin_modules, PluginManager};
pub use registration::{
    PluginDescriptor, PluginLibrary, PluginRef, PluginRegistration, PluginType, ASH_DEFAULT,
};
