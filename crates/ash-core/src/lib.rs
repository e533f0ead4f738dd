pub mod config;
pub mod converters;
pub mod error;
pub mod plugins;
pub mod reporters;
pub mod scan_set;
pub mod scanners;

pub use config::AshConfig;
pub use error::{AshError, Result};
pub use plugins::{PluginDescriptor, PluginManager, PluginRegistration, PluginType};
pub use scan_set::{scan_set, ScanSetOptions};
