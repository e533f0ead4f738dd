//! Typed publish/subscribe hooks for the scan lifecycle.
//!
//! Every event is its own payload type, so a subscriber's signature is checked
//! at compile time. Subscriptions are additive only; there is no unsubscribe.
//!
//! The `ash` binary publishes [`ExecutionStart`] and [`ExecutionComplete`]
//! around scan-set resolution. The convert, scan and report events, along with
//! [`PhaseProgress`] and the error, warning and info events, are payloads for
//! the pipeline stages that run converters, scanners and reporters against the
//! same [`PluginManager`](super::PluginManager).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::path::PathBuf;

/// An event that can be published through the [`EventBus`].
pub trait AshEvent: 'static {
    /// Stable event name used in logs.
    const NAME: &'static str;
    /// Value each subscriber returns for this event.
    type Response: 'static;
}

type Handler<E> = Box<dyn Fn(&E) -> anyhow::Result<<E as AshEvent>::Response>>;

/// Event name -> ordered subscriber list.
///
/// The table is only allocated on the first `subscribe`.
#[derive(Default)]
pub struct EventBus {
    subscribers: Option<HashMap<TypeId, Vec<Box<dyn Any>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `callback` to the subscribers of `E` and hand it back, so a
    /// caller can keep using the same closure after registering it.
    pub fn subscribe<E, F>(&mut self, callback: F) -> F
    where
        E: AshEvent,
        F: Fn(&E) -> anyhow::Result<E::Response> + Clone + 'static,
    {
        let handlers = self
            .subscribers
            .get_or_insert_with(HashMap::new)
            .entry(TypeId::of::<E>())
            .or_default();

        let handler: Handler<E> = Box::new(callback.clone());
        handlers.push(Box::new(handler));

        tracing::debug!(
            "Subscribed callback to event {}. Total subscribers for this event: {}",
            E::NAME,
            handlers.len()
        );
        callback
    }

    /// Call every subscriber of `E` in subscription order and collect what they return.
    ///
    /// The first subscriber error aborts the remaining calls and is returned as is.
    pub fn notify<E: AshEvent>(&self, event: &E) -> anyhow::Result<Vec<E::Response>> {
        let Some(subscribers) = self.subscribers.as_ref() else {
            tracing::debug!("No subscribers dictionary exists for event {}", E::NAME);
            return Ok(Vec::new());
        };

        let Some(handlers) = subscribers.get(&TypeId::of::<E>()) else {
            tracing::debug!("No subscribers for event {}", E::NAME);
            return Ok(Vec::new());
        };

        tracing::debug!(
            "Notifying {} subscribers of event {}",
            handlers.len(),
            E::NAME
        );

        let mut results = Vec::with_capacity(handlers.len());
        for handler in handlers {
            if let Some(handler) = handler.downcast_ref::<Handler<E>>() {
                results.push(handler(event)?);
            }
        }
        Ok(results)
    }

    pub fn subscriber_count<E: AshEvent>(&self) -> usize {
        self.subscribers
            .as_ref()
            .and_then(|subscribers| subscribers.get(&TypeId::of::<E>()))
            .map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field(
                "event_types",
                &self.subscribers.as_ref().map_or(0, HashMap::len),
            )
            .finish()
    }
}

/// Engine phase an event originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Convert,
    Scan,
    Report,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStart {
    pub source_dir: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
}

impl ExecutionStart {
    pub fn new(source_dir: PathBuf, output_dir: Option<PathBuf>) -> Self {
        Self {
            source_dir,
            output_dir,
            started_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionComplete {
    pub source_dir: PathBuf,
    pub scan_set_size: usize,
    pub completed_at: DateTime<Utc>,
}

impl ExecutionComplete {
    pub fn new(source_dir: PathBuf, scan_set_size: usize) -> Self {
        Self {
            source_dir,
            scan_set_size,
            completed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertStart {
    pub converter: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertComplete {
    pub converter: String,
    pub converted_paths: Vec<PathBuf>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanStart {
    pub scanner: String,
    pub scan_targets: Vec<PathBuf>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanComplete {
    pub scanner: String,
    pub finding_count: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportStart {
    pub reporter: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportComplete {
    pub reporter: String,
    pub output_path: Option<PathBuf>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseProgress {
    pub phase: Phase,
    /// 0-100
    pub percent: u8,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub phase: Option<Phase>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningEvent {
    pub phase: Option<Phase>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoEvent {
    pub phase: Option<Phase>,
    pub message: String,
}

impl AshEvent for ExecutionStart {
    const NAME: &'static str = "execution_start";
    type Response = ();
}

impl AshEvent for ExecutionComplete {
    const NAME: &'static str = "execution_complete";
    type Response = ();
}

impl AshEvent for ConvertStart {
    const NAME: &'static str = "convert_start";
    type Response = ();
}

impl AshEvent for ConvertComplete {
    const NAME: &'static str = "convert_complete";
    type Response = ();
}

impl AshEvent for ScanStart {
    const NAME: &'static str = "scan_start";
    type Response = ();
}

impl AshEvent for ScanComplete {
    const NAME: &'static str = "scan_complete";
    type Response = ();
}

impl AshEvent for ReportStart {
    const NAME: &'static str = "report_start";
    type Response = ();
}

impl AshEvent for ReportComplete {
    const NAME: &'static str = "report_complete";
    type Response = ();
}

impl AshEvent for PhaseProgress {
    const NAME: &'static str = "phase_progress";
    type Response = ();
}

impl AshEvent for ErrorEvent {
    const NAME: &'static str = "error";
    type Response = ();
}

impl AshEvent for WarningEvent {
    const NAME: &'static str = "warning";
    type Response = ();
}

impl AshEvent for InfoEvent {
    const NAME: &'static str = "info";
    type Response = ();
}
