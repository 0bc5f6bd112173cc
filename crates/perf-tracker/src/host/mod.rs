//! Host environment port for timing and observation
//!
//! Every clock read, User Timing call, observer subscription and DOM probe
//! the collectors make goes through [`PerformanceHost`]. Hosts advertise what
//! they support through a [`Capabilities`] descriptor, and callers branch on
//! that descriptor instead of probing for APIs at runtime.
//!
//! # Hosts
//!
//! - [`SimulatedHost`]: deterministic clock advanced by hand, used by tests
//!   and demos that need reproducible numbers
//! - [`SystemHost`]: native monotonic clock with an in-process mark table
//! - `BrowserHost` (feature `browser`): the page's `performance` object
//!
//! # Signal delivery
//!
//! [`PerformanceHost::observe`] hands back an [`EntryReceiver`]. The host
//! pushes entries into it on its own schedule; the subscriber drains it
//! whenever it wants a fresh view. Dropping the receiver ends the
//! subscription.

#[cfg(all(feature = "browser", target_arch = "wasm32"))]
pub mod browser;
pub mod simulated;
pub mod system;
mod timeline;

use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::TrackerError;

#[cfg(all(feature = "browser", target_arch = "wasm32"))]
pub use browser::BrowserHost;
pub use simulated::SimulatedHost;
pub use system::SystemHost;

/// Receiving half of an observer subscription
pub type EntryReceiver = mpsc::UnboundedReceiver<PerformanceEntry>;

/// Name the host gives the first-contentful-paint entry
pub const FIRST_CONTENTFUL_PAINT: &str = "first-contentful-paint";

/// Optional facilities a host may provide
///
/// The monotonic clock, animation frames and settle delays are always
/// available. Everything listed here can be missing, in which case the
/// dependent metric stays at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Named timestamp marks (`performance.mark`)
    pub marks: bool,
    /// Named intervals between two marks (`performance.measure`)
    pub measures: bool,
    /// Asynchronous delivery of categorized entries (`PerformanceObserver`)
    pub observer: bool,
    /// Heap usage sampling
    pub heap_usage: bool,
    /// A document that can host the style-recalculation probe
    pub document: bool,
}

impl Capabilities {
    /// Every optional facility present
    pub const fn all() -> Self {
        Self {
            marks: true,
            measures: true,
            observer: true,
            heap_usage: true,
            document: true,
        }
    }

    /// Clock only
    pub const fn none() -> Self {
        Self {
            marks: false,
            measures: false,
            observer: false,
            heap_usage: false,
            document: false,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::all()
    }
}

/// Category of a performance entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryType {
    Mark,
    Measure,
    Paint,
    LayoutShift,
}

impl EntryType {
    /// The entry type string used by the browser Performance API
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Mark => "mark",
            EntryType::Measure => "measure",
            EntryType::Paint => "paint",
            EntryType::LayoutShift => "layout-shift",
        }
    }

    /// Parse a browser entry type string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mark" => Some(EntryType::Mark),
            "measure" => Some(EntryType::Measure),
            "paint" => Some(EntryType::Paint),
            "layout-shift" => Some(EntryType::LayoutShift),
            _ => None,
        }
    }
}

/// A timing entry delivered by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceEntry {
    /// Entry name (mark/measure label, paint name)
    pub name: String,
    /// Entry category
    pub entry_type: EntryType,
    /// Start offset in milliseconds since the host's time origin
    pub start_time: f64,
    /// Duration in milliseconds, absent for some layout-shift entries
    pub duration: Option<f64>,
}

impl PerformanceEntry {
    pub fn measure(name: impl Into<String>, start_time: f64, duration: f64) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::Measure,
            start_time,
            duration: Some(duration),
        }
    }

    pub fn paint(name: impl Into<String>, start_time: f64) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::Paint,
            start_time,
            duration: Some(0.0),
        }
    }

    pub fn layout_shift(start_time: f64, duration: Option<f64>) -> Self {
        Self {
            name: String::new(),
            entry_type: EntryType::LayoutShift,
            start_time,
            duration,
        }
    }
}

/// Port to the environment that timing collectors measure
///
/// Methods for facilities listed in [`Capabilities`] are only called when
/// the matching flag is set. Hosts may treat calls made without the flag
/// as no-ops.
pub trait PerformanceHost {
    /// Facilities this host provides
    fn capabilities(&self) -> Capabilities;

    /// Current monotonic time in milliseconds
    fn now(&self) -> f64;

    /// Record a named timestamp mark
    fn mark(&self, name: &str);

    /// Record a named interval between two existing marks
    ///
    /// The resulting entry reaches subscribers through their receivers, not
    /// through a return value.
    fn measure(&self, name: &str, start_mark: &str, end_mark: &str);

    /// Subscribe to entries of the given types
    fn observe(&self, entry_types: &[EntryType]) -> Result<EntryReceiver, TrackerError>;

    /// Used heap in bytes
    fn heap_used_bytes(&self) -> u64;

    /// Attach a throwaway visible element, force a layout read, detach it
    fn force_layout(&self);

    /// Resolve on the next animation frame with the frame timestamp
    fn next_frame(&self) -> LocalBoxFuture<'static, f64>;

    /// Pause for `delay` so the environment can settle between trials
    fn settle(&self, delay: Duration) -> LocalBoxFuture<'static, ()>;
}
