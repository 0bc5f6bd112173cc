//! In-process mark table and entry fan-out shared by the native hosts

use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::{EntryReceiver, EntryType, PerformanceEntry};

struct Subscriber {
    entry_types: Vec<EntryType>,
    sender: mpsc::UnboundedSender<PerformanceEntry>,
}

/// Named marks plus the set of live observer subscriptions
#[derive(Default)]
pub(crate) struct Timeline {
    marks: HashMap<String, f64>,
    subscribers: Vec<Subscriber>,
}

impl Timeline {
    pub(crate) fn mark(&mut self, name: &str, at: f64) {
        trace!("mark '{}' at {:.3}ms", name, at);
        self.marks.insert(name.to_string(), at);
    }

    pub(crate) fn has_mark(&self, name: &str) -> bool {
        self.marks.contains_key(name)
    }

    /// Build a measure entry from two marks and deliver it
    ///
    /// Missing marks produce no entry.
    pub(crate) fn measure(&mut self, name: &str, start_mark: &str, end_mark: &str) {
        let (Some(&start), Some(&end)) = (self.marks.get(start_mark), self.marks.get(end_mark))
        else {
            debug!(
                "Skipping measure '{}': mark '{}' or '{}' not found",
                name, start_mark, end_mark
            );
            return;
        };

        self.dispatch(PerformanceEntry::measure(name, start, end - start));
    }

    pub(crate) fn subscribe(&mut self, entry_types: &[EntryType]) -> EntryReceiver {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.push(Subscriber {
            entry_types: entry_types.to_vec(),
            sender,
        });
        receiver
    }

    /// Deliver an entry to every subscriber interested in its type
    pub(crate) fn dispatch(&mut self, entry: PerformanceEntry) {
        self.subscribers.retain(|s| !s.sender.is_closed());

        for subscriber in &self.subscribers {
            if subscriber.entry_types.contains(&entry.entry_type) {
                // A receiver dropped since the retain is pruned next time
                let _ = subscriber.sender.send(entry.clone());
            }
        }
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers
            .iter()
            .filter(|s| !s.sender.is_closed())
            .count()
    }
}
