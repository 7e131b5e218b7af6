//! Recording event callback.

use std::sync::{Arc, Mutex};

use stagewire_core::EventCallback;
use stagewire_proto::{Event, EventType};

/// Shared record of the events a façade passed to its callback.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback appending to this log.
    pub fn callback(&self) -> EventCallback {
        let events = Arc::clone(&self.events);
        Box::new(move |event: &Event| {
            if let Ok(mut events) = events.lock() {
                events.push(event.clone());
            }
        })
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Discriminants of the recorded events, in order.
    pub fn event_types(&self) -> Vec<EventType> {
        self.events().iter().map(Event::event_type).collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_records_in_order() {
        let log = EventLog::new();
        let mut callback = log.callback();
        callback(&Event::InputEnd);
        callback(&Event::OutputEnd);

        assert_eq!(log.event_types(), vec![EventType::InputEnd, EventType::OutputEnd]);
        log.clear();
        assert!(log.events().is_empty());
    }
}
