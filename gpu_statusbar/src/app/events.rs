//! Event handling system for the application

use std::sync::mpsc;

/// Application events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Show or hide window decorations
    ToggleBorder,

    /// Begin moving the window with the pointer
    StartDrag,

    /// Application shutdown requested
    Shutdown,
}

/// Event bus for handling application events
pub struct EventBus {
    sender: mpsc::Sender<AppEvent>,
    receiver: mpsc::Receiver<AppEvent>,
}

impl EventBus {
    /// Create new event bus
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    /// Get event sender
    pub fn sender(&self) -> mpsc::Sender<AppEvent> {
        self.sender.clone()
    }

    /// Process all pending events
    pub fn process_events<F>(&self, mut handler: F)
    where
        F: FnMut(AppEvent),
    {
        while let Ok(event) = self.receiver.try_recv() {
            handler(event);
        }
    }

    /// Send event
    pub fn send(&self, event: AppEvent) -> Result<(), mpsc::SendError<AppEvent>> {
        self.sender.send(event)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_processed_in_order() {
        let bus = EventBus::new();
        bus.send(AppEvent::ToggleBorder).unwrap();
        bus.sender().send(AppEvent::Shutdown).unwrap();

        let mut seen = Vec::new();
        bus.process_events(|event| seen.push(event));
        assert_eq!(seen, vec![AppEvent::ToggleBorder, AppEvent::Shutdown]);

        bus.process_events(|_| panic!("queue should be empty"));
    }
}
