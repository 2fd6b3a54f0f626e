//! Rig notifications and their observers.

use std::sync::mpsc::{self, Receiver, Sender};

use camrig_rig_model::focus::FocusPoint;
use camrig_rig_model::node::NodeRef;

/// Something the rig did.
#[derive(Debug, Clone, PartialEq)]
pub enum RigEvent {
    /// A POV change began; `pov` is the new active POV.
    PovChangeStarted { pov: String },
    /// A POV change settled on `pov`.
    PovChangeEnded { pov: String },
    /// A timed follow-target change completed.
    TargetChangeFinished { target: NodeRef },
    /// The focus queue started draining.
    FocusStarted,
    /// The holder arrived at a focus point.
    FocusPointReached { point: FocusPoint },
    /// The focus queue drained and the rig is back to normal following.
    FocusFinished,
}

impl RigEvent {
    /// Stable snake_case name.
    pub fn kind(&self) -> &'static str {
        match self {
            RigEvent::PovChangeStarted { .. } => "pov_change_started",
            RigEvent::PovChangeEnded { .. } => "pov_change_ended",
            RigEvent::TargetChangeFinished { .. } => "target_change_finished",
            RigEvent::FocusStarted => "focus_started",
            RigEvent::FocusPointReached { .. } => "focus_point_reached",
            RigEvent::FocusFinished => "focus_finished",
        }
    }

    /// The POV or node the event concerns, if any.
    pub fn detail(&self) -> Option<String> {
        match self {
            RigEvent::PovChangeStarted { pov } | RigEvent::PovChangeEnded { pov } => {
                Some(pov.clone())
            }
            RigEvent::TargetChangeFinished { target } => Some(target.label()),
            RigEvent::FocusPointReached { point } => Some(point.target.label()),
            RigEvent::FocusStarted | RigEvent::FocusFinished => None,
        }
    }
}

/// Handle returned by `subscribe*`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

enum Observer {
    Callback(Box<dyn FnMut(&RigEvent)>),
    Channel(Sender<RigEvent>),
}

/// Ordered observer list with a pending-event queue.
///
/// Events are queued with [`EventBus::push`] while the rig mutates itself and
/// delivered in order by [`EventBus::flush`].
pub struct EventBus {
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    pending: Vec<RigEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            observers: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Register a callback observer.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&RigEvent) + 'static,
    {
        self.register(Observer::Callback(Box::new(callback)))
    }

    /// Register a channel observer. It is pruned once the receiver is dropped.
    pub fn subscribe_channel(&mut self) -> (SubscriptionId, Receiver<RigEvent>) {
        let (tx, rx) = mpsc::channel();
        (self.register(Observer::Channel(tx)), rx)
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Queue an event for the next flush.
    pub fn push(&mut self, event: RigEvent) {
        tracing::trace!(event = event.kind(), "rig event");
        self.pending.push(event);
    }

    /// Deliver queued events to every observer, in order.
    pub fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        for event in &pending {
            self.observers.retain_mut(|(_, observer)| match observer {
                Observer::Callback(callback) => {
                    callback(event);
                    true
                }
                Observer::Channel(tx) => tx.send(event.clone()).is_ok(),
            });
        }
    }

    fn register(&mut self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_callbacks_receive_in_order() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe(move |e| sink.borrow_mut().push(e.kind()));

        bus.push(RigEvent::FocusStarted);
        bus.push(RigEvent::FocusFinished);
        assert!(seen.borrow().is_empty());
        bus.flush();
        assert_eq!(*seen.borrow(), vec!["focus_started", "focus_finished"]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        let id = bus.subscribe(move |_| *sink.borrow_mut() += 1);

        bus.push(RigEvent::FocusStarted);
        bus.flush();
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.push(RigEvent::FocusStarted);
        bus.flush();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_channel_observer_pruned_when_receiver_dropped() {
        let mut bus = EventBus::new();
        let (_, rx) = bus.subscribe_channel();
        bus.push(RigEvent::PovChangeEnded {
            pov: "run".to_string(),
        });
        bus.flush();
        assert_eq!(
            rx.try_recv().unwrap(),
            RigEvent::PovChangeEnded {
                pov: "run".to_string()
            }
        );

        drop(rx);
        bus.push(RigEvent::FocusFinished);
        bus.flush();
        assert_eq!(bus.observer_count(), 0);
    }

    #[test]
    fn test_detail() {
        assert_eq!(
            RigEvent::PovChangeStarted {
                pov: "top".to_string()
            }
            .detail()
            .as_deref(),
            Some("top")
        );
        assert!(RigEvent::FocusStarted.detail().is_none());
    }
}
