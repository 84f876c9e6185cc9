use crate::system::events::LinkEvent;
use crate::types::ConnectionState;
use log::{debug, info};

/// Edge between two observed connection states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTransition {
    Connected,
    Disconnected,
}

/// Tracks the link state reported by the BLE stack against the state the
/// device cycle last acted on.
///
/// Every event is folded in order, so a connect followed by a disconnect
/// between two iterations still yields both edges.
#[derive(Debug, Default)]
pub struct ConnectionTracker {
    current: ConnectionState,
    previous: ConnectionState,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: LinkEvent) -> Option<LinkTransition> {
        self.current = match event {
            LinkEvent::Connected => ConnectionState::Connected,
            LinkEvent::Disconnected => ConnectionState::Disconnected,
        };

        let transition = match (self.previous, self.current) {
            (ConnectionState::Disconnected, ConnectionState::Connected) => {
                Some(LinkTransition::Connected)
            }
            (ConnectionState::Connected, ConnectionState::Disconnected) => {
                Some(LinkTransition::Disconnected)
            }
            _ => {
                debug!("Repeated link event ignored: {:?}", event);
                None
            }
        };

        if let Some(transition) = transition {
            info!(
                "BLE link: {} -> {}",
                self.previous.as_str(),
                self.current.as_str()
            );
            self.previous = self.current;
            return Some(transition);
        }
        None
    }

    pub fn state(&self) -> ConnectionState {
        self.current
    }

    pub fn is_connected(&self) -> bool {
        self.current.is_connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_then_disconnect_edges() {
        let mut tracker = ConnectionTracker::new();
        assert!(!tracker.is_connected());

        assert_eq!(
            tracker.apply(LinkEvent::Connected),
            Some(LinkTransition::Connected)
        );
        assert!(tracker.is_connected());

        assert_eq!(
            tracker.apply(LinkEvent::Disconnected),
            Some(LinkTransition::Disconnected)
        );
        assert_eq!(tracker.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_repeated_events_produce_one_edge() {
        let mut tracker = ConnectionTracker::new();
        tracker.apply(LinkEvent::Connected);
        assert_eq!(tracker.apply(LinkEvent::Connected), None);

        assert_eq!(
            tracker.apply(LinkEvent::Disconnected),
            Some(LinkTransition::Disconnected)
        );
        assert_eq!(tracker.apply(LinkEvent::Disconnected), None);
        assert!(!tracker.is_connected());
    }

    #[test]
    fn test_disconnect_without_connection_is_not_an_edge() {
        let mut tracker = ConnectionTracker::new();
        assert_eq!(tracker.apply(LinkEvent::Disconnected), None);
        assert_eq!(tracker.apply(LinkEvent::Connected), Some(LinkTransition::Connected));
    }
}
