//! Events delivered into the device cycle from other tasks
//!
//! BLE link callbacks run on the NimBLE host task and the tare button is
//! polled by its own embassy task. Neither touches controller state; both
//! post into bounded channels that the cycle drains once per iteration.

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use log::warn;

/// Link presence change reported by the BLE stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Connected,
    Disconnected,
}

/// Requests coming from the physical buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Tare,
}

pub type LinkEventChannel = Channel<CriticalSectionRawMutex, LinkEvent, 8>;
pub type UserCommandChannel = Channel<CriticalSectionRawMutex, UserCommand, 4>;

/// Non-blocking post, safe to call from foreign callbacks.
pub fn post_link_event(channel: &LinkEventChannel, event: LinkEvent) {
    if channel.try_send(event).is_err() {
        warn!("Link event channel full, dropping {:?}", event);
    }
}

pub fn post_user_command(channel: &UserCommandChannel, command: UserCommand) {
    if channel.try_send(command).is_err() {
        warn!("User command channel full, dropping {:?}", command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_events_keep_order() {
        let channel = LinkEventChannel::new();
        post_link_event(&channel, LinkEvent::Connected);
        post_link_event(&channel, LinkEvent::Disconnected);

        assert_eq!(channel.try_receive().ok(), Some(LinkEvent::Connected));
        assert_eq!(channel.try_receive().ok(), Some(LinkEvent::Disconnected));
        assert!(channel.try_receive().is_err());
    }

    #[test]
    fn test_full_channel_drops_instead_of_blocking() {
        let channel = UserCommandChannel::new();
        for _ in 0..10 {
            post_user_command(&channel, UserCommand::Tare);
        }

        let mut received = 0;
        while channel.try_receive().is_ok() {
            received += 1;
        }
        assert_eq!(received, 4);
    }
}
