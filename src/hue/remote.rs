//! Hue remote cluster handler (0xFC00).
//!
//! The Hue dimmer remote reports button activity through a
//! manufacturer-specific `notification` command instead of the standard
//! OnOff/LevelControl commands. This handler decodes those notifications
//! into `{button}_{press_type}` actions.
//!
//! ## Press handling
//! - `press` notifications go through a [`PressDebouncer`] and are reported
//!   as `press`, `double_press`, ... `quintuple_press` once the burst settles
//! - `hold`, `short_release`, `long_release` are reported immediately

use super::codes::{ButtonCode, MultiPress, PressType, PressTypeCode};
use super::debounce::PressDebouncer;
use super::events::{EventKind, EventListener, RemoteEvent};
use super::notification::{NotificationArgs, ZclHeader};
use log::debug;
use std::sync::Arc;
use std::time::Duration;

/// Manufacturer-specific cluster ID used by Hue remotes.
pub const CLUSTER_ID: u16 = 0xFC00;

/// Command ID of the `notification` client command.
pub const NOTIFICATION_COMMAND_ID: u8 = 0x00;

/// Turns remote notifications into device events.
///
/// Each remote owns one dispatcher, and with it one debouncer.
pub struct RemoteEventDispatcher {
    debouncer: PressDebouncer<ButtonCode>,
    listener: Arc<dyn EventListener>,
}

impl RemoteEventDispatcher {
    pub fn new(listener: Arc<dyn EventListener>) -> Self {
        Self {
            debouncer: PressDebouncer::new(),
            listener,
        }
    }

    pub fn with_threshold(listener: Arc<dyn EventListener>, threshold: Duration) -> Self {
        Self {
            debouncer: PressDebouncer::with_threshold(threshold),
            listener,
        }
    }

    pub fn debouncer(&self) -> &PressDebouncer<ButtonCode> {
        &self.debouncer
    }

    /// Handle a `notification` command from the remote.
    pub fn handle_cluster_request(&self, hdr: &ZclHeader, args: &NotificationArgs) {
        debug!(
            "[Hue] cluster 0x{:04X} request tsn: [{}] command id: {} - args: {:?}",
            CLUSTER_ID,
            hdr.tsn,
            hdr.command_id,
            args.to_vec()
        );

        let button = ButtonCode::from_code(args.button);
        let press_type = PressTypeCode::from_code(args.press_type);

        let mut event = RemoteEvent {
            button,
            press_type: press_type.into(),
            command_id: hdr.command_id,
            args: args.to_vec(),
        };

        if press_type.known() == Some(&PressType::Press) {
            let listener = Arc::clone(&self.listener);
            let send_press_event = move |click_count: u32| {
                debug!("[Hue] send_press_event click_count: [{}]", click_count);
                if let Some(label) = MultiPress::from_count(click_count) {
                    event.press_type = label.into();
                    let action = format!("{}_{}", button, label);
                    listener.listener_event(EventKind::SendEvent, &action, &event);
                }
            };
            self.debouncer.press(send_press_event, button);
        } else {
            let action = format!("{}_{}", button, press_type);
            self.listener
                .listener_event(EventKind::SendEvent, &action, &event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hue::codes::Decoded;
    use crate::hue::events::{ChannelListener, EmittedEvent};
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::time::{Instant, sleep};

    fn dispatcher() -> (RemoteEventDispatcher, UnboundedReceiver<EmittedEvent>) {
        let (listener, rx) = ChannelListener::channel("Dimmer");
        (RemoteEventDispatcher::new(Arc::new(listener)), rx)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn notify(dispatcher: &RemoteEventDispatcher, tsn: u8, button: u8, press_type: u8) {
        dispatcher.handle_cluster_request(
            &ZclHeader::new(tsn, NOTIFICATION_COMMAND_ID),
            &NotificationArgs::new(button, press_type),
        );
    }

    /// Records each action with the time it was emitted.
    struct TimedListener {
        start: Instant,
        seen: parking_lot::Mutex<Vec<(String, Duration)>>,
    }

    impl EventListener for TimedListener {
        fn listener_event(&self, _kind: EventKind, action: &str, _payload: &RemoteEvent) {
            self.seen
                .lock()
                .push((action.to_string(), self.start.elapsed()));
        }
    }

    fn timed() -> (RemoteEventDispatcher, Arc<TimedListener>) {
        let listener = Arc::new(TimedListener {
            start: Instant::now(),
            seen: parking_lot::Mutex::new(Vec::new()),
        });
        let dispatcher = RemoteEventDispatcher::new(listener.clone());
        (dispatcher, listener)
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_press() {
        let (dispatcher, mut rx) = dispatcher();

        notify(&dispatcher, 1, 4, 0);
        assert!(rx.try_recv().is_err());

        sleep(ms(300)).await;
        let event = rx.recv().await.unwrap();
        assert_eq!(event.action, "off_press");
        assert_eq!(event.kind, EventKind::SendEvent);
        assert_eq!(event.payload.press_type, Decoded::Known("press"));
        assert_eq!(event.payload.args, vec![4, 0, 0, 0, 0, 0]);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_triple_press_emits_once_after_last_press() {
        let (dispatcher, listener) = timed();

        notify(&dispatcher, 1, 1, 0);
        sleep(ms(100)).await;
        notify(&dispatcher, 2, 1, 0);
        sleep(ms(100)).await;
        notify(&dispatcher, 3, 1, 0);
        sleep(ms(1000)).await;

        assert_eq!(
            *listener.seen.lock(),
            vec![("on_triple_press".to_string(), ms(500))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_multi_press_labels() {
        for (presses, action) in [
            (2, "up_double_press"),
            (3, "up_triple_press"),
            (4, "up_quadruple_press"),
            (5, "up_quintuple_press"),
            (8, "up_quintuple_press"),
        ] {
            let (dispatcher, mut rx) = dispatcher();
            for tsn in 0..presses {
                notify(&dispatcher, tsn, 2, 0);
                sleep(ms(150)).await;
            }
            sleep(ms(500)).await;

            let event = rx.try_recv().unwrap();
            assert_eq!(event.action, action);
            assert_eq!(
                event.payload.press_type.to_string(),
                action.trim_start_matches("up_")
            );
            assert!(rx.try_recv().is_err(), "one event per burst");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts() {
        let (dispatcher, listener) = timed();

        notify(&dispatcher, 1, 4, 0);
        sleep(ms(400)).await;
        notify(&dispatcher, 2, 4, 0);
        sleep(ms(1000)).await;

        assert_eq!(
            *listener.seen.lock(),
            vec![
                ("off_press".to_string(), ms(300)),
                ("off_press".to_string(), ms(700)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_button_switch_mid_burst() {
        let (dispatcher, mut rx) = dispatcher();

        notify(&dispatcher, 1, 1, 0);
        sleep(ms(100)).await;
        notify(&dispatcher, 2, 1, 0);
        sleep(ms(100)).await;
        notify(&dispatcher, 3, 3, 0);
        sleep(ms(1000)).await;

        let event = rx.try_recv().unwrap();
        assert_eq!(event.action, "down_press");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_emits_immediately() {
        let (dispatcher, mut rx) = dispatcher();

        notify(&dispatcher, 7, 2, 1);
        let event = rx.try_recv().unwrap();
        assert_eq!(event.action, "up_hold");
        assert_eq!(event.payload.press_type, Decoded::Known("hold"));
        assert!(dispatcher.debouncer().is_idle());

        notify(&dispatcher, 8, 2, 1);
        notify(&dispatcher, 9, 2, 3);
        assert_eq!(rx.try_recv().unwrap().action, "up_hold");
        assert_eq!(rx.try_recv().unwrap().action, "up_long_release");
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_does_not_disturb_burst() {
        let (dispatcher, mut rx) = dispatcher();

        notify(&dispatcher, 1, 1, 0);
        notify(&dispatcher, 2, 1, 2);
        sleep(ms(100)).await;
        notify(&dispatcher, 3, 1, 0);
        notify(&dispatcher, 4, 1, 2);

        assert_eq!(rx.try_recv().unwrap().action, "on_short_release");
        assert_eq!(rx.try_recv().unwrap().action, "on_short_release");

        sleep(ms(400)).await;
        assert_eq!(rx.try_recv().unwrap().action, "on_double_press");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_codes_pass_through() {
        let (dispatcher, mut rx) = dispatcher();

        notify(&dispatcher, 1, 9, 5);
        let event = rx.try_recv().unwrap();
        assert_eq!(event.action, "9_5");
        assert_eq!(event.payload.button, ButtonCode::from_code(9));
        assert_eq!(event.payload.press_type, Decoded::Raw(5));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["button"], 9);
        assert_eq!(json["press_type"], 5);
        assert_eq!(json["action"], "9_5");

        notify(&dispatcher, 2, 9, 0);
        sleep(ms(300)).await;
        assert_eq!(rx.recv().await.unwrap().action, "9_press");
    }

    #[tokio::test(start_paused = true)]
    async fn test_remotes_do_not_share_state() {
        let (kitchen, mut kitchen_rx) = dispatcher();
        let (hallway, mut hallway_rx) = dispatcher();

        notify(&kitchen, 1, 1, 0);
        notify(&hallway, 1, 1, 0);
        sleep(ms(100)).await;
        notify(&kitchen, 2, 1, 0);
        sleep(ms(500)).await;

        assert_eq!(kitchen_rx.try_recv().unwrap().action, "on_double_press");
        assert_eq!(hallway_rx.try_recv().unwrap().action, "on_press");
    }
}
