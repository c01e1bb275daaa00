//! Multi-press debouncer for Hue remote buttons.
//!
//! Hue dimmer remotes report every short press as an individual `press`
//! notification. The [`PressDebouncer`] folds a burst of presses on the same
//! button into a single click count, delivered once the button has been
//! quiet for the debounce window.
//!
//! ## States
//! - Idle - no burst in progress
//! - Accumulating(button, count) - a settle timer is pending for `button`
//!
//! A press on another button abandons the current burst without emitting.
//! A settle timer that is overdue when the next press arrives is flushed
//! first, so every finished burst is reported exactly once.

use log::debug;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Default quiet period before a burst is reported.
pub const DEFAULT_THRESHOLD: Duration = Duration::from_millis(300);

/// Receives the final click count of a burst.
pub type PressCallback = Box<dyn FnOnce(u32) + Send + 'static>;

struct DebounceState<B> {
    last_click: Option<Instant>,
    click_counter: u32,
    active_button: Option<B>,
    /// Single-use slot, taken by whoever settles the burst
    pending_callback: Option<PressCallback>,
    pending_timer: Option<JoinHandle<()>>,
    /// Bumped on every press; a timer from an older generation is stale
    generation: u64,
}

impl<B> DebounceState<B> {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.pending_timer.take() {
            timer.abort();
        }
    }

    /// Leave the accumulating state, handing back the callback and count.
    fn settle(&mut self) -> Option<(PressCallback, u32)> {
        self.cancel_timer();
        self.active_button = None;
        self.pending_callback
            .take()
            .map(|callback| (callback, self.click_counter))
    }
}

/// Aggregates repeated presses of one button into a click count.
///
/// One instance belongs to one remote. Must be used from within a tokio
/// runtime, since every press schedules a settle task.
pub struct PressDebouncer<B> {
    threshold: Duration,
    state: Arc<Mutex<DebounceState<B>>>,
}

impl<B> PressDebouncer<B>
where
    B: PartialEq + Clone + Debug + Send + 'static,
{
    /// Create a debouncer with the default 300 ms window.
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_THRESHOLD)
    }

    pub fn with_threshold(threshold: Duration) -> Self {
        Self {
            threshold,
            state: Arc::new(Mutex::new(DebounceState {
                last_click: None,
                click_counter: 1,
                active_button: None,
                pending_callback: None,
                pending_timer: None,
                generation: 0,
            })),
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// True when no burst is being accumulated.
    pub fn is_idle(&self) -> bool {
        self.state.lock().active_button.is_none()
    }

    /// Button of the burst in progress, if any.
    pub fn pending_button(&self) -> Option<B> {
        self.state.lock().active_button.clone()
    }

    /// Presses counted so far in the current burst.
    pub fn click_count(&self) -> u32 {
        self.state.lock().click_counter
    }

    /// Register a press of `button`.
    ///
    /// `callback` replaces any callback registered earlier in the burst and
    /// is invoked once, `threshold` after the last press of the burst, with
    /// the number of presses counted.
    pub fn press<F>(&self, callback: F, button: B)
    where
        F: FnOnce(u32) + Send + 'static,
    {
        let now = Instant::now();
        let threshold = self.threshold;

        let overdue = {
            let mut state = self.state.lock();

            // The previous burst already ended but its timer has not run yet
            let overdue = if state.pending_timer.is_some()
                && state.last_click.is_some_and(|last| now >= last + threshold)
            {
                state.settle()
            } else {
                None
            };

            state.pending_callback = Some(Box::new(callback));

            if state.active_button.as_ref() != Some(&button) {
                state.cancel_timer();
                state.click_counter = 1;
                state.active_button = Some(button);
            } else if state
                .last_click
                .is_none_or(|last| now.duration_since(last) > threshold)
            {
                state.cancel_timer();
                state.click_counter = 1;
            } else {
                state.cancel_timer();
                state.click_counter += 1;
            }

            state.last_click = Some(now);
            state.generation = state.generation.wrapping_add(1);

            debug!(
                "[Hue] press {:?}: click_counter={}",
                state.active_button, state.click_counter
            );

            let generation = state.generation;
            let shared = Arc::clone(&self.state);
            let deadline = now + threshold;
            state.pending_timer = Some(tokio::spawn(async move {
                tokio::time::sleep_until(deadline).await;

                let fired = {
                    let mut state = shared.lock();
                    if state.generation != generation {
                        return;
                    }
                    // Already finished, nothing to abort
                    state.pending_timer = None;
                    state.settle()
                };

                if let Some((callback, count)) = fired {
                    callback(count);
                }
            }));

            overdue
        };

        if let Some((callback, count)) = overdue {
            debug!("[Hue] flushing overdue burst: click_count={}", count);
            callback(count);
        }
    }
}

impl<B> Default for PressDebouncer<B>
where
    B: PartialEq + Clone + Debug + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    type Log = Arc<Mutex<Vec<(&'static str, u32, Duration)>>>;

    fn recorder(
        log: Log,
        start: Instant,
        tag: &'static str,
    ) -> impl FnOnce(u32) + Send + 'static {
        move |count| log.lock().push((tag, count, start.elapsed()))
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_press_fires_after_threshold() {
        let debouncer = PressDebouncer::new();
        let log: Log = Arc::default();
        let start = Instant::now();

        debouncer.press(recorder(log.clone(), start, "a"), "a");
        assert_eq!(debouncer.pending_button(), Some("a"));

        sleep(ms(299)).await;
        assert!(log.lock().is_empty());

        sleep(ms(10)).await;
        assert_eq!(*log.lock(), vec![("a", 1, ms(300))]);
        assert!(debouncer.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_counts_presses() {
        let debouncer = PressDebouncer::new();
        let log: Log = Arc::default();
        let start = Instant::now();

        for _ in 0..4 {
            debouncer.press(recorder(log.clone(), start, "a"), "a");
            sleep(ms(250)).await;
        }
        assert!(log.lock().is_empty());
        assert_eq!(debouncer.click_count(), 4);

        sleep(ms(100)).await;
        // Last press at 750 ms
        assert_eq!(*log.lock(), vec![("a", 4, ms(1050))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_callback_is_invoked() {
        let debouncer = PressDebouncer::new();
        let log: Log = Arc::default();
        let start = Instant::now();

        debouncer.press(recorder(log.clone(), start, "first"), 1u8);
        sleep(ms(50)).await;
        debouncer.press(recorder(log.clone(), start, "second"), 1u8);
        sleep(ms(1000)).await;

        assert_eq!(*log.lock(), vec![("second", 2, ms(350))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gap_beyond_threshold_starts_new_burst() {
        let debouncer = PressDebouncer::new();
        let log: Log = Arc::default();
        let start = Instant::now();

        debouncer.press(recorder(log.clone(), start, "off"), "off");
        sleep(ms(400)).await;
        debouncer.press(recorder(log.clone(), start, "off"), "off");
        sleep(ms(1000)).await;

        assert_eq!(
            *log.lock(),
            vec![("off", 1, ms(300)), ("off", 1, ms(700))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_button_switch_abandons_burst() {
        let debouncer = PressDebouncer::new();
        let log: Log = Arc::default();
        let start = Instant::now();

        debouncer.press(recorder(log.clone(), start, "on"), "on");
        sleep(ms(100)).await;
        debouncer.press(recorder(log.clone(), start, "on"), "on");
        sleep(ms(100)).await;
        debouncer.press(recorder(log.clone(), start, "up"), "up");
        assert_eq!(debouncer.click_count(), 1);
        sleep(ms(1000)).await;

        assert_eq!(*log.lock(), vec![("up", 1, ms(500))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_press_after_settle_starts_fresh() {
        let debouncer = PressDebouncer::new();
        let log: Log = Arc::default();
        let start = Instant::now();

        debouncer.press(recorder(log.clone(), start, "a"), "a");
        debouncer.press(recorder(log.clone(), start, "a"), "a");
        sleep(ms(300)).await;
        // The timer fired exactly at the window edge; this press is a new burst
        debouncer.press(recorder(log.clone(), start, "a"), "a");
        sleep(ms(1000)).await;

        assert_eq!(*log.lock(), vec![("a", 2, ms(300)), ("a", 1, ms(600))]);
    }

    #[tokio::test]
    async fn test_overdue_timer_is_flushed_not_doubled() {
        // Block the runtime so the first settle task cannot run before the
        // second press arrives, well past the window.
        let debouncer = PressDebouncer::with_threshold(ms(50));
        let log: Log = Arc::default();
        let start = Instant::now();

        debouncer.press(recorder(log.clone(), start, "first"), "a");
        std::thread::sleep(ms(120));
        debouncer.press(recorder(log.clone(), start, "second"), "a");

        {
            let log = log.lock();
            assert_eq!(log.len(), 1);
            assert_eq!((log[0].0, log[0].1), ("first", 1));
        }

        sleep(ms(200)).await;
        let log = log.lock();
        assert_eq!(log.len(), 2);
        assert_eq!((log[1].0, log[1].1), ("second", 1));
    }
}
