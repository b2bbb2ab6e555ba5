pub mod stats;

use std::time::Duration;

pub use stats::{FrameStats, StatsPublisher, StatsWindow, SubscriptionId, WindowSample};

/// What the pacer needs from the windowing host.
///
/// The host must invoke the engine's frame callback at most once per
/// `request_animation_frame`, on the same thread as every other engine call.
pub trait FrameHost {
    fn request_animation_frame(&mut self);

    /// Ask for a redraw of the surface.
    fn invalidate(&mut self);
}

/// Host that only remembers what was asked of it, for hosts that poll instead of
/// receiving callbacks (the C ABI, headless loops).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostActions {
    pub invalidate: bool,
    pub request_frame: bool,
}

impl HostActions {
    pub fn take(&mut self) -> HostActions {
        std::mem::take(self)
    }
}

impl FrameHost for HostActions {
    fn request_animation_frame(&mut self) {
        self.request_frame = true;
    }

    fn invalidate(&mut self) {
        self.invalidate = true;
    }
}

/// Display-refresh pacing and frame-time aggregation.
///
/// Single-threaded: the host drives it from its UI thread, so there is nothing to lock.
/// At most one frame request is outstanding at a time.
pub struct FramePacer {
    attached: bool,
    frame_requested: bool,
    render_failed: bool,
    last_timestamp: Option<Duration>,
    window: StatsWindow,
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(StatsWindow::default())
    }
}

impl FramePacer {
    pub fn new(window: StatsWindow) -> Self {
        Self { attached: false, frame_requested: false, render_failed: false, last_timestamp: None, window }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn frame_requested(&self) -> bool {
        self.frame_requested
    }

    pub fn render_failed(&self) -> bool {
        self.render_failed
    }

    pub fn window(&self) -> &StatsWindow {
        &self.window
    }

    pub fn attach(&mut self, host: &mut impl FrameHost) {
        self.attached = true;
        log::debug!("pacer attached");
        self.request_next_frame(host);
    }

    /// Drop all timing state. A request still in flight becomes moot.
    pub fn detach(&mut self) {
        self.attached = false;
        self.frame_requested = false;
        self.last_timestamp = None;
        self.window.reset();
        log::debug!("pacer detached");
    }

    pub fn request_next_frame(&mut self, host: &mut impl FrameHost) {
        if !self.attached || self.frame_requested {
            return;
        }
        self.frame_requested = true;
        host.request_animation_frame();
    }

    /// Display-refresh callback. Returns a window sample when a window just closed.
    pub fn on_animation_frame(&mut self, timestamp: Duration, host: &mut impl FrameHost) -> Option<WindowSample> {
        self.frame_requested = false;
        if !self.attached {
            return None;
        }

        let sample = self.last_timestamp.and_then(|last| {
            // A clock going backwards counts as a zero delta, which the window rejects.
            let delta = timestamp.checked_sub(last).unwrap_or_default();
            self.window.push(delta.as_nanos() as f64 / 1_000_000.0)
        });

        self.last_timestamp = Some(timestamp);
        host.invalidate();
        if !self.render_failed {
            self.request_next_frame(host);
        }
        sample
    }

    pub fn mark_render_failed(&mut self) {
        self.render_failed = true;
    }

    pub fn mark_render_succeeded(&mut self) {
        self.render_failed = false;
    }

    /// Clear the sticky failure and start scheduling again.
    pub fn resume(&mut self, host: &mut impl FrameHost) {
        self.render_failed = false;
        self.request_next_frame(host);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Host double that records what the pacer asked for.
    #[derive(Default)]
    pub(crate) struct RecordingHost {
        pub requests: usize,
        pub invalidations: usize,
    }

    impl FrameHost for RecordingHost {
        fn request_animation_frame(&mut self) {
            self.requests += 1;
        }

        fn invalidate(&mut self) {
            self.invalidations += 1;
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn detached_pacer_never_requests() {
        let mut pacer = FramePacer::default();
        let mut host = RecordingHost::default();
        pacer.request_next_frame(&mut host);
        assert_eq!(host.requests, 0);
        assert!(pacer.on_animation_frame(ms(16), &mut host).is_none());
        assert_eq!(host.invalidations, 0);
    }

    #[test]
    fn at_most_one_request_outstanding() {
        let mut pacer = FramePacer::default();
        let mut host = RecordingHost::default();
        pacer.attach(&mut host);
        pacer.request_next_frame(&mut host);
        pacer.request_next_frame(&mut host);
        assert_eq!(host.requests, 1);

        pacer.on_animation_frame(ms(0), &mut host);
        assert_eq!(host.requests, 2);
        assert_eq!(host.invalidations, 1);
        assert!(pacer.frame_requested());
    }

    #[test]
    fn hundred_ms_frames_emit_one_sample() {
        let mut pacer = FramePacer::default();
        let mut host = RecordingHost::default();
        pacer.attach(&mut host);

        // First frame only seeds the timestamp.
        assert!(pacer.on_animation_frame(ms(1_000), &mut host).is_none());
        let mut samples = Vec::new();
        for i in 1..=5 {
            samples.extend(pacer.on_animation_frame(ms(1_000 + 100 * i), &mut host));
        }
        assert_eq!(samples.len(), 1);
        assert!((samples[0].average_frame_ms - 100.0).abs() < 1e-6);
        assert!((samples[0].fps - 10.0).abs() < 1e-6);
        assert_eq!(pacer.window().frames(), 0);
        assert_eq!(pacer.window().accumulated_ms(), 0.0);
    }

    #[test]
    fn zero_and_long_deltas_are_discarded() {
        let mut pacer = FramePacer::default();
        let mut host = RecordingHost::default();
        pacer.attach(&mut host);

        pacer.on_animation_frame(ms(100), &mut host);
        pacer.on_animation_frame(ms(100), &mut host);
        assert_eq!(pacer.window().frames(), 0);
        pacer.on_animation_frame(ms(350), &mut host);
        assert_eq!(pacer.window().frames(), 0);
        pacer.on_animation_frame(ms(366), &mut host);
        assert_eq!(pacer.window().frames(), 1);
        // Discarded samples still advance the timestamp and keep the loop alive.
        assert_eq!(host.invalidations, 4);
        assert_eq!(host.requests, 5);
    }

    #[test]
    fn failure_suspends_until_resume() {
        let mut pacer = FramePacer::default();
        let mut host = RecordingHost::default();
        pacer.attach(&mut host);
        pacer.mark_render_failed();

        pacer.on_animation_frame(ms(16), &mut host);
        assert_eq!(host.requests, 1);
        assert_eq!(host.invalidations, 1);
        assert!(!pacer.frame_requested());

        pacer.resume(&mut host);
        assert_eq!(host.requests, 2);
        assert!(!pacer.render_failed());
    }

    #[test]
    fn host_actions_collect_one_tick() {
        let mut pacer = FramePacer::default();
        let mut actions = HostActions::default();
        pacer.attach(&mut actions);
        assert_eq!(actions.take(), HostActions { invalidate: false, request_frame: true });

        pacer.on_animation_frame(ms(5), &mut actions);
        assert_eq!(actions.take(), HostActions { invalidate: true, request_frame: true });
        assert_eq!(actions, HostActions::default());
    }

    #[test]
    fn detach_discards_timing_state() {
        let mut pacer = FramePacer::default();
        let mut host = RecordingHost::default();
        pacer.attach(&mut host);
        pacer.on_animation_frame(ms(0), &mut host);
        pacer.on_animation_frame(ms(16), &mut host);
        assert_eq!(pacer.window().frames(), 1);

        pacer.detach();
        assert_eq!(pacer.window().frames(), 0);
        assert!(!pacer.frame_requested());

        pacer.attach(&mut host);
        // No previous timestamp after re-attach: the first frame is not a sample.
        pacer.on_animation_frame(ms(32), &mut host);
        assert_eq!(pacer.window().frames(), 0);
    }
}
