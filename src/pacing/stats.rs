use crate::error::SubscribeError;

pub const STATS_WINDOW_MS: f64 = 500.0;

/// Deltas at or above this are hitches (backgrounded window, debugger pause) and are dropped.
pub const MAX_FRAME_DELTA_MS: f64 = 250.0;

pub const MAX_SUBSCRIBERS: usize = 8;

/// Throughput sample for one aggregation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStats {
    pub complexity: i32,
    pub element_count: usize,
    pub average_frame_time_ms: f64,
    pub fps: f64,
}

/// Average of one closed window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowSample {
    pub average_frame_ms: f64,
    pub fps: f64,
    pub frames: u32,
}

/// Rolling frame-time accumulator.
#[derive(Clone, Debug)]
pub struct StatsWindow {
    window_ms: f64,
    max_delta_ms: f64,
    accumulated_ms: f64,
    frames: u32,
}

impl Default for StatsWindow {
    fn default() -> Self {
        Self::new(STATS_WINDOW_MS, MAX_FRAME_DELTA_MS)
    }
}

impl StatsWindow {
    pub fn new(window_ms: f64, max_delta_ms: f64) -> Self {
        Self { window_ms, max_delta_ms, accumulated_ms: 0.0, frames: 0 }
    }

    pub fn accumulated_ms(&self) -> f64 {
        self.accumulated_ms
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Whether a delta counts. `0 < delta < max` only.
    pub fn accepts(&self, delta_ms: f64) -> bool {
        delta_ms > 0.0 && delta_ms < self.max_delta_ms
    }

    /// Feed one inter-frame delta. Returns the window average once the window is full,
    /// after which the accumulator starts over.
    pub fn push(&mut self, delta_ms: f64) -> Option<WindowSample> {
        if !self.accepts(delta_ms) {
            return None;
        }
        self.accumulated_ms += delta_ms;
        self.frames += 1;

        if self.accumulated_ms < self.window_ms {
            return None;
        }
        let average_frame_ms = self.accumulated_ms / self.frames as f64;
        let fps = if average_frame_ms > 0.0 { 1000.0 / average_frame_ms } else { 0.0 };
        let sample = WindowSample { average_frame_ms, fps, frames: self.frames };
        self.reset();
        Some(sample)
    }

    pub fn reset(&mut self) {
        self.accumulated_ms = 0.0;
        self.frames = 0;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

impl SubscriptionId {
    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

type StatsCallback = Box<dyn FnMut(&FrameStats)>;

/// Bounded set of `FrameStats` observers.
pub struct StatsPublisher {
    subscribers: Vec<(SubscriptionId, StatsCallback)>,
    next_id: u32,
    capacity: usize,
    published: u64,
}

impl Default for StatsPublisher {
    fn default() -> Self {
        Self::with_capacity(MAX_SUBSCRIBERS)
    }
}

impl StatsPublisher {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { subscribers: Vec::with_capacity(capacity), next_id: 1, capacity, published: 0 }
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&FrameStats) + 'static) -> Result<SubscriptionId, SubscribeError> {
        if self.subscribers.len() >= self.capacity {
            return Err(SubscribeError::Full(self.capacity));
        }
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.subscribers.push((id, Box::new(callback)));
        Ok(id)
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn published(&self) -> u64 {
        self.published
    }

    pub fn publish(&mut self, stats: &FrameStats) {
        self.published += 1;
        for (_, callback) in self.subscribers.iter_mut() {
            callback(stats);
        }
    }
}
