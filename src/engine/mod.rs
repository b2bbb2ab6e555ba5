use std::time::Duration;

use crate::error::{RenderError, Result, SubscribeError};
use crate::pacing::{FrameHost, FramePacer, FrameStats, StatsPublisher, StatsWindow, SubscriptionId};
use crate::render::device::RenderDevice;
use crate::render::{FrameSummary, Renderer, Viewport};
use crate::scene::Scene;
use crate::util::config::{bench_config, BenchConfig};

/// Logs render failures, once per distinct message.
#[derive(Debug, Default)]
pub struct ErrorReporter {
    last: Option<String>,
    emitted: u64,
}

impl ErrorReporter {
    /// Returns `true` if the error was logged, `false` if it repeated the last one.
    pub fn report(&mut self, err: &RenderError) -> bool {
        let message = err.to_string();
        if self.last.as_deref() == Some(message.as_str()) {
            return false;
        }
        log::error!("render failed: {message}");
        self.last = Some(message);
        self.emitted += 1;
        true
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

/// High-level benchmark state, owned by the host (or by the C-side handle).
///
/// Every call comes from the host's UI thread; the engine never blocks or spawns.
pub struct Engine {
    scene: Scene,
    renderer: Renderer,
    pacer: FramePacer,
    publisher: StatsPublisher,
    errors: ErrorReporter,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(bench_config())
    }
}

impl Engine {
    pub fn new(config: &BenchConfig) -> Self {
        let scene = match config.seed {
            Some(seed) => Scene::with_seed(config.complexity, seed),
            None => Scene::new(config.complexity),
        };
        log::debug!("engine: complexity={} seed={:?}", scene.complexity(), config.seed);

        Self {
            scene,
            renderer: Renderer::with_split_toggle(config.split_toggle()),
            pacer: FramePacer::new(StatsWindow::new(config.stats_window_ms, config.max_frame_delta_ms)),
            publisher: StatsPublisher::default(),
            errors: ErrorReporter::default(),
        }
    }

    pub fn complexity(&self) -> i32 {
        self.scene.complexity()
    }

    pub fn element_count(&self) -> usize {
        self.scene.element_count()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn errors(&self) -> &ErrorReporter {
        &self.errors
    }

    /// Apply a new level (clamped to `[0, 24]`) and ask for a frame so it shows up.
    pub fn set_complexity(&mut self, level: i32, host: &mut impl FrameHost) {
        if self.scene.set_complexity(level) {
            log::debug!("complexity -> {} ({} elements)", self.scene.complexity(), self.scene.element_count());
            self.pacer.request_next_frame(host);
        }
    }

    pub fn attach(&mut self, host: &mut impl FrameHost) {
        self.scene.ensure_size();
        self.pacer.attach(host);
    }

    pub fn detach(&mut self) {
        self.pacer.detach();
    }

    /// Clear a sticky render failure and restart the frame loop.
    pub fn resume(&mut self, host: &mut impl FrameHost) {
        self.errors.clear();
        self.pacer.resume(host);
        log::debug!("resumed after render failure");
    }

    /// Display-refresh callback. Publishes and returns stats when a window closes.
    pub fn on_animation_frame(&mut self, timestamp: Duration, host: &mut impl FrameHost) -> Option<FrameStats> {
        let sample = self.pacer.on_animation_frame(timestamp, host)?;
        let stats = FrameStats {
            complexity: self.scene.complexity(),
            element_count: self.scene.element_count(),
            average_frame_time_ms: sample.average_frame_ms,
            fps: sample.fps,
        };
        log::trace!(
            "stats: level={} elements={} avg={:.2}ms fps={:.1}",
            stats.complexity,
            stats.element_count,
            stats.average_frame_time_ms,
            stats.fps
        );
        self.publisher.publish(&stats);
        Some(stats)
    }

    /// Draw one frame. `acquire` hands out the per-frame device with the viewport
    /// transform and clip already applied; it is not called for an empty viewport.
    pub fn render_frame<D, F>(&mut self, viewport: Viewport, acquire: F) -> Result<FrameSummary>
    where
        D: RenderDevice,
        F: FnOnce(Viewport) -> Result<D>,
    {
        if !viewport.is_drawable() {
            return Ok(FrameSummary::default());
        }

        let result = acquire(viewport).and_then(|mut device| {
            self.renderer.render(&mut self.scene, &mut device, viewport.width, viewport.height)
        });

        match &result {
            Ok(_) => self.pacer.mark_render_succeeded(),
            Err(err) if !err.is_sticky() => log::debug!("frame skipped: {err}"),
            Err(err) => {
                self.errors.report(err);
                self.pacer.mark_render_failed();
            }
        }
        result
    }

    pub fn subscribe_stats(
        &mut self,
        callback: impl FnMut(&FrameStats) + 'static,
    ) -> std::result::Result<SubscriptionId, SubscribeError> {
        self.publisher.subscribe(callback)
    }

    pub fn unsubscribe_stats(&mut self, id: SubscriptionId) -> bool {
        self.publisher.unsubscribe(id)
    }
}
