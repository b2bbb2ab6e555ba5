pub mod device;
mod frame;

pub use frame::{Color, Point, Viewport};

use rand::Rng;

use crate::error::Result;
use crate::render::device::RenderDevice;
use crate::scene::{Element, GridLayout, Scene, SegmentKind};

pub const BACKGROUND: Color = Color::from_rgb(12, 16, 24);

/// Chance per element per frame that its split flag flips.
pub const SPLIT_TOGGLE_PROBABILITY: f64 = 0.005;

/// What one `render` call issued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    pub segments: usize,
    pub draw_calls: usize,
}

/// Scene renderer facade.
///
/// Holds no per-frame state; the backend behind `RenderDevice` owns the path and
/// paint it reuses.
pub struct Renderer {
    split_toggle_probability: f64,
    frames: u64,
    last: FrameSummary,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::with_split_toggle(SPLIT_TOGGLE_PROBABILITY)
    }

    /// `0.0` freezes batch boundaries; used for reproducible headless runs.
    pub fn with_split_toggle(probability: f64) -> Self {
        Self { split_toggle_probability: probability.clamp(0.0, 1.0), frames: 0, last: FrameSummary::default() }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_summary(&self) -> FrameSummary {
        self.last
    }

    /// Draw the scene into a `width x height` area of `device`.
    ///
    /// Re-asserts the scene size first; that is a no-op unless a complexity change
    /// was missed.
    pub fn render<D: RenderDevice>(
        &mut self,
        scene: &mut Scene,
        device: &mut D,
        width: f32,
        height: f32,
    ) -> Result<FrameSummary> {
        scene.ensure_size();
        let (elements, rng) = scene.frame_parts();
        self.draw_elements(elements, rng, device, width, height)
    }

    /// Contiguous elements are appended to one path; an element with `split` set (or
    /// the last element) closes the batch with a single stroke in its own color and
    /// width. A failing stroke abandons the rest of the frame.
    pub(crate) fn draw_elements<D: RenderDevice, R: Rng>(
        &mut self,
        elements: &mut [Element],
        rng: &mut R,
        device: &mut D,
        width: f32,
        height: f32,
    ) -> Result<FrameSummary> {
        let Some(layout) = GridLayout::fit(width, height) else {
            return Ok(FrameSummary::default());
        };

        self.frames = self.frames.wrapping_add(1);
        device.clear(BACKGROUND);

        let mut summary = FrameSummary::default();
        if elements.is_empty() {
            self.last = summary;
            return Ok(summary);
        }

        let toggle = self.split_toggle_probability;
        let last_index = elements.len() - 1;
        let mut path_open = false;
        device.begin_path();

        for (i, element) in elements.iter_mut().enumerate() {
            if !path_open {
                device.move_to(element.start.to_point(&layout));
                path_open = true;
            }

            let end = element.end.to_point(&layout);
            match element.kind {
                SegmentKind::Line => device.line_to(end),
                SegmentKind::Quad => device.quad_to(element.control1.to_point(&layout), end),
                SegmentKind::Cubic => device.cubic_to(
                    element.control1.to_point(&layout),
                    element.control2.to_point(&layout),
                    end,
                ),
            }
            summary.segments += 1;

            if element.split || i == last_index {
                device.stroke_path(element.color, element.width)?;
                device.begin_path();
                path_open = false;
                summary.draw_calls += 1;
            }

            if toggle > 0.0 && rng.gen_bool(toggle) {
                element.split = !element.split;
            }
        }

        self.last = summary;
        Ok(summary)
    }
}
