use crate::error::{backend, Result};
use crate::render::device::RenderDevice;
use crate::render::frame::{Color, Point};

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear(Color),
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    Stroke { color: Color, width: f32, verbs: usize },
}

/// Device that records what the renderer asks for instead of rasterizing.
///
/// Used headless to measure scene-side cost without a rasterizer, and as the
/// surface double in tests. `record_ops` off keeps only the counters.
#[derive(Default)]
pub struct RecordingDevice {
    pub ops: Vec<DrawOp>,
    pub clears: usize,
    pub strokes: usize,
    record_ops: bool,
    open_verbs: usize,
    fail_with: Option<String>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self { record_ops: true, ..Self::default() }
    }

    /// Counters only; no per-op storage.
    pub fn counting() -> Self {
        Self::default()
    }

    /// Make every subsequent stroke fail with `message`.
    pub fn fail_strokes(&mut self, message: &str) {
        self.fail_with = Some(message.to_string());
    }

    pub fn reset(&mut self) {
        self.ops.clear();
        self.clears = 0;
        self.strokes = 0;
        self.open_verbs = 0;
    }

    fn push(&mut self, op: DrawOp) {
        if self.record_ops {
            self.ops.push(op);
        }
    }
}

impl RenderDevice for RecordingDevice {
    fn clear(&mut self, color: Color) {
        self.clears += 1;
        self.push(DrawOp::Clear(color));
    }

    fn begin_path(&mut self) {
        self.open_verbs = 0;
        self.push(DrawOp::BeginPath);
    }

    fn move_to(&mut self, p: Point) {
        self.open_verbs += 1;
        self.push(DrawOp::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.open_verbs += 1;
        self.push(DrawOp::LineTo(p));
    }

    fn quad_to(&mut self, control: Point, p: Point) {
        self.open_verbs += 1;
        self.push(DrawOp::QuadTo(control, p));
    }

    fn cubic_to(&mut self, control1: Point, control2: Point, p: Point) {
        self.open_verbs += 1;
        self.push(DrawOp::CubicTo(control1, control2, p));
    }

    fn stroke_path(&mut self, color: Color, width: f32) -> Result<()> {
        if let Some(msg) = &self.fail_with {
            return Err(backend(msg));
        }
        self.strokes += 1;
        let verbs = self.open_verbs;
        self.push(DrawOp::Stroke { color, width, verbs });
        Ok(())
    }
}
