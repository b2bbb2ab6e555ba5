#[cfg(feature = "native-skia")]
pub mod native;
pub mod pixmap;
pub mod recording;

use crate::error::Result;
use crate::render::frame::{Color, Point};

/// Per-frame drawing surface.
///
/// Design rule: only `render/device/*` can touch backend APIs. A backend hands out a
/// `RenderDevice` for one frame with origin, clip and scaling already applied; the
/// path builder and stroke paint behind it are reused across frames.
pub trait RenderDevice {
    fn clear(&mut self, color: Color);

    /// Reset the path builder. Keeps its storage.
    fn begin_path(&mut self);

    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    fn quad_to(&mut self, control: Point, p: Point);
    fn cubic_to(&mut self, control1: Point, control2: Point, p: Point);

    /// Stroke the accumulated path with a round-capped, round-joined, anti-aliased pen.
    ///
    /// The path is left as-is; callers reset it with `begin_path`.
    fn stroke_path(&mut self, color: Color, width: f32) -> Result<()>;
}

impl<D: RenderDevice + ?Sized> RenderDevice for &mut D {
    fn clear(&mut self, color: Color) {
        (**self).clear(color)
    }

    fn begin_path(&mut self) {
        (**self).begin_path()
    }

    fn move_to(&mut self, p: Point) {
        (**self).move_to(p)
    }

    fn line_to(&mut self, p: Point) {
        (**self).line_to(p)
    }

    fn quad_to(&mut self, control: Point, p: Point) {
        (**self).quad_to(control, p)
    }

    fn cubic_to(&mut self, control1: Point, control2: Point, p: Point) {
        (**self).cubic_to(control1, control2, p)
    }

    fn stroke_path(&mut self, color: Color, width: f32) -> Result<()> {
        (**self).stroke_path(color, width)
    }
}
