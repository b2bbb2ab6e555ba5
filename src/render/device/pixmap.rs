//! tiny-skia raster backend.
//!
//! The device owns the path builder, paints and clip mask; a frame borrows them
//! together with the host's pixel buffer.

use tiny_skia::{
    BlendMode, FillRule, LineCap, LineJoin, Mask, Paint, PathBuilder, PixmapMut, Rect, Stroke,
    Transform,
};

use crate::error::{surface, RenderError, Result};
use crate::render::device::RenderDevice;
use crate::render::frame::{Color, Point, Viewport};

struct Scratch {
    path: PathBuilder,
    stroke_paint: Paint<'static>,
    fill_paint: Paint<'static>,
    stroke: Stroke,
}

impl Scratch {
    fn new() -> Self {
        let mut stroke_paint = Paint::default();
        stroke_paint.anti_alias = true;

        let mut fill_paint = Paint::default();
        fill_paint.anti_alias = false;
        fill_paint.blend_mode = BlendMode::Source;

        Self {
            path: PathBuilder::new(),
            stroke_paint,
            fill_paint,
            stroke: Stroke {
                width: 1.0,
                line_cap: LineCap::Round,
                line_join: LineJoin::Round,
                ..Stroke::default()
            },
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct ClipKey {
    surface: (u32, u32),
    rect: [u32; 4],
}

struct ClipMask {
    key: ClipKey,
    mask: Mask,
}

/// Backend drawing into RGBA8 premultiplied buffers through tiny-skia.
pub struct PixmapDevice {
    scratch: Option<Scratch>,
    clip: Option<ClipMask>,
}

impl Default for PixmapDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl PixmapDevice {
    pub fn new() -> Self {
        Self { scratch: Some(Scratch::new()), clip: None }
    }

    /// Start a frame on a borrowed pixmap.
    pub fn lease<'a>(&'a mut self, pixmap: PixmapMut<'a>, viewport: Viewport) -> Result<PixmapFrame<'a>> {
        let scratch = self.scratch.as_mut().ok_or(RenderError::Released)?;
        if !viewport.is_drawable() {
            return Err(surface("viewport has no area"));
        }

        let s = viewport.scaling;
        let device_rect = Rect::from_xywh(viewport.x * s, viewport.y * s, viewport.width * s, viewport.height * s)
            .ok_or_else(|| surface("viewport rect is invalid"))?;

        let (pw, ph) = (pixmap.width(), pixmap.height());
        let covers_surface = device_rect.left() <= 0.0
            && device_rect.top() <= 0.0
            && device_rect.right() >= pw as f32
            && device_rect.bottom() >= ph as f32;
        let clip = if covers_surface {
            None
        } else {
            Some(cached_mask(&mut self.clip, pw, ph, device_rect)?)
        };

        Ok(PixmapFrame {
            pixmap,
            scratch,
            clip,
            device_rect,
            transform: Transform::from_row(s, 0.0, 0.0, s, viewport.x * s, viewport.y * s),
        })
    }

    /// Start a frame on a host-owned RGBA8 buffer of exactly `width * height * 4` bytes.
    pub fn lease_bytes<'a>(
        &'a mut self,
        pixels: &'a mut [u8],
        width: u32,
        height: u32,
        viewport: Viewport,
    ) -> Result<PixmapFrame<'a>> {
        let needed = width as usize * height as usize * 4;
        if pixels.len() < needed {
            return Err(surface("pixel buffer smaller than width * height * 4"));
        }
        let pixmap = PixmapMut::from_bytes(&mut pixels[..needed], width, height)
            .ok_or_else(|| surface("pixel buffer rejected by rasterizer"))?;
        self.lease(pixmap, viewport)
    }

    /// Drop scratch objects now instead of waiting for `Drop`. Safe to call twice.
    pub fn release(&mut self) {
        self.scratch = None;
        self.clip = None;
    }

    pub fn is_released(&self) -> bool {
        self.scratch.is_none()
    }
}

fn cached_mask(slot: &mut Option<ClipMask>, width: u32, height: u32, rect: Rect) -> Result<&Mask> {
    let key = ClipKey {
        surface: (width, height),
        rect: [rect.x().to_bits(), rect.y().to_bits(), rect.width().to_bits(), rect.height().to_bits()],
    };
    if slot.as_ref().map(|c| c.key) != Some(key) {
        let mut mask = Mask::new(width, height).ok_or_else(|| surface("cannot allocate clip mask"))?;
        let path = PathBuilder::from_rect(rect);
        mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
        *slot = Some(ClipMask { key, mask });
    }
    match slot {
        Some(clip) => Ok(&clip.mask),
        None => Err(surface("clip mask missing")),
    }
}

/// One frame on a tiny-skia pixmap.
pub struct PixmapFrame<'a> {
    pixmap: PixmapMut<'a>,
    scratch: &'a mut Scratch,
    clip: Option<&'a Mask>,
    device_rect: Rect,
    transform: Transform,
}

impl RenderDevice for PixmapFrame<'_> {
    fn clear(&mut self, color: Color) {
        self.scratch.fill_paint.set_color_rgba8(color.r(), color.g(), color.b(), color.a());
        self.pixmap.fill_rect(self.device_rect, &self.scratch.fill_paint, Transform::identity(), None);
    }

    fn begin_path(&mut self) {
        self.scratch.path.clear();
    }

    fn move_to(&mut self, p: Point) {
        self.scratch.path.move_to(p.x, p.y);
    }

    fn line_to(&mut self, p: Point) {
        self.scratch.path.line_to(p.x, p.y);
    }

    fn quad_to(&mut self, control: Point, p: Point) {
        self.scratch.path.quad_to(control.x, control.y, p.x, p.y);
    }

    fn cubic_to(&mut self, control1: Point, control2: Point, p: Point) {
        self.scratch.path.cubic_to(control1.x, control1.y, control2.x, control2.y, p.x, p.y);
    }

    fn stroke_path(&mut self, color: Color, width: f32) -> Result<()> {
        let scratch = &mut *self.scratch;
        let builder = std::mem::replace(&mut scratch.path, PathBuilder::new());
        // Degenerate paths (a lone move) produce nothing to stroke.
        let Some(path) = builder.finish() else {
            return Ok(());
        };

        scratch.stroke_paint.set_color_rgba8(color.r(), color.g(), color.b(), color.a());
        scratch.stroke.width = width;
        self.pixmap.stroke_path(&path, &scratch.stroke_paint, &scratch.stroke, self.transform, self.clip);

        // Hand the storage back to the builder.
        scratch.path = path.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Pixmap;

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let p = pixmap.pixel(x, y).unwrap();
        [p.red(), p.green(), p.blue(), p.alpha()]
    }

    #[test]
    fn clear_and_stroke_touch_pixels() {
        let mut pixmap = Pixmap::new(64, 32).unwrap();
        let mut device = PixmapDevice::new();
        {
            let mut frame = device.lease(pixmap.as_mut(), Viewport::new(64.0, 32.0)).unwrap();
            frame.clear(Color::from_rgb(12, 16, 24));
            frame.begin_path();
            frame.move_to(Point::new(4.0, 16.0));
            frame.line_to(Point::new(60.0, 16.0));
            frame.stroke_path(Color::from_rgb(0xE0, 0x10, 0x40), 6.0).unwrap();
        }
        assert_eq!(pixel(&pixmap, 1, 1), [12, 16, 24, 255]);
        assert_eq!(pixel(&pixmap, 32, 16), [0xE0, 0x10, 0x40, 255]);
    }

    #[test]
    fn viewport_clip_protects_outside_pixels() {
        let mut pixmap = Pixmap::new(40, 40).unwrap();
        let mut device = PixmapDevice::new();
        {
            let viewport = Viewport::new(20.0, 20.0).with_origin(10.0, 10.0);
            let mut frame = device.lease(pixmap.as_mut(), viewport).unwrap();
            frame.clear(Color::from_rgb(255, 255, 255));
            frame.begin_path();
            frame.move_to(Point::new(-20.0, 10.0));
            frame.line_to(Point::new(60.0, 10.0));
            frame.stroke_path(Color::from_rgb(255, 0, 0), 4.0).unwrap();
        }
        // Outside the viewport nothing was written.
        assert_eq!(pixel(&pixmap, 2, 20), [0, 0, 0, 0]);
        // Inside it the stroke landed at viewport y = 10 -> surface y = 20.
        assert_eq!(pixel(&pixmap, 20, 20), [255, 0, 0, 255]);
        assert_eq!(pixel(&pixmap, 20, 12), [255, 255, 255, 255]);
    }

    #[test]
    fn lone_move_is_not_stroked() {
        let mut pixmap = Pixmap::new(8, 8).unwrap();
        let mut device = PixmapDevice::new();
        let mut frame = device.lease(pixmap.as_mut(), Viewport::new(8.0, 8.0)).unwrap();
        frame.begin_path();
        frame.move_to(Point::new(1.0, 1.0));
        assert!(frame.stroke_path(Color::from_rgb(1, 2, 3), 2.0).is_ok());
    }

    #[test]
    fn bad_buffers_and_release_are_reported() {
        let mut device = PixmapDevice::new();
        let mut small = vec![0u8; 10];
        let err = device.lease_bytes(&mut small, 4, 4, Viewport::new(4.0, 4.0)).err();
        assert!(matches!(err, Some(RenderError::SurfaceUnavailable(_))));

        device.release();
        device.release();
        assert!(device.is_released());
        let mut pixels = vec![0u8; 64];
        let err = device.lease_bytes(&mut pixels, 4, 4, Viewport::new(4.0, 4.0)).err();
        assert_eq!(err, Some(RenderError::Released));
    }
}
