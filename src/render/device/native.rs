//! Raw SkiaSharp C API backend.
//!
//! Drives a host-provided `sk_canvas_t*` with path and paint handles this device
//! owns. Handles are released on `Drop` or by `release()`, whichever comes first.

use core::ffi::c_int;
use core::ptr::NonNull;

use crate::error::{backend, surface, RenderError, Result};
use crate::render::device::RenderDevice;
use crate::render::frame::{Color, Point, Viewport};

#[allow(non_camel_case_types)]
pub mod sys {
    use core::ffi::c_int;

    #[repr(C)]
    pub struct sk_canvas_t {
        _private: [u8; 0],
    }

    #[repr(C)]
    pub struct sk_path_t {
        _private: [u8; 0],
    }

    #[repr(C)]
    pub struct sk_paint_t {
        _private: [u8; 0],
    }

    #[repr(C)]
    #[derive(Clone, Copy, Debug)]
    pub struct sk_rect_t {
        pub left: f32,
        pub top: f32,
        pub right: f32,
        pub bottom: f32,
    }

    pub type sk_color_t = u32;

    pub const PAINT_STYLE_STROKE: c_int = 1;
    pub const STROKE_CAP_ROUND: c_int = 1;
    pub const STROKE_JOIN_ROUND: c_int = 1;
    pub const CLIP_OP_INTERSECT: c_int = 1;

    #[link(name = "SkiaSharp")]
    extern "C" {
        pub fn sk_canvas_save(canvas: *mut sk_canvas_t) -> c_int;
        pub fn sk_canvas_restore(canvas: *mut sk_canvas_t);
        pub fn sk_canvas_translate(canvas: *mut sk_canvas_t, dx: f32, dy: f32);
        pub fn sk_canvas_scale(canvas: *mut sk_canvas_t, sx: f32, sy: f32);
        pub fn sk_canvas_clip_rect_with_operation(
            canvas: *mut sk_canvas_t,
            rect: *const sk_rect_t,
            op: c_int,
            do_aa: bool,
        );
        pub fn sk_canvas_clear(canvas: *mut sk_canvas_t, color: sk_color_t);
        pub fn sk_canvas_draw_path(canvas: *mut sk_canvas_t, path: *const sk_path_t, paint: *const sk_paint_t);

        pub fn sk_path_new() -> *mut sk_path_t;
        pub fn sk_path_delete(path: *mut sk_path_t);
        pub fn sk_path_reset(path: *mut sk_path_t);
        pub fn sk_path_move_to(path: *mut sk_path_t, x: f32, y: f32);
        pub fn sk_path_line_to(path: *mut sk_path_t, x: f32, y: f32);
        pub fn sk_path_quad_to(path: *mut sk_path_t, x0: f32, y0: f32, x1: f32, y1: f32);
        pub fn sk_path_cubic_to(path: *mut sk_path_t, x0: f32, y0: f32, x1: f32, y1: f32, x2: f32, y2: f32);

        pub fn sk_paint_new() -> *mut sk_paint_t;
        pub fn sk_paint_delete(paint: *mut sk_paint_t);
        pub fn sk_paint_set_antialias(paint: *mut sk_paint_t, aa: bool);
        pub fn sk_paint_set_style(paint: *mut sk_paint_t, style: c_int);
        pub fn sk_paint_set_color(paint: *mut sk_paint_t, color: sk_color_t);
        pub fn sk_paint_set_stroke_width(paint: *mut sk_paint_t, width: f32);
        pub fn sk_paint_set_stroke_cap(paint: *mut sk_paint_t, cap: c_int);
        pub fn sk_paint_set_stroke_join(paint: *mut sk_paint_t, join: c_int);
    }
}

/// Owned `sk_path_t`.
struct PathHandle(NonNull<sys::sk_path_t>);

impl PathHandle {
    fn new() -> Result<Self> {
        // Safety: plain allocation call; null is handled below.
        let raw = unsafe { sys::sk_path_new() };
        NonNull::new(raw).map(Self).ok_or_else(|| backend("failed to allocate Skia path"))
    }

    fn as_ptr(&self) -> *mut sys::sk_path_t {
        self.0.as_ptr()
    }
}

impl Drop for PathHandle {
    fn drop(&mut self) {
        // Safety: we own the handle and drop runs once.
        unsafe { sys::sk_path_delete(self.0.as_ptr()) };
    }
}

/// Owned `sk_paint_t`, configured as a round stroke pen.
struct PaintHandle(NonNull<sys::sk_paint_t>);

impl PaintHandle {
    fn new_stroke() -> Result<Self> {
        // Safety: plain allocation call; null is handled below.
        let raw = unsafe { sys::sk_paint_new() };
        let paint = NonNull::new(raw).map(Self).ok_or_else(|| backend("failed to allocate Skia paint"))?;
        let p = paint.as_ptr();
        // Safety: `p` is a live paint we own.
        unsafe {
            sys::sk_paint_set_antialias(p, true);
            sys::sk_paint_set_style(p, sys::PAINT_STYLE_STROKE);
            sys::sk_paint_set_stroke_cap(p, sys::STROKE_CAP_ROUND);
            sys::sk_paint_set_stroke_join(p, sys::STROKE_JOIN_ROUND);
        }
        Ok(paint)
    }

    fn as_ptr(&self) -> *mut sys::sk_paint_t {
        self.0.as_ptr()
    }
}

impl Drop for PaintHandle {
    fn drop(&mut self) {
        // Safety: we own the handle and drop runs once.
        unsafe { sys::sk_paint_delete(self.0.as_ptr()) };
    }
}

struct Handles {
    path: PathHandle,
    paint: PaintHandle,
}

/// Backend that draws through the SkiaSharp C API on raw handles.
pub struct NativeDevice {
    handles: Option<Handles>,
}

impl NativeDevice {
    pub fn new() -> Result<Self> {
        let path = PathHandle::new()?;
        let paint = PaintHandle::new_stroke()?;
        Ok(Self { handles: Some(Handles { path, paint }) })
    }

    /// Start a frame on `canvas`. The canvas state is saved here and restored when
    /// the returned frame is dropped, including on early returns.
    ///
    /// `viewport.scaling` is applied on top of the canvas matrix; hosts whose canvas
    /// already maps logical units pass `1.0`.
    pub fn lease(&mut self, canvas: *mut sys::sk_canvas_t, viewport: Viewport) -> Result<NativeFrame<'_>> {
        let handles = self.handles.as_ref().ok_or(RenderError::Released)?;
        let canvas = NonNull::new(canvas).ok_or_else(|| surface("null canvas handle"))?;
        if !viewport.is_drawable() {
            return Err(surface("viewport has no area"));
        }

        let c = canvas.as_ptr();
        // Safety: the host guarantees `canvas` is live for this frame.
        let save_count = unsafe { sys::sk_canvas_save(c) };
        let frame = NativeFrame { canvas, handles, _save_count: save_count };
        unsafe {
            if viewport.x != 0.0 || viewport.y != 0.0 {
                sys::sk_canvas_translate(c, viewport.x, viewport.y);
            }
            if viewport.scaling != 1.0 {
                sys::sk_canvas_scale(c, viewport.scaling, viewport.scaling);
            }
            let clip = sys::sk_rect_t { left: 0.0, top: 0.0, right: viewport.width, bottom: viewport.height };
            sys::sk_canvas_clip_rect_with_operation(c, &clip, sys::CLIP_OP_INTERSECT, false);
        }
        Ok(frame)
    }

    /// Delete the native path and paint now. Safe to call more than once.
    pub fn release(&mut self) {
        self.handles = None;
    }

    pub fn is_released(&self) -> bool {
        self.handles.is_none()
    }
}

/// One frame on a native canvas; restores the canvas on drop.
pub struct NativeFrame<'a> {
    canvas: NonNull<sys::sk_canvas_t>,
    handles: &'a Handles,
    _save_count: c_int,
}

impl NativeFrame<'_> {
    fn path(&self) -> *mut sys::sk_path_t {
        self.handles.path.as_ptr()
    }
}

impl Drop for NativeFrame<'_> {
    fn drop(&mut self) {
        // Safety: paired with the save in `NativeDevice::lease`.
        unsafe { sys::sk_canvas_restore(self.canvas.as_ptr()) };
    }
}

impl RenderDevice for NativeFrame<'_> {
    fn clear(&mut self, color: Color) {
        unsafe { sys::sk_canvas_clear(self.canvas.as_ptr(), color.into()) };
    }

    fn begin_path(&mut self) {
        unsafe { sys::sk_path_reset(self.path()) };
    }

    fn move_to(&mut self, p: Point) {
        unsafe { sys::sk_path_move_to(self.path(), p.x, p.y) };
    }

    fn line_to(&mut self, p: Point) {
        unsafe { sys::sk_path_line_to(self.path(), p.x, p.y) };
    }

    fn quad_to(&mut self, control: Point, p: Point) {
        unsafe { sys::sk_path_quad_to(self.path(), control.x, control.y, p.x, p.y) };
    }

    fn cubic_to(&mut self, control1: Point, control2: Point, p: Point) {
        unsafe {
            sys::sk_path_cubic_to(self.path(), control1.x, control1.y, control2.x, control2.y, p.x, p.y)
        };
    }

    fn stroke_path(&mut self, color: Color, width: f32) -> Result<()> {
        let paint = self.handles.paint.as_ptr();
        unsafe {
            sys::sk_paint_set_color(paint, color.into());
            sys::sk_paint_set_stroke_width(paint, width);
            sys::sk_canvas_draw_path(self.canvas.as_ptr(), self.path(), paint);
        }
        Ok(())
    }
}
