use core::ffi::{c_char, c_void};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use crate::engine::Engine;
use crate::error::RenderError;
use crate::ffi::types::{action_bits, viewport_from_ptr, write_c_string, MmFrameStats, MmViewport};
use crate::pacing::{HostActions, SubscriptionId};
#[cfg(feature = "native-skia")]
use crate::render::device::native::{sys::sk_canvas_t, NativeDevice};
use crate::render::device::pixmap::PixmapDevice;
use crate::render::{FrameSummary, Viewport};
use crate::util::config::bench_config;
use crate::util::logging;

pub type MmStatsCallback = extern "C" fn(stats: *const MmFrameStats, user_data: *mut c_void);

/// Opaque handle passed to C.
///
/// C must treat this as an opaque pointer and call into it from one thread only.
pub struct MmContext {
    engine: Engine,
    raster: PixmapDevice,
    #[cfg(feature = "native-skia")]
    native: Option<NativeDevice>,
}

impl MmContext {
    fn release(&mut self) {
        self.engine.detach();
        self.raster.release();
        #[cfg(feature = "native-skia")]
        if let Some(native) = self.native.as_mut() {
            native.release();
        }
    }
}

static LAST_ERROR: OnceLock<Mutex<Option<String>>> = OnceLock::new();

fn set_last_error(msg: String) {
    let lock = LAST_ERROR.get_or_init(|| Mutex::new(None));
    if let Ok(mut guard) = lock.lock() {
        *guard = Some(msg);
    }
}

fn take_last_error() -> Option<String> {
    let lock = LAST_ERROR.get_or_init(|| Mutex::new(None));
    lock.lock().ok().and_then(|mut guard| guard.take())
}

fn context<'a>(ctx: *mut MmContext) -> Option<&'a mut MmContext> {
    // Safety: non-null handles come from `mm_engine_create` and are not yet destroyed.
    unsafe { ctx.as_mut() }
}

/// Map a render outcome to the C return code: 0 ok, 1 frame skipped, -1 failure.
fn render_status(result: crate::error::Result<FrameSummary>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err @ RenderError::SurfaceUnavailable(_)) => {
            set_last_error(err.to_string());
            1
        }
        Err(err) => {
            set_last_error(err.to_string());
            -1
        }
    }
}

#[no_mangle]
pub extern "C" fn mm_engine_create() -> *mut MmContext {
    let config = bench_config();
    logging::init_logger(config.log_level);

    let engine = Engine::new(config);
    #[cfg(feature = "native-skia")]
    let native = match NativeDevice::new() {
        Ok(device) => Some(device),
        Err(err) => {
            log::warn!("native backend unavailable: {err}");
            None
        }
    };

    Box::into_raw(Box::new(MmContext {
        engine,
        raster: PixmapDevice::new(),
        #[cfg(feature = "native-skia")]
        native,
    }))
}

/// Releases backend resources and frees the handle. Null is ignored.
#[no_mangle]
pub extern "C" fn mm_engine_destroy(ctx: *mut MmContext) {
    if ctx.is_null() {
        return;
    }
    // Safety: `ctx` came from `Box::into_raw` in `mm_engine_create`.
    let mut boxed = unsafe { Box::from_raw(ctx) };
    boxed.release();
    log::debug!("engine destroyed");
}

#[no_mangle]
pub extern "C" fn mm_engine_set_complexity(ctx: *mut MmContext, level: i32) -> u32 {
    let Some(ctx) = context(ctx) else { return 0 };
    let mut actions = HostActions::default();
    ctx.engine.set_complexity(level, &mut actions);
    action_bits(actions)
}

#[no_mangle]
pub extern "C" fn mm_engine_attach(ctx: *mut MmContext) -> u32 {
    let Some(ctx) = context(ctx) else { return 0 };
    let mut actions = HostActions::default();
    ctx.engine.attach(&mut actions);
    action_bits(actions)
}

#[no_mangle]
pub extern "C" fn mm_engine_detach(ctx: *mut MmContext) {
    if let Some(ctx) = context(ctx) {
        ctx.engine.detach();
    }
}

#[no_mangle]
pub extern "C" fn mm_engine_resume(ctx: *mut MmContext) -> u32 {
    let Some(ctx) = context(ctx) else { return 0 };
    let mut actions = HostActions::default();
    ctx.engine.resume(&mut actions);
    action_bits(actions)
}

/// Display-refresh callback. `timestamp_ms` is the host's monotonic frame time.
///
/// Stats callbacks fire from inside this call; they must not call back into the engine.
#[no_mangle]
pub extern "C" fn mm_engine_animation_frame(ctx: *mut MmContext, timestamp_ms: f64) -> u32 {
    let Some(ctx) = context(ctx) else { return 0 };
    let timestamp = Duration::try_from_secs_f64(timestamp_ms / 1000.0).unwrap_or_default();
    let mut actions = HostActions::default();
    ctx.engine.on_animation_frame(timestamp, &mut actions);
    action_bits(actions)
}

/// Render into a host RGBA8 premultiplied buffer of `width * height * 4` bytes.
#[no_mangle]
pub extern "C" fn mm_engine_render_rgba(
    ctx: *mut MmContext,
    pixels: *mut u8,
    len: usize,
    width: u32,
    height: u32,
    viewport: *const MmViewport,
) -> i32 {
    let Some(ctx) = context(ctx) else { return -1 };
    if pixels.is_null() {
        set_last_error("null pixel buffer".to_string());
        return -1;
    }
    let viewport = viewport_from_ptr(viewport).unwrap_or_else(|| Viewport::new(width as f32, height as f32));

    // Safety: caller provides `len` writable bytes at `pixels` for the duration of the call.
    let buf = unsafe { core::slice::from_raw_parts_mut(pixels, len) };
    let MmContext { engine, raster, .. } = ctx;
    render_status(engine.render_frame(viewport, |vp| raster.lease_bytes(buf, width, height, vp)))
}

/// Render onto a SkiaSharp canvas owned by the host.
#[cfg(feature = "native-skia")]
#[no_mangle]
pub extern "C" fn mm_engine_render_skia(ctx: *mut MmContext, canvas: *mut sk_canvas_t, viewport: *const MmViewport) -> i32 {
    let Some(ctx) = context(ctx) else { return -1 };
    let Some(viewport) = viewport_from_ptr(viewport) else {
        set_last_error("null viewport".to_string());
        return -1;
    };
    let MmContext { engine, native, .. } = ctx;
    render_status(engine.render_frame(viewport, |vp| match native.as_mut() {
        Some(device) => device.lease(canvas, vp),
        None => Err(RenderError::Released),
    }))
}

/// Returns a subscription id, or -1 when the subscriber set is full.
#[no_mangle]
pub extern "C" fn mm_engine_subscribe_stats(ctx: *mut MmContext, callback: Option<MmStatsCallback>, user_data: *mut c_void) -> i32 {
    let Some(ctx) = context(ctx) else { return -1 };
    let Some(callback) = callback else {
        set_last_error("null stats callback".to_string());
        return -1;
    };
    let subscribed = ctx.engine.subscribe_stats(move |stats| {
        let raw = MmFrameStats::from(stats);
        callback(&raw, user_data);
    });
    match subscribed {
        Ok(id) => i32::try_from(id.raw()).unwrap_or(-1),
        Err(err) => {
            set_last_error(err.to_string());
            -1
        }
    }
}

#[no_mangle]
pub extern "C" fn mm_engine_unsubscribe_stats(ctx: *mut MmContext, id: i32) -> bool {
    let Some(ctx) = context(ctx) else { return false };
    let Ok(raw) = u32::try_from(id) else { return false };
    ctx.engine.unsubscribe_stats(SubscriptionId::from_raw(raw))
}

#[no_mangle]
pub extern "C" fn mm_engine_complexity(ctx: *mut MmContext) -> i32 {
    context(ctx).map_or(0, |ctx| ctx.engine.complexity())
}

#[no_mangle]
pub extern "C" fn mm_engine_element_count(ctx: *mut MmContext) -> u32 {
    context(ctx).map_or(0, |ctx| u32::try_from(ctx.engine.element_count()).unwrap_or(u32::MAX))
}

/// Copy (and clear) the last error message. Returns the bytes written without the NUL.
#[no_mangle]
pub extern "C" fn mm_engine_last_error(out: *mut c_char, out_len: u32) -> u32 {
    let msg = take_last_error().unwrap_or_default();
    write_c_string(out, out_len as usize, &msg) as u32
}

/// Drain queued warning/error lines into `out`, NUL-terminated.
#[no_mangle]
pub extern "C" fn mm_log_drain(out: *mut c_char, out_len: u32) -> u32 {
    if out.is_null() || out_len == 0 {
        return 0;
    }
    // Safety: caller provides a writable buffer of `out_len` bytes.
    let buf = unsafe { core::slice::from_raw_parts_mut(out as *mut u8, out_len as usize) };
    // Keep the last byte for the terminator.
    let last = buf.len() - 1;
    let n = logging::drain_console(&mut buf[..last]);
    buf[n] = 0;
    n as u32
}
