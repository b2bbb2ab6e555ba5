use core::ffi::c_char;

use crate::pacing::{FrameStats, HostActions};
use crate::render::Viewport;

/// Host should redraw the surface (and call a render entry point).
pub const MM_ACTION_INVALIDATE: u32 = 1 << 0;
/// Host should call `mm_engine_animation_frame` on its next display refresh.
pub const MM_ACTION_REQUEST_FRAME: u32 = 1 << 1;

pub fn action_bits(actions: HostActions) -> u32 {
    let mut bits = 0;
    if actions.invalidate {
        bits |= MM_ACTION_INVALIDATE;
    }
    if actions.request_frame {
        bits |= MM_ACTION_REQUEST_FRAME;
    }
    bits
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MmFrameStats {
    pub complexity: i32,
    pub element_count: u32,
    pub average_frame_time_ms: f64,
    pub fps: f64,
}

impl From<&FrameStats> for MmFrameStats {
    fn from(s: &FrameStats) -> Self {
        Self {
            complexity: s.complexity,
            element_count: u32::try_from(s.element_count).unwrap_or(u32::MAX),
            average_frame_time_ms: s.average_frame_time_ms,
            fps: s.fps,
        }
    }
}

/// Viewport in logical units plus the device-pixel scaling.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MmViewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scaling: f32,
}

impl From<MmViewport> for Viewport {
    fn from(v: MmViewport) -> Self {
        Viewport::new(v.width, v.height).with_origin(v.x, v.y).with_scaling(v.scaling)
    }
}

/// Read a viewport the host may have passed as null.
pub fn viewport_from_ptr(ptr: *const MmViewport) -> Option<Viewport> {
    if ptr.is_null() {
        return None;
    }
    // Safety: caller promises `ptr` points to a readable `MmViewport`.
    Some(unsafe { *ptr }.into())
}

/// Write a Rust string into a C buffer (NUL-terminated).
/// Returns the number of bytes written (excluding the final NUL).
pub fn write_c_string(out: *mut c_char, cap: usize, s: &str) -> usize {
    if out.is_null() || cap == 0 {
        return 0;
    }

    let bytes = s.as_bytes();
    let n = bytes.len().min(cap - 1);

    // Safety: caller provided writable memory for `cap` bytes.
    unsafe {
        core::ptr::copy_nonoverlapping(bytes.as_ptr(), out as *mut u8, n);
        *out.add(n) = 0;
    }

    n
}
