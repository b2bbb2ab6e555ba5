//! motionmark (staticlib + rlib)
//!
//! Stroke-batch rendering benchmark core: a procedural chain of line/curve
//! segments, a batched frame renderer over a pluggable drawing backend, and a
//! frame pacer that reports throughput.
//!
//! Hosts either use the Rust API (`Engine`) or the C ABI in `ffi`.
//!
//! Keep this file thin.

pub mod engine;
pub mod error;
pub mod ffi;
pub mod pacing;
pub mod render;
pub mod scene;
pub mod util;

pub use engine::{Engine, ErrorReporter};
pub use error::{RenderError, Result, SubscribeError};
pub use pacing::{FrameHost, FramePacer, FrameStats, HostActions, SubscriptionId};
pub use render::device::RenderDevice;
pub use render::{Color, FrameSummary, Point, Renderer, Viewport};
pub use scene::{Element, Scene, SegmentKind};

// Export C ABI symbols.
pub use ffi::exports::*;
