//! GM20B Maxwell 3D engine (class 0xB197) emulation.
//!
//! The engine consumes guest `(method, argument)` register writes and turns
//! them into host-API work: translated pipeline state, coalesced draws,
//! batched constant-buffer uploads, clears, and guest-visible semaphore
//! writes. Host collaborators (memory translation, view caching, draw
//! execution) sit behind the [`HostBackend`] trait so the dispatcher and
//! state translators stay host-agnostic and deterministic.
//!
//! Layering, bottom up:
//! - [`regs`]: the register map and raw-value decode types.
//! - [`dirty`]: O(1) written-word to derived-state-slot dirty tracking.
//! - [`state`]: register-group translators producing a hashable
//!   [`PackedPipelineState`].
//! - [`engine`]: the [`Maxwell3d`] dispatcher tying it together.

pub mod dirty;
pub mod engine;
pub mod error;
pub mod host;
pub mod regs;
pub mod state;

pub use engine::Maxwell3d;
pub use error::EngineError;
pub use host::{
    Attachments, ClearParams, ConstantBufferSelector, DrawParams, HostBackend, MemoryMapping,
    NullBackend, ShaderStage, SubmissionTag, TextureView, TextureViewDescriptor,
};
pub use regs::{DrawTopology, RegisterFile, ShadowRamControl};
pub use state::{PackedPipelineState, PipelineState};
