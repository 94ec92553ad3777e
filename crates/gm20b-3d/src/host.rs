//! Boundary between the engine core and its host-side collaborators.
//!
//! The engine never owns host GPU objects or guest memory; everything it
//! needs from the outside world goes through [`HostBackend`]. Implementations
//! may execute immediately or queue work; from the engine's perspective every
//! call is synchronous and potentially blocking.

use std::sync::Arc;

use crate::error::EngineError;
use crate::regs::{ClearSurface, TileMode};
use crate::state::PackedPipelineState;

/// One contiguous host mapping of a guest range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryMapping {
    pub host_offset: u64,
    pub size: u64,
}

/// Tiling of a guest surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileConfig {
    Linear,
    Block {
        height_log2: u32,
        depth_log2: u32,
    },
}

impl TileConfig {
    pub fn from_tile_mode(mode: TileMode) -> Self {
        if mode.is_pitch_linear {
            TileConfig::Linear
        } else {
            TileConfig::Block {
                height_log2: mode.block_height_log2,
                depth_log2: mode.block_depth_log2,
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureAspect {
    Color,
    DepthStencil,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureViewKind {
    D2,
    D2Array,
}

/// Everything the host needs to find or create an image view for a render
/// target.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureViewDescriptor {
    pub format: wgpu::TextureFormat,
    pub aspect: TextureAspect,
    pub kind: TextureViewKind,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub base_layer: u32,
    pub layer_count: u32,
    /// Zero when the view covers a single layer.
    pub layer_stride_bytes: u64,
    pub tiling: TileConfig,
    /// Guest address of the surface; the host resolves it through its memory
    /// translator.
    pub guest_address: u64,
}

/// Reference-counted handle to a host image view. Shared with other engine
/// contexts and destroyed only when unreferenced.
#[derive(Debug, PartialEq)]
pub struct TextureView {
    pub descriptor: TextureViewDescriptor,
}

/// Monotonic tag identifying the submission a resource was acquired for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct SubmissionTag(pub u64);

/// Shader pipeline stages, in hardware bind-group order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ShaderStage {
    VertexA = 0,
    VertexB = 1,
    TessellationControl = 2,
    TessellationEvaluation = 3,
    Fragment = 4,
}

impl ShaderStage {
    pub fn from_index(index: usize) -> Option<Self> {
        Some(match index {
            0 => Self::VertexA,
            1 => Self::VertexB,
            2 => Self::TessellationControl,
            3 => Self::TessellationEvaluation,
            4 => Self::Fragment,
            _ => return None,
        })
    }
}

/// Snapshot of the constant-buffer selector registers at bind time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ConstantBufferSelector {
    pub size: u32,
    pub address: u64,
}

/// A coalesced draw handed to the host, together with the translated state
/// it must execute under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawParams {
    pub indexed: bool,
    pub count: u32,
    pub first: u32,
    pub instance_count: u32,
    pub base_vertex: u32,
    pub base_instance: u32,
}

/// Render target views resolved at flush time, in attachment order.
#[derive(Debug, Default)]
pub struct Attachments {
    pub colors: Vec<Arc<TextureView>>,
    pub depth: Option<Arc<TextureView>>,
}

/// Decoded clear request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClearParams {
    pub surface: ClearSurface,
    pub color: [f32; 4],
    pub depth: f32,
    pub stencil: u32,
}

/// Host-side collaborators consumed by the engine: narrow, synchronous,
/// caller-blocking interfaces.
///
/// This trait does not assume a threading model: it can be backed by an
/// in-process wgpu executor, a message-based worker, or a stub for headless
/// runs.
pub trait HostBackend {
    /// Translates a guest range into host mappings. Fails if unmapped.
    fn translate_range(
        &mut self,
        address: u64,
        size: u64,
    ) -> Result<Vec<MemoryMapping>, EngineError>;

    /// Finds or creates a shared image view for `descriptor`.
    fn find_or_create_view(
        &mut self,
        descriptor: &TextureViewDescriptor,
        tag: SubmissionTag,
    ) -> Arc<TextureView>;

    /// Bulk constant-buffer upload; fire-and-forget.
    fn load_constant_buffer(&mut self, words: &[u32], start_offset: u32);

    /// Per-stage constant buffer (un)bind.
    fn bind_constant_buffer(
        &mut self,
        stage: ShaderStage,
        slot: u32,
        valid: bool,
        selector: ConstantBufferSelector,
    );

    /// Increments the external syncpoint counter `id`.
    fn increment_syncpoint(&mut self, id: u32);

    /// Guest-visible 32-bit write at a translated address.
    fn write_guest_u32(&mut self, address: u64, value: u32) -> Result<(), EngineError>;

    /// Guest-visible 64-bit write at a translated address.
    fn write_guest_u64(&mut self, address: u64, value: u64) -> Result<(), EngineError>;

    /// Current GPU timestamp in hardware tick units.
    fn gpu_timestamp_ticks(&self) -> u64;

    /// Executes one coalesced draw under the given translated state.
    fn draw(
        &mut self,
        params: DrawParams,
        topology: wgpu::PrimitiveTopology,
        state: &PackedPipelineState,
        attachments: &Attachments,
    );

    /// Executes a render-target clear.
    fn clear(&mut self, params: ClearParams);
}

/// Backend that accepts everything and does nothing.
#[derive(Debug, Default)]
pub struct NullBackend;

impl NullBackend {
    pub fn new() -> Self {
        Self
    }
}

impl HostBackend for NullBackend {
    fn translate_range(
        &mut self,
        address: u64,
        size: u64,
    ) -> Result<Vec<MemoryMapping>, EngineError> {
        Ok(vec![MemoryMapping {
            host_offset: address,
            size,
        }])
    }

    fn find_or_create_view(
        &mut self,
        descriptor: &TextureViewDescriptor,
        _tag: SubmissionTag,
    ) -> Arc<TextureView> {
        Arc::new(TextureView {
            descriptor: descriptor.clone(),
        })
    }

    fn load_constant_buffer(&mut self, _words: &[u32], _start_offset: u32) {}

    fn bind_constant_buffer(
        &mut self,
        _stage: ShaderStage,
        _slot: u32,
        _valid: bool,
        _selector: ConstantBufferSelector,
    ) {
    }

    fn increment_syncpoint(&mut self, _id: u32) {}

    fn write_guest_u32(&mut self, _address: u64, _value: u32) -> Result<(), EngineError> {
        Ok(())
    }

    fn write_guest_u64(&mut self, _address: u64, _value: u64) -> Result<(), EngineError> {
        Ok(())
    }

    fn gpu_timestamp_ticks(&self) -> u64 {
        0
    }

    fn draw(
        &mut self,
        _params: DrawParams,
        _topology: wgpu::PrimitiveTopology,
        _state: &PackedPipelineState,
        _attachments: &Attachments,
    ) {
    }

    fn clear(&mut self, _params: ClearParams) {}
}
