//! Canonical, comparable snapshot of all register state a host pipeline
//! depends on.
//!
//! Two packed states compare equal iff the host pipelines they describe are
//! interchangeable, which is what makes the struct safe as a pipeline-cache
//! key. Components only rewrite the fields they own, so an unchanged state
//! group costs nothing between draws.

use std::hash::{Hash, Hasher};

use xxhash_rust::xxh3::Xxh3;

use crate::regs::{TessellationParameters, COLOR_TARGET_COUNT, VERTEX_ATTRIBUTE_COUNT,
                  VERTEX_STREAM_COUNT};

/// Host-translated per-attachment blend state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttachmentBlend {
    pub enable: bool,
    pub color_op: wgpu::BlendOperation,
    pub src_color: wgpu::BlendFactor,
    pub dst_color: wgpu::BlendFactor,
    pub alpha_op: wgpu::BlendOperation,
    pub src_alpha: wgpu::BlendFactor,
    pub dst_alpha: wgpu::BlendFactor,
    pub write_mask: wgpu::ColorWrites,
}

impl Default for AttachmentBlend {
    fn default() -> Self {
        AttachmentBlend {
            enable: false,
            color_op: wgpu::BlendOperation::Add,
            src_color: wgpu::BlendFactor::One,
            dst_color: wgpu::BlendFactor::Zero,
            alpha_op: wgpu::BlendOperation::Add,
            src_alpha: wgpu::BlendFactor::One,
            dst_alpha: wgpu::BlendFactor::Zero,
            write_mask: wgpu::ColorWrites::ALL,
        }
    }
}

/// Host-translated per-face stencil state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StencilFace {
    pub fail: wgpu::StencilOperation,
    pub depth_fail: wgpu::StencilOperation,
    pub pass: wgpu::StencilOperation,
    pub func: wgpu::CompareFunction,
}

impl Default for StencilFace {
    fn default() -> Self {
        StencilFace {
            fail: wgpu::StencilOperation::Keep,
            depth_fail: wgpu::StencilOperation::Keep,
            pass: wgpu::StencilOperation::Keep,
            func: wgpu::CompareFunction::Always,
        }
    }
}

/// Per-stream vertex binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct VertexBinding {
    pub enable: bool,
    pub stride: u32,
    pub instanced: bool,
    pub divisor: u32,
}

/// Per-location vertex attribute, already translated to a host format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PackedVertexAttribute {
    pub enable: bool,
    pub stream: u32,
    pub offset: u32,
    pub format: wgpu::VertexFormat,
}

impl Default for PackedVertexAttribute {
    fn default() -> Self {
        PackedVertexAttribute {
            enable: false,
            stream: 0,
            offset: 0,
            format: wgpu::VertexFormat::Float32x4,
        }
    }
}

/// The full pipeline-relevant state snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PackedPipelineState {
    // Render targets
    pub color_formats: [Option<wgpu::TextureFormat>; COLOR_TARGET_COUNT],
    pub depth_format: Option<wgpu::TextureFormat>,

    // Vertex input
    pub vertex_bindings: [VertexBinding; VERTEX_STREAM_COUNT],
    pub vertex_attributes: [PackedVertexAttribute; VERTEX_ATTRIBUTE_COUNT],

    // Input assembly
    pub topology: wgpu::PrimitiveTopology,
    /// Host topology set lacks fans/quads; draws must expand on the CPU.
    pub needs_fan_emulation: bool,
    pub needs_quad_conversion: bool,
    pub primitive_restart: bool,

    // Tessellation
    pub patch_size: u32,
    pub tessellation: TessellationParameters,

    // Rasterization
    pub rasterizer_discard: bool,
    pub polygon_mode: wgpu::PolygonMode,
    pub cull_mode: Option<wgpu::Face>,
    pub front_face: wgpu::FrontFace,
    pub flip_y: bool,
    pub depth_bias_enable: bool,
    pub provoking_vertex_last: bool,

    // Depth/stencil
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_func: wgpu::CompareFunction,
    pub depth_bounds_test_enable: bool,
    pub stencil_test_enable: bool,
    pub stencil_front: StencilFace,
    pub stencil_back: StencilFace,

    // Color blend
    pub attachment_blends: [AttachmentBlend; COLOR_TARGET_COUNT],
    pub logic_op_enable: bool,
    /// Raw hardware logic op; WebGPU cannot express it but pipelines keyed on
    /// different ops must not collide.
    pub logic_op: u32,

    // Global shader config
    pub post_vtg_attribute_skip_mask: u32,
    pub bindless_texture_slot: u32,
}

impl Default for PackedPipelineState {
    fn default() -> Self {
        PackedPipelineState {
            color_formats: [None; COLOR_TARGET_COUNT],
            depth_format: None,
            vertex_bindings: [VertexBinding::default(); VERTEX_STREAM_COUNT],
            vertex_attributes: [PackedVertexAttribute::default(); VERTEX_ATTRIBUTE_COUNT],
            topology: wgpu::PrimitiveTopology::TriangleList,
            needs_fan_emulation: false,
            needs_quad_conversion: false,
            primitive_restart: false,
            patch_size: 0,
            tessellation: TessellationParameters::default(),
            rasterizer_discard: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            cull_mode: None,
            front_face: wgpu::FrontFace::Ccw,
            flip_y: false,
            depth_bias_enable: false,
            provoking_vertex_last: false,
            depth_test_enable: false,
            depth_write_enable: false,
            depth_func: wgpu::CompareFunction::Always,
            depth_bounds_test_enable: false,
            stencil_test_enable: false,
            stencil_front: StencilFace::default(),
            stencil_back: StencilFace::default(),
            attachment_blends: [AttachmentBlend::default(); COLOR_TARGET_COUNT],
            logic_op_enable: false,
            logic_op: 0,
            post_vtg_attribute_skip_mask: 0,
            bindless_texture_slot: 0,
        }
    }
}

impl PackedPipelineState {
    /// Digest for external pipeline-cache keying. Equal states hash equal;
    /// the full struct remains the authoritative key for collision checks.
    pub fn cache_key(&self) -> u64 {
        let mut hasher = Xxh3::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
