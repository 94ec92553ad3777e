//! Vertex stream and attribute state.
//!
//! This component is fed directly by the dispatcher: a single changed stride
//! or attribute has no costly derived computation, so it bypasses the lazy
//! dirty path and mutates cached bindings in place. Flush only copies the
//! cache into the packed state.

use tracing::warn;

use crate::regs::{attribute_size as size, attribute_type as ty, VertexAttribute,
                  VERTEX_ATTRIBUTE_COUNT, VERTEX_STREAM_COUNT};
use crate::state::packed::{PackedPipelineState, PackedVertexAttribute, VertexBinding};
use crate::state::WarnOnce;

/// Maps a (component widths, numerical type) pair onto a host vertex format.
///
/// The host format set has no 3-component 8/16-bit, scalar 8/16-bit or
/// scaled formats; those degrade to `Unorm8x4` with a diagnostic rather than
/// rejecting the draw.
pub fn translate_vertex_format(
    attribute: VertexAttribute,
    warn_once: &mut WarnOnce,
) -> wgpu::VertexFormat {
    use wgpu::VertexFormat as Host;

    let mapped = match (attribute.size, attribute.numerical_type) {
        (size::SIZE_8_8, ty::UNORM) => Some(Host::Unorm8x2),
        (size::SIZE_8_8, ty::SNORM) => Some(Host::Snorm8x2),
        (size::SIZE_8_8, ty::UINT) => Some(Host::Uint8x2),
        (size::SIZE_8_8, ty::SINT) => Some(Host::Sint8x2),
        (size::SIZE_8_8_8_8, ty::UNORM) => Some(Host::Unorm8x4),
        (size::SIZE_8_8_8_8, ty::SNORM) => Some(Host::Snorm8x4),
        (size::SIZE_8_8_8_8, ty::UINT) => Some(Host::Uint8x4),
        (size::SIZE_8_8_8_8, ty::SINT) => Some(Host::Sint8x4),

        (size::SIZE_16_16, ty::UNORM) => Some(Host::Unorm16x2),
        (size::SIZE_16_16, ty::SNORM) => Some(Host::Snorm16x2),
        (size::SIZE_16_16, ty::UINT) => Some(Host::Uint16x2),
        (size::SIZE_16_16, ty::SINT) => Some(Host::Sint16x2),
        (size::SIZE_16_16, ty::FLOAT) => Some(Host::Float16x2),
        (size::SIZE_16_16_16_16, ty::UNORM) => Some(Host::Unorm16x4),
        (size::SIZE_16_16_16_16, ty::SNORM) => Some(Host::Snorm16x4),
        (size::SIZE_16_16_16_16, ty::UINT) => Some(Host::Uint16x4),
        (size::SIZE_16_16_16_16, ty::SINT) => Some(Host::Sint16x4),
        (size::SIZE_16_16_16_16, ty::FLOAT) => Some(Host::Float16x4),

        (size::SIZE_32, ty::UINT) => Some(Host::Uint32),
        (size::SIZE_32, ty::SINT) => Some(Host::Sint32),
        (size::SIZE_32, ty::FLOAT) => Some(Host::Float32),
        (size::SIZE_32_32, ty::UINT) => Some(Host::Uint32x2),
        (size::SIZE_32_32, ty::SINT) => Some(Host::Sint32x2),
        (size::SIZE_32_32, ty::FLOAT) => Some(Host::Float32x2),
        (size::SIZE_32_32_32, ty::UINT) => Some(Host::Uint32x3),
        (size::SIZE_32_32_32, ty::SINT) => Some(Host::Sint32x3),
        (size::SIZE_32_32_32, ty::FLOAT) => Some(Host::Float32x3),
        (size::SIZE_32_32_32_32, ty::UINT) => Some(Host::Uint32x4),
        (size::SIZE_32_32_32_32, ty::SINT) => Some(Host::Sint32x4),
        (size::SIZE_32_32_32_32, ty::FLOAT) => Some(Host::Float32x4),

        (size::SIZE_10_10_10_2, ty::UNORM) => Some(Host::Unorm10_10_10_2),

        _ => None,
    };

    mapped.unwrap_or_else(|| {
        let key = (attribute.size << 8) | attribute.numerical_type;
        if warn_once.first("vertex-format", key) {
            warn!(
                size = format_args!("0x{:X}", attribute.size),
                numerical_type = attribute.numerical_type,
                "unimplemented vertex attribute format; substituting Unorm8x4"
            );
        }
        wgpu::VertexFormat::Unorm8x4
    })
}

/// Direct vertex input state, mutated in place by the dispatcher.
#[derive(Debug)]
pub struct VertexInputState {
    bindings: [VertexBinding; VERTEX_STREAM_COUNT],
    attributes: [PackedVertexAttribute; VERTEX_ATTRIBUTE_COUNT],
}

impl VertexInputState {
    pub fn new() -> Self {
        VertexInputState {
            bindings: [VertexBinding::default(); VERTEX_STREAM_COUNT],
            attributes: [PackedVertexAttribute::default(); VERTEX_ATTRIBUTE_COUNT],
        }
    }

    /// Stream control word: stride in bits 0..12, enable in bit 12.
    pub fn set_stream_control(&mut self, index: usize, control: u32) {
        let binding = &mut self.bindings[index];
        binding.stride = control & 0xFFF;
        binding.enable = control & (1 << 12) != 0;
    }

    pub fn set_divisor(&mut self, index: usize, divisor: u32) {
        self.bindings[index].divisor = divisor;
    }

    pub fn set_input_rate(&mut self, index: usize, instanced: bool) {
        self.bindings[index].instanced = instanced;
    }

    pub fn set_attribute(&mut self, index: usize, raw: u32, warn_once: &mut WarnOnce) {
        let decoded = VertexAttribute::decode(raw);
        self.attributes[index] = PackedVertexAttribute {
            // Constant attributes read a fixed value instead of a stream.
            enable: !decoded.constant,
            stream: decoded.stream,
            offset: decoded.offset,
            format: translate_vertex_format(decoded, warn_once),
        };
    }

    pub fn update(&self, packed: &mut PackedPipelineState) {
        packed.vertex_bindings = self.bindings;
        packed.vertex_attributes = self.attributes;
    }
}

impl Default for VertexInputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute(size: u32, numerical_type: u32) -> VertexAttribute {
        VertexAttribute {
            size,
            numerical_type,
            ..VertexAttribute::default()
        }
    }

    #[test]
    fn common_formats_map_directly() {
        let mut warn = WarnOnce::default();
        assert_eq!(
            translate_vertex_format(attribute(size::SIZE_32_32_32, ty::FLOAT), &mut warn),
            wgpu::VertexFormat::Float32x3
        );
        assert_eq!(
            translate_vertex_format(attribute(size::SIZE_8_8_8_8, ty::UNORM), &mut warn),
            wgpu::VertexFormat::Unorm8x4
        );
        assert_eq!(
            translate_vertex_format(attribute(size::SIZE_10_10_10_2, ty::UNORM), &mut warn),
            wgpu::VertexFormat::Unorm10_10_10_2
        );
    }

    #[test]
    fn unsupported_formats_fall_back_with_a_diagnostic() {
        let mut warn = WarnOnce::default();
        assert_eq!(
            translate_vertex_format(attribute(size::SIZE_16_16_16, ty::FLOAT), &mut warn),
            wgpu::VertexFormat::Unorm8x4
        );
        assert_eq!(
            translate_vertex_format(attribute(size::SIZE_32, ty::USCALED), &mut warn),
            wgpu::VertexFormat::Unorm8x4
        );
    }

    #[test]
    fn stream_control_unpacks_stride_and_enable() {
        let mut state = VertexInputState::new();
        state.set_stream_control(2, 0x20 | (1 << 12));
        let mut packed = PackedPipelineState::default();
        state.update(&mut packed);
        assert_eq!(packed.vertex_bindings[2].stride, 0x20);
        assert!(packed.vertex_bindings[2].enable);
    }
}
