//! Render target format translation and view resolution.
//!
//! Format mapping is a three-way policy: exactly-representable formats map
//! directly; X-component and 16-bit-packed colors approximate with a
//! diagnostic; unknown color formats degrade to `Rgba8Unorm` so content
//! stays partially renderable. Depth formats outside the documented set are
//! fatal. View resolution talks to the host (memory translation, image-view
//! acquire) and therefore only runs at flush time.

use std::sync::Arc;

use tracing::warn;

use crate::error::EngineError;
use crate::host::{
    HostBackend, SubmissionTag, TextureAspect, TextureView, TextureViewDescriptor,
    TextureViewKind, TileConfig,
};
use crate::regs::{self, ct_format, zt_format, TileMode};
use crate::state::packed::PackedPipelineState;
use crate::state::WarnOnce;

/// Maps a color target format code; `None` means the target is disabled.
pub fn translate_color_format(
    raw: u32,
    warn_once: &mut WarnOnce,
) -> Option<wgpu::TextureFormat> {
    use wgpu::TextureFormat as Host;

    // Approximation table: formats whose X component or packing the host
    // cannot express exactly.
    let approximated = |host: Host, warn_once: &mut WarnOnce| {
        if warn_once.first("rt-format-approx", raw) {
            warn!(
                format = format_args!("0x{raw:X}"),
                "partially supported color target format; approximating"
            );
        }
        Some(host)
    };

    match raw {
        ct_format::DISABLED => None,
        ct_format::RF32_GF32_BF32_AF32 => Some(Host::Rgba32Float),
        ct_format::RS32_GS32_BS32_AS32 => Some(Host::Rgba32Sint),
        ct_format::RU32_GU32_BU32_AU32 => Some(Host::Rgba32Uint),
        ct_format::RF32_GF32_BF32_X32 => approximated(Host::Rgba32Float, warn_once),
        ct_format::R16_G16_B16_A16 => Some(Host::Rgba16Unorm),
        ct_format::RN16_GN16_BN16_AN16 => Some(Host::Rgba16Snorm),
        ct_format::RS16_GS16_BS16_AS16 => Some(Host::Rgba16Sint),
        ct_format::RU16_GU16_BU16_AU16 => Some(Host::Rgba16Uint),
        ct_format::RF16_GF16_BF16_AF16 => Some(Host::Rgba16Float),
        ct_format::RF32_GF32 => Some(Host::Rg32Float),
        ct_format::RS32_GS32 => Some(Host::Rg32Sint),
        ct_format::RU32_GU32 => Some(Host::Rg32Uint),
        ct_format::RF16_GF16_BF16_X16 => approximated(Host::Rgba16Float, warn_once),
        ct_format::A8R8G8B8 => Some(Host::Bgra8Unorm),
        ct_format::A8RL8GL8BL8 => Some(Host::Bgra8UnormSrgb),
        ct_format::A2B10G10R10 => Some(Host::Rgb10a2Unorm),
        ct_format::AU2BU10GU10RU10 => Some(Host::Rgb10a2Uint),
        ct_format::A8B8G8R8 => Some(Host::Rgba8Unorm),
        ct_format::A8BL8GL8RL8 => Some(Host::Rgba8UnormSrgb),
        ct_format::AN8BN8GN8RN8 => Some(Host::Rgba8Snorm),
        ct_format::AS8BS8GS8RS8 => Some(Host::Rgba8Sint),
        ct_format::R16_G16 => Some(Host::Rg16Unorm),
        ct_format::RN16_GN16 => Some(Host::Rg16Snorm),
        ct_format::RS16_GS16 => Some(Host::Rg16Sint),
        ct_format::RU16_GU16 => Some(Host::Rg16Uint),
        ct_format::RF16_GF16 => Some(Host::Rg16Float),
        ct_format::BF10GF11RF11 => Some(Host::Rg11b10Float),
        ct_format::RS32 => Some(Host::R32Sint),
        ct_format::RU32 => Some(Host::R32Uint),
        ct_format::RF32 => Some(Host::R32Float),
        ct_format::X8R8G8B8 => approximated(Host::Bgra8Unorm, warn_once),
        ct_format::X8RL8GL8BL8 => approximated(Host::Bgra8UnormSrgb, warn_once),
        // The host has no 16-bit packed color formats.
        ct_format::R5G6B5 => approximated(Host::Bgra8Unorm, warn_once),
        ct_format::A1R5G5B5 => approximated(Host::Bgra8Unorm, warn_once),
        ct_format::G8R8 => Some(Host::Rg8Unorm),
        ct_format::GN8RN8 => Some(Host::Rg8Snorm),
        ct_format::GS8RS8 => Some(Host::Rg8Sint),
        ct_format::GU8RU8 => Some(Host::Rg8Uint),
        ct_format::R16 => Some(Host::R16Unorm),
        ct_format::RN16 => Some(Host::R16Snorm),
        ct_format::RS16 => Some(Host::R16Sint),
        ct_format::RU16 => Some(Host::R16Uint),
        ct_format::RF16 => Some(Host::R16Float),
        ct_format::R8 => Some(Host::R8Unorm),
        ct_format::RN8 => Some(Host::R8Snorm),
        ct_format::RS8 => Some(Host::R8Sint),
        ct_format::RU8 => Some(Host::R8Uint),
        other => {
            // Not yet mapped; keep the content renderable.
            if warn_once.first("rt-format-unmapped", other) {
                warn!(
                    format = format_args!("0x{other:X}"),
                    "unmapped color target format; substituting Rgba8Unorm"
                );
            }
            Some(Host::Rgba8Unorm)
        }
    }
}

pub fn translate_depth_format(
    raw: u32,
    warn_once: &mut WarnOnce,
) -> Result<wgpu::TextureFormat, EngineError> {
    use wgpu::TextureFormat as Host;
    Ok(match raw {
        zt_format::Z16 => Host::Depth16Unorm,
        zt_format::ZF32 => Host::Depth32Float,
        zt_format::X8Z24 => Host::Depth24Plus,
        zt_format::Z24S8 | zt_format::S8Z24 => {
            // Host packing differs from S8Z24; depth/stencil contents still
            // round-trip through the aspect views.
            if raw == zt_format::S8Z24 && warn_once.first("zt-format-approx", raw) {
                warn!(
                    format = format_args!("0x{raw:X}"),
                    "S8Z24 component order approximated by Depth24PlusStencil8"
                );
            }
            Host::Depth24PlusStencil8
        }
        zt_format::S8 => Host::Stencil8,
        zt_format::ZF32_X24S8 => Host::Depth32FloatStencil8,
        other => {
            return Err(EngineError::InvalidEnum {
                what: "depth target format",
                method: regs::zt::FORMAT,
                value: other,
            })
        }
    })
}

fn view_kind(layer_count: u32, depth: u32) -> TextureViewKind {
    if layer_count > 1 || depth > 1 {
        TextureViewKind::D2Array
    } else {
        TextureViewKind::D2
    }
}

/// Resolves one color target's format and view. Returns the view so the
/// aggregator can assemble attachments.
pub fn flush_color_target(
    index: usize,
    regs: &regs::RegisterFile,
    packed: &mut PackedPipelineState,
    backend: &mut dyn HostBackend,
    tag: SubmissionTag,
    warn_once: &mut WarnOnce,
) -> Result<Option<Arc<TextureView>>, EngineError> {
    use crate::regs::color_target as ct;

    let raw_format = regs.get(ct::reg(index, ct::FORMAT));
    let format = translate_color_format(raw_format, warn_once);
    packed.color_formats[index] = format;

    let Some(format) = format else {
        return Ok(None);
    };

    let tile = TileMode::decode(regs.get(ct::reg(index, ct::TILE_MODE)));
    let third_dimension = regs.get(ct::reg(index, ct::THIRD_DIMENSION)) & 0xFFFF;
    // The third dimension is either an array size or a 3D depth, depending
    // on the volume bit.
    let (layer_count, depth) = if tile.is_3d {
        (1, third_dimension.max(1))
    } else {
        (third_dimension.max(1), 1)
    };
    let base_layer = regs.get(ct::reg(index, ct::LAYER_OFFSET));
    let array_pitch = u64::from(regs.get(ct::reg(index, ct::ARRAY_PITCH))) << 2;

    let descriptor = TextureViewDescriptor {
        format,
        aspect: TextureAspect::Color,
        kind: view_kind(layer_count, depth),
        width: regs.get(ct::reg(index, ct::WIDTH)),
        height: regs.get(ct::reg(index, ct::HEIGHT)),
        depth,
        base_layer,
        layer_count,
        layer_stride_bytes: if base_layer > 0 || layer_count > 1 {
            array_pitch
        } else {
            0
        },
        tiling: TileConfig::from_tile_mode(tile),
        guest_address: regs.get_address(
            ct::reg(index, ct::ADDRESS_HIGH),
            ct::reg(index, ct::ADDRESS_LOW),
        ),
    };

    Ok(Some(backend.find_or_create_view(&descriptor, tag)))
}

/// Resolves the depth target's format and view.
pub fn flush_depth_target(
    regs: &regs::RegisterFile,
    packed: &mut PackedPipelineState,
    backend: &mut dyn HostBackend,
    tag: SubmissionTag,
    warn_once: &mut WarnOnce,
) -> Result<Option<Arc<TextureView>>, EngineError> {
    use crate::regs::zt;

    if !regs.get_bool(regs::ZT_SELECT) {
        packed.depth_format = None;
        return Ok(None);
    }

    let format = translate_depth_format(regs.get(zt::FORMAT), warn_once)?;
    packed.depth_format = Some(format);

    let third = regs.get(zt::THIRD_DIMENSION);
    // Bit 16 selects whether the third dimension defines the array size.
    let layer_count = if third & (1 << 16) != 0 {
        (third & 0xFFFF).max(1)
    } else {
        1
    };
    let base_layer = regs.get(zt::LAYER);
    let tile = TileMode::decode(regs.get(zt::BLOCK_SIZE));

    let descriptor = TextureViewDescriptor {
        format,
        aspect: TextureAspect::DepthStencil,
        kind: view_kind(layer_count, 1),
        width: regs.get(zt::WIDTH),
        height: regs.get(zt::HEIGHT),
        depth: 1,
        base_layer,
        layer_count,
        layer_stride_bytes: if base_layer > 0 || layer_count > 1 {
            u64::from(regs.get(zt::ARRAY_PITCH)) << 2
        } else {
            0
        },
        tiling: TileConfig::from_tile_mode(tile),
        guest_address: regs.get_address(zt::ADDRESS_HIGH, zt::ADDRESS_LOW),
    };

    Ok(Some(backend.find_or_create_view(&descriptor, tag)))
}
