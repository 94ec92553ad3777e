//! Color blend register group translation.

use tracing::warn;

use crate::error::EngineError;
use crate::regs::{self, blend_factor, blend_op, logic_op, COLOR_TARGET_COUNT};
use crate::state::packed::{AttachmentBlend, PackedPipelineState};
use crate::state::WarnOnce;

pub fn translate_blend_op(raw: u32, method: u32) -> Result<wgpu::BlendOperation, EngineError> {
    Ok(match raw {
        blend_op::D3D_ADD | blend_op::OGL_FUNC_ADD => wgpu::BlendOperation::Add,
        blend_op::D3D_SUBTRACT | blend_op::OGL_FUNC_SUBTRACT => wgpu::BlendOperation::Subtract,
        blend_op::D3D_REV_SUBTRACT | blend_op::OGL_FUNC_REV_SUBTRACT => {
            wgpu::BlendOperation::ReverseSubtract
        }
        blend_op::D3D_MIN | blend_op::OGL_MIN => wgpu::BlendOperation::Min,
        blend_op::D3D_MAX | blend_op::OGL_MAX => wgpu::BlendOperation::Max,
        _ => {
            return Err(EngineError::InvalidEnum {
                what: "blend operation",
                method,
                value: raw,
            })
        }
    })
}

pub fn translate_blend_factor(raw: u32, method: u32) -> Result<wgpu::BlendFactor, EngineError> {
    use crate::regs::blend_factor as f;
    Ok(match raw {
        f::D3D_ZERO | f::OGL_ZERO => wgpu::BlendFactor::Zero,
        f::D3D_ONE | f::OGL_ONE => wgpu::BlendFactor::One,
        f::D3D_SRC_COLOR | f::OGL_SRC_COLOR => wgpu::BlendFactor::Src,
        f::D3D_INV_SRC_COLOR | f::OGL_INV_SRC_COLOR => wgpu::BlendFactor::OneMinusSrc,
        f::D3D_SRC_ALPHA | f::OGL_SRC_ALPHA => wgpu::BlendFactor::SrcAlpha,
        f::D3D_INV_SRC_ALPHA | f::OGL_INV_SRC_ALPHA => wgpu::BlendFactor::OneMinusSrcAlpha,
        f::D3D_DST_ALPHA | f::OGL_DST_ALPHA => wgpu::BlendFactor::DstAlpha,
        f::D3D_INV_DST_ALPHA | f::OGL_INV_DST_ALPHA => wgpu::BlendFactor::OneMinusDstAlpha,
        f::D3D_DST_COLOR | f::OGL_DST_COLOR => wgpu::BlendFactor::Dst,
        f::D3D_INV_DST_COLOR | f::OGL_INV_DST_COLOR => wgpu::BlendFactor::OneMinusDst,
        f::D3D_SRC_ALPHA_SATURATE | f::OGL_SRC_ALPHA_SATURATE => {
            wgpu::BlendFactor::SrcAlphaSaturated
        }
        f::D3D_BLEND_FACTOR | f::OGL_CONSTANT_COLOR => wgpu::BlendFactor::Constant,
        f::D3D_INV_BLEND_FACTOR | f::OGL_INV_CONSTANT_COLOR => wgpu::BlendFactor::OneMinusConstant,
        // WebGPU folds constant alpha into the constant color channel.
        f::OGL_CONSTANT_ALPHA => wgpu::BlendFactor::Constant,
        f::OGL_INV_CONSTANT_ALPHA => wgpu::BlendFactor::OneMinusConstant,
        f::D3D_SRC1_COLOR | f::OGL_SRC1_COLOR => wgpu::BlendFactor::Src1,
        f::D3D_INV_SRC1_COLOR | f::OGL_INV_SRC1_COLOR => wgpu::BlendFactor::OneMinusSrc1,
        f::D3D_SRC1_ALPHA | f::OGL_SRC1_ALPHA => wgpu::BlendFactor::Src1Alpha,
        f::D3D_INV_SRC1_ALPHA | f::OGL_INV_SRC1_ALPHA => wgpu::BlendFactor::OneMinusSrc1Alpha,
        _ => {
            return Err(EngineError::InvalidEnum {
                what: "blend factor",
                method,
                value: raw,
            })
        }
    })
}

/// The per-target color mask packs one nibble per component; any nonzero
/// nibble enables the component.
pub fn translate_color_write_mask(raw: u32) -> wgpu::ColorWrites {
    let mut mask = wgpu::ColorWrites::empty();
    if raw & 0x000F != 0 {
        mask |= wgpu::ColorWrites::RED;
    }
    if raw & 0x00F0 != 0 {
        mask |= wgpu::ColorWrites::GREEN;
    }
    if raw & 0x0F00 != 0 {
        mask |= wgpu::ColorWrites::BLUE;
    }
    if raw & 0xF000 != 0 {
        mask |= wgpu::ColorWrites::ALPHA;
    }
    mask
}

struct BlendRegs {
    op_rgb: u32,
    src_rgb: u32,
    dst_rgb: u32,
    op_alpha: u32,
    src_alpha: u32,
    dst_alpha: u32,
}

fn attachment_blend(
    raw: BlendRegs,
    enable: bool,
    write_mask: u32,
    method: u32,
) -> Result<AttachmentBlend, EngineError> {
    Ok(AttachmentBlend {
        enable,
        color_op: translate_blend_op(raw.op_rgb, method)?,
        src_color: translate_blend_factor(raw.src_rgb, method)?,
        dst_color: translate_blend_factor(raw.dst_rgb, method)?,
        alpha_op: translate_blend_op(raw.op_alpha, method)?,
        src_alpha: translate_blend_factor(raw.src_alpha, method)?,
        dst_alpha: translate_blend_factor(raw.dst_alpha, method)?,
        write_mask: translate_color_write_mask(write_mask),
    })
}

/// Recomputes logic op and every attachment's blend state.
pub fn update(
    regs: &regs::RegisterFile,
    packed: &mut PackedPipelineState,
    warn: &mut WarnOnce,
) -> Result<(), EngineError> {
    packed.logic_op_enable = regs.get_bool(regs::LOGIC_OP_ENABLE);
    let op = regs.get(regs::LOGIC_OP_FUNC);
    if packed.logic_op_enable && !(logic_op::CLEAR..=logic_op::SET).contains(&op) {
        return Err(EngineError::InvalidEnum {
            what: "logic operation",
            method: regs::LOGIC_OP_FUNC,
            value: op,
        });
    }
    packed.logic_op = op;
    if packed.logic_op_enable && warn.first("logic-op", op) {
        warn!(op = format_args!("0x{op:X}"), "logic ops are not expressible on the host; ignored");
    }

    let common_mask = regs.get_bool(regs::COLOR_MASK_COMMON);
    let per_target = regs.get_bool(regs::BLEND_INDEPENDENT_ENABLE);

    for i in 0..COLOR_TARGET_COUNT {
        let mask_reg = if common_mask {
            regs::COLOR_MASK_BASE
        } else {
            regs::COLOR_MASK_BASE + i as u32
        };
        let enable = regs.get_bool(regs::blend::ENABLE_BASE + i as u32);

        let raw = if per_target {
            use crate::regs::blend_per_target as bpt;
            BlendRegs {
                op_rgb: regs.get(bpt::reg(i, bpt::OP_RGB)),
                src_rgb: regs.get(bpt::reg(i, bpt::SRC_RGB)),
                dst_rgb: regs.get(bpt::reg(i, bpt::DST_RGB)),
                op_alpha: regs.get(bpt::reg(i, bpt::OP_ALPHA)),
                src_alpha: regs.get(bpt::reg(i, bpt::SRC_ALPHA)),
                dst_alpha: regs.get(bpt::reg(i, bpt::DST_ALPHA)),
            }
        } else {
            BlendRegs {
                op_rgb: regs.get(regs::blend::OP_RGB),
                src_rgb: regs.get(regs::blend::SRC_RGB),
                dst_rgb: regs.get(regs::blend::DST_RGB),
                op_alpha: regs.get(regs::blend::OP_ALPHA),
                src_alpha: regs.get(regs::blend::SRC_ALPHA),
                dst_alpha: regs.get(regs::blend::DST_ALPHA),
            }
        };

        packed.attachment_blends[i] =
            attachment_blend(raw, enable, regs.get(mask_reg), regs::blend::OP_RGB)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_factor_maps_both_numberings() {
        assert_eq!(
            translate_blend_factor(blend_factor::D3D_SRC_ALPHA, 0).unwrap(),
            wgpu::BlendFactor::SrcAlpha
        );
        assert_eq!(
            translate_blend_factor(blend_factor::OGL_INV_DST_COLOR, 0).unwrap(),
            wgpu::BlendFactor::OneMinusDst
        );
        assert_eq!(
            translate_blend_factor(blend_factor::OGL_CONSTANT_ALPHA, 0).unwrap(),
            wgpu::BlendFactor::Constant
        );
        assert!(translate_blend_factor(0xDEAD, 0).is_err());
    }

    #[test]
    fn blend_op_maps_both_numberings() {
        assert_eq!(
            translate_blend_op(blend_op::D3D_REV_SUBTRACT, 0).unwrap(),
            wgpu::BlendOperation::ReverseSubtract
        );
        assert_eq!(
            translate_blend_op(blend_op::OGL_MAX, 0).unwrap(),
            wgpu::BlendOperation::Max
        );
        assert!(translate_blend_op(0x8000, 0).is_err());
    }

    #[test]
    fn color_write_mask_uses_nibble_fields() {
        let mask = translate_color_write_mask(0x0F0F);
        assert!(mask.contains(wgpu::ColorWrites::RED));
        assert!(!mask.contains(wgpu::ColorWrites::GREEN));
        assert!(mask.contains(wgpu::ColorWrites::BLUE));
        assert!(!mask.contains(wgpu::ColorWrites::ALPHA));
    }
}
