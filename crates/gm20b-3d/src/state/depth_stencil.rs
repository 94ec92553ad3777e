//! Depth/stencil register group translation.

use crate::error::EngineError;
use crate::regs::{self, compare_func, stencil_op};
use crate::state::packed::{PackedPipelineState, StencilFace};
use crate::state::WarnOnce;

/// Compare functions exist in a D3D numbering (1..=8) and an OGL numbering
/// (0x200..=0x207); both collapse onto the host ordering with small maths.
/// Anything outside the two ranges is not producible by hardware.
pub fn translate_compare_func(raw: u32, method: u32) -> Result<wgpu::CompareFunction, EngineError> {
    let code = if (compare_func::OGL_NEVER..=compare_func::OGL_ALWAYS).contains(&raw) {
        raw - compare_func::OGL_NEVER
    } else if (compare_func::D3D_NEVER..=compare_func::D3D_ALWAYS).contains(&raw) {
        raw - compare_func::D3D_NEVER
    } else {
        return Err(EngineError::InvalidEnum {
            what: "compare function",
            method,
            value: raw,
        });
    };

    Ok(match code {
        0 => wgpu::CompareFunction::Never,
        1 => wgpu::CompareFunction::Less,
        2 => wgpu::CompareFunction::Equal,
        3 => wgpu::CompareFunction::LessEqual,
        4 => wgpu::CompareFunction::Greater,
        5 => wgpu::CompareFunction::NotEqual,
        6 => wgpu::CompareFunction::GreaterEqual,
        _ => wgpu::CompareFunction::Always,
    })
}

pub fn translate_stencil_op(raw: u32, method: u32) -> Result<wgpu::StencilOperation, EngineError> {
    Ok(match raw {
        stencil_op::D3D_KEEP | stencil_op::OGL_KEEP => wgpu::StencilOperation::Keep,
        stencil_op::D3D_ZERO | stencil_op::OGL_ZERO => wgpu::StencilOperation::Zero,
        stencil_op::D3D_REPLACE | stencil_op::OGL_REPLACE => wgpu::StencilOperation::Replace,
        stencil_op::D3D_INCR_SAT | stencil_op::OGL_INCR_SAT => {
            wgpu::StencilOperation::IncrementClamp
        }
        stencil_op::D3D_DECR_SAT | stencil_op::OGL_DECR_SAT => {
            wgpu::StencilOperation::DecrementClamp
        }
        stencil_op::D3D_INVERT | stencil_op::OGL_INVERT => wgpu::StencilOperation::Invert,
        stencil_op::D3D_INCR | stencil_op::OGL_INCR => wgpu::StencilOperation::IncrementWrap,
        stencil_op::D3D_DECR | stencil_op::OGL_DECR => wgpu::StencilOperation::DecrementWrap,
        _ => {
            return Err(EngineError::InvalidEnum {
                what: "stencil operation",
                method,
                value: raw,
            })
        }
    })
}

fn stencil_face(regs: &regs::RegisterFile, fail: u32, zfail: u32, zpass: u32, func: u32)
    -> Result<StencilFace, EngineError>
{
    Ok(StencilFace {
        fail: translate_stencil_op(regs.get(fail), fail)?,
        depth_fail: translate_stencil_op(regs.get(zfail), zfail)?,
        pass: translate_stencil_op(regs.get(zpass), zpass)?,
        func: translate_compare_func(regs.get(func), func)?,
    })
}

/// Recomputes the depth/stencil fields.
pub fn update(
    regs: &regs::RegisterFile,
    packed: &mut PackedPipelineState,
    _warn: &mut WarnOnce,
) -> Result<(), EngineError> {
    packed.depth_test_enable = regs.get_bool(regs::DEPTH_TEST_ENABLE);
    packed.depth_write_enable = regs.get_bool(regs::DEPTH_WRITE_ENABLE);
    packed.depth_func = translate_compare_func(regs.get(regs::DEPTH_FUNC), regs::DEPTH_FUNC)?;
    packed.depth_bounds_test_enable = regs.get_bool(regs::DEPTH_BOUNDS_ENABLE);
    packed.stencil_test_enable = regs.get_bool(regs::STENCIL_ENABLE);

    packed.stencil_front = stencil_face(
        regs,
        regs::STENCIL_FRONT_OP_FAIL,
        regs::STENCIL_FRONT_OP_ZFAIL,
        regs::STENCIL_FRONT_OP_ZPASS,
        regs::STENCIL_FRONT_FUNC,
    )?;

    // Back-face state only diverges when the two-sided test is enabled.
    packed.stencil_back = if regs.get_bool(regs::STENCIL_TWO_SIDE_ENABLE) {
        stencil_face(
            regs,
            regs::STENCIL_BACK_OP_FAIL,
            regs::STENCIL_BACK_OP_ZFAIL,
            regs::STENCIL_BACK_OP_ZPASS,
            regs::STENCIL_BACK_FUNC,
        )?
    } else {
        packed.stencil_front
    };

    Ok(())
}
