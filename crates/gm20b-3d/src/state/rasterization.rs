//! Rasterization register group translation.

use tracing::warn;

use crate::error::EngineError;
use crate::regs::{self, face, polygon_mode};
use crate::state::packed::PackedPipelineState;
use crate::state::WarnOnce;

pub fn translate_polygon_mode(raw: u32, method: u32) -> Result<wgpu::PolygonMode, EngineError> {
    Ok(match raw {
        polygon_mode::POINT => wgpu::PolygonMode::Point,
        polygon_mode::LINE => wgpu::PolygonMode::Line,
        polygon_mode::FILL => wgpu::PolygonMode::Fill,
        _ => {
            return Err(EngineError::InvalidEnum {
                what: "polygon mode",
                method,
                value: raw,
            })
        }
    })
}

/// `FrontAndBack` is producible but the host can only cull a single face;
/// approximate with `Back` and keep a diagnostic trail.
pub fn translate_cull_mode(
    enable: bool,
    raw: u32,
    warn_once: &mut WarnOnce,
) -> Result<Option<wgpu::Face>, EngineError> {
    if !enable {
        return Ok(None);
    }
    Ok(match raw {
        face::CULL_FRONT => Some(wgpu::Face::Front),
        face::CULL_BACK => Some(wgpu::Face::Back),
        face::CULL_FRONT_AND_BACK => {
            if warn_once.first("cull-front-and-back", raw) {
                warn!("cull mode FrontAndBack is not expressible on the host; culling Back");
            }
            Some(wgpu::Face::Back)
        }
        _ => {
            return Err(EngineError::InvalidEnum {
                what: "cull face",
                method: regs::CULL_FACE,
                value: raw,
            })
        }
    })
}

/// Depth-bias enable follows the poly-offset enable of the active polygon
/// mode.
fn depth_bias_enable(regs: &regs::RegisterFile, mode: wgpu::PolygonMode) -> bool {
    match mode {
        wgpu::PolygonMode::Point => regs.get_bool(regs::POLY_OFFSET_POINT_ENABLE),
        wgpu::PolygonMode::Line => regs.get_bool(regs::POLY_OFFSET_LINE_ENABLE),
        wgpu::PolygonMode::Fill => regs.get_bool(regs::POLY_OFFSET_FILL_ENABLE),
    }
}

/// Recomputes the rasterization fields.
pub fn update(
    regs: &regs::RegisterFile,
    packed: &mut PackedPipelineState,
    warn_once: &mut WarnOnce,
) -> Result<(), EngineError> {
    packed.rasterizer_discard = !regs.get_bool(regs::RASTER_ENABLE);

    let front_mode = regs.get(regs::POLYGON_MODE_FRONT);
    packed.polygon_mode = translate_polygon_mode(front_mode, regs::POLYGON_MODE_FRONT)?;
    let back_mode = regs.get(regs::POLYGON_MODE_BACK);
    if back_mode != front_mode && warn_once.first("polygon-mode-mismatch", back_mode) {
        warn!(
            front = format_args!("0x{front_mode:X}"),
            back = format_args!("0x{back_mode:X}"),
            "non-matching front/back polygon modes; using front"
        );
    }

    packed.cull_mode = translate_cull_mode(
        regs.get_bool(regs::CULL_ENABLE),
        regs.get(regs::CULL_FACE),
        warn_once,
    )?;

    // The window-origin flip inverts winding on the host, so front-face is
    // XORed with it.
    packed.flip_y = regs.get(regs::WINDOW_ORIGIN) & (1 << 0) != 0;
    let guest_clockwise = match regs.get(regs::FRONT_FACE) {
        face::FRONT_CW => true,
        face::FRONT_CCW => false,
        other => {
            return Err(EngineError::InvalidEnum {
                what: "front face",
                method: regs::FRONT_FACE,
                value: other,
            })
        }
    };
    packed.front_face = if guest_clockwise != packed.flip_y {
        wgpu::FrontFace::Cw
    } else {
        wgpu::FrontFace::Ccw
    };

    packed.depth_bias_enable = depth_bias_enable(regs, packed.polygon_mode);
    packed.provoking_vertex_last = regs.get_bool(regs::PROVOKING_VERTEX);

    Ok(())
}
