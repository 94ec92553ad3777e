//! Tessellation register group.
//!
//! The host has no fixed-function tessellation state object; the decoded
//! parameters ride through the packed state so pipelines keyed on them stay
//! distinct for the shader-translation layer above.

use crate::regs::{self, TessellationParameters};
use crate::state::packed::PackedPipelineState;

pub fn update(regs: &regs::RegisterFile, packed: &mut PackedPipelineState) {
    packed.patch_size = regs.get(regs::PATCH_SIZE);
    packed.tessellation = TessellationParameters::decode(regs.get(regs::TESSELLATION_PARAMETERS));
}
