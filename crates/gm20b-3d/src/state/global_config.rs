//! Global shader configuration words carried through the packed state.

use crate::regs;
use crate::state::packed::PackedPipelineState;

pub fn update(regs: &regs::RegisterFile, packed: &mut PackedPipelineState) {
    packed.post_vtg_attribute_skip_mask = regs.get(regs::POST_VTG_ATTRIBUTE_SKIP_MASK);
    packed.bindless_texture_slot = regs.get(regs::TEX_CB_INDEX);
}
