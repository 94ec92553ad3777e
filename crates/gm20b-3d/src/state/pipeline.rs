//! Pipeline state aggregator.
//!
//! Owns the packed state, the per-target view caches, and the direct
//! (recompute-free) vertex input and input assembly components. `flush`
//! recomputes exactly the slots the dirty tracker reports and assembles the
//! attachment set for the draw.

use std::sync::Arc;

use crate::dirty::{DirtyManager, Slot};
use crate::error::EngineError;
use crate::host::{Attachments, HostBackend, SubmissionTag, TextureView};
use crate::regs::{self, COLOR_TARGET_COUNT};
use crate::state::packed::PackedPipelineState;
use crate::state::{
    blend, depth_stencil, global_config, input_assembly, rasterization, render_target,
    tessellation, vertex_input, WarnOnce,
};

pub struct PipelineState {
    pub packed: PackedPipelineState,
    pub vertex_input: vertex_input::VertexInputState,
    pub input_assembly: input_assembly::InputAssemblyState,
    pub warn_once: WarnOnce,
    color_views: [Option<Arc<TextureView>>; COLOR_TARGET_COUNT],
    depth_view: Option<Arc<TextureView>>,
}

impl PipelineState {
    pub fn new() -> Self {
        PipelineState {
            packed: PackedPipelineState::default(),
            vertex_input: vertex_input::VertexInputState::new(),
            input_assembly: input_assembly::InputAssemblyState::new(),
            warn_once: WarnOnce::default(),
            color_views: Default::default(),
            depth_view: None,
        }
    }

    /// Registers every lazy slot's register dependencies. Runs once at
    /// engine construction.
    pub fn register_bindings(dirty: &mut DirtyManager) {
        dirty.bind_one(Slot::Tessellation, regs::TESSELLATION_PARAMETERS);
        dirty.bind_one(Slot::Tessellation, regs::PATCH_SIZE);

        dirty.bind(
            Slot::Rasterization,
            regs::POLYGON_MODE_FRONT,
            regs::POLYGON_MODE_BACK + 1,
        );
        dirty.bind(
            Slot::Rasterization,
            regs::POLY_OFFSET_POINT_ENABLE,
            regs::POLY_OFFSET_FILL_ENABLE + 1,
        );
        dirty.bind_one(Slot::Rasterization, regs::WINDOW_ORIGIN);
        dirty.bind_one(Slot::Rasterization, regs::PROVOKING_VERTEX);
        dirty.bind(Slot::Rasterization, regs::CULL_ENABLE, regs::CULL_FACE + 1);
        dirty.bind_one(Slot::Rasterization, regs::RASTER_ENABLE);

        dirty.bind_one(Slot::DepthStencil, regs::DEPTH_TEST_ENABLE);
        dirty.bind_one(Slot::DepthStencil, regs::DEPTH_WRITE_ENABLE);
        dirty.bind_one(Slot::DepthStencil, regs::DEPTH_FUNC);
        dirty.bind(
            Slot::DepthStencil,
            regs::STENCIL_ENABLE,
            regs::STENCIL_FRONT_FUNC + 1,
        );
        dirty.bind(
            Slot::DepthStencil,
            regs::STENCIL_TWO_SIDE_ENABLE,
            regs::STENCIL_BACK_FUNC + 1,
        );
        dirty.bind_one(Slot::DepthStencil, regs::DEPTH_BOUNDS_ENABLE);

        dirty.bind_one(Slot::ColorBlend, regs::COLOR_MASK_COMMON);
        dirty.bind_one(Slot::ColorBlend, regs::BLEND_INDEPENDENT_ENABLE);
        dirty.bind(
            Slot::ColorBlend,
            regs::blend::SEPARATE_ALPHA,
            regs::blend::ENABLE_BASE + COLOR_TARGET_COUNT as u32,
        );
        dirty.bind(
            Slot::ColorBlend,
            regs::blend_per_target::BASE,
            regs::blend_per_target::BASE
                + regs::blend_per_target::STRIDE * COLOR_TARGET_COUNT as u32,
        );
        dirty.bind(
            Slot::ColorBlend,
            regs::COLOR_MASK_BASE,
            regs::COLOR_MASK_BASE + COLOR_TARGET_COUNT as u32,
        );
        dirty.bind(
            Slot::ColorBlend,
            regs::LOGIC_OP_ENABLE,
            regs::LOGIC_OP_FUNC + 1,
        );

        dirty.bind_one(Slot::DepthTarget, regs::ZT_SELECT);
        dirty.bind(
            Slot::DepthTarget,
            regs::zt::ADDRESS_HIGH,
            regs::zt::ARRAY_PITCH + 1,
        );
        dirty.bind(Slot::DepthTarget, regs::zt::WIDTH, regs::zt::LAYER + 1);

        dirty.bind_one(Slot::GlobalConfig, regs::POST_VTG_ATTRIBUTE_SKIP_MASK);
        dirty.bind_one(Slot::GlobalConfig, regs::TEX_CB_INDEX);

        for i in 0..COLOR_TARGET_COUNT {
            let base = regs::color_target::reg(i, regs::color_target::ADDRESS_HIGH);
            dirty.bind(
                Slot::color_target(i),
                base,
                base + regs::color_target::LAYER_OFFSET + 1,
            );
        }
    }

    /// Recomputes dirty slots and returns the packed state plus the bound
    /// attachments. Vertex input and input assembly are direct components
    /// (kept current on every write) and only copy into the packed state
    /// here.
    pub fn flush(
        &mut self,
        regs: &regs::RegisterFile,
        dirty: &mut DirtyManager,
        backend: &mut dyn HostBackend,
        tag: SubmissionTag,
    ) -> Result<(&PackedPipelineState, Attachments), EngineError> {
        for i in 0..COLOR_TARGET_COUNT {
            if dirty.take_dirty(Slot::color_target(i)) {
                self.color_views[i] = render_target::flush_color_target(
                    i,
                    regs,
                    &mut self.packed,
                    backend,
                    tag,
                    &mut self.warn_once,
                )?;
            }
        }
        if dirty.take_dirty(Slot::DepthTarget) {
            self.depth_view = render_target::flush_depth_target(
                regs,
                &mut self.packed,
                backend,
                tag,
                &mut self.warn_once,
            )?;
        }

        self.vertex_input.update(&mut self.packed);
        self.input_assembly.update(&mut self.packed, &mut self.warn_once);

        if dirty.take_dirty(Slot::Tessellation) {
            tessellation::update(regs, &mut self.packed);
        }
        if dirty.take_dirty(Slot::Rasterization) {
            rasterization::update(regs, &mut self.packed, &mut self.warn_once)?;
        }
        if dirty.take_dirty(Slot::DepthStencil) {
            depth_stencil::update(regs, &mut self.packed, &mut self.warn_once)?;
        }
        if dirty.take_dirty(Slot::ColorBlend) {
            blend::update(regs, &mut self.packed, &mut self.warn_once)?;
        }
        if dirty.take_dirty(Slot::GlobalConfig) {
            global_config::update(regs, &mut self.packed);
        }

        Ok((&self.packed, self.attachments(regs)))
    }

    /// Picks the active attachments through the target remap control: the
    /// low nibble is the active count, then 3-bit physical indices.
    fn attachments(&self, regs: &regs::RegisterFile) -> Attachments {
        let control = regs.get(regs::RT_CONTROL);
        let count = (control & 0xF).min(COLOR_TARGET_COUNT as u32) as usize;
        let mut colors = Vec::with_capacity(count);
        for slot in 0..count {
            let physical = ((control >> (4 + slot * 3)) & 0x7) as usize;
            if let Some(view) = &self.color_views[physical] {
                colors.push(Arc::clone(view));
            }
        }
        Attachments {
            colors,
            depth: self.depth_view.clone(),
        }
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullBackend;

    fn flush_once(
        pipeline: &mut PipelineState,
        regs: &regs::RegisterFile,
        dirty: &mut DirtyManager,
        backend: &mut NullBackend,
    ) -> PackedPipelineState {
        let (packed, _) = pipeline
            .flush(regs, dirty, backend, SubmissionTag(0))
            .unwrap();
        packed.clone()
    }

    #[test]
    fn flush_recomputes_only_dirty_slots() {
        let mut regs = regs::RegisterFile::with_power_on_defaults();
        let mut dirty = DirtyManager::new();
        let mut pipeline = PipelineState::new();
        let mut backend = NullBackend::default();
        PipelineState::register_bindings(&mut dirty);

        let first = flush_once(&mut pipeline, &regs, &mut dirty, &mut backend);
        assert_eq!(first.depth_func, wgpu::CompareFunction::Always);

        // No further writes: nothing is dirty, so a stale register poke that
        // bypasses mark_dirty is not observed.
        regs.set(regs::DEPTH_FUNC, regs::compare_func::D3D_NEVER);
        let second = flush_once(&mut pipeline, &regs, &mut dirty, &mut backend);
        assert_eq!(second.depth_func, wgpu::CompareFunction::Always);

        dirty.mark_dirty(regs::DEPTH_FUNC);
        let third = flush_once(&mut pipeline, &regs, &mut dirty, &mut backend);
        assert_eq!(third.depth_func, wgpu::CompareFunction::Never);
    }

    #[test]
    fn attachments_follow_the_remap_control() {
        let mut regs = regs::RegisterFile::with_power_on_defaults();
        let mut dirty = DirtyManager::new();
        let mut pipeline = PipelineState::new();
        let mut backend = NullBackend::default();
        PipelineState::register_bindings(&mut dirty);

        use crate::regs::color_target as ct;
        regs.set(ct::reg(2, ct::FORMAT), regs::ct_format::A8B8G8R8);
        regs.set(ct::reg(2, ct::WIDTH), 640);
        regs.set(ct::reg(2, ct::HEIGHT), 480);
        // One active target remapped to physical index 2.
        regs.set(regs::RT_CONTROL, 1 | (2 << 4));

        let (packed, attachments) = pipeline
            .flush(&regs, &mut dirty, &mut backend, SubmissionTag(0))
            .unwrap();
        assert_eq!(packed.color_formats[2], Some(wgpu::TextureFormat::Rgba8Unorm));
        assert_eq!(attachments.colors.len(), 1);
        assert_eq!(attachments.colors[0].descriptor.width, 640);
        assert!(attachments.depth.is_none());
    }
}
