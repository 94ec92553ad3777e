//! Register-to-host state translation.
//!
//! Each submodule owns one register group and rewrites only its fields of the
//! [`PackedPipelineState`]; the [`pipeline`] aggregator drives lazy recompute
//! off the dirty tracker and resolves render-target views at flush time.

pub mod blend;
pub mod depth_stencil;
pub mod global_config;
pub mod input_assembly;
pub mod packed;
pub mod pipeline;
pub mod rasterization;
pub mod render_target;
pub mod tessellation;
pub mod vertex_input;

pub use input_assembly::{translate_draw_topology, TopologyTranslation};
pub use packed::{
    AttachmentBlend, PackedPipelineState, PackedVertexAttribute, StencilFace, VertexBinding,
};
pub use pipeline::PipelineState;

use hashbrown::HashSet;

/// Deduplicates per-occurrence-class fidelity warnings.
///
/// Owned by the engine instance rather than a process-wide static so two
/// engines never suppress each other's diagnostics.
#[derive(Debug, Default)]
pub struct WarnOnce {
    seen: HashSet<(&'static str, u32)>,
}

impl WarnOnce {
    /// Returns true the first time a (class, value) pair is seen; callers
    /// emit their `tracing::warn!` only then.
    pub fn first(&mut self, class: &'static str, value: u32) -> bool {
        self.seen.insert((class, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warn_once_deduplicates_per_value() {
        let mut warn = WarnOnce::default();
        assert!(warn.first("rt-format", 0xE8));
        assert!(!warn.first("rt-format", 0xE8));
        assert!(warn.first("rt-format", 0xE9));
        assert!(warn.first("vertex-format", 0xE8));
    }
}
