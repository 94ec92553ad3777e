//! Input assembly: topology selection and primitive restart.
//!
//! Topology is not a plain register read: the `DRAW_BEGIN` argument carries
//! one, and the topology-override control selects between it and the
//! override register. Both feed this component directly from the dispatcher.

use tracing::warn;

use crate::regs::DrawTopology;
use crate::state::packed::PackedPipelineState;
use crate::state::WarnOnce;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TopologyTranslation {
    pub topology: wgpu::PrimitiveTopology,
    /// The host topology set has no fans; indices must be expanded on the
    /// CPU.
    pub needs_fan_emulation: bool,
    /// Quads decompose into two triangles per quad on the CPU.
    pub needs_quad_conversion: bool,
}

impl TopologyTranslation {
    fn direct(topology: wgpu::PrimitiveTopology) -> Self {
        TopologyTranslation {
            topology,
            needs_fan_emulation: false,
            needs_quad_conversion: false,
        }
    }
}

pub fn translate_draw_topology(
    topology: DrawTopology,
    warn_once: &mut WarnOnce,
) -> TopologyTranslation {
    use wgpu::PrimitiveTopology as Host;
    match topology {
        DrawTopology::Points => TopologyTranslation::direct(Host::PointList),
        DrawTopology::Lines => TopologyTranslation::direct(Host::LineList),
        DrawTopology::LineStrip => TopologyTranslation::direct(Host::LineStrip),
        DrawTopology::Triangles => TopologyTranslation::direct(Host::TriangleList),
        DrawTopology::TriangleStrip => TopologyTranslation::direct(Host::TriangleStrip),
        DrawTopology::TriangleFan => TopologyTranslation {
            topology: Host::TriangleList,
            needs_fan_emulation: true,
            needs_quad_conversion: false,
        },
        DrawTopology::Quads => TopologyTranslation {
            topology: Host::TriangleList,
            needs_fan_emulation: false,
            needs_quad_conversion: true,
        },
        other => {
            // Adjacency, loops, polygons and patch lists have no host
            // equivalent; degrade to the closest list topology.
            if warn_once.first("draw-topology", other as u32) {
                warn!(topology = ?other, "unsupported draw topology; degrading to a list");
            }
            match other {
                DrawTopology::LineLoop
                | DrawTopology::LinesAdjacency
                | DrawTopology::LineStripAdjacency => TopologyTranslation::direct(Host::LineList),
                _ => TopologyTranslation::direct(Host::TriangleList),
            }
        }
    }
}

/// Direct (non-lazy) input assembly state, pushed by the dispatcher.
#[derive(Debug)]
pub struct InputAssemblyState {
    topology: DrawTopology,
    primitive_restart: bool,
}

impl InputAssemblyState {
    pub fn new() -> Self {
        InputAssemblyState {
            topology: DrawTopology::Points,
            primitive_restart: false,
        }
    }

    pub fn set_topology(&mut self, topology: DrawTopology) {
        self.topology = topology;
    }

    pub fn topology(&self) -> DrawTopology {
        self.topology
    }

    pub fn set_primitive_restart(&mut self, enable: bool) {
        self.primitive_restart = enable;
    }

    pub fn update(&self, packed: &mut PackedPipelineState, warn_once: &mut WarnOnce) {
        let translated = translate_draw_topology(self.topology, warn_once);
        packed.topology = translated.topology;
        packed.needs_fan_emulation = translated.needs_fan_emulation;
        packed.needs_quad_conversion = translated.needs_quad_conversion;
        packed.primitive_restart = self.primitive_restart;
    }
}

impl Default for InputAssemblyState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_topology_flags_emulation() {
        let mut warn = WarnOnce::default();
        let translated = translate_draw_topology(DrawTopology::TriangleFan, &mut warn);
        assert_eq!(translated.topology, wgpu::PrimitiveTopology::TriangleList);
        assert!(translated.needs_fan_emulation);
    }

    #[test]
    fn quads_flag_conversion() {
        let mut warn = WarnOnce::default();
        let translated = translate_draw_topology(DrawTopology::Quads, &mut warn);
        assert_eq!(translated.topology, wgpu::PrimitiveTopology::TriangleList);
        assert!(translated.needs_quad_conversion);
    }

    #[test]
    fn adjacency_degrades_to_lists() {
        let mut warn = WarnOnce::default();
        let translated = translate_draw_topology(DrawTopology::TrianglesAdjacency, &mut warn);
        assert_eq!(translated.topology, wgpu::PrimitiveTopology::TriangleList);
        let translated = translate_draw_topology(DrawTopology::LineStripAdjacency, &mut warn);
        assert_eq!(translated.topology, wgpu::PrimitiveTopology::LineList);
    }
}
