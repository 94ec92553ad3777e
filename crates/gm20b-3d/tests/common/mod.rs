//! Shared test backend that records every host call in order.

use std::sync::Arc;

use gm20b_3d::{
    Attachments, ClearParams, ConstantBufferSelector, DrawParams, EngineError, HostBackend,
    MemoryMapping, PackedPipelineState, ShaderStage, SubmissionTag, TextureView,
    TextureViewDescriptor,
};

#[derive(Debug, PartialEq)]
pub enum Event {
    Draw {
        params: DrawParams,
        topology: wgpu::PrimitiveTopology,
        color_attachments: usize,
        has_depth: bool,
    },
    ConstantBufferLoad {
        words: Vec<u32>,
        start_offset: u32,
    },
    ConstantBufferBind {
        stage: ShaderStage,
        slot: u32,
        valid: bool,
        selector: ConstantBufferSelector,
    },
    SyncpointIncrement(u32),
    GuestWrite32 {
        address: u64,
        value: u32,
    },
    GuestWrite64 {
        address: u64,
        value: u64,
    },
    Clear(ClearParams),
}

/// Backend that records host calls and the packed state of each draw.
#[derive(Default)]
pub struct RecordingBackend {
    pub events: Vec<Event>,
    pub draw_states: Vec<PackedPipelineState>,
    pub timestamp: u64,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draws(&self) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|event| matches!(event, Event::Draw { .. }))
            .collect()
    }
}

impl HostBackend for RecordingBackend {
    fn translate_range(
        &mut self,
        address: u64,
        size: u64,
    ) -> Result<Vec<MemoryMapping>, EngineError> {
        Ok(vec![MemoryMapping {
            host_offset: address,
            size,
        }])
    }

    fn find_or_create_view(
        &mut self,
        descriptor: &TextureViewDescriptor,
        _tag: SubmissionTag,
    ) -> Arc<TextureView> {
        Arc::new(TextureView {
            descriptor: descriptor.clone(),
        })
    }

    fn load_constant_buffer(&mut self, words: &[u32], start_offset: u32) {
        self.events.push(Event::ConstantBufferLoad {
            words: words.to_vec(),
            start_offset,
        });
    }

    fn bind_constant_buffer(
        &mut self,
        stage: ShaderStage,
        slot: u32,
        valid: bool,
        selector: ConstantBufferSelector,
    ) {
        self.events.push(Event::ConstantBufferBind {
            stage,
            slot,
            valid,
            selector,
        });
    }

    fn increment_syncpoint(&mut self, id: u32) {
        self.events.push(Event::SyncpointIncrement(id));
    }

    fn write_guest_u32(&mut self, address: u64, value: u32) -> Result<(), EngineError> {
        self.events.push(Event::GuestWrite32 { address, value });
        Ok(())
    }

    fn write_guest_u64(&mut self, address: u64, value: u64) -> Result<(), EngineError> {
        self.events.push(Event::GuestWrite64 { address, value });
        Ok(())
    }

    fn gpu_timestamp_ticks(&self) -> u64 {
        self.timestamp
    }

    fn draw(
        &mut self,
        params: DrawParams,
        topology: wgpu::PrimitiveTopology,
        state: &PackedPipelineState,
        attachments: &Attachments,
    ) {
        self.draw_states.push(state.clone());
        self.events.push(Event::Draw {
            params,
            topology,
            color_attachments: attachments.colors.len(),
            has_depth: attachments.depth.is_some(),
        });
    }

    fn clear(&mut self, params: ClearParams) {
        self.events.push(Event::Clear(params));
    }
}

pub fn recording_engine() -> gm20b_3d::Maxwell3d<RecordingBackend> {
    gm20b_3d::Maxwell3d::new(RecordingBackend::new())
}
