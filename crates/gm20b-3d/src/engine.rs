//! The Maxwell 3D register dispatcher.
//!
//! Every guest interaction with the engine is a `(method, argument)` write
//! into the register image. `write` runs the full dispatch pipeline: shadow
//! RAM, redundancy elision, constant-buffer write batching, deferred-draw
//! coalescing, dirty marking, then method-specific side effects. Order
//! matters throughout and is part of the guest-visible contract.

use tracing::{debug, warn};

use crate::dirty::DirtyManager;
use crate::error::EngineError;
use crate::host::{
    ClearParams, ConstantBufferSelector, DrawParams, HostBackend, ShaderStage, SubmissionTag,
};
use crate::regs::{
    self, Begin, BeginInstance, ClearSurface, DrawTopology, RegisterFile, SemaphoreInfo,
    ShadowRamControl, MACRO_CODE_CAPACITY, MACRO_POSITION_CAPACITY, REGISTER_COUNT,
    SHADER_STAGE_COUNT, VERTEX_ATTRIBUTE_COUNT, VERTEX_STREAM_COUNT,
};
use crate::state::PipelineState;

/// Draw parameters captured at the triggering count-register write and held
/// until a non-draw method forces submission, so that instanced draws issued
/// as N begin/count/end triplets coalesce into a single host draw.
#[derive(Debug, Default)]
struct DeferredDraw {
    pending: bool,
    indexed: bool,
    topology_raw: u32,
    count: u32,
    first: u32,
    instance_count: u32,
    base_vertex: u32,
    base_instance: u32,
}

/// In-flight batched constant-buffer upload.
struct CbufBatch {
    start_offset: u32,
    words: Vec<u32>,
}

/// MME instruction and start-address stores.
struct MacroStore {
    code: Box<[u32]>,
    start_addresses: [u32; MACRO_POSITION_CAPACITY],
}

impl MacroStore {
    fn new() -> Self {
        MacroStore {
            code: vec![0u32; MACRO_CODE_CAPACITY].into_boxed_slice(),
            start_addresses: [0; MACRO_POSITION_CAPACITY],
        }
    }
}

/// The GM20B 3D engine (class 0xB197).
pub struct Maxwell3d<H: HostBackend> {
    backend: H,
    regs: RegisterFile,
    shadow: RegisterFile,
    shadow_mode: ShadowRamControl,
    dirty: DirtyManager,
    pipeline: PipelineState,
    deferred: DeferredDraw,
    cbuf_batch: Option<CbufBatch>,
    macros: MacroStore,
    /// Instance count accumulated from `DRAW_BEGIN` before the triggering
    /// count write arrives.
    begin_instance_count: u32,
    submission_counter: u64,
}

impl<H: HostBackend> Maxwell3d<H> {
    pub fn new(backend: H) -> Self {
        let mut dirty = DirtyManager::new();
        PipelineState::register_bindings(&mut dirty);
        let regs = RegisterFile::with_power_on_defaults();
        Maxwell3d {
            backend,
            shadow: regs.clone(),
            regs,
            shadow_mode: ShadowRamControl::MethodTrack,
            dirty,
            pipeline: PipelineState::new(),
            deferred: DeferredDraw::default(),
            cbuf_batch: None,
            macros: MacroStore::new(),
            begin_instance_count: 1,
            submission_counter: 0,
        }
    }

    pub fn backend(&self) -> &H {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut H {
        &mut self.backend
    }

    pub fn into_backend(self) -> H {
        self.backend
    }

    /// Reads back a register word as the guest would observe it.
    pub fn read_register(&self, method: u32) -> Result<u32, EngineError> {
        if !self.regs.in_range(method) {
            return Err(EngineError::MethodOutOfRange {
                method,
                limit: REGISTER_COUNT as u32,
            });
        }
        Ok(self.regs.get(method))
    }

    /// Dispatches a single register write.
    pub fn write(&mut self, method: u32, argument: u32) -> Result<(), EngineError> {
        if !self.regs.in_range(method) {
            return Err(EngineError::MethodOutOfRange {
                method,
                limit: REGISTER_COUNT as u32,
            });
        }

        // The shadow control register is itself exempt from shadowing.
        if method == regs::mme::SHADOW_RAM_CONTROL {
            let mode = match ShadowRamControl::from_raw(argument) {
                Some(mode) => mode,
                None => {
                    if self.pipeline.warn_once.first("shadow-ram-control", argument) {
                        warn!(
                            value = argument,
                            "unknown shadow RAM control mode; falling back to passthrough"
                        );
                    }
                    ShadowRamControl::MethodPassthrough
                }
            };
            self.shadow_mode = mode;
            self.regs.set(method, argument);
            self.shadow.set(method, argument);
            return Ok(());
        }

        let argument = match self.shadow_mode {
            ShadowRamControl::MethodTrack | ShadowRamControl::MethodTrackWithFilter => {
                self.shadow.set(method, argument);
                argument
            }
            ShadowRamControl::MethodPassthrough => argument,
            ShadowRamControl::MethodReplay => self.shadow.get(method),
        };

        let redundant = self.regs.get(method) == argument;
        self.regs.set(method, argument);

        // An active constant-buffer batch swallows further data-word writes;
        // any other method terminates it.
        if self.cbuf_batch.is_some() {
            if Self::is_cbuf_data(method) {
                self.append_cbuf_word(argument);
                return Ok(());
            }
            self.flush_cbuf_batch();
        }

        // A pending draw absorbs the begin/count/end repetition that guest
        // drivers emit per instance; anything else submits it first.
        if self.deferred.pending {
            match method {
                regs::DRAW_BEGIN => {
                    let begin = Begin::decode(argument);
                    match begin.instance {
                        BeginInstance::Subsequent | BeginInstance::Unchanged => {
                            // With the override control active the begin
                            // field is legitimately stale; only the selected
                            // topology source can contradict the draw.
                            if !self.regs.get_bool(regs::TOPOLOGY_OVERRIDE_CONTROL)
                                && begin.topology != self.deferred.topology_raw
                                && self
                                    .pipeline
                                    .warn_once
                                    .first("instance-topology-change", begin.topology)
                            {
                                warn!(
                                    topology = begin.topology,
                                    "topology changed between instances of a coalesced draw"
                                );
                            }
                            self.begin_instance_count += 1;
                            self.deferred.instance_count = self.begin_instance_count;
                            return Ok(());
                        }
                        BeginInstance::First => self.submit_deferred_draw()?,
                    }
                }
                regs::DRAW_END => return Ok(()),
                regs::DRAW_VERTEX_ARRAY_COUNT if !self.deferred.indexed => {
                    if !redundant {
                        warn!(count = argument, "draw count changed between instances");
                    }
                    return Ok(());
                }
                m if m == regs::index_buffer::COUNT && self.deferred.indexed => {
                    if !redundant {
                        warn!(count = argument, "draw count changed between instances");
                    }
                    return Ok(());
                }
                _ => self.submit_deferred_draw()?,
            }
        }

        if !redundant {
            self.dirty.mark_dirty(method);
            self.update_direct_state(method, argument);
        }

        self.handle_method(method, argument)
    }

    /// Dispatches a run of arguments written to the same method without
    /// address auto-increment. Constant-buffer data words take a bulk path
    /// that appends the whole run to the batch in one go; an active shadow
    /// track or replay mode forces the per-word path so every word passes
    /// through the shadow image.
    pub fn write_batch_non_inc(
        &mut self,
        method: u32,
        arguments: &[u32],
    ) -> Result<(), EngineError> {
        if Self::is_cbuf_data(method)
            && !arguments.is_empty()
            && self.shadow_mode == ShadowRamControl::MethodPassthrough
        {
            if !self.regs.in_range(method) {
                return Err(EngineError::MethodOutOfRange {
                    method,
                    limit: REGISTER_COUNT as u32,
                });
            }
            if self.deferred.pending {
                self.submit_deferred_draw()?;
            }
            for &word in arguments {
                self.append_cbuf_word(word);
            }
            self.regs.set(method, arguments[arguments.len() - 1]);
            return Ok(());
        }
        for &argument in arguments {
            self.write(method, argument)?;
        }
        Ok(())
    }

    /// Submits all pending work: the coalesced draw first, then any open
    /// constant-buffer batch.
    pub fn flush(&mut self) -> Result<(), EngineError> {
        self.submit_deferred_draw()?;
        self.flush_cbuf_batch();
        Ok(())
    }

    fn is_cbuf_data(method: u32) -> bool {
        use crate::regs::load_constant_buffer as lcb;
        (lcb::DATA_BASE..lcb::DATA_BASE + lcb::DATA_COUNT).contains(&method)
    }

    /// Appends one word to the batch, opening it at the current upload
    /// offset if needed, and advances the offset register the way the
    /// hardware does.
    fn append_cbuf_word(&mut self, word: u32) {
        use crate::regs::load_constant_buffer as lcb;
        let offset = self.regs.get(lcb::OFFSET);
        let batch = self.cbuf_batch.get_or_insert_with(|| CbufBatch {
            start_offset: offset,
            words: Vec::with_capacity(lcb::DATA_COUNT as usize),
        });
        batch.words.push(word);
        self.regs.set(lcb::OFFSET, offset.wrapping_add(4));
    }

    fn flush_cbuf_batch(&mut self) {
        if let Some(batch) = self.cbuf_batch.take() {
            debug!(
                words = batch.words.len(),
                offset = batch.start_offset,
                "flushing constant buffer batch"
            );
            self.backend
                .load_constant_buffer(&batch.words, batch.start_offset);
        }
    }

    fn next_tag(&mut self) -> SubmissionTag {
        self.submission_counter += 1;
        SubmissionTag(self.submission_counter)
    }

    fn submit_deferred_draw(&mut self) -> Result<(), EngineError> {
        if !self.deferred.pending {
            return Ok(());
        }
        self.deferred.pending = false;
        self.begin_instance_count = 1;

        let tag = self.next_tag();
        let (packed, attachments) =
            self.pipeline
                .flush(&self.regs, &mut self.dirty, &mut self.backend, tag)?;
        let params = DrawParams {
            indexed: self.deferred.indexed,
            count: self.deferred.count,
            first: self.deferred.first,
            instance_count: self.deferred.instance_count,
            base_vertex: self.deferred.base_vertex,
            base_instance: self.deferred.base_instance,
        };
        self.backend
            .draw(params, packed.topology, packed, &attachments);
        Ok(())
    }

    /// Direct state components are kept current per write rather than
    /// recomputed lazily; their registers are written far less often than
    /// draws occur.
    fn update_direct_state(&mut self, method: u32, argument: u32) {
        use crate::regs::vertex_stream as vs;

        match method {
            m if (regs::VERTEX_ATTRIBUTE_BASE
                ..regs::VERTEX_ATTRIBUTE_BASE + VERTEX_ATTRIBUTE_COUNT as u32)
                .contains(&m) =>
            {
                let index = (m - regs::VERTEX_ATTRIBUTE_BASE) as usize;
                self.pipeline
                    .vertex_input
                    .set_attribute(index, argument, &mut self.pipeline.warn_once);
            }
            m if (vs::BASE..vs::BASE + vs::STRIDE * VERTEX_STREAM_COUNT as u32).contains(&m) => {
                let index = ((m - vs::BASE) / vs::STRIDE) as usize;
                match (m - vs::BASE) % vs::STRIDE {
                    vs::CONTROL => self.pipeline.vertex_input.set_stream_control(index, argument),
                    vs::FREQUENCY => self.pipeline.vertex_input.set_divisor(index, argument),
                    _ => {}
                }
            }
            m if (regs::VERTEX_STREAM_INSTANCE_BASE
                ..regs::VERTEX_STREAM_INSTANCE_BASE + VERTEX_STREAM_COUNT as u32)
                .contains(&m) =>
            {
                let index = (m - regs::VERTEX_STREAM_INSTANCE_BASE) as usize;
                self.pipeline
                    .vertex_input
                    .set_input_rate(index, argument & 1 != 0);
            }
            regs::PRIMITIVE_RESTART_ENABLE => self
                .pipeline
                .input_assembly
                .set_primitive_restart(argument & 1 != 0),
            _ => {}
        }
    }

    /// Method-specific side effects. These run even for redundant writes:
    /// re-writing the same argument to a trigger register re-triggers it.
    fn handle_method(&mut self, method: u32, argument: u32) -> Result<(), EngineError> {
        match method {
            regs::mme::INSTRUCTION_RAM_LOAD => self.load_macro_instruction(argument),
            regs::mme::START_ADDRESS_RAM_LOAD => self.load_macro_start_address(method, argument)?,
            regs::SYNCPOINT_ACTION => {
                // Pending work must reach the host before the syncpoint
                // increments or the guest observes completion too early.
                self.flush()?;
                self.backend.increment_syncpoint(argument & 0xFFF);
            }
            regs::CLEAR_SURFACE => self.clear_surface(argument)?,
            regs::DRAW_BEGIN => self.handle_begin(argument)?,
            regs::DRAW_END => {}
            regs::DRAW_VERTEX_ARRAY_COUNT => self.set_deferred_draw(false, argument),
            m if m == regs::index_buffer::COUNT => self.set_deferred_draw(true, argument),
            m if m == regs::semaphore::INFO => self.handle_semaphore(argument)?,
            m if m == regs::FIRMWARE_CALL_BASE + 4 => {
                // Observed firmware blob behavior; the guest driver polls
                // this scratch register for the call result.
                self.regs.set(regs::FIRMWARE_SCRATCH, 1);
            }
            m if Self::is_cbuf_data(m) => {
                // First data word after a batch flush (or ever): open a new
                // batch. Later words short-circuit at the top of `write`.
                self.append_cbuf_word(argument);
            }
            m => {
                for stage in 0..SHADER_STAGE_COUNT {
                    if m == regs::bind_group::constant_buffer_reg(stage) {
                        self.bind_constant_buffer(stage, argument);
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Writes one MME instruction word. The instruction RAM pointer wraps at
    /// the store capacity: observed guest firmwares rely on reload-in-place.
    fn load_macro_instruction(&mut self, argument: u32) {
        let pointer = self.regs.get(regs::mme::INSTRUCTION_RAM_POINTER);
        if pointer as usize >= MACRO_CODE_CAPACITY
            && self.pipeline.warn_once.first("macro-code-wrap", pointer)
        {
            warn!(pointer, "macro instruction RAM pointer wrapped");
        }
        self.macros.code[pointer as usize % MACRO_CODE_CAPACITY] = argument;
        // The stored pointer wraps too, so guest readback stays within the
        // RAM.
        self.regs.set(
            regs::mme::INSTRUCTION_RAM_POINTER,
            pointer.wrapping_add(1) % MACRO_CODE_CAPACITY as u32,
        );
    }

    fn load_macro_start_address(&mut self, method: u32, argument: u32) -> Result<(), EngineError> {
        let pointer = self.regs.get(regs::mme::START_ADDRESS_RAM_POINTER);
        if pointer as usize >= MACRO_POSITION_CAPACITY {
            return Err(EngineError::MacroStoreFull {
                method,
                capacity: MACRO_POSITION_CAPACITY,
            });
        }
        self.macros.start_addresses[pointer as usize] = argument;
        self.regs
            .set(regs::mme::START_ADDRESS_RAM_POINTER, pointer + 1);
        Ok(())
    }

    /// Entry point of macro `index` in the instruction RAM, for the macro
    /// interpreter above this engine.
    pub fn macro_start_address(&self, index: usize) -> Option<u32> {
        self.macros.start_addresses.get(index).copied()
    }

    pub fn macro_code(&self) -> &[u32] {
        &self.macros.code
    }

    fn handle_begin(&mut self, argument: u32) -> Result<(), EngineError> {
        let begin = Begin::decode(argument);
        let raw_topology = if self.regs.get_bool(regs::TOPOLOGY_OVERRIDE_CONTROL) {
            self.regs.get(regs::TOPOLOGY_OVERRIDE)
        } else {
            begin.topology
        };
        let topology =
            DrawTopology::from_raw(raw_topology).ok_or(EngineError::InvalidEnum {
                what: "draw topology",
                method: regs::DRAW_BEGIN,
                value: raw_topology,
            })?;
        self.pipeline.input_assembly.set_topology(topology);
        match begin.instance {
            BeginInstance::First => self.begin_instance_count = 1,
            // A flush can split an instanced begin/count sequence; later
            // instances still have to land with a cumulative count.
            BeginInstance::Subsequent | BeginInstance::Unchanged => {
                self.begin_instance_count += 1;
            }
        }
        Ok(())
    }

    /// Captures the draw at its triggering count write; submission waits for
    /// the next non-draw method.
    fn set_deferred_draw(&mut self, indexed: bool, count: u32) {
        self.deferred = DeferredDraw {
            pending: true,
            indexed,
            topology_raw: self.pipeline.input_assembly.topology() as u32,
            count,
            first: if indexed {
                self.regs.get(regs::index_buffer::FIRST)
            } else {
                self.regs.get(regs::VERTEX_ARRAY_START)
            },
            instance_count: self.begin_instance_count,
            base_vertex: if indexed {
                self.regs.get(regs::GLOBAL_BASE_VERTEX_INDEX)
            } else {
                0
            },
            base_instance: self.regs.get(regs::GLOBAL_BASE_INSTANCE_INDEX),
        };
    }

    fn clear_surface(&mut self, argument: u32) -> Result<(), EngineError> {
        // Clears are ordered against draws, and need current attachments.
        self.flush()?;
        let tag = self.next_tag();
        self.pipeline
            .flush(&self.regs, &mut self.dirty, &mut self.backend, tag)?;
        let params = ClearParams {
            surface: ClearSurface::decode(argument),
            color: [
                self.regs.get_f32(regs::CLEAR_COLOR),
                self.regs.get_f32(regs::CLEAR_COLOR + 1),
                self.regs.get_f32(regs::CLEAR_COLOR + 2),
                self.regs.get_f32(regs::CLEAR_COLOR + 3),
            ],
            depth: self.regs.get_f32(regs::CLEAR_DEPTH),
            stencil: self.regs.get(regs::CLEAR_STENCIL),
        };
        self.backend.clear(params);
        Ok(())
    }

    fn handle_semaphore(&mut self, argument: u32) -> Result<(), EngineError> {
        use crate::regs::{semaphore, semaphore_counter, semaphore_op};

        let info = SemaphoreInfo::decode(argument);
        if info.reduction_enable {
            if self.pipeline.warn_once.first("semaphore-reduction", argument) {
                warn!(op = info.op, "reduction semaphore; dropped");
            }
            return Ok(());
        }
        let address = self
            .regs
            .get_address(semaphore::ADDRESS_HIGH, semaphore::ADDRESS_LOW);
        let payload = self.regs.get(semaphore::PAYLOAD);

        let write_payload = match info.op {
            semaphore_op::RELEASE => true,
            semaphore_op::COUNTER if info.counter_type == semaphore_counter::ZERO => true,
            other => {
                if self.pipeline.warn_once.first("semaphore-op", argument) {
                    warn!(
                        op = other,
                        counter = info.counter_type,
                        "unsupported semaphore operation; skipped"
                    );
                }
                false
            }
        };
        if !write_payload {
            return Ok(());
        }

        // All prior work must be host-visible before the guest can observe
        // the payload.
        self.flush()?;

        if info.one_word {
            self.backend.write_guest_u32(address, payload)?;
        } else {
            // Four-word form: the timestamp lands before the payload so a
            // guest polling the payload never reads a stale timestamp.
            let timestamp = self.backend.gpu_timestamp_ticks();
            self.backend.write_guest_u64(address + 8, timestamp)?;
            self.backend.write_guest_u64(address, u64::from(payload))?;
        }
        Ok(())
    }

    fn bind_constant_buffer(&mut self, stage: usize, argument: u32) {
        use crate::regs::load_constant_buffer as lcb;

        let Some(stage) = ShaderStage::from_index(stage) else {
            return;
        };
        let valid = argument & 1 != 0;
        let slot = (argument >> 4) & 0x1F;
        let selector = ConstantBufferSelector {
            size: self.regs.get(lcb::SIZE),
            address: self.regs.get_address(lcb::ADDRESS_HIGH, lcb::ADDRESS_LOW),
        };
        self.backend
            .bind_constant_buffer(stage, slot, valid, selector);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullBackend;

    #[test]
    fn out_of_range_methods_are_rejected() {
        let mut engine = Maxwell3d::new(NullBackend::new());
        assert!(engine.write(REGISTER_COUNT as u32, 0).is_err());
        assert!(engine.read_register(0xFFFF).is_err());
        assert!(engine.write(REGISTER_COUNT as u32 - 1, 7).is_ok());
    }

    #[test]
    fn writes_land_in_the_register_image() {
        let mut engine = Maxwell3d::new(NullBackend::new());
        engine.write(regs::DEPTH_FUNC, 0x207).unwrap();
        assert_eq!(engine.read_register(regs::DEPTH_FUNC).unwrap(), 0x207);
    }

    #[test]
    fn macro_start_address_store_is_bounded() {
        let mut engine = Maxwell3d::new(NullBackend::new());
        engine
            .write(regs::mme::START_ADDRESS_RAM_POINTER, 0)
            .unwrap();
        for i in 0..MACRO_POSITION_CAPACITY as u32 {
            engine.write(regs::mme::START_ADDRESS_RAM_LOAD, i).unwrap();
        }
        assert!(matches!(
            engine.write(regs::mme::START_ADDRESS_RAM_LOAD, 0),
            Err(EngineError::MacroStoreFull { .. })
        ));
        assert_eq!(engine.macro_start_address(3), Some(3));
    }

    #[test]
    fn macro_instruction_pointer_wraps() {
        let mut engine = Maxwell3d::new(NullBackend::new());
        engine
            .write(
                regs::mme::INSTRUCTION_RAM_POINTER,
                MACRO_CODE_CAPACITY as u32,
            )
            .unwrap();
        engine.write(regs::mme::INSTRUCTION_RAM_LOAD, 0xDEAD).unwrap();
        assert_eq!(engine.macro_code()[0], 0xDEAD);
        // Readback wraps along with the store index.
        assert_eq!(
            engine
                .read_register(regs::mme::INSTRUCTION_RAM_POINTER)
                .unwrap(),
            1
        );
    }

    #[test]
    fn macro_instruction_pointer_survives_a_maximal_value() {
        let mut engine = Maxwell3d::new(NullBackend::new());
        engine
            .write(regs::mme::INSTRUCTION_RAM_POINTER, u32::MAX)
            .unwrap();
        engine.write(regs::mme::INSTRUCTION_RAM_LOAD, 0xBEEF).unwrap();
        assert_eq!(
            engine.macro_code()[u32::MAX as usize % MACRO_CODE_CAPACITY],
            0xBEEF
        );
        assert_eq!(
            engine
                .read_register(regs::mme::INSTRUCTION_RAM_POINTER)
                .unwrap(),
            0
        );
    }

    #[test]
    fn firmware_call_4_sets_the_scratch_register() {
        let mut engine = Maxwell3d::new(NullBackend::new());
        engine.write(regs::FIRMWARE_CALL_BASE + 4, 0).unwrap();
        assert_eq!(engine.read_register(regs::FIRMWARE_SCRATCH).unwrap(), 1);
    }
}
