//! GM20B Maxwell 3D (class 0xB197) register map.
//!
//! Methods are word offsets into the engine's register image, exactly as they
//! appear in pushbuffer `(method, argument)` pairs; byte offsets are
//! `method * 4`. The offsets and raw enum values below are a hardware
//! contract, not an implementation choice, so they must not be renumbered.

/// Size of the register image in 32-bit words.
pub const REGISTER_COUNT: usize = 0xE00;

/// Raw register scribbled by the firmware-call-4 quirk.
pub const FIRMWARE_SCRATCH: u32 = 0xD00;

pub const COLOR_TARGET_COUNT: usize = 8;
pub const VERTEX_STREAM_COUNT: usize = 16;
pub const VERTEX_ATTRIBUTE_COUNT: usize = 32;
pub const SHADER_STAGE_COUNT: usize = 5;

pub const MACRO_CODE_CAPACITY: usize = 0x800;
pub const MACRO_POSITION_CAPACITY: usize = 0x80;

/// MME (macro engine) block, including the shadow RAM control register.
pub mod mme {
    pub const INSTRUCTION_RAM_POINTER: u32 = 0x45;
    pub const INSTRUCTION_RAM_LOAD: u32 = 0x46;
    pub const START_ADDRESS_RAM_POINTER: u32 = 0x47;
    pub const START_ADDRESS_RAM_LOAD: u32 = 0x48;
    pub const SHADOW_RAM_CONTROL: u32 = 0x49;
}

pub const ZT_SELECT: u32 = 0x54;

pub const TESSELLATION_PARAMETERS: u32 = 0xC8;

pub const TOPOLOGY_OVERRIDE_CONTROL: u32 = 0x16B;
pub const TOPOLOGY_OVERRIDE: u32 = 0x16C;

/// Color render target block: 8 targets, 0x10 words apiece.
pub mod color_target {
    pub const BASE: u32 = 0x200;
    pub const STRIDE: u32 = 0x10;

    pub const ADDRESS_HIGH: u32 = 0x0;
    pub const ADDRESS_LOW: u32 = 0x1;
    pub const WIDTH: u32 = 0x2;
    pub const HEIGHT: u32 = 0x3;
    pub const FORMAT: u32 = 0x4;
    pub const TILE_MODE: u32 = 0x5;
    pub const THIRD_DIMENSION: u32 = 0x6;
    pub const ARRAY_PITCH: u32 = 0x7;
    pub const LAYER_OFFSET: u32 = 0x8;

    pub fn reg(index: usize, field: u32) -> u32 {
        BASE + index as u32 * STRIDE + field
    }
}

pub const VERTEX_ARRAY_START: u32 = 0x35D;
pub const DRAW_VERTEX_ARRAY_COUNT: u32 = 0x35E;

pub const CLEAR_COLOR: u32 = 0x360; // 4 words
pub const CLEAR_DEPTH: u32 = 0x364;
pub const CLEAR_STENCIL: u32 = 0x368;

pub const POLYGON_MODE_FRONT: u32 = 0x36B;
pub const POLYGON_MODE_BACK: u32 = 0x36C;

pub const POLY_OFFSET_POINT_ENABLE: u32 = 0x370;
pub const POLY_OFFSET_LINE_ENABLE: u32 = 0x371;
pub const POLY_OFFSET_FILL_ENABLE: u32 = 0x372;

pub const PATCH_SIZE: u32 = 0x373;

pub const COLOR_MASK_COMMON: u32 = 0x3E4;

/// Depth/stencil render target ("ZT") block.
pub mod zt {
    pub const ADDRESS_HIGH: u32 = 0x3F8;
    pub const ADDRESS_LOW: u32 = 0x3F9;
    pub const FORMAT: u32 = 0x3FA;
    pub const BLOCK_SIZE: u32 = 0x3FB;
    pub const ARRAY_PITCH: u32 = 0x3FC;
    pub const WIDTH: u32 = 0x48A;
    pub const HEIGHT: u32 = 0x48B;
    pub const THIRD_DIMENSION: u32 = 0x48C;
    pub const LAYER: u32 = 0x48D;
}

pub const VERTEX_ATTRIBUTE_BASE: u32 = 0x458;

pub const RT_CONTROL: u32 = 0x487;

pub const SYNCPOINT_ACTION: u32 = 0x46A;

pub const DEPTH_TEST_ENABLE: u32 = 0x4B3;
pub const BLEND_INDEPENDENT_ENABLE: u32 = 0x4B9;
pub const DEPTH_WRITE_ENABLE: u32 = 0x4BA;
pub const DEPTH_FUNC: u32 = 0x4C3;

/// Common (non-per-target) blend block.
pub mod blend {
    pub const SEPARATE_ALPHA: u32 = 0x4CF;
    pub const OP_RGB: u32 = 0x4D0;
    pub const SRC_RGB: u32 = 0x4D1;
    pub const DST_RGB: u32 = 0x4D2;
    pub const OP_ALPHA: u32 = 0x4D3;
    pub const SRC_ALPHA: u32 = 0x4D4;
    pub const DST_ALPHA: u32 = 0x4D6;
    pub const ENABLE_BASE: u32 = 0x4D8; // 8 words, one per target
}

/// Per-target blend block used when `BLEND_INDEPENDENT_ENABLE` is set:
/// 8 targets, 8 words apiece.
pub mod blend_per_target {
    pub const BASE: u32 = 0x780;
    pub const STRIDE: u32 = 0x8;

    pub const SEPARATE_ALPHA: u32 = 0x0;
    pub const OP_RGB: u32 = 0x1;
    pub const SRC_RGB: u32 = 0x2;
    pub const DST_RGB: u32 = 0x3;
    pub const OP_ALPHA: u32 = 0x4;
    pub const SRC_ALPHA: u32 = 0x5;
    pub const DST_ALPHA: u32 = 0x6;

    pub fn reg(index: usize, field: u32) -> u32 {
        BASE + index as u32 * STRIDE + field
    }
}

pub const STENCIL_ENABLE: u32 = 0x4E0;
pub const STENCIL_FRONT_OP_FAIL: u32 = 0x4E1;
pub const STENCIL_FRONT_OP_ZFAIL: u32 = 0x4E2;
pub const STENCIL_FRONT_OP_ZPASS: u32 = 0x4E3;
pub const STENCIL_FRONT_FUNC: u32 = 0x4E4;

pub const WINDOW_ORIGIN: u32 = 0x4EB;

pub const GLOBAL_BASE_VERTEX_INDEX: u32 = 0x50D;
pub const GLOBAL_BASE_INSTANCE_INDEX: u32 = 0x50E;

pub const PROVOKING_VERTEX: u32 = 0x544;

pub const STENCIL_TWO_SIDE_ENABLE: u32 = 0x565;
pub const STENCIL_BACK_OP_FAIL: u32 = 0x566;
pub const STENCIL_BACK_OP_ZFAIL: u32 = 0x567;
pub const STENCIL_BACK_OP_ZPASS: u32 = 0x568;
pub const STENCIL_BACK_FUNC: u32 = 0x569;

pub const DRAW_END: u32 = 0x585;
pub const DRAW_BEGIN: u32 = 0x586;

pub const PRIMITIVE_RESTART_ENABLE: u32 = 0x591;

/// Index buffer block; a write to `COUNT` triggers an indexed draw.
pub mod index_buffer {
    pub const ADDRESS_HIGH: u32 = 0x5F2;
    pub const ADDRESS_LOW: u32 = 0x5F3;
    pub const LIMIT_HIGH: u32 = 0x5F4;
    pub const LIMIT_LOW: u32 = 0x5F5;
    pub const FORMAT: u32 = 0x5F6;
    pub const FIRST: u32 = 0x5F7;
    pub const COUNT: u32 = 0x5F8;
}

pub const VERTEX_STREAM_INSTANCE_BASE: u32 = 0x620;

pub const CULL_ENABLE: u32 = 0x646;
pub const FRONT_FACE: u32 = 0x647;
pub const CULL_FACE: u32 = 0x648;

pub const RASTER_ENABLE: u32 = 0x64F;

pub const DEPTH_BOUNDS_ENABLE: u32 = 0x66F;

pub const LOGIC_OP_ENABLE: u32 = 0x671;
pub const LOGIC_OP_FUNC: u32 = 0x672;

pub const CLEAR_SURFACE: u32 = 0x674;

pub const COLOR_MASK_BASE: u32 = 0x680; // 8 words, one per target

/// Report semaphore block (guest-visible result writes).
pub mod semaphore {
    pub const ADDRESS_HIGH: u32 = 0x6C0;
    pub const ADDRESS_LOW: u32 = 0x6C1;
    pub const PAYLOAD: u32 = 0x6C2;
    pub const INFO: u32 = 0x6C3;
}

pub const POST_VTG_ATTRIBUTE_SKIP_MASK: u32 = 0x6F1;

/// Vertex stream ("vertex array") block: 16 streams, 4 words apiece.
pub mod vertex_stream {
    pub const BASE: u32 = 0x700;
    pub const STRIDE: u32 = 0x4;

    pub const CONTROL: u32 = 0x0; // stride in bits 0..12, enable in bit 12
    pub const ADDRESS_HIGH: u32 = 0x1;
    pub const ADDRESS_LOW: u32 = 0x2;
    pub const FREQUENCY: u32 = 0x3;

    pub fn reg(index: usize, field: u32) -> u32 {
        BASE + index as u32 * STRIDE + field
    }
}

pub const FIRMWARE_CALL_BASE: u32 = 0x8C0; // 0x20 words

/// Batched constant buffer upload block.
pub mod load_constant_buffer {
    pub const SIZE: u32 = 0x8E0;
    pub const ADDRESS_HIGH: u32 = 0x8E1;
    pub const ADDRESS_LOW: u32 = 0x8E2;
    pub const OFFSET: u32 = 0x8E3;
    pub const DATA_BASE: u32 = 0x8E4; // 16 words
    pub const DATA_COUNT: u32 = 16;
}

/// Per-stage constant buffer bind block: 5 stages, 8 words apiece; the bind
/// word sits at the start of each stage's block.
pub mod bind_group {
    pub const BASE: u32 = 0x904;
    pub const STRIDE: u32 = 0x8;

    pub fn constant_buffer_reg(stage: usize) -> u32 {
        BASE + stage as u32 * STRIDE
    }
}

pub const TEX_CB_INDEX: u32 = 0x982;

/// A word-addressable register image (real or shadow).
#[derive(Clone)]
pub struct RegisterFile {
    raw: Box<[u32; REGISTER_COUNT]>,
}

impl RegisterFile {
    pub fn new() -> Self {
        RegisterFile {
            raw: vec![0u32; REGISTER_COUNT]
                .into_boxed_slice()
                .try_into()
                .unwrap_or_else(|_| unreachable!()),
        }
    }

    /// Power-on register values. Guests rely on the documented reset state
    /// rather than writing every register before the first draw, so a
    /// zeroed image is not a translatable one.
    pub fn with_power_on_defaults() -> Self {
        let mut file = Self::new();
        file.set(RASTER_ENABLE, 1);
        file.set(POLYGON_MODE_FRONT, polygon_mode::FILL);
        file.set(POLYGON_MODE_BACK, polygon_mode::FILL);
        file.set(FRONT_FACE, face::FRONT_CCW);
        file.set(CULL_FACE, face::CULL_BACK);

        file.set(DEPTH_FUNC, compare_func::OGL_ALWAYS);
        for base in [STENCIL_FRONT_OP_FAIL, STENCIL_BACK_OP_FAIL] {
            file.set(base, stencil_op::OGL_KEEP);
            file.set(base + 1, stencil_op::OGL_KEEP);
            file.set(base + 2, stencil_op::OGL_KEEP);
            file.set(base + 3, compare_func::OGL_ALWAYS);
        }

        file.set(blend::OP_RGB, blend_op::OGL_FUNC_ADD);
        file.set(blend::OP_ALPHA, blend_op::OGL_FUNC_ADD);
        file.set(blend::SRC_RGB, blend_factor::OGL_ONE);
        file.set(blend::SRC_ALPHA, blend_factor::OGL_ONE);
        file.set(blend::DST_RGB, blend_factor::OGL_ZERO);
        file.set(blend::DST_ALPHA, blend_factor::OGL_ZERO);
        for i in 0..COLOR_TARGET_COUNT {
            use blend_per_target as bpt;
            file.set(bpt::reg(i, bpt::OP_RGB), blend_op::OGL_FUNC_ADD);
            file.set(bpt::reg(i, bpt::OP_ALPHA), blend_op::OGL_FUNC_ADD);
            file.set(bpt::reg(i, bpt::SRC_RGB), blend_factor::OGL_ONE);
            file.set(bpt::reg(i, bpt::SRC_ALPHA), blend_factor::OGL_ONE);
            file.set(bpt::reg(i, bpt::DST_RGB), blend_factor::OGL_ZERO);
            file.set(bpt::reg(i, bpt::DST_ALPHA), blend_factor::OGL_ZERO);
            file.set(COLOR_MASK_BASE + i as u32, 0x1111);
        }
        file.set(LOGIC_OP_FUNC, logic_op::COPY);

        file.set(CLEAR_DEPTH, 1.0f32.to_bits());
        file
    }

    #[inline]
    pub fn get(&self, method: u32) -> u32 {
        self.raw[method as usize]
    }

    #[inline]
    pub fn set(&mut self, method: u32, value: u32) {
        self.raw[method as usize] = value;
    }

    #[inline]
    pub fn get_bool(&self, method: u32) -> bool {
        self.raw[method as usize] & 1 != 0
    }

    #[inline]
    pub fn get_f32(&self, method: u32) -> f32 {
        f32::from_bits(self.raw[method as usize])
    }

    /// Reassembles a 64-bit guest address from split high/low registers.
    #[inline]
    pub fn get_address(&self, high: u32, low: u32) -> u64 {
        (u64::from(self.get(high)) << 32) | u64::from(self.get(low))
    }

    pub fn in_range(&self, method: u32) -> bool {
        (method as usize) < REGISTER_COUNT
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Shadow RAM behavior, selected by `mme::SHADOW_RAM_CONTROL`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum ShadowRamControl {
    /// Mirror every write into the shadow image.
    MethodTrack = 0,
    /// As `MethodTrack`, with hardware-filtered methods (tracked identically
    /// at this level).
    MethodTrackWithFilter = 1,
    /// Shadow RAM disabled.
    MethodPassthrough = 2,
    /// Substitute the shadow image's value for incoming arguments.
    MethodReplay = 3,
}

impl ShadowRamControl {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::MethodTrack),
            1 => Some(Self::MethodTrackWithFilter),
            2 => Some(Self::MethodPassthrough),
            3 => Some(Self::MethodReplay),
            _ => None,
        }
    }
}

/// Draw topology as encoded in `DRAW_BEGIN` and `TOPOLOGY_OVERRIDE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DrawTopology {
    Points = 0,
    Lines = 1,
    LineLoop = 2,
    LineStrip = 3,
    Triangles = 4,
    TriangleStrip = 5,
    TriangleFan = 6,
    Quads = 7,
    QuadStrip = 8,
    Polygon = 9,
    LinesAdjacency = 0xA,
    LineStripAdjacency = 0xB,
    TrianglesAdjacency = 0xC,
    TriangleStripAdjacency = 0xD,
    Patch = 0xE,
}

impl DrawTopology {
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::Points,
            1 => Self::Lines,
            2 => Self::LineLoop,
            3 => Self::LineStrip,
            4 => Self::Triangles,
            5 => Self::TriangleStrip,
            6 => Self::TriangleFan,
            7 => Self::Quads,
            8 => Self::QuadStrip,
            9 => Self::Polygon,
            0xA => Self::LinesAdjacency,
            0xB => Self::LineStripAdjacency,
            0xC => Self::TrianglesAdjacency,
            0xD => Self::TriangleStripAdjacency,
            0xE => Self::Patch,
            _ => return None,
        })
    }
}

/// Instance disposition carried in bits 26..28 of a `DRAW_BEGIN` argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeginInstance {
    First,
    Subsequent,
    Unchanged,
}

/// Decoded `DRAW_BEGIN` argument.
#[derive(Clone, Copy, Debug)]
pub struct Begin {
    pub topology: u32,
    pub instance: BeginInstance,
}

impl Begin {
    pub fn decode(argument: u32) -> Self {
        let instance = match (argument >> 26) & 0x3 {
            1 => BeginInstance::Subsequent,
            2 => BeginInstance::Unchanged,
            _ => BeginInstance::First,
        };
        Begin {
            topology: argument & 0xFFFF,
            instance,
        }
    }
}

/// Decoded `semaphore::INFO` register.
#[derive(Clone, Copy, Debug)]
pub struct SemaphoreInfo {
    pub op: u32,
    pub reduction_enable: bool,
    pub counter_type: u32,
    pub one_word: bool,
}

pub mod semaphore_op {
    pub const RELEASE: u32 = 0;
    pub const ACQUIRE: u32 = 1;
    pub const COUNTER: u32 = 2;
}

pub mod semaphore_counter {
    pub const ZERO: u32 = 0;
}

impl SemaphoreInfo {
    pub fn decode(argument: u32) -> Self {
        SemaphoreInfo {
            op: argument & 0x3,
            reduction_enable: argument & (1 << 3) != 0,
            counter_type: (argument >> 23) & 0x1F,
            one_word: argument & (1 << 28) != 0,
        }
    }
}

/// Decoded `CLEAR_SURFACE` argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClearSurface {
    pub depth: bool,
    pub stencil: bool,
    pub red: bool,
    pub green: bool,
    pub blue: bool,
    pub alpha: bool,
    pub target: u32,
    pub layer: u32,
}

impl ClearSurface {
    pub fn decode(argument: u32) -> Self {
        ClearSurface {
            depth: argument & (1 << 0) != 0,
            stencil: argument & (1 << 1) != 0,
            red: argument & (1 << 2) != 0,
            green: argument & (1 << 3) != 0,
            blue: argument & (1 << 4) != 0,
            alpha: argument & (1 << 5) != 0,
            target: (argument >> 6) & 0xF,
            layer: (argument >> 10) & 0x7FF,
        }
    }
}

/// Decoded vertex attribute register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct VertexAttribute {
    pub stream: u32,
    pub constant: bool,
    pub offset: u32,
    pub size: u32,
    pub numerical_type: u32,
    pub bgra: bool,
}

impl VertexAttribute {
    pub fn decode(argument: u32) -> Self {
        VertexAttribute {
            stream: argument & 0x1F,
            constant: argument & (1 << 6) != 0,
            offset: (argument >> 7) & 0x3FFF,
            size: (argument >> 21) & 0x3F,
            numerical_type: (argument >> 27) & 0x7,
            bgra: argument & (1 << 31) != 0,
        }
    }
}

/// Component-width codes of the vertex attribute `size` field.
pub mod attribute_size {
    pub const SIZE_32_32_32_32: u32 = 0x01;
    pub const SIZE_32_32_32: u32 = 0x02;
    pub const SIZE_16_16_16_16: u32 = 0x03;
    pub const SIZE_32_32: u32 = 0x04;
    pub const SIZE_16_16_16: u32 = 0x05;
    pub const SIZE_8_8_8_8: u32 = 0x0A;
    pub const SIZE_16_16: u32 = 0x0F;
    pub const SIZE_32: u32 = 0x12;
    pub const SIZE_8_8_8: u32 = 0x13;
    pub const SIZE_8_8: u32 = 0x18;
    pub const SIZE_16: u32 = 0x1B;
    pub const SIZE_8: u32 = 0x1D;
    pub const SIZE_10_10_10_2: u32 = 0x30;
    pub const SIZE_11_11_10: u32 = 0x31;
}

/// Numerical-type codes of the vertex attribute `numerical_type` field.
pub mod attribute_type {
    pub const SNORM: u32 = 1;
    pub const UNORM: u32 = 2;
    pub const SINT: u32 = 3;
    pub const UINT: u32 = 4;
    pub const USCALED: u32 = 5;
    pub const SSCALED: u32 = 6;
    pub const FLOAT: u32 = 7;
}

/// Raw compare-function values. D3D values are contiguous from 1, OGL values
/// from 0x200; both collapse onto the same host ordering.
pub mod compare_func {
    pub const D3D_NEVER: u32 = 1;
    pub const D3D_ALWAYS: u32 = 8;
    pub const OGL_NEVER: u32 = 0x200;
    pub const OGL_ALWAYS: u32 = 0x207;
}

/// Raw blend factor values (D3D numbering plus the GL enum + 0x4000 space).
pub mod blend_factor {
    pub const D3D_ZERO: u32 = 0x1;
    pub const D3D_ONE: u32 = 0x2;
    pub const D3D_SRC_COLOR: u32 = 0x3;
    pub const D3D_INV_SRC_COLOR: u32 = 0x4;
    pub const D3D_SRC_ALPHA: u32 = 0x5;
    pub const D3D_INV_SRC_ALPHA: u32 = 0x6;
    pub const D3D_DST_ALPHA: u32 = 0x7;
    pub const D3D_INV_DST_ALPHA: u32 = 0x8;
    pub const D3D_DST_COLOR: u32 = 0x9;
    pub const D3D_INV_DST_COLOR: u32 = 0xA;
    pub const D3D_SRC_ALPHA_SATURATE: u32 = 0xB;
    pub const D3D_BLEND_FACTOR: u32 = 0xE;
    pub const D3D_INV_BLEND_FACTOR: u32 = 0xF;
    pub const D3D_SRC1_COLOR: u32 = 0x10;
    pub const D3D_INV_SRC1_COLOR: u32 = 0x11;
    pub const D3D_SRC1_ALPHA: u32 = 0x12;
    pub const D3D_INV_SRC1_ALPHA: u32 = 0x13;

    pub const OGL_ZERO: u32 = 0x4000;
    pub const OGL_ONE: u32 = 0x4001;
    pub const OGL_SRC_COLOR: u32 = 0x4300;
    pub const OGL_INV_SRC_COLOR: u32 = 0x4301;
    pub const OGL_SRC_ALPHA: u32 = 0x4302;
    pub const OGL_INV_SRC_ALPHA: u32 = 0x4303;
    pub const OGL_DST_ALPHA: u32 = 0x4304;
    pub const OGL_INV_DST_ALPHA: u32 = 0x4305;
    pub const OGL_DST_COLOR: u32 = 0x4306;
    pub const OGL_INV_DST_COLOR: u32 = 0x4307;
    pub const OGL_SRC_ALPHA_SATURATE: u32 = 0x4308;
    pub const OGL_CONSTANT_COLOR: u32 = 0xC001;
    pub const OGL_INV_CONSTANT_COLOR: u32 = 0xC002;
    pub const OGL_CONSTANT_ALPHA: u32 = 0xC003;
    pub const OGL_INV_CONSTANT_ALPHA: u32 = 0xC004;
    pub const OGL_SRC1_COLOR: u32 = 0xC900;
    pub const OGL_INV_SRC1_COLOR: u32 = 0xC901;
    pub const OGL_SRC1_ALPHA: u32 = 0xC902;
    pub const OGL_INV_SRC1_ALPHA: u32 = 0xC903;
}

/// Raw blend equation values.
pub mod blend_op {
    pub const D3D_ADD: u32 = 1;
    pub const D3D_SUBTRACT: u32 = 2;
    pub const D3D_REV_SUBTRACT: u32 = 3;
    pub const D3D_MIN: u32 = 4;
    pub const D3D_MAX: u32 = 5;

    pub const OGL_FUNC_ADD: u32 = 0x8006;
    pub const OGL_MIN: u32 = 0x8007;
    pub const OGL_MAX: u32 = 0x8008;
    pub const OGL_FUNC_SUBTRACT: u32 = 0x800A;
    pub const OGL_FUNC_REV_SUBTRACT: u32 = 0x800B;
}

/// Raw stencil op values.
pub mod stencil_op {
    pub const D3D_KEEP: u32 = 1;
    pub const D3D_ZERO: u32 = 2;
    pub const D3D_REPLACE: u32 = 3;
    pub const D3D_INCR_SAT: u32 = 4;
    pub const D3D_DECR_SAT: u32 = 5;
    pub const D3D_INVERT: u32 = 6;
    pub const D3D_INCR: u32 = 7;
    pub const D3D_DECR: u32 = 8;

    pub const OGL_ZERO: u32 = 0;
    pub const OGL_INVERT: u32 = 0x150A;
    pub const OGL_KEEP: u32 = 0x1E00;
    pub const OGL_REPLACE: u32 = 0x1E01;
    pub const OGL_INCR_SAT: u32 = 0x1E02;
    pub const OGL_DECR_SAT: u32 = 0x1E03;
    pub const OGL_INCR: u32 = 0x8507;
    pub const OGL_DECR: u32 = 0x8508;
}

/// Raw logic op range (GL numbering, 0x1500 = Clear .. 0x150F = Set).
pub mod logic_op {
    pub const CLEAR: u32 = 0x1500;
    pub const COPY: u32 = 0x1503;
    pub const SET: u32 = 0x150F;
}

/// Raw polygon mode values (GL numbering).
pub mod polygon_mode {
    pub const POINT: u32 = 0x1B00;
    pub const LINE: u32 = 0x1B01;
    pub const FILL: u32 = 0x1B02;
}

/// Raw cull face / front face values (GL numbering).
pub mod face {
    pub const CULL_FRONT: u32 = 0x404;
    pub const CULL_BACK: u32 = 0x405;
    pub const CULL_FRONT_AND_BACK: u32 = 0x408;

    pub const FRONT_CW: u32 = 0x900;
    pub const FRONT_CCW: u32 = 0x901;
}

/// Color render target format codes.
pub mod ct_format {
    pub const DISABLED: u32 = 0x00;
    pub const RF32_GF32_BF32_AF32: u32 = 0xC0;
    pub const RS32_GS32_BS32_AS32: u32 = 0xC1;
    pub const RU32_GU32_BU32_AU32: u32 = 0xC2;
    pub const RF32_GF32_BF32_X32: u32 = 0xC3;
    pub const R16_G16_B16_A16: u32 = 0xC6;
    pub const RN16_GN16_BN16_AN16: u32 = 0xC7;
    pub const RS16_GS16_BS16_AS16: u32 = 0xC8;
    pub const RU16_GU16_BU16_AU16: u32 = 0xC9;
    pub const RF16_GF16_BF16_AF16: u32 = 0xCA;
    pub const RF32_GF32: u32 = 0xCB;
    pub const RS32_GS32: u32 = 0xCC;
    pub const RU32_GU32: u32 = 0xCD;
    pub const RF16_GF16_BF16_X16: u32 = 0xCE;
    pub const A8R8G8B8: u32 = 0xCF;
    pub const A8RL8GL8BL8: u32 = 0xD0;
    pub const A2B10G10R10: u32 = 0xD1;
    pub const AU2BU10GU10RU10: u32 = 0xD2;
    pub const A8B8G8R8: u32 = 0xD5;
    pub const A8BL8GL8RL8: u32 = 0xD6;
    pub const AN8BN8GN8RN8: u32 = 0xD7;
    pub const AS8BS8GS8RS8: u32 = 0xD8;
    pub const R16_G16: u32 = 0xDA;
    pub const RN16_GN16: u32 = 0xDB;
    pub const RS16_GS16: u32 = 0xDC;
    pub const RU16_GU16: u32 = 0xDD;
    pub const RF16_GF16: u32 = 0xDE;
    pub const BF10GF11RF11: u32 = 0xE0;
    pub const RS32: u32 = 0xE3;
    pub const RU32: u32 = 0xE4;
    pub const RF32: u32 = 0xE5;
    pub const X8R8G8B8: u32 = 0xE6;
    pub const X8RL8GL8BL8: u32 = 0xE7;
    pub const R5G6B5: u32 = 0xE8;
    pub const A1R5G5B5: u32 = 0xE9;
    pub const G8R8: u32 = 0xEA;
    pub const GN8RN8: u32 = 0xEB;
    pub const GS8RS8: u32 = 0xEC;
    pub const GU8RU8: u32 = 0xED;
    pub const R16: u32 = 0xEE;
    pub const RN16: u32 = 0xEF;
    pub const RS16: u32 = 0xF0;
    pub const RU16: u32 = 0xF1;
    pub const RF16: u32 = 0xF2;
    pub const R8: u32 = 0xF3;
    pub const RN8: u32 = 0xF4;
    pub const RS8: u32 = 0xF5;
    pub const RU8: u32 = 0xF6;
}

/// Depth render target format codes.
pub mod zt_format {
    pub const ZF32: u32 = 0x0A;
    pub const Z16: u32 = 0x13;
    pub const Z24S8: u32 = 0x14;
    pub const X8Z24: u32 = 0x15;
    pub const S8Z24: u32 = 0x16;
    pub const S8: u32 = 0x17;
    pub const ZF32_X24S8: u32 = 0x19;
}

/// Decoded render-target tile mode register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileMode {
    pub block_height_log2: u32,
    pub block_depth_log2: u32,
    pub is_pitch_linear: bool,
    pub is_3d: bool,
}

impl TileMode {
    pub fn decode(argument: u32) -> Self {
        TileMode {
            block_height_log2: (argument >> 4) & 0x7,
            block_depth_log2: (argument >> 8) & 0x7,
            is_pitch_linear: argument & (1 << 12) != 0,
            is_3d: argument & (1 << 16) != 0,
        }
    }
}

/// Decoded tessellation parameters register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct TessellationParameters {
    pub domain_type: u32,
    pub spacing: u32,
    pub output_clockwise: bool,
    pub connected: bool,
}

impl TessellationParameters {
    pub fn decode(argument: u32) -> Self {
        TessellationParameters {
            domain_type: argument & 0x3,
            spacing: (argument >> 4) & 0x3,
            output_clockwise: argument & (1 << 8) != 0,
            connected: argument & (1 << 9) != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_decodes_instance_bits() {
        let begin = Begin::decode(4 | (1 << 26));
        assert_eq!(begin.topology, 4);
        assert_eq!(begin.instance, BeginInstance::Subsequent);

        let begin = Begin::decode(5);
        assert_eq!(begin.instance, BeginInstance::First);
    }

    #[test]
    fn clear_surface_decodes_fields() {
        let clear = ClearSurface::decode(0b11_1111 | (3 << 6) | (7 << 10));
        assert!(clear.depth && clear.stencil);
        assert!(clear.red && clear.green && clear.blue && clear.alpha);
        assert_eq!(clear.target, 3);
        assert_eq!(clear.layer, 7);
    }

    #[test]
    fn vertex_attribute_decodes_fields() {
        let raw = 0x3 | (1 << 6) | (0x10 << 7) | (attribute_size::SIZE_32_32 << 21)
            | (attribute_type::FLOAT << 27);
        let attr = VertexAttribute::decode(raw);
        assert_eq!(attr.stream, 3);
        assert!(attr.constant);
        assert_eq!(attr.offset, 0x10);
        assert_eq!(attr.size, attribute_size::SIZE_32_32);
        assert_eq!(attr.numerical_type, attribute_type::FLOAT);
    }
}
