use thiserror::Error;

/// Fatal engine failures surfaced from [`crate::Maxwell3d::write`] and
/// [`crate::Maxwell3d::flush`].
///
/// Only structural violations land here: enum values the hardware is
/// documented never to produce, or engine-state exhaustion. Fidelity gaps
/// (partially supported formats, guest-driver contract violations) are
/// reported through `tracing` and never propagate.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A register held an enum value outside the hardware-producible range.
    #[error("invalid {what} value 0x{value:X} (method 0x{method:X})")]
    InvalidEnum {
        what: &'static str,
        method: u32,
        value: u32,
    },

    /// The macro start-address RAM is full; the engine cannot accept more
    /// macro entry points.
    #[error("macro start-address RAM full ({capacity} entries, method 0x{method:X})")]
    MacroStoreFull { method: u32, capacity: usize },

    /// A method offset past the end of the register image.
    #[error("method offset 0x{method:X} outside register image (0x{limit:X} words)")]
    MethodOutOfRange { method: u32, limit: u32 },

    /// The host could not translate a guest memory range needed to resolve a
    /// render target or semaphore write.
    #[error("unmapped guest range: 0x{address:X}..+0x{size:X}")]
    UnmappedRange { address: u64, size: u64 },
}
