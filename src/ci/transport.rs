//! External collaborator contracts: MIDI transport, clock, RNG, and logger.
//!
//! None of these are implemented by this crate — they are the interfaces a
//! host must supply. Keeping them as traits (rather than free functions)
//! lets a host swap in fakes for testing.

/// Outbound MIDI delivery. `send_midi` transmits a complete byte buffer
/// verbatim; a `false` return means the transport failed to send and is
/// reported upward without changing protocol state.
pub trait MidiTransport {
    /// Send a complete MIDI message (for CI, one SysEx frame). Returns
    /// `false` on transport failure.
    fn send_midi(&mut self, bytes: &[u8]) -> bool;
}

/// A monotonic millisecond clock. Only deltas between calls are meaningful;
/// implementations must never use wall-clock time.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed epoch.
    fn now_millis(&self) -> u64;
}

/// A uniform random 32-bit source, used only for MUID generation.
pub trait Rng {
    /// The next pseudo-random or random 32-bit value.
    fn next_u32(&mut self) -> u32;
}

/// A best-effort logging sink. Failures here must never propagate into
/// protocol behavior.
pub trait Logger {
    /// Emit one human-readable line.
    fn log(&self, line: &str);
}

/// A [`Logger`] that discards every line.
#[derive(Default, Clone, Copy, Debug)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _line: &str) {}
}

/// A [`Logger`] that forwards into the `log` crate's facade at `debug!`
/// level, leaving sink selection (stderr, file, syslog...) to the host
/// binary's logger installation.
#[derive(Default, Clone, Copy, Debug)]
pub struct FacadeLogger;

impl Logger for FacadeLogger {
    fn log(&self, line: &str) {
        log::debug!("{}", line);
    }
}
