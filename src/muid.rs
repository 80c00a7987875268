//! MUIDs: 28-bit session-scoped identifiers assigned to MIDI-CI devices.

use crate::wire;

/// Reserved sentinel meaning "every device" (destination) or "from any
/// device" depending on context.
pub const BROADCAST: Muid = Muid(0x0FFF_FFFF);

/// Reserved sentinel for an unset/invalid MUID.
pub const INVALID: Muid = Muid(0x0FFF_FFFE);

/// Upper bound (exclusive) of the range a device may self-assign from.
const ASSIGNABLE_LIMIT: u32 = 0x000F_FF00;

/// A 28-bit MIDI Unique Identifier.
///
/// Encoded on the wire as four 7-bit bytes, least-significant septet first
/// (see [`Muid::to_bytes`]/[`Muid::from_bytes`]).
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct Muid(u32);

impl Muid {
    /// Wrap a raw value, masking to 28 bits.
    pub const fn new(value: u32) -> Self {
        Muid(value & 0x0FFF_FFFF)
    }

    /// The raw 28-bit value.
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// True if this value falls in the self-assignable range (excludes the
    /// reserved sentinels at the top of the 28-bit space).
    pub fn is_assignable(&self) -> bool {
        self.0 < ASSIGNABLE_LIMIT
    }

    /// Encode as four LSB-first septets.
    pub fn to_bytes(&self) -> [u8; 4] {
        let mut buf = [0u8; 4];
        wire::write_number28_lsb(&mut buf, 0, self.0).expect("4-byte buffer always fits");
        buf
    }

    /// Decode from four LSB-first septets (top bits of each byte are
    /// ignored, matching the wire codec's read behavior).
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        let value = wire::read_number28_lsb(&bytes, 0).expect("4-byte buffer always fits");
        Muid(value)
    }

    /// Read a MUID from a byte buffer at the given offset.
    pub fn read(buf: &[u8], offset: usize) -> Result<Self, crate::error::CodecError> {
        wire::read_number28_lsb(buf, offset).map(Muid)
    }

    /// Write this MUID into a byte buffer at the given offset.
    pub fn write(&self, buf: &mut [u8], offset: usize) -> Result<(), crate::error::CodecError> {
        wire::write_number28_lsb(buf, offset, self.0)
    }
}

impl core::fmt::Display for Muid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if *self == BROADCAST {
            write!(f, "broadcast")
        } else {
            write!(f, "0x{:07X}", self.0)
        }
    }
}

/// Draw a candidate MUID from the assignable range using an external RNG.
///
/// This performs one draw; callers implement rejection sampling against
/// known local/remote MUIDs themselves (see `ci::discovery`), since only the
/// discovery engine knows which MUIDs are currently in use.
pub fn random_candidate(rng: &mut dyn crate::ci::transport::Rng) -> Muid {
    Muid(rng.next_u32() % ASSIGNABLE_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_bytes() {
        let m = Muid::new(0x0ABC_DEF);
        let bytes = m.to_bytes();
        assert!(bytes.iter().all(|b| b & 0x80 == 0));
        assert_eq!(Muid::from_bytes(bytes), m);
    }

    #[test]
    fn broadcast_display() {
        assert_eq!(BROADCAST.to_string(), "broadcast");
    }

    #[test]
    fn assignable_range() {
        assert!(Muid::new(0).is_assignable());
        assert!(Muid::new(ASSIGNABLE_LIMIT - 1).is_assignable());
        assert!(!Muid::new(ASSIGNABLE_LIMIT).is_assignable());
        assert!(!BROADCAST.is_assignable());
        assert!(!INVALID.is_assignable());
    }
}
