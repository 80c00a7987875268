//! Five-byte Profile identifiers, standard-defined or manufacturer-specific.

use core::convert::TryInto;
use core::fmt;

use crate::error::ProfileIdError;

/// A 5-byte MIDI-CI Profile identifier.
///
/// Standard-defined profiles (first byte `0x7E`) store `{bank, number,
/// version, level}` in the remaining four bytes; equality and ordering
/// ignore the `level` byte so two revisions of the same profile at
/// different support levels collide. Manufacturer-specific profiles (any
/// other first byte) compare all five bytes — the first three form the
/// manufacturer id, the last two are manufacturer-defined.
#[derive(Clone, Copy, Debug)]
pub struct ProfileId([u8; 5]);

/// First byte marking a standard-defined (MMA/AMEI) profile id.
pub const STANDARD_DEFINED_TAG: u8 = 0x7E;

impl ProfileId {
    /// Wrap five raw bytes, validating that at least one of the first three
    /// is non-zero.
    pub fn from_bytes(bytes: [u8; 5]) -> Result<Self, ProfileIdError> {
        if bytes[0] == 0 && bytes[1] == 0 && bytes[2] == 0 {
            return Err(ProfileIdError::AllZero);
        }
        Ok(ProfileId(bytes))
    }

    /// Parse from a slice, which must be exactly 5 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ProfileIdError> {
        let array: [u8; 5] = bytes
            .try_into()
            .map_err(|_| ProfileIdError::WrongLength(bytes.len()))?;
        Self::from_bytes(array)
    }

    /// Build a standard-defined profile id.
    pub fn standard(bank: u8, number: u8, version: u8, level: u8) -> Self {
        ProfileId([STANDARD_DEFINED_TAG, bank, number, version, level])
    }

    /// Build a manufacturer-specific profile id.
    pub fn manufacturer_specific(manufacturer_id: [u8; 3], info: [u8; 2]) -> Self {
        ProfileId([
            manufacturer_id[0],
            manufacturer_id[1],
            manufacturer_id[2],
            info[0],
            info[1],
        ])
    }

    /// True if this id's first byte marks it as standard-defined.
    pub fn is_standard_defined(&self) -> bool {
        self.0[0] == STANDARD_DEFINED_TAG
    }

    /// The raw five bytes, including the `level`/info byte even for
    /// standard-defined ids.
    pub fn to_bytes(&self) -> [u8; 5] {
        self.0
    }

    /// The bytes that participate in equality and ordering: all five for
    /// manufacturer-specific ids, the first four (dropping `level`) for
    /// standard-defined ones.
    fn comparison_key(&self) -> ([u8; 4], u8) {
        if self.is_standard_defined() {
            ([self.0[0], self.0[1], self.0[2], self.0[3]], 0)
        } else {
            ([self.0[0], self.0[1], self.0[2], self.0[3]], self.0[4])
        }
    }

    /// The `level` byte for a standard-defined id, or `None` for a
    /// manufacturer-specific one (where the analogous byte participates in
    /// identity and has no separate meaning).
    pub fn level(&self) -> Option<u8> {
        self.is_standard_defined().then_some(self.0[4])
    }
}

impl PartialEq for ProfileId {
    fn eq(&self, other: &Self) -> bool {
        self.comparison_key() == other.comparison_key()
    }
}

impl Eq for ProfileId {}

impl PartialOrd for ProfileId {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProfileId {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.comparison_key().cmp(&other.comparison_key())
    }
}

impl core::hash::Hash for ProfileId {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.comparison_key().hash(state);
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_standard_defined() {
            write!(
                f,
                "standard({:02X},{:02X},{:02X})@level{}",
                self.0[1], self.0[2], self.0[3], self.0[4]
            )
        } else {
            write!(
                f,
                "manufacturer({:02X}{:02X}{:02X},{:02X}{:02X})",
                self.0[0], self.0[1], self.0[2], self.0[3], self.0[4]
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_level_byte() {
        assert_eq!(
            ProfileId::standard(1, 2, 3, 0),
            ProfileId::standard(1, 2, 3, 5)
        );
    }

    #[test]
    fn manufacturer_specific_compares_all_bytes() {
        let a = ProfileId::manufacturer_specific([1, 2, 3], [4, 5]);
        let b = ProfileId::manufacturer_specific([1, 2, 3], [4, 6]);
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_all_zero() {
        assert_eq!(
            ProfileId::from_bytes([0, 0, 0, 1, 2]),
            Err(ProfileIdError::AllZero)
        );
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(
            ProfileId::from_slice(&[1, 2, 3, 4]),
            Err(ProfileIdError::WrongLength(4))
        );
    }

    #[test]
    fn ordering_sorts_by_comparison_key() {
        let mut ids = vec![
            ProfileId::standard(2, 0, 0, 0),
            ProfileId::standard(1, 0, 0, 9),
        ];
        ids.sort();
        assert_eq!(ids[0], ProfileId::standard(1, 0, 0, 9));
    }
}
