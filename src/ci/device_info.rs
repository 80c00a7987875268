//! Local and remote device identity records.

use crate::error::DeviceInfoError;
use crate::muid::Muid;

use super::profile_registry::ProfileRegistry;

/// Bit 0: Reserved.
pub const CATEGORY_RESERVED: u8 = 0x01;
/// Bit 1: Protocol Negotiation support.
pub const CATEGORY_PROTOCOL_NEGOTIATION: u8 = 0x02;
/// Bit 2: Profile Configuration support.
pub const CATEGORY_PROFILE_CONFIGURATION: u8 = 0x04;
/// Bit 3: Property Exchange support.
pub const CATEGORY_PROPERTY_EXCHANGE: u8 = 0x08;

/// The smallest `max_sysex_size` a device may advertise; smaller values
/// received over the wire are clamped up to this floor.
pub const MIN_MAX_SYSEX_SIZE: u32 = 128;

/// One device's MIDI-CI identity: its manufacturer/family/model/version,
/// capability bitmask, receive-buffer limit, and the profiles it hosts.
///
/// A `DeviceInfo` exists for the local device and for every remote peer the
/// discovery engine has recorded. Cloning yields a fresh, listener-free
/// [`ProfileRegistry`] (see [`ProfileRegistry::clone`]'s documentation) —
/// copying a registry is not expected to carry subscribers with it.
#[derive(Clone, Debug)]
pub struct DeviceInfo {
    muid: Muid,
    manufacturer_id: u32,
    family_id: u16,
    model_id: u16,
    version_id: u32,
    categories_supported: u8,
    max_sysex_size: u32,
    profiles: ProfileRegistry,
    last_receive_time: u64,
}

impl DeviceInfo {
    /// The owning MUID.
    pub fn muid(&self) -> Muid {
        self.muid
    }

    /// Replace the MUID (used when a device's MUID is rotated or assigned).
    pub fn set_muid(&mut self, muid: Muid) {
        self.muid = muid;
    }

    /// 21-bit manufacturer id.
    pub fn manufacturer_id(&self) -> u32 {
        self.manufacturer_id
    }

    /// 14-bit family id.
    pub fn family_id(&self) -> u16 {
        self.family_id
    }

    /// 14-bit model id.
    pub fn model_id(&self) -> u16 {
        self.model_id
    }

    /// 28-bit version id.
    pub fn version_id(&self) -> u32 {
        self.version_id
    }

    /// The `{Reserved, ProtocolNegotiation, ProfileConfiguration,
    /// PropertyExchange}` capability bitmask.
    pub fn categories_supported(&self) -> u8 {
        self.categories_supported
    }

    /// Set or clear one capability bit.
    pub fn set_category_bit(&mut self, bit: u8, on: bool) {
        if on {
            self.categories_supported |= bit;
        } else {
            self.categories_supported &= !bit;
        }
    }

    /// The receive-side SysEx size limit, always `>= `[`MIN_MAX_SYSEX_SIZE`].
    pub fn max_sysex_size(&self) -> u32 {
        self.max_sysex_size
    }

    /// This device's profile registry.
    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    /// This device's profile registry, mutably.
    pub fn profiles_mut(&mut self) -> &mut ProfileRegistry {
        &mut self.profiles
    }

    /// Monotonic milliseconds at which a message from this device was last
    /// received (meaningless for the local `DeviceInfo`).
    pub fn last_receive_time(&self) -> u64 {
        self.last_receive_time
    }

    /// Record that a message from this device arrived at `now_millis`.
    pub fn touch(&mut self, now_millis: u64) {
        self.last_receive_time = now_millis;
    }

    /// True iff this record is valid enough to participate in discovery:
    /// currently only a non-zero manufacturer id is required.
    pub fn is_valid(&self) -> bool {
        self.manufacturer_id != 0
    }
}

/// Builds a [`DeviceInfo`], validating the invariants from the
/// configuration surface: non-zero manufacturer id, `max_sysex_size >=
/// `[`MIN_MAX_SYSEX_SIZE`].
#[derive(Clone, Debug, Default)]
pub struct DeviceInfoBuilder {
    manufacturer_id: u32,
    family_id: u16,
    model_id: u16,
    version_id: u32,
    categories_supported: u8,
    max_receivable_sysex_size: u32,
}

impl DeviceInfoBuilder {
    /// Start from all-zero defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Required: the 21-bit manufacturer id.
    pub fn manufacturer_id(mut self, id: u32) -> Self {
        self.manufacturer_id = id & 0x001F_FFFF;
        self
    }

    /// 14-bit family id.
    pub fn family_id(mut self, id: u16) -> Self {
        self.family_id = id & 0x3FFF;
        self
    }

    /// 14-bit model id.
    pub fn model_id(mut self, id: u16) -> Self {
        self.model_id = id & 0x3FFF;
        self
    }

    /// 28-bit version id.
    pub fn version_id(mut self, id: u32) -> Self {
        self.version_id = id & 0x0FFF_FFFF;
        self
    }

    /// The categories-supported bitmask.
    pub fn categories_supported(mut self, bits: u8) -> Self {
        self.categories_supported = bits;
        self
    }

    /// The receive-side SysEx size limit this device advertises.
    pub fn max_receivable_sysex_size(mut self, size: u32) -> Self {
        self.max_receivable_sysex_size = size;
        self
    }

    /// Validate and build. `muid` is assigned separately by the discovery
    /// engine at start time, so this constructs with [`crate::muid::INVALID`]
    /// until the caller installs a real one via [`DeviceInfo::set_muid`].
    pub fn build(self) -> Result<DeviceInfo, DeviceInfoError> {
        if self.manufacturer_id == 0 {
            return Err(DeviceInfoError::ZeroManufacturerId);
        }
        if self.max_receivable_sysex_size < MIN_MAX_SYSEX_SIZE {
            return Err(DeviceInfoError::SysexSizeTooSmall(
                self.max_receivable_sysex_size,
            ));
        }
        Ok(DeviceInfo {
            muid: crate::muid::INVALID,
            manufacturer_id: self.manufacturer_id,
            family_id: self.family_id,
            model_id: self.model_id,
            version_id: self.version_id,
            categories_supported: self.categories_supported,
            max_sysex_size: self.max_receivable_sysex_size,
            profiles: ProfileRegistry::new(),
            last_receive_time: 0,
        })
    }
}

/// Construct a remote [`DeviceInfo`] from a parsed Discovery payload,
/// clamping `max_sysex_size` up to [`MIN_MAX_SYSEX_SIZE`] per §4.7.3.
pub fn from_discovery_fields(
    muid: Muid,
    manufacturer_id: u32,
    family_id: u16,
    model_id: u16,
    version_id: u32,
    categories_supported: u8,
    max_sysex_size: u32,
    now_millis: u64,
) -> DeviceInfo {
    DeviceInfo {
        muid,
        manufacturer_id,
        family_id,
        model_id,
        version_id,
        categories_supported,
        max_sysex_size: max_sysex_size.max(MIN_MAX_SYSEX_SIZE),
        profiles: ProfileRegistry::new(),
        last_receive_time: now_millis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_zero_manufacturer() {
        let err = DeviceInfoBuilder::new()
            .max_receivable_sysex_size(128)
            .build()
            .unwrap_err();
        assert_eq!(err, DeviceInfoError::ZeroManufacturerId);
    }

    #[test]
    fn builder_rejects_small_sysex_size() {
        let err = DeviceInfoBuilder::new()
            .manufacturer_id(1)
            .max_receivable_sysex_size(64)
            .build()
            .unwrap_err();
        assert_eq!(err, DeviceInfoError::SysexSizeTooSmall(64));
    }

    #[test]
    fn builder_succeeds() {
        let info = DeviceInfoBuilder::new()
            .manufacturer_id(0x06080D)
            .family_id(0x1122)
            .max_receivable_sysex_size(512)
            .build()
            .unwrap();
        assert!(info.is_valid());
        assert_eq!(info.max_sysex_size(), 512);
    }

    #[test]
    fn discovery_clamps_small_sysex_size() {
        let info = from_discovery_fields(Muid::new(1), 1, 0, 0, 0, 0, 4, 0);
        assert_eq!(info.max_sysex_size(), MIN_MAX_SYSEX_SIZE);
    }
}
