//! The Universal SysEx header shared by every MIDI-CI message, and the
//! sub-ID-2 vocabulary that identifies a message's type.

use crate::error::CodecError;
use crate::muid::Muid;

/// SysEx start byte.
pub const SYSEX_START: u8 = 0xF0;
/// Universal Non-Realtime SysEx ID.
pub const UNIVERSAL_NON_REALTIME: u8 = 0x7E;
/// Sub-ID-1 identifying MIDI-CI within the Universal Non-Realtime space.
pub const SUB_ID_1_MIDI_CI: u8 = 0x0D;
/// End-of-exclusive byte.
pub const EOX: u8 = 0xF7;

/// Offset of the device-id byte.
pub const OFFSET_DEVICE_ID: usize = 2;
/// Offset of the sub-id-2 (message type) byte.
pub const OFFSET_SUB_ID_2: usize = 4;
/// Offset of the CI version byte.
pub const OFFSET_VERSION: usize = 5;
/// Offset of the 4-byte source MUID.
pub const OFFSET_SRC_MUID: usize = 6;
/// Offset of the 4-byte destination MUID.
pub const OFFSET_DEST_MUID: usize = 10;
/// Offset of the first payload byte following the header.
pub const OFFSET_PAYLOAD: usize = 14;
/// Header length in bytes (everything before the type-specific payload).
pub const HEADER_LEN: usize = OFFSET_PAYLOAD;

/// Device id meaning "the whole port" rather than a single channel.
pub const DEVICE_ID_PORT: u8 = 0x7F;

/// Discovery.
pub const SUB_ID_2_DISCOVERY: u8 = 0x70;
/// Discovery Reply.
pub const SUB_ID_2_DISCOVERY_REPLY: u8 = 0x71;
/// Invalidate MUID.
pub const SUB_ID_2_INVALIDATE_MUID: u8 = 0x7E;
/// NAK.
pub const SUB_ID_2_NAK: u8 = 0x7F;

/// Profile Inquiry.
pub const SUB_ID_2_PROFILE_INQUIRY: u8 = 0x20;
/// Profile Inquiry Reply.
pub const SUB_ID_2_PROFILE_INQUIRY_REPLY: u8 = 0x21;
/// Profile Set On.
pub const SUB_ID_2_PROFILE_SET_ON: u8 = 0x22;
/// Profile Set Off.
pub const SUB_ID_2_PROFILE_SET_OFF: u8 = 0x23;
/// Profile Report On (Enabled).
pub const SUB_ID_2_PROFILE_REPORT_ON: u8 = 0x24;
/// Profile Report Off (Disabled).
pub const SUB_ID_2_PROFILE_REPORT_OFF: u8 = 0x25;
/// Profile Specific Data.
pub const SUB_ID_2_PROFILE_SPECIFIC_DATA: u8 = 0x2F;

/// Total size in bytes of a Discovery/Discovery-Reply message.
pub const DISCOVERY_SIZE: usize = 31;
/// Total size in bytes of an Invalidate MUID message.
pub const INVALIDATE_MUID_SIZE: usize = 19;
/// Total size in bytes of a NAK message.
pub const NAK_SIZE: usize = 15;

/// True iff `sub_id2` falls in the Discovery/management range (0x70..=0x7F).
pub fn is_management_message(sub_id2: u8) -> bool {
    (0x70..=0x7F).contains(&sub_id2)
}

/// True iff `sub_id2` falls in the Profile Configuration range (0x20..=0x2F).
pub fn is_profile_message(sub_id2: u8) -> bool {
    (0x20..=0x2F).contains(&sub_id2)
}

/// True iff `device_id` addresses a single MIDI channel (0x00..=0x0F) or the
/// whole port (0x7F).
pub fn is_valid_device_id(device_id: u8) -> bool {
    device_id <= 0x0F || device_id == DEVICE_ID_PORT
}

/// Validate a received buffer against the early, pre-dispatch framing rules:
/// length greater than the header, the fixed bytes match, the device id is
/// in range, and the frame ends with [`EOX`]. Frames failing this check are
/// dropped silently — they may not be MIDI-CI at all.
pub fn is_midi_ci_message(frame: &[u8]) -> bool {
    frame.len() > HEADER_LEN
        && frame[0] == SYSEX_START
        && frame[1] == UNIVERSAL_NON_REALTIME
        && is_valid_device_id(frame[OFFSET_DEVICE_ID])
        && frame[3] == SUB_ID_1_MIDI_CI
        && frame[frame.len() - 1] == EOX
}

/// The sub-id-2 (message type) byte. Only meaningful once
/// [`is_midi_ci_message`] has returned `true`.
pub fn sub_id2(frame: &[u8]) -> u8 {
    frame[OFFSET_SUB_ID_2]
}

/// The device-id byte.
pub fn device_id(frame: &[u8]) -> u8 {
    frame[OFFSET_DEVICE_ID]
}

/// The CI version byte.
pub fn version(frame: &[u8]) -> u8 {
    frame[OFFSET_VERSION]
}

/// The source MUID.
pub fn source_muid(frame: &[u8]) -> Result<Muid, CodecError> {
    Muid::read(frame, OFFSET_SRC_MUID)
}

/// The destination MUID.
pub fn destination_muid(frame: &[u8]) -> Result<Muid, CodecError> {
    Muid::read(frame, OFFSET_DEST_MUID)
}

/// Fill in the common 14-byte header. `buf` must be at least [`HEADER_LEN`]
/// bytes; the caller fills in the payload and final [`EOX`] byte.
pub fn fill_header(
    buf: &mut [u8],
    sub_id2: u8,
    device_id: u8,
    version: u8,
    source: Muid,
    destination: Muid,
) -> Result<(), CodecError> {
    buf[0] = SYSEX_START;
    buf[1] = UNIVERSAL_NON_REALTIME;
    buf[OFFSET_DEVICE_ID] = device_id;
    buf[3] = SUB_ID_1_MIDI_CI;
    buf[OFFSET_SUB_ID_2] = sub_id2;
    buf[OFFSET_VERSION] = version;
    source.write(buf, OFFSET_SRC_MUID)?;
    destination.write(buf, OFFSET_DEST_MUID)?;
    Ok(())
}

/// Build a NAK in reply to `received`, addressed back to its source MUID.
/// Mirrors the original's policy of replying to any message carrying a
/// parseable source MUID, even one that otherwise failed later validation.
pub fn build_nak(local_muid: Muid, destination: Muid) -> Vec<u8> {
    let mut buf = vec![0u8; NAK_SIZE];
    fill_header(&mut buf, SUB_ID_2_NAK, DEVICE_ID_PORT, 0x01, local_muid, destination)
        .expect("NAK_SIZE always fits the header");
    buf[NAK_SIZE - 1] = EOX;
    buf
}

/// Build an Invalidate MUID broadcast naming `invalidated` as the MUID being
/// dropped.
pub fn build_invalidate_muid(local_muid: Muid, invalidated: Muid) -> Vec<u8> {
    let mut buf = vec![0u8; INVALIDATE_MUID_SIZE];
    fill_header(
        &mut buf,
        SUB_ID_2_INVALIDATE_MUID,
        DEVICE_ID_PORT,
        0x01,
        local_muid,
        crate::muid::BROADCAST,
    )
    .expect("INVALIDATE_MUID_SIZE always fits the header");
    invalidated
        .write(&mut buf, OFFSET_PAYLOAD)
        .expect("INVALIDATE_MUID_SIZE always fits the payload");
    buf[INVALIDATE_MUID_SIZE - 1] = EOX;
    buf
}

/// Read the target MUID carried by an Invalidate MUID message's payload.
pub fn invalidate_muid_target(frame: &[u8]) -> Result<Muid, CodecError> {
    Muid::read(frame, OFFSET_PAYLOAD)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_nak() -> Vec<u8> {
        build_nak(Muid::new(1), Muid::new(2))
    }

    #[test]
    fn nak_roundtrips() {
        let frame = sample_nak();
        assert!(is_midi_ci_message(&frame));
        assert_eq!(sub_id2(&frame), SUB_ID_2_NAK);
        assert_eq!(source_muid(&frame).unwrap(), Muid::new(1));
        assert_eq!(destination_muid(&frame).unwrap(), Muid::new(2));
        assert_eq!(frame.len(), NAK_SIZE);
    }

    #[test]
    fn invalidate_muid_roundtrips() {
        let frame = build_invalidate_muid(Muid::new(7), Muid::new(9));
        assert!(is_midi_ci_message(&frame));
        assert_eq!(sub_id2(&frame), SUB_ID_2_INVALIDATE_MUID);
        assert_eq!(invalidate_muid_target(&frame).unwrap(), Muid::new(9));
        assert_eq!(frame.len(), INVALIDATE_MUID_SIZE);
    }

    #[test]
    fn rejects_bad_frames() {
        assert!(!is_midi_ci_message(&[0xF0, 0x7E, 0x00, 0x0D, 0x70]));
        let mut bad = sample_nak();
        *bad.last_mut().unwrap() = 0x00;
        assert!(!is_midi_ci_message(&bad));
        let mut bad_device = sample_nak();
        bad_device[OFFSET_DEVICE_ID] = 0x20;
        assert!(!is_midi_ci_message(&bad_device));
    }
}
