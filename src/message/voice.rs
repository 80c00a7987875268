use core::ops::Deref;

use crate::packet::{MessageType, Packet, Packet64};

use super::Message;

/// MIDI 2.0 channel voice messages
#[derive(Copy, Clone, Hash, Debug, Eq, PartialEq)]
pub struct ChannelVoice(Packet64);

#[derive(Copy, Clone, Hash, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ChannelVoiceStatus {
    NoteOff = 0x8,
    NoteOn = 0x9,
    PolyPressure = 0xa,
    ControlChange = 0xb,
    ProgramChange = 0xc,
    ChannelPressure = 0xd,
    PitchBend = 0xe,

    RegisteredPerNoteCtl = 0x0,
    AssignablePerNoteCtl = 0x1,
    RegisteredCtl = 0x2,
    AssignableCtl = 0x3,
    RelRegisteredPerNoteCtl = 0x4,
    RelAssignablePerNoteCtl = 0x5,
    PerNotePitchBend = 0x6,
    PerNoteManagement = 0xf,
}

impl ChannelVoiceStatus {
    /// A short human-readable name, used for debug rendering.
    pub fn name(&self) -> &'static str {
        match self {
            ChannelVoiceStatus::NoteOff => "NoteOff",
            ChannelVoiceStatus::NoteOn => "NoteOn",
            ChannelVoiceStatus::PolyPressure => "PolyPressure",
            ChannelVoiceStatus::ControlChange => "ControlChange",
            ChannelVoiceStatus::ProgramChange => "ProgramChange",
            ChannelVoiceStatus::ChannelPressure => "ChannelPressure",
            ChannelVoiceStatus::PitchBend => "PitchBend",
            ChannelVoiceStatus::RegisteredPerNoteCtl => "RegisteredPerNoteCtl",
            ChannelVoiceStatus::AssignablePerNoteCtl => "AssignablePerNoteCtl",
            ChannelVoiceStatus::RegisteredCtl => "RegisteredCtl",
            ChannelVoiceStatus::AssignableCtl => "AssignableCtl",
            ChannelVoiceStatus::RelRegisteredPerNoteCtl => "RelRegisteredPerNoteCtl",
            ChannelVoiceStatus::RelAssignablePerNoteCtl => "RelAssignablePerNoteCtl",
            ChannelVoiceStatus::PerNotePitchBend => "PerNotePitchBend",
            ChannelVoiceStatus::PerNoteManagement => "PerNoteManagement",
        }
    }
}

impl core::fmt::Display for ChannelVoice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:08X}{:08X} [MIDI2-CV {}]",
            self.0[0],
            self.0[1],
            self.status().name()
        )
    }
}

impl Deref for ChannelVoice {
    type Target = [u32];
    fn deref(&self) -> &Self::Target {
        self.0.deref()
    }
}

impl Message for ChannelVoice {
    type Status = ChannelVoiceStatus;
    type Data = (u8, u8, u32);

    fn message_type(&self) -> MessageType {
        let type_ = self.0.message_type().into();
        debug_assert!(type_ == MessageType::ChannelVoice, "Invalid message type..");
        type_
    }

    fn group(&self) -> u8 {
        self.0.group()
    }

    fn status(&self) -> Self::Status {
        match (self.0[0] >> 20) & 0xf {
            0x8 => Self::Status::NoteOff,
            0x9 => Self::Status::NoteOn,
            0xa => Self::Status::PolyPressure,
            0xb => Self::Status::ControlChange,
            0xc => Self::Status::ProgramChange,
            0xd => Self::Status::ChannelPressure,
            0xe => Self::Status::PitchBend,

            0x0 => Self::Status::RegisteredPerNoteCtl,
            0x1 => Self::Status::AssignablePerNoteCtl,
            0x2 => Self::Status::RegisteredCtl,
            0x3 => Self::Status::AssignableCtl,
            0x4 => Self::Status::RelRegisteredPerNoteCtl,
            0x5 => Self::Status::RelAssignablePerNoteCtl,
            0x6 => Self::Status::PerNotePitchBend,
            0xF => Self::Status::PerNoteManagement,
            _ => unreachable!("Invalid status byte for channel voice message."),
        }
    }

    fn data(&self) -> Self::Data {
        let word1 = self.0[0].to_be_bytes();
        let word2 = self.0[1];
        (word1[2], word1[3], word2)
    }
}

impl ChannelVoice {
    pub(crate) fn from_packet_unchecked(ump: Packet64) -> Self {
        Self(ump)
    }

    fn build(
        group: u8,
        status: ChannelVoiceStatus,
        channel: u8,
        byte1: u8,
        byte2: u8,
        word2: u32,
    ) -> Self {
        let word0 = ((MessageType::ChannelVoice as u32) << 28)
            | (((group as u32) & 0x0F) << 24)
            | (((status as u32) & 0x0F) << 20)
            | (((channel as u32) & 0x0F) << 16)
            | ((byte1 as u32) << 8)
            | (byte2 as u32);
        Self(Packet([word0, word2]))
    }

    /// Note Off with full 16-bit velocity and no per-note attribute.
    pub fn note_off(group: u8, channel: u8, note: u8, velocity: u16) -> Self {
        Self::note_off_with_attribute(group, channel, note, velocity, 0, 0)
    }

    /// Note Off with a per-note attribute (type + 16-bit value).
    pub fn note_off_with_attribute(
        group: u8,
        channel: u8,
        note: u8,
        velocity: u16,
        attribute_type: u8,
        attribute: u16,
    ) -> Self {
        Self::build(
            group,
            ChannelVoiceStatus::NoteOff,
            channel,
            note & 0x7F,
            attribute_type,
            ((velocity as u32) << 16) | (attribute as u32),
        )
    }

    /// Note On with full 16-bit velocity and no per-note attribute.
    pub fn note_on(group: u8, channel: u8, note: u8, velocity: u16) -> Self {
        Self::note_on_with_attribute(group, channel, note, velocity, 0, 0)
    }

    /// Note On with a per-note attribute (type + 16-bit value).
    pub fn note_on_with_attribute(
        group: u8,
        channel: u8,
        note: u8,
        velocity: u16,
        attribute_type: u8,
        attribute: u16,
    ) -> Self {
        Self::build(
            group,
            ChannelVoiceStatus::NoteOn,
            channel,
            note & 0x7F,
            attribute_type,
            ((velocity as u32) << 16) | (attribute as u32),
        )
    }

    /// Polyphonic key pressure with a 32-bit pressure value.
    pub fn poly_pressure_msg(group: u8, channel: u8, note: u8, pressure: u32) -> Self {
        Self::build(
            group,
            ChannelVoiceStatus::PolyPressure,
            channel,
            note & 0x7F,
            0,
            pressure,
        )
    }

    /// Control change with a 32-bit expanded value.
    pub fn control_change_msg(group: u8, channel: u8, index: u8, value: u32) -> Self {
        Self::build(
            group,
            ChannelVoiceStatus::ControlChange,
            channel,
            index & 0x7F,
            0,
            value,
        )
    }

    /// Assignable controller (bank + index addressed) with a 32-bit value.
    pub fn assignable_cc(group: u8, channel: u8, bank: u8, index: u8, value: u32) -> Self {
        Self::build(
            group,
            ChannelVoiceStatus::AssignableCtl,
            channel,
            bank & 0x7F,
            index & 0x7F,
            value,
        )
    }

    /// Registered controller (bank + index addressed) with a 32-bit value.
    pub fn registered_cc(group: u8, channel: u8, bank: u8, index: u8, value: u32) -> Self {
        Self::build(
            group,
            ChannelVoiceStatus::RegisteredCtl,
            channel,
            bank & 0x7F,
            index & 0x7F,
            value,
        )
    }

    /// Per-note assignable controller.
    pub fn per_note_assignable_cc(group: u8, channel: u8, note: u8, index: u8, value: u32) -> Self {
        Self::build(
            group,
            ChannelVoiceStatus::AssignablePerNoteCtl,
            channel,
            note & 0x7F,
            index,
            value,
        )
    }

    /// Per-note registered controller.
    pub fn per_note_registered_cc(group: u8, channel: u8, note: u8, index: u8, value: u32) -> Self {
        Self::build(
            group,
            ChannelVoiceStatus::RegisteredPerNoteCtl,
            channel,
            note & 0x7F,
            index,
            value,
        )
    }

    /// Per-note management (detach/reset flags; see [`PerNoteManagementFlag`]).
    pub fn per_note_management(group: u8, channel: u8, note: u8, option_flags: u8) -> Self {
        Self::build(
            group,
            ChannelVoiceStatus::PerNoteManagement,
            channel,
            note & 0x7F,
            option_flags,
            0,
        )
    }

    /// Program change. `bank_msb`/`bank_lsb` are only meaningful when the
    /// `BankSelectValid` option flag bit is set.
    pub fn program_change(
        group: u8,
        channel: u8,
        option_flags: u8,
        program: u8,
        bank_lsb: u8,
        bank_msb: u8,
    ) -> Self {
        let word2 = ((program as u32) << 24) | ((bank_msb as u32 & 0x7F) << 8) | (bank_lsb as u32 & 0x7F);
        Self::build(
            group,
            ChannelVoiceStatus::ProgramChange,
            channel,
            option_flags,
            0,
            word2,
        )
    }

    /// Channel pressure with a 32-bit expanded value.
    pub fn channel_pressure_msg(group: u8, channel: u8, value: u32) -> Self {
        Self::build(
            group,
            ChannelVoiceStatus::ChannelPressure,
            channel,
            0,
            0,
            value,
        )
    }

    /// Pitch bend with a 32-bit expanded value.
    pub fn pitch_bend_msg(group: u8, channel: u8, value: u32) -> Self {
        Self::build(group, ChannelVoiceStatus::PitchBend, channel, 0, 0, value)
    }

    pub fn note_number(&self) -> u8 {
        self.data().0
    }

    pub fn velocity(&self) -> u16 {
        (self.data().2 >> 16) as u16
    }

    // TODO: more specific type.
    // 0 => None
    // 1 => Manufacturer Specific
    // 2 => Profile Specific
    // 3 => Pitch 7.9
    pub fn attribute_data(&self) -> Result<NoteAttribute, ()> {
        let attribute_type = self.data().1;
        let get_attribute_value = || (self.data().2 & 0x0000_FFFF) as u16;
        match attribute_type {
            0x00 => Ok(NoteAttribute::None),
            0x01 => Ok(NoteAttribute::ManufacturerSpecific(get_attribute_value())),
            0x02 => Ok(NoteAttribute::ProfileSpecific(get_attribute_value())),
            0x03 => Ok(NoteAttribute::Pitch7_9(get_attribute_value())),
            _ => Err(()),
        }
    }

    pub fn poly_pressure(&self) -> u32 {
        self.data().2
    }

    pub fn rpn_index(&self) -> u8 {
        self.data().1
    }

    pub fn rpn_data(&self) -> u32 {
        self.data().2
    }

    pub fn per_note_mgmt_flags(&self) -> u8 {
        self.data().1
    }

    pub fn cc_index(&self) -> u8 {
        self.data().0
    }

    pub fn cc_value(&self) -> u32 {
        self.data().2
    }

    /// For assignable/registered (per-note) controllers: the bank byte.
    pub fn bank(&self) -> u8 {
        self.data().0
    }

    /// For assignable/registered (per-note) controllers: the index byte.
    pub fn index(&self) -> u8 {
        self.data().1
    }

    /// Flag bits from the first data byte of a Program Change message; bit 0
    /// is `BankSelectValid`.
    pub fn program_change_flags(&self) -> u8 {
        self.data().0
    }

    /// True if this Program Change carries valid bank MSB/LSB bytes.
    pub fn bank_select_valid(&self) -> bool {
        self.program_change_flags() & 0x01 != 0
    }

    pub fn program_change_value(&self) -> u8 {
        (self.data().2 >> 24) as u8
    }

    pub fn bank_msb(&self) -> u8 {
        ((self.data().2 >> 8) & 0x7F) as u8
    }

    pub fn bank_lsb(&self) -> u8 {
        (self.data().2 & 0x7F) as u8
    }

    pub fn pitch_bend(&self) -> u32 {
        self.data().2
    }
}

#[derive(Copy, Clone, Hash, Debug, Eq, PartialEq)]
pub enum NoteAttribute {
    None,
    ManufacturerSpecific(u16),
    ProfileSpecific(u16),
    Pitch7_9(u16),
}

impl NoteAttribute {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_roundtrips_note_and_velocity() {
        let msg = ChannelVoice::note_on(0, 3, 0x40, 0xABCD);
        assert_eq!(msg.status(), ChannelVoiceStatus::NoteOn);
        assert_eq!(msg.group(), 0);
        assert_eq!(msg.note_number(), 0x40);
        assert_eq!(msg.velocity(), 0xABCD);
    }

    #[test]
    fn program_change_roundtrips_bank_and_flags() {
        let msg = ChannelVoice::program_change(1, 3, 1, 0x7A, 5, 2);
        assert_eq!(msg.status(), ChannelVoiceStatus::ProgramChange);
        assert!(msg.bank_select_valid());
        assert_eq!(msg.program_change_value(), 0x7A);
        assert_eq!(msg.bank_msb(), 2);
        assert_eq!(msg.bank_lsb(), 5);
    }

    #[test]
    fn program_change_without_bank_clears_flag() {
        let msg = ChannelVoice::program_change(0, 0, 0, 0x10, 0, 0);
        assert!(!msg.bank_select_valid());
    }

    #[test]
    fn assignable_cc_carries_bank_and_index() {
        let msg = ChannelVoice::assignable_cc(0, 2, 5, 6, 0x2020_0000);
        assert_eq!(msg.status(), ChannelVoiceStatus::AssignableCtl);
        assert_eq!(msg.bank(), 5);
        assert_eq!(msg.index(), 6);
        assert_eq!(msg.cc_value(), 0x2020_0000);
    }
}