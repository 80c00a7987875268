use core::convert::TryInto;
use core::ops::Deref;

use crate::packet::{MessageType, Packet, Packet32};

use super::Message;

/// MIDI 1.0 Channel Voice Messages
#[derive(Copy, Clone, Hash, Debug, Eq, PartialEq)]
pub struct LegacyChannelVoice(Packet32);

/// Status nibble values per the MIDI 1.0 spec: 0x8 is Note Off, 0x9 is Note On.
#[derive(Copy, Clone, Hash, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum LegacyChannelVoiceStatus {
    NoteOff = 0x08,
    NoteOn = 0x09,
    PolyPressure = 0x0a,
    ControlChange = 0x0b,
    ProgramChange = 0x0c,
    ChannelPressure = 0x0d,
    PitchBend = 0x0e,
}

impl Deref for LegacyChannelVoice {
    type Target = [u32];
    fn deref(&self) -> &Self::Target {
        self.0.deref()
    }
}

impl Message for LegacyChannelVoice {
    type Status = LegacyChannelVoiceStatus;
    type Data = [u8; 3];

    fn message_type(&self) -> MessageType {
        let type_ = self.0.message_type().into();
        debug_assert!(
            type_ == MessageType::LegacyChannelVoice,
            "Invalid message type.."
        );
        type_
    }

    fn group(&self) -> u8 {
        self.0.group()
    }

    fn status(&self) -> Self::Status {
        match self.0.status() >> 4 {
            0x8 => Self::Status::NoteOff,
            0x9 => Self::Status::NoteOn,
            0xa => Self::Status::PolyPressure,
            0xb => Self::Status::ControlChange,
            0xc => Self::Status::ProgramChange,
            0xd => Self::Status::ChannelPressure,
            0xe => Self::Status::PitchBend,
            _ => unreachable!("Invalid status byte for legacy channel voice message."),
        }
    }

    fn data(&self) -> Self::Data {
        (&self.0[0].to_be_bytes()[1..=3]).try_into().unwrap()
    }
}

impl LegacyChannelVoice {
    pub(crate) fn from_packet_unchecked(ump: Packet32) -> Self {
        Self(ump)
    }

    fn build(group: u8, status: LegacyChannelVoiceStatus, channel: u8, data1: u8, data2: u8) -> Self {
        let word0 = ((MessageType::LegacyChannelVoice as u32) << 28)
            | (((group as u32) & 0x0F) << 24)
            | (((status as u32) & 0x0F) << 20)
            | (((channel as u32) & 0x0F) << 16)
            | (((data1 as u32) & 0x7F) << 8)
            | ((data2 as u32) & 0x7F);
        Self(Packet([word0]))
    }

    pub fn note_off(group: u8, channel: u8, note: u8, velocity: u8) -> Self {
        Self::build(group, LegacyChannelVoiceStatus::NoteOff, channel, note, velocity)
    }

    pub fn note_on(group: u8, channel: u8, note: u8, velocity: u8) -> Self {
        Self::build(group, LegacyChannelVoiceStatus::NoteOn, channel, note, velocity)
    }

    pub fn poly_pressure_msg(group: u8, channel: u8, note: u8, pressure: u8) -> Self {
        Self::build(group, LegacyChannelVoiceStatus::PolyPressure, channel, note, pressure)
    }

    pub fn control_change_msg(group: u8, channel: u8, index: u8, value: u8) -> Self {
        Self::build(group, LegacyChannelVoiceStatus::ControlChange, channel, index, value)
    }

    pub fn program_change_msg(group: u8, channel: u8, program: u8) -> Self {
        Self::build(group, LegacyChannelVoiceStatus::ProgramChange, channel, program, 0)
    }

    pub fn channel_pressure_msg(group: u8, channel: u8, pressure: u8) -> Self {
        Self::build(group, LegacyChannelVoiceStatus::ChannelPressure, channel, pressure, 0)
    }

    pub fn pitch_bend_msg(group: u8, channel: u8, value14: u16) -> Self {
        let lsb = (value14 & 0x7F) as u8;
        let msb = ((value14 >> 7) & 0x7F) as u8;
        Self::build(group, LegacyChannelVoiceStatus::PitchBend, channel, lsb, msb)
    }

    pub fn channel(&self) -> u8 {
        self.data()[0]
    }

    pub fn note_number(&self) -> u8 {
        self.data()[1]
    }

    pub fn velocity(&self) -> u8 {
        self.data()[2]
    }

    pub fn cc_index(&self) -> u8 {
        self.data()[1]
    }

    pub fn cc_value(&self) -> u8 {
        self.data()[2]
    }

    pub fn program(&self) -> u8 {
        self.data()[1]
    }

    pub fn pitch_bend(&self) -> u16 {
        let lsb = self.data()[1] as u16;
        let msb = self.data()[2] as u16;
        (msb << 7) | lsb
    }

    pub fn poly_pressure(&self) -> u8 {
        self.data()[2]
    }

    pub fn channel_pressure(&self) -> u8 {
        self.data()[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_nibble_matches_midi_spec() {
        let off = LegacyChannelVoice::note_off(0, 0, 0x40, 0x10);
        assert_eq!(off.status(), LegacyChannelVoiceStatus::NoteOff);
        assert_eq!(off.0[0] >> 20 & 0xF, 0x8);

        let on = LegacyChannelVoice::note_on(0, 0, 0x40, 0x10);
        assert_eq!(on.status(), LegacyChannelVoiceStatus::NoteOn);
        assert_eq!(on.0[0] >> 20 & 0xF, 0x9);
    }

    #[test]
    fn pitch_bend_roundtrips_lsb_first() {
        let msg = LegacyChannelVoice::pitch_bend_msg(0, 5, 0x1234);
        assert_eq!(msg.pitch_bend(), 0x1234);
    }
}
