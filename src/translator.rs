//! Bidirectional, stateful translation between MIDI 1.0 channel-voice bytes
//! and their UMP MIDI 2.0 channel-voice equivalents.
//!
//! Carries per-channel (N)RPN assembly state and a process-wide Bank-Select
//! MSB/LSB with timestamps, used to gate Program Change coalescing. All
//! state is owned by one [`Translator`]; callers on multiple threads must
//! serialize access themselves (see the crate-level concurrency notes).

use crate::convert::{convert14to32, convert7to16, convert7to32};
use crate::message::legacy_voice::{LegacyChannelVoice, LegacyChannelVoiceStatus};
use crate::message::voice::{ChannelVoice, ChannelVoiceStatus};

/// Milliseconds a Bank Select CC remains valid for coalescing into the next
/// Program Change.
pub const BANK_SELECT_WINDOW_MILLIS: u64 = 500;

#[derive(Clone, Copy, Debug, Default)]
struct RpnState {
    received_nrpn: bool,
    received_rpn: bool,
    received_param_msb: bool,
    received_param_lsb: bool,
    received_value_msb: bool,
    param_msb: u8,
    param_lsb: u8,
    value_msb: u8,
}

impl RpnState {
    fn start_param_msb(&mut self, value: u8, nrpn: bool) {
        self.param_msb = value & 0x7F;
        self.received_param_msb = true;
        self.received_nrpn = nrpn;
        self.received_rpn = !nrpn;
        self.received_param_lsb = false;
        self.received_value_msb = false;
    }
}

/// Bidirectional MIDI 1.0 <-> UMP MIDI2 channel-voice translator.
///
/// Optionally filters the UMP -> MIDI1 direction to a single UMP group;
/// `None` (the default) passes every group through.
pub struct Translator {
    rpn: [RpnState; 16],
    bank_msb: Option<(u8, u64)>,
    bank_lsb: Option<(u8, u64)>,
    group_filter: Option<u8>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator {
    /// A translator that passes every UMP group through.
    pub fn new() -> Self {
        Self {
            rpn: [RpnState::default(); 16],
            bank_msb: None,
            bank_lsb: None,
            group_filter: None,
        }
    }

    /// Restrict UMP -> MIDI1 translation to a single group; `None` passes
    /// every group.
    pub fn set_group_filter(&mut self, group: Option<u8>) {
        self.group_filter = group;
    }

    fn within_window(entry: Option<(u8, u64)>, now_millis: u64) -> Option<u8> {
        entry.and_then(|(value, at)| {
            if now_millis.saturating_sub(at) <= BANK_SELECT_WINDOW_MILLIS {
                Some(value)
            } else {
                None
            }
        })
    }

    /// Translate one MIDI 1.0 channel-voice message into its UMP MIDI2
    /// equivalent(s). Every legacy channel-voice status is recognized; CC 38
    /// additionally emits an aggregated (N)RPN controller message once a
    /// full parameter/value triple has been assembled.
    pub fn midi1_to_ump(
        &mut self,
        group: u8,
        msg: &LegacyChannelVoice,
        now_millis: u64,
    ) -> Vec<ChannelVoice> {
        let channel = msg.channel();
        match msg.status() {
            LegacyChannelVoiceStatus::NoteOff => {
                let velocity = convert7to16(msg.velocity());
                vec![ChannelVoice::note_off(group, channel, msg.note_number(), velocity)]
            }
            LegacyChannelVoiceStatus::NoteOn => {
                let velocity7 = msg.velocity();
                if velocity7 == 0 {
                    vec![ChannelVoice::note_off(group, channel, msg.note_number(), 0x0040)]
                } else {
                    vec![ChannelVoice::note_on(
                        group,
                        channel,
                        msg.note_number(),
                        convert7to16(velocity7),
                    )]
                }
            }
            LegacyChannelVoiceStatus::PolyPressure => vec![ChannelVoice::poly_pressure_msg(
                group,
                channel,
                msg.note_number(),
                convert7to32(msg.poly_pressure()),
            )],
            LegacyChannelVoiceStatus::ChannelPressure => vec![ChannelVoice::channel_pressure_msg(
                group,
                channel,
                convert7to32(msg.channel_pressure()),
            )],
            LegacyChannelVoiceStatus::PitchBend => vec![ChannelVoice::pitch_bend_msg(
                group,
                channel,
                convert14to32(msg.pitch_bend()) as u32,
            )],
            LegacyChannelVoiceStatus::ControlChange => {
                let index = msg.cc_index();
                let value = msg.cc_value();
                let mut out = vec![ChannelVoice::control_change_msg(
                    group,
                    channel,
                    index,
                    convert7to32(value),
                )];
                if let Some(aggregated) = self.handle_cc(group, channel, index, value, now_millis) {
                    out.push(aggregated);
                }
                out
            }
            LegacyChannelVoiceStatus::ProgramChange => {
                let bank_msb = Self::within_window(self.bank_msb, now_millis);
                let bank_lsb = Self::within_window(self.bank_lsb, now_millis);
                let valid = bank_msb.is_some() || bank_lsb.is_some();
                self.bank_msb = None;
                self.bank_lsb = None;
                vec![ChannelVoice::program_change(
                    group,
                    channel,
                    if valid { 0x01 } else { 0x00 },
                    msg.program(),
                    bank_lsb.unwrap_or(0),
                    bank_msb.unwrap_or(0),
                )]
            }
        }
    }

    /// Runs the Bank-Select/(N)RPN state machine for one control-change and
    /// returns the aggregated MIDI2 controller message, if CC 38 just
    /// completed a parameter/value triple.
    fn handle_cc(
        &mut self,
        group: u8,
        channel: u8,
        index: u8,
        value: u8,
        now_millis: u64,
    ) -> Option<ChannelVoice> {
        let now_state_channel = (channel & 0x0F) as usize;
        match index {
            0 => {
                self.bank_msb = Some((value & 0x7F, now_millis));
                None
            }
            32 => {
                self.bank_lsb = Some((value & 0x7F, now_millis));
                None
            }
            99 => {
                self.rpn[now_state_channel].start_param_msb(value, true);
                None
            }
            98 => {
                let state = &mut self.rpn[now_state_channel];
                state.param_lsb = value & 0x7F;
                state.received_param_lsb = true;
                None
            }
            101 => {
                self.rpn[now_state_channel].start_param_msb(value, false);
                None
            }
            100 => {
                let state = &mut self.rpn[now_state_channel];
                state.param_lsb = value & 0x7F;
                state.received_param_lsb = true;
                None
            }
            6 => {
                let state = &mut self.rpn[now_state_channel];
                state.value_msb = value & 0x7F;
                state.received_value_msb = true;
                None
            }
            38 => {
                let state = self.rpn[now_state_channel];
                if state.received_param_msb && state.received_param_lsb && state.received_value_msb {
                    let value14 = ((state.value_msb as u16) << 7) | (value as u16 & 0x7F);
                    let value32 = convert14to32(value14);
                    Some(if state.received_nrpn {
                        ChannelVoice::assignable_cc(group, channel, state.param_msb, state.param_lsb, value32)
                    } else {
                        ChannelVoice::registered_cc(group, channel, state.param_msb, state.param_lsb, value32)
                    })
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// UMP MIDI2 -> MIDI 1.0. Returns the empty vector if this UMP's group
    /// is excluded by the configured filter, or if the status is not a
    /// channel-voice family this translator knows how to downgrade.
    pub fn ump_to_midi1(&mut self, group: u8, msg: &ChannelVoice) -> Vec<LegacyChannelVoice> {
        if let Some(filter) = self.group_filter {
            if filter != group {
                return Vec::new();
            }
        }
        let channel = Self::channel_of(msg);
        match msg.status() {
            ChannelVoiceStatus::NoteOn => {
                let velocity = (msg.velocity() >> 9) as u8;
                let velocity = if velocity == 0 { 1 } else { velocity };
                vec![LegacyChannelVoice::note_on(group, channel, msg.note_number(), velocity)]
            }
            ChannelVoiceStatus::NoteOff => vec![LegacyChannelVoice::note_off(
                group,
                channel,
                msg.note_number(),
                (msg.velocity() >> 9) as u8,
            )],
            ChannelVoiceStatus::ControlChange => vec![LegacyChannelVoice::control_change_msg(
                group,
                channel,
                msg.cc_index(),
                (msg.cc_value() >> 25) as u8,
            )],
            ChannelVoiceStatus::PolyPressure => vec![LegacyChannelVoice::poly_pressure_msg(
                group,
                channel,
                msg.note_number(),
                (msg.poly_pressure() >> 25) as u8,
            )],
            ChannelVoiceStatus::ChannelPressure => vec![LegacyChannelVoice::channel_pressure_msg(
                group,
                channel,
                (msg.cc_value() >> 25) as u8,
            )],
            ChannelVoiceStatus::PitchBend => {
                let value14 = (msg.pitch_bend() >> 18) as u16;
                vec![LegacyChannelVoice::pitch_bend_msg(group, channel, value14)]
            }
            ChannelVoiceStatus::ProgramChange => {
                let mut out = Vec::with_capacity(3);
                if msg.bank_select_valid() {
                    out.push(LegacyChannelVoice::control_change_msg(group, channel, 0, msg.bank_msb()));
                    out.push(LegacyChannelVoice::control_change_msg(group, channel, 32, msg.bank_lsb()));
                }
                out.push(LegacyChannelVoice::program_change_msg(
                    group,
                    channel,
                    msg.program_change_value(),
                ));
                out
            }
            ChannelVoiceStatus::RegisteredCtl | ChannelVoiceStatus::AssignableCtl => {
                let is_nrpn = msg.status() == ChannelVoiceStatus::AssignableCtl;
                let param_cc_msb = if is_nrpn { 99 } else { 101 };
                let param_cc_lsb = if is_nrpn { 98 } else { 100 };
                let value32 = msg.cc_value();
                let value14 = (value32 >> 18) as u16;
                let value_msb = (value14 >> 7) as u8;
                let value_lsb = (value14 & 0x7F) as u8;
                vec![
                    LegacyChannelVoice::control_change_msg(group, channel, param_cc_msb, msg.bank()),
                    LegacyChannelVoice::control_change_msg(group, channel, param_cc_lsb, msg.index()),
                    LegacyChannelVoice::control_change_msg(group, channel, 6, value_msb),
                    LegacyChannelVoice::control_change_msg(group, channel, 38, value_lsb),
                ]
            }
            _ => Vec::new(),
        }
    }

    fn channel_of(msg: &ChannelVoice) -> u8 {
        ((msg[0] >> 16) & 0x0F) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::convert14to32;

    #[test]
    fn nrpn_aggregation_scenario() {
        let mut t = Translator::new();
        let channel = 2;
        let out1 = t.midi1_to_ump(0, &LegacyChannelVoice::control_change_msg(0, channel, 99, 5), 0);
        assert_eq!(out1.len(), 1);
        let out2 = t.midi1_to_ump(0, &LegacyChannelVoice::control_change_msg(0, channel, 98, 6), 0);
        assert_eq!(out2.len(), 1);
        let out3 = t.midi1_to_ump(0, &LegacyChannelVoice::control_change_msg(0, channel, 6, 0x40), 0);
        assert_eq!(out3.len(), 1);
        let out4 = t.midi1_to_ump(0, &LegacyChannelVoice::control_change_msg(0, channel, 38, 0x20), 0);
        assert_eq!(out4.len(), 2);
        let aggregated = &out4[1];
        assert_eq!(aggregated.status(), ChannelVoiceStatus::AssignableCtl);
        assert_eq!(aggregated.bank(), 5);
        assert_eq!(aggregated.index(), 6);
        assert_eq!(aggregated.cc_value(), convert14to32(0x2020));
    }

    #[test]
    fn program_change_bank_coalescing() {
        let mut t = Translator::new();
        let channel = 3;
        t.midi1_to_ump(0, &LegacyChannelVoice::control_change_msg(0, channel, 0, 2), 0);
        t.midi1_to_ump(0, &LegacyChannelVoice::control_change_msg(0, channel, 32, 5), 100);
        let pc = t.midi1_to_ump(0, &LegacyChannelVoice::program_change_msg(0, channel, 0x7A), 200);
        assert_eq!(pc.len(), 1);
        assert!(pc[0].bank_select_valid());
        assert_eq!(pc[0].program_change_value(), 0x7A);
        assert_eq!(pc[0].bank_msb(), 2);
        assert_eq!(pc[0].bank_lsb(), 5);

        let pc2 = t.midi1_to_ump(0, &LegacyChannelVoice::program_change_msg(0, channel, 0x01), 800);
        assert_eq!(pc2.len(), 1);
        assert!(!pc2[0].bank_select_valid());
    }

    #[test]
    fn note_on_velocity_zero_becomes_note_off() {
        let mut t = Translator::new();
        let out = t.midi1_to_ump(0, &LegacyChannelVoice::note_on(0, 0, 0x40, 0), 0);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].status(), ChannelVoiceStatus::NoteOff);
        assert_eq!(out[0].velocity(), 0x0040);
    }

    #[test]
    fn ump_note_on_velocity_zero_substitutes_one() {
        let mut t = Translator::new();
        let ump = ChannelVoice::note_on(0, 0, 0x40, 0x0100);
        let out = t.ump_to_midi1(0, &ump);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].velocity(), 1);
    }

    #[test]
    fn group_filter_excludes_other_groups() {
        let mut t = Translator::new();
        t.set_group_filter(Some(0));
        let ump = ChannelVoice::note_on(1, 0, 0x40, 0x8000);
        assert!(t.ump_to_midi1(1, &ump).is_empty());
    }
}
