//! The Profile Configuration sub-protocol: inquiry, enable/disable,
//! reporting, and profile-specific data exchange.

use std::boxed::Box;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use super::device_registry::DeviceRegistry;
use super::device_info::CATEGORY_PROTOCOL_NEGOTIATION;
use super::listener::{Handle, ProfileRegistryListener, RemoteProfileListener};
use super::message;
use super::profile_id::ProfileId;
use super::profile_state::PORT_CHANNEL;
use super::{Io, Outcome};
use crate::muid::Muid;
use crate::wire;

/// Cap on the number of profiles advertised in one Inquiry Reply, matching
/// the original's fixed allocation; also bounded by the destination's
/// advertised `max_sysex_size` (see [`ProfileEngine::send_inquiry_reply`]).
pub const MAX_PROFILES_PER_REPLY: usize = 100;

/// Bytes of header overhead around the enabled/disabled id lists in an
/// Inquiry Reply: the 14-byte header, two 14-bit counts (2 bytes each), and
/// the trailing EOX.
const REPLY_OVERHEAD: usize = message::HEADER_LEN + 2 + 2 + 1;

/// A queued outbound event raised by the local registry's listener fan-out,
/// drained (and actually sent) once the triggering call has full [`Io`]
/// access. Keeping this as data rather than calling out from inside the
/// listener callback avoids the listener holding any reference back into the
/// engine or its collaborators.
#[derive(Clone, Debug)]
enum PendingEvent {
    Report { channel: u8, id: ProfileId, enabled: bool },
    SpecificData { id: ProfileId, data: Vec<u8> },
}

/// Subscribed to the local [`super::profile_registry::ProfileRegistry`];
/// queues a [`PendingEvent`] for every change that should be broadcast.
struct LocalRefan {
    queue: Rc<RefCell<VecDeque<PendingEvent>>>,
}

impl ProfileRegistryListener for LocalRefan {
    fn on_enabled_change(&self, id: ProfileId, channel: u8, enabled: bool) {
        self.queue
            .borrow_mut()
            .push_back(PendingEvent::Report { channel, id, enabled });
    }

    fn on_specific_data_change(&self, id: ProfileId, data: &[u8]) {
        self.queue.borrow_mut().push_back(PendingEvent::SpecificData {
            id,
            data: data.to_vec(),
        });
    }
}

/// Subscribed to the device registry's remote-profile fan-out. The engine's
/// egress only ever reacts to local changes (see [`LocalRefan`]); this
/// subscription exists to keep the device registry's lazy fan-out installed
/// on every remote for the lifetime of the session.
struct NoopRemoteListener;
impl RemoteProfileListener for NoopRemoteListener {}

/// Runs the Profile Configuration sub-protocol for one local device.
pub struct ProfileEngine {
    queue: Rc<RefCell<VecDeque<PendingEvent>>>,
    local_handle: Option<Handle>,
    remote_handle: Option<Handle>,
}

impl ProfileEngine {
    /// A fresh engine. Call [`ProfileEngine::start`] before using it.
    pub fn new() -> Self {
        ProfileEngine {
            queue: Rc::new(RefCell::new(VecDeque::new())),
            local_handle: None,
            remote_handle: None,
        }
    }

    /// Subscribe to local registry events, set the Protocol Negotiation
    /// category bit on the local device (mirroring the original's
    /// longstanding behavior, preserved rather than silently dropped — see
    /// `DESIGN.md`), and subscribe to the device registry's remote-profile
    /// fan-out.
    pub fn start(&mut self, registry: &mut DeviceRegistry) {
        let handle = registry
            .local_mut()
            .profiles_mut()
            .subscribe(Box::new(LocalRefan {
                queue: self.queue.clone(),
            }));
        self.local_handle = Some(handle);
        registry
            .local_mut()
            .set_category_bit(CATEGORY_PROTOCOL_NEGOTIATION, true);
        self.remote_handle = Some(registry.subscribe_remote_profiles(Box::new(NoopRemoteListener)));
    }

    /// Unsubscribe and clear the Protocol Negotiation category bit.
    pub fn stop(&mut self, registry: &mut DeviceRegistry) {
        if let Some(handle) = self.local_handle.take() {
            registry.local_mut().profiles_mut().unsubscribe(handle);
        }
        registry
            .local_mut()
            .set_category_bit(CATEGORY_PROTOCOL_NEGOTIATION, false);
        if let Some(handle) = self.remote_handle.take() {
            registry.unsubscribe_remote_profiles(handle);
        }
        self.queue.borrow_mut().clear();
    }

    /// Handle one inbound profile-range message. The source MUID must name a
    /// known remote — profile messages from undiscovered peers are dropped
    /// with a log, never NAK'd (§4.8, §7.4).
    pub fn receive(
        &mut self,
        frame: &[u8],
        registry: &mut DeviceRegistry,
        has_sent: &mut bool,
        io: &mut Io,
    ) -> Outcome {
        let sub = message::sub_id2(frame);
        let channel = message::device_id(frame);
        if !message::is_valid_device_id(channel) {
            io.logger
                .log(&format!("RX Profile message 0x{:02X}: invalid channel 0x{:02X}", sub, channel));
            return Outcome::Nak;
        }
        let source = match message::source_muid(frame) {
            Ok(m) => m,
            Err(_) => return Outcome::Nak,
        };
        if !registry.has_remote(source) {
            io.logger.log(&format!(
                "RX Profile message 0x{:02X} from unknown remote {}, dropping",
                sub, source
            ));
            return Outcome::Dropped;
        }

        let outcome = match sub {
            message::SUB_ID_2_PROFILE_INQUIRY => {
                self.handle_inquiry(channel, source, registry, has_sent, io)
            }
            message::SUB_ID_2_PROFILE_INQUIRY_REPLY => {
                self.handle_inquiry_reply(frame, channel, source, registry, io)
            }
            message::SUB_ID_2_PROFILE_SET_ON => self.handle_set(frame, channel, true, registry, io),
            message::SUB_ID_2_PROFILE_SET_OFF => self.handle_set(frame, channel, false, registry, io),
            message::SUB_ID_2_PROFILE_REPORT_ON => {
                self.handle_report(frame, channel, true, source, registry)
            }
            message::SUB_ID_2_PROFILE_REPORT_OFF => {
                self.handle_report(frame, channel, false, source, registry)
            }
            message::SUB_ID_2_PROFILE_SPECIFIC_DATA => self.handle_specific_data(frame, registry),
            _ => Outcome::Nak,
        };
        self.drain_egress(registry, has_sent, io);
        outcome
    }

    /// Ask a remote to enable or disable one of its profiles.
    pub fn request_set(
        &mut self,
        channel: u8,
        destination: Muid,
        id: ProfileId,
        on: bool,
        registry: &DeviceRegistry,
        has_sent: &mut bool,
        io: &mut Io,
    ) -> bool {
        let sub = if on {
            message::SUB_ID_2_PROFILE_SET_ON
        } else {
            message::SUB_ID_2_PROFILE_SET_OFF
        };
        self.send_one_profile_message(sub, channel, destination, id, registry, has_sent, io)
    }

    /// Ask a remote (or broadcast) to report its hosted profiles.
    pub fn trigger_inquiry(
        &mut self,
        channel: u8,
        destination: Muid,
        registry: &DeviceRegistry,
        has_sent: &mut bool,
        io: &mut Io,
    ) -> bool {
        let len = message::HEADER_LEN + 1;
        let mut buf = vec![0u8; len];
        message::fill_header(
            &mut buf,
            message::SUB_ID_2_PROFILE_INQUIRY,
            channel,
            0x01,
            registry.local().muid(),
            destination,
        )
        .expect("fits");
        buf[len - 1] = message::EOX;
        io.logger
            .log(&format!("TX Profile Inquiry to {} on channel {:#04x}", destination, channel));
        let ok = io.transport.send_midi(&buf);
        if ok {
            *has_sent = true;
        }
        ok
    }

    fn handle_inquiry(
        &mut self,
        channel: u8,
        destination: Muid,
        registry: &DeviceRegistry,
        has_sent: &mut bool,
        io: &mut Io,
    ) -> Outcome {
        io.logger.log(&format!(
            "RX Profile Inquiry from {} on channel {:#04x}",
            destination, channel
        ));
        if channel == PORT_CHANNEL {
            for ch in 0..16u8 {
                self.send_inquiry_reply(ch, destination, false, registry, has_sent, io);
            }
            self.send_inquiry_reply(PORT_CHANNEL, destination, true, registry, has_sent, io);
        } else {
            self.send_inquiry_reply(channel, destination, true, registry, has_sent, io);
        }
        Outcome::Handled
    }

    /// Send one Inquiry Reply for `channel`, truncating the enabled/disabled
    /// id lists to fit both [`MAX_PROFILES_PER_REPLY`] and the destination's
    /// advertised `max_sysex_size` if known (§4.8.1). Enabled profiles are
    /// kept first; disabled profiles fill whatever budget remains.
    fn send_inquiry_reply(
        &mut self,
        channel: u8,
        destination: Muid,
        always_send: bool,
        registry: &DeviceRegistry,
        has_sent: &mut bool,
        io: &mut Io,
    ) -> bool {
        let profiles = registry.local().profiles();
        if profiles.count_on_channel(channel) == 0 && !always_send {
            return true;
        }
        let mut enabled_ids = Vec::new();
        let mut disabled_ids = Vec::new();
        for state in profiles.iter() {
            if state.is_channel_enabled(channel) {
                enabled_ids.push(state.id());
            } else if state.is_channel_available(channel) {
                disabled_ids.push(state.id());
            }
        }

        let total = enabled_ids.len() + disabled_ids.len();
        let mut capacity = total.min(MAX_PROFILES_PER_REPLY);
        if let Some(remote) = registry.remote(destination) {
            let wire_capacity = (remote.max_sysex_size() as usize)
                .saturating_sub(REPLY_OVERHEAD)
                / 5;
            capacity = capacity.min(wire_capacity);
        }
        if capacity < total {
            io.logger.log(&format!(
                "TX Profile Inquiry Reply: max SysEx size restricts {} profiles to {}",
                total, capacity
            ));
        }
        let enabled_take = enabled_ids.len().min(capacity);
        let disabled_take = disabled_ids.len().min(capacity - enabled_take);
        enabled_ids.truncate(enabled_take);
        disabled_ids.truncate(disabled_take);

        let len = REPLY_OVERHEAD + enabled_ids.len() * 5 + disabled_ids.len() * 5;
        let mut buf = vec![0u8; len];
        message::fill_header(
            &mut buf,
            message::SUB_ID_2_PROFILE_INQUIRY_REPLY,
            channel,
            0x01,
            registry.local().muid(),
            destination,
        )
        .expect("fits");
        let mut idx = message::HEADER_LEN;
        wire::write_number14_lsb(&mut buf, idx, enabled_ids.len() as u16).expect("fits");
        idx += 2;
        for id in &enabled_ids {
            buf[idx..idx + 5].copy_from_slice(&id.to_bytes());
            idx += 5;
        }
        wire::write_number14_lsb(&mut buf, idx, disabled_ids.len() as u16).expect("fits");
        idx += 2;
        for id in &disabled_ids {
            buf[idx..idx + 5].copy_from_slice(&id.to_bytes());
            idx += 5;
        }
        buf[len - 1] = message::EOX;
        io.logger.log(&format!(
            "TX Profile Inquiry Reply to {} on channel {:#04x}: {} enabled, {} disabled",
            destination,
            channel,
            enabled_ids.len(),
            disabled_ids.len()
        ));
        let ok = io.transport.send_midi(&buf);
        if ok {
            *has_sent = true;
        }
        ok
    }

    fn handle_inquiry_reply(
        &mut self,
        frame: &[u8],
        channel: u8,
        source: Muid,
        registry: &mut DeviceRegistry,
        io: &mut Io,
    ) -> Outcome {
        match parse_profile_list_reply(frame) {
            Some((enabled, disabled)) => {
                io.logger.log(&format!(
                    "RX Profile Inquiry Reply from {} on channel {:#04x}: {} enabled, {} disabled",
                    source,
                    channel,
                    enabled.len(),
                    disabled.len()
                ));
                if let Some(remote) = registry.remote_mut(source) {
                    for id in enabled {
                        remote.profiles_mut().add(id, channel, true);
                    }
                    for id in disabled {
                        remote.profiles_mut().add(id, channel, false);
                    }
                }
                Outcome::Handled
            }
            None => {
                io.logger
                    .log(&format!("RX Profile Inquiry Reply from {}: malformed length", source));
                Outcome::Nak
            }
        }
    }

    fn handle_set(
        &mut self,
        frame: &[u8],
        channel: u8,
        on: bool,
        registry: &mut DeviceRegistry,
        io: &mut Io,
    ) -> Outcome {
        let id = match extract_profile_id(frame) {
            Some(id) => id,
            None => return Outcome::Nak,
        };
        if !registry.local().profiles().contains(id) {
            io.logger.log(&format!(
                "RX Set Profile {} '{}': not hosted locally",
                if on { "On" } else { "Off" },
                id
            ));
            return Outcome::Nak;
        }
        io.logger.log(&format!(
            "RX Set Profile {} '{}' on channel {:#04x}",
            if on { "On" } else { "Off" },
            id,
            channel
        ));
        registry
            .local_mut()
            .profiles_mut()
            .get_mut(id)
            .expect("just checked contains")
            .set_channel_enabled(channel, on);
        // Any resulting transition (including a veto-adjusted one) is
        // broadcast automatically by the local registry's listener — see
        // `LocalRefan` and `ProfileEngine::drain_egress`.
        Outcome::Handled
    }

    fn handle_report(
        &mut self,
        frame: &[u8],
        channel: u8,
        enabled: bool,
        source: Muid,
        registry: &mut DeviceRegistry,
    ) -> Outcome {
        let id = match extract_profile_id(frame) {
            Some(id) => id,
            None => return Outcome::Nak,
        };
        if let Some(remote) = registry.remote_mut(source) {
            remote.profiles_mut().add(id, channel, enabled);
        }
        Outcome::Handled
    }

    fn handle_specific_data(&mut self, frame: &[u8], registry: &mut DeviceRegistry) -> Outcome {
        let id = match extract_profile_id(frame) {
            Some(id) => id,
            None => return Outcome::Nak,
        };
        if !registry.local().profiles().contains(id) {
            return Outcome::Nak;
        }
        let mut idx = message::HEADER_LEN + 5;
        if idx + 4 > frame.len() {
            return Outcome::Nak;
        }
        let size = match wire::read_number28_lsb(frame, idx) {
            Ok(size) => size as usize,
            Err(_) => return Outcome::Nak,
        };
        idx += 4;
        if idx + size > frame.len() {
            return Outcome::Nak;
        }
        let data = frame[idx..idx + size].to_vec();
        registry
            .local_mut()
            .profiles_mut()
            .get_mut(id)
            .expect("just checked contains")
            .set_specific_data(data);
        Outcome::Handled
    }

    fn send_one_profile_message(
        &self,
        sub: u8,
        channel: u8,
        destination: Muid,
        id: ProfileId,
        registry: &DeviceRegistry,
        has_sent: &mut bool,
        io: &mut Io,
    ) -> bool {
        let len = message::HEADER_LEN + 5 + 1;
        let mut buf = vec![0u8; len];
        message::fill_header(&mut buf, sub, channel, 0x01, registry.local().muid(), destination)
            .expect("fits");
        buf[message::HEADER_LEN..message::HEADER_LEN + 5].copy_from_slice(&id.to_bytes());
        buf[len - 1] = message::EOX;
        let ok = io.transport.send_midi(&buf);
        if ok {
            *has_sent = true;
        }
        ok
    }

    fn send_specific_data_to(
        &self,
        id: ProfileId,
        data: &[u8],
        destination: Muid,
        registry: &DeviceRegistry,
        has_sent: &mut bool,
        io: &mut Io,
    ) -> bool {
        let len = message::HEADER_LEN + 5 + 4 + data.len() + 1;
        if let Some(remote) = registry.remote(destination) {
            if (remote.max_sysex_size() as usize) < len {
                io.logger.log(&format!(
                    "TX Profile Specific Data: '{}' ({} bytes) exceeds {}'s max SysEx size {}",
                    id,
                    data.len(),
                    destination,
                    remote.max_sysex_size()
                ));
                return false;
            }
        }
        let mut buf = vec![0u8; len];
        message::fill_header(
            &mut buf,
            message::SUB_ID_2_PROFILE_SPECIFIC_DATA,
            message::DEVICE_ID_PORT,
            0x01,
            registry.local().muid(),
            destination,
        )
        .expect("fits");
        let mut idx = message::HEADER_LEN;
        buf[idx..idx + 5].copy_from_slice(&id.to_bytes());
        idx += 5;
        wire::write_number28_lsb(&mut buf, idx, data.len() as u32).expect("fits");
        idx += 4;
        buf[idx..idx + data.len()].copy_from_slice(data);
        idx += data.len();
        buf[idx] = message::EOX;
        let ok = io.transport.send_midi(&buf);
        if ok {
            *has_sent = true;
        }
        ok
    }

    /// Flush every event queued by the local registry's listener, actually
    /// sending the corresponding Report broadcast or Specific Data push.
    fn drain_egress(&mut self, registry: &DeviceRegistry, has_sent: &mut bool, io: &mut Io) {
        let events: Vec<PendingEvent> = self.queue.borrow_mut().drain(..).collect();
        for event in events {
            match event {
                PendingEvent::Report { channel, id, enabled } => {
                    let sub = if enabled {
                        message::SUB_ID_2_PROFILE_REPORT_ON
                    } else {
                        message::SUB_ID_2_PROFILE_REPORT_OFF
                    };
                    self.send_one_profile_message(
                        sub,
                        channel,
                        crate::muid::BROADCAST,
                        id,
                        registry,
                        has_sent,
                        io,
                    );
                }
                PendingEvent::SpecificData { id, data } => {
                    let destinations: Vec<Muid> = registry.remotes().map(|r| r.muid()).collect();
                    for dest in destinations {
                        self.send_specific_data_to(id, &data, dest, registry, has_sent, io);
                    }
                }
            }
        }
    }
}

impl Default for ProfileEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_profile_id(frame: &[u8]) -> Option<ProfileId> {
    let start = message::HEADER_LEN;
    if start + 5 > frame.len() {
        return None;
    }
    ProfileId::from_slice(&frame[start..start + 5]).ok()
}

fn parse_profile_list_reply(frame: &[u8]) -> Option<(Vec<ProfileId>, Vec<ProfileId>)> {
    let mut idx = message::HEADER_LEN;
    if idx + 2 > frame.len() {
        return None;
    }
    let enabled_count = wire::read_number14_lsb(frame, idx).ok()? as usize;
    idx += 2;
    let mut enabled = Vec::with_capacity(enabled_count);
    for _ in 0..enabled_count {
        if idx + 5 > frame.len() {
            return None;
        }
        enabled.push(ProfileId::from_slice(&frame[idx..idx + 5]).ok()?);
        idx += 5;
    }
    if idx + 2 > frame.len() {
        return None;
    }
    let disabled_count = wire::read_number14_lsb(frame, idx).ok()? as usize;
    idx += 2;
    let mut disabled = Vec::with_capacity(disabled_count);
    for _ in 0..disabled_count {
        if idx + 5 > frame.len() {
            return None;
        }
        disabled.push(ProfileId::from_slice(&frame[idx..idx + 5]).ok()?);
        idx += 5;
    }
    Some((enabled, disabled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ci::device_info::DeviceInfoBuilder;
    use crate::ci::transport::{Clock, Logger, MidiTransport, NullLogger, Rng};
    use std::cell::RefCell;

    struct NoRng;
    impl Rng for NoRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
    }

    struct FixedClock;
    impl Clock for FixedClock {
        fn now_millis(&self) -> u64 {
            0
        }
    }

    struct RecordingTransport(RefCell<Vec<Vec<u8>>>);
    impl MidiTransport for RecordingTransport {
        fn send_midi(&mut self, bytes: &[u8]) -> bool {
            self.0.borrow_mut().push(bytes.to_vec());
            true
        }
    }

    fn local_device() -> DeviceRegistry {
        let info = DeviceInfoBuilder::new()
            .manufacturer_id(1)
            .max_receivable_sysex_size(256)
            .build()
            .unwrap();
        let mut registry = DeviceRegistry::new(info);
        registry.local_mut().set_muid(Muid::new(1));
        registry
    }

    fn io<'a>(transport: &'a mut dyn MidiTransport, rng: &'a mut dyn Rng, logger: &'a dyn Logger) -> Io<'a> {
        Io {
            transport,
            clock: &FixedClock,
            rng,
            logger,
        }
    }

    #[test]
    fn set_on_for_unhosted_profile_naks() {
        let mut registry = local_device();
        registry.touch_remote(Muid::new(2), 0, 128);
        let mut engine = ProfileEngine::new();
        engine.start(&mut registry);

        let id = ProfileId::standard(1, 1, 1, 0);
        let mut frame = vec![0u8; message::HEADER_LEN + 5 + 1];
        message::fill_header(
            &mut frame,
            message::SUB_ID_2_PROFILE_SET_ON,
            0,
            0x01,
            Muid::new(2),
            Muid::new(1),
        )
        .unwrap();
        frame[message::HEADER_LEN..message::HEADER_LEN + 5].copy_from_slice(&id.to_bytes());
        *frame.last_mut().unwrap() = message::EOX;

        let mut rng = NoRng;
        let logger = NullLogger;
        let mut transport = RecordingTransport(RefCell::new(Vec::new()));
        let mut has_sent = false;
        let outcome = {
            let mut call_io = io(&mut transport, &mut rng, &logger);
            engine.receive(&frame, &mut registry, &mut has_sent, &mut call_io)
        };
        assert_eq!(outcome, Outcome::Nak);
    }

    #[test]
    fn set_on_for_hosted_profile_broadcasts_report() {
        let mut registry = local_device();
        registry.touch_remote(Muid::new(2), 0, 128);
        let id = ProfileId::standard(1, 1, 1, 0);
        registry.local_mut().profiles_mut().add(id, 0, false);

        let mut engine = ProfileEngine::new();
        engine.start(&mut registry);

        let mut frame = vec![0u8; message::HEADER_LEN + 5 + 1];
        message::fill_header(
            &mut frame,
            message::SUB_ID_2_PROFILE_SET_ON,
            0,
            0x01,
            Muid::new(2),
            Muid::new(1),
        )
        .unwrap();
        frame[message::HEADER_LEN..message::HEADER_LEN + 5].copy_from_slice(&id.to_bytes());
        *frame.last_mut().unwrap() = message::EOX;

        let mut rng = NoRng;
        let logger = NullLogger;
        let mut transport = RecordingTransport(RefCell::new(Vec::new()));
        let mut has_sent = false;
        let outcome = {
            let mut call_io = io(&mut transport, &mut rng, &logger);
            engine.receive(&frame, &mut registry, &mut has_sent, &mut call_io)
        };
        assert_eq!(outcome, Outcome::Handled);
        assert!(registry.local().profiles().get(id).unwrap().is_channel_enabled(0));
        let sent = transport.0.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(message::sub_id2(&sent[0]), message::SUB_ID_2_PROFILE_REPORT_ON);
        assert_eq!(message::destination_muid(&sent[0]).unwrap(), crate::muid::BROADCAST);
    }

    #[test]
    fn inquiry_reply_truncates_to_wire_capacity() {
        let mut registry = local_device();
        registry.touch_remote(Muid::new(2), 0, 256);
        for n in 0..80u8 {
            let id = ProfileId::standard(n, 0, 0, 0);
            registry.local_mut().profiles_mut().add(id, PORT_CHANNEL, true);
        }
        let mut engine = ProfileEngine::new();
        engine.start(&mut registry);

        let mut rng = NoRng;
        let logger = NullLogger;
        let mut transport = RecordingTransport(RefCell::new(Vec::new()));
        let mut has_sent = false;
        {
            let mut call_io = io(&mut transport, &mut rng, &logger);
            engine.send_inquiry_reply(PORT_CHANNEL, Muid::new(2), true, &registry, &mut has_sent, &mut call_io);
        }
        let sent = transport.0.borrow();
        assert_eq!(sent.len(), 1);
        let enabled_count = wire::read_number14_lsb(&sent[0], message::HEADER_LEN).unwrap();
        assert_eq!(enabled_count, 47);
        assert!(sent[0].len() as u32 <= 256);
    }
}
