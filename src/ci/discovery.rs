//! The Discovery sub-protocol: MUID assignment, collision resolution, and
//! peer address-book maintenance.

use std::time::Duration;

use super::device_info;
use super::device_registry::DeviceRegistry;
use super::message;
use super::transport::{Logger, Rng};
use super::{Io, Outcome};
use crate::muid::Muid;
use crate::wire;

/// Runs the Discovery sub-protocol for one local device: MUID lifecycle,
/// collision handling, and learning remote identities.
///
/// Holds only the "has a message ever been transmitted this session" flag's
/// complement of bookkeeping that the Discovery messages themselves need;
/// the flag is owned by the caller ([`super::Endpoint`]) since any engine's
/// send can set it (see §4.6/§4.7.2).
pub struct DiscoveryEngine {
    _private: (),
}

impl DiscoveryEngine {
    /// A fresh engine. Call [`DiscoveryEngine::start`] before using it.
    pub fn new() -> Self {
        DiscoveryEngine { _private: () }
    }

    /// Assign a local MUID, excluding any value already in use by a known
    /// remote.
    pub fn start(
        &mut self,
        registry: &mut DeviceRegistry,
        has_sent: &mut bool,
        rng: &mut dyn Rng,
        logger: &dyn Logger,
    ) {
        *has_sent = false;
        let muid = Self::random_candidate_excluding(registry, rng);
        registry.local_mut().set_muid(muid);
        logger.log(&format!("local MUID assigned: {}", muid));
    }

    /// If any message was sent this session, broadcast an Invalidate MUID
    /// naming the local MUID, then block for the drain window before the
    /// transport is torn down.
    pub fn stop(&mut self, registry: &DeviceRegistry, has_sent: &mut bool, io: &mut Io) {
        if *has_sent {
            let local_muid = registry.local().muid();
            let frame = message::build_invalidate_muid(local_muid, local_muid);
            io.logger
                .log(&format!("TX InvalidateMUID (broadcast): {}", local_muid));
            if io.transport.send_midi(&frame) {
                *has_sent = true;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    /// Broadcast a Discovery request.
    pub fn trigger_discovery(
        &mut self,
        registry: &DeviceRegistry,
        has_sent: &mut bool,
        io: &mut Io,
    ) -> bool {
        self.send_discovery(None, registry, has_sent, io)
    }

    /// Handle one inbound management-range message. Returns [`Outcome::Nak`]
    /// (via the catch-all) only for sub-id-2 values inside the management
    /// range this engine does not recognize; length and collision handling
    /// are otherwise self-contained.
    pub fn receive(
        &mut self,
        frame: &[u8],
        registry: &mut DeviceRegistry,
        has_sent: &mut bool,
        io: &mut Io,
    ) -> Outcome {
        let sub = message::sub_id2(frame);
        let source = match message::source_muid(frame) {
            Ok(m) => m,
            Err(_) => return Outcome::Nak,
        };
        let local_muid = registry.local().muid();

        if source == local_muid {
            if sub != message::SUB_ID_2_DISCOVERY {
                io.logger
                    .log("RX: management message echoed from our own MUID, dropping");
                return Outcome::Dropped;
            }
            let had_transmitted = *has_sent;
            io.logger.log(&format!(
                "RX Discovery: MUID collision on {} ({})",
                local_muid,
                if had_transmitted {
                    "already engaged in I/O, invalidating and suppressing reply"
                } else {
                    "not yet engaged in I/O, silently rotating"
                }
            ));
            self.generate_new_random_muid(true, registry, has_sent, io);
            if had_transmitted {
                return Outcome::Handled;
            }
            // Not yet transmitted: fall through and process the same
            // Discovery message again, now that we no longer collide.
        }

        match sub {
            message::SUB_ID_2_DISCOVERY => {
                self.handle_discovery(frame, false, registry, has_sent, io)
            }
            message::SUB_ID_2_DISCOVERY_REPLY => {
                self.handle_discovery(frame, true, registry, has_sent, io)
            }
            message::SUB_ID_2_INVALIDATE_MUID => {
                self.handle_invalidate_muid(frame, registry, has_sent, io)
            }
            message::SUB_ID_2_NAK => {
                io.logger.log("RX NAK (ignored)");
                Outcome::Handled
            }
            _ => Outcome::Nak,
        }
    }

    /// Rotate to a new MUID. If `can_send_invalidate` and a message has been
    /// sent this session, broadcasts an Invalidate MUID naming the *old*
    /// value first. Always resets `has_sent` to `false` afterward.
    fn generate_new_random_muid(
        &mut self,
        can_send_invalidate: bool,
        registry: &mut DeviceRegistry,
        has_sent: &mut bool,
        io: &mut Io,
    ) {
        let old_muid = registry.local().muid();
        let new_muid = Self::random_candidate_excluding(registry, io.rng);
        registry.local_mut().set_muid(new_muid);
        io.logger.log(&format!("generated new local MUID: {}", new_muid));
        if can_send_invalidate && *has_sent {
            let frame = message::build_invalidate_muid(new_muid, old_muid);
            io.logger
                .log(&format!("TX InvalidateMUID (broadcast): {}", old_muid));
            if io.transport.send_midi(&frame) {
                *has_sent = true;
            }
        }
        *has_sent = false;
    }

    fn handle_discovery(
        &mut self,
        frame: &[u8],
        is_reply: bool,
        registry: &mut DeviceRegistry,
        has_sent: &mut bool,
        io: &mut Io,
    ) -> Outcome {
        if frame.len() < message::DISCOVERY_SIZE {
            io.logger.log("RX corrupt Discovery: too short");
            return Outcome::Nak;
        }
        let source = message::source_muid(frame).expect("length checked above");
        let mut idx = message::OFFSET_PAYLOAD;
        let manufacturer_id = wire::read_number24_msb(frame, idx).expect("length checked above");
        idx += 3;
        let family_id = wire::read_number16_lsb(frame, idx).expect("length checked above");
        idx += 2;
        let model_id = wire::read_number16_lsb(frame, idx).expect("length checked above");
        idx += 2;
        let version_id = wire::read_number32_lsb(frame, idx).expect("length checked above");
        idx += 4;
        let categories = frame[idx];
        idx += 1;
        let max_sysex_size = wire::read_number28_lsb(frame, idx).expect("length checked above");
        let now = io.clock.now_millis();
        let info = device_info::from_discovery_fields(
            source,
            manufacturer_id,
            family_id as u16,
            model_id as u16,
            version_id,
            categories,
            max_sysex_size,
            now,
        );
        registry.upsert_remote(info);
        io.logger.log(&format!(
            "RX Discovery{} from {}",
            if is_reply { " Reply" } else { "" },
            source
        ));
        if !is_reply {
            self.send_discovery(Some(source), registry, has_sent, io);
        }
        Outcome::Handled
    }

    fn handle_invalidate_muid(
        &mut self,
        frame: &[u8],
        registry: &mut DeviceRegistry,
        has_sent: &mut bool,
        io: &mut Io,
    ) -> Outcome {
        if frame.len() < message::INVALIDATE_MUID_SIZE {
            io.logger.log("RX corrupt InvalidateMUID: too short");
            return Outcome::Nak;
        }
        let target = message::invalidate_muid_target(frame).expect("length checked above");
        if target == registry.local().muid() {
            io.logger
                .log(&format!("RX InvalidateMUID: our MUID {} was invalidated", target));
            self.generate_new_random_muid(false, registry, has_sent, io);
        } else {
            io.logger.log(&format!("RX InvalidateMUID: {}", target));
            registry.remove_remote(target);
        }
        Outcome::Handled
    }

    fn send_discovery(
        &mut self,
        destination: Option<Muid>,
        registry: &DeviceRegistry,
        has_sent: &mut bool,
        io: &mut Io,
    ) -> bool {
        let local = registry.local();
        if !local.is_valid() {
            io.logger
                .log("ERROR: cannot send Discovery: local device info is not valid");
            return false;
        }
        let is_reply = destination.is_some();
        let dest = destination.unwrap_or(crate::muid::BROADCAST);
        let mut buf = vec![0u8; message::DISCOVERY_SIZE];
        message::fill_header(
            &mut buf,
            if is_reply {
                message::SUB_ID_2_DISCOVERY_REPLY
            } else {
                message::SUB_ID_2_DISCOVERY
            },
            message::DEVICE_ID_PORT,
            0x01,
            local.muid(),
            dest,
        )
        .expect("DISCOVERY_SIZE always fits the header");
        let mut idx = message::OFFSET_PAYLOAD;
        wire::write_number24_msb(&mut buf, idx, local.manufacturer_id()).expect("fits");
        idx += 3;
        wire::write_number16_lsb(&mut buf, idx, local.family_id()).expect("fits");
        idx += 2;
        wire::write_number16_lsb(&mut buf, idx, local.model_id()).expect("fits");
        idx += 2;
        wire::write_number32_lsb(&mut buf, idx, local.version_id()).expect("fits");
        idx += 4;
        buf[idx] = local.categories_supported();
        idx += 1;
        wire::write_number28_lsb(&mut buf, idx, local.max_sysex_size()).expect("fits");
        buf[message::DISCOVERY_SIZE - 1] = message::EOX;
        io.logger.log(&format!(
            "TX Discovery{} to {}",
            if is_reply { " Reply" } else { "" },
            dest
        ));
        let ok = io.transport.send_midi(&buf);
        if ok {
            *has_sent = true;
        }
        ok
    }

    fn random_candidate_excluding(registry: &DeviceRegistry, rng: &mut dyn Rng) -> Muid {
        loop {
            let candidate = crate::muid::random_candidate(rng);
            if !registry.has_local_or_remote_muid(candidate) {
                return candidate;
            }
        }
    }
}

impl Default for DiscoveryEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ci::device_info::DeviceInfoBuilder;
    use crate::ci::transport::{Logger, MidiTransport, NullLogger, Rng};
    use std::cell::RefCell;

    struct SeqRng(RefCell<Vec<u32>>);
    impl Rng for SeqRng {
        fn next_u32(&mut self) -> u32 {
            self.0.borrow_mut().remove(0)
        }
    }

    struct FixedClock(u64);
    impl super::super::transport::Clock for FixedClock {
        fn now_millis(&self) -> u64 {
            self.0
        }
    }

    struct RecordingTransport(RefCell<Vec<Vec<u8>>>);
    impl MidiTransport for RecordingTransport {
        fn send_midi(&mut self, bytes: &[u8]) -> bool {
            self.0.borrow_mut().push(bytes.to_vec());
            true
        }
    }

    fn local_info() -> crate::ci::device_info::DeviceInfo {
        DeviceInfoBuilder::new()
            .manufacturer_id(0x06_08_0D)
            .max_receivable_sysex_size(256)
            .build()
            .unwrap()
    }

    #[test]
    fn start_assigns_non_colliding_muid() {
        let mut registry = DeviceRegistry::new(local_info());
        let mut engine = DiscoveryEngine::new();
        let mut rng = SeqRng(RefCell::new(vec![5]));
        let mut has_sent = true;
        let logger = NullLogger;
        engine.start(&mut registry, &mut has_sent, &mut rng, &logger);
        assert_eq!(registry.local().muid().value(), 5);
        assert!(!has_sent);
    }

    #[test]
    fn discovery_reply_is_recorded_as_remote() {
        let mut registry = DeviceRegistry::new(local_info());
        registry.local_mut().set_muid(Muid::new(1));
        let mut engine = DiscoveryEngine::new();
        let mut has_sent = false;
        let mut rng = SeqRng(RefCell::new(vec![]));
        let clock = FixedClock(123);
        let logger = NullLogger;
        let mut transport = RecordingTransport(RefCell::new(Vec::new()));

        // Build a Discovery frame addressed to us (broadcast) from MUID 99.
        let mut frame = vec![0u8; message::DISCOVERY_SIZE];
        message::fill_header(
            &mut frame,
            message::SUB_ID_2_DISCOVERY,
            message::DEVICE_ID_PORT,
            0x01,
            Muid::new(99),
            crate::muid::BROADCAST,
        )
        .unwrap();
        wire::write_number24_msb(&mut frame, message::OFFSET_PAYLOAD, 0x06_08_0D).unwrap();
        frame[message::DISCOVERY_SIZE - 1] = message::EOX;
        let remote_discovery = frame;

        {
            let mut io = Io {
                transport: &mut transport,
                clock: &clock,
                rng: &mut rng,
                logger: &logger,
            };
            let outcome = engine.receive(&remote_discovery, &mut registry, &mut has_sent, &mut io);
            assert_eq!(outcome, Outcome::Handled);
        }
        assert!(registry.has_remote(Muid::new(99)));
        assert_eq!(transport.0.borrow().len(), 1); // the Discovery Reply
    }
}
