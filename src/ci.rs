//! MIDI Capability Inquiry (MIDI-CI): device discovery and the Profile
//! Configuration sub-protocol.
//!
//! [`Endpoint`] is the crate's entry point for a host that owns one local
//! CI-capable device: it wires a [`device_registry::DeviceRegistry`] to a
//! [`discovery::DiscoveryEngine`] and a [`profile_engine::ProfileEngine`] and
//! dispatches inbound SysEx frames between them.

pub mod device_info;
pub mod device_registry;
pub mod discovery;
pub mod listener;
pub mod message;
pub mod profile_engine;
pub mod profile_id;
pub mod profile_registry;
pub mod profile_state;
pub mod transport;

use device_registry::DeviceRegistry;
use discovery::DiscoveryEngine;
use profile_engine::ProfileEngine;
use transport::{Clock, Logger, MidiTransport, Rng};

/// The external collaborators a host supplies for one call into an
/// [`Endpoint`]. Bundled into one struct purely to keep call signatures
/// manageable — none of these are owned by the endpoint itself, since their
/// lifetimes are the host's to manage.
pub struct Io<'a> {
    /// Outbound MIDI delivery.
    pub transport: &'a mut dyn MidiTransport,
    /// Monotonic millisecond clock.
    pub clock: &'a dyn Clock,
    /// Random source for MUID generation.
    pub rng: &'a mut dyn Rng,
    /// Logging sink.
    pub logger: &'a dyn Logger,
}

/// The result of dispatching one inbound CI message to an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Fully processed; a reply may already have been sent.
    Handled,
    /// Recognized but deliberately ignored — never followed by a NAK.
    Dropped,
    /// The caller should reply with a NAK addressed to the message's source.
    Nak,
}

/// A MIDI-CI endpoint: one local device's identity and profile set, the set
/// of remotes discovered so far, and the Discovery and Profile Configuration
/// engines operating over them.
pub struct Endpoint {
    registry: DeviceRegistry,
    discovery: DiscoveryEngine,
    profiles: ProfileEngine,
    has_sent: bool,
}

impl Endpoint {
    /// Build an endpoint around a not-yet-started local device identity.
    pub fn new(local: device_info::DeviceInfo) -> Self {
        Endpoint {
            registry: DeviceRegistry::new(local),
            discovery: DiscoveryEngine::new(),
            profiles: ProfileEngine::new(),
            has_sent: false,
        }
    }

    /// The device registry (local identity plus discovered remotes).
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// The device registry, mutably — used to configure the local profile
    /// set before [`Endpoint::start`].
    pub fn registry_mut(&mut self) -> &mut DeviceRegistry {
        &mut self.registry
    }

    /// Start a session: assign a local MUID and subscribe the Profile engine
    /// to local registry events.
    pub fn start(&mut self, io: &mut Io) {
        self.has_sent = false;
        self.discovery
            .start(&mut self.registry, &mut self.has_sent, io.rng, io.logger);
        self.profiles.start(&mut self.registry);
    }

    /// End a session: unsubscribe the Profile engine, then — if any message
    /// was sent during the session — broadcast an Invalidate MUID and block
    /// briefly to let it drain onto the wire.
    pub fn stop(&mut self, io: &mut Io) {
        self.profiles.stop(&mut self.registry);
        self.discovery.stop(&self.registry, &mut self.has_sent, io);
    }

    /// Ask the discovery engine to broadcast a Discovery message.
    pub fn trigger_discovery(&mut self, io: &mut Io) -> bool {
        self.discovery
            .trigger_discovery(&self.registry, &mut self.has_sent, io)
    }

    /// Dispatch one inbound byte buffer (expected to be one complete SysEx
    /// frame). Non-CI or malformed-beyond-framing buffers are dropped
    /// silently.
    pub fn on_midi(&mut self, frame: &[u8], io: &mut Io) {
        if !message::is_midi_ci_message(frame) {
            return;
        }
        let source = match message::source_muid(frame) {
            Ok(m) => m,
            Err(_) => return,
        };
        if source != self.registry.local().muid() {
            self.registry
                .touch_remote(source, io.clock.now_millis(), device_info::MIN_MAX_SYSEX_SIZE);
        }
        let destination = match message::destination_muid(frame) {
            Ok(m) => m,
            Err(_) => return,
        };
        let local_muid = self.registry.local().muid();
        if destination != local_muid && destination != crate::muid::BROADCAST {
            return;
        }

        let sub = message::sub_id2(frame);
        let outcome = if message::is_management_message(sub) {
            self.discovery
                .receive(frame, &mut self.registry, &mut self.has_sent, io)
        } else if message::is_profile_message(sub) {
            self.profiles
                .receive(frame, &mut self.registry, &mut self.has_sent, io)
        } else {
            Outcome::Nak
        };

        if outcome == Outcome::Nak {
            self.send_nak(frame, io);
        }
    }

    fn send_nak(&mut self, frame: &[u8], io: &mut Io) {
        let source = message::source_muid(frame).unwrap_or(crate::muid::BROADCAST);
        let nak = message::build_nak(self.registry.local().muid(), source);
        io.logger.log(&format!("TX NAK to {}", source));
        if io.transport.send_midi(&nak) {
            self.has_sent = true;
        }
    }
}
