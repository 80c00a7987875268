#![deny(missing_docs)]
//! A MIDI-CI endpoint core (device discovery, MUID collision handling, the
//! Profile Configuration sub-protocol) and a Universal MIDI Packet core
//! (bit-exact codec plus a bidirectional MIDI 1.0 / UMP translator) for
//! building MIDI 2.0 capable software in Rust.

pub mod ci;
pub mod convert;
pub mod error;
pub mod message;
pub mod muid;
pub mod packet;
pub mod translator;
pub mod wire;
