use std::sync::Arc;

pub mod controls;
pub use controls::{Control, CONTINUOUS, DISCRETE};

pub mod error;
pub use error::Error;

pub mod event;
pub use event::{Event, EventKind, Value};

pub mod listener;
pub use listener::Listener;

pub mod midi_mix;
pub use midi_mix::{Apply, ConnectionState, MidiMix};

pub const DEFAULT_CLIENT_NAME: &str = "midi-mix-controller";
pub const DEFAULT_PORT_PREFIX: &str = "MIDI Mix";

#[derive(Clone, Debug)]
pub struct Config {
    /// Name of our MIDI client, also used to skip our own ports.
    pub client_name: Arc<str>,
    /// Device ports are the first ones whose name starts with this.
    pub port_prefix: Arc<str>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_name: DEFAULT_CLIENT_NAME.into(),
            port_prefix: DEFAULT_PORT_PREFIX.into(),
        }
    }
}
