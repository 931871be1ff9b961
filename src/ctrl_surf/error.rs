use crate::midi;
use std::{sync::Arc, time::Duration};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No MIDI input port starting with {}", .0)]
    DeviceNotFound(Arc<str>),

    #[error("Device didn't report ready within {:?}", .0)]
    ReadyTimeout(Duration),

    #[error("Unknown toggle {}", .0)]
    UnknownToggle(Arc<str>),

    #[error("Unknown event kind {}", .0)]
    UnknownEventKind(Arc<str>),

    #[error("Host event channel closed")]
    ChannelClosed,

    #[error("MIDI error: {}", .0)]
    Midi(#[from] midi::Error),
}
