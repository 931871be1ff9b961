pub mod bytes;

pub mod ctrl_surf;
pub use ctrl_surf::MidiMix;

pub mod midi;
