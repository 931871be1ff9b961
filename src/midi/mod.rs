mod error;
pub use error::Error;

pub mod host;
pub use host::{Host, HostEvent, MidirHost, PortState};

mod io;

#[cfg(test)]
pub(crate) mod mock;

pub mod msg;
pub use msg::Msg;

pub mod port;
pub use port::{PortsIn, PortsOut};

/// Status byte without the channel nibble.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tag(u8);

impl Tag {
    pub const fn from_status(byte: u8) -> Self {
        Self(byte & 0xf0)
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> u8 {
        tag.0
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Channel(u8);

impl Channel {
    pub const fn from_status(byte: u8) -> Self {
        Self(byte & 0x0f)
    }
}

impl From<Channel> for u8 {
    fn from(chan: Channel) -> u8 {
        chan.0
    }
}

impl std::ops::BitOr<Channel> for Tag {
    type Output = u8;

    fn bitor(self, chan: Channel) -> Self::Output {
        self.0 | chan.0
    }
}

pub mod sysex {
    pub const TAG: u8 = 0xf0;
    pub const END_TAG: u8 = 0xf7;
}

pub mod normalized {
    pub const U7_MAX: u8 = 0x7f;
    pub const DECIMALS: i32 = 6;

    /// Maps a 7 bits value to `[0, 1]`, rounded to [`DECIMALS`].
    #[inline]
    pub fn from_u7(val: u8) -> f64 {
        round(f64::from(val.min(U7_MAX)) / f64::from(U7_MAX), DECIMALS)
    }

    #[inline]
    pub fn round(val: f64, decimals: i32) -> f64 {
        let factor = 10f64.powi(decimals);
        (val * factor).round() / factor
    }
}
