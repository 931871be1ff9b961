use super::{sysex, Error};
use crate::bytes;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Msg(Box<[u8]>);

impl Msg {
    pub fn inner(&self) -> &[u8] {
        self.0.as_ref()
    }

    pub fn display(&self) -> bytes::Displayable {
        bytes::Displayable::from(self.0.as_ref())
    }

    /// Returns the bytes between the sysex start & end tags.
    pub fn sysex_payload(&self) -> Result<&[u8], Error> {
        let (first, last) = match (self.0.first(), self.0.last()) {
            (Some(first), Some(last)) if self.0.len() >= 3 => (*first, *last),
            _ => return Err(Error::InvalidSysExSize(self.display().into_owned())),
        };

        if first != sysex::TAG {
            return Err(Error::InvalidSysExInitTag(self.display().into_owned()));
        }

        if last != sysex::END_TAG {
            return Err(Error::InvalidSysExFinalTag(self.display().into_owned()));
        }

        Ok(&self.0[1..self.0.len() - 1])
    }
}

impl<const S: usize> From<[u8; S]> for Msg {
    fn from(buf: [u8; S]) -> Self {
        Self(buf.into())
    }
}

impl From<&[u8]> for Msg {
    fn from(buf: &[u8]) -> Self {
        Self(buf.into())
    }
}
