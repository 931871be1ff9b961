use std::{borrow::Cow, fmt};

/// Hex rendering of a byte slice for log & error messages.
///
/// The alternate form (`{:#}`) omits the `(hex): ` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Displayable<'a>(Cow<'a, [u8]>);

impl<'a> From<&'a [u8]> for Displayable<'a> {
    fn from(buf: &'a [u8]) -> Self {
        Self(Cow::Borrowed(buf))
    }
}

impl<'a> Displayable<'a> {
    pub fn into_owned(self) -> Displayable<'static> {
        Displayable(Cow::Owned(self.0.into_owned()))
    }
}

impl<'a> fmt::Display for Displayable<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.0.iter();

        let first = match iter.next() {
            Some(first) => first,
            None => return Ok(()),
        };

        if !f.alternate() {
            f.write_str("(hex): ")?;
        }
        write!(f, "{first:02x}")?;

        for val in iter {
            write!(f, ", {val:02x}")?;
        }

        Ok(())
    }
}
