use std::{fmt, str::FromStr};

use super::Error;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EventKind {
    KeyDown,
    KeyUp,
    ControlChange,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::KeyDown => "key-down",
            EventKind::KeyUp => "key-up",
            EventKind::ControlChange => "control-change",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "key-down" => Ok(EventKind::KeyDown),
            "key-up" => Ok(EventKind::KeyUp),
            "control-change" => Ok(EventKind::ControlChange),
            other => Err(Error::UnknownEventKind(other.into())),
        }
    }
}

/// A control value: normalized level for knobs & faders, LED state for buttons.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Level(f64),
    Toggle(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Level(level) => write!(f, "{level}"),
            Value::Toggle(true) => f.write_str("on"),
            Value::Toggle(false) => f.write_str("off"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Key {
    pub control: &'static str,
    pub display_name: &'static str,
    pub code: u8,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Change {
    pub control: &'static str,
    pub code: u8,
    pub value: Value,
    /// `None` if the control didn't report a value yet.
    pub prev: Option<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    KeyDown(Key),
    KeyUp(Key),
    ControlChange(Change),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::KeyDown(_) => EventKind::KeyDown,
            Event::KeyUp(_) => EventKind::KeyUp,
            Event::ControlChange(_) => EventKind::ControlChange,
        }
    }

    pub fn control(&self) -> &'static str {
        match self {
            Event::KeyDown(key) | Event::KeyUp(key) => key.control,
            Event::ControlChange(change) => change.control,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Event::KeyDown(key) | Event::KeyUp(key) => key.code,
            Event::ControlChange(change) => change.code,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::KeyDown(key) | Event::KeyUp(key) => {
                write!(f, "{} {} ({})", self.kind(), key.display_name, key.code)
            }
            Event::ControlChange(change) => {
                write!(
                    f,
                    "{} {} ({}): {}",
                    self.kind(),
                    change.control,
                    change.code,
                    change.value,
                )?;

                match change.prev {
                    Some(prev) => write!(f, " (prev. {prev})"),
                    None => Ok(()),
                }
            }
        }
    }
}
