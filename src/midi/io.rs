use std::sync::Arc;

use super::Error;

pub type MidiIn = DirectionalConnection<midir::MidiInput, midir::MidiInputConnection<()>>;
pub type MidiOut = DirectionalConnection<midir::MidiOutput, midir::MidiOutputConnection>;

/// A `midir` client, either idle or consumed by an open connection.
pub enum DirectionalConnection<IO: midir::MidiIO, C> {
    Connected(C),
    Disconnected(IO),
    None,
}

impl<IO: midir::MidiIO, C> Default for DirectionalConnection<IO, C> {
    fn default() -> Self {
        Self::None
    }
}

impl<IO: midir::MidiIO, C> DirectionalConnection<IO, C> {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

impl MidiIn {
    pub fn try_new(client_name: &str) -> Result<Self, Error> {
        let mut midi_input = midir::MidiInput::new(client_name)?;
        // Let sysex, timing & active sensing msgs through.
        midi_input.ignore(midir::Ignore::None);

        Ok(Self::Disconnected(midi_input))
    }

    pub fn connect<C>(
        &mut self,
        port_name: Arc<str>,
        port: &midir::MidiInputPort,
        client_port_name: &str,
        callback: C,
    ) -> Result<(), Error>
    where
        C: FnMut(u64, &[u8], &mut ()) + Send + 'static,
    {
        self.disconnect();
        match std::mem::take(self) {
            Self::Disconnected(midi_input) => {
                match midi_input.connect(port, client_port_name, callback, ()) {
                    Ok(conn) => {
                        *self = Self::Connected(conn);
                    }
                    Err(err) => {
                        *self = Self::Disconnected(err.into_inner());
                        let err = Error::Connection(port_name);
                        log::error!("{err}");
                        return Err(err);
                    }
                }
            }
            other => {
                *self = other;
                return Err(Error::NoAccess);
            }
        }

        Ok(())
    }

    pub fn disconnect(&mut self) {
        if !self.is_connected() {
            return;
        }

        if let Self::Connected(conn) = std::mem::take(self) {
            let (midi_input, ()) = conn.close();
            *self = Self::Disconnected(midi_input);
        }
    }
}

impl MidiOut {
    pub fn try_new(client_name: &str) -> Result<Self, Error> {
        Ok(Self::Disconnected(midir::MidiOutput::new(client_name)?))
    }

    pub fn connect(
        &mut self,
        port_name: Arc<str>,
        port: &midir::MidiOutputPort,
        client_port_name: &str,
    ) -> Result<(), Error> {
        self.disconnect();
        match std::mem::take(self) {
            Self::Disconnected(midi_output) => match midi_output.connect(port, client_port_name) {
                Ok(conn) => {
                    *self = Self::Connected(conn);
                }
                Err(err) => {
                    *self = Self::Disconnected(err.into_inner());
                    let err = Error::Connection(port_name);
                    log::error!("{err}");
                    return Err(err);
                }
            },
            other => {
                *self = other;
                return Err(Error::NoAccess);
            }
        }

        Ok(())
    }

    pub fn send(&mut self, msg: &[u8]) -> Result<(), Error> {
        match self {
            Self::Connected(conn) => {
                conn.send(msg).map_err(|err| {
                    log::error!(
                        "Failed to send MIDI msg {}: {err}",
                        crate::bytes::Displayable::from(msg)
                    );
                    err
                })?;
            }
            _ => {
                log::warn!("Attempt to send a msg, but MIDI Out is not connected");
                return Err(Error::NotConnected);
            }
        }

        Ok(())
    }

    pub fn disconnect(&mut self) {
        if !self.is_connected() {
            return;
        }

        if let Self::Connected(conn) = std::mem::take(self) {
            *self = Self::Disconnected(conn.close());
        }
    }
}
