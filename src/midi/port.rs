use std::sync::Arc;

use super::{io, Error};

pub type PortsIn = DirectionalPorts<midir::MidiInput, midir::MidiInputConnection<()>>;
pub type PortsOut = DirectionalPorts<midir::MidiOutput, midir::MidiOutputConnection>;

/// Ports available in one direction, in enumeration order,
/// and the connection to the selected one.
pub struct DirectionalPorts<IO: midir::MidiIO, Conn> {
    list: Vec<(Arc<str>, IO::Port)>,
    cur: Option<Arc<str>>,
    midi_conn: io::DirectionalConnection<IO, Conn>,
    client_name: Arc<str>,
}

impl<IO: midir::MidiIO, Conn> DirectionalPorts<IO, Conn> {
    pub fn contains(&self, port_name: &str) -> bool {
        self.list.iter().any(|(name, _)| name.as_ref() == port_name)
    }

    /// Returns the first port whose name starts with `prefix`.
    pub fn find(&self, prefix: &str) -> Option<Arc<str>> {
        first_with_prefix(self.list.iter().map(|(name, _)| name), prefix)
    }

    fn port(&self, port_name: &Arc<str>) -> Result<IO::Port, Error> {
        self.list
            .iter()
            .find(|(name, _)| name == port_name)
            .map(|(_, port)| port.clone())
            .ok_or_else(|| Error::PortNotFound(port_name.clone()))
    }

    fn refresh_from(&mut self, conn: IO) -> Result<(), Error> {
        self.list.clear();

        for port in conn.ports().iter() {
            let name = conn.port_name(port)?;
            // Skip our own ports.
            if !name.starts_with(self.client_name.as_ref()) {
                self.list.push((name.into(), port.clone()));
            }
        }

        Ok(())
    }
}

pub fn first_with_prefix<'a>(
    mut names: impl Iterator<Item = &'a Arc<str>>,
    prefix: &str,
) -> Option<Arc<str>> {
    names.find(|name| name.starts_with(prefix)).cloned()
}

impl PortsIn {
    pub fn try_new(client_name: Arc<str>) -> Result<Self, Error> {
        Ok(Self {
            list: Vec::new(),
            cur: None,
            midi_conn: io::MidiIn::try_new(&client_name)?,
            client_name,
        })
    }

    pub fn refresh(&mut self) -> Result<(), Error> {
        let temp_conn = midir::MidiInput::new(&format!("{} refresh In ports", self.client_name))?;

        self.refresh_from(temp_conn)
    }

    pub fn connect<C>(&mut self, port_name: Arc<str>, callback: C) -> Result<(), Error>
    where
        C: FnMut(u64, &[u8], &mut ()) + Send + 'static,
    {
        let port = self.port(&port_name)?;

        self.midi_conn
            .connect(port_name.clone(), &port, &self.client_name, callback)
            .map_err(|err| {
                self.cur = None;
                err
            })?;

        log::info!("Connected for Input to {}", port_name);
        self.cur = Some(port_name);

        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.midi_conn.disconnect();

        if let Some(cur) = self.cur.take() {
            log::debug!("Disconnected Input from {}", cur);
        }
    }
}

impl PortsOut {
    pub fn try_new(client_name: Arc<str>) -> Result<Self, Error> {
        Ok(Self {
            list: Vec::new(),
            cur: None,
            midi_conn: io::MidiOut::try_new(&client_name)?,
            client_name,
        })
    }

    pub fn refresh(&mut self) -> Result<(), Error> {
        let temp_conn = midir::MidiOutput::new(&format!("{} refresh Out ports", self.client_name))?;

        self.refresh_from(temp_conn)
    }

    pub fn connect(&mut self, port_name: Arc<str>) -> Result<(), Error> {
        let port = self.port(&port_name)?;

        self.midi_conn
            .connect(port_name.clone(), &port, &self.client_name)
            .map_err(|err| {
                self.cur = None;
                err
            })?;

        log::info!("Connected for Output to {}", port_name);
        self.cur = Some(port_name);

        Ok(())
    }

    pub fn send(&mut self, msg: &[u8]) -> Result<(), Error> {
        self.midi_conn.send(msg)
    }

    pub fn disconnect(&mut self) {
        self.midi_conn.disconnect();

        if let Some(cur) = self.cur.take() {
            log::debug!("Disconnected Output from {}", cur);
        }
    }
}
