use crossbeam_channel as channel;
use std::sync::Arc;

use super::{Error, Msg, PortsIn, PortsOut};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PortState {
    Connected,
    Disconnected,
}

/// Notifications posted by the host MIDI subsystem.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    Msg(Msg),
    StateChange(PortState),
}

/// The platform MIDI subsystem, as seen by a device adapter.
///
/// Inbound messages and port state changes are posted to the `Sender`
/// handed over to [`Host::open_input`]. A `StateChange(Connected)`
/// must be posted once the input port is actually usable.
pub trait Host {
    /// Sets up the MIDI clients, with sysex delivery enabled.
    fn request_access(&mut self) -> Result<(), Error>;

    fn find_input(&mut self, prefix: &str) -> Result<Option<Arc<str>>, Error>;
    fn find_output(&mut self, prefix: &str) -> Result<Option<Arc<str>>, Error>;

    fn open_input(
        &mut self,
        port_name: Arc<str>,
        events: channel::Sender<HostEvent>,
    ) -> Result<(), Error>;
    fn open_output(&mut self, port_name: Arc<str>) -> Result<(), Error>;

    fn send(&mut self, msg: &[u8]) -> Result<(), Error>;

    /// Unsubscribes from the input and releases both ports.
    fn close(&mut self);

    /// Re-enumerates ports, posting state changes for the opened input.
    fn check_ports(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

/// Ports which can be released & reopened while watching the device.
trait WatchedPorts {
    fn release(&mut self);
    fn reopen(&mut self, watched: &Watched) -> Result<(), Error>;
}

impl WatchedPorts for (&mut PortsIn, &mut PortsOut) {
    fn release(&mut self) {
        self.0.disconnect();
        self.1.disconnect();
    }

    fn reopen(&mut self, watched: &Watched) -> Result<(), Error> {
        self.0.connect(watched.input.clone(), MidirHost::forwarder(watched.events.clone()))?;

        if let Some(ref output) = watched.output {
            self.1.refresh()?;
            self.1.connect(output.clone())?;
        }

        Ok(())
    }
}

struct Watched {
    input: Arc<str>,
    output: Option<Arc<str>>,
    events: channel::Sender<HostEvent>,
    is_present: bool,
}

impl Watched {
    /// Follows the presence of the input port, posting a state change
    /// when it vanishes or once it could be reopened.
    fn track(&mut self, is_present: bool, ports: &mut impl WatchedPorts) {
        match (self.is_present, is_present) {
            (true, false) => {
                log::warn!("MIDI port {} is gone", self.input);

                ports.release();
                self.is_present = false;
                let _ = self.events.send(HostEvent::StateChange(PortState::Disconnected));
            }
            (false, true) => match ports.reopen(self) {
                Ok(()) => {
                    log::info!("MIDI port {} is back", self.input);

                    self.is_present = true;
                    let _ = self.events.send(HostEvent::StateChange(PortState::Connected));
                }
                Err(err) => log::warn!("Couldn't reopen {}: {err}", self.input),
            },
            _ => (),
        }
    }
}

/// [`Host`] implementation backed by `midir`.
pub struct MidirHost {
    client_name: Arc<str>,
    ins: Option<PortsIn>,
    outs: Option<PortsOut>,
    watched: Option<Watched>,
}

impl MidirHost {
    pub fn new(client_name: Arc<str>) -> Self {
        Self {
            client_name,
            ins: None,
            outs: None,
            watched: None,
        }
    }

    fn forwarder(
        events: channel::Sender<HostEvent>,
    ) -> impl FnMut(u64, &[u8], &mut ()) + Send + 'static {
        move |_ts, buf, _| {
            let _ = events.send(HostEvent::Msg(buf.into()));
        }
    }

}

impl Host for MidirHost {
    fn request_access(&mut self) -> Result<(), Error> {
        if self.ins.is_none() {
            self.ins = Some(PortsIn::try_new(self.client_name.clone())?);
        }

        if self.outs.is_none() {
            self.outs = Some(PortsOut::try_new(self.client_name.clone())?);
        }

        Ok(())
    }

    fn find_input(&mut self, prefix: &str) -> Result<Option<Arc<str>>, Error> {
        let ins = self.ins.as_mut().ok_or(Error::NoAccess)?;
        ins.refresh()?;

        Ok(ins.find(prefix))
    }

    fn find_output(&mut self, prefix: &str) -> Result<Option<Arc<str>>, Error> {
        let outs = self.outs.as_mut().ok_or(Error::NoAccess)?;
        outs.refresh()?;

        Ok(outs.find(prefix))
    }

    fn open_input(
        &mut self,
        port_name: Arc<str>,
        events: channel::Sender<HostEvent>,
    ) -> Result<(), Error> {
        let ins = self.ins.as_mut().ok_or(Error::NoAccess)?;
        ins.connect(port_name.clone(), Self::forwarder(events.clone()))?;

        // midir only returns once the port is open.
        let _ = events.send(HostEvent::StateChange(PortState::Connected));

        self.watched = Some(Watched {
            input: port_name,
            output: None,
            events,
            is_present: true,
        });

        Ok(())
    }

    fn open_output(&mut self, port_name: Arc<str>) -> Result<(), Error> {
        let outs = self.outs.as_mut().ok_or(Error::NoAccess)?;
        outs.connect(port_name.clone())?;

        if let Some(ref mut watched) = self.watched {
            watched.output = Some(port_name);
        }

        Ok(())
    }

    fn send(&mut self, msg: &[u8]) -> Result<(), Error> {
        self.outs.as_mut().ok_or(Error::NotConnected)?.send(msg)
    }

    fn close(&mut self) {
        self.watched = None;

        if let Some(ref mut ins) = self.ins {
            ins.disconnect();
        }

        if let Some(ref mut outs) = self.outs {
            outs.disconnect();
        }
    }

    fn check_ports(&mut self) -> Result<(), Error> {
        let (watched, ins, outs) = match (&mut self.watched, &mut self.ins, &mut self.outs) {
            (Some(watched), Some(ins), Some(outs)) => (watched, ins, outs),
            _ => return Ok(()),
        };

        ins.refresh()?;
        let is_present = ins.contains(&watched.input);
        watched.track(is_present, &mut (ins, outs));

        Ok(())
    }
}
