use crossbeam_channel as channel;
use std::sync::Arc;

use super::{Error, Host, HostEvent, PortState};

/// In-memory [`Host`] recording what goes to the device.
#[derive(Default)]
pub struct MockHost {
    pub inputs: Vec<Arc<str>>,
    pub outputs: Vec<Arc<str>>,
    /// Posted on `open_input`, before the readiness notification.
    pub pending: Vec<HostEvent>,
    pub ready_on_open: bool,

    pub access_requested: bool,
    pub input: Option<Arc<str>>,
    pub output: Option<Arc<str>>,
    pub events: Option<channel::Sender<HostEvent>>,
    pub sent: Vec<Vec<u8>>,
    pub close_count: usize,
}

impl MockHost {
    pub fn midi_mix() -> Self {
        Self {
            inputs: vec!["Midi Through Port-0".into(), "MIDI Mix 24:0".into()],
            outputs: vec!["Midi Through Port-0".into(), "MIDI Mix 24:0".into()],
            ready_on_open: true,
            ..Default::default()
        }
    }

    pub fn post(&self, event: HostEvent) {
        if let Some(ref events) = self.events {
            events.send(event).unwrap();
        }
    }

    pub fn post_state(&self, state: PortState) {
        self.post(HostEvent::StateChange(state));
    }
}

impl Host for MockHost {
    fn request_access(&mut self) -> Result<(), Error> {
        self.access_requested = true;
        Ok(())
    }

    fn find_input(&mut self, prefix: &str) -> Result<Option<Arc<str>>, Error> {
        Ok(super::port::first_with_prefix(self.inputs.iter(), prefix))
    }

    fn find_output(&mut self, prefix: &str) -> Result<Option<Arc<str>>, Error> {
        Ok(super::port::first_with_prefix(self.outputs.iter(), prefix))
    }

    fn open_input(
        &mut self,
        port_name: Arc<str>,
        events: channel::Sender<HostEvent>,
    ) -> Result<(), Error> {
        for event in self.pending.drain(..) {
            events.send(event).unwrap();
        }

        if self.ready_on_open {
            events
                .send(HostEvent::StateChange(PortState::Connected))
                .unwrap();
        }

        self.input = Some(port_name);
        self.events = Some(events);

        Ok(())
    }

    fn open_output(&mut self, port_name: Arc<str>) -> Result<(), Error> {
        self.output = Some(port_name);
        Ok(())
    }

    fn send(&mut self, msg: &[u8]) -> Result<(), Error> {
        if self.output.is_none() {
            return Err(Error::NotConnected);
        }

        self.sent.push(msg.to_vec());
        Ok(())
    }

    fn close(&mut self) {
        self.input = None;
        self.output = None;
        self.events = None;
        self.close_count += 1;
    }
}
