use crossbeam_channel as channel;
use std::{
    collections::HashMap,
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use super::{
    controls::{self, Control},
    event::{Change, Event, EventKind, Key, Value},
    listener::{Listener, Registry},
    Config, Error,
};
use crate::{
    bytes,
    midi::{self, Host, HostEvent, MidirHost, PortState},
};

mod button {
    use crate::midi::Tag;
    pub const TAG: Tag = Tag::from_status(0x90);
    pub const RELEASED_TAG: Tag = Tag::from_status(0x80);

    pub const ON: u8 = 127;
    pub const OFF: u8 = 0;
}

mod knob {
    use crate::midi::Tag;
    pub const TAG: Tag = Tag::from_status(0xb0);
}

/// Status, code & value.
const MSG_LEN: usize = 3;

bitflags::bitflags! {
    /// Effects of a toggle write.
    pub struct Apply: u8 {
        /// Write even if the value is unchanged.
        const FORCE  = 0b001;
        /// Update the LED if connected.
        const SEND   = 0b010;
        /// Notify listeners once initialized, if the value changed.
        const NOTIFY = 0b100;
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectionState {
    Disconnected,
    AwaitingReady,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ConnectionState::*;
        f.write_str(match self {
            Disconnected => "disconnected",
            AwaitingReady => "awaiting ready",
            Connected => "connected",
        })
    }
}

/// Akai MIDI Mix adapter.
///
/// Decodes device input into [`Event`]s and mirrors the toggles
/// of the buttons with an LED back to the device.
///
/// The adapter is driven from the thread which owns it: host events
/// are queued and handled by [`MidiMix::connect`], [`MidiMix::poll`]
/// and [`MidiMix::poll_timeout`].
pub struct MidiMix<H: Host = MidirHost> {
    config: Config,
    host: H,
    state: ConnectionState,
    is_init_done: bool,
    ports: (Option<Arc<str>>, Option<Arc<str>>),

    toggles: Vec<(Control, bool)>,
    levels: HashMap<&'static str, f64>,
    listeners: Registry,

    events_tx: channel::Sender<HostEvent>,
    events_rx: channel::Receiver<HostEvent>,
}

impl MidiMix<MidirHost> {
    pub fn new(config: Config) -> Self {
        let host = MidirHost::new(config.client_name.clone());
        Self::with_host(host, config)
    }
}

impl<H: Host> MidiMix<H> {
    pub fn with_host(host: H, config: Config) -> Self {
        let (events_tx, events_rx) = channel::unbounded();

        Self {
            config,
            host,
            state: ConnectionState::Disconnected,
            is_init_done: false,
            ports: (None, None),

            toggles: controls::lightable().map(|ctrl| (ctrl, false)).collect(),
            levels: HashMap::new(),
            listeners: Registry::default(),

            events_tx,
            events_rx,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Names of the input & output ports in use.
    pub fn port_names(&self) -> (Option<&str>, Option<&str>) {
        (self.ports.0.as_deref(), self.ports.1.as_deref())
    }
}

/// Connection.
impl<H: Host> MidiMix<H> {
    /// Connects to the first ports matching the configured prefix.
    ///
    /// Blocks until the device reports ready, which might never happen.
    /// See [`MidiMix::connect_timeout`] for a bounded wait.
    pub fn connect(&mut self) -> Result<(), Error> {
        self.open()?;
        self.wait_ready(None)
    }

    /// Same as [`MidiMix::connect`], giving up after `timeout`.
    pub fn connect_timeout(&mut self, timeout: Duration) -> Result<(), Error> {
        self.open()?;
        self.wait_ready(Some(timeout))
    }

    fn open(&mut self) -> Result<(), Error> {
        if self.state != ConnectionState::Disconnected {
            self.disconnect();
        }

        self.host.request_access()?;

        let prefix = self.config.port_prefix.clone();
        let input = match self.host.find_input(&prefix)? {
            Some(input) => input,
            None => {
                let err = Error::DeviceNotFound(prefix);
                log::error!("{err}");
                return Err(err);
            }
        };

        let output = self.host.find_output(&prefix)?;
        if output.is_none() {
            log::warn!("No MIDI output port starting with {prefix}: LEDs won't be updated");
        }

        self.host.open_input(input.clone(), self.events_tx.clone())?;
        if let Some(ref output) = output {
            if let Err(err) = self.host.open_output(output.clone()) {
                self.host.close();
                return Err(err.into());
            }
        }

        log::debug!("Waiting for {input} to be ready");
        self.ports = (Some(input), output);
        self.state = ConnectionState::AwaitingReady;

        Ok(())
    }

    fn wait_ready(&mut self, timeout: Option<Duration>) -> Result<(), Error> {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);

        while self.state != ConnectionState::Connected {
            let event = match deadline {
                None => self.events_rx.recv().map_err(|_| Error::ChannelClosed)?,
                Some(deadline) => match self.events_rx.recv_deadline(deadline) {
                    Ok(event) => event,
                    Err(channel::RecvTimeoutError::Timeout) => {
                        let err = Error::ReadyTimeout(timeout.unwrap_or_default());
                        log::error!("{err}");
                        self.release();
                        return Err(err);
                    }
                    Err(channel::RecvTimeoutError::Disconnected) => {
                        return Err(Error::ChannelClosed)
                    }
                },
            };

            self.handle_host_event(event);
        }

        // LEDs state can't be read from the device: switch them all off.
        self.sync_leds(Apply::FORCE | Apply::SEND);
        self.is_init_done = true;

        if let Some(ref input) = self.ports.0 {
            log::info!("Connected to {input}");
        }

        Ok(())
    }

    /// Switches the LEDs off and releases the ports.
    ///
    /// Toggles read `false` afterwards.
    pub fn disconnect(&mut self) {
        self.sync_leds(Apply::SEND | Apply::NOTIFY);
        self.release();
    }

    /// Disconnects and drops all listeners.
    pub fn destroy(mut self) {
        self.disconnect();
        self.listeners.clear();
    }

    fn release(&mut self) {
        self.host.close();

        // Discard what was posted by the released ports.
        while self.events_rx.try_recv().is_ok() {}

        if let Some(input) = self.ports.0.take() {
            log::info!("Disconnected from {input}");
        }
        self.ports.1 = None;
        self.state = ConnectionState::Disconnected;
        self.is_init_done = false;
    }

    /// Sets all toggles to `false`.
    fn sync_leds(&mut self, apply: Apply) {
        for idx in 0..self.toggles.len() {
            self.apply_at(idx, false, apply);
        }
    }
}

/// Toggles.
impl<H: Host> MidiMix<H> {
    pub fn toggle(&self, name: &str) -> Result<bool, Error> {
        Ok(self.toggles[self.toggle_idx(name)?].1)
    }

    pub fn set_toggle(&mut self, name: &str, value: bool) -> Result<(), Error> {
        self.apply_toggle(name, value, Apply::SEND | Apply::NOTIFY)
    }

    pub fn apply_toggle(&mut self, name: &str, value: bool, apply: Apply) -> Result<(), Error> {
        let idx = self.toggle_idx(name)?;
        self.apply_at(idx, value, apply);

        Ok(())
    }

    pub fn toggles(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.toggles.iter().map(|(ctrl, value)| (ctrl.name, *value))
    }

    fn toggle_idx(&self, name: &str) -> Result<usize, Error> {
        self.toggles
            .iter()
            .position(|(ctrl, _)| ctrl.name == name)
            .ok_or_else(|| Error::UnknownToggle(name.into()))
    }

    fn apply_at(&mut self, idx: usize, value: bool, apply: Apply) {
        let (ctrl, prev) = self.toggles[idx];
        if prev == value && !apply.contains(Apply::FORCE) {
            return;
        }

        self.toggles[idx].1 = value;

        if apply.contains(Apply::SEND) && self.is_connected() {
            let velocity = if value { button::ON } else { button::OFF };
            let msg = [button::TAG | midi::Channel::default(), ctrl.code, velocity];
            if let Err(err) = self.host.send(&msg) {
                log::error!("Couldn't update {} LED: {err}", ctrl.name);
            }
        }

        if apply.contains(Apply::NOTIFY) && self.is_init_done && prev != value {
            self.listeners.dispatch(&Event::ControlChange(Change {
                control: ctrl.name,
                code: ctrl.code,
                value: Value::Toggle(value),
                prev: Some(Value::Toggle(prev)),
            }));
        }
    }
}

/// Knobs & faders.
impl<H: Host> MidiMix<H> {
    /// Last normalized value received for this knob or fader.
    pub fn level(&self, name: &str) -> Option<f64> {
        self.levels.get(name).copied()
    }
}

/// Listeners.
impl<H: Host> MidiMix<H> {
    pub fn add_listener(&mut self, kind: EventKind, listener: Listener) {
        self.listeners.add(kind, listener);
    }

    /// Registers `f` and returns the handle needed to remove it.
    pub fn listen<F>(&mut self, kind: EventKind, f: F) -> Listener
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(f);
        self.listeners.add(kind, listener.clone());

        listener
    }

    pub fn remove_listener(&mut self, kind: EventKind, listener: &Listener) -> bool {
        self.listeners.remove(kind, listener)
    }
}

/// Host events.
impl<H: Host> MidiMix<H> {
    /// Handles all pending host events, returning how many were handled.
    pub fn poll(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_host_event(event);
            count += 1;
        }

        count
    }

    /// Waits up to `timeout` for a host event, then handles all pending events.
    pub fn poll_timeout(&mut self, timeout: Duration) -> usize {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_host_event(event);
                1 + self.poll()
            }
            Err(_) => 0,
        }
    }

    /// Asks the host to check whether the device was unplugged or plugged back.
    pub fn watch_ports(&mut self) -> Result<(), Error> {
        if self.state != ConnectionState::Disconnected {
            self.host.check_ports()?;
        }

        Ok(())
    }

    pub fn handle_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Msg(msg) => self.handle_msg(msg.inner()),
            HostEvent::StateChange(state) => self.port_state_changed(state),
        }
    }

    fn port_state_changed(&mut self, port_state: PortState) {
        use ConnectionState::*;

        log::debug!("Port state {port_state:?} while {}", self.state);

        match (self.state, port_state) {
            (AwaitingReady, PortState::Connected) => {
                self.state = Connected;
                if self.is_init_done {
                    log::info!("Device is back");
                    // The device restarted with its LEDs off.
                    self.sync_leds(Apply::FORCE | Apply::SEND | Apply::NOTIFY);
                }
            }
            (Connected, PortState::Disconnected) => {
                log::warn!("Device is gone");
                self.state = AwaitingReady;
            }
            _ => (),
        }
    }

    /// Handles a MIDI message from the device.
    pub fn handle_msg(&mut self, buf: &[u8]) {
        if buf.len() > MSG_LEN {
            self.handle_sysex(buf);
            return;
        }

        let (status, code, value) = match *buf {
            [status, code, value] => (status, code, value),
            _ => {
                log::debug!("Ignoring short msg {}", bytes::Displayable::from(buf));
                return;
            }
        };

        let chan = midi::Channel::from_status(status);
        if chan != midi::Channel::default() {
            log::trace!("Accepting msg on channel {}", u8::from(chan) + 1);
        }

        match midi::Tag::from_status(status) {
            knob::TAG => self.knob_moved(code, value),
            button::TAG => self.button(code, Event::KeyDown),
            button::RELEASED_TAG => self.button(code, Event::KeyUp),
            _ => log::debug!("Ignoring msg {}", bytes::Displayable::from(buf)),
        }
    }

    fn knob_moved(&mut self, code: u8, value: u8) {
        let control = match controls::cc_name(code) {
            Some(control) => control,
            None => {
                log::debug!("Ignoring unknown control change {code}");
                return;
            }
        };

        let level = midi::normalized::from_u7(value);
        let prev = self.levels.insert(control, level).map(Value::Level);

        self.listeners.dispatch(&Event::ControlChange(Change {
            control,
            code,
            value: Value::Level(level),
            prev,
        }));
    }

    fn button(&self, code: u8, event: fn(Key) -> Event) {
        let control = match controls::button_name(code) {
            Some(control) => control,
            None => {
                log::debug!("Ignoring unknown button {code}");
                return;
            }
        };

        let key = Key {
            control,
            display_name: controls::display_name(control),
            code,
        };

        self.listeners.dispatch(&event(key));
    }

    fn handle_sysex(&self, buf: &[u8]) {
        let msg = midi::Msg::from(buf);
        let payload = match msg.sysex_payload() {
            Ok(payload) => payload,
            Err(err) => {
                log::debug!("Ignoring long msg: {err}");
                return;
            }
        };

        // manufacturer, device, model, msg id, size msb, size lsb, data
        match payload.get(3) {
            Some(msg_id) => log::debug!(
                "Sysex msg {msg_id:#04x} received: {:#}",
                bytes::Displayable::from(payload.get(6..).unwrap_or_default()),
            ),
            None => log::debug!("Sysex msg received: {}", msg.display()),
        }
    }
}

impl<H: Host> Drop for MidiMix<H> {
    fn drop(&mut self) {
        if self.state != ConnectionState::Disconnected {
            self.disconnect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::mock::MockHost;
    use std::sync::Mutex;

    type Events = Arc<Mutex<Vec<Event>>>;

    fn record(mix: &mut MidiMix<MockHost>, kind: EventKind) -> Events {
        let events = Events::default();
        let events_cb = Arc::clone(&events);
        mix.listen(kind, move |evt| events_cb.lock().unwrap().push(evt.clone()));

        events
    }

    fn connected() -> MidiMix<MockHost> {
        let mut mix = MidiMix::with_host(MockHost::midi_mix(), Config::default());
        mix.connect().unwrap();
        mix.host_mut().sent.clear();

        mix
    }

    #[test]
    fn connect_resets_leds() {
        let mut mix = MidiMix::with_host(MockHost::midi_mix(), Config::default());
        mix.set_toggle("m3", true).unwrap();
        assert!(!mix.is_connected());
        assert!(mix.host().sent.is_empty());

        mix.connect().unwrap();

        assert!(mix.is_connected());
        assert!(mix.host().access_requested);
        assert_eq!(mix.port_names(), (Some("MIDI Mix 24:0"), Some("MIDI Mix 24:0")));
        assert!(mix.toggles().all(|(_, value)| !value));

        let sent = &mix.host().sent;
        assert_eq!(sent.len(), 18);
        for ctrl in controls::lightable() {
            assert!(sent.contains(&vec![0x90, ctrl.code, 0]));
        }
        // solo has no LED
        assert!(!sent.contains(&vec![0x90, 27, 0]));
    }

    #[test]
    fn device_not_found() {
        let mut host = MockHost::midi_mix();
        host.inputs.clear();
        let mut mix = MidiMix::with_host(host, Config::default());

        assert!(matches!(mix.connect(), Err(Error::DeviceNotFound(_))));
        assert_eq!(mix.connection_state(), ConnectionState::Disconnected);

        mix.set_toggle("r1", true).unwrap();
        assert!(mix.toggle("r1").unwrap());
        assert!(mix.host().sent.is_empty());
    }

    #[test]
    fn ready_timeout() {
        let mut host = MockHost::midi_mix();
        host.ready_on_open = false;
        let mut mix = MidiMix::with_host(host, Config::default());

        assert!(matches!(
            mix.connect_timeout(Duration::from_millis(20)),
            Err(Error::ReadyTimeout(_)),
        ));
        assert_eq!(mix.connection_state(), ConnectionState::Disconnected);
        assert_eq!(mix.host().close_count, 1);
    }

    #[test]
    fn msgs_handled_while_awaiting_ready() {
        let mut host = MockHost::midi_mix();
        host.pending.push(HostEvent::Msg([0xb0, 62, 127].into()));
        let mut mix = MidiMix::with_host(host, Config::default());
        let changes = record(&mut mix, EventKind::ControlChange);

        mix.connect().unwrap();

        assert_eq!(mix.level("master"), Some(1f64));
        // LED reset during connection isn't notified
        assert_eq!(changes.lock().unwrap().len(), 1);
    }

    #[test]
    fn input_only_device() {
        let mut host = MockHost::midi_mix();
        host.outputs.clear();
        let mut mix = MidiMix::with_host(host, Config::default());

        mix.connect().unwrap();
        assert!(mix.is_connected());
        assert_eq!(mix.port_names().1, None);

        // Send failures are logged, the state is kept.
        mix.set_toggle("m1", true).unwrap();
        assert!(mix.toggle("m1").unwrap());
    }

    #[test]
    fn set_toggle_round_trip() {
        let mut mix = connected();

        for ctrl in controls::lightable() {
            mix.set_toggle(ctrl.name, true).unwrap();
            assert!(mix.toggle(ctrl.name).unwrap());
        }
    }

    #[test]
    fn redundant_write_sends_once() {
        let mut mix = connected();
        let changes = record(&mut mix, EventKind::ControlChange);

        mix.set_toggle("r5", true).unwrap();
        mix.set_toggle("r5", true).unwrap();

        assert_eq!(mix.host().sent, [vec![0x90, 15, 127]]);
        assert_eq!(
            *changes.lock().unwrap(),
            [Event::ControlChange(Change {
                control: "r5",
                code: 15,
                value: Value::Toggle(true),
                prev: Some(Value::Toggle(false)),
            })],
        );

        mix.set_toggle("r5", false).unwrap();
        assert_eq!(mix.host().sent.last(), Some(&vec![0x90, 15, 0]));
        assert_eq!(changes.lock().unwrap().len(), 2);
    }

    #[test]
    fn unknown_toggles() {
        let mut mix = connected();

        assert!(matches!(mix.toggle("solo"), Err(Error::UnknownToggle(_))));
        assert!(matches!(
            mix.set_toggle("solo", true),
            Err(Error::UnknownToggle(_)),
        ));
        assert!(matches!(
            mix.set_toggle("c1", true),
            Err(Error::UnknownToggle(_)),
        ));
        assert!(mix.host().sent.is_empty());
    }

    #[test]
    fn apply_toggle_effects() {
        let mut mix = connected();
        let changes = record(&mut mix, EventKind::ControlChange);

        mix.apply_toggle("m2", true, Apply::empty()).unwrap();
        assert!(mix.toggle("m2").unwrap());
        assert!(mix.host().sent.is_empty());
        assert!(changes.lock().unwrap().is_empty());

        mix.apply_toggle("m2", true, Apply::SEND).unwrap();
        assert!(mix.host().sent.is_empty());

        mix.apply_toggle("m2", true, Apply::FORCE | Apply::SEND | Apply::NOTIFY).unwrap();
        assert_eq!(mix.host().sent, [vec![0x90, 4, 127]]);
        // unchanged value
        assert!(changes.lock().unwrap().is_empty());
    }

    #[test]
    fn knob_moved() {
        let mut mix = connected();
        let changes = record(&mut mix, EventKind::ControlChange);

        assert_eq!(mix.level("c1"), None);

        mix.handle_msg(&[176, 16, 64]);
        assert_eq!(mix.level("c1"), Some(0.503937));

        mix.handle_msg(&[176, 16, 0]);
        assert_eq!(mix.level("c1"), Some(0f64));

        assert_eq!(
            *changes.lock().unwrap(),
            [
                Event::ControlChange(Change {
                    control: "c1",
                    code: 16,
                    value: Value::Level(0.503937),
                    prev: None,
                }),
                Event::ControlChange(Change {
                    control: "c1",
                    code: 16,
                    value: Value::Level(0f64),
                    prev: Some(Value::Level(0.503937)),
                }),
            ],
        );
        assert!(mix.host().sent.is_empty());
    }

    #[test]
    fn button_press_leaves_toggles_alone() {
        let mut mix = connected();
        let downs = record(&mut mix, EventKind::KeyDown);
        let ups = record(&mut mix, EventKind::KeyUp);

        mix.handle_msg(&[144, 1, 127]);
        mix.handle_msg(&[128, 1, 127]);

        assert_eq!(
            *downs.lock().unwrap(),
            [Event::KeyDown(Key {
                control: "m1",
                display_name: "m1",
                code: 1,
            })],
        );
        assert_eq!(ups.lock().unwrap()[0].control(), "m1");
        assert!(!mix.toggle("m1").unwrap());
        assert!(mix.host().sent.is_empty());
    }

    #[test]
    fn any_channel_is_accepted() {
        let mut mix = connected();
        let downs = record(&mut mix, EventKind::KeyDown);
        let ups = record(&mut mix, EventKind::KeyUp);
        let changes = record(&mut mix, EventKind::ControlChange);

        mix.handle_msg(&[0x93, 1, 127]);
        mix.handle_msg(&[0x8f, 1, 0]);
        mix.handle_msg(&[0xb5, 19, 127]);

        assert_eq!(downs.lock().unwrap()[0].control(), "m1");
        assert_eq!(ups.lock().unwrap()[0].control(), "m1");
        assert_eq!(changes.lock().unwrap()[0].control(), "s1");
    }

    #[test]
    fn display_names_for_bank_and_solo() {
        let mut mix = connected();
        let downs = record(&mut mix, EventKind::KeyDown);

        mix.handle_msg(&[0x90, 25, 127]);
        mix.handle_msg(&[0x90, 26, 127]);
        mix.handle_msg(&[0x90, 27, 127]);

        let display_names = downs
            .lock()
            .unwrap()
            .iter()
            .map(|evt| match evt {
                Event::KeyDown(key) => key.display_name,
                _ => unreachable!(),
            })
            .collect::<Vec<_>>();
        assert_eq!(display_names, ["BankLeft", "BankRight", "Solo"]);
    }

    #[test]
    fn ignored_msgs() {
        let mut mix = connected();
        let all = [EventKind::KeyDown, EventKind::KeyUp, EventKind::ControlChange]
            .map(|kind| record(&mut mix, kind));

        // sysex
        mix.handle_msg(&[0xf0, 0x47, 0x00, 0x31, 0x62, 0x00, 0x01, 0x05, 0xf7]);
        // oversized, not even a sysex
        mix.handle_msg(&[0xb0, 16, 64, 0]);
        // short
        mix.handle_msg(&[0xb0, 16]);
        // unknown codes
        mix.handle_msg(&[0xb0, 0, 64]);
        mix.handle_msg(&[0x90, 100, 127]);
        // pitch bend
        mix.handle_msg(&[0xe0, 0, 64]);

        assert!(all.iter().all(|events| events.lock().unwrap().is_empty()));
        assert_eq!(mix.level("c1"), None);
        assert!(mix.toggles().all(|(_, value)| !value));
    }

    #[test]
    fn host_events_are_polled() {
        let mut mix = connected();
        let downs = record(&mut mix, EventKind::KeyDown);

        mix.host().post(HostEvent::Msg([0x90, 3, 127].into()));
        mix.host().post(HostEvent::Msg([0x90, 6, 127].into()));

        assert_eq!(mix.poll(), 2);
        assert_eq!(downs.lock().unwrap().len(), 2);
        assert_eq!(mix.poll_timeout(Duration::from_millis(1)), 0);
    }

    #[test]
    fn unplug_and_plug_back() {
        let mut mix = connected();
        let changes = record(&mut mix, EventKind::ControlChange);
        mix.set_toggle("r8", true).unwrap();
        mix.host_mut().sent.clear();

        mix.host().post_state(PortState::Disconnected);
        mix.poll();
        assert_eq!(mix.connection_state(), ConnectionState::AwaitingReady);

        // Not sent while the device is away.
        mix.set_toggle("m8", true).unwrap();
        assert!(mix.host().sent.is_empty());

        mix.host().post_state(PortState::Connected);
        mix.poll();
        assert!(mix.is_connected());

        assert_eq!(mix.host().sent.len(), 18);
        assert!(mix.toggles().all(|(_, value)| !value));
        // r8 on, m8 on, then both reset
        assert_eq!(changes.lock().unwrap().len(), 4);
    }

    #[test]
    fn disconnect_switches_leds_off() {
        let mut mix = connected();
        mix.set_toggle("bank_left", true).unwrap();
        let changes = record(&mut mix, EventKind::ControlChange);
        mix.host_mut().sent.clear();

        mix.disconnect();

        assert_eq!(mix.host().sent, [vec![0x90, 25, 0]]);
        assert_eq!(changes.lock().unwrap().len(), 1);
        assert!(!mix.toggle("bank_left").unwrap());
        assert!(!mix.is_connected());
        assert_eq!(mix.port_names(), (None, None));
        assert_eq!(mix.host().close_count, 1);

        // No more hardware writes nor notifications.
        mix.set_toggle("bank_left", true).unwrap();
        assert_eq!(mix.host().sent.len(), 1);
        assert_eq!(changes.lock().unwrap().len(), 1);

        // Can connect again.
        mix.connect().unwrap();
        assert!(mix.is_connected());
        assert!(!mix.toggle("bank_left").unwrap());
    }

    #[test]
    fn destroy_releases_listeners() {
        let mut mix = connected();
        let calls = Arc::new(Mutex::new(0));
        let calls_cb = Arc::clone(&calls);
        let listener = mix.listen(EventKind::KeyDown, move |_| *calls_cb.lock().unwrap() += 1);

        mix.handle_msg(&[0x90, 1, 127]);
        assert_eq!(*calls.lock().unwrap(), 1);

        mix.destroy();

        assert_eq!(Arc::strong_count(&listener), 1);
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn removed_listener_not_called() {
        let mut mix = connected();
        let calls = Arc::new(Mutex::new(0));
        let calls_cb = Arc::clone(&calls);
        let listener = mix.listen(EventKind::KeyUp, move |_| *calls_cb.lock().unwrap() += 1);

        assert!(!mix.remove_listener(EventKind::KeyDown, &listener));
        assert!(mix.remove_listener(EventKind::KeyUp, &listener));

        mix.handle_msg(&[0x80, 1, 0]);
        assert_eq!(*calls.lock().unwrap(), 0);
    }
}
