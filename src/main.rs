use clap::Parser;
use crossbeam_channel as channel;
use std::time::{Duration, Instant};

use midi_mix_controller::ctrl_surf::{self, controls, Config, Event, EventKind, MidiMix};

/// Logs Akai MIDI Mix events and toggles the LED of the pressed buttons.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Connect to the first ports whose name starts with this.
    #[arg(long, default_value = ctrl_surf::DEFAULT_PORT_PREFIX)]
    port_prefix: String,

    /// Name of our MIDI client.
    #[arg(long, default_value = ctrl_surf::DEFAULT_CLIENT_NAME)]
    client_name: String,

    /// Give up if the device isn't ready after this many seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Log filters, e.g. `info` or `midi_mix_controller=trace`.
    #[arg(long, default_value = "debug")]
    log_level: String,

    /// Interval between two checks for unplugged / plugged back device.
    #[arg(long, default_value_t = 500)]
    watch_interval_ms: u64,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_filters(&cli.log_level)
        .init();

    match run(cli) {
        Ok(()) => log::info!("Exiting"),
        Err(err) => {
            log::error!("Error: {}", err);
            for source in err.chain().skip(1) {
                log::error!("\t{}", source)
            }
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config {
        client_name: cli.client_name.into(),
        port_prefix: cli.port_prefix.into(),
    };

    let mut mix = MidiMix::new(config);

    let (pressed_tx, pressed_rx) = channel::unbounded();
    mix.listen(EventKind::KeyDown, move |event| {
        log::info!("{event}");
        if let Event::KeyDown(key) = event {
            let _ = pressed_tx.send(key.control);
        }
    });
    mix.listen(EventKind::KeyUp, |event| log::info!("{event}"));
    mix.listen(EventKind::ControlChange, |event| log::info!("{event}"));

    match cli.timeout {
        Some(secs) => mix.connect_timeout(Duration::from_secs(secs))?,
        None => mix.connect()?,
    }

    let mut port_check = Every::new(Duration::from_millis(cli.watch_interval_ms), Instant::now());
    loop {
        mix.poll_timeout(port_check.remaining(Instant::now()));

        for control in pressed_rx.try_iter() {
            if controls::is_lightable(control) {
                let is_lit = mix.toggle(control)?;
                mix.set_toggle(control, !is_lit)?;
            }
        }

        if port_check.is_due(Instant::now()) {
            mix.watch_ports()?;
        }
    }
}

/// Fires at most once per `interval`, whatever the rate of incoming msgs.
struct Every {
    interval: Duration,
    last: Instant,
}

impl Every {
    fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last: now,
        }
    }

    fn remaining(&self, now: Instant) -> Duration {
        self.interval.saturating_sub(now.saturating_duration_since(self.last))
    }

    fn is_due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) < self.interval {
            return false;
        }

        self.last = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(500);

    #[test]
    fn port_check_ignores_msg_rate() {
        let start = Instant::now();
        let mut port_check = Every::new(INTERVAL, start);

        // a fader sending a msg every 5ms
        let checks = (1..=150)
            .map(|i| start + Duration::from_millis(5 * i))
            .filter(|&now| port_check.is_due(now))
            .count();

        assert_eq!(checks, 1);
    }

    #[test]
    fn port_check_wait() {
        let start = Instant::now();
        let mut port_check = Every::new(INTERVAL, start);

        assert_eq!(port_check.remaining(start), INTERVAL);
        assert_eq!(
            port_check.remaining(start + Duration::from_millis(200)),
            Duration::from_millis(300),
        );
        assert_eq!(port_check.remaining(start + INTERVAL * 2), Duration::ZERO);

        assert!(port_check.is_due(start + INTERVAL));
        assert_eq!(port_check.remaining(start + INTERVAL), INTERVAL);
    }
}
