//! batmon-sim — host simulator for the battery supervisor.
//!
//! Replays a voltage profile through the same adapters the firmware uses,
//! one control tick per profile tick, and logs what the supervisor does.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ Profile ──▶ SimHardware (ADC · relay · LEDs · button)     │
//! │                 │                                         │
//! │   HardwareAdapter (Sampler+Actuator)   LogEventSink       │
//! │   ButtonDriver                         SimClock/System    │
//! │                                                           │
//! │  ──────────────── Port Trait Boundary ─────────────────   │
//! │                                                           │
//! │   ┌───────────────────────────────────────────────────┐   │
//! │   │        AppService (Monitor · FSM · Cutoff)        │   │
//! │   └───────────────────────────────────────────────────┘   │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `batmon-sim [--config <file.json>] [--realtime] [--json] [<profile>]`
//!
//! The profile is read from stdin when no path is given.  `RUST_LOG`
//! controls verbosity (default `info`).
#![deny(unused_must_use)]

use std::io::Read;
use std::time::Duration;
use std::{env, fs, io, thread};

use anyhow::{Context, Result, bail};
use log::info;

use batmon::adapters::log_sink::LogEventSink;
use batmon::adapters::sim::{Profile, SimAdapter, SimButton, SimHardware, Step};
use batmon::adapters::time::{SimClock, SystemClock};
use batmon::app::commands::AppCommand;
use batmon::app::events::AppEvent;
use batmon::app::ports::{ClockPort, EventSink};
use batmon::drivers::button::ButtonDriver;
use batmon::{AppService, SystemConfig};

// ── Command line ──────────────────────────────────────────────

#[derive(Debug, Default)]
struct Args {
    config: Option<String>,
    profile: Option<String>,
    realtime: bool,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut it = env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => {
                args.config = Some(it.next().context("--config needs a file path")?);
            }
            "--realtime" => args.realtime = true,
            "--json" => args.json = true,
            "-h" | "--help" => {
                println!(
                    "usage: batmon-sim [--config <file.json>] [--realtime] [--json] [<profile>]"
                );
                std::process::exit(0);
            }
            flag if flag.starts_with('-') => bail!("unknown option '{flag}'"),
            path => {
                if args.profile.replace(path.to_owned()).is_some() {
                    bail!("only one profile may be given");
                }
            }
        }
    }
    Ok(args)
}

fn load_config(path: Option<&str>) -> Result<SystemConfig> {
    let Some(path) = path else {
        return Ok(SystemConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
    let config = SystemConfig::from_json(&text).with_context(|| format!("loading config {path}"))?;
    info!("Config loaded from {path}");
    Ok(config)
}

fn load_profile(path: Option<&str>) -> Result<Profile> {
    let text = match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading profile {path}"))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading profile from stdin")?;
            buf
        }
    };
    Ok(Profile::parse(&text)?)
}

// ── Clock ─────────────────────────────────────────────────────

/// Simulated time runs as fast as the host allows; real time sleeps
/// between ticks.
enum Clock {
    Sim(SimClock),
    Real(SystemClock),
}

impl Clock {
    fn wait(&self, period: Duration) {
        match self {
            Self::Sim(c) => c.advance(period),
            Self::Real(_) => thread::sleep(period),
        }
    }
}

impl ClockPort for Clock {
    fn now(&self) -> Duration {
        match self {
            Self::Sim(c) => c.now(),
            Self::Real(c) => c.now(),
        }
    }
}

// ── Simulator ─────────────────────────────────────────────────

struct Simulator {
    app: AppService,
    board: SimHardware,
    adapter: SimAdapter,
    button: ButtonDriver<SimButton>,
    clock: Clock,
    sink: LogEventSink,
    period: Duration,
    telemetry_every: u64,
}

impl Simulator {
    fn run_step(&mut self, step: Step) -> Result<()> {
        match step {
            Step::Voltage { volts, ticks } => {
                self.board.set_volts(volts);
                for _ in 0..ticks {
                    self.tick()?;
                }
            }
            Step::Mode(mode) => {
                info!("SIM   | select {mode}");
                self.app.handle_command(AppCommand::SetCutoffMode(mode))?;
            }
            Step::Press { ticks } => {
                self.board.set_button(true);
                for _ in 0..ticks {
                    self.tick()?;
                }
                // One more tick so the driver sees the release.
                self.board.set_button(false);
                self.tick()?;
            }
        }
        Ok(())
    }

    fn tick(&mut self) -> Result<()> {
        if let Some(gesture) = self.button.poll(self.clock.now()) {
            info!("BTN   | {gesture:?}");
            self.app.handle_command(gesture.command())?;
        }

        self.app.tick(&mut self.adapter, &self.clock, &mut self.sink);

        if self.telemetry_every > 0 && self.app.tick_count() % self.telemetry_every == 0 {
            self.report();
        }

        self.clock.wait(self.period);
        Ok(())
    }

    fn report(&mut self) {
        let telemetry = self.app.build_telemetry();
        self.sink.emit(&AppEvent::Telemetry(telemetry));
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let config = load_config(args.config.as_deref())?;
    let profile = load_profile(args.profile.as_deref())?;

    info!(
        "BatMon simulator v{} | {} steps, {} ticks at {} Hz",
        env!("CARGO_PKG_VERSION"),
        profile.steps().len(),
        profile.total_ticks(),
        config.loop_freq_hz
    );

    let board = SimHardware::new();
    let mut sim = Simulator {
        adapter: board.adapter(&config),
        button: board.button(),
        board,
        clock: if args.realtime {
            Clock::Real(SystemClock::new())
        } else {
            Clock::Sim(SimClock::new())
        },
        sink: if args.json {
            LogEventSink::json()
        } else {
            LogEventSink::new()
        },
        period: config.tick_period(),
        telemetry_every: config.telemetry_interval_ticks(),
        app: AppService::new(config),
    };

    sim.app.start(&mut sim.sink);
    for &step in profile.steps() {
        sim.run_step(step)?;
    }
    sim.report();

    info!(
        "Done: {} after {} ticks | relay {} | {} sensor faults, {} actuator faults",
        sim.app.state(),
        sim.app.tick_count(),
        if sim.board.relay_closed() { "closed" } else { "open" },
        sim.adapter.sensor_faults(),
        sim.adapter.actuator_faults()
    );
    Ok(())
}
