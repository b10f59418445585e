//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the voltage monitor, the FSM and the shared context.
//! It exposes a clean, hardware-agnostic API.  All I/O flows through
//! port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  SamplerPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!   ClockPort  ──▶ │        AppService        │
//! ActuatorPort ◀── │ Monitor · FSM · Cutoff   │
//!                  └──────────────────────────┘
//! ```

use core::time::Duration;

use log::{info, warn};

use crate::config::SystemConfig;
use crate::cutoff::{CutoffMode, CutoffPolicy};
use crate::error::Result;
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{BatMonState, Fsm};
use crate::monitor::VoltageMonitor;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, ClockPort, EventSink, SamplerPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    monitor: VoltageMonitor,
    config: SystemConfig,
    /// Mode selected since the last evaluation; applied at the start of the next.
    pending_mode: Option<CutoffMode>,
    /// Clock reading at the previous tick.
    last_tick_at: Option<Duration>,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let monitor = VoltageMonitor::new(&config);
        let ctx = FsmContext::new(CutoffPolicy::new(&config));
        let fsm = Fsm::new(build_state_table());

        Self {
            fsm,
            ctx,
            monitor,
            config,
            pending_mode: None,
            last_tick_at: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in `Uninitialised`.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        self.ctx.signals.volts = f32::NAN;
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!(
            "AppService started in {:?}, cutoff {}",
            self.fsm.current_state(),
            self.ctx.policy.mode()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Pure per-tick transition: apply any selected cutoff mode, classify
    /// `sample` over `dt` of elapsed time, advance the FSM, and return the
    /// new authoritative state.
    ///
    /// `dt` is capped at one tick period, so a stalled loop followed by a
    /// single sample only counts as one observation.
    ///
    /// No ports are involved; a test can drive the whole supervisor with a
    /// sequence of samples.
    pub fn evaluate(&mut self, sample: f32, dt: Duration) -> BatMonState {
        self.step(sample, dt).0
    }

    fn step(&mut self, sample: f32, dt: Duration) -> (BatMonState, Option<CutoffMode>) {
        let mode_from = self.apply_pending_mode();
        let dt = dt.min(self.config.tick_period());
        self.ctx.signals = self.monitor.update(sample, &self.ctx.policy, dt);
        (self.fsm.tick(&mut self.ctx), mode_from)
    }

    /// Put a mode selected since the previous tick into effect.  Returns
    /// the mode it replaced when the selection actually changed it.
    fn apply_pending_mode(&mut self) -> Option<CutoffMode> {
        let mode = self.pending_mode.take()?;
        let from = self.ctx.policy.select(mode);
        (from != mode).then(|| {
            info!("Cutoff mode {} -> {}", from, mode);
            from
        })
    }

    /// Run one full control cycle:
    /// clock → pending mode → sample → monitor → FSM → actuator.
    ///
    /// The `hw` parameter satisfies **both** [`SamplerPort`] and
    /// [`ActuatorPort`], so one mutable borrow covers both ports.
    pub fn tick(
        &mut self,
        hw: &mut (impl SamplerPort + ActuatorPort),
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> BatMonState {
        let prev_state = self.fsm.current_state();

        // 1. Elapsed time since the previous tick (nominal on the first)
        let now = clock.now();
        let dt = match self.last_tick_at {
            Some(prev) => now.saturating_sub(prev),
            None => self.config.tick_period(),
        };
        self.last_tick_at = Some(now);

        // 2. Pending mode, sample, classify, transition
        let sample = hw.read_smoothed_voltage();
        let (state, mode_from) = self.step(sample, dt);
        if let Some(from) = mode_from {
            sink.emit(&AppEvent::CutoffModeChanged {
                from,
                to: self.ctx.policy.mode(),
            });
        }

        // 3. Drive outputs every tick
        hw.apply_state(state);

        // 4. Emit state change if the FSM moved
        if state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: state,
            });
        }

        state
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (mode button, simulator script).
    pub fn handle_command(&mut self, cmd: AppCommand) -> Result<()> {
        match cmd {
            AppCommand::SetCutoffMode(mode) => {
                self.pending_mode = Some(mode);
            }
            AppCommand::CycleCutoffMode => {
                self.pending_mode = Some(self.selected_mode().next());
            }
            AppCommand::ResetCutoffMode => {
                self.pending_mode = Some(self.config.default_cutoff_mode);
            }
            AppCommand::UpdateConfig(new_config) => {
                if let Err(e) = new_config.validate() {
                    warn!("Rejected config update: {}", e);
                    return Err(e);
                }
                self.monitor.reconfigure(&new_config);
                self.ctx.policy.reconfigure(&new_config);
                self.config = new_config;
                info!("Configuration updated at runtime");
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self) -> TelemetryData {
        let as_ms = |d: Duration| d.as_millis() as u64;
        TelemetryData {
            state: self.fsm.current_state(),
            volts: self.ctx.signals.volts,
            cutoff_mode: self.ctx.policy.mode(),
            cutoff_volts: self.ctx.policy.cutoff_volts(),
            relay_on: self.ctx.commands.relay_on,
            cutoff_pending_ms: self.monitor.cutoff_pending().map(as_ms),
            recovery_pending_ms: self.monitor.recovery_pending().map(as_ms),
            ticks_in_state: self.fsm.ticks_in_current_state(),
            total_ticks: self.fsm.tick_count(),
        }
    }

    /// Current FSM state.
    pub fn state(&self) -> BatMonState {
        self.fsm.current_state()
    }

    /// Cutoff mode currently in effect.
    pub fn cutoff_mode(&self) -> CutoffMode {
        self.ctx.policy.mode()
    }

    /// Mode that will be in effect after the next tick or `evaluate`.
    pub fn selected_mode(&self) -> CutoffMode {
        self.pending_mode.unwrap_or(self.ctx.policy.mode())
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.fsm.tick_count()
    }

    /// The live configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }
}
