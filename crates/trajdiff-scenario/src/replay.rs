//! Offline replay of a logged trace through the control schedule.

use serde::Serialize;
use tracing::{debug, info, instrument};
use trajdiff_io::TraceTable;

use crate::actor::{Location, VehicleControl};
use crate::error::ScenarioError;
use crate::log::{KinematicSample, MetricsLog};
use crate::schedule::{ControlSchedule, LightState, TrafficLightRule};

const VELOCITY: &[&str] = &["velocity", "speed"];
const TIME_STEP: &[&str] = &["time_step", "dt"];

/// One actor's logged motion, ready to be replayed.
///
/// Velocity and time step are required. Position, heading and acceleration
/// are carried through to the metrics log when present and default to zero
/// otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayTrace {
    actor_type: String,
    sumo_id: String,
    velocities: Vec<f64>,
    time_steps: Vec<f64>,
    loc_x: Vec<f64>,
    loc_y: Vec<f64>,
    heading: Vec<f64>,
    acc_x: Vec<f64>,
    acc_y: Vec<f64>,
}

impl ReplayTrace {
    /// Trace with only velocities and tick lengths.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ScenarioError::LengthMismatch`] | The two slices differ in length |
    /// | [`ScenarioError::InvalidSample`] | A velocity is not finite, or a time step is negative or not finite |
    pub fn new(
        actor_type: impl Into<String>,
        velocities: Vec<f64>,
        time_steps: Vec<f64>,
    ) -> Result<Self, ScenarioError> {
        if velocities.len() != time_steps.len() {
            return Err(ScenarioError::LengthMismatch {
                velocities: velocities.len(),
                steps: time_steps.len(),
            });
        }
        if let Some(step) = velocities.iter().position(|v| !v.is_finite()) {
            return Err(ScenarioError::InvalidSample {
                step,
                reason: "velocity is not finite",
            });
        }
        if let Some(step) = time_steps.iter().position(|dt| !dt.is_finite() || *dt < 0.0) {
            return Err(ScenarioError::InvalidSample {
                step,
                reason: "time step is negative or not finite",
            });
        }
        let n = velocities.len();
        let actor_type = actor_type.into();
        Ok(Self {
            sumo_id: actor_type.clone(),
            actor_type,
            velocities,
            time_steps,
            loc_x: vec![0.0; n],
            loc_y: vec![0.0; n],
            heading: vec![0.0; n],
            acc_x: vec![0.0; n],
            acc_y: vec![0.0; n],
        })
    }

    /// Read a trace from a metrics log table, already filtered to one actor.
    ///
    /// # Errors
    ///
    /// Any [`trajdiff_io::IoError`] from reading the velocity or time step
    /// columns, or an optional column that is present but malformed, wrapped
    /// in [`ScenarioError::Io`]; plus the errors of [`ReplayTrace::new`].
    pub fn from_table(table: &TraceTable, actor_type: impl Into<String>) -> Result<Self, ScenarioError> {
        let velocities = table.column(VELOCITY)?;
        let time_steps = table.column(TIME_STEP)?;
        let mut trace = Self::new(actor_type, velocities, time_steps)?;

        let optional = |aliases: &[&str], slot: &mut Vec<f64>| -> Result<(), ScenarioError> {
            if table.find_column(aliases).is_some() {
                *slot = table.column(aliases)?;
            }
            Ok(())
        };
        optional(&["loc_x", "x"], &mut trace.loc_x)?;
        optional(&["loc_y", "y"], &mut trace.loc_y)?;
        optional(&["heading"], &mut trace.heading)?;
        optional(&["acc_x"], &mut trace.acc_x)?;
        optional(&["acc_y"], &mut trace.acc_y)?;
        Ok(trace)
    }

    /// Set the traffic simulator id written to the metrics log.
    #[must_use]
    pub fn with_sumo_id(mut self, sumo_id: impl Into<String>) -> Self {
        self.sumo_id = sumo_id.into();
        self
    }

    /// Number of ticks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.velocities.len()
    }

    /// Return true if the trace has no ticks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.velocities.is_empty()
    }
}

/// The schedule switched stage at a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transition {
    /// Zero-based tick.
    pub step: usize,
    /// Elapsed time at the end of the tick, seconds.
    pub time: f64,
    /// Travelled distance at the end of the tick, metres.
    pub distance: f64,
    /// Index of the stage now active.
    pub stage: Option<usize>,
    /// Control now applied.
    pub control: VehicleControl,
}

/// A traffic light changed state at a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LightChange {
    /// Zero-based tick.
    pub step: usize,
    /// Index of the light in the replay's light list.
    pub light: usize,
    /// Planar distance from the actor to the light, metres.
    pub distance: f64,
    /// State the light switched to.
    pub state: LightState,
}

/// Result of [`Replay::run`].
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// Stage changes in tick order.
    pub transitions: Vec<Transition>,
    /// Light state changes in tick order, lights in list order within a tick.
    pub light_changes: Vec<LightChange>,
    /// One row per tick, with the scheduled control.
    pub log: MetricsLog,
    /// Distance travelled over the whole trace.
    pub distance: f64,
}

/// Offline re-drive of a logged trace through a control schedule.
///
/// Construct via [`Replay::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter | Default |
/// |---|---|
/// | `lights` | none |
/// | `rule` | [`TrafficLightRule::default`] (yellow < 55 m, green < 45 m) |
#[derive(Debug, Clone)]
pub struct Replay<'a> {
    schedule: &'a ControlSchedule,
    rule: TrafficLightRule,
    lights: Vec<Location>,
}

impl<'a> Replay<'a> {
    /// Replay against `schedule` with no traffic lights.
    #[must_use]
    pub fn new(schedule: &'a ControlSchedule) -> Self {
        Self {
            schedule,
            rule: TrafficLightRule::default(),
            lights: Vec::new(),
        }
    }

    /// Track `lights` with `rule` against the trace's logged position.
    /// Every light starts red.
    #[must_use]
    pub fn with_traffic_lights(mut self, rule: TrafficLightRule, lights: Vec<Location>) -> Self {
        self.rule = rule;
        self.lights = lights;
        self
    }

    /// Drive `trace` through the schedule: accumulate `velocity * time_step`
    /// per tick, look up the active stage at the accumulated distance and
    /// log the tick with that control. Each tracked light takes the state
    /// the rule gives for its planar distance to the logged position.
    #[instrument(skip_all, fields(actor = %trace.actor_type, ticks = trace.len(), lights = self.lights.len()))]
    pub fn run(&self, trace: &ReplayTrace) -> ReplayOutcome {
        let mut log = MetricsLog::new();
        let mut transitions = Vec::new();
        let mut light_changes = Vec::new();
        let mut states = vec![LightState::Red; self.lights.len()];
        let mut current = None;
        let mut time = 0.0;
        let mut distance = 0.0;

        for step in 0..trace.len() {
            let (v, dt) = (trace.velocities[step], trace.time_steps[step]);
            time += dt;
            distance += v * dt;
            let stage = self.schedule.stage_index(distance);
            let control = self.schedule.active(distance);
            if stage != current {
                debug!(step, distance, ?stage, "stage change");
                transitions.push(Transition {
                    step,
                    time,
                    distance,
                    stage,
                    control,
                });
                current = stage;
            }

            let position = Location::new(trace.loc_x[step], trace.loc_y[step], 0.0);
            for (light, (location, state)) in self.lights.iter().zip(&mut states).enumerate() {
                let d = position.planar_distance(location);
                let next = self.rule.state(d);
                if next != *state {
                    debug!(step, light, distance = d, ?next, "light change");
                    light_changes.push(LightChange {
                        step,
                        light,
                        distance: d,
                        state: next,
                    });
                    *state = next;
                }
            }

            log = log.record(KinematicSample {
                actor_type: trace.actor_type.clone(),
                sumo_id: trace.sumo_id.clone(),
                velocity: v,
                control,
                acc_x: trace.acc_x[step],
                acc_y: trace.acc_y[step],
                loc_x: trace.loc_x[step],
                loc_y: trace.loc_y[step],
                heading: trace.heading[step],
                time_step: dt,
            });
        }

        info!(
            distance,
            transitions = transitions.len(),
            light_changes = light_changes.len(),
            "replay complete"
        );
        ReplayOutcome {
            transitions,
            light_changes,
            log,
            distance,
        }
    }
}

/// [`Replay::run`] with no traffic lights.
pub fn replay(schedule: &ControlSchedule, trace: &ReplayTrace) -> ReplayOutcome {
    Replay::new(schedule).run(trace)
}
