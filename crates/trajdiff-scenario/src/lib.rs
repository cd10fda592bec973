//! The scripted U-turn co-simulation scenario as data.
//!
//! Actors and their spawn poses, the distance-triggered ego control
//! schedule, the traffic light proximity rule, and the per-tick kinematic
//! metrics log the co-simulation writes. Nothing here talks to a simulator;
//! [`Replay`] re-drives a logged trace through the schedule and the light
//! rule offline.

mod actor;
mod description;
mod error;
mod log;
mod replay;
mod schedule;

pub use actor::{Actor, Location, Rotation, VehicleControl};
pub use description::ScenarioDescription;
pub use error::ScenarioError;
pub use log::{KinematicSample, METRICS_FILE, MetricsLog, MetricsRow};
pub use replay::{LightChange, Replay, ReplayOutcome, ReplayTrace, Transition, replay};
pub use schedule::{ControlSchedule, ControlStage, LightState, TrafficLightRule};
