//! Static description of the scripted co-simulation scenario.

use serde::Serialize;
use trajdiff_io::FrameTransform;

use crate::actor::{Actor, Location, Rotation, VehicleControl};
use crate::schedule::{ControlSchedule, TrafficLightRule};

/// Everything needed to set up and drive the scenario: actors, clock, frame
/// calibration, spectator camera and the ego control script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioDescription {
    /// The scripted vehicle.
    pub ego: Actor,
    /// Background traffic, in spawn order.
    pub others: Vec<Actor>,
    /// Simulation step length in seconds.
    pub step_length: f64,
    /// Number of steps after the initial tick.
    pub steps: usize,
    /// Maps 3D-simulator positions into the traffic simulator's frame.
    pub frame: FrameTransform,
    /// Spectator camera position.
    pub spectator: Location,
    /// Spectator camera orientation.
    pub spectator_rotation: Rotation,
    /// Ego control script.
    pub schedule: ControlSchedule,
    /// Traffic light behaviour around the ego vehicle.
    pub lights: TrafficLightRule,
}

impl ScenarioDescription {
    /// The U-turn scenario: the ego vehicle leaves its lane, turns across
    /// the median and rejoins the opposite carriageway while seven other
    /// vehicles are parked or driving around the junction.
    #[must_use]
    pub fn u_turn() -> Self {
        let ego = Actor {
            blueprint: "vehicle.mercedes.coupe_2020".into(),
            sumo_id: "ego".into(),
            spawn: Location::new(-426.5, 30.4, 0.5),
            rotation: Rotation::default(),
            initial_control: VehicleControl::drive(1.0, 0.0),
            sensor_offset: Some(Location::new(-5.7, 0.0, 3.7)),
        };

        let background = [
            ("vehicle.audi.a2", Location::new(-426.4, 26.9, 0.5), 0.0, 0.6),
            ("vehicle.tesla.model3", Location::new(-447.2, 37.4, 0.5), 0.0, 1.0),
            ("vehicle.audi.etron", Location::new(-298.2, 5.4, 3.0), 180.0, 1.0),
            ("vehicle.tesla.cybertruck", Location::new(-315.9, 12.7, 3.0), 180.0, 1.0),
            ("vehicle.dodge.charger_police", Location::new(-347.7, 16.1, 3.0), 180.0, 1.0),
            ("vehicle.ford.mustang", Location::new(-384.5, -8.5, 3.0), 90.0, 0.0),
            ("vehicle.tesla.model3", Location::new(-380.7, -7.4, 3.0), 90.0, 0.0),
        ];
        let others = background
            .into_iter()
            .enumerate()
            .map(|(k, (blueprint, spawn, yaw, throttle))| Actor {
                blueprint: blueprint.into(),
                sumo_id: format!("actor{}", k + 1),
                spawn,
                rotation: Rotation::new(0.0, yaw, 0.0),
                initial_control: VehicleControl::drive(throttle, 0.0),
                sensor_offset: None,
            })
            .collect();

        Self {
            ego,
            others,
            step_length: 0.023,
            steps: 400,
            frame: FrameTransform::new(503.02, 423.76, true),
            spectator: Location::new(-445.9, 24.23, 44.5),
            spectator_rotation: Rotation::new(-47.0, 0.0, 0.0),
            schedule: ControlSchedule::u_turn(),
            lights: TrafficLightRule::default(),
        }
    }

    /// Ego first, then the background actors.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        std::iter::once(&self.ego).chain(&self.others)
    }

    /// Simulated time covered by all steps, in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.steps as f64 * self.step_length
    }

    /// Heading reported by the traffic simulator for a 3D-simulator yaw.
    #[must_use]
    pub fn traffic_heading(yaw: f64) -> f64 {
        yaw + 90.0
    }
}
