//! Actors of a scripted scenario.

use serde::Serialize;
use trajdiff_io::FrameTransform;

/// A point in the 3D simulator's world frame, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Location {
    /// East.
    pub x: f64,
    /// South (left-handed frame).
    pub y: f64,
    /// Up.
    pub z: f64,
}

impl Location {
    /// Create a location.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Planar distance to `other`, ignoring `z`.
    #[must_use]
    pub fn planar_distance(&self, other: &Location) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rotation {
    /// Nose up.
    pub pitch: f64,
    /// Clockwise seen from above.
    pub yaw: f64,
    /// Right side down.
    pub roll: f64,
}

impl Rotation {
    /// Create a rotation.
    #[must_use]
    pub const fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }
}

/// Pedal and steering command.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VehicleControl {
    /// Throttle. The scenario scripts sometimes exceed 1.0; the simulator
    /// clamps, this type does not.
    pub throttle: f64,
    /// Steering, negative left.
    pub steer: f64,
    /// Brake.
    pub brake: f64,
}

impl VehicleControl {
    /// Throttle and steer with the brake released.
    #[must_use]
    pub const fn drive(throttle: f64, steer: f64) -> Self {
        Self {
            throttle,
            steer,
            brake: 0.0,
        }
    }

    /// Brake with no throttle and straight wheels.
    #[must_use]
    pub const fn brake(brake: f64) -> Self {
        Self {
            throttle: 0.0,
            steer: 0.0,
            brake,
        }
    }
}

/// A vehicle spawned by the scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Actor {
    /// Blueprint identifier in the 3D simulator, e.g. `vehicle.audi.a2`.
    pub blueprint: String,
    /// Vehicle id in the traffic simulator.
    pub sumo_id: String,
    /// Spawn point.
    pub spawn: Location,
    /// Spawn orientation.
    pub rotation: Rotation,
    /// Control applied at spawn.
    pub initial_control: VehicleControl,
    /// Camera mount relative to the vehicle, if one is attached.
    pub sensor_offset: Option<Location>,
}

impl Actor {
    /// Spawn point expressed in the traffic simulator's frame.
    #[must_use]
    pub fn traffic_position(&self, frame: &FrameTransform) -> (f64, f64) {
        frame.apply(self.spawn.x, self.spawn.y)
    }

    /// Vehicle type name used by the traffic simulator: the blueprint up to
    /// its first underscore.
    #[must_use]
    pub fn traffic_type(&self) -> &str {
        self.blueprint.split('_').next().unwrap_or(&self.blueprint)
    }
}
