//! Distance-triggered control schedule and traffic light proximity rule.

use serde::Serialize;

use crate::actor::VehicleControl;
use crate::error::ScenarioError;

/// Control applied once the ego vehicle has travelled more than `trigger`
/// metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlStage {
    /// Travelled distance after which the stage is active, in metres.
    pub trigger: f64,
    /// Control to apply.
    pub control: VehicleControl,
}

/// Ordered list of [`ControlStage`]s with strictly increasing triggers.
///
/// The active control at a given distance is the one of the last stage whose
/// trigger lies strictly below that distance, or the initial control if no
/// stage has been passed yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlSchedule {
    initial: VehicleControl,
    stages: Vec<ControlStage>,
}

impl ControlSchedule {
    /// Build a schedule.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ScenarioError::NonFiniteTrigger`] | A trigger is NaN or infinite |
    /// | [`ScenarioError::UnorderedTriggers`] | A trigger does not exceed its predecessor |
    pub fn new(initial: VehicleControl, stages: Vec<ControlStage>) -> Result<Self, ScenarioError> {
        for (index, stage) in stages.iter().enumerate() {
            if !stage.trigger.is_finite() {
                return Err(ScenarioError::NonFiniteTrigger { index });
            }
            if index > 0 {
                let previous = stages[index - 1].trigger;
                if stage.trigger <= previous {
                    return Err(ScenarioError::UnorderedTriggers {
                        index,
                        previous,
                        trigger: stage.trigger,
                    });
                }
            }
        }
        Ok(Self { initial, stages })
    }

    /// The U-turn manoeuvre: brake at 20 m, steer left out of the lane at
    /// 34 m, accelerate through the turn at 67 m, correct right at 83 m and
    /// straighten at 87 m.
    #[must_use]
    pub fn u_turn() -> Self {
        Self {
            initial: VehicleControl::drive(1.0, 0.0),
            stages: vec![
                ControlStage { trigger: 20.0, control: VehicleControl::brake(0.8) },
                ControlStage { trigger: 34.0, control: VehicleControl::drive(1.0, -0.3) },
                ControlStage { trigger: 67.0, control: VehicleControl::drive(4.0, 0.0) },
                ControlStage { trigger: 83.0, control: VehicleControl::drive(1.0, 0.07) },
                ControlStage { trigger: 87.0, control: VehicleControl::drive(1.0, 0.0) },
            ],
        }
    }

    /// Control applied before any stage triggers.
    #[must_use]
    pub fn initial(&self) -> VehicleControl {
        self.initial
    }

    /// Stages in trigger order.
    #[must_use]
    pub fn stages(&self) -> &[ControlStage] {
        &self.stages
    }

    /// Index of the stage active at `distance`, `None` before the first
    /// trigger.
    #[must_use]
    pub fn stage_index(&self, distance: f64) -> Option<usize> {
        self.stages
            .partition_point(|s| s.trigger < distance)
            .checked_sub(1)
    }

    /// Control active at `distance`.
    #[must_use]
    pub fn active(&self, distance: f64) -> VehicleControl {
        self.stage_index(distance)
            .map_or(self.initial, |k| self.stages[k].control)
    }
}

/// Signal state of a traffic light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LightState {
    /// Stop.
    Red,
    /// Prepare.
    Yellow,
    /// Go.
    Green,
}

/// Lights turn yellow, then green, as the ego vehicle approaches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrafficLightRule {
    yellow_within: f64,
    green_within: f64,
}

impl TrafficLightRule {
    /// Build a rule from the two approach radii, in metres.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::InvalidLightRule`] if either radius is not finite and
    /// positive, or `green_within > yellow_within`.
    pub fn new(yellow_within: f64, green_within: f64) -> Result<Self, ScenarioError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(yellow_within) || !positive(green_within) || green_within > yellow_within {
            return Err(ScenarioError::InvalidLightRule {
                yellow: yellow_within,
                green: green_within,
            });
        }
        Ok(Self {
            yellow_within,
            green_within,
        })
    }

    /// Radius under which a light shows yellow.
    #[must_use]
    pub fn yellow_within(&self) -> f64 {
        self.yellow_within
    }

    /// Radius under which a light shows green.
    #[must_use]
    pub fn green_within(&self) -> f64 {
        self.green_within
    }

    /// State of a light `distance` metres from the ego vehicle.
    #[must_use]
    pub fn state(&self, distance: f64) -> LightState {
        if distance < self.green_within {
            LightState::Green
        } else if distance < self.yellow_within {
            LightState::Yellow
        } else {
            LightState::Red
        }
    }
}

impl Default for TrafficLightRule {
    fn default() -> Self {
        Self {
            yellow_within: 55.0,
            green_within: 45.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u_turn_schedule_is_valid() {
        let schedule = ControlSchedule::u_turn();
        let rebuilt = ControlSchedule::new(schedule.initial(), schedule.stages().to_vec()).unwrap();
        assert_eq!(rebuilt, schedule);
    }

    #[test]
    fn triggers_are_strict() {
        let schedule = ControlSchedule::u_turn();
        assert_eq!(schedule.stage_index(0.0), None);
        assert_eq!(schedule.stage_index(20.0), None);
        assert_eq!(schedule.active(20.0), VehicleControl::drive(1.0, 0.0));
        assert_eq!(schedule.stage_index(20.01), Some(0));
        assert_eq!(schedule.active(20.01), VehicleControl::brake(0.8));
        assert_eq!(schedule.stage_index(34.0), Some(0));
        assert_eq!(schedule.active(50.0), VehicleControl::drive(1.0, -0.3));
        assert_eq!(schedule.active(70.0).throttle, 4.0);
        assert_eq!(schedule.active(85.0).steer, 0.07);
        assert_eq!(schedule.stage_index(1_000.0), Some(4));
    }

    #[test]
    fn rejects_unordered_triggers() {
        let stages = vec![
            ControlStage { trigger: 10.0, control: VehicleControl::brake(1.0) },
            ControlStage { trigger: 10.0, control: VehicleControl::brake(0.5) },
        ];
        let err = ControlSchedule::new(VehicleControl::default(), stages).unwrap_err();
        assert!(matches!(err, ScenarioError::UnorderedTriggers { index: 1, .. }));
    }

    #[test]
    fn rejects_nan_trigger() {
        let stages = vec![ControlStage { trigger: f64::NAN, control: VehicleControl::default() }];
        let err = ControlSchedule::new(VehicleControl::default(), stages).unwrap_err();
        assert!(matches!(err, ScenarioError::NonFiniteTrigger { index: 0 }));
    }

    #[test]
    fn empty_schedule_keeps_initial_control() {
        let schedule = ControlSchedule::new(VehicleControl::drive(0.5, 0.0), Vec::new()).unwrap();
        assert_eq!(schedule.active(1e6), VehicleControl::drive(0.5, 0.0));
    }

    #[test]
    fn light_states_by_distance() {
        let rule = TrafficLightRule::default();
        assert_eq!(rule.state(100.0), LightState::Red);
        assert_eq!(rule.state(55.0), LightState::Red);
        assert_eq!(rule.state(54.9), LightState::Yellow);
        assert_eq!(rule.state(45.0), LightState::Yellow);
        assert_eq!(rule.state(44.9), LightState::Green);
        assert_eq!(rule.state(0.0), LightState::Green);
    }

    #[test]
    fn light_rule_validation() {
        assert!(TrafficLightRule::new(55.0, 45.0).is_ok());
        assert!(TrafficLightRule::new(40.0, 45.0).is_err());
        assert!(TrafficLightRule::new(f64::INFINITY, 45.0).is_err());
        assert!(TrafficLightRule::new(55.0, 0.0).is_err());
    }
}
