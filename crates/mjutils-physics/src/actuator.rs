//! Actuator classification from gain and bias parameters.
//!
//! The engine models every actuator force as
//! `gain·ctrl + bias₀ + bias₁·q + bias₂·q̇`, so the MJCF shortcut elements
//! (`<motor>`, `<position>`, `<velocity>`, ...) can be recovered from the
//! compiled `gainprm` / `biasprm` rows:
//!
//! | element      | gainprm      | biasprm           | biastype |
//! |--------------|--------------|-------------------|----------|
//! | `motor`      | `[g, 0, …]`  | `[0, …]`          | none     |
//! | `position`   | `[kp, 0, …]` | `[0, -kp, 0, …]`  | affine   |
//! | `position` with `kv` | `[kp, 0, …]` | `[0, -kp, -kv, 0, …]` | affine |
//! | `velocity`   | `[kv, 0, …]` | `[0, 0, -kv, …]`  | affine   |

use mjutils_types::{BiasType, GainType, MjError, ObjectKind, TransmissionType};
use serde::Serialize;

use crate::model::{PhysicsModel, entry};

/// Actuator shortcut recovered from the compiled parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActuatorKind {
    Motor { gain: f64 },
    Position { kp: f64 },
    PositionDerivative { kp: f64, kv: f64 },
    Velocity { kv: f64 },
    Muscle,
    Other,
}

impl ActuatorKind {
    /// Proportional gain of position-type actuators.
    pub fn kp(&self) -> Option<f64> {
        match *self {
            ActuatorKind::Position { kp } | ActuatorKind::PositionDerivative { kp, .. } => Some(kp),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActuatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActuatorKind::Motor { gain } => write!(f, "motor (gain={gain})"),
            ActuatorKind::Position { kp } => write!(f, "position (kp={kp})"),
            ActuatorKind::PositionDerivative { kp, kv } => {
                write!(f, "position (kp={kp}, kv={kv})")
            }
            ActuatorKind::Velocity { kv } => write!(f, "velocity (kv={kv})"),
            ActuatorKind::Muscle => f.write_str("muscle"),
            ActuatorKind::Other => f.write_str("other"),
        }
    }
}

/// Relative and absolute tolerances of [`isclose`].
const RTOL: f64 = 1e-5;
const ATOL: f64 = 1e-8;

fn isclose(a: f64, b: f64) -> bool {
    (a - b).abs() <= ATOL + RTOL * b.abs()
}

fn all_zero(values: &[f64]) -> bool {
    values.iter().all(|&v| v == 0.0)
}

/// Gain and bias rows of actuator `id`.
fn params(model: &PhysicsModel, id: usize) -> Result<(&[f64; 10], &[f64; 10]), MjError> {
    Ok((
        entry(&model.actuator_gainprm, "actuator_gainprm", id)?,
        entry(&model.actuator_biasprm, "actuator_biasprm", id)?,
    ))
}

/// `gain·ctrl − kp·q` with nothing else: the rows of a pure position servo.
fn is_pure_position(gain: &[f64; 10], bias: &[f64; 10]) -> bool {
    isclose(gain[0], -bias[1]) && all_zero(&gain[1..]) && bias[0] == 0.0 && all_zero(&bias[2..])
}

/// `true` when actuator `id` is a pure position servo: affine bias,
/// `gainprm[0] ≈ -biasprm[1]` and every other gain and bias term zero.
///
/// A position actuator with a derivative term (`kv > 0`) is not pure;
/// [`classify_actuator`] reports it as [`ActuatorKind::PositionDerivative`].
pub fn is_position_actuator(model: &PhysicsModel, id: usize) -> Result<bool, MjError> {
    let id = model.check_id(id, ObjectKind::Actuator)?;
    let biastype = *entry(&model.actuator_biastype, "actuator_biastype", id)?;
    let (gain, bias) = params(model, id)?;
    Ok(biastype == BiasType::Affine && is_pure_position(gain, bias))
}

/// Recover the MJCF shortcut of actuator `id`.
///
/// The servo shortcuts (`position`, `velocity`) all require
/// `gainprm[1..] == 0`, `biasprm[0] == 0` and `biasprm[3..] == 0`.
pub fn classify_actuator(model: &PhysicsModel, id: usize) -> Result<ActuatorKind, MjError> {
    let id = model.check_id(id, ObjectKind::Actuator)?;
    let gaintype = *entry(&model.actuator_gaintype, "actuator_gaintype", id)?;
    let biastype = *entry(&model.actuator_biastype, "actuator_biastype", id)?;
    if gaintype == GainType::Muscle || biastype == BiasType::Muscle {
        return Ok(ActuatorKind::Muscle);
    }
    if gaintype != GainType::Fixed {
        return Ok(ActuatorKind::Other);
    }

    let (gain, bias) = params(model, id)?;
    let servo_shape = all_zero(&gain[1..]) && bias[0] == 0.0 && all_zero(&bias[3..]);
    let kind = match biastype {
        BiasType::None => ActuatorKind::Motor { gain: gain[0] },
        BiasType::Affine if servo_shape => {
            let kp = gain[0];
            let kv = -bias[2];
            if is_pure_position(gain, bias) {
                ActuatorKind::Position { kp }
            } else if isclose(kp, -bias[1]) && kv > 0.0 {
                ActuatorKind::PositionDerivative { kp, kv }
            } else if bias[1] == 0.0 && isclose(kp, kv) {
                ActuatorKind::Velocity { kv }
            } else {
                ActuatorKind::Other
            }
        }
        _ => ActuatorKind::Other,
    };
    Ok(kind)
}

/// Ids of the actuators driving joint `joint` directly.
pub fn actuators_on_joint(model: &PhysicsModel, joint: usize) -> Vec<usize> {
    model
        .actuator_trntype
        .iter()
        .zip(&model.actuator_trnid)
        .enumerate()
        .filter(|(_, (trntype, trnid))| {
            matches!(
                trntype,
                TransmissionType::Joint | TransmissionType::JointInParent
            ) && trnid[0] == joint as i64
        })
        .map(|(id, _)| id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixture;

    #[test]
    fn pure_position_servo() {
        let model = fixture::legged();
        assert!(is_position_actuator(&model, 1).unwrap());
        assert_eq!(
            classify_actuator(&model, 1).unwrap(),
            ActuatorKind::Position { kp: 10.0 }
        );
    }

    #[test]
    fn motor_and_velocity_are_not_position() {
        let model = fixture::legged();
        assert!(!is_position_actuator(&model, 0).unwrap());
        assert!(!is_position_actuator(&model, 2).unwrap());
        assert_eq!(
            classify_actuator(&model, 0).unwrap(),
            ActuatorKind::Motor { gain: 1.0 }
        );
        assert_eq!(
            classify_actuator(&model, 2).unwrap(),
            ActuatorKind::Velocity { kv: 3.0 }
        );
    }

    #[test]
    fn derivative_term_makes_position_impure() {
        let model = fixture::legged();
        assert!(!is_position_actuator(&model, 3).unwrap());
        let kind = classify_actuator(&model, 3).unwrap();
        assert_eq!(kind, ActuatorKind::PositionDerivative { kp: 4.0, kv: 0.5 });
        assert_eq!(kind.kp(), Some(4.0));
    }

    #[test]
    fn gain_and_bias_must_match_within_tolerance() {
        let mut model = fixture::legged();
        model.actuator_biasprm[1][1] = -10.0 * (1.0 + 1e-7);
        assert!(is_position_actuator(&model, 1).unwrap());
        model.actuator_biasprm[1][1] = -10.5;
        assert!(!is_position_actuator(&model, 1).unwrap());
        assert_eq!(classify_actuator(&model, 1).unwrap(), ActuatorKind::Other);
    }

    #[test]
    fn extra_gain_terms_disqualify_every_servo() {
        let mut model = fixture::legged();
        for id in 1..4 {
            model.actuator_gainprm[id][1] = 0.5;
        }
        assert!(!is_position_actuator(&model, 1).unwrap());
        for id in 1..4 {
            assert_eq!(classify_actuator(&model, id).unwrap(), ActuatorKind::Other);
        }
    }

    #[test]
    fn unvalidated_model_with_missing_rows() {
        let mut model = fixture::legged();
        model.actuator_gainprm.truncate(1);
        assert!(matches!(
            is_position_actuator(&model, 2),
            Err(MjError::InvalidModel(_))
        ));
        assert!(matches!(
            classify_actuator(&model, 3),
            Err(MjError::InvalidModel(_))
        ));
        assert_eq!(
            classify_actuator(&model, 0).unwrap(),
            ActuatorKind::Motor { gain: 1.0 }
        );
    }

    #[test]
    fn muscle_is_classified_by_type() {
        let mut model = fixture::legged();
        model.actuator_gaintype[0] = GainType::Muscle;
        model.actuator_biastype[0] = BiasType::Muscle;
        assert_eq!(classify_actuator(&model, 0).unwrap(), ActuatorKind::Muscle);
        assert!(!is_position_actuator(&model, 0).unwrap());
    }

    #[test]
    fn actuators_grouped_by_joint() {
        let model = fixture::legged();
        assert_eq!(actuators_on_joint(&model, 2), vec![0, 1]);
        assert_eq!(actuators_on_joint(&model, 3), vec![2, 3]);
        assert!(actuators_on_joint(&model, 0).is_empty());
    }

    #[test]
    fn out_of_range_actuator() {
        let model = fixture::legged();
        assert!(matches!(
            is_position_actuator(&model, 4),
            Err(MjError::IndexOutOfRange { index: 4, len: 4, .. })
        ));
    }

    #[test]
    fn kind_serializes_with_tag() {
        let json = serde_json::to_string(&ActuatorKind::Position { kp: 2.0 }).unwrap();
        assert_eq!(json, r#"{"kind":"position","kp":2.0}"#);
    }
}
