//! Critical damping of joint DoFs.
//!
//! Each DoF is treated as a decoupled mass–spring system with mass
//! `m = dof_m0` (armature included) and stiffness `k`, the joint's passive
//! stiffness plus the proportional gain of every position actuator on the
//! joint reflected through its gear ratio.  The critical damping is
//! `c = 2·√(k·m)`.

use mjutils_types::MjError;
use tracing::trace;

use crate::actuator::{actuators_on_joint, classify_actuator};
use crate::dof::{JointRef, joint_id, joint_to_dof_ids};
use crate::model::{PhysicsModel, entry};

/// Stiffness seen by the DoFs of `joint`.
pub fn effective_stiffness<'a>(
    model: &PhysicsModel,
    joint: impl Into<JointRef<'a>>,
) -> Result<f64, MjError> {
    let joint = joint_id(model, joint)?;
    let mut k = *entry(&model.jnt_stiffness, "jnt_stiffness", joint)?;
    for id in actuators_on_joint(model, joint) {
        if let Some(kp) = classify_actuator(model, id)?.kp() {
            let gear = entry(&model.actuator_gear, "actuator_gear", id)?[0];
            k += kp * gear * gear;
        }
    }
    Ok(k)
}

/// Critical damping coefficient of each DoF of `joint`, in the order of
/// [`joint_to_dof_ids`].
///
/// A joint without stiffness has no critical damping and gets `0`.
pub fn critical_damping<'a>(
    model: &PhysicsModel,
    joint: impl Into<JointRef<'a>>,
) -> Result<Vec<f64>, MjError> {
    let joint = joint_id(model, joint)?;
    let k = effective_stiffness(model, joint)?;
    joint_to_dof_ids(model, joint)?
        .map(|dof| {
            let m = *entry(&model.dof_m0, "dof_m0", dof)?;
            if k < 0.0 || m < 0.0 {
                return Err(MjError::InvalidModel(format!(
                    "dof {dof} has negative stiffness ({k}) or mass ({m})"
                )));
            }
            let c = 2.0 * (k * m).sqrt();
            trace!(dof, joint, k, m, c, "critical damping");
            Ok(c)
        })
        .collect()
}

/// Ratio of each DoF's damping to its critical damping.
///
/// `1` is critically damped; a damped DoF with no stiffness is infinitely
/// overdamped and an undamped one reports `0`.
pub fn damping_ratio<'a>(
    model: &PhysicsModel,
    joint: impl Into<JointRef<'a>>,
) -> Result<Vec<f64>, MjError> {
    let joint = joint_id(model, joint)?;
    let critical = critical_damping(model, joint)?;
    joint_to_dof_ids(model, joint)?
        .zip(critical)
        .map(|(dof, c)| {
            let b = *entry(&model.dof_damping, "dof_damping", dof)?;
            Ok(if c > 0.0 {
                b / c
            } else if b > 0.0 {
                f64::INFINITY
            } else {
                0.0
            })
        })
        .collect()
}
