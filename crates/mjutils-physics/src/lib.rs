//! `mjutils-physics` – queries over a compiled physics model.
//!
//! The physics engine compiles MJCF into flat per-object arrays (`jnt_type`,
//! `jnt_dofadr`, `actuator_gainprm`, …).  [`PhysicsModel`] holds those
//! arrays; the functions in this crate answer questions that would otherwise
//! need manual index arithmetic.
//!
//! # Modules
//!
//! - [`model`] – [`PhysicsModel`][model::PhysicsModel]: the compiled-model
//!   tables, JSON loading, validation and name ↔ id lookup.
//! - [`dof`] – [`joint_to_dof_ids`][dof::joint_to_dof_ids]: which velocity
//!   coordinates (`qvel`, `qfrc_applied`, …) belong to a joint.
//! - [`actuator`] – [`classify_actuator`][actuator::classify_actuator] and
//!   [`is_position_actuator`][actuator::is_position_actuator]: recognise
//!   motors, position servos and velocity servos from their gain/bias
//!   parameters.
//! - [`damping`] – [`critical_damping`][damping::critical_damping]: the
//!   damping that makes a joint's spring (joint stiffness plus position-servo
//!   gain) critically damped.
//! - [`observables`] – [`ObservableSet`][observables::ObservableSet]: the
//!   model's sensors as named observables that can be enabled and queried.

pub mod actuator;
pub mod damping;
pub mod dof;
pub mod model;
pub mod observables;

pub use actuator::{ActuatorKind, actuators_on_joint, classify_actuator, is_position_actuator};
pub use damping::{critical_damping, damping_ratio, effective_stiffness};
pub use dof::{JointRef, dof_address, joint_id, joint_to_dof_ids};
pub use model::PhysicsModel;
pub use observables::{Observable, ObservableSet};
