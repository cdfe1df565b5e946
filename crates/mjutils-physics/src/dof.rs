//! Joint → degree-of-freedom mapping.
//!
//! A joint owns a contiguous run of velocity coordinates starting at
//! `jnt_dofadr`: six for a free joint, three for a ball joint and one for a
//! slide or hinge.  The returned indices address `qvel`, `qacc`,
//! `qfrc_applied`, `qfrc_actuator` and every other `nv`-sized array.
//!
//! # Example
//!
//! ```rust
//! use mjutils_physics::{PhysicsModel, joint_to_dof_ids};
//! use mjutils_types::JointType;
//!
//! let model = PhysicsModel {
//!     jnt_names: vec!["root".into(), "knee".into()],
//!     jnt_type: vec![JointType::Free, JointType::Hinge],
//!     jnt_dofadr: vec![0, 6],
//!     jnt_stiffness: vec![0.0; 2],
//!     jnt_bodyid: vec![1, 2],
//!     dof_m0: vec![1.0; 7],
//!     dof_damping: vec![0.0; 7],
//!     dof_jntid: vec![0, 0, 0, 0, 0, 0, 1],
//!     ..Default::default()
//! };
//!
//! assert_eq!(joint_to_dof_ids(&model, "root").unwrap(), 0..6);
//! assert_eq!(joint_to_dof_ids(&model, 1usize).unwrap(), 6..7);
//! ```

use std::ops::Range;

use mjutils_types::{MjError, ObjectKind};

use crate::model::{PhysicsModel, entry};

/// A joint given either by name or by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointRef<'a> {
    Name(&'a str),
    Id(usize),
}

impl<'a> From<&'a str> for JointRef<'a> {
    fn from(name: &'a str) -> Self {
        JointRef::Name(name)
    }
}

impl<'a> From<&'a String> for JointRef<'a> {
    fn from(name: &'a String) -> Self {
        JointRef::Name(name.as_str())
    }
}

impl From<usize> for JointRef<'_> {
    fn from(id: usize) -> Self {
        JointRef::Id(id)
    }
}

impl std::fmt::Display for JointRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JointRef::Name(name) => write!(f, "'{name}'"),
            JointRef::Id(id) => write!(f, "#{id}"),
        }
    }
}

/// Resolve a [`JointRef`] to a joint id.
pub fn joint_id<'a>(model: &PhysicsModel, joint: impl Into<JointRef<'a>>) -> Result<usize, MjError> {
    match joint.into() {
        JointRef::Name(name) => model.name2id(name, ObjectKind::Joint),
        JointRef::Id(id) => model.check_id(id, ObjectKind::Joint),
    }
}

/// DoF indices of a joint.
pub fn joint_to_dof_ids<'a>(
    model: &PhysicsModel,
    joint: impl Into<JointRef<'a>>,
) -> Result<Range<usize>, MjError> {
    let id = joint_id(model, joint)?;
    let start = *entry(&model.jnt_dofadr, "jnt_dofadr", id)?;
    let count = entry(&model.jnt_type, "jnt_type", id)?.dof_count();
    let end = start
        .checked_add(count)
        .ok_or_else(|| MjError::InvalidModel(format!("joint {id} DoF address {start} overflows")))?;
    Ok(start..end)
}

/// The single DoF index of a slide or hinge joint.
///
/// Free and ball joints span several DoFs; asking for one address is an
/// error there, use [`joint_to_dof_ids`].
pub fn dof_address<'a>(model: &PhysicsModel, joint: impl Into<JointRef<'a>>) -> Result<usize, MjError> {
    let joint = joint.into();
    let dofs = joint_to_dof_ids(model, joint)?;
    if dofs.len() != 1 {
        return Err(MjError::InvalidModel(format!(
            "joint {joint} has {} DoFs, not one",
            dofs.len()
        )));
    }
    Ok(dofs.start)
}
