//! Compiled-model tables.
//!
//! [`PhysicsModel`] mirrors the subset of the engine's compiled model that
//! the queries in this crate need.  Field names follow the engine's array
//! names so a dump produced next to the engine deserializes directly:
//!
//! ```json
//! {
//!   "jnt_names": ["root", "knee"],
//!   "jnt_type": [0, 3],
//!   "jnt_dofadr": [0, 6],
//!   "dof_m0": [1.0, 1.0, 1.0, 0.1, 0.1, 0.1, 0.02]
//! }
//! ```
//!
//! Per-object arrays must have one entry per object of that kind; see
//! [`PhysicsModel::validate`].

use std::path::Path;

use mjutils_types::{BiasType, GainType, JointType, MjError, ObjectKind, TransmissionType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Flat per-object arrays of a compiled model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PhysicsModel {
    // ── bodies ──────────────────────────────────────────────────────────────
    pub body_names: Vec<String>,
    pub body_parentid: Vec<usize>,

    // ── joints ──────────────────────────────────────────────────────────────
    pub jnt_names: Vec<String>,
    pub jnt_type: Vec<JointType>,
    pub jnt_bodyid: Vec<usize>,
    /// First DoF (velocity coordinate) address of each joint.
    pub jnt_dofadr: Vec<usize>,
    pub jnt_stiffness: Vec<f64>,

    // ── DoFs ────────────────────────────────────────────────────────────────
    pub dof_jntid: Vec<usize>,
    /// Diagonal of the joint-space inertia at the reference configuration,
    /// armature included.
    pub dof_m0: Vec<f64>,
    pub dof_damping: Vec<f64>,

    // ── geoms / sites (names only) ─────────────────────────────────────────
    pub geom_names: Vec<String>,
    pub site_names: Vec<String>,

    // ── actuators ───────────────────────────────────────────────────────────
    pub actuator_names: Vec<String>,
    pub actuator_trntype: Vec<TransmissionType>,
    /// Transmission target ids; `-1` marks an unused slot.
    pub actuator_trnid: Vec<[i64; 2]>,
    pub actuator_gear: Vec<[f64; 6]>,
    pub actuator_gaintype: Vec<GainType>,
    pub actuator_gainprm: Vec<[f64; 10]>,
    pub actuator_biastype: Vec<BiasType>,
    pub actuator_biasprm: Vec<[f64; 10]>,

    // ── sensors ─────────────────────────────────────────────────────────────
    pub sensor_names: Vec<String>,
    /// Sensor type name, e.g. `"jointpos"` or `"accelerometer"`.
    pub sensor_type: Vec<String>,
    pub sensor_dim: Vec<usize>,
}

impl PhysicsModel {
    /// Parse and validate a JSON dump.
    pub fn from_json_str(json: &str) -> Result<Self, MjError> {
        let model: Self =
            serde_json::from_str(json).map_err(|e| MjError::Serialization(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    /// Read, parse and validate a JSON dump from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MjError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| MjError::io(path, e))?;
        let model = Self::from_json_str(&raw)?;
        debug!(
            path = %path.display(),
            njnt = model.njnt(),
            nv = model.nv(),
            nu = model.nu(),
            "loaded physics model"
        );
        Ok(model)
    }

    pub fn to_json_pretty(&self) -> Result<String, MjError> {
        serde_json::to_string_pretty(self).map_err(|e| MjError::Serialization(e.to_string()))
    }

    /// JSON schema describing the dump format.
    pub fn json_schema() -> Result<String, MjError> {
        let schema = schemars::schema_for!(PhysicsModel);
        serde_json::to_string_pretty(&schema).map_err(|e| MjError::Serialization(e.to_string()))
    }

    // ── sizes ───────────────────────────────────────────────────────────────

    pub fn nbody(&self) -> usize {
        self.body_names.len()
    }

    pub fn njnt(&self) -> usize {
        self.jnt_type.len()
    }

    /// Number of DoFs (length of `qvel`).
    pub fn nv(&self) -> usize {
        self.dof_m0.len()
    }

    /// Number of actuators.
    pub fn nu(&self) -> usize {
        self.actuator_biastype.len()
    }

    pub fn nsensor(&self) -> usize {
        self.sensor_names.len()
    }

    /// Check that every per-object array has one entry per object and that
    /// joint DoF ranges and actuator joint targets are in bounds.
    ///
    /// A kind whose arrays are all empty has zero objects.
    pub fn validate(&self) -> Result<(), MjError> {
        check_group(
            "body",
            &[
                ("body_names", self.body_names.len()),
                ("body_parentid", self.body_parentid.len()),
            ],
        )?;
        check_group(
            "joint",
            &[
                ("jnt_type", self.jnt_type.len()),
                ("jnt_names", self.jnt_names.len()),
                ("jnt_dofadr", self.jnt_dofadr.len()),
                ("jnt_stiffness", self.jnt_stiffness.len()),
                ("jnt_bodyid", self.jnt_bodyid.len()),
            ],
        )?;
        check_group(
            "dof",
            &[
                ("dof_m0", self.dof_m0.len()),
                ("dof_damping", self.dof_damping.len()),
                ("dof_jntid", self.dof_jntid.len()),
            ],
        )?;
        check_group(
            "actuator",
            &[
                ("actuator_biastype", self.actuator_biastype.len()),
                ("actuator_names", self.actuator_names.len()),
                ("actuator_trntype", self.actuator_trntype.len()),
                ("actuator_trnid", self.actuator_trnid.len()),
                ("actuator_gear", self.actuator_gear.len()),
                ("actuator_gaintype", self.actuator_gaintype.len()),
                ("actuator_gainprm", self.actuator_gainprm.len()),
                ("actuator_biasprm", self.actuator_biasprm.len()),
            ],
        )?;
        check_group(
            "sensor",
            &[
                ("sensor_names", self.sensor_names.len()),
                ("sensor_type", self.sensor_type.len()),
                ("sensor_dim", self.sensor_dim.len()),
            ],
        )?;

        let nv = self.nv();
        for (j, (&adr, ty)) in self.jnt_dofadr.iter().zip(&self.jnt_type).enumerate() {
            match adr.checked_add(ty.dof_count()) {
                Some(end) if end <= nv => {}
                _ => {
                    return Err(MjError::InvalidModel(format!(
                        "joint {j} DoFs start at {adr} with {} DoFs, beyond nv={nv}",
                        ty.dof_count()
                    )));
                }
            }
        }
        for (a, (trntype, trnid)) in self
            .actuator_trntype
            .iter()
            .zip(&self.actuator_trnid)
            .enumerate()
        {
            let targets_joint = matches!(
                trntype,
                TransmissionType::Joint | TransmissionType::JointInParent
            );
            if targets_joint && !(0..self.njnt() as i64).contains(&trnid[0]) {
                return Err(MjError::InvalidModel(format!(
                    "actuator {a} targets joint {} but njnt={}",
                    trnid[0],
                    self.njnt()
                )));
            }
        }
        Ok(())
    }

    // ── names ───────────────────────────────────────────────────────────────

    fn names(&self, kind: ObjectKind) -> &[String] {
        match kind {
            ObjectKind::Body => &self.body_names,
            ObjectKind::Joint => &self.jnt_names,
            ObjectKind::Geom => &self.geom_names,
            ObjectKind::Site => &self.site_names,
            ObjectKind::Actuator => &self.actuator_names,
            ObjectKind::Sensor => &self.sensor_names,
        }
    }

    /// Id of the object of `kind` called `name`.
    pub fn name2id(&self, name: &str, kind: ObjectKind) -> Result<usize, MjError> {
        self.names(kind)
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| MjError::not_found(kind, name))
    }

    /// Name of object `id` of `kind` (empty for unnamed objects).
    pub fn id2name(&self, id: usize, kind: ObjectKind) -> Result<&str, MjError> {
        let names = self.names(kind);
        names
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| MjError::IndexOutOfRange {
                kind: kind.to_string(),
                index: id,
                len: names.len(),
            })
    }

    /// Number of objects of `kind`.
    pub fn count(&self, kind: ObjectKind) -> usize {
        match kind {
            ObjectKind::Joint => self.njnt(),
            ObjectKind::Actuator => self.nu(),
            other => self.names(other).len(),
        }
    }

    /// Return `id` unchanged if it indexes an existing object of `kind`.
    pub fn check_id(&self, id: usize, kind: ObjectKind) -> Result<usize, MjError> {
        let len = self.count(kind);
        if id < len {
            Ok(id)
        } else {
            Err(MjError::IndexOutOfRange {
                kind: kind.to_string(),
                index: id,
                len,
            })
        }
    }
}

/// `array[index]`, or [`MjError::InvalidModel`] naming the short array.
///
/// Query functions read through this so a hand-built model that was never
/// validated fails with an error instead of a panic.
pub(crate) fn entry<'a, T>(array: &'a [T], field: &str, index: usize) -> Result<&'a T, MjError> {
    array.get(index).ok_or_else(|| {
        MjError::InvalidModel(format!(
            "{field} has {} entries, no entry {index}",
            array.len()
        ))
    })
}

/// All arrays of a group must have the same length.
fn check_group(kind: &str, arrays: &[(&str, usize)]) -> Result<(), MjError> {
    let Some(&(first_name, expected)) = arrays.first() else {
        return Ok(());
    };
    for &(name, len) in &arrays[1..] {
        if len != expected {
            return Err(MjError::InvalidModel(format!(
                "{kind} arrays disagree: {first_name} has {expected} entries, {name} has {len}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixture {
    //! A small legged model shared by the tests of this crate.
    //!
    //! | joint  | type  | dofs   |
    //! |--------|-------|--------|
    //! | root   | free  | 0..6   |
    //! | hip    | ball  | 6..9   |
    //! | knee   | hinge | 9      |
    //! | slider | slide | 10     |

    use super::*;

    fn prm(values: &[f64]) -> [f64; 10] {
        let mut out = [0.0; 10];
        out[..values.len()].copy_from_slice(values);
        out
    }

    fn gear(g: f64) -> [f64; 6] {
        [g, 0.0, 0.0, 0.0, 0.0, 0.0]
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    pub(crate) fn legged() -> PhysicsModel {
        PhysicsModel {
            body_names: names(&["world", "pelvis", "thigh", "shin"]),
            body_parentid: vec![0, 0, 1, 2],

            jnt_names: names(&["root", "hip", "knee", "slider"]),
            jnt_type: vec![
                JointType::Free,
                JointType::Ball,
                JointType::Hinge,
                JointType::Slide,
            ],
            jnt_bodyid: vec![1, 2, 3, 3],
            jnt_dofadr: vec![0, 6, 9, 10],
            jnt_stiffness: vec![0.0, 0.0, 2.0, 0.0],

            dof_jntid: vec![0, 0, 0, 0, 0, 0, 1, 1, 1, 2, 3],
            dof_m0: vec![5.0, 5.0, 5.0, 0.8, 0.9, 1.0, 0.2, 0.2, 0.2, 0.05, 0.5],
            dof_damping: vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.1, 0.1, 0.1, 1.0, 0.0],

            geom_names: names(&["floor", "thigh_geom"]),
            site_names: names(&["imu"]),

            actuator_names: names(&["knee_motor", "knee_servo", "slider_vel", "slider_pd"]),
            actuator_trntype: vec![TransmissionType::Joint; 4],
            actuator_trnid: vec![[2, -1], [2, -1], [3, -1], [3, -1]],
            actuator_gear: vec![gear(1.0), gear(2.0), gear(1.0), gear(1.0)],
            actuator_gaintype: vec![GainType::Fixed; 4],
            actuator_gainprm: vec![prm(&[1.0]), prm(&[10.0]), prm(&[3.0]), prm(&[4.0])],
            actuator_biastype: vec![
                BiasType::None,
                BiasType::Affine,
                BiasType::Affine,
                BiasType::Affine,
            ],
            actuator_biasprm: vec![
                prm(&[]),
                prm(&[0.0, -10.0, 0.0]),
                prm(&[0.0, 0.0, -3.0]),
                prm(&[0.0, -4.0, -0.5]),
            ],

            sensor_names: names(&["knee_pos", "accel", "gyro"]),
            sensor_type: names(&["jointpos", "accelerometer", "gyro"]),
            sensor_dim: vec![1, 3, 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_is_valid() {
        let model = fixture::legged();
        model.validate().unwrap();
        assert_eq!(model.njnt(), 4);
        assert_eq!(model.nv(), 11);
        assert_eq!(model.nu(), 4);
        assert_eq!(model.nsensor(), 3);
    }

    #[test]
    fn name_lookup_round_trip() {
        let model = fixture::legged();
        let id = model.name2id("knee", ObjectKind::Joint).unwrap();
        assert_eq!(id, 2);
        assert_eq!(model.id2name(id, ObjectKind::Joint).unwrap(), "knee");
        assert_eq!(model.name2id("imu", ObjectKind::Site).unwrap(), 0);
    }

    #[test]
    fn unknown_name_and_id() {
        let model = fixture::legged();
        assert!(matches!(
            model.name2id("elbow", ObjectKind::Joint),
            Err(MjError::NotFound { .. })
        ));
        assert!(matches!(
            model.id2name(9, ObjectKind::Actuator),
            Err(MjError::IndexOutOfRange { index: 9, len: 4, .. })
        ));
    }

    #[test]
    fn json_dump_loads_back() {
        let model = fixture::legged();
        let json = model.to_json_pretty().unwrap();
        assert!(json.contains("\"jnt_type\": [\n    0,"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, &json).unwrap();
        assert_eq!(PhysicsModel::load(&path).unwrap(), model);
    }

    #[test]
    fn partial_dump_uses_defaults() {
        let model = PhysicsModel::from_json_str(
            r#"{
                "jnt_names": ["knee"], "jnt_type": [3], "jnt_dofadr": [0],
                "jnt_stiffness": [0.0], "jnt_bodyid": [1],
                "dof_m0": [0.1], "dof_damping": [0.0], "dof_jntid": [0]
            }"#,
        )
        .unwrap();
        assert_eq!(model.nu(), 0);
        assert_eq!(model.nv(), 1);
    }

    #[test]
    fn mismatched_arrays_are_rejected() {
        let mut model = fixture::legged();
        model.jnt_dofadr.pop();
        assert!(matches!(model.validate(), Err(MjError::InvalidModel(_))));
    }

    #[test]
    fn dof_range_past_nv_is_rejected() {
        let mut model = fixture::legged();
        model.jnt_dofadr[1] = 9; // ball joint would need 9..12
        assert!(matches!(model.validate(), Err(MjError::InvalidModel(_))));
    }

    #[test]
    fn huge_dof_address_is_rejected() {
        let err = PhysicsModel::from_json_str(&format!(
            r#"{{
                "jnt_names": ["knee"], "jnt_type": [3], "jnt_dofadr": [{}],
                "jnt_stiffness": [0.0], "jnt_bodyid": [1],
                "dof_m0": [0.1], "dof_damping": [0.0], "dof_jntid": [0]
            }}"#,
            usize::MAX
        ))
        .unwrap_err();
        assert!(matches!(err, MjError::InvalidModel(_)));
    }

    #[test]
    fn entry_reports_short_array() {
        let values = [1.0, 2.0];
        assert_eq!(*entry(&values, "dof_m0", 1).unwrap(), 2.0);
        let err = entry(&values, "dof_m0", 2).unwrap_err();
        assert_eq!(
            err,
            MjError::InvalidModel("dof_m0 has 2 entries, no entry 2".to_string())
        );
    }

    #[test]
    fn actuator_joint_target_is_checked() {
        let mut model = fixture::legged();
        model.actuator_trnid[0] = [7, -1];
        assert!(matches!(model.validate(), Err(MjError::InvalidModel(_))));
    }

    #[test]
    fn unknown_joint_type_code_fails_to_load() {
        let err = PhysicsModel::from_json_str(r#"{"jnt_type": [5]}"#).unwrap_err();
        assert!(matches!(err, MjError::Serialization(_)));
    }

    #[test]
    fn schema_mentions_fields() {
        let schema = PhysicsModel::json_schema().unwrap();
        assert!(schema.contains("jnt_dofadr"));
        assert!(schema.contains("actuator_biasprm"));
    }
}
