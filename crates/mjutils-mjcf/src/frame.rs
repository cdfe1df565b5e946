//! Body frame rewriting.
//!
//! Every placement in MJCF is relative to the enclosing body.  Changing a
//! body's `pos`/`quat` therefore drags everything attached to it along.
//! [`set_body_frame`] changes the frame *without* moving the attached
//! geometry, joints, sites and child bodies: their local placements are
//! re-expressed in the new frame.  [`reparent_body`] moves a body under a
//! different parent while keeping its world placement.
//!
//! Orientations are read in any MJCF form (`quat`, `axisangle`, `euler`,
//! `xyaxes`, `zaxis`) honoring `<compiler angle=… eulerseq=…>`, and are
//! always written back as `quat`.
//!
//! # Example
//!
//! ```rust
//! use mjutils_mjcf::{parse_str, set_body_frame, world_pose};
//! use mjutils_types::math::{Pose, Quaternion, Vec3};
//!
//! let mut model = parse_str(r#"
//! <mujoco><worldbody>
//!   <body name="torso" pos="0 0 1">
//!     <body name="head" pos="0 0 0.3"/>
//!   </body>
//! </worldbody></mujoco>"#).unwrap();
//!
//! let before = world_pose(&model, "head").unwrap();
//! set_body_frame(&mut model, "torso",
//!     Pose::new(Vec3::new(0.0, 0.0, 1.2), Quaternion::identity())).unwrap();
//! let after = world_pose(&model, "head").unwrap();
//! assert!((before.pos.z - after.pos.z).abs() < 1e-12);
//! ```

use mjutils_types::math::{Pose, Quaternion, Vec3};
use mjutils_types::{MjError, ObjectKind};
use tracing::debug;

use crate::element::Element;

/// Orientation attributes that are replaced by `quat` on write.
const ALT_ORIENTATIONS: &[&str] = &["axisangle", "euler", "xyaxes", "zaxis"];

/// Values closer to zero than this are written as exact zeros.
const SNAP_EPS: f64 = 1e-12;

/// Compiler options that change how orientations are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerSettings {
    /// `angle="radian"`; MJCF defaults to degrees.
    pub radians: bool,
    /// Euler sequence, e.g. `xyz` (intrinsic) or `XYZ` (extrinsic).
    pub eulerseq: String,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            radians: false,
            eulerseq: "xyz".to_string(),
        }
    }
}

impl CompilerSettings {
    /// Collect settings from the root's `<compiler>` elements; later
    /// elements override earlier ones.
    pub fn from_root(root: &Element) -> Self {
        let mut settings = Self::default();
        for compiler in root.children_with_tag("compiler") {
            if let Some(angle) = compiler.text_attr("angle") {
                settings.radians = angle == "radian";
            }
            if let Some(seq) = compiler.text_attr("eulerseq") {
                settings.eulerseq = seq.to_string();
            }
        }
        settings
    }

    fn to_radians(&self, angle: f64) -> f64 {
        if self.radians {
            angle
        } else {
            angle.to_radians()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Reading placements
// ────────────────────────────────────────────────────────────────────────────

/// Placement of `element` relative to its parent frame.
pub fn local_pose(element: &Element, compiler: &CompilerSettings) -> Result<Pose, MjError> {
    let pos = element
        .fixed::<3>("pos")?
        .map(Vec3::from_array)
        .unwrap_or_else(Vec3::zero);
    Ok(Pose::new(pos, orientation(element, compiler)?))
}

fn orientation(element: &Element, compiler: &CompilerSettings) -> Result<Quaternion, MjError> {
    let invalid = |attribute: &str, details: &str| MjError::InvalidAttribute {
        element: element.tag.clone(),
        attribute: attribute.to_string(),
        details: details.to_string(),
    };

    if let Some(q) = element.fixed::<4>("quat")? {
        return Quaternion::from_array(q)
            .normalized()
            .ok_or_else(|| invalid("quat", "zero quaternion"));
    }
    if let Some([x, y, z, angle]) = element.fixed::<4>("axisangle")? {
        return Quaternion::from_axis_angle(Vec3::new(x, y, z), compiler.to_radians(angle))
            .ok_or_else(|| invalid("axisangle", "zero rotation axis"));
    }
    if let Some(angles) = element.fixed::<3>("euler")? {
        return euler_to_quat(angles, compiler).ok_or_else(|| invalid("euler", "bad eulerseq"));
    }
    if let Some([x0, x1, x2, y0, y1, y2]) = element.fixed::<6>("xyaxes")? {
        let x = Vec3::new(x0, x1, x2)
            .normalized()
            .ok_or_else(|| invalid("xyaxes", "zero x axis"))?;
        let y = Vec3::new(y0, y1, y2);
        let y = y
            .sub(x.scale(x.dot(y)))
            .normalized()
            .ok_or_else(|| invalid("xyaxes", "y axis parallel to x axis"))?;
        return Ok(Quaternion::from_rotation_matrix(x, y, x.cross(y)));
    }
    if let Some(z) = element.fixed::<3>("zaxis")? {
        return Quaternion::from_two_vectors(Vec3::new(0.0, 0.0, 1.0), Vec3::from_array(z))
            .ok_or_else(|| invalid("zaxis", "zero z axis"));
    }
    Ok(Quaternion::identity())
}

/// Lowercase axes rotate with the frame (post-multiply), uppercase axes are
/// fixed (pre-multiply).
fn euler_to_quat(angles: [f64; 3], compiler: &CompilerSettings) -> Option<Quaternion> {
    let seq: Vec<char> = compiler.eulerseq.chars().collect();
    if seq.len() != 3 {
        return None;
    }
    let mut q = Quaternion::identity();
    for (axis_char, angle) in seq.iter().zip(angles) {
        let axis = match axis_char.to_ascii_lowercase() {
            'x' => Vec3::new(1.0, 0.0, 0.0),
            'y' => Vec3::new(0.0, 1.0, 0.0),
            'z' => Vec3::new(0.0, 0.0, 1.0),
            _ => return None,
        };
        let rot = Quaternion::from_axis_angle(axis, compiler.to_radians(angle))?;
        q = if axis_char.is_ascii_lowercase() {
            q.mul(rot)
        } else {
            rot.mul(q)
        };
    }
    q.normalized()
}

/// World placement of the named body (`world`/`worldbody` is the origin).
pub fn world_pose(root: &Element, body_name: &str) -> Result<Pose, MjError> {
    let compiler = CompilerSettings::from_root(root);
    let path = body_path(root, body_name)?;
    pose_along(root, &path, &compiler)
}

// ────────────────────────────────────────────────────────────────────────────
// Rewriting placements
// ────────────────────────────────────────────────────────────────────────────

/// Replace the frame of `body_name` by `new_frame` (expressed in the body's
/// parent frame) and re-express every directly attached element so that
/// nothing under the body moves in world space.
pub fn set_body_frame(root: &mut Element, body_name: &str, new_frame: Pose) -> Result<(), MjError> {
    let compiler = CompilerSettings::from_root(root);
    let body = root
        .find_mut("body", body_name)
        .ok_or_else(|| MjError::not_found(ObjectKind::Body, body_name))?;

    let old_frame = local_pose(body, &compiler)?;
    // Maps coordinates in the old body frame to the new body frame.
    let delta = new_frame.inverse().compose(old_frame);

    for child in &mut body.children {
        reexpress(child, delta, &compiler)?;
    }
    write_pose(body, new_frame);
    debug!(
        body = body_name,
        children = body.children.len(),
        "re-expressed body frame"
    );
    Ok(())
}

/// Move `body_name` under `new_parent` (a body name, or `world`) keeping
/// its world placement.
pub fn reparent_body(root: &mut Element, body_name: &str, new_parent: &str) -> Result<(), MjError> {
    if body_name == "world" || body_name == "worldbody" {
        return Err(MjError::InvalidModel("cannot move the world body".to_string()));
    }
    let compiler = CompilerSettings::from_root(root);
    let from = root
        .path_to(&|e: &Element| e.tag == "body" && e.name() == Some(body_name))
        .ok_or_else(|| MjError::not_found(ObjectKind::Body, body_name))?;
    if from.is_empty() {
        return Err(MjError::InvalidModel("cannot move the model root".to_string()));
    }
    let mut to = body_path(root, new_parent)?;

    if to.starts_with(&from) {
        return Err(MjError::InvalidModel(format!(
            "cannot move body '{body_name}' under itself or its descendant '{new_parent}'"
        )));
    }

    let world = pose_along(root, &from, &compiler)?;
    let parent_world = pose_along(root, &to, &compiler)?;
    let local = world.relative_to(parent_world);

    let Some((&index, container_path)) = from.split_last() else {
        return Err(MjError::InvalidModel("empty body path".to_string()));
    };
    let container = root
        .at_path_mut(container_path)
        .ok_or_else(|| MjError::not_found(ObjectKind::Body, body_name))?;
    let mut body = container.children.remove(index);

    // Removing the body shifts later siblings one slot to the left.
    let depth = container_path.len();
    if to.len() > depth && to[..depth] == *container_path && to[depth] > index {
        to[depth] -= 1;
    }

    write_pose(&mut body, local);
    root.at_path_mut(&to)
        .ok_or_else(|| MjError::not_found(ObjectKind::Body, new_parent))?
        .push_child(body);
    debug!(body = body_name, parent = new_parent, "reparented body");
    Ok(())
}

/// Re-express one element attached to a body whose frame changes by
/// `delta` (old body frame → new body frame).
fn reexpress(child: &mut Element, delta: Pose, compiler: &CompilerSettings) -> Result<(), MjError> {
    match child.tag.as_str() {
        "geom" | "site" if child.has_attr("fromto") => {
            if let Some([x0, y0, z0, x1, y1, z1]) = child.fixed::<6>("fromto")? {
                let a = delta.transform_point(Vec3::new(x0, y0, z0));
                let b = delta.transform_point(Vec3::new(x1, y1, z1));
                child.set_numbers("fromto", &snap(&[a.x, a.y, a.z, b.x, b.y, b.z]));
            }
        }
        "inertial" if child.has_attr("fullinertia") => {
            let moved = delta.compose(local_pose(child, compiler)?);
            if let Some(full) = child.fixed::<6>("fullinertia")? {
                child.set_numbers("fullinertia", &snap(&rotate_inertia(full, moved.quat)));
            }
            for key in ALT_ORIENTATIONS {
                child.remove_attr(key);
            }
            child.remove_attr("quat");
            write_vec(child, "pos", moved.pos);
        }
        "body" | "geom" | "site" | "camera" | "inertial" | "frame" => {
            let pose = local_pose(child, compiler)?;
            write_pose(child, delta.compose(pose));
        }
        "joint" => {
            let pos = child.fixed::<3>("pos")?.map(Vec3::from_array).unwrap_or_else(Vec3::zero);
            let axis = child
                .fixed::<3>("axis")?
                .map(Vec3::from_array)
                .unwrap_or(Vec3::new(0.0, 0.0, 1.0));
            write_vec(child, "pos", delta.transform_point(pos));
            child.set_numbers("axis", &snap(&delta.transform_vector(axis).to_array()));
        }
        "light" => {
            let pos = child.fixed::<3>("pos")?.map(Vec3::from_array).unwrap_or_else(Vec3::zero);
            let dir = child
                .fixed::<3>("dir")?
                .map(Vec3::from_array)
                .unwrap_or(Vec3::new(0.0, 0.0, -1.0));
            write_vec(child, "pos", delta.transform_point(pos));
            child.set_numbers("dir", &snap(&delta.transform_vector(dir).to_array()));
        }
        _ => {}
    }
    Ok(())
}

/// `R·I·Rᵀ` for a tensor in `fullinertia` order (`ixx iyy izz ixy ixz iyz`).
fn rotate_inertia([xx, yy, zz, xy, xz, yz]: [f64; 6], q: Quaternion) -> [f64; 6] {
    let r = [
        q.rotate(Vec3::new(1.0, 0.0, 0.0)).to_array(),
        q.rotate(Vec3::new(0.0, 1.0, 0.0)).to_array(),
        q.rotate(Vec3::new(0.0, 0.0, 1.0)).to_array(),
    ];
    let inertia = [[xx, xy, xz], [xy, yy, yz], [xz, yz, zz]];
    // r[j][i] is R(i, j): the columns of R are the rotated axes.
    let rot = |i: usize, j: usize| r[j][i];
    let out = |a: usize, b: usize| {
        let mut sum = 0.0;
        for (i, row) in inertia.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                sum += rot(a, i) * v * rot(b, j);
            }
        }
        sum
    };
    [out(0, 0), out(1, 1), out(2, 2), out(0, 1), out(0, 2), out(1, 2)]
}

fn write_pose(element: &mut Element, pose: Pose) {
    for key in ALT_ORIENTATIONS {
        element.remove_attr(key);
    }
    write_vec(element, "pos", pose.pos);
    let q = pose.quat.normalized().unwrap_or_else(Quaternion::identity);
    let is_identity = (q.w.abs() - 1.0).abs() < SNAP_EPS
        && q.x.abs() < SNAP_EPS
        && q.y.abs() < SNAP_EPS
        && q.z.abs() < SNAP_EPS;
    if is_identity {
        element.remove_attr("quat");
    } else {
        element.set_numbers("quat", &snap(&q.to_array()));
    }
}

/// Write a vector attribute, dropping it when it is zero.
fn write_vec(element: &mut Element, key: &str, v: Vec3) {
    if v.norm() < SNAP_EPS {
        element.remove_attr(key);
    } else {
        element.set_numbers(key, &snap(&v.to_array()));
    }
}

fn snap(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|&v| if v.abs() < SNAP_EPS { 0.0 } else { v })
        .collect()
}

fn body_path(root: &Element, name: &str) -> Result<Vec<usize>, MjError> {
    let path = if name == "world" || name == "worldbody" {
        root.path_to(&|e: &Element| e.tag == "worldbody")
    } else {
        root.path_to(&|e: &Element| e.tag == "body" && e.name() == Some(name))
    };
    path.ok_or_else(|| MjError::not_found(ObjectKind::Body, name))
}

/// Compose the placements of every `body`/`frame` on a child-index path.
fn pose_along(root: &Element, path: &[usize], compiler: &CompilerSettings) -> Result<Pose, MjError> {
    let mut node = root;
    let mut pose = Pose::identity();
    for &i in path {
        node = node
            .children
            .get(i)
            .ok_or_else(|| MjError::InvalidModel("stale element path".to_string()))?;
        if node.tag == "body" || node.tag == "frame" {
            pose = pose.compose(local_pose(node, compiler)?);
        }
    }
    Ok(pose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2};

    const ARM: &str = r#"
<mujoco>
  <worldbody>
    <light name="top" pos="0 0 3"/>
    <body name="torso" pos="0 0 1">
      <geom name="chest" type="box" pos="0.1 0 0" size="0.1 0.1 0.1"/>
      <geom name="spine" type="capsule" fromto="0 0 0 0 0 0.4" size="0.02"/>
      <site name="imu" pos="0 0.05 0"/>
      <joint name="waist" type="hinge" axis="1 0 0"/>
      <light name="lamp" pos="0 0 0.2" dir="1 0 0"/>
      <body name="arm" pos="0.2 0 0.3" euler="0 0 90">
        <geom name="hand" pos="0.3 0 0" size="0.03"/>
      </body>
    </body>
    <body name="table" pos="1 0 0"/>
  </worldbody>
</mujoco>"#;

    fn assert_vec(v: Vec3, x: f64, y: f64, z: f64) {
        assert!((v.x - x).abs() < 1e-9, "x={} want {x}", v.x);
        assert!((v.y - y).abs() < 1e-9, "y={} want {y}", v.y);
        assert!((v.z - z).abs() < 1e-9, "z={} want {z}", v.z);
    }

    fn assert_pose(a: Pose, b: Pose) {
        assert_vec(a.pos, b.pos.x, b.pos.y, b.pos.z);
        // q and -q are the same rotation.
        let dot = a.quat.w * b.quat.w + a.quat.x * b.quat.x + a.quat.y * b.quat.y + a.quat.z * b.quat.z;
        assert!((dot.abs() - 1.0).abs() < 1e-9, "{a:?} vs {b:?}");
    }

    fn child_world(root: &Element, body: &str, tag: &str, name: &str) -> Pose {
        let compiler = CompilerSettings::from_root(root);
        let body_world = world_pose(root, body).unwrap();
        let child = root.find(tag, name).unwrap();
        body_world.compose(local_pose(child, &compiler).unwrap())
    }

    // ── orientation parsing ─────────────────────────────────────────────────

    #[test]
    fn orientation_forms_agree() {
        let yaw90 = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let deg = CompilerSettings::default();
        let rad = CompilerSettings {
            radians: true,
            ..CompilerSettings::default()
        };
        let cases = [
            (Element::new("body").with_attr("quat", "2 0 0 2"), &deg),
            (Element::new("body").with_attr("axisangle", "0 0 1 90"), &deg),
            (
                Element::new("body").with_attr("axisangle", &format!("0 0 1 {FRAC_PI_2}")),
                &rad,
            ),
            (Element::new("body").with_attr("euler", "0 0 90"), &deg),
            (Element::new("body").with_attr("xyaxes", "0 1 0 -1 0 0"), &deg),
        ];
        for (element, compiler) in &cases {
            let pose = local_pose(element, compiler).unwrap();
            assert_pose(pose, Pose::new(Vec3::zero(), yaw90));
        }
    }

    #[test]
    fn zaxis_points_local_z() {
        let e = Element::new("site").with_attr("zaxis", "1 0 0");
        let q = local_pose(&e, &CompilerSettings::default()).unwrap().quat;
        assert_vec(q.rotate(Vec3::new(0.0, 0.0, 1.0)), 1.0, 0.0, 0.0);
    }

    #[test]
    fn extrinsic_and_intrinsic_euler_differ() {
        let e = Element::new("body").with_attr("euler", "90 0 90");
        let intrinsic = local_pose(&e, &CompilerSettings::default()).unwrap().quat;
        let extrinsic = local_pose(
            &e,
            &CompilerSettings {
                radians: false,
                eulerseq: "XYZ".to_string(),
            },
        )
        .unwrap()
        .quat;
        // intrinsic = Rx * Rz, extrinsic = Rz * Rx.
        let y = Vec3::new(0.0, 1.0, 0.0);
        assert_vec(intrinsic.rotate(y), -1.0, 0.0, 0.0);
        assert_vec(extrinsic.rotate(y), 0.0, 0.0, 1.0);
        let x = Vec3::new(1.0, 0.0, 0.0);
        assert_vec(intrinsic.rotate(x), 0.0, 0.0, 1.0);
        assert_vec(extrinsic.rotate(x), 0.0, 1.0, 0.0);
    }

    #[test]
    fn compiler_settings_are_read() {
        let root = parse_str(r#"<mujoco><compiler angle="radian" eulerseq="zyx"/></mujoco>"#)
            .unwrap();
        let c = CompilerSettings::from_root(&root);
        assert!(c.radians);
        assert_eq!(c.eulerseq, "zyx");
    }

    #[test]
    fn zero_quaternion_is_rejected() {
        let e = Element::new("body").with_attr("quat", "0 0 0 0");
        assert!(matches!(
            local_pose(&e, &CompilerSettings::default()),
            Err(MjError::InvalidAttribute { .. })
        ));
    }

    // ── set_body_frame ──────────────────────────────────────────────────────

    #[test]
    fn set_body_frame_keeps_attached_elements_in_place() {
        let mut root = parse_str(ARM).unwrap();
        let arm_before = world_pose(&root, "arm").unwrap();
        let chest_before = child_world(&root, "torso", "geom", "chest");
        let imu_before = child_world(&root, "torso", "site", "imu");

        let new_frame = Pose::new(
            Vec3::new(0.5, -0.2, 2.0),
            Quaternion::from_axis_angle(Vec3::new(0.3, 1.0, 0.2), 1.1).unwrap(),
        );
        set_body_frame(&mut root, "torso", new_frame).unwrap();

        let torso = root.find("body", "torso").unwrap();
        assert!(torso.has_attr("quat"));
        assert_pose(world_pose(&root, "torso").unwrap(), new_frame);
        assert_pose(world_pose(&root, "arm").unwrap(), arm_before);
        assert_pose(child_world(&root, "torso", "geom", "chest"), chest_before);
        assert_pose(child_world(&root, "torso", "site", "imu"), imu_before);
        // The grandchild is untouched locally.
        assert_eq!(
            root.find("geom", "hand").unwrap().numbers("pos").unwrap(),
            Some(vec![0.3, 0.0, 0.0])
        );
    }

    #[test]
    fn set_body_frame_rewrites_joint_fromto_and_light() {
        let mut root = parse_str(ARM).unwrap();
        let yaw90 = Quaternion::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), FRAC_PI_2).unwrap();
        set_body_frame(&mut root, "torso", Pose::new(Vec3::new(0.0, 0.0, 1.5), yaw90)).unwrap();

        // Joint axis was world +x; in the yawed frame it is local -y.
        let joint = root.find("joint", "waist").unwrap();
        let axis = joint.fixed::<3>("axis").unwrap().unwrap();
        assert_vec(Vec3::from_array(axis), 0.0, -1.0, 0.0);
        // Joint sat at the old origin, now 0.5 below the new one.
        let pos = joint.fixed::<3>("pos").unwrap().unwrap();
        assert_vec(Vec3::from_array(pos), 0.0, 0.0, -0.5);

        let spine = root.find("geom", "spine").unwrap();
        let fromto = spine.fixed::<6>("fromto").unwrap().unwrap();
        assert_vec(Vec3::new(fromto[0], fromto[1], fromto[2]), 0.0, 0.0, -0.5);
        assert_vec(Vec3::new(fromto[3], fromto[4], fromto[5]), 0.0, 0.0, -0.1);
        assert!(!spine.has_attr("pos"));

        let lamp = root.find("light", "lamp").unwrap();
        let dir = lamp.fixed::<3>("dir").unwrap().unwrap();
        assert_vec(Vec3::from_array(dir), 0.0, -1.0, 0.0);
    }

    #[test]
    fn set_body_frame_replaces_alternative_orientation() {
        let mut root = parse_str(ARM).unwrap();
        set_body_frame(&mut root, "arm", Pose::identity()).unwrap();
        let arm = root.find("body", "arm").unwrap();
        assert!(!arm.has_attr("euler"));
        assert!(!arm.has_attr("quat"));
        assert!(!arm.has_attr("pos"));
        // hand geom absorbed the old arm frame: 0.3 along the arm's x (world y).
        let hand = arm.child("geom").unwrap().fixed::<3>("pos").unwrap().unwrap();
        assert_vec(Vec3::from_array(hand), 0.2, 0.3, 0.3);
    }

    #[test]
    fn set_body_frame_rotates_full_inertia() {
        let mut root = parse_str(
            r#"<mujoco><worldbody>
                 <body name="link" pos="0 0 1">
                   <inertial mass="1" pos="0.1 0 0" fullinertia="1 2 3 0.1 0 0"/>
                 </body>
               </worldbody></mujoco>"#,
        )
        .unwrap();
        let yaw = Quaternion::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), 0.5).unwrap();
        set_body_frame(&mut root, "link", Pose::new(Vec3::new(0.0, 0.0, 1.0), yaw)).unwrap();

        let inertial = root.find("body", "link").unwrap().child("inertial").unwrap();
        assert!(!inertial.has_attr("quat"));
        let full = inertial.fixed::<6>("fullinertia").unwrap().unwrap();
        // Rotating the written tensor back by the new frame recovers the original.
        let restored = rotate_inertia(full, yaw);
        for (got, want) in restored.iter().zip([1.0, 2.0, 3.0, 0.1, 0.0, 0.0]) {
            assert!((got - want).abs() < 1e-9, "{restored:?}");
        }
        assert!((full[0] + full[1] + full[2] - 6.0).abs() < 1e-9);
        let pos = inertial.fixed::<3>("pos").unwrap().unwrap();
        assert_vec(yaw.rotate(Vec3::from_array(pos)), 0.1, 0.0, 0.0);
    }

    #[test]
    fn near_zero_components_are_written_as_zero() {
        let mut root = parse_str(ARM).unwrap();
        set_body_frame(
            &mut root,
            "table",
            Pose::new(Vec3::new(1e-13, 0.0, 1.0), Quaternion::identity()),
        )
        .unwrap();
        let table = root.find("body", "table").unwrap();
        assert_eq!(table.numbers("pos").unwrap(), Some(vec![0.0, 0.0, 1.0]));

        set_body_frame(
            &mut root,
            "table",
            Pose::new(Vec3::new(0.0, 5e-13, 0.0), Quaternion::identity()),
        )
        .unwrap();
        assert!(!root.find("body", "table").unwrap().has_attr("pos"));
    }

    #[test]
    fn set_body_frame_unknown_body() {
        let mut root = parse_str(ARM).unwrap();
        let err = set_body_frame(&mut root, "tail", Pose::identity()).unwrap_err();
        assert!(matches!(err, MjError::NotFound { .. }));
    }

    // ── reparent_body ───────────────────────────────────────────────────────

    #[test]
    fn reparent_keeps_world_pose() {
        let mut root = parse_str(ARM).unwrap();
        let before = world_pose(&root, "arm").unwrap();
        reparent_body(&mut root, "arm", "table").unwrap();

        let table = root.find("body", "table").unwrap();
        assert!(table.child("body").is_some());
        assert!(root.find("body", "torso").unwrap().child("body").is_none());
        assert_pose(world_pose(&root, "arm").unwrap(), before);
    }

    #[test]
    fn reparent_to_world() {
        let mut root = parse_str(ARM).unwrap();
        let before = world_pose(&root, "arm").unwrap();
        reparent_body(&mut root, "arm", "world").unwrap();
        let worldbody = root.child("worldbody").unwrap();
        assert_eq!(worldbody.children.last().unwrap().name(), Some("arm"));
        assert_pose(world_pose(&root, "arm").unwrap(), before);
    }

    #[test]
    fn reparent_to_later_sibling_adjusts_path() {
        let mut root = parse_str(
            r#"<mujoco><worldbody>
                 <body name="a" pos="1 0 0"/>
                 <body name="b" pos="0 1 0"/>
               </worldbody></mujoco>"#,
        )
        .unwrap();
        reparent_body(&mut root, "a", "b").unwrap();
        let b = root.find("body", "b").unwrap();
        let a = b.child("body").unwrap();
        assert_eq!(a.name(), Some("a"));
        assert_vec(Vec3::from_array(a.fixed::<3>("pos").unwrap().unwrap()), 1.0, -1.0, 0.0);
    }

    #[test]
    fn reparent_under_descendant_is_rejected() {
        let mut root = parse_str(ARM).unwrap();
        let err = reparent_body(&mut root, "torso", "arm").unwrap_err();
        assert!(matches!(err, MjError::InvalidModel(_)));
        let err = reparent_body(&mut root, "torso", "torso").unwrap_err();
        assert!(matches!(err, MjError::InvalidModel(_)));
    }

    #[test]
    fn world_and_root_cannot_move() {
        let mut root = parse_str(ARM).unwrap();
        for name in ["world", "worldbody"] {
            let err = reparent_body(&mut root, name, "table").unwrap_err();
            assert!(matches!(err, MjError::InvalidModel(_)));
        }
        let mut body_root = parse_str(r#"<body name="b"><body name="c"/></body>"#).unwrap();
        let err = reparent_body(&mut body_root, "b", "c").unwrap_err();
        assert!(matches!(err, MjError::InvalidModel(_)));
    }

    #[test]
    fn reparent_unknown_parent() {
        let mut root = parse_str(ARM).unwrap();
        let err = reparent_body(&mut root, "arm", "ghost").unwrap_err();
        assert!(matches!(err, MjError::NotFound { .. }));
    }

    #[test]
    fn frame_elements_contribute_to_world_pose() {
        let root = parse_str(
            r#"<mujoco><worldbody>
                 <frame pos="0 0 1"><body name="b" pos="1 0 0"/></frame>
               </worldbody></mujoco>"#,
        )
        .unwrap();
        assert_vec(world_pose(&root, "b").unwrap().pos, 1.0, 0.0, 1.0);
        assert_vec(world_pose(&root, "world").unwrap().pos, 0.0, 0.0, 0.0);
    }
}
