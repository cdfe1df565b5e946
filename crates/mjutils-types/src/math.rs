//! Rigid-body math used when rewriting MJCF frames.
//!
//! Quaternions follow the MJCF convention: scalar first, `(w, x, y, z)`.
//!
//! # Example
//!
//! ```rust
//! use mjutils_types::math::{Pose, Quaternion, Vec3};
//!
//! // torso sits 1 m above the world origin.
//! let torso = Pose::new(Vec3::new(0.0, 0.0, 1.0), Quaternion::identity());
//! // the head is 0.3 m above the torso.
//! let head = Pose::new(Vec3::new(0.0, 0.0, 0.3), Quaternion::identity());
//!
//! let world_head = torso.compose(head);
//! assert!((world_head.pos.z - 1.3).abs() < 1e-12);
//! ```

// ────────────────────────────────────────────────────────────────────────────
// Vec3
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn from_array(a: [f64; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    pub fn scale(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    pub fn normalized(self) -> Option<Self> {
        let n = self.norm();
        if n < f64::EPSILON {
            None
        } else {
            Some(self.scale(1.0 / n))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Quaternion
// ────────────────────────────────────────────────────────────────────────────

/// A unit quaternion representing a 3-D rotation (w, x, y, z convention).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    /// Create a quaternion.  Use [`Quaternion::normalized`] when the input is
    /// not known to be unit length.
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation (no rotation).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    pub fn from_array(a: [f64; 4]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.w, self.x, self.y, self.z]
    }

    /// Rotation of `angle_rad` about `axis`.  Returns `None` for a zero axis.
    pub fn from_axis_angle(axis: Vec3, angle_rad: f64) -> Option<Self> {
        let axis = axis.normalized()?;
        let (s, c) = (angle_rad * 0.5).sin_cos();
        Some(Self::new(c, axis.x * s, axis.y * s, axis.z * s))
    }

    /// Rotation whose matrix has the given columns (the rotated frame's
    /// x, y and z axes expressed in the parent frame).
    pub fn from_rotation_matrix(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) -> Self {
        let m = [
            [x_axis.x, y_axis.x, z_axis.x],
            [x_axis.y, y_axis.y, z_axis.y],
            [x_axis.z, y_axis.z, z_axis.z],
        ];
        let trace = m[0][0] + m[1][1] + m[2][2];
        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new(
                0.25 * s,
                (m[2][1] - m[1][2]) / s,
                (m[0][2] - m[2][0]) / s,
                (m[1][0] - m[0][1]) / s,
            )
        } else if m[0][0] > m[1][1] && m[0][0] > m[2][2] {
            let s = (1.0 + m[0][0] - m[1][1] - m[2][2]).sqrt() * 2.0;
            Self::new(
                (m[2][1] - m[1][2]) / s,
                0.25 * s,
                (m[0][1] + m[1][0]) / s,
                (m[0][2] + m[2][0]) / s,
            )
        } else if m[1][1] > m[2][2] {
            let s = (1.0 + m[1][1] - m[0][0] - m[2][2]).sqrt() * 2.0;
            Self::new(
                (m[0][2] - m[2][0]) / s,
                (m[0][1] + m[1][0]) / s,
                0.25 * s,
                (m[1][2] + m[2][1]) / s,
            )
        } else {
            let s = (1.0 + m[2][2] - m[0][0] - m[1][1]).sqrt() * 2.0;
            Self::new(
                (m[1][0] - m[0][1]) / s,
                (m[0][2] + m[2][0]) / s,
                (m[1][2] + m[2][1]) / s,
                0.25 * s,
            )
        };
        q.normalized().unwrap_or_else(Self::identity)
    }

    /// Shortest-arc rotation taking unit vector `from` onto unit vector `to`.
    pub fn from_two_vectors(from: Vec3, to: Vec3) -> Option<Self> {
        let from = from.normalized()?;
        let to = to.normalized()?;
        let d = from.dot(to);
        if d < -1.0 + 1e-12 {
            // Antiparallel: half turn about any axis orthogonal to `from`.
            let ortho = from
                .cross(Vec3::new(1.0, 0.0, 0.0))
                .normalized()
                .or_else(|| from.cross(Vec3::new(0.0, 1.0, 0.0)).normalized())?;
            return Some(Self::new(0.0, ortho.x, ortho.y, ortho.z));
        }
        let c = from.cross(to);
        Self::new(1.0 + d, c.x, c.y, c.z).normalized()
    }

    pub fn norm(self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit quaternion, or `None` for a (near) zero quaternion.
    pub fn normalized(self) -> Option<Self> {
        let n = self.norm();
        if n < f64::EPSILON {
            None
        } else {
            Some(Self::new(self.w / n, self.x / n, self.y / n, self.z / n))
        }
    }

    /// Hamilton product: compose two rotations.
    pub fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }

    /// Conjugate (== inverse for a unit quaternion).
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Inverse rotation; also correct for non-unit input.
    pub fn inverse(self) -> Self {
        let n2 = self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z;
        if n2 < f64::EPSILON {
            return Self::identity();
        }
        let c = self.conjugate();
        Self::new(c.w / n2, c.x / n2, c.y / n2, c.z / n2)
    }

    /// Rotate a vector by this quaternion: p' = q * p * q*.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let p = Self::new(0.0, v.x, v.y, v.z);
        let rotated = self.mul(p).mul(self.conjugate());
        Vec3::new(rotated.x, rotated.y, rotated.z)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pose
// ────────────────────────────────────────────────────────────────────────────

/// A rigid-body frame: position and orientation of a child frame expressed
/// in its parent frame.
///
/// To convert a point expressed in the child frame into the parent frame,
/// rotate it by `quat` then add `pos`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub pos: Vec3,
    pub quat: Quaternion,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    pub fn new(pos: Vec3, quat: Quaternion) -> Self {
        Self { pos, quat }
    }

    /// The identity frame.
    pub fn identity() -> Self {
        Self::new(Vec3::zero(), Quaternion::identity())
    }

    /// Compose two frames.
    ///
    /// If `self` = T_A_B and `other` = T_B_C, the result is T_A_C.
    pub fn compose(self, other: Self) -> Self {
        let pos = self.pos.add(self.quat.rotate(other.pos));
        let quat = self.quat.mul(other.quat);
        Self::new(pos, quat)
    }

    /// Inverse frame: T_A_B becomes T_B_A.
    pub fn inverse(self) -> Self {
        let inv = self.quat.inverse();
        Self::new(inv.rotate(self.pos).scale(-1.0), inv)
    }

    /// Map a point from this frame into the parent frame.
    pub fn transform_point(self, p: Vec3) -> Vec3 {
        self.pos.add(self.quat.rotate(p))
    }

    /// Map a direction from this frame into the parent frame.
    pub fn transform_vector(self, v: Vec3) -> Vec3 {
        self.quat.rotate(v)
    }

    /// Express `self` in the frame `base`: both are given in a common frame.
    pub fn relative_to(self, base: Self) -> Self {
        base.inverse().compose(self)
    }
}
