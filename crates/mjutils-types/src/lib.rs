//! `mjutils-types` – shared vocabulary for the mjutils crates.
//!
//! - [`MjError`]: the single error type returned by every fallible operation.
//! - Compiled-model enums ([`JointType`], [`BiasType`], [`GainType`],
//!   [`TransmissionType`]) using the physics engine's integer codes.
//! - [`ObjectKind`]: the object tables a name can be resolved against.
//! - [`math`]: rigid-body primitives ([`Vec3`], [`Quaternion`], [`Pose`]).

pub mod math;

use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::Schema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use math::{Pose, Quaternion, Vec3};

/// Global error type spanning XML parsing, file access, name resolution and
/// model validation.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MjError {
    #[error("XML Parse Error: {0}")]
    Parse(String),

    #[error("I/O Error on {path}: {details}")]
    Io { path: String, details: String },

    #[error("No {kind} named '{name}'")]
    NotFound { kind: String, name: String },

    #[error("{kind} index {index} out of range (count {len})")]
    IndexOutOfRange {
        kind: String,
        index: usize,
        len: usize,
    },

    #[error("Invalid attribute '{attribute}' on <{element}>: {details}")]
    InvalidAttribute {
        element: String,
        attribute: String,
        details: String,
    },

    #[error("Invalid Model: {0}")]
    InvalidModel(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),
}

impl MjError {
    /// Shorthand for [`MjError::NotFound`].
    pub fn not_found(kind: impl ToString, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.to_string(),
            name: name.into(),
        }
    }

    /// Wrap an [`std::io::Error`] together with the path it concerns.
    pub fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            details: err.to_string(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Compiled-model enums
// ────────────────────────────────────────────────────────────────────────────

/// Declares an enum that is stored in the compiled model as an integer code
/// and serialized as that code.
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident = $code:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "i32", into = "i32")]
        pub enum $name {
            $($(#[$vmeta])* $variant = $code),+
        }

        impl TryFrom<i32> for $name {
            type Error = MjError;

            fn try_from(code: i32) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok(Self::$variant),)+
                    other => Err(MjError::InvalidModel(format!(
                        "unknown {} code {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> i32 {
                value as i32
            }
        }

        impl JsonSchema for $name {
            fn schema_name() -> String {
                stringify!($name).to_string()
            }

            fn json_schema(generator: &mut SchemaGenerator) -> Schema {
                <i32 as JsonSchema>::json_schema(generator)
            }
        }
    };
}

code_enum! {
    /// Joint type as stored in `jnt_type`.
    JointType {
        /// Six DoF: 3 translational, 3 rotational.
        Free = 0,
        /// Three rotational DoF.
        Ball = 1,
        Slide = 2,
        Hinge = 3,
    }
}

impl JointType {
    /// Number of velocity coordinates (DoFs) the joint contributes.
    pub fn dof_count(self) -> usize {
        match self {
            JointType::Free => 6,
            JointType::Ball => 3,
            JointType::Slide | JointType::Hinge => 1,
        }
    }

    /// Number of position coordinates the joint contributes.
    pub fn qpos_count(self) -> usize {
        match self {
            JointType::Free => 7,
            JointType::Ball => 4,
            JointType::Slide | JointType::Hinge => 1,
        }
    }
}

code_enum! {
    /// Actuator bias type (`actuator_biastype`).
    BiasType {
        None = 0,
        Affine = 1,
        Muscle = 2,
        User = 3,
    }
}

code_enum! {
    /// Actuator gain type (`actuator_gaintype`).
    GainType {
        Fixed = 0,
        Affine = 1,
        Muscle = 2,
        User = 3,
    }
}

code_enum! {
    /// Actuator transmission type (`actuator_trntype`).
    TransmissionType {
        Joint = 0,
        JointInParent = 1,
        SliderCrank = 2,
        Tendon = 3,
        Site = 4,
        Body = 5,
    }
}

/// The object tables a name can be looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Body,
    Joint,
    Geom,
    Site,
    Actuator,
    Sensor,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ObjectKind::Body => "body",
            ObjectKind::Joint => "joint",
            ObjectKind::Geom => "geom",
            ObjectKind::Site => "site",
            ObjectKind::Actuator => "actuator",
            ObjectKind::Sensor => "sensor",
        };
        f.write_str(s)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// String helpers
// ────────────────────────────────────────────────────────────────────────────

/// Return `true` when any of `substrings` occurs in `string`.
pub fn any_substr_in_str<S: AsRef<str>>(substrings: &[S], string: &str) -> bool {
    substrings.iter().any(|s| string.contains(s.as_ref()))
}
