//! Named sensor observables.
//!
//! Every sensor of a compiled model is an observable that a task can switch
//! on or off.  [`ObservableSet`] keeps them in declaration order so the
//! enabled subset comes back in a stable order.
//!
//! # Example
//!
//! ```rust
//! use mjutils_physics::{Observable, ObservableSet};
//!
//! let mut set = ObservableSet::default();
//! set.add(Observable::new("joint_pos", "jointpos", 1));
//! set.add(Observable::new("imu_accel", "accelerometer", 3));
//! set.add(Observable::new("imu_gyro", "gyro", 3));
//!
//! assert_eq!(set.enable_matching(&["imu"]), 2);
//! set.disable("imu_gyro").unwrap();
//! assert_eq!(set.enabled_names(), vec!["imu_accel"]);
//! ```

use mjutils_types::{MjError, ObjectKind, any_substr_in_str};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{PhysicsModel, entry};

/// One observable and whether it is currently enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observable {
    pub name: String,
    pub sensor_type: String,
    /// Number of scalar values produced per step.
    pub dim: usize,
    pub enabled: bool,
}

impl Observable {
    /// A disabled observable.
    pub fn new(name: impl Into<String>, sensor_type: impl Into<String>, dim: usize) -> Self {
        Self {
            name: name.into(),
            sensor_type: sensor_type.into(),
            dim,
            enabled: false,
        }
    }
}

/// Ordered collection of observables with unique names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservableSet {
    observables: Vec<Observable>,
}

impl ObservableSet {
    /// One disabled observable per sensor of `model`.
    ///
    /// Unnamed sensors are called `sensor_<id>`.
    pub fn from_model(model: &PhysicsModel) -> Result<Self, MjError> {
        let mut set = Self::default();
        for id in 0..model.nsensor() {
            let name = model.id2name(id, ObjectKind::Sensor)?;
            let name = if name.is_empty() {
                format!("sensor_{id}")
            } else {
                name.to_string()
            };
            let sensor_type = entry(&model.sensor_type, "sensor_type", id)?;
            let dim = *entry(&model.sensor_dim, "sensor_dim", id)?;
            set.add(Observable::new(name, sensor_type.clone(), dim));
        }
        Ok(set)
    }

    /// Insert `observable`, replacing one with the same name in place.
    pub fn add(&mut self, observable: Observable) {
        match self.position(&observable.name) {
            Some(i) => self.observables[i] = observable,
            None => self.observables.push(observable),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Observable> {
        self.observables.iter().find(|o| o.name == name)
    }

    pub fn enable(&mut self, name: &str) -> Result<(), MjError> {
        self.set_enabled(name, true)
    }

    pub fn disable(&mut self, name: &str) -> Result<(), MjError> {
        self.set_enabled(name, false)
    }

    /// Enable every observable whose name contains one of `substrings`.
    /// Returns how many matched.
    pub fn enable_matching<S: AsRef<str>>(&mut self, substrings: &[S]) -> usize {
        let mut count = 0;
        for obs in &mut self.observables {
            if any_substr_in_str(substrings, &obs.name) {
                obs.enabled = true;
                count += 1;
            }
        }
        debug!(count, "enabled matching observables");
        count
    }

    /// Enabled observables in insertion order.
    pub fn enabled(&self) -> Vec<&Observable> {
        self.observables.iter().filter(|o| o.enabled).collect()
    }

    pub fn enabled_names(&self) -> Vec<&str> {
        self.enabled().into_iter().map(|o| o.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.observables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observable> {
        self.observables.iter()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.observables.iter().position(|o| o.name == name)
    }

    fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), MjError> {
        let i = self
            .position(name)
            .ok_or_else(|| MjError::not_found("observable", name))?;
        self.observables[i].enabled = enabled;
        Ok(())
    }
}
