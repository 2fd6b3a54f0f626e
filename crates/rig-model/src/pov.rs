//! Points of view: authored camera offsets inside the holder.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use camrig_common::{CamRigError, RigResult};

use crate::pose::Pose;

/// Default vertical field of view in degrees.
pub const DEFAULT_FOV: f32 = 60.0;

fn default_fov() -> f32 {
    DEFAULT_FOV
}

/// A named camera offset relative to the holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pov {
    /// Unique key within a table.
    pub name: String,
    /// Camera position in holder space.
    #[serde(default)]
    pub local_position: Vec3,
    /// Camera rotation in holder space.
    #[serde(default)]
    pub local_rotation: Quat,
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
}

impl Pov {
    pub fn new(name: impl Into<String>, local_position: Vec3, local_rotation: Quat) -> Self {
        Self {
            name: name.into(),
            local_position,
            local_rotation,
            fov: DEFAULT_FOV,
        }
    }

    pub fn with_fov(mut self, fov: f32) -> Self {
        self.fov = fov;
        self
    }

    /// The camera pose this POV places inside the holder.
    pub fn local_pose(&self) -> Pose {
        Pose::new(self.local_position, self.local_rotation)
    }
}

/// How a caller names a POV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PovSelector {
    Index(usize),
    Name(String),
}

impl From<usize> for PovSelector {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for PovSelector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for PovSelector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl std::fmt::Display for PovSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PovSelector::Index(index) => write!(f, "#{index}"),
            PovSelector::Name(name) => write!(f, "{name:?}"),
        }
    }
}

/// Ordered, non-empty table of POVs with unique names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Pov>", into = "Vec<Pov>")]
pub struct PovTable {
    povs: Vec<Pov>,
}

impl PovTable {
    /// Build a table, rejecting empty input, blank or duplicate names, and
    /// non-positive fields of view.
    pub fn new(povs: Vec<Pov>) -> RigResult<Self> {
        if povs.is_empty() {
            return Err(CamRigError::config("POV table must contain at least one entry"));
        }
        for (i, pov) in povs.iter().enumerate() {
            if pov.name.trim().is_empty() {
                return Err(CamRigError::config(format!("POV #{i} has an empty name")));
            }
            if povs[..i].iter().any(|other| other.name == pov.name) {
                return Err(CamRigError::config(format!(
                    "duplicate POV name {:?}",
                    pov.name
                )));
            }
            if !(pov.fov.is_finite() && pov.fov > 0.0 && pov.fov < 180.0) {
                return Err(CamRigError::config(format!(
                    "POV {:?} has invalid fov {}",
                    pov.name, pov.fov
                )));
            }
        }
        Ok(Self { povs })
    }

    pub fn len(&self) -> usize {
        self.povs.len()
    }

    /// Never true for a table built through `new`.
    pub fn is_empty(&self) -> bool {
        self.povs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pov> {
        self.povs.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Pov> {
        self.povs.get(index)
    }

    /// The first entry, used as the startup POV and as the lookup fallback.
    pub fn first(&self) -> &Pov {
        &self.povs[0]
    }

    /// Position of the POV named `name`, if any.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.povs.iter().position(|pov| pov.name == name)
    }

    /// Resolve a selector to an index.
    ///
    /// Unknown names and out-of-range indices are logged and fall back to 0.
    pub fn resolve(&self, selector: &PovSelector) -> usize {
        let found = match selector {
            PovSelector::Index(index) if *index < self.povs.len() => Some(*index),
            PovSelector::Index(_) => None,
            PovSelector::Name(name) => self.index_of(name),
        };
        found.unwrap_or_else(|| {
            tracing::error!(
                "POV {} doesn't exist, falling back to {:?}",
                selector,
                self.first().name
            );
            0
        })
    }
}

impl std::ops::Index<usize> for PovTable {
    type Output = Pov;

    fn index(&self, index: usize) -> &Pov {
        &self.povs[index]
    }
}

impl TryFrom<Vec<Pov>> for PovTable {
    type Error = CamRigError;

    fn try_from(povs: Vec<Pov>) -> RigResult<Self> {
        Self::new(povs)
    }
}

impl From<PovTable> for Vec<Pov> {
    fn from(table: PovTable) -> Self {
        table.povs
    }
}
