//! Scripted rig sessions.
//!
//! A scenario declares scene nodes (with constant linear and angular
//! velocity), rig settings, an initial follow target and a time-ordered
//! script of rig commands. Scenarios are stored as JSON.

use std::collections::HashSet;
use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use camrig_common::{CamRigError, RigResult};

use crate::focus::{DEFAULT_DWELL_DURATION, DEFAULT_MOVE_DURATION};
use crate::pose::Pose;
use crate::pov::PovSelector;
use crate::settings::{RigSettings, TransitionCurves};

fn default_transition() -> f32 {
    1.0
}

fn default_move_duration() -> f32 {
    DEFAULT_MOVE_DURATION
}

fn default_dwell() -> f32 {
    DEFAULT_DWELL_DURATION
}

/// Top-level scenario document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Human-readable name.
    #[serde(default)]
    pub name: String,

    /// Frame rate override; falls back to the app config.
    #[serde(default)]
    pub fps: Option<u32>,

    /// Simulated seconds.
    pub duration_secs: f64,

    /// Rig construction settings.
    pub rig: RigSettings,

    /// Scene nodes.
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,

    /// Initial follow target.
    #[serde(default)]
    pub follow: Option<String>,

    /// Commands, applied at the first frame whose start time reaches `at_secs`.
    #[serde(default)]
    pub script: Vec<ScriptStep>,
}

/// A scene node and its motion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    /// World units per second.
    #[serde(default)]
    pub velocity: Vec3,
    /// Scaled rotation axis, radians per second.
    #[serde(default)]
    pub angular_velocity: Vec3,
}

impl NodeSpec {
    pub fn initial_pose(&self) -> Pose {
        Pose::new(self.position, self.rotation.normalize())
    }

    pub fn is_static(&self) -> bool {
        self.velocity == Vec3::ZERO && self.angular_velocity == Vec3::ZERO
    }
}

/// One scheduled command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptStep {
    pub at_secs: f64,
    pub command: RigCommand,
}

/// Commands a script can issue against the rig or the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RigCommand {
    ChangePov {
        pov: PovSelector,
        #[serde(default = "default_transition")]
        duration: f32,
        #[serde(default)]
        curves: Option<TransitionCurves>,
    },
    ChangeTarget {
        target: String,
        #[serde(default)]
        duration: f32,
        #[serde(default)]
        delay: f32,
        #[serde(default)]
        curves: Option<TransitionCurves>,
    },
    SetFollowTarget {
        target: Option<String>,
    },
    AddFocusPoint {
        target: String,
        #[serde(default)]
        copy_rotation: bool,
        #[serde(default = "default_move_duration")]
        move_duration: f32,
        #[serde(default = "default_dwell")]
        dwell: f32,
        #[serde(default)]
        pov: Option<String>,
    },
    ChangeFov {
        fov: f32,
        #[serde(default)]
        duration: f32,
    },
    FovBounce {
        delta: f32,
        duration_in: f32,
        duration_out: f32,
        #[serde(default)]
        end_target: Option<f32>,
    },
    SetCopyFollowRotation {
        enabled: bool,
    },
    SetFollowLerp {
        #[serde(default)]
        position: Option<f32>,
        #[serde(default)]
        rotation: Option<f32>,
    },
    ResetFollowLerp,
    /// Drop a node from the scene; the rig keeps only a dead reference.
    RemoveNode {
        name: String,
    },
}

impl RigCommand {
    /// Short name for logs and traces.
    pub fn kind(&self) -> &'static str {
        match self {
            RigCommand::ChangePov { .. } => "change_pov",
            RigCommand::ChangeTarget { .. } => "change_target",
            RigCommand::SetFollowTarget { .. } => "set_follow_target",
            RigCommand::AddFocusPoint { .. } => "add_focus_point",
            RigCommand::ChangeFov { .. } => "change_fov",
            RigCommand::FovBounce { .. } => "fov_bounce",
            RigCommand::SetCopyFollowRotation { .. } => "set_copy_follow_rotation",
            RigCommand::SetFollowLerp { .. } => "set_follow_lerp",
            RigCommand::ResetFollowLerp => "reset_follow_lerp",
            RigCommand::RemoveNode { .. } => "remove_node",
        }
    }

    /// Node names this command refers to.
    pub fn node_refs(&self) -> Vec<&str> {
        match self {
            RigCommand::ChangeTarget { target, .. } => vec![target.as_str()],
            RigCommand::AddFocusPoint { target, .. } => vec![target.as_str()],
            RigCommand::SetFollowTarget {
                target: Some(target),
            } => vec![target.as_str()],
            RigCommand::RemoveNode { name } => vec![name.as_str()],
            _ => vec![],
        }
    }

    /// POV names this command refers to.
    fn pov_refs(&self) -> Vec<&str> {
        match self {
            RigCommand::ChangePov {
                pov: PovSelector::Name(name),
                ..
            } => vec![name.as_str()],
            RigCommand::AddFocusPoint { pov: Some(pov), .. } => vec![pov.as_str()],
            _ => vec![],
        }
    }
}

impl Scenario {
    /// Parse a scenario from JSON text.
    pub fn from_json(content: &str) -> RigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load and validate a scenario file.
    pub fn load(path: &Path) -> RigResult<Self> {
        if !path.exists() {
            return Err(CamRigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let scenario = Self::from_json(&content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Write the scenario as pretty JSON.
    pub fn save(&self, path: &Path) -> RigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Structural checks: node names unique and referenced names declared,
    /// named POVs present, times finite and non-negative.
    ///
    /// Unknown POV names are errors here even though the rig itself would
    /// fall back to the first POV; a script naming a missing POV is a typo.
    pub fn validate(&self) -> RigResult<()> {
        self.rig.validate()?;

        if !(self.duration_secs.is_finite() && self.duration_secs > 0.0) {
            return Err(CamRigError::scenario(format!(
                "duration_secs must be positive, got {}",
                self.duration_secs
            )));
        }
        if self.fps == Some(0) {
            return Err(CamRigError::scenario("fps must be greater than zero"));
        }

        let mut names = HashSet::new();
        for node in &self.nodes {
            if !names.insert(node.name.as_str()) {
                return Err(CamRigError::scenario(format!(
                    "duplicate node name {:?}",
                    node.name
                )));
            }
            if !node.position.is_finite()
                || !node.velocity.is_finite()
                || !node.angular_velocity.is_finite()
            {
                return Err(CamRigError::scenario(format!(
                    "node {:?} has non-finite motion",
                    node.name
                )));
            }
            if !node.rotation.is_finite() || node.rotation.length_squared() == 0.0 {
                return Err(CamRigError::scenario(format!(
                    "node {:?} has an invalid rotation",
                    node.name
                )));
            }
        }

        if let Some(follow) = &self.follow {
            if !names.contains(follow.as_str()) {
                return Err(CamRigError::unknown_node(follow));
            }
        }

        for (i, step) in self.script.iter().enumerate() {
            if !(step.at_secs.is_finite() && step.at_secs >= 0.0) {
                return Err(CamRigError::scenario(format!(
                    "script step #{i} has invalid time {}",
                    step.at_secs
                )));
            }
            for node in step.command.node_refs() {
                if !names.contains(node) {
                    return Err(CamRigError::unknown_node(node));
                }
            }
            for pov in step.command.pov_refs() {
                if self.rig.povs.index_of(pov).is_none() {
                    return Err(CamRigError::scenario(format!(
                        "script step #{i} ({}) names unknown POV {pov:?}",
                        step.command.kind()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Script steps ordered by time; steps sharing a time keep file order.
    pub fn ordered_script(&self) -> Vec<ScriptStep> {
        let mut steps = self.script.clone();
        steps.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "name": "sample",
        "duration_secs": 4.0,
        "rig": { "povs": [{ "name": "run" }, { "name": "finish", "fov": 40.0 }] },
        "nodes": [
            { "name": "player", "velocity": [0.0, 0.0, 5.0] },
            { "name": "chest", "position": [3.0, 0.0, 10.0] }
        ],
        "follow": "player",
        "script": [
            { "at_secs": 2.0, "command": { "type": "change_pov", "pov": "finish" } },
            { "at_secs": 0.5, "command": { "type": "add_focus_point", "target": "chest", "dwell": 0.2 } },
            { "at_secs": 2.0, "command": { "type": "reset_follow_lerp" } }
        ]
    }"#;

    #[test]
    fn test_parse_and_validate() {
        let scenario = Scenario::from_json(SAMPLE).unwrap();
        scenario.validate().unwrap();
        assert_eq!(scenario.nodes.len(), 2);
        assert!(!scenario.nodes[0].is_static());
        assert!(scenario.nodes[1].is_static());

        match &scenario.script[1].command {
            RigCommand::AddFocusPoint {
                move_duration,
                dwell,
                copy_rotation,
                ..
            } => {
                assert_eq!(*move_duration, DEFAULT_MOVE_DURATION);
                assert_eq!(*dwell, 0.2);
                assert!(!copy_rotation);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_ordered_script_is_stable() {
        let scenario = Scenario::from_json(SAMPLE).unwrap();
        let kinds: Vec<_> = scenario
            .ordered_script()
            .iter()
            .map(|s| s.command.kind())
            .collect();
        assert_eq!(kinds, vec!["add_focus_point", "change_pov", "reset_follow_lerp"]);
    }

    #[test]
    fn test_unknown_node_rejected() {
        let mut scenario = Scenario::from_json(SAMPLE).unwrap();
        scenario.follow = Some("ghost".to_string());
        assert!(matches!(
            scenario.validate(),
            Err(CamRigError::UnknownNode { .. })
        ));
    }

    #[test]
    fn test_unknown_pov_rejected() {
        let mut scenario = Scenario::from_json(SAMPLE).unwrap();
        scenario.script.push(ScriptStep {
            at_secs: 1.0,
            command: RigCommand::ChangePov {
                pov: PovSelector::Name("aerial".to_string()),
                duration: 1.0,
                curves: None,
            },
        });
        let err = scenario.validate().unwrap_err();
        assert!(err.to_string().contains("aerial"));
    }

    #[test]
    fn test_duplicate_nodes_rejected() {
        let mut scenario = Scenario::from_json(SAMPLE).unwrap();
        scenario.nodes.push(scenario.nodes[0].clone());
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_non_finite_spin_rejected() {
        let mut scenario = Scenario::from_json(SAMPLE).unwrap();
        scenario.nodes[0].angular_velocity = Vec3::new(0.0, f32::NAN, 0.0);
        assert!(scenario.validate().is_err());

        let mut scenario = Scenario::from_json(SAMPLE).unwrap();
        scenario.nodes[0].rotation = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
        assert!(scenario.validate().is_err());

        let mut scenario = Scenario::from_json(SAMPLE).unwrap();
        scenario.nodes[0].rotation = Quat::from_xyzw(f32::INFINITY, 0.0, 0.0, 1.0);
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let scenario = Scenario::from_json(SAMPLE).unwrap();
        let path = std::env::temp_dir()
            .join(format!("camrig-scenario-test-{}", std::process::id()))
            .join("sample.json");
        scenario.save(&path).unwrap();
        let loaded = Scenario::load(&path).unwrap();
        assert_eq!(loaded.name, "sample");
        assert_eq!(loaded.script.len(), 3);
        std::fs::remove_file(&path).ok();
    }
}
