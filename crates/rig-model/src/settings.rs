//! Authored rig settings.

use serde::{Deserialize, Serialize};

use camrig_common::{CamRigError, RigResult};

use crate::easing::EasingCurve;
use crate::focus::DEFAULT_MOVE_DURATION;
use crate::pose::Pose;
use crate::pov::{PovTable, DEFAULT_FOV};

fn default_follow_lerp() -> f32 {
    10.0
}

fn default_return_duration() -> f32 {
    DEFAULT_MOVE_DURATION
}

/// Everything needed to construct a camera rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigSettings {
    /// POV table; the first entry is applied at construction.
    pub povs: PovTable,

    /// Whether the holder also mirrors the follow target's rotation.
    #[serde(default)]
    pub copy_follow_rotation: bool,

    /// Passive follow rate for position (per second, scaled by frame delta).
    #[serde(default = "default_follow_lerp")]
    pub follow_position_lerp: f32,

    /// Passive follow rate for rotation (per second, scaled by frame delta).
    #[serde(default = "default_follow_lerp")]
    pub follow_rotation_lerp: f32,

    /// Seconds spent travelling back to the follow target after a focus sequence.
    #[serde(default = "default_return_duration")]
    pub focus_return_duration: f32,

    /// Default easing curves.
    #[serde(default)]
    pub curves: CurveSettings,

    /// Lens parameters.
    #[serde(default)]
    pub lens: LensSettings,

    /// Holder pose at construction.
    #[serde(default)]
    pub holder: Pose,
}

/// Default curves used when a call does not supply its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveSettings {
    pub pov_position: EasingCurve,
    pub pov_rotation: EasingCurve,
    pub target_position: EasingCurve,
    pub target_rotation: EasingCurve,
    pub focus_move: EasingCurve,
    pub lens_change: EasingCurve,
}

impl Default for CurveSettings {
    fn default() -> Self {
        Self {
            pov_position: EasingCurve::Linear,
            pov_rotation: EasingCurve::Linear,
            target_position: EasingCurve::Linear,
            target_rotation: EasingCurve::Linear,
            focus_move: EasingCurve::EaseInOut,
            lens_change: EasingCurve::Linear,
        }
    }
}

/// Position/rotation curve pair for a single transition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionCurves {
    pub position: EasingCurve,
    pub rotation: EasingCurve,
}

impl TransitionCurves {
    pub fn new(position: EasingCurve, rotation: EasingCurve) -> Self {
        Self { position, rotation }
    }

    /// The same curve for both channels.
    pub fn uniform(curve: EasingCurve) -> Self {
        Self {
            position: curve.clone(),
            rotation: curve,
        }
    }
}

/// Camera lens parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensSettings {
    /// Field of view before the first POV is applied, in degrees.
    pub fov: f32,
    /// Half the vertical extent of an orthographic view, in world units.
    pub orthographic_size: f32,
    /// Width over height.
    pub aspect: f32,
}

impl Default for LensSettings {
    fn default() -> Self {
        Self {
            fov: DEFAULT_FOV,
            orthographic_size: 5.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl RigSettings {
    pub fn new(povs: PovTable) -> Self {
        Self {
            povs,
            copy_follow_rotation: false,
            follow_position_lerp: default_follow_lerp(),
            follow_rotation_lerp: default_follow_lerp(),
            focus_return_duration: default_return_duration(),
            curves: CurveSettings::default(),
            lens: LensSettings::default(),
            holder: Pose::IDENTITY,
        }
    }

    /// Reject values no rig can run with.
    pub fn validate(&self) -> RigResult<()> {
        let rates = [
            ("follow_position_lerp", self.follow_position_lerp),
            ("follow_rotation_lerp", self.follow_rotation_lerp),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(CamRigError::config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if !self.focus_return_duration.is_finite() {
            return Err(CamRigError::config("focus_return_duration must be finite"));
        }
        if !(self.lens.aspect.is_finite() && self.lens.aspect > 0.0) {
            return Err(CamRigError::config(format!(
                "lens aspect must be positive, got {}",
                self.lens.aspect
            )));
        }
        if !self.holder.position.is_finite() || !self.holder.rotation.is_finite() {
            return Err(CamRigError::config("holder pose must be finite"));
        }
        Ok(())
    }
}
