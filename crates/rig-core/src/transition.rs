//! Task state for the rig's transitions.
//!
//! These are plain data; `CameraRig` advances them. Progress follows the
//! per-frame loop `p = 0; while p < 1 { apply(p); yield; p += dt / duration }`:
//! a transition applies its first frame when started and settles on the
//! first tick where progress reaches 1.

use glam::Quat;

use camrig_rig_model::focus::FocusPoint;
use camrig_rig_model::node::NodeRef;
use camrig_rig_model::pose::{lerp_clamped, slerp_clamped, Pose};
use camrig_rig_model::settings::TransitionCurves;

/// Progress increment for one frame. Non-positive durations finish at once.
pub(crate) fn step(progress: f32, dt: f32, duration: f32) -> f32 {
    if duration > 0.0 {
        progress + dt / duration
    } else {
        1.0
    }
}

/// Camera-local blend toward a POV.
#[derive(Debug)]
pub(crate) struct PovTransition {
    pub pov_index: usize,
    pub start: Pose,
    pub target: Pose,
    pub duration: f32,
    pub progress: f32,
    pub curves: TransitionCurves,
}

impl PovTransition {
    pub fn sample(&self) -> Pose {
        Pose {
            position: lerp_clamped(
                self.start.position,
                self.target.position,
                self.curves.position.evaluate(self.progress),
            ),
            rotation: slerp_clamped(
                self.start.rotation,
                self.target.rotation,
                self.curves.rotation.evaluate(self.progress),
            ),
        }
    }
}

/// Holder blend toward a new follow target.
#[derive(Debug)]
pub(crate) struct TargetTransition {
    pub target: NodeRef,
    pub duration: f32,
    pub curves: TransitionCurves,
    pub phase: TargetPhase,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum TargetPhase {
    Waiting { remaining: f32 },
    Moving { from: Pose, progress: f32 },
}

/// What the rig restores once the focus queue drains.
#[derive(Debug, Clone)]
pub(crate) struct FocusSnapshot {
    pub target: Option<NodeRef>,
    pub pov_name: String,
    pub rotation: Quat,
}

/// The focus-queue drain loop.
#[derive(Debug)]
pub(crate) struct FocusSequence {
    pub phase: FocusPhase,
}

#[derive(Debug)]
pub(crate) enum FocusPhase {
    /// Pick the head of the queue, or head home when it is empty.
    Next,
    Moving {
        point: FocusPoint,
        from: Pose,
        progress: f32,
    },
    Dwelling {
        remaining: f32,
    },
    Returning {
        from: Pose,
        progress: f32,
        duration: f32,
    },
}

/// One frame of a double-blended move: the goal slides from `from` toward
/// `to` along the eased value while the holder is pulled toward the goal by
/// the same amount.
pub(crate) fn focus_blend(
    current: Pose,
    from: Pose,
    to: Pose,
    eased: f32,
    copy_rotation: bool,
) -> Pose {
    let goal = lerp_clamped(from.position, to.position, eased);
    let position = lerp_clamped(current.position, goal, eased);
    let rotation = if copy_rotation {
        let goal = slerp_clamped(from.rotation, to.rotation, eased);
        slerp_clamped(current.rotation, goal, eased)
    } else {
        current.rotation
    };
    Pose { position, rotation }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camrig_rig_model::easing::EasingCurve;
    use glam::Vec3;

    #[test]
    fn test_step() {
        assert!((step(0.0, 0.25, 1.0) - 0.25).abs() < 1e-6);
        assert_eq!(step(0.3, 0.1, 0.0), 1.0);
        assert_eq!(step(0.3, 0.1, -2.0), 1.0);
    }

    #[test]
    fn test_pov_sample_uses_separate_curves() {
        let t = PovTransition {
            pov_index: 1,
            start: Pose::IDENTITY,
            target: Pose::new(Vec3::new(4.0, 0.0, 0.0), Quat::from_rotation_y(1.0)),
            duration: 1.0,
            progress: 0.5,
            curves: TransitionCurves::new(EasingCurve::EaseIn, EasingCurve::Linear),
        };
        let pose = t.sample();
        assert!((pose.position.x - 1.0).abs() < 1e-5);
        assert!(pose.rotation.abs_diff_eq(Quat::from_rotation_y(0.5), 1e-5));
    }

    #[test]
    fn test_focus_blend_endpoints() {
        let from = Pose::from_position(Vec3::ZERO);
        let to = Pose::new(Vec3::new(0.0, 0.0, 10.0), Quat::from_rotation_y(1.0));
        let at_start = focus_blend(from, from, to, 0.0, true);
        assert!(at_start.approx_eq(&from, 1e-6));
        let at_end = focus_blend(from, from, to, 1.0, true);
        assert!(at_end.approx_eq(&to, 1e-5));

        let no_rot = focus_blend(from, from, to, 1.0, false);
        assert_eq!(no_rot.rotation, Quat::IDENTITY);
    }
}
