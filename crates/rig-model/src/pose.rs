//! Position + rotation pairs.
//!
//! Blending helpers clamp their factor to `[0.0, 1.0]` so that eased values
//! overshooting the unit range, or follow rates multiplied by a large frame
//! delta, never extrapolate past the goal.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A rigid transform without scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Translation.
    #[serde(default)]
    pub position: Vec3,
    /// Orientation. Serialized as `[x, y, z, w]`.
    #[serde(default)]
    pub rotation: Quat,
}

impl Pose {
    /// Origin, no rotation.
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// A pose at `position` with no rotation.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Interpolate position linearly and rotation spherically.
    pub fn lerp(a: &Pose, b: &Pose, t: f32) -> Pose {
        Pose {
            position: lerp_clamped(a.position, b.position, t),
            rotation: slerp_clamped(a.rotation, b.rotation, t),
        }
    }

    /// Express a local pose in the space this pose lives in.
    pub fn transform(&self, local: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * local.position,
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    /// Component-wise comparison with tolerance.
    ///
    /// Rotations `q` and `-q` describe the same orientation and compare equal.
    pub fn approx_eq(&self, other: &Pose, epsilon: f32) -> bool {
        self.position.abs_diff_eq(other.position, epsilon)
            && (self.rotation.abs_diff_eq(other.rotation, epsilon)
                || self.rotation.abs_diff_eq(-other.rotation, epsilon))
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Clamp a blend factor to the unit range. NaN collapses to zero.
pub fn clamp01(t: f32) -> f32 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

/// `Vec3` lerp with the factor clamped to `[0, 1]`.
pub fn lerp_clamped(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a.lerp(b, clamp01(t))
}

/// `Quat` slerp with the factor clamped to `[0, 1]`.
pub fn slerp_clamped(a: Quat, b: Quat, t: f32) -> Quat {
    a.slerp(b, clamp01(t)).normalize()
}

/// Scalar lerp with the factor clamped to `[0, 1]`.
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * clamp01(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_lerp_midpoint() {
        let a = Pose::from_position(Vec3::ZERO);
        let b = Pose::new(Vec3::new(2.0, 0.0, 0.0), Quat::from_rotation_y(FRAC_PI_2));
        let mid = Pose::lerp(&a, &b, 0.5);
        assert!((mid.position.x - 1.0).abs() < 1e-6);
        let expected = Quat::from_rotation_y(FRAC_PI_2 / 2.0);
        assert!(mid.rotation.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_lerp_clamps_factor() {
        let a = Vec3::ZERO;
        let b = Vec3::ONE;
        assert_eq!(lerp_clamped(a, b, 10.0), b);
        assert_eq!(lerp_clamped(a, b, -3.0), a);
        assert_eq!(lerp_clamped(a, b, f32::NAN), a);
        assert_eq!(lerp_f32(60.0, 40.0, 2.0), 40.0);
    }

    #[test]
    fn test_transform_local_offset() {
        let holder = Pose::new(Vec3::new(0.0, 0.0, 10.0), Quat::from_rotation_y(FRAC_PI_2));
        let local = Pose::from_position(Vec3::new(0.0, 0.0, -5.0));
        let world = holder.transform(&local);
        // Rotating -Z by +90° about Y points along -X.
        assert!(world
            .position
            .abs_diff_eq(Vec3::new(-5.0, 0.0, 10.0), 1e-5));
        assert!(world.rotation.abs_diff_eq(holder.rotation, 1e-6));
    }

    #[test]
    fn test_approx_eq_double_cover() {
        let a = Pose::new(Vec3::ONE, Quat::from_rotation_x(0.3));
        let b = Pose::new(Vec3::ONE, -Quat::from_rotation_x(0.3));
        assert!(a.approx_eq(&b, 1e-6));
    }

    #[test]
    fn test_serde_shape() {
        let pose = Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY);
        let json = serde_json::to_string(&pose).unwrap();
        assert_eq!(json, r#"{"position":[1.0,2.0,3.0],"rotation":[0.0,0.0,0.0,1.0]}"#);

        let parsed: Pose = serde_json::from_str(r#"{"position":[0.0,1.0,0.0]}"#).unwrap();
        assert_eq!(parsed.rotation, Quat::IDENTITY);
    }
}
