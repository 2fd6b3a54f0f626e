//! Focus points: transient targets visited before returning to the follow target.

use crate::node::NodeRef;

/// Default seconds spent travelling to a focus point.
pub const DEFAULT_MOVE_DURATION: f32 = 1.0;

/// Default seconds spent resting on a focus point once reached.
pub const DEFAULT_DWELL_DURATION: f32 = 0.5;

/// A queued camera visit.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusPoint {
    /// Where to look. Points whose node is gone are skipped.
    pub target: NodeRef,
    /// Copy the target's rotation onto the holder as well as its position.
    pub copy_rotation: bool,
    /// Travel time in seconds.
    pub move_duration: f32,
    /// Rest time in seconds after arriving.
    pub dwell_duration: f32,
    /// POV to switch to while travelling, if any.
    pub pov: Option<String>,
}

impl FocusPoint {
    pub fn new(target: impl Into<NodeRef>) -> Self {
        Self {
            target: target.into(),
            copy_rotation: false,
            move_duration: DEFAULT_MOVE_DURATION,
            dwell_duration: DEFAULT_DWELL_DURATION,
            pov: None,
        }
    }

    /// A point with default travel time that rests for `dwell` seconds.
    pub fn dwell_at(target: impl Into<NodeRef>, dwell: f32) -> Self {
        Self::new(target).with_dwell(dwell)
    }

    pub fn with_copy_rotation(mut self, copy: bool) -> Self {
        self.copy_rotation = copy;
        self
    }

    pub fn with_move_duration(mut self, secs: f32) -> Self {
        self.move_duration = secs;
        self
    }

    pub fn with_dwell(mut self, secs: f32) -> Self {
        self.dwell_duration = secs;
        self
    }

    pub fn with_pov(mut self, pov: impl Into<String>) -> Self {
        self.pov = Some(pov.into());
        self
    }
}
