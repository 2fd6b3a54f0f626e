//! The camera rig.
//!
//! A [`CameraRig`] drives two transforms: the *holder*, which tracks follow
//! targets and focus points in world space, and the camera's local pose inside
//! the holder, which comes from the active POV. Three transition categories
//! exist, each in its own [`TaskSlot`]:
//!
//! - **POV change:** camera-local blend plus a lens FOV tween.
//! - **Target change:** holder blend to a new follow target.
//! - **Focus sequence:** holder visits queued focus points, then returns.
//!
//! At most one of target change and focus sequence moves the holder in a
//! frame; passive following runs only when neither does. Events raised
//! during a call are delivered when the call returns.

use std::collections::VecDeque;
use std::sync::mpsc::Receiver;

use serde::Serialize;

use camrig_common::clock::sanitize_dt;
use camrig_common::RigResult;
use camrig_rig_model::focus::FocusPoint;
use camrig_rig_model::node::NodeRef;
use camrig_rig_model::pose::{lerp_clamped, slerp_clamped, Pose};
use camrig_rig_model::pov::{Pov, PovSelector, PovTable};
use camrig_rig_model::settings::{CurveSettings, RigSettings, TransitionCurves};

use crate::events::{EventBus, RigEvent, SubscriptionId};
use crate::lens::LensController;
use crate::task::TaskSlot;
use crate::transition::{
    focus_blend, step, FocusPhase, FocusSequence, FocusSnapshot, PovTransition, TargetPhase,
    TargetTransition,
};

/// Coarse rig state, by the highest-priority transition in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RigState {
    /// Locked to the active POV, passively following.
    Idle,
    /// Only a POV blend is running.
    ChangingPov,
    /// A follow-target change is waiting out its delay or moving.
    ChangingTarget,
    /// The focus queue is draining.
    Focusing,
}

type Callback = Box<dyn FnOnce()>;

/// Camera holder + POV state machine.
pub struct CameraRig {
    povs: PovTable,
    active_pov: usize,
    /// False once a POV blend was stopped short of its pose.
    pov_settled: bool,
    holder: Pose,
    camera_local: Pose,
    lens: LensController,

    follow_target: Option<NodeRef>,
    copy_follow_rotation: bool,
    follow_position_lerp: f32,
    follow_rotation_lerp: f32,
    default_follow_position_lerp: f32,
    default_follow_rotation_lerp: f32,
    focus_return_duration: f32,
    curves: CurveSettings,

    pov_task: TaskSlot<PovTransition>,
    target_task: TaskSlot<TargetTransition>,
    focus_task: TaskSlot<FocusSequence>,
    focus_queue: VecDeque<FocusPoint>,
    snapshot: Option<FocusSnapshot>,

    pov_callbacks: Vec<Callback>,
    target_callbacks: Vec<Callback>,
    events: EventBus,
    last_dt: f32,
}

impl CameraRig {
    /// Build a rig and snap it to the first POV.
    pub fn new(settings: RigSettings) -> RigResult<Self> {
        settings.validate()?;
        let RigSettings {
            povs,
            copy_follow_rotation,
            follow_position_lerp,
            follow_rotation_lerp,
            focus_return_duration,
            curves,
            lens,
            holder,
        } = settings;

        let lens = LensController::new(&lens, curves.lens_change.clone());
        let mut rig = Self {
            povs,
            active_pov: 0,
            pov_settled: false,
            holder,
            camera_local: Pose::IDENTITY,
            lens,
            follow_target: None,
            copy_follow_rotation,
            follow_position_lerp,
            follow_rotation_lerp,
            default_follow_position_lerp: follow_position_lerp,
            default_follow_rotation_lerp: follow_rotation_lerp,
            focus_return_duration,
            curves,
            pov_task: TaskSlot::new("pov"),
            target_task: TaskSlot::new("target"),
            focus_task: TaskSlot::new("focus"),
            focus_queue: VecDeque::new(),
            snapshot: None,
            pov_callbacks: Vec::new(),
            target_callbacks: Vec::new(),
            events: EventBus::new(),
            last_dt: 0.0,
        };
        rig.apply_pov(0, 0.0, None);
        rig.events.flush();

        tracing::debug!(
            povs = rig.povs.len(),
            start = %rig.active_pov().name,
            "camera rig ready"
        );
        Ok(rig)
    }

    // ---- state -----------------------------------------------------------

    pub fn povs(&self) -> &PovTable {
        &self.povs
    }

    pub fn active_pov(&self) -> &Pov {
        &self.povs[self.active_pov]
    }

    pub fn active_pov_index(&self) -> usize {
        self.active_pov
    }

    /// World pose of the holder.
    pub fn holder(&self) -> Pose {
        self.holder
    }

    /// Camera pose inside the holder.
    pub fn camera_local(&self) -> Pose {
        self.camera_local
    }

    /// Camera pose in world space.
    pub fn camera_world(&self) -> Pose {
        self.holder.transform(&self.camera_local)
    }

    pub fn lens(&self) -> &LensController {
        &self.lens
    }

    pub fn lens_mut(&mut self) -> &mut LensController {
        &mut self.lens
    }

    pub fn fov(&self) -> f32 {
        self.lens.fov()
    }

    /// The target being passively followed. `None` while a target change is
    /// moving or a focus sequence runs.
    pub fn follow_target(&self) -> Option<&NodeRef> {
        self.follow_target.as_ref()
    }

    pub fn is_focusing(&self) -> bool {
        self.focus_task.is_active()
    }

    /// Focus points not yet reached, including the one being approached.
    pub fn focus_queue_len(&self) -> usize {
        self.focus_queue.len()
    }

    pub fn state(&self) -> RigState {
        if self.focus_task.is_active() {
            RigState::Focusing
        } else if self.target_task.is_active() {
            RigState::ChangingTarget
        } else if self.pov_task.is_active() {
            RigState::ChangingPov
        } else {
            RigState::Idle
        }
    }

    // ---- follow tuning ---------------------------------------------------

    pub fn copy_follow_rotation(&self) -> bool {
        self.copy_follow_rotation
    }

    pub fn set_copy_follow_rotation(&mut self, copy: bool) {
        self.copy_follow_rotation = copy;
    }

    pub fn follow_position_lerp(&self) -> f32 {
        self.follow_position_lerp
    }

    pub fn set_follow_position_lerp(&mut self, rate: f32) {
        self.follow_position_lerp = rate.max(0.0);
    }

    pub fn reset_follow_position_lerp(&mut self) {
        self.follow_position_lerp = self.default_follow_position_lerp;
    }

    pub fn follow_rotation_lerp(&self) -> f32 {
        self.follow_rotation_lerp
    }

    pub fn set_follow_rotation_lerp(&mut self, rate: f32) {
        self.follow_rotation_lerp = rate.max(0.0);
    }

    pub fn reset_follow_rotation_lerp(&mut self) {
        self.follow_rotation_lerp = self.default_follow_rotation_lerp;
    }

    /// Move the holder without blending.
    pub fn teleport(&mut self, pose: Pose) {
        self.holder = pose;
    }

    // ---- observers -------------------------------------------------------

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&RigEvent) + 'static,
    {
        self.events.subscribe(callback)
    }

    pub fn subscribe_channel(&mut self) -> (SubscriptionId, Receiver<RigEvent>) {
        self.events.subscribe_channel()
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Replace the completion callbacks of the running POV change.
    ///
    /// Runs `callback` immediately when no POV change is in flight.
    pub fn set_on_pov_changed(&mut self, callback: impl FnOnce() + 'static) {
        if !self.pov_task.is_active() {
            callback();
            return;
        }
        self.pov_callbacks = vec![Box::new(callback)];
    }

    /// Add a completion callback to the running POV change.
    ///
    /// Runs `callback` immediately when no POV change is in flight.
    pub fn append_on_pov_changed(&mut self, callback: impl FnOnce() + 'static) {
        if !self.pov_task.is_active() {
            callback();
            return;
        }
        self.pov_callbacks.push(Box::new(callback));
    }

    /// Add a completion callback to the running target change.
    ///
    /// Runs `callback` immediately when no target change is in flight.
    pub fn append_on_target_changed(&mut self, callback: impl FnOnce() + 'static) {
        if !self.target_task.is_active() {
            callback();
            return;
        }
        self.target_callbacks.push(Box::new(callback));
    }

    // ---- commands --------------------------------------------------------

    /// Blend to a POV over `duration` seconds using the default curves.
    ///
    /// Unknown names and out-of-range indices log an error and select the
    /// first POV. Asking for the active POV does nothing.
    pub fn change_pov(&mut self, pov: impl Into<PovSelector>, duration: f32) -> &mut Self {
        let index = self.povs.resolve(&pov.into());
        self.change_pov_inner(index, duration, None);
        self.events.flush();
        self
    }

    /// Blend to a POV with caller-supplied position/rotation curves.
    pub fn change_pov_with(
        &mut self,
        pov: impl Into<PovSelector>,
        duration: f32,
        curves: TransitionCurves,
    ) -> &mut Self {
        let index = self.povs.resolve(&pov.into());
        self.change_pov_inner(index, duration, Some(curves));
        self.events.flush();
        self
    }

    /// Move the holder onto a new follow target.
    ///
    /// Non-positive `duration` switches immediately and places the holder on
    /// the target. Otherwise the change starts after `delay` seconds. While
    /// focusing, the target is stored and applied once the sequence ends.
    pub fn change_target(
        &mut self,
        target: impl Into<NodeRef>,
        duration: f32,
        delay: f32,
    ) -> &mut Self {
        self.change_target_inner(target.into(), duration, delay, None);
        self.events.flush();
        self
    }

    /// [`change_target`](Self::change_target) with caller-supplied curves.
    pub fn change_target_with(
        &mut self,
        target: impl Into<NodeRef>,
        duration: f32,
        delay: f32,
        curves: TransitionCurves,
    ) -> &mut Self {
        self.change_target_inner(target.into(), duration, delay, Some(curves));
        self.events.flush();
        self
    }

    /// Set the passively followed target.
    ///
    /// Cancels a running target change. While focusing the write is deferred
    /// until the sequence finishes.
    pub fn set_follow_target(&mut self, target: Option<NodeRef>) {
        self.set_follow_target_inner(target);
        self.events.flush();
    }

    /// Queue a focus point, starting a focus sequence if none is running.
    pub fn add_focus_point(&mut self, point: FocusPoint) {
        tracing::debug!(
            target = %point.target.label(),
            queued = self.focus_queue.len() + 1,
            "focus point queued"
        );
        self.focus_queue.push_back(point);
        if !self.focus_task.is_active() {
            self.begin_focus();
        }
        self.events.flush();
    }

    /// Cancel every transition where it stands.
    ///
    /// Pending callbacks are dropped and queued focus points discarded. The
    /// rig resumes following whatever target the cancelled work would have
    /// ended on.
    pub fn stop_transitions(&mut self) {
        if self.pov_task.cancel() {
            self.pov_settled = false;
        }
        self.pov_callbacks.clear();

        if let Some((task, _ticket)) = self.target_task.checkout() {
            self.follow_target = Some(task.target);
        }
        self.target_callbacks.clear();

        if self.focus_task.cancel() {
            self.focus_queue.clear();
            self.follow_target = self.snapshot.take().and_then(|s| s.target);
        }
        self.lens.stop();
        self.events.flush();
    }

    /// Advance every transition by one frame of `dt` seconds, then follow.
    pub fn tick(&mut self, dt: f32) {
        let dt = sanitize_dt(dt);
        self.last_dt = dt;

        self.lens.advance(dt);
        self.advance_pov(dt);
        self.advance_target(dt);
        self.advance_focus(dt);
        self.follow(dt);

        self.events.flush();
    }

    // ---- POV -------------------------------------------------------------

    fn change_pov_inner(&mut self, index: usize, duration: f32, curves: Option<TransitionCurves>) {
        if index == self.active_pov && self.pov_settled {
            return;
        }
        self.apply_pov(index, duration, curves);
    }

    fn apply_pov(&mut self, index: usize, duration: f32, curves: Option<TransitionCurves>) {
        let pov = self.povs[index].clone();
        tracing::debug!(pov = %pov.name, duration, "changing POV");

        self.active_pov = index;
        self.pov_settled = true;
        self.events.push(RigEvent::PovChangeStarted {
            pov: pov.name.clone(),
        });
        self.pov_task.cancel();
        self.pov_callbacks.clear();

        if !(duration.is_finite() && duration > 0.0) {
            self.camera_local = pov.local_pose();
            self.lens.set_fov(pov.fov);
            self.events.push(RigEvent::PovChangeEnded { pov: pov.name });
            return;
        }

        let curves = curves.unwrap_or_else(|| {
            TransitionCurves::new(
                self.curves.pov_position.clone(),
                self.curves.pov_rotation.clone(),
            )
        });
        self.lens.change_fov(pov.fov, duration, None);

        let task = PovTransition {
            pov_index: index,
            start: self.camera_local,
            target: pov.local_pose(),
            duration,
            progress: 0.0,
            curves,
        };
        self.camera_local = task.sample();
        self.pov_task.start(task);
    }

    fn advance_pov(&mut self, dt: f32) {
        let Some((mut task, ticket)) = self.pov_task.checkout() else {
            return;
        };

        task.progress = step(task.progress, dt, task.duration);
        if task.progress < 1.0 {
            self.camera_local = task.sample();
            self.pov_task.resume(task, ticket);
            return;
        }

        self.camera_local = task.target;
        for callback in std::mem::take(&mut self.pov_callbacks) {
            callback();
        }
        self.events.push(RigEvent::PovChangeEnded {
            pov: self.povs[task.pov_index].name.clone(),
        });
    }

    // ---- follow target ---------------------------------------------------

    fn set_follow_target_inner(&mut self, target: Option<NodeRef>) {
        self.target_task.cancel();
        self.target_callbacks.clear();

        if self.focus_task.is_active() {
            if let Some(snapshot) = self.snapshot.as_mut() {
                snapshot.target = target;
            }
            return;
        }
        self.follow_target = target;
    }

    fn change_target_inner(
        &mut self,
        target: NodeRef,
        duration: f32,
        delay: f32,
        curves: Option<TransitionCurves>,
    ) {
        if self.focus_task.is_active() {
            tracing::debug!(target = %target.label(), "focusing, deferring target change");
            if let Some(snapshot) = self.snapshot.as_mut() {
                snapshot.target = Some(target);
            }
            return;
        }

        if !(duration.is_finite() && duration > 0.0) {
            match target.pose() {
                Some(pose) => self.holder.position = pose.position,
                None => tracing::warn!("follow target is gone, holder left in place"),
            }
            self.set_follow_target_inner(Some(target));
            return;
        }

        self.target_task.cancel();
        self.target_callbacks.clear();

        let curves = curves.unwrap_or_else(|| {
            TransitionCurves::new(
                self.curves.target_position.clone(),
                self.curves.target_rotation.clone(),
            )
        });
        let remaining = if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        tracing::debug!(target = %target.label(), duration, delay = remaining, "changing follow target");

        self.target_task.start(TargetTransition {
            target,
            duration,
            curves,
            phase: TargetPhase::Waiting { remaining },
        });
        self.advance_target(0.0);
    }

    fn advance_target(&mut self, dt: f32) {
        let Some((mut task, ticket)) = self.target_task.checkout() else {
            return;
        };
        let Some(goal) = task.target.pose() else {
            tracing::warn!("follow target dropped mid-change, abandoning it");
            self.target_callbacks.clear();
            return;
        };

        let (from, progress) = match task.phase {
            TargetPhase::Waiting { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    task.phase = TargetPhase::Waiting { remaining };
                    self.target_task.resume(task, ticket);
                    return;
                }
                // Passive following stops for the rest of the change.
                self.follow_target = None;
                (self.holder, 0.0)
            }
            TargetPhase::Moving { from, progress } => (from, step(progress, dt, task.duration)),
        };

        if progress < 1.0 {
            let goal_position = lerp_clamped(
                from.position,
                goal.position,
                task.curves.position.evaluate(progress),
            );
            self.holder.position =
                lerp_clamped(self.holder.position, goal_position, self.follow_position_lerp);
            if self.copy_follow_rotation {
                let goal_rotation = slerp_clamped(
                    from.rotation,
                    goal.rotation,
                    task.curves.rotation.evaluate(progress),
                );
                self.holder.rotation =
                    slerp_clamped(self.holder.rotation, goal_rotation, self.follow_rotation_lerp);
            }
            task.phase = TargetPhase::Moving { from, progress };
            self.target_task.resume(task, ticket);
            return;
        }

        self.holder.position =
            lerp_clamped(self.holder.position, goal.position, self.follow_position_lerp);
        if self.copy_follow_rotation {
            self.holder.rotation =
                slerp_clamped(self.holder.rotation, goal.rotation, self.follow_rotation_lerp);
        }
        for callback in std::mem::take(&mut self.target_callbacks) {
            callback();
        }
        self.events.push(RigEvent::TargetChangeFinished {
            target: task.target.clone(),
        });
        self.set_follow_target_inner(Some(task.target));
    }

    fn follow(&mut self, dt: f32) {
        if self.focus_task.is_active() {
            return;
        }
        if matches!(
            self.target_task.get().map(|t| &t.phase),
            Some(TargetPhase::Moving { .. })
        ) {
            return;
        }
        let Some(goal) = self.follow_target.as_ref().and_then(NodeRef::pose) else {
            return;
        };

        self.holder.position = lerp_clamped(
            self.holder.position,
            goal.position,
            self.follow_position_lerp * dt,
        );
        if self.copy_follow_rotation {
            self.holder.rotation = slerp_clamped(
                self.holder.rotation,
                goal.rotation,
                self.follow_rotation_lerp * dt,
            );
        }
    }

    // ---- focus -----------------------------------------------------------

    fn begin_focus(&mut self) {
        // A running target change hands its destination to the snapshot.
        let pending = self.target_task.get().map(|t| t.target.clone());
        if pending.is_some() {
            self.target_task.cancel();
            self.target_callbacks.clear();
        }
        let target = pending.or_else(|| self.follow_target.take());
        self.follow_target = None;

        self.snapshot = Some(FocusSnapshot {
            target,
            pov_name: self.active_pov().name.clone(),
            rotation: self.holder.rotation,
        });
        self.events.push(RigEvent::FocusStarted);
        self.focus_task.start(FocusSequence {
            phase: FocusPhase::Next,
        });
        self.advance_focus(0.0);
    }

    fn advance_focus(&mut self, dt: f32) {
        let Some((mut seq, ticket)) = self.focus_task.checkout() else {
            return;
        };
        // Only the first phase handled this frame consumes the delta.
        let mut dt = dt;

        loop {
            match std::mem::replace(&mut seq.phase, FocusPhase::Next) {
                FocusPhase::Next => {
                    if let Some(point) = self.focus_queue.front().cloned() {
                        let Some(goal) = point.target.pose() else {
                            tracing::warn!("focus point target is gone, skipping it");
                            self.focus_queue.pop_front();
                            continue;
                        };
                        if let Some(pov) = point.pov.as_deref() {
                            let index = self.povs.resolve(&PovSelector::from(pov));
                            self.change_pov_inner(index, point.move_duration - self.last_dt, None);
                        }
                        let from = self.holder;
                        let eased = self.curves.focus_move.evaluate(0.0);
                        self.holder = focus_blend(self.holder, from, goal, eased, point.copy_rotation);
                        seq.phase = FocusPhase::Moving {
                            point,
                            from,
                            progress: 0.0,
                        };
                        break;
                    }

                    let Some((home, pov_name)) = self
                        .snapshot
                        .as_ref()
                        .and_then(|s| s.target.clone().map(|t| (t, s.pov_name.clone())))
                        .filter(|(t, _)| t.is_alive())
                    else {
                        self.finish_focus(None);
                        return;
                    };
                    if self.active_pov().name != pov_name {
                        let index = self.povs.resolve(&PovSelector::Name(pov_name));
                        self.change_pov_inner(
                            index,
                            self.focus_return_duration - self.last_dt,
                            None,
                        );
                    }
                    let from = self.holder;
                    if let Some(home_pose) = home.pose() {
                        self.apply_return_frame(from, 0.0, home_pose);
                    }
                    seq.phase = FocusPhase::Returning {
                        from,
                        progress: 0.0,
                        duration: self.focus_return_duration,
                    };
                    break;
                }

                FocusPhase::Moving {
                    point,
                    from,
                    progress,
                } => {
                    let progress = step(progress, dt, point.move_duration);
                    dt = 0.0;
                    let Some(goal) = point.target.pose() else {
                        tracing::warn!("focus point target dropped mid-move, skipping it");
                        self.focus_queue.pop_front();
                        continue;
                    };

                    if progress < 1.0 {
                        let eased = self.curves.focus_move.evaluate(progress);
                        self.holder =
                            focus_blend(self.holder, from, goal, eased, point.copy_rotation);
                        seq.phase = FocusPhase::Moving {
                            point,
                            from,
                            progress,
                        };
                        break;
                    }

                    self.holder.position = goal.position;
                    if point.copy_rotation {
                        self.holder.rotation = goal.rotation;
                    }
                    self.focus_queue.pop_front();
                    let remaining = point.dwell_duration;
                    self.events.push(RigEvent::FocusPointReached { point });
                    seq.phase = FocusPhase::Dwelling { remaining };
                }

                FocusPhase::Dwelling { remaining } => {
                    let remaining = remaining - dt;
                    dt = 0.0;
                    if remaining > 0.0 {
                        seq.phase = FocusPhase::Dwelling { remaining };
                        break;
                    }
                }

                FocusPhase::Returning {
                    from,
                    progress,
                    duration,
                } => {
                    let progress = step(progress, dt, duration);
                    dt = 0.0;
                    let Some(home) = self
                        .snapshot
                        .as_ref()
                        .and_then(|s| s.target.as_ref())
                        .and_then(NodeRef::pose)
                    else {
                        tracing::warn!("follow target dropped during focus return");
                        self.finish_focus(None);
                        return;
                    };

                    if progress < 1.0 {
                        self.apply_return_frame(from, progress, home);
                        seq.phase = FocusPhase::Returning {
                            from,
                            progress,
                            duration,
                        };
                        break;
                    }

                    self.holder.position = home.position;
                    self.holder.rotation = if self.copy_follow_rotation {
                        home.rotation
                    } else {
                        self.snapshot_rotation()
                    };

                    if !self.focus_queue.is_empty() {
                        tracing::debug!(
                            queued = self.focus_queue.len(),
                            "points queued during return, draining again"
                        );
                        self.events.push(RigEvent::FocusStarted);
                        continue;
                    }

                    let target = self.snapshot.as_ref().and_then(|s| s.target.clone());
                    self.finish_focus(target);
                    return;
                }
            }
        }

        self.focus_task.resume(seq, ticket);
    }

    fn apply_return_frame(&mut self, from: Pose, progress: f32, home: Pose) {
        let rotation = if self.copy_follow_rotation {
            home.rotation
        } else {
            self.snapshot_rotation()
        };
        let eased = self.curves.focus_move.evaluate(progress);
        self.holder = focus_blend(
            self.holder,
            from,
            Pose::new(home.position, rotation),
            eased,
            true,
        );
    }

    fn snapshot_rotation(&self) -> glam::Quat {
        self.snapshot
            .as_ref()
            .map(|s| s.rotation)
            .unwrap_or(self.holder.rotation)
    }

    /// The focus task is checked out here, so the follow target applies directly.
    fn finish_focus(&mut self, target: Option<NodeRef>) {
        self.snapshot = None;
        self.set_follow_target_inner(target);
        self.events.push(RigEvent::FocusFinished);
    }
}

impl std::fmt::Debug for CameraRig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraRig")
            .field("state", &self.state())
            .field("active_pov", &self.active_pov().name)
            .field("holder", &self.holder)
            .field("camera_local", &self.camera_local)
            .field("fov", &self.lens.fov())
            .field("follow_target", &self.follow_target)
            .field("focus_queue", &self.focus_queue.len())
            .finish()
    }
}
