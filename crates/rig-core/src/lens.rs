//! Field-of-view and orthographic-size tweens.
//!
//! The lens has a single tween channel. Starting any tween stops the one in
//! flight, leaving the value wherever it had got to. Finished tweens snap to
//! their end value.

use std::collections::VecDeque;

use glam::Vec2;

use camrig_rig_model::easing::EasingCurve;
use camrig_rig_model::pose::lerp_f32;
use camrig_rig_model::settings::LensSettings;

use crate::task::TaskSlot;

/// Which lens parameter a tween drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LensChannel {
    FieldOfView,
    OrthographicSize,
}

#[derive(Debug, Clone)]
struct Segment {
    to: f32,
    duration: f32,
    curve: EasingCurve,
    /// Captured when the segment becomes active.
    from: Option<f32>,
}

#[derive(Debug)]
struct LensTween {
    channel: LensChannel,
    segments: VecDeque<Segment>,
    elapsed: f32,
}

/// Camera lens state plus its tween channel.
#[derive(Debug)]
pub struct LensController {
    fov: f32,
    orthographic_size: f32,
    aspect: f32,
    init_fov: f32,
    init_orthographic_size: f32,
    default_curve: EasingCurve,
    tween: TaskSlot<LensTween>,
}

impl LensController {
    pub fn new(settings: &LensSettings, default_curve: EasingCurve) -> Self {
        Self {
            fov: settings.fov,
            orthographic_size: settings.orthographic_size,
            aspect: settings.aspect,
            init_fov: settings.fov,
            init_orthographic_size: settings.orthographic_size,
            default_curve,
            tween: TaskSlot::new("lens"),
        }
    }

    /// Vertical field of view in degrees.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn orthographic_size(&self) -> f32 {
        self.orthographic_size
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn is_tweening(&self) -> bool {
        self.tween.is_active()
    }

    /// The channel the running tween drives, if any.
    pub fn active_channel(&self) -> Option<LensChannel> {
        self.tween.get().map(|t| t.channel)
    }

    /// World-space size of an orthographic view.
    pub fn orthographic_bounds(&self) -> Vec2 {
        let height = self.orthographic_size * 2.0;
        Vec2::new(height * self.aspect, height)
    }

    /// World-space size of the view frustum at `distance` from the camera.
    pub fn frustum_bounds(&self, distance: f32) -> Vec2 {
        let height = 2.0 * distance * (self.fov * 0.5).to_radians().tan();
        Vec2::new(height * self.aspect, height)
    }

    /// Stop the running tween where it is.
    pub fn stop(&mut self) {
        self.tween.cancel();
    }

    /// Finish the running tween immediately at its end value.
    pub fn complete(&mut self) {
        if let Some((tween, _ticket)) = self.tween.checkout() {
            if let Some(last) = tween.segments.back() {
                self.write(tween.channel, last.to);
            }
        }
    }

    /// Set the field of view now, stopping any tween.
    pub fn set_fov(&mut self, fov: f32) {
        self.stop();
        self.fov = fov;
    }

    /// Tween the field of view to `target`. Non-positive durations apply instantly.
    pub fn change_fov(&mut self, target: f32, duration: f32, curve: Option<EasingCurve>) {
        self.start_single(LensChannel::FieldOfView, target, duration, curve);
    }

    pub fn add_fov(&mut self, delta: f32, duration: f32, curve: Option<EasingCurve>) {
        self.change_fov(self.fov + delta, duration, curve);
    }

    /// Return to the field of view the lens was created with.
    pub fn reset_fov(&mut self, duration: f32, curve: Option<EasingCurve>) {
        self.change_fov(self.init_fov, duration, curve);
    }

    /// Push the field of view out by `delta` and back.
    ///
    /// Settles on `end_target` when given, otherwise on the value held when
    /// the bounce started.
    pub fn fov_bounce(
        &mut self,
        delta: f32,
        duration_in: f32,
        duration_out: f32,
        end_target: Option<f32>,
    ) {
        self.start_bounce(
            LensChannel::FieldOfView,
            delta,
            duration_in,
            duration_out,
            end_target,
        );
    }

    pub fn set_orthographic_size(&mut self, size: f32) {
        self.stop();
        self.orthographic_size = size;
    }

    pub fn change_orthographic_size(
        &mut self,
        target: f32,
        duration: f32,
        curve: Option<EasingCurve>,
    ) {
        self.start_single(LensChannel::OrthographicSize, target, duration, curve);
    }

    /// Size the orthographic view so it spans `world_width` horizontally.
    pub fn change_orthographic_size_world_x(
        &mut self,
        world_width: f32,
        duration: f32,
        curve: Option<EasingCurve>,
    ) {
        let target = world_width / self.aspect * 0.5;
        self.change_orthographic_size(target, duration, curve);
    }

    pub fn add_orthographic_size(&mut self, delta: f32, duration: f32, curve: Option<EasingCurve>) {
        self.change_orthographic_size(self.orthographic_size + delta, duration, curve);
    }

    pub fn reset_orthographic_size(&mut self, duration: f32, curve: Option<EasingCurve>) {
        self.change_orthographic_size(self.init_orthographic_size, duration, curve);
    }

    pub fn orthographic_size_bounce(
        &mut self,
        delta: f32,
        duration_in: f32,
        duration_out: f32,
        end_target: Option<f32>,
    ) {
        self.start_bounce(
            LensChannel::OrthographicSize,
            delta,
            duration_in,
            duration_out,
            end_target,
        );
    }

    /// Advance the running tween by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        let Some((mut tween, ticket)) = self.tween.checkout() else {
            return;
        };
        tween.elapsed += dt;

        while let Some(segment) = tween.segments.front_mut() {
            let from = *segment.from.get_or_insert(read(self, tween.channel));
            if segment.duration <= 0.0 || tween.elapsed >= segment.duration {
                let to = segment.to;
                tween.elapsed = (tween.elapsed - segment.duration.max(0.0)).max(0.0);
                tween.segments.pop_front();
                self.write(tween.channel, to);
                continue;
            }
            let eased = segment.curve.evaluate(tween.elapsed / segment.duration);
            let value = lerp_f32(from, segment.to, eased);
            self.write(tween.channel, value);
            self.tween.resume(tween, ticket);
            return;
        }
    }

    fn start_single(
        &mut self,
        channel: LensChannel,
        target: f32,
        duration: f32,
        curve: Option<EasingCurve>,
    ) {
        self.stop();
        if !(duration.is_finite() && duration > 0.0) {
            self.write(channel, target);
            return;
        }
        let segment = Segment {
            to: target,
            duration,
            curve: curve.unwrap_or_else(|| self.default_curve.clone()),
            from: None,
        };
        self.launch(channel, vec![segment]);
    }

    fn start_bounce(
        &mut self,
        channel: LensChannel,
        delta: f32,
        duration_in: f32,
        duration_out: f32,
        end_target: Option<f32>,
    ) {
        self.stop();
        let current = read(self, channel);
        let end = end_target.unwrap_or(current);
        let peak = current + delta;
        let segments = vec![
            Segment {
                to: peak,
                duration: duration_in.max(0.0),
                curve: self.default_curve.clone(),
                from: None,
            },
            Segment {
                to: end,
                duration: duration_out.max(0.0),
                curve: self.default_curve.clone(),
                from: None,
            },
        ];
        self.launch(channel, segments);
    }

    fn launch(&mut self, channel: LensChannel, segments: Vec<Segment>) {
        self.tween.start(LensTween {
            channel,
            segments: segments.into(),
            elapsed: 0.0,
        });
        // Zero-length segments settle without waiting for the next frame.
        self.advance(0.0);
    }

    fn write(&mut self, channel: LensChannel, value: f32) {
        match channel {
            LensChannel::FieldOfView => self.fov = value,
            LensChannel::OrthographicSize => self.orthographic_size = value,
        }
    }
}

fn read(lens: &LensController, channel: LensChannel) -> f32 {
    match channel {
        LensChannel::FieldOfView => lens.fov,
        LensChannel::OrthographicSize => lens.orthographic_size,
    }
}
