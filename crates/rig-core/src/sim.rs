//! Offline scenario runner.
//!
//! Drives a [`CameraRig`] from a [`Scenario`] at a fixed frame rate. Each
//! frame runs the script steps that are due, moves the scene nodes, ticks
//! the rig and records a trace sample. Events are collected through a
//! channel subscription so the trace shows them in emission order.

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::Write;
use std::sync::mpsc::Receiver;

use glam::Quat;
use serde::Serialize;

use camrig_common::{CamRigError, FrameClock, RigResult, SimulationDefaults};
use camrig_rig_model::focus::FocusPoint;
use camrig_rig_model::node::{Node, NodeRef};
use camrig_rig_model::pose::Pose;
use camrig_rig_model::scenario::{NodeSpec, RigCommand, Scenario, ScriptStep};

use crate::events::RigEvent;
use crate::rig::{CameraRig, RigState};

/// Runner knobs, usually taken from the app config.
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Frame rate used when the scenario does not set one.
    pub fps: u32,
    /// Record every N-th frame. The first and last frames are always kept.
    pub trace_stride: u32,
    /// Scenarios longer than this are rejected.
    pub max_duration_secs: f64,
}

impl SimulationOptions {
    pub fn from_defaults(defaults: &SimulationDefaults) -> Self {
        Self {
            fps: defaults.fps,
            trace_stride: defaults.trace_stride,
            max_duration_secs: defaults.max_duration_secs,
        }
    }
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self::from_defaults(&SimulationDefaults::default())
    }
}

/// Rig state after one frame.
#[derive(Debug, Clone, Serialize)]
pub struct TraceFrame {
    pub frame: u64,
    pub time_secs: f64,
    pub state: RigState,
    pub pov: String,
    pub holder: Pose,
    pub camera_local: Pose,
    pub camera_world: Pose,
    pub fov: f32,
    pub follow: Option<String>,
}

/// A rig event stamped with the frame that raised it.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub frame: u64,
    pub time_secs: f64,
    pub event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TraceLine<'a> {
    Frame(&'a TraceFrame),
    Event(&'a EventRecord),
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub scenario: String,
    pub fps: u32,
    /// Wall-clock start of the run (RFC 3339).
    pub started_at: String,
    pub frames: Vec<TraceFrame>,
    pub events: Vec<EventRecord>,
}

impl SimulationReport {
    pub fn final_frame(&self) -> Option<&TraceFrame> {
        self.frames.last()
    }

    /// Event names in emission order.
    pub fn event_kinds(&self) -> Vec<&'static str> {
        self.events.iter().map(|e| e.event).collect()
    }

    /// Write the trace as JSON lines.
    ///
    /// The first line is a `#` comment naming the scenario. Events are
    /// written before the frame sample they belong to.
    pub fn write_jsonl<W: Write>(&self, mut out: W) -> RigResult<()> {
        writeln!(
            out,
            "# camrig trace: scenario={:?} fps={} started_at={}",
            self.scenario, self.fps, self.started_at
        )?;

        let mut events = self.events.iter().peekable();
        for frame in &self.frames {
            while let Some(event) = events.next_if(|e| e.frame <= frame.frame) {
                serde_json::to_writer(&mut out, &TraceLine::Event(event))?;
                writeln!(out)?;
            }
            serde_json::to_writer(&mut out, &TraceLine::Frame(frame))?;
            writeln!(out)?;
        }
        for event in events {
            serde_json::to_writer(&mut out, &TraceLine::Event(event))?;
            writeln!(out)?;
        }
        Ok(())
    }
}

/// A scenario in progress.
pub struct Simulation {
    name: String,
    duration_secs: f64,
    trace_stride: u64,
    clock: FrameClock,
    rig: CameraRig,
    events: Receiver<RigEvent>,
    nodes: HashMap<String, Node>,
    motion: Vec<NodeSpec>,
    removed: HashSet<String>,
    script: VecDeque<ScriptStep>,
    frames: Vec<TraceFrame>,
    records: Vec<EventRecord>,
}

impl Simulation {
    /// Validate `scenario` and set up its scene and rig.
    pub fn new(scenario: Scenario, options: SimulationOptions) -> RigResult<Self> {
        scenario.validate()?;
        if scenario.duration_secs > options.max_duration_secs {
            return Err(CamRigError::simulation(format!(
                "scenario runs {}s, limit is {}s",
                scenario.duration_secs, options.max_duration_secs
            )));
        }

        let fps = scenario.fps.unwrap_or(options.fps);
        if fps == 0 {
            return Err(CamRigError::simulation("frame rate must be positive"));
        }

        let nodes: HashMap<String, Node> = scenario
            .nodes
            .iter()
            .map(|spec| (spec.name.clone(), Node::new(&spec.name, spec.initial_pose())))
            .collect();
        let motion = scenario
            .nodes
            .iter()
            .filter(|spec| !spec.is_static())
            .cloned()
            .collect();

        let mut rig = CameraRig::new(scenario.rig.clone())?;
        let (_, events) = rig.subscribe_channel();

        let mut sim = Self {
            name: scenario.name.clone(),
            duration_secs: scenario.duration_secs,
            trace_stride: u64::from(options.trace_stride.max(1)),
            clock: FrameClock::new(fps),
            rig,
            events,
            nodes,
            motion,
            removed: HashSet::new(),
            script: scenario.ordered_script().into(),
            frames: Vec::new(),
            records: Vec::new(),
        };

        if let Some(name) = &scenario.follow {
            let target = sim.node_ref(name)?;
            sim.rig.change_target(target, 0.0, 0.0);
        }

        tracing::info!(
            scenario = %sim.name,
            fps,
            duration_secs = sim.duration_secs,
            nodes = sim.nodes.len(),
            steps = sim.script.len(),
            "simulation ready"
        );
        Ok(sim)
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.clock.elapsed_secs()
    }

    /// Run one frame.
    pub fn step(&mut self) -> RigResult<()> {
        let now = self.clock.elapsed_secs();
        while let Some(step) = self.script.pop_front() {
            // Tolerate float drift in authored times.
            if step.at_secs > now + 1e-6 {
                self.script.push_front(step);
                break;
            }
            self.apply(&step.command)?;
        }
        self.collect_events();

        let dt = self.clock.tick();
        self.move_nodes(dt);
        self.rig.tick(dt);
        self.collect_events();

        if self.clock.frame() % self.trace_stride == 0 {
            self.record_frame();
        }
        Ok(())
    }

    /// Run to the end of the scenario.
    pub fn run(mut self) -> RigResult<SimulationReport> {
        self.record_frame();
        let total = self.clock.frames_for(self.duration_secs);
        for _ in 0..total {
            self.step()?;
        }
        if self.frames.last().map(|f| f.frame) != Some(self.clock.frame()) {
            self.record_frame();
        }
        if !self.script.is_empty() {
            tracing::warn!(
                skipped = self.script.len(),
                "script steps scheduled after the scenario ends were not run"
            );
        }

        tracing::info!(
            frames = self.clock.frame(),
            events = self.records.len(),
            "simulation finished"
        );
        Ok(SimulationReport {
            scenario: self.name,
            fps: (1.0 / self.clock.step_secs()).round() as u32,
            started_at: self.clock.epoch_wall().to_string(),
            frames: self.frames,
            events: self.records,
        })
    }

    fn apply(&mut self, command: &RigCommand) -> RigResult<()> {
        tracing::debug!(
            command = command.kind(),
            at = self.clock.elapsed_secs(),
            "script step"
        );
        match command {
            RigCommand::ChangePov {
                pov,
                duration,
                curves,
            } => match curves {
                Some(curves) => {
                    self.rig.change_pov_with(pov.clone(), *duration, curves.clone());
                }
                None => {
                    self.rig.change_pov(pov.clone(), *duration);
                }
            },
            RigCommand::ChangeTarget {
                target,
                duration,
                delay,
                curves,
            } => {
                let target = self.node_ref(target)?;
                match curves {
                    Some(curves) => {
                        self.rig
                            .change_target_with(target, *duration, *delay, curves.clone());
                    }
                    None => {
                        self.rig.change_target(target, *duration, *delay);
                    }
                }
            }
            RigCommand::SetFollowTarget { target } => {
                let target = target.as_deref().map(|name| self.node_ref(name)).transpose()?;
                self.rig.set_follow_target(target);
            }
            RigCommand::AddFocusPoint {
                target,
                copy_rotation,
                move_duration,
                dwell,
                pov,
            } => {
                let mut point = FocusPoint::new(self.node_ref(target)?)
                    .with_copy_rotation(*copy_rotation)
                    .with_move_duration(*move_duration)
                    .with_dwell(*dwell);
                if let Some(pov) = pov {
                    point = point.with_pov(pov.clone());
                }
                self.rig.add_focus_point(point);
            }
            RigCommand::ChangeFov { fov, duration } => {
                self.rig.lens_mut().change_fov(*fov, *duration, None);
            }
            RigCommand::FovBounce {
                delta,
                duration_in,
                duration_out,
                end_target,
            } => {
                self.rig
                    .lens_mut()
                    .fov_bounce(*delta, *duration_in, *duration_out, *end_target);
            }
            RigCommand::SetCopyFollowRotation { enabled } => {
                self.rig.set_copy_follow_rotation(*enabled);
            }
            RigCommand::SetFollowLerp { position, rotation } => {
                if let Some(rate) = position {
                    self.rig.set_follow_position_lerp(*rate);
                }
                if let Some(rate) = rotation {
                    self.rig.set_follow_rotation_lerp(*rate);
                }
            }
            RigCommand::ResetFollowLerp => {
                self.rig.reset_follow_position_lerp();
                self.rig.reset_follow_rotation_lerp();
            }
            RigCommand::RemoveNode { name } => {
                if self.nodes.remove(name).is_some() {
                    self.motion.retain(|spec| &spec.name != name);
                    self.removed.insert(name.clone());
                } else {
                    tracing::warn!(node = %name, "node already removed");
                }
            }
        }
        Ok(())
    }

    /// Weak handle to a scene node. Removed nodes yield a dead handle.
    fn node_ref(&self, name: &str) -> RigResult<NodeRef> {
        match self.nodes.get(name) {
            Some(node) => Ok(node.downgrade()),
            None if self.removed.contains(name) => Ok(NodeRef::default()),
            None => Err(CamRigError::unknown_node(name)),
        }
    }

    fn move_nodes(&mut self, dt: f32) {
        for spec in &self.motion {
            let Some(node) = self.nodes.get(&spec.name) else {
                continue;
            };
            let pose = node.pose();
            let spin = Quat::from_scaled_axis(spec.angular_velocity * dt);
            node.set_pose(Pose::new(
                pose.position + spec.velocity * dt,
                (spin * pose.rotation).normalize(),
            ));
        }
    }

    fn collect_events(&mut self) {
        let frame = self.clock.frame();
        let time_secs = self.clock.elapsed_secs();
        for event in self.events.try_iter() {
            self.records.push(EventRecord {
                frame,
                time_secs,
                event: event.kind(),
                detail: event.detail(),
            });
        }
    }

    fn record_frame(&mut self) {
        self.frames.push(TraceFrame {
            frame: self.clock.frame(),
            time_secs: self.clock.elapsed_secs(),
            state: self.rig.state(),
            pov: self.rig.active_pov().name.clone(),
            holder: self.rig.holder(),
            camera_local: self.rig.camera_local(),
            camera_world: self.rig.camera_world(),
            fov: self.rig.fov(),
            follow: self.rig.follow_target().map(NodeRef::label),
        });
    }
}
