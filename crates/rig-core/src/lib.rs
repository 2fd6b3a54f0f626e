//! camrig Rig Core
//!
//! The per-frame camera rig:
//! - **CameraRig:** passive following, POV blending, follow-target changes
//!   and focus-point sequences over a holder transform
//! - **Lens:** field-of-view and orthographic-size tweens on their own channel
//! - **Events:** observer registry for rig notifications
//! - **Simulation:** drives a rig from a scripted scenario at a fixed rate
//!
//! Everything runs on the caller's thread. Each transition is a task held in
//! a [`task::TaskSlot`] and advanced once per [`CameraRig::tick`].

pub mod events;
pub mod lens;
pub mod rig;
pub mod sim;
pub mod task;
mod transition;

pub use events::{EventBus, RigEvent, SubscriptionId};
pub use lens::{LensChannel, LensController};
pub use rig::{CameraRig, RigState};
pub use sim::{Simulation, SimulationOptions, SimulationReport};
