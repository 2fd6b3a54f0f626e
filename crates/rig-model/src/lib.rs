//! camrig Rig Model
//!
//! Defines the data contracts shared by the rig and its tools:
//! - **Poses:** position + rotation pairs with clamped blending helpers
//! - **Easing:** named and keyframed curves mapping progress to eased progress
//! - **POVs:** the authored table of camera offsets inside the holder
//! - **Nodes:** externally owned scene transforms the rig refers to weakly
//! - **Focus points:** transient targets the rig visits before returning
//! - **Scenarios:** scripted rig sessions for offline simulation
//!
//! This crate is pure data. Nothing here advances time.

pub mod easing;
pub mod focus;
pub mod node;
pub mod pose;
pub mod pov;
pub mod scenario;
pub mod settings;

pub use easing::*;
pub use focus::*;
pub use node::*;
pub use pose::*;
pub use pov::*;
pub use scenario::*;
pub use settings::*;
