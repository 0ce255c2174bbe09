//! Vellum scene management
//!
//! This crate provides:
//! - `Scene`: an ordered stack of draw layers plus setup, update and
//!   teardown hooks, carrying a typed state value
//! - `Stage`: the lifecycle interface the app drives, implemented by every
//!   scene regardless of its state type
//! - `App`: a fixed-capacity scene state machine with explicit transitions
//!
//! # Frame flow
//!
//! ```text
//! App::frame ──► start_write
//!             ├─► active scene: on_update ──► (requested transition)
//!             ├─► active scene: draw (layers in registration order)
//!             └─► end_write ──► Device::blit
//! ```
//!
//! Scenes never own the renderer. It is passed into every call, so the
//! same renderer can be shared by all scenes of an app.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod log;

pub mod app;
pub mod scene;
pub mod stage;

pub use app::{App, AppError};
pub use scene::{Hook, Layer, LayerId, Scene, SceneError, DEFAULT_LAYER_CAPACITY};
pub use stage::{Context, Stage};
