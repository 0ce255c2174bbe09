//! Vellum Hardware Abstraction Layer
//!
//! Input helpers built on the `embedded-hal` 1.0 digital traits, so the same
//! application code runs on any chip whose HAL implements them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (scenes, update hooks)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  vellum-hal (this crate - input)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  embedded-hal::digital::InputPin        │
//! └─────────────────────────────────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod log;

pub mod button;

pub use button::Button;
