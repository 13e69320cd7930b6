//! Text scramble transitions.
//!
//! A [`ScrambleText`] morphs whatever it currently shows into a new target,
//! one character position at a time. Each position waits a few frames,
//! flickers through substitute glyphs, then locks onto its final character.
//! Frames are driven by the host through [`FrameHost`] callbacks.

pub mod config;
pub mod controller;
pub mod glyph;
pub mod plan;
pub mod render;
pub mod scheduler;

pub use controller::{ScrambleSettings, ScrambleText, TextProps};
pub use plan::{PlanOptions, SpeedRange, TransitionPlan, TransitionRecord};
pub use render::{render, RenderedFrame, Segment};
pub use scheduler::{FrameHost, FrameQueue, FrameRequest, FrameScheduler, SchedulerState};
