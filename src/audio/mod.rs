//! Audio output and the player that owns it
//!
//! The `AudioOutput` trait is the only way to the sound device. Calls are
//! fire-and-forget and applied in order; results come back as `OutputEvent`s
//! tagged with the generation of the load they belong to.

mod backend;
mod player;

use std::time::Duration;

pub use backend::RodioOutput;
pub use player::Player;

/// Ordered command sink for one audio device
pub trait AudioOutput: Send + Sync {
    /// Replace whatever is loaded with `source`; events for it carry `generation`
    fn load(&self, source: &str, generation: u64);
    fn play(&self);
    fn pause(&self);
    fn seek(&self, position: Duration);
    fn set_volume(&self, volume: f32);
    fn stop(&self);
}

#[derive(Clone, Debug, PartialEq)]
pub enum OutputEventKind {
    /// Audio for the load actually began
    Started,
    TimeUpdate(Duration),
    DurationChange(Duration),
    Ended,
    Error(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct OutputEvent {
    pub generation: u64,
    pub kind: OutputEventKind,
}

impl OutputEvent {
    pub fn new(generation: u64, kind: OutputEventKind) -> Self {
        Self { generation, kind }
    }
}

#[cfg(test)]
mod tests;
