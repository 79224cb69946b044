//! Configuration loader and schema types.
//!
//! Settings drive the backend location, on-disk storage, playback tuning,
//! UI timing and logging. See `schema.rs` for the file format.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
