//! Runtime Layer
//!
//! Drives the engine on the tokio clock. This layer is
//! **non-deterministic** - all game logic runs through `game/`.

pub mod driver;

pub use driver::{spawn_engine, DriverError, EngineHandle};
