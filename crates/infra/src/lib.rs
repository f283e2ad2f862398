//! Infrastructure layer: in-memory persistence adapters, configuration and
//! the composition root that wires them into the domain services.

pub mod config;
pub mod engine;
pub mod store;

pub use config::EngineConfig;
pub use engine::Engine;
