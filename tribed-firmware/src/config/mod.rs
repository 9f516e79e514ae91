//! Configuration and offset persistence

mod loader;
mod offsets;

pub use loader::load_machine_config;
pub use offsets::{FlashOffsetStore, OffsetsError};
