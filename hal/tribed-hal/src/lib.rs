//! Tribed Hardware Abstraction Layer
//!
//! Chip-independent traits implemented by chip-specific HALs. Pin I/O goes
//! through `embedded-hal` directly; this crate only covers what
//! `embedded-hal` does not, persistent storage.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  tribed-firmware                        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tribed-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  tribed-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod flash;

pub use flash::{FlashError, FlashStorage, StorageKey};
