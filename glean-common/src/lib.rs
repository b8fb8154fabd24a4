//! Shared plumbing for the Glean crates.
//!
//! Both the harvester and the publisher depend on this crate, so it stays
//! small: tracing setup lives in [`observability`] and the randomized
//! request pacing used between network round trips lives in [`pacing`].
//!
//! ```rust
//! use glean_common::pacing::Pacer;
//! use std::time::Duration;
//!
//! let pacer = Pacer::new(Duration::from_millis(10), Duration::from_millis(20));
//! let d = pacer.sample();
//! assert!(d >= Duration::from_millis(10) && d <= Duration::from_millis(20));
//! ```
pub mod observability;
pub mod pacing;

pub use observability::{init_logging, LogConfig, LogFormat};
pub use pacing::Pacer;
