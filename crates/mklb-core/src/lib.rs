#![forbid(unsafe_code)]

//! Host-agnostic core of the mklb image lightbox.
//!
//! Clicking a marked image on the page opens a full-viewport overlay showing
//! a copy of it; images sharing a gallery identifier can be paged through
//! with arrow buttons or the keyboard. This crate holds everything except the
//! browser bindings:
//!
//! - [`group`]: splits trigger images into standalone images and galleries.
//! - [`viewer`]: one overlay per group, its state machine and transitions.
//! - [`coordinator`]: open-viewer stack, key routing, shared scroll lock.
//! - [`lightbox`]: scans a page and mounts viewers.
//! - [`host`]: the `Dom` and `Scheduler` traits a host implements.
//!
//! The stylesheet sees the widget only through marker classes (see
//! [`marker`]); their exact lifecycle is documented on [`viewer`].
//!
//! # Features
//!
//! - `tracing`: debug/trace events for transitions and mount failures.
//! - `serde`: JSON loading for [`LightboxConfig`].
//! - `test-helpers`: in-memory host in [`testing`].

pub mod config;
pub mod coordinator;
pub mod error;
pub mod group;
pub mod host;
pub mod input;
pub mod lightbox;
pub mod marker;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;
pub mod viewer;

pub use config::{DEFAULT_TRANSITION, LightboxConfig, MarkerNames, OverlayClasses};
pub use coordinator::{Coordinator, ViewerId};
pub use error::{ConfigError, DomError, LightboxError};
pub use group::{Gallery, Partition, Trigger};
pub use host::{ClickHandler, Dom, KeyHandler, Scheduler, Task};
pub use input::{Control, Key, ViewerAction};
pub use lightbox::Lightbox;
pub use marker::{Direction, Marker};
pub use viewer::{Overlay, Phase, Viewer};
