//! Audio output for Soundscape
//!
//! The mixing engine decides *how loud* each node is; the backend behind the
//! [`AudioBackend`] trait decides *how* that reaches the speakers.
//!
//! - [`VirtualBackend`]: silent in-memory channel pool, always available
//! - [`CpalBackend`]: real output, enabled with the `cpal-output` feature
//!
//! # Example Usage
//!
//! ```ignore
//! use soundscape_core::audio::{AudioBackend, VirtualBackend};
//!
//! let mut backend = VirtualBackend::new(32);
//! let channel = backend.allocate_channel().expect("free channel");
//! backend.set_volume(channel, 0.5);
//! ```

mod backend;
mod error;
mod virtual_backend;

#[cfg(feature = "cpal-output")]
mod cpal_backend;

pub use backend::{AudioBackend, ChannelId};
pub use error::{AudioError, AudioResult};
pub use virtual_backend::{VirtualBackend, VirtualChannel};

#[cfg(feature = "cpal-output")]
pub use cpal_backend::CpalBackend;
