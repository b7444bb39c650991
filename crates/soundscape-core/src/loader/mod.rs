//! Background loading for sound assets
//!
//! # Submit and Poll
//!
//! The [`SoundAssetCache`] never blocks the caller:
//! - `request_load()` returns the asset if it's cached, otherwise queues one decode job
//! - The interaction loop calls it again on a later tick until the asset resolves
//! - `poll()` hands out one `AssetResolved` per finished job for UI refresh

mod asset_cache;

pub use asset_cache::{AssetResolved, AssetStatus, SoundAssetCache, MIN_LOADER_WORKERS};
