//! Incremental catalog synchronization.
//!
//! A pass walks the registry channel by channel, asks the fetcher for the
//! most recent uploads, and prepends the ones not seen before to the
//! channel's list before cutting it to the retention cap. Failures stay
//! local to their channel; only saving the result can fail a pass.

mod engine;
mod types;

pub use engine::{merge_channel, run_pass, SyncEngine};
pub use types::{
    ChannelOutcome, ChannelReport, MergeOutcome, PassError, SyncOptions, SyncOutcome, SyncReport,
};
