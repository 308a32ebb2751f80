//! Bridge core between `atmo-api` and a publish transport.
//!
//! - **[`normalize`]** -- flattens the vendor's nested measurement payloads
//!   into renamed records, driven by key presence rather than device type.
//! - **[`Frame`]** -- the emitted unit: one flat record per physical device
//!   or module.
//! - **[`FrameSink`]** -- the publish contract; the poller calls
//!   `emit(frame)` directly, once per device/module per tick.
//! - **[`Poller`]** -- authenticates, runs one immediate pass, then repeats
//!   on a fixed interval until the [`PollHandle`] is stopped.

pub mod error;
pub mod normalize;
pub mod poller;
pub mod record;
pub mod sink;

pub use error::CoreError;
pub use normalize::{process_aircare, process_measure, process_station};
pub use poller::{DEFAULT_POLL_INTERVAL, PollHandle, Poller};
pub use record::Frame;
pub use sink::FrameSink;
