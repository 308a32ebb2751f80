// Publish contract.
//
// The orchestrator's sole output boundary. No event bus: whoever owns the
// transport implements this and the poller calls it directly, once per
// device/module per tick.

use std::future::Future;

use crate::error::CoreError;
use crate::record::Frame;

/// Receives normalized records for delivery to a transport keyed by
/// `frame.id`. The core makes no ordering or delivery guarantees beyond
/// calling `emit` once per device/module per tick.
pub trait FrameSink: Send + Sync + 'static {
    fn emit(&self, frame: Frame) -> impl Future<Output = Result<(), CoreError>> + Send;
}
