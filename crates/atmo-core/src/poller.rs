// Poll orchestration
//
// One polling pass fetches every station and air-quality device on the
// account, normalizes each physical device, and hands the records to the
// sink -- sequentially, so log ordering stays stable and token state is
// never mutated by two requests at once. The schedule task serializes
// ticks by construction: the next tick cannot fire until the previous
// pass has returned.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use atmo_api::ApiClient;

use crate::error::CoreError;
use crate::normalize::{process_aircare, process_station};
use crate::sink::FrameSink;

/// Default tick interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Drives the fetch-normalize-emit cycle against one API client and one
/// sink.
pub struct Poller<S: FrameSink> {
    client: Arc<ApiClient>,
    sink: Arc<S>,
    interval: Duration,
}

impl<S: FrameSink> Poller<S> {
    pub fn new(client: Arc<ApiClient>, sink: Arc<S>) -> Self {
        Self {
            client,
            sink,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run one polling pass: all stations, then all air-quality devices.
    ///
    /// Failures propagate to the caller; the schedule task logs them and
    /// survives to the next tick.
    pub async fn poll_data(&self) -> Result<(), CoreError> {
        let stations = self.client.get_stations_data(None, false).await?;
        debug!(count = stations.len(), "fetched stations");
        for station in &stations {
            for frame in process_station(station) {
                self.sink.emit(frame).await?;
            }
        }

        let aircare = self.client.get_home_coach_data(None).await?;
        debug!(count = aircare.len(), "fetched air-quality devices");
        for device in &aircare {
            self.sink.emit(process_aircare(device)).await?;
        }

        Ok(())
    }

    /// Authenticate from scratch and start the poll schedule: one
    /// immediate pass, then one pass per interval. Authentication failure
    /// aborts here; tick failures are logged and the schedule keeps
    /// running.
    ///
    /// The returned handle owns the schedule -- the core registers no
    /// signal handlers. Cancellation suppresses the next tick; an
    /// in-flight pass is left to finish.
    pub async fn start_polling(self) -> Result<PollHandle, CoreError> {
        self.client.connect(None, None, 0).await?;
        info!(interval_secs = self.interval.as_secs(), "starting poll schedule");

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = task_cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = self.poll_data().await {
                            warn!(error = %e, "poll failed; retrying next tick");
                        }
                    }
                }
            }
            debug!("poll schedule stopped");
        });

        Ok(PollHandle { cancel, task })
    }
}

/// Handle to a running poll schedule.
pub struct PollHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop the schedule and wait for the task to wind down.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}
