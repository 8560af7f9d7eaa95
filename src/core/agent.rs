//! The agent control loop
//!
//! One cooperative task interleaves every duty of the node: GPS line
//! ingestion, the telemetry schedule and the broker link state machine. No
//! duty may block another; the link's reconnect delay is a timer inside its
//! own `select!` branch.

use crate::config::AgentConfig;
use crate::core::gps::{self, SentenceStream};
use crate::core::state::TrackerState;
use crate::core::status::StatusSnapshot;
use crate::core::telemetry::TelemetryFrame;
use crate::core::transport::MqttLink;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

/// The telemetry agent: tracker state, broker link and schedule
pub struct Agent {
    config: AgentConfig,
    state: TrackerState,
    link: MqttLink,
    status_tx: watch::Sender<StatusSnapshot>,
    started: Instant,
}

impl Agent {
    /// Create an agent from configuration. Nothing is opened or connected
    /// until [`Agent::run`].
    pub fn new(config: AgentConfig) -> Self {
        let link = MqttLink::new(&config.mqtt, &config.device.id);
        let (status_tx, _) = watch::channel(StatusSnapshot::default());

        Self {
            config,
            state: TrackerState::new(),
            link,
            status_tx,
            started: Instant::now(),
        }
    }

    /// Subscribe to status snapshots (one per loop iteration)
    pub fn status(&self) -> watch::Receiver<StatusSnapshot> {
        self.status_tx.subscribe()
    }

    /// Open the configured GPS source and run the control loop
    pub async fn run(self) -> anyhow::Result<()> {
        let sentences = gps::open(&self.config.gps).await?;
        info!(device = %self.config.device.id, "gps source open, entering control loop");
        self.run_with_stream(sentences).await
    }

    /// Run the control loop over an already-open sentence stream.
    ///
    /// The loop runs until externally cancelled. If the sentence stream ends
    /// or fails, ingestion stops but scheduling and the broker link keep
    /// running with the last known values.
    pub async fn run_with_stream(self, mut sentences: SentenceStream) -> anyhow::Result<()> {
        let Self {
            config,
            mut state,
            mut link,
            status_tx,
            started,
        } = self;

        let mut ticker = interval(Duration::from_millis(config.telemetry.interval_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a fresh interval completes immediately; consume
        // it so the first frame goes out one full period after start.
        ticker.tick().await;

        let mut gps_done = false;

        loop {
            let mut due_frame: Option<TelemetryFrame> = None;

            tokio::select! {
                line = sentences.next(), if !gps_done => match line {
                    Some(Ok(line)) => {
                        if state.apply_line(&line) {
                            trace!(%line, "sentence applied");
                        } else {
                            trace!(%line, "sentence discarded");
                        }
                    }
                    Some(Err(e)) => {
                        warn!("gps read error, ingestion stopped: {e}");
                        gps_done = true;
                    }
                    None => {
                        warn!("gps stream ended, ingestion stopped");
                        gps_done = true;
                    }
                },
                _ = ticker.tick() => {
                    let uptime_ms = started.elapsed().as_secs_f64() * 1000.0;
                    due_frame = Some(TelemetryFrame::from_fix(&state.fix(), uptime_ms));
                },
                () = link.poll() => {}
            }

            // Fire-and-forget: a failed publish is logged, never retried.
            if let Some(frame) = due_frame {
                if let Err(e) = link.publish(frame).await {
                    debug!("telemetry publish failed: {e}");
                }
            }

            status_tx.send_replace(StatusSnapshot {
                fix: state.fix(),
                satellites: state.satellites(),
                link: link.state(),
                uptime: started.elapsed(),
            });
        }
    }
}
