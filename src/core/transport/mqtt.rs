//! MQTT client wrapper around `rumqttc`
//!
//! The event loop is polled from one branch of the agent's `select!` loop,
//! so connect/retry never blocks GPS ingestion or the telemetry schedule.
//! The retry deadline lives in the struct, not the poll future, and
//! therefore survives cancellation by other branches.

use super::{ConnectionState, LinkError, LinkEvent};
use crate::config::MqttSettings;
use crate::core::telemetry::{command_topic, telemetry_topic, TelemetryFrame};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// MQTT link to the telemetry broker
pub struct MqttLink {
    client: AsyncClient,
    eventloop: EventLoop,
    state: ConnectionState,
    telemetry_topic: String,
    command_topic: String,
    retry_delay: Duration,
    next_attempt_at: Option<Instant>,
    /// Frames waiting for a connection; bounded, oldest evicted first
    pending: VecDeque<TelemetryFrame>,
    pending_cap: usize,
    attempts: u64,
}

impl MqttLink {
    /// Create a link from broker settings. No connection is made until the
    /// link is polled.
    pub fn new(settings: &MqttSettings, device_id: &str) -> Self {
        let client_id = settings
            .client_id
            .clone()
            .unwrap_or_else(|| format!("bustrack-{device_id}"));

        let mut options = MqttOptions::new(client_id, settings.host.clone(), settings.port);
        options.set_keep_alive(Duration::from_secs(settings.keep_alive_secs));
        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            options.set_credentials(user.clone(), pass.clone());
        }

        let (client, eventloop) = AsyncClient::new(options, 64);

        Self {
            client,
            eventloop,
            state: ConnectionState::Disconnected,
            telemetry_topic: telemetry_topic(device_id),
            command_topic: command_topic(device_id),
            retry_delay: Duration::from_secs(settings.retry_delay_secs),
            next_attempt_at: None,
            pending: VecDeque::new(),
            pending_cap: settings.pending_frames,
            attempts: 0,
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Number of frames waiting for a connection
    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }

    /// Publish a telemetry frame, fire-and-forget.
    ///
    /// While the link is down the frame joins the pending queue instead;
    /// the queue is flushed in order on the next successful handshake.
    pub async fn publish(&mut self, frame: TelemetryFrame) -> Result<(), LinkError> {
        if self.state != ConnectionState::Connected {
            self.enqueue(frame);
            return Ok(());
        }
        self.send(&frame).await
    }

    fn enqueue(&mut self, frame: TelemetryFrame) {
        if self.pending_cap == 0 {
            return;
        }
        while self.pending.len() >= self.pending_cap {
            self.pending.pop_front();
            debug!("pending queue full, dropped oldest frame");
        }
        self.pending.push_back(frame);
    }

    async fn send(&mut self, frame: &TelemetryFrame) -> Result<(), LinkError> {
        self.client
            .publish(
                self.telemetry_topic.clone(),
                QoS::AtMostOnce,
                false,
                frame.to_payload(),
            )
            .await
            .map_err(|e| LinkError::SendError(e.to_string()))
    }

    async fn flush_pending(&mut self) {
        while let Some(frame) = self.pending.pop_front() {
            if let Err(e) = self.send(&frame).await {
                debug!("dropping pending frame: {e}");
            }
        }
    }

    /// Drive the connection state machine one step.
    ///
    /// Intended as a `select!` branch: a failed attempt arms a retry
    /// deadline and returns; the next call waits it out before making at
    /// most one new attempt. Retries are unbounded with a fixed delay.
    pub async fn poll(&mut self) {
        if let Some(deadline) = self.next_attempt_at {
            tokio::time::sleep_until(deadline).await;
            self.next_attempt_at = None;
        }

        if self.state != ConnectionState::Connected {
            self.state = self.state.on_event(LinkEvent::AttemptStarted);
        }

        match self.eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                self.state = self.state.on_event(LinkEvent::HandshakeCompleted);
                self.attempts = 0;
                info!(topic = %self.telemetry_topic, "connected to broker");

                if let Err(e) = self
                    .client
                    .subscribe(self.command_topic.clone(), QoS::AtMostOnce)
                    .await
                {
                    warn!("command subscription failed: {e}");
                }

                self.flush_pending().await;
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                info!(
                    topic = %publish.topic,
                    payload = %String::from_utf8_lossy(&publish.payload),
                    "inbound message"
                );
            }
            Ok(event) => {
                trace!(?event, "mqtt event");
            }
            Err(e) => {
                let event = if self.state == ConnectionState::Connected {
                    LinkEvent::ConnectionLost
                } else {
                    LinkEvent::HandshakeFailed
                };
                self.state = self.state.on_event(event);
                self.attempts += 1;
                warn!(
                    attempts = self.attempts,
                    state = %self.state,
                    "broker link error: {e}, retrying in {:?}",
                    self.retry_delay
                );
                self.next_attempt_at = Some(Instant::now() + self.retry_delay);
            }
        }
    }
}
