//! Device link with statum state machine for the broker connection
//!
//! Runs in its own tokio task. Incoming publishes on the cover state and
//! position topics become [`DeviceUpdate`]s for the UI thread; commands from
//! the widget are published on the cover command topics.
//!
//! # State Machine
//!
//! ```text
//! Configured ──► Running ──► Stopped
//!    (start)         (shutdown token)
//! ```
//!
//! # Architecture
//!
//! ```text
//! UI thread                      link task                    broker
//! ChannelCommandSink ─[CoverCommand]─► publish ──────────────►
//!                    ◄─[DeviceUpdate]── parse_publish ◄────────
//!                    ◄─[ConnectionState] (watch)
//! ```

use super::config::{CoverTopics, MqttSettings};
use super::messages::{parse_publish, CoverCommand, DeviceUpdate};
use crate::channel::PerChannel;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use statum::{machine, state};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Link configuration error: {0}")]
    ConfigError(String),

    #[error("MQTT client error: {0}")]
    ClientError(#[from] rumqttc::ClientError),
}

#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// States for the link lifecycle using statum
#[state]
#[derive(Debug, Clone)]
pub enum LinkState {
    Configured, // Options built, nothing polled yet
    Running,    // Event loop polled, subscriptions issued
    Stopped,    // Disconnected after shutdown
}

#[machine]
pub struct DeviceLink<S: LinkState> {
    settings: MqttSettings,
    covers: Vec<(String, CoverTopics)>,
    update_tx: mpsc::Sender<DeviceUpdate>,
    command_rx: mpsc::Receiver<CoverCommand>,
    status_tx: watch::Sender<ConnectionState>,
    client: Option<AsyncClient>,
    eventloop: Option<EventLoop>,
}

impl<S: LinkState> DeviceLink<S> {
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.covers.iter().map(|(entity, _)| entity.as_str())
    }
}

impl DeviceLink<Configured> {
    pub fn create(
        settings: MqttSettings,
        entities: PerChannel<String>,
        update_tx: mpsc::Sender<DeviceUpdate>,
        command_rx: mpsc::Receiver<CoverCommand>,
        status_tx: watch::Sender<ConnectionState>,
    ) -> Self {
        let covers = entities
            .iter()
            .filter(|(_, entity)| !entity.is_empty())
            .map(|(_, entity)| (entity.clone(), CoverTopics::for_entity(entity)))
            .collect();

        Self::new(
            settings, covers, update_tx, command_rx, status_tx, None, // client
            None, // eventloop
        )
    }

    /// Builds the client and transitions to Running.
    ///
    /// The connection itself is opened lazily by the first poll of the event loop.
    pub fn start(mut self) -> Result<DeviceLink<Running>, LinkError> {
        if self.settings.host.trim().is_empty() {
            return Err(LinkError::ConfigError("MQTT host is empty".to_string()));
        }
        if self.covers.is_empty() {
            return Err(LinkError::ConfigError("no cover entities to follow".to_string()));
        }

        let mut options = MqttOptions::new(
            self.settings.client_id.clone(),
            self.settings.host.trim(),
            self.settings.port,
        );
        options.set_keep_alive(Duration::from_secs(self.settings.keep_alive_secs.max(1)));
        if let (Some(user), Some(password)) = (&self.settings.username, &self.settings.password) {
            options.set_credentials(user.clone(), password.clone());
        }

        let (client, eventloop) = AsyncClient::new(options, self.settings.channel_capacity.max(1));
        self.client = Some(client);
        self.eventloop = Some(eventloop);
        let _ = self.status_tx.send(ConnectionState::Connecting);

        info!(
            "Device link configured for {}:{}",
            self.settings.host, self.settings.port
        );
        Ok(self.transition())
    }
}

impl DeviceLink<Running> {
    /// Subscribes to every cover's state and position topics.
    ///
    /// Called on each ConnAck; the session is not persistent across reconnects.
    fn subscribe_all(&self) {
        let Some(client) = &self.client else {
            return;
        };
        for (entity, topics) in &self.covers {
            for topic in topics.subscriptions() {
                match client.try_subscribe(topic, QoS::AtLeastOnce) {
                    Ok(()) => debug!("Subscribed to {} for {}", topic, entity),
                    Err(e) => error!("Failed to subscribe to {}: {}", topic, e),
                }
            }
        }
    }

    fn publish(&self, command: CoverCommand) {
        let Some(client) = &self.client else {
            return;
        };
        let (topic, payload) = command.to_publish();
        match client.try_publish(topic.as_str(), QoS::AtLeastOnce, false, payload.clone()) {
            Ok(()) => info!("Published {} to {}", payload, topic),
            Err(e) => error!("Failed to publish {} to {}: {}", payload, topic, e),
        }
    }

    fn forward(&self, topic: &str, payload: &[u8]) {
        let Some(update) = parse_publish(&self.covers, topic, payload) else {
            return;
        };
        debug!("Device update: {}", update);
        if let Err(e) = self.update_tx.try_send(update) {
            warn!("Dropping device update, UI not keeping up: {}", e);
        }
    }

    /// Main loop; ends when `shutdown` is cancelled.
    pub async fn run_until_shutdown(mut self, shutdown: CancellationToken) -> DeviceLink<Stopped> {
        let Some(mut eventloop) = self.eventloop.take() else {
            error!("Device link started without an event loop");
            return self.transition();
        };
        info!("Starting device link loop");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received for device link");
                    break;
                }

                Some(command) = self.command_rx.recv() => {
                    self.publish(command);
                }

                event = eventloop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("Connected to broker {}", self.settings.host);
                        let _ = self.status_tx.send(ConnectionState::Connected);
                        self.subscribe_all();
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        self.forward(&publish.topic, &publish.payload);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Broker connection error: {}", e);
                        let _ = self.status_tx.send(ConnectionState::Reconnecting);
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        }

        if let Some(client) = &self.client {
            if let Err(e) = client.try_disconnect() {
                debug!("Disconnect request not queued: {}", e);
            }
        }
        let _ = self.status_tx.send(ConnectionState::Disconnected);
        info!("Device link stopped");
        self.transition()
    }
}

impl DeviceLink<Stopped> {}

/// Handle for the link task
#[derive(Debug)]
pub struct DeviceLinkHandle {
    shutdown: CancellationToken,
    task_handle: Option<tokio::task::JoinHandle<()>>,
}

impl DeviceLinkHandle {
    /// Starts the link in a tokio task.
    pub fn spawn(link: DeviceLink<Configured>) -> Result<Self, LinkError> {
        let running = link.start()?;
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let task_handle = tokio::spawn(async move {
            let _stopped = running.run_until_shutdown(token).await;
        });
        Ok(Self {
            shutdown,
            task_handle: Some(task_handle),
        })
    }

    /// Cancels the link and waits for the task to finish.
    pub async fn shutdown(&mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.task_handle.take() {
            if let Err(e) = handle.await {
                error!("Device link task panicked: {}", e);
            }
        }
    }

    pub fn cancel(&self) {
        self.shutdown.cancel();
    }
}
