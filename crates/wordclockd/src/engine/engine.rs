use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::event::Event;
use super::integration::FromIntegrationReceiver;
use super::integration::FromIntegrationSender;
use super::integration::Integration;
use super::integration::ToIntegrationSender;
use super::message::FromIntegrationMessage;
use super::message::ToIntegrationMessage;
use super::state::State;
use super::state::SwitchState;
use crate::engine::IntegrationContext;

/// Errors returned when routing a command to an integration
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("No integration found for entity: {0}")]
    UnknownEntity(String),

    #[error("Integration channel not found: {0}")]
    IntegrationNotFound(String),

    #[error("Integration '{0}' is no longer accepting commands")]
    IntegrationClosed(String),

    #[error("Engine routing table lock poisoned")]
    Poisoned,
}

/// wordclockd engine
///
/// This structure handles the flow of events, sending commands to the correct integration,
/// and maintaining a view of the world with State.
pub struct Engine {
    /// Centralized state snapshot (readers load the Arc, writer stores a new one)
    state: ArcSwap<State>,

    /// Map of entity_id -> integration name for routing messages
    entity_integration_map: std::sync::Mutex<HashMap<String, String>>,

    /// Communication channels to integrations (for commands)
    integration_channels: std::sync::Mutex<HashMap<String, ToIntegrationSender>>,

    /// Receive messages from integrations (events)
    message_rx: Mutex<FromIntegrationReceiver>,

    /// Sender for integrations to report events back to the engine
    message_tx: FromIntegrationSender,

    /// Fan-out of processed events to subscribers
    events_tx: broadcast::Sender<Event>,

    /// Handles for integration tasks
    integration_handles: std::sync::Mutex<Vec<JoinHandle<()>>>,
}

/// Capacity for the integration→engine message channel
/// Provides backpressure when integrations send faster than the engine can process
const FROM_INTEGRATION_CHANNEL_SIZE: usize = 1024;

/// Capacity of the event broadcast; slow subscribers lag instead of blocking the engine
const EVENT_CHANNEL_SIZE: usize = 256;

impl Engine {
    /// Create a new Engine instance
    pub fn new() -> Self {
        let (message_tx, message_rx) = mpsc::channel(FROM_INTEGRATION_CHANNEL_SIZE);
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            state: ArcSwap::new(Arc::default()),
            entity_integration_map: std::sync::Mutex::new(HashMap::new()),
            integration_channels: std::sync::Mutex::new(HashMap::new()),
            message_rx: Mutex::new(message_rx),
            message_tx,
            events_tx,
            integration_handles: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Register integrations from configuration
    ///
    /// Runs every factory in the integration registry and registers whatever
    /// integrations they produce. A failing factory is logged and skipped.
    pub fn register_integrations_from_config(&self, cfg: &crate::config::Config) {
        let ctx = IntegrationContext { config: cfg };
        for constr in super::integration::REGISTRY {
            let integrations = match constr(&ctx) {
                Ok(i) => i,
                Err(e) => {
                    error!("failed to setup integration: {:#}", e);
                    continue;
                }
            };
            for integration in integrations {
                let name = integration.name().to_string();
                self.register_integration(name, integration);
            }
        }
    }

    /// Register an integration with the engine
    ///
    /// This spawns the integration in a background task, wires up channels,
    /// and starts its setup process.
    pub fn register_integration(&self, name: String, mut integration: Box<dyn Integration>) {
        let (to_integration_tx, mut to_integration_rx) = mpsc::unbounded_channel();
        let from_integration_tx = self.message_tx.clone();

        match self.integration_channels.lock() {
            Ok(mut channels) => {
                channels.insert(name.clone(), to_integration_tx);
            }
            Err(e) => {
                error!("Failed to register integration '{}': {}", name, e);
                return;
            }
        }

        info!("Registering integration: {}", name);

        // Spawn integration task
        let handle = tokio::spawn(async move {
            // Setup integration (gives it the sender for events)
            if let Err(e) = integration.setup(from_integration_tx).await {
                warn!("Integration '{}' setup failed: {}", name, e);
                return;
            }

            // Process commands from engine
            while let Some(msg) = to_integration_rx.recv().await {
                if let Err(e) = integration.handle_message(msg).await {
                    warn!("Integration '{}' failed to handle message: {}", name, e);
                }
            }

            if let Err(e) = integration.shutdown().await {
                warn!("Integration '{}' shutdown failed: {}", name, e);
            }
        });

        if let Ok(mut handles) = self.integration_handles.lock() {
            handles.push(handle);
        }
    }

    /// Send a command to an integration
    ///
    /// Routes the command to the appropriate integration based on entity_id.
    pub fn send_command(&self, msg: ToIntegrationMessage) -> Result<(), EngineError> {
        let entity_id = msg.entity_id();

        // Route to the integration that owns this entity
        let integration_name = self
            .entity_integration_map
            .lock()
            .map_err(|_| EngineError::Poisoned)?
            .get(entity_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownEntity(entity_id.to_string()))?;

        let channels = self
            .integration_channels
            .lock()
            .map_err(|_| EngineError::Poisoned)?;
        let tx = channels
            .get(&integration_name)
            .ok_or_else(|| EngineError::IntegrationNotFound(integration_name.clone()))?;

        debug!("Routing {:?} to integration {}", msg, integration_name);
        tx.send(msg)
            .map_err(|_| EngineError::IntegrationClosed(integration_name))
    }

    /// Turn a switch on
    pub fn turn_on(&self, entity_id: &str) -> Result<(), EngineError> {
        self.send_command(ToIntegrationMessage::SwitchCommand {
            entity_id: entity_id.to_string(),
            on: true,
        })
    }

    /// Turn a switch off
    pub fn turn_off(&self, entity_id: &str) -> Result<(), EngineError> {
        self.send_command(ToIntegrationMessage::SwitchCommand {
            entity_id: entity_id.to_string(),
            on: false,
        })
    }

    /// Ask the owning integration to refresh an entity from its device
    pub fn update_entity(&self, entity_id: &str) -> Result<(), EngineError> {
        self.send_command(ToIntegrationMessage::UpdateEntity {
            entity_id: entity_id.to_string(),
        })
    }

    /// Run the engine's main event loop
    ///
    /// Processes incoming events from integrations and updates state.
    pub async fn run(&self) -> Result<(), Box<dyn Error + Send>> {
        info!("Engine starting");

        // Main event loop - only receives FromIntegration messages
        let mut rx = self.message_rx.lock().await;
        while let Some(msg) = rx.recv().await {
            self.handle_event(msg);
        }

        info!("Engine shutting down");
        Ok(())
    }

    /// Stop all integrations
    ///
    /// Dropping the command channels ends each integration's command loop, which
    /// then runs the integration's shutdown. Waits for every integration task.
    pub async fn shutdown(&self) {
        if let Ok(mut channels) = self.integration_channels.lock() {
            channels.clear();
        }

        let handles: Vec<JoinHandle<()>> = match self.integration_handles.lock() {
            Ok(mut handles) => handles.drain(..).collect(),
            Err(_) => Vec::new(),
        };

        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Integration task ended abnormally: {}", e);
            }
        }
    }

    /// Get a snapshot of the current engine state.
    ///
    /// Clones the `Arc` (atomic refcount bump), essentially free.
    pub fn state_snapshot(&self) -> Arc<State> {
        self.state.load_full()
    }

    /// Subscribe to events processed by the engine
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events_tx.subscribe()
    }

    fn publish(&self, event: Event) {
        // No subscribers is fine
        let _ = self.events_tx.send(event);
    }

    /// Handle an event from an integration
    fn handle_event(&self, msg: FromIntegrationMessage) {
        match msg {
            FromIntegrationMessage::EntityDiscovered {
                info,
                integration_name,
            } => {
                info!(
                    "Entity discovered: {} (from {})",
                    info.entity_id, integration_name
                );

                let entity_id = info.entity_id.clone();

                // Record which integration owns this entity for command routing.
                // Switch state is not populated until the first state-change message arrives.
                if let Ok(mut map) = self.entity_integration_map.lock() {
                    map.insert(entity_id.clone(), integration_name);
                }

                {
                    let mut state = State::clone(&self.state.load());
                    state.entities.insert(entity_id.clone(), info);
                    self.state.store(Arc::new(state));
                }

                self.publish(Event::EntityDiscovered { entity_id });
            }
            FromIntegrationMessage::EntityRemoved { entity_id } => {
                info!("Entity removed: {}", entity_id);

                {
                    let mut state = State::clone(&self.state.load());
                    state.entities.remove(&entity_id);
                    state.switches.remove(&entity_id);
                    self.state.store(Arc::new(state));
                }

                // Remove from routing map
                if let Ok(mut map) = self.entity_integration_map.lock() {
                    map.remove(&entity_id);
                }

                self.publish(Event::EntityRemoved { entity_id });
            }
            FromIntegrationMessage::SwitchStateChanged { entity_id, on } => {
                let switch_state = SwitchState { on };
                debug!("Switch state: {} -> on={}", entity_id, on);

                {
                    let mut state = State::clone(&self.state.load());
                    let previous = state.switches.insert(entity_id.clone(), switch_state);
                    if previous != Some(switch_state) {
                        info!("Switch state changed: {} -> on={}", entity_id, on);
                    }
                    self.state.store(Arc::new(state));
                }

                self.publish(Event::SwitchStateChanged {
                    entity_id,
                    state: switch_state,
                });
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
