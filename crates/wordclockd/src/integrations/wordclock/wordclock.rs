use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::client::SharedClient;
use super::setup::describe_switches;
use super::switch::WordSwitch;
use super::WordClockConfig;
use crate::engine::Entity;
use crate::engine::FromIntegrationMessage;
use crate::engine::FromIntegrationSender;
use crate::engine::Integration;
use crate::engine::ToIntegrationMessage;

/// A switch together with its engine entity ID
type SharedSwitch = (String, Arc<Mutex<WordSwitch>>);

/// Switches of one clock, in word-table order. Fixed after setup.
type SwitchList = Arc<Vec<SharedSwitch>>;

/// Word clock integration for wordclockd
///
/// One instance per configured clock. Owns the HTTP client shared by the
/// clock's switches, polls the device, and executes switch commands.
///
/// Each switch is polled by its own task and every command runs on its own
/// task. Only the switch's mutex orders operations, so a request that never
/// returns stalls that one word and nothing else.
pub struct WordClockIntegration {
    name: String,
    config: WordClockConfig,
    client: Option<SharedClient>,
    switches: SwitchList,
    to_engine: Option<FromIntegrationSender>,
    /// One polling task per switch
    poll_tasks: JoinSet<()>,
    /// Commands still talking to the device
    command_tasks: JoinSet<()>,
}

impl WordClockIntegration {
    /// Create a new word clock integration
    pub fn new(name: String, config: WordClockConfig, client: SharedClient) -> Self {
        Self {
            name,
            config,
            client: Some(client),
            switches: Arc::new(Vec::new()),
            to_engine: None,
            poll_tasks: JoinSet::new(),
            command_tasks: JoinSet::new(),
        }
    }

    /// Poll one switch on a fixed interval
    ///
    /// The first tick fires immediately so the initial state is read right
    /// after setup.
    async fn poll_loop(
        entity_id: String,
        switch: Arc<Mutex<WordSwitch>>,
        period: Duration,
        to_engine: FromIntegrationSender,
    ) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            debug!("Polling {}", entity_id);

            let on = {
                let mut switch = switch.lock().await;
                switch.update().await;
                switch.is_on()
            };
            report_state(&entity_id, on, &to_engine).await;
        }
    }

    fn find_switch(
        &self,
        entity_id: &str,
    ) -> Result<Arc<Mutex<WordSwitch>>, Box<dyn Error + Send>> {
        self.switches
            .iter()
            .find(|(id, _)| id == entity_id)
            .map(|(_, switch)| switch.clone())
            .ok_or_else(|| -> Box<dyn Error + Send> {
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Switch not found: {}", entity_id),
                ))
            })
    }

    fn sender(&self) -> Result<&FromIntegrationSender, Box<dyn Error + Send>> {
        self.to_engine
            .as_ref()
            .ok_or_else(|| -> Box<dyn Error + Send> {
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotConnected,
                    "Integration not set up. Call setup() first.",
                ))
            })
    }
}

#[async_trait]
impl Integration for WordClockIntegration {
    fn name(&self) -> &str {
        &self.name
    }

    async fn setup(&mut self, tx: FromIntegrationSender) -> Result<(), Box<dyn Error + Send>> {
        self.to_engine = Some(tx.clone());

        let client = self
            .client
            .as_ref()
            .ok_or_else(|| -> Box<dyn Error + Send> {
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotConnected,
                    "HTTP session not initialized",
                ))
            })?;
        let handle = Arc::downgrade(client);

        let descriptors = describe_switches(
            &self.config.ip_address,
            self.config.port,
            &self.config.language,
        );

        let mut switches = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let switch = WordSwitch::new(descriptor, handle.clone());
            let info = switch.info();
            let entity_id = info.entity_id.clone();

            let msg = FromIntegrationMessage::EntityDiscovered {
                info,
                integration_name: self.name.clone(),
            };
            if let Err(e) = tx.send(msg).await {
                warn!("Failed to send EntityDiscovered message: {}", e);
            } else {
                info!("Registered entity: {}", entity_id);
            }
            report_state(&entity_id, switch.is_on(), &tx).await;

            switches.push((entity_id, Arc::new(Mutex::new(switch))));
        }
        self.switches = Arc::new(switches);

        if self.switches.is_empty() {
            info!("[{}] No word switches, polling disabled", self.name);
            return Ok(());
        }

        let period = self.config.poll_interval();
        for (entity_id, switch) in self.switches.iter() {
            self.poll_tasks.spawn(Self::poll_loop(
                entity_id.clone(),
                switch.clone(),
                period,
                tx.clone(),
            ));
        }

        info!(
            "[{}] WordClock integration ready with {} switches",
            self.name,
            self.switches.len()
        );
        Ok(())
    }

    async fn handle_message(
        &mut self,
        msg: ToIntegrationMessage,
    ) -> Result<(), Box<dyn Error + Send>> {
        let switch = self.find_switch(msg.entity_id())?;
        let to_engine = self.sender()?.clone();

        match &msg {
            ToIntegrationMessage::SwitchCommand { entity_id, on } => {
                info!("Handling switch command for {}: on={}", entity_id, on);
            }
            ToIntegrationMessage::UpdateEntity { entity_id } => {
                debug!("Refreshing {}", entity_id);
            }
        }

        // Reap finished commands
        while self.command_tasks.try_join_next().is_some() {}

        self.command_tasks.spawn(async move {
            let mut switch = switch.lock().await;
            let entity_id = match msg {
                ToIntegrationMessage::SwitchCommand { entity_id, on: true } => {
                    switch.turn_on().await;
                    entity_id
                }
                ToIntegrationMessage::SwitchCommand {
                    entity_id,
                    on: false,
                } => {
                    switch.turn_off().await;
                    entity_id
                }
                ToIntegrationMessage::UpdateEntity { entity_id } => {
                    switch.update().await;
                    entity_id
                }
            };
            report_state(&entity_id, switch.is_on(), &to_engine).await;
        });
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), Box<dyn Error + Send>> {
        info!("[{}] WordClock integration shutting down", self.name);

        self.poll_tasks.shutdown().await;
        debug!("[{}] Poll tasks cancelled", self.name);
        if !self.command_tasks.is_empty() {
            debug!(
                "[{}] Cancelling {} pending commands",
                self.name,
                self.command_tasks.len()
            );
        }
        self.command_tasks.shutdown().await;

        if let Some(tx) = &self.to_engine {
            for (entity_id, _) in self.switches.iter() {
                let msg = FromIntegrationMessage::EntityRemoved {
                    entity_id: entity_id.clone(),
                };
                if let Err(e) = tx.send(msg).await {
                    warn!("Failed to send EntityRemoved message: {}", e);
                }
            }
        }

        // Switches only hold weak handles; this closes the session for all of them
        self.client = None;
        Ok(())
    }
}

/// Report a switch's current state to the engine
async fn report_state(entity_id: &str, on: bool, to_engine: &FromIntegrationSender) {
    let msg = FromIntegrationMessage::SwitchStateChanged {
        entity_id: entity_id.to_string(),
        on,
    };
    if let Err(e) = to_engine.send(msg).await {
        warn!("Failed to send SwitchStateChanged message: {}", e);
    }
}
