//! Test helpers shared by engine and API tests.

use std::error::Error;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::DeviceInfo;
use super::EntityInfo;
use super::Event;
use super::FromIntegrationMessage;
use super::FromIntegrationSender;
use super::Integration;
use super::ToIntegrationMessage;

pub type CommandLog = Arc<Mutex<Vec<ToIntegrationMessage>>>;

/// Integration that owns a fixed set of switches, records every command and
/// reports the commanded state back as if the device accepted it.
pub struct RecordingIntegration {
    name: String,
    entity_ids: Vec<String>,
    commands: CommandLog,
    to_engine: Option<FromIntegrationSender>,
}

impl RecordingIntegration {
    pub fn new(name: &str, entity_ids: &[&str]) -> (Self, CommandLog) {
        let commands = CommandLog::default();
        let integration = Self {
            name: name.to_string(),
            entity_ids: entity_ids.iter().map(|id| id.to_string()).collect(),
            commands: commands.clone(),
            to_engine: None,
        };
        (integration, commands)
    }

    async fn send(&self, msg: FromIntegrationMessage) {
        if let Some(tx) = &self.to_engine {
            tx.send(msg).await.ok();
        }
    }
}

#[async_trait]
impl Integration for RecordingIntegration {
    fn name(&self) -> &str {
        &self.name
    }

    async fn setup(&mut self, tx: FromIntegrationSender) -> Result<(), Box<dyn Error + Send>> {
        self.to_engine = Some(tx);
        for entity_id in &self.entity_ids {
            let short = entity_id.trim_start_matches("switch.");
            let info = EntityInfo {
                entity_id: entity_id.clone(),
                unique_id: short.to_string(),
                name: format!("Word {}", short),
                platform: "switch",
                device: DeviceInfo::new("Test device".to_string()),
            };
            self.send(FromIntegrationMessage::EntityDiscovered {
                info,
                integration_name: self.name.clone(),
            })
            .await;
        }
        Ok(())
    }

    async fn handle_message(
        &mut self,
        msg: ToIntegrationMessage,
    ) -> Result<(), Box<dyn Error + Send>> {
        self.commands.lock().unwrap().push(msg.clone());
        if let ToIntegrationMessage::SwitchCommand { entity_id, on } = msg {
            self.send(FromIntegrationMessage::SwitchStateChanged { entity_id, on })
                .await;
        }
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), Box<dyn Error + Send>> {
        for entity_id in self.entity_ids.clone() {
            self.send(FromIntegrationMessage::EntityRemoved { entity_id })
                .await;
        }
        Ok(())
    }
}

/// Wait for the next engine event, failing the test if none arrives.
pub async fn next_event(rx: &mut broadcast::Receiver<Event>) -> Event {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for engine event")
        .expect("event channel closed")
}
