//! Type-safe message system for wordclockd
//!
//! Messages are split by direction to enforce correct usage at compile time:
//! - `FromIntegrationMessage`: Events from integrations to the engine
//! - `ToIntegrationMessage`: Commands from the engine to integrations

use super::state::EntityInfo;

/// Messages FROM integrations TO the engine (events/state updates)
#[derive(Debug, Clone)]
pub enum FromIntegrationMessage {
    /// An entity was discovered and registered
    EntityDiscovered {
        info: EntityInfo,
        integration_name: String,
    },

    /// An entity was removed (integration shut down, etc.)
    EntityRemoved { entity_id: String },

    /// A switch reported its current state
    SwitchStateChanged { entity_id: String, on: bool },
}

/// Messages FROM the engine TO integrations (commands)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToIntegrationMessage {
    /// Command to turn a switch on or off
    SwitchCommand { entity_id: String, on: bool },

    /// Refresh an entity from its device right away
    UpdateEntity { entity_id: String },
}

impl ToIntegrationMessage {
    /// Entity the command is addressed to, used for routing
    pub fn entity_id(&self) -> &str {
        match self {
            ToIntegrationMessage::SwitchCommand { entity_id, .. } => entity_id,
            ToIntegrationMessage::UpdateEntity { entity_id } => entity_id,
        }
    }
}
