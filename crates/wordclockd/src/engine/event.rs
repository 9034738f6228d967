use super::state::SwitchState;

/// Engine-level events broadcast to subscribers.
///
/// Distinct from `FromIntegrationMessage` (transport-level). The engine converts
/// `FromIntegrationMessage` into `Event` at the boundary, after the state snapshot
/// has been updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    EntityDiscovered {
        entity_id: String,
    },
    EntityRemoved {
        entity_id: String,
    },
    SwitchStateChanged {
        entity_id: String,
        state: SwitchState,
    },
}
