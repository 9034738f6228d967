use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use super::device::DeviceInfo;

/// State of a switch entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SwitchState {
    /// Whether the switch is on or off.
    pub on: bool,
}

/// Static description of a registered entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityInfo {
    pub entity_id: String,
    pub unique_id: String,
    pub name: String,
    pub platform: &'static str,
    pub device: DeviceInfo,
}

/// Centralized snapshot of the entire engine state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct State {
    pub entities: HashMap<String, EntityInfo>,
    pub switches: HashMap<String, SwitchState>,
}
