//! Entity abstraction for wordclockd
//!
//! All entities exposed by integrations implement the Entity trait.

use super::device::DeviceInfo;
use super::state::EntityInfo;

/// Base trait that all entities must implement
pub trait Entity: Send + Sync {
    /// Identifier that stays stable across restarts
    fn unique_id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> String;

    /// Return the platform type of this entity (e.g. "switch")
    fn platform(&self) -> &'static str;

    /// Device this entity belongs to
    fn device_info(&self) -> DeviceInfo;

    /// Engine-wide entity ID, `{platform}.{unique_id}`
    fn entity_id(&self) -> String {
        format!("{}.{}", self.platform(), self.unique_id())
    }

    /// Snapshot of the static entity description reported on discovery
    fn info(&self) -> EntityInfo {
        EntityInfo {
            entity_id: self.entity_id(),
            unique_id: self.unique_id().to_string(),
            name: self.name(),
            platform: self.platform(),
            device: self.device_info(),
        }
    }
}
