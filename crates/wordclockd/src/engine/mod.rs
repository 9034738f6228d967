mod device;
#[allow(clippy::module_inception)]
mod engine;
mod entity;
mod event;
mod integration;
mod message;
pub mod state;
#[cfg(test)]
pub(crate) mod testing;

pub use device::DeviceInfo;
pub use engine::Engine;
pub use engine::EngineError;
pub use entity::Entity;
pub use event::Event;
pub use integration::FromIntegrationSender;
pub use integration::Integration;
pub use integration::IntegrationContext;
pub use integration::IntegrationFactoryResult;
pub use integration::REGISTRY as INTEGRATION_REGISTRY;
pub use message::FromIntegrationMessage;
pub use message::ToIntegrationMessage;
pub use state::EntityInfo;
pub use state::State;
pub use state::SwitchState;
