pub mod api;
pub mod config;
mod engine;
pub mod integrations;

pub use config::Config;
pub use config::ConfigError;
pub use config::LogLevel;
pub use engine::DeviceInfo;
pub use engine::Engine;
pub use engine::EngineError;
pub use engine::Entity;
pub use engine::EntityInfo;
pub use engine::Event;
pub use engine::State;
pub use engine::SwitchState;
