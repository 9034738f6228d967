//! AWSW word clock integration.
//!
//! Exposes the extra words of a word clock (e.g. "BIRTHDAY", "ALARM") as
//! switches. Commands and status queries are plain HTTP GET requests against
//! the clock's word API.

mod client;
mod config;
mod setup;
mod switch;
#[allow(clippy::module_inception)]
mod wordclock;
pub mod words;

use std::sync::Arc;

use anyhow::Context;
pub use client::ClientError;
pub use client::ClientHandle;
pub use client::HttpClient;
pub use client::HttpResponse;
pub use client::ReqwestClient;
pub use client::SharedClient;
pub use config::Config as WordClockConfig;
use linkme::distributed_slice;
pub use setup::describe_switches;
pub use switch::device_id;
pub use switch::SwitchDescriptor;
pub use switch::SwitchPhase;
pub use switch::WordSwitch;
pub use switch::DEFAULT_PORT;
use tracing::info;
pub use wordclock::WordClockIntegration;
pub use words::Language;

use crate::engine;

#[distributed_slice(engine::INTEGRATION_REGISTRY)]
fn init_wordclock(ctx: &engine::IntegrationContext) -> engine::IntegrationFactoryResult {
    let mut integrations: Vec<Box<dyn engine::Integration>> = Vec::new();

    for (entry_id, entry) in &ctx.config.integrations.wordclock {
        if !entry.enabled {
            info!("WordClock {} is disabled, skipping", entry_id);
            continue;
        }

        let client = ReqwestClient::new()
            .with_context(|| format!("Failed to create HTTP client for WordClock {}", entry_id))?;
        integrations.push(Box::new(WordClockIntegration::new(
            format!("wordclock.{}", entry_id),
            entry.clone(),
            Arc::new(client),
        )));
    }

    Ok(integrations)
}
