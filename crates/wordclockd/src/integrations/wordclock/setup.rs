use tracing::debug;
use tracing::error;
use tracing::info;

use super::switch::SwitchDescriptor;
use super::words;

/// Describe one switch per word of the clock's language edition.
///
/// An unknown language produces no switches. That is logged, not treated as
/// a failure: the entry simply exposes nothing.
pub fn describe_switches(ip_address: &str, port: u16, language: &str) -> Vec<SwitchDescriptor> {
    info!(
        "Setting up WordClock switches for IP: {} with language: {}",
        ip_address, language
    );

    let table = words::lookup(language);
    if table.is_empty() {
        error!(
            "Language '{}' not found. No switches will be added.",
            language
        );
        return Vec::new();
    }

    table
        .iter()
        .map(|&(word_id, label)| {
            debug!("Adding switch for Word {} (ID: {})", label, word_id);
            SwitchDescriptor::new(ip_address, port, word_id, label)
        })
        .collect()
}
