#[cfg(feature = "integration_wordclock")]
pub mod wordclock;
