use std::sync::Arc;

use tracing::debug;
use tracing::error;

use super::client::ClientError;
use super::client::ClientHandle;
use super::client::HttpClient;
use super::words::WordId;
use crate::engine::DeviceInfo;
use crate::engine::Entity;

/// Port the clock's word API listens on
pub const DEFAULT_PORT: u16 = 2023;

/// Device identifier domain
pub const DOMAIN: &str = "wordclock";

const MANUFACTURER: &str = "AWSW";
const MODEL: &str = "WordClock";

/// Device ID for a clock, derived from its address.
///
/// Dots become `_`, so `192.168.1.50` maps to `wordclock_192_168_1_50`.
/// Nothing else is rewritten; addresses that differ in any other character
/// keep distinct IDs.
pub fn device_id(ip_address: &str) -> String {
    format!("{}_{}", DOMAIN, ip_address.replace('.', "_"))
}

/// Everything needed to build one word switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchDescriptor {
    pub ip_address: String,
    pub port: u16,
    pub word_id: WordId,
    pub label: &'static str,
    pub device_id: String,
}

impl SwitchDescriptor {
    pub fn new(ip_address: &str, port: u16, word_id: WordId, label: &'static str) -> Self {
        Self {
            ip_address: ip_address.to_string(),
            port,
            word_id,
            label,
            device_id: device_id(ip_address),
        }
    }

    pub fn unique_id(&self) -> String {
        format!("{}_word_{}", self.device_id, self.word_id)
    }

    pub fn name(&self) -> String {
        format!("Word {}", self.label)
    }

    /// `GET /ew/?ew{id}={0|1}` lights or clears the word
    pub fn command_url(&self, on: bool) -> String {
        format!(
            "http://{}:{}/ew/?ew{}={}",
            self.ip_address,
            self.port,
            self.word_id,
            if on { 1 } else { 0 }
        )
    }

    /// `GET /ewstatus/?{id}` answers "1" while the word is lit
    pub fn status_url(&self) -> String {
        format!(
            "http://{}:{}/ewstatus/?{}",
            self.ip_address, self.port, self.word_id
        )
    }

    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo::new(format!("WordClock ({})", self.ip_address))
            .with_identifier(DOMAIN, &self.device_id)
            .with_manufacturer(MANUFACTURER)
            .with_model(MODEL)
            .with_configuration_url(format!("http://{}", self.ip_address))
    }
}

/// Lifecycle of a word switch
///
/// Turning on is optimistic: the switch reports On while the request is in
/// flight and settles to On or Off depending on the device's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchPhase {
    #[default]
    Off,
    PendingOn,
    On,
}

impl SwitchPhase {
    /// PendingOn reports as On
    pub fn is_on(self) -> bool {
        !matches!(self, SwitchPhase::Off)
    }

    /// Resolve an in-flight turn-on with the outcome of the device request
    pub fn settle(self, succeeded: bool) -> Self {
        match self {
            SwitchPhase::PendingOn if succeeded => SwitchPhase::On,
            SwitchPhase::PendingOn => SwitchPhase::Off,
            other => other,
        }
    }

    /// Interpret the body of a successful status query
    pub fn from_status_body(body: &str) -> Self {
        if body.trim() == "1" {
            SwitchPhase::On
        } else {
            SwitchPhase::Off
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("device answered HTTP {0}")]
    Status(u16),
}

/// One word of the clock exposed as an on/off switch
///
/// The operations never fail towards the caller: device errors are logged and
/// reflected in the resulting state, which the caller reads with `is_on`.
pub struct WordSwitch {
    descriptor: SwitchDescriptor,
    unique_id: String,
    phase: SwitchPhase,
    client: ClientHandle,
}

impl WordSwitch {
    pub fn new(descriptor: SwitchDescriptor, client: ClientHandle) -> Self {
        let unique_id = descriptor.unique_id();
        Self {
            descriptor,
            unique_id,
            phase: SwitchPhase::Off,
            client,
        }
    }

    pub fn descriptor(&self) -> &SwitchDescriptor {
        &self.descriptor
    }

    pub fn word_id(&self) -> WordId {
        self.descriptor.word_id
    }

    pub fn label(&self) -> &'static str {
        self.descriptor.label
    }

    pub fn phase(&self) -> SwitchPhase {
        self.phase
    }

    pub fn is_on(&self) -> bool {
        self.phase.is_on()
    }

    /// Light the word
    pub async fn turn_on(&mut self) {
        debug!("Turning on Word {} (ID: {})", self.label(), self.word_id());
        let client = match self.client() {
            Ok(client) => client,
            Err(e) => {
                error!("Cannot turn on Word {}: {}", self.label(), e);
                return;
            }
        };

        self.phase = SwitchPhase::PendingOn;
        let result = self.send_command(client.as_ref(), true).await;
        if let Err(e) = &result {
            error!("Failed to turn on Word {}: {}", self.label(), e);
        }
        self.phase = self.phase.settle(result.is_ok());
    }

    /// Clear the word
    pub async fn turn_off(&mut self) {
        debug!("Turning off Word {} (ID: {})", self.label(), self.word_id());
        let client = match self.client() {
            Ok(client) => client,
            Err(e) => {
                error!("Cannot turn off Word {}: {}", self.label(), e);
                return;
            }
        };

        self.phase = SwitchPhase::Off;
        if let Err(e) = self.send_command(client.as_ref(), false).await {
            error!("Failed to turn off Word {}: {}", self.label(), e);
        }
    }

    /// Fetch the current status from the device
    pub async fn update(&mut self) {
        let client = match self.client() {
            Ok(client) => client,
            Err(e) => {
                error!("Cannot fetch status for Word {}: {}", self.label(), e);
                return;
            }
        };

        let url = self.descriptor.status_url();
        match client.get(&url).await {
            Ok(response) if response.is_ok() => {
                self.phase = SwitchPhase::from_status_body(&response.body);
            }
            Ok(response) => {
                error!(
                    "Failed to fetch status for Word {} (HTTP {})",
                    self.label(),
                    response.status
                );
            }
            Err(e) => {
                error!(
                    "HTTP request to fetch status for Word {} failed: {}",
                    self.label(),
                    e
                );
            }
        }
    }

    fn client(&self) -> Result<Arc<dyn HttpClient>, ClientError> {
        self.client.upgrade().ok_or(ClientError::Unavailable)
    }

    /// Only the status counts; the body of a command response is never read
    async fn send_command(&self, client: &dyn HttpClient, on: bool) -> Result<(), CommandError> {
        let url = self.descriptor.command_url(on);
        match client.get_status(&url).await? {
            200 => Ok(()),
            status => Err(CommandError::Status(status)),
        }
    }
}

impl Entity for WordSwitch {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn name(&self) -> String {
        self.descriptor.name()
    }

    fn platform(&self) -> &'static str {
        "switch"
    }

    fn device_info(&self) -> DeviceInfo {
        self.descriptor.device_info()
    }
}
