use serde::Serialize;

/// A device in the wordclockd system.
///
/// A device represents a physical box on the network that contains one or more entities.
/// Every word switch of a clock points at the same `DeviceInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub configuration_url: Option<String>,
}

impl DeviceInfo {
    pub fn new(name: String) -> Self {
        Self {
            identifiers: Vec::new(),
            name,
            manufacturer: None,
            model: None,
            configuration_url: None,
        }
    }

    pub fn with_identifier(mut self, domain: &str, id: &str) -> Self {
        let identifier = (domain.to_string(), id.to_string());
        if !self.identifiers.contains(&identifier) {
            self.identifiers.push(identifier);
        }
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: &str) -> Self {
        self.manufacturer = Some(manufacturer.to_string());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn with_configuration_url(mut self, url: String) -> Self {
        self.configuration_url = Some(url);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_are_deduplicated() {
        let device = DeviceInfo::new("Clock".to_string())
            .with_identifier("wordclock", "a")
            .with_identifier("wordclock", "a")
            .with_identifier("wordclock", "b");
        assert_eq!(device.identifiers.len(), 2);
    }
}
