use serde::{Deserialize, Serialize};

/// Broker connection for the device link.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub keep_alive_secs: u64,
    /// Capacity of the request queue and of the channels towards the UI
    pub channel_capacity: usize,
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "dualcover".to_string(),
            username: None,
            password: None,
            keep_alive_secs: 5,
            channel_capacity: 100,
        }
    }
}

/// Topics of one cover below its base topic (Home Assistant MQTT cover layout).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverTopics {
    /// `open`, `opening`, `closed`, `closing`, `stopped`
    pub state: String,
    /// Current position 0..=100
    pub position: String,
    /// Accepts `STOP`
    pub command: String,
    /// Accepts a target position 0..=100
    pub set_position: String,
}

impl CoverTopics {
    pub fn for_entity(entity: &str) -> Self {
        let base = entity.trim().trim_end_matches('/');
        Self {
            state: format!("{}/state", base),
            position: format!("{}/position", base),
            command: format!("{}/set", base),
            set_position: format!("{}/set_position", base),
        }
    }

    pub fn subscriptions(&self) -> [&str; 2] {
        [self.state.as_str(), self.position.as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_derive_from_base() {
        let topics = CoverTopics::for_entity("home/covers/office_top/");
        assert_eq!(topics.state, "home/covers/office_top/state");
        assert_eq!(topics.position, "home/covers/office_top/position");
        assert_eq!(topics.command, "home/covers/office_top/set");
        assert_eq!(topics.set_position, "home/covers/office_top/set_position");
        assert_eq!(
            topics.subscriptions(),
            ["home/covers/office_top/state", "home/covers/office_top/position"]
        );
    }
}
