use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Conversation history
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Directory the file-backed conversation store writes under.
    #[serde(default = "d_state_dir")]
    pub state_dir: String,
    /// Number of most-recent messages replayed into a new agent turn.
    #[serde(default = "d_max_history_messages")]
    pub max_history_messages: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            state_dir: d_state_dir(),
            max_history_messages: d_max_history_messages(),
        }
    }
}

fn d_state_dir() -> String {
    "./data/conversations".into()
}

fn d_max_history_messages() -> usize {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_max_history_messages_is_twenty() {
        assert_eq!(SessionsConfig::default().max_history_messages, 20);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: SessionsConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.max_history_messages, 20);
        assert_eq!(cfg.state_dir, "./data/conversations");
    }
}
