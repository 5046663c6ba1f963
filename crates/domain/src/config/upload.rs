use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Upload subsystem (argument/return shape only — the backing store is an
// external collaborator)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "d_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    #[serde(default = "d_max_size_bytes")]
    pub max_size_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: d_allowed_extensions(),
            max_size_bytes: d_max_size_bytes(),
        }
    }
}

fn d_allowed_extensions() -> Vec<String> {
    vec!["pdf".into(), "csv".into(), "txt".into()]
}

fn d_max_size_bytes() -> u64 {
    10 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_pdf_csv_txt() {
        let cfg = UploadConfig::default();
        assert!(cfg.allowed_extensions.contains(&"pdf".to_string()));
        assert!(cfg.allowed_extensions.contains(&"csv".to_string()));
    }

    #[test]
    fn default_max_size_is_ten_mb() {
        assert_eq!(UploadConfig::default().max_size_bytes, 10 * 1024 * 1024);
    }
}
