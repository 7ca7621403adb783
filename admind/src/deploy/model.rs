//! Deployment wire and persistence model

use serde::{Deserialize, Serialize};

/// One deployment, from trigger request to recorded outcome.
///
/// The same object travels the whole pipeline: the POST body fills the
/// request fields, the build step attaches `logs`, the log parser derives
/// `name`/`version`/`timestamp`/`success`, and the resolved record is both
/// persisted to history and returned to the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deployment {
    pub repo_url: Option<String>,
    pub plugin_id: Option<String>,
    pub branch: Option<String>,
    pub sub_dir: Option<String>,
    pub skip_tests: bool,

    // Derived by the build log parser, never user supplied.
    pub success: bool,
    pub name: Option<String>,
    pub version: Option<String>,
    pub timestamp: Option<String>,

    pub msg: Option<String>,
    pub logs: String,
}

impl Deployment {
    /// First mandatory request field that is missing or empty, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if is_null_or_empty(&self.repo_url) {
            return Some("repoUrl");
        }
        if is_null_or_empty(&self.plugin_id) {
            return Some("pluginId");
        }
        None
    }

    /// History key for the resolved record.
    pub fn record_key(&self) -> String {
        format!(
            "{}_{}_{}",
            self.plugin_id.as_deref().unwrap_or_default(),
            self.version.as_deref().unwrap_or_default(),
            self.timestamp.as_deref().unwrap_or_default()
        )
    }
}

fn is_null_or_empty(value: &Option<String>) -> bool {
    value.as_deref().map(str::is_empty).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_reports_repo_url_first() {
        let dep = Deployment::default();
        assert_eq!(dep.missing_field(), Some("repoUrl"));

        let dep = Deployment {
            repo_url: Some("https://example.com/repo.git".to_string()),
            ..Deployment::default()
        };
        assert_eq!(dep.missing_field(), Some("pluginId"));

        let dep = Deployment {
            repo_url: Some("https://example.com/repo.git".to_string()),
            plugin_id: Some("21".to_string()),
            ..Deployment::default()
        };
        assert_eq!(dep.missing_field(), None);
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let dep = Deployment {
            repo_url: Some(String::new()),
            ..Deployment::default()
        };
        assert_eq!(dep.missing_field(), Some("repoUrl"));
    }

    #[test]
    fn record_key_joins_id_version_timestamp() {
        let dep = Deployment {
            plugin_id: Some("21".to_string()),
            version: Some("1.2".to_string()),
            timestamp: Some("2024-01-01T00:00:00Z".to_string()),
            ..Deployment::default()
        };
        assert_eq!(dep.record_key(), "21_1.2_2024-01-01T00:00:00Z");
    }
}
