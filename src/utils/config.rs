use crate::report::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Script URLs the standalone report pulls in when opened.
///
/// The report stays readable without them (see the static fallback table),
/// they only add the interactive view, utility styling and the pass-rate chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CdnUrls {
    /// UI reactivity runtime
    pub vue: String,
    /// Utility-class styling engine
    pub tailwind: String,
    /// Charting library
    pub echarts: String,
}

impl Default for CdnUrls {
    fn default() -> Self {
        Self {
            vue: "https://unpkg.com/vue@3/dist/vue.global.prod.js".to_string(),
            tailwind: "https://cdn.tailwindcss.com".to_string(),
            echarts: "https://cdn.jsdelivr.net/npm/echarts@5.4.3/dist/echarts.min.js".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Library URLs embedded in HTML reports
    pub cdn: CdnUrls,

    /// Directory used when several payloads are exported at once
    pub output_dir: PathBuf,

    /// Pretty-print JSON exports
    pub pretty_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cdn: CdnUrls::default(),
            output_dir: PathBuf::from("./output"),
            pretty_json: true,
        }
    }
}

impl Config {
    /// Load a YAML config file; keys that are not set keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ReportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        log::debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    /// `--config` if given, the defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
cdn:
  echarts: "https://mirror.internal/echarts.min.js"
prettyJson: false
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.cdn.echarts, "https://mirror.internal/echarts.min.js");
        assert_eq!(config.cdn.vue, CdnUrls::default().vue);
        assert!(!config.pretty_json);
        assert_eq!(config.output_dir, PathBuf::from("./output"));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        assert!(matches!(
            Config::from_yaml("cdn: [1, 2"),
            Err(ReportError::Config(_))
        ));
    }
}
