use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

const ALLOWED_KEYS: &[&str] = &[
    "base_url",
    "request_timeout_ms",
    "notice_ttl_ms",
    "page_size",
];

/// Validated console configuration. Every field has a working default; a
/// config file only overrides.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    /// How long a settle notice stays on screen.
    pub notice_ttl: Duration,
    /// Client-side page size for table printing.
    pub page_size: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            request_timeout: Duration::from_secs(10),
            notice_ttl: Duration::from_secs(3),
            page_size: 25,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    base_url: Option<String>,
    request_timeout_ms: Option<u64>,
    notice_ttl_ms: Option<u64>,
    page_size: Option<usize>,
}

impl ConsoleConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes =
            fs::read(path).with_context(|| format!("read config {}", path.display()))?;
        let raw = parse_raw(&bytes)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(base_url) = raw.base_url {
            let trimmed = base_url.trim().trim_end_matches('/').to_string();
            if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
                return Err(anyhow!("base_url must start with http:// or https://"));
            }
            cfg.base_url = trimmed;
        }
        if let Some(ms) = raw.request_timeout_ms {
            if !(100..=120_000).contains(&ms) {
                return Err(anyhow!(
                    "request_timeout_ms {ms} is out of range (100..=120000)"
                ));
            }
            cfg.request_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = raw.notice_ttl_ms {
            if !(250..=60_000).contains(&ms) {
                return Err(anyhow!("notice_ttl_ms {ms} is out of range (250..=60000)"));
            }
            cfg.notice_ttl = Duration::from_millis(ms);
        }
        if let Some(size) = raw.page_size {
            if !(1..=500).contains(&size) {
                return Err(anyhow!("page_size {size} is out of range (1..=500)"));
            }
            cfg.page_size = size;
        }
        Ok(cfg)
    }
}

/// Config files are JSON first, TOML as a fallback, with unknown top-level
/// keys rejected so typos fail loud instead of silently using defaults.
fn parse_raw(bytes: &[u8]) -> Result<RawConfig> {
    let value: serde_json::Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(json_err) => {
            let utf8 = std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
            let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                anyhow!(
                    "Config is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}"
                )
            })?;
            serde_json::to_value(toml_value)
                .map_err(|err| anyhow!("Failed to convert TOML config to JSON: {err}"))?
        }
    };

    let map = value
        .as_object()
        .ok_or_else(|| anyhow!("Config root must be an object"))?;
    let unknown: Vec<String> = map
        .keys()
        .filter(|key| !ALLOWED_KEYS.contains(&key.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(anyhow!("Unknown config keys: {}", unknown.join(", ")));
    }

    serde_json::from_value(value).map_err(|err| anyhow!("Config parse error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn json_config_overrides_defaults() {
        let file = write_config(
            r#"{ "base_url": "https://dojo.test/api/", "request_timeout_ms": 2500 }"#,
        );

        let cfg = ConsoleConfig::from_path(file.path()).expect("parse");

        assert_eq!(cfg.base_url, "https://dojo.test/api");
        assert_eq!(cfg.request_timeout, Duration::from_millis(2500));
        // Untouched fields keep their defaults.
        assert_eq!(cfg.notice_ttl, Duration::from_secs(3));
        assert_eq!(cfg.page_size, 25);
    }

    #[test]
    fn toml_config_is_accepted_as_a_fallback() {
        let file = write_config("base_url = \"https://dojo.test\"\npage_size = 100\n");

        let cfg = ConsoleConfig::from_path(file.path()).expect("parse");

        assert_eq!(cfg.base_url, "https://dojo.test");
        assert_eq!(cfg.page_size, 100);
    }

    #[test]
    fn unknown_keys_fail_loud() {
        let file = write_config(r#"{ "base_url": "https://dojo.test", "baseurl": "typo" }"#);

        let err = ConsoleConfig::from_path(file.path()).unwrap_err();

        assert!(err.to_string().contains("baseurl"), "{err}");
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let file = write_config(r#"{ "request_timeout_ms": 5 }"#);
        assert!(ConsoleConfig::from_path(file.path()).is_err());

        let file = write_config(r#"{ "page_size": 0 }"#);
        assert!(ConsoleConfig::from_path(file.path()).is_err());
    }

    #[test]
    fn scheme_is_required_on_base_url() {
        let file = write_config(r#"{ "base_url": "dojo.test/api" }"#);
        assert!(ConsoleConfig::from_path(file.path()).is_err());
    }
}
