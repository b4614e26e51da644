//! Configuration file parser for `blogport.toml`.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields` off),
//! though we log a warning when the file contains potential typos.
//! Command-line flags take precedence over anything loaded here.
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "blogport.toml";
pub const DEFAULT_INPUT: &str = "feed.atom";
pub const DEFAULT_OUTPUT: &str = "blogger_content.json";
pub const DEFAULT_BLOG_TITLE: &str = "Pound Town, Texas";

const KNOWN_KEYS: [&str; 3] = ["input", "output", "blog_title"];

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Conversion settings.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Blogger Atom export to read.
    pub input: PathBuf,

    /// JSON document to write. Replaced if it already exists.
    pub output: PathBuf,

    /// Value of `blog_title` in the output document.
    pub blog_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            blog_title: DEFAULT_BLOG_TITLE.to_string(),
        }
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file, empty file → `Ok(Config::default())`
    /// - Larger than 1 MB → `Err(ConfigError::TooLarge)`
    /// - Invalid TOML or wrong value types → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        // SEC-014: Size is taken from the open handle, and the read is capped
        // in case the file grows after the check.
        let size = file.metadata()?.len();
        if size > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(format!(
                "Config file is {} bytes (max {} bytes)",
                size,
                Self::MAX_FILE_SIZE
            )));
        }
        let mut content = String::new();
        file.take(Self::MAX_FILE_SIZE).read_to_string(&mut content)?;

        let config = Self::from_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            input = %config.input.display(),
            output = %config.output.display(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parses settings from TOML text, warning about keys this tool ignores.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let table: toml::Table = content.parse()?;
        for key in table.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                tracing::warn!(key = %key, "Unknown key in config file, ignoring");
            }
        }
        Ok(toml::Value::Table(table).try_into()?)
    }

    /// Applies command-line overrides on top of the loaded values.
    pub fn with_overrides(
        mut self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        blog_title: Option<String>,
    ) -> Self {
        if let Some(input) = input {
            self.input = input;
        }
        if let Some(output) = output {
            self.output = output;
        }
        if let Some(blog_title) = blog_title {
            self.blog_title = blog_title;
        }
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("blogport.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input, PathBuf::from("feed.atom"));
        assert_eq!(config.output, PathBuf::from("blogger_content.json"));
        assert_eq!(config.blog_title, "Pound Town, Texas");
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/blogport_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_config("blogport_config_test_whitespace", "   \n  \n  ");

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let (dir, path) = write_config(
            "blogport_config_test_partial",
            "input = \"takeout/feed.atom\"\n",
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.input, PathBuf::from("takeout/feed.atom"));
        assert_eq!(config.output, PathBuf::from("blogger_content.json"));
        assert_eq!(config.blog_title, "Pound Town, Texas");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let (dir, path) = write_config(
            "blogport_config_test_full",
            r#"
input = "export/feed.atom"
output = "site/content.json"
blog_title = "Ünïcode Blog"
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.input, PathBuf::from("export/feed.atom"));
        assert_eq!(config.output, PathBuf::from("site/content.json"));
        assert_eq!(config.blog_title, "Ünïcode Blog");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("blogport_config_test_invalid", "this is not [valid toml");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (dir, path) = write_config("blogport_config_test_wrongtype", "blog_title = 42\n");

        assert!(Config::load(&path).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_config(
            "blogport_config_test_unknown",
            "blog_title = \"Blog\"\nindent = 4\n",
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.blog_title, "Blog");

        std::fs::remove_dir_all(&dir).ok();
    }

    // SEC-014: File size limit
    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("blogport_config_test_too_large", &"a".repeat(1_048_577));

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_directory_path_is_io_error() {
        let dir = std::env::temp_dir().join("blogport_config_test_directory");
        std::fs::create_dir_all(&dir).unwrap();

        let err = Config::load(&dir).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_from_toml_without_file() {
        let config = Config::from_toml("output = \"out.json\"\nextra = true\n").unwrap();
        assert_eq!(config.output, PathBuf::from("out.json"));
        assert_eq!(config.input, PathBuf::from("feed.atom"));

        assert!(matches!(
            Config::from_toml("output = [1, 2]"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = Config::default().with_overrides(
            Some(PathBuf::from("in.atom")),
            None,
            Some("Other Blog".to_string()),
        );
        assert_eq!(config.input, PathBuf::from("in.atom"));
        assert_eq!(config.output, PathBuf::from("blogger_content.json"));
        assert_eq!(config.blog_title, "Other Blog");
    }
}
