//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.mtgtool/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::store::DATA_FILE_NAME;
use crate::core::template::DEFAULT_TEMPLATE;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MtgToolConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub template: TemplateConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub quiet: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DataConfig {
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TemplateConfig {
    pub text: Option<String>,
    /// Relative paths are resolved against `~/.mtgtool/`.
    pub file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BrowserConfig {
    pub list_width: Option<u16>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LIST_WIDTH: u16 = 30;
/// Narrower list panes leave no room for a name next to the count.
pub const MIN_LIST_WIDTH: u16 = 8;

pub const ENV_DATA: &str = "MTGTOOL_DATA";
pub const ENV_QUIET: &str = "MTGTOOL_QUIET";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub quiet: bool,
    pub data_path: PathBuf,
    /// Template source text; still to be validated with `Template::parse`.
    pub template_text: String,
    pub list_width: u16,
}

/// Values given on the command line (None / false = not specified).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub quiet: bool,
    pub data: Option<PathBuf>,
    pub template_file: Option<PathBuf>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    /// A template file was named but could not be read.
    TemplateFile { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::TemplateFile { path, source } => {
                write!(f, "cannot read template file {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.mtgtool`, home of the config, the card data and the log.
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".mtgtool"))
}

/// Returns the path to `~/.mtgtool/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    data_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.mtgtool/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `MtgToolConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<MtgToolConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(MtgToolConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<MtgToolConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(MtgToolConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: MtgToolConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# mtgtool configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# quiet = false                      # Or set MTGTOOL_QUIET=1; -q on the command line

# [data]
# path = "~/.mtgtool/AllSets-x.json" # Or set MTGTOOL_DATA; --data on the command line

# [template]
# Fields: %name%, %mana_cost%, %type%, ... List fields need a filter:
# %colors|comma% or %text|indent%. Write %% for a literal percent sign.
# text = "%name% %mana_cost%\n%type%\n%text|indent%"
# file = "template.txt"              # Path relative to ~/.mtgtool/; inline text wins

# [browser]
# list_width = 30
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &MtgToolConfig, cli: &CliOverrides) -> Result<ResolvedConfig, ConfigError> {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

fn resolve_with_env<F>(
    config: &MtgToolConfig,
    cli: &CliOverrides,
    env: F,
) -> Result<ResolvedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // Quiet: CLI → env → config → default
    let quiet = cli.quiet
        || env(ENV_QUIET)
            .map(|v| is_truthy(&v))
            .or(config.general.quiet)
            .unwrap_or(false);

    // Data path: CLI → env → config → default
    let data_path = cli
        .data
        .clone()
        .or_else(|| env(ENV_DATA).map(|p| expand_home(&p)))
        .or_else(|| config.data.path.as_deref().map(expand_home))
        .or_else(|| data_dir().map(|d| d.join(DATA_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(DATA_FILE_NAME));

    let template_text = resolve_template(config, cli)?;

    let list_width = config
        .browser
        .list_width
        .unwrap_or(DEFAULT_LIST_WIDTH)
        .max(MIN_LIST_WIDTH);

    Ok(ResolvedConfig {
        quiet,
        data_path,
        template_text,
        list_width,
    })
}

/// CLI file wins over inline config text, which wins over a config file,
/// which wins over the built-in template.
fn resolve_template(config: &MtgToolConfig, cli: &CliOverrides) -> Result<String, ConfigError> {
    if let Some(ref path) = cli.template_file {
        return read_template(path);
    }
    if let Some(ref text) = config.template.text {
        return Ok(text.clone());
    }
    if let Some(ref file) = config.template.file {
        let path = match data_dir() {
            Some(dir) => dir.join(expand_home(file)),
            None => expand_home(file),
        };
        return read_template(&path);
    }
    Ok(DEFAULT_TEMPLATE.to_string())
}

fn read_template(path: &Path) -> Result<String, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::TemplateFile {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Loaded template from {}", path.display());
    // A trailing newline in the file is not part of the template.
    Ok(text.trim_end_matches(['\n', '\r']).to_string())
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config_parses() {
        let config = MtgToolConfig::default();
        assert!(config.general.quiet.is_none());
        assert!(config.template.text.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let config = MtgToolConfig::default();
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env).unwrap();
        assert!(!resolved.quiet);
        assert_eq!(resolved.list_width, DEFAULT_LIST_WIDTH);
        assert_eq!(resolved.template_text, DEFAULT_TEMPLATE);
        assert!(resolved.data_path.ends_with(DATA_FILE_NAME));
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = MtgToolConfig {
            general: GeneralConfig { quiet: Some(true) },
            data: DataConfig {
                path: Some("/srv/cards.json".to_string()),
            },
            template: TemplateConfig {
                text: Some("%name%".to_string()),
                file: Some("ignored.txt".to_string()),
            },
            browser: BrowserConfig {
                list_width: Some(40),
            },
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env).unwrap();
        assert!(resolved.quiet);
        assert_eq!(resolved.data_path, PathBuf::from("/srv/cards.json"));
        assert_eq!(resolved.template_text, "%name%");
        assert_eq!(resolved.list_width, 40);
    }

    #[test]
    fn test_env_overrides_config() {
        let config = MtgToolConfig {
            general: GeneralConfig { quiet: Some(false) },
            data: DataConfig {
                path: Some("/srv/cards.json".to_string()),
            },
            ..Default::default()
        };
        let env = |key: &str| match key {
            ENV_QUIET => Some("yes".to_string()),
            ENV_DATA => Some("/tmp/other.json".to_string()),
            _ => None,
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), env).unwrap();
        assert!(resolved.quiet);
        assert_eq!(resolved.data_path, PathBuf::from("/tmp/other.json"));
    }

    #[test]
    fn test_cli_wins() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("t.txt");
        fs::write(&template, "%name% / %type%\n").unwrap();

        let config = MtgToolConfig {
            template: TemplateConfig {
                text: Some("%name%".to_string()),
                file: None,
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            quiet: true,
            data: Some(PathBuf::from("/cli/cards.json")),
            template_file: Some(template),
        };
        let env = |key: &str| (key == ENV_DATA).then(|| "/env/cards.json".to_string());
        let resolved = resolve_with_env(&config, &cli, env).unwrap();
        assert!(resolved.quiet);
        assert_eq!(resolved.data_path, PathBuf::from("/cli/cards.json"));
        assert_eq!(resolved.template_text, "%name% / %type%");
    }

    #[test]
    fn test_missing_template_file_is_error() {
        let cli = CliOverrides {
            template_file: Some(PathBuf::from("/nowhere/template.txt")),
            ..Default::default()
        };
        let err = resolve_with_env(&MtgToolConfig::default(), &cli, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::TemplateFile { .. }));
        assert!(err.to_string().contains("/nowhere/template.txt"));
    }

    #[test]
    fn test_list_width_has_a_floor() {
        let config = MtgToolConfig {
            browser: BrowserConfig {
                list_width: Some(2),
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env).unwrap();
        assert_eq!(resolved.list_width, MIN_LIST_WIDTH);
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[browser]
list_width = 24
"#;
        let config: MtgToolConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.browser.list_width, Some(24));
        assert!(config.general.quiet.is_none());
        assert!(config.data.path.is_none());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[browser]\nlist_width = \"wide\"\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_config_generates_commented_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = load_config_from(&path).unwrap();
        assert!(config.browser.list_width.is_none());

        // The generated file is all comments, so it loads as the default.
        let generated = fs::read_to_string(&path).unwrap();
        assert!(generated.contains("list_width"));
        let reloaded = load_config_from(&path).unwrap();
        assert!(reloaded.general.quiet.is_none());
    }

    #[test]
    fn test_truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy(" TRUE "));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("nah"));
    }
}
