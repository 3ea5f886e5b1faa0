/// Configuration system for carbonwise.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: [`schema::CarbonConfig::default()`]
/// 2. **User global config**: `~/.carbonwise/config.toml`
/// 3. **Project local config**: `.carbonwise.toml` in the current directory
/// 4. **Environment variables**: `CARBONWISE_*` overrides (highest precedence)
///
/// Layers are merged key by key: a file that only sets `api.base_url`
/// leaves every other value from the layer below untouched.
///
/// ```rust,ignore
/// let cfg = carbonwise::config::load();
/// let client = carbonwise::api::CarbonClient::from_config(&cfg);
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

pub use schema::CarbonConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> CarbonConfig {
    let layers = [global_config_path(), project_config_path()]
        .into_iter()
        .flatten()
        .filter_map(|path| load_toml_value(&path).map(|layer| (path, layer)));

    let (mut config, rejected) = resolve_layers(layers);
    for (path, err) in rejected {
        eprintln!(
            "{} ignoring {}: {}",
            "warning:".yellow().bold(),
            path.display(),
            err.message()
        );
    }
    apply_env_overrides(&mut config);
    config
}

/// Merge file layers in order. A layer that would make the merged table
/// fail to deserialize is skipped as a whole and returned with its error;
/// the layers below and above it still apply.
fn resolve_layers(
    layers: impl IntoIterator<Item = (PathBuf, toml::Value)>,
) -> (CarbonConfig, Vec<(PathBuf, toml::de::Error)>) {
    let mut merged = toml::Value::Table(toml::map::Map::new());
    let mut rejected = Vec::new();

    for (path, layer) in layers {
        let mut candidate = merged.clone();
        merge_values(&mut candidate, layer);
        match candidate.clone().try_into::<CarbonConfig>() {
            Ok(_) => merged = candidate,
            Err(e) => rejected.push((path, e)),
        }
    }

    let config = merged.try_into().unwrap_or_default();
    (config, rejected)
}

/// Read a TOML file as an untyped value. Missing or malformed files yield `None`.
fn load_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Deep-merge `overlay` into `base`: tables merge recursively, every other
/// value in the overlay replaces the base value.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// `~/.carbonwise/config.toml`
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".carbonwise").join("config.toml"))
}

/// `.carbonwise.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".carbonwise.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `CARBONWISE_API_URL`: backend base URL
/// - `CARBONWISE_COUNTRY`: default grid country
/// - `CARBONWISE_GRID_YEAR`: default grid year
/// - `CARBONWISE_WEB_ADDR`: dashboard listen address
/// - `CARBONWISE_LOG`: request log on/off (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut CarbonConfig) {
    if let Ok(val) = std::env::var("CARBONWISE_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("CARBONWISE_COUNTRY")
        && !val.is_empty()
    {
        config.defaults.country = val;
    }
    if let Ok(val) = std::env::var("CARBONWISE_GRID_YEAR")
        && let Ok(year) = val.parse::<i32>()
    {
        config.defaults.grid_year = year;
    }
    if let Ok(val) = std::env::var("CARBONWISE_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Ok(val) = std::env::var("CARBONWISE_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.carbonwise/config.toml`.
///
/// Fails if the file already exists unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.carbonwise/ directory")?;
    }

    fs::write(&path, CarbonConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single dotted key (e.g. `api.base_url`) in the global config file.
///
/// Starts from the existing file, or from serialized defaults when there is
/// none, so the value type of the key is known.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let source = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&CarbonConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&source).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject edits that would no longer deserialize.
    let _: CarbonConfig = root
        .clone()
        .try_into()
        .with_context(|| format!("'{value}' is not a valid value for '{key}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected a table above '{key}'"))?;

    let new_value = match table.get(*leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected number for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(toml::Value::Array(_)) => toml::Value::Array(
            raw_value
                .split(',')
                .map(|s| toml::Value::String(s.trim().to_string()))
                .filter(|v| v.as_str().is_some_and(|s| !s.is_empty()))
                .collect(),
        ),
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn is_truthy_accepts_variants() {
        for yes in ["1", "true", "TRUE", "yes", "on", "ON"] {
            assert!(is_truthy(yes), "{yes}");
        }
        for no in ["0", "false", "no", "off", ""] {
            assert!(!is_truthy(no), "{no}");
        }
    }

    #[test]
    fn merge_keeps_untouched_keys_from_lower_layer() {
        let mut base = parse(
            r#"
[api]
base_url = "http://global:5000"

[defaults]
country = "DE"
grid_year = 2022
"#,
        );
        let overlay = parse(
            r#"
[defaults]
country = "FR"
"#,
        );
        merge_values(&mut base, overlay);

        let config: CarbonConfig = base.try_into().unwrap();
        assert_eq!(config.api.base_url, "http://global:5000");
        assert_eq!(config.defaults.country, "FR");
        assert_eq!(config.defaults.grid_year, 2022);
    }

    #[test]
    fn mistyped_layer_is_skipped_without_dropping_others() {
        let layers = vec![
            (
                PathBuf::from("global.toml"),
                parse("[api]\nbase_url = \"http://global:5000\"\n"),
            ),
            (
                PathBuf::from("project.toml"),
                parse("[defaults]\ngrid_year = \"soon\"\ncountry = \"DE\"\n"),
            ),
        ];
        let (config, rejected) = resolve_layers(layers);
        assert_eq!(config.api.base_url, "http://global:5000");
        assert_eq!(config.defaults.country, "US");
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, PathBuf::from("project.toml"));
    }

    #[test]
    fn merge_replaces_arrays_wholesale() {
        let mut base = parse(r#"defaults = { sensitivity_countries = ["US", "DE"] }"#);
        merge_values(
            &mut base,
            parse(r#"defaults = { sensitivity_countries = ["PL"] }"#),
        );
        let config: CarbonConfig = base.try_into().unwrap();
        assert_eq!(config.defaults.sensitivity_countries, vec!["PL"]);
    }

    #[test]
    fn set_toml_value_updates_string() {
        let mut root = parse("[api]\nbase_url = \"http://a\"\n");
        set_toml_value(&mut root, "api.base_url", "http://b:9000").unwrap();
        assert_eq!(root["api"]["base_url"].as_str(), Some("http://b:9000"));
    }

    #[test]
    fn set_toml_value_updates_bool_integer_float() {
        let mut root = parse(
            r#"
[web]
open_browser = true
[defaults]
grid_year = 2024
annual_km = 15000.0
"#,
        );
        set_toml_value(&mut root, "web.open_browser", "off").unwrap();
        set_toml_value(&mut root, "defaults.grid_year", "2021").unwrap();
        set_toml_value(&mut root, "defaults.annual_km", "12000.5").unwrap();

        assert_eq!(root["web"]["open_browser"].as_bool(), Some(false));
        assert_eq!(root["defaults"]["grid_year"].as_integer(), Some(2021));
        assert_eq!(root["defaults"]["annual_km"].as_float(), Some(12000.5));
    }

    #[test]
    fn set_toml_value_splits_lists() {
        let mut root = parse("[defaults]\nsensitivity_countries = [\"US\"]\n");
        set_toml_value(&mut root, "defaults.sensitivity_countries", "US, PL,").unwrap();
        let list = root["defaults"]["sensitivity_countries"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].as_str(), Some("PL"));
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let mut root = parse("[api]\nbase_url = \"http://a\"\n");
        assert!(set_toml_value(&mut root, "nonexistent.key", "value").is_err());
        assert!(set_toml_value(&mut root, "api.nope", "value").is_err());
        assert!(set_toml_value(&mut root, "", "value").is_err());
    }

    #[test]
    fn set_toml_value_rejects_bad_numbers() {
        let mut root = parse("[defaults]\ngrid_year = 2024\n");
        assert!(set_toml_value(&mut root, "defaults.grid_year", "soon").is_err());
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: CarbonConfig = toml::from_str(&toml_str).unwrap();
    }
}
