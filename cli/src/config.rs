use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use hanseg_tui::EditorOptions;
use hanseg_tui::segmentation::Platform;
use thiserror::Error;
use toml_edit::DocumentMut;
use toml_edit::Item as TomlItem;
use toml_edit::Table as TomlTable;
use toml_edit::value;

use crate::atomic_write::write_atomic_text;

/// Environment variable that overrides the `~/.hanseg` config directory.
pub const HANSEG_HOME_ENV: &str = "HANSEG_HOME";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown config key `{0}` (known keys: {known})", known = ConfigKey::NAMES.join(", "))]
    UnknownKey(String),
    #[error("invalid value `{value}` for `{key}`: expected {expected}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    HighlightBoundaries,
    RefineNativeSteps,
    KeymapPlatform,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [
        ConfigKey::HighlightBoundaries,
        ConfigKey::RefineNativeSteps,
        ConfigKey::KeymapPlatform,
    ];

    pub const NAMES: [&'static str; 3] = [
        "highlight_boundaries",
        "refine_native_steps",
        "keymap.platform",
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConfigKey::HighlightBoundaries => Self::NAMES[0],
            ConfigKey::RefineNativeSteps => Self::NAMES[1],
            ConfigKey::KeymapPlatform => Self::NAMES[2],
        }
    }

    /// `(table, key)` location in the TOML document; `None` is the root table.
    fn location(self) -> (Option<&'static str>, &'static str) {
        match self {
            ConfigKey::HighlightBoundaries => (None, "highlight_boundaries"),
            ConfigKey::RefineNativeSteps => (None, "refine_native_steps"),
            ConfigKey::KeymapPlatform => (Some("keymap"), "platform"),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            ConfigKey::HighlightBoundaries | ConfigKey::RefineNativeSteps => "`true` or `false`",
            ConfigKey::KeymapPlatform => "`auto`, `standard` or `mac`",
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

/// Which keymap convention to use; `Auto` follows the build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformSetting {
    #[default]
    Auto,
    Standard,
    Mac,
}

impl PlatformSetting {
    pub fn resolve(self) -> Platform {
        match self {
            PlatformSetting::Auto => Platform::detect(),
            PlatformSetting::Standard => Platform::Standard,
            PlatformSetting::Mac => Platform::Mac,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            PlatformSetting::Auto => "auto",
            PlatformSetting::Standard => "standard",
            PlatformSetting::Mac => "mac",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token {
            "auto" => Some(PlatformSetting::Auto),
            "standard" => Some(PlatformSetting::Standard),
            "mac" => Some(PlatformSetting::Mac),
            _ => None,
        }
    }
}

impl fmt::Display for PlatformSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective settings after defaults are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HansegConfig {
    pub highlight_boundaries: bool,
    pub refine_native_steps: bool,
    pub platform: PlatformSetting,
}

impl Default for HansegConfig {
    fn default() -> Self {
        Self {
            highlight_boundaries: true,
            refine_native_steps: true,
            platform: PlatformSetting::Auto,
        }
    }
}

impl HansegConfig {
    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            highlight_boundaries: self.highlight_boundaries,
            refine_native_steps: self.refine_native_steps,
            platform: self.platform.resolve(),
        }
    }

    pub fn display_value(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::HighlightBoundaries => self.highlight_boundaries.to_string(),
            ConfigKey::RefineNativeSteps => self.refine_native_steps.to_string(),
            ConfigKey::KeymapPlatform => self.platform.to_string(),
        }
    }

    /// Apply one raw token (as written in TOML, or on the command line) to `key`.
    fn apply_token(&mut self, key: ConfigKey, token: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.name(),
            value: token.to_string(),
            expected: key.expected(),
        };
        match key {
            ConfigKey::HighlightBoundaries => {
                self.highlight_boundaries = parse_bool(token).ok_or_else(invalid)?;
            }
            ConfigKey::RefineNativeSteps => {
                self.refine_native_steps = parse_bool(token).ok_or_else(invalid)?;
            }
            ConfigKey::KeymapPlatform => {
                self.platform = PlatformSetting::parse(token).ok_or_else(invalid)?;
            }
        }
        Ok(())
    }
}

fn parse_bool(token: &str) -> Option<bool> {
    match token {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn new_default() -> anyhow::Result<Self> {
        if let Some(dir) = std::env::var_os(HANSEG_HOME_ENV).filter(|dir| !dir.is_empty()) {
            return Ok(Self::new(PathBuf::from(dir).join("config.toml")));
        }
        let Some(home) = dirs::home_dir() else {
            anyhow::bail!("cannot determine home directory for config path");
        };
        Ok(Self::new(default_config_path(&home)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Effective settings. Never fails: anything unreadable falls back to defaults with a warning.
    pub fn load(&self) -> HansegConfig {
        let content = match read_document_string(&self.path) {
            Ok(Some(content)) => content,
            Ok(None) => return HansegConfig::default(),
            Err(err) => {
                tracing::warn!("{err:#}; using default settings");
                return HansegConfig::default();
            }
        };

        let mut config = HansegConfig::default();
        match content.parse::<DocumentMut>() {
            Ok(doc) => {
                for key in ConfigKey::ALL {
                    if let Some(token) = read_token(&doc, key) {
                        apply_or_warn(&mut config, key, &token);
                    }
                }
            }
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "config.toml is not valid TOML ({err}); reading known keys line by line"
                );
                for key in ConfigKey::ALL {
                    if let Some(token) = parse_fallback_token(&content, key) {
                        apply_or_warn(&mut config, key, token);
                    }
                }
            }
        }
        config
    }

    /// Persist `raw` for `key`, keeping the rest of the file (comments included) intact.
    pub fn set(&self, key: ConfigKey, raw: &str) -> anyhow::Result<()> {
        let mut scratch = HansegConfig::default();
        scratch.apply_token(key, raw)?;

        let content = read_document_string(&self.path)?.unwrap_or_default();
        let mut doc = match content.parse::<DocumentMut>() {
            Ok(doc) => doc,
            Err(err) => anyhow::bail!(
                "{} is not valid TOML, fix it before changing settings: {err}",
                self.path.display()
            ),
        };

        let (table, name) = key.location();
        let target = match table {
            Some(table) => ensure_table_for_write(&mut doc, table),
            None => doc.as_table_mut(),
        };
        target[name] = match key {
            ConfigKey::HighlightBoundaries => value(scratch.highlight_boundaries),
            ConfigKey::RefineNativeSteps => value(scratch.refine_native_steps),
            ConfigKey::KeymapPlatform => value(scratch.platform.as_str()),
        };

        let mut updated = doc.to_string();
        if !updated.ends_with('\n') {
            updated.push('\n');
        }
        write_atomic_text(&self.path, &updated)?;
        tracing::info!(key = key.name(), value = raw, "updated config");
        Ok(())
    }
}

fn default_config_path(home: &Path) -> PathBuf {
    home.join(".hanseg").join("config.toml")
}

fn apply_or_warn(config: &mut HansegConfig, key: ConfigKey, token: &str) {
    if let Err(err) = config.apply_token(key, token) {
        tracing::warn!("{err}; using the default");
    }
}

/// The value of `key` as a bare token (`true`, `mac`, ...), whatever its TOML type.
fn read_token(doc: &DocumentMut, key: ConfigKey) -> Option<String> {
    let (table, name) = key.location();
    let table = match table {
        Some(table) => doc.get(table).and_then(TomlItem::as_table)?,
        None => doc.as_table(),
    };
    let value = table.get(name).and_then(TomlItem::as_value)?;
    Some(match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string().trim().to_string(),
    })
}

fn parse_fallback_token(contents: &str, key: ConfigKey) -> Option<&str> {
    let (table, name) = key.location();
    let mut current: Option<&str> = None;
    let mut result = None;

    for line in contents.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            current = parse_table_header_name(trimmed);
            continue;
        }
        if current != table {
            continue;
        }

        let Some(line) = strip_toml_comment(trimmed) else {
            continue;
        };
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        if k.trim() != name {
            continue;
        }
        let token = v.split_whitespace().next().unwrap_or_default();
        result = Some(token.trim_matches('"'));
    }

    result
}

fn parse_table_header_name(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if !line.starts_with('[') {
        return None;
    }
    let end = line.find(']')?;
    if end <= 1 {
        return None;
    }
    let name = line[1..end].trim();
    if name.is_empty() {
        return None;
    }
    Some(name)
}

fn strip_toml_comment(line: &str) -> Option<&str> {
    let line = line.split_once('#').map_or(line, |(head, _)| head).trim();
    if line.is_empty() { None } else { Some(line) }
}

fn ensure_table_for_write<'a>(doc: &'a mut DocumentMut, key: &str) -> &'a mut TomlTable {
    if doc.get(key).and_then(TomlItem::as_table).is_none() {
        let mut table = TomlTable::new();
        table.set_implicit(false);
        doc[key] = TomlItem::Table(table);
    }
    doc[key]
        .as_table_mut()
        .unwrap_or_else(|| unreachable!("`{key}` was just made a table"))
}

fn read_document_string(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(anyhow::Error::new(err).context("read config.toml")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store_with(contents: Option<&str>) -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        if let Some(contents) = contents {
            std::fs::write(&path, contents).expect("write config");
        }
        (dir, ConfigStore::new(path))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let (_dir, store) = store_with(None);
        assert_eq!(store.load(), HansegConfig::default());
    }

    #[test]
    fn reads_all_keys() {
        let (_dir, store) = store_with(Some(
            r#"highlight_boundaries = false
refine_native_steps = false

[keymap]
platform = "mac"
"#,
        ));
        assert_eq!(
            store.load(),
            HansegConfig {
                highlight_boundaries: false,
                refine_native_steps: false,
                platform: PlatformSetting::Mac,
            }
        );
    }

    #[test]
    fn wrong_value_falls_back_to_default_for_that_key_only() {
        let (_dir, store) = store_with(Some(
            r#"highlight_boundaries = "yes"
refine_native_steps = false
"#,
        ));
        let config = store.load();
        assert!(config.highlight_boundaries);
        assert!(!config.refine_native_steps);
    }

    #[test]
    fn reads_known_keys_when_toml_is_invalid() {
        let (_dir, store) = store_with(Some(
            r#"# broken table header makes this TOML invalid
[other
key = 1

[keymap]
platform = "standard" # keep me
"#,
        ));
        assert_eq!(store.load().platform, PlatformSetting::Standard);
    }

    #[test]
    fn set_preserves_comments_and_round_trips() {
        let (_dir, store) = store_with(Some(
            r#"# top comment
highlight_boundaries = true

[keymap] # keep me
# inner comment
platform = "auto"
"#,
        ));

        store
            .set(ConfigKey::KeymapPlatform, "mac")
            .expect("set platform");
        store
            .set(ConfigKey::RefineNativeSteps, "false")
            .expect("set refine");

        let updated = std::fs::read_to_string(store.path()).expect("read updated");
        assert!(updated.contains("# top comment"));
        assert!(updated.contains("# inner comment"));
        assert!(updated.contains(r#"platform = "mac""#));
        assert!(updated.contains("refine_native_steps = false"));

        let config = store.load();
        assert_eq!(config.platform, PlatformSetting::Mac);
        assert!(!config.refine_native_steps);
    }

    #[test]
    fn set_creates_file_and_table() {
        let (_dir, store) = store_with(None);
        store
            .set(ConfigKey::KeymapPlatform, "standard")
            .expect("set platform");
        let updated = std::fs::read_to_string(store.path()).expect("read updated");
        assert!(updated.contains("[keymap]"));
        assert_eq!(store.load().platform, PlatformSetting::Standard);
    }

    #[test]
    fn set_rejects_invalid_values_without_writing() {
        let (_dir, store) = store_with(None);
        let err = store
            .set(ConfigKey::HighlightBoundaries, "maybe")
            .expect_err("invalid value");
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::InvalidValue {
                key: "highlight_boundaries",
                value: "maybe".to_string(),
                expected: "`true` or `false`",
            })
        );
        assert!(!store.path().exists());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert_eq!(
            "keymap.layout".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey("keymap.layout".to_string()))
        );
        assert_eq!(
            "keymap.platform".parse::<ConfigKey>(),
            Ok(ConfigKey::KeymapPlatform)
        );
    }

    #[test]
    fn default_config_path_uses_hanseg_home_dir() {
        let home = Path::new("home");
        assert_eq!(
            default_config_path(home),
            home.join(".hanseg").join("config.toml")
        );
    }
}
