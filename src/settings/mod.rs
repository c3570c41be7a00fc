use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SANDBOX_COLOR: &str = "#00a1e0";
pub const DEFAULT_PRODUCTION_COLOR: &str = "#c23934";

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("failed to read settings from host storage: {reason}")]
    Read { reason: String },
    #[error("failed to write settings to host storage: {reason}")]
    Write { reason: String },
}

/// User-configurable banner preferences, persisted under the flat keys
/// `sandboxColor`, `productionColor` and `showOrgName`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub sandbox_color: String,
    pub production_color: String,
    pub show_org_name: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sandbox_color: DEFAULT_SANDBOX_COLOR.to_string(),
            production_color: DEFAULT_PRODUCTION_COLOR.to_string(),
            show_org_name: false,
        }
    }
}

impl Settings {
    /// Replaces each invalid color with its default. Run on every persist
    /// path so stored colors always satisfy the `#RRGGBB` invariant.
    pub fn sanitized(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            sandbox_color: if is_valid_hex_color(&self.sandbox_color) {
                self.sandbox_color.clone()
            } else {
                defaults.sandbox_color
            },
            production_color: if is_valid_hex_color(&self.production_color) {
                self.production_color.clone()
            } else {
                defaults.production_color
            },
            show_org_name: self.show_org_name,
        }
    }
}

/// Accepts exactly `#RRGGBB`, case-insensitive. Shorthand forms like `#fff`
/// and named colors are rejected.
pub fn is_valid_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(digits) => digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Partial record as read back from storage — every field optional so stores
/// written by older versions (or never written at all) merge cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSettings {
    pub sandbox_color: Option<String>,
    pub production_color: Option<String>,
    pub show_org_name: Option<bool>,
}

impl RawSettings {
    /// Merge with defaults: a missing or empty color falls back to the
    /// default, while `show_org_name` falls back only when absent so an
    /// explicit `false` survives.
    pub fn merged(self) -> Settings {
        let defaults = Settings::default();
        Settings {
            sandbox_color: self
                .sandbox_color
                .filter(|color| !color.is_empty())
                .unwrap_or(defaults.sandbox_color),
            production_color: self
                .production_color
                .filter(|color| !color.is_empty())
                .unwrap_or(defaults.production_color),
            show_org_name: self.show_org_name.unwrap_or(defaults.show_org_name),
        }
    }
}

impl From<&Settings> for RawSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            sandbox_color: Some(settings.sandbox_color.clone()),
            production_color: Some(settings.production_color.clone()),
            show_org_name: Some(settings.show_org_name),
        }
    }
}

/// Capability seam over the host's key-value storage. Browser builds bind
/// this to the extension storage area picked at startup; native builds and
/// tests use [`MemoryBackend`].
pub trait SettingsBackend {
    fn read_all(&self) -> StoreResult<RawSettings>;
    fn write_all(&self, settings: &Settings) -> StoreResult<()>;
}

#[derive(Debug)]
pub struct SettingsStore<B> {
    backend: B,
}

impl<B: SettingsBackend> SettingsStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Never fails the caller: a read error is logged and the hardcoded
    /// defaults returned so the banner still renders.
    pub fn load(&self) -> Settings {
        match self.backend.read_all() {
            Ok(raw) => raw.merged(),
            Err(err) => {
                tracing::warn!(%err, "failed to load settings; using defaults");
                Settings::default()
            }
        }
    }

    /// Write failures propagate to the caller; there is no retry.
    pub fn save(&self, settings: &Settings) -> StoreResult<()> {
        self.backend.write_all(settings)
    }

    /// Reset is an overwrite with the defaults, never a delete.
    pub fn reset(&self) -> StoreResult<Settings> {
        let defaults = Settings::default();
        self.backend.write_all(&defaults)?;
        Ok(defaults)
    }
}

/// In-memory backend mirroring the host store's loose shape: values live as
/// JSON so partially-populated stores can be simulated.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: RefCell<serde_json::Value>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with arbitrary stored JSON.
    pub fn seeded(value: serde_json::Value) -> Self {
        Self {
            slots: RefCell::new(value),
        }
    }
}

impl SettingsBackend for MemoryBackend {
    fn read_all(&self) -> StoreResult<RawSettings> {
        let slots = self.slots.borrow();
        if slots.is_null() {
            return Ok(RawSettings::default());
        }
        serde_json::from_value(slots.clone()).map_err(|err| StoreError::Read {
            reason: err.to_string(),
        })
    }

    fn write_all(&self, settings: &Settings) -> StoreResult<()> {
        let value = serde_json::to_value(settings).map_err(|err| StoreError::Write {
            reason: err.to_string(),
        })?;
        *self.slots.borrow_mut() = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FailingBackend;

    impl SettingsBackend for FailingBackend {
        fn read_all(&self) -> StoreResult<RawSettings> {
            Err(StoreError::Read {
                reason: "storage unavailable".to_string(),
            })
        }

        fn write_all(&self, _settings: &Settings) -> StoreResult<()> {
            Err(StoreError::Write {
                reason: "storage unavailable".to_string(),
            })
        }
    }

    #[test]
    fn hex_validation_accepts_only_full_six_digit_codes() {
        assert!(is_valid_hex_color("#00a1e0"));
        assert!(is_valid_hex_color("#C23934"));
        assert!(is_valid_hex_color("#AbCdEf"));

        assert!(!is_valid_hex_color("#fff"));
        assert!(!is_valid_hex_color("red"));
        assert!(!is_valid_hex_color("#12345"));
        assert!(!is_valid_hex_color("#1234567"));
        assert!(!is_valid_hex_color("#12345g"));
        assert!(!is_valid_hex_color(""));
        assert!(!is_valid_hex_color("00a1e0"));
    }

    #[test]
    fn merge_fills_missing_fields_with_defaults() {
        let merged = RawSettings::default().merged();
        assert_eq!(merged, Settings::default());
    }

    #[test]
    fn merge_treats_empty_color_as_missing_but_keeps_explicit_false() {
        let raw = RawSettings {
            sandbox_color: Some(String::new()),
            production_color: Some("#123abc".to_string()),
            show_org_name: Some(false),
        };
        let merged = raw.merged();
        assert_eq!(merged.sandbox_color, DEFAULT_SANDBOX_COLOR);
        assert_eq!(merged.production_color, "#123abc");
        assert!(!merged.show_org_name);
    }

    #[test]
    fn sanitized_replaces_only_invalid_colors() {
        let settings = Settings {
            sandbox_color: "notacolor".to_string(),
            production_color: "#336699".to_string(),
            show_org_name: true,
        };
        let sanitized = settings.sanitized();
        assert_eq!(sanitized.sandbox_color, DEFAULT_SANDBOX_COLOR);
        assert_eq!(sanitized.production_color, "#336699");
        assert!(sanitized.show_org_name);
    }

    #[test]
    fn save_then_load_round_trips_valid_settings() {
        let store = SettingsStore::new(MemoryBackend::new());
        let settings = Settings {
            sandbox_color: "#112233".to_string(),
            production_color: "#445566".to_string(),
            show_org_name: true,
        };
        store.save(&settings).expect("save should succeed");
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn load_merges_partially_populated_store() {
        let store = SettingsStore::new(MemoryBackend::seeded(json!({
            "productionColor": "#445566"
        })));
        let loaded = store.load();
        assert_eq!(loaded.sandbox_color, DEFAULT_SANDBOX_COLOR);
        assert_eq!(loaded.production_color, "#445566");
        assert!(!loaded.show_org_name);
    }

    #[test]
    fn load_falls_back_to_defaults_when_backend_fails() {
        let store = SettingsStore::new(FailingBackend);
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn save_propagates_backend_failure() {
        let store = SettingsStore::new(FailingBackend);
        let err = store.save(&Settings::default()).unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
    }

    #[test]
    fn reset_overwrites_store_with_defaults() {
        let store = SettingsStore::new(MemoryBackend::new());
        store
            .save(&Settings {
                sandbox_color: "#112233".to_string(),
                production_color: "#445566".to_string(),
                show_org_name: true,
            })
            .expect("save should succeed");

        let defaults = store.reset().expect("reset should succeed");
        assert_eq!(defaults, Settings::default());
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn settings_persist_under_flat_camel_case_keys() {
        let value = serde_json::to_value(Settings::default()).expect("serialize");
        assert_eq!(
            value,
            json!({
                "sandboxColor": "#00a1e0",
                "productionColor": "#c23934",
                "showOrgName": false,
            })
        );
    }
}
