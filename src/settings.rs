//! Game settings and control bindings
//!
//! Persisted as JSON next to the save data. The control map replaces a global
//! key table: the host hands the names of currently held keys to `resolve`
//! and gets a `TickInput` back.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::TickInput;

/// Errors raised while loading settings or tuning
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Bindable actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Left,
    Right,
    Jump,
    Crouch,
    Attack,
    Ultimate,
    Pause,
    ToggleInvincible,
    Lane0,
    Lane1,
    Lane2,
}

impl Action {
    pub const ALL: [Action; 11] = [
        Action::Left,
        Action::Right,
        Action::Jump,
        Action::Crouch,
        Action::Attack,
        Action::Ultimate,
        Action::Pause,
        Action::ToggleInvincible,
        Action::Lane0,
        Action::Lane1,
        Action::Lane2,
    ];

    fn default_keys(self) -> &'static [&'static str] {
        match self {
            Action::Left => &["left", "a"],
            Action::Right => &["right", "d"],
            Action::Jump => &["space", "w", "up"],
            Action::Crouch => &["down", "s"],
            Action::Attack => &["j"],
            Action::Ultimate => &["k"],
            Action::Pause => &["escape"],
            Action::ToggleInvincible => &["f3"],
            Action::Lane0 => &["f"],
            Action::Lane1 => &["g"],
            Action::Lane2 => &["h"],
        }
    }
}

/// Host key names bound to each action
///
/// Key names are compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMap {
    bindings: BTreeMap<Action, Vec<String>>,
}

impl Default for ControlMap {
    fn default() -> Self {
        let mut controls = Self { bindings: BTreeMap::new() };
        controls.fill_missing();
        controls
    }
}

impl ControlMap {
    pub fn keys(&self, action: Action) -> &[String] {
        self.bindings.get(&action).map(Vec::as_slice).unwrap_or_default()
    }

    /// Replace every binding of `action`
    pub fn remap<S: AsRef<str>>(&mut self, action: Action, keys: &[S]) {
        let keys: Vec<String> = keys.iter().map(|k| k.as_ref().to_lowercase()).collect();
        log::info!("Remapped {:?} to {:?}", action, keys);
        self.bindings.insert(action, keys);
    }

    /// Restore the default binding of one action
    pub fn reset(&mut self, action: Action) {
        self.remap(action, action.default_keys());
    }

    /// Bind default keys for every action without an entry
    pub fn fill_missing(&mut self) {
        for action in Action::ALL {
            self.bindings
                .entry(action)
                .or_insert_with(|| action.default_keys().iter().map(|k| k.to_string()).collect());
        }
    }

    /// Is any key bound to `action` among `held`?
    pub fn is_held(&self, action: Action, held: &BTreeSet<String>) -> bool {
        self.keys(action).iter().any(|k| held.contains(k))
    }

    /// Level-triggered input for one frame
    ///
    /// Every flag reports whether a bound key is down this frame; edge
    /// detection for one-shot actions happens in `Game`.
    pub fn resolve<S: AsRef<str>>(&self, held_keys: &[S]) -> TickInput {
        let held: BTreeSet<String> = held_keys.iter().map(|k| k.as_ref().to_lowercase()).collect();
        TickInput {
            left: self.is_held(Action::Left, &held),
            right: self.is_held(Action::Right, &held),
            jump: self.is_held(Action::Jump, &held),
            crouch: self.is_held(Action::Crouch, &held),
            attack: self.is_held(Action::Attack, &held),
            ultimate: self.is_held(Action::Ultimate, &held),
            pause: self.is_held(Action::Pause, &held),
            toggle_invincible: self.is_held(Action::ToggleInvincible, &held),
            lanes: [
                self.is_held(Action::Lane0, &held),
                self.is_held(Action::Lane1, &held),
                self.is_held(Action::Lane2, &held),
            ],
        }
    }
}

/// Player preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub controls: ControlMap,
}

impl Settings {
    /// Parse settings; actions missing from the file keep their default keys
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.controls.fill_missing();
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("Using default settings");
            return Ok(Self::default());
        }
        let settings = Self::from_json(&std::fs::read_to_string(path)?)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings_resolve() {
        let controls = ControlMap::default();
        let input = controls.resolve(&["D", "space", "j"]);
        assert!(input.right);
        assert!(input.jump);
        assert!(input.attack);
        assert!(!input.left);
        assert!(!input.ultimate);

        let input = controls.resolve(&["g"]);
        assert_eq!(input.lanes, [false, true, false]);
    }

    #[test]
    fn test_no_keys_is_default_input() {
        let controls = ControlMap::default();
        assert_eq!(controls.resolve::<&str>(&[]), TickInput::default());
    }

    #[test]
    fn test_remap_replaces_all_keys() {
        let mut controls = ControlMap::default();
        controls.remap(Action::Jump, &["Z"]);
        assert!(!controls.resolve(&["space"]).jump);
        assert!(controls.resolve(&["z"]).jump);
        assert_eq!(controls.keys(Action::Jump), ["z".to_string()]);

        controls.reset(Action::Jump);
        assert!(controls.resolve(&["up"]).jump);
    }

    #[test]
    fn test_partial_settings_json_keeps_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());

        let settings = Settings::from_json(r#"{"controls": {"bindings": {"jump": ["z"]}}}"#).unwrap();
        assert_eq!(settings.controls.keys(Action::Jump), ["z".to_string()]);
        assert!(settings.controls.resolve(&["a"]).left);
        assert!(settings.controls.resolve(&["f3"]).toggle_invincible);
    }

    #[test]
    fn test_settings_json_round_trip_preserves_remap() {
        let mut settings = Settings::default();
        settings.controls.remap(Action::Lane2, &["l"]);
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let settings = Settings::load("/nonexistent/rockstar-bros/settings.json").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(Settings::from_json("{ nope"), Err(ConfigError::Parse(_))));
    }
}
