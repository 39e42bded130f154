//! Player preferences
//!
//! Persisted in LocalStorage on the web; natively the defaults are used.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Gameplay cue volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Drum loop volume (0.0 - 1.0)
    pub drum_volume: f32,
    pub muted: bool,

    // === Visual Effects ===
    /// Screen shake on jumps, guides and hits
    pub screen_shake: bool,
    /// Full-screen colour flashes
    pub flashes: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            drum_volume: 1.0,
            muted: false,

            screen_shake: true,
            flashes: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective flashes (respects reduced_motion)
    pub fn effective_flashes(&self) -> bool {
        self.flashes && !self.reduced_motion
    }

    /// Parse stored settings; unknown or missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "heartbeat_runner_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY)
        {
            match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring stored settings: {e}"),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(json) = serde_json::to_string(self)
        {
            let _ = storage.set_item(Self::STORAGE_KEY, &json);
            log::info!("Settings saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // Nothing to persist natively
    }
}
