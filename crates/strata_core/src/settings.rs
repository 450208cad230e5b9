//! Registry Settings & Context Deployment Mode
//!
//! The deployment mode decides how handles are stored per tracked object:
//!
//! | Mode     | Storage per entry               | `get(ctx)` sees                 |
//! |----------|---------------------------------|---------------------------------|
//! | `Single` | one shared slot                 | the last handle put, any `ctx`  |
//! | `Multi`  | map `RenderContextRef → handle` | only the handle put for `ctx`   |
//!
//! The mode is chosen once. A registry reads it at construction and never
//! looks at it again, so entries created under one mode are never interpreted
//! under the other.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use strata::settings::{self, ContextMode, RegistrySettings};
//!
//! // Once, at startup:
//! settings::install(RegistrySettings {
//!     context_mode: ContextMode::Multi,
//!     ..Default::default()
//! })?;
//!
//! // Anywhere a registry is built:
//! let registry = ResourceRegistry::new(RegistrySettings::from_process());
//! ```

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, StrataError};

/// How many independent contexts handles must be tracked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMode {
    /// All contexts share one resource group; one handle slot per object.
    #[default]
    Single,
    /// Contexts are independent; one handle per object per context.
    Multi,
}

impl ContextMode {
    #[inline]
    #[must_use]
    pub fn is_multi(self) -> bool {
        matches!(self, Self::Multi)
    }
}

/// Construction-time configuration of a resource registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    pub context_mode: ContextMode,
    /// Number of entries to reserve up front.
    pub initial_capacity: usize,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            context_mode: ContextMode::Single,
            initial_capacity: 64,
        }
    }
}

impl RegistrySettings {
    #[must_use]
    pub fn single() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn multi() -> Self {
        Self {
            context_mode: ContextMode::Multi,
            ..Self::default()
        }
    }

    /// Settings installed with [`install`], or the defaults if none were.
    #[must_use]
    pub fn from_process() -> Self {
        PROCESS_SETTINGS.get().cloned().unwrap_or_default()
    }
}

static PROCESS_SETTINGS: OnceLock<RegistrySettings> = OnceLock::new();

/// Installs the process-wide registry settings.
///
/// Fails with [`StrataError::SettingsAlreadyInstalled`] on any call after the
/// first; the first installed value stays in effect.
pub fn install(settings: RegistrySettings) -> Result<()> {
    let mode = settings.context_mode;
    PROCESS_SETTINGS
        .set(settings)
        .map_err(|_| StrataError::SettingsAlreadyInstalled)?;
    log::info!("Installed process registry settings (context mode: {mode:?})");
    Ok(())
}

/// The installed process-wide settings, if any.
#[must_use]
pub fn installed() -> Option<&'static RegistrySettings> {
    PROCESS_SETTINGS.get()
}
