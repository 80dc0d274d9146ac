//! Engine configuration.
//!
//! Defaults, optionally overlaid by a YAML file and then by environment
//! variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `PAGEWIRE_TIMEOUT_MS` | `default_timeout_ms` |
//! | `PAGEWIRE_POLL_INTERVAL_MS` | `poll_interval_ms` |
//! | `PAGEWIRE_STABLE_ID_ATTR` | `stable_id_attribute` |
//!
//! Widget class names live in [`Markers`]. They describe the UI toolkit the
//! page is built with and differ between adapters.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::result::{PagewireError, PagewireResult};
use crate::wait;

/// Default stable id attribute
pub const DEFAULT_STABLE_ID_ATTRIBUTE: &str = "data-testid";

/// Environment variable overriding the default timeout
pub const ENV_TIMEOUT_MS: &str = "PAGEWIRE_TIMEOUT_MS";
/// Environment variable overriding the poll interval
pub const ENV_POLL_INTERVAL_MS: &str = "PAGEWIRE_POLL_INTERVAL_MS";
/// Environment variable overriding the stable id attribute
pub const ENV_STABLE_ID_ATTR: &str = "PAGEWIRE_STABLE_ID_ATTR";

/// CSS class names (and one attribute name) identifying widget state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    /// Root class of a disabled component
    pub disabled: String,
    /// Root class of a required field
    pub required: String,
    /// Root class of a read-only field
    pub readonly: String,
    /// Attribute present on a ticked checkbox input
    pub checked: String,
    /// Class of a selected grid row
    pub selected_row: String,
    /// Class of a tab header cell
    pub tab_item: String,
    /// Class of the selected tab header cell
    pub tab_selected: String,
    /// Class of the caption text inside a tab header
    pub caption_text: String,
    /// Class of the close button inside a tab header
    pub tab_close: String,
    /// Class of a combo box options list
    pub options_list: String,
    /// Class of one option inside the list
    pub option_item: String,
    /// Class of the button opening a combo box popup
    pub combo_button: String,
    /// Class of the side menu container
    pub side_menu_container: String,
    /// Class of a collapsed container
    pub collapsed: String,
    /// Class of a side menu item
    pub side_menu_item: String,
    /// Class of an expanded side menu item
    pub side_menu_item_open: String,
    /// Class of the button collapsing and expanding the side menu
    pub side_menu_toggle: String,
    /// Class of a data grid row
    pub grid_row: String,
    /// Class of a data grid cell
    pub grid_cell: String,
    /// Class of a row filtered out of view
    pub hidden_row: String,
    /// Class of the date part input of a date field
    pub date_part: String,
    /// Class of the time part input of a time field
    pub time_part: String,
    /// Class of the content panel a popup button opens
    pub popup_content: String,
    /// Class of one entry inside popup content
    pub popup_item: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            disabled: "disabled".into(),
            required: "required".into(),
            readonly: "readonly".into(),
            checked: "checked".into(),
            selected_row: "row-selected".into(),
            tab_item: "tab".into(),
            tab_selected: "tab-selected".into(),
            caption_text: "caption".into(),
            tab_close: "tab-close".into(),
            options_list: "options-list".into(),
            option_item: "option".into(),
            combo_button: "combo-button".into(),
            side_menu_container: "side-menu-container".into(),
            collapsed: "collapsed".into(),
            side_menu_item: "side-menu-item".into(),
            side_menu_item_open: "side-menu-item-open".into(),
            side_menu_toggle: "side-menu-toggle".into(),
            grid_row: "grid-row".into(),
            grid_cell: "grid-cell".into(),
            hidden_row: "row-hidden".into(),
            date_part: "date-part".into(),
            time_part: "time-part".into(),
            popup_content: "popup-content".into(),
            popup_item: "popup-item".into(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Wait timeout for `should`/`should_not` in milliseconds
    pub default_timeout_ms: u64,
    /// Delay between polls in milliseconds
    pub poll_interval_ms: u64,
    /// Attribute carrying stable test ids
    pub stable_id_attribute: String,
    /// Widget class names
    pub markers: Markers,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: wait::DEFAULT_TIMEOUT_MS,
            poll_interval_ms: wait::DEFAULT_POLL_INTERVAL_MS,
            stable_id_attribute: DEFAULT_STABLE_ID_ATTRIBUTE.to_string(),
            markers: Markers::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from YAML; missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns error if the YAML is malformed or the values are invalid.
    pub fn from_yaml_str(yaml: &str) -> PagewireResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file and apply environment overrides.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> PagewireResult<Self> {
        Self::load_with_overrides(path, |name| std::env::var(name).ok())
    }

    /// Load a YAML file and apply overrides from an arbitrary variable source.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed, or a variable holds
    /// an unparsable value.
    pub fn load_with_overrides<F>(path: impl AsRef<Path>, lookup: F) -> PagewireResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&yaml)?.with_overrides(lookup)
    }

    /// Defaults with environment overrides.
    ///
    /// # Errors
    /// Returns error if a variable holds an unparsable value.
    pub fn from_env() -> PagewireResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `PAGEWIRE_*` environment overrides.
    ///
    /// # Errors
    /// Returns error if a variable holds an unparsable value.
    pub fn with_env_overrides(self) -> PagewireResult<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// # Errors
    /// Returns error if a variable holds an unparsable value.
    pub fn with_overrides<F>(mut self, lookup: F) -> PagewireResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            self.default_timeout_ms = parse_millis(ENV_TIMEOUT_MS, &timeout)?;
        }
        if let Some(interval) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = parse_millis(ENV_POLL_INTERVAL_MS, &interval)?;
        }
        if let Some(attribute) = lookup(ENV_STABLE_ID_ATTR) {
            self.stable_id_attribute = attribute.trim().to_string();
        }
        self.validate()?;
        Ok(self)
    }

    /// Set the default timeout
    #[must_use]
    pub const fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.default_timeout_ms = ms;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the stable id attribute
    #[must_use]
    pub fn with_stable_id_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.stable_id_attribute = attribute.into();
        self
    }

    /// Replace the widget markers
    #[must_use]
    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    /// Default timeout as a duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Poll interval as a duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Publish the timing defaults to the process-wide wait settings
    pub fn install(&self) {
        wait::set_default_timeout(self.timeout());
        wait::set_default_poll_interval(self.poll_interval());
        tracing::debug!(
            timeout_ms = self.default_timeout_ms,
            poll_interval_ms = self.poll_interval_ms,
            "installed wait defaults"
        );
    }

    fn validate(&self) -> PagewireResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(PagewireError::config("poll_interval_ms must be positive"));
        }
        if self.stable_id_attribute.trim().is_empty() {
            return Err(PagewireError::config("stable_id_attribute must not be empty"));
        }
        Ok(())
    }
}

fn parse_millis(name: &str, raw: &str) -> PagewireResult<u64> {
    raw.trim()
        .parse()
        .map_err(|_| PagewireError::config(format!("Invalid {name}: {raw:?}")))
}
