//! Startup configuration and the persisted theme preference.

use log::{debug, warn};

use crate::diagram::Theme;

const API_BASE_META: &str = "onto-api-base";
const DEFAULT_THEME_META: &str = "onto-default-theme";
const THEME_STORAGE_KEY: &str = "theme";

/// Settings read from the host page's `<meta>` tags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
	/// Prefix for backend paths; empty means same origin.
	pub api_base: String,
	/// Used when no preference has been stored yet.
	pub default_theme: Theme,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_base: String::new(),
			default_theme: Theme::Dark,
		}
	}
}

impl AppConfig {
	/// Build from a `<meta name=...>` lookup.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
		let defaults = Self::default();
		let default_theme = match lookup(DEFAULT_THEME_META) {
			Some(raw) => Theme::parse(&raw).unwrap_or_else(|| {
				warn!("unknown default theme {raw:?}, using {}", defaults.default_theme.as_str());
				defaults.default_theme
			}),
			None => defaults.default_theme,
		};
		Self {
			api_base: lookup(API_BASE_META)
				.map(|s| s.trim().to_string())
				.unwrap_or(defaults.api_base),
			default_theme,
		}
	}

	/// Read the `<meta>` tags of the current document.
	pub fn from_document() -> Self {
		let document = web_sys::window().and_then(|w| w.document());
		let config = Self::from_lookup(|name| {
			document
				.as_ref()?
				.query_selector(&format!(r#"meta[name="{name}"]"#))
				.ok()??
				.get_attribute("content")
		});
		debug!("config: {config:?}");
		config
	}

	/// Stored preference first, then the configured default.
	pub fn initial_theme(&self) -> Theme {
		load_theme().unwrap_or(self.default_theme)
	}
}

fn storage() -> Option<web_sys::Storage> {
	web_sys::window()?.local_storage().ok()?
}

/// Theme saved by an earlier session, if storage is available and holds one.
pub fn load_theme() -> Option<Theme> {
	let raw = storage()?.get_item(THEME_STORAGE_KEY).ok()??;
	Theme::parse(&raw)
}

/// Best effort; a storage failure is only logged.
pub fn save_theme(theme: Theme) {
	let Some(storage) = storage() else {
		return;
	};
	if storage.set_item(THEME_STORAGE_KEY, theme.as_str()).is_err() {
		warn!("could not persist theme preference");
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |name| map.get(name).cloned()
	}

	#[test]
	fn defaults_without_meta_tags() {
		assert_eq!(AppConfig::from_lookup(lookup(&[])), AppConfig::default());
	}

	#[test]
	fn meta_tags_override_defaults() {
		let config = AppConfig::from_lookup(lookup(&[
			("onto-api-base", " http://localhost:8180 "),
			("onto-default-theme", "light"),
		]));
		assert_eq!(config.api_base, "http://localhost:8180");
		assert_eq!(config.default_theme, Theme::Light);
	}

	#[test]
	fn unknown_theme_keeps_default() {
		let config = AppConfig::from_lookup(lookup(&[("onto-default-theme", "sepia")]));
		assert_eq!(config.default_theme, Theme::Dark);
	}
}
