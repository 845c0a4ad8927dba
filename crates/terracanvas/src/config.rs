//! Configuration types for the Terracanvas engine.
//!
//! This module provides the configuration structures that control layout,
//! code generation and diagram retention. All types implement
//! [`serde::Deserialize`] for loading from external sources; every section
//! and field is optional and falls back to its default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`LayoutConfig`] - Engine selection and layout options.
//! - [`GenerationConfig`] - Generated file naming.
//! - [`StoreConfig`] - In-memory diagram retention.
//!
//! # Example
//!
//! ```
//! # use terracanvas::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.generation().extension(), "tf");
//! assert_eq!(config.store().capacity(), 64);
//! ```

use serde::Deserialize;

use terracanvas_core::layout::{Direction, LayoutEngine, LayoutOptions};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Code generation section.
    #[serde(default)]
    generation: GenerationConfig,

    /// Diagram store section.
    #[serde(default)]
    store: StoreConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, generation: GenerationConfig, store: StoreConfig) -> Self {
        Self {
            layout,
            generation,
            store,
        }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the code generation configuration.
    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }

    /// Returns the diagram store configuration.
    pub fn store(&self) -> &StoreConfig {
        &self.store
    }
}

/// Layout engine and option settings.
///
/// Field names are snake_case, matching configuration files rather than the
/// camelCase snapshot form of [`LayoutOptions`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    engine: LayoutEngine,
    direction: Direction,
    node_spacing: f32,
    rank_spacing: f32,
    margin_x: f32,
    margin_y: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let options = LayoutOptions::default();
        Self {
            engine: LayoutEngine::default(),
            direction: options.direction,
            node_spacing: options.node_spacing,
            rank_spacing: options.rank_spacing,
            margin_x: options.margin_x,
            margin_y: options.margin_y,
        }
    }
}

impl LayoutConfig {
    /// Creates a layout configuration for an engine with the given options.
    pub fn new(engine: LayoutEngine, options: LayoutOptions) -> Self {
        Self {
            engine,
            direction: options.direction,
            node_spacing: options.node_spacing,
            rank_spacing: options.rank_spacing,
            margin_x: options.margin_x,
            margin_y: options.margin_y,
        }
    }

    /// Returns the configured [`LayoutEngine`].
    pub fn engine(&self) -> LayoutEngine {
        self.engine
    }

    /// Returns the layout options new diagrams start with.
    pub fn options(&self) -> LayoutOptions {
        LayoutOptions {
            direction: self.direction,
            node_spacing: self.node_spacing,
            rank_spacing: self.rank_spacing,
            margin_x: self.margin_x,
            margin_y: self.margin_y,
        }
    }
}

/// Code generation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Extension of generated files, without the leading dot.
    extension: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            extension: "tf".to_string(),
        }
    }
}

impl GenerationConfig {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

/// Diagram store settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of diagrams kept in memory.
    capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

impl StoreConfig {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_sections_fall_back_to_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "layout": { "engine": "sugiyama", "direction": "TB", "rank_spacing": 120.0 } }"#,
        )
        .unwrap();

        assert_eq!(config.layout().engine(), LayoutEngine::Sugiyama);
        let options = config.layout().options();
        assert_eq!(options.direction, Direction::TopToBottom);
        assert_eq!(options.rank_spacing, 120.0);
        assert_eq!(options.node_spacing, LayoutOptions::default().node_spacing);
        assert_eq!(config.generation().extension(), "tf");
        assert_eq!(config.store().capacity(), 64);
    }

    #[test]
    fn test_layout_config_round_trips_options() {
        let options = LayoutOptions::default()
            .with_direction(Direction::BottomToTop)
            .with_margins(5.0, 7.0);
        let config = LayoutConfig::new(LayoutEngine::Layered, options);
        assert_eq!(config.options(), options);
    }
}
