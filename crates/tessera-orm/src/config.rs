//! Configuration types for the ORM designer.
//!
//! All types implement [`serde::Deserialize`]; every section and every field
//! is optional and falls back to its default.
//!
//! # Overview
//!
//! - [`ModelConfig`] - Top-level configuration combining the sections below.
//! - [`NamingConfig`] - Prefixes used when generating element names.
//! - [`LayoutConfig`] - Default geometry of new tables.
//! - [`ValidationConfig`] - Switches for the advisory validation rules.
//!
//! # Example
//!
//! ```
//! # use tessera_orm::config::ModelConfig;
//! let config = ModelConfig::default();
//! assert_eq!(config.naming().table_prefix(), "Table");
//! assert!(config.validation().warn_on_empty_design());
//! ```

use serde::Deserialize;

use tessera_core::geometry::Size;

/// Top-level ORM designer configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfig {
    /// Name generation section.
    #[serde(default)]
    naming: NamingConfig,

    /// Table geometry section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Validation rule section.
    #[serde(default)]
    validation: ValidationConfig,
}

impl ModelConfig {
    /// Creates a new [`ModelConfig`] from its sections.
    pub fn new(naming: NamingConfig, layout: LayoutConfig, validation: ValidationConfig) -> Self {
        Self {
            naming,
            layout,
            validation,
        }
    }

    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn validation(&self) -> &ValidationConfig {
        &self.validation
    }
}

/// Prefixes for generated names.
///
/// A generated name is the prefix followed by the smallest positive number
/// that no sibling already uses, compared case-insensitively.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    table_prefix: String,
    field_prefix: String,
    reference_prefix: String,
}

impl NamingConfig {
    pub fn new(
        table_prefix: impl Into<String>,
        field_prefix: impl Into<String>,
        reference_prefix: impl Into<String>,
    ) -> Self {
        Self {
            table_prefix: table_prefix.into(),
            field_prefix: field_prefix.into(),
            reference_prefix: reference_prefix.into(),
        }
    }

    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    pub fn field_prefix(&self) -> &str {
        &self.field_prefix
    }

    pub fn reference_prefix(&self) -> &str {
        &self.reference_prefix
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self::new("Table", "Field", "Reference")
    }
}

/// Geometry used when a table is added without an explicit size.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    table_width: f64,
    table_height: f64,
}

impl LayoutConfig {
    pub fn new(table_width: f64, table_height: f64) -> Self {
        Self {
            table_width,
            table_height,
        }
    }

    /// Size of a newly added table.
    pub fn table_size(&self) -> Size {
        Size::new(self.table_width, self.table_height)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::new(200.0, 120.0)
    }
}

/// Switches for the rules that only produce warnings.
///
/// Rules that produce errors cannot be turned off.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    warn_on_empty_design: bool,
    warn_on_self_reference: bool,
    warn_on_missing_primary_key: bool,
}

impl ValidationConfig {
    pub fn new(warn_on_empty_design: bool, warn_on_self_reference: bool, warn_on_missing_primary_key: bool) -> Self {
        Self {
            warn_on_empty_design,
            warn_on_self_reference,
            warn_on_missing_primary_key,
        }
    }

    pub fn warn_on_empty_design(&self) -> bool {
        self.warn_on_empty_design
    }

    pub fn warn_on_self_reference(&self) -> bool {
        self.warn_on_self_reference
    }

    pub fn warn_on_missing_primary_key(&self) -> bool {
        self.warn_on_missing_primary_key
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::new(true, true, true)
    }
}
