use std::{fs, ops::RangeInclusive, path::Path};

use serde::{Deserialize, Serialize};

use crate::{DataVisError, LayoutParams, Result, StructureKind, ToneMapping};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub structure: StructureConfig,
    pub audio: ToneMapping,
    pub autoplay: AutoPlayConfig,
}

impl AppConfig {
    /// Reads a TOML file. Missing sections and fields fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Self::from_toml(&source)
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.structure.validate()?;
        self.autoplay.validate()
    }
}

/// Options the user can tweak from the controls panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    pub kind: StructureKind,
    pub element_size: f32,
    pub spacing: f32,
    pub ring_radius: f32,
    /// Auto-play speed multiplier.
    pub speed: f32,
    /// Values shown when a session starts.
    pub initial: Vec<i64>,
}

impl Default for StructureConfig {
    fn default() -> Self {
        let layout = LayoutParams::default();
        Self {
            kind: StructureKind::Queue,
            element_size: layout.element_size,
            spacing: layout.spacing,
            ring_radius: layout.ring_radius,
            speed: 1.0,
            initial: vec![1, 2, 3, 4, 5],
        }
    }
}

impl StructureConfig {
    pub fn layout(&self) -> LayoutParams {
        LayoutParams {
            element_size: self.element_size,
            spacing: self.spacing,
            ring_radius: self.ring_radius,
        }
    }

    pub fn validate(&self) -> Result<()> {
        positive("element_size", self.element_size)?;
        positive("spacing", self.spacing)?;
        positive("ring_radius", self.ring_radius)?;
        positive("speed", self.speed)
    }
}

/// Range random auto-play values are drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoPlayConfig {
    pub min_value: i64,
    pub max_value: i64,
}

impl Default for AutoPlayConfig {
    fn default() -> Self {
        Self {
            min_value: 1,
            max_value: 20,
        }
    }
}

impl AutoPlayConfig {
    pub fn value_range(&self) -> RangeInclusive<i64> {
        self.min_value..=self.max_value
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_value > self.max_value {
            return Err(DataVisError::invalid_config(
                "autoplay.min_value",
                format!("must not exceed max_value ({})", self.max_value),
            ));
        }
        Ok(())
    }
}

pub(crate) fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DataVisError::invalid_config(
            field,
            format!("must be a finite number greater than zero, got {value}"),
        ))
    }
}
