use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder substituted with the node designator key in annotation patterns.
pub const PLACEHOLDER: &str = "{}";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a positive number, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    #[error("{component} annotation pattern \"{pattern}\" must contain {{}}")]
    MissingPlaceholder { component: String, pattern: String },

    #[error("{first} and {second} share the annotation pattern \"{pattern}\"")]
    DuplicatePattern {
        pattern: String,
        first: String,
        second: String,
    },

    #[error("the switch component cannot be disabled")]
    SwitchDisabled,

    #[error("unknown {what} \"{value}\"")]
    UnknownValue { what: &'static str, value: String },
}

/// Board side a footprint is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    #[serde(alias = "Front", alias = "Top", alias = "top", alias = "F.Cu")]
    Front,
    #[serde(alias = "Back", alias = "Bottom", alias = "bottom", alias = "B.Cu")]
    Back,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Front => write!(f, "front"),
            Side::Back => write!(f, "back"),
        }
    }
}

impl FromStr for Side {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "front" | "top" | "f.cu" => Ok(Side::Front),
            "back" | "bottom" | "b.cu" => Ok(Side::Back),
            _ => Err(ConfigError::UnknownValue {
                what: "board side",
                value: s.to_string(),
            }),
        }
    }
}

/// What replaces `{}` in annotation patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DesignatorSource {
    /// The node's 1-based position in the layout.
    #[default]
    Index,
    /// The node's KDT label, or its index when it has none.
    Label,
}

impl FromStr for DesignatorSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "index" => Ok(DesignatorSource::Index),
            "label" => Ok(DesignatorSource::Label),
            _ => Err(ConfigError::UnknownValue {
                what: "designator source",
                value: s.to_string(),
            }),
        }
    }
}

/// One placeable component type (switch, diode, LED, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub name: String,
    /// Reference designator template, e.g. `SW{}`.
    pub pattern: String,
    /// Offset from the key centre in the key's rotated frame.
    #[serde(default)]
    pub offset_x_mm: f64,
    #[serde(default)]
    pub offset_y_mm: f64,
    #[serde(default)]
    pub orientation_deg: f64,
    #[serde(default)]
    pub side: Side,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ComponentSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            offset_x_mm: 0.0,
            offset_y_mm: 0.0,
            orientation_deg: 0.0,
            side: Side::Front,
            enabled: true,
        }
    }

    #[must_use]
    pub fn with_offset(mut self, x_mm: f64, y_mm: f64) -> Self {
        self.offset_x_mm = x_mm;
        self.offset_y_mm = y_mm;
        self
    }

    #[must_use]
    pub fn with_orientation(mut self, deg: f64) -> Self {
        self.orientation_deg = deg;
        self
    }

    #[must_use]
    pub fn on_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Resolve this component's reference designator for a node key.
    ///
    /// ```
    /// use kdt_pcb::ComponentSpec;
    /// assert_eq!(ComponentSpec::new("Switch", "SW{}").reference("3"), "SW3");
    /// ```
    #[must_use]
    pub fn reference(&self, key: &str) -> String {
        self.pattern.replace(PLACEHOLDER, key)
    }

    #[must_use]
    pub fn offset(&self) -> [f64; 2] {
        [self.offset_x_mm, self.offset_y_mm]
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.pattern.contains(PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder {
                component: self.name.clone(),
                pattern: self.pattern.clone(),
            });
        }
        for (field, v) in [
            ("offset_x_mm", self.offset_x_mm),
            ("offset_y_mm", self.offset_y_mm),
            ("orientation_deg", self.orientation_deg),
        ] {
            if !v.is_finite() {
                return Err(ConfigError::NotFinite {
                    field: format!("{}.{field}", self.name),
                });
            }
        }
        Ok(())
    }
}

/// Scale factors and the component set for one placement run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementConfig {
    /// Millimetres per key unit.
    pub step_x_mm: f64,
    pub step_y_mm: f64,
    /// Pixels per key unit in the layout export.
    pub ref_unit_px: f64,
    /// Shift applied to every key centre.
    pub offset_x_mm: f64,
    pub offset_y_mm: f64,
    /// Negate node rotations, for hosts whose positive angle turns the other way.
    pub invert_rotation: bool,
    pub designator: DesignatorSource,
    pub switch: ComponentSpec,
    /// Associated components in placement order.
    pub associated: Vec<ComponentSpec>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            step_x_mm: 19.05,
            step_y_mm: 19.05,
            ref_unit_px: 60.0,
            offset_x_mm: 0.0,
            offset_y_mm: 0.0,
            invert_rotation: false,
            designator: DesignatorSource::Index,
            switch: ComponentSpec::new("Switch", "SW{}"),
            associated: vec![ComponentSpec::new("Diode", "D{}")
                .with_offset(0.0, 5.0)
                .on_side(Side::Back)],
        }
    }
}

impl PlacementConfig {
    /// The switch followed by every enabled associated component.
    pub fn components(&self) -> impl Iterator<Item = &ComponentSpec> {
        std::iter::once(&self.switch).chain(self.associated.iter().filter(|c| c.enabled))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("step_x_mm", self.step_x_mm),
            ("step_y_mm", self.step_y_mm),
            ("ref_unit_px", self.ref_unit_px),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        for (field, value) in [
            ("offset_x_mm", self.offset_x_mm),
            ("offset_y_mm", self.offset_y_mm),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite {
                    field: field.to_string(),
                });
            }
        }
        if !self.switch.enabled {
            return Err(ConfigError::SwitchDisabled);
        }

        let components: Vec<&ComponentSpec> = self.components().collect();
        for (i, c) in components.iter().enumerate() {
            c.validate()?;
            if let Some(earlier) = components[..i].iter().find(|e| e.pattern == c.pattern) {
                return Err(ConfigError::DuplicatePattern {
                    pattern: c.pattern.clone(),
                    first: earlier.name.clone(),
                    second: c.name.clone(),
                });
            }
        }
        Ok(())
    }
}
