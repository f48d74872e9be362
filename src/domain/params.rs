//! The six bounded transit parameters a user can adjust.
//!
//! Ranges are fixed and inclusive. `ParameterSet::set` clamps into them, so a
//! snapshot handed to the payload builder is always in range.

use serde::{Deserialize, Serialize};

/// Identity of one adjustable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterField {
    Period,
    TransitDuration,
    PlanetRadius,
    StarRadius,
    Magnitude,
    Temperature,
}

impl ParameterField {
    /// Every field, in display and wire order.
    pub const ALL: [ParameterField; 6] = [
        ParameterField::Period,
        ParameterField::TransitDuration,
        ParameterField::PlanetRadius,
        ParameterField::StarRadius,
        ParameterField::Magnitude,
        ParameterField::Temperature,
    ];

    /// Inclusive `(min, max)` bounds.
    pub fn range(self) -> (f64, f64) {
        match self {
            ParameterField::Period => (0.2, 1000.0),
            ParameterField::TransitDuration => (0.5, 20.0),
            ParameterField::PlanetRadius => (0.3, 20.0),
            ParameterField::StarRadius => (0.3, 3.0),
            ParameterField::Magnitude => (9.0, 17.0),
            ParameterField::Temperature => (3000.0, 8000.0),
        }
    }

    /// Starting value: an Earth-like planet transiting a Sun-like star.
    pub fn default_value(self) -> f64 {
        match self {
            ParameterField::Period => 365.25,
            ParameterField::TransitDuration => 8.5,
            ParameterField::PlanetRadius => 1.0,
            ParameterField::StarRadius => 1.0,
            ParameterField::Magnitude => 12.5,
            ParameterField::Temperature => 5778.0,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            ParameterField::Period => "days",
            ParameterField::TransitDuration => "hours",
            ParameterField::PlanetRadius => "R_earth",
            ParameterField::StarRadius => "R_sun",
            ParameterField::Magnitude => "mag",
            ParameterField::Temperature => "K",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParameterField::Period => "Orbital period",
            ParameterField::TransitDuration => "Transit duration",
            ParameterField::PlanetRadius => "Planet radius",
            ParameterField::StarRadius => "Star radius",
            ParameterField::Magnitude => "Apparent magnitude",
            ParameterField::Temperature => "Effective temperature",
        }
    }

    /// Upper-case token used in `EXO_FIELD_<TOKEN>` schema overrides.
    pub fn env_token(self) -> &'static str {
        match self {
            ParameterField::Period => "PERIOD",
            ParameterField::TransitDuration => "TRANSIT_DURATION",
            ParameterField::PlanetRadius => "PLANET_RADIUS",
            ParameterField::StarRadius => "STAR_RADIUS",
            ParameterField::Magnitude => "MAGNITUDE",
            ParameterField::Temperature => "TEMPERATURE",
        }
    }

    /// Clamp `value` into this field's range.
    pub fn clamp(self, value: f64) -> f64 {
        let (lo, hi) = self.range();
        value.clamp(lo, hi)
    }
}

/// Current values of all six parameters.
///
/// Lives for the whole session and is mutated one field at a time. Submissions
/// work on a [`ParameterSet::snapshot`], never on the live set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    period: f64,
    transit_duration: f64,
    planet_radius: f64,
    star_radius: f64,
    magnitude: f64,
    temperature: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            period: ParameterField::Period.default_value(),
            transit_duration: ParameterField::TransitDuration.default_value(),
            planet_radius: ParameterField::PlanetRadius.default_value(),
            star_radius: ParameterField::StarRadius.default_value(),
            magnitude: ParameterField::Magnitude.default_value(),
            temperature: ParameterField::Temperature.default_value(),
        }
    }
}

impl ParameterSet {
    pub fn get(&self, field: ParameterField) -> f64 {
        match field {
            ParameterField::Period => self.period,
            ParameterField::TransitDuration => self.transit_duration,
            ParameterField::PlanetRadius => self.planet_radius,
            ParameterField::StarRadius => self.star_radius,
            ParameterField::Magnitude => self.magnitude,
            ParameterField::Temperature => self.temperature,
        }
    }

    /// Store `value` clamped into the field's range and return what was stored.
    ///
    /// Non-finite input is ignored; the field keeps its previous value.
    pub fn set(&mut self, field: ParameterField, value: f64) -> f64 {
        if !value.is_finite() {
            return self.get(field);
        }
        let clamped = field.clamp(value);
        let slot = match field {
            ParameterField::Period => &mut self.period,
            ParameterField::TransitDuration => &mut self.transit_duration,
            ParameterField::PlanetRadius => &mut self.planet_radius,
            ParameterField::StarRadius => &mut self.star_radius,
            ParameterField::Magnitude => &mut self.magnitude,
            ParameterField::Temperature => &mut self.temperature,
        };
        *slot = clamped;
        clamped
    }

    /// Immutable copy taken at submission time.
    pub fn snapshot(&self) -> ParameterSet {
        *self
    }

    /// `(field, value)` pairs in [`ParameterField::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ParameterField, f64)> + '_ {
        ParameterField::ALL.into_iter().map(|f| (f, self.get(f)))
    }
}
