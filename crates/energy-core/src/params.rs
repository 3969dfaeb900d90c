//! Building design parameters
//!
//! Validates the eight raw inputs of an energy prediction against their
//! closed ranges and turns them into the fixed-order feature vector the
//! regression model was trained on.

use crate::error::{ValidationError, ValidationErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of input features expected by the model
pub const FEATURE_COUNT: usize = 8;

/// One row of model input, in trained feature order
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Closed interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Relative position of `value` inside the range, 0 at `min` and 1 at `max`
    pub fn position(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Float,
    Integer,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Float => "float",
            FieldKind::Integer => "integer",
        }
    }
}

/// Static description of one input field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub range: ValueRange,
    pub default: f64,
    pub unit: &'static str,
}

/// Model input features, declared in trained order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    RelativeCompactness,
    SurfaceArea,
    WallArea,
    RoofArea,
    OverallHeight,
    Orientation,
    GlazingArea,
    GlazingAreaDistribution,
}

impl Feature {
    /// All features in the order the model expects them
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::RelativeCompactness,
        Feature::SurfaceArea,
        Feature::WallArea,
        Feature::RoofArea,
        Feature::OverallHeight,
        Feature::Orientation,
        Feature::GlazingArea,
        Feature::GlazingAreaDistribution,
    ];

    /// Position of this feature in the model input vector
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static FieldSpec {
        &FIELD_SPECS[self.index()]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

/// Field table, indexed by [`Feature::index`]
pub static FIELD_SPECS: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec {
        name: "relative_compactness",
        label: "Relative Compactness",
        kind: FieldKind::Float,
        range: ValueRange::new(0.62, 0.98),
        default: 0.75,
        unit: "",
    },
    FieldSpec {
        name: "surface_area",
        label: "Surface Area",
        kind: FieldKind::Float,
        range: ValueRange::new(514.0, 808.0),
        default: 600.0,
        unit: "m²",
    },
    FieldSpec {
        name: "wall_area",
        label: "Wall Area",
        kind: FieldKind::Float,
        range: ValueRange::new(294.0, 416.0),
        default: 350.0,
        unit: "m²",
    },
    FieldSpec {
        name: "roof_area",
        label: "Roof Area",
        kind: FieldKind::Float,
        range: ValueRange::new(110.0, 220.0),
        default: 150.0,
        unit: "m²",
    },
    FieldSpec {
        name: "overall_height",
        label: "Overall Height",
        kind: FieldKind::Float,
        range: ValueRange::new(3.0, 7.0),
        default: 3.5,
        unit: "m",
    },
    FieldSpec {
        name: "orientation",
        label: "Orientation",
        kind: FieldKind::Integer,
        range: ValueRange::new(2.0, 5.0),
        default: 3.0,
        unit: "",
    },
    FieldSpec {
        name: "glazing_area",
        label: "Glazing Area",
        kind: FieldKind::Float,
        range: ValueRange::new(0.0, 0.4),
        default: 0.2,
        unit: "",
    },
    FieldSpec {
        name: "glazing_area_distribution",
        label: "Glazing Area Distribution",
        kind: FieldKind::Integer,
        range: ValueRange::new(0.0, 5.0),
        default: 3.0,
        unit: "",
    },
];

/// Unvalidated input as received from a form, CLI flags or an API payload
///
/// Missing fields take the table default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_compactness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface_area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wall_area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roof_area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glazing_area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glazing_area_distribution: Option<f64>,
}

impl RawParameters {
    pub fn get(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::RelativeCompactness => self.relative_compactness,
            Feature::SurfaceArea => self.surface_area,
            Feature::WallArea => self.wall_area,
            Feature::RoofArea => self.roof_area,
            Feature::OverallHeight => self.overall_height,
            Feature::Orientation => self.orientation,
            Feature::GlazingArea => self.glazing_area,
            Feature::GlazingAreaDistribution => self.glazing_area_distribution,
        }
    }

    pub fn set(&mut self, feature: Feature, value: f64) -> &mut Self {
        let slot = match feature {
            Feature::RelativeCompactness => &mut self.relative_compactness,
            Feature::SurfaceArea => &mut self.surface_area,
            Feature::WallArea => &mut self.wall_area,
            Feature::RoofArea => &mut self.roof_area,
            Feature::OverallHeight => &mut self.overall_height,
            Feature::Orientation => &mut self.orientation,
            Feature::GlazingArea => &mut self.glazing_area,
            Feature::GlazingAreaDistribution => &mut self.glazing_area_distribution,
        };
        *slot = Some(value);
        self
    }

    /// Value for `feature`, falling back to its default
    pub fn value_or_default(&self, feature: Feature) -> f64 {
        self.get(feature).unwrap_or(feature.spec().default)
    }
}

/// Validated building parameters
///
/// Every field lies within its closed range. Instances cannot be mutated;
/// build a new one per request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSet {
    relative_compactness: f64,
    surface_area: f64,
    wall_area: f64,
    roof_area: f64,
    overall_height: f64,
    orientation: u8,
    glazing_area: f64,
    glazing_area_distribution: u8,
}

impl ParameterSet {
    /// Validate raw input, rejecting (never clamping) out-of-range values
    ///
    /// Fields are checked in feature order and the first failure is returned.
    pub fn construct(raw: &RawParameters) -> Result<Self, ValidationError> {
        let mut values = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            values[feature.index()] = validate_field(feature, raw.value_or_default(feature))?;
        }
        Ok(Self::from_checked(values))
    }

    /// Validate a feature vector given in trained order
    pub fn from_values(values: FeatureVector) -> Result<Self, ValidationError> {
        for feature in Feature::ALL {
            validate_field(feature, values[feature.index()])?;
        }
        Ok(Self::from_checked(values))
    }

    fn from_checked(values: FeatureVector) -> Self {
        Self {
            relative_compactness: values[0],
            surface_area: values[1],
            wall_area: values[2],
            roof_area: values[3],
            overall_height: values[4],
            orientation: values[5] as u8,
            glazing_area: values[6],
            glazing_area_distribution: values[7] as u8,
        }
    }

    /// Fixed-order model input; this order is the model's training contract
    pub fn to_feature_vector(&self) -> FeatureVector {
        [
            self.relative_compactness,
            self.surface_area,
            self.wall_area,
            self.roof_area,
            self.overall_height,
            f64::from(self.orientation),
            self.glazing_area,
            f64::from(self.glazing_area_distribution),
        ]
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.to_feature_vector()[feature.index()]
    }

    pub fn relative_compactness(&self) -> f64 {
        self.relative_compactness
    }

    pub fn surface_area(&self) -> f64 {
        self.surface_area
    }

    pub fn wall_area(&self) -> f64 {
        self.wall_area
    }

    pub fn roof_area(&self) -> f64 {
        self.roof_area
    }

    pub fn overall_height(&self) -> f64 {
        self.overall_height
    }

    pub fn orientation(&self) -> u8 {
        self.orientation
    }

    pub fn glazing_area(&self) -> f64 {
        self.glazing_area
    }

    pub fn glazing_area_distribution(&self) -> u8 {
        self.glazing_area_distribution
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            values[feature.index()] = feature.spec().default;
        }
        Self::from_checked(values)
    }
}

impl TryFrom<&RawParameters> for ParameterSet {
    type Error = ValidationError;

    fn try_from(raw: &RawParameters) -> Result<Self, Self::Error> {
        Self::construct(raw)
    }
}

fn validate_field(feature: Feature, value: f64) -> Result<f64, ValidationError> {
    let spec = feature.spec();
    let reject = |kind| ValidationError {
        field: spec.name,
        value,
        expected_range: spec.range,
        kind,
    };

    if !value.is_finite() {
        return Err(reject(ValidationErrorKind::NotFinite));
    }
    if !spec.range.contains(value) {
        return Err(reject(ValidationErrorKind::OutOfRange));
    }
    if spec.kind == FieldKind::Integer && value.fract() != 0.0 {
        return Err(reject(ValidationErrorKind::NotInteger));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with(feature: Feature, value: f64) -> RawParameters {
        let mut raw = RawParameters::default();
        raw.set(feature, value);
        raw
    }

    #[test]
    fn test_defaults_are_valid() {
        let params = ParameterSet::construct(&RawParameters::default()).unwrap();
        assert_eq!(params, ParameterSet::default());
        assert_eq!(
            params.to_feature_vector(),
            [0.75, 600.0, 350.0, 150.0, 3.5, 3.0, 0.2, 3.0]
        );
    }

    #[test]
    fn test_feature_table_matches_enum_order() {
        for feature in Feature::ALL {
            assert_eq!(FIELD_SPECS[feature.index()].name, feature.name());
        }
        assert_eq!(Feature::Orientation.index(), 5);
        assert_eq!(Feature::GlazingAreaDistribution.index(), 7);
    }

    #[test]
    fn test_boundaries_accepted() {
        for feature in Feature::ALL {
            let range = feature.spec().range;
            assert!(ParameterSet::construct(&raw_with(feature, range.min)).is_ok(), "{:?} min", feature);
            assert!(ParameterSet::construct(&raw_with(feature, range.max)).is_ok(), "{:?} max", feature);
        }
        let params = ParameterSet::construct(&raw_with(Feature::RelativeCompactness, 0.62)).unwrap();
        assert_eq!(params.relative_compactness(), 0.62);
        let params = ParameterSet::construct(&raw_with(Feature::RelativeCompactness, 0.98)).unwrap();
        assert_eq!(params.relative_compactness(), 0.98);
    }

    #[test]
    fn test_out_of_range_rejected_with_field_name() {
        let cases = [
            (Feature::RelativeCompactness, 0.61),
            (Feature::SurfaceArea, 808.5),
            (Feature::WallArea, 293.9),
            (Feature::RoofArea, 221.0),
            (Feature::OverallHeight, 7.01),
            (Feature::Orientation, 1.0),
            (Feature::GlazingArea, -0.01),
            (Feature::GlazingAreaDistribution, 6.0),
        ];
        for (feature, value) in cases {
            let err = ParameterSet::construct(&raw_with(feature, value)).unwrap_err();
            assert_eq!(err.field, feature.name());
            assert_eq!(err.value, value);
            assert_eq!(err.kind, ValidationErrorKind::OutOfRange);
            assert_eq!(err.expected_range, feature.spec().range);
        }
    }

    #[test]
    fn test_out_of_range_is_not_clamped() {
        let err = ParameterSet::construct(&raw_with(Feature::OverallHeight, 12.0)).unwrap_err();
        assert_eq!(err.field, "overall_height");
    }

    #[test]
    fn test_fractional_integer_rejected() {
        let err = ParameterSet::construct(&raw_with(Feature::Orientation, 3.5)).unwrap_err();
        assert_eq!(err.field, "orientation");
        assert_eq!(err.kind, ValidationErrorKind::NotInteger);

        let err = ParameterSet::construct(&raw_with(Feature::GlazingAreaDistribution, 0.2)).unwrap_err();
        assert_eq!(err.field, "glazing_area_distribution");
        assert_eq!(err.kind, ValidationErrorKind::NotInteger);
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = ParameterSet::construct(&raw_with(Feature::WallArea, f64::NAN)).unwrap_err();
        assert_eq!(err.field, "wall_area");
        assert_eq!(err.kind, ValidationErrorKind::NotFinite);

        let err = ParameterSet::construct(&raw_with(Feature::RoofArea, f64::INFINITY)).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::NotFinite);
    }

    #[test]
    fn test_first_failing_field_reported() {
        let mut raw = RawParameters::default();
        raw.set(Feature::GlazingArea, 0.9).set(Feature::SurfaceArea, 100.0);
        let err = ParameterSet::construct(&raw).unwrap_err();
        assert_eq!(err.field, "surface_area");
    }

    #[test]
    fn test_orientation_and_distribution_not_swapped() {
        let mut a = RawParameters::default();
        a.set(Feature::Orientation, 2.0).set(Feature::GlazingAreaDistribution, 5.0);
        let mut b = RawParameters::default();
        b.set(Feature::Orientation, 5.0).set(Feature::GlazingAreaDistribution, 2.0);

        let va = ParameterSet::construct(&a).unwrap().to_feature_vector();
        let vb = ParameterSet::construct(&b).unwrap().to_feature_vector();

        assert_eq!(va[5], 2.0);
        assert_eq!(va[7], 5.0);
        assert_eq!(vb[5], 5.0);
        assert_eq!(vb[7], 2.0);
        assert_ne!(va, vb);
    }

    #[test]
    fn test_from_values_roundtrip_order() {
        let values = [0.9, 700.0, 400.0, 200.0, 7.0, 4.0, 0.1, 1.0];
        let params = ParameterSet::from_values(values).unwrap();
        assert_eq!(params.orientation(), 4);
        assert_eq!(params.glazing_area_distribution(), 1);
        assert_eq!(params.to_feature_vector(), values);
    }

    #[test]
    fn test_raw_parameters_json() {
        let raw: RawParameters =
            serde_json::from_str(r#"{"overall_height": 7.0, "orientation": 4}"#).unwrap();
        assert_eq!(raw.overall_height, Some(7.0));
        assert_eq!(raw.orientation, Some(4.0));
        assert_eq!(raw.wall_area, None);

        let unknown = serde_json::from_str::<RawParameters>(r#"{"volume": 1.0}"#);
        assert!(unknown.is_err());
    }

    #[test]
    fn test_range_position() {
        let range = ValueRange::new(3.0, 7.0);
        assert_eq!(range.position(3.0), 0.0);
        assert_eq!(range.position(7.0), 1.0);
        assert!((range.position(5.0) - 0.5).abs() < 1e-12);
    }
}
