#![warn(missing_docs)]
//! # threat-scope-report
//!
//! ## Purpose
//! Defines the detection report data model shared across the `threat-scope`
//! workspace.
//!
//! ## Responsibilities
//! - Represent face/person/object/text/location findings and the 1-5 threat
//!   score as validated value objects.
//! - Enforce report invariants at construction instead of at render time.
//! - Encode/decode versioned report payloads for transport and fixtures.
//!
//! ## Data flow
//! A report synthesizer builds a [`DetectionReport`] from an image payload.
//! The pipeline carries the report unchanged into presentation projections.
//!
//! ## Ownership and lifetimes
//! Reports own all their strings and lists (`String`/`Vec`) so completed
//! pipeline states can outlive the synthesizer that produced them.
//!
//! ## Error model
//! Out-of-range confidences, threat levels, and coordinates return
//! [`ReportError`] variants with caller-actionable categorization.
//!
//! ## Example
//! ```rust
//! use threat_scope_report::ThreatLevel;
//!
//! let level = ThreatLevel::new(3).expect("valid threat level");
//! assert_eq!(level.get(), 3);
//! assert!(ThreatLevel::new(6).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical schema tag for v1 detection reports.
pub const REPORT_SCHEMA_VERSION_V1: &str = "v1";

/// Face detection outcome for one analyzed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceFinding {
    /// Whether a face was found at all.
    pub detected: bool,
    /// Detection confidence in [0.0, 1.0].
    pub confidence: f32,
    /// Emotion labels in producer-assigned order. May be empty.
    pub emotions: Vec<String>,
}

/// Coarse gender classification emitted by person analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    /// Classified as male.
    Male,
    /// Classified as female.
    Female,
    /// Backend declined to classify.
    Undetermined,
}

/// Person-level attributes inferred from the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonFinding {
    /// Coarse gender classification.
    pub gender: Gender,
    /// Estimated age in whole years.
    pub age_years: u32,
    /// Classification confidence in [0.0, 1.0].
    pub confidence: f32,
}

/// One recognized object with its confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    /// Object class name (for example `Backpack`).
    pub name: String,
    /// Recognition confidence in [0.0, 1.0].
    pub confidence: f32,
}

/// WGS84 coordinates resolved for the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinates {
    /// Latitude in degrees, [-90, 90].
    pub latitude: f64,
    /// Longitude in degrees, [-180, 180].
    pub longitude: f64,
}

/// Place resolution for the analyzed image.
///
/// Present on a report only when the backend resolved a place; coordinates
/// may still be absent when only a textual address was recovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFinding {
    /// Human-readable address text.
    pub address: String,
    /// Resolved coordinates, when available.
    pub coordinates: Option<GeoCoordinates>,
}

/// Threat score constrained to the 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ThreatLevel(u8);

impl ThreatLevel {
    /// Lowest defined threat score.
    pub const MIN: u8 = 1;
    /// Highest defined threat score.
    pub const MAX: u8 = 5;

    /// Constructs a validated threat level.
    ///
    /// # Errors
    /// Returns [`ReportError::ThreatLevelOutOfRange`] when `level` is not in
    /// `1..=5`.
    pub fn new(level: u8) -> Result<Self, ReportError> {
        if !(Self::MIN..=Self::MAX).contains(&level) {
            return Err(ReportError::ThreatLevelOutOfRange(level));
        }
        Ok(Self(level))
    }

    /// Returns the inner score.
    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ThreatLevel {
    type Error = ReportError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<ThreatLevel> for u8 {
    fn from(level: ThreatLevel) -> Self {
        level.0
    }
}

/// Immutable detection report produced by one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Report schema version for contract negotiation.
    pub schema_version: String,
    /// Face detection section.
    pub face: FaceFinding,
    /// Person analysis section.
    pub person: PersonFinding,
    /// Recognized objects in producer-assigned order. May be empty.
    pub objects: Vec<DetectedObject>,
    /// Free-form text extracted from the image. May be empty.
    pub extracted_text: String,
    /// Resolved place, when the backend found one.
    pub location: Option<LocationFinding>,
    /// Overall threat score.
    pub threat_level: ThreatLevel,
}

impl DetectionReport {
    /// Constructs a validated v1 report.
    ///
    /// # Errors
    /// Returns [`ReportError::ConfidenceOutOfRange`] for any confidence value
    /// outside [0, 1], and [`ReportError::InvalidCoordinates`] for coordinates
    /// outside WGS84 bounds.
    pub fn new(
        face: FaceFinding,
        person: PersonFinding,
        objects: Vec<DetectedObject>,
        extracted_text: impl Into<String>,
        location: Option<LocationFinding>,
        threat_level: ThreatLevel,
    ) -> Result<Self, ReportError> {
        let report = Self {
            schema_version: REPORT_SCHEMA_VERSION_V1.to_string(),
            face,
            person,
            objects,
            extracted_text: extracted_text.into(),
            location,
            threat_level,
        };
        report.validate()?;
        Ok(report)
    }

    /// Re-checks all report invariants.
    ///
    /// Construction already validates; this exists for reports deserialized
    /// from external payloads.
    ///
    /// # Errors
    /// Same error surface as [`DetectionReport::new`].
    pub fn validate(&self) -> Result<(), ReportError> {
        validate_confidence("face.confidence", self.face.confidence)?;
        validate_confidence("person.confidence", self.person.confidence)?;
        for object in &self.objects {
            validate_confidence("objects[].confidence", object.confidence)?;
        }

        if let Some(location) = &self.location
            && let Some(coordinates) = &location.coordinates
        {
            validate_coordinates(coordinates)?;
        }

        Ok(())
    }

    /// Serializes the report to compact JSON bytes.
    ///
    /// # Errors
    /// Returns [`ReportError::Codec`] when JSON serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ReportError> {
        serde_json::to_vec(self).map_err(ReportError::Codec)
    }

    /// Deserializes and validates a report from JSON bytes.
    ///
    /// # Errors
    /// Returns [`ReportError::Codec`] for invalid JSON and the constructor
    /// error surface for invariant violations.
    pub fn from_json_bytes(raw: &[u8]) -> Result<Self, ReportError> {
        let report: Self = serde_json::from_slice(raw).map_err(ReportError::Codec)?;
        report.validate()?;
        Ok(report)
    }
}

fn validate_confidence(field: &'static str, value: f32) -> Result<(), ReportError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ReportError::ConfidenceOutOfRange { field, value });
    }
    Ok(())
}

fn validate_coordinates(coordinates: &GeoCoordinates) -> Result<(), ReportError> {
    let latitude_ok =
        coordinates.latitude.is_finite() && (-90.0..=90.0).contains(&coordinates.latitude);
    let longitude_ok =
        coordinates.longitude.is_finite() && (-180.0..=180.0).contains(&coordinates.longitude);

    if !latitude_ok || !longitude_ok {
        return Err(ReportError::InvalidCoordinates {
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
        });
    }
    Ok(())
}

/// Error type for report validation and codec failures.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A confidence value left the [0, 1] interval.
    #[error("confidence out of range for {field}: {value}")]
    ConfidenceOutOfRange {
        /// Which report field carried the bad value.
        field: &'static str,
        /// The offending value.
        value: f32,
    },
    /// Threat level must be in 1..=5.
    #[error("threat level out of range: {0} (expected 1..=5)")]
    ThreatLevelOutOfRange(u8),
    /// Coordinates violate WGS84 bounds.
    #[error("invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates {
        /// Latitude as received.
        latitude: f64,
        /// Longitude as received.
        longitude: f64,
    },
    /// JSON encoding/decoding error.
    #[error("report codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}
