#![warn(missing_docs)]
//! # threat-scope-view
//!
//! ## Purpose
//! Projects immutable detection reports into display-safe view models for the
//! dashboard shell.
//!
//! ## Responsibilities
//! - Map the 1-5 threat score to a fixed label/severity/description table,
//!   total over all integers.
//! - Flatten face/person/object/text findings into renderable sections.
//! - Build the external map link when coordinates are present.
//!
//! ## Data flow
//! Completed pipeline state -> projection functions here -> rendered by the
//! shell. Every function is a pure read of report data.
//!
//! ## Ownership and lifetimes
//! View models own their strings so the shell can keep them across re-renders
//! without borrowing from pipeline state.
//!
//! ## Error model
//! Projections are total; malformed inputs degrade to explicit "Unknown"
//! entries or empty sections rather than errors.

use threat_scope_report::{DetectionReport, Gender, GeoCoordinates, LocationFinding};
use url::Url;

/// Fixed presentation attributes for one threat level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreatLevelInfo {
    /// Short label (for example `Medium Threat`).
    pub label: &'static str,
    /// Severity color class consumed by the shell theme.
    pub severity_class: &'static str,
    /// One-sentence description.
    pub description: &'static str,
}

/// Total lookup from any integer to presentation attributes.
///
/// Levels outside 1..=5 map to the explicit Unknown entry; this function
/// never panics.
pub fn threat_level_info(level: i64) -> ThreatLevelInfo {
    match level {
        1 => ThreatLevelInfo {
            label: "Safe",
            severity_class: "threat-safe",
            description: "No immediate threats detected",
        },
        2 => ThreatLevelInfo {
            label: "Low Threat",
            severity_class: "threat-low",
            description: "Minimal risk detected",
        },
        3 => ThreatLevelInfo {
            label: "Medium Threat",
            severity_class: "threat-medium",
            description: "Moderate risk - monitoring required",
        },
        4 => ThreatLevelInfo {
            label: "High Threat",
            severity_class: "threat-high",
            description: "Significant risk - immediate attention needed",
        },
        5 => ThreatLevelInfo {
            label: "Critical Threat",
            severity_class: "threat-critical",
            description: "Severe risk - take immediate action",
        },
        _ => ThreatLevelInfo {
            label: "Unknown",
            severity_class: "muted",
            description: "Unable to assess threat level",
        },
    }
}

/// Threat assessment card: attributes plus the five-segment bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreatLevelView {
    /// Level as received, echoed for the `Level N/5` caption.
    pub level: i64,
    /// Presentation attributes.
    pub info: ThreatLevelInfo,
    /// Bar segments 1..=5; `true` means filled.
    pub segments: [bool; 5],
}

/// Builds the threat assessment view for any integer level.
pub fn threat_level_view(level: i64) -> ThreatLevelView {
    let mut segments = [false; 5];
    for (index, segment) in segments.iter_mut().enumerate() {
        *segment = (index as i64 + 1) <= level;
    }
    ThreatLevelView {
        level,
        info: threat_level_info(level),
        segments,
    }
}

/// Face section of the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceSection {
    /// `Detected` or `Not Detected`.
    pub status_label: &'static str,
    /// Confidence formatted as `NN.N%`.
    pub confidence_pct: String,
    /// Emotion badge labels; empty list renders an empty row.
    pub emotions: Vec<String>,
}

/// Person section of the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonSection {
    /// Gender label.
    pub gender_label: &'static str,
    /// Estimated age, formatted as `NN years`.
    pub age_label: String,
    /// Confidence formatted as `NN.N%`.
    pub confidence_pct: String,
}

/// One recognized-object row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRow {
    /// Object class name.
    pub name: String,
    /// Confidence formatted as `NN.N%`.
    pub confidence_pct: String,
}

/// Full detection detail view model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionDetailView {
    /// Face detection section.
    pub face: FaceSection,
    /// Person analysis section.
    pub person: PersonSection,
    /// Recognized objects; empty list renders an empty section.
    pub objects: Vec<ObjectRow>,
    /// Extracted text block.
    pub extracted_text: String,
}

/// Projects a report into the detail view model.
pub fn detection_details(report: &DetectionReport) -> DetectionDetailView {
    DetectionDetailView {
        face: FaceSection {
            status_label: if report.face.detected {
                "Detected"
            } else {
                "Not Detected"
            },
            confidence_pct: format_confidence_pct(report.face.confidence),
            emotions: report.face.emotions.clone(),
        },
        person: PersonSection {
            gender_label: gender_label(report.person.gender),
            age_label: format!("{} years", report.person.age_years),
            confidence_pct: format_confidence_pct(report.person.confidence),
        },
        objects: report
            .objects
            .iter()
            .map(|object| ObjectRow {
                name: object.name.clone(),
                confidence_pct: format_confidence_pct(object.confidence),
            })
            .collect(),
        extracted_text: report.extracted_text.clone(),
    }
}

/// Location card view model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationView {
    /// Address text.
    pub address: String,
    /// External map link; absent without coordinates.
    pub map_url: Option<String>,
}

/// Projects an optional location finding into its card.
///
/// Returns `None` when the report carries no location, so the shell omits the
/// card entirely.
pub fn location_view(location: Option<&LocationFinding>) -> Option<LocationView> {
    location.map(|finding| LocationView {
        address: finding.address.clone(),
        map_url: finding.coordinates.as_ref().and_then(external_map_url),
    })
}

/// Builds the `open in external map` URL for resolved coordinates.
pub fn external_map_url(coordinates: &GeoCoordinates) -> Option<String> {
    let raw = format!(
        "https://www.google.com/maps?q={},{}",
        coordinates.latitude, coordinates.longitude
    );
    Url::parse(&raw).ok().map(String::from)
}

/// Formats a [0, 1] confidence as a percentage with one decimal.
pub fn format_confidence_pct(confidence: f32) -> String {
    format!("{:.1}%", confidence * 100.0)
}

fn gender_label(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "Male",
        Gender::Female => "Female",
        Gender::Undetermined => "Undetermined",
    }
}
