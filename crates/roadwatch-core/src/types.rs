//! Core types for observation triage

use crate::error::InputError;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Normalised location key used for exact-match recency lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationKey(String);

impl LocationKey {
    /// Normalise a raw location string.
    ///
    /// A `lat,lon` pair is rounded to `precision` decimals so that
    /// `6.92710,79.8612` and `6.9271, 79.8612` name the same place.
    /// Anything else is kept verbatim (trimmed) as an opaque key.
    pub fn parse(raw: &str, precision: u32) -> Result<Self, InputError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InputError::InvalidLocation(raw.to_string()));
        }

        match parse_lat_lon(trimmed) {
            Some((lat, lon)) => {
                let places = precision.min(9) as usize;
                Ok(Self(format!(
                    "{},{}",
                    format_coord(lat, places),
                    format_coord(lon, places)
                )))
            }
            None => Ok(Self(trimmed.to_string())),
        }
    }

    /// Wrap a key that was normalised before it was stored
    pub fn from_stored(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_lat_lon(raw: &str) -> Option<(f64, f64)> {
    let (lat, lon) = raw.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    let valid = lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon);
    valid.then_some((lat, lon))
}

fn format_coord(value: f64, places: usize) -> String {
    let rendered = format!("{:.*}", places, value);
    // -0.0000 and 0.0000 must be the same key
    if rendered.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        rendered.trim_start_matches('-').to_string()
    } else {
        rendered
    }
}

/// One image+location unit submitted for analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub location: LocationKey,
    /// Opaque handle to the image (usually a path); empty means missing
    pub image_reference: String,
    pub received_at: DateTime<Utc>,
}

impl Observation {
    pub fn new(location: LocationKey, image_reference: impl Into<String>) -> Self {
        Self {
            location,
            image_reference: image_reference.into(),
            received_at: Utc::now(),
        }
    }

    pub fn has_image(&self) -> bool {
        !self.image_reference.trim().is_empty()
    }
}

/// Finding category, one classifier call each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "HAZARD")]
    Hazard,
    #[serde(rename = "SIGNAGE")]
    Signage,
}

impl Category {
    /// Prefix used when rendering a finding set
    pub fn heading(&self) -> &'static str {
        match self {
            Category::Hazard => "Hazards",
            Category::Signage => "Signs",
        }
    }
}

/// Pixel rectangle (x1, y1) - (x2, y2)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn area(&self) -> f64 {
        ((self.x2 - self.x1).max(0.0)) * ((self.y2 - self.y1).max(0.0))
    }
}

/// One labeled detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub label: String,
    pub confidence: f64,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    /// Detector-derived attributes, e.g. `condition = faded` for signs
    #[serde(default)]
    pub derived_attributes: BTreeMap<String, String>,
}

impl Finding {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence: confidence.clamp(0.0, 1.0),
            bounding_box: None,
            derived_attributes: BTreeMap::new(),
        }
    }

    pub fn with_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.derived_attributes.insert(key.into(), value.into());
        self
    }

    fn render(&self) -> String {
        let mut parts: Vec<String> = self.derived_attributes.values().cloned().collect();
        parts.push(format!("conf {:.2}", self.confidence));
        if let Some(bbox) = &self.bounding_box {
            parts.push(format!("size {}px", bbox.area().round() as i64));
        }
        format!("{} ({})", self.label, parts.join(", "))
    }
}

/// All findings of one category from one Detection call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindingSet {
    pub category: Category,
    pub findings: Vec<Finding>,
}

impl FindingSet {
    pub fn new(category: Category, findings: Vec<Finding>) -> Self {
        Self { category, findings }
    }

    pub fn empty(category: Category) -> Self {
        Self::new(category, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Tagged result of one classifier call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Detection {
    Found(FindingSet),
    ReadError { category: Category, reason: String },
    TimedOut { category: Category },
}

impl Detection {
    pub fn category(&self) -> Category {
        match self {
            Detection::Found(set) => set.category,
            Detection::ReadError { category, .. } | Detection::TimedOut { category } => *category,
        }
    }

    /// Findings, if the classifier produced a usable answer
    pub fn findings(&self) -> Option<&FindingSet> {
        match self {
            Detection::Found(set) => Some(set),
            _ => None,
        }
    }

    /// True only when something was actually detected
    pub fn has_findings(&self) -> bool {
        self.findings().is_some_and(|set| !set.is_empty())
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Detection::Found(_))
    }

    /// Human-readable summary, e.g. `Hazards: pothole (conf 0.91)`
    pub fn render(&self) -> String {
        let heading = self.category().heading();
        match self {
            Detection::Found(set) if set.is_empty() => format!("{}: None", heading),
            Detection::Found(set) => {
                let items: Vec<String> = set.findings.iter().map(Finding::render).collect();
                format!("{}: {}", heading, items.join(" | "))
            }
            Detection::ReadError { .. } => format!("{}: Error reading image", heading),
            Detection::TimedOut { .. } => format!("{}: Detection timed out", heading),
        }
    }
}

/// Urgency tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "HIGH")]
    High,
}

impl Severity {
    /// Parse an exact tier label, case-insensitively
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Severity::Low),
            "MEDIUM" => Some(Severity::Medium),
            "HIGH" => Some(Severity::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured metadata persisted with each record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub location: LocationKey,
    pub image_reference: String,
    pub timestamp: DateTime<Utc>,
    pub hazards: String,
    pub signs: String,
    #[serde(default)]
    pub severity: Option<Severity>,
}

/// Persisted, immutable log entry for one reported observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub record_id: String,
    pub location: LocationKey,
    pub timestamp: DateTime<Utc>,
    pub summary_text: String,
    pub metadata: RecordMetadata,
}

impl MemoryRecord {
    /// Build a record, deriving `record_id` from location and timestamp.
    /// The timestamp is truncated to whole microseconds, the stored precision.
    pub fn new(
        location: LocationKey,
        timestamp: DateTime<Utc>,
        image_reference: impl Into<String>,
        hazards: String,
        signs: String,
        severity: Option<Severity>,
    ) -> Self {
        let timestamp = timestamp.trunc_subsecs(6);
        let record_id = Self::derive_id(&location, timestamp);
        let summary_text = format!("{} | {}", hazards, signs);
        Self {
            record_id,
            location: location.clone(),
            timestamp,
            summary_text,
            metadata: RecordMetadata {
                location,
                image_reference: image_reference.into(),
                timestamp,
                hazards,
                signs,
                severity,
            },
        }
    }

    pub fn derive_id(location: &LocationKey, timestamp: DateTime<Utc>) -> String {
        format!(
            "{}_{}",
            location,
            timestamp.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
        )
    }
}
