//! Patent analysis result types.
//!
//! Wire names follow the JSON the generative service is asked to produce, so
//! these types double as the parse targets for structured responses.

use serde::{Deserialize, Serialize};

/// A citation attached to a retrieval-grounded response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

impl GroundingSource {
    /// Text to show for a link; falls back to the uri when the title is empty.
    pub fn label(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.uri
        } else {
            &self.title
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub problem: String,
    pub novelty: String,
    pub solution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarPatent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarPatents {
    pub patents: Vec<SimilarPatent>,
    pub sources: Vec<GroundingSource>,
}

/// Relative innovation score for one country or region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoDataPoint {
    pub country: String,
    /// Nominally 1 to 100.
    pub score: f64,
}

impl GeoDataPoint {
    /// Score as a 0.0..=1.0 fraction for bar rendering.
    pub fn bar_fraction(&self) -> f32 {
        if !self.score.is_finite() {
            return 0.0;
        }
        (self.score / 100.0).clamp(0.0, 1.0) as f32
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoInsights {
    pub data: Vec<GeoDataPoint>,
    pub sources: Vec<GroundingSource>,
}

/// Accumulates sub-results as their producing calls resolve.
///
/// A `None` field means the result was never requested or its producer
/// came back empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: Option<Summary>,
    pub similar_patents: Option<SimilarPatents>,
    pub geo_insights: Option<GeoInsights>,
    pub deep_trends: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimMapping {
    pub subject_claim: String,
    pub reference_disclosure: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimMappingResult {
    /// e.g. "Anticipation (§ 102)" or "Obviousness (§ 103)"
    pub category: String,
    pub rationale: String,
    pub mappings: Vec<ClaimMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatentDetails {
    pub patent_id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub filing_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorArtDocument {
    pub title: String,
    pub description: String,
}

/// One prior-art search hit: either a specific patent looked up by ID or a
/// document found by keyword search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PriorArtSearchResult {
    PatentDetails(PatentDetails),
    PriorArtDocument(PriorArtDocument),
}

impl PriorArtSearchResult {
    pub fn title(&self) -> &str {
        match self {
            PriorArtSearchResult::PatentDetails(p) => &p.title,
            PriorArtSearchResult::PriorArtDocument(d) => &d.title,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorArtSearch {
    pub results: Vec<PriorArtSearchResult>,
    pub sources: Vec<GroundingSource>,
}

/// A latitude/longitude pair used to bias map-grounded retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    /// Parse `"lat,lng"`; rejects out-of-range coordinates.
    pub fn parse(value: &str) -> Option<Self> {
        let (lat, lng) = value.split_once(',')?;
        let latitude: f64 = lat.trim().parse().ok()?;
        let longitude: f64 = lng.trim().parse().ok()?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }
}
