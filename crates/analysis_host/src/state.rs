//! Session state: the single source of truth the UI renders from.

use shared::agent_api::{ChatMessage, ChatSession};
use shared::patent::{
    AnalysisResult, ClaimMappingResult, GeoLocation, GroundingSource, PriorArtSearchResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    InitialAnalysis,
    DeepInsights,
    Chat,
    PriorArtSearch,
    ClaimMapping,
}

impl OperationKind {
    pub fn all() -> &'static [OperationKind] {
        &[
            OperationKind::InitialAnalysis,
            OperationKind::DeepInsights,
            OperationKind::Chat,
            OperationKind::PriorArtSearch,
            OperationKind::ClaimMapping,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::InitialAnalysis => "initial_analysis",
            OperationKind::DeepInsights => "deep_insights",
            OperationKind::Chat => "chat",
            OperationKind::PriorArtSearch => "prior_art_search",
            OperationKind::ClaimMapping => "claim_mapping",
        }
    }
}

/// Lifecycle of one operation. Only `Idle → Pending → Settled` (and
/// `Settled → Pending` on re-run) are legal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Pending,
    Settled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationStatus {
    initial_analysis: Phase,
    deep_insights: Phase,
    chat: Phase,
    prior_art_search: Phase,
    claim_mapping: Phase,
}

impl OperationStatus {
    pub fn get(&self, kind: OperationKind) -> Phase {
        match kind {
            OperationKind::InitialAnalysis => self.initial_analysis,
            OperationKind::DeepInsights => self.deep_insights,
            OperationKind::Chat => self.chat,
            OperationKind::PriorArtSearch => self.prior_art_search,
            OperationKind::ClaimMapping => self.claim_mapping,
        }
    }

    pub fn set(&mut self, kind: OperationKind, phase: Phase) {
        let slot = match kind {
            OperationKind::InitialAnalysis => &mut self.initial_analysis,
            OperationKind::DeepInsights => &mut self.deep_insights,
            OperationKind::Chat => &mut self.chat,
            OperationKind::PriorArtSearch => &mut self.prior_art_search,
            OperationKind::ClaimMapping => &mut self.claim_mapping,
        };
        *slot = phase;
    }

    pub fn is_pending(&self, kind: OperationKind) -> bool {
        self.get(kind) == Phase::Pending
    }

    pub fn any_pending(&self) -> bool {
        OperationKind::all().iter().any(|k| self.is_pending(*k))
    }
}

/// Three-way result of one adapter call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ready(T),
    /// The call ran but produced nothing usable.
    Absent,
    /// The call raised an error.
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn from_result(result: anyhow::Result<Option<T>>) -> Self {
        match result {
            Ok(Some(value)) => Outcome::Ready(value),
            Ok(None) => Outcome::Absent,
            Err(e) => Outcome::Failed(format!("{e:#}")),
        }
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Which input surface is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    #[default]
    Analyze,
    Search,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub results: Option<Vec<PriorArtSearchResult>>,
    pub sources: Option<Vec<GroundingSource>>,
    pub error: Option<String>,
}

/// What the prior-art results panel should show.
#[derive(Debug, PartialEq, Eq)]
pub enum SearchView<'a> {
    /// No search has produced anything yet.
    Hidden,
    Failed(&'a str),
    NoResults,
    Results {
        results: &'a [PriorArtSearchResult],
        sources: &'a [GroundingSource],
    },
}

impl SearchState {
    /// The error takes priority over any results that are also set.
    pub fn view(&self) -> SearchView<'_> {
        let Some(results) = self.results.as_deref() else {
            return SearchView::Hidden;
        };
        if let Some(error) = self.error.as_deref() {
            return SearchView::Failed(error);
        }
        if results.is_empty() {
            return SearchView::NoResults;
        }
        SearchView::Results {
            results,
            sources: self.sources.as_deref().unwrap_or(&[]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimMappingState {
    pub subject_claims: String,
    pub reference_claims: String,
    pub result: Option<ClaimMappingResult>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub input_text: String,
    pub location: Option<GeoLocation>,
    pub search_mode: SearchMode,
    pub status: OperationStatus,
    pub analysis_result: Option<AnalysisResult>,
    pub chat_history: Vec<ChatMessage>,
    /// Present iff an analysis has succeeded since the last reset.
    pub chat_session: Option<ChatSession>,
    pub search: SearchState,
    pub claim_mapping: ClaimMappingState,
    pub last_error: Option<String>,
}

impl SessionState {
    pub fn is_pending(&self, kind: OperationKind) -> bool {
        self.status.is_pending(kind)
    }

    pub fn can_analyze(&self) -> bool {
        !self.input_text.trim().is_empty() && !self.is_pending(OperationKind::InitialAnalysis)
    }

    pub fn can_request_deep_insights(&self) -> bool {
        self.analysis_result.is_some()
            && !self.input_text.trim().is_empty()
            && !self.is_pending(OperationKind::DeepInsights)
    }

    pub fn can_chat(&self) -> bool {
        self.chat_session.is_some() && !self.is_pending(OperationKind::Chat)
    }

    pub fn can_search(&self) -> bool {
        !self.search.query.trim().is_empty() && !self.is_pending(OperationKind::PriorArtSearch)
    }

    pub fn can_map_claims(&self) -> bool {
        !self.claim_mapping.subject_claims.trim().is_empty()
            && !self.claim_mapping.reference_claims.trim().is_empty()
            && !self.is_pending(OperationKind::ClaimMapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use shared::patent::PriorArtDocument;

    #[test]
    fn test_status_slots_are_disjoint() {
        let mut status = OperationStatus::default();
        status.set(OperationKind::Chat, Phase::Pending);

        assert!(status.is_pending(OperationKind::Chat));
        assert!(status.any_pending());
        for kind in OperationKind::all() {
            if *kind != OperationKind::Chat {
                assert_eq!(status.get(*kind), Phase::Idle, "{}", kind.as_str());
            }
        }
    }

    #[test]
    fn test_outcome_from_result() {
        assert_eq!(Outcome::from_result(Ok(Some(1))), Outcome::Ready(1));
        assert_eq!(Outcome::<i32>::from_result(Ok(None)), Outcome::Absent);
        assert!(matches!(
            Outcome::<i32>::from_result(Err(anyhow!("boom"))),
            Outcome::Failed(msg) if msg == "boom"
        ));
    }

    #[test]
    fn test_search_view_priority() {
        let mut search = SearchState::default();
        assert_eq!(search.view(), SearchView::Hidden);

        search.results = Some(Vec::new());
        assert_eq!(search.view(), SearchView::NoResults);

        search.results = Some(vec![PriorArtSearchResult::PriorArtDocument(
            PriorArtDocument {
                title: "t".into(),
                description: "d".into(),
            },
        )]);
        assert!(matches!(search.view(), SearchView::Results { sources, .. } if sources.is_empty()));

        search.error = Some("failed".into());
        assert_eq!(search.view(), SearchView::Failed("failed"));
    }

    #[test]
    fn test_guards() {
        let mut state = SessionState::default();
        assert!(!state.can_analyze());
        state.input_text = "   \n".into();
        assert!(!state.can_analyze());
        state.input_text = "patent".into();
        assert!(state.can_analyze());

        assert!(!state.can_chat());
        assert!(!state.can_request_deep_insights());
        state.analysis_result = Some(AnalysisResult::default());
        assert!(state.can_request_deep_insights());

        state.claim_mapping.subject_claims = "claims".into();
        assert!(!state.can_map_claims());
        state.claim_mapping.reference_claims = "reference".into();
        assert!(state.can_map_claims());
    }
}
