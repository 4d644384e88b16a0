use crate::state::{OperationKind, Outcome, SearchMode};
use shared::agent_api::{ChatMessage, ChatSession};
use shared::patent::{
    ClaimMappingResult, GeoInsights, GeoLocation, PriorArtSearch, SimilarPatents, Summary,
};

/// Joined output of the three top-level producers.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialAnalysis {
    pub summary: Option<Summary>,
    pub similar_patents: Option<SimilarPatents>,
    pub geo_insights: Option<GeoInsights>,
    /// Seeded conversation shown in the chat panel.
    pub chat_history: Vec<ChatMessage>,
    /// Session created from the same seeded conversation.
    pub chat_session: ChatSession,
}

/// Everything that can change the session: user intents and completions.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetInputText(String),
    SetLocation(Option<GeoLocation>),
    SetSearchMode(SearchMode),
    SetSearchQuery(String),
    SetSubjectClaims(String),
    SetReferenceClaims(String),
    DismissError,

    StartAnalysis,
    RequestDeepInsights,
    SendChat(String),
    StartSearch,
    StartClaimMapping,

    /// `Err` carries the reason the join failed.
    AnalysisSettled(Result<InitialAnalysis, String>),
    DeepInsightsSettled(Outcome<String>),
    ChatSettled {
        message: String,
        outcome: Outcome<String>,
    },
    SearchSettled(Outcome<PriorArtSearch>),
    ClaimMappingSettled(Outcome<ClaimMappingResult>),
}

/// Outbound work requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    RunInitialAnalysis {
        text: String,
        location: Option<GeoLocation>,
    },
    RunDeepInsights {
        text: String,
    },
    RunChat {
        session: ChatSession,
        message: String,
    },
    RunSearch {
        query: String,
    },
    RunClaimMapping {
        subject: String,
        reference: String,
    },
}

impl Effect {
    pub fn kind(&self) -> OperationKind {
        match self {
            Effect::RunInitialAnalysis { .. } => OperationKind::InitialAnalysis,
            Effect::RunDeepInsights { .. } => OperationKind::DeepInsights,
            Effect::RunChat { .. } => OperationKind::Chat,
            Effect::RunSearch { .. } => OperationKind::PriorArtSearch,
            Effect::RunClaimMapping { .. } => OperationKind::ClaimMapping,
        }
    }

    /// The completion to dispatch when this effect dies without producing one.
    pub fn failure(&self, reason: impl Into<String>) -> Action {
        let reason = reason.into();
        match self {
            Effect::RunInitialAnalysis { .. } => Action::AnalysisSettled(Err(reason)),
            Effect::RunDeepInsights { .. } => Action::DeepInsightsSettled(Outcome::Failed(reason)),
            Effect::RunChat { message, .. } => Action::ChatSettled {
                message: message.clone(),
                outcome: Outcome::Failed(reason),
            },
            Effect::RunSearch { .. } => Action::SearchSettled(Outcome::Failed(reason)),
            Effect::RunClaimMapping { .. } => Action::ClaimMappingSettled(Outcome::Failed(reason)),
        }
    }
}
