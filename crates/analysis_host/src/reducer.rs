//! Pure state transitions.
//!
//! `reduce` never performs I/O. Guards that fail (blank input, operation
//! already pending, missing chat session) return the state untouched and no
//! effect. A completion is only applied while its operation is `Pending`;
//! one arriving after a reset is dropped.

use crate::action::{Action, Effect, InitialAnalysis};
use crate::messages;
use crate::state::{OperationKind, Outcome, Phase, SearchMode, SessionState};
use providers::prompts::{chat_seed_message, CHAT_SEED_REPLY};
use shared::agent_api::ChatMessage;
use shared::patent::AnalysisResult;

/// Opening exchange for the chat assistant after an analysis.
pub fn seed_chat_history(patent_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::user(chat_seed_message(patent_text)),
        ChatMessage::model(CHAT_SEED_REPLY),
    ]
}

pub fn reduce(mut state: SessionState, action: Action) -> (SessionState, Option<Effect>) {
    match action {
        Action::SetInputText(text) => {
            state.claim_mapping.subject_claims = text.clone();
            state.input_text = text;
        }
        Action::SetLocation(location) => state.location = location,
        Action::SetSearchMode(mode) => state.search_mode = mode,
        Action::SetSearchQuery(query) => state.search.query = query,
        Action::SetSubjectClaims(claims) => state.claim_mapping.subject_claims = claims,
        Action::SetReferenceClaims(claims) => state.claim_mapping.reference_claims = claims,
        Action::DismissError => state.last_error = None,

        Action::StartAnalysis => return start_analysis(state),
        Action::RequestDeepInsights => {
            if !state.can_request_deep_insights() {
                return (state, None);
            }
            state
                .status
                .set(OperationKind::DeepInsights, Phase::Pending);
            let effect = Effect::RunDeepInsights {
                text: state.input_text.clone(),
            };
            return (state, Some(effect));
        }
        Action::SendChat(message) => {
            if message.trim().is_empty() || state.is_pending(OperationKind::Chat) {
                return (state, None);
            }
            let Some(session) = state.chat_session.clone() else {
                return (state, None);
            };
            state.chat_history.push(ChatMessage::user(message.clone()));
            state.status.set(OperationKind::Chat, Phase::Pending);
            return (state, Some(Effect::RunChat { session, message }));
        }
        Action::StartSearch => {
            if !state.can_search() {
                return (state, None);
            }
            state.search.results = None;
            state.search.sources = None;
            state.search.error = None;
            state.last_error = None;
            state.search_mode = SearchMode::Search;
            state
                .status
                .set(OperationKind::PriorArtSearch, Phase::Pending);
            let effect = Effect::RunSearch {
                query: state.search.query.clone(),
            };
            return (state, Some(effect));
        }
        Action::StartClaimMapping => {
            if !state.can_map_claims() {
                return (state, None);
            }
            state.claim_mapping.result = None;
            state.claim_mapping.error = None;
            state
                .status
                .set(OperationKind::ClaimMapping, Phase::Pending);
            let effect = Effect::RunClaimMapping {
                subject: state.claim_mapping.subject_claims.clone(),
                reference: state.claim_mapping.reference_claims.clone(),
            };
            return (state, Some(effect));
        }

        completion => {
            let kind = completion_kind(&completion);
            if !state.is_pending(kind) {
                tracing::debug!(operation = kind.as_str(), "Dropping stale completion");
                return (state, None);
            }
            apply_completion(&mut state, completion);
            state.status.set(kind, Phase::Settled);
        }
    }
    (state, None)
}

fn start_analysis(state: SessionState) -> (SessionState, Option<Effect>) {
    if !state.can_analyze() {
        return (state, None);
    }
    let text = state.input_text;
    let location = state.location;

    let mut next = SessionState {
        input_text: text.clone(),
        location,
        ..SessionState::default()
    };
    next.claim_mapping.subject_claims = text.clone();
    next.status
        .set(OperationKind::InitialAnalysis, Phase::Pending);

    (next, Some(Effect::RunInitialAnalysis { text, location }))
}

fn completion_kind(action: &Action) -> OperationKind {
    match action {
        Action::DeepInsightsSettled(_) => OperationKind::DeepInsights,
        Action::ChatSettled { .. } => OperationKind::Chat,
        Action::SearchSettled(_) => OperationKind::PriorArtSearch,
        Action::ClaimMappingSettled(_) => OperationKind::ClaimMapping,
        _ => OperationKind::InitialAnalysis,
    }
}

fn apply_completion(state: &mut SessionState, completion: Action) {
    match completion {
        Action::AnalysisSettled(Ok(InitialAnalysis {
            summary,
            similar_patents,
            geo_insights,
            chat_history,
            chat_session,
        })) => {
            state.analysis_result = Some(AnalysisResult {
                summary,
                similar_patents,
                geo_insights,
                deep_trends: None,
            });
            state.chat_history = chat_history;
            state.chat_session = Some(chat_session);
        }
        Action::AnalysisSettled(Err(_)) => {
            state.last_error = Some(messages::ANALYSIS_FAILED.to_string());
        }
        Action::DeepInsightsSettled(outcome) => {
            let text = outcome
                .ready()
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| messages::DEEP_INSIGHTS_FALLBACK.to_string());
            if let Some(result) = state.analysis_result.as_mut() {
                result.deep_trends = Some(text);
            }
        }
        Action::ChatSettled { message, outcome } => match outcome {
            Outcome::Ready(reply) => {
                state.chat_history.push(ChatMessage::model(reply.clone()));
                if let Some(session) = state.chat_session.as_mut() {
                    session.record_exchange(message, reply);
                }
            }
            Outcome::Absent | Outcome::Failed(_) => {
                state
                    .chat_history
                    .push(ChatMessage::model(messages::CHAT_APOLOGY));
            }
        },
        Action::SearchSettled(outcome) => match outcome {
            Outcome::Ready(search) => {
                state.search.results = Some(search.results);
                state.search.sources = Some(search.sources);
            }
            Outcome::Absent => {
                state.search.results = Some(Vec::new());
                state.search.sources = Some(Vec::new());
            }
            Outcome::Failed(_) => {
                state.search.error = Some(messages::SEARCH_FAILED.to_string());
                state.search.results = Some(Vec::new());
            }
        },
        Action::ClaimMappingSettled(outcome) => match outcome {
            Outcome::Ready(result) => state.claim_mapping.result = Some(result),
            Outcome::Absent => {
                state.claim_mapping.error = Some(messages::CLAIM_MAPPING_INVALID.to_string());
            }
            Outcome::Failed(_) => {
                state.claim_mapping.error = Some(messages::CLAIM_MAPPING_FAILED.to_string());
            }
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SearchView;
    use shared::agent_api::{ChatRole, ChatSession};
    use shared::patent::{
        ClaimMappingResult, GeoInsights, GeoLocation, PriorArtDocument, PriorArtSearch,
        PriorArtSearchResult, SimilarPatents, Summary,
    };

    fn apply(state: SessionState, action: Action) -> SessionState {
        reduce(state, action).0
    }

    fn summary() -> Summary {
        Summary {
            problem: "P".into(),
            novelty: "N".into(),
            solution: "S".into(),
        }
    }

    fn analyzed(text: &str) -> SessionState {
        let state = apply(SessionState::default(), Action::SetInputText(text.into()));
        let state = apply(state, Action::StartAnalysis);
        let history = seed_chat_history(text);
        apply(
            state,
            Action::AnalysisSettled(Ok(InitialAnalysis {
                summary: Some(summary()),
                similar_patents: Some(SimilarPatents::default()),
                geo_insights: Some(GeoInsights::default()),
                chat_session: ChatSession::new(history.clone()),
                chat_history: history,
            })),
        )
    }

    #[test]
    fn test_blank_input_analysis_is_noop() {
        let state = apply(SessionState::default(), Action::SetInputText("  \t\n".into()));
        let (next, effect) = reduce(state.clone(), Action::StartAnalysis);
        assert_eq!(next, state);
        assert!(effect.is_none());
    }

    #[test]
    fn test_start_analysis_resets_but_keeps_input_and_location() {
        let mut state = analyzed("widget");
        state.location = Some(GeoLocation {
            latitude: 1.0,
            longitude: 2.0,
        });
        state.search.query = "old".into();
        state.last_error = Some("old".into());
        state.status.set(OperationKind::Chat, Phase::Settled);

        let (next, effect) = reduce(state, Action::StartAnalysis);

        assert_eq!(next.input_text, "widget");
        assert!(next.location.is_some());
        assert_eq!(next.claim_mapping.subject_claims, "widget");
        assert!(next.analysis_result.is_none());
        assert!(next.chat_history.is_empty());
        assert!(next.chat_session.is_none());
        assert!(next.search.query.is_empty());
        assert!(next.last_error.is_none());
        assert_eq!(next.status.get(OperationKind::Chat), Phase::Idle);
        assert!(next.is_pending(OperationKind::InitialAnalysis));
        assert!(matches!(
            effect,
            Some(Effect::RunInitialAnalysis { text, location: Some(_) }) if text == "widget"
        ));
    }

    #[test]
    fn test_analysis_not_reentered_while_pending() {
        let state = apply(SessionState::default(), Action::SetInputText("x".into()));
        let state = apply(state, Action::StartAnalysis);
        let (next, effect) = reduce(state.clone(), Action::StartAnalysis);
        assert_eq!(next, state);
        assert!(effect.is_none());
    }

    #[test]
    fn test_analysis_success_seeds_chat() {
        let state = analyzed("widget");

        let result = state.analysis_result.as_ref().unwrap();
        assert_eq!(result.summary, Some(summary()));
        assert!(result.deep_trends.is_none());
        assert_eq!(state.chat_history.len(), 2);
        assert_eq!(state.chat_history[0].role, ChatRole::User);
        assert!(state.chat_history[0].content.ends_with("widget"));
        assert_eq!(state.chat_session.as_ref().unwrap().history, state.chat_history);
        assert_eq!(state.status.get(OperationKind::InitialAnalysis), Phase::Settled);
    }

    #[test]
    fn test_analysis_failure_commits_nothing() {
        let state = apply(SessionState::default(), Action::SetInputText("x".into()));
        let state = apply(state, Action::StartAnalysis);
        let state = apply(state, Action::AnalysisSettled(Err("network".into())));

        assert_eq!(state.last_error.as_deref(), Some(messages::ANALYSIS_FAILED));
        assert!(state.analysis_result.is_none());
        assert!(state.chat_session.is_none());
        assert!(state.chat_history.is_empty());
        assert_eq!(state.status.get(OperationKind::InitialAnalysis), Phase::Settled);

        let state = apply(state, Action::DismissError);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_deep_insights_requires_analysis() {
        let state = apply(SessionState::default(), Action::SetInputText("x".into()));
        let (next, effect) = reduce(state, Action::RequestDeepInsights);
        assert!(effect.is_none());
        assert!(!next.is_pending(OperationKind::DeepInsights));
    }

    #[test]
    fn test_deep_insights_fallback_for_absent_failed_and_blank() {
        for outcome in [
            Outcome::Absent,
            Outcome::Failed("boom".into()),
            Outcome::Ready("  ".into()),
        ] {
            let (state, effect) = reduce(analyzed("x"), Action::RequestDeepInsights);
            assert!(matches!(effect, Some(Effect::RunDeepInsights { .. })));
            let state = apply(state, Action::DeepInsightsSettled(outcome));
            assert_eq!(
                state.analysis_result.unwrap().deep_trends.as_deref(),
                Some(messages::DEEP_INSIGHTS_FALLBACK)
            );
            assert_eq!(state.status.get(OperationKind::DeepInsights), Phase::Settled);
        }

        let state = apply(analyzed("x"), Action::RequestDeepInsights);
        let state = apply(state, Action::DeepInsightsSettled(Outcome::Ready("## Trends".into())));
        assert_eq!(
            state.analysis_result.unwrap().deep_trends.as_deref(),
            Some("## Trends")
        );
    }

    #[test]
    fn test_chat_requires_session_and_text() {
        let state = SessionState::default();
        let (next, effect) = reduce(state.clone(), Action::SendChat("hi".into()));
        assert_eq!(next, state);
        assert!(effect.is_none());

        let state = analyzed("x");
        let (next, effect) = reduce(state.clone(), Action::SendChat("   ".into()));
        assert_eq!(next, state);
        assert!(effect.is_none());
    }

    #[test]
    fn test_chat_round_trip_appends_two() {
        let (state, effect) = reduce(analyzed("x"), Action::SendChat("question".into()));
        assert_eq!(state.chat_history.len(), 3);
        assert!(state.is_pending(OperationKind::Chat));
        assert!(matches!(
            effect,
            Some(Effect::RunChat { ref session, ref message }) if session.history.len() == 2 && message == "question"
        ));

        // A second message while pending is rejected.
        let (state, effect) = reduce(state, Action::SendChat("again".into()));
        assert!(effect.is_none());
        assert_eq!(state.chat_history.len(), 3);

        let state = apply(
            state,
            Action::ChatSettled {
                message: "question".into(),
                outcome: Outcome::Ready("answer".into()),
            },
        );
        assert_eq!(state.chat_history.len(), 4);
        assert_eq!(state.chat_history[2], ChatMessage::user("question"));
        assert_eq!(state.chat_history[3], ChatMessage::model("answer"));
        assert_eq!(state.chat_session.as_ref().unwrap().history.len(), 4);
        assert_eq!(state.status.get(OperationKind::Chat), Phase::Settled);
    }

    #[test]
    fn test_chat_failure_appends_apology() {
        let state = apply(analyzed("x"), Action::SendChat("question".into()));
        let state = apply(
            state,
            Action::ChatSettled {
                message: "question".into(),
                outcome: Outcome::Failed("503".into()),
            },
        );
        assert_eq!(state.chat_history.len(), 4);
        assert_eq!(state.chat_history[3], ChatMessage::model(messages::CHAT_APOLOGY));
        // The failed turn never reached the server-side conversation.
        assert_eq!(state.chat_session.as_ref().unwrap().history.len(), 2);
    }

    #[test]
    fn test_stale_chat_completion_dropped_after_reset() {
        let state = apply(analyzed("x"), Action::SendChat("question".into()));
        let state = apply(state, Action::StartAnalysis);
        let state = apply(
            state,
            Action::ChatSettled {
                message: "question".into(),
                outcome: Outcome::Ready("late".into()),
            },
        );
        assert!(state.chat_history.is_empty());
        assert!(state.is_pending(OperationKind::InitialAnalysis));
    }

    #[test]
    fn test_search_lifecycle() {
        let state = apply(SessionState::default(), Action::SetSearchQuery("  ".into()));
        let (state, effect) = reduce(state, Action::StartSearch);
        assert!(effect.is_none());

        let mut state = apply(state, Action::SetSearchQuery("widgets".into()));
        state.last_error = Some("stale".into());
        state.search.error = Some("stale".into());
        let (state, effect) = reduce(state, Action::StartSearch);
        assert!(matches!(effect, Some(Effect::RunSearch { ref query }) if query == "widgets"));
        assert_eq!(state.search_mode, SearchMode::Search);
        assert!(state.last_error.is_none());
        assert_eq!(state.search.view(), SearchView::Hidden);

        let hit = PriorArtSearchResult::PriorArtDocument(PriorArtDocument {
            title: "Paper".into(),
            description: String::new(),
        });
        let state = apply(
            state,
            Action::SearchSettled(Outcome::Ready(PriorArtSearch {
                results: vec![hit.clone()],
                sources: Vec::new(),
            })),
        );
        assert_eq!(state.search.results, Some(vec![hit]));
        assert_eq!(state.search.sources, Some(Vec::new()));
        assert!(!state.is_pending(OperationKind::PriorArtSearch));
    }

    #[test]
    fn test_search_failure_forces_empty_results() {
        let state = apply(SessionState::default(), Action::SetSearchQuery("q".into()));
        let state = apply(state, Action::StartSearch);
        let state = apply(state, Action::SearchSettled(Outcome::Failed("boom".into())));

        assert_eq!(state.search.results, Some(Vec::new()));
        assert_eq!(state.search.sources, None);
        assert_eq!(state.search.error.as_deref(), Some(messages::SEARCH_FAILED));
        assert_eq!(state.search.view(), SearchView::Failed(messages::SEARCH_FAILED));
        assert_eq!(state.status.get(OperationKind::PriorArtSearch), Phase::Settled);
    }

    #[test]
    fn test_search_absent_is_empty_success() {
        let state = apply(SessionState::default(), Action::SetSearchQuery("q".into()));
        let state = apply(state, Action::StartSearch);
        let state = apply(state, Action::SearchSettled(Outcome::Absent));
        assert_eq!(state.search.view(), SearchView::NoResults);
        assert!(state.search.error.is_none());
    }

    #[test]
    fn test_claim_mapping_outcomes() {
        let base = apply(SessionState::default(), Action::SetSubjectClaims("Claim 1".into()));
        let (_, effect) = reduce(base.clone(), Action::StartClaimMapping);
        assert!(effect.is_none(), "reference claims are blank");

        let base = apply(base, Action::SetReferenceClaims("Fig. 1".into()));

        let state = apply(base.clone(), Action::StartClaimMapping);
        let state = apply(state, Action::ClaimMappingSettled(Outcome::Absent));
        assert_eq!(
            state.claim_mapping.error.as_deref(),
            Some(messages::CLAIM_MAPPING_INVALID)
        );
        assert!(state.claim_mapping.result.is_none());

        // A rerun clears the previous error.
        let (state, effect) = reduce(state, Action::StartClaimMapping);
        assert!(state.claim_mapping.error.is_none());
        assert!(matches!(
            effect,
            Some(Effect::RunClaimMapping { ref subject, ref reference }) if subject == "Claim 1" && reference == "Fig. 1"
        ));
        let state = apply(state, Action::ClaimMappingSettled(Outcome::Failed("x".into())));
        assert_eq!(
            state.claim_mapping.error.as_deref(),
            Some(messages::CLAIM_MAPPING_FAILED)
        );

        let result = ClaimMappingResult {
            category: "Anticipation (§ 102)".into(),
            rationale: "r".into(),
            mappings: Vec::new(),
        };
        let state = apply(base, Action::StartClaimMapping);
        let state = apply(state, Action::ClaimMappingSettled(Outcome::Ready(result.clone())));
        assert_eq!(state.claim_mapping.result, Some(result));
        assert_eq!(state.status.get(OperationKind::ClaimMapping), Phase::Settled);
    }

    #[test]
    fn test_input_text_mirrors_into_subject_claims() {
        let state = apply(SessionState::default(), Action::SetInputText("abc".into()));
        assert_eq!(state.claim_mapping.subject_claims, "abc");
        let state = apply(state, Action::SetSubjectClaims("edited".into()));
        assert_eq!(state.input_text, "abc");
        assert_eq!(state.claim_mapping.subject_claims, "edited");
    }
}
