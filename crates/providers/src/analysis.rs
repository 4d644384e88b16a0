//! Patent analysis operations backed by a generative model.
//!
//! Each operation makes exactly one outbound call and resolves to a typed,
//! optional result. The Gemini implementation swallows service failures into
//! `Ok(None)` for every operation except chat, whose errors the caller must
//! handle.

use crate::gemini::{GeminiClient, GenerateContent, GenerateRequest, GenerateResponse, Grounding};
use crate::json_text::parse_json_from_text;
use crate::prompts;
use anyhow::Result;
use async_trait::async_trait;
use shared::agent_api::{ChatMessage, ChatSession};
use shared::patent::{
    ClaimMappingResult, GeoDataPoint, GeoInsights, GeoLocation, PatentDetails, PriorArtDocument,
    PriorArtSearch, PriorArtSearchResult, SimilarPatent, SimilarPatents, Summary,
};
use shared::settings::{AppSettings, GeminiModels};

/// The analysis surface the orchestration layer talks to.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn summarize(&self, patent_text: &str) -> Result<Option<Summary>>;

    async fn find_similar(&self, patent_text: &str) -> Result<Option<SimilarPatents>>;

    /// `location`, when present, biases map retrieval toward the user.
    async fn geo_insights(
        &self,
        patent_text: &str,
        location: Option<GeoLocation>,
    ) -> Result<Option<GeoInsights>>;

    /// Long-form markdown trend analysis.
    async fn deep_insights(&self, patent_text: &str) -> Result<Option<String>>;

    /// Build a session seeded with `initial_history`. No I/O happens here.
    fn create_chat_session(&self, initial_history: Vec<ChatMessage>) -> ChatSession {
        ChatSession::new(initial_history)
    }

    /// Send `message` in the context of `session` and return the model reply.
    async fn send_message(&self, session: &ChatSession, message: &str) -> Result<String>;

    async fn claim_map(
        &self,
        subject_claims: &str,
        reference_claims: &str,
    ) -> Result<Option<ClaimMappingResult>>;

    async fn search_prior_art(&self, query: &str) -> Result<Option<PriorArtSearch>>;
}

/// Loosely typed search hit, classified after parsing.
#[derive(Debug, Default)]
struct RawSearchItem {
    patent_id: Option<String>,
    title: Option<String>,
    abstract_text: Option<String>,
    filing_date: Option<String>,
    description: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Read a field as text. Numbers become their decimal text; other non-strings
/// count as missing.
fn text_field(item: &serde_json::Value, key: &str) -> Option<String> {
    match item.get(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl RawSearchItem {
    fn from_value(item: &serde_json::Value) -> Self {
        Self {
            patent_id: text_field(item, "patentId"),
            title: text_field(item, "title"),
            abstract_text: text_field(item, "abstract"),
            filing_date: text_field(item, "filingDate"),
            description: text_field(item, "description"),
        }
    }

    /// A hit is a patent lookup only when ID, abstract and filing date are
    /// all present; anything else is treated as a generic document.
    fn classify(self) -> PriorArtSearchResult {
        let title = self.title.unwrap_or_default();
        match (
            non_empty(self.patent_id),
            non_empty(self.abstract_text),
            non_empty(self.filing_date),
        ) {
            (Some(patent_id), Some(abstract_text), Some(filing_date)) => {
                PriorArtSearchResult::PatentDetails(PatentDetails {
                    patent_id,
                    title,
                    abstract_text,
                    filing_date,
                })
            }
            _ => PriorArtSearchResult::PriorArtDocument(PriorArtDocument {
                title,
                description: self.description.unwrap_or_default(),
            }),
        }
    }
}

fn similar_from_response(response: GenerateResponse) -> SimilarPatents {
    SimilarPatents {
        patents: parse_json_from_text::<Vec<SimilarPatent>>(&response.text).unwrap_or_default(),
        sources: response.sources,
    }
}

fn geo_from_response(response: GenerateResponse) -> GeoInsights {
    GeoInsights {
        data: parse_json_from_text::<Vec<GeoDataPoint>>(&response.text).unwrap_or_default(),
        sources: response.sources,
    }
}

fn search_from_response(response: GenerateResponse) -> PriorArtSearch {
    let items =
        parse_json_from_text::<Vec<serde_json::Value>>(&response.text).unwrap_or_default();
    PriorArtSearch {
        results: items
            .iter()
            .filter(|item| item.is_object())
            .map(|item| RawSearchItem::from_value(item).classify())
            .collect(),
        sources: response.sources,
    }
}

/// [`AnalysisProvider`] over the Gemini `generateContent` API.
pub struct GeminiAnalysisProvider<G = GeminiClient> {
    generator: G,
    models: GeminiModels,
    thinking_budget: u32,
}

impl GeminiAnalysisProvider<GeminiClient> {
    pub fn from_settings(settings: &AppSettings) -> Result<Self> {
        Ok(Self::new(
            GeminiClient::from_settings(settings)?,
            settings.gemini.models.clone(),
            settings.gemini.thinking_budget,
        ))
    }
}

impl<G: GenerateContent> GeminiAnalysisProvider<G> {
    pub fn new(generator: G, models: GeminiModels, thinking_budget: u32) -> Self {
        Self {
            generator,
            models,
            thinking_budget,
        }
    }

    /// One attempt; a failed call is logged and reported as absent.
    async fn generate_or_absent(
        &self,
        operation: &'static str,
        request: GenerateRequest,
    ) -> Option<GenerateResponse> {
        match self.generator.generate(&request).await {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::warn!(operation, model = %request.model, "Gemini call failed: {e:#}");
                None
            }
        }
    }
}

#[async_trait]
impl<G: GenerateContent> AnalysisProvider for GeminiAnalysisProvider<G> {
    async fn summarize(&self, patent_text: &str) -> Result<Option<Summary>> {
        let request =
            GenerateRequest::prompt(&self.models.fast, prompts::summary_prompt(patent_text))
                .with_json_schema(prompts::summary_schema());
        Ok(self
            .generate_or_absent("summarize", request)
            .await
            .and_then(|r| parse_json_from_text(&r.text)))
    }

    async fn find_similar(&self, patent_text: &str) -> Result<Option<SimilarPatents>> {
        let request = GenerateRequest::prompt(
            &self.models.grounded,
            prompts::similar_patents_prompt(patent_text),
        )
        .with_grounding(Grounding::Search);
        Ok(self
            .generate_or_absent("find_similar", request)
            .await
            .map(similar_from_response))
    }

    async fn geo_insights(
        &self,
        patent_text: &str,
        location: Option<GeoLocation>,
    ) -> Result<Option<GeoInsights>> {
        let request = GenerateRequest::prompt(
            &self.models.grounded,
            prompts::geo_insights_prompt(patent_text),
        )
        .with_grounding(Grounding::Maps)
        .with_location(location);
        Ok(self
            .generate_or_absent("geo_insights", request)
            .await
            .map(geo_from_response))
    }

    async fn deep_insights(&self, patent_text: &str) -> Result<Option<String>> {
        let request = GenerateRequest::prompt(
            &self.models.reasoning,
            prompts::deep_insights_prompt(patent_text),
        )
        .with_thinking_budget(self.thinking_budget);
        Ok(self
            .generate_or_absent("deep_insights", request)
            .await
            .map(|r| r.text)
            .filter(|text| !text.trim().is_empty()))
    }

    async fn send_message(&self, session: &ChatSession, message: &str) -> Result<String> {
        let mut contents = session.history.clone();
        contents.push(ChatMessage::user(message));
        let request = GenerateRequest::from_history(&self.models.chat, contents);
        let response = self.generator.generate(&request).await?;
        Ok(response.text)
    }

    async fn claim_map(
        &self,
        subject_claims: &str,
        reference_claims: &str,
    ) -> Result<Option<ClaimMappingResult>> {
        let request = GenerateRequest::prompt(
            &self.models.reasoning,
            prompts::claim_mapping_prompt(subject_claims, reference_claims),
        )
        .with_json_schema(prompts::claim_mapping_schema());
        Ok(self
            .generate_or_absent("claim_map", request)
            .await
            .and_then(|r| parse_json_from_text(&r.text)))
    }

    async fn search_prior_art(&self, query: &str) -> Result<Option<PriorArtSearch>> {
        let request =
            GenerateRequest::prompt(&self.models.grounded, prompts::prior_art_prompt(query))
                .with_grounding(Grounding::Search);
        Ok(self
            .generate_or_absent("search_prior_art", request)
            .await
            .map(search_from_response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use parking_lot::Mutex;
    use shared::agent_api::ChatRole;
    use shared::patent::GroundingSource;

    /// Replays a canned reply and records every request it sees.
    struct CannedGenerator {
        reply: Result<GenerateResponse, String>,
        seen: Mutex<Vec<GenerateRequest>>,
    }

    impl CannedGenerator {
        fn text(text: &str) -> Self {
            Self::with_sources(text, Vec::new())
        }

        fn with_sources(text: &str, sources: Vec<GroundingSource>) -> Self {
            Self {
                reply: Ok(GenerateResponse {
                    text: text.to_string(),
                    sources,
                }),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err("503 Service Unavailable".to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerateContent for CannedGenerator {
        async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
            self.seen.lock().push(request.clone());
            self.reply.clone().map_err(|e| anyhow!(e))
        }
    }

    fn provider(generator: CannedGenerator) -> GeminiAnalysisProvider<CannedGenerator> {
        GeminiAnalysisProvider::new(generator, GeminiModels::default(), 32768)
    }

    fn source(uri: &str) -> GroundingSource {
        GroundingSource {
            uri: uri.to_string(),
            title: "t".to_string(),
        }
    }

    #[tokio::test]
    async fn test_summarize_parses_fenced_json() {
        let p = provider(CannedGenerator::text(
            "```json\n{\"problem\":\"P\",\"novelty\":\"N\",\"solution\":\"S\"}\n```",
        ));
        let summary = p.summarize("text").await.unwrap().unwrap();
        assert_eq!(summary.problem, "P");

        let seen = p.generator.seen.lock();
        assert_eq!(seen[0].model, "gemini-flash-lite-latest");
        assert!(seen[0].response_schema.is_some());
    }

    #[tokio::test]
    async fn test_summarize_absent_on_garbage_or_failure() {
        let p = provider(CannedGenerator::text("I cannot help with that."));
        assert!(p.summarize("text").await.unwrap().is_none());

        let p = provider(CannedGenerator::failing());
        assert!(p.summarize("text").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_similar_keeps_sources_when_text_is_unparseable() {
        let p = provider(CannedGenerator::with_sources(
            "no json here",
            vec![source("https://a.example")],
        ));
        let similar = p.find_similar("text").await.unwrap().unwrap();
        assert!(similar.patents.is_empty());
        assert_eq!(similar.sources.len(), 1);
        assert_eq!(p.generator.seen.lock()[0].grounding, Some(Grounding::Search));
    }

    #[tokio::test]
    async fn test_geo_location_bias_only_when_present() {
        let p = provider(CannedGenerator::text(r#"[{"country":"Japan","score":88}]"#));
        let loc = GeoLocation {
            latitude: 35.0,
            longitude: 139.0,
        };
        let with = p.geo_insights("text", Some(loc)).await.unwrap().unwrap();
        assert_eq!(with.data[0].country, "Japan");
        p.geo_insights("text", None).await.unwrap();

        let seen = p.generator.seen.lock();
        assert_eq!(seen[0].location, Some(loc));
        assert_eq!(seen[0].grounding, Some(Grounding::Maps));
        assert_eq!(seen[1].location, None);
    }

    #[tokio::test]
    async fn test_deep_insights_uses_thinking_budget() {
        let p = provider(CannedGenerator::text("## Trends"));
        assert_eq!(p.deep_insights("text").await.unwrap().as_deref(), Some("## Trends"));
        let seen = p.generator.seen.lock();
        assert_eq!(seen[0].thinking_budget, Some(32768));
        assert_eq!(seen[0].model, "gemini-2.5-pro");
    }

    #[tokio::test]
    async fn test_deep_insights_blank_reply_is_absent() {
        let p = provider(CannedGenerator::text(""));
        assert_eq!(p.deep_insights("text").await.unwrap(), None);

        let p = provider(CannedGenerator::text("  \n "));
        assert_eq!(p.deep_insights("text").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_send_message_replays_history() {
        let p = provider(CannedGenerator::text("Sure."));
        let session = p.create_chat_session(vec![
            ChatMessage::user("seed"),
            ChatMessage::model("ack"),
        ]);
        assert_eq!(p.send_message(&session, "question").await.unwrap(), "Sure.");

        let seen = p.generator.seen.lock();
        let contents = &seen[0].contents;
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1].role, ChatRole::Model);
        assert_eq!(contents[2], ChatMessage::user("question"));
        // The session itself is untouched; the caller records the exchange.
        assert_eq!(session.history.len(), 2);
    }

    #[tokio::test]
    async fn test_send_message_propagates_failure() {
        let p = provider(CannedGenerator::failing());
        let session = p.create_chat_session(Vec::new());
        assert!(p.send_message(&session, "question").await.is_err());
    }

    #[tokio::test]
    async fn test_claim_map_absent_on_wrong_shape() {
        let p = provider(CannedGenerator::text(r#"{"category":"Obviousness"}"#));
        assert!(p.claim_map("a", "b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_reclassifies_items() {
        let p = provider(CannedGenerator::text(
            r#"```json
            [
              {"patentId":"US9634960B2","title":"Widget","abstract":"A widget.","filingDate":"2014-03-01"},
              {"patentId":"US1","title":"Partial","abstract":"Missing date"},
              {"title":"Paper","description":"About widgets"},
              {"patentId":"US2","abstract":"","filingDate":"2001","description":"empty abstract"}
            ]
            ```"#,
        ));
        let search = p.search_prior_art("widgets").await.unwrap().unwrap();
        assert_eq!(search.results.len(), 4);
        assert!(matches!(
            &search.results[0],
            PriorArtSearchResult::PatentDetails(d) if d.patent_id == "US9634960B2"
        ));
        assert!(matches!(
            &search.results[1],
            PriorArtSearchResult::PriorArtDocument(d) if d.title == "Partial" && d.description.is_empty()
        ));
        assert!(matches!(
            &search.results[2],
            PriorArtSearchResult::PriorArtDocument(d) if d.description == "About widgets"
        ));
        assert!(matches!(
            &search.results[3],
            PriorArtSearchResult::PriorArtDocument(d) if d.title.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_search_tolerates_numeric_fields() {
        let p = provider(CannedGenerator::text(
            r#"[
              {"patentId":9634960,"title":"Numeric","abstract":"A widget.","filingDate":2014},
              {"patentId":true,"title":"Odd","description":"kept"},
              "stray string",
              {"title":"Paper","description":"About widgets"}
            ]"#,
        ));
        let search = p.search_prior_art("widgets").await.unwrap().unwrap();
        assert_eq!(search.results.len(), 3);
        assert!(matches!(
            &search.results[0],
            PriorArtSearchResult::PatentDetails(d)
                if d.patent_id == "9634960" && d.filing_date == "2014"
        ));
        assert!(matches!(
            &search.results[1],
            PriorArtSearchResult::PriorArtDocument(d) if d.title == "Odd" && d.description == "kept"
        ));
        assert_eq!(search.results[2].title(), "Paper");
    }

    #[tokio::test]
    async fn test_search_absent_on_service_failure() {
        let p = provider(CannedGenerator::failing());
        assert!(p.search_prior_art("widgets").await.unwrap().is_none());
    }
}
