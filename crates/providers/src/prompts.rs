//! Prompt templates and response schemas for patent analysis calls.

use serde_json::{json, Value};

pub fn summary_prompt(patent_text: &str) -> String {
    format!(
        "Summarize the following patent description. Focus on the core problem, the novelty of \
         the invention, and the proposed solution. Respond in JSON format.\n\
         Patent: \"{patent_text}\""
    )
}

pub fn summary_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "problem": { "type": "STRING", "description": "The problem the invention solves." },
            "novelty": { "type": "STRING", "description": "The key novelty of the invention." },
            "solution": { "type": "STRING", "description": "The proposed solution." }
        },
        "required": ["problem", "novelty", "solution"]
    })
}

pub fn similar_patents_prompt(patent_text: &str) -> String {
    format!(
        "Based on the following patent description, find and list up to 5 similar existing \
         patents, prior art, or related technologies. For each, provide a title and a brief \
         description. Respond ONLY with a valid JSON array of objects, where each object has \
         \"title\" and \"description\" keys.\n\
         Patent: \"{patent_text}\""
    )
}

pub fn geo_insights_prompt(patent_text: &str) -> String {
    format!(
        "Analyze the following invention description and identify the top 5 countries or \
         regions leading innovation in this technological domain. For each, provide a relative \
         innovation score from 1 to 100. Respond ONLY with a valid JSON array of objects, where \
         each object has \"country\" and \"score\" keys.\n\
         Invention: \"{patent_text}\""
    )
}

pub fn deep_insights_prompt(patent_text: &str) -> String {
    format!(
        "Provide a deep analysis of innovation trends related to the following invention. \
         Compare it with existing technologies, identify potential future developments, and \
         discuss market opportunities. Format your response in clear markdown.\n\
         Invention: \"{patent_text}\""
    )
}

pub fn claim_mapping_prompt(subject_claims: &str, reference_disclosure: &str) -> String {
    format!(
        "You are an expert patent analyst. Perform a claim mapping analysis between a subject \
         patent and a reference patent (prior art).\n\
         1. Analyze: Read the claims of the subject patent and the disclosure of the reference patent.\n\
         2. Map: For each claim in the subject patent, identify if its elements are disclosed in the reference patent.\n\
         3. Categorize: Determine the reference's relevance (e.g., 'Anticipation (§ 102)', 'Obviousness (§ 103)', 'Supporting Reference').\n\
         4. Rationale: Provide a detailed explanation for your categorization.\n\
         5. JSON Output: Respond ONLY with a valid JSON object.\n\
         \n\
         Subject Patent Claims:\n---\n{subject_claims}\n---\n\
         \n\
         Reference Patent Disclosure:\n---\n{reference_disclosure}\n---"
    )
}

pub fn claim_mapping_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "category": {
                "type": "STRING",
                "description": "e.g., 'Anticipation (§ 102)', 'Obviousness (§ 103)'"
            },
            "rationale": { "type": "STRING", "description": "Detailed explanation for the category." },
            "mappings": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "subjectClaim": { "type": "STRING", "description": "e.g., 'Claim 1'" },
                        "referenceDisclosure": {
                            "type": "STRING",
                            "description": "e.g., 'Figure 3 and para [0045]'"
                        },
                        "description": {
                            "type": "STRING",
                            "description": "Explanation of the mapping for this claim."
                        }
                    },
                    "required": ["subjectClaim", "referenceDisclosure", "description"]
                }
            }
        },
        "required": ["category", "rationale", "mappings"]
    })
}

/// Search-grounded calls cannot carry a response schema, so the expected
/// shape is spelled out in the instruction instead.
pub fn prior_art_prompt(query: &str) -> String {
    format!(
        "You are a patent search assistant. The user has provided a search query.\n\
         - If the query looks like a patent ID (e.g., \"US9634960B2\", \"EP1234567A1\"), use \
         Google Search to find that specific patent. Return an array with a single object \
         containing the patent's \"patentId\", \"title\", \"abstract\", and \"filingDate\".\n\
         - If the query is a general keyword search (e.g., \"machine learning for image \
         recognition\"), find up to 3 relevant prior art documents. For each, return an object \
         with its \"title\" and a \"description\".\n\
         - Respond ONLY with a valid JSON array.\n\
         \n\
         Query: \"{query}\""
    )
}

/// Synthetic opening turn that hands the analyzed patent to the chat model.
pub fn chat_seed_message(patent_text: &str) -> String {
    format!("Here is the patent I want to discuss:\n\n{patent_text}")
}

pub const CHAT_SEED_REPLY: &str =
    "Thank you. I have analyzed the patent. How can I help you further?";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_input() {
        assert!(summary_prompt("A rotating widget").contains("Patent: \"A rotating widget\""));
        assert!(geo_insights_prompt("gizmo").contains("Invention: \"gizmo\""));
        assert!(prior_art_prompt("US9634960B2").ends_with("Query: \"US9634960B2\""));

        let mapping = claim_mapping_prompt("Claim 1: a lever", "Fig. 2 shows a lever");
        let subject_at = mapping.find("Claim 1: a lever").unwrap();
        let reference_at = mapping.find("Fig. 2 shows a lever").unwrap();
        assert!(subject_at < reference_at);
    }

    #[test]
    fn test_schemas_require_all_fields() {
        assert_eq!(
            summary_schema()["required"],
            json!(["problem", "novelty", "solution"])
        );
        let mapping = claim_mapping_schema();
        assert_eq!(
            mapping["properties"]["mappings"]["items"]["required"],
            json!(["subjectClaim", "referenceDisclosure", "description"])
        );
    }

    #[test]
    fn test_chat_seed() {
        assert_eq!(
            chat_seed_message("text"),
            "Here is the patent I want to discuss:\n\ntext"
        );
    }
}
