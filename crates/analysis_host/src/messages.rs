//! Fixed user-facing strings. Raw error text never reaches the UI.

pub const ANALYSIS_FAILED: &str = "An error occurred during analysis. Please try again.";
pub const DEEP_INSIGHTS_FALLBACK: &str = "Could not generate deep insights.";
pub const CHAT_APOLOGY: &str = "Sorry, I encountered an error. Please try again.";
pub const SEARCH_FAILED: &str = "An error occurred during the search. Please try again.";
pub const CLAIM_MAPPING_INVALID: &str =
    "Failed to get a valid response from the analysis service.";
pub const CLAIM_MAPPING_FAILED: &str = "An error occurred during the claim mapping analysis.";
