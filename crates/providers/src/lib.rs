pub mod analysis;
pub mod gemini;
pub mod json_text;
pub mod prompts;

pub use analysis::{AnalysisProvider, GeminiAnalysisProvider};
pub use gemini::{GeminiClient, GeminiError, GenerateContent, GenerateRequest, GenerateResponse, Grounding};
