//! Explanation requesters backed by generative-AI providers.

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiExplainer;
pub use prompt::explanation_prompt;
