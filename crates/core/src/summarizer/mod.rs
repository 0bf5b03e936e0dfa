mod openai;
mod prompt;
mod types;

pub use openai::OpenAiSummarizer;
pub use prompt::{build_prompt, parse_segments};
pub use types::{SummarizeError, Summarizer, SummaryRequest, SummarySegment};
