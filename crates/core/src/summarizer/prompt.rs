use regex_lite::Regex;
use serde::Deserialize;

use super::types::{SummarizeError, SummaryRequest, SummarySegment};

pub const SYSTEM_PROMPT: &str =
    "You are a financial analyst who summarizes earnings call transcripts for short social media threads.";

/// Character budget for fallback packing. Below the usual platform limit so
/// packed segments survive the publisher's pre-flight check.
const FALLBACK_SEGMENT_CHARS: usize = 260;

/// Builds the user prompt for one transcript.
pub fn build_prompt(request: &SummaryRequest) -> String {
    let n = request.segment_count;
    format!(
        r#"You are analyzing an earnings call transcript for a market summary bot.

Company: {name} ({symbol})
Fiscal period: {period}
Transcript: {locator}

Write a {n}-post thread summarizing the key points of this earnings call, covering in order:

1. Overall results (revenue, EPS, growth)
2. Key financial metrics and performance highlights
3. Management commentary on business outlook
4. Strategic initiatives and market positioning
5. Guidance for upcoming quarters and years

Condense or expand that outline as needed to produce exactly {n} posts.

Format your response as a JSON object with a "posts" array of exactly {n} objects, each with a "post" field containing the post text. Example:

{{
  "posts": [
    {{"post": "Summary post 1"}},
    {{"post": "Summary post 2"}}
  ]
}}

Keep each post under 280 characters including hashtags."#,
        name = request.company_name,
        symbol = request.symbol,
        period = request.period,
        locator = request.locator,
    )
}

#[derive(Debug, Deserialize)]
struct SegmentsReply {
    posts: Vec<SegmentItem>,
}

#[derive(Debug, Deserialize)]
struct SegmentItem {
    post: String,
}

/// Extracts the thread segments from a model reply.
///
/// A reply containing a JSON object must decode to the requested shape;
/// braces that do not parse are an error, not a fallback case. A plain-prose
/// reply is packed into at most `requested` sentence chunks instead.
pub fn parse_segments(
    reply: &str,
    requested: u32,
) -> Result<Vec<SummarySegment>, SummarizeError> {
    let segments = match extract_json(reply) {
        Some(json) => {
            let parsed: SegmentsReply = serde_json::from_str(json)
                .map_err(|e| SummarizeError::Decode(e.to_string()))?;
            parsed
                .posts
                .into_iter()
                .map(|item| item.post.trim().to_string())
                .filter(|text| !text.is_empty())
                .collect()
        }
        None => fallback_split(reply, requested as usize),
    };
    if segments.is_empty() {
        return Err(SummarizeError::EmptyReply);
    }
    Ok(segments
        .into_iter()
        .enumerate()
        .map(|(i, text)| SummarySegment {
            ordinal: i as u32 + 1,
            text,
        })
        .collect())
}

/// First-brace-to-last-brace span, so fenced or prose-wrapped JSON still
/// gets found.
fn extract_json(text: &str) -> Option<&str> {
    let re = Regex::new(r"(?s)\{.*\}").ok()?;
    re.find(text).map(|m| m.as_str())
}

/// Packs sentences into at most `n` chunks of bounded length. Text beyond
/// the last chunk is dropped.
fn fallback_split(text: &str, n: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for sentence in text.split(". ") {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }
        let added = if current.is_empty() {
            sentence.chars().count()
        } else {
            sentence.chars().count() + 2
        };
        if current.chars().count() + added > FALLBACK_SEGMENT_CHARS && !current.is_empty() {
            chunks.push(current);
            if chunks.len() == n {
                return chunks;
            }
            current = String::new();
        }
        if !current.is_empty() {
            current.push_str(". ");
        }
        current.push_str(sentence);
    }
    if !current.is_empty() && chunks.len() < n {
        chunks.push(current);
    }
    chunks
}
