//! Query-relevance heuristic: deterministic, stateless, always in `[0, 1]`.

const SUBSTRING_TEXT_SCORE: f32 = 0.9;
const EXACT_TOKEN_WEIGHT: f32 = 1.0;
const PARTIAL_TOKEN_WEIGHT: f32 = 0.5;
const FUZZY_TOKEN_WEIGHT: f32 = 0.3;
const MIN_TOKEN_CHARS: usize = 3;
const FUZZY_MAX_LEN_DELTA: usize = 2;
const FUZZY_MIN_OVERLAP: f32 = 0.7;

/// Scores one query against one text field.
///
/// An empty query is neutral and matches everything. Full-string equality
/// and substring containment short-circuit; otherwise both sides are
/// tokenized and each query token is matched at descending strength (exact,
/// partial containment, positional fuzzy). The final score multiplies
/// coverage by match quality, so partial coverage is penalized
/// quadratically: a single perfect token hit on a two-token query yields
/// 0.25, not 0.5.
#[must_use]
pub fn relevance(query: &str, text: &str) -> f32 {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return 1.0;
    }
    let text = text.trim().to_lowercase();
    if text == query {
        return 1.0;
    }
    if text.contains(&query) {
        return SUBSTRING_TEXT_SCORE;
    }

    // Tokens shorter than the noise floor carry no signal.
    let query_tokens: Vec<&str> = query
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .collect();
    if query_tokens.is_empty() {
        return 0.0;
    }
    let text_tokens: Vec<&str> = text.split_whitespace().collect();

    let mut accumulator = 0.0_f32;
    let mut matched = 0_usize;
    for query_token in &query_tokens {
        if let Some(weight) = token_match_weight(query_token, &text_tokens) {
            accumulator += weight;
            matched += 1;
        }
    }

    let total = usize_to_f32(query_tokens.len());
    ((usize_to_f32(matched) / total) * (accumulator / total)).clamp(0.0, 1.0)
}

/// First success wins: a token matched exactly is never re-evaluated at a
/// weaker tier.
fn token_match_weight(query_token: &str, text_tokens: &[&str]) -> Option<f32> {
    if text_tokens.iter().any(|token| *token == query_token) {
        return Some(EXACT_TOKEN_WEIGHT);
    }
    if text_tokens
        .iter()
        .any(|token| token.contains(query_token) || query_token.contains(token))
    {
        return Some(PARTIAL_TOKEN_WEIGHT);
    }
    if text_tokens
        .iter()
        .any(|token| fuzzy_token_match(query_token, token))
    {
        return Some(FUZZY_TOKEN_WEIGHT);
    }
    None
}

/// Typo tolerance: position-aligned equal characters over the shorter
/// token's length, only attempted when lengths differ by at most two.
fn fuzzy_token_match(a: &str, b: &str) -> bool {
    let a_len = a.chars().count();
    let b_len = b.chars().count();
    if a_len.abs_diff(b_len) > FUZZY_MAX_LEN_DELTA {
        return false;
    }
    let shorter = a_len.min(b_len);
    if shorter == 0 {
        return false;
    }
    let aligned = a
        .chars()
        .zip(b.chars())
        .filter(|(left, right)| left == right)
        .count();
    usize_to_f32(aligned) / usize_to_f32(shorter) >= FUZZY_MIN_OVERLAP
}

#[allow(
    clippy::cast_precision_loss,
    reason = "relevance weights are intentionally lossy floating-point values"
)]
const fn usize_to_f32(value: usize) -> f32 {
    value as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_is_neutral() {
        assert_eq!(relevance("", "anything at all"), 1.0);
        assert_eq!(relevance("   ", "anything"), 1.0);
    }

    #[test]
    fn exact_equality_scores_one() {
        assert_eq!(relevance("Timeout Error", "timeout error"), 1.0);
        assert_eq!(relevance("  rate limit  ", "Rate Limit"), 1.0);
    }

    #[test]
    fn substring_containment_scores_point_nine() {
        assert_eq!(relevance("timeout", "Timeout Error"), 0.9);
        assert_eq!(relevance("rate limit", "API Rate Limit Exceeded"), 0.9);
    }

    #[test]
    fn short_tokens_are_noise_filtered() {
        // All query tokens shorter than three characters are discarded.
        assert_eq!(relevance("a of", "a of things"), 0.9); // substring short-circuit
        assert_eq!(relevance("ab xy", "completely unrelated text"), 0.0);
    }

    #[test]
    fn exact_token_match_beats_partial() {
        // One of two tokens matches exactly: coverage 1/2, quality 1/2.
        let score = relevance("timeout billing", "billing dashboard broken");
        assert!((score - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_containment_matches_either_direction() {
        // "auth" is contained in the text token "authentication"; "error"
        // matches nothing. Coverage 1/2, quality 0.5/2.
        let score = relevance("auth error", "authentication failure");
        assert!((score - 0.125).abs() < f32::EPSILON);
    }

    #[test]
    fn fuzzy_branch_tolerates_transposed_characters() {
        // Same length, 7 of 9 aligned characters.
        let score = relevance("antrhopic", "anthropic rate limits");
        assert!((score - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn fuzzy_branch_requires_close_lengths() {
        // "grpc" vs "garbage" share a prefix but differ in length by three,
        // so the fuzzy tier is never attempted.
        assert_eq!(relevance("grpc", "garbage collection"), 0.0);
    }

    #[test]
    fn score_is_always_within_bounds() {
        let samples = [
            ("timeout error rate limit", "timeout"),
            ("x y z", ""),
            ("quota exceeded", "quota quota quota"),
            ("antrhopic", "anthropic"),
        ];
        for (query, text) in samples {
            let score = relevance(query, text);
            assert!((0.0..=1.0).contains(&score), "{query} vs {text}: {score}");
        }
    }

    #[test]
    fn more_matched_tokens_never_score_lower() {
        // Monotonic coverage: two exact hits outrank one, all else equal.
        let two = relevance("timeout error", "timeout error happened");
        let one = relevance("timeout missing", "timeout error happened");
        assert!(two >= one);
    }
}
