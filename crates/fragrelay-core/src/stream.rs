//! Chunk planning for emulated streaming.
//!
//! The fragment service returns one completed answer; the streaming mode
//! of the OpenAI surface is pure presentation. This module decides where
//! the text is cut. The pacing delay between chunks lives in the policy
//! too so the HTTP adapter and the tests share one knob; the adapter owns
//! the actual sleeping.

use std::time::Duration;

use rand::Rng;

/// Scheduling policy for emulated streaming.
///
/// Chunk sizes are drawn uniformly from `min_size..=max_size` code units.
/// With `min_size == max_size` the plan is deterministic, which is what
/// the tests use (together with a zero delay).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPolicy {
    pub min_size: usize,
    pub max_size: usize,
    /// Pause between chunk emissions. Presentation artifact, not
    /// backpressure.
    pub delay: Duration,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            min_size: 15,
            max_size: 29,
            delay: Duration::from_millis(50),
        }
    }
}

impl ChunkPolicy {
    /// Fixed-size, zero-delay policy for deterministic tests.
    #[must_use]
    pub const fn fixed(size: usize) -> Self {
        Self {
            min_size: size,
            max_size: size,
            delay: Duration::ZERO,
        }
    }
}

/// Split `text` into consecutive chunks according to `policy`.
///
/// Chunks cover the text exactly, in order; the final chunk is whatever
/// remains. Cut points are pushed forward to the nearest char boundary so
/// multi-byte text never splits mid-character. Empty input yields an empty
/// plan.
#[must_use]
pub fn chunk_plan<'a>(text: &'a str, policy: &ChunkPolicy) -> Vec<&'a str> {
    let min = policy.min_size.max(1);
    let max = policy.max_size.max(min);
    let mut rng = rand::thread_rng();

    let mut chunks = Vec::new();
    let mut cursor = 0;
    while cursor < text.len() {
        let size = if min == max {
            min
        } else {
            rng.gen_range(min..=max)
        };
        let mut end = (cursor + size).min(text.len());
        while !text.is_char_boundary(end) {
            end += 1;
        }
        chunks.push(&text[cursor..end]);
        cursor = end;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_cover_text_in_order() {
        let text = "a".repeat(100);
        let plan = chunk_plan(&text, &ChunkPolicy::default());
        assert_eq!(plan.concat(), text);
    }

    #[test]
    fn test_chunk_count_within_bounds_for_len_100() {
        // len 100, sizes 15..=29 -> between ceil(100/29)=4 and
        // ceil(100/15)=7 chunks
        let text = "x".repeat(100);
        for _ in 0..50 {
            let plan = chunk_plan(&text, &ChunkPolicy::default());
            assert!((4..=7).contains(&plan.len()), "got {} chunks", plan.len());
            assert_eq!(plan.iter().map(|c| c.len()).sum::<usize>(), 100);
        }
    }

    #[test]
    fn test_fixed_policy_is_deterministic() {
        let text = "0123456789abcdef";
        let plan = chunk_plan(text, &ChunkPolicy::fixed(5));
        assert_eq!(plan, vec!["01234", "56789", "abcde", "f"]);
    }

    #[test]
    fn test_multibyte_text_never_splits_mid_char() {
        let text = "héllo wörld ünïcödé ".repeat(10);
        let plan = chunk_plan(&text, &ChunkPolicy::default());
        assert_eq!(plan.concat(), text);
        for chunk in plan {
            assert!(std::str::from_utf8(chunk.as_bytes()).is_ok());
        }
    }

    #[test]
    fn test_empty_text_yields_empty_plan() {
        assert!(chunk_plan("", &ChunkPolicy::default()).is_empty());
    }

    #[test]
    fn test_degenerate_policy_is_clamped() {
        let policy = ChunkPolicy {
            min_size: 0,
            max_size: 0,
            delay: Duration::ZERO,
        };
        let plan = chunk_plan("ab", &policy);
        assert_eq!(plan, vec!["a", "b"]);
    }
}
