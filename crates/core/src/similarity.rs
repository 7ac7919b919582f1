//! Embedding similarity and prior-context matching.
//!
//! Used to associate an explanation with the earlier stretch of the
//! lecture that best covers the same material.

use crate::types::{TranscriptChunk, VideoId};

/// Number of candidate chunks immediately before the viewer's position
/// that are never proposed; they are what the viewer just watched.
pub const TRAILING_CHUNKS_EXCLUDED: usize = 4;

/// Cosine similarity of two embeddings.
///
/// Returns `None` for mismatched dimensions, empty vectors or a zero-norm
/// operand.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Best-matching chunk and its similarity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkMatch<'a> {
    pub chunk: &'a TranscriptChunk,
    pub similarity: f64,
}

/// Find the transcript chunk before the viewer's position that is most
/// similar to `embedding`.
///
/// Candidates are chunks of earlier videos, or of `video_id` starting
/// before `timestamp`, ordered by `(video_id, chunk_index)`. The last
/// [`TRAILING_CHUNKS_EXCLUDED`] candidates are skipped. Ties keep the
/// earliest candidate.
pub fn best_prior_match<'a>(
    chunks: &'a [TranscriptChunk],
    video_id: VideoId,
    timestamp: f64,
    embedding: &[f32],
) -> Option<ChunkMatch<'a>> {
    let mut candidates: Vec<&TranscriptChunk> = chunks
        .iter()
        .filter(|c| c.video_id < video_id || (c.video_id == video_id && c.start_time < timestamp))
        .collect();
    candidates.sort_by_key(|c| (c.video_id, c.chunk_index));

    let usable = candidates.len().saturating_sub(TRAILING_CHUNKS_EXCLUDED);
    let mut best: Option<ChunkMatch<'a>> = None;
    for chunk in candidates[..usable].iter().copied() {
        let Some(similarity) = cosine_similarity(embedding, &chunk.embedding) else {
            continue;
        };
        match best {
            Some(b) if similarity <= b.similarity => {}
            _ => best = Some(ChunkMatch { chunk, similarity }),
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(video_id: VideoId, chunk_index: i64, start_time: f64, embedding: Vec<f32>) -> TranscriptChunk {
        TranscriptChunk {
            video_id,
            chunk_index,
            start_time,
            embedding,
        }
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let sim = cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(sim.abs() < 1e-12);
    }

    #[test]
    fn cosine_rejects_bad_input() {
        assert!(cosine_similarity(&[1.0], &[1.0, 2.0]).is_none());
        assert!(cosine_similarity(&[], &[]).is_none());
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).is_none());
    }

    #[test]
    fn picks_most_similar_earlier_chunk() {
        let mut chunks = vec![
            chunk(0, 0, 0.0, vec![0.0, 1.0]),
            chunk(0, 1, 10.0, vec![1.0, 0.0]),
            chunk(0, 2, 20.0, vec![0.5, 0.5]),
        ];
        // Four filler chunks that fall into the excluded tail.
        for i in 0..4 {
            chunks.push(chunk(1, i, i as f64 * 10.0, vec![1.0, 0.0]));
        }

        let found = best_prior_match(&chunks, 1, 100.0, &[1.0, 0.0]).unwrap();
        assert_eq!((found.chunk.video_id, found.chunk.chunk_index), (0, 1));
    }

    #[test]
    fn trailing_candidates_are_excluded() {
        let chunks: Vec<_> = (0..4).map(|i| chunk(0, i, i as f64, vec![1.0])).collect();
        assert!(best_prior_match(&chunks, 0, 100.0, &[1.0]).is_none());
    }

    #[test]
    fn later_chunks_of_current_video_are_not_candidates() {
        let mut chunks: Vec<_> = (0..5).map(|i| chunk(0, i, i as f64, vec![0.0, 1.0])).collect();
        chunks.push(chunk(0, 5, 50.0, vec![1.0, 0.0]));
        chunks.push(chunk(2, 0, 0.0, vec![1.0, 0.0]));

        let found = best_prior_match(&chunks, 0, 10.0, &[1.0, 0.0]).unwrap();
        assert_eq!(found.chunk.chunk_index, 0);
    }

    #[test]
    fn ties_keep_the_earliest_candidate() {
        let chunks: Vec<_> = (0..7).map(|i| chunk(0, i, i as f64, vec![1.0, 1.0])).collect();
        let found = best_prior_match(&chunks, 0, 100.0, &[1.0, 1.0]).unwrap();
        assert_eq!(found.chunk.chunk_index, 0);
    }

    #[test]
    fn unordered_input_is_sorted_before_trimming_tail() {
        let chunks = vec![
            chunk(0, 4, 40.0, vec![1.0, 0.0]),
            chunk(0, 0, 0.0, vec![0.0, 1.0]),
            chunk(0, 3, 30.0, vec![1.0, 0.0]),
            chunk(0, 2, 20.0, vec![1.0, 0.0]),
            chunk(0, 1, 10.0, vec![1.0, 0.0]),
        ];
        // Only chunk 0 survives the tail exclusion.
        let found = best_prior_match(&chunks, 0, 100.0, &[1.0, 0.0]).unwrap();
        assert_eq!(found.chunk.chunk_index, 0);
    }
}
