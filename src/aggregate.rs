//! Merge the two search result sets into the agent-facing answer.

use crate::models::{AggregatedAnswer, ChunkResult, DocumentResult, SearchEnvelope};

/// Pair the document envelope with the top-ranked chunk.
///
/// The document envelope is passed through untouched. Only the first chunk
/// (as ranked by the backend) is kept; an empty chunk set yields `None`.
pub fn aggregate(
    docs: SearchEnvelope<DocumentResult>,
    chunks: SearchEnvelope<ChunkResult>,
) -> AggregatedAnswer {
    AggregatedAnswer {
        best_document: docs,
        best_chunk: chunks.results.into_iter().next(),
    }
}
