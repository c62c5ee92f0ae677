// Route candidate generation
// Enumerates the direct path and one bridged path per configured bridge token
//
// Numan Thabit 2025 Nov

use crate::router::routes::{CandidatePath, TokenDescriptor};

/// Candidate paths in priority order: direct first, then bridges in configured order.
///
/// A bridge equal to either endpoint is skipped. Pool existence is not checked here.
pub fn generate_candidates(
    token_in: &TokenDescriptor,
    token_out: &TokenDescriptor,
    bridges: &[TokenDescriptor],
) -> Vec<CandidatePath> {
    let mut candidates = Vec::with_capacity(bridges.len() + 1);
    candidates.push(CandidatePath::direct(token_in.clone(), token_out.clone()));
    candidates.extend(
        bridges
            .iter()
            .filter(|bridge| *bridge != token_in && *bridge != token_out)
            .map(|bridge| CandidatePath::bridged(token_in.clone(), bridge.clone(), token_out.clone())),
    );
    candidates
}
