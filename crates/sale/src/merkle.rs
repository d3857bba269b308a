//! Merkle whitelist verification.
//!
//! Leaves are `keccak256` of the candidate's raw 20 address bytes. Interior
//! nodes hash the two children after ordering them bytewise, so a proof is just
//! the list of sibling digests from the leaf upwards with no left/right flags.
//!
//! The verifier never builds trees; roots and proofs are produced off-chain.

use alloy_primitives::{keccak256, Address, B256};

/// Computes the leaf digest for a whitelisted address.
#[inline]
pub fn leaf_hash(candidate: Address) -> B256 {
    keccak256(candidate.as_slice())
}

/// Commutative pairwise hash: the smaller digest is hashed first.
#[inline]
pub fn hash_pair(a: B256, b: B256) -> B256 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(lo.as_slice());
    preimage[32..].copy_from_slice(hi.as_slice());
    keccak256(preimage)
}

/// Folds `proof` over `leaf`, returning the root it implies.
pub fn process_proof(leaf: B256, proof: &[B256]) -> B256 {
    proof
        .iter()
        .fold(leaf, |computed, sibling| hash_pair(computed, *sibling))
}

/// Returns true if `proof` links `candidate` to `root`.
///
/// Absence from the whitelist is a plain `false`; this never errors and has no
/// dependency on the sale phase.
pub fn verify(candidate: Address, proof: &[B256], root: B256) -> bool {
    process_proof(leaf_hash(candidate), proof) == root
}
