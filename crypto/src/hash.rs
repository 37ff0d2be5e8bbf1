//! Blake2b hashing for proposals and timelock operations.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use quorum_types::{Call, OperationId, ProposalId, Salt};

type Blake2b256 = Blake2b<U32>;

const PROPOSAL_DOMAIN: &[u8] = b"quorum-proposal-v1";
const OPERATION_DOMAIN: &[u8] = b"quorum-operation-v1";

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash a human-readable proposal description.
pub fn hash_description(description: &str) -> [u8; 32] {
    blake2b_256(description.as_bytes())
}

/// Proposal id: hash of (targets, values, datas, description hash).
///
/// Call order is part of the preimage.
pub fn hash_proposal(calls: &[Call], description_hash: &[u8; 32]) -> ProposalId {
    let mut hasher = Blake2b256::new();
    hasher.update(PROPOSAL_DOMAIN);
    update_calls(&mut hasher, calls);
    hasher.update(description_hash);
    ProposalId::new(finish(hasher))
}

/// Timelock operation id: hash of (targets, values, datas, predecessor, salt).
pub fn hash_operation(calls: &[Call], predecessor: Option<&OperationId>, salt: &Salt) -> OperationId {
    let mut hasher = Blake2b256::new();
    hasher.update(OPERATION_DOMAIN);
    update_calls(&mut hasher, calls);
    match predecessor {
        Some(p) => {
            hasher.update([1u8]);
            hasher.update(p.as_bytes());
        }
        None => hasher.update([0u8]),
    }
    hasher.update(salt);
    OperationId::new(finish(hasher))
}

fn update_calls(hasher: &mut Blake2b256, calls: &[Call]) {
    hasher.update((calls.len() as u64).to_le_bytes());
    for call in calls {
        hasher.update(call.target.as_bytes());
        hasher.update(call.value.to_le_bytes());
        hasher.update((call.data.len() as u64).to_le_bytes());
        hasher.update(&call.data);
    }
}

fn finish(hasher: Blake2b256) -> [u8; 32] {
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_types::Account;

    fn call(label: &str, data: &[u8]) -> Call {
        Call::new(Account::from_label(label), 0, data.to_vec())
    }

    #[test]
    fn proposal_id_is_deterministic() {
        let calls = vec![call("box", &[1, 2, 3])];
        let desc = hash_description("Proposal #1");
        assert_eq!(hash_proposal(&calls, &desc), hash_proposal(&calls, &desc));
    }

    #[test]
    fn proposal_id_depends_on_description() {
        let calls = vec![call("box", &[1])];
        let a = hash_proposal(&calls, &hash_description("Proposal #1"));
        let b = hash_proposal(&calls, &hash_description("Proposal #2"));
        assert_ne!(a, b);
    }

    #[test]
    fn proposal_id_depends_on_call_order() {
        let desc = hash_description("batch");
        let forward = vec![call("a", &[1]), call("b", &[2])];
        let reversed = vec![call("b", &[2]), call("a", &[1])];
        assert_ne!(hash_proposal(&forward, &desc), hash_proposal(&reversed, &desc));
    }

    #[test]
    fn data_boundaries_are_unambiguous() {
        let desc = hash_description("batch");
        let split_one = vec![call("a", &[1, 2]), call("a", &[3])];
        let split_two = vec![call("a", &[1]), call("a", &[2, 3])];
        assert_ne!(hash_proposal(&split_one, &desc), hash_proposal(&split_two, &desc));
    }

    #[test]
    fn operation_id_depends_on_predecessor_and_salt() {
        let calls = vec![call("box", &[9])];
        let salt = [7u8; 32];
        let none = hash_operation(&calls, None, &salt);
        let pred = OperationId::new([1u8; 32]);
        assert_ne!(none, hash_operation(&calls, Some(&pred), &salt));
        assert_ne!(none, hash_operation(&calls, None, &[8u8; 32]));
    }

    #[test]
    fn operation_and_proposal_domains_differ() {
        let calls = vec![call("box", &[9])];
        let salt = hash_description("x");
        let p = hash_proposal(&calls, &salt);
        let o = hash_operation(&calls, None, &salt);
        assert_ne!(p.as_bytes(), o.as_bytes());
    }
}
