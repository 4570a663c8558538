//! Native Poseidon hash over bn254.
//!
//! This implementation walks halo2-base's `OptimizedPoseidonSpec`
//! directly so host-side hashes (request ids, oracle key hashes, string
//! commitments, pending-tree nodes) are bit-exact with the in-circuit
//! hasher in `zkfeed-circuit`.

use halo2_base::poseidon::hasher::spec::OptimizedPoseidonSpec;
use halo2curves_axiom::bn256::Fr;
use halo2curves_axiom::ff::{Field, PrimeField};
use once_cell::sync::Lazy;
use zkfeed_circuit::gadgets::poseidon::{
    POSEIDON_FULL_ROUNDS, POSEIDON_PARTIAL_ROUNDS, POSEIDON_RATE, POSEIDON_T,
};

static POSEIDON_SPEC: Lazy<OptimizedPoseidonSpec<Fr, POSEIDON_T, POSEIDON_RATE>> = Lazy::new(|| {
    OptimizedPoseidonSpec::new::<POSEIDON_FULL_ROUNDS, POSEIDON_PARTIAL_ROUNDS, 0>()
});

/// Fixed-length Poseidon hash matching the circuit's
/// `hash_fix_len_array` for the same input length.
pub fn poseidon_hash(inputs: &[Fr]) -> Fr {
    let spec = &*POSEIDON_SPEC;
    let mut state = [Fr::ZERO; POSEIDON_T];
    state[0] = Fr::from_u128(1u128 << 64);

    for chunk in inputs.chunks(POSEIDON_RATE) {
        poseidon_permutation(&mut state, chunk, spec);
    }

    if inputs.len() % POSEIDON_RATE == 0 {
        poseidon_permutation(&mut state, &[], spec);
    }

    state[1]
}

fn poseidon_permutation(
    state: &mut [Fr; POSEIDON_T],
    inputs: &[Fr],
    spec: &OptimizedPoseidonSpec<Fr, POSEIDON_T, POSEIDON_RATE>,
) {
    let r_f = spec.r_f() / 2;
    let constants = spec.constants();
    let matrices = spec.mds_matrices();
    let start = constants.start();

    absorb_with_pre_constants(state, inputs, &start[0]);

    for coeffs in start.iter().skip(1).take(r_f - 1) {
        sbox_full(state, coeffs);
        apply_mds(state, matrices.mds().as_ref());
    }

    if let Some(last) = start.last() {
        sbox_full(state, last);
    }
    apply_mds(state, matrices.pre_sparse_mds().as_ref());

    for (constant, sparse) in constants
        .partial()
        .iter()
        .zip(matrices.sparse_matrices().iter())
    {
        sbox_part(state, constant);
        apply_sparse_mds(state, sparse.row(), sparse.col_hat());
    }

    for coeffs in constants.end().iter() {
        sbox_full(state, coeffs);
        apply_mds(state, matrices.mds().as_ref());
    }

    sbox_full(state, &[Fr::ZERO; POSEIDON_T]);
    apply_mds(state, matrices.mds().as_ref());
}

fn absorb_with_pre_constants(
    state: &mut [Fr; POSEIDON_T],
    inputs: &[Fr],
    pre_constants: &[Fr; POSEIDON_T],
) {
    assert!(inputs.len() < POSEIDON_T);

    state[0] += pre_constants[0];
    for (idx, input) in inputs.iter().enumerate() {
        state[idx + 1] += *input + pre_constants[idx + 1];
    }

    let offset = inputs.len() + 1;
    for (i, idx) in (offset..POSEIDON_T).enumerate() {
        let mut addend = pre_constants[idx];
        if i == 0 {
            addend += Fr::ONE;
        }
        state[idx] += addend;
    }
}

fn sbox_full(state: &mut [Fr; POSEIDON_T], constants: &[Fr; POSEIDON_T]) {
    for (value, constant) in state.iter_mut().zip(constants.iter()) {
        *value = value.pow_vartime([5]) + constant;
    }
}

fn sbox_part(state: &mut [Fr; POSEIDON_T], constant: &Fr) {
    state[0] = state[0].pow_vartime([5]) + constant;
}

fn apply_mds(state: &mut [Fr; POSEIDON_T], matrix: &[[Fr; POSEIDON_T]; POSEIDON_T]) {
    let current = *state;
    let mut next = [Fr::ZERO; POSEIDON_T];
    for (i, row) in matrix.iter().enumerate() {
        let mut acc = Fr::ZERO;
        for (coeff, value) in row.iter().zip(current.iter()) {
            acc += *coeff * *value;
        }
        next[i] = acc;
    }
    *state = next;
}

fn apply_sparse_mds(
    state: &mut [Fr; POSEIDON_T],
    row: &[Fr; POSEIDON_T],
    col_hat: &[Fr; POSEIDON_RATE],
) {
    let current = *state;
    let mut next = [Fr::ZERO; POSEIDON_T];

    let mut acc = Fr::ZERO;
    for (coeff, value) in row.iter().zip(current.iter()) {
        acc += *coeff * *value;
    }
    next[0] = acc;

    for (i, (coeff, value)) in col_hat.iter().zip(current.iter().skip(1)).enumerate() {
        next[i + 1] = current[0] * *coeff + *value;
    }

    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let a = poseidon_hash(&[Fr::from(1u64), Fr::from(2u64)]);
        let b = poseidon_hash(&[Fr::from(1u64), Fr::from(2u64)]);
        assert_eq!(a, b);
    }

    #[test]
    fn hash_depends_on_every_input() {
        let base = poseidon_hash(&[Fr::from(1u64), Fr::from(2u64)]);
        assert_ne!(base, poseidon_hash(&[Fr::from(2u64), Fr::from(2u64)]));
        assert_ne!(base, poseidon_hash(&[Fr::from(1u64), Fr::from(3u64)]));
    }

    #[test]
    fn hash_depends_on_length() {
        let two = poseidon_hash(&[Fr::from(1u64), Fr::from(2u64)]);
        let three = poseidon_hash(&[Fr::from(1u64), Fr::from(2u64), Fr::ZERO]);
        assert_ne!(two, three);
    }
}
