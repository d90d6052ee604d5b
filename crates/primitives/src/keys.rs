use crate::Hash;
use alloy_primitives::keccak256;

/// Derives the storage key a well-known params name is stored under.
///
/// The params registry (§4.4) is a `bytes32 -> uint256` map; rather than
/// hand out magic 32-byte constants, every caller (including the packer's
/// lookup of `KeyProposerEndorsement`) derives its key from a human-readable
/// name the same way, so the mapping from name to slot is reproducible and
/// collision-resistant.
pub fn param_key(name: &str) -> Hash {
    keccak256(name.as_bytes())
}

/// Well-known params keys consumed by the core itself.
pub mod well_known {
    use super::{param_key, Hash};
    use std::sync::OnceLock;

    macro_rules! param_key_const {
        ($fn_name:ident, $name:literal) => {
            /// Storage key for the
            #[doc = $name]
            /// parameter.
            pub fn $fn_name() -> Hash {
                static KEY: OnceLock<Hash> = OnceLock::new();
                *KEY.get_or_init(|| param_key($name))
            }
        };
    }

    param_key_const!(key_proposer_endorsement, "proposer-endorsement");
    param_key_const!(key_reward_ratio, "reward-ratio");
    param_key_const!(key_base_gas_price, "base-gas-price");
}
