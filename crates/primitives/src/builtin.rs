use crate::Address;
use alloy_primitives::keccak256;
use std::sync::OnceLock;

fn builtin_address(name: &str) -> Address {
    Address::from_slice(&keccak256(name.as_bytes())[12..])
}

/// Address of the built-in params registry contract (§4.4).
pub fn params_address() -> Address {
    static ADDR: OnceLock<Address> = OnceLock::new();
    *ADDR.get_or_init(|| builtin_address("builtin:params"))
}

/// Address of the built-in authority registry contract (§4.5).
pub fn authority_address() -> Address {
    static ADDR: OnceLock<Address> = OnceLock::new();
    *ADDR.get_or_init(|| builtin_address("builtin:authority"))
}

/// Address of the native "measure" contract used only to exercise the
/// runtime's clause-dispatch gas accounting (the S6 scenario, §8), standing
/// in for the reference's bytecode-level `inner`/`outer` measure contract.
pub fn measure_address() -> Address {
    static ADDR: OnceLock<Address> = OnceLock::new();
    *ADDR.get_or_init(|| builtin_address("builtin:measure"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_addresses_are_stable_and_distinct() {
        assert_eq!(params_address(), params_address());
        assert_ne!(params_address(), authority_address());
        assert_ne!(params_address(), measure_address());
        assert_ne!(authority_address(), measure_address());
    }
}
