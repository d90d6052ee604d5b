//! Identifier and numeric types used throughout the core.

/// 20-byte account/contract identifier.
pub type Address = alloy_primitives::Address;

/// 32-byte identifier: block IDs, trie keys, state/storage roots.
pub type Hash = alloy_primitives::B256;

/// Arbitrary-precision-in-spirit unsigned integer used for balances,
/// energies and endorsement thresholds.
///
/// The reference implementation uses Go's unbounded `big.Int`; this crate
/// follows the wider Rust blockchain ecosystem (alloy, reth) in using a
/// fixed-width 256-bit integer instead, which is large enough for every
/// quantity the protocol ever produces (balances, energy, scores) and gives
/// floor division "for free" via `Uint`'s unsigned division. See
/// `DESIGN.md` for the full rationale.
pub type BigInt = alloy_primitives::U256;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;
