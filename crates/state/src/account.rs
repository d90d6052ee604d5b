use alloy_rlp::{RlpDecodable, RlpEncodable};
use dexio_primitives::{energy_denominator, BigInt, Timestamp, ENERGY_GROWTH_RATE};

/// The Merkle-trie-resident representation of an account (§3).
///
/// `master` is the optional master-key address and `code_hash`/`storage_root`
/// are 0 or 32 bytes; all three are carried as raw byte vectors rather than
/// `Option<Address>`/`Option<Hash>` so the RLP field order and zero-length
/// encoding match the reference exactly.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodable, RlpDecodable)]
pub struct Account {
    pub balance: BigInt,
    pub energy: BigInt,
    pub block_time: Timestamp,
    pub master: Vec<u8>,
    pub code_hash: Vec<u8>,
    pub storage_root: Vec<u8>,
}

impl Account {
    /// The canonical empty account: as returned for any address with no
    /// trie entry.
    pub fn empty() -> Account {
        Account::default()
    }

    /// An account is empty iff balance, energy, master and code hash are all
    /// zero-length/zero-valued.
    ///
    /// `storage_root` is deliberately excluded: an otherwise-empty account
    /// with a lingering non-nil storage root is still empty and gets
    /// deleted on save (see `DESIGN.md`).
    pub fn is_empty(&self) -> bool {
        self.balance.is_zero()
            && self.energy.is_zero()
            && self.master.is_empty()
            && self.code_hash.is_empty()
    }

    /// Energy materialized at `at`, applying lazy accrual without mutating
    /// the account (invariants 4/5, §8).
    pub fn calc_energy(&self, at: Timestamp) -> BigInt {
        if self.block_time == 0 || self.balance.is_zero() || at <= self.block_time {
            return self.energy;
        }
        let elapsed = BigInt::from(at - self.block_time);
        let accrued = elapsed * self.balance * BigInt::from(ENERGY_GROWTH_RATE) / energy_denominator();
        self.energy + accrued
    }
}
