/// A mapping from protocol-upgrade names to the block number at which each
/// activates.
///
/// Only the upgrades the core itself gates on are modeled; a daemon wiring
/// in more forks can extend this without touching the scheduling or packing
/// logic, since every check is a simple `parent_number + 1 >= fork.X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForkConfig {
    /// Block at which transactions may carry a delegator signature
    /// (`DelegationFeature`).
    pub vip191: u64,
    /// Block at which the authority scheduler switches from v1 (fixed
    /// rotation) to v2 (seeded rotation).
    pub vip214: u64,
}

impl ForkConfig {
    /// A configuration with every fork already active at genesis.
    pub const fn all_activated() -> Self {
        Self { vip191: 0, vip214: 0 }
    }

    /// A configuration with every fork permanently disabled.
    pub const fn no_fork() -> Self {
        Self { vip191: u64::MAX, vip214: u64::MAX }
    }
}

impl Default for ForkConfig {
    fn default() -> Self {
        Self::all_activated()
    }
}
