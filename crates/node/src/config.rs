//! On-disk daemon configuration (§6's "CLI/config loading" collaborator):
//! everything a [`crate::daemon`] needs that the core itself treats as
//! externally supplied — the node's own signing key, the fork schedule and
//! the genesis authority set.

use anyhow::Context;
use dexio_primitives::{Address, BigInt, ForkConfig, Hash, Timestamp};
use dexio_state::Candidate;
use serde::Deserialize;
use std::path::Path;

/// One genesis authority candidate, as written in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateConfig {
    pub node_master: Address,
    pub endorsor: Address,
    #[serde(default)]
    pub identity: Hash,
}

impl From<CandidateConfig> for Candidate {
    fn from(c: CandidateConfig) -> Candidate {
        Candidate { node_master: c.node_master, endorsor: c.endorsor, identity: c.identity, active: true }
    }
}

/// The fork-activation block numbers this daemon gates on (§4's `ForkConfig`).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ForkConfigFile {
    #[serde(default)]
    pub vip191: u64,
    #[serde(default)]
    pub vip214: u64,
}

impl Default for ForkConfigFile {
    fn default() -> ForkConfigFile {
        ForkConfigFile { vip191: 0, vip214: 0 }
    }
}

impl From<ForkConfigFile> for ForkConfig {
    fn from(f: ForkConfigFile) -> ForkConfig {
        ForkConfig { vip191: f.vip191, vip214: f.vip214 }
    }
}

/// Genesis parameters: the state every candidate's endorsement is initially
/// funded from, plus the header the chain repository is seeded with.
#[derive(Debug, Clone, Deserialize)]
pub struct GenesisConfig {
    pub timestamp: Timestamp,
    pub gas_limit: u64,
    pub proposer_endorsement: BigInt,
    #[serde(default)]
    pub candidates: Vec<CandidateConfig>,
    /// Starting balance credited to every candidate's endorsor, so the
    /// default `proposer_endorsement` threshold is satisfiable out of the
    /// box.
    #[serde(default)]
    pub endorsor_balance: BigInt,
}

/// The full daemon configuration (§6).
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// Hex-encoded (optionally `0x`-prefixed) secp256k1 signing key this
    /// node proposes blocks with.
    pub node_master_key: String,
    /// Explicit beneficiary override; defaults to the node's own endorsor
    /// when absent (§4.2).
    #[serde(default)]
    pub beneficiary: Option<Address>,
    #[serde(default)]
    pub target_gas_limit: u64,
    #[serde(default = "default_chain_tag")]
    pub chain_tag: u8,
    #[serde(default)]
    pub fork_config: ForkConfigFile,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    pub genesis: GenesisConfig,
}

fn default_chain_tag() -> u8 {
    1
}

fn default_poll_interval_secs() -> u64 {
    1
}

impl NodeConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<NodeConfig> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading node config from {}", path.display()))?;
        let config: NodeConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing node config at {}", path.display()))?;
        Ok(config)
    }

    /// The 32 raw key bytes, decoded from [`NodeConfig::node_master_key`].
    pub fn signing_key(&self) -> anyhow::Result<[u8; 32]> {
        let hex = self.node_master_key.trim_start_matches("0x");
        let bytes = alloy_primitives::hex::decode(hex).context("node_master_key is not valid hex")?;
        bytes.try_into().map_err(|_| anyhow::anyhow!("node_master_key must decode to exactly 32 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json(key_hex: &str) -> String {
        format!(
            r#"{{
                "node_master_key": "{key_hex}",
                "genesis": {{
                    "timestamp": 0,
                    "gas_limit": 10000000,
                    "proposer_endorsement": "0x0",
                    "candidates": []
                }}
            }}"#
        )
    }

    #[test]
    fn parses_a_minimal_config_and_fills_in_defaults() {
        let key_hex = "0x0101010101010101010101010101010101010101010101010101010101010101";
        let config: NodeConfig = serde_json::from_str(&sample_json(key_hex)).unwrap();
        assert_eq!(config.chain_tag, 1);
        assert_eq!(config.poll_interval_secs, 1);
        assert_eq!(config.target_gas_limit, 0);
        assert!(config.beneficiary.is_none());
        assert_eq!(config.fork_config.vip191, 0);
        assert_eq!(config.genesis.candidates.len(), 0);
    }

    #[test]
    fn signing_key_decodes_32_byte_hex_with_0x_prefix() {
        let key_hex = "0x0101010101010101010101010101010101010101010101010101010101010101";
        let config: NodeConfig = serde_json::from_str(&sample_json(key_hex)).unwrap();
        let key = config.signing_key().unwrap();
        assert_eq!(key, [1u8; 32]);
    }

    #[test]
    fn signing_key_rejects_the_wrong_length() {
        let key_hex = "0x0101";
        let config: NodeConfig = serde_json::from_str(&sample_json(key_hex)).unwrap();
        assert!(config.signing_key().is_err());
    }
}
