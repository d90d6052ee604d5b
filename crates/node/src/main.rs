//! The reference Dexio node daemon (§6): loads a node configuration, seeds
//! a genesis block and authority set, and drives the packer on a fixed
//! poll interval, persisting every block it produces.
//!
//! Everything this binary does beyond calling into `dexio-packer`,
//! `dexio-chain` and `dexio-state` is outside the core's scope (§1):
//! config loading, logging and the daemon loop are this crate's own,
//! in the surrounding node's idiom rather than the core's.

mod config;
mod daemon;
mod mempool;

use anyhow::Context;
use clap::Parser;
use config::NodeConfig;
use daemon::{Daemon, SystemClock};
use dexio_chain::{Block, Header, Repository};
use dexio_primitives::{well_known, ForkConfig};
use dexio_state::{AuthorityRegistry, Candidate, Params, State};
use dexio_trie::MemStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Dexio PoA block-production daemon")]
struct Cli {
    /// Path to the JSON node configuration file.
    #[arg(long, default_value = "node.json")]
    config: PathBuf,
    /// Produce exactly this many blocks, then exit. Runs forever if unset.
    #[arg(long)]
    blocks: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = NodeConfig::load(&cli.config)?;
    let signing_key = config.signing_key()?;
    let node_master = derive_node_master(&signing_key)?;

    let (repo, store, authority) = build_genesis(&config)?;
    let fork_config: ForkConfig = config.fork_config.into();

    let mut packer = dexio_packer::Packer::new(
        node_master,
        config.chain_tag,
        fork_config,
        repo.clone(),
        store,
        authority,
    );
    if let Some(beneficiary) = config.beneficiary {
        packer.set_beneficiary(beneficiary);
    }
    packer.set_target_gas_limit(config.target_gas_limit);

    let mut daemon = Daemon::new(
        packer,
        repo,
        signing_key,
        Duration::from_secs(config.poll_interval_secs),
        SystemClock,
    );

    match cli.blocks {
        Some(n) => {
            for _ in 0..n {
                daemon.produce_one()?;
            }
            Ok(())
        }
        None => daemon.run_forever(),
    }
}

/// Builds the genesis repository, its backing trie store and the matching
/// genesis authority registry from `config.genesis` (§6: the core treats
/// genesis construction as entirely the daemon's concern).
///
/// The returned store is the same one `state` committed its genesis root
/// into; the caller must hand it to `Packer::new` unchanged; a fresh
/// `MemStore` would have no nodes for that root to resolve against.
fn build_genesis(config: &NodeConfig) -> anyhow::Result<(Arc<Repository>, Arc<MemStore>, AuthorityRegistry)> {
    let store = MemStore::new_mem();
    let mut state = State::new(store.clone(), dexio_trie::empty_root())?;

    Params::new(dexio_primitives::params_address(), &mut state)
        .set(well_known::key_proposer_endorsement(), config.genesis.proposer_endorsement)?;

    let mut authority = AuthorityRegistry::new();
    for candidate in &config.genesis.candidates {
        if !config.genesis.endorsor_balance.is_zero() {
            state.add_balance(candidate.endorsor, config.genesis.endorsor_balance)?;
        }
        authority.add(Candidate::from(candidate.clone()));
    }

    let state_root = state.commit();
    let header = Header::genesis(state_root, config.genesis.timestamp, config.genesis.gas_limit);
    let genesis_block = Block::new(header, Vec::new(), Vec::new());
    let repo = Repository::new(genesis_block);

    Ok((Arc::new(repo), store, authority))
}

fn derive_node_master(signing_key: &[u8; 32]) -> anyhow::Result<dexio_primitives::Address> {
    let secret = secp256k1::SecretKey::from_slice(signing_key).context("invalid node_master_key")?;
    let public = secret.public_key(secp256k1::SECP256K1);
    Ok(dexio_primitives::Address::from_slice(
        &alloy_primitives::keccak256(&public.serialize_uncompressed()[1..])[12..],
    ))
}
