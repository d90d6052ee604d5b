//! The in-progress block-production session (§4.2): everything a node
//! builds up between `Packer::schedule`/`mock` and `Flow::pack`.

use crate::error::{AdoptError, NotAdoptableReason, PackError, RejectReason};
use crate::merkle::ordered_merkle_root;
use crate::receipt::{ClauseReceipt, Receipt};
use crate::NewBlock;
use alloy_primitives::keccak256;
use alloy_primitives::TxKind;
use dexio_chain::{Block, Clause, Header, Transaction};
use dexio_evm::{Runtime, TransactionContext};
use dexio_primitives::{Address, BigInt, ForkConfig, Hash};
use dexio_state::{AuthorityRegistry, State};
use rustc_hash::FxHashSet;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, SecretKey, SECP256K1};

/// The block-level environment a Flow executes its transactions against.
/// Re-exported verbatim from `dexio-evm` since the Flow's header-building
/// step and its Runtime both need the exact same fields.
pub use dexio_evm::BlockContext;

/// A single block-production session (§4.2).
///
/// Owns exclusive mutable access to a state view rooted at `parent`'s state
/// root and a private working copy of the authority registry (§5): nothing
/// here is visible outside the Flow until [`Flow::pack`] succeeds and the
/// caller hands the resulting [`NewBlock`] to `Packer::accept`.
#[derive(Debug)]
pub struct Flow {
    parent: Header,
    chain_tag: u8,
    state: State,
    authority: AuthorityRegistry,
    block_context: BlockContext,
    fork_config: ForkConfig,
    delegation_feature: bool,
    transactions: Vec<Transaction>,
    receipts: Vec<Receipt>,
    seen: FxHashSet<Hash>,
    gas_used: u64,
}

impl Flow {
    pub(crate) fn new(
        parent: Header,
        chain_tag: u8,
        state: State,
        authority: AuthorityRegistry,
        block_context: BlockContext,
        fork_config: ForkConfig,
    ) -> Flow {
        let delegation_feature = block_context.number >= fork_config.vip191;
        Flow {
            parent,
            chain_tag,
            state,
            authority,
            block_context,
            fork_config,
            delegation_feature,
            transactions: Vec::new(),
            receipts: Vec::new(),
            seen: FxHashSet::default(),
            gas_used: 0,
        }
    }

    pub fn parent_header(&self) -> &Header {
        &self.parent
    }

    pub fn when(&self) -> dexio_primitives::Timestamp {
        self.block_context.time
    }

    pub fn block_context(&self) -> &BlockContext {
        &self.block_context
    }

    /// Whether transactions in this block may carry a delegator signature
    /// (§4.2's `VIP191` feature gate). Signature/delegator verification
    /// itself is out of scope; this only reports the gate's state.
    pub fn delegation_feature(&self) -> bool {
        self.delegation_feature
    }

    /// Validates and executes `tx` against the current Runtime.
    ///
    /// Every check that can reject or defer `tx` runs before any state
    /// mutation begins, so a returned `Err` — of any variant — leaves the
    /// Flow's state exactly as it was before the call (§4.2's fail-closed
    /// invariant, extended down to the per-transaction level; invariant 9,
    /// §8).
    pub fn adopt(&mut self, tx: Transaction) -> Result<(), AdoptError> {
        if tx.chain_tag != self.chain_tag {
            return Err(AdoptError::Rejected(RejectReason::ChainTagMismatch));
        }
        if self.block_context.number > tx.expires_at() {
            return Err(AdoptError::Rejected(RejectReason::Expired));
        }
        if tx.block_ref > self.block_context.number {
            return Err(AdoptError::NotAdoptableNow(NotAdoptableReason::TooEarly));
        }
        let id = tx.id();
        if self.seen.contains(&id) {
            return Err(AdoptError::Rejected(RejectReason::Replay));
        }
        if let Some(dep) = tx.depends_on {
            if !self.seen.contains(&dep) {
                return Err(AdoptError::NotAdoptableNow(NotAdoptableReason::DependencyNotMet(dep)));
            }
        }
        if tx.clauses.iter().any(|c| matches!(c.to, TxKind::Create)) {
            return Err(AdoptError::Rejected(RejectReason::ContractCreationUnsupported));
        }

        let remaining_block_gas = self.block_context.gas_limit.saturating_sub(self.gas_used);
        if tx.gas > remaining_block_gas {
            return Err(AdoptError::GasLimitExceeded);
        }

        let total_value: BigInt = tx.clauses.iter().fold(BigInt::ZERO, |acc, c| acc + c.value);
        let origin_balance = self.state.get_balance(tx.origin)?;
        if origin_balance < total_value {
            return Err(AdoptError::Rejected(RejectReason::InsufficientBalance));
        }

        // Every permanent-rejection and admission check above has passed;
        // everything from here on mutates state.
        self.state.sub_balance(tx.origin, total_value)?;
        for clause in &tx.clauses {
            if let TxKind::Call(to) = clause.to {
                self.state.add_balance(to, clause.value)?;
            }
        }

        let tx_ctx = TransactionContext { tx_id: id, origin: tx.origin };
        let mut gas_available = tx.gas;
        let mut clause_receipts = Vec::with_capacity(tx.clauses.len());
        for (index, clause) in tx.clauses.iter().enumerate() {
            let outcome = self
                .runtime()
                .prepare_clause(clause, index, gas_available, &tx_ctx)?
                .call();
            let consumed = gas_available.saturating_sub(outcome.left_over_gas);
            gas_available = outcome.left_over_gas;
            clause_receipts.push(ClauseReceipt {
                output_data: outcome.output_data,
                gas_used: consumed,
                reverted: outcome.vm_error.is_some() as u8,
            });
        }
        let tx_gas_used = tx.gas - gas_available;

        // Charged against the declared gas, not actual consumption: a
        // value-transfer or unknown-address clause reports zero native gas
        // use (`runtime.rs`'s no-op branch), so counting only `tx_gas_used`
        // here would let the block admit unbounded declared gas once every
        // adopted tx happens to touch no native contract.
        self.gas_used += tx.gas;

        self.seen.insert(id);
        self.receipts.push(Receipt { tx_id: id, gas_used: tx_gas_used, clauses: clause_receipts });
        self.transactions.push(tx);
        Ok(())
    }

    fn runtime(&mut self) -> Runtime<'_> {
        Runtime::new(&mut self.state, &mut self.authority, self.block_context, self.fork_config)
    }

    /// Computes the transactions/receipts/state roots, signs the header
    /// with `private_key`, and returns the finalized block alongside its
    /// receipts and the authority snapshot the Packer should adopt as
    /// canonical on acceptance.
    pub fn pack(mut self, private_key: &[u8; 32]) -> Result<NewBlock, PackError> {
        let tx_root = ordered_merkle_root(
            &self.transactions.iter().map(alloy_rlp::encode).collect::<Vec<_>>(),
        );
        let receipts_root = ordered_merkle_root(
            &self.receipts.iter().map(alloy_rlp::encode).collect::<Vec<_>>(),
        );
        let state_root = self.state.commit();

        let header = Header {
            parent_id: self.parent.id(),
            number: self.block_context.number,
            timestamp: self.block_context.time,
            gas_limit: self.block_context.gas_limit,
            total_score: self.block_context.total_score,
            tx_root,
            receipts_root,
            state_root,
            beneficiary: self.block_context.beneficiary,
            signer: self.block_context.signer,
        };

        let signature = sign_header(private_key, header.id(), self.block_context.signer)?;
        let block = Block::new(header, signature, self.transactions);
        Ok(NewBlock { block, receipts: self.receipts, authority: self.authority })
    }
}

/// Signs `header_id` with `private_key` and confirms the signature recovers
/// to `expected_signer`, grounded in the recoverable-ECDSA pattern real PoA
/// clients use to recover a received header's proposer.
fn sign_header(private_key: &[u8; 32], header_id: Hash, expected_signer: Address) -> Result<Vec<u8>, PackError> {
    let secret = SecretKey::from_slice(private_key).map_err(|_| PackError::InvalidKey)?;
    let message = Message::from_digest_slice(header_id.as_slice()).expect("header id is 32 bytes");
    let recoverable = SECP256K1.sign_ecdsa_recoverable(&message, &secret);
    let (recovery_id, compact) = recoverable.serialize_compact();

    let mut signature = Vec::with_capacity(65);
    signature.extend_from_slice(&compact);
    signature.push(recovery_id.to_i32() as u8);

    if recover_signer(header_id, &signature)? != expected_signer {
        return Err(PackError::SignerMismatch);
    }
    Ok(signature)
}

/// Recovers the address that produced `signature` over `header_id`.
pub fn recover_signer(header_id: Hash, signature: &[u8]) -> Result<Address, PackError> {
    if signature.len() != 65 {
        return Err(PackError::InvalidKey);
    }
    let recovery_id = RecoveryId::from_i32(signature[64] as i32).map_err(|_| PackError::InvalidKey)?;
    let recoverable =
        RecoverableSignature::from_compact(&signature[..64], recovery_id).map_err(|_| PackError::InvalidKey)?;
    let message = Message::from_digest_slice(header_id.as_slice()).expect("header id is 32 bytes");
    let public = SECP256K1
        .recover_ecdsa(&message, &recoverable)
        .map_err(|_| PackError::InvalidKey)?;
    Ok(Address::from_slice(&keccak256(&public.serialize_uncompressed()[1..])[12..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexio_chain::Clause;
    use dexio_trie::MemStore;
    use std::sync::Arc;

    fn addr(tag: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = tag;
        Address::from(bytes)
    }

    fn key(tag: u8) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[31] = tag;
        bytes
    }

    fn signer_address(k: &[u8; 32]) -> Address {
        let secret = SecretKey::from_slice(k).unwrap();
        let public = secret.public_key(SECP256K1);
        Address::from_slice(&keccak256(&public.serialize_uncompressed()[1..])[12..])
    }

    fn flow_with(number: u64, gas_limit: u64, signer: Address) -> Flow {
        let store = MemStore::new_mem();
        let state = State::new(store, dexio_trie::empty_root()).unwrap();
        let parent = Header::genesis(dexio_trie::empty_root(), 0, gas_limit);
        let block_context = BlockContext {
            beneficiary: signer,
            signer,
            number,
            time: 10,
            gas_limit,
            total_score: 0,
        };
        Flow::new(parent, 1, state, AuthorityRegistry::new(), block_context, ForkConfig::all_activated())
    }

    fn funded_tx(origin: Address, to: Address, value: u64, gas: u64) -> Transaction {
        Transaction {
            chain_tag: 1,
            block_ref: 0,
            expiration: 100,
            clauses: vec![Clause::call(to, BigInt::from(value), Vec::new())],
            gas,
            nonce: 0,
            origin,
            depends_on: None,
        }
    }

    #[test]
    fn adopt_moves_value_between_accounts() {
        let signer = addr(9);
        let mut flow = flow_with(1, 10_000_000, signer);
        let origin = addr(1);
        flow.state.add_balance(origin, BigInt::from(100)).unwrap();

        flow.adopt(funded_tx(origin, addr(2), 40, 21_000)).unwrap();

        assert_eq!(flow.state.get_balance(origin).unwrap(), BigInt::from(60));
        assert_eq!(flow.state.get_balance(addr(2)).unwrap(), BigInt::from(40));
        assert_eq!(flow.receipts.len(), 1);
    }

    #[test]
    fn adopt_rejects_without_mutating_state_on_insufficient_balance() {
        let signer = addr(9);
        let mut flow = flow_with(1, 10_000_000, signer);
        let origin = addr(1);

        let err = flow.adopt(funded_tx(origin, addr(2), 40, 21_000)).unwrap_err();
        assert!(matches!(err, AdoptError::Rejected(RejectReason::InsufficientBalance)));
        assert_eq!(flow.state.get_balance(origin).unwrap(), BigInt::ZERO);
        assert_eq!(flow.transactions.len(), 0);
    }

    #[test]
    fn adopt_rejects_replayed_transaction() {
        let signer = addr(9);
        let mut flow = flow_with(1, 10_000_000, signer);
        let origin = addr(1);
        flow.state.add_balance(origin, BigInt::from(1_000)).unwrap();
        let tx = funded_tx(origin, addr(2), 1, 21_000);

        flow.adopt(tx.clone()).unwrap();
        let err = flow.adopt(tx).unwrap_err();
        assert!(matches!(err, AdoptError::Rejected(RejectReason::Replay)));
    }

    #[test]
    fn adopt_rejects_contract_creation_clauses() {
        let signer = addr(9);
        let mut flow = flow_with(1, 10_000_000, signer);
        let mut tx = funded_tx(addr(1), addr(2), 0, 21_000);
        tx.clauses = vec![Clause::new(TxKind::Create, BigInt::ZERO, Vec::new())];
        let err = flow.adopt(tx).unwrap_err();
        assert!(matches!(err, AdoptError::Rejected(RejectReason::ContractCreationUnsupported)));
    }

    #[test]
    fn adopt_defers_transactions_with_unmet_dependencies() {
        let signer = addr(9);
        let mut flow = flow_with(1, 10_000_000, signer);
        let origin = addr(1);
        flow.state.add_balance(origin, BigInt::from(1_000)).unwrap();
        let mut tx = funded_tx(origin, addr(2), 1, 21_000);
        tx.depends_on = Some(Hash::from([7u8; 32]));

        let err = flow.adopt(tx).unwrap_err();
        assert!(matches!(
            err,
            AdoptError::NotAdoptableNow(NotAdoptableReason::DependencyNotMet(_))
        ));
    }

    #[test]
    fn adopt_refuses_to_overrun_the_block_gas_budget() {
        let signer = addr(9);
        let mut flow = flow_with(1, 10_000, signer);
        let origin = addr(1);
        flow.state.add_balance(origin, BigInt::from(1_000)).unwrap();
        let err = flow.adopt(funded_tx(origin, addr(2), 1, 20_000)).unwrap_err();
        assert!(matches!(err, AdoptError::GasLimitExceeded));
    }

    #[test]
    fn declared_gas_of_admitted_transactions_counts_against_the_block_budget() {
        // Two value-transfer clauses each consume zero native gas
        // (`runtime.rs`'s no-op branch), so only charging actual
        // consumption would let both fit a block with room for just one.
        let signer = addr(9);
        let mut flow = flow_with(1, 15_000, signer);
        let origin = addr(1);
        flow.state.add_balance(origin, BigInt::from(1_000)).unwrap();

        flow.adopt(funded_tx(origin, addr(2), 1, 10_000)).unwrap();
        let err = flow.adopt(funded_tx(origin, addr(3), 1, 10_000)).unwrap_err();
        assert!(matches!(err, AdoptError::GasLimitExceeded));
    }

    #[test]
    fn malformed_native_call_data_reverts_the_clause_instead_of_rejecting_the_transaction() {
        let signer = addr(9);
        let mut flow = flow_with(1, 10_000_000, signer);
        let origin = addr(1);
        flow.state.add_balance(origin, BigInt::from(1_000)).unwrap();

        let mut tx = funded_tx(origin, addr(2), 40, 21_000);
        tx.clauses.push(Clause::call(dexio_primitives::params_address(), BigInt::ZERO, vec![0, 1, 2]));

        flow.adopt(tx).unwrap();

        assert_eq!(flow.state.get_balance(origin).unwrap(), BigInt::from(960));
        assert_eq!(flow.state.get_balance(addr(2)).unwrap(), BigInt::from(40));
        assert_eq!(flow.receipts[0].clauses.len(), 2);
        assert_eq!(flow.receipts[0].clauses[1].reverted, 1);
    }

    #[test]
    fn pack_signs_a_header_that_recovers_to_the_scheduled_signer() {
        let k = key(5);
        let signer = signer_address(&k);
        let flow = flow_with(1, 10_000_000, signer);
        let new_block = flow.pack(&k).unwrap();
        let recovered = recover_signer(new_block.block.header.id(), &new_block.block.signature).unwrap();
        assert_eq!(recovered, signer);
    }

    #[test]
    fn pack_rejects_a_key_that_does_not_match_the_scheduled_signer() {
        let k = key(5);
        let flow = flow_with(1, 10_000_000, addr(9));
        let err = flow.pack(&k).unwrap_err();
        assert!(matches!(err, PackError::SignerMismatch));
    }

    #[test]
    fn abandoning_a_flow_leaves_no_trace_in_the_canonical_authority() {
        // invariant 9, §8: constructing a Flow and adopting transactions
        // into it never touches anything outside the Flow itself; dropping
        // it without calling `pack` is always safe.
        let authority = Arc::new(parking_lot::RwLock::new(AuthorityRegistry::new()));
        let canonical_before = authority.read().clone();

        {
            let signer = addr(9);
            let mut flow = flow_with(1, 10_000_000, signer);
            flow.authority.add(dexio_state::Candidate {
                node_master: addr(1),
                endorsor: addr(1),
                identity: Hash::ZERO,
                active: true,
            });
            // `flow` and its working copy of the registry are dropped here.
        }

        assert_eq!(authority.read().iter().count(), canonical_before.iter().count());
    }
}
