//! Transaction Signer
//!
//! Binds a decoded transaction to a fresh blockhash and signs it for every
//! required signer. Key lookup goes through [`SignerSelector`], so the caller
//! decides which keys exist; this module only asks "who must sign?".

use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use thiserror::Error;

use super::decoder::DecodedTransaction;

/// Errors raised while signing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("No signing key held for required signer {0}")]
    MissingSigner(Pubkey),

    #[error("Transaction declares no required signers")]
    NoRequiredSigners,
}

/// Maps a required public key to the keypair that signs for it.
///
/// Keys are compared by value. Implementations must return `None` for keys
/// they do not hold; the signer never adds signatures nobody asked for.
pub trait SignerSelector: Send + Sync {
    fn keypair_for(&self, pubkey: &Pubkey) -> Option<&Keypair>;
}

impl SignerSelector for Keypair {
    fn keypair_for(&self, pubkey: &Pubkey) -> Option<&Keypair> {
        (self.pubkey() == *pubkey).then_some(self)
    }
}

impl SignerSelector for [Keypair] {
    fn keypair_for(&self, pubkey: &Pubkey) -> Option<&Keypair> {
        self.iter().find(|k| k.pubkey() == *pubkey)
    }
}

impl SignerSelector for Vec<Keypair> {
    fn keypair_for(&self, pubkey: &Pubkey) -> Option<&Keypair> {
        self.as_slice().keypair_for(pubkey)
    }
}

/// Resolve one keypair per required signer, in signer order.
pub fn resolve_signers<'a, S>(
    required: &[Pubkey],
    selector: &'a S,
) -> Result<Vec<&'a Keypair>, SigningError>
where
    S: SignerSelector + ?Sized,
{
    if required.is_empty() {
        return Err(SigningError::NoRequiredSigners);
    }

    required
        .iter()
        .map(|pubkey| {
            selector
                .keypair_for(pubkey)
                .ok_or(SigningError::MissingSigner(*pubkey))
        })
        .collect()
}

/// Attach `blockhash` and sign for every required signer.
///
/// Existing signatures are discarded, never appended to. Keys are resolved
/// before the transaction is touched, so a failure leaves it unchanged.
/// Returns the fee payer's signature, which is the transaction id.
pub fn sign_transaction<S>(
    tx: &mut DecodedTransaction,
    blockhash: Hash,
    selector: &S,
) -> Result<Signature, SigningError>
where
    S: SignerSelector + ?Sized,
{
    let keypairs = resolve_signers(tx.required_signers(), selector)?;

    tx.set_recent_blockhash(blockhash);
    let message = tx.message_bytes();
    let signatures: Vec<Signature> = keypairs.iter().map(|k| k.sign_message(&message)).collect();
    let id = signatures[0];

    tx.replace_signatures(signatures);
    Ok(id)
}
