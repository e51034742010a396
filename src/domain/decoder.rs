//! Transaction Decoder
//!
//! Turns the base64 blobs handed back by Jupiter into structured versioned
//! transactions. The wire layout and the message's structural consistency are
//! checked here; instruction content is taken as given.

use base64::{engine::general_purpose::STANDARD, Engine};
use bincode::Options;
use solana_sdk::{
    hash::Hash,
    message::VersionedMessage,
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use thiserror::Error;

use super::role::{SwapTransactions, TxRole};

/// Errors raised while decoding a provider payload
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),

    #[error("Malformed transaction bytes: {0}")]
    Malformed(String),

    #[error("Signature slots ({slots}) do not match required signers ({required})")]
    SignatureCountMismatch { slots: usize, required: usize },

    #[error("Transaction arrived pre-signed (slot {slot} is not empty)")]
    PreSigned { slot: usize },
}

/// A decoded, not yet signed transaction
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTransaction {
    tx: VersionedTransaction,
}

impl DecodedTransaction {
    /// Decode a base64 payload
    pub fn from_base64(payload: &str) -> Result<Self, DecodeError> {
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Decode raw wire bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let tx: VersionedTransaction = wire_options()
            .deserialize(bytes)
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;

        let required = tx.message.header().num_required_signatures as usize;
        if tx.signatures.len() != required {
            return Err(DecodeError::SignatureCountMismatch {
                slots: tx.signatures.len(),
                required,
            });
        }

        // Header, account table and instruction indices must agree
        tx.sanitize()
            .map_err(|e| DecodeError::Malformed(format!("inconsistent message: {}", e)))?;

        // Jupiter returns zeroed signature slots; anything else was signed upstream
        if let Some(slot) = tx.signatures.iter().position(|s| *s != Signature::default()) {
            return Err(DecodeError::PreSigned { slot });
        }

        Ok(Self { tx })
    }

    pub fn message(&self) -> &VersionedMessage {
        &self.tx.message
    }

    pub fn recent_blockhash(&self) -> &Hash {
        self.tx.message.recent_blockhash()
    }

    pub fn set_recent_blockhash(&mut self, blockhash: Hash) {
        self.tx.message.set_recent_blockhash(blockhash);
    }

    /// Public keys that must sign, fee payer first
    pub fn required_signers(&self) -> &[Pubkey] {
        let keys = self.tx.message.static_account_keys();
        let required = self.tx.message.header().num_required_signatures as usize;
        &keys[..required.min(keys.len())]
    }

    /// Fee payer (first required signer)
    pub fn fee_payer(&self) -> Option<&Pubkey> {
        self.required_signers().first()
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.tx.signatures
    }

    /// True once every slot holds a real signature
    pub fn is_signed(&self) -> bool {
        !self.tx.signatures.is_empty()
            && self.tx.signatures.iter().all(|s| *s != Signature::default())
    }

    pub fn instruction_count(&self) -> usize {
        self.tx.message.instructions().len()
    }

    /// Bytes covered by the signatures
    pub fn message_bytes(&self) -> Vec<u8> {
        self.tx.message.serialize()
    }

    /// Full wire encoding, signatures included
    pub fn to_bytes(&self) -> Result<Vec<u8>, DecodeError> {
        wire_options()
            .serialize(&self.tx)
            .map_err(|e| DecodeError::Malformed(e.to_string()))
    }

    pub fn as_versioned(&self) -> &VersionedTransaction {
        &self.tx
    }

    pub fn into_versioned(self) -> VersionedTransaction {
        self.tx
    }

    pub(crate) fn replace_signatures(&mut self, signatures: Vec<Signature>) {
        self.tx.signatures = signatures;
    }
}

/// Decode every present payload of a bundle before anything touches the network.
pub fn decode_bundle(
    bundle: SwapTransactions<String>,
) -> Result<SwapTransactions<DecodedTransaction>, (TxRole, DecodeError)> {
    bundle.try_map(|role, payload| -> Result<DecodedTransaction, DecodeError> {
        let decoded = DecodedTransaction::from_base64(&payload)?;
        tracing::debug!(
            "Decoded {} transaction: {} bytes, {} instructions, {} required signers",
            role,
            payload.len(),
            decoded.instruction_count(),
            decoded.required_signers().len()
        );
        Ok(decoded)
    })
}

// Same layout `bincode::serialize` produces for Solana transactions, minus trailing garbage
fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::{unsigned_payload, unsigned_transaction};
    use solana_sdk::signature::{Keypair, Signer};

    #[test]
    fn test_decode_unsigned_payload() {
        let payer = Keypair::new();
        let payload = unsigned_payload(&[&payer.pubkey()]);

        let decoded = DecodedTransaction::from_base64(&payload).unwrap();
        assert_eq!(decoded.required_signers(), &[payer.pubkey()]);
        assert_eq!(decoded.fee_payer(), Some(&payer.pubkey()));
        assert_eq!(decoded.signatures(), &[Signature::default()]);
        assert!(!decoded.is_signed());
        assert_eq!(decoded.instruction_count(), 1);
    }

    #[test]
    fn test_message_round_trip_is_byte_identical() {
        let payer = Keypair::new();
        let original = unsigned_transaction(&[&payer.pubkey()]);
        let bytes = bincode::serialize(&original).unwrap();

        let decoded = DecodedTransaction::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.message_bytes(), original.message.serialize());
        assert_eq!(decoded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_invalid_base64() {
        let err = DecodedTransaction::from_base64("not*base64!").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidBase64(_)));
    }

    #[test]
    fn test_truncated_bytes() {
        let payer = Keypair::new();
        let bytes = bincode::serialize(&unsigned_transaction(&[&payer.pubkey()])).unwrap();

        let err = DecodedTransaction::from_bytes(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let payer = Keypair::new();
        let mut bytes = bincode::serialize(&unsigned_transaction(&[&payer.pubkey()])).unwrap();
        bytes.extend_from_slice(&[0xde, 0xad]);

        let err = DecodedTransaction::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn test_pre_signed_payload_rejected() {
        let payer = Keypair::new();
        let mut tx = unsigned_transaction(&[&payer.pubkey()]);
        tx.signatures[0] = payer.sign_message(&tx.message.serialize());
        let bytes = bincode::serialize(&tx).unwrap();

        let err = DecodedTransaction::from_bytes(&bytes).unwrap_err();
        assert_eq!(err, DecodeError::PreSigned { slot: 0 });
    }

    #[test]
    fn test_missing_signature_slots_rejected() {
        let payer = Keypair::new();
        let mut tx = unsigned_transaction(&[&payer.pubkey()]);
        tx.signatures.clear();
        let bytes = bincode::serialize(&tx).unwrap();

        let err = DecodedTransaction::from_bytes(&bytes).unwrap_err();
        assert_eq!(err, DecodeError::SignatureCountMismatch { slots: 0, required: 1 });
    }

    #[test]
    fn test_header_claiming_more_signers_than_keys_rejected() {
        use solana_sdk::message::Message;

        let payer = Keypair::new();
        let mut message = Message::new(&[], Some(&payer.pubkey()));
        message.header.num_required_signatures = 2;
        let tx = VersionedTransaction {
            signatures: vec![Signature::default(); 2],
            message: VersionedMessage::Legacy(message),
        };
        let bytes = bincode::serialize(&tx).unwrap();

        let err = DecodedTransaction::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn test_decode_bundle_fails_fast_with_role() {
        let payer = Keypair::new();
        let bundle = SwapTransactions::swap_only(unsigned_payload(&[&payer.pubkey()]))
            .with_cleanup("%%%".to_string());

        let (role, err) = decode_bundle(bundle).unwrap_err();
        assert_eq!(role, TxRole::Cleanup);
        assert!(matches!(err, DecodeError::InvalidBase64(_)));
    }

    #[test]
    fn test_set_recent_blockhash() {
        let payer = Keypair::new();
        let mut decoded = DecodedTransaction::from_base64(&unsigned_payload(&[&payer.pubkey()])).unwrap();
        let fresh = Hash::new_unique();

        decoded.set_recent_blockhash(fresh);
        assert_eq!(decoded.recent_blockhash(), &fresh);
    }
}
