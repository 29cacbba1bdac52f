//! Pre-built transactions and their signature slots.
//!
//! # Responsibilities
//! - Read the required signer keys out of a serialized message
//! - Fill signature slots from a signer set
//! - Encode the signed transaction in wire format
//!
//! The message itself is opaque to this crate: it is built elsewhere and never
//! modified here.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};

use crate::ledger::types::{LedgerError, LedgerResult, Pubkey, Signature, PUBKEY_LEN, SIGNATURE_LEN};
use crate::ledger::wallet::Keypair;

/// High bit of the first message byte marks a versioned message.
const VERSION_PREFIX_MASK: u8 = 0x80;

/// A built transaction awaiting (or carrying) signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Serialized message; the bytes every signer signs.
    message: Vec<u8>,
    /// Keys whose signatures the message requires, in slot order.
    required_signers: Vec<Pubkey>,
    /// One slot per required signer.
    signatures: Vec<Option<Signature>>,
}

impl Transaction {
    /// Wrap a serialized message.
    ///
    /// Supports legacy and version 0 message layouts.
    pub fn from_message(message: Vec<u8>) -> LedgerResult<Self> {
        let required_signers = parse_required_signers(&message)?;
        let signatures = vec![None; required_signers.len()];
        Ok(Self {
            message,
            required_signers,
            signatures,
        })
    }

    /// Wrap a base64-encoded serialized message.
    pub fn from_base64_message(encoded: &str) -> LedgerResult<Self> {
        let message = BASE64_STANDARD
            .decode(encoded.trim())
            .map_err(|e| LedgerError::Serialization(format!("Invalid base64 message: {}", e)))?;
        Self::from_message(message)
    }

    /// The serialized message.
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Keys that must sign, in slot order.
    pub fn required_signers(&self) -> &[Pubkey] {
        &self.required_signers
    }

    /// Sign the message with every keypair in `signers`.
    ///
    /// Each keypair must be one of the required signers, and after signing every
    /// slot must be filled.
    pub fn sign(&mut self, signers: &[Keypair]) -> LedgerResult<()> {
        for keypair in signers {
            let pubkey = keypair.pubkey();
            let slot = self
                .required_signers
                .iter()
                .position(|required| *required == pubkey)
                .ok_or_else(|| {
                    LedgerError::Signing(format!(
                        "Signer {} is not required by this transaction",
                        pubkey
                    ))
                })?;
            self.signatures[slot] = Some(keypair.sign_message(&self.message));
        }

        if let Some(missing) = self.first_unsigned() {
            return Err(LedgerError::Signing(format!("Missing signature for {}", missing)));
        }
        Ok(())
    }

    /// Whether every slot holds a signature.
    pub fn is_fully_signed(&self) -> bool {
        self.first_unsigned().is_none()
    }

    /// Signatures currently present, in slot order.
    pub fn signatures(&self) -> Vec<Signature> {
        self.signatures.iter().flatten().copied().collect()
    }

    /// Encode in wire format: signature count, signatures, message.
    pub fn serialize(&self) -> LedgerResult<Vec<u8>> {
        if let Some(missing) = self.first_unsigned() {
            return Err(LedgerError::Signing(format!(
                "Cannot serialize: missing signature for {}",
                missing
            )));
        }

        let mut out =
            Vec::with_capacity(3 + self.signatures.len() * SIGNATURE_LEN + self.message.len());
        encode_compact_u16(self.signatures.len(), &mut out)?;
        for signature in self.signatures.iter().flatten() {
            out.extend_from_slice(&signature.0);
        }
        out.extend_from_slice(&self.message);
        Ok(out)
    }

    /// Wire format, base64-encoded.
    pub fn to_base64(&self) -> LedgerResult<String> {
        self.serialize().map(|bytes| BASE64_STANDARD.encode(bytes))
    }

    fn first_unsigned(&self) -> Option<Pubkey> {
        self.signatures
            .iter()
            .zip(&self.required_signers)
            .find(|(slot, _)| slot.is_none())
            .map(|(_, pubkey)| *pubkey)
    }
}

fn parse_required_signers(message: &[u8]) -> LedgerResult<Vec<Pubkey>> {
    let mut offset = 0;
    let first = *message
        .first()
        .ok_or_else(|| LedgerError::Serialization("Empty message".to_string()))?;

    if first & VERSION_PREFIX_MASK != 0 {
        let version = first & !VERSION_PREFIX_MASK;
        if version != 0 {
            return Err(LedgerError::Serialization(format!(
                "Unsupported message version {}",
                version
            )));
        }
        offset += 1;
    }

    // header: required signatures, readonly signed, readonly unsigned
    let header = message
        .get(offset..offset + 3)
        .ok_or_else(|| LedgerError::Serialization("Truncated message header".to_string()))?;
    let num_required = header[0] as usize;
    offset += 3;

    let (num_keys, used) = decode_compact_u16(&message[offset..])?;
    offset += used;

    if num_required == 0 {
        return Err(LedgerError::Serialization(
            "Message requires no signatures".to_string(),
        ));
    }
    if num_required > num_keys {
        return Err(LedgerError::Serialization(format!(
            "Message requires {} signatures but lists {} account keys",
            num_required, num_keys
        )));
    }

    let keys_end = offset + num_required * PUBKEY_LEN;
    let keys = message
        .get(offset..keys_end)
        .ok_or_else(|| LedgerError::Serialization("Truncated account keys".to_string()))?;

    Ok(keys
        .chunks_exact(PUBKEY_LEN)
        .map(|chunk| {
            let mut key = [0u8; PUBKEY_LEN];
            key.copy_from_slice(chunk);
            Pubkey(key)
        })
        .collect())
}

/// Decode a compact-u16 length prefix. Returns the value and the bytes consumed.
pub(crate) fn decode_compact_u16(bytes: &[u8]) -> LedgerResult<(usize, usize)> {
    let mut value = 0usize;
    for (i, byte) in bytes.iter().take(3).enumerate() {
        value |= ((byte & 0x7f) as usize) << (7 * i);
        if byte & 0x80 == 0 {
            if value > u16::MAX as usize {
                break;
            }
            return Ok((value, i + 1));
        }
    }
    Err(LedgerError::Serialization("Invalid compact-u16 length".to_string()))
}

/// Append a compact-u16 length prefix.
pub(crate) fn encode_compact_u16(value: usize, out: &mut Vec<u8>) -> LedgerResult<()> {
    if value > u16::MAX as usize {
        return Err(LedgerError::Serialization(format!(
            "Length {} does not fit compact-u16",
            value
        )));
    }
    let mut rem = value;
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            out.push(byte);
            return Ok(());
        }
        byte |= 0x80;
        out.push(byte);
    }
}

/// Build a minimal legacy message requiring `signers`, followed by `payload`.
///
/// The blockhash is zeroed and no read-only accounts are declared.
pub fn legacy_message_for(signers: &[Pubkey], payload: &[u8]) -> LedgerResult<Vec<u8>> {
    let required = u8::try_from(signers.len()).map_err(|_| {
        LedgerError::Serialization(format!(
            "{} signers exceed the message header limit of {}",
            signers.len(),
            u8::MAX
        ))
    })?;

    let mut message = vec![required, 0, 0];
    encode_compact_u16(signers.len(), &mut message)?;
    for key in signers {
        message.extend_from_slice(&key.0);
    }
    message.extend_from_slice(&[0u8; 32]); // recent blockhash
    message.extend_from_slice(payload);
    Ok(message)
}
