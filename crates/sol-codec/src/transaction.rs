//! Legacy transaction message compilation, signing and wire format.
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```
//!
//! Signature slot `i` belongs to `account_keys[i]`; the fee payer is always
//! slot 0.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::address::Address;
use crate::error::SolError;
use crate::keypair::Keypair;
use crate::signature::Signature;

/// Solana packets are capped at 1232 bytes of payload.
pub const PACKET_DATA_SIZE: usize = 1232;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in the compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

/// Decode a compact-u16 value from the start of `data`.
///
/// Returns `(value, bytes_consumed)` or an error if the data is truncated.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), SolError> {
    let mut value: u32 = 0;
    let mut shift = 0u32;
    let mut consumed = 0usize;

    loop {
        let byte = *data.get(consumed).ok_or_else(|| {
            SolError::SerializationError(
                "unexpected end of data while decoding compact-u16".into(),
            )
        })?;
        consumed += 1;

        value |= ((byte & 0x7f) as u32) << shift;
        shift += 7;

        if byte & 0x80 == 0 || consumed >= 3 {
            break;
        }
    }

    if value > u16::MAX as u32 {
        return Err(SolError::SerializationError(
            "compact-u16 value overflow".into(),
        ));
    }

    Ok((value as u16, consumed))
}

fn compact_len(len: usize, what: &str) -> Result<Vec<u8>, SolError> {
    let len = u16::try_from(len)
        .map_err(|_| SolError::TransactionBuildError(format!("too many {what}: {len}")))?;
    Ok(encode_compact_u16(len))
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A single account reference in an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMeta {
    pub pubkey: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// Writable account.
    pub fn new(pubkey: Address, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    /// Read-only account.
    pub fn new_readonly(pubkey: Address, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A program call before it is compiled into a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub program_id: Address,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// A recent blockhash, the freshness anchor of a message.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Blockhash([u8; 32]);

impl Blockhash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blockhash({self})")
    }
}

impl FromStr for Blockhash {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::address::address_to_bytes(s).map(Self)
    }
}

impl Serialize for Blockhash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Blockhash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Message header counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageHeader {
    /// Number of required signatures (first N accounts are signers).
    pub num_required_signatures: u8,
    /// How many of the signing accounts are read-only.
    pub num_readonly_signed: u8,
    /// How many of the non-signing accounts are read-only.
    pub num_readonly_unsigned: u8,
}

/// An instruction whose account references are indices into
/// `Message::account_keys`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// The signed portion of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    /// Account keys in canonical order:
    ///   1. writable signers (fee payer first)
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<Address>,
    pub recent_blockhash: Blockhash,
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Compile instructions into a message paid for by `fee_payer`.
    pub fn compile(
        instructions: &[Instruction],
        fee_payer: &Address,
        recent_blockhash: Blockhash,
    ) -> Result<Self, SolError> {
        if instructions.is_empty() {
            return Err(SolError::TransactionBuildError(
                "transaction needs at least one instruction".into(),
            ));
        }

        // Instruction account lists are tiny; a Vec keeps first-seen order.
        struct AccountEntry {
            pubkey: Address,
            is_signer: bool,
            is_writable: bool,
        }

        let mut entries: Vec<AccountEntry> = Vec::new();

        let mut upsert = |pubkey: Address, signer: bool, writable: bool| {
            if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
                entry.is_signer |= signer;
                entry.is_writable |= writable;
            } else {
                entries.push(AccountEntry {
                    pubkey,
                    is_signer: signer,
                    is_writable: writable,
                });
            }
        };

        // Fee payer is always signer + writable.
        upsert(*fee_payer, true, true);

        for ix in instructions {
            for meta in &ix.accounts {
                upsert(meta.pubkey, meta.is_signer, meta.is_writable);
            }
            upsert(ix.program_id, false, false);
        }

        // Stable sort keeps insertion order within a category, so the fee
        // payer stays at index 0.
        entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
            (true, true) => 0u8,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        });

        if entries.len() > u8::MAX as usize + 1 {
            return Err(SolError::TransactionBuildError(format!(
                "{} accounts exceed the u8 index space",
                entries.len()
            )));
        }

        let count = |f: &dyn Fn(&AccountEntry) -> bool| entries.iter().filter(|e| f(e)).count() as u8;
        let header = MessageHeader {
            num_required_signatures: count(&|e| e.is_signer),
            num_readonly_signed: count(&|e| e.is_signer && !e.is_writable),
            num_readonly_unsigned: count(&|e| !e.is_signer && !e.is_writable),
        };

        let account_keys: Vec<Address> = entries.iter().map(|e| e.pubkey).collect();

        let index_of = |key: &Address| -> Result<u8, SolError> {
            account_keys
                .iter()
                .position(|k| k == key)
                .map(|i| i as u8)
                .ok_or_else(|| {
                    SolError::TransactionBuildError(format!("{key} not in account keys"))
                })
        };

        let mut compiled = Vec::with_capacity(instructions.len());
        for ix in instructions {
            let program_id_index = index_of(&ix.program_id)?;
            let account_indices = ix
                .accounts
                .iter()
                .map(|meta| index_of(&meta.pubkey))
                .collect::<Result<Vec<_>, _>>()?;

            compiled.push(CompiledInstruction {
                program_id_index,
                account_indices,
                data: ix.data.clone(),
            });
        }

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions: compiled,
        })
    }

    pub fn fee_payer(&self) -> Option<&Address> {
        self.account_keys.first()
    }

    /// The accounts that must sign, in slot order.
    pub fn signer_keys(&self) -> &[Address] {
        let n = (self.header.num_required_signatures as usize).min(self.account_keys.len());
        &self.account_keys[..n]
    }

    /// Serialize the message (the bytes that get signed).
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let mut buf = Vec::with_capacity(256);

        buf.push(self.header.num_required_signatures);
        buf.push(self.header.num_readonly_signed);
        buf.push(self.header.num_readonly_unsigned);

        buf.extend_from_slice(&compact_len(self.account_keys.len(), "account keys")?);
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_bytes());
        }

        buf.extend_from_slice(self.recent_blockhash.as_bytes());

        buf.extend_from_slice(&compact_len(self.instructions.len(), "instructions")?);
        for ix in &self.instructions {
            buf.push(ix.program_id_index);

            buf.extend_from_slice(&compact_len(ix.account_indices.len(), "instruction accounts")?);
            buf.extend_from_slice(&ix.account_indices);

            buf.extend_from_slice(&compact_len(ix.data.len(), "instruction data bytes")?);
            buf.extend_from_slice(&ix.data);
        }

        Ok(buf)
    }

    /// Parse a serialized message, returning it and the bytes consumed.
    pub fn deserialize(data: &[u8]) -> Result<(Self, usize), SolError> {
        let mut cursor = Cursor { data, pos: 0 };

        let header = MessageHeader {
            num_required_signatures: cursor.byte()?,
            num_readonly_signed: cursor.byte()?,
            num_readonly_unsigned: cursor.byte()?,
        };

        let num_keys = cursor.compact()?;
        let mut account_keys = Vec::with_capacity(num_keys);
        for _ in 0..num_keys {
            account_keys.push(Address::try_from_slice(cursor.bytes(32)?)?);
        }

        let mut blockhash = [0u8; 32];
        blockhash.copy_from_slice(cursor.bytes(32)?);

        let num_ix = cursor.compact()?;
        let mut instructions = Vec::with_capacity(num_ix);
        for _ in 0..num_ix {
            let program_id_index = cursor.byte()?;
            let n = cursor.compact()?;
            let account_indices = cursor.bytes(n)?.to_vec();
            let len = cursor.compact()?;
            let data = cursor.bytes(len)?.to_vec();
            instructions.push(CompiledInstruction {
                program_id_index,
                account_indices,
                data,
            });
        }

        Ok((
            Self {
                header,
                account_keys,
                recent_blockhash: Blockhash::new(blockhash),
                instructions,
            },
            cursor.pos,
        ))
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn bytes(&mut self, n: usize) -> Result<&'a [u8], SolError> {
        let end = self.pos.checked_add(n).filter(|end| *end <= self.data.len());
        let end = end.ok_or_else(|| {
            SolError::SerializationError(format!("transaction truncated at offset {}", self.pos))
        })?;
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn byte(&mut self) -> Result<u8, SolError> {
        Ok(self.bytes(1)?[0])
    }

    fn compact(&mut self) -> Result<usize, SolError> {
        let (value, used) = decode_compact_u16(&self.data[self.pos..])?;
        self.pos += used;
        Ok(value as usize)
    }
}

/// A message plus one signature slot per required signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
}

impl Transaction {
    /// Wrap a message with empty signature slots.
    pub fn new_unsigned(message: Message) -> Self {
        let slots = message.header.num_required_signatures as usize;
        Self {
            signatures: vec![Signature::empty(); slots],
            message,
        }
    }

    /// Compile `instructions` with `fee_payer` in slot 0.
    pub fn new_with_payer(
        instructions: &[Instruction],
        fee_payer: &Address,
        recent_blockhash: Blockhash,
    ) -> Result<Self, SolError> {
        Message::compile(instructions, fee_payer, recent_blockhash).map(Self::new_unsigned)
    }

    /// Sign with every keypair in `signers`; each must be a required signer.
    ///
    /// Slots belonging to other signers are left untouched.
    pub fn partial_sign(&mut self, signers: &[&Keypair]) -> Result<(), SolError> {
        if signers.is_empty() {
            return Ok(());
        }
        let message = self.message.serialize()?;
        for keypair in signers {
            let address = keypair.address();
            let slot = self.slot_of(&address).ok_or_else(|| {
                SolError::SigningError(format!("{address} is not a required signer"))
            })?;
            self.signatures[slot] = keypair.sign_message(&message);
        }
        Ok(())
    }

    /// Place an externally produced signature into the signer's slot.
    pub fn add_signature(&mut self, signer: &Address, signature: Signature) -> Result<(), SolError> {
        let slot = self.slot_of(signer).ok_or_else(|| {
            SolError::SigningError(format!("{signer} is not a required signer"))
        })?;
        self.signatures[slot] = signature;
        Ok(())
    }

    fn slot_of(&self, address: &Address) -> Option<usize> {
        self.message.signer_keys().iter().position(|k| k == address)
    }

    /// Required signers whose slot is still empty.
    pub fn missing_signers(&self) -> Vec<Address> {
        self.message
            .signer_keys()
            .iter()
            .zip(&self.signatures)
            .filter(|(_, sig)| sig.is_empty())
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn is_fully_signed(&self) -> bool {
        self.signatures.len() == self.message.signer_keys().len() && self.missing_signers().is_empty()
    }

    /// Check every filled slot against the message with its signer's key.
    pub fn verify_signatures(&self) -> Result<(), SolError> {
        use ed25519_dalek::{Verifier, VerifyingKey};

        let message = self.message.serialize()?;
        for (key, sig) in self.message.signer_keys().iter().zip(&self.signatures) {
            if sig.is_empty() {
                continue;
            }
            let vk = VerifyingKey::from_bytes(key.as_bytes())
                .map_err(|e| SolError::SigningError(format!("{key}: {e}")))?;
            let dalek_sig = ed25519_dalek::Signature::from_bytes(sig.as_bytes());
            vk.verify(&message, &dalek_sig)
                .map_err(|_| SolError::SigningError(format!("invalid signature for {key}")))?;
        }
        Ok(())
    }

    /// The fee payer's signature, which identifies the submission.
    pub fn id(&self) -> Option<Signature> {
        self.signatures.first().copied().filter(|s| !s.is_empty())
    }

    /// Serialize to wire format, requiring every signature slot to be filled.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let missing = self.missing_signers();
        if !missing.is_empty() {
            let list: Vec<String> = missing.iter().map(ToString::to_string).collect();
            return Err(SolError::SigningError(format!(
                "missing signatures for {}",
                list.join(", ")
            )));
        }
        let wire = self.serialize_partial()?;
        if wire.len() > PACKET_DATA_SIZE {
            return Err(SolError::TransactionBuildError(format!(
                "transaction is {} bytes, limit is {PACKET_DATA_SIZE}",
                wire.len()
            )));
        }
        Ok(wire)
    }

    /// Serialize to wire format, leaving empty slots zeroed. Used to hand a
    /// partially signed transaction to an external signer.
    pub fn serialize_partial(&self) -> Result<Vec<u8>, SolError> {
        let message = self.message.serialize()?;
        let mut wire = Vec::with_capacity(3 + self.signatures.len() * 64 + message.len());
        wire.extend_from_slice(&compact_len(self.signatures.len(), "signatures")?);
        for sig in &self.signatures {
            wire.extend_from_slice(sig.as_bytes());
        }
        wire.extend_from_slice(&message);
        Ok(wire)
    }

    /// Parse a wire-format transaction.
    pub fn deserialize(raw: &[u8]) -> Result<Self, SolError> {
        let (num_sigs, prefix) = decode_compact_u16(raw)?;
        let sigs_end = prefix + num_sigs as usize * 64;
        if sigs_end > raw.len() {
            return Err(SolError::SerializationError(
                "transaction too short: signature slots exceed length".into(),
            ));
        }

        let signatures = raw[prefix..sigs_end]
            .chunks_exact(64)
            .map(|chunk| {
                let mut arr = [0u8; 64];
                arr.copy_from_slice(chunk);
                Signature::new(arr)
            })
            .collect::<Vec<_>>();

        let (message, used) = Message::deserialize(&raw[sigs_end..])?;
        if sigs_end + used != raw.len() {
            return Err(SolError::SerializationError(format!(
                "{} trailing bytes after message",
                raw.len() - sigs_end - used
            )));
        }
        if signatures.len() != message.header.num_required_signatures as usize {
            return Err(SolError::SerializationError(format!(
                "{} signatures for {} required signers",
                signatures.len(),
                message.header.num_required_signatures
            )));
        }

        Ok(Self {
            signatures,
            message,
        })
    }
}
