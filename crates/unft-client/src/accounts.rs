//! Typed views of the program's accounts.
//!
//! Every account starts with the 8-byte `account:<TypeName>` discriminator,
//! followed by its fields in declaration order. Accounts are allocated at
//! their maximum size, so trailing bytes after the last field are expected
//! and ignored. A buffer that ends inside a field is always an error.

use serde::{Deserialize, Serialize};
use sol_codec::{account_discriminator, Address, SolError, WireReader, WireWriter};

/// A remote account layout.
pub trait AccountRecord: Sized {
    /// Struct name the remote program declares; hashed into the
    /// discriminator.
    const TYPE_NAME: &'static str;

    fn read_fields(reader: &mut WireReader<'_>) -> Result<Self, SolError>;

    fn write_fields(&self, writer: &mut WireWriter) -> Result<(), SolError>;

    /// Validate the discriminator and decode the fields.
    fn decode(data: &[u8]) -> Result<Self, SolError> {
        let mut reader = WireReader::new(data);
        reader.expect_discriminator(Self::TYPE_NAME, &account_discriminator(Self::TYPE_NAME))?;
        Self::read_fields(&mut reader)
    }

    /// Discriminator followed by the fields, with no trailing padding.
    fn encode(&self) -> Result<Vec<u8>, SolError> {
        let mut writer = WireWriter::with_prefix(&account_discriminator(Self::TYPE_NAME));
        self.write_fields(&mut writer)?;
        Ok(writer.into_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramState {
    pub authority: Address,
    pub name: String,
    pub symbol: String,
    pub gateway: Address,
    pub gas_limit: u64,
    pub uniswap_router: Address,
    pub is_paused: bool,
    /// Sequence number the next mint will receive.
    pub next_token_id: u64,
    pub total_supply: u64,
    pub is_initialized: bool,
}

impl AccountRecord for ProgramState {
    const TYPE_NAME: &'static str = "ProgramState";

    fn read_fields(r: &mut WireReader<'_>) -> Result<Self, SolError> {
        Ok(Self {
            authority: r.read_address("authority")?,
            name: r.read_string("name")?,
            symbol: r.read_string("symbol")?,
            gateway: r.read_address("gateway")?,
            gas_limit: r.read_u64("gas_limit")?,
            uniswap_router: r.read_address("uniswap_router")?,
            is_paused: r.read_bool("is_paused")?,
            next_token_id: r.read_u64("next_token_id")?,
            total_supply: r.read_u64("total_supply")?,
            is_initialized: r.read_bool("is_initialized")?,
        })
    }

    fn write_fields(&self, w: &mut WireWriter) -> Result<(), SolError> {
        w.put_address(&self.authority)
            .put_string(&self.name)?
            .put_string(&self.symbol)?
            .put_address(&self.gateway)
            .put_u64(self.gas_limit)
            .put_address(&self.uniswap_router)
            .put_bool(self.is_paused)
            .put_u64(self.next_token_id)
            .put_u64(self.total_supply)
            .put_bool(self.is_initialized);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerableRecord {
    pub token_id: u64,
    pub owner: Address,
    pub index_in_owner_list: u64,
}

impl AccountRecord for EnumerableRecord {
    const TYPE_NAME: &'static str = "EnumerableData";

    fn read_fields(r: &mut WireReader<'_>) -> Result<Self, SolError> {
        Ok(Self {
            token_id: r.read_u64("token_id")?,
            owner: r.read_address("owner")?,
            index_in_owner_list: r.read_u64("index_in_owner_list")?,
        })
    }

    fn write_fields(&self, w: &mut WireWriter) -> Result<(), SolError> {
        w.put_u64(self.token_id)
            .put_address(&self.owner)
            .put_u64(self.index_in_owner_list);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConnection {
    pub chain_id: u64,
    pub contract_address: String,
    pub is_active: bool,
}

impl AccountRecord for ChainConnection {
    const TYPE_NAME: &'static str = "ChainConnection";

    fn read_fields(r: &mut WireReader<'_>) -> Result<Self, SolError> {
        Ok(Self {
            chain_id: r.read_u64("chain_id")?,
            contract_address: r.read_string("contract_address")?,
            is_active: r.read_bool("is_active")?,
        })
    }

    fn write_fields(&self, w: &mut WireWriter) -> Result<(), SolError> {
        w.put_u64(self.chain_id)
            .put_string(&self.contract_address)?
            .put_bool(self.is_active);
        Ok(())
    }
}

/// An outbound transfer awaiting relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransfer {
    pub destination_chain: u64,
    pub receiver: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftRecord {
    pub token_id: u64,
    pub uri: String,
    pub owner: Address,
    pub is_burned: bool,
    /// Set when the item arrived from another chain.
    pub original_chain: Option<u64>,
    pub pending_transfer: Option<PendingTransfer>,
    pub mint_timestamp: i64,
}

impl AccountRecord for NftRecord {
    const TYPE_NAME: &'static str = "NftData";

    fn read_fields(r: &mut WireReader<'_>) -> Result<Self, SolError> {
        Ok(Self {
            token_id: r.read_u64("token_id")?,
            uri: r.read_string("uri")?,
            owner: r.read_address("owner")?,
            is_burned: r.read_bool("is_burned")?,
            original_chain: r.read_option("original_chain", |r| r.read_u64("original_chain"))?,
            pending_transfer: r.read_option("pending_transfer", |r| {
                Ok(PendingTransfer {
                    destination_chain: r.read_u64("pending_transfer.destination_chain")?,
                    receiver: r.read_string("pending_transfer.receiver")?,
                    timestamp: r.read_i64("pending_transfer.timestamp")?,
                })
            })?,
            mint_timestamp: r.read_i64("mint_timestamp")?,
        })
    }

    fn write_fields(&self, w: &mut WireWriter) -> Result<(), SolError> {
        w.put_u64(self.token_id)
            .put_string(&self.uri)?
            .put_address(&self.owner)
            .put_bool(self.is_burned);
        match self.original_chain {
            Some(chain) => w.put_u8(1).put_u64(chain),
            None => w.put_u8(0),
        };
        match &self.pending_transfer {
            Some(p) => {
                w.put_u8(1)
                    .put_u64(p.destination_chain)
                    .put_string(&p.receiver)?
                    .put_i64(p.timestamp);
            }
            None => {
                w.put_u8(0);
            }
        }
        w.put_i64(self.mint_timestamp);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftOrigin {
    pub original_mint: Address,
    pub token_id: u64,
    pub block_number: u64,
    pub mint_timestamp: i64,
}

impl AccountRecord for NftOrigin {
    const TYPE_NAME: &'static str = "NFTOrigin";

    fn read_fields(r: &mut WireReader<'_>) -> Result<Self, SolError> {
        Ok(Self {
            original_mint: r.read_address("original_mint")?,
            token_id: r.read_u64("token_id")?,
            block_number: r.read_u64("block_number")?,
            mint_timestamp: r.read_i64("mint_timestamp")?,
        })
    }

    fn write_fields(&self, w: &mut WireWriter) -> Result<(), SolError> {
        w.put_address(&self.original_mint)
            .put_u64(self.token_id)
            .put_u64(self.block_number)
            .put_i64(self.mint_timestamp);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn state() -> ProgramState {
        ProgramState {
            authority: Address::new([1; 32]),
            name: "Universal NFT".into(),
            symbol: "UNFT".into(),
            gateway: Address::new([2; 32]),
            gas_limit: 1_000_000,
            uniswap_router: Address::new([3; 32]),
            is_paused: false,
            next_token_id: 1,
            total_supply: 0,
            is_initialized: true,
        }
    }

    fn nft() -> NftRecord {
        NftRecord {
            token_id: 7,
            uri: "ipfs://item".into(),
            owner: Address::new([4; 32]),
            is_burned: false,
            original_chain: Some(7001),
            pending_transfer: Some(PendingTransfer {
                destination_chain: 84532,
                receiver: "0xabc".into(),
                timestamp: -5,
            }),
            mint_timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn program_state_decodes_hand_built_buffer() {
        let mut buf = account_discriminator("ProgramState").to_vec();
        buf.extend_from_slice(&[1u8; 32]);
        buf.extend_from_slice(&13u32.to_le_bytes());
        buf.extend_from_slice(b"Universal NFT");
        buf.extend_from_slice(&4u32.to_le_bytes());
        buf.extend_from_slice(b"UNFT");
        buf.extend_from_slice(&[2u8; 32]);
        buf.extend_from_slice(&1_000_000u64.to_le_bytes());
        buf.extend_from_slice(&[3u8; 32]);
        buf.push(0); // is_paused
        buf.extend_from_slice(&5u64.to_le_bytes()); // next_token_id
        let total_supply_offset = buf.len();
        buf.extend_from_slice(&0x0102_0304_0506_0708u64.to_le_bytes());
        buf.push(1); // is_initialized
        buf.extend_from_slice(&[0u8; 40]); // allocation padding

        let decoded = ProgramState::decode(&buf).unwrap();
        assert!(!decoded.is_paused);
        assert_eq!(
            decoded.total_supply,
            u64::from_le_bytes(buf[total_supply_offset..total_supply_offset + 8].try_into().unwrap())
        );
        assert_eq!(decoded.total_supply, 0x0102_0304_0506_0708);
        assert_eq!(decoded.next_token_id, 5);
        assert_eq!(decoded.name, "Universal NFT");
        assert!(decoded.is_initialized);
    }

    #[test]
    fn nonzero_bool_byte_is_true() {
        let mut buf = state().encode().unwrap();
        let paused_offset = buf.len() - 1 - 8 - 8 - 1;
        buf[paused_offset] = 7;
        assert!(ProgramState::decode(&buf).unwrap().is_paused);
    }

    #[test]
    fn foreign_discriminator_is_a_type_mismatch() {
        let mut buf = state().encode().unwrap();
        buf[..8].copy_from_slice(&account_discriminator("EnumerableData"));
        assert!(matches!(
            ProgramState::decode(&buf),
            Err(SolError::DiscriminatorMismatch { type_name: "ProgramState", .. })
        ));
    }

    #[test]
    fn every_truncation_fails() {
        let encodings = [
            state().encode().unwrap(),
            nft().encode().unwrap(),
            EnumerableRecord {
                token_id: 1,
                owner: Address::new([9; 32]),
                index_in_owner_list: 0,
            }
            .encode()
            .unwrap(),
        ];
        for (kind, full) in encodings.iter().enumerate() {
            for cut in 0..full.len() {
                let result = match kind {
                    0 => ProgramState::decode(&full[..cut]).map(|_| ()),
                    1 => NftRecord::decode(&full[..cut]).map(|_| ()),
                    _ => EnumerableRecord::decode(&full[..cut]).map(|_| ()),
                };
                assert!(result.is_err(), "kind {kind} decoded at cut {cut}");
            }
        }
    }

    #[test]
    fn string_length_past_end_is_short_buffer() {
        let mut buf = account_discriminator("ChainConnection").to_vec();
        buf.extend_from_slice(&1u64.to_le_bytes());
        buf.extend_from_slice(&100u32.to_le_bytes());
        buf.extend_from_slice(b"0xabc");
        assert!(matches!(
            ChainConnection::decode(&buf),
            Err(SolError::ShortBuffer { field: "contract_address", .. })
        ));
    }

    #[test]
    fn bad_option_tag_is_rejected() {
        let mut buf = NftRecord {
            original_chain: None,
            pending_transfer: None,
            ..nft()
        }
        .encode()
        .unwrap();
        let tag_offset = buf.len() - 8 - 1 - 1;
        buf[tag_offset] = 2;
        assert!(matches!(
            NftRecord::decode(&buf),
            Err(SolError::InvalidValue { field: "original_chain", .. })
        ));
    }

    #[test]
    fn nft_record_with_options_roundtrips() {
        let record = nft();
        assert_eq!(NftRecord::decode(&record.encode().unwrap()).unwrap(), record);
    }

    #[test]
    fn origin_and_connection_roundtrip() {
        let origin = NftOrigin {
            original_mint: Address::new([8; 32]),
            token_id: 3,
            block_number: 99,
            mint_timestamp: 12,
        };
        assert_eq!(NftOrigin::decode(&origin.encode().unwrap()).unwrap(), origin);

        let conn = ChainConnection {
            chain_id: 7001,
            contract_address: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".into(),
            is_active: true,
        };
        assert_eq!(ChainConnection::decode(&conn.encode().unwrap()).unwrap(), conn);
    }

    #[test]
    fn discriminators_match_known_vectors() {
        assert_eq!(
            hex::encode(account_discriminator(ProgramState::TYPE_NAME)),
            "4dd189e59543a7e6"
        );
        assert_eq!(
            hex::encode(account_discriminator(EnumerableRecord::TYPE_NAME)),
            "81b6951c41f4af72"
        );
    }

    proptest! {
        #[test]
        fn program_state_roundtrip(
            name in "\\PC{0,50}",
            symbol in "[A-Z]{0,10}",
            gas_limit in any::<u64>(),
            is_paused in any::<bool>(),
            next_token_id in any::<u64>(),
            total_supply in any::<u64>(),
        ) {
            let record = ProgramState {
                name,
                symbol,
                gas_limit,
                is_paused,
                next_token_id,
                total_supply,
                ..state()
            };
            let decoded = ProgramState::decode(&record.encode().unwrap()).unwrap();
            prop_assert_eq!(decoded, record);
        }

        #[test]
        fn nft_record_roundtrip(
            token_id in any::<u64>(),
            uri in "\\PC{0,80}",
            original_chain in proptest::option::of(any::<u64>()),
            timestamp in any::<i64>(),
        ) {
            let record = NftRecord {
                token_id,
                uri,
                original_chain,
                mint_timestamp: timestamp,
                ..nft()
            };
            prop_assert_eq!(NftRecord::decode(&record.encode().unwrap()).unwrap(), record);
        }
    }
}
