use bech32::{Bech32, Hrp};
use sb_api_types::{AddressHex, Bech32Address};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("address is not valid hex: {0}")]
    InvalidHex(String),
    #[error("address bytes are empty")]
    Empty,
    #[error("unsupported address header 0x{0:02x}")]
    UnsupportedHeader(u8),
    #[error("invalid address length {got} for header type {header_type}")]
    InvalidLength { header_type: u8, got: usize },
    #[error("codec rejected address: {0}")]
    Rejected(String),
}

/// Turns raw address bytes into their human-readable form.
///
/// Implementations are pure: the same bytes always yield the same string.
pub trait AddressCodec {
    fn to_bech32(&self, bytes: &[u8]) -> Result<Bech32Address, DecodeError>;
}

/// Decode a wallet-supplied hex address through `codec`.
pub fn decode_address_hex(
    codec: &dyn AddressCodec,
    address: &AddressHex,
) -> Result<Bech32Address, DecodeError> {
    let raw = address.0.trim();
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(raw).map_err(|err| DecodeError::InvalidHex(err.to_string()))?;
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    codec.to_bech32(&bytes)
}

const ADDR_MAINNET: &str = "addr";
const ADDR_TESTNET: &str = "addr_test";
const STAKE_MAINNET: &str = "stake";
const STAKE_TESTNET: &str = "stake_test";

const HASH_LEN: usize = 28;

/// Shelley-era address codec following the CIP-19 header layout.
///
/// The high nibble of the header byte selects the address type, the low
/// nibble the network (1 = mainnet, anything else is a test network).
/// Byron addresses are base58, not bech32, and are rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct CardanoAddressCodec;

impl CardanoAddressCodec {
    fn prefix_for(header: u8, len: usize) -> Result<&'static str, DecodeError> {
        let header_type = header >> 4;
        let mainnet = header & 0x0f == 1;

        let expected_len = match header_type {
            0..=3 => Some(1 + 2 * HASH_LEN),
            4 | 5 => None,
            6 | 7 | 14 | 15 => Some(1 + HASH_LEN),
            _ => return Err(DecodeError::UnsupportedHeader(header)),
        };

        match expected_len {
            Some(expected) if expected != len => {
                return Err(DecodeError::InvalidLength { header_type, got: len });
            }
            // pointer addresses carry three variable-length integers after the hash
            None if len < 1 + HASH_LEN + 3 => {
                return Err(DecodeError::InvalidLength { header_type, got: len });
            }
            _ => {}
        }

        Ok(match (header_type >= 14, mainnet) {
            (false, true) => ADDR_MAINNET,
            (false, false) => ADDR_TESTNET,
            (true, true) => STAKE_MAINNET,
            (true, false) => STAKE_TESTNET,
        })
    }
}

impl AddressCodec for CardanoAddressCodec {
    fn to_bech32(&self, bytes: &[u8]) -> Result<Bech32Address, DecodeError> {
        let Some(&header) = bytes.first() else {
            return Err(DecodeError::Empty);
        };
        let prefix = Self::prefix_for(header, bytes.len())?;
        let hrp = Hrp::parse(prefix).map_err(|err| DecodeError::Rejected(err.to_string()))?;
        let encoded = bech32::encode::<Bech32>(hrp, bytes)
            .map_err(|err| DecodeError::Rejected(err.to_string()))?;
        Ok(Bech32Address(encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address_bytes(header: u8, len: usize) -> Vec<u8> {
        let mut bytes = vec![header];
        bytes.extend((1..len).map(|i| (i * 7 % 251) as u8));
        bytes
    }

    #[test]
    fn base_address_mainnet_uses_addr_prefix() {
        let bytes = address_bytes(0x01, 57);
        let encoded = CardanoAddressCodec.to_bech32(&bytes).unwrap();
        assert!(encoded.0.starts_with("addr1"), "{}", encoded.0);

        let (hrp, data) = bech32::decode(&encoded.0).unwrap();
        assert_eq!(hrp.as_str(), "addr");
        assert_eq!(data, bytes);
    }

    #[test]
    fn network_nibble_and_reward_type_pick_prefix() {
        let cases = [
            (0x00, 57, "addr_test1"),
            (0x61, 29, "addr1"),
            (0x70, 29, "addr_test1"),
            (0xe1, 29, "stake1"),
            (0xf0, 29, "stake_test1"),
        ];
        for (header, len, prefix) in cases {
            let encoded = CardanoAddressCodec.to_bech32(&address_bytes(header, len)).unwrap();
            assert!(encoded.0.starts_with(prefix), "header {header:#04x}: {}", encoded.0);
        }
    }

    #[test]
    fn pointer_address_needs_pointer_bytes() {
        assert!(CardanoAddressCodec.to_bech32(&address_bytes(0x41, 32)).is_ok());
        assert_eq!(
            CardanoAddressCodec.to_bech32(&address_bytes(0x41, 29)),
            Err(DecodeError::InvalidLength { header_type: 4, got: 29 })
        );
    }

    #[test]
    fn rejects_byron_and_reserved_headers() {
        assert_eq!(
            CardanoAddressCodec.to_bech32(&address_bytes(0x82, 40)),
            Err(DecodeError::UnsupportedHeader(0x82))
        );
        assert_eq!(
            CardanoAddressCodec.to_bech32(&address_bytes(0x91, 29)),
            Err(DecodeError::UnsupportedHeader(0x91))
        );
    }

    #[test]
    fn rejects_truncated_base_address() {
        assert_eq!(
            CardanoAddressCodec.to_bech32(&address_bytes(0x01, 30)),
            Err(DecodeError::InvalidLength { header_type: 0, got: 30 })
        );
    }

    #[test]
    fn hex_decoding_is_deterministic() {
        let hex_addr = AddressHex(hex::encode(address_bytes(0x61, 29)));
        let first = decode_address_hex(&CardanoAddressCodec, &hex_addr).unwrap();
        let second = decode_address_hex(&CardanoAddressCodec, &hex_addr).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn hex_errors_are_reported_before_the_codec_runs() {
        let err = decode_address_hex(&CardanoAddressCodec, &AddressHex("zz".to_owned())).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidHex(_)));

        let err = decode_address_hex(&CardanoAddressCodec, &AddressHex(String::new())).unwrap_err();
        assert_eq!(err, DecodeError::Empty);
    }
}
