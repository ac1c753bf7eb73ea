// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet address format validation.
//!
//! Validation is purely syntactic: character set, length, encoding checksum
//! and (for Cardano) the address header. Nothing here touches the network.
//!
//! | Chain | Accepted format |
//! |-------|-----------------|
//! | `eth` | `0x` + 40 hex digits; mixed case must carry a valid EIP-55 checksum |
//! | `sol` | base58 string decoding to a 32-byte ed25519 public key |
//! | `ada` | Shelley `addr1…` bech32 mainnet address, or Byron `Ae2…` / `DdzFF…` base58 address with a matching CRC32 |

use alloy::primitives::Address;
use bech32::primitives::decode::CheckedHrpstring;
use bech32::Bech32;

use super::Blockchain;

/// Human-readable part of Shelley mainnet payment addresses.
const SHELLEY_MAINNET_HRP: &str = "addr";

/// Byron-era address prefixes (Icarus style and Daedalus style).
const BYRON_PREFIXES: [&str; 2] = ["Ae2", "DdzFF"];

/// Shelley header network id for mainnet.
const SHELLEY_MAINNET_NETWORK: u8 = 0x01;

/// Length of a Blake2b-224 key or script hash.
const CREDENTIAL_HASH_LEN: usize = 28;

/// CBOR array of two followed by tag 24 (encoded CBOR data item).
const BYRON_ENVELOPE_HEADER: [u8; 3] = [0x82, 0xd8, 0x18];

/// Address root hash (28 bytes) plus the attribute and type fields.
const BYRON_MIN_PAYLOAD_LEN: usize = 32;

const CBOR_UNSIGNED: u8 = 0;
const CBOR_BYTE_STRING: u8 = 2;

/// Validate `address` against the format of `chain`.
pub fn validate(chain: Blockchain, address: &str) -> bool {
    match chain {
        Blockchain::Eth => is_valid_eth_address(address),
        Blockchain::Sol => is_valid_sol_address(address),
        Blockchain::Ada => is_valid_ada_address(address),
    }
}

/// Validate an Ethereum address.
///
/// All-lowercase and all-uppercase hex is accepted as-is; mixed case is
/// treated as an EIP-55 checksum and must match.
pub fn is_valid_eth_address(address: &str) -> bool {
    let Some(hex) = address.strip_prefix("0x") else {
        return false;
    };
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(address, None).is_ok()
    } else {
        true
    }
}

/// Validate a Solana address (base58-encoded 32-byte public key).
pub fn is_valid_sol_address(address: &str) -> bool {
    if !(32..=44).contains(&address.len()) {
        return false;
    }
    matches!(bs58::decode(address).into_vec(), Ok(bytes) if bytes.len() == 32)
}

/// Validate a Cardano address.
pub fn is_valid_ada_address(address: &str) -> bool {
    if address.starts_with("addr1") {
        is_valid_shelley_address(address)
    } else if BYRON_PREFIXES.iter().any(|prefix| address.starts_with(prefix)) {
        is_valid_byron_address(address)
    } else {
        false
    }
}

fn is_valid_shelley_address(address: &str) -> bool {
    let Ok(checked) = CheckedHrpstring::new::<Bech32>(address) else {
        return false;
    };
    if checked.hrp().as_str() != SHELLEY_MAINNET_HRP {
        return false;
    }

    let payload: Vec<u8> = checked.byte_iter().collect();
    let Some(&header) = payload.first() else {
        return false;
    };
    if header & 0x0f != SHELLEY_MAINNET_NETWORK {
        return false;
    }

    let body_len = payload.len() - 1;
    match header >> 4 {
        // Base address: payment credential + stake credential
        0..=3 => body_len == 2 * CREDENTIAL_HASH_LEN,
        // Pointer address: payment credential + variable-length pointer
        4 | 5 => body_len > CREDENTIAL_HASH_LEN,
        // Enterprise address: payment credential only
        6 | 7 => body_len == CREDENTIAL_HASH_LEN,
        _ => false,
    }
}

/// A Byron address is base58 over the CBOR pair `[tag 24(payload), crc32]`,
/// where the CRC covers the payload bytes.
fn is_valid_byron_address(address: &str) -> bool {
    let Ok(bytes) = bs58::decode(address).into_vec() else {
        return false;
    };
    let Some(rest) = bytes.strip_prefix(&BYRON_ENVELOPE_HEADER) else {
        return false;
    };

    let Some((payload_len, rest)) = cbor_head(rest, CBOR_BYTE_STRING) else {
        return false;
    };
    let Ok(payload_len) = usize::try_from(payload_len) else {
        return false;
    };
    if payload_len < BYRON_MIN_PAYLOAD_LEN || rest.len() < payload_len {
        return false;
    }
    let (payload, rest) = rest.split_at(payload_len);

    match cbor_head(rest, CBOR_UNSIGNED) {
        Some((crc, [])) => crc == u64::from(crc32fast::hash(payload)),
        _ => false,
    }
}

/// Read a CBOR item head of the given major type, returning its argument and
/// the remaining input. Indefinite lengths are rejected.
fn cbor_head(input: &[u8], major: u8) -> Option<(u64, &[u8])> {
    let (&initial, rest) = input.split_first()?;
    if initial >> 5 != major {
        return None;
    }
    let width = match initial & 0x1f {
        info @ 0..=23 => return Some((u64::from(info), rest)),
        24 => 1,
        25 => 2,
        26 => 4,
        27 => 8,
        _ => return None,
    };
    if rest.len() < width {
        return None;
    }
    let (argument, rest) = rest.split_at(width);
    let value = argument
        .iter()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte));
    Some((value, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bech32::Hrp;

    const ETH_CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const SOL_TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
    const SOL_SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";
    const ADA_BYRON: &str = "Ae2tdPwUPEZFRbyhz3cpfC2CumGzNkFBN2L42rcUc2yjQpEkxDbkPodpMAi";

    fn shelley(hrp: &str, header: u8, body_len: usize) -> String {
        let mut payload = vec![header];
        payload.extend((0..body_len).map(|i| i as u8));
        bech32::encode::<Bech32>(Hrp::parse(hrp).unwrap(), &payload).unwrap()
    }

    #[test]
    fn eth_accepts_checksummed_lowercase_and_uppercase() {
        assert!(validate(Blockchain::Eth, ETH_CHECKSUMMED));
        assert!(validate(Blockchain::Eth, &ETH_CHECKSUMMED.to_lowercase()));
        let upper = format!("0x{}", ETH_CHECKSUMMED[2..].to_uppercase());
        assert!(validate(Blockchain::Eth, &upper));
    }

    #[test]
    fn eth_rejects_bad_checksum_and_shape() {
        // Flip the case of one checksummed letter
        assert!(!validate(Blockchain::Eth, "0x5aaeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
        assert!(!validate(Blockchain::Eth, "5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
        assert!(!validate(Blockchain::Eth, "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeA"));
        assert!(!validate(Blockchain::Eth, "0xzzzeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        assert!(!validate(Blockchain::Eth, ""));
    }

    #[test]
    fn sol_accepts_32_byte_keys() {
        assert!(validate(Blockchain::Sol, SOL_TOKEN_PROGRAM));
        assert!(validate(Blockchain::Sol, SOL_SYSTEM_PROGRAM));
    }

    #[test]
    fn sol_rejects_non_base58_and_wrong_length() {
        // '0', 'O', 'I' and 'l' are outside the base58 alphabet
        assert!(!validate(Blockchain::Sol, "0okenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"));
        assert!(!validate(Blockchain::Sol, "TokenkegQfeZyiNwAJbNbGKPFXCW"));
        assert!(!validate(Blockchain::Sol, ""));
    }

    #[test]
    fn ada_accepts_shelley_base_and_enterprise_addresses() {
        let base = shelley("addr", 0x01, 56);
        let enterprise = shelley("addr", 0x61, 28);
        let pointer = shelley("addr", 0x41, 31);
        assert!(validate(Blockchain::Ada, &base));
        assert!(validate(Blockchain::Ada, &enterprise));
        assert!(validate(Blockchain::Ada, &pointer));
    }

    #[test]
    fn ada_rejects_testnet_and_malformed_shelley_addresses() {
        // Testnet hrp and testnet network id
        assert!(!validate(Blockchain::Ada, &shelley("addr_test", 0x00, 56)));
        // Mainnet hrp but testnet network id in the header
        assert!(!validate(Blockchain::Ada, &shelley("addr", 0x60, 28)));
        // Truncated enterprise credential
        assert!(!validate(Blockchain::Ada, &shelley("addr", 0x61, 20)));

        // Corrupt the checksum by changing the last character
        let mut corrupted = shelley("addr", 0x61, 28);
        let last = corrupted.pop().unwrap();
        corrupted.push(if last == 'q' { 'p' } else { 'q' });
        assert!(!validate(Blockchain::Ada, &corrupted));
    }

    /// Base58 Byron envelope around `payload` with the given CRC.
    fn byron_envelope(payload: &[u8], crc: u32) -> String {
        let mut bytes = BYRON_ENVELOPE_HEADER.to_vec();
        match payload.len() {
            len @ 0..=23 => bytes.push(0x40 | len as u8),
            len @ 24..=255 => bytes.extend([0x58, len as u8]),
            len => {
                bytes.push(0x59);
                bytes.extend((len as u16).to_be_bytes());
            }
        }
        bytes.extend_from_slice(payload);
        bytes.push(0x1a);
        bytes.extend(crc.to_be_bytes());
        bs58::encode(bytes).into_string()
    }

    #[test]
    fn ada_accepts_byron_addresses() {
        assert!(validate(Blockchain::Ada, ADA_BYRON));
        assert!(!validate(Blockchain::Ada, "Ae2tdPwUPEZ0"));
    }

    #[test]
    fn ada_rejects_byron_address_with_typo() {
        let last_changed = format!("{}j", &ADA_BYRON[..ADA_BYRON.len() - 1]);
        let second_last_changed = format!("{}Bi", &ADA_BYRON[..ADA_BYRON.len() - 2]);
        assert!(!validate(Blockchain::Ada, &last_changed));
        assert!(!validate(Blockchain::Ada, &second_last_changed));
    }

    #[test]
    fn byron_envelope_crc_must_match_payload() {
        let short: Vec<u8> = (0..40).collect();
        let long: Vec<u8> = (0..=255).chain(0..44).collect();
        for payload in [&short, &long] {
            let crc = crc32fast::hash(payload);
            assert!(is_valid_byron_address(&byron_envelope(payload, crc)));
            assert!(!is_valid_byron_address(&byron_envelope(payload, crc ^ 1)));
        }

        // Payload too short to hold a root hash
        let tiny = [7u8; 8];
        assert!(!is_valid_byron_address(&byron_envelope(&tiny, crc32fast::hash(&tiny))));
    }

    #[test]
    fn addresses_for_another_chain_are_rejected() {
        let ada = shelley("addr", 0x61, 28);

        assert!(!validate(Blockchain::Eth, SOL_TOKEN_PROGRAM));
        assert!(!validate(Blockchain::Eth, &ada));
        assert!(!validate(Blockchain::Sol, ETH_CHECKSUMMED));
        assert!(!validate(Blockchain::Sol, &ada));
        assert!(!validate(Blockchain::Ada, ETH_CHECKSUMMED));
        assert!(!validate(Blockchain::Ada, SOL_TOKEN_PROGRAM));
    }

    #[test]
    fn empty_address_is_rejected_for_every_chain() {
        for chain in crate::blockchain::SUPPORTED_CHAINS {
            assert!(!validate(chain, ""), "{chain} accepted an empty address");
        }
    }
}
