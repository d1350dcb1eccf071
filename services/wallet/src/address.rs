//! Address validation and deposit address derivation
//!
//! Validation is fail-closed: anything not positively matching the asset's
//! addressing scheme is rejected, including assets with no known scheme.
//! These are format checks only, no checksum verification against the
//! network.

use sha2::{Digest, Sha256};
use types::ids::AccountId;

/// Addressing scheme for one asset family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scheme {
    /// Legacy Base58 (`1`/`3`, 26-35 chars) or Bech32 (`bc1`).
    Bitcoin,
    /// `0x` + 40 hex digits; shared by ERC-20 tokens.
    Ethereum,
}

fn scheme_for(asset: &str) -> Option<Scheme> {
    match asset {
        "BTC" => Some(Scheme::Bitcoin),
        "ETH" | "USDT" | "USDC" => Some(Scheme::Ethereum),
        _ => None,
    }
}

/// Validate an address against the asset's scheme. Unknown assets and any
/// malformed input are rejected.
pub fn validate_address(address: &str, asset: &str) -> bool {
    match scheme_for(asset) {
        Some(Scheme::Bitcoin) => is_btc_legacy(address) || is_btc_bech32(address),
        Some(Scheme::Ethereum) => is_eth_hex(address),
        None => false,
    }
}

// Base58 alphabet omits 0, O, I, l.
fn is_base58_char(c: char) -> bool {
    c.is_ascii_alphanumeric() && !matches!(c, '0' | 'O' | 'I' | 'l')
}

fn is_btc_legacy(address: &str) -> bool {
    let mut chars = address.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    (first == '1' || first == '3')
        && (26..=35).contains(&address.len())
        && address.chars().all(is_base58_char)
}

// Bech32 data part alphabet.
const BECH32_CHARSET: &[u8] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

fn is_btc_bech32(address: &str) -> bool {
    let data = match address.strip_prefix("bc1") {
        Some(d) => d,
        None => return false,
    };
    (6..=87).contains(&data.len())
        && data
            .bytes()
            .all(|b| BECH32_CHARSET.contains(&b.to_ascii_lowercase()))
}

fn is_eth_hex(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex_part) => {
            hex_part.len() == 40 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// Derive a deterministic deposit address for (account, asset), rendered in
/// the asset's scheme. The same pair always derives the same address.
/// Returns `None` for assets with no known scheme.
pub fn generate_deposit_address(account: AccountId, asset: &str) -> Option<String> {
    let scheme = scheme_for(asset)?;

    let mut hasher = Sha256::new();
    hasher.update(account.as_uuid().as_bytes());
    hasher.update(asset.as_bytes());
    let digest = hasher.finalize();

    Some(match scheme {
        Scheme::Bitcoin => {
            // Render as bech32: witness-v0-style prefix plus 32 data chars
            // drawn from the digest.
            let mut addr = String::with_capacity(36);
            addr.push_str("bc1q");
            for byte in digest.iter().take(32) {
                addr.push(BECH32_CHARSET[(*byte as usize) % 32] as char);
            }
            addr
        }
        Scheme::Ethereum => format!("0x{}", hex::encode(&digest[..20])),
    })
}
