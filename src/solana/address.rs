/// Solana public keys are 32 bytes, base58-encoded.
pub const PUBKEY_BYTES: usize = 32;

/// Validate a wallet or mint address. Returns true only for well-formed
/// base58 strings that decode to exactly 32 bytes.
pub fn is_valid_address(address: &str) -> bool {
    parse_address(address).is_some()
}

/// Decode an address into its raw 32-byte form.
pub fn parse_address(address: &str) -> Option<[u8; PUBKEY_BYTES]> {
    match bs58::decode(address).into_vec() {
        Ok(bytes) if bytes.len() == PUBKEY_BYTES => {
            let mut key = [0u8; PUBKEY_BYTES];
            key.copy_from_slice(&bytes);
            Some(key)
        }
        _ => None,
    }
}

/// Shorten an address for display: `FxH4...9iKz`.
pub fn short_address(address: &str) -> String {
    if address.len() > 10 {
        format!("{}...{}", &address[..4], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}
