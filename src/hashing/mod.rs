//! Identifier hashing for store keys.

use crate::constants::CACHE_KEY_PREFIX;

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Qdrant point ids must be unsigned integers or UUIDs, so user identifiers are
/// mapped through this function. With 64 bits, collisions stay negligible for
/// user populations in the millions (`P ≈ n² / 2^65`). The user id is also kept
/// in the point payload, so a collision is detectable on read.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

/// Point id under which a user's embedding is stored.
#[inline]
pub fn user_point_id(user_id: &str) -> u64 {
    hash_to_u64(user_id.as_bytes())
}

/// Cache key for a user's recommendation list (`rec:{user_id}`).
#[inline]
pub fn recommendation_cache_key(user_id: &str) -> String {
    format!("{}:{}", CACHE_KEY_PREFIX, user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_to_u64_deterministic() {
        assert_eq!(hash_to_u64(b"u_001"), hash_to_u64(b"u_001"));
        assert_ne!(hash_to_u64(b"u_001"), hash_to_u64(b"u_002"));
    }

    #[test]
    fn test_user_point_id_matches_raw_hash() {
        assert_eq!(user_point_id("u_001"), hash_to_u64("u_001".as_bytes()));
    }

    #[test]
    fn test_recommendation_cache_key() {
        assert_eq!(recommendation_cache_key("u_001"), "rec:u_001");
    }
}
