//! UUID and raw byte generators.

use fixture_core::Value;
use rand::Rng;
use uuid::Uuid;

/// Generate a random UUID v4 using the provided RNG.
pub fn generate_uuid_v4<R: Rng>(rng: &mut R) -> Value {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);

    bytes[6] = (bytes[6] & 0x0f) | 0x40; // Version 4
    bytes[8] = (bytes[8] & 0x3f) | 0x80; // Variant RFC 4122

    Value::Uuid(Uuid::from_bytes(bytes))
}

/// Generate `len` random bytes.
pub fn generate_bytes<R: Rng>(rng: &mut R, len: usize) -> Value {
    let mut bytes = vec![0u8; len];
    rng.fill(bytes.as_mut_slice());
    Value::Bytes(bytes)
}
