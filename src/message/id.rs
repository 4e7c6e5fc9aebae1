//! `message-id` generation.
//!
//! A message-id is 128 random bits rendered as RFC 4122-shaped hex groups
//! (8-4-4-4-12) with the version nibble set to `4` and the variant bits
//! set to `10` — i.e. exactly a random (v4) UUID. The original Go client
//! hand-rolls this (`crypto/rand` plus manual nibble twiddling in
//! `message/common.go::uuid`); the idiomatic Rust equivalent is the
//! `uuid` crate, which the protocol is not otherwise coupled to — any
//! sufficiently wide random identifier works, this crate just prefers not
//! to hand-roll one.

use uuid::Uuid;

/// Generates a fresh, unique message-id for a new [`crate::message::Request`].
pub fn generate_message_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_rfc4122_v4_shaped() {
        let id = generate_message_id();
        let groups: Vec<&str> = id.split('-').collect();
        assert_eq!(groups.len(), 5);
        assert_eq!([groups[0].len(), groups[1].len(), groups[2].len(), groups[3].len(), groups[4].len()], [8, 4, 4, 4, 12]);
        assert_eq!(groups[2].chars().next().unwrap(), '4');
        let variant_nibble = groups[3].chars().next().unwrap();
        assert!(matches!(variant_nibble, '8' | '9' | 'a' | 'b'));
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(generate_message_id()));
        }
    }
}
