use rand::Rng;

/// Room codes are 6 symbols over uppercase letters and digits. At the
/// 100-room cap the collision probability per draw is about 5e-8, so
/// allocation retries are a safety net rather than a load-bearing path.
pub const ROOM_CODE_LEN: usize = 6;

/// Alphabet for room codes (36 symbols).
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Collision retries before the allocator gives up with `ExhaustedAttempts`.
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// Generate a random room code. Uniqueness is the store's job: callers
/// insert-or-retry against the live room set rather than tracking used
/// codes separately.
pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Check that a string is a well-formed room code.
pub fn is_valid_room_code(code: &str) -> bool {
    code.len() == ROOM_CODE_LEN && code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_valid() {
        for _ in 0..200 {
            let code = generate_room_code();
            assert!(is_valid_room_code(&code), "invalid room code: {code}");
        }
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!(!is_valid_room_code(""));
        assert!(!is_valid_room_code("ABC12"));
        assert!(!is_valid_room_code("ABC1234"));
        assert!(!is_valid_room_code("abc123"));
        assert!(!is_valid_room_code("ABC-12"));
        assert!(!is_valid_room_code("ABC12\u{0}"));
    }

    #[test]
    fn accepts_boundary_symbols() {
        assert!(is_valid_room_code("AAAAAA"));
        assert!(is_valid_room_code("999999"));
        assert!(is_valid_room_code("A1B2C3"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn validation_matches_alphabet(code in "[A-Z0-9]{6}") {
                prop_assert!(is_valid_room_code(&code));
            }

            #[test]
            fn wrong_length_never_validates(code in "[A-Z0-9]{0,5}|[A-Z0-9]{7,12}") {
                prop_assert!(!is_valid_room_code(&code));
            }
        }
    }
}
