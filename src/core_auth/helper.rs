use bcrypt::{hash, verify, BcryptResult, DEFAULT_COST};

pub fn hash_password(password: &str) -> BcryptResult<String> {
    hash(password, DEFAULT_COST)
}

pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    verify(password, hashed_password).unwrap_or(false)
}

/// Cuts `input` down to at most `max_len` bytes without splitting a character.
pub fn truncate_field(input: &str, max_len: usize) -> String {
    if input.len() <= max_len {
        return input.to_string();
    }
    let mut end = max_len;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    input[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_field() {
        assert_eq!(truncate_field("admin", 31), "admin");
        assert_eq!(truncate_field(&"a".repeat(40), 31).len(), 31);
        // 'é' is two bytes; cutting at 3 would split it
        assert_eq!(truncate_field("abé", 3), "ab");
    }

    #[test]
    fn test_verify_password() {
        let hashed = bcrypt::hash("usth", 4).unwrap();
        assert!(verify_password("usth", &hashed));
        assert!(!verify_password("usth", "not-a-hash"));
    }
}
