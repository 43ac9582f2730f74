//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted game identifier.
pub const MAX_GAME_ID_LEN: usize = 64;

/// Validates that a game ID is 1 to 64 ASCII letters, digits, `-` or `_`.
///
/// # Examples
///
/// ```ignore
/// validate_game_id("friday-night") // Ok
/// validate_game_id("")             // Err - empty
/// validate_game_id("party room")   // Err - space
/// ```
pub fn validate_game_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > MAX_GAME_ID_LEN {
        let mut err = ValidationError::new("game_id_length");
        err.message = Some(
            format!(
                "Game ID must be between 1 and {MAX_GAME_ID_LEN} characters (got {})",
                id.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        let mut err = ValidationError::new("game_id_format");
        err.message =
            Some("Game ID must contain only ASCII letters, digits, '-' or '_'".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_game_id_valid() {
        assert!(validate_game_id("charades").is_ok());
        assert!(validate_game_id("Room_42-b").is_ok());
        assert!(validate_game_id(&"a".repeat(MAX_GAME_ID_LEN)).is_ok());
    }

    #[test]
    fn test_validate_game_id_invalid_length() {
        assert!(validate_game_id("").is_err());
        assert!(validate_game_id(&"a".repeat(MAX_GAME_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_game_id_invalid_format() {
        assert!(validate_game_id("party room").is_err()); // space
        assert!(validate_game_id("party/room").is_err()); // path separator
        assert!(validate_game_id("fête").is_err()); // non-ascii
    }
}
