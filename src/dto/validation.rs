//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a player identifier is not blank once trimmed.
///
/// # Examples
///
/// ```ignore
/// validate_player_id("alice") // Ok
/// validate_player_id("   ")   // Err - blank
/// ```
pub fn validate_player_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        let mut err = ValidationError::new("player_id_blank");
        err.message = Some("Player ID must not be empty".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_player_id_valid() {
        assert!(validate_player_id("alice").is_ok());
        assert!(validate_player_id("  bob ").is_ok());
    }

    #[test]
    fn test_validate_player_id_blank() {
        assert!(validate_player_id("").is_err());
        assert!(validate_player_id(" \t").is_err());
    }
}
