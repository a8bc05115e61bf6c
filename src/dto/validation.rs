//! Validation helpers for DTOs.

use validator::ValidationError;

/// Upper bound for client-supplied identifiers; real ones are 32 to 36 characters.
const MAX_IDENTIFIER_LEN: usize = 64;

/// Validates that a session, player or question identifier is present and reasonably sized.
///
/// # Examples
///
/// ```ignore
/// validate_identifier("9f1c0e4d2b7a4c1e8f3a6b5d4c3b2a10") // Ok
/// validate_identifier("   ")                              // Err - blank
/// ```
pub fn validate_identifier(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        let mut err = ValidationError::new("identifier_blank");
        err.message = Some("Identifier must not be blank".into());
        return Err(err);
    }

    if id.len() > MAX_IDENTIFIER_LEN {
        let mut err = ValidationError::new("identifier_length");
        err.message = Some(
            format!(
                "Identifier must be at most {MAX_IDENTIFIER_LEN} characters (got {})",
                id.len()
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}
