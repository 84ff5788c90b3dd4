//! Input validation for note text.
//!
//! All validators return NotesError::Validation on failure.

use crate::error::{NotesError, NotesResult};

/// Trim note text and check it is usable.
///
/// Returns the trimmed text. Whitespace-only input is rejected.
pub fn normalize_note_text(text: &str) -> NotesResult<String> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(NotesError::validation(
            "text",
            "cannot be empty or whitespace only",
        ));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize_note_text("  hello \n").unwrap(), "hello");
    }

    #[test]
    fn test_whitespace_only_rejected() {
        assert!(normalize_note_text("").is_err());
        assert!(normalize_note_text("   \t\n").is_err());
    }

    #[test]
    fn test_long_text_accepted() {
        let long = "a".repeat(200_000);
        assert_eq!(normalize_note_text(&long).unwrap().len(), 200_000);
    }

    #[test]
    fn test_inner_whitespace_kept() {
        assert_eq!(normalize_note_text(" a  b ").unwrap(), "a  b");
    }
}
