//! Validated primitive types shared across the bridge workspace.

mod nhs_number;

pub use nhs_number::{NhsNumber, NhsNumberError};

#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("Text cannot be empty")]
    Empty,
}

/// Text with at least one non-whitespace character, stored trimmed.
///
/// Artifact names pass through this type before they are used to address files.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// # Errors
    ///
    /// Returns `TextError::Empty` if nothing is left after trimming.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let text = NonEmptyText::new("  ADT_SMITH_123456.json \n").expect("non-empty");
        assert_eq!(text.as_str(), "ADT_SMITH_123456.json");
        assert_eq!(text.to_string(), "ADT_SMITH_123456.json");
    }

    #[test]
    fn rejects_whitespace_only() {
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
        assert!(matches!(NonEmptyText::new(""), Err(TextError::Empty)));
    }
}
