//! Ten-digit national patient identifier with a Modulus-11 check digit.
//!
//! The first nine digits are weighted 10 down to 2 and summed. The check digit is
//! `11 - (sum % 11)`, with 11 mapped to 0. A computed check of 10 means no tenth digit can
//! make the number valid, so generators must discard that prefix.

use rand::Rng;
use std::fmt;

const NHS_NUMBER_LEN: usize = 10;

/// Reasons a candidate identifier fails the checksum rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NhsNumberError {
    #[error("expected 10 digits, got {0} characters")]
    WrongLength(usize),
    #[error("identifier contains a non-digit character")]
    NonDigit,
    #[error("prefix yields check value 10 and can never be valid")]
    UnusablePrefix,
    #[error("check digit {actual} does not match computed {expected}")]
    CheckDigitMismatch { expected: u8, actual: u8 },
}

/// A checksum-verified ten-digit identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NhsNumber(String);

impl NhsNumber {
    /// Parse and checksum-verify an identifier.
    ///
    /// # Errors
    ///
    /// Returns an [`NhsNumberError`] describing the first rule the input breaks.
    pub fn parse(input: &str) -> Result<Self, NhsNumberError> {
        let len = input.chars().count();
        if len != NHS_NUMBER_LEN {
            return Err(NhsNumberError::WrongLength(len));
        }

        let digits = input
            .bytes()
            .map(|b| b.is_ascii_digit().then(|| b - b'0'))
            .collect::<Option<Vec<u8>>>()
            .ok_or(NhsNumberError::NonDigit)?;

        let expected = Self::check_digit(&digits[..9]).ok_or(NhsNumberError::UnusablePrefix)?;
        let actual = digits[9];
        if expected != actual {
            return Err(NhsNumberError::CheckDigitMismatch { expected, actual });
        }

        Ok(Self(input.to_owned()))
    }

    /// Returns true when `input` is a ten-digit identifier with a matching check digit.
    pub fn is_valid(input: &str) -> bool {
        Self::parse(input).is_ok()
    }

    /// Compute the check digit for the nine leading digits.
    ///
    /// Returns `None` when the computed value is 10.
    pub fn check_digit(leading: &[u8]) -> Option<u8> {
        let total: u32 = leading
            .iter()
            .take(9)
            .enumerate()
            .map(|(i, d)| u32::from(*d) * (10 - i as u32))
            .sum();

        match 11 - (total % 11) {
            11 => Some(0),
            10 => None,
            check => Some(check as u8),
        }
    }

    /// Draw random prefixes until one yields a usable check digit.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        loop {
            let mut digits: Vec<u8> = (0..9).map(|_| rng.gen_range(0..=9)).collect();
            let Some(check) = Self::check_digit(&digits) else {
                continue;
            };
            digits.push(check);
            let text = digits.iter().map(|d| char::from(b'0' + d)).collect();
            return Self(text);
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NhsNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
