//! Subscriber phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    #[error("phone number must have at least {min} digits")]
    TooShort { min: usize },
    #[error("phone number must have at most {max} digits")]
    TooLong { max: usize },
}

/// A phone number in grouped international form, e.g. `+123 456 7890`.
///
/// Parsing keeps only the digits of the input and regroups them as
/// `+ddd ddd dddd dddd`, so `(123) 456-7890` and `1234567890` normalize to
/// the same value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits accepted.
    pub const MIN_DIGITS: usize = 10;
    /// Maximum number of digits accepted.
    pub const MAX_DIGITS: usize = 14;

    /// Parse a phone number from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input has fewer than 10 or more than 14 digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let digits: String = s.chars().filter(char::is_ascii_digit).collect();

        if digits.len() < Self::MIN_DIGITS {
            return Err(PhoneError::TooShort {
                min: Self::MIN_DIGITS,
            });
        }
        if digits.len() > Self::MAX_DIGITS {
            return Err(PhoneError::TooLong {
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(group_digits(&digits)))
    }

    /// Returns the formatted phone number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

fn group_digits(digits: &str) -> String {
    let mut out = String::from("+");
    let mut rest = digits;
    for (index, size) in [3_usize, 3, 4, 4].into_iter().enumerate() {
        if rest.is_empty() {
            break;
        }
        let (head, tail) = rest.split_at(size.min(rest.len()));
        if index > 0 {
            out.push(' ');
        }
        out.push_str(head);
        rest = tail;
    }
    out
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
