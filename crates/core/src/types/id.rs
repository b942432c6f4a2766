//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_string_id!` macro to create type-safe ID wrappers that
//! prevent accidentally mixing a site identifier with a subscriber identifier.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use super::Email;

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `as_str()`, `into_inner()`, `Display` and `AsRef<str>`
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// Construction is left to each type so it can enforce its own rules.
///
/// # Example
///
/// ```rust
/// # use comingsoon_core::define_string_id;
/// define_string_id!(ListId);
///
/// impl ListId {
///     pub fn new(value: &str) -> Self {
///         Self(value.to_owned())
///     }
/// }
///
/// assert_eq!(ListId::new("weekly").as_str(), "weekly");
/// ```
#[macro_export]
macro_rules! define_string_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <String as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <String as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_string_id!(SiteId);
define_string_id!(SubscriberId);

/// Errors that can occur when parsing a [`SiteId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SiteIdError {
    #[error("site id cannot be empty")]
    Empty,
    #[error("site id must be at most {max} characters")]
    TooLong { max: usize },
    #[error("site id may only contain letters, digits, '-' and '_'")]
    InvalidCharacter,
}

impl SiteId {
    /// Maximum length of a site identifier.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a site identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is empty, too long, or contains
    /// characters outside `[A-Za-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, SiteIdError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SiteIdError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SiteIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(SiteIdError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }
}

impl Default for SiteId {
    fn default() -> Self {
        Self("default".to_owned())
    }
}

impl SubscriberId {
    /// Derive the subscriber identity for a normalized email.
    ///
    /// The id is the URL-safe, unpadded base64 encoding of the address, so
    /// the same email always maps to the same record.
    #[must_use]
    pub fn for_email(email: &Email) -> Self {
        Self(URL_SAFE_NO_PAD.encode(email.as_str()))
    }

    /// Wrap an id received from a caller (e.g. a URL path segment).
    ///
    /// No validation is performed; an unknown id simply matches nothing.
    #[must_use]
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_id_is_deterministic() {
        let a = SubscriberId::for_email(&Email::parse("A@B.com").unwrap());
        let b = SubscriberId::for_email(&Email::parse(" a@b.com ").unwrap());
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "YUBiLmNvbQ");
    }

    #[test]
    fn test_subscriber_id_is_path_safe() {
        let id = SubscriberId::for_email(&Email::parse("a+b/c?@example.com").unwrap());
        assert!(
            id.as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_site_id_parse() {
        assert_eq!(SiteId::parse(" launch-2026 ").unwrap().as_str(), "launch-2026");
        assert_eq!(SiteId::parse(""), Err(SiteIdError::Empty));
        assert_eq!(SiteId::parse("a/b"), Err(SiteIdError::InvalidCharacter));
        assert!(matches!(
            SiteId::parse(&"x".repeat(65)),
            Err(SiteIdError::TooLong { .. })
        ));
        assert_eq!(SiteId::default().as_str(), "default");
    }

    #[test]
    fn test_serde_transparent() {
        let id = SiteId::parse("main").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"main\"");
    }
}
