//! Macro for implementing Display and FromStr for stored enums
//!
//! Status-like enums are persisted as upper-case text (`CLOSED`,
//! `PAUSE_COFFEE`, ...). This macro keeps the string mapping in one place.
//!
//! # Example
//!
//! ```rust
//! use costclose_domain::impl_stored_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Light {
//!     Red,
//!     Green,
//! }
//!
//! impl_stored_enum_conversions!(Light {
//!     Red => "RED",
//!     Green => "GREEN",
//! });
//!
//! assert_eq!("green".parse::<Light>().unwrap(), Light::Green);
//! ```

/// Implements Display and FromStr traits for stored enums
///
/// - Display writes the canonical upper-case string
/// - FromStr parses case-insensitively
///
/// The right-hand strings must be upper-case.
#[macro_export]
macro_rules! impl_stored_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical stored representation.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = ::std::string::String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_ascii_uppercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
