//! Newtype IDs for the marketplace's numeric primary keys.
//!
//! The API hands out integer keys for every record. Wrapping each in its own
//! type keeps a watch ID from being passed where a notification ID is expected.

/// Defines a type-safe wrapper around an API integer key.
///
/// The generated type is:
/// - `#[serde(transparent)]`, so it reads and writes as a bare JSON number
/// - `Copy`, hashable and ordered
/// - displayable, which is what path interpolation (`/watches/{id}`) uses
/// - parseable from a string, for command-line arguments
///
/// # Example
///
/// ```rust
/// # use luxtime_core::define_id;
/// define_id!(WatchId);
/// define_id!(StoreId);
///
/// let watch = WatchId::new(7);
/// assert_eq!(format!("/watches/{watch}"), "/watches/7");
///
/// // Different key spaces do not mix:
/// // let _: StoreId = watch;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw API key.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// The raw API key.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(UserId);
define_id!(WatchId);
define_id!(StoreId);
define_id!(PurchaseId);
define_id!(NotificationId);
define_id!(EvaluationId);
define_id!(EvaluatorId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_bare_number() {
        assert_eq!(WatchId::new(42).to_string(), "42");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id: NotificationId = " 17 ".parse().unwrap();
        assert_eq!(id.get(), 17);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("abc".parse::<UserId>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let id: StoreId = serde_json::from_str("5").unwrap();
        assert_eq!(id, StoreId::new(5));
        assert_eq!(serde_json::to_string(&id).unwrap(), "5");
    }
}
