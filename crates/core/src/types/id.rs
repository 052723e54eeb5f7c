//! Integer-backed entity ids.
//!
//! Every entity gets its own wrapper type, so a `ProductId` can never be
//! passed where a `UserId` is expected. On the wire the wrappers are the
//! bare integer.

/// Declares a newtype id over `i32`.
///
/// The generated type is `Copy`, ordered, hashable, and serializes
/// transparently as its inner integer. Construct with `new`, unwrap with
/// `as_i32`.
///
/// ```rust
/// # use cartwheel_core::define_id;
/// define_id!(
///     /// Identifies a widget.
///     WidgetId
/// );
///
/// assert_eq!(WidgetId::new(3).as_i32(), 3);
/// ```
#[macro_export]
macro_rules! define_id {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(value: i32) -> Self {
                Self(value)
            }

            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_id!(
    /// Identifies a registered account.
    UserId
);
define_id!(
    /// Identifies a catalog entry.
    ProductId
);
define_id!(
    /// Identifies a user's cart document.
    CartId
);
