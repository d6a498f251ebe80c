use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Prefix used by freshly generated identifiers.
            pub const PREFIX: &'static str = $prefix;

            /// Generates a fresh identifier (`<prefix>-<uuid v4>`); never reuses a
            /// previously issued value.
            #[must_use]
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, Uuid::new_v4()))
            }

            /// Wraps an existing identifier string, e.g. one read back from storage.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Borrows the raw identifier.
            /// 取得識別碼字串。
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

prefixed_id!(
    /// Unique identifier of a product.
    /// 產品的唯一識別碼。
    ProductId,
    "prod"
);

prefixed_id!(
    /// Unique identifier of a section.
    /// 區段的唯一識別碼。
    SectionId,
    "section"
);

prefixed_id!(
    /// Unique identifier of a field.
    /// 欄位的唯一識別碼。
    FieldId,
    "field"
);
