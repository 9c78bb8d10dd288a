//! Newtype IDs for the records of a COCO document.
//!
//! Image, category and annotation ids are all plain integers in the JSON,
//! which makes it easy to look an annotation up by its category id in the
//! image table. The newtypes below keep those namespaces apart.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! coco_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value.
            #[inline]
            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for serde_json::Value {
            fn from(id: $name) -> Self {
                serde_json::Value::from(id.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

coco_id!(
    /// Identifier of an entry in the document's `images` list.
    ImageId
);

coco_id!(
    /// Identifier of an entry in the document's `categories` list.
    CategoryId
);

coco_id!(
    /// Identifier of an entry in the document's `annotations` list.
    AnnotationId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_debug_names_the_kind() {
        assert_eq!(format!("{:?}", ImageId(3)), "ImageId(3)");
        assert_eq!(format!("{:?}", CategoryId(7)), "CategoryId(7)");
        assert_eq!(CategoryId(7).to_string(), "7");
    }

    #[test]
    fn test_id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&AnnotationId(42)).unwrap();
        assert_eq!(json, "42");
        let back: AnnotationId = serde_json::from_str("42").unwrap();
        assert_eq!(back, AnnotationId(42));
    }

    #[test]
    fn test_id_into_json_value() {
        let value: serde_json::Value = ImageId(5).into();
        assert_eq!(value, serde_json::json!(5));
    }
}
