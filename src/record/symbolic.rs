use std::fmt;

use serde::{Deserialize, Serialize};

/// Declares a symbol enumeration with a fallback variant for unrecognized wire names.
///
/// Symbols arrive from user builders and external configuration as text;
/// unknown names are kept verbatim so validation can report them.
macro_rules! symbol_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A name outside the enumeration.
            Unrecognized(String),
        }

        impl $name {
            /// Every recognized member, in declaration order.
            pub const MEMBERS: &'static [$name] = &[$($name::$variant),+];

            /// Canonical upper-case wire name.
            pub fn name(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Unrecognized(raw) => raw,
                }
            }

            /// Returns `true` when the value is a member of the enumeration.
            pub fn is_member(&self) -> bool {
                !matches!(self, $name::Unrecognized(_))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $(
                    if value.eq_ignore_ascii_case($wire) {
                        return $name::$variant;
                    }
                )+
                $name::Unrecognized(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name::from(value.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.name().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

symbol_enum! {
    /// How a structured item is used in training or inference.
    Target {
        /// The value to predict.
        Yes => "YES",
        /// An input consumed for predictions.
        No => "NO",
        /// Excluded from training and prediction; may still show in reports.
        Ignore => "IGNORE",
    }
}

symbol_enum! {
    /// Whether a structured value is continuous or categorical.
    DataType {
        /// Integer or floating point.
        Continuous => "CONTINUOUS",
        /// Discrete value such as a label.
        Category => "CATEGORY",
    }
}

symbol_enum! {
    /// Kind of blob referenced by an unstructured item.
    FileType {
        Image => "IMAGE",
        Audio => "AUDIO",
        Video => "VIDEO",
        Document => "DOCUMENT",
        Meta => "META",
        Text => "TEXT",
    }
}

impl Default for Target {
    fn default() -> Self {
        Target::Ignore
    }
}

/// Scalar carried by a structured item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Returns `true` for integer and floating point values.
    pub fn is_continuous(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}
