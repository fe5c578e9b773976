//! Value snapshots
//!
//! A shown value is only known through its `Debug` output and its type name.
//! Elementary kinds (numbers, `bool`, `char`, strings, unit) are decoded back
//! into a `Value` so the fallback matcher can compare them by equality.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dynamic classification of a captured value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    // Signed integers
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    Isize(isize),

    // Unsigned integers
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Usize(usize),

    // Floating point
    F32(f32),
    F64(f64),

    Bool(bool),
    Char(char),

    /// `String`, `str` and references to them, kept in `Debug`-quoted form
    Str(String),

    Unit,

    /// Anything else: compared by identity only
    Opaque { type_name: String },
}

impl Value {
    /// Decode a value from its type name and `Debug` representation.
    ///
    /// References are peeled, so `&i32` and `i32` classify the same way.
    pub fn classify(type_name: &str, repr: &str) -> Value {
        let ty = short_type_name(type_name);

        let decoded = match ty.as_str() {
            "i8" => repr.parse().ok().map(Value::I8),
            "i16" => repr.parse().ok().map(Value::I16),
            "i32" => repr.parse().ok().map(Value::I32),
            "i64" => repr.parse().ok().map(Value::I64),
            "i128" => repr.parse().ok().map(Value::I128),
            "isize" => repr.parse().ok().map(Value::Isize),
            "u8" => repr.parse().ok().map(Value::U8),
            "u16" => repr.parse().ok().map(Value::U16),
            "u32" => repr.parse().ok().map(Value::U32),
            "u64" => repr.parse().ok().map(Value::U64),
            "u128" => repr.parse().ok().map(Value::U128),
            "usize" => repr.parse().ok().map(Value::Usize),
            "f32" => repr.parse().ok().map(Value::F32),
            "f64" => repr.parse().ok().map(Value::F64),
            "bool" => repr.parse().ok().map(Value::Bool),
            "char" => decode_char(repr).map(Value::Char),
            "String" | "str" => Some(Value::Str(repr.to_string())),
            "()" => Some(Value::Unit),
            _ => None,
        };

        decoded.unwrap_or(Value::Opaque { type_name: ty })
    }

    /// Whether equality matching applies to this value
    pub fn is_elementary(&self) -> bool {
        !matches!(self, Value::Opaque { .. })
    }

    /// Equality between two elementary values of the same kind.
    ///
    /// Widths must agree (`1i32` never equals `1i64`) and floats follow
    /// IEEE rules, so NaN matches nothing.
    pub fn loosely_equals(&self, other: &Value) -> bool {
        self.is_elementary() && self == other
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &str {
        match self {
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::I128(_) => "i128",
            Value::Isize(_) => "isize",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::U128(_) => "u128",
            Value::Usize(_) => "usize",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Str(_) => "str",
            Value::Unit => "()",
            Value::Opaque { type_name } => type_name,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::I128(v) => write!(f, "{}", v),
            Value::Isize(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::U128(v) => write!(f, "{}", v),
            Value::Usize(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{:?}", v),
            Value::F64(v) => write!(f, "{:?}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{:?}", v),
            Value::Str(quoted) => f.write_str(quoted),
            Value::Unit => write!(f, "()"),
            Value::Opaque { type_name } => write!(f, "<{}>", type_name),
        }
    }
}

/// Shorten a `std::any::type_name` to the way it is written in source.
///
/// Examples:
/// - `&alloc::string::String` -> `String`
/// - `alloc::vec::Vec<i32>` -> `Vec<i32>`
/// - `&mut core::option::Option<alloc::string::String>` -> `Option<String>`
pub fn short_type_name(type_name: &str) -> String {
    let mut ty = type_name.trim();
    while let Some(rest) = ty.strip_prefix('&') {
        ty = rest.strip_prefix("mut ").unwrap_or(rest).trim_start();
    }

    let mut result = ty.to_string();

    let replacements = [
        ("alloc::string::", ""),
        ("alloc::vec::", ""),
        ("alloc::boxed::", ""),
        ("alloc::sync::", ""),
        ("alloc::rc::", ""),
        ("alloc::borrow::", ""),
        ("alloc::collections::btree::map::", ""),
        ("core::option::", ""),
        ("core::result::", ""),
        ("core::cell::", ""),
        ("std::collections::hash::map::", ""),
    ];

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}

/// Decode the `Debug` form of a `char` (`'a'`). Escaped forms are left opaque.
fn decode_char(repr: &str) -> Option<char> {
    let inner = repr.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != '\\' => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_integers() {
        assert_eq!(Value::classify("i32", "42"), Value::I32(42));
        assert_eq!(Value::classify("&u8", "7"), Value::U8(7));
        assert_eq!(Value::classify("&mut i64", "-3"), Value::I64(-3));
    }

    #[test]
    fn test_classify_strings() {
        let owned = Value::classify("alloc::string::String", "\"hello\"");
        let borrowed = Value::classify("&str", "\"hello\"");
        assert_eq!(owned, borrowed);
        assert!(owned.loosely_equals(&borrowed));
    }

    #[test]
    fn test_classify_opaque() {
        let v = Value::classify("alloc::vec::Vec<i32>", "[1, 2, 3]");
        assert!(!v.is_elementary());
        assert_eq!(v.type_name(), "Vec<i32>");
        assert!(!v.loosely_equals(&v.clone()));
    }

    #[test]
    fn test_width_and_nan() {
        assert!(!Value::I32(1).loosely_equals(&Value::I64(1)));
        let nan = Value::classify("f64", "NaN");
        assert!(matches!(nan, Value::F64(_)));
        assert!(!nan.loosely_equals(&nan.clone()));
    }

    #[test]
    fn test_char_and_unit() {
        assert_eq!(Value::classify("char", "'x'"), Value::Char('x'));
        assert!(!Value::classify("char", "'\\n'").is_elementary());
        assert_eq!(Value::classify("()", "()"), Value::Unit);
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("&alloc::string::String"), "String");
        assert_eq!(
            short_type_name("core::option::Option<alloc::string::String>"),
            "Option<String>"
        );
        assert_eq!(short_type_name("&&str"), "str");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(format!("{}", Value::I32(42)), "42");
        assert_eq!(format!("{}", Value::F64(1.0)), "1.0");
        assert_eq!(format!("{}", Value::Str("\"hi\"".to_string())), "\"hi\"");
    }
}
