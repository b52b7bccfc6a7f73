//! Read-only state inspection for debuggers and tests.
//!
//! Queries never affect emulation state.

use std::fmt;

/// A dynamically-typed value returned by a state query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U64(u64),
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v:#04X}"),
            Value::U16(v) => write!(f, "{v:#06X}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// A component whose state can be inspected.
pub trait Observable {
    /// Query a property by path.
    ///
    /// Paths are hierarchical, separated by dots (`pc`, `flags.z`,
    /// `cpu.bc`, `memory.0xC000`). Returns `None` for unknown paths.
    fn query(&self, path: &str) -> Option<Value>;

    /// List the paths accepted by `query()`.
    fn query_paths(&self) -> &'static [&'static str];
}

/// Parse an address written as `0xC000`, `$C000` or decimal `49152`.
#[must_use]
pub fn parse_address(text: &str) -> Option<u16> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).ok()
    } else if let Some(hex) = text.strip_prefix('$') {
        u16::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_hex_widths() {
        assert_eq!(Value::U8(0x0A).to_string(), "0x0A");
        assert_eq!(Value::U16(0xC000).to_string(), "0xC000");
        assert_eq!(Value::U64(42).to_string(), "42");
    }

    #[test]
    fn address_formats() {
        assert_eq!(parse_address("0xC000"), Some(0xC000));
        assert_eq!(parse_address("$fffc"), Some(0xFFFC));
        assert_eq!(parse_address("49152"), Some(0xC000));
        assert_eq!(parse_address("0x10000"), None);
        assert_eq!(parse_address("bogus"), None);
    }
}
