//! JSON rendering for report artifacts
//!
//! Two layouts are used:
//! - summary files: key-sorted, 4-space indented documents
//! - report lines: single-line objects with `, ` and `: ` separators, so a
//!   resolved test case reads naturally inside the text reports
//!
//! Pretty output goes through `serde_json::Value` first: struct fields
//! serialize in declaration order, `Value` objects in key order. Inline
//! output keeps the order of the value it is given, so callers pass maps.

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};
use std::io;

/// Compact formatter that still puts a space after separators
#[derive(Debug, Clone, Copy, Default)]
pub struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

fn render<T, F>(value: &T, formatter: F) -> serde_json::Result<String>
where
    T: Serialize + ?Sized,
    F: Formatter,
{
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Single-line JSON: `{"a": 1, "b": [1, 2]}`
pub fn to_inline_string<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    render(value, SpacedFormatter)
}

/// Multi-line JSON indented with 4 spaces, keys sorted at every level
pub fn to_pretty_string<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let sorted = serde_json::to_value(value)?;
    render(&sorted, PrettyFormatter::with_indent(b"    "))
}
