//! Pretty-printing of store results.

use std::io::{self, Write};

use serde::Serialize;

use crate::store::TableDescription;
use crate::value::{item_to_json, Item};

fn write_pretty<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> io::Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(io::Error::from)?;
    writeln!(out, "{}", text)
}

pub fn print_item(out: &mut dyn Write, item: &Item) -> io::Result<()> {
    write_pretty(out, &item_to_json(item))
}

pub fn print_maybe_item(out: &mut dyn Write, item: Option<&Item>) -> io::Result<()> {
    match item {
        Some(item) => print_item(out, item),
        None => writeln!(out, "(no item)"),
    }
}

pub fn print_description(out: &mut dyn Write, desc: &TableDescription) -> io::Result<()> {
    write_pretty(out, desc)
}

pub fn print_tables(out: &mut dyn Write, tables: &[String]) -> io::Result<()> {
    writeln!(out, "\nAvailable tables:")?;
    for name in tables {
        writeln!(out, "  {}", name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyAttr, KeySchema};
    use crate::value::{item_from_json, ScalarType};

    #[test]
    fn test_item_prints_as_json() {
        let item = item_from_json(r#"{"id": "a", "n": 2}"#).expect("item");
        let mut out = Vec::new();
        print_item(&mut out, &item).expect("write");

        let printed: serde_json::Value =
            serde_json::from_slice(&out).expect("output is JSON");
        assert_eq!(printed, serde_json::json!({"id": "a", "n": 2}));
    }

    #[test]
    fn test_missing_item() {
        let mut out = Vec::new();
        print_maybe_item(&mut out, None).expect("write");
        assert_eq!(String::from_utf8_lossy(&out), "(no item)\n");
    }

    #[test]
    fn test_description_fields() {
        let desc = TableDescription {
            name: "users".into(),
            status: "ACTIVE".into(),
            key_schema: KeySchema {
                hash_key: KeyAttr::new("id", ScalarType::N),
                range_key: None,
            },
            item_count: Some(4),
            size_bytes: None,
            read_capacity: Some(5),
            write_capacity: Some(5),
            created: None,
        };
        let mut out = Vec::new();
        print_description(&mut out, &desc).expect("write");

        let printed: serde_json::Value =
            serde_json::from_slice(&out).expect("output is JSON");
        assert_eq!(printed["hash_key"]["type"], "N");
        assert_eq!(printed["item_count"], 4);
        assert!(printed.get("range_key").is_none());
        assert!(printed.get("size_bytes").is_none());
    }
}
