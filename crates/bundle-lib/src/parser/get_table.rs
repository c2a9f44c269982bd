//! Columnar `kubectl get` output
//!
//! The header row starts with `NAME`; columns are separated by runs of two
//! or more spaces, which keeps single-space values such as `ACCESS MODES`
//! or `2 (3d ago)` intact.

use crate::models::OrderedMap;
use serde::ser::{Serialize, Serializer};

/// Parsed `kubectl get` listing keyed by resource name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetTable {
    columns: Vec<String>,
    names: Vec<String>,
    rows: OrderedMap<OrderedMap<String>>,
}

impl GetTable {
    /// Column names after the implicit `NAME` column, from the last header seen
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Every row name in input order, duplicates included
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn rows(&self) -> &OrderedMap<OrderedMap<String>> {
        &self.rows
    }

    pub fn row(&self, name: &str) -> Option<&OrderedMap<String>> {
        self.rows.get(name)
    }

    /// Cell lookup; `None` for unknown rows and for partial rows
    pub fn cell(&self, name: &str, column: &str) -> Option<&str> {
        self.row(name)?.get(column).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> OrderedMap<OrderedMap<String>> {
        self.rows
    }
}

impl Serialize for GetTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

/// Split a line on runs of two or more spaces
pub fn split_columns(line: &str) -> Vec<&str> {
    line.split("  ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Parse `kubectl get` output
///
/// Lines before the first header and blank lines are ignored. A later
/// `NAME` header (several listings concatenated) replaces the column set.
/// A row shorter than the header yields a partial row; a later row with a
/// duplicate name overwrites the earlier one.
pub fn parse_get_output(text: &str) -> GetTable {
    let mut table = GetTable::default();
    let mut in_table = false;

    for line in text.lines() {
        if line.starts_with("NAME") {
            table.columns = split_columns(line)
                .into_iter()
                .skip(1)
                .map(str::to_string)
                .collect();
            in_table = true;
            continue;
        }

        let tokens = split_columns(line);
        let Some((name, cells)) = tokens.split_first() else {
            continue;
        };
        if !in_table {
            continue;
        }

        let row: OrderedMap<String> = table
            .columns
            .iter()
            .zip(cells.iter())
            .map(|(column, cell)| (column.clone(), cell.to_string()))
            .collect();

        table.names.push(name.to_string());
        table.rows.insert(*name, row);
    }

    table
}
