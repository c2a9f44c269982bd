//! Parsers for `kubectl` text output
//!
//! Both parsers are pure functions over captured text:
//! - [`parse_get_output`] for the columnar `kubectl get` listing
//! - [`parse_describe_output`] for concatenated `kubectl describe` records

mod describe;
mod get_table;

pub use describe::{join_describe_with_names, parse_describe_output, parse_sections, split_describe_blocks};
pub use get_table::{parse_get_output, split_columns, GetTable};
