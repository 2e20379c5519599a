//! This crate is a Rust library for human-friendly YAML serialization:
//! priority key ordering, readable sequence layout, literal blocks for
//! multiline strings, and optional preservation of the blank lines and
//! comments found in source documents.
//!
//! This library does not reimplement a YAML parser; it uses [yaml-rust]
//! which is a pure Rust YAML implementation, and attributes comments and
//! blank lines to elements using the parser's source markers.
//!
//! [yaml-rust]: https://github.com/chyh1990/yaml-rust
//!
//! # Examples
//!
//! Reformatting a document while keeping its blank lines and comments:
//!
//! ```
//! fn main() -> Result<(), yaml_for_humans::Error> {
//!     let source = "\
//! app_name: web
//!
//! # db section
//! database:
//!   host: localhost
//! ";
//!
//!     let doc = yaml_for_humans::from_str_with_formatting(source)?;
//!     let options = yaml_for_humans::DumpOptions::new()
//!         .preserve_empty_lines(true)
//!         .preserve_comments(true);
//!     let out = yaml_for_humans::to_string_with(&doc, &options)?;
//!     assert_eq!(out, source);
//!     Ok(())
//! }
//! ```
//!
//! Plain humanized output puts identification keys first and keeps scalar
//! sequences inline:
//!
//! ```
//! fn main() -> Result<(), yaml_for_humans::Error> {
//!     let doc = yaml_for_humans::from_str(
//!         "image: nginx:latest\nname: web\ncommand: [/bin/sh, -c]",
//!     )?;
//!     let out = yaml_for_humans::to_string(&doc)?;
//!     assert_eq!(out, "name: web\nimage: nginx:latest\ncommand:\n  - /bin/sh\n  - -c\n");
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]

pub use crate::dumper::{
    to_string, to_string_all, to_string_all_with, to_string_with, to_writer, to_writer_all,
    to_writer_all_with, to_writer_with, DumpOptions,
};
pub use crate::emitter::PRIORITY_KEYS;
pub use crate::error::{Error, Result};
pub use crate::format::FormattingMetadata;
pub use crate::loader::{
    from_reader, from_reader_with_formatting, from_str, from_str_all,
    from_str_all_with_formatting, from_str_with_formatting,
};
pub use crate::mapping::Mapping;
pub use crate::number::Number;
pub use crate::sequence::Sequence;
pub use crate::ser::to_value;
pub use crate::value::Value;

pub mod k8s;

#[cfg(feature = "cli")]
pub mod cli;

mod dumper;
mod emitter;
mod error;
mod format;
mod loader;
mod mapping;
mod number;
mod scanner;
mod sequence;
mod ser;
mod value;
