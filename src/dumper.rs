use std::io;

use crate::emitter::{Chunk, Emitter};
use crate::error::{self, Result};
use crate::value::Value;

/// Options controlling how documents are dumped.
///
/// The defaults produce plain human-friendly output: two-space indentation,
/// priority key ordering, and no formatting preservation.
///
/// ```
/// use yaml_for_humans::DumpOptions;
///
/// let opts = DumpOptions::new()
///     .preserve_empty_lines(true)
///     .preserve_comments(true);
/// let doc = yaml_for_humans::from_str_with_formatting("a: 1\n\n# two\nb: 2").unwrap();
/// let out = yaml_for_humans::to_string_with(&doc, &opts).unwrap();
/// assert_eq!(out, "a: 1\n\n# two\nb: 2\n");
/// ```
#[derive(Clone, Debug)]
pub struct DumpOptions {
    pub(crate) indent: usize,
    pub(crate) preserve_empty_lines: bool,
    pub(crate) preserve_comments: bool,
    pub(crate) priority_keys: bool,
    pub(crate) explicit_end: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        DumpOptions {
            indent: 2,
            preserve_empty_lines: false,
            preserve_comments: false,
            priority_keys: true,
            explicit_end: false,
        }
    }
}

impl DumpOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        DumpOptions::default()
    }

    /// Sets the indentation step. Values below one are clamped to one.
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent.max(1);
        self
    }

    /// Re-emit blank lines recorded by a formatting-aware load.
    pub fn preserve_empty_lines(mut self, preserve: bool) -> Self {
        self.preserve_empty_lines = preserve;
        self
    }

    /// Re-emit comments recorded by a formatting-aware load.
    pub fn preserve_comments(mut self, preserve: bool) -> Self {
        self.preserve_comments = preserve;
        self
    }

    /// Hoist identification keys (`name`, `image`, ...) to the top of every
    /// mapping. Enabled by default.
    pub fn priority_keys(mut self, enable: bool) -> Self {
        self.priority_keys = enable;
        self
    }

    /// Terminate every document with an explicit `...` end marker when
    /// dumping multiple documents.
    pub fn explicit_end(mut self, enable: bool) -> Self {
        self.explicit_end = enable;
        self
    }
}

/// Serialize the given value as a String of human-friendly YAML.
///
/// ```
/// let doc = yaml_for_humans::from_str("items: [a, b]").unwrap();
/// assert_eq!(
///     yaml_for_humans::to_string(&doc).unwrap(),
///     "items:\n  - a\n  - b\n"
/// );
/// ```
pub fn to_string(value: &Value) -> Result<String> {
    to_string_with(value, &DumpOptions::default())
}

/// Serialize the given value as a String of YAML with explicit options.
pub fn to_string_with(value: &Value, options: &DumpOptions) -> Result<String> {
    let mut out = String::new();
    render_document(value, options, &mut out)?;
    Ok(out)
}

/// Serialize the given value as YAML into the IO stream.
pub fn to_writer<W>(writer: W, value: &Value) -> Result<()>
where
    W: io::Write,
{
    to_writer_with(writer, value, &DumpOptions::default())
}

/// Serialize the given value as YAML into the IO stream with explicit
/// options.
pub fn to_writer_with<W>(mut writer: W, value: &Value, options: &DumpOptions) -> Result<()>
where
    W: io::Write,
{
    let text = to_string_with(value, options)?;
    writer.write_all(text.as_bytes()).map_err(error::io)
}

/// Serialize multiple documents as a String, separated by `---` lines.
/// Two documents produce one separator; an empty slice produces an empty
/// string.
pub fn to_string_all(documents: &[Value]) -> Result<String> {
    to_string_all_with(documents, &DumpOptions::default())
}

/// Serialize multiple documents as a String with explicit options.
pub fn to_string_all_with(documents: &[Value], options: &DumpOptions) -> Result<String> {
    let mut out = String::new();
    for (index, document) in documents.iter().enumerate() {
        if index > 0 {
            out.push_str("\n---\n");
        }
        render_document(document, options, &mut out)?;
        if options.explicit_end {
            out.push_str("...\n");
        }
    }
    Ok(out)
}

/// Serialize multiple documents into the IO stream.
pub fn to_writer_all<W>(writer: W, documents: &[Value]) -> Result<()>
where
    W: io::Write,
{
    to_writer_all_with(writer, documents, &DumpOptions::default())
}

/// Serialize multiple documents into the IO stream with explicit options.
pub fn to_writer_all_with<W>(
    mut writer: W,
    documents: &[Value],
    options: &DumpOptions,
) -> Result<()>
where
    W: io::Write,
{
    let text = to_string_all_with(documents, options)?;
    writer.write_all(text.as_bytes()).map_err(error::io)
}

fn render_document(value: &Value, options: &DumpOptions, out: &mut String) -> Result<()> {
    let chunks = Emitter::new(options).emit_document(value)?;
    render_chunks(&chunks, out);
    Ok(())
}

/// The second phase of the emit pipeline: flattens the chunk stream into
/// final text. One forward pass, every chunk consumed.
fn render_chunks(chunks: &[Chunk], out: &mut String) {
    for chunk in chunks {
        match chunk {
            Chunk::Content(text) => out.push_str(text),
            Chunk::BlankLines(count) => {
                for _ in 0..*count {
                    out.push('\n');
                }
            }
            Chunk::Comment { indent, text } => {
                for _ in 0..*indent {
                    out.push(' ');
                }
                out.push_str(text);
                out.push('\n');
            }
            Chunk::InlineComment(text) => {
                out.push_str("  ");
                out.push_str(text);
            }
        }
    }
}
