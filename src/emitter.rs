use crate::dumper::DumpOptions;
use crate::error::{self, Result};
use crate::format::FormattingMetadata;
use crate::loader::plain_value;
use crate::mapping::Mapping;
use crate::sequence::Sequence;
use crate::value::Value;

/// Keys that identify a resource, hoisted to the top of every mapping when
/// priority ordering is enabled. Remaining keys keep their insertion order.
pub const PRIORITY_KEYS: &[&str] = &[
    "apiVersion",
    "kind",
    "metadata",
    "name",
    "image",
    "imagePullPolicy",
];

/// One tagged piece of emitter output.
///
/// Preserved formatting travels through emission as typed chunks instead of
/// sentinel strings woven into the YAML text; the renderer in `dumper`
/// consumes every chunk, so no placeholder can survive into the output.
#[derive(Debug)]
pub(crate) enum Chunk {
    /// Literal YAML text, possibly spanning lines.
    Content(String),
    /// N empty lines, emitted at the start of a line.
    BlankLines(usize),
    /// A standalone comment line at the given indentation.
    Comment { indent: usize, text: String },
    /// A comment appended to the still-open line before its newline.
    InlineComment(String),
}

pub(crate) struct Emitter<'a> {
    opts: &'a DumpOptions,
    chunks: Vec<Chunk>,
}

impl<'a> Emitter<'a> {
    pub(crate) fn new(opts: &'a DumpOptions) -> Self {
        Emitter {
            opts,
            chunks: Vec::new(),
        }
    }

    pub(crate) fn emit_document(mut self, value: &Value) -> Result<Vec<Chunk>> {
        match value {
            Value::Mapping(mapping) if !mapping.is_empty() => self.emit_mapping(mapping, 0)?,
            Value::Sequence(sequence) if !sequence.is_empty() => {
                self.emit_sequence(sequence, 0)?
            }
            Value::String(text) if wants_block(text) => {
                self.push_entry(0, block_header(text), None);
                self.emit_block_lines(text, self.opts.indent);
            }
            other => {
                let text = scalar_text(other)?;
                self.push_entry(0, &text, None);
            }
        }
        Ok(self.chunks)
    }

    fn emit_mapping(&mut self, mapping: &Mapping, indent: usize) -> Result<()> {
        for key in self.ordered_keys(mapping) {
            let value = mapping.get(key).expect("key from this mapping");
            let meta = mapping.formatting(key);
            self.emit_leading(meta, indent);
            let inline = self.inline_of(meta);
            let key_text = scalar_text(key)?;

            match value {
                Value::Mapping(child) if !child.is_empty() => {
                    self.push_entry(indent, &format!("{}:", key_text), inline);
                    self.emit_mapping(child, indent + self.opts.indent)?;
                }
                Value::Sequence(child) if !child.is_empty() => {
                    self.push_entry(indent, &format!("{}:", key_text), inline);
                    self.emit_sequence(child, indent + self.opts.indent)?;
                }
                Value::String(text) if wants_block(text) => {
                    let header = format!("{}: {}", key_text, block_header(text));
                    self.push_entry(indent, &header, inline);
                    self.emit_block_lines(text, indent + self.opts.indent);
                }
                other => {
                    let line = format!("{}: {}", key_text, scalar_text(other)?);
                    self.push_entry(indent, &line, inline);
                }
            }
        }
        self.emit_trailing(mapping.trailing_comments(), indent);
        Ok(())
    }

    fn emit_sequence(&mut self, sequence: &Sequence, indent: usize) -> Result<()> {
        for (index, item) in sequence.iter().enumerate() {
            let meta = sequence.formatting(index);
            self.emit_leading(meta, indent);
            let inline = self.inline_of(meta);

            match item {
                // Container items put the dash on its own line so sibling
                // keys line up underneath each other.
                Value::Mapping(child) if !child.is_empty() => {
                    self.push_entry(indent, "-", inline);
                    self.emit_mapping(child, indent + self.opts.indent)?;
                }
                Value::Sequence(child) if !child.is_empty() => {
                    self.push_entry(indent, "-", inline);
                    self.emit_sequence(child, indent + self.opts.indent)?;
                }
                Value::String(text) if wants_block(text) => {
                    let header = format!("- {}", block_header(text));
                    self.push_entry(indent, &header, inline);
                    self.emit_block_lines(text, indent + self.opts.indent);
                }
                other => {
                    let line = format!("- {}", scalar_text(other)?);
                    self.push_entry(indent, &line, inline);
                }
            }
        }
        self.emit_trailing(sequence.trailing_comments(), indent);
        Ok(())
    }

    /// Priority keys first, in table order; everything else in insertion
    /// order.
    fn ordered_keys<'v>(&self, mapping: &'v Mapping) -> Vec<&'v Value> {
        if !self.opts.priority_keys {
            return mapping.keys().collect();
        }
        let mut ordered = Vec::with_capacity(mapping.len());
        for &name in PRIORITY_KEYS {
            if let Some(key) = mapping.keys().find(|k| k.as_str() == Some(name)) {
                ordered.push(key);
            }
        }
        for key in mapping.keys() {
            let hoisted = key
                .as_str()
                .map_or(false, |s| PRIORITY_KEYS.contains(&s));
            if !hoisted {
                ordered.push(key);
            }
        }
        ordered
    }

    fn emit_leading(&mut self, meta: Option<&FormattingMetadata>, indent: usize) {
        let meta = match meta {
            Some(meta) => meta,
            None => return,
        };
        if self.opts.preserve_empty_lines && meta.blank_lines_before() > 0 {
            self.chunks.push(Chunk::BlankLines(meta.blank_lines_before()));
        }
        if self.opts.preserve_comments {
            for text in meta.comments_before() {
                self.chunks.push(Chunk::Comment {
                    indent,
                    text: text.clone(),
                });
            }
        }
    }

    fn inline_of<'m>(&self, meta: Option<&'m FormattingMetadata>) -> Option<&'m str> {
        if self.opts.preserve_comments {
            meta.and_then(FormattingMetadata::inline_comment)
        } else {
            None
        }
    }

    fn emit_trailing(&mut self, comments: &[String], indent: usize) {
        if !self.opts.preserve_comments {
            return;
        }
        for text in comments {
            self.chunks.push(Chunk::Comment {
                indent,
                text: text.clone(),
            });
        }
    }

    /// Emits one line of content at the given indentation, holding the line
    /// open for an inline comment when one is present.
    fn push_entry(&mut self, indent: usize, text: &str, inline: Option<&str>) {
        let mut line = String::with_capacity(indent + text.len() + 1);
        for _ in 0..indent {
            line.push(' ');
        }
        line.push_str(text);
        match inline {
            Some(comment) => {
                self.chunks.push(Chunk::Content(line));
                self.chunks.push(Chunk::InlineComment(comment.to_owned()));
                self.chunks.push(Chunk::Content("\n".to_owned()));
            }
            None => {
                line.push('\n');
                self.chunks.push(Chunk::Content(line));
            }
        }
    }

    fn emit_block_lines(&mut self, text: &str, indent: usize) {
        let content = match block_header(text) {
            "|-" => text,
            // Drop the final newline; any earlier ones stay as empty lines.
            _ => &text[..text.len() - 1],
        };
        for line in content.split('\n') {
            if line.is_empty() {
                self.chunks.push(Chunk::Content("\n".to_owned()));
            } else {
                let mut padded = String::with_capacity(indent + line.len() + 1);
                for _ in 0..indent {
                    padded.push(' ');
                }
                padded.push_str(line);
                padded.push('\n');
                self.chunks.push(Chunk::Content(padded));
            }
        }
    }
}

/// Renders a scalar (or empty container) on a single line. Non-empty
/// containers never reach here except as mapping keys, which the humanized
/// block layout does not support.
fn scalar_text(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("null".to_owned()),
        Value::Bool(true) => Ok("true".to_owned()),
        Value::Bool(false) => Ok("false".to_owned()),
        Value::Number(number) => Ok(number.to_string()),
        Value::String(text) => Ok(string_scalar(text)),
        Value::Sequence(sequence) if sequence.is_empty() => Ok("[]".to_owned()),
        Value::Mapping(mapping) if mapping.is_empty() => Ok("{}".to_owned()),
        Value::Sequence(_) | Value::Mapping(_) => Err(error::non_scalar_key()),
    }
}

fn string_scalar(text: &str) -> String {
    if !needs_quoting(text) {
        return text.to_owned();
    }
    if text.chars().any(|c| c.is_control()) {
        double_quoted(text)
    } else {
        single_quoted(text)
    }
}

fn needs_quoting(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        return true;
    }
    let first = text.chars().next().expect("non-empty");
    if matches!(
        first,
        '!' | '&' | '*' | '|' | '>' | '%' | '@' | '`' | '"' | '\'' | '['
            | ']' | '{' | '}' | ',' | '#'
    ) {
        return true;
    }
    // Leading `-`, `?` and `:` are indicators only when followed by a space
    // or nothing; `-c` and `:port` stay plain.
    if matches!(first, '-' | '?' | ':')
        && text[first.len_utf8()..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace)
    {
        return true;
    }
    if text.contains(": ") || text.ends_with(':') || text.contains(" #") {
        return true;
    }
    if text
        .chars()
        .any(|c| matches!(c, '[' | ']' | '{' | '}' | ',') || c.is_control())
    {
        return true;
    }
    // A string that would reload as null, bool or number must be quoted to
    // keep its type.
    !matches!(plain_value(text), Value::String(_))
}

fn single_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

fn double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Whether a string should render as a literal block scalar.
fn wants_block(text: &str) -> bool {
    if !text.contains('\n') {
        return false;
    }
    if text.chars().any(|c| c.is_control() && c != '\n') {
        return false;
    }
    // Whitespace-only interior lines would fight the block's detected
    // indentation when reloaded.
    if text
        .split('\n')
        .any(|line| !line.is_empty() && line.trim().is_empty())
    {
        return false;
    }
    // The first non-empty line establishes the block's indentation; leading
    // whitespace there would require an explicit indentation indicator.
    match text.split('\n').find(|line| !line.is_empty()) {
        Some(line) => !line.starts_with(' ') && !line.starts_with('\t'),
        None => false,
    }
}

fn block_header(text: &str) -> &'static str {
    let trailing = text.len() - text.trim_end_matches('\n').len();
    match trailing {
        0 => "|-",
        1 => "|",
        _ => "|+",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_strings_stay_plain() {
        assert_eq!(string_scalar("nginx:latest"), "nginx:latest");
        assert_eq!(string_scalar("-c"), "-c");
        assert_eq!(string_scalar("daemon off;"), "daemon off;");
        assert_eq!(string_scalar("/bin/sh"), "/bin/sh");
    }

    #[test]
    fn ambiguous_strings_are_quoted() {
        assert_eq!(string_scalar("8080"), "'8080'");
        assert_eq!(string_scalar("true"), "'true'");
        assert_eq!(string_scalar("null"), "'null'");
        assert_eq!(string_scalar(""), "''");
        assert_eq!(string_scalar("value with: colon"), "'value with: colon'");
        assert_eq!(string_scalar("trailing "), "'trailing '");
        assert_eq!(string_scalar("- item"), "'- item'");
    }

    #[test]
    fn control_characters_force_double_quotes() {
        assert_eq!(string_scalar("tab\there"), "\"tab\\there\"");
    }

    #[test]
    fn block_headers_follow_trailing_newlines() {
        assert_eq!(block_header("a\nb"), "|-");
        assert_eq!(block_header("a\nb\n"), "|");
        assert_eq!(block_header("a\nb\n\n"), "|+");
    }

    #[test]
    fn block_style_rejects_unsafe_content() {
        assert!(wants_block("line1\nline2"));
        assert!(!wants_block("single line"));
        assert!(!wants_block("  leading indent\nline2"));
        assert!(!wants_block("a\r\nb"));
        assert!(!wants_block("\n\n"));
    }
}
