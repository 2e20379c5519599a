use std::collections::{HashMap, HashSet};
use std::io;

use yaml_rust::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust::scanner::{Marker, TScalarStyle, TokenType};

use crate::error::{self, Result};
use crate::format::FormattingMetadata;
use crate::mapping::Mapping;
use crate::scanner::{CommentScanner, LineIndex, LineKind};
use crate::sequence::Sequence;
use crate::value::Value;

/// Deserialize an instance of [`Value`] from a string of YAML text.
///
/// The input must contain exactly one document. Formatting (blank lines,
/// comments) is discarded; the containers come back with empty side tables.
///
/// ```
/// let doc = yaml_for_humans::from_str("name: web\nreplicas: 2").unwrap();
/// assert_eq!(doc.get("replicas").and_then(|v| v.as_i64()), Some(2));
/// ```
pub fn from_str(input: &str) -> Result<Value> {
    single_document(load(input, false)?)
}

/// Like [`from_str`], but records blank lines and comments from the source
/// into the formatting side tables of the loaded containers.
pub fn from_str_with_formatting(input: &str) -> Result<Value> {
    single_document(load(input, true)?)
}

/// Deserialize every document in a YAML stream. An empty stream yields an
/// empty vector.
pub fn from_str_all(input: &str) -> Result<Vec<Value>> {
    load(input, false)
}

/// Like [`from_str_all`], recording formatting metadata per document.
pub fn from_str_all_with_formatting(input: &str) -> Result<Vec<Value>> {
    load(input, true)
}

/// Deserialize an instance of [`Value`] from an IO stream of YAML. The
/// stream is read to the end before parsing begins.
pub fn from_reader<R>(mut reader: R) -> Result<Value>
where
    R: io::Read,
{
    from_str(&read_to_string(&mut reader)?)
}

/// Like [`from_reader`], recording formatting metadata.
pub fn from_reader_with_formatting<R>(mut reader: R) -> Result<Value>
where
    R: io::Read,
{
    from_str_with_formatting(&read_to_string(&mut reader)?)
}

fn read_to_string<R>(reader: &mut R) -> Result<String>
where
    R: io::Read,
{
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer).map_err(error::io)?;
    String::from_utf8(buffer).map_err(error::string_utf8)
}

fn single_document(mut documents: Vec<Value>) -> Result<Value> {
    match documents.len() {
        0 => Err(error::end_of_stream()),
        1 => Ok(documents.pop().expect("one document")),
        _ => Err(error::more_than_one_document()),
    }
}

fn load(input: &str, capture: bool) -> Result<Vec<Value>> {
    let mut log = EventLog::default();
    let mut parser = Parser::new(input.chars());
    parser.load(&mut log, true).map_err(error::scanner)?;

    let lines = if capture {
        CommentScanner::new().scan(input)
    } else {
        LineIndex::default()
    };

    Composer::new(&log.events, &lines, capture).compose_stream()
}

/// Collects the parser's marked events so the composer can walk them with
/// random access; a node's descendants form a contiguous range of this list.
#[derive(Default)]
struct EventLog {
    events: Vec<(Event, Marker)>,
}

impl MarkedEventReceiver for EventLog {
    fn on_event(&mut self, ev: Event, mark: Marker) {
        match ev {
            Event::Nothing | Event::StreamStart | Event::StreamEnd => {}
            _ => self.events.push((ev, mark)),
        }
    }
}

/// The formatting-aware composer.
///
/// Composes `Value` trees from the event log. In capture mode it also
/// attributes blank lines and comments: every element's gap is the range of
/// source lines strictly between the previous sibling's end line (or the
/// container's opening line, for a first child) and the element's own start
/// line. Gap ranges are disjoint, so no line is ever attributed twice.
struct Composer<'a> {
    events: &'a [(Event, Marker)],
    lines: &'a LineIndex,
    capture: bool,
    pos: usize,
    anchors: HashMap<usize, Value>,
    /// Memoized subtree extents: start event index -> (end event index,
    /// maximum source line). An enclosing walk skips a memoized subtree in
    /// one step instead of re-scanning it.
    extents: HashMap<usize, (usize, usize)>,
    /// Source lines whose trailing comment has already been attributed.
    claimed_inline: HashSet<usize>,
}

impl<'a> Composer<'a> {
    fn new(events: &'a [(Event, Marker)], lines: &'a LineIndex, capture: bool) -> Self {
        Composer {
            events,
            lines,
            capture,
            pos: 0,
            anchors: HashMap::new(),
            extents: HashMap::new(),
            claimed_inline: HashSet::new(),
        }
    }

    fn compose_stream(&mut self) -> Result<Vec<Value>> {
        let events = self.events;
        let mut documents = Vec::new();
        while self.pos < events.len() {
            let mark = events[self.pos].1;
            debug_assert!(matches!(events[self.pos].0, Event::DocumentStart));
            // The first document owns everything above it; later documents
            // begin at their `---` line.
            let opening = if documents.is_empty() { 0 } else { mark.line() };
            self.pos += 1;

            let root_idx = self.pos;
            let mut root = self.compose_node(opening)?;
            if let Some((Event::DocumentEnd, _)) = events.get(self.pos) {
                self.pos += 1;
            }

            if self.capture {
                self.attach_trailing_comments(root_idx, &mut root);
            }
            documents.push(root);
        }
        Ok(documents)
    }

    /// Comments after a document's last element have no next element to bind
    /// to; they become the root container's trailing comments.
    fn attach_trailing_comments(&mut self, root_idx: usize, root: &mut Value) {
        let root_end = self.subtree_end_line(root_idx);
        let doc_end = match self.events.get(self.pos) {
            Some((Event::DocumentStart, mark)) => mark.line().saturating_sub(1),
            _ => self.lines.len(),
        };
        for line in (root_end + 1)..=doc_end {
            if let Some(LineKind::Comment(text)) = self.lines.kind(line) {
                match root {
                    Value::Mapping(mapping) => mapping.push_trailing_comment(text.clone()),
                    Value::Sequence(sequence) => sequence.push_trailing_comment(text.clone()),
                    _ => {}
                }
            }
        }
    }

    fn compose_node(&mut self, opening: usize) -> Result<Value> {
        let events = self.events;
        let idx = self.pos;
        match &events[idx].0 {
            Event::Alias(id) => {
                self.pos += 1;
                match self.anchors.get(id) {
                    Some(value) => Ok(value.clone()),
                    None => Err(error::unknown_anchor(events[idx].1)),
                }
            }
            Event::Scalar(text, style, aid, tag) => {
                self.pos += 1;
                let value = resolve_scalar(text, *style, tag.as_ref());
                if *aid > 0 {
                    self.anchors.insert(*aid, value.clone());
                }
                Ok(value)
            }
            Event::SequenceStart(aid) => {
                let aid = *aid;
                self.compose_sequence(aid, opening)
            }
            Event::MappingStart(aid) => {
                let aid = *aid;
                self.compose_mapping(aid, opening)
            }
            _ => Err(error::end_of_stream()),
        }
    }

    fn compose_sequence(&mut self, aid: usize, opening: usize) -> Result<Value> {
        let events = self.events;
        self.pos += 1;
        let mut sequence = Sequence::new();
        let mut prev_end = opening;
        loop {
            if let Event::SequenceEnd = events[self.pos].0 {
                self.pos += 1;
                break;
            }
            let item_idx = self.pos;
            let start_line = events[item_idx].1.line();
            let item_is_scalar = matches!(events[item_idx].0, Event::Scalar(..));

            let mut meta = if self.capture {
                self.gap_metadata(prev_end, start_line)
            } else {
                None
            };
            let value = self.compose_node(start_line)?;

            if self.capture {
                if item_is_scalar {
                    if let Some(text) = self.claim_inline(start_line) {
                        meta.get_or_insert_with(FormattingMetadata::new)
                            .set_inline_comment(text);
                    }
                }
                prev_end = prev_end.max(self.subtree_end_line(item_idx));
                if let Some(meta) = meta {
                    sequence.set_formatting(sequence.len(), meta);
                }
            }
            sequence.push(value);
        }
        let value = Value::Sequence(sequence);
        if aid > 0 {
            self.anchors.insert(aid, value.clone());
        }
        Ok(value)
    }

    fn compose_mapping(&mut self, aid: usize, opening: usize) -> Result<Value> {
        let events = self.events;
        self.pos += 1;
        let mut mapping = Mapping::new();
        let mut prev_end = opening;
        loop {
            if let Event::MappingEnd = events[self.pos].0 {
                self.pos += 1;
                break;
            }
            let key_line = events[self.pos].1.line();
            let mut meta = if self.capture {
                self.gap_metadata(prev_end, key_line)
            } else {
                None
            };
            let key = self.compose_node(key_line)?;

            let value_idx = self.pos;
            let value_line = events[value_idx].1.line();
            let value_is_scalar = matches!(events[value_idx].0, Event::Scalar(..));
            let phantom = phantom_empty_scalar(&events[value_idx].0) && value_line > key_line;
            // The value's nested first child measures its gap from the key
            // line, never from lines already attributed to this entry.
            let value = self.compose_node(key_line)?;

            if self.capture {
                let inline = self.entry_inline(key_line, value_line, value_is_scalar && !phantom);
                if let Some(text) = inline {
                    meta.get_or_insert_with(FormattingMetadata::new)
                        .set_inline_comment(text);
                }
                let value_end = if phantom {
                    // The parser invents an empty scalar positioned at the
                    // *next* token when a key has no value; its mark must not
                    // swallow the gap before the next element.
                    key_line
                } else {
                    self.subtree_end_line(value_idx)
                };
                prev_end = prev_end.max(key_line).max(value_end);
                if let Some(meta) = meta {
                    mapping.set_formatting(key.clone(), meta);
                }
            }
            mapping.insert(key, value);
        }
        let value = Value::Mapping(mapping);
        if aid > 0 {
            self.anchors.insert(aid, value.clone());
        }
        Ok(value)
    }

    /// The trailing comment for a mapping entry sits on the key's line, or —
    /// for a scalar value written on a later line — on the value's first
    /// line. A container value starting on the key's own line (flow style)
    /// leaves the comment to its innermost entry instead.
    fn entry_inline(
        &mut self,
        key_line: usize,
        value_line: usize,
        value_is_scalar: bool,
    ) -> Option<String> {
        if value_is_scalar || value_line > key_line {
            if let Some(text) = self.claim_inline(key_line) {
                return Some(text);
            }
            if value_is_scalar && value_line > key_line {
                return self.claim_inline(value_line);
            }
        }
        None
    }

    /// Attributes the trailing comment of a source line at most once, so
    /// entries sharing a line (flow collections) cannot duplicate it.
    fn claim_inline(&mut self, line: usize) -> Option<String> {
        let text = self.lines.inline_comment(line)?;
        if self.claimed_inline.insert(line) {
            Some(text.to_owned())
        } else {
            None
        }
    }

    /// Collects blank lines and standalone comments from the source lines
    /// strictly between `prev_end` and `start`.
    fn gap_metadata(&self, prev_end: usize, start: usize) -> Option<FormattingMetadata> {
        if start <= prev_end + 1 {
            return None;
        }
        let mut meta = FormattingMetadata::new();
        for line in (prev_end + 1)..start {
            match self.lines.kind(line) {
                Some(LineKind::Blank) => {
                    meta.set_blank_lines_before(meta.blank_lines_before() + 1);
                }
                Some(LineKind::Comment(text)) => meta.push_comment_before(text.clone()),
                _ => {}
            }
        }
        if meta.is_empty() {
            None
        } else {
            Some(meta)
        }
    }

    /// The last source line of the subtree whose first event is `start`.
    ///
    /// Container end events mark the token *after* the container, so the end
    /// line is instead the maximum over the subtree's own marks, with scalar
    /// spans derived from their style. The walk is iterative with an explicit
    /// depth counter — no recursion, so document depth cannot grow the stack
    /// — and memoized so that enclosing walks skip finished subtrees.
    fn subtree_end_line(&mut self, start: usize) -> usize {
        if let Some(&(_, line)) = self.extents.get(&start) {
            return line;
        }
        let events = self.events;
        let mut max_line = 0;
        let mut depth = 0usize;
        let mut i = start;
        loop {
            if i != start {
                if let Some(&(end, line)) = self.extents.get(&i) {
                    max_line = max_line.max(line);
                    i = end + 1;
                    continue;
                }
            }
            let (ev, mark) = &events[i];
            match ev {
                Event::SequenceStart(_) | Event::MappingStart(_) => {
                    depth += 1;
                    max_line = max_line.max(mark.line());
                }
                Event::SequenceEnd | Event::MappingEnd => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Event::Scalar(text, style, _, _) => {
                    max_line = max_line.max(mark.line() + scalar_extra_lines(text, *style));
                    if depth == 0 {
                        break;
                    }
                }
                Event::Alias(_) => {
                    max_line = max_line.max(mark.line());
                    if depth == 0 {
                        break;
                    }
                }
                Event::Nothing
                | Event::StreamStart
                | Event::StreamEnd
                | Event::DocumentStart
                | Event::DocumentEnd => break,
            }
            i += 1;
        }
        self.extents.insert(start, (i, max_line));
        max_line
    }
}

/// The parser represents a missing value (`key:` with nothing after it) as
/// a plain untagged `~` scalar carrying the mark of whatever token follows.
fn phantom_empty_scalar(event: &Event) -> bool {
    matches!(event, Event::Scalar(text, TScalarStyle::Plain, _, None) if text == "~")
}

/// How many source lines a scalar spans beyond its first.
///
/// Derived from the scalar style so the estimate never overshoots: literal
/// and folded blocks keep their newlines; plain and single-quoted scalars
/// only contain a newline where the source had a line break; double-quoted
/// scalars can encode `\n` escapes on one line, so they count as one.
fn scalar_extra_lines(text: &str, style: TScalarStyle) -> usize {
    match style {
        TScalarStyle::Literal
        | TScalarStyle::Foled
        | TScalarStyle::Plain
        | TScalarStyle::SingleQuoted => text.matches('\n').count(),
        _ => 0,
    }
}

fn resolve_scalar(text: &str, style: TScalarStyle, tag: Option<&TokenType>) -> Value {
    if style != TScalarStyle::Plain {
        return Value::String(text.to_owned());
    }
    if let Some(TokenType::Tag(handle, suffix)) = tag {
        if handle == "!!" {
            return match suffix.as_str() {
                "bool" => match text.parse::<bool>() {
                    Ok(value) => Value::Bool(value),
                    Err(_) => Value::String(text.to_owned()),
                },
                "int" => match text.parse::<i64>() {
                    Ok(value) => Value::from(value),
                    Err(_) => Value::String(text.to_owned()),
                },
                "float" => match parse_f64(text) {
                    Some(value) => Value::from(value),
                    None => Value::String(text.to_owned()),
                },
                "null" => match text {
                    "~" | "null" | "" => Value::Null,
                    _ => Value::String(text.to_owned()),
                },
                _ => Value::String(text.to_owned()),
            };
        }
        return Value::String(text.to_owned());
    }
    plain_value(text)
}

/// Resolution for untagged plain scalars. `yes`/`on` stay strings, which is
/// what Kubernetes-style documents expect of their keys. The emitter uses
/// the same resolution to decide which strings must be quoted to keep their
/// type on reload.
pub(crate) fn plain_value(text: &str) -> Value {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => return Value::Null,
        "true" | "True" | "TRUE" => return Value::Bool(true),
        "false" | "False" | "FALSE" => return Value::Bool(false),
        _ => {}
    }
    if let Some(hex) = text.strip_prefix("0x") {
        if let Ok(value) = i64::from_str_radix(hex, 16) {
            return Value::from(value);
        }
    }
    if let Some(octal) = text.strip_prefix("0o") {
        if let Ok(value) = i64::from_str_radix(octal, 8) {
            return Value::from(value);
        }
    }
    if let Ok(value) = text.parse::<i64>() {
        return Value::from(value);
    }
    if let Ok(value) = text.parse::<u64>() {
        return Value::from(value);
    }
    if let Some(value) = parse_f64(text) {
        return Value::from(value);
    }
    Value::String(text.to_owned())
}

fn parse_f64(text: &str) -> Option<f64> {
    match text {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => Some(f64::NAN),
        // Reject words like `nan` and `inf` that Rust's parser accepts but
        // YAML treats as strings.
        _ if text.bytes().any(|b| b.is_ascii_digit()) => text.parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_scalar_resolution() {
        assert_eq!(plain_value("~"), Value::Null);
        assert_eq!(plain_value("true"), Value::Bool(true));
        assert_eq!(plain_value("False"), Value::Bool(false));
        assert_eq!(plain_value("42"), Value::from(42i64));
        assert_eq!(plain_value("-7"), Value::from(-7i64));
        assert_eq!(plain_value("0x1f"), Value::from(31i64));
        assert_eq!(plain_value("0o17"), Value::from(15i64));
        assert_eq!(plain_value("1.5"), Value::from(1.5f64));
        assert_eq!(plain_value("yes"), Value::String("yes".to_owned()));
        assert_eq!(plain_value("on"), Value::String("on".to_owned()));
        assert_eq!(plain_value("nan"), Value::String("nan".to_owned()));
        assert_eq!(plain_value(".inf"), Value::from(f64::INFINITY));
    }

    #[test]
    fn quoted_scalars_stay_strings() {
        let value = resolve_scalar("8080", TScalarStyle::SingleQuoted, None);
        assert_eq!(value, Value::String("8080".to_owned()));
    }

    #[test]
    fn str_tag_forces_string() {
        let tag = TokenType::Tag("!!".to_owned(), "str".to_owned());
        let value = resolve_scalar("123", TScalarStyle::Plain, Some(&tag));
        assert_eq!(value, Value::String("123".to_owned()));
    }
}
