//! Comment capture.
//!
//! The yaml-rust tokenizer discards comments and blank lines without any
//! callback, so this scanner observes the same character stream one pass
//! ahead of the parser. It classifies every source line as blank, standalone
//! comment, or content, and records trailing comments on content lines. The
//! composer later attributes the classified lines to elements using the
//! parser's source markers.
//!
//! The scanner must never mistake scalar content for formatting, so it
//! tracks the two multi-line constructs in which a `#` or an empty line is
//! ordinary text: quoted scalars that span lines, and block scalars.

/// Classification of one source line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LineKind {
    /// Entirely empty or whitespace.
    Blank,
    /// A line whose first non-space character starts a comment. The text
    /// includes the leading `#` and is trimmed on the right.
    Comment(String),
    /// Anything else, with the trailing comment if the line carries one.
    Content {
        inline_comment: Option<String>,
    },
}

/// Per-line classification of a source document, indexed by 1-based line
/// number to match the parser's markers.
#[derive(Debug, Default)]
pub(crate) struct LineIndex {
    kinds: Vec<LineKind>,
}

impl LineIndex {
    pub(crate) fn len(&self) -> usize {
        self.kinds.len()
    }

    pub(crate) fn kind(&self, line: usize) -> Option<&LineKind> {
        if line == 0 {
            return None;
        }
        self.kinds.get(line - 1)
    }

    pub(crate) fn inline_comment(&self, line: usize) -> Option<&str> {
        match self.kind(line) {
            Some(LineKind::Content {
                inline_comment: Some(text),
            }) => Some(text),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Quote {
    None,
    Single,
    Double,
}

struct BlockScalar {
    /// Indentation of the line that carried the `|`/`>` header.
    header_indent: usize,
    /// Indentation established by the first non-blank content line.
    content_indent: Option<usize>,
}

/// The comment-capturing scanner. One instance scans one document stream.
pub(crate) struct CommentScanner {
    quote: Quote,
    block: Option<BlockScalar>,
    /// Blank lines seen inside a block scalar, pending until the next
    /// non-blank line decides whether they were content or real blanks.
    pending_blanks: Vec<usize>,
    kinds: Vec<LineKind>,
}

impl CommentScanner {
    pub(crate) fn new() -> Self {
        CommentScanner {
            quote: Quote::None,
            block: None,
            pending_blanks: Vec::new(),
            kinds: Vec::new(),
        }
    }

    /// Scans the full input and returns the per-line classification.
    pub(crate) fn scan(mut self, input: &str) -> LineIndex {
        for raw in input.split('\n') {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            self.scan_line(line);
        }
        // Blanks trailing an unterminated block scalar at end of input are
        // real blanks.
        for line in std::mem::take(&mut self.pending_blanks) {
            self.kinds[line - 1] = LineKind::Blank;
        }
        LineIndex { kinds: self.kinds }
    }

    fn scan_line(&mut self, line: &str) {
        let lineno = self.kinds.len() + 1;

        if self.block.is_some() {
            if is_blank(line) {
                // Placeholder; rewritten once the block's fate is known.
                self.kinds.push(LineKind::Blank);
                self.pending_blanks.push(lineno);
                return;
            }
            if self.block_claims(indent_of(line)) {
                self.resolve_pending(LineKind::Content {
                    inline_comment: None,
                });
                self.kinds.push(LineKind::Content {
                    inline_comment: None,
                });
                return;
            }
            // The block ended before this line; pending blanks were real.
            self.block = None;
            self.resolve_pending(LineKind::Blank);
        }

        if self.quote == Quote::None && is_blank(line) {
            self.kinds.push(LineKind::Blank);
            return;
        }

        let (kind, header) = self.classify_content(line);
        self.kinds.push(kind);
        if let Some(header_indent) = header {
            self.block = Some(BlockScalar {
                header_indent,
                content_indent: None,
            });
        }
    }

    /// Whether a non-blank line at the given indentation is still inside the
    /// current block scalar, updating the detected content indentation.
    fn block_claims(&mut self, indent: usize) -> bool {
        let block = self.block.as_mut().expect("inside a block scalar");
        match block.content_indent {
            None => {
                if indent > block.header_indent {
                    block.content_indent = Some(indent);
                    true
                } else {
                    false
                }
            }
            Some(content_indent) => indent >= content_indent,
        }
    }

    fn resolve_pending(&mut self, kind: LineKind) {
        for line in std::mem::take(&mut self.pending_blanks) {
            self.kinds[line - 1] = kind.clone();
        }
    }

    /// Classifies a content-or-comment line, advancing the quote state, and
    /// reports whether the line opens a block scalar.
    fn classify_content(&mut self, line: &str) -> (LineKind, Option<usize>) {
        let mut comment_start = None;
        let mut prev = ' ';
        let mut chars = line.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            match self.quote {
                Quote::Single => {
                    if c == '\'' {
                        if let Some(&(_, '\'')) = chars.peek() {
                            chars.next();
                        } else {
                            self.quote = Quote::None;
                        }
                    }
                }
                Quote::Double => {
                    if c == '\\' {
                        chars.next();
                    } else if c == '"' {
                        self.quote = Quote::None;
                    }
                }
                Quote::None => match c {
                    '\'' if opens_quote(prev) => self.quote = Quote::Single,
                    '"' if opens_quote(prev) => self.quote = Quote::Double,
                    '#' if prev.is_whitespace() => {
                        comment_start = Some(i);
                        break;
                    }
                    _ => {}
                },
            }
            prev = c;
        }

        if let Some(start) = comment_start {
            let text = line[start..].trim_end().to_owned();
            if line[..start].trim().is_empty() {
                return (LineKind::Comment(text), None);
            }
            let header = self.block_header(&line[..start]);
            return (
                LineKind::Content {
                    inline_comment: Some(text),
                },
                header,
            );
        }

        let header = self.block_header(line);
        (
            LineKind::Content {
                inline_comment: None,
            },
            header,
        )
    }

    /// Detects a `|`/`>` block scalar header at the end of the line's
    /// effective content, returning the header line's indentation.
    fn block_header(&self, content: &str) -> Option<usize> {
        if self.quote != Quote::None {
            return None;
        }
        let trimmed = content.trim_end();
        let token = trimmed
            .rsplit(|c| c == ' ' || c == '\t')
            .next()
            .unwrap_or("");
        let mut chars = token.chars();
        match chars.next() {
            Some('|') | Some('>') => {}
            _ => return None,
        }
        let rest = chars.as_str();
        if rest.len() <= 2 && rest.chars().all(|c| c == '+' || c == '-' || c.is_ascii_digit()) {
            Some(indent_of(content))
        } else {
            None
        }
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indent_of(line: &str) -> usize {
    line.chars().take_while(|&c| c == ' ').count()
}

/// A quote begins a scalar only at a scalar boundary, never inside a plain
/// scalar like `don't`.
fn opens_quote(prev: char) -> bool {
    prev.is_whitespace() || prev == '[' || prev == '{' || prev == ','
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str) -> LineIndex {
        CommentScanner::new().scan(input)
    }

    fn content() -> LineKind {
        LineKind::Content {
            inline_comment: None,
        }
    }

    #[test]
    fn classifies_basic_lines() {
        let index = scan("key: value\n\n# section\nother: 1\n");
        assert_eq!(index.kind(1), Some(&content()));
        assert_eq!(index.kind(2), Some(&LineKind::Blank));
        assert_eq!(index.kind(3), Some(&LineKind::Comment("# section".to_owned())));
        assert_eq!(index.kind(4), Some(&content()));
    }

    #[test]
    fn detects_inline_comments() {
        let index = scan("port: 8080  # default port\n");
        assert_eq!(index.inline_comment(1), Some("# default port"));
    }

    #[test]
    fn hash_without_leading_space_is_not_a_comment() {
        let index = scan("url: http://example.com/a#frag\n");
        assert_eq!(index.kind(1), Some(&content()));
    }

    #[test]
    fn hash_inside_quotes_is_not_a_comment() {
        let index = scan("msg: \"a # b\"\nother: 'c # d'\n");
        assert_eq!(index.kind(1), Some(&content()));
        assert_eq!(index.kind(2), Some(&content()));
    }

    #[test]
    fn apostrophe_does_not_open_a_quote() {
        let index = scan("word: don't  # note\n");
        assert_eq!(index.inline_comment(1), Some("# note"));
    }

    #[test]
    fn quoted_scalar_spanning_lines() {
        let index = scan("msg: \"hello\n  # not a comment\"\nnext: 1\n");
        assert_eq!(index.kind(1), Some(&content()));
        assert_eq!(index.kind(2), Some(&content()));
        assert_eq!(index.kind(3), Some(&content()));
    }

    #[test]
    fn block_scalar_content_is_opaque() {
        let index = scan("script: |\n  #!/bin/sh\n\n  echo hi\nnext: 1\n");
        assert_eq!(index.kind(2), Some(&content()));
        // The interior blank belongs to the block, not to `next`.
        assert_eq!(index.kind(3), Some(&content()));
        assert_eq!(index.kind(4), Some(&content()));
        assert_eq!(index.kind(5), Some(&content()));
    }

    #[test]
    fn blanks_after_chomped_block_are_real() {
        let index = scan("script: |-\n  echo hi\n\n\nnext: 1\n");
        assert_eq!(index.kind(2), Some(&content()));
        assert_eq!(index.kind(3), Some(&LineKind::Blank));
        assert_eq!(index.kind(4), Some(&LineKind::Blank));
        assert_eq!(index.kind(5), Some(&content()));
    }

    #[test]
    fn dedented_comment_ends_block() {
        let index = scan("- key: |\n    text\n  # note\n  other: 1\n");
        assert_eq!(index.kind(2), Some(&content()));
        assert_eq!(index.kind(3), Some(&LineKind::Comment("# note".to_owned())));
        assert_eq!(index.kind(4), Some(&content()));
    }

    #[test]
    fn block_header_with_modifiers() {
        let index = scan("a: |2-\n   x\nb: >\n  folded\nc: 1\n");
        assert_eq!(index.kind(2), Some(&content()));
        assert_eq!(index.kind(4), Some(&content()));
        assert_eq!(index.kind(5), Some(&content()));
    }
}
