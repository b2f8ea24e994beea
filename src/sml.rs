//! Parser, builder, and writer for the tagged nested text grammar.
//!
//! A document is a single node: `{tag item*}` where each item is a child
//! node, a raw text run, or a double-quoted string. Tags consist of
//! `a-z0-9-` (input is lowercased before the check). Raw text ends at a
//! brace or quote and has its whitespace collapsed; quoted text is taken
//! verbatim with `\"` and `\\` escapes. A node's text parts are joined
//! with single spaces.
//!
//! ```text
//! {etc
//!    {host localhost}
//!    {greeting "hello world"}
//! }
//! ```

use std::io;
use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SmlError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("expected '{{' at byte {at}, found '{ch}'")]
    ExpectedNode { ch: char, at: usize },

    #[error("node tag is empty")]
    EmptyTag,

    #[error("illegal character '{ch}' in tag at byte {at}")]
    IllegalTagChar { ch: char, at: usize },

    #[error("unterminated quoted string starting at byte {at}")]
    UnterminatedString { at: usize },

    #[error("trailing input after document at byte {at}")]
    TrailingInput { at: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub tag: String,
    pub text: String,
    pub children: Vec<Node>,
}

/// Parse a complete document into its single root node.
pub fn parse(source: &str) -> Result<Node, SmlError> {
    let mut parser = Parser {
        chars: source.char_indices().peekable(),
    };
    parser.skip_whitespace();
    let root = parser.node()?;
    parser.skip_whitespace();
    if let Some(&(at, _)) = parser.chars.peek() {
        return Err(SmlError::TrailingInput { at });
    }
    Ok(root)
}

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some(&(_, ch)) if ch.is_whitespace()) {
            self.chars.next();
        }
    }

    fn node(&mut self) -> Result<Node, SmlError> {
        match self.chars.next() {
            Some((_, '{')) => {}
            Some((at, ch)) => return Err(SmlError::ExpectedNode { ch, at }),
            None => return Err(SmlError::UnexpectedEnd),
        }
        self.skip_whitespace();
        let tag = self.tag()?;
        let mut texts: Vec<String> = Vec::new();
        let mut children = Vec::new();
        loop {
            match self.chars.peek().copied() {
                None => return Err(SmlError::UnexpectedEnd),
                Some((_, '{')) => children.push(self.node()?),
                Some((_, '}')) => {
                    self.chars.next();
                    break;
                }
                Some((at, '"')) => {
                    self.chars.next();
                    texts.push(self.quoted(at)?);
                }
                Some(_) => {
                    let run = self.raw_run();
                    if !run.is_empty() {
                        texts.push(run);
                    }
                }
            }
        }
        texts.retain(|text| !text.is_empty());
        Ok(Node {
            tag,
            text: texts.join(" "),
            children,
        })
    }

    fn tag(&mut self) -> Result<String, SmlError> {
        let mut tag = String::new();
        while let Some(&(at, ch)) = self.chars.peek() {
            if ch.is_whitespace() || matches!(ch, '{' | '}' | '"') {
                break;
            }
            let lower = ch.to_ascii_lowercase();
            if !(lower.is_ascii_lowercase() || lower.is_ascii_digit() || lower == '-') {
                return Err(SmlError::IllegalTagChar { ch, at });
            }
            tag.push(lower);
            self.chars.next();
        }
        if tag.is_empty() {
            return Err(SmlError::EmptyTag);
        }
        Ok(tag)
    }

    fn raw_run(&mut self) -> String {
        let mut run = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            if matches!(ch, '{' | '}' | '"') {
                break;
            }
            run.push(ch);
            self.chars.next();
        }
        run.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn quoted(&mut self, start: usize) -> Result<String, SmlError> {
        let mut text = String::new();
        loop {
            match self.chars.next() {
                None => return Err(SmlError::UnterminatedString { at: start }),
                Some((_, '"')) => return Ok(text),
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, escaped)) => text.push(escaped),
                    None => return Err(SmlError::UnterminatedString { at: start }),
                },
                Some((_, ch)) => text.push(ch),
            }
        }
    }
}

/// Event-style node assembly, used by the serializer's depth-diff rebuild.
/// Tags are opened and closed like a SAX stream; `root` hands out the
/// finished document once every opened tag has been closed.
#[derive(Debug, Default)]
pub struct Builder {
    stack: Vec<Node>,
    root: Option<Node>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    pub fn begin_tag(&mut self, tag: &str) {
        self.stack.push(Node {
            tag: tag.to_string(),
            text: String::new(),
            children: Vec::new(),
        });
    }

    pub fn text(&mut self, text: &str) {
        if let Some(open) = self.stack.last_mut() {
            text.clone_into(&mut open.text);
        }
    }

    pub fn end_tag(&mut self) {
        let Some(finished) = self.stack.pop() else {
            return;
        };
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(finished),
            None => self.root = Some(finished),
        }
    }

    /// The finished document, or `None` if nothing was built or a tag is
    /// still open.
    pub fn root(self) -> Option<Node> {
        if self.stack.is_empty() { self.root } else { None }
    }
}

/// Write a node tree to `target`. Pretty mode puts one node per line with a
/// 3-space indent per depth level; compact mode emits no whitespace beyond
/// what the grammar needs.
pub fn write(node: &Node, target: &mut impl io::Write, pretty: bool) -> io::Result<()> {
    if pretty {
        write_pretty(node, target, 0)
    } else {
        write_compact(node, target)
    }
}

fn write_compact(node: &Node, target: &mut impl io::Write) -> io::Result<()> {
    write!(target, "{{{}", node.tag)?;
    if !node.text.is_empty() {
        write!(target, " {}", encode_text(&node.text))?;
    }
    for child in &node.children {
        write_compact(child, target)?;
    }
    write!(target, "}}")
}

fn write_pretty(node: &Node, target: &mut impl io::Write, depth: usize) -> io::Result<()> {
    let indent = "   ".repeat(depth);
    write!(target, "{indent}{{{}", node.tag)?;
    if !node.text.is_empty() {
        write!(target, " {}", encode_text(&node.text))?;
    }
    if node.children.is_empty() {
        return writeln!(target, "}}");
    }
    writeln!(target)?;
    for child in &node.children {
        write_pretty(child, target, depth + 1)?;
    }
    writeln!(target, "{indent}}}")
}

// Quote whenever the text would not survive a raw-run round trip.
fn encode_text(text: &str) -> String {
    let plain = !text
        .chars()
        .any(|ch| ch.is_whitespace() || matches!(ch, '{' | '}' | '"' | '\\'));
    if plain {
        return text.to_string();
    }
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        if matches!(ch, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}
