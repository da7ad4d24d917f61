//! Surface syntax of problem files.
//!
//! Problem files are TOML documents whose string values hold terms, binders
//! and patterns written in a small expression language. This module defines
//! that language; [`elaboration`] turns a whole problem file into
//! declarations and match problems.

use codespan_reporting::diagnostic::{Diagnostic, Label};
use itertools::Itertools;
use lalrpop_util::lalrpop_mod;

use crate::source::{BytePos, ByteRange, FileId, FileRange};
use crate::surface::lexer::{Spanned, Token};
use crate::symbol::Symbol;

pub mod elaboration;
lalrpop_mod!(grammar, "/surface/grammar.rs");
pub mod lexer;

/// Delimiters and as-patterns may nest at most this deeply in a single term.
pub const MAX_NESTING: usize = 256;

/// Terms, which also cover the pattern forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Term {
    Name(FileRange, Symbol),
    /// Wildcard pattern: `_`
    Hole(FileRange),
    Type(FileRange),
    Prop(FileRange),
    NatLiteral(FileRange, u64),
    StringLiteral(FileRange, String),
    App(FileRange, Box<Term>, Vec<Term>),
    Paren(FileRange, Box<Term>),
    ArrayLiteral(FileRange, Vec<Term>),
    /// As-pattern: `x@p`
    As(FileRange, (FileRange, Symbol), Box<Term>),
    /// Inaccessible pattern: `.(t)`
    Inaccessible(FileRange, Box<Term>),
}

impl Term {
    pub fn range(&self) -> FileRange {
        match self {
            Term::Name(range, _)
            | Term::Hole(range)
            | Term::Type(range)
            | Term::Prop(range)
            | Term::NatLiteral(range, _)
            | Term::StringLiteral(range, _)
            | Term::App(range, _, _)
            | Term::Paren(range, _)
            | Term::ArrayLiteral(range, _)
            | Term::As(range, _, _)
            | Term::Inaccessible(range, _) => *range,
        }
    }

    /// Parse a term from `source`, which begins at byte `offset` of the file.
    pub fn parse(file_id: FileId, offset: BytePos, source: &str) -> Result<Term, ParseMessage> {
        grammar::TermParser::new()
            .parse(file_id, tokens(file_id, offset, source))
            .map_err(|error| ParseMessage::from_lalrpop(file_id, offset, error))
    }
}

/// Binders of the form `x : T`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binder {
    pub range: FileRange,
    pub name: (FileRange, Symbol),
    pub r#type: Term,
}

impl Binder {
    pub fn parse(file_id: FileId, offset: BytePos, source: &str) -> Result<Binder, ParseMessage> {
        let (range, name, r#type) = grammar::BinderParser::new()
            .parse(file_id, tokens(file_id, offset, source))
            .map_err(|error| ParseMessage::from_lalrpop(file_id, offset, error))?;

        Ok(Binder {
            range,
            name,
            r#type,
        })
    }
}

/// The tokens of `source`, failing once terms nest deeper than
/// [`MAX_NESTING`]. As-patterns are never closed, so each one counts for the
/// rest of the term.
fn tokens(
    file_id: FileId,
    offset: BytePos,
    source: &str,
) -> impl Iterator<Item = Result<Spanned<Token<'_>, BytePos>, ParseMessage>> {
    let mut depth = 0_usize;
    lexer::tokens(file_id, offset, source).map(move |token| {
        let (start, token, end) = token?;
        match token {
            Token::OpenParen | Token::FullStopOpenParen | Token::HashOpenBracket | Token::At => {
                depth += 1;
            }
            Token::CloseParen | Token::CloseBracket => depth = depth.saturating_sub(1),
            _ => {}
        }
        match depth > MAX_NESTING {
            true => Err(ParseMessage::NestingTooDeep {
                range: FileRange::new(file_id, ByteRange::new(start, end)),
            }),
            false => Ok((start, token, end)),
        }
    })
}

fn unescape(contents: &str) -> String {
    let mut output = String::with_capacity(contents.len());
    let mut chars = contents.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => output.push('\n'),
                Some('t') => output.push('\t'),
                Some(c) => output.push(c),
                None => output.push('\\'),
            },
            c => output.push(c),
        }
    }
    output
}

/// Messages produced during parsing
#[derive(Clone, Debug)]
pub enum ParseMessage {
    Lexer(lexer::Error),
    InvalidNumericLiteral {
        range: FileRange,
    },
    NestingTooDeep {
        range: FileRange,
    },
    UnrecognizedEof {
        range: FileRange,
        expected: Vec<String>,
    },
    UnrecognizedToken {
        range: FileRange,
        token: &'static str,
        expected: Vec<String>,
    },
    ExtraToken {
        range: FileRange,
        token: &'static str,
    },
}

impl From<lexer::Error> for ParseMessage {
    fn from(error: lexer::Error) -> ParseMessage {
        ParseMessage::Lexer(error)
    }
}

impl ParseMessage {
    /// Convert a parser error, where `offset` is the start of the parsed
    /// string in the file.
    pub fn from_lalrpop(
        file_id: FileId,
        offset: BytePos,
        error: lalrpop_util::ParseError<BytePos, Token<'_>, ParseMessage>,
    ) -> ParseMessage {
        use lalrpop_util::ParseError::*;

        let range = |start, end| FileRange::new(file_id, ByteRange::new(start, end));
        match error {
            InvalidToken { location } => ParseMessage::Lexer(lexer::Error::UnexpectedCharacter {
                range: range(location, location),
            }),
            UnrecognizedEOF { location, expected } => {
                // An empty string has no tokens to locate the end by.
                let location = BytePos::max(location, offset);
                ParseMessage::UnrecognizedEof {
                    range: range(location, location),
                    expected,
                }
            }
            UnrecognizedToken {
                token: (start, token, end),
                expected,
            } => ParseMessage::UnrecognizedToken {
                range: range(start, end),
                token: token.description(),
                expected,
            },
            ExtraToken {
                token: (start, token, end),
            } => ParseMessage::ExtraToken {
                range: range(start, end),
                token: token.description(),
            },
            User { error } => error,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        let primary_label = |range: &FileRange| Label::primary(range.file_id(), *range);

        match self {
            ParseMessage::Lexer(error) => error.to_diagnostic(),
            ParseMessage::InvalidNumericLiteral { range } => Diagnostic::error()
                .with_message("numeric literal is too large")
                .with_labels(vec![primary_label(range)])
                .with_notes(vec![format!("literals must be at most {}", u64::MAX)]),
            ParseMessage::NestingTooDeep { range } => Diagnostic::error()
                .with_message("term is nested too deeply")
                .with_labels(vec![primary_label(range)])
                .with_notes(vec![format!("terms may nest at most {MAX_NESTING} levels deep")]),
            ParseMessage::UnrecognizedEof { range, expected } => Diagnostic::error()
                .with_message("unexpected end of term")
                .with_labels(vec![primary_label(range).with_message("unexpected end of term")])
                .with_notes(format_expected(expected).map_or(Vec::new(), |message| vec![message])),
            ParseMessage::UnrecognizedToken {
                range,
                token,
                expected,
            } => Diagnostic::error()
                .with_message(format!("unexpected token {token}"))
                .with_labels(vec![primary_label(range).with_message("unexpected token")])
                .with_notes(format_expected(expected).map_or(Vec::new(), |message| vec![message])),
            ParseMessage::ExtraToken { range, token } => Diagnostic::error()
                .with_message(format!("extra token {token}"))
                .with_labels(vec![primary_label(range).with_message("extra token")]),
        }
    }
}

fn format_expected(expected: &[impl std::fmt::Display]) -> Option<String> {
    expected.split_last().map(|items| match items {
        (last, []) => format!("expected {last}"),
        (last, expected) => format!("expected {} or {}", expected.iter().format(", "), last),
    })
}
