use codespan_reporting::diagnostic::{Diagnostic, Label};
use logos::Logos;

use crate::source::{BytePos, ByteRange, FileId, FileRange};

#[derive(Clone, Debug, PartialEq, Eq, Logos)]
#[logos(extras = FileId)]
pub enum Token<'source> {
    #[regex(r"[\p{Letter}_][\p{Letter}0-9_']*(\.[\p{Letter}_][\p{Letter}0-9_']*)*")]
    Name(&'source str),
    #[regex(r#""([^"\\]|\\.)*""#, |lex| &lex.slice()[1..(lex.slice().len() - 1)])]
    StringLiteral(&'source str),
    #[regex(r"[0-9][0-9_]*")]
    NumberLiteral(&'source str),

    #[token("Type")]
    KeywordType,
    #[token("Prop")]
    KeywordProp,

    #[token("@")]
    At,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".(")]
    FullStopOpenParen,
    #[token("#[")]
    HashOpenBracket,
    #[token("_", priority = 3)]
    Underscore,
    #[token("]")]
    CloseBracket,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,

    #[error]
    #[regex(r"\p{Whitespace}", logos::skip)]
    Error,
}

pub type Spanned<Tok, Loc> = (Loc, Tok, Loc);

#[derive(Clone, Debug)]
pub enum Error {
    UnexpectedCharacter { range: FileRange },
}

impl Error {
    pub fn range(&self) -> FileRange {
        match self {
            Error::UnexpectedCharacter { range } => *range,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        match self {
            Error::UnexpectedCharacter { range } => Diagnostic::error()
                .with_message("unexpected character")
                .with_labels(vec![Label::primary(range.file_id(), *range)]),
        }
    }
}

/// Tokenize `source`, which starts at byte `offset` of the file.
pub fn tokens(
    file_id: FileId,
    offset: BytePos,
    source: &str,
) -> impl Iterator<Item = Result<Spanned<Token<'_>, BytePos>, Error>> {
    assert!(
        source.len() <= u32::MAX as usize,
        "`source` must be less than 4GiB in length"
    );

    Token::lexer_with_extras(source, file_id)
        .spanned()
        .map(move |(token, range)| {
            let start = offset + range.start as BytePos;
            let end = offset + range.end as BytePos;
            match token {
                Token::Error => Err(Error::UnexpectedCharacter {
                    range: FileRange::new(file_id, ByteRange::new(start, end)),
                }),
                token => Ok((start, token, end)),
            }
        })
}

impl<'source> Token<'source> {
    pub fn description(&self) -> &'static str {
        match self {
            Token::Name(_) => "name",
            Token::StringLiteral(_) => "string literal",
            Token::NumberLiteral(_) => "number literal",
            Token::KeywordType => "Type",
            Token::KeywordProp => "Prop",
            Token::At => "@",
            Token::Colon => ":",
            Token::Comma => ",",
            Token::FullStopOpenParen => ".(",
            Token::HashOpenBracket => "#[",
            Token::Underscore => "_",
            Token::CloseBracket => "]",
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token<'_>> {
        tokens(0, 0, source).map(|token| token.unwrap().1).collect()
    }

    #[test]
    fn dotted_names() {
        assert_eq!(
            lex("Vec.cons m α' _ .(Nat.succ n)"),
            [
                Token::Name("Vec.cons"),
                Token::Name("m"),
                Token::Name("α'"),
                Token::Underscore,
                Token::FullStopOpenParen,
                Token::Name("Nat.succ"),
                Token::Name("n"),
                Token::CloseParen,
            ],
        );
    }

    #[test]
    fn keywords_and_literals() {
        assert_eq!(
            lex(r#"Type Prop 1_000 "a\"b" #[x, y] n@Types"#),
            [
                Token::KeywordType,
                Token::KeywordProp,
                Token::NumberLiteral("1_000"),
                Token::StringLiteral(r#"a\"b"#),
                Token::HashOpenBracket,
                Token::Name("x"),
                Token::Comma,
                Token::Name("y"),
                Token::CloseBracket,
                Token::Name("n"),
                Token::At,
                Token::Name("Types"),
            ],
        );
    }

    #[test]
    fn ranges_are_offset() {
        let tokens = tokens(3, 10, " x ?").collect::<Vec<_>>();
        assert!(matches!(&tokens[0], Ok((11, Token::Name("x"), 12))));
        match &tokens[1] {
            Err(error) => assert_eq!(error.range(), FileRange::new(3, ByteRange::new(13, 14))),
            Ok(_) => panic!("expected an error"),
        }
    }
}
