use codespan_reporting::diagnostic::{Diagnostic, Label};

use crate::core::decl;
use crate::source::{FileId, FileRange};
use crate::surface::ParseMessage;
use crate::symbol::Symbol;

/// Elaboration diagnostic messages.
#[derive(Debug, Clone)]
pub enum Message {
    /// The problem file is not a valid TOML document of the expected shape.
    Toml {
        range: Option<FileRange>,
        message: String,
    },
    Parse(ParseMessage),
    /// The name was not previously bound in the current scope.
    UnboundName {
        range: FileRange,
        name: Symbol,
        suggestion: Option<Symbol>,
    },
    UnknownConstructor {
        range: FileRange,
        name: Symbol,
        suggestion: Option<Symbol>,
    },
    HoleInTerm {
        range: FileRange,
    },
    PatternInTerm {
        range: FileRange,
    },
    InvalidPattern {
        range: FileRange,
    },
    AmbiguousArrayLiteral {
        range: FileRange,
    },
    ArrayLiteralNotSupported {
        range: FileRange,
        expected_type: String,
    },
    LiteralNotSupported {
        range: FileRange,
        expected_type: String,
    },
    /// A constructor pattern was used against a type that is not inductive.
    NonInductivePattern {
        range: FileRange,
        ctor: Symbol,
        expected_type: String,
    },
    MismatchedConstructor {
        range: FileRange,
        ctor: Symbol,
        expected_type: String,
    },
    ConstructorArity {
        range: FileRange,
        ctor: Symbol,
        expected: usize,
        found: usize,
    },
    DuplicatePatternVar {
        range: FileRange,
        first_range: FileRange,
        name: Symbol,
    },
    MismatchedIndices {
        range: FileRange,
        ctor: Symbol,
        expected: usize,
        found: usize,
    },
    Declaration {
        range: FileRange,
        error: decl::Error,
    },
    /// A term could not be given a type.
    IllTyped {
        range: FileRange,
        message: String,
    },
}

impl From<ParseMessage> for Message {
    fn from(message: ParseMessage) -> Message {
        Message::Parse(message)
    }
}

impl Message {
    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        let primary_label = |range: &FileRange| Label::primary(range.file_id(), *range);
        let secondary_label = |range: &FileRange| Label::secondary(range.file_id(), *range);
        let suggestion_notes = |suggestion: &Option<Symbol>| match suggestion {
            Some(suggestion) => vec![format!("help: did you mean `{suggestion}`?")],
            None => Vec::new(),
        };

        match self {
            Message::Toml { range, message } => Diagnostic::error()
                .with_message("invalid problem file")
                .with_labels(range.iter().map(primary_label).collect())
                .with_notes(vec![message.clone()]),
            Message::Parse(message) => message.to_diagnostic(),
            Message::UnboundName {
                range,
                name,
                suggestion,
            } => Diagnostic::error()
                .with_message(format!("cannot find `{name}` in scope"))
                .with_labels(vec![primary_label(range).with_message("unbound name")])
                .with_notes(suggestion_notes(suggestion)),
            Message::UnknownConstructor {
                range,
                name,
                suggestion,
            } => Diagnostic::error()
                .with_message(format!("cannot find constructor `{name}`"))
                .with_labels(vec![primary_label(range).with_message("unknown constructor")])
                .with_notes(suggestion_notes(suggestion)),
            Message::HoleInTerm { range } => Diagnostic::error()
                .with_message("wildcards are only allowed in patterns")
                .with_labels(vec![primary_label(range)]),
            Message::PatternInTerm { range } => Diagnostic::error()
                .with_message("pattern syntax is only allowed in patterns")
                .with_labels(vec![primary_label(range)]),
            Message::InvalidPattern { range } => Diagnostic::error()
                .with_message("invalid pattern")
                .with_labels(vec![primary_label(range).with_message("expected a pattern")])
                .with_notes(vec![
                    "patterns are variables, constructor applications, literals, array \
                     literals, `_`, `x@p` or `.(t)`"
                        .to_owned(),
                ]),
            Message::AmbiguousArrayLiteral { range } => Diagnostic::error()
                .with_message("ambiguous array literal")
                .with_labels(vec![
                    primary_label(range).with_message("cannot infer the element type")
                ]),
            Message::ArrayLiteralNotSupported {
                range,
                expected_type,
            } => Diagnostic::error()
                .with_message("array literal not supported")
                .with_labels(vec![
                    primary_label(range).with_message(format!("expected `{expected_type}`"))
                ]),
            Message::LiteralNotSupported {
                range,
                expected_type,
            } => Diagnostic::error()
                .with_message("literal not supported")
                .with_labels(vec![
                    primary_label(range).with_message(format!("expected `{expected_type}`"))
                ]),
            Message::NonInductivePattern {
                range,
                ctor,
                expected_type,
            } => Diagnostic::error()
                .with_message(format!("cannot match `{ctor}` against a non-inductive type"))
                .with_labels(vec![
                    primary_label(range).with_message(format!("expected `{expected_type}`"))
                ]),
            Message::MismatchedConstructor {
                range,
                ctor,
                expected_type,
            } => Diagnostic::error()
                .with_message(format!("`{ctor}` is not a constructor of `{expected_type}`"))
                .with_labels(vec![
                    primary_label(range).with_message(format!("expected `{expected_type}`"))
                ]),
            Message::ConstructorArity {
                range,
                ctor,
                expected,
                found,
            } => Diagnostic::error()
                .with_message(format!("wrong number of fields for `{ctor}`"))
                .with_labels(vec![primary_label(range)])
                .with_notes(vec![
                    format!("expected {expected} fields"),
                    format!("   found {found} fields"),
                ]),
            Message::DuplicatePatternVar {
                range,
                first_range,
                name,
            } => Diagnostic::error()
                .with_message(format!("`{name}` is bound more than once in the same clause"))
                .with_labels(vec![
                    primary_label(range).with_message("rebound here"),
                    secondary_label(first_range).with_message("first bound here"),
                ]),
            Message::MismatchedIndices {
                range,
                ctor,
                expected,
                found,
            } => Diagnostic::error()
                .with_message(format!("wrong number of indices for `{ctor}`"))
                .with_labels(vec![primary_label(range)])
                .with_notes(vec![
                    format!("expected {expected} indices"),
                    format!("   found {found} indices"),
                ]),
            Message::Declaration { range, error } => Diagnostic::error()
                .with_message(error.to_string())
                .with_labels(vec![primary_label(range)]),
            Message::IllTyped { range, message } => Diagnostic::error()
                .with_message("ill-typed term")
                .with_labels(vec![primary_label(range).with_message(message.clone())]),
        }
    }
}
