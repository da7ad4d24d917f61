use codespan_reporting::diagnostic::{Diagnostic, Label};

use crate::matcher::Error;
use crate::source::{FileId, FileRange};
use crate::symbol::Symbol;
use crate::BUG_REPORT_URL;

/// Match compilation diagnostic messages.
#[derive(Debug, Clone)]
pub enum Message {
    ArityMismatch {
        range: Option<FileRange>,
        alt: usize,
        expected: usize,
        found: usize,
    },
    NonInductiveScrutinee {
        range: Option<FileRange>,
        target: String,
        r#type: String,
    },
    UnsupportedColumn {
        range: Option<FileRange>,
        alt: usize,
    },
    /// Values of the targets that no clause covers.
    MissingCases {
        name: Symbol,
        range: Option<FileRange>,
        examples: Vec<String>,
    },
    UnusedAlt {
        range: Option<FileRange>,
        alt: usize,
        /// Report as a warning rather than an error.
        allowed: bool,
    },
    /// Compilation failed for a reason that is not the fault of the clauses.
    Failed {
        name: Symbol,
        range: Option<FileRange>,
        message: String,
        bug: bool,
    },
}

impl Message {
    /// The message for a compilation error in the match named `name`, which
    /// is located at `range`.
    pub fn from_error(error: &Error, name: Symbol, range: Option<FileRange>) -> Message {
        match error {
            Error::ArityMismatch {
                alt,
                range,
                expected,
                found,
            } => Message::ArityMismatch {
                range: *range,
                alt: *alt,
                expected: *expected,
                found: *found,
            },
            Error::NonInductiveScrutinee {
                target,
                r#type,
                range,
            } => Message::NonInductiveScrutinee {
                range: *range,
                target: target.clone(),
                r#type: r#type.clone(),
            },
            Error::UnsupportedColumn { alt, range } => Message::UnsupportedColumn {
                range: *range,
                alt: *alt,
            },
            Error::IllFormed(_) => Message::Failed {
                name,
                range,
                message: error.to_string(),
                bug: true,
            },
            Error::RecursionDepthExceeded { .. }
            | Error::Store(_)
            | Error::Tactic(_)
            | Error::Declaration(_) => Message::Failed {
                name,
                range,
                message: error.to_string(),
                bug: false,
            },
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        let primary_label = |range: &FileRange| Label::primary(range.file_id(), *range);
        let labels = |range: &Option<FileRange>, message: &str| {
            (range.iter())
                .map(|range| primary_label(range).with_message(message))
                .collect::<Vec<_>>()
        };

        match self {
            Message::ArityMismatch {
                range,
                alt,
                expected,
                found,
            } => Diagnostic::error()
                .with_message(format!(
                    "clause {} has the wrong number of patterns",
                    alt + 1,
                ))
                .with_labels(labels(range, &format!("expected {expected} patterns")))
                .with_notes(vec![
                    format!("expected {expected} patterns"),
                    format!("   found {found} patterns"),
                ]),
            Message::NonInductiveScrutinee {
                range,
                target,
                r#type,
            } => Diagnostic::error()
                .with_message(format!("cannot match `{target}` against a constructor"))
                .with_labels(labels(range, "constructor pattern"))
                .with_notes(vec![format!("`{}` is not an inductive type", r#type)]),
            Message::UnsupportedColumn { range, alt } => Diagnostic::error()
                .with_message(format!(
                    "clause {} mixes patterns that cannot be matched together",
                    alt + 1,
                ))
                .with_labels(labels(range, "unsupported pattern"))
                .with_notes(vec![
                    "constructors, literals and array literals cannot share a column".to_owned(),
                ]),
            Message::MissingCases {
                name,
                range,
                examples,
            } => Diagnostic::error()
                .with_message(format!("missing cases in `{name}`"))
                .with_labels(labels(range, "patterns not covered"))
                .with_notes(
                    (examples.iter())
                        .map(|example| format!("missing case: {example}"))
                        .collect(),
                ),
            Message::UnusedAlt {
                range,
                alt,
                allowed,
            } => {
                let diagnostic = match allowed {
                    true => Diagnostic::warning(),
                    false => Diagnostic::error(),
                };
                diagnostic
                    .with_message(format!("clause {} is redundant", alt + 1))
                    .with_labels(labels(range, "unreachable clause"))
            }
            Message::Failed {
                name,
                range,
                message,
                bug,
            } => {
                let diagnostic = match bug {
                    true => Diagnostic::bug(),
                    false => Diagnostic::error(),
                };
                let mut notes = vec![message.clone()];
                if *bug {
                    notes.push(format!("please file a bug report at: {BUG_REPORT_URL}"));
                }
                diagnostic
                    .with_message(format!("failed to compile `{name}`"))
                    .with_labels(labels(range, "while compiling this match"))
                    .with_notes(notes)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use codespan_reporting::diagnostic::Severity;

    use super::*;
    use crate::source::ByteRange;

    #[test]
    fn clause_numbers_start_at_one() {
        let error = Error::ArityMismatch {
            alt: 0,
            range: Some(FileRange::new(0, ByteRange::new(3, 7))),
            expected: 2,
            found: 3,
        };
        let diagnostic = Message::from_error(&error, Symbol::intern("f.match_1"), None).to_diagnostic();

        assert_eq!(diagnostic.message, "clause 1 has the wrong number of patterns");
        assert_eq!(diagnostic.labels.len(), 1);
        assert_eq!(diagnostic.labels[0].range, 3..7);
    }

    #[test]
    fn internal_errors_are_bugs() {
        let error = Error::IllFormed("clause has fewer patterns than targets");
        let diagnostic = Message::from_error(&error, Symbol::intern("f.match_1"), None).to_diagnostic();

        assert_eq!(diagnostic.severity, Severity::Bug);
        assert!(diagnostic.labels.is_empty());
        assert!(diagnostic.notes.iter().any(|note| note.contains(BUG_REPORT_URL)));
    }

    #[test]
    fn allowed_unused_clauses_are_warnings() {
        let message = |allowed| Message::UnusedAlt {
            range: None,
            alt: 2,
            allowed,
        };
        assert_eq!(message(true).to_diagnostic().severity, Severity::Warning);
        assert_eq!(message(false).to_diagnostic().severity, Severity::Error);
        assert_eq!(message(false).to_diagnostic().message, "clause 3 is redundant");
    }
}
