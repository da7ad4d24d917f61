use codespan_reporting::diagnostic::{Diagnostic, Severity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::termcolor::{BufferedStandardStream, ColorChoice, WriteColor};
use pretty::RcDoc;
use std::cell::RefCell;
use std::io::{Read, Write};
use std::path::Path;

use crate::core::decl::Environment;
use crate::core::pretty::Context as PrettyContext;
use crate::matcher::pattern::render_examples;
use crate::matcher::reporting::Message;
use crate::matcher::{self, mk_elim};
use crate::meta::MetaContext;
use crate::source::FileId;
use crate::surface::elaboration::{self, Match};
use crate::symbol::Symbol;
use crate::tactic::ElimTactics;
use crate::BUG_REPORT_URL;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Error => 1,
        }
    }
}

/// The outcome of compiling a single match.
#[derive(Debug, Clone)]
pub struct CompiledMatch {
    pub name: Symbol,
    /// The number of goals discharged by each clause.
    pub subgoals: Vec<usize>,
    /// Rendered values that no clause covers.
    pub counterexamples: Vec<String>,
    /// Clauses that never discharged a goal, numbered from zero.
    pub unused_alts: Vec<usize>,
    /// The type of the auxiliary definition.
    pub r#type: String,
}

pub struct Driver {
    files: SimpleFiles<String, String>,

    config: matcher::Config,
    allow_unused: bool,
    seen_errors: RefCell<bool>,
    codespan_config: codespan_reporting::term::Config,
    diagnostic_writer: RefCell<Box<dyn WriteColor>>,

    emit_width: usize,
    emit_writer: RefCell<Box<dyn WriteColor>>,
}

impl Default for Driver {
    fn default() -> Driver {
        Driver::new()
    }
}

impl Driver {
    pub fn new() -> Driver {
        Driver {
            files: SimpleFiles::new(),

            config: matcher::Config::default(),
            allow_unused: false,
            seen_errors: RefCell::new(false),
            codespan_config: codespan_reporting::term::Config::default(),
            diagnostic_writer: RefCell::new(Box::new(BufferedStandardStream::stderr(
                if atty::is(atty::Stream::Stderr) {
                    ColorChoice::Auto
                } else {
                    ColorChoice::Never
                },
            ))),

            emit_width: usize::MAX,
            emit_writer: RefCell::new(Box::new(BufferedStandardStream::stdout(
                if atty::is(atty::Stream::Stdout) {
                    ColorChoice::Auto
                } else {
                    ColorChoice::Never
                },
            ))),
        }
    }

    /// Setup a global panic hook
    pub fn install_panic_hook(&self) {
        // Use the currently set codespan configuration
        let term_config = self.codespan_config.clone();
        // Fetch the default hook (which prints the panic message and an optional backtrace)
        let default_hook = std::panic::take_hook();

        std::panic::set_hook(Box::new(move |info| {
            let location = info.location();
            let message = if let Some(message) = info.payload().downcast_ref::<String>() {
                message.as_str()
            } else if let Some(message) = info.payload().downcast_ref::<&str>() {
                message
            } else {
                "unknown panic type"
            };

            let diagnostic = Diagnostic::bug()
                .with_message(format!("match compiler panicked at '{message}'"))
                .with_notes(vec![
                    match location {
                        Some(location) => format!("panicked at: {location}"),
                        None => "panicked at: unknown location".to_owned(),
                    },
                    format!("please file a bug report at: {BUG_REPORT_URL}"),
                ]);

            let mut writer = BufferedStandardStream::stderr(if atty::is(atty::Stream::Stderr) {
                ColorChoice::Auto
            } else {
                ColorChoice::Never
            });
            let dummy_files = SimpleFiles::<String, String>::new();

            default_hook(info);
            eprintln!();
            // Nothing more can be reported if stderr is gone.
            let _ = codespan_reporting::term::emit(&mut writer, &term_config, &dummy_files, &diagnostic);
        }));
    }

    /// Set the maximum depth of the case trees built for each match
    pub fn set_max_recursion_depth(&mut self, depth: usize) {
        self.config.max_recursion_depth = depth;
    }

    /// Report unused clauses as warnings rather than errors
    pub fn set_allow_unused(&mut self, allow_unused: bool) {
        self.allow_unused = allow_unused;
    }

    /// Set the writer to use when rendering diagnostics
    pub fn set_diagnostic_writer(&mut self, stream: impl 'static + WriteColor) {
        self.diagnostic_writer = RefCell::new(Box::new(stream) as Box<dyn WriteColor>);
    }

    /// Set the width to use when emitting compiled matches
    pub fn set_emit_width(&mut self, emit_width: usize) {
        self.emit_width = emit_width;
    }

    /// Set the writer to use when emitting compiled matches
    pub fn set_emit_writer(&mut self, stream: impl 'static + WriteColor) {
        self.emit_writer = RefCell::new(Box::new(stream) as Box<dyn WriteColor>);
    }

    /// Load a source string into the file database.
    pub fn load_source_string(&mut self, name: String, source: String) -> FileId {
        self.files.add(name, source)
    }

    /// Load a source file into the file database using a reader.
    pub fn load_source(&mut self, name: String, mut reader: impl Read) -> Option<FileId> {
        let mut source = String::new();
        match reader.read_to_string(&mut source) {
            Ok(_) => Some(self.load_source_string(name, source)),
            Err(error) => {
                self.emit_read_diagnostic(name, error);
                None
            }
        }
    }

    /// Load a source file into the file database from the given path.
    pub fn load_source_path(&mut self, path: &Path) -> Option<FileId> {
        match std::fs::File::open(path) {
            Ok(file) => self.load_source(path.display().to_string(), file),
            Err(error) => {
                self.emit_read_diagnostic(path.display(), error);
                None
            }
        }
    }

    /// Elaborate and compile every match in a problem file, reporting
    /// diagnostics as they are found.
    pub fn compile_module(&self, file_id: FileId) -> (Status, Vec<CompiledMatch>) {
        let source = match self.files.get(file_id) {
            Ok(file) => file.source(),
            Err(error) => {
                self.emit_diagnostic(
                    Diagnostic::bug()
                        .with_message(format!("problem file not loaded: {error}"))
                        .with_notes(vec![format!("please file a bug report at: {BUG_REPORT_URL}")]),
                );
                return (Status::Error, Vec::new());
            }
        };

        let mut context = elaboration::Context::new(file_id, source, Environment::with_prelude());
        let matches = context.elab_module(&mut |m| self.emit_diagnostic(m.to_diagnostic()));
        let mut mctx = context.into_meta_context();

        let compiled = (matches.into_iter())
            .filter_map(|m| self.compile_match(&mut mctx, m))
            .collect();

        match *self.seen_errors.borrow() {
            true => (Status::Error, compiled),
            false => (Status::Ok, compiled),
        }
    }

    pub fn compile_and_emit_module(&self, file_id: FileId) -> Status {
        let (status, compiled) = self.compile_module(file_id);
        for compiled in &compiled {
            self.emit_compiled_match(compiled);
        }
        status
    }

    fn compile_match(&self, mctx: &mut MetaContext, m: Match) -> Option<CompiledMatch> {
        let _span = tracing::info_span!("compile_match", name = %m.name).entered();

        let range = Some(m.range);
        let alt_ranges = m.alts.iter().map(|alt| alt.range).collect::<Vec<_>>();
        let mut tactics = ElimTactics;
        let result = mk_elim(
            mctx,
            &mut tactics,
            &self.config,
            m.name,
            &m.lctx,
            &m.targets,
            &m.motive,
            m.alts,
        );
        let result = match result {
            Ok(result) => result,
            Err(error) => {
                tracing::debug!(%error, "compilation failed");
                let message = Message::from_error(&error, m.name, range);
                self.emit_diagnostic(message.to_diagnostic());
                return None;
            }
        };

        let pp = PrettyContext::new(&*mctx);
        let counterexamples = (result.counterexamples.iter())
            .map(|examples| render_examples(&pp, examples))
            .collect::<Vec<_>>();
        if !counterexamples.is_empty() {
            let message = Message::MissingCases {
                name: m.name,
                range,
                examples: counterexamples.clone(),
            };
            self.emit_diagnostic(message.to_diagnostic());
        }

        let unused_alts = result.unused_alts();
        for alt in &unused_alts {
            let message = Message::UnusedAlt {
                range: alt_ranges.get(*alt).copied().flatten(),
                alt: *alt,
                allowed: self.allow_unused,
            };
            self.emit_diagnostic(message.to_diagnostic());
        }

        let r#type = match mctx.env().definition(result.name) {
            Some(definition) => mctx.render(&definition.r#type),
            None => String::new(),
        };

        Some(CompiledMatch {
            name: result.name,
            subgoals: result.per_alt_subgoals.iter().map(Vec::len).collect(),
            counterexamples,
            unused_alts,
            r#type,
        })
    }

    fn emit_compiled_match(&self, compiled: &CompiledMatch) {
        let clauses = compiled.subgoals.iter().enumerate().map(|(alt, count)| {
            let goals = match count {
                1 => "goal",
                _ => "goals",
            };
            RcDoc::text(format!("clause {}: {count} {goals}", alt + 1))
        });
        let doc = RcDoc::concat([
            RcDoc::text(format!("{} :", compiled.name)),
            RcDoc::concat([RcDoc::line(), RcDoc::text(compiled.r#type.clone())])
                .nest(4)
                .group(),
            RcDoc::concat(clauses.map(|clause| RcDoc::concat([RcDoc::hardline(), clause])))
                .nest(2),
        ]);

        self.emit_doc(doc);
    }

    fn emit_doc(&self, doc: RcDoc<'_>) {
        let mut emit_writer = self.emit_writer.borrow_mut();
        // Output is best effort once the writer has failed.
        let _ = writeln!(emit_writer, "{}", doc.pretty(self.emit_width));
        let _ = emit_writer.flush();
    }

    fn emit_diagnostic(&self, diagnostic: Diagnostic<FileId>) {
        let mut writer = self.diagnostic_writer.borrow_mut();
        let config = &self.codespan_config;

        if let Err(error) = codespan_reporting::term::emit(&mut *writer, config, &self.files, &diagnostic) {
            tracing::warn!(%error, "failed to emit diagnostic");
        }
        let _ = writer.flush();

        if diagnostic.severity >= Severity::Error {
            *self.seen_errors.borrow_mut() = true;
        }
    }

    fn emit_read_diagnostic(&self, name: impl std::fmt::Display, error: std::io::Error) {
        let diagnostic =
            Diagnostic::error().with_message(format!("couldn't read `{name}`: {error}"));
        self.emit_diagnostic(diagnostic);
    }
}
