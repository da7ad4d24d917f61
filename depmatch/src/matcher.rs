//! Compilation of dependent pattern matches into eliminator applications.
//!
//! A match is compiled by repeatedly inspecting the first column of patterns
//! in a [`Problem`], choosing a transition with [`classify`], and splitting
//! the problem's goal with the [`Tactics`] until every branch either reaches
//! a clause or is found to be uncovered.
//!
//! [`Problem`]: problem::Problem
//! [`classify`]: classify::classify

use fxhash::FxHashSet;
use std::fmt;

use crate::core::decl;
use crate::core::MVarId;
use crate::meta::{self, MetaContext};
use crate::source::FileRange;
use crate::tactic::{self, Tactics};

use self::pattern::Example;

pub mod classify;
mod elim;
pub mod pattern;
pub mod problem;
mod process;
pub mod reporting;
pub mod subst;
mod trace;

pub use self::elim::{mk_elim, AltLhs, ElimResult};

/// Compilation settings.
#[derive(Clone, Debug)]
pub struct Config {
    /// The maximum depth of the case tree.
    pub max_recursion_depth: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            max_recursion_depth: 512,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Error {
    /// A clause has a different number of patterns than there are targets.
    ArityMismatch {
        alt: usize,
        range: Option<FileRange>,
        expected: usize,
        found: usize,
    },
    /// A constructor pattern was used against a target whose type is not an
    /// inductive type.
    NonInductiveScrutinee {
        target: String,
        r#type: String,
        range: Option<FileRange>,
    },
    /// A column mixes kinds of patterns that cannot be split on together.
    UnsupportedColumn {
        alt: usize,
        range: Option<FileRange>,
    },
    IllFormed(&'static str),
    RecursionDepthExceeded {
        depth: usize,
    },
    Store(meta::Error),
    Tactic(tactic::Error),
    Declaration(decl::Error),
}

impl From<meta::Error> for Error {
    fn from(error: meta::Error) -> Error {
        Error::Store(error)
    }
}

impl From<tactic::Error> for Error {
    fn from(error: tactic::Error) -> Error {
        Error::Tactic(error)
    }
}

impl From<decl::Error> for Error {
    fn from(error: decl::Error) -> Error {
        Error::Declaration(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ArityMismatch {
                alt,
                expected,
                found,
                ..
            } => write!(
                f,
                "clause {alt} has {found} patterns, but {expected} were expected",
            ),
            Error::NonInductiveScrutinee { target, r#type, .. } => write!(
                f,
                "cannot match `{}` against a constructor: `{}` is not an inductive type",
                target, r#type,
            ),
            Error::UnsupportedColumn { alt, .. } => {
                write!(f, "unsupported mix of patterns in clause {alt}")
            }
            Error::IllFormed(message) => write!(f, "ill-formed match problem: {message}"),
            Error::RecursionDepthExceeded { depth } => {
                write!(f, "maximum recursion depth of {depth} exceeded")
            }
            Error::Store(error) => error.fmt(f),
            Error::Tactic(error) => error.fmt(f),
            Error::Declaration(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

/// State shared by the steps of a single compilation.
struct Context<'a, T> {
    mctx: &'a mut MetaContext,
    tactics: &'a mut T,
    config: &'a Config,
    used_alts: FxHashSet<usize>,
    /// The goals each clause was used to discharge, indexed by clause.
    subgoals: Vec<Vec<MVarId>>,
    counterexamples: Vec<Vec<Example>>,
}

impl<'a, T: Tactics> Context<'a, T> {
    fn new(
        mctx: &'a mut MetaContext,
        tactics: &'a mut T,
        config: &'a Config,
        num_alts: usize,
    ) -> Context<'a, T> {
        Context {
            mctx,
            tactics,
            config,
            used_alts: FxHashSet::default(),
            subgoals: vec![Vec::new(); num_alts],
            counterexamples: Vec::new(),
        }
    }
}
