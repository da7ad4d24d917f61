//! Rendering of match problems for the trace output.

use pretty::RcDoc;

use crate::core::pretty::Context;
use crate::matcher::classify::Transition;
use crate::matcher::pattern::Example;
use crate::matcher::problem::{Alt, Problem};
use crate::meta::MetaContext;

const WIDTH: usize = 100;

pub(super) fn problem(mctx: &MetaContext, transition: Transition, depth: usize, problem: &Problem) {
    tracing::debug!(
        target: "depmatch::matcher",
        ?transition,
        depth,
        goal = %problem.goal,
        alts = problem.alts.len(),
        targets = problem.targets.len(),
        "step"
    );
    if tracing::enabled!(target: "depmatch::matcher::debug", tracing::Level::TRACE) {
        let doc = problem_to_doc(mctx, problem);
        tracing::trace!(
            target: "depmatch::matcher::debug",
            "{}",
            doc.pretty(WIDTH)
        );
    }
}

fn problem_to_doc(mctx: &MetaContext, problem: &Problem) -> RcDoc<'static> {
    let pp = Context::new(mctx);
    let targets = problem.targets.iter().map(|target| pp.expr(&mctx.instantiate(target)));
    let examples = problem.examples.iter().map(|example| example.to_doc(&pp));

    RcDoc::concat([
        RcDoc::text(format!("{} :", problem.goal)),
        RcDoc::hardline(),
        RcDoc::text("targets: "),
        RcDoc::intersperse(targets, RcDoc::text(", ")),
        RcDoc::hardline(),
        RcDoc::text("examples: "),
        RcDoc::intersperse(examples, RcDoc::text(", ")),
        RcDoc::concat(
            (problem.alts.iter()).map(|alt| RcDoc::hardline().append(alt_to_doc(mctx, &pp, alt))),
        ),
    ])
    .nest(2)
}

fn alt_to_doc(mctx: &MetaContext, pp: &Context<'_>, alt: &Alt) -> RcDoc<'static> {
    RcDoc::concat([
        RcDoc::text(format!("[{}] ", alt.idx)),
        RcDoc::intersperse(
            alt.patterns.iter().map(|pattern| pattern.to_doc(pp)),
            RcDoc::text(", "),
        ),
        RcDoc::text(" => "),
        pp.expr(&mctx.instantiate(&alt.rhs)),
    ])
}

pub(super) fn counterexample(mctx: &MetaContext, examples: &[Example]) {
    if tracing::enabled!(target: "depmatch::matcher", tracing::Level::DEBUG) {
        let pp = Context::new(mctx);
        let rendered = super::pattern::render_examples(&pp, examples);
        tracing::debug!(target: "depmatch::matcher", example = %rendered, "missing case");
    }
}
