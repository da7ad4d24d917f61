use fxhash::FxHashSet;

use crate::core::decl::{Declaration, DefinitionVal};
use crate::core::{Expr, FVarId, MVarId};
use crate::matcher::pattern::{Example, Pattern};
use crate::matcher::problem::{Alt, Problem};
use crate::matcher::{Config, Context, Error};
use crate::meta::{LocalContext, MetaContext};
use crate::source::FileRange;
use crate::symbol::Symbol;
use crate::tactic::Tactics;

/// The left-hand side of a clause.
#[derive(Clone, Debug)]
pub struct AltLhs {
    pub range: Option<FileRange>,
    /// The pattern variables, in binding order.
    pub pending_vars: Vec<FVarId>,
    pub patterns: Vec<Pattern>,
    /// The value of the clause. A minor premise is abstracted over when this
    /// is missing.
    pub rhs: Option<Expr>,
}

#[derive(Clone, Debug)]
pub struct ElimResult {
    /// The name of the definition that was added to the environment.
    pub name: Symbol,
    /// The goals discharged by each clause.
    pub per_alt_subgoals: Vec<Vec<MVarId>>,
    /// The values that no clause covers.
    pub counterexamples: Vec<Vec<Example>>,
    pub used_alts: FxHashSet<usize>,
}

impl ElimResult {
    /// The clauses that never discharged a goal, in order.
    pub fn unused_alts(&self) -> Vec<usize> {
        (0..self.per_alt_subgoals.len())
            .filter(|idx| !self.used_alts.contains(idx))
            .collect()
    }
}

/// Compile a match on `targets` into an auxiliary definition named `name`.
///
/// The targets must be locals of `lctx`, and `motive` is a function from the
/// targets to the type of the match. The definition abstracts over the locals
/// of `lctx` followed by the minor premises of the clauses without a
/// right-hand side.
#[allow(clippy::too_many_arguments)]
pub fn mk_elim<T: Tactics>(
    mctx: &mut MetaContext,
    tactics: &mut T,
    config: &Config,
    name: Symbol,
    lctx: &LocalContext,
    targets: &[FVarId],
    motive: &Expr,
    alts: Vec<AltLhs>,
) -> Result<ElimResult, Error> {
    let _span = tracing::debug_span!(target: "depmatch::matcher", "mk_elim", %name).entered();

    for (idx, alt) in alts.iter().enumerate() {
        if alt.patterns.len() != targets.len() {
            return Err(Error::ArityMismatch {
                alt: idx,
                range: alt.range,
                expected: targets.len(),
                found: alt.patterns.len(),
            });
        }
    }

    let mut minors = Vec::new();
    let mut rhss = Vec::with_capacity(alts.len());
    for (idx, alt) in alts.iter().enumerate() {
        match &alt.rhs {
            Some(rhs) => rhss.push(rhs.clone()),
            None => {
                let minor_type = mctx.mk_pi(&alt.pending_vars, &alt_type(motive, alt))?;
                let minor = mctx.alloc_local(Symbol::intern("h").numbered(idx + 1), minor_type);
                minors.push(minor);
                let args = alt.pending_vars.iter().map(|var| Expr::FVar(*var));
                rhss.push(Expr::apps(Expr::FVar(minor), args));
            }
        }
    }
    let lctx = (minors.iter()).fold(lctx.clone(), |lctx, minor| lctx.with(*minor));

    let num_alts = alts.len();
    let mut problem_alts = Vec::with_capacity(num_alts);
    for ((idx, alt), rhs) in alts.into_iter().enumerate().zip(rhss) {
        let goal_lctx = (alt.pending_vars.iter()).fold(lctx.clone(), |lctx, var| lctx.with(*var));
        let goal = mctx.alloc_fresh_var(goal_lctx, alt_type(motive, &alt));
        problem_alts.push(Alt {
            idx,
            range: alt.range,
            goal,
            rhs,
            patterns: alt.patterns,
            pending_vars: alt.pending_vars,
        });
    }

    let target_exprs = targets.iter().map(|var| Expr::FVar(*var)).collect::<Vec<_>>();
    let goal_type = motive.beta(&target_exprs);
    let goal = mctx.alloc_fresh_var(lctx.clone(), goal_type.clone());
    let problem = Problem {
        goal,
        targets: target_exprs,
        alts: problem_alts,
        examples: targets.iter().map(|var| Example::Var(*var)).collect(),
    };

    let mut context = Context::new(&mut *mctx, tactics, config, num_alts);
    context.process(problem, 0)?;
    let Context {
        used_alts,
        subgoals: per_alt_subgoals,
        counterexamples,
        ..
    } = context;

    let binders = lctx.iter().copied().collect::<Vec<_>>();
    let value = mctx.mk_lambda(&binders, &mctx.instantiate(&Expr::MVar(goal)))?;
    let r#type = mctx.mk_pi(&binders, &goal_type)?;
    mctx.env_mut().add(Declaration::Definition(DefinitionVal {
        name,
        r#type,
        value,
        inline: true,
    }))?;

    tracing::debug!(
        target: "depmatch::matcher",
        %name,
        used = used_alts.len(),
        missing = counterexamples.len(),
        "compiled match"
    );

    Ok(ElimResult {
        name,
        per_alt_subgoals,
        counterexamples,
        used_alts,
    })
}

/// `motive patterns`
fn alt_type(motive: &Expr, alt: &AltLhs) -> Expr {
    let patterns = alt.patterns.iter().map(Pattern::to_expr).collect::<Vec<_>>();
    motive.beta(&patterns)
}
