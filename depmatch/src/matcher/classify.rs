//! Choosing the next step of a match problem.

use crate::core::{Expr, Literal};
use crate::matcher::pattern::Pattern;
use crate::matcher::problem::Problem;
use crate::matcher::Error;

/// The steps of the compiler, one per shape of the first column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// No targets remain.
    Leaf,
    /// No clauses remain.
    Complete,
    AsPattern,
    /// The target is not a local variable.
    NonVariable,
    Variable,
    /// Constructor patterns are mixed with `Nat` literals.
    NatLiteral,
    Constructor,
    Value,
    ArrayLit,
}

pub fn classify(problem: &Problem) -> Result<Transition, Error> {
    let target = match problem.targets.first() {
        None => return Ok(Transition::Leaf),
        Some(target) => target,
    };
    if problem.alts.is_empty() {
        return Ok(Transition::Complete);
    }

    let mut heads = Vec::with_capacity(problem.alts.len());
    for alt in &problem.alts {
        match alt.patterns.first() {
            Some(pattern) => heads.push(pattern),
            None => return Err(Error::IllFormed("clause has fewer patterns than targets")),
        }
    }

    if heads.iter().any(|p| matches!(p, Pattern::As(..))) {
        return Ok(Transition::AsPattern);
    }
    if !target.is_fvar() {
        return Ok(Transition::NonVariable);
    }
    if heads.iter().all(|p| is_wildcard(p)) {
        return Ok(Transition::Variable);
    }

    let has_ctor = heads.iter().any(|p| matches!(p, Pattern::Ctor { .. }));
    let has_nat_lit = heads.iter().any(|p| is_nat_lit(p));
    if has_ctor && has_nat_lit {
        return Ok(Transition::NatLiteral);
    }

    let transitions: [(Transition, fn(&Pattern) -> bool); 3] = [
        (Transition::Constructor, |p| matches!(p, Pattern::Ctor { .. })),
        (Transition::Value, |p| matches!(p, Pattern::Lit(_))),
        (Transition::ArrayLit, |p| matches!(p, Pattern::ArrayLit(..))),
    ];
    for (transition, accepts) in transitions {
        if heads.iter().all(|p| is_wildcard(p) || accepts(p)) {
            return Ok(transition);
        }
    }

    // Report the first clause that disagrees with the kind of the first
    // non-wildcard pattern in the column.
    let kind = heads.iter().copied().find(|p| !is_wildcard(p)).map(std::mem::discriminant);
    let position = (problem.alts.iter().zip(&heads))
        .position(|(_, p)| !is_wildcard(p) && Some(std::mem::discriminant(*p)) != kind)
        .unwrap_or(0);
    let alt = &problem.alts[position];
    Err(Error::UnsupportedColumn {
        alt: alt.idx,
        range: alt.range,
    })
}

fn is_wildcard(pattern: &Pattern) -> bool {
    matches!(pattern, Pattern::Var(_) | Pattern::Inaccessible(_))
}

pub(super) fn is_nat_lit(pattern: &Pattern) -> bool {
    matches!(pattern, Pattern::Lit(Expr::Lit(Literal::Nat(_))))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::decl::Environment;
    use crate::core::{FVarId, Prim};
    use crate::matcher::problem::Alt;
    use crate::meta::{LocalContext, MetaContext};
    use crate::symbol::Symbol;

    struct Fixture {
        mctx: MetaContext,
        target: FVarId,
    }

    impl Fixture {
        fn new() -> Fixture {
            let mut mctx = MetaContext::new(Environment::with_prelude());
            let target = mctx.alloc_local(Symbol::intern("n"), Expr::prim(Prim::NatType));
            Fixture { mctx, target }
        }

        fn problem(&mut self, target: Expr, heads: Vec<Pattern>) -> Problem {
            let goal = self.mctx.alloc_fresh_var(LocalContext::new(), Expr::prim(Prim::NatType));
            let alts = (heads.into_iter().enumerate())
                .map(|(idx, pattern)| Alt {
                    idx,
                    range: None,
                    goal,
                    rhs: Expr::nat(0),
                    patterns: vec![pattern],
                    pending_vars: Vec::new(),
                })
                .collect();
            Problem {
                goal,
                targets: vec![target],
                alts,
                examples: Vec::new(),
            }
        }

        fn var(&mut self) -> Pattern {
            Pattern::Var(self.mctx.alloc_local(Symbol::intern("x"), Expr::prim(Prim::NatType)))
        }
    }

    fn zero() -> Pattern {
        Pattern::Ctor {
            name: Prim::NatZero.symbol(),
            levels: Arc::from(Vec::new()),
            params: Vec::new(),
            fields: Vec::new(),
        }
    }

    #[test]
    fn leaves_and_complete_problems() {
        let mut fixture = Fixture::new();
        let mut problem = fixture.problem(Expr::nat(0), vec![]);
        assert_eq!(classify(&problem).ok(), Some(Transition::Complete));
        problem.targets.clear();
        assert_eq!(classify(&problem).ok(), Some(Transition::Leaf));
    }

    #[test]
    fn as_patterns_come_first() {
        let mut fixture = Fixture::new();
        let x = fixture.mctx.alloc_local(Symbol::intern("x"), Expr::prim(Prim::NatType));
        let problem = fixture.problem(
            Expr::nat(0),
            vec![zero(), Pattern::As(x, Box::new(Pattern::Lit(Expr::nat(1))))],
        );
        assert_eq!(classify(&problem).ok(), Some(Transition::AsPattern));
    }

    #[test]
    fn column_kinds() {
        let mut fixture = Fixture::new();
        let target = Expr::FVar(fixture.target);
        let cases = [
            (vec![fixture.var(), Pattern::Inaccessible(Expr::nat(1))], Transition::Variable),
            (vec![zero(), fixture.var()], Transition::Constructor),
            (vec![Pattern::Lit(Expr::nat(1)), fixture.var()], Transition::Value),
            (vec![zero(), Pattern::Lit(Expr::nat(1))], Transition::NatLiteral),
            (
                vec![Pattern::ArrayLit(Expr::prim(Prim::NatType), vec![]), fixture.var()],
                Transition::ArrayLit,
            ),
        ];
        for (heads, expected) in cases {
            let problem = fixture.problem(target.clone(), heads);
            assert_eq!(classify(&problem).ok(), Some(expected));
        }

        let problem = fixture.problem(Expr::nat(2), vec![zero()]);
        assert_eq!(classify(&problem).ok(), Some(Transition::NonVariable));
    }

    #[test]
    fn mixed_columns_are_rejected() {
        let mut fixture = Fixture::new();
        let target = Expr::FVar(fixture.target);
        let heads = vec![
            fixture.var(),
            Pattern::Lit(Expr::string("a")),
            Pattern::ArrayLit(Expr::prim(Prim::NatType), vec![]),
        ];
        let problem = fixture.problem(target, heads);
        assert!(matches!(
            classify(&problem),
            Err(Error::UnsupportedColumn { alt: 2, .. }),
        ));
    }
}
