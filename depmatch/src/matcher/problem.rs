//! Clauses and match problems.

use crate::core::{Expr, FVarId, MVarId};
use crate::matcher::pattern::{Example, Pattern};
use crate::matcher::subst::MVarRenaming;
use crate::meta::{self, FVarSubst, LocalContext, MetaContext};
use crate::source::FileRange;

/// A clause that is still alive in a problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alt {
    /// The position of the clause in the original match.
    pub idx: usize,
    pub range: Option<FileRange>,
    /// Assigned once the clause discharges a branch.
    pub goal: MVarId,
    pub rhs: Expr,
    /// The remaining columns, one per target of the problem.
    pub patterns: Vec<Pattern>,
    /// Pattern variables that are not yet bound to a target.
    pub pending_vars: Vec<FVarId>,
}

impl Alt {
    /// Apply a substitution to the clause. Pending variables in the domain of
    /// the substitution are renamed if they map to another variable, and are
    /// otherwise no longer pending.
    pub fn apply_fvar_subst(&self, subst: &FVarSubst) -> Alt {
        let pending_vars = self.pending_vars.iter().filter_map(|var| match subst.get(*var) {
            None => Some(*var),
            Some(Expr::FVar(new_var)) => Some(*new_var),
            Some(_) => None,
        });

        Alt {
            idx: self.idx,
            range: self.range,
            goal: self.goal,
            rhs: subst.apply(&self.rhs),
            patterns: self.patterns.iter().map(|p| p.apply_fvar_subst(subst)).collect(),
            pending_vars: pending_vars.collect(),
        }
    }

    pub fn apply_mvar_renaming(&self, renaming: &MVarRenaming) -> Alt {
        Alt {
            idx: self.idx,
            range: self.range,
            goal: renaming.find(self.goal).unwrap_or(self.goal),
            rhs: renaming.apply(&self.rhs),
            patterns: (self.patterns.iter())
                .map(|p| p.apply_mvar_renaming(renaming))
                .collect(),
            pending_vars: self.pending_vars.clone(),
        }
    }

    /// Bind the pending variable `var` to `value`. Pending variables whose
    /// types mention `var` are replaced by fresh variables of the refined
    /// types.
    pub fn bind(&self, mctx: &mut MetaContext, var: FVarId, value: Expr) -> Result<Alt, meta::Error> {
        let mut subst = FVarSubst::singleton(var, value);
        let pending_vars = self.refresh_pending_vars(mctx, &mut subst, false)?;
        let mut alt = self.apply_fvar_subst(&subst);
        alt.pending_vars = pending_vars;
        Ok(alt)
    }

    /// Copy the clause into a branch whose goals live in `lctx` and whose
    /// locals are related to the current ones by `subst`. The copy has a
    /// fresh goal and fresh pending variables.
    pub fn copy_with(
        &self,
        mctx: &mut MetaContext,
        lctx: &LocalContext,
        subst: &FVarSubst,
    ) -> Result<Alt, meta::Error> {
        let mut subst = subst.clone();
        let pending_vars = self.refresh_pending_vars(mctx, &mut subst, true)?;

        let goal_type = subst.apply(&mctx.meta_decl(self.goal)?.r#type);
        let goal_lctx = (pending_vars.iter()).fold(lctx.clone(), |lctx, var| lctx.with(*var));
        let goal = mctx.alloc_fresh_var(goal_lctx, goal_type);
        let mut renaming = MVarRenaming::new();
        renaming.insert(self.goal, goal);

        let mut alt = self.apply_fvar_subst(&subst).apply_mvar_renaming(&renaming);
        alt.pending_vars = pending_vars;
        Ok(alt)
    }

    /// Rebuild the pending variables outside the domain of `subst`, extending
    /// `subst` with the renamings. Variables are only reallocated when their
    /// type changes, unless `fresh` is set.
    fn refresh_pending_vars(
        &self,
        mctx: &mut MetaContext,
        subst: &mut FVarSubst,
        fresh: bool,
    ) -> Result<Vec<FVarId>, meta::Error> {
        let mut pending_vars = Vec::with_capacity(self.pending_vars.len());
        for var in &self.pending_vars {
            if subst.contains(*var) {
                continue;
            }
            let old_type = mctx.local_type(*var)?;
            let new_type = subst.apply(&old_type);
            if fresh || new_type != old_type {
                let new_var = mctx.alloc_local_like(*var, new_type)?;
                subst.insert(*var, Expr::FVar(new_var));
                pending_vars.push(new_var);
            } else {
                pending_vars.push(*var);
            }
        }
        Ok(pending_vars)
    }

    /// Insert `patterns` in front of the remaining columns.
    pub(crate) fn prepend_patterns(&mut self, patterns: impl IntoIterator<Item = Pattern>) {
        let rest = std::mem::take(&mut self.patterns);
        self.patterns = patterns.into_iter().chain(rest).collect();
    }
}

/// A match problem: the clauses that are still alive for a goal, and the
/// targets they are matched against.
#[derive(Clone, Debug)]
pub struct Problem {
    pub goal: MVarId,
    pub targets: Vec<Expr>,
    pub alts: Vec<Alt>,
    /// The values reaching this problem, one per original target.
    pub examples: Vec<Example>,
}

impl Problem {
    pub fn apply_fvar_subst(&self, mctx: &MetaContext, subst: &FVarSubst) -> Problem {
        Problem {
            goal: self.goal,
            targets: self.targets.iter().map(|target| subst.apply(target)).collect(),
            alts: self.alts.iter().map(|alt| alt.apply_fvar_subst(subst)).collect(),
            examples: (self.examples.iter())
                .map(|example| example.apply_fvar_subst(mctx.env(), subst))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decl::Environment;
    use crate::core::Prim;
    use crate::symbol::Symbol;

    fn nat() -> Expr {
        Expr::prim(Prim::NatType)
    }

    fn array(elem_type: Expr) -> Expr {
        Expr::app(Expr::prim(Prim::ArrayType), elem_type)
    }

    /// A clause `[x, ys]` where `ys : Array (T x)` for some `T`.
    fn dependent_alt(mctx: &mut MetaContext) -> (Alt, FVarId, FVarId) {
        let t = Expr::constant(Symbol::intern("T"));
        let x = mctx.alloc_local(Symbol::intern("x"), nat());
        let ys = mctx.alloc_local(Symbol::intern("ys"), array(Expr::app(t, Expr::FVar(x))));
        let lctx = LocalContext::new().with(x).with(ys);
        let goal = mctx.alloc_fresh_var(lctx, nat());
        let alt = Alt {
            idx: 0,
            range: None,
            goal,
            rhs: Expr::FVar(x),
            patterns: vec![Pattern::Var(x), Pattern::Var(ys)],
            pending_vars: vec![x, ys],
        };
        (alt, x, ys)
    }

    #[test]
    fn identity_substitution_preserves_alts() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let (alt, _, _) = dependent_alt(&mut mctx);
        assert_eq!(alt.apply_fvar_subst(&FVarSubst::new()), alt);
        assert_eq!(alt.apply_mvar_renaming(&MVarRenaming::new()), alt);
    }

    #[test]
    fn bind_refreshes_dependent_vars() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let (alt, x, ys) = dependent_alt(&mut mctx);
        let alt = alt.bind(&mut mctx, x, Expr::nat(1)).unwrap();

        assert_eq!(alt.rhs, Expr::nat(1));
        assert_eq!(alt.patterns[0], Pattern::Inaccessible(Expr::nat(1)));
        assert_eq!(alt.pending_vars.len(), 1);
        let new_ys = alt.pending_vars[0];
        assert_ne!(new_ys, ys);
        assert_eq!(alt.patterns[1], Pattern::Var(new_ys));
        let t = Expr::constant(Symbol::intern("T"));
        assert_eq!(
            mctx.local_type(new_ys).unwrap(),
            array(Expr::app(t, Expr::nat(1))),
        );
    }

    #[test]
    fn copies_are_fresh() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let (alt, x, ys) = dependent_alt(&mut mctx);
        let copy = alt.copy_with(&mut mctx, &LocalContext::new(), &FVarSubst::new()).unwrap();

        assert_eq!(copy.idx, alt.idx);
        assert_ne!(copy.goal, alt.goal);
        assert!(mctx.is_assigned(copy.goal).is_none());
        assert_eq!(copy.pending_vars.len(), 2);
        assert!(copy.pending_vars.iter().all(|var| *var != x && *var != ys));
        assert_eq!(copy.rhs, Expr::FVar(copy.pending_vars[0]));

        let lctx = &mctx.meta_decl(copy.goal).unwrap().lctx;
        assert_eq!(lctx.iter().copied().collect::<Vec<_>>(), copy.pending_vars);
    }

    #[test]
    fn prepend_columns() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let (mut alt, x, ys) = dependent_alt(&mut mctx);
        alt.prepend_patterns([Pattern::Lit(Expr::nat(0))]);
        assert_eq!(
            alt.patterns,
            [Pattern::Lit(Expr::nat(0)), Pattern::Var(x), Pattern::Var(ys)],
        );
        alt.prepend_patterns([]);
        assert_eq!(alt.patterns.len(), 3);
    }
}
