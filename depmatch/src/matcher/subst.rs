//! Renamings of metavariables, used when a clause is copied into a branch.

use fxhash::FxHashMap;

use crate::core::{Expr, MVarId};
use crate::matcher::pattern::Pattern;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MVarRenaming {
    map: FxHashMap<MVarId, MVarId>,
}

impl MVarRenaming {
    pub fn new() -> MVarRenaming {
        MVarRenaming::default()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn insert(&mut self, from: MVarId, to: MVarId) {
        self.map.insert(from, to);
    }

    pub fn find(&self, var: MVarId) -> Option<MVarId> {
        self.map.get(&var).copied()
    }

    pub fn apply(&self, expr: &Expr) -> Expr {
        if self.is_empty() || !expr.has_mvar() {
            return expr.clone();
        }
        expr.replace(&mut |e, _| match e {
            Expr::MVar(var) => Some(Expr::MVar(self.find(*var).unwrap_or(*var))),
            _ => None,
        })
    }
}

impl Pattern {
    pub fn apply_mvar_renaming(&self, renaming: &MVarRenaming) -> Pattern {
        self.map_exprs(&mut |expr| renaming.apply(expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decl::Environment;
    use crate::core::Prim;
    use crate::meta::{LocalContext, MetaContext};
    use crate::symbol::Symbol;

    #[test]
    fn renames_metavariables() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let nat = Expr::prim(Prim::NatType);
        let old = mctx.alloc_fresh_var(LocalContext::new(), nat.clone());
        let new = mctx.alloc_fresh_var(LocalContext::new(), nat.clone());
        let other = mctx.alloc_fresh_var(LocalContext::new(), nat);

        let mut renaming = MVarRenaming::new();
        renaming.insert(old, new);
        let expr = Expr::apps(Expr::prim(Prim::NatSucc), [Expr::MVar(old)]);
        assert_eq!(
            renaming.apply(&expr),
            Expr::apps(Expr::prim(Prim::NatSucc), [Expr::MVar(new)]),
        );
        assert_eq!(renaming.apply(&Expr::MVar(other)), Expr::MVar(other));
    }

    #[test]
    fn identity_renaming_preserves_patterns() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let nat = Expr::prim(Prim::NatType);
        let x = mctx.alloc_local(Symbol::intern("x"), nat.clone());
        let m = mctx.alloc_fresh_var(LocalContext::new(), nat.clone());

        let pattern = Pattern::ArrayLit(
            nat,
            vec![
                Pattern::Inaccessible(Expr::MVar(m)),
                Pattern::As(x, Box::new(Pattern::Lit(Expr::nat(1)))),
            ],
        );
        let renaming = MVarRenaming::new();
        assert_eq!(pattern.apply_mvar_renaming(&renaming), pattern);
    }
}
