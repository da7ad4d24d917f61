//! Patterns, and the examples used to report uncovered cases.

use pretty::RcDoc;
use std::sync::Arc;

use crate::core::decl::Environment;
use crate::core::pretty::{Context, Prec};
use crate::core::{Expr, FVarId, Universe};
use crate::meta::FVarSubst;
use crate::symbol::Symbol;

/// A pattern in one column of a clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pattern {
    /// Pattern variables, which match anything.
    Var(FVarId),
    /// A value determined by the other patterns, which is not inspected.
    Inaccessible(Expr),
    /// Constructor applications. The parameters are fixed by the type of the
    /// target and are never split on.
    Ctor {
        name: Symbol,
        levels: Arc<[Universe]>,
        params: Vec<Expr>,
        fields: Vec<Pattern>,
    },
    /// Literals, which are compared against but not destructured.
    Lit(Expr),
    /// Array literals of a fixed length.
    ArrayLit(Expr, Vec<Pattern>),
    /// Bind a variable to the value, and continue matching on it.
    As(FVarId, Box<Pattern>),
}

impl Pattern {
    /// The expression denoted by the pattern.
    pub fn to_expr(&self) -> Expr {
        match self {
            Pattern::Var(var) | Pattern::As(var, _) => Expr::FVar(*var),
            Pattern::Inaccessible(expr) | Pattern::Lit(expr) => expr.clone(),
            Pattern::Ctor {
                name,
                levels,
                params,
                fields,
            } => Expr::apps(
                Expr::Const(*name, levels.clone()),
                params.iter().cloned().chain(fields.iter().map(Pattern::to_expr)),
            ),
            Pattern::ArrayLit(elem_type, elems) => Expr::array_lit(
                elem_type.clone(),
                elems.iter().map(Pattern::to_expr).collect(),
            ),
        }
    }

    pub fn to_example(&self) -> Example {
        match self {
            Pattern::Var(var) => Example::Var(*var),
            Pattern::Inaccessible(_) => Example::Underscore,
            Pattern::Ctor { name, fields, .. } => {
                Example::Ctor(*name, fields.iter().map(Pattern::to_example).collect())
            }
            Pattern::Lit(expr) => Example::Lit(expr.clone()),
            Pattern::ArrayLit(_, elems) => {
                Example::ArrayLit(elems.iter().map(Pattern::to_example).collect())
            }
            Pattern::As(_, pattern) => pattern.to_example(),
        }
    }

    /// Apply a substitution. Variables mapped to other variables are renamed,
    /// and variables mapped to anything else become inaccessible.
    pub fn apply_fvar_subst(&self, subst: &FVarSubst) -> Pattern {
        match self {
            Pattern::Var(var) => match subst.get(*var) {
                None => Pattern::Var(*var),
                Some(Expr::FVar(new_var)) => Pattern::Var(*new_var),
                Some(expr) => Pattern::Inaccessible(expr.clone()),
            },
            Pattern::Inaccessible(expr) => Pattern::Inaccessible(subst.apply(expr)),
            Pattern::Ctor {
                name,
                levels,
                params,
                fields,
            } => Pattern::Ctor {
                name: *name,
                levels: levels.clone(),
                params: params.iter().map(|param| subst.apply(param)).collect(),
                fields: fields.iter().map(|p| p.apply_fvar_subst(subst)).collect(),
            },
            Pattern::Lit(expr) => Pattern::Lit(subst.apply(expr)),
            Pattern::ArrayLit(elem_type, elems) => Pattern::ArrayLit(
                subst.apply(elem_type),
                elems.iter().map(|p| p.apply_fvar_subst(subst)).collect(),
            ),
            Pattern::As(var, pattern) => {
                let pattern = pattern.apply_fvar_subst(subst);
                match subst.get(*var) {
                    None => Pattern::As(*var, Box::new(pattern)),
                    Some(Expr::FVar(new_var)) => Pattern::As(*new_var, Box::new(pattern)),
                    Some(_) => pattern,
                }
            }
        }
    }

    /// Apply a function to every expression in the pattern.
    pub(crate) fn map_exprs(&self, f: &mut impl FnMut(&Expr) -> Expr) -> Pattern {
        match self {
            Pattern::Var(var) => Pattern::Var(*var),
            Pattern::Inaccessible(expr) => Pattern::Inaccessible(f(expr)),
            Pattern::Ctor {
                name,
                levels,
                params,
                fields,
            } => Pattern::Ctor {
                name: *name,
                levels: levels.clone(),
                params: params.iter().map(&mut *f).collect(),
                fields: fields.iter().map(|p| p.map_exprs(f)).collect(),
            },
            Pattern::Lit(expr) => Pattern::Lit(f(expr)),
            Pattern::ArrayLit(elem_type, elems) => Pattern::ArrayLit(
                f(elem_type),
                elems.iter().map(|p| p.map_exprs(f)).collect(),
            ),
            Pattern::As(var, pattern) => Pattern::As(*var, Box::new(pattern.map_exprs(f))),
        }
    }

    pub fn to_doc(&self, pp: &Context<'_>) -> RcDoc<'static> {
        self.to_doc_prec(pp, Prec::Top)
    }

    fn to_doc_prec(&self, pp: &Context<'_>, prec: Prec) -> RcDoc<'static> {
        match self {
            Pattern::Var(var) => pp.fvar(*var),
            Pattern::Inaccessible(expr) => {
                RcDoc::concat([RcDoc::text(".("), pp.expr(expr), RcDoc::text(")")])
            }
            Pattern::Ctor { name, fields, .. } if fields.is_empty() => pp.ident(*name),
            Pattern::Ctor { name, fields, .. } => pp.paren(
                prec > Prec::Top,
                RcDoc::intersperse(
                    std::iter::once(pp.ident(*name))
                        .chain(fields.iter().map(|p| p.to_doc_prec(pp, Prec::Atomic))),
                    RcDoc::space(),
                ),
            ),
            Pattern::Lit(expr) => pp.atomic_expr(expr),
            Pattern::ArrayLit(_, elems) => pp.sequence(
                RcDoc::text("#["),
                elems.iter().map(|p| p.to_doc_prec(pp, Prec::Top)),
                RcDoc::text(","),
                RcDoc::text("]"),
            ),
            Pattern::As(var, pattern) => RcDoc::concat([
                pp.fvar(*var),
                RcDoc::text("@"),
                pattern.to_doc_prec(pp, Prec::Atomic),
            ]),
        }
    }
}

/// A description of a set of values, built up while splitting to report the
/// values that no clause covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Example {
    Var(FVarId),
    Underscore,
    Ctor(Symbol, Vec<Example>),
    Lit(Expr),
    ArrayLit(Vec<Example>),
}

impl Example {
    /// The example corresponding to an expression: constructor applications
    /// become constructor examples and other non-variables are unknown.
    pub fn of_expr(env: &Environment, expr: &Expr) -> Example {
        match expr {
            Expr::FVar(var) => Example::Var(*var),
            Expr::Lit(_) => Example::Lit(expr.clone()),
            Expr::ArrayLit(_, elems) => {
                Example::ArrayLit(elems.iter().map(|elem| Example::of_expr(env, elem)).collect())
            }
            _ => {
                let ctor = expr.app_fn().as_const().and_then(|name| env.constructor(name));
                let args = expr.app_args();
                match ctor {
                    Some(ctor) if args.len() == ctor.num_params + ctor.num_fields => {
                        let fields = args[ctor.num_params..].iter();
                        Example::Ctor(
                            ctor.name,
                            fields.map(|field| Example::of_expr(env, field)).collect(),
                        )
                    }
                    _ => Example::Underscore,
                }
            }
        }
    }

    /// Replace occurrences of `var` with `example`.
    pub fn replace_var(&self, var: FVarId, example: &Example) -> Example {
        match self {
            Example::Var(v) if *v == var => example.clone(),
            Example::Var(_) | Example::Underscore | Example::Lit(_) => self.clone(),
            Example::Ctor(name, args) => Example::Ctor(
                *name,
                args.iter().map(|arg| arg.replace_var(var, example)).collect(),
            ),
            Example::ArrayLit(elems) => Example::ArrayLit(
                elems.iter().map(|elem| elem.replace_var(var, example)).collect(),
            ),
        }
    }

    pub fn vars_to_underscore(&self) -> Example {
        match self {
            Example::Var(_) => Example::Underscore,
            Example::Underscore | Example::Lit(_) => self.clone(),
            Example::Ctor(name, args) => {
                Example::Ctor(*name, args.iter().map(Example::vars_to_underscore).collect())
            }
            Example::ArrayLit(elems) => {
                Example::ArrayLit(elems.iter().map(Example::vars_to_underscore).collect())
            }
        }
    }

    pub fn apply_fvar_subst(&self, env: &Environment, subst: &FVarSubst) -> Example {
        match self {
            Example::Var(var) => match subst.get(*var) {
                None => self.clone(),
                Some(expr) => Example::of_expr(env, expr),
            },
            Example::Underscore => Example::Underscore,
            Example::Ctor(name, args) => Example::Ctor(
                *name,
                args.iter().map(|arg| arg.apply_fvar_subst(env, subst)).collect(),
            ),
            Example::Lit(expr) => Example::Lit(subst.apply(expr)),
            Example::ArrayLit(elems) => Example::ArrayLit(
                elems.iter().map(|elem| elem.apply_fvar_subst(env, subst)).collect(),
            ),
        }
    }

    pub fn contains_var(&self) -> bool {
        match self {
            Example::Var(_) => true,
            Example::Underscore | Example::Lit(_) => false,
            Example::Ctor(_, args) | Example::ArrayLit(args) => args.iter().any(Example::contains_var),
        }
    }

    pub fn contains_lit(&self) -> bool {
        match self {
            Example::Lit(_) => true,
            Example::Var(_) | Example::Underscore => false,
            Example::Ctor(_, args) | Example::ArrayLit(args) => args.iter().any(Example::contains_lit),
        }
    }

    pub fn to_doc(&self, pp: &Context<'_>) -> RcDoc<'static> {
        self.to_doc_prec(pp, Prec::Top)
    }

    fn to_doc_prec(&self, pp: &Context<'_>, prec: Prec) -> RcDoc<'static> {
        match self {
            Example::Var(var) => pp.fvar(*var),
            Example::Underscore => RcDoc::text("_"),
            Example::Ctor(name, args) if args.is_empty() => pp.ident(*name),
            Example::Ctor(name, args) => pp.paren(
                prec > Prec::Top,
                RcDoc::intersperse(
                    std::iter::once(pp.ident(*name))
                        .chain(args.iter().map(|arg| arg.to_doc_prec(pp, Prec::Atomic))),
                    RcDoc::space(),
                ),
            ),
            Example::Lit(expr) => pp.atomic_expr(expr),
            Example::ArrayLit(elems) => pp.sequence(
                RcDoc::text("#["),
                elems.iter().map(|elem| elem.to_doc_prec(pp, Prec::Top)),
                RcDoc::text(","),
                RcDoc::text("]"),
            ),
        }
    }
}

/// Render a list of examples, one per target, separated by commas.
pub fn render_examples(pp: &Context<'_>, examples: &[Example]) -> String {
    let docs = examples.iter().map(|example| example.to_doc(pp));
    RcDoc::<()>::intersperse(docs, RcDoc::text(", "))
        .pretty(usize::MAX)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Prim;
    use crate::meta::MetaContext;

    fn mctx_with_vars(names: &[&str]) -> (MetaContext, Vec<FVarId>) {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let nat = Expr::prim(Prim::NatType);
        let vars = names
            .iter()
            .map(|name| mctx.alloc_local(Symbol::intern(name), nat.clone()))
            .collect();
        (mctx, vars)
    }

    fn succ(pattern: Pattern) -> Pattern {
        Pattern::Ctor {
            name: Prim::NatSucc.symbol(),
            levels: Arc::from(Vec::new()),
            params: Vec::new(),
            fields: vec![pattern],
        }
    }

    #[test]
    fn identity_substitution_preserves_patterns() {
        let (_, vars) = mctx_with_vars(&["x", "y"]);
        let patterns = [
            Pattern::Var(vars[0]),
            succ(Pattern::As(vars[1], Box::new(Pattern::Lit(Expr::nat(3))))),
            Pattern::Inaccessible(Expr::FVar(vars[0])),
            Pattern::ArrayLit(Expr::prim(Prim::NatType), vec![Pattern::Var(vars[1])]),
        ];
        let subst = FVarSubst::new();
        for pattern in &patterns {
            assert_eq!(&pattern.apply_fvar_subst(&subst), pattern);
            let example = pattern.to_example();
            let env = Environment::with_prelude();
            assert_eq!(example.apply_fvar_subst(&env, &subst), example);
        }
    }

    #[test]
    fn substitution_makes_bound_vars_inaccessible() {
        let (_, vars) = mctx_with_vars(&["x", "y", "z"]);
        let mut subst = FVarSubst::singleton(vars[0], Expr::nat(1));
        subst.insert(vars[1], Expr::FVar(vars[2]));

        assert_eq!(
            Pattern::Var(vars[0]).apply_fvar_subst(&subst),
            Pattern::Inaccessible(Expr::nat(1)),
        );
        assert_eq!(Pattern::Var(vars[1]).apply_fvar_subst(&subst), Pattern::Var(vars[2]));
        assert_eq!(
            Pattern::As(vars[0], Box::new(Pattern::Var(vars[1]))).apply_fvar_subst(&subst),
            Pattern::Var(vars[2]),
        );
    }

    #[test]
    fn examples_without_vars() {
        let (_, vars) = mctx_with_vars(&["x", "y"]);
        let pattern = succ(Pattern::As(
            vars[0],
            Box::new(Pattern::ArrayLit(
                Expr::prim(Prim::NatType),
                vec![Pattern::Var(vars[1]), Pattern::Lit(Expr::nat(0))],
            )),
        ));
        let example = pattern.to_example().vars_to_underscore();
        assert!(!example.contains_var());
        assert!(example.contains_lit());
    }

    #[test]
    fn refine_examples() {
        let (mctx, vars) = mctx_with_vars(&["n", "m"]);
        let example = Example::Var(vars[0]);
        let refined = example.replace_var(
            vars[0],
            &Example::Ctor(Prim::NatSucc.symbol(), vec![Example::Var(vars[1])]),
        );
        let pp = Context::new(&mctx);
        assert_eq!(render_examples(&pp, &[refined.clone()]), "Nat.succ m");
        assert_eq!(
            render_examples(&pp, &[refined.vars_to_underscore(), Example::Underscore]),
            "Nat.succ _, _",
        );
    }

    #[test]
    fn examples_of_constructor_applications() {
        let (mctx, vars) = mctx_with_vars(&["n"]);
        let expr = Expr::app(Expr::prim(Prim::NatSucc), Expr::FVar(vars[0]));
        assert_eq!(
            Example::of_expr(mctx.env(), &expr),
            Example::Ctor(Prim::NatSucc.symbol(), vec![Example::Var(vars[0])]),
        );
        assert_eq!(
            Example::of_expr(mctx.env(), &Expr::prim(Prim::NatType)),
            Example::Underscore,
        );
    }

    #[test]
    fn render_patterns() {
        let (mctx, vars) = mctx_with_vars(&["n", "m"]);
        let pp = Context::new(&mctx);
        let pattern = succ(succ(Pattern::As(vars[0], Box::new(Pattern::Var(vars[1])))));
        assert_eq!(
            pattern.to_doc(&pp).pretty(80).to_string(),
            "Nat.succ (Nat.succ n@m)",
        );
        let inaccessible = Pattern::Inaccessible(Expr::FVar(vars[0]));
        assert_eq!(inaccessible.to_doc(&pp).pretty(80).to_string(), ".(n)");
    }
}
