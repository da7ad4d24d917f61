//! Core language.
//!
//! Expressions use a locally nameless representation: variables bound inside
//! an expression are [de Bruijn indices][Index], while free variables refer to
//! declarations in the metavariable/local-context store by [`FVarId`].
//! Opening a binder replaces its index with a fresh free variable, and closing
//! over a free variable turns it back into an index.

use std::fmt;
use std::sync::Arc;

use crate::env::{Index, Level};
use crate::symbol::Symbol;

pub mod decl;
pub mod pretty;
pub mod prim;

pub use self::prim::Prim;

/// Identifiers of local variables in the store.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FVarId(pub(crate) Level);

impl fmt::Debug for FVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_fvar.{}", self.0)
    }
}

/// Identifiers of metavariables in the store.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MVarId(pub(crate) Level);

impl fmt::Debug for MVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?m.{}", self.0)
    }
}

impl fmt::Display for MVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?m.{}", self.0)
    }
}

/// Universe levels.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Universe {
    Zero,
    Succ(Arc<Universe>),
    Max(Arc<Universe>, Arc<Universe>),
    Param(Symbol),
}

impl Universe {
    pub fn one() -> Universe {
        Universe::Zero.succ()
    }

    pub fn succ(self) -> Universe {
        Universe::Succ(Arc::new(self))
    }

    pub fn max(self, other: Universe) -> Universe {
        match (&self, &other) {
            (Universe::Zero, _) => other,
            (_, Universe::Zero) => self,
            _ if self == other => self,
            _ => Universe::Max(Arc::new(self), Arc::new(other)),
        }
    }

    /// The level as a number, if it does not mention any parameters.
    pub fn to_explicit(&self) -> Option<u32> {
        match self {
            Universe::Zero => Some(0),
            Universe::Succ(level) => Some(level.to_explicit()? + 1),
            Universe::Max(lhs, rhs) => Some(u32::max(lhs.to_explicit()?, rhs.to_explicit()?)),
            Universe::Param(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Nat(u64),
    Str(Arc<str>),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Nat(value) => write!(f, "{value}"),
            Literal::Str(value) => write!(f, "{value:?}"),
        }
    }
}

/// Core expressions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Variables bound by an enclosing lambda or pi.
    BVar(Index),
    /// Local variables declared in the store.
    FVar(FVarId),
    /// Metavariables.
    MVar(MVarId),
    Sort(Universe),
    /// References to global declarations, with universe arguments.
    Const(Symbol, Arc<[Universe]>),
    App(Arc<Expr>, Arc<Expr>),
    Lam(Option<Symbol>, Arc<Expr>, Arc<Expr>),
    Pi(Option<Symbol>, Arc<Expr>, Arc<Expr>),
    Lit(Literal),
    /// Array literals, annotated with their element type.
    ArrayLit(Arc<Expr>, Arc<[Expr]>),
}

impl Expr {
    pub fn constant(name: Symbol) -> Expr {
        Expr::Const(name, Arc::from(Vec::new()))
    }

    pub fn prim(prim: Prim) -> Expr {
        Expr::constant(prim.symbol())
    }

    pub fn nat(value: u64) -> Expr {
        Expr::Lit(Literal::Nat(value))
    }

    pub fn string(value: &str) -> Expr {
        Expr::Lit(Literal::Str(Arc::from(value)))
    }

    pub fn prop() -> Expr {
        Expr::Sort(Universe::Zero)
    }

    pub fn r#type() -> Expr {
        Expr::Sort(Universe::one())
    }

    pub fn app(head: Expr, arg: Expr) -> Expr {
        Expr::App(Arc::new(head), Arc::new(arg))
    }

    pub fn apps(head: Expr, args: impl IntoIterator<Item = Expr>) -> Expr {
        args.into_iter().fold(head, Expr::app)
    }

    pub fn lam(name: Option<Symbol>, r#type: Expr, body: Expr) -> Expr {
        Expr::Lam(name, Arc::new(r#type), Arc::new(body))
    }

    pub fn pi(name: Option<Symbol>, r#type: Expr, body: Expr) -> Expr {
        Expr::Pi(name, Arc::new(r#type), Arc::new(body))
    }

    /// Non-dependent function types.
    pub fn arrow(param_type: Expr, body_type: Expr) -> Expr {
        Expr::pi(None, param_type, body_type.lift_loose_bvars(1))
    }

    pub fn array_lit(elem_type: Expr, elems: Vec<Expr>) -> Expr {
        Expr::ArrayLit(Arc::new(elem_type), Arc::from(elems))
    }

    pub fn as_fvar(&self) -> Option<FVarId> {
        match self {
            Expr::FVar(var) => Some(*var),
            _ => None,
        }
    }

    pub fn as_const(&self) -> Option<Symbol> {
        match self {
            Expr::Const(name, _) => Some(*name),
            _ => None,
        }
    }

    pub fn as_nat_lit(&self) -> Option<u64> {
        match self {
            Expr::Lit(Literal::Nat(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn is_fvar(&self) -> bool {
        matches!(self, Expr::FVar(_))
    }

    /// The head of a spine of applications.
    pub fn app_fn(&self) -> &Expr {
        let mut expr = self;
        while let Expr::App(head, _) = expr {
            expr = head.as_ref();
        }
        expr
    }

    /// The arguments of a spine of applications, in application order.
    pub fn app_args(&self) -> Vec<&Expr> {
        let mut args = Vec::new();
        let mut expr = self;
        while let Expr::App(head, arg) = expr {
            args.push(arg.as_ref());
            expr = head.as_ref();
        }
        args.reverse();
        args
    }

    /// Rebuild an expression, replacing the subexpressions for which `f`
    /// returns a value. The second argument to `f` is the number of binders
    /// the subexpression is under.
    pub fn replace(&self, f: &mut impl FnMut(&Expr, usize) -> Option<Expr>) -> Expr {
        self.replace_at(0, f)
    }

    fn replace_at(&self, depth: usize, f: &mut impl FnMut(&Expr, usize) -> Option<Expr>) -> Expr {
        if let Some(expr) = f(self, depth) {
            return expr;
        }

        match self {
            Expr::BVar(_) | Expr::FVar(_) | Expr::MVar(_) | Expr::Sort(_) | Expr::Lit(_) => {
                self.clone()
            }
            Expr::Const(..) => self.clone(),
            Expr::App(head, arg) => {
                Expr::app(head.replace_at(depth, f), arg.replace_at(depth, f))
            }
            Expr::Lam(name, r#type, body) => Expr::lam(
                *name,
                r#type.replace_at(depth, f),
                body.replace_at(depth + 1, f),
            ),
            Expr::Pi(name, r#type, body) => Expr::pi(
                *name,
                r#type.replace_at(depth, f),
                body.replace_at(depth + 1, f),
            ),
            Expr::ArrayLit(elem_type, elems) => Expr::array_lit(
                elem_type.replace_at(depth, f),
                elems.iter().map(|elem| elem.replace_at(depth, f)).collect(),
            ),
        }
    }

    /// Returns true if any subexpression satisfies `f`.
    pub fn any(&self, f: &mut impl FnMut(&Expr) -> bool) -> bool {
        if f(self) {
            return true;
        }

        match self {
            Expr::BVar(_)
            | Expr::FVar(_)
            | Expr::MVar(_)
            | Expr::Sort(_)
            | Expr::Const(..)
            | Expr::Lit(_) => false,
            Expr::App(head, arg) => head.any(f) || arg.any(f),
            Expr::Lam(_, r#type, body) | Expr::Pi(_, r#type, body) => r#type.any(f) || body.any(f),
            Expr::ArrayLit(elem_type, elems) => {
                elem_type.any(f) || elems.iter().any(|elem| elem.any(f))
            }
        }
    }

    pub fn has_fvar(&self, var: FVarId) -> bool {
        self.any(&mut |expr| matches!(expr, Expr::FVar(v) if *v == var))
    }

    pub fn has_mvar(&self) -> bool {
        self.any(&mut |expr| matches!(expr, Expr::MVar(_)))
    }

    /// Returns true if the expression has bound variables that escape it.
    pub fn has_loose_bvars(&self) -> bool {
        self.has_loose_bvars_at(0)
    }

    fn has_loose_bvars_at(&self, depth: usize) -> bool {
        match self {
            Expr::BVar(index) => index.depth() >= depth,
            Expr::FVar(_) | Expr::MVar(_) | Expr::Sort(_) | Expr::Const(..) | Expr::Lit(_) => {
                false
            }
            Expr::App(head, arg) => head.has_loose_bvars_at(depth) || arg.has_loose_bvars_at(depth),
            Expr::Lam(_, r#type, body) | Expr::Pi(_, r#type, body) => {
                r#type.has_loose_bvars_at(depth) || body.has_loose_bvars_at(depth + 1)
            }
            Expr::ArrayLit(elem_type, elems) => {
                elem_type.has_loose_bvars_at(depth)
                    || elems.iter().any(|elem| elem.has_loose_bvars_at(depth))
            }
        }
    }

    /// Returns true if the loose bound variable `index` occurs in the expression.
    pub fn has_loose_bvar(&self, index: Index) -> bool {
        match self {
            Expr::BVar(var) => *var == index,
            Expr::FVar(_) | Expr::MVar(_) | Expr::Sort(_) | Expr::Const(..) | Expr::Lit(_) => {
                false
            }
            Expr::App(head, arg) => head.has_loose_bvar(index) || arg.has_loose_bvar(index),
            Expr::Lam(_, r#type, body) | Expr::Pi(_, r#type, body) => {
                r#type.has_loose_bvar(index) || body.has_loose_bvar(index.prev())
            }
            Expr::ArrayLit(elem_type, elems) => {
                elem_type.has_loose_bvar(index) || elems.iter().any(|elem| elem.has_loose_bvar(index))
            }
        }
    }

    /// Shift loose bound variables outwards past `count` new binders.
    pub fn lift_loose_bvars(&self, count: usize) -> Expr {
        if count == 0 {
            return self.clone();
        }
        self.replace(&mut |expr, depth| match expr {
            Expr::BVar(index) if index.depth() >= depth => Some(Expr::BVar(index.shift(count))),
            _ => None,
        })
    }

    /// Replace the loose bound variables `0..values.len()` with `values`,
    /// where the last value replaces index 0.
    pub fn instantiate_rev(&self, values: &[Expr]) -> Expr {
        if values.is_empty() {
            return self.clone();
        }
        let count = values.len();
        self.replace(&mut |expr, depth| match expr {
            Expr::BVar(index) if index.depth() >= depth => {
                let offset = index.depth() - depth;
                if offset < count {
                    Some(values[count - 1 - offset].lift_loose_bvars(depth))
                } else {
                    Some(Expr::BVar(Index::last().shift(index.depth() - count)))
                }
            }
            _ => None,
        })
    }

    /// Replace the loose bound variable 0 with `value`.
    pub fn instantiate1(&self, value: &Expr) -> Expr {
        self.instantiate_rev(std::slice::from_ref(value))
    }

    /// Turn the local variables `vars` into loose bound variables, with the
    /// last variable becoming index 0.
    pub fn abstract_fvars(&self, vars: &[FVarId]) -> Expr {
        if vars.is_empty() {
            return self.clone();
        }
        let count = vars.len();
        self.replace(&mut |expr, depth| match expr {
            Expr::FVar(var) => {
                let position = vars.iter().rposition(|v| v == var)?;
                Some(Expr::BVar(Index::last().shift(depth + count - 1 - position)))
            }
            _ => None,
        })
    }

    /// Apply a function to arguments, reducing head lambdas as they are
    /// consumed.
    pub fn beta(&self, args: &[Expr]) -> Expr {
        let mut body = self;
        let mut consumed = 0;
        while let (Expr::Lam(_, _, next), true) = (body, consumed < args.len()) {
            body = next.as_ref();
            consumed += 1;
        }
        let body = body.instantiate_rev(&args[..consumed]);
        Expr::apps(body, args[consumed..].iter().cloned())
    }

    /// Reduce any lambdas at the head of an application spine.
    pub fn head_beta(&self) -> Expr {
        match self.app_fn() {
            Expr::Lam(..) => {
                let args = self.app_args().into_iter().cloned().collect::<Vec<_>>();
                self.app_fn().beta(&args).head_beta()
            }
            _ => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::UniqueEnv;

    fn fvars(count: usize) -> Vec<FVarId> {
        let mut env = UniqueEnv::new();
        (0..count).map(|_| FVarId(env.push(()))).collect()
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn expr_size() {
        assert!(std::mem::size_of::<Expr>() <= 32);
    }

    #[test]
    fn abstract_then_instantiate() {
        let vars = fvars(2);
        let (x, y) = (Expr::FVar(vars[0]), Expr::FVar(vars[1]));
        let expr = Expr::apps(Expr::constant(Symbol::intern("f")), [x.clone(), y.clone()]);

        let body = expr.abstract_fvars(&vars);
        assert!(body.has_loose_bvars());
        assert_eq!(
            body,
            Expr::apps(
                Expr::constant(Symbol::intern("f")),
                [
                    Expr::BVar(Index::last().prev()),
                    Expr::BVar(Index::last())
                ],
            ),
        );
        assert_eq!(body.instantiate_rev(&[x, y]), expr);
    }

    #[test]
    fn abstract_under_binders() {
        let vars = fvars(1);
        let x = Expr::FVar(vars[0]);
        let expr = Expr::lam(None, Expr::prop(), Expr::app(Expr::BVar(Index::last()), x));

        let body = expr.abstract_fvars(&vars);
        assert_eq!(
            body,
            Expr::lam(
                None,
                Expr::prop(),
                Expr::app(Expr::BVar(Index::last()), Expr::BVar(Index::last().prev())),
            ),
        );
    }

    #[test]
    fn beta_reduces_consumed_arguments() {
        let vars = fvars(2);
        let (x, y) = (Expr::FVar(vars[0]), Expr::FVar(vars[1]));
        let id = Expr::lam(None, Expr::r#type(), Expr::BVar(Index::last()));
        assert_eq!(id.beta(&[x.clone()]), x);
        assert_eq!(id.beta(&[x.clone(), y.clone()]), Expr::app(x, y));
    }

    #[test]
    fn app_spines() {
        let f = Expr::constant(Symbol::intern("f"));
        let expr = Expr::apps(f.clone(), [Expr::nat(1), Expr::nat(2)]);
        assert_eq!(expr.app_fn(), &f);
        assert_eq!(expr.app_args(), [&Expr::nat(1), &Expr::nat(2)]);
    }

    #[test]
    fn universe_max_simplifies() {
        assert_eq!(Universe::Zero.max(Universe::one()), Universe::one());
        assert_eq!(Universe::one().max(Universe::one()), Universe::one());
        assert_eq!(Universe::one().succ().to_explicit(), Some(2));
    }
}
