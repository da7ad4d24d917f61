//! The metavariable and local-context store.
//!
//! Local variables and metavariables are allocated in flat arenas and are
//! never freed, so their ids are never reused. Each metavariable records the
//! local context it was created in, its type, and its assignment. A
//! metavariable can be assigned at most once.

use std::fmt;

use crate::core::decl::{ConstructorVal, Declaration, Environment, InductiveVal};
use crate::core::pretty::{self, LocalNames};
use crate::core::{Expr, FVarId, Literal, MVarId, Prim, Universe};
use crate::env::{Index, SharedEnv, UniqueEnv};
use crate::symbol::Symbol;

/// The local variables in scope of a goal, in declaration order.
pub type LocalContext = SharedEnv<FVarId>;

#[derive(Clone, Debug)]
pub struct LocalDecl {
    pub name: Symbol,
    pub r#type: Expr,
}

#[derive(Clone, Debug)]
pub struct MetaDecl {
    pub lctx: LocalContext,
    pub r#type: Expr,
    assignment: Option<Expr>,
    delayed: Option<DelayedAssignment>,
}

/// A metavariable standing for `λ vars, ?goal`, which is only abstracted
/// once `goal` has been assigned.
#[derive(Clone, Debug)]
struct DelayedAssignment {
    vars: Vec<FVarId>,
    goal: MVarId,
}

#[derive(Clone, Debug)]
pub enum Error {
    UnknownLocal(FVarId),
    UnknownMeta(MVarId),
    AlreadyAssigned(MVarId),
    UnknownConstant(Symbol),
    FunctionExpected { head: Expr, head_type: Expr },
    TypeExpected { r#type: Expr },
    LooseBoundVar(Index),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownLocal(var) => write!(f, "unknown local variable `{var:?}`"),
            Error::UnknownMeta(var) => write!(f, "unknown metavariable `{var}`"),
            Error::AlreadyAssigned(var) => write!(f, "metavariable `{var}` is already assigned"),
            Error::UnknownConstant(name) => write!(f, "unknown constant `{name}`"),
            Error::FunctionExpected { .. } => write!(f, "expected a function"),
            Error::TypeExpected { .. } => write!(f, "expected a type"),
            Error::LooseBoundVar(index) => write!(f, "unexpected loose bound variable `#{index}`"),
        }
    }
}

impl std::error::Error for Error {}

/// Substitutions from local variables to expressions.
///
/// Entries are kept fully applied: inserting a new entry substitutes it
/// through the existing values, so applying the substitution once is enough.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FVarSubst {
    entries: Vec<(FVarId, Expr)>,
}

impl FVarSubst {
    pub fn new() -> FVarSubst {
        FVarSubst::default()
    }

    pub fn singleton(var: FVarId, expr: Expr) -> FVarSubst {
        let mut subst = FVarSubst::new();
        subst.insert(var, expr);
        subst
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, var: FVarId) -> bool {
        self.entries.iter().any(|(v, _)| *v == var)
    }

    pub fn get(&self, var: FVarId) -> Option<&Expr> {
        self.entries.iter().find(|(v, _)| *v == var).map(|(_, expr)| expr)
    }

    pub fn insert(&mut self, var: FVarId, expr: Expr) {
        let expr = self.apply(&expr);
        for (_, value) in &mut self.entries {
            if value.has_fvar(var) {
                *value = value.replace(&mut |e, _| match e {
                    Expr::FVar(v) if *v == var => Some(expr.clone()),
                    _ => None,
                });
            }
        }
        match self.entries.iter_mut().find(|(v, _)| *v == var) {
            Some((_, value)) => *value = expr,
            None => self.entries.push((var, expr)),
        }
    }

    pub fn apply(&self, expr: &Expr) -> Expr {
        if self.entries.is_empty() {
            return expr.clone();
        }
        expr.replace(&mut |e, _| match e {
            Expr::FVar(var) => Some(self.get(*var).cloned().unwrap_or_else(|| e.clone())),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl '_ + Iterator<Item = (FVarId, &Expr)> {
        self.entries.iter().map(|(var, expr)| (*var, expr))
    }
}

/// The store of local variables and metavariables, along with the global
/// declarations they refer to.
pub struct MetaContext {
    env: Environment,
    locals: UniqueEnv<LocalDecl>,
    metas: UniqueEnv<MetaDecl>,
}

impl MetaContext {
    pub fn new(env: Environment) -> MetaContext {
        MetaContext {
            env,
            locals: UniqueEnv::new(),
            metas: UniqueEnv::new(),
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn alloc_local(&mut self, name: Symbol, r#type: Expr) -> FVarId {
        FVarId(self.locals.push(LocalDecl { name, r#type }))
    }

    pub fn local_decl(&self, var: FVarId) -> Result<&LocalDecl, Error> {
        self.locals.get_level(var.0).ok_or(Error::UnknownLocal(var))
    }

    pub fn local_type(&self, var: FVarId) -> Result<Expr, Error> {
        Ok(self.local_decl(var)?.r#type.clone())
    }

    /// Replace assigned metavariables in the type of `var`.
    pub fn instantiate_local_type(&mut self, var: FVarId) -> Result<(), Error> {
        let r#type = self.instantiate(&self.local_decl(var)?.r#type);
        let decl = self.locals.get_level_mut(var.0).ok_or(Error::UnknownLocal(var))?;
        decl.r#type = r#type;
        Ok(())
    }

    /// Allocate a new local with the same name as `var`.
    pub fn alloc_local_like(&mut self, var: FVarId, r#type: Expr) -> Result<FVarId, Error> {
        let name = self.local_decl(var)?.name;
        Ok(self.alloc_local(name, r#type))
    }

    pub fn alloc_fresh_var(&mut self, lctx: LocalContext, r#type: Expr) -> MVarId {
        MVarId(self.metas.push(MetaDecl {
            lctx,
            r#type,
            assignment: None,
            delayed: None,
        }))
    }

    /// An expression standing for `goal` in a context where `vars` will be
    /// bound by enclosing lambdas. The assignment of `goal` may mention `vars`.
    pub fn delay_goal(&mut self, vars: &[FVarId], goal: MVarId) -> Result<Expr, Error> {
        if vars.is_empty() {
            return Ok(Expr::MVar(goal));
        }
        let decl = self.meta_decl(goal)?;
        let lctx = (decl.lctx.iter())
            .filter(|var| !vars.contains(var))
            .fold(LocalContext::new(), |lctx, var| lctx.with(*var));
        let r#type = self.mk_pi(vars, &decl.r#type)?;
        let delayed = MVarId(self.metas.push(MetaDecl {
            lctx,
            r#type,
            assignment: None,
            delayed: Some(DelayedAssignment {
                vars: vars.to_vec(),
                goal,
            }),
        }));
        Ok(Expr::apps(
            Expr::MVar(delayed),
            vars.iter().map(|var| Expr::FVar(*var)),
        ))
    }

    pub fn meta_decl(&self, var: MVarId) -> Result<&MetaDecl, Error> {
        self.metas.get_level(var.0).ok_or(Error::UnknownMeta(var))
    }

    pub fn assign(&mut self, var: MVarId, expr: Expr) -> Result<(), Error> {
        let decl = self.metas.get_level_mut(var.0).ok_or(Error::UnknownMeta(var))?;
        match decl.assignment {
            Some(_) => Err(Error::AlreadyAssigned(var)),
            None => {
                decl.assignment = Some(expr);
                Ok(())
            }
        }
    }

    pub fn is_assigned(&self, var: MVarId) -> Option<&Expr> {
        self.metas.get_level(var.0)?.assignment.as_ref()
    }

    /// Number of metavariables allocated so far.
    pub fn num_metas(&self) -> usize {
        self.metas.len().to_usize()
    }

    /// Replace assigned metavariables with their assignments, reducing the
    /// applications they head.
    pub fn instantiate(&self, expr: &Expr) -> Expr {
        if !expr.has_mvar() {
            return expr.clone();
        }
        expr.replace(&mut |e, _| {
            let var = match e.app_fn() {
                Expr::MVar(var) => *var,
                _ => return None,
            };
            let args = e.app_args().into_iter().map(|arg| self.instantiate(arg));
            let args = args.collect::<Vec<_>>();
            match self.is_assigned(var).cloned().or_else(|| self.delayed_value(var)) {
                Some(value) => Some(self.instantiate(&value).beta(&args)),
                None => Some(Expr::apps(Expr::MVar(var), args)),
            }
        })
    }

    fn delayed_value(&self, var: MVarId) -> Option<Expr> {
        let delayed = self.meta_decl(var).ok()?.delayed.as_ref()?;
        self.is_assigned(delayed.goal)?;
        let value = self.instantiate(&Expr::MVar(delayed.goal));
        self.mk_lambda(&delayed.vars, &value).ok()
    }

    /// Render an expression after instantiating it.
    pub fn render(&self, expr: &Expr) -> String {
        let expr = self.instantiate(expr);
        pretty::Context::new(self).expr(&expr).pretty(80).to_string()
    }

    /// Reduce an expression to weak head normal form.
    pub fn whnf(&self, expr: &Expr) -> Expr {
        let mut expr = expr.clone();
        loop {
            let head = expr.app_fn();
            let next = match head {
                Expr::MVar(var) => match self.is_assigned(*var) {
                    Some(value) => {
                        let args = owned_args(&expr);
                        Expr::apps(value.clone(), args)
                    }
                    None => return expr,
                },
                Expr::Lam(..) if matches!(expr, Expr::App(..)) => expr.head_beta(),
                Expr::Const(name, _) => match self.env.get(*name) {
                    Some(Declaration::Definition(def)) => {
                        let args = owned_args(&expr);
                        def.value.beta(&args)
                    }
                    Some(Declaration::Constructor(_)) if *name == Prim::NatSucc.symbol() => {
                        let pred = match expr.app_args().as_slice() {
                            [arg] => self.whnf(arg).as_nat_lit(),
                            _ => None,
                        };
                        match pred.and_then(|value| value.checked_add(1)) {
                            Some(value) => Expr::nat(value),
                            None => return expr,
                        }
                    }
                    _ => return expr,
                },
                _ => return expr,
            };
            expr = next;
        }
    }

    fn sort_level(&self, r#type: &Expr) -> Result<Universe, Error> {
        match self.whnf(r#type) {
            Expr::Sort(level) => Ok(level),
            r#type => Err(Error::TypeExpected { r#type }),
        }
    }

    /// Infer the type of an expression.
    pub fn infer_type(&self, expr: &Expr) -> Result<Expr, Error> {
        self.infer_type_under(&mut Vec::new(), expr)
    }

    fn infer_type_under(&self, binders: &mut Vec<Expr>, expr: &Expr) -> Result<Expr, Error> {
        match expr {
            Expr::BVar(index) => {
                let position = binders.len().checked_sub(index.depth() + 1);
                let r#type = position
                    .and_then(|position| binders.get(position))
                    .ok_or(Error::LooseBoundVar(*index))?;
                Ok(r#type.lift_loose_bvars(index.depth() + 1))
            }
            Expr::FVar(var) => self.local_type(*var),
            Expr::MVar(var) => Ok(self.meta_decl(*var)?.r#type.clone()),
            Expr::Sort(level) => Ok(Expr::Sort(level.clone().succ())),
            Expr::Const(name, _) => match self.env.get(*name) {
                Some(decl) => Ok(decl.r#type().clone()),
                None => Err(Error::UnknownConstant(*name)),
            },
            Expr::Lit(Literal::Nat(_)) => Ok(Expr::prim(Prim::NatType)),
            Expr::Lit(Literal::Str(_)) => Ok(Expr::prim(Prim::StringType)),
            Expr::ArrayLit(elem_type, _) => Ok(Expr::app(
                Expr::prim(Prim::ArrayType),
                elem_type.as_ref().clone(),
            )),
            Expr::App(..) => {
                let head = expr.app_fn();
                let mut r#type = self.infer_type_under(binders, head)?;
                for arg in expr.app_args() {
                    r#type = match self.whnf(&r#type) {
                        Expr::Pi(_, _, body) => body.instantiate1(arg),
                        head_type => {
                            return Err(Error::FunctionExpected {
                                head: head.clone(),
                                head_type,
                            })
                        }
                    };
                }
                Ok(r#type)
            }
            Expr::Lam(name, param_type, body) => {
                binders.push(param_type.as_ref().clone());
                let body_type = self.infer_type_under(binders, body);
                binders.pop();
                Ok(Expr::pi(*name, param_type.as_ref().clone(), body_type?))
            }
            Expr::Pi(_, param_type, body) => {
                let param_level = self.sort_level(&self.infer_type_under(binders, param_type)?)?;
                binders.push(param_type.as_ref().clone());
                let body_type = self.infer_type_under(binders, body);
                binders.pop();
                let body_level = self.sort_level(&body_type?)?;
                Ok(Expr::Sort(match body_level {
                    Universe::Zero => Universe::Zero,
                    body_level => param_level.max(body_level),
                }))
            }
        }
    }

    /// Check if two expressions are definitionally equal. This never assigns
    /// metavariables.
    pub fn is_def_eq(&self, lhs: &Expr, rhs: &Expr) -> bool {
        self.is_def_eq_whnf(&self.whnf(lhs), &self.whnf(rhs))
    }

    fn is_def_eq_whnf(&self, lhs: &Expr, rhs: &Expr) -> bool {
        if lhs == rhs {
            return true;
        }

        match (lhs, rhs) {
            (Expr::Lit(Literal::Nat(_)), _) if !matches!(rhs, Expr::Lit(_)) => {
                match nat_lit_to_constructor(lhs) {
                    Some(lhs) => self.is_def_eq_whnf(&lhs, rhs),
                    None => false,
                }
            }
            (_, Expr::Lit(Literal::Nat(_))) if !matches!(lhs, Expr::Lit(_)) => {
                match nat_lit_to_constructor(rhs) {
                    Some(rhs) => self.is_def_eq_whnf(lhs, &rhs),
                    None => false,
                }
            }
            (Expr::App(lhs_head, lhs_arg), Expr::App(rhs_head, rhs_arg)) => {
                self.is_def_eq(lhs_head, rhs_head) && self.is_def_eq(lhs_arg, rhs_arg)
            }
            (Expr::Lam(_, lhs_type, lhs_body), Expr::Lam(_, rhs_type, rhs_body))
            | (Expr::Pi(_, lhs_type, lhs_body), Expr::Pi(_, rhs_type, rhs_body)) => {
                self.is_def_eq(lhs_type, rhs_type) && self.is_def_eq(lhs_body, rhs_body)
            }
            (Expr::ArrayLit(lhs_type, lhs_elems), Expr::ArrayLit(rhs_type, rhs_elems)) => {
                lhs_elems.len() == rhs_elems.len()
                    && self.is_def_eq(lhs_type, rhs_type)
                    && Iterator::zip(lhs_elems.iter(), rhs_elems.iter())
                        .all(|(lhs, rhs)| self.is_def_eq(lhs, rhs))
            }
            (Expr::Sort(lhs), Expr::Sort(rhs)) => {
                matches!((lhs.to_explicit(), rhs.to_explicit()), (Some(l), Some(r)) if l == r)
            }
            _ => false,
        }
    }

    /// Instantiate the leading pis of a type with `args`.
    pub fn instantiate_pis(&self, r#type: &Expr, args: &[Expr]) -> Result<Expr, Error> {
        let mut r#type = r#type.clone();
        for arg in args {
            r#type = match self.whnf(&r#type) {
                Expr::Pi(_, _, body) => body.instantiate1(arg),
                head_type => return Err(Error::FunctionExpected { head: r#type, head_type }),
            };
        }
        Ok(r#type)
    }

    /// Abstract `vars` out of `body`, binding them with lambdas.
    pub fn mk_lambda(&self, vars: &[FVarId], body: &Expr) -> Result<Expr, Error> {
        self.mk_binding(vars, body, Expr::lam)
    }

    /// Abstract `vars` out of `body`, binding them with pis.
    pub fn mk_pi(&self, vars: &[FVarId], body: &Expr) -> Result<Expr, Error> {
        self.mk_binding(vars, body, Expr::pi)
    }

    fn mk_binding(
        &self,
        vars: &[FVarId],
        body: &Expr,
        binder: fn(Option<Symbol>, Expr, Expr) -> Expr,
    ) -> Result<Expr, Error> {
        let mut expr = body.abstract_fvars(vars);
        for (position, var) in vars.iter().enumerate().rev() {
            let decl = self.local_decl(*var)?;
            let r#type = decl.r#type.abstract_fvars(&vars[..position]);
            expr = binder(Some(decl.name), r#type, expr);
        }
        Ok(expr)
    }

    /// View an expression as a fully applied constructor, returning its
    /// arguments (parameters followed by fields). `Nat` literals are viewed
    /// as applications of `Nat.zero` and `Nat.succ`.
    pub fn constructor_app(&self, expr: &Expr) -> Option<(ConstructorVal, Vec<Expr>)> {
        let expr = self.whnf(expr);
        let expr = nat_lit_to_constructor(&expr).unwrap_or(expr);
        let ctor = self.env.constructor(expr.app_fn().as_const()?)?;
        let args = owned_args(&expr);
        (args.len() == ctor.num_params + ctor.num_fields).then(|| (ctor.clone(), args))
    }

    /// View a type as a fully applied inductive type, returning its
    /// parameters and indices.
    pub fn inductive_app(&self, r#type: &Expr) -> Option<(InductiveVal, Vec<Expr>, Vec<Expr>)> {
        let r#type = self.whnf(r#type);
        let inductive = self.env.inductive(r#type.app_fn().as_const()?)?;
        let mut params = owned_args(&r#type);
        if params.len() != inductive.num_params + inductive.num_indices {
            return None;
        }
        let indices = params.split_off(inductive.num_params);
        Some((inductive.clone(), params, indices))
    }
}

impl LocalNames for MetaContext {
    fn local_name(&self, var: FVarId) -> Option<Symbol> {
        Some(self.locals.get_level(var.0)?.name)
    }
}

fn owned_args(expr: &Expr) -> Vec<Expr> {
    expr.app_args().into_iter().cloned().collect()
}

/// `0` as `Nat.zero`, and `n + 1` as `Nat.succ n`.
pub fn nat_lit_to_constructor(expr: &Expr) -> Option<Expr> {
    match expr.as_nat_lit()? {
        0 => Some(Expr::prim(Prim::NatZero)),
        value => Some(Expr::app(Expr::prim(Prim::NatSucc), Expr::nat(value - 1))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decl::DefinitionVal;

    fn nat() -> Expr {
        Expr::prim(Prim::NatType)
    }

    fn succ(expr: Expr) -> Expr {
        Expr::app(Expr::prim(Prim::NatSucc), expr)
    }

    #[test]
    fn assign_at_most_once() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let goal = mctx.alloc_fresh_var(LocalContext::new(), nat());
        assert!(mctx.is_assigned(goal).is_none());
        mctx.assign(goal, Expr::nat(1)).unwrap();
        assert_eq!(mctx.is_assigned(goal), Some(&Expr::nat(1)));
        assert!(matches!(
            mctx.assign(goal, Expr::nat(2)),
            Err(Error::AlreadyAssigned(var)) if var == goal,
        ));
        assert_eq!(mctx.is_assigned(goal), Some(&Expr::nat(1)));
    }

    #[test]
    fn fresh_ids_are_never_reused() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let x = mctx.alloc_local(Symbol::intern("x"), nat());
        let y = mctx.alloc_local(Symbol::intern("x"), nat());
        assert_ne!(x, y);
        let lctx = LocalContext::new().with(x);
        let goals = (0..4)
            .map(|_| mctx.alloc_fresh_var(lctx.clone(), nat()))
            .collect::<Vec<_>>();
        assert!(goals.iter().enumerate().all(|(i, g)| goals[..i].iter().all(|h| h != g)));
    }

    #[test]
    fn instantiate_follows_chains() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let outer = mctx.alloc_fresh_var(LocalContext::new(), nat());
        let inner = mctx.alloc_fresh_var(LocalContext::new(), nat());
        mctx.assign(outer, succ(Expr::MVar(inner))).unwrap();
        mctx.assign(inner, Expr::nat(3)).unwrap();
        assert_eq!(mctx.instantiate(&Expr::MVar(outer)), succ(Expr::nat(3)));
    }

    #[test]
    fn delayed_goals_bind_their_locals() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let n = mctx.alloc_local(Symbol::intern("n"), nat());
        let goal = mctx.alloc_fresh_var(LocalContext::new().with(n), nat());
        let body = mctx.delay_goal(&[n], goal).unwrap();
        let minor = mctx.mk_lambda(&[n], &body).unwrap();
        assert!(mctx.infer_type(&body).is_ok());

        mctx.assign(goal, succ(Expr::FVar(n))).unwrap();
        assert_eq!(
            mctx.instantiate(&minor),
            Expr::lam(
                Some(Symbol::intern("n")),
                nat(),
                succ(Expr::BVar(Index::last())),
            ),
        );
    }

    #[test]
    fn whnf_folds_successors() {
        let mctx = MetaContext::new(Environment::with_prelude());
        assert_eq!(mctx.whnf(&succ(succ(Expr::nat(0)))), Expr::nat(2));
    }

    #[test]
    fn whnf_leaves_successor_of_max_literal() {
        let mctx = MetaContext::new(Environment::with_prelude());
        let expr = succ(Expr::nat(u64::MAX));
        assert_eq!(mctx.whnf(&expr), expr);
        assert_eq!(mctx.whnf(&succ(Expr::nat(u64::MAX - 1))), Expr::nat(u64::MAX));
    }

    #[test]
    fn whnf_unfolds_definitions() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let name = Symbol::intern("two");
        let def = DefinitionVal {
            name,
            r#type: nat(),
            value: succ(Expr::nat(1)),
            inline: false,
        };
        mctx.env_mut().add(Declaration::Definition(def)).unwrap();
        assert_eq!(mctx.whnf(&Expr::constant(name)), Expr::nat(2));
    }

    #[test]
    fn literals_equal_constructor_forms() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let x = mctx.alloc_local(Symbol::intern("x"), nat());
        assert!(mctx.is_def_eq(&Expr::nat(0), &Expr::prim(Prim::NatZero)));
        assert!(mctx.is_def_eq(&Expr::nat(2), &succ(succ(Expr::prim(Prim::NatZero)))));
        assert!(mctx.is_def_eq(&succ(Expr::FVar(x)), &succ(Expr::FVar(x))));
        assert!(!mctx.is_def_eq(&Expr::nat(1), &succ(Expr::FVar(x))));
        assert!(!mctx.is_def_eq(&Expr::nat(1), &Expr::nat(2)));
    }

    #[test]
    fn infer_applications() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let xs = mctx.alloc_local(
            Symbol::intern("xs"),
            Expr::app(Expr::prim(Prim::ArrayType), nat()),
        );
        let size = Expr::apps(Expr::prim(Prim::ArraySize), [nat(), Expr::FVar(xs)]);
        assert_eq!(mctx.infer_type(&size).unwrap(), nat());
        assert!(matches!(
            mctx.infer_type(&Expr::app(Expr::nat(1), Expr::nat(2))),
            Err(Error::FunctionExpected { .. }),
        ));
    }

    #[test]
    fn infer_binders() {
        let mctx = MetaContext::new(Environment::with_prelude());
        let id = Expr::lam(
            Some(Symbol::intern("n")),
            nat(),
            Expr::BVar(Index::last()),
        );
        assert_eq!(
            mctx.infer_type(&id).unwrap(),
            Expr::pi(Some(Symbol::intern("n")), nat(), nat()),
        );
        assert_eq!(
            mctx.infer_type(&Expr::arrow(nat(), Expr::prop())).unwrap(),
            Expr::r#type(),
        );
    }

    #[test]
    fn mk_lambda_abstracts_dependent_types() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let alpha = mctx.alloc_local(Symbol::intern("α"), Expr::r#type());
        let a = mctx.alloc_local(Symbol::intern("a"), Expr::FVar(alpha));
        let lam = mctx.mk_lambda(&[alpha, a], &Expr::FVar(a)).unwrap();
        assert_eq!(
            lam,
            Expr::lam(
                Some(Symbol::intern("α")),
                Expr::r#type(),
                Expr::lam(
                    Some(Symbol::intern("a")),
                    Expr::BVar(Index::last()),
                    Expr::BVar(Index::last()),
                ),
            ),
        );
    }

    #[test]
    fn constructor_views() {
        let mctx = MetaContext::new(Environment::with_prelude());
        let (ctor, args) = mctx.constructor_app(&Expr::nat(3)).unwrap();
        assert_eq!(ctor.name, Prim::NatSucc.symbol());
        assert_eq!(args, [Expr::nat(2)]);
        let (ctor, args) = mctx.constructor_app(&Expr::nat(0)).unwrap();
        assert_eq!(ctor.name, Prim::NatZero.symbol());
        assert!(args.is_empty());
        assert!(mctx.constructor_app(&Expr::string("a")).is_none());
    }

    #[test]
    fn substitutions_compose() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let x = mctx.alloc_local(Symbol::intern("x"), nat());
        let y = mctx.alloc_local(Symbol::intern("y"), nat());
        let mut subst = FVarSubst::singleton(x, succ(Expr::FVar(y)));
        subst.insert(y, Expr::nat(0));
        assert_eq!(subst.apply(&Expr::FVar(x)), succ(Expr::nat(0)));
        assert_eq!(subst.apply(&Expr::FVar(y)), Expr::nat(0));
    }

    #[test]
    fn empty_substitution_is_identity() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let x = mctx.alloc_local(Symbol::intern("x"), nat());
        let expr = succ(Expr::FVar(x));
        assert_eq!(FVarSubst::new().apply(&expr), expr);
    }
}
