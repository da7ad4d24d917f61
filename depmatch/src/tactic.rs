//! Case-splitting tactics.
//!
//! Each split consumes a goal and assigns it an elimination term whose
//! branches are fresh goals, returned to the caller as subgoals together with
//! the substitution that maps the old local context into the new one.
//!
//! Hypotheses whose types depend on the split variable are reverted before
//! the split and reintroduced (as fresh locals with refined types) in each
//! branch.

use std::fmt;

use crate::core::{Expr, FVarId, MVarId, Prim};
use crate::meta::{self, FVarSubst, LocalContext, MetaContext};
use crate::symbol::Symbol;

#[derive(Clone, Debug)]
pub enum Error {
    Store(meta::Error),
    NotInductive { target: FVarId, r#type: Expr },
    NotAnArray { target: FVarId, r#type: Expr },
    NotInContext { target: FVarId, goal: MVarId },
    /// An index equation could neither be solved nor refuted.
    Stuck { ctor: Symbol, lhs: Expr, rhs: Expr },
}

impl From<meta::Error> for Error {
    fn from(error: meta::Error) -> Error {
        Error::Store(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Store(error) => error.fmt(f),
            Error::NotInductive { target, .. } => {
                write!(f, "`{target:?}` is not an element of an inductive type")
            }
            Error::NotAnArray { target, .. } => write!(f, "`{target:?}` is not an array"),
            Error::NotInContext { target, goal } => {
                write!(f, "`{target:?}` is not in the local context of `{goal}`")
            }
            Error::Stuck { ctor, .. } => {
                write!(f, "failed to solve the index equations of `{ctor}`")
            }
        }
    }
}

impl std::error::Error for Error {}

/// One constructor case.
#[derive(Clone, Debug)]
pub struct CasesSubgoal {
    pub ctor: Symbol,
    pub goal: MVarId,
    /// The constructor's fields, after substitution.
    pub fields: Vec<Expr>,
    pub subst: FVarSubst,
}

/// One value case, or the default case when `value` is `None`.
#[derive(Clone, Debug)]
pub struct ValueSubgoal {
    pub value: Option<Expr>,
    pub goal: MVarId,
    pub subst: FVarSubst,
    /// Disequations introduced in the default case.
    pub hyps: Vec<FVarId>,
}

/// One array size case, or the default case when `size` is `None`.
#[derive(Clone, Debug)]
pub struct ArraySubgoal {
    pub size: Option<usize>,
    pub goal: MVarId,
    pub elems: Vec<Expr>,
    pub subst: FVarSubst,
}

/// The case-splitting operations used by the match compiler.
pub trait Tactics {
    /// Split on the constructors of `target`'s inductive type. Constructors
    /// whose indices cannot be unified with the target's are discharged.
    fn cases(
        &mut self,
        mctx: &mut MetaContext,
        goal: MVarId,
        target: FVarId,
    ) -> Result<Vec<CasesSubgoal>, Error>;

    /// Split on whether `target` is equal to each of `values`, followed by a
    /// default case.
    fn case_values(
        &mut self,
        mctx: &mut MetaContext,
        goal: MVarId,
        target: FVarId,
        values: &[Expr],
    ) -> Result<Vec<ValueSubgoal>, Error>;

    /// Split on whether the array `target` has each of `sizes`, followed by a
    /// default case.
    fn case_array_sizes(
        &mut self,
        mctx: &mut MetaContext,
        goal: MVarId,
        target: FVarId,
        sizes: &[usize],
    ) -> Result<Vec<ArraySubgoal>, Error>;

    /// Close a goal without a proof.
    fn admit(&mut self, mctx: &mut MetaContext, goal: MVarId) -> Result<(), Error>;
}

/// Splits that assign goals with eliminator applications.
#[derive(Copy, Clone, Debug, Default)]
pub struct ElimTactics;

impl Tactics for ElimTactics {
    fn cases(
        &mut self,
        mctx: &mut MetaContext,
        goal: MVarId,
        target: FVarId,
    ) -> Result<Vec<CasesSubgoal>, Error> {
        let decl = mctx.meta_decl(goal)?.clone();
        check_in_context(&decl.lctx, goal, target)?;
        let target_type = mctx.local_type(target)?;
        let (inductive, params, indices) = match mctx.inductive_app(&target_type) {
            Some(app) => app,
            None => {
                let r#type = mctx.whnf(&target_type);
                return Err(Error::NotInductive { target, r#type });
            }
        };

        let generalized = free_vars(&indices);
        let reverted = dependent_locals(mctx, &decl.lctx, target, &generalized)?;

        let mut subgoals = Vec::with_capacity(inductive.ctors.len());
        let mut minors = Vec::with_capacity(inductive.ctors.len());
        for ctor_name in &inductive.ctors {
            let ctor = match mctx.env().constructor(*ctor_name) {
                Some(ctor) => ctor.clone(),
                None => return Err(meta::Error::UnknownConstant(*ctor_name).into()),
            };

            let mut ctor_type = mctx.instantiate_pis(&ctor.r#type, &params)?;
            let mut fields = Vec::with_capacity(ctor.num_fields);
            for _ in 0..ctor.num_fields {
                ctor_type = match mctx.whnf(&ctor_type) {
                    Expr::Pi(name, r#type, body) => {
                        let name = name.unwrap_or_else(|| Symbol::intern("a"));
                        let field = mctx.alloc_local(name, r#type.as_ref().clone());
                        fields.push(field);
                        body.instantiate1(&Expr::FVar(field))
                    }
                    head_type => {
                        let head = Expr::constant(ctor.name);
                        return Err(meta::Error::FunctionExpected { head, head_type }.into());
                    }
                };
            }
            let ctor_indices = ctor_type.app_args().into_iter().skip(inductive.num_params);
            let ctor_indices = ctor_indices.cloned().collect::<Vec<_>>();

            let ctor_app = Expr::apps(
                Expr::constant(ctor.name),
                params.iter().cloned().chain(fields.iter().map(|f| Expr::FVar(*f))),
            );
            let mut subst = FVarSubst::singleton(target, ctor_app);

            let mut outcome = Unification::Solved;
            for (lhs, rhs) in Iterator::zip(indices.iter(), ctor_indices.iter()) {
                outcome = unify(mctx, &mut subst, lhs, rhs);
                if !matches!(outcome, Unification::Solved) {
                    break;
                }
            }

            match outcome {
                Unification::Solved => {}
                Unification::Conflict => {
                    tracing::trace!(
                        target: "depmatch::matcher::debug",
                        ctor = %ctor.name,
                        "constructor case is impossible"
                    );
                    let no_confusion = Expr::constant(inductive.no_confusion());
                    minors.push(mctx.mk_lambda(&fields, &no_confusion)?);
                    continue;
                }
                Unification::Stuck(lhs, rhs) => {
                    let ctor = ctor.name;
                    return Err(Error::Stuck { ctor, lhs, rhs });
                }
            }

            let refined = refine_fields(mctx, &fields, &mut subst)?;
            let branch_fields = refined.iter().map(|(_, field)| *field).collect::<Vec<_>>();
            let (lctx, reintroduced) =
                rebuild_context(mctx, &decl.lctx, target, &branch_fields, &reverted, &mut subst)?;
            let goal_type = subst.apply(&decl.r#type);
            let new_goal = mctx.alloc_fresh_var(lctx, goal_type);

            // The minor premise binds the constructor's own fields, so refined
            // fields are passed back in as the originals.
            let restore = (refined.iter())
                .filter(|(field, branch_field)| field != branch_field)
                .fold(FVarSubst::new(), |mut restore, (field, branch_field)| {
                    restore.insert(*branch_field, Expr::FVar(*field));
                    restore
                });
            let goal_binders = [branch_fields.as_slice(), reintroduced.as_slice()].concat();
            let body = restore.apply(&mctx.delay_goal(&goal_binders, new_goal)?);
            let binders = [fields.as_slice(), reintroduced.as_slice()].concat();
            minors.push(mctx.mk_lambda(&binders, &body)?);
            subgoals.push(CasesSubgoal {
                ctor: ctor.name,
                goal: new_goal,
                fields: fields.iter().map(|f| subst.apply(&Expr::FVar(*f))).collect(),
                subst,
            });
        }

        let motive = mk_motive(mctx, target, &indices, &reverted, &decl.r#type)?;
        let cases_on = Expr::apps(
            Expr::constant(inductive.cases_on()),
            (params.into_iter())
                .chain([motive])
                .chain(indices)
                .chain([Expr::FVar(target)])
                .chain(minors)
                .chain(reverted.iter().map(|var| Expr::FVar(*var))),
        );
        mctx.assign(goal, cases_on)?;

        Ok(subgoals)
    }

    fn case_values(
        &mut self,
        mctx: &mut MetaContext,
        goal: MVarId,
        target: FVarId,
        values: &[Expr],
    ) -> Result<Vec<ValueSubgoal>, Error> {
        let decl = mctx.meta_decl(goal)?.clone();
        check_in_context(&decl.lctx, goal, target)?;
        let target_type = mctx.local_type(target)?;
        let reverted = dependent_locals(mctx, &decl.lctx, target, &[])?;

        let mut subgoals = Vec::with_capacity(values.len() + 1);
        let mut branches = Vec::with_capacity(values.len());
        for value in values {
            let mut subst = FVarSubst::singleton(target, value.clone());
            let (lctx, reintroduced) =
                rebuild_context(mctx, &decl.lctx, target, &[], &reverted, &mut subst)?;
            let goal_type = subst.apply(&decl.r#type);
            let new_goal = mctx.alloc_fresh_var(lctx, goal_type);

            let body = mctx.delay_goal(&reintroduced, new_goal)?;
            branches.push(mctx.mk_lambda(&reintroduced, &body)?);
            subgoals.push(ValueSubgoal {
                value: Some(value.clone()),
                goal: new_goal,
                subst,
                hyps: Vec::new(),
            });
        }

        let mut lctx = decl.lctx.clone();
        let mut hyps = Vec::with_capacity(values.len());
        for (index, value) in values.iter().enumerate() {
            let eq = mk_eq(&target_type, Expr::FVar(target), value.clone());
            let name = Symbol::intern("h").numbered(index + 1);
            let hyp = mctx.alloc_local(name, Expr::app(Expr::prim(Prim::Not), eq));
            lctx.push(hyp);
            hyps.push(hyp);
        }
        let default_goal = mctx.alloc_fresh_var(lctx, decl.r#type.clone());

        let motive = mk_motive(mctx, target, &[], &reverted, &decl.r#type)?;
        let result_type = mctx.mk_pi(&reverted, &decl.r#type)?;
        let body = mctx.delay_goal(&[hyps.as_slice(), reverted.as_slice()].concat(), default_goal)?;
        let mut tree = mctx.mk_lambda(&reverted, &body)?;
        for ((value, branch), hyp) in values.iter().zip(branches).zip(&hyps).rev() {
            let eq = mk_eq(&target_type, Expr::FVar(target), value.clone());
            let eq_hyp = mctx.alloc_local(Symbol::intern("h"), eq.clone());
            let symm = Expr::apps(
                Expr::prim(Prim::EqSymm),
                [
                    target_type.clone(),
                    Expr::FVar(target),
                    value.clone(),
                    Expr::FVar(eq_hyp),
                ],
            );
            let cast = Expr::apps(
                Expr::prim(Prim::EqNdrec),
                [
                    target_type.clone(),
                    value.clone(),
                    motive.clone(),
                    branch,
                    Expr::FVar(target),
                    symm,
                ],
            );
            let decide = Expr::apps(
                Expr::prim(Prim::DecEq),
                [target_type.clone(), Expr::FVar(target), value.clone()],
            );
            tree = Expr::apps(
                Expr::prim(Prim::Dite),
                [
                    result_type.clone(),
                    eq,
                    decide,
                    mctx.mk_lambda(&[eq_hyp], &cast)?,
                    mctx.mk_lambda(&[*hyp], &tree)?,
                ],
            );
        }
        let tree = Expr::apps(tree, reverted.iter().map(|var| Expr::FVar(*var)));
        mctx.assign(goal, tree)?;

        subgoals.push(ValueSubgoal {
            value: None,
            goal: default_goal,
            subst: FVarSubst::new(),
            hyps,
        });
        Ok(subgoals)
    }

    fn case_array_sizes(
        &mut self,
        mctx: &mut MetaContext,
        goal: MVarId,
        target: FVarId,
        sizes: &[usize],
    ) -> Result<Vec<ArraySubgoal>, Error> {
        let decl = mctx.meta_decl(goal)?.clone();
        check_in_context(&decl.lctx, goal, target)?;
        let target_type = mctx.whnf(&mctx.local_type(target)?);
        let elem_type = match (target_type.app_fn().as_const(), target_type.app_args().as_slice()) {
            (Some(name), [elem_type]) if name == Prim::ArrayType.symbol() => Some((*elem_type).clone()),
            _ => None,
        };
        let elem_type = match elem_type {
            Some(elem_type) => elem_type,
            None => return Err(Error::NotAnArray { target, r#type: target_type }),
        };
        let target_name = mctx.local_decl(target)?.name;
        let reverted = dependent_locals(mctx, &decl.lctx, target, &[])?;

        let mut subgoals = Vec::with_capacity(sizes.len() + 1);
        let mut minors = Vec::with_capacity(sizes.len());
        for size in sizes {
            let elems = (0..*size)
                .map(|index| mctx.alloc_local(target_name.numbered(index + 1), elem_type.clone()))
                .collect::<Vec<_>>();
            let array = Expr::array_lit(
                elem_type.clone(),
                elems.iter().map(|elem| Expr::FVar(*elem)).collect(),
            );
            let mut subst = FVarSubst::singleton(target, array);
            let (lctx, reintroduced) =
                rebuild_context(mctx, &decl.lctx, target, &elems, &reverted, &mut subst)?;
            let goal_type = subst.apply(&decl.r#type);
            let new_goal = mctx.alloc_fresh_var(lctx, goal_type);

            let binders = [elems.as_slice(), reintroduced.as_slice()].concat();
            let body = mctx.delay_goal(&binders, new_goal)?;
            minors.push(mctx.mk_lambda(&binders, &body)?);
            subgoals.push(ArraySubgoal {
                size: Some(*size),
                goal: new_goal,
                elems: elems.iter().map(|elem| subst.apply(&Expr::FVar(*elem))).collect(),
                subst,
            });
        }

        let array_size = Expr::apps(
            Expr::prim(Prim::ArraySize),
            [elem_type.clone(), Expr::FVar(target)],
        );
        let mut lctx = decl.lctx.clone();
        let mut hyps = Vec::with_capacity(sizes.len());
        for (index, size) in sizes.iter().enumerate() {
            let eq = mk_eq(&Expr::prim(Prim::NatType), array_size.clone(), Expr::nat(*size as u64));
            let name = Symbol::intern("h").numbered(index + 1);
            let hyp = mctx.alloc_local(name, Expr::app(Expr::prim(Prim::Not), eq));
            lctx.push(hyp);
            hyps.push(hyp);
        }
        let default_goal = mctx.alloc_fresh_var(lctx, decl.r#type.clone());

        let motive = mk_motive(mctx, target, &[], &reverted, &decl.r#type)?;
        let body = mctx.delay_goal(&[hyps.as_slice(), reverted.as_slice()].concat(), default_goal)?;
        let mut tree = mctx.mk_lambda(&reverted, &body)?;
        for ((size, minor), hyp) in sizes.iter().zip(minors).zip(&hyps).rev() {
            tree = Expr::apps(
                Expr::prim(Prim::ArrayCasesOnSize),
                [
                    elem_type.clone(),
                    motive.clone(),
                    Expr::FVar(target),
                    Expr::nat(*size as u64),
                    minor,
                    mctx.mk_lambda(&[*hyp], &tree)?,
                ],
            );
        }
        let tree = Expr::apps(tree, reverted.iter().map(|var| Expr::FVar(*var)));
        mctx.assign(goal, tree)?;

        subgoals.push(ArraySubgoal {
            size: None,
            goal: default_goal,
            elems: Vec::new(),
            subst: FVarSubst::new(),
        });
        Ok(subgoals)
    }

    fn admit(&mut self, mctx: &mut MetaContext, goal: MVarId) -> Result<(), Error> {
        let r#type = mctx.meta_decl(goal)?.r#type.clone();
        mctx.assign(goal, Expr::app(Expr::prim(Prim::SorryAx), r#type))?;
        Ok(())
    }
}

fn check_in_context(lctx: &LocalContext, goal: MVarId, target: FVarId) -> Result<(), Error> {
    match lctx.iter().any(|var| *var == target) {
        true => Ok(()),
        false => Err(Error::NotInContext { target, goal }),
    }
}

fn mk_eq(r#type: &Expr, lhs: Expr, rhs: Expr) -> Expr {
    Expr::apps(Expr::prim(Prim::Eq), [r#type.clone(), lhs, rhs])
}

fn free_vars(exprs: &[Expr]) -> Vec<FVarId> {
    let mut vars = Vec::new();
    for expr in exprs {
        expr.any(&mut |expr| {
            if let Expr::FVar(var) = expr {
                if !vars.contains(var) {
                    vars.push(*var);
                }
            }
            false
        });
    }
    vars
}

/// The locals of `lctx` whose types mention `target` or `generalized`,
/// directly or through other dependent locals.
fn dependent_locals(
    mctx: &MetaContext,
    lctx: &LocalContext,
    target: FVarId,
    generalized: &[FVarId],
) -> Result<Vec<FVarId>, meta::Error> {
    let mut dependencies = generalized.to_vec();
    dependencies.push(target);
    let mut dependents = Vec::new();
    for var in lctx.iter() {
        if dependencies.contains(var) {
            continue;
        }
        let r#type = &mctx.local_decl(*var)?.r#type;
        if r#type.any(&mut |expr| matches!(expr, Expr::FVar(v) if dependencies.contains(v))) {
            dependencies.push(*var);
            dependents.push(*var);
        }
    }
    Ok(dependents)
}

/// The fields of a constructor case that were not solved by unifying its
/// indices, paired with the locals that stand for them in the branch. Fields
/// whose types are refined by `subst` are reallocated at the refined types,
/// and `subst` is extended with the renamings.
fn refine_fields(
    mctx: &mut MetaContext,
    fields: &[FVarId],
    subst: &mut FVarSubst,
) -> Result<Vec<(FVarId, FVarId)>, meta::Error> {
    let mut refined = Vec::with_capacity(fields.len());
    for field in fields {
        if subst.contains(*field) {
            continue;
        }
        let old_type = mctx.local_type(*field)?;
        let new_type = subst.apply(&old_type);
        if new_type == old_type {
            refined.push((*field, *field));
        } else {
            let branch_field = mctx.alloc_local_like(*field, new_type)?;
            subst.insert(*field, Expr::FVar(branch_field));
            refined.push((*field, branch_field));
        }
    }
    Ok(refined)
}

/// Build the local context of a branch: `target` is replaced by
/// `introduced`, eliminated locals are dropped, and the `reverted` locals
/// are reintroduced at the end with their types refined by `subst`.
fn rebuild_context(
    mctx: &mut MetaContext,
    lctx: &LocalContext,
    target: FVarId,
    introduced: &[FVarId],
    reverted: &[FVarId],
    subst: &mut FVarSubst,
) -> Result<(LocalContext, Vec<FVarId>), meta::Error> {
    let mut new_lctx = LocalContext::new();
    for var in lctx.iter() {
        if *var == target {
            for var in introduced.iter().filter(|var| !subst.contains(**var)) {
                new_lctx.push(*var);
            }
        } else if !subst.contains(*var) && !reverted.contains(var) {
            new_lctx.push(*var);
        }
    }

    let mut reintroduced = Vec::with_capacity(reverted.len());
    for var in reverted {
        let r#type = subst.apply(&mctx.local_type(*var)?);
        let new_var = mctx.alloc_local_like(*var, r#type)?;
        subst.insert(*var, Expr::FVar(new_var));
        new_lctx.push(new_var);
        reintroduced.push(new_var);
    }

    Ok((new_lctx, reintroduced))
}

/// `λ indices major, Π reverted, goal`, abstracting over the indices that
/// are local variables and over the major premise.
fn mk_motive(
    mctx: &mut MetaContext,
    target: FVarId,
    indices: &[Expr],
    reverted: &[FVarId],
    goal_type: &Expr,
) -> Result<Expr, meta::Error> {
    let body = mctx.mk_pi(reverted, goal_type)?;

    let mut generalize = FVarSubst::new();
    let mut binders = Vec::with_capacity(indices.len() + 1);
    for index in indices {
        let r#type = generalize.apply(&mctx.infer_type(index)?);
        let var = match index.as_fvar() {
            Some(old) if !generalize.contains(old) => {
                let var = mctx.alloc_local_like(old, r#type)?;
                generalize.insert(old, Expr::FVar(var));
                var
            }
            _ => mctx.alloc_local(Symbol::intern("i"), r#type),
        };
        binders.push(var);
    }
    let major_type = generalize.apply(&mctx.local_type(target)?);
    let major = mctx.alloc_local_like(target, major_type)?;
    generalize.insert(target, Expr::FVar(major));
    binders.push(major);

    mctx.mk_lambda(&binders, &generalize.apply(&body))
}

enum Unification {
    Solved,
    /// The equation is refuted by distinct constructors or literals.
    Conflict,
    Stuck(Expr, Expr),
}

/// First-order unification of an index equation, extending `subst`.
fn unify(mctx: &MetaContext, subst: &mut FVarSubst, lhs: &Expr, rhs: &Expr) -> Unification {
    let lhs = mctx.whnf(&subst.apply(lhs));
    let rhs = mctx.whnf(&subst.apply(rhs));
    if mctx.is_def_eq(&lhs, &rhs) {
        return Unification::Solved;
    }

    match (&lhs, &rhs) {
        (Expr::FVar(var), _) if !rhs.has_fvar(*var) => {
            subst.insert(*var, rhs.clone());
            return Unification::Solved;
        }
        (_, Expr::FVar(var)) if !lhs.has_fvar(*var) => {
            subst.insert(*var, lhs.clone());
            return Unification::Solved;
        }
        (Expr::Lit(_), Expr::Lit(_)) => return Unification::Conflict,
        _ => {}
    }

    match (mctx.constructor_app(&lhs), mctx.constructor_app(&rhs)) {
        (Some((lhs_ctor, _)), Some((rhs_ctor, _))) if lhs_ctor.name != rhs_ctor.name => {
            Unification::Conflict
        }
        (Some((ctor, lhs_args)), Some((_, rhs_args))) => {
            let fields = Iterator::zip(lhs_args.iter(), rhs_args.iter()).skip(ctor.num_params);
            for (lhs, rhs) in fields {
                match unify(mctx, subst, lhs, rhs) {
                    Unification::Solved => {}
                    outcome => return outcome,
                }
            }
            Unification::Solved
        }
        // The variable occurs inside the constructor application, which can
        // never be equal to it.
        (None, Some(_)) if lhs.is_fvar() => Unification::Conflict,
        (Some(_), None) if rhs.is_fvar() => Unification::Conflict,
        _ => Unification::Stuck(lhs, rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decl::{ConstructorVal, Environment, InductiveVal};
    use crate::env::Index;

    fn nat() -> Expr {
        Expr::prim(Prim::NatType)
    }

    fn succ(expr: Expr) -> Expr {
        Expr::app(Expr::prim(Prim::NatSucc), expr)
    }

    /// `Vec (α : Type) : Nat → Type`
    fn declare_vec(env: &mut Environment) -> Symbol {
        let name = Symbol::intern("Vec");
        let var = |depth| Expr::BVar(Index::last().shift(depth));
        let vec = |elem, len| Expr::apps(Expr::constant(name), [elem, len]);
        let alpha = Some(Symbol::intern("α"));

        let inductive = InductiveVal {
            name,
            r#type: Expr::pi(alpha, Expr::r#type(), Expr::arrow(nat(), Expr::r#type())),
            num_params: 1,
            num_indices: 1,
            ctors: vec![name.child("nil"), name.child("cons")],
        };
        let nil = ConstructorVal {
            name: name.child("nil"),
            induct: name,
            cidx: 0,
            num_params: 1,
            num_fields: 0,
            r#type: Expr::pi(alpha, Expr::r#type(), vec(var(0), Expr::prim(Prim::NatZero))),
        };
        let cons = ConstructorVal {
            name: name.child("cons"),
            induct: name,
            cidx: 1,
            num_params: 1,
            num_fields: 3,
            r#type: Expr::pi(
                alpha,
                Expr::r#type(),
                Expr::pi(
                    Some(Symbol::intern("m")),
                    nat(),
                    Expr::pi(
                        Some(Symbol::intern("head")),
                        var(1),
                        Expr::pi(
                            Some(Symbol::intern("tail")),
                            vec(var(2), var(1)),
                            vec(var(3), succ(var(2))),
                        ),
                    ),
                ),
            ),
        };
        env.add_inductive(inductive, vec![nil, cons]).unwrap();
        name
    }

    fn goal_with(mctx: &mut MetaContext, locals: &[FVarId], r#type: Expr) -> MVarId {
        let lctx = locals.iter().fold(LocalContext::new(), |lctx, var| lctx.with(*var));
        mctx.alloc_fresh_var(lctx, r#type)
    }

    #[test]
    fn cases_on_nat() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let n = mctx.alloc_local(Symbol::intern("n"), nat());
        let goal = goal_with(&mut mctx, &[n], nat());

        let subgoals = ElimTactics.cases(&mut mctx, goal, n).unwrap();
        let ctors = subgoals.iter().map(|sg| sg.ctor).collect::<Vec<_>>();
        assert_eq!(ctors, [Prim::NatZero.symbol(), Prim::NatSucc.symbol()]);
        assert!(subgoals[0].fields.is_empty());
        assert_eq!(subgoals[1].fields.len(), 1);
        assert_eq!(
            subgoals[1].subst.apply(&Expr::FVar(n)),
            succ(subgoals[1].fields[0].clone()),
        );

        let assignment = mctx.is_assigned(goal).unwrap();
        assert_eq!(
            assignment.app_fn(),
            &Expr::constant(Prim::NatType.symbol().child("casesOn")),
        );
        // the target is no longer in the context of the new goals
        let lctx = &mctx.meta_decl(subgoals[1].goal).unwrap().lctx;
        assert!(lctx.iter().all(|var| *var != n));
    }

    #[test]
    fn cases_drops_impossible_constructors() {
        let mut env = Environment::with_prelude();
        let vec = declare_vec(&mut env);
        let mut mctx = MetaContext::new(env);
        let xs_type = Expr::apps(Expr::constant(vec), [nat(), Expr::nat(0)]);
        let xs = mctx.alloc_local(Symbol::intern("xs"), xs_type);
        let goal = goal_with(&mut mctx, &[xs], nat());

        let subgoals = ElimTactics.cases(&mut mctx, goal, xs).unwrap();
        assert_eq!(subgoals.len(), 1);
        assert_eq!(subgoals[0].ctor, vec.child("nil"));
    }

    #[test]
    fn cases_refines_indices() {
        let mut env = Environment::with_prelude();
        let vec = declare_vec(&mut env);
        let mut mctx = MetaContext::new(env);
        let n = mctx.alloc_local(Symbol::intern("n"), nat());
        let xs_type = Expr::apps(Expr::constant(vec), [nat(), Expr::FVar(n)]);
        let xs = mctx.alloc_local(Symbol::intern("xs"), xs_type.clone());
        let ys = mctx.alloc_local(Symbol::intern("ys"), xs_type);
        let goal = goal_with(&mut mctx, &[n, xs, ys], nat());

        let subgoals = ElimTactics.cases(&mut mctx, goal, xs).unwrap();
        assert_eq!(subgoals.len(), 2);

        // `n := Nat.zero` and `ys` is reintroduced at the refined type
        let nil = &subgoals[0];
        assert_eq!(nil.subst.apply(&Expr::FVar(n)), Expr::prim(Prim::NatZero));
        let new_ys = nil.subst.apply(&Expr::FVar(ys)).as_fvar().unwrap();
        assert_ne!(new_ys, ys);
        assert_eq!(
            mctx.local_type(new_ys).unwrap(),
            Expr::apps(Expr::constant(vec), [nat(), Expr::prim(Prim::NatZero)]),
        );

        let cons = &subgoals[1];
        assert_eq!(cons.fields.len(), 3);
        assert_eq!(cons.subst.apply(&Expr::FVar(n)), succ(cons.fields[0].clone()));
    }

    #[test]
    fn cases_refines_field_types() {
        let mut env = Environment::with_prelude();
        let vec = declare_vec(&mut env);
        let mut mctx = MetaContext::new(env);
        let xs_type = Expr::apps(Expr::constant(vec), [nat(), Expr::nat(1)]);
        let xs = mctx.alloc_local(Symbol::intern("xs"), xs_type);
        let goal = goal_with(&mut mctx, &[xs], nat());

        let subgoals = ElimTactics.cases(&mut mctx, goal, xs).unwrap();
        assert_eq!(subgoals.len(), 1);
        let cons = &subgoals[0];
        assert_eq!(cons.ctor, vec.child("cons"));
        // `m := 0`, so the tail is a vector of length zero
        assert_eq!(cons.fields[0], Expr::nat(0));
        let tail = cons.fields[2].as_fvar().unwrap();
        assert_eq!(
            mctx.local_type(tail).unwrap(),
            Expr::apps(Expr::constant(vec), [nat(), Expr::nat(0)]),
        );
        let lctx = &mctx.meta_decl(cons.goal).unwrap().lctx;
        assert!(lctx.iter().any(|var| *var == tail));

        let length = Expr::app(Expr::constant(Symbol::intern("length")), Expr::FVar(tail));
        mctx.assign(cons.goal, length).unwrap();
        let value = mctx.instantiate(&Expr::MVar(goal));
        assert!(!value.has_mvar());
        assert!(!value.any(&mut |expr| matches!(expr, Expr::FVar(var) if *var != xs)));
    }

    #[test]
    fn cases_rejects_non_inductive_targets() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let s = mctx.alloc_local(Symbol::intern("s"), Expr::prim(Prim::StringType));
        let goal = goal_with(&mut mctx, &[s], nat());
        assert!(matches!(
            ElimTactics.cases(&mut mctx, goal, s),
            Err(Error::NotInductive { .. }),
        ));
        assert!(mctx.is_assigned(goal).is_none());
    }

    #[test]
    fn case_values_adds_a_default() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let n = mctx.alloc_local(Symbol::intern("n"), nat());
        let goal = goal_with(&mut mctx, &[n], nat());

        let values = [Expr::nat(0), Expr::nat(5)];
        let subgoals = ElimTactics.case_values(&mut mctx, goal, n, &values).unwrap();
        assert_eq!(subgoals.len(), 3);
        assert_eq!(subgoals[1].value, Some(Expr::nat(5)));
        assert_eq!(subgoals[1].subst.apply(&Expr::FVar(n)), Expr::nat(5));
        assert_eq!(subgoals[2].value, None);
        assert_eq!(subgoals[2].hyps.len(), 2);

        let assignment = mctx.is_assigned(goal).unwrap();
        assert_eq!(assignment.app_fn(), &Expr::prim(Prim::Dite));
    }

    #[test]
    fn case_array_sizes_introduces_elements() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let array_type = Expr::app(Expr::prim(Prim::ArrayType), nat());
        let xs = mctx.alloc_local(Symbol::intern("xs"), array_type);
        let goal = goal_with(&mut mctx, &[xs], nat());

        let subgoals = ElimTactics.case_array_sizes(&mut mctx, goal, xs, &[0, 2]).unwrap();
        let sizes = subgoals.iter().map(|sg| sg.size).collect::<Vec<_>>();
        assert_eq!(sizes, [Some(0), Some(2), None]);
        assert_eq!(subgoals[1].elems.len(), 2);
        assert!(matches!(
            subgoals[1].subst.apply(&Expr::FVar(xs)),
            Expr::ArrayLit(_, elems) if elems.len() == 2,
        ));
    }

    #[test]
    fn admit_assigns_sorry() {
        let mut mctx = MetaContext::new(Environment::with_prelude());
        let goal = goal_with(&mut mctx, &[], nat());
        ElimTactics.admit(&mut mctx, goal).unwrap();
        assert_eq!(
            mctx.is_assigned(goal),
            Some(&Expr::app(Expr::prim(Prim::SorryAx), nat())),
        );
        assert!(ElimTactics.admit(&mut mctx, goal).is_err());
    }
}
