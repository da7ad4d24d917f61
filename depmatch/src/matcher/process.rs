//! The steps of the match compiler.

use itertools::Itertools;
use std::sync::Arc;

use crate::core::{Expr, FVarId, Literal, MVarId, Prim};
use crate::matcher::classify::{classify, is_nat_lit, Transition};
use crate::matcher::pattern::{Example, Pattern};
use crate::matcher::problem::{Alt, Problem};
use crate::matcher::{trace, Context, Error};
use crate::meta::{self, FVarSubst, LocalContext};
use crate::symbol::Symbol;
use crate::tactic::Tactics;

impl<'a, T: Tactics> Context<'a, T> {
    /// Compile a problem, assigning its goal.
    pub(super) fn process(&mut self, problem: Problem, depth: usize) -> Result<(), Error> {
        if depth > self.config.max_recursion_depth {
            return Err(Error::RecursionDepthExceeded {
                depth: self.config.max_recursion_depth,
            });
        }

        let transition = classify(&problem)?;
        trace::problem(self.mctx, transition, depth, &problem);

        let successors = match transition {
            Transition::Leaf => return self.process_leaf(problem),
            Transition::Complete => vec![process_complete(problem)],
            Transition::AsPattern => vec![self.process_as_pattern(problem)?],
            Transition::NonVariable => vec![self.process_non_variable(problem)?],
            Transition::Variable => vec![self.process_variable(problem)?],
            Transition::NatLiteral => vec![expand_nat_literals(problem)],
            Transition::Constructor => self.process_constructor(problem)?,
            Transition::Value => self.process_value(problem)?,
            Transition::ArrayLit => self.process_array_lit(problem)?,
        };

        for successor in successors {
            self.process(successor, depth + 1)?;
        }
        Ok(())
    }

    fn process_leaf(&mut self, problem: Problem) -> Result<(), Error> {
        let alt = match problem.alts.into_iter().next() {
            Some(alt) => alt,
            None => {
                self.tactics.admit(self.mctx, problem.goal)?;
                self.record_counterexample(&problem.examples);
                return Ok(());
            }
        };
        if !alt.pending_vars.is_empty() {
            return Err(Error::IllFormed("clause has unbound pattern variables"));
        }

        let rhs = self.mctx.instantiate(&alt.rhs);
        self.mctx.assign(alt.goal, rhs)?;
        self.mctx.assign(problem.goal, Expr::MVar(alt.goal))?;
        match self.subgoals.get_mut(alt.idx) {
            Some(subgoals) => subgoals.push(alt.goal),
            None => return Err(Error::IllFormed("clause index out of range")),
        }
        self.used_alts.insert(alt.idx);
        Ok(())
    }

    fn record_counterexample(&mut self, examples: &[Example]) {
        let examples = examples.iter().map(Example::vars_to_underscore).collect::<Vec<_>>();
        trace::counterexample(self.mctx, &examples);
        self.counterexamples.push(examples);
    }

    fn process_as_pattern(&mut self, problem: Problem) -> Result<Problem, Error> {
        let target = head_target(&problem)?;
        let mut alts = Vec::with_capacity(problem.alts.len());
        for mut alt in problem.alts {
            match take_head(&mut alt)? {
                Pattern::As(var, pattern) => {
                    alt.prepend_patterns([*pattern]);
                    alts.push(alt.bind(self.mctx, var, target.clone())?);
                }
                pattern => {
                    alt.prepend_patterns([pattern]);
                    alts.push(alt);
                }
            }
        }

        Ok(Problem { alts, ..problem })
    }

    fn process_variable(&mut self, problem: Problem) -> Result<Problem, Error> {
        let mut targets = problem.targets;
        let target = targets.remove(0);
        let mut alts = Vec::with_capacity(problem.alts.len());
        for mut alt in problem.alts {
            match take_head(&mut alt)? {
                Pattern::Var(var) => alts.push(alt.bind(self.mctx, var, target.clone())?),
                Pattern::Inaccessible(_) => alts.push(alt),
                _ => return Err(Error::IllFormed("expected a variable or inaccessible pattern")),
            }
        }

        Ok(Problem {
            goal: problem.goal,
            targets,
            alts,
            examples: problem.examples,
        })
    }

    fn process_non_variable(&mut self, problem: Problem) -> Result<Problem, Error> {
        if problem.alts.is_empty() {
            return Err(Error::IllFormed("no clauses for a non-variable target"));
        }

        let mut targets = problem.targets;
        let target = self.mctx.whnf(&self.mctx.instantiate(&targets.remove(0)));
        let has_ctor_head = (problem.alts.iter())
            .any(|alt| matches!(alt.patterns.first(), Some(Pattern::Ctor { .. })));
        let ctor_app = match &target {
            Expr::Lit(_) if !has_ctor_head => None,
            _ => self.mctx.constructor_app(&target),
        };

        let mut alts = Vec::with_capacity(problem.alts.len());
        match (ctor_app, &target) {
            (Some((ctor, args)), _) => {
                let fields = args[ctor.num_params..].to_vec();
                for mut alt in problem.alts {
                    let patterns = match take_head(&mut alt)? {
                        Pattern::Ctor { name, fields, .. } if name == ctor.name => fields,
                        Pattern::Ctor { .. } => continue,
                        Pattern::Var(var) => {
                            alt = alt.bind(self.mctx, var, target.clone())?;
                            inaccessibles(&fields)
                        }
                        Pattern::Inaccessible(expr) => match self.mctx.constructor_app(&expr) {
                            Some((other, args)) if other.name == ctor.name => {
                                inaccessibles(&args[other.num_params..])
                            }
                            Some(_) => continue,
                            None => inaccessibles(&fields),
                        },
                        ref pattern @ Pattern::Lit(ref lit) if is_nat_lit(pattern) => {
                            match self.mctx.constructor_app(lit) {
                                Some((other, args)) if other.name == ctor.name => {
                                    args[other.num_params..].iter().cloned().map(Pattern::Lit).collect()
                                }
                                _ => continue,
                            }
                        }
                        _ => return Err(unsupported_column(&alt)),
                    };
                    alt.prepend_patterns(patterns);
                    alts.push(alt);
                }
                targets = fields.into_iter().chain(targets).collect();
            }
            (None, Expr::ArrayLit(_, elems)) => {
                for mut alt in problem.alts {
                    let patterns = match take_head(&mut alt)? {
                        Pattern::ArrayLit(_, patterns) if patterns.len() == elems.len() => patterns,
                        Pattern::ArrayLit(..) => continue,
                        Pattern::Var(var) => {
                            alt = alt.bind(self.mctx, var, target.clone())?;
                            inaccessibles(elems)
                        }
                        Pattern::Inaccessible(_) => inaccessibles(elems),
                        _ => return Err(unsupported_column(&alt)),
                    };
                    alt.prepend_patterns(patterns);
                    alts.push(alt);
                }
                targets = elems.iter().cloned().chain(targets).collect();
            }
            (None, _) => {
                for mut alt in problem.alts {
                    match take_head(&mut alt)? {
                        Pattern::Var(var) => alt = alt.bind(self.mctx, var, target.clone())?,
                        Pattern::Inaccessible(_) => {}
                        Pattern::Lit(lit) if self.mctx.is_def_eq(&lit, &target) => {}
                        Pattern::Lit(_) => continue,
                        _ => return Err(unsupported_column(&alt)),
                    }
                    alts.push(alt);
                }
            }
        }

        Ok(Problem {
            goal: problem.goal,
            targets,
            alts,
            examples: problem.examples,
        })
    }

    fn process_constructor(&mut self, problem: Problem) -> Result<Vec<Problem>, Error> {
        let (target_expr, target) = head_var(&problem)?;
        let target_type = self.mctx.local_type(target)?;
        if self.mctx.inductive_app(&target_type).is_none() {
            let ctor_alt = (problem.alts.iter())
                .find(|alt| matches!(alt.patterns.first(), Some(Pattern::Ctor { .. })));
            return Err(Error::NonInductiveScrutinee {
                target: self.mctx.render(&target_expr),
                r#type: self.mctx.render(&self.mctx.whnf(&target_type)),
                range: ctor_alt.and_then(|alt| alt.range),
            });
        }

        let subgoals = self.tactics.cases(self.mctx, problem.goal, target)?;
        tracing::debug!(
            target: "depmatch::matcher",
            scrutinee = %self.mctx.render(&target_expr),
            cases = subgoals.len(),
            "split on constructors"
        );

        let mut successors = Vec::with_capacity(subgoals.len());
        for subgoal in subgoals {
            let lctx = self.mctx.meta_decl(subgoal.goal)?.lctx.clone();
            let ctor = match self.mctx.env().constructor(subgoal.ctor) {
                Some(ctor) => ctor.clone(),
                None => return Err(meta::Error::UnknownConstant(subgoal.ctor).into()),
            };
            let value = subgoal.subst.apply(&target_expr);
            let params = value.app_args().into_iter().take(ctor.num_params).cloned();
            let params = params.collect::<Vec<_>>();

            let mut alts = Vec::new();
            for alt in &problem.alts {
                match alt.patterns.first() {
                    Some(Pattern::Ctor { name, .. }) if *name != ctor.name => continue,
                    Some(Pattern::Inaccessible(expr)) => match self.mctx.constructor_app(expr) {
                        Some((other, _)) if other.name != ctor.name => continue,
                        _ => {}
                    },
                    _ => {}
                }

                let mut alt = alt.copy_with(self.mctx, &lctx, &subgoal.subst)?;
                let patterns = match take_head(&mut alt)? {
                    Pattern::Ctor { fields, .. } => fields,
                    Pattern::Var(var) => {
                        let wildcards = self.alloc_wildcards(&subgoal.fields)?;
                        alt.pending_vars.extend(&wildcards);
                        let value = Expr::apps(
                            Expr::constant(ctor.name),
                            (params.iter().cloned())
                                .chain(wildcards.iter().map(|var| Expr::FVar(*var))),
                        );
                        alt = alt.bind(self.mctx, var, value)?;
                        wildcards.into_iter().map(Pattern::Var).collect()
                    }
                    Pattern::Inaccessible(expr) => match self.mctx.constructor_app(&expr) {
                        Some((_, args)) => inaccessibles(&args[ctor.num_params..]),
                        None => inaccessibles(&subgoal.fields),
                    },
                    _ => return Err(Error::IllFormed("expected a constructor pattern")),
                };
                alt.prepend_patterns(patterns);
                alts.push(alt);
            }

            let env = self.mctx.env();
            let fields = (subgoal.fields.iter())
                .map(|field| Example::of_expr(env, field))
                .collect();
            let example = Example::Ctor(ctor.name, fields);
            let examples = (problem.examples.iter())
                .map(|e| e.replace_var(target, &example).apply_fvar_subst(env, &subgoal.subst))
                .collect::<Vec<_>>();

            if alts.is_empty() {
                self.tactics.admit(self.mctx, subgoal.goal)?;
                self.record_counterexample(&examples);
                continue;
            }

            let rest = problem.targets[1..].iter().map(|t| subgoal.subst.apply(t));
            successors.push(Problem {
                goal: subgoal.goal,
                targets: subgoal.fields.iter().cloned().chain(rest).collect(),
                alts,
                examples,
            });
        }

        Ok(successors)
    }

    fn process_value(&mut self, problem: Problem) -> Result<Vec<Problem>, Error> {
        let (target_expr, target) = head_var(&problem)?;
        let values = (problem.alts.iter())
            .filter_map(|alt| match alt.patterns.first() {
                Some(Pattern::Lit(value)) => Some(value.clone()),
                _ => None,
            })
            .unique()
            .collect::<Vec<_>>();

        let subgoals = self.tactics.case_values(self.mctx, problem.goal, target, &values)?;
        tracing::debug!(
            target: "depmatch::matcher",
            scrutinee = %self.mctx.render(&target_expr),
            values = values.len(),
            "split on values"
        );

        let mut successors = Vec::with_capacity(subgoals.len());
        for subgoal in subgoals {
            let lctx = self.mctx.meta_decl(subgoal.goal)?.lctx.clone();
            let value = match subgoal.value {
                Some(value) => value,
                None => {
                    let default = self.default_branch(&problem, subgoal.goal, &lctx, &subgoal.subst)?;
                    successors.extend(default);
                    continue;
                }
            };

            let mut alts = Vec::new();
            for alt in &problem.alts {
                match alt.patterns.first() {
                    Some(Pattern::Lit(lit)) if !self.mctx.is_def_eq(lit, &value) => continue,
                    _ => {}
                }
                let mut alt = alt.copy_with(self.mctx, &lctx, &subgoal.subst)?;
                match take_head(&mut alt)? {
                    Pattern::Var(var) => alt = alt.bind(self.mctx, var, value.clone())?,
                    Pattern::Inaccessible(_) | Pattern::Lit(_) => {}
                    _ => return Err(Error::IllFormed("expected a literal pattern")),
                }
                alts.push(alt);
            }

            let env = self.mctx.env();
            let example = Example::Lit(value);
            let examples = (problem.examples.iter())
                .map(|e| e.replace_var(target, &example).apply_fvar_subst(env, &subgoal.subst))
                .collect::<Vec<_>>();

            if alts.is_empty() {
                self.tactics.admit(self.mctx, subgoal.goal)?;
                self.record_counterexample(&examples);
                continue;
            }

            let rest = problem.targets[1..].iter().map(|t| subgoal.subst.apply(t));
            successors.push(Problem {
                goal: subgoal.goal,
                targets: rest.collect(),
                alts,
                examples,
            });
        }

        Ok(successors)
    }

    fn process_array_lit(&mut self, problem: Problem) -> Result<Vec<Problem>, Error> {
        let (target_expr, target) = head_var(&problem)?;
        let sizes = (problem.alts.iter())
            .filter_map(|alt| match alt.patterns.first() {
                Some(Pattern::ArrayLit(_, elems)) => Some(elems.len()),
                _ => None,
            })
            .unique()
            .collect::<Vec<_>>();

        let subgoals = self.tactics.case_array_sizes(self.mctx, problem.goal, target, &sizes)?;
        tracing::debug!(
            target: "depmatch::matcher",
            scrutinee = %self.mctx.render(&target_expr),
            sizes = ?sizes,
            "split on array sizes"
        );

        let mut successors = Vec::with_capacity(subgoals.len());
        for subgoal in subgoals {
            let lctx = self.mctx.meta_decl(subgoal.goal)?.lctx.clone();
            let size = match subgoal.size {
                Some(size) => size,
                None => {
                    let default = self.default_branch(&problem, subgoal.goal, &lctx, &subgoal.subst)?;
                    successors.extend(default);
                    continue;
                }
            };
            let elem_type = match subgoal.subst.apply(&target_expr) {
                Expr::ArrayLit(elem_type, _) => elem_type.as_ref().clone(),
                _ => return Err(Error::IllFormed("array split did not produce an array literal")),
            };

            let mut alts = Vec::new();
            for alt in &problem.alts {
                match alt.patterns.first() {
                    Some(Pattern::ArrayLit(_, elems)) if elems.len() != size => continue,
                    _ => {}
                }
                let mut alt = alt.copy_with(self.mctx, &lctx, &subgoal.subst)?;
                let patterns = match take_head(&mut alt)? {
                    Pattern::ArrayLit(_, elems) => elems,
                    Pattern::Var(var) => {
                        let wildcards = self.alloc_wildcards(&subgoal.elems)?;
                        alt.pending_vars.extend(&wildcards);
                        let value = Expr::array_lit(
                            elem_type.clone(),
                            wildcards.iter().map(|var| Expr::FVar(*var)).collect(),
                        );
                        alt = alt.bind(self.mctx, var, value)?;
                        wildcards.into_iter().map(Pattern::Var).collect()
                    }
                    Pattern::Inaccessible(_) => inaccessibles(&subgoal.elems),
                    _ => return Err(Error::IllFormed("expected an array literal pattern")),
                };
                alt.prepend_patterns(patterns);
                alts.push(alt);
            }

            let env = self.mctx.env();
            let elems = (subgoal.elems.iter())
                .map(|elem| Example::of_expr(env, elem))
                .collect();
            let example = Example::ArrayLit(elems);
            let examples = (problem.examples.iter())
                .map(|e| e.replace_var(target, &example).apply_fvar_subst(env, &subgoal.subst))
                .collect::<Vec<_>>();

            if alts.is_empty() {
                self.tactics.admit(self.mctx, subgoal.goal)?;
                self.record_counterexample(&examples);
                continue;
            }

            let rest = problem.targets[1..].iter().map(|t| subgoal.subst.apply(t));
            successors.push(Problem {
                goal: subgoal.goal,
                targets: subgoal.elems.iter().cloned().chain(rest).collect(),
                alts,
                examples,
            });
        }

        Ok(successors)
    }

    /// The branch where the target matched none of the split values. Only
    /// clauses with a variable or inaccessible pattern survive, and the
    /// target is kept for them to bind.
    fn default_branch(
        &mut self,
        problem: &Problem,
        goal: MVarId,
        lctx: &LocalContext,
        subst: &FVarSubst,
    ) -> Result<Option<Problem>, Error> {
        let mut alts = Vec::new();
        for alt in &problem.alts {
            if matches!(
                alt.patterns.first(),
                Some(Pattern::Var(_) | Pattern::Inaccessible(_)),
            ) {
                alts.push(alt.copy_with(self.mctx, lctx, subst)?);
            }
        }

        let env = self.mctx.env();
        let examples = (problem.examples.iter())
            .map(|example| example.apply_fvar_subst(env, subst))
            .collect::<Vec<_>>();

        if alts.is_empty() {
            self.tactics.admit(self.mctx, goal)?;
            self.record_counterexample(&examples);
            return Ok(None);
        }

        Ok(Some(Problem {
            goal,
            targets: problem.targets.iter().map(|t| subst.apply(t)).collect(),
            alts,
            examples,
        }))
    }

    /// Fresh pattern variables standing for `exprs`, named after them where
    /// possible.
    fn alloc_wildcards(&mut self, exprs: &[Expr]) -> Result<Vec<FVarId>, Error> {
        let mut wildcards = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let r#type = self.mctx.infer_type(expr)?;
            let name = match expr.as_fvar() {
                Some(var) => self.mctx.local_decl(var)?.name,
                None => Symbol::intern("_"),
            };
            wildcards.push(self.mctx.alloc_local(name, r#type));
        }
        Ok(wildcards)
    }
}

fn process_complete(problem: Problem) -> Problem {
    Problem {
        targets: Vec::new(),
        ..problem
    }
}

/// Rewrite `Nat` literals in the first column to constructor patterns, one
/// constructor at a time.
fn expand_nat_literals(mut problem: Problem) -> Problem {
    for alt in &mut problem.alts {
        if let Some(pattern) = alt.patterns.first_mut() {
            let value = match pattern {
                Pattern::Lit(Expr::Lit(Literal::Nat(value))) => *value,
                _ => continue,
            };
            let (name, fields) = match value {
                0 => (Prim::NatZero, Vec::new()),
                value => (Prim::NatSucc, vec![Pattern::Lit(Expr::nat(value - 1))]),
            };
            *pattern = Pattern::Ctor {
                name: name.symbol(),
                levels: Arc::from(Vec::new()),
                params: Vec::new(),
                fields,
            };
        }
    }
    problem
}

fn take_head(alt: &mut Alt) -> Result<Pattern, Error> {
    match alt.patterns.is_empty() {
        true => Err(Error::IllFormed("clause has fewer patterns than targets")),
        false => Ok(alt.patterns.remove(0)),
    }
}

fn head_target(problem: &Problem) -> Result<Expr, Error> {
    match problem.targets.first() {
        Some(target) => Ok(target.clone()),
        None => Err(Error::IllFormed("no targets left to match")),
    }
}

fn head_var(problem: &Problem) -> Result<(Expr, FVarId), Error> {
    let target = head_target(problem)?;
    match target.as_fvar() {
        Some(var) => Ok((target, var)),
        None => Err(Error::IllFormed("expected the target to be a local variable")),
    }
}

fn inaccessibles(exprs: &[Expr]) -> Vec<Pattern> {
    exprs.iter().cloned().map(Pattern::Inaccessible).collect()
}

fn unsupported_column(alt: &Alt) -> Error {
    Error::UnsupportedColumn {
        alt: alt.idx,
        range: alt.range,
    }
}
