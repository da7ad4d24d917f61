//! Elaboration of problem files into declarations and match problems.
//!
//! Inductive types are added to the environment as they are elaborated, in
//! file order. Matches are elaborated into the arguments of
//! [`mk_elim`][crate::matcher::mk_elim], but are not compiled here.
//!
//! Clauses are elaborated from left to right against the types of the
//! targets, refined by the patterns to their left. Inaccessible terms may
//! mention pattern variables bound anywhere in the clause, so they are
//! elaborated after the rest of the clause, through placeholder
//! metavariables.

use fxhash::FxHashMap;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use toml::Spanned;

use crate::core::decl::{ConstructorVal, Environment, InductiveVal};
use crate::core::{Expr, FVarId, MVarId, Prim};
use crate::matcher::pattern::Pattern;
use crate::matcher::AltLhs;
use crate::meta::{self, FVarSubst, LocalContext, MetaContext};
use crate::source::{BytePos, ByteRange, FileId, FileRange};
use crate::surface::{Binder, Term};
use crate::symbol::Symbol;

mod reporting;

pub use self::reporting::Message;

/// The contents of a problem file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Module {
    #[serde(default, rename = "inductive")]
    pub inductives: Vec<InductiveItem>,
    #[serde(default, rename = "match")]
    pub matches: Vec<MatchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InductiveItem {
    pub name: Spanned<String>,
    #[serde(default)]
    pub params: Vec<Spanned<String>>,
    #[serde(default)]
    pub indices: Vec<Spanned<String>>,
    #[serde(default)]
    pub ctors: Vec<CtorItem>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CtorItem {
    pub name: Spanned<String>,
    #[serde(default)]
    pub fields: Vec<Spanned<String>>,
    /// The indices of the constructed value.
    #[serde(default)]
    pub indices: Vec<Spanned<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchItem {
    pub name: Spanned<String>,
    #[serde(default)]
    pub context: Vec<Spanned<String>>,
    pub targets: Vec<Spanned<String>>,
    pub motive: Spanned<String>,
    pub alts: Vec<Spanned<AltItem>>,
}

/// A clause, written either as an array of patterns or as a table with
/// `patterns` and an optional `rhs`.
#[derive(Debug)]
pub struct AltItem {
    pub patterns: Vec<Spanned<String>>,
    pub rhs: Option<Spanned<String>>,
}

impl<'de> Deserialize<'de> for AltItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<AltItem, D::Error> {
        deserializer.deserialize_any(AltItemVisitor)
    }
}

struct AltItemVisitor;

impl<'de> Visitor<'de> for AltItemVisitor {
    type Value = AltItem;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of patterns, or a table with `patterns` and `rhs`")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<AltItem, A::Error> {
        let mut patterns = Vec::new();
        while let Some(pattern) = seq.next_element()? {
            patterns.push(pattern);
        }
        Ok(AltItem {
            patterns,
            rhs: None,
        })
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<AltItem, A::Error> {
        const FIELDS: &[&str] = &["patterns", "rhs"];

        let mut patterns = None;
        let mut rhs = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "patterns" => patterns = Some(map.next_value()?),
                "rhs" => rhs = Some(map.next_value()?),
                key => return Err(de::Error::unknown_field(key, FIELDS)),
            }
        }
        Ok(AltItem {
            patterns: patterns.ok_or_else(|| de::Error::missing_field("patterns"))?,
            rhs,
        })
    }
}

/// A match, ready to be compiled.
#[derive(Debug, Clone)]
pub struct Match {
    pub name: Symbol,
    pub range: FileRange,
    pub lctx: LocalContext,
    pub targets: Vec<FVarId>,
    pub motive: Expr,
    pub alts: Vec<AltLhs>,
}

type Elab<T> = Result<T, Message>;

/// Pattern variables bound so far in a clause.
#[derive(Default)]
struct ClauseState {
    bound: FxHashMap<Symbol, FileRange>,
    pending_vars: Vec<FVarId>,
    /// Placeholders for inaccessible terms.
    deferred: Vec<(MVarId, Term)>,
}

/// Elaboration context.
pub struct Context<'source> {
    file_id: FileId,
    source: &'source str,
    mctx: MetaContext,
    /// Locals in scope, innermost last.
    locals: Vec<(Symbol, FVarId)>,
    /// The inductive type whose constructors are being elaborated.
    declaring: Option<Symbol>,
    match_names: FxHashMap<Symbol, FileRange>,
    messages: Vec<Message>,
}

impl<'source> Context<'source> {
    pub fn new(file_id: FileId, source: &'source str, env: Environment) -> Context<'source> {
        Context {
            file_id,
            source,
            mctx: MetaContext::new(env),
            locals: Vec::new(),
            declaring: None,
            match_names: FxHashMap::default(),
            messages: Vec::new(),
        }
    }

    pub fn meta_context(&mut self) -> &mut MetaContext {
        &mut self.mctx
    }

    pub fn into_meta_context(self) -> MetaContext {
        self.mctx
    }

    /// Drain the recorded messages.
    pub fn handle_messages(&mut self, on_message: &mut dyn FnMut(Message)) {
        self.messages.drain(..).for_each(on_message);
    }

    /// Elaborate the problem file, adding its inductive types to the
    /// environment. Matches with errors are reported and skipped.
    pub fn elab_module(&mut self, on_message: &mut dyn FnMut(Message)) -> Vec<Match> {
        let module = match toml::from_str::<Module>(self.source) {
            Ok(module) => module,
            Err(error) => {
                let range = (error.line_col()).map(|(line, col)| self.line_col_range(line, col));
                on_message(Message::Toml {
                    range,
                    message: error.to_string(),
                });
                return Vec::new();
            }
        };

        for item in &module.inductives {
            if let Err(message) = self.elab_inductive(item) {
                self.messages.push(message);
            }
        }
        let matches = (module.matches.iter())
            .filter_map(|item| self.elab_match(item))
            .collect();

        self.handle_messages(on_message);
        matches
    }

    fn line_col_range(&self, line: usize, col: usize) -> FileRange {
        let line_start = (self.source.split_inclusive('\n'))
            .take(line)
            .map(str::len)
            .sum::<usize>();
        let start = usize::min(line_start + col, self.source.len());
        let end = usize::min(start + 1, self.source.len());
        FileRange::new(self.file_id, ByteRange::from(start..end))
    }

    fn span_range<T>(&self, spanned: &Spanned<T>) -> FileRange {
        FileRange::new(
            self.file_id,
            ByteRange::new(spanned.start() as BytePos, spanned.end() as BytePos),
        )
    }

    /// The offset of the contents of a string value.
    fn string_offset(&self, spanned: &Spanned<String>) -> BytePos {
        let quoted = &self.source[spanned.start()..];
        let quote_len = match quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
            true => 3,
            false => 1,
        };
        (spanned.start() + quote_len) as BytePos
    }

    fn parse_term(&self, spanned: &Spanned<String>) -> Elab<Term> {
        let offset = self.string_offset(spanned);
        Ok(Term::parse(self.file_id, offset, spanned.get_ref())?)
    }

    fn parse_binder(&self, spanned: &Spanned<String>) -> Elab<Binder> {
        let offset = self.string_offset(spanned);
        Ok(Binder::parse(self.file_id, offset, spanned.get_ref())?)
    }

    fn render(&self, expr: &Expr) -> String {
        self.mctx.render(expr)
    }

    fn ill_typed(range: FileRange) -> impl Fn(meta::Error) -> Message {
        move |error| Message::IllTyped {
            range,
            message: error.to_string(),
        }
    }

    // Scopes

    fn lookup_local(&self, name: Symbol) -> Option<FVarId> {
        let mut locals = self.locals.iter().rev();
        locals.find(|(n, _)| *n == name).map(|(_, var)| *var)
    }

    fn suggest(name: Symbol, candidates: impl Iterator<Item = Symbol>) -> Option<Symbol> {
        let name = name.resolve();
        let max_distance = usize::max(1, name.len() / 3);
        candidates
            .map(|candidate| (levenshtein::levenshtein(name, candidate.resolve()), candidate))
            .filter(|(distance, _)| *distance <= max_distance)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, candidate)| candidate)
    }

    /// Elaborate binders, bringing each into scope for the following ones.
    fn elab_binders(&mut self, binders: &[Spanned<String>]) -> Elab<Vec<FVarId>> {
        let mut vars = Vec::with_capacity(binders.len());
        for binder in binders {
            let binder = self.parse_binder(binder)?;
            let r#type = self.elab_term(&binder.r#type)?;
            let var = self.mctx.alloc_local(binder.name.1, r#type);
            self.locals.push((binder.name.1, var));
            vars.push(var);
        }
        Ok(vars)
    }

    // Declarations

    fn elab_inductive(&mut self, item: &InductiveItem) -> Elab<()> {
        let scope_len = self.locals.len();
        let result = self.elab_inductive_scoped(item);
        self.locals.truncate(scope_len);
        self.declaring = None;
        result
    }

    fn elab_inductive_scoped(&mut self, item: &InductiveItem) -> Elab<()> {
        let range = self.span_range(&item.name);
        let name = Symbol::intern(item.name.get_ref());
        let _span = tracing::debug_span!("elab_inductive", %name).entered();

        let params = self.elab_binders(&item.params)?;
        let params_len = self.locals.len();
        let indices = self.elab_binders(&item.indices)?;
        let binders = [params.as_slice(), indices.as_slice()].concat();
        let r#type = (self.mctx.mk_pi(&binders, &Expr::r#type())).map_err(Self::ill_typed(range))?;
        self.locals.truncate(params_len);

        self.declaring = Some(name);
        let mut ctors = Vec::with_capacity(item.ctors.len());
        for (cidx, ctor) in item.ctors.iter().enumerate() {
            let ctor_range = self.span_range(&ctor.name);
            let ctor_name = name.child(ctor.name.get_ref());
            if ctors.iter().any(|ctor: &ConstructorVal| ctor.name == ctor_name) {
                return Err(Message::Declaration {
                    range: ctor_range,
                    error: crate::core::decl::Error::AlreadyDeclared(ctor_name),
                });
            }
            if ctor.indices.len() != indices.len() {
                return Err(Message::MismatchedIndices {
                    range: ctor_range,
                    ctor: ctor_name,
                    expected: indices.len(),
                    found: ctor.indices.len(),
                });
            }

            let fields = self.elab_binders(&ctor.fields)?;
            let mut args = params.iter().map(|var| Expr::FVar(*var)).collect::<Vec<_>>();
            for index in &ctor.indices {
                let index = self.parse_term(index)?;
                args.push(self.elab_term(&index)?);
            }
            let result_type = Expr::apps(Expr::constant(name), args);
            let binders = [params.as_slice(), fields.as_slice()].concat();
            let ctor_type = self.mctx.mk_pi(&binders, &result_type).map_err(Self::ill_typed(ctor_range))?;
            self.locals.truncate(params_len);

            ctors.push(ConstructorVal {
                name: ctor_name,
                induct: name,
                cidx,
                num_params: params.len(),
                num_fields: fields.len(),
                r#type: ctor_type,
            });
        }

        let inductive = InductiveVal {
            name,
            r#type,
            num_params: params.len(),
            num_indices: indices.len(),
            ctors: ctors.iter().map(|ctor| ctor.name).collect(),
        };
        (self.mctx.env_mut())
            .add_inductive(inductive, ctors)
            .map_err(|error| Message::Declaration { range, error })?;
        tracing::debug!(%name, "declared inductive type");
        Ok(())
    }

    fn elab_match(&mut self, item: &MatchItem) -> Option<Match> {
        let range = self.span_range(&item.name);
        let name = Symbol::intern(item.name.get_ref());
        let _span = tracing::debug_span!("elab_match", %name).entered();

        if self.mctx.env().contains(name) || self.match_names.contains_key(&name) {
            let error = crate::core::decl::Error::AlreadyDeclared(name);
            self.messages.push(Message::Declaration { range, error });
            return None;
        }
        self.match_names.insert(name, range);

        let scope_len = self.locals.len();
        let result = self.elab_match_scoped(name, range, item);
        self.locals.truncate(scope_len);
        result
    }

    fn elab_match_scoped(&mut self, name: Symbol, range: FileRange, item: &MatchItem) -> Option<Match> {
        let (context, targets, motive) = match self.elab_match_header(item) {
            Ok(header) => header,
            Err(message) => {
                self.messages.push(message);
                return None;
            }
        };

        let lctx = (context.iter().chain(&targets)).fold(LocalContext::new(), |lctx, var| lctx.with(*var));
        let mut alts = Vec::with_capacity(item.alts.len());
        let mut failed = false;
        for alt in &item.alts {
            let scope_len = self.locals.len();
            match self.elab_alt(&lctx, &targets, alt) {
                Ok(alt) => alts.push(alt),
                Err(message) => {
                    self.messages.push(message);
                    failed = true;
                }
            }
            self.locals.truncate(scope_len);
        }

        (!failed).then(|| Match {
            name,
            range,
            lctx,
            targets,
            motive,
            alts,
        })
    }

    fn elab_match_header(&mut self, item: &MatchItem) -> Elab<(Vec<FVarId>, Vec<FVarId>, Expr)> {
        let context = self.elab_binders(&item.context)?;
        let targets = self.elab_binders(&item.targets)?;
        let motive_range = self.span_range(&item.motive);
        let motive_type = self.parse_term(&item.motive)?;
        let motive_type = self.elab_term(&motive_type)?;
        let motive = (self.mctx.mk_lambda(&targets, &motive_type))
            .map_err(Self::ill_typed(motive_range))?;
        Ok((context, targets, motive))
    }

    fn elab_alt(
        &mut self,
        lctx: &LocalContext,
        targets: &[FVarId],
        alt: &Spanned<AltItem>,
    ) -> Elab<AltLhs> {
        let range = self.span_range(alt);
        let alt = alt.get_ref();
        let mut clause = ClauseState::default();
        let mut subst = FVarSubst::new();
        let mut patterns = Vec::with_capacity(alt.patterns.len());

        for (position, pattern) in alt.patterns.iter().enumerate() {
            let pattern = self.parse_term(pattern)?;
            // Surplus patterns are checked against an unknown type, leaving
            // the arity error to the compiler.
            let expected_type = match targets.get(position) {
                Some(target) => subst.apply(&self.mctx.local_type(*target).map_err(Self::ill_typed(range))?),
                None => Expr::MVar(self.mctx.alloc_fresh_var(lctx.clone(), Expr::r#type())),
            };
            let pattern = self.elab_pattern(&mut clause, &pattern, &expected_type)?;
            if let Some(target) = targets.get(position) {
                subst.insert(*target, pattern.to_expr());
            }
            patterns.push(pattern);
        }

        for (placeholder, term) in std::mem::take(&mut clause.deferred) {
            let expr = self.elab_term(&term)?;
            (self.mctx.assign(placeholder, expr)).map_err(Self::ill_typed(term.range()))?;
        }
        let mctx = &self.mctx;
        let patterns = (patterns.iter())
            .map(|pattern| pattern.map_exprs(&mut |expr| mctx.instantiate(expr)))
            .collect();
        for var in &clause.pending_vars {
            self.mctx.instantiate_local_type(*var).map_err(Self::ill_typed(range))?;
        }

        let rhs = match &alt.rhs {
            Some(rhs) => {
                let rhs = self.parse_term(rhs)?;
                Some(self.elab_term(&rhs)?)
            }
            None => None,
        };

        Ok(AltLhs {
            range: Some(range),
            pending_vars: clause.pending_vars,
            patterns,
            rhs,
        })
    }

    // Patterns

    fn elab_pattern(
        &mut self,
        clause: &mut ClauseState,
        pattern: &Term,
        expected_type: &Expr,
    ) -> Elab<Pattern> {
        match pattern {
            Term::Paren(_, pattern) => self.elab_pattern(clause, pattern, expected_type),
            Term::Hole(_) => {
                let var = self.mctx.alloc_local(Symbol::intern("_"), expected_type.clone());
                clause.pending_vars.push(var);
                Ok(Pattern::Var(var))
            }
            Term::Name(range, name) => match self.resolve_ctor(*name, expected_type) {
                Some(ctor) => self.elab_ctor_pattern(clause, *range, ctor, &[], expected_type),
                None if is_var_name(*name) => {
                    let var = self.bind_pattern_var(clause, *range, *name, expected_type)?;
                    Ok(Pattern::Var(var))
                }
                None => Err(self.unknown_ctor(*range, *name)),
            },
            Term::App(range, head, args) => match head.as_ref() {
                Term::Name(head_range, name) => match self.resolve_ctor(*name, expected_type) {
                    Some(ctor) => self.elab_ctor_pattern(clause, *range, ctor, args, expected_type),
                    None => Err(self.unknown_ctor(*head_range, *name)),
                },
                head => Err(Message::InvalidPattern {
                    range: head.range(),
                }),
            },
            Term::NatLiteral(range, value) => {
                self.check_literal(*range, Prim::NatType, expected_type)?;
                Ok(Pattern::Lit(Expr::nat(*value)))
            }
            Term::StringLiteral(range, value) => {
                self.check_literal(*range, Prim::StringType, expected_type)?;
                Ok(Pattern::Lit(Expr::string(value)))
            }
            Term::ArrayLiteral(range, elems) => {
                let elem_type = match self.mctx.whnf(expected_type) {
                    Expr::App(head, elem_type) if *head == Expr::prim(Prim::ArrayType) => {
                        elem_type.as_ref().clone()
                    }
                    _ => {
                        return Err(Message::ArrayLiteralNotSupported {
                            range: *range,
                            expected_type: self.render(expected_type),
                        })
                    }
                };
                let elems = (elems.iter())
                    .map(|elem| self.elab_pattern(clause, elem, &elem_type))
                    .collect::<Elab<_>>()?;
                Ok(Pattern::ArrayLit(elem_type, elems))
            }
            Term::As(_, (range, name), pattern) => {
                let var = self.bind_pattern_var(clause, *range, *name, expected_type)?;
                let pattern = self.elab_pattern(clause, pattern, expected_type)?;
                Ok(Pattern::As(var, Box::new(pattern)))
            }
            Term::Inaccessible(_, term) => {
                let placeholder = self.mctx.alloc_fresh_var(LocalContext::new(), expected_type.clone());
                clause.deferred.push((placeholder, term.as_ref().clone()));
                Ok(Pattern::Inaccessible(Expr::MVar(placeholder)))
            }
            Term::Type(range) | Term::Prop(range) => Err(Message::InvalidPattern { range: *range }),
        }
    }

    /// Resolve a constructor by its full name, or by its name relative to the
    /// expected inductive type.
    fn resolve_ctor(&self, name: Symbol, expected_type: &Expr) -> Option<Symbol> {
        if self.mctx.env().constructor(name).is_some() {
            return Some(name);
        }
        let (inductive, _, _) = self.mctx.inductive_app(expected_type)?;
        let name = inductive.name.child(name.resolve());
        self.mctx.env().constructor(name).map(|ctor| ctor.name)
    }

    fn unknown_ctor(&self, range: FileRange, name: Symbol) -> Message {
        let env = self.mctx.env();
        let ctors = env.names().filter(|name| env.constructor(*name).is_some());
        Message::UnknownConstructor {
            range,
            name,
            suggestion: Self::suggest(name, ctors),
        }
    }

    fn bind_pattern_var(
        &mut self,
        clause: &mut ClauseState,
        range: FileRange,
        name: Symbol,
        r#type: &Expr,
    ) -> Elab<FVarId> {
        if let Some(first_range) = clause.bound.get(&name) {
            return Err(Message::DuplicatePatternVar {
                range,
                first_range: *first_range,
                name,
            });
        }
        clause.bound.insert(name, range);
        let var = self.mctx.alloc_local(name, r#type.clone());
        self.locals.push((name, var));
        clause.pending_vars.push(var);
        Ok(var)
    }

    fn elab_ctor_pattern(
        &mut self,
        clause: &mut ClauseState,
        range: FileRange,
        ctor: Symbol,
        args: &[Term],
        expected_type: &Expr,
    ) -> Elab<Pattern> {
        let ctor = match self.mctx.env().constructor(ctor) {
            Some(ctor) => ctor.clone(),
            None => return Err(self.unknown_ctor(range, ctor)),
        };
        let (inductive, params, _) = match self.mctx.inductive_app(expected_type) {
            Some(app) => app,
            None => {
                return Err(Message::NonInductivePattern {
                    range,
                    ctor: ctor.name,
                    expected_type: self.render(expected_type),
                })
            }
        };
        if inductive.name != ctor.induct {
            return Err(Message::MismatchedConstructor {
                range,
                ctor: ctor.name,
                expected_type: self.render(expected_type),
            });
        }
        if args.len() != ctor.num_fields {
            return Err(Message::ConstructorArity {
                range,
                ctor: ctor.name,
                expected: ctor.num_fields,
                found: args.len(),
            });
        }

        let mut field_type = (self.mctx.instantiate_pis(&ctor.r#type, &params))
            .map_err(Self::ill_typed(range))?;
        let mut fields = Vec::with_capacity(args.len());
        for arg in args {
            let (arg_type, body) = match self.mctx.whnf(&field_type) {
                Expr::Pi(_, arg_type, body) => (arg_type, body),
                r#type => {
                    return Err(Message::IllTyped {
                        range: arg.range(),
                        message: format!("expected a function type, found `{}`", self.render(&r#type)),
                    })
                }
            };
            let field = self.elab_pattern(clause, arg, &arg_type)?;
            field_type = body.instantiate1(&field.to_expr());
            fields.push(field);
        }

        Ok(Pattern::Ctor {
            name: ctor.name,
            levels: Arc::from(Vec::new()),
            params,
            fields,
        })
    }

    fn check_literal(&self, range: FileRange, prim: Prim, expected_type: &Expr) -> Elab<()> {
        match self.mctx.is_def_eq(expected_type, &Expr::prim(prim)) {
            true => Ok(()),
            false => Err(Message::LiteralNotSupported {
                range,
                expected_type: self.render(expected_type),
            }),
        }
    }

    // Terms

    fn elab_term(&mut self, term: &Term) -> Elab<Expr> {
        match term {
            Term::Name(range, name) => {
                if let Some(var) = self.lookup_local(*name) {
                    return Ok(Expr::FVar(var));
                }
                if self.mctx.env().contains(*name) || self.declaring == Some(*name) {
                    return Ok(Expr::constant(*name));
                }
                let locals = self.locals.iter().map(|(name, _)| *name);
                let candidates = locals.chain(self.mctx.env().names());
                Err(Message::UnboundName {
                    range: *range,
                    name: *name,
                    suggestion: Self::suggest(*name, candidates),
                })
            }
            Term::Hole(range) => Err(Message::HoleInTerm { range: *range }),
            Term::Type(_) => Ok(Expr::r#type()),
            Term::Prop(_) => Ok(Expr::prop()),
            Term::NatLiteral(_, value) => Ok(Expr::nat(*value)),
            Term::StringLiteral(_, value) => Ok(Expr::string(value)),
            Term::App(_, head, args) => {
                let head = self.elab_term(head)?;
                let args = args.iter().map(|arg| self.elab_term(arg)).collect::<Elab<Vec<_>>>()?;
                Ok(Expr::apps(head, args))
            }
            Term::Paren(_, term) => self.elab_term(term),
            Term::ArrayLiteral(range, elems) => {
                let elems = elems.iter().map(|elem| self.elab_term(elem)).collect::<Elab<Vec<_>>>()?;
                let elem_type = match elems.first() {
                    Some(elem) => self.mctx.infer_type(elem).map_err(Self::ill_typed(*range))?,
                    None => return Err(Message::AmbiguousArrayLiteral { range: *range }),
                };
                Ok(Expr::array_lit(elem_type, elems))
            }
            Term::As(range, _, _) | Term::Inaccessible(range, _) => {
                Err(Message::PatternInTerm { range: *range })
            }
        }
    }
}

/// Unknown names are pattern variables when they are not qualified and do
/// not start with an upper-case letter.
fn is_var_name(name: Symbol) -> bool {
    let name = name.resolve();
    !name.contains('.') && name.chars().next().map_or(false, |c| !c.is_uppercase())
}
