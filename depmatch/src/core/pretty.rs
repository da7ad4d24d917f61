//! A pretty printer for core expressions.
//!
//! Example:
//!
//! ```
//! use depmatch::core::pretty::Context;
//! use depmatch::core::{Expr, Prim};
//!
//! let expr = Expr::app(Expr::prim(Prim::NatSucc), Expr::nat(1));
//! let doc = Context::new(&()).expr(&expr);
//! assert_eq!(doc.pretty(80).to_string(), "Nat.succ 1");
//! ```

use pretty::RcDoc;

use crate::core::{Expr, FVarId, Universe};
use crate::env::Index;
use crate::symbol::Symbol;

/// Expression precedences
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Prec {
    Top = 0,
    Fun,
    App,
    Atomic,
}

const INDENT: isize = 4;

/// Names of local variables, used when printing free variables.
pub trait LocalNames {
    fn local_name(&self, var: FVarId) -> Option<Symbol>;
}

impl LocalNames for () {
    fn local_name(&self, _: FVarId) -> Option<Symbol> {
        None
    }
}

pub struct Context<'a> {
    locals: &'a dyn LocalNames,
}

impl<'a> Context<'a> {
    pub fn new(locals: &'a dyn LocalNames) -> Context<'a> {
        Context { locals }
    }

    pub(crate) fn ident(&self, name: Symbol) -> RcDoc<'static> {
        RcDoc::text(name.resolve().to_owned())
    }

    pub fn fvar(&self, var: FVarId) -> RcDoc<'static> {
        match self.locals.local_name(var) {
            Some(name) => self.ident(name),
            None => RcDoc::text(format!("{var:?}")),
        }
    }

    pub fn expr(&self, expr: &Expr) -> RcDoc<'static> {
        self.expr_prec(&mut Vec::new(), Prec::Top, expr)
    }

    pub(crate) fn atomic_expr(&self, expr: &Expr) -> RcDoc<'static> {
        self.expr_prec(&mut Vec::new(), Prec::Atomic, expr)
    }

    fn binder_name(&self, binders: &[Option<Symbol>], name: Option<Symbol>) -> Symbol {
        name.unwrap_or_else(|| Symbol::get_alphabetic_name(binders.len()))
    }

    fn bvar(&self, binders: &[Option<Symbol>], index: Index) -> RcDoc<'static> {
        let position = binders.len().checked_sub(index.depth() + 1);
        match position.map(|position| (position, binders[position])) {
            Some((position, name)) => self.ident(self.binder_name(&binders[..position], name)),
            None => RcDoc::text(format!("#{index}")),
        }
    }

    fn sort(&self, universe: &Universe) -> RcDoc<'static> {
        match universe.to_explicit() {
            Some(0) => RcDoc::text("Prop"),
            Some(1) => RcDoc::text("Type"),
            Some(level) => RcDoc::text(format!("Type {}", level - 1)),
            None => RcDoc::text(format!("Sort {universe:?}")),
        }
    }

    fn expr_prec(
        &self,
        binders: &mut Vec<Option<Symbol>>,
        prec: Prec,
        expr: &Expr,
    ) -> RcDoc<'static> {
        match expr {
            Expr::BVar(index) => self.bvar(binders, *index),
            Expr::FVar(var) => self.fvar(*var),
            Expr::MVar(var) => RcDoc::text(format!("{var}")),
            Expr::Sort(universe) => {
                let doc = self.sort(universe);
                let wrap = prec > Prec::App && !matches!(universe.to_explicit(), Some(0 | 1));
                self.paren(wrap, doc)
            }
            Expr::Const(name, _) => self.ident(*name),
            Expr::Lit(literal) => RcDoc::text(literal.to_string()),
            Expr::ArrayLit(_, elems) => self.sequence(
                RcDoc::text("#["),
                elems.iter().map(|elem| self.expr_prec(binders, Prec::Top, elem)),
                RcDoc::text(","),
                RcDoc::text("]"),
            ),
            Expr::App(..) => {
                let head = self.expr_prec(binders, Prec::App, expr.app_fn());
                let args = expr.app_args();
                let args = args.iter().map(|arg| self.expr_prec(binders, Prec::Atomic, arg));
                self.paren(
                    prec > Prec::App,
                    RcDoc::concat([
                        head,
                        RcDoc::concat(args.map(|arg| RcDoc::concat([RcDoc::line(), arg])))
                            .nest(INDENT),
                    ])
                    .group(),
                )
            }
            Expr::Lam(name, r#type, body) => {
                let name = self.binder_name(binders, *name);
                let r#type = self.expr_prec(binders, Prec::Top, r#type);
                binders.push(Some(name));
                let body = self.expr_prec(binders, Prec::Top, body);
                binders.pop();
                self.paren(
                    prec > Prec::Top,
                    RcDoc::concat([
                        RcDoc::text("fun"),
                        RcDoc::space(),
                        self.ann_binder(name, r#type),
                        RcDoc::space(),
                        RcDoc::text("=>"),
                        RcDoc::concat([RcDoc::line(), body]).nest(INDENT),
                    ])
                    .group(),
                )
            }
            Expr::Pi(name, r#type, body) if !body.has_loose_bvar(Index::last()) => {
                let r#type = self.expr_prec(binders, Prec::App, r#type);
                binders.push(*name);
                let body = self.expr_prec(binders, Prec::Fun, body);
                binders.pop();
                self.paren(
                    prec > Prec::Fun,
                    RcDoc::concat([
                        r#type,
                        RcDoc::space(),
                        RcDoc::text("→"),
                        RcDoc::softline(),
                        body,
                    ])
                    .group(),
                )
            }
            Expr::Pi(name, r#type, body) => {
                let name = self.binder_name(binders, *name);
                let r#type = self.expr_prec(binders, Prec::Top, r#type);
                binders.push(Some(name));
                let body = self.expr_prec(binders, Prec::Fun, body);
                binders.pop();
                self.paren(
                    prec > Prec::Fun,
                    RcDoc::concat([
                        self.ann_binder(name, r#type),
                        RcDoc::space(),
                        RcDoc::text("→"),
                        RcDoc::softline(),
                        body,
                    ])
                    .group(),
                )
            }
        }
    }

    fn ann_binder(&self, name: Symbol, r#type: RcDoc<'static>) -> RcDoc<'static> {
        RcDoc::concat([
            RcDoc::text("("),
            self.ident(name),
            RcDoc::space(),
            RcDoc::text(":"),
            RcDoc::space(),
            r#type,
            RcDoc::text(")"),
        ])
    }

    pub(crate) fn paren(&self, wrap: bool, doc: RcDoc<'static>) -> RcDoc<'static> {
        if wrap {
            RcDoc::concat([RcDoc::text("("), doc, RcDoc::text(")")])
        } else {
            doc
        }
    }

    /// Pretty prints a delimited sequence of documents with a trailing
    /// separator if it is formatted over multiple lines.
    pub(crate) fn sequence(
        &self,
        start_delim: RcDoc<'static>,
        docs: impl ExactSizeIterator<Item = RcDoc<'static>>,
        separator: RcDoc<'static>,
        end_delim: RcDoc<'static>,
    ) -> RcDoc<'static> {
        if docs.len() == 0 {
            return RcDoc::concat([start_delim, end_delim]);
        }

        let docs = RcDoc::intersperse(docs, RcDoc::concat([separator.clone(), RcDoc::line()]));

        RcDoc::concat([
            start_delim,
            RcDoc::concat([
                RcDoc::line_(),
                docs,
                RcDoc::flat_alt(separator, RcDoc::nil()),
            ])
            .nest(INDENT),
            RcDoc::line_(),
            end_delim,
        ])
        .group()
    }
}
