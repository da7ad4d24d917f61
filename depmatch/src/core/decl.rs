//! Global declarations.

use fxhash::FxHashMap;
use std::fmt;

use crate::core::Expr;
use crate::symbol::Symbol;

/// Inductive type declarations.
#[derive(Clone, Debug)]
pub struct InductiveVal {
    pub name: Symbol,
    /// `Π params indices, Sort u`
    pub r#type: Expr,
    pub num_params: usize,
    pub num_indices: usize,
    /// Constructor names, in declaration order.
    pub ctors: Vec<Symbol>,
}

impl InductiveVal {
    /// The name of the non-recursive eliminator.
    pub fn cases_on(&self) -> Symbol {
        self.name.child("casesOn")
    }

    /// The name of the eliminator used to discharge impossible cases.
    pub fn no_confusion(&self) -> Symbol {
        self.name.child("noConfusion")
    }
}

/// Constructor declarations.
#[derive(Clone, Debug)]
pub struct ConstructorVal {
    pub name: Symbol,
    pub induct: Symbol,
    /// Position of the constructor in its inductive type.
    pub cidx: usize,
    pub num_params: usize,
    pub num_fields: usize,
    /// `Π params fields, I params indices`
    pub r#type: Expr,
}

#[derive(Clone, Debug)]
pub struct DefinitionVal {
    pub name: Symbol,
    pub r#type: Expr,
    pub value: Expr,
    /// Marked for inlining at use sites.
    pub inline: bool,
}

#[derive(Clone, Debug)]
pub struct AxiomVal {
    pub name: Symbol,
    pub r#type: Expr,
}

#[derive(Clone, Debug)]
pub enum Declaration {
    Axiom(AxiomVal),
    Definition(DefinitionVal),
    Inductive(InductiveVal),
    Constructor(ConstructorVal),
}

impl Declaration {
    pub fn name(&self) -> Symbol {
        match self {
            Declaration::Axiom(val) => val.name,
            Declaration::Definition(val) => val.name,
            Declaration::Inductive(val) => val.name,
            Declaration::Constructor(val) => val.name,
        }
    }

    pub fn r#type(&self) -> &Expr {
        match self {
            Declaration::Axiom(val) => &val.r#type,
            Declaration::Definition(val) => &val.r#type,
            Declaration::Inductive(val) => &val.r#type,
            Declaration::Constructor(val) => &val.r#type,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Error {
    AlreadyDeclared(Symbol),
    /// The constructor does not belong to the inductive type it was declared with.
    ForeignConstructor { inductive: Symbol, ctor: Symbol },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AlreadyDeclared(name) => write!(f, "`{name}` has already been declared"),
            Error::ForeignConstructor { inductive, ctor } => {
                write!(f, "constructor `{ctor}` is not listed by `{inductive}`")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Global declarations, in the order they were added.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    declarations: FxHashMap<Symbol, Declaration>,
    order: Vec<Symbol>,
}

impl Environment {
    /// An environment with no declarations.
    pub fn new() -> Environment {
        Environment::default()
    }

    /// An environment with the builtin types declared.
    pub fn with_prelude() -> Environment {
        let mut env = Environment::new();
        super::prim::declare_prelude(&mut env);
        env
    }

    pub(super) fn insert(&mut self, decl: Declaration) {
        let name = decl.name();
        if self.declarations.insert(name, decl).is_none() {
            self.order.push(name);
        }
    }

    pub fn add(&mut self, decl: Declaration) -> Result<(), Error> {
        if self.contains(decl.name()) {
            return Err(Error::AlreadyDeclared(decl.name()));
        }
        self.insert(decl);
        Ok(())
    }

    /// Add an inductive type along with its constructors.
    pub fn add_inductive(
        &mut self,
        inductive: InductiveVal,
        ctors: Vec<ConstructorVal>,
    ) -> Result<(), Error> {
        if let Some(ctor) = ctors.iter().find(|ctor| {
            ctor.induct != inductive.name || inductive.ctors.get(ctor.cidx) != Some(&ctor.name)
        }) {
            return Err(Error::ForeignConstructor {
                inductive: inductive.name,
                ctor: ctor.name,
            });
        }
        for name in std::iter::once(inductive.name).chain(ctors.iter().map(|ctor| ctor.name)) {
            if self.contains(name) {
                return Err(Error::AlreadyDeclared(name));
            }
        }

        self.insert(Declaration::Inductive(inductive));
        for ctor in ctors {
            self.insert(Declaration::Constructor(ctor));
        }
        Ok(())
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.declarations.contains_key(&name)
    }

    pub fn get(&self, name: Symbol) -> Option<&Declaration> {
        self.declarations.get(&name)
    }

    pub fn inductive(&self, name: Symbol) -> Option<&InductiveVal> {
        match self.get(name)? {
            Declaration::Inductive(val) => Some(val),
            _ => None,
        }
    }

    pub fn constructor(&self, name: Symbol) -> Option<&ConstructorVal> {
        match self.get(name)? {
            Declaration::Constructor(val) => Some(val),
            _ => None,
        }
    }

    pub fn definition(&self, name: Symbol) -> Option<&DefinitionVal> {
        match self.get(name)? {
            Declaration::Definition(val) => Some(val),
            _ => None,
        }
    }

    /// Declared names, in declaration order.
    pub fn names(&self) -> impl '_ + Iterator<Item = Symbol> {
        self.order.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Prim;

    #[test]
    fn prelude_declares_nat() {
        let env = Environment::with_prelude();
        let nat = env.inductive(Prim::NatType.symbol()).unwrap();
        assert_eq!(nat.ctors, [Prim::NatZero.symbol(), Prim::NatSucc.symbol()]);
        assert_eq!(env.constructor(Prim::NatSucc.symbol()).unwrap().num_fields, 1);
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let mut env = Environment::with_prelude();
        let decl = Declaration::Axiom(AxiomVal {
            name: Prim::NatType.symbol(),
            r#type: Expr::r#type(),
        });
        assert!(matches!(env.add(decl), Err(Error::AlreadyDeclared(_))));
    }

    #[test]
    fn constructors_must_be_listed() {
        let mut env = Environment::new();
        let name = Symbol::intern("Unit");
        let inductive = InductiveVal {
            name,
            r#type: Expr::r#type(),
            num_params: 0,
            num_indices: 0,
            ctors: vec![name.child("unit")],
        };
        let ctor = ConstructorVal {
            name: name.child("star"),
            induct: name,
            cidx: 0,
            num_params: 0,
            num_fields: 0,
            r#type: Expr::constant(name),
        };
        let result = env.add_inductive(inductive, vec![ctor]);
        assert!(matches!(result, Err(Error::ForeignConstructor { .. })));
    }
}
