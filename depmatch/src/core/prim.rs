use crate::core::decl::{
    AxiomVal, ConstructorVal, Declaration, Environment, InductiveVal,
};
use crate::core::Expr;
use crate::env::Index;
use crate::symbol::Symbol;

macro_rules! def_prims {
    ($($(#[$prim_attr:meta])* $PrimName:ident => $prim_name:literal),* $(,)?) => {
        /// Builtin names.
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub enum Prim {
            $($(#[$prim_attr])* $PrimName),*
        }

        impl Prim {
            pub const fn name(&self) -> &'static str {
                match self {
                    $(Prim::$PrimName => $prim_name),*
                }
            }
        }
    };
}

def_prims! {
    /// Type of natural numbers.
    NatType => "Nat",
    NatZero => "Nat.zero",
    NatSucc => "Nat.succ",

    /// Type of booleans.
    BoolType => "Bool",
    BoolFalse => "Bool.false",
    BoolTrue => "Bool.true",

    /// Type of strings.
    StringType => "String",

    /// Type of dynamically sized arrays.
    ArrayType => "Array",
    /// Length of an array.
    ArraySize => "Array.size",
    /// Split an array on whether it has a given size, exposing its elements
    /// when it does.
    ArrayCasesOnSize => "Array.casesOnSize",

    /// Propositional equality.
    Eq => "Eq",
    /// Non-dependent recursor of equality, used to cast along an equation.
    EqNdrec => "Eq.ndrec",
    EqSymm => "Eq.symm",
    Not => "Not",

    /// Dependent if-then-else.
    Dite => "dite",
    /// Decidability of equality.
    DecEq => "decEq",

    /// Placeholder proofs for admitted goals.
    SorryAx => "sorryAx",
}

impl Prim {
    pub fn symbol(self) -> Symbol {
        Symbol::intern_static(self.name())
    }
}

/// Declare the builtin types.
pub(super) fn declare_prelude(env: &mut Environment) {
    use self::Prim::*;

    let nat = Expr::prim(NatType);
    let bool = Expr::prim(BoolType);
    let var0 = Expr::BVar(Index::last());

    env.insert(Declaration::Inductive(InductiveVal {
        name: NatType.symbol(),
        r#type: Expr::r#type(),
        num_params: 0,
        num_indices: 0,
        ctors: vec![NatZero.symbol(), NatSucc.symbol()],
    }));
    env.insert(Declaration::Constructor(ConstructorVal {
        name: NatZero.symbol(),
        induct: NatType.symbol(),
        cidx: 0,
        num_params: 0,
        num_fields: 0,
        r#type: nat.clone(),
    }));
    env.insert(Declaration::Constructor(ConstructorVal {
        name: NatSucc.symbol(),
        induct: NatType.symbol(),
        cidx: 1,
        num_params: 0,
        num_fields: 1,
        r#type: Expr::pi(Some(Symbol::intern("n")), nat.clone(), nat.clone()),
    }));

    env.insert(Declaration::Inductive(InductiveVal {
        name: BoolType.symbol(),
        r#type: Expr::r#type(),
        num_params: 0,
        num_indices: 0,
        ctors: vec![BoolFalse.symbol(), BoolTrue.symbol()],
    }));
    for (cidx, ctor) in [BoolFalse, BoolTrue].into_iter().enumerate() {
        env.insert(Declaration::Constructor(ConstructorVal {
            name: ctor.symbol(),
            induct: BoolType.symbol(),
            cidx,
            num_params: 0,
            num_fields: 0,
            r#type: bool.clone(),
        }));
    }

    let axioms = [
        (StringType, Expr::r#type()),
        (ArrayType, Expr::arrow(Expr::r#type(), Expr::r#type())),
        (
            ArraySize,
            Expr::pi(
                Some(Symbol::intern("α")),
                Expr::r#type(),
                Expr::pi(None, Expr::app(Expr::prim(ArrayType), var0.clone()), nat),
            ),
        ),
        (
            Eq,
            Expr::pi(
                Some(Symbol::intern("α")),
                Expr::r#type(),
                Expr::pi(
                    None,
                    var0.clone(),
                    Expr::pi(None, Expr::BVar(Index::last().prev()), Expr::prop()),
                ),
            ),
        ),
        (Not, Expr::arrow(Expr::prop(), Expr::prop())),
    ];
    for (prim, r#type) in axioms {
        env.insert(Declaration::Axiom(AxiomVal {
            name: prim.symbol(),
            r#type,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_interned() {
        assert_eq!(Prim::NatSucc.symbol(), Symbol::intern("Nat.succ"));
        assert_eq!(Prim::NatSucc.symbol().prefix(), Some(Prim::NatType.symbol()));
    }

    #[test]
    fn prelude_types() {
        let env = Environment::with_prelude();
        assert!(env.get(Prim::ArraySize.symbol()).is_some());
        assert!(env.inductive(Prim::BoolType.symbol()).is_some());
        assert!(env.inductive(Prim::StringType.symbol()).is_none());
    }
}
