//! Interned, hierarchical names.
//!
//! Names like `Nat.succ` or `Vec.casesOn` are stored whole in a global
//! interner, and split on `.` on demand.

use std::fmt;
use std::sync::RwLock;

use once_cell::sync::Lazy;

struct StringInterner {
    strings: lasso::ThreadedRodeo,
    alphabetic_names: Vec<Symbol>,
}

static INTERNER: Lazy<RwLock<StringInterner>> = Lazy::new(|| {
    RwLock::new(StringInterner {
        strings: lasso::ThreadedRodeo::new(),
        alphabetic_names: Vec::new(),
    })
});

impl StringInterner {
    /// Retrieve an alphabetic name based on a numeric count. This is useful for
    /// producing human-readable names for unnamed binders.
    fn get_alphabetic_name(&mut self, index: usize) -> Symbol {
        let strings = &self.strings;
        let start = self.alphabetic_names.len();
        self.alphabetic_names.extend(
            (start..=index).map(|index| Symbol(strings.get_or_intern(alphabetic_name(index)))),
        );
        self.alphabetic_names[index]
    }
}

fn alphabetic_name(index: usize) -> String {
    let base = index / 26;
    let letter = index % 26;
    let letter = (letter as u8 + b'a') as char;
    if base == 0 {
        format!("{letter}")
    } else {
        format!("{letter}{base}")
    }
}

/// Separator between the components of a hierarchical name.
pub const SEPARATOR: char = '.';

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(lasso::Spur);

impl Symbol {
    pub fn intern(sym: impl AsRef<str>) -> Self {
        Self(INTERNER.write().unwrap().strings.get_or_intern(sym))
    }

    pub fn intern_static(sym: &'static str) -> Self {
        Self(INTERNER.write().unwrap().strings.get_or_intern_static(sym))
    }

    pub fn resolve<'a>(&'a self) -> &'a str {
        let interner = INTERNER.read().unwrap();
        let symbol = interner.strings.resolve(&self.0);

        // SAFETY: The lifetime is a bit of a lie: it is really tied to the lifetime of
        // `INTERNER`. But `INTERNER` is never dropped (since it is static), so it is
        // safe to truncate the lifetime to the shorter lifetime of `'a`.
        unsafe { std::mem::transmute::<&str, &'a str>(symbol) }
    }

    /// ## Example
    ///
    /// ```rust
    /// use depmatch::symbol::Symbol;
    ///
    /// assert_eq!(Symbol::get_alphabetic_name(0), Symbol::intern("a"));
    /// assert_eq!(Symbol::get_alphabetic_name(25), Symbol::intern("z"));
    /// assert_eq!(Symbol::get_alphabetic_name(26), Symbol::intern("a1"));
    /// ```
    pub fn get_alphabetic_name(index: usize) -> Symbol {
        let mut interner = INTERNER.write().unwrap();
        interner.get_alphabetic_name(index)
    }

    /// Extend a name with another component.
    ///
    /// ```rust
    /// use depmatch::symbol::Symbol;
    ///
    /// let name = Symbol::intern("Nat").child("casesOn");
    /// assert_eq!(name, Symbol::intern("Nat.casesOn"));
    /// ```
    pub fn child(self, component: &str) -> Symbol {
        Symbol::intern(format!("{}{SEPARATOR}{component}", self.resolve()))
    }

    /// A numbered variant of this name, like `h_1`.
    pub fn numbered(self, index: usize) -> Symbol {
        Symbol::intern(format!("{}_{index}", self.resolve()))
    }

    /// The name with its last component removed, if it has more than one.
    pub fn prefix(self) -> Option<Symbol> {
        let name = self.resolve();
        let (prefix, _) = name.rsplit_once(SEPARATOR)?;
        Some(Symbol::intern(prefix))
    }

    /// The last component of the name.
    pub fn last_component<'a>(&'a self) -> &'a str {
        let name = self.resolve();
        match name.rsplit_once(SEPARATOR) {
            Some((_, last)) => last,
            None => name,
        }
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        self.resolve()
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolve())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resolve())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchical_names() {
        let name = Symbol::intern("Vec.cons");
        assert_eq!(name.prefix(), Some(Symbol::intern("Vec")));
        assert_eq!(name.last_component(), "cons");
        assert_eq!(Symbol::intern("Nat").prefix(), None);
        assert_eq!(Symbol::intern("Nat").last_component(), "Nat");
    }

    #[test]
    fn numbered_names() {
        assert_eq!(Symbol::intern("h").numbered(3), Symbol::intern("h_3"));
    }
}
