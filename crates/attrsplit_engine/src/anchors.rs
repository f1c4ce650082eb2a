//! Anchor declaration lookup.
//!
//! Every handler file must declare `Process`, `Register`, `Read` and a
//! `New*` constructor. [`DeclIndex`] resolves each of them to a position in
//! the file's declaration list and records the handler type from the
//! receiver of `Process`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use attrsplit_foundation::{Error, Result};
use attrsplit_syntax::{Expr, File, FuncDecl, print_expr};

/// A declaration the rewrites are anchored on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// The `Process` method split into CRUD methods.
    Process,
    /// The `Register` method `GetSchema` is derived from.
    Register,
    /// The `Read` method whose signature is replaced.
    Read,
    /// The `New*` constructor whose returns are wrapped.
    Ctor,
}

impl Anchor {
    /// All anchors in resolution order.
    pub const ALL: [Self; 4] = [Self::Process, Self::Register, Self::Read, Self::Ctor];

    /// Returns the name fragment this anchor is looked up by.
    #[must_use]
    pub const fn pattern(self) -> &'static str {
        match self {
            Self::Process => "Process",
            Self::Register => "Register",
            Self::Read => "Read",
            Self::Ctor => "New",
        }
    }

    /// Returns true if a declaration called `name` is a candidate.
    #[must_use]
    pub fn matches(self, name: &str, policy: AnchorPolicy) -> bool {
        match (policy, self) {
            (AnchorPolicy::LastContaining, _) => name.contains(self.pattern()),
            (AnchorPolicy::Exact, Self::Ctor) => name.starts_with(self.pattern()),
            (AnchorPolicy::Exact, _) => name == self.pattern(),
        }
    }
}

/// How anchor names are matched against declaration names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AnchorPolicy {
    /// The last declaration whose name contains the fragment wins.
    #[default]
    LastContaining,
    /// Names must equal the fragment; the constructor must start with `New`.
    Exact,
}

/// Positions of the anchor declarations in a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclIndex {
    process: usize,
    register: usize,
    read: usize,
    ctor: usize,
    handler: String,
}

impl DeclIndex {
    /// Resolves every anchor in `file`.
    ///
    /// # Errors
    /// Returns `NotFound` for the first missing anchor, or
    /// `InvalidReceiver` if `Process` is not declared on `*H`.
    pub fn build(file: &File, policy: AnchorPolicy) -> Result<Self> {
        let process = find_anchor(file, Anchor::Process, policy)?;
        let register = find_anchor(file, Anchor::Register, policy)?;
        let read = find_anchor(file, Anchor::Read, policy)?;
        let ctor = find_anchor(file, Anchor::Ctor, policy)?;

        let handler = file
            .func(process)
            .ok_or_else(|| Error::not_found(Anchor::Process.pattern()))
            .and_then(handler_type)?;

        if let Some(register_recv) = file.func(register).and_then(FuncDecl::receiver_type) {
            if pointee(register_recv) != Some(handler.as_str()) {
                warn!(
                    handler = %handler,
                    receiver = %print_expr(register_recv),
                    "Register is declared on a different receiver than Process"
                );
            }
        }

        Ok(Self {
            process,
            register,
            read,
            ctor,
            handler,
        })
    }

    /// Returns the declaration position of `anchor`.
    #[must_use]
    pub const fn position(&self, anchor: Anchor) -> usize {
        match anchor {
            Anchor::Process => self.process,
            Anchor::Register => self.register,
            Anchor::Read => self.read,
            Anchor::Ctor => self.ctor,
        }
    }

    /// Returns the attribute handler type `H`.
    #[must_use]
    pub fn handler(&self) -> &str {
        &self.handler
    }
}

/// Finds the declaration position an anchor resolves to.
///
/// When several declarations match, the last one in source order wins and
/// a warning names every candidate.
///
/// # Errors
/// Returns `NotFound` naming the anchor fragment if nothing matches.
pub fn find_anchor(file: &File, anchor: Anchor, policy: AnchorPolicy) -> Result<usize> {
    let candidates: Vec<(usize, &str)> = file
        .funcs()
        .filter(|(_, func)| anchor.matches(&func.name, policy))
        .map(|(index, func)| (index, func.name.as_str()))
        .collect();

    let Some(&(index, name)) = candidates.last() else {
        return Err(Error::not_found(anchor.pattern()));
    };

    if candidates.len() > 1 {
        let names: Vec<&str> = candidates.iter().map(|(_, name)| *name).collect();
        warn!(
            anchor = anchor.pattern(),
            candidates = ?names,
            chosen = name,
            "anchor matches several declarations, using the last one"
        );
    }
    info!(anchor = anchor.pattern(), decl = name, "anchor resolved");
    Ok(index)
}

/// Returns `H` for a method declared on `*H`.
///
/// # Errors
/// Returns `InvalidReceiver` with the receiver as written otherwise.
pub fn handler_type(process: &FuncDecl) -> Result<String> {
    let Some(recv) = process.receiver_type() else {
        return Err(Error::invalid_receiver("no receiver"));
    };
    pointee(recv)
        .map(str::to_string)
        .ok_or_else(|| Error::invalid_receiver(print_expr(recv)))
}

/// Returns `H` if `ty` is `*H`.
fn pointee(ty: &Expr) -> Option<&str> {
    match ty {
        Expr::Star(inner) => inner.as_ident(),
        _ => None,
    }
}
