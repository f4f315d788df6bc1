//! Per-compilation tracking of defined and referenced names.
//!
//! A [`SymbolRegistry`] is created at the start of a compilation and
//! threaded through parsing and synthesis. It records every property that is
//! referenced and every function or named table that is defined, and
//! rejects a second definition of the same name.

use indexmap::{IndexMap, IndexSet};
use log::trace;
use thiserror::Error;

use crate::span::Span;

/// A name was defined twice within one compilation.
///
/// Sites are `None` for definitions that did not come from source text
/// (synthesized panels, constants).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{name}` is already defined")]
pub struct DuplicateDefinition {
    name: String,
    site: Option<Span>,
    previous: Option<Span>,
}

impl DuplicateDefinition {
    /// The redefined name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the rejected definition was written.
    pub fn site(&self) -> Option<Span> {
        self.site
    }

    /// Where the name was first defined.
    pub fn previous(&self) -> Option<Span> {
        self.previous
    }
}

/// Defined and referenced names of one compilation.
#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    referenced: IndexSet<String>,
    defined: IndexMap<String, Option<Span>>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reference to `name`. Idempotent.
    pub fn register_reference(&mut self, name: &str) {
        if !self.referenced.contains(name) {
            trace!(name; "Registering reference");
            self.referenced.insert(name.to_string());
        }
    }

    /// Record a definition of `name` written at `site`.
    ///
    /// A defined name also counts as referenced.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateDefinition`] if `name` was already defined; the
    /// registry is left unchanged in that case.
    pub fn register_definition(
        &mut self,
        name: &str,
        site: Option<Span>,
    ) -> Result<(), DuplicateDefinition> {
        if let Some(previous) = self.defined.get(name) {
            return Err(DuplicateDefinition {
                name: name.to_string(),
                site,
                previous: *previous,
            });
        }
        trace!(name; "Registering definition");
        self.defined.insert(name.to_string(), site);
        self.register_reference(name);
        Ok(())
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defined.contains_key(name)
    }

    pub fn is_referenced(&self, name: &str) -> bool {
        self.referenced.contains(name)
    }

    /// Where `name` was defined, if it was defined in source text.
    pub fn definition_site(&self, name: &str) -> Option<Span> {
        self.defined.get(name).copied().flatten()
    }

    /// Defined names, sorted.
    pub fn defined(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.defined.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Referenced names, sorted.
    pub fn referenced(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.referenced.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Names that are referenced but never defined, sorted.
    ///
    /// These are normally properties owned by the simulator, so the list is
    /// advisory and never an error.
    pub fn undefined_references(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .referenced
            .iter()
            .filter(|name| !self.defined.contains_key(name.as_str()))
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }
}
