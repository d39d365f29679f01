//! Path-keyed middleware registry.

use std::sync::Arc;

use super::Middleware;
use crate::error::RouterError;
use crate::router::Pattern;

/// Middleware registered under one template
///
/// Repeated registrations on the same literal template append here, so the
/// entry's handlers run in append order.
pub struct MiddlewareEntry<E> {
    template: Arc<str>,
    pattern: Pattern,
    handlers: Vec<Arc<dyn Middleware<E>>>,
}

impl<E> MiddlewareEntry<E> {
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    #[must_use]
    pub fn handlers(&self) -> &[Arc<dyn Middleware<E>>] {
        &self.handlers
    }
}

/// Ordered collection of [`MiddlewareEntry`] values, one per distinct template
pub struct MiddlewareTable<E> {
    entries: Vec<MiddlewareEntry<E>>,
}

impl<E> Default for MiddlewareTable<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E> MiddlewareTable<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `middleware` under `template`
    ///
    /// Templates are compared as literal strings: `/api/*` and `/api/*/`
    /// are distinct entries even though they match the same paths.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidTemplate`] when a new template does not
    /// compile.
    pub fn insert(
        &mut self,
        template: &str,
        middleware: Arc<dyn Middleware<E>>,
    ) -> Result<(), RouterError> {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.template.as_ref() == template)
        {
            entry.handlers.push(middleware);
            return Ok(());
        }

        let pattern = Pattern::compile(template)?;
        self.entries.push(MiddlewareEntry {
            template: Arc::from(template),
            pattern,
            handlers: vec![middleware],
        });
        Ok(())
    }

    /// Middleware whose template matches `path`
    ///
    /// Entries are tested in first-registration order; each matching
    /// entry contributes its handlers in append order.
    #[must_use]
    pub fn select(&self, path: &str) -> Vec<Arc<dyn Middleware<E>>> {
        self.entries
            .iter()
            .filter(|e| e.pattern.is_match(path))
            .flat_map(|e| e.handlers.iter().map(Arc::clone))
            .collect()
    }

    /// Number of distinct templates
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &MiddlewareEntry<E>> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{Context, HandlerRequest, Next};

    fn passthrough() -> Arc<dyn Middleware<()>> {
        Arc::new(|req: HandlerRequest, ctx: Context<()>, next: Next<()>| next.run(req, ctx))
    }

    #[test]
    fn test_same_template_appends() {
        let mut table = MiddlewareTable::new();
        table.insert("/api/*", passthrough()).unwrap();
        table.insert("/api/*", passthrough()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.entries().next().unwrap().handlers().len(), 2);
    }

    #[test]
    fn test_select_concatenates_in_entry_order() {
        let mut table = MiddlewareTable::new();
        let global = passthrough();
        let api = passthrough();
        let users = passthrough();
        table.insert("*", Arc::clone(&global)).unwrap();
        table.insert("/api/*", Arc::clone(&api)).unwrap();
        table.insert("/users/:id", Arc::clone(&users)).unwrap();

        let selected = table.select("/api/things");
        assert_eq!(selected.len(), 2);
        assert!(Arc::ptr_eq(&selected[0], &global));
        assert!(Arc::ptr_eq(&selected[1], &api));

        let selected = table.select("/users/7");
        assert_eq!(selected.len(), 2);
        assert!(Arc::ptr_eq(&selected[1], &users));
    }

    #[test]
    fn test_select_without_match_is_empty() {
        let mut table = MiddlewareTable::new();
        table.insert("/admin/*", passthrough()).unwrap();
        assert!(table.select("/public").is_empty());
    }

    #[test]
    fn test_literal_template_ignores_trailing_slash_path() {
        let mut table = MiddlewareTable::new();
        table.insert("/contacts", passthrough()).unwrap();
        let entry = table.entries().next().unwrap();
        assert_eq!(entry.template(), "/contacts");
        assert_eq!(entry.pattern().template(), "/contacts");
        assert_eq!(table.select("/contacts").len(), 1);
        assert!(table.select("/contacts/").is_empty());
    }

    #[test]
    fn test_invalid_template_rejected() {
        let mut table = MiddlewareTable::new();
        let err = table.insert("no-slash", passthrough()).err().unwrap();
        assert!(matches!(err, RouterError::InvalidTemplate { .. }));
        assert!(table.is_empty());
    }
}
