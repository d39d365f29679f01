//! Path template compilation and matching.
//!
//! A template such as `/contacts/:name` is compiled once, at registration,
//! into an anchored regex plus the ordered list of parameter names. Literal
//! segments are escaped, parameter segments become capture groups.
//!
//! | Segment  | Matches                        | Captured as             |
//! |----------|--------------------------------|-------------------------|
//! | `users`  | exactly `users`                | -                       |
//! | `:id`    | one non-empty segment          | `id`                    |
//! | `:id?`   | zero or one segment            | `id` (when present)     |
//! | `:rest+` | one or more segments           | `rest`, joined with `/` |
//! | `:rest*` | zero or more segments          | `rest` (when present)   |
//! | `*`      | anything, including nothing    | `"0"`, `"1"`, ...       |
//!
//! Dynamic templates tolerate a trailing `/` on the request path, literal
//! templates match exactly. Captured values are percent-decoded.

use regex::Regex;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RouterError;

/// Maximum number of path parameters before heap allocation.
/// Most REST paths have <= 4 params (e.g. `/users/:id/posts/:post_id`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names are `Arc<str>` shared with the compiled [`Pattern`], so a
/// capture only allocates the value.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Named captures produced by a matching [`Pattern`]
///
/// Never mutated once the match is handed to a chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
    params: ParamVec,
}

impl ParamMap {
    /// Create an empty parameter map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a parameter by name
    ///
    /// Uses "last write wins" semantics when a template repeats a name.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate over `(name, value)` pairs in capture order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    /// Convert to a HashMap
    /// Note: This allocates - use get() in hot paths instead
    #[must_use]
    pub fn to_hash_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn push(&mut self, name: Arc<str>, value: String) {
        self.params.push((name, value));
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut map = ParamMap::new();
        for (name, value) in iter {
            map.push(Arc::from(name), value.to_string());
        }
        map
    }
}

/// Shape of one template segment, ordered from least to most specific.
///
/// Dynamic routes are ranked by comparing their shapes segment by segment,
/// so `/a/b/:y` outranks `/a/:x/c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SegmentKind {
    /// `*` or a segment containing `*`
    Wildcard,
    /// `:name?`, `:name*` or `:name+`
    Flexible,
    /// `:name`
    Param,
    /// Plain text
    Literal,
}

/// Whether a template needs a compiled pattern to match.
///
/// A template is dynamic when it contains a wildcard or a `/:` parameter
/// segment; everything else is matched by exact string equality.
#[inline]
#[must_use]
pub fn is_dynamic(template: &str) -> bool {
    template.contains('*') || template.contains("/:")
}

/// A compiled path template
#[derive(Debug, Clone)]
pub struct Pattern {
    template: Arc<str>,
    regex: Regex,
    names: Vec<Arc<str>>,
    shape: Vec<SegmentKind>,
}

impl Pattern {
    /// Compile a path template
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidTemplate`] when the template does not
    /// start with `/` (and is not `*`), or a parameter name is empty or
    /// contains characters other than ASCII letters, digits and `_`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chainrouter::router::Pattern;
    ///
    /// let pattern = Pattern::compile("/contacts/:name").unwrap();
    /// let params = pattern.matches("/contacts/ada").unwrap();
    /// assert_eq!(params.get("name"), Some("ada"));
    /// assert!(pattern.matches("/contacts").is_none());
    /// ```
    pub fn compile(template: &str) -> Result<Self, RouterError> {
        if template == "*" {
            return Self::build(
                template,
                "^(.*)$",
                vec![Arc::from("0")],
                vec![SegmentKind::Wildcard],
            );
        }
        if !template.starts_with('/') {
            return Err(RouterError::invalid(template, "must start with '/' or be '*'"));
        }

        let mut source = String::with_capacity(template.len() + 8);
        source.push('^');
        let mut names: Vec<Arc<str>> = Vec::new();
        let mut shape = Vec::new();
        let mut wildcards = 0usize;

        for segment in template.split('/').filter(|s| !s.is_empty()) {
            if let Some(param) = segment.strip_prefix(':') {
                let (name, modifier) = split_modifier(param);
                if name.is_empty()
                    || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    return Err(RouterError::invalid(
                        template,
                        format!("invalid parameter name in segment '{}'", segment),
                    ));
                }
                let (fragment, kind) = match modifier {
                    None => ("/([^/]+)", SegmentKind::Param),
                    Some('?') => ("(?:/([^/]+))?", SegmentKind::Flexible),
                    Some('+') => ("/([^/]+(?:/[^/]+)*)", SegmentKind::Flexible),
                    Some(_) => ("(?:/([^/]+(?:/[^/]+)*))?", SegmentKind::Flexible),
                };
                source.push_str(fragment);
                names.push(Arc::from(name));
                shape.push(kind);
            } else if segment == "*" {
                source.push_str("(?:/(.*?))?");
                names.push(Arc::from(wildcards.to_string()));
                wildcards += 1;
                shape.push(SegmentKind::Wildcard);
            } else if segment.contains('*') {
                source.push('/');
                for (idx, literal) in segment.split('*').enumerate() {
                    if idx > 0 {
                        source.push_str("(.*)");
                        names.push(Arc::from(wildcards.to_string()));
                        wildcards += 1;
                    }
                    source.push_str(&regex::escape(literal));
                }
                shape.push(SegmentKind::Wildcard);
            } else {
                source.push('/');
                source.push_str(&regex::escape(segment));
                shape.push(SegmentKind::Literal);
            }
        }

        // Literal templates match exactly, like static routes.
        if is_dynamic(template) {
            source.push_str("/?$");
        } else if shape.is_empty() {
            source.push_str("/$");
        } else {
            source.push('$');
        }
        Self::build(template, &source, names, shape)
    }

    fn build(
        template: &str,
        source: &str,
        names: Vec<Arc<str>>,
        shape: Vec<SegmentKind>,
    ) -> Result<Self, RouterError> {
        let regex = Regex::new(source).map_err(|e| RouterError::invalid(template, e.to_string()))?;
        Ok(Self {
            template: Arc::from(template),
            regex,
            names,
            shape,
        })
    }

    /// Match a request path, returning the named captures on success
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<ParamMap> {
        let captures = self.regex.captures(path)?;
        let mut params = ParamMap::new();
        for (idx, name) in self.names.iter().enumerate() {
            if let Some(m) = captures.get(idx + 1) {
                params.push(Arc::clone(name), decode(m.as_str()));
            }
        }
        Some(params)
    }

    /// Test a path without building captures
    #[inline]
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The template this pattern was compiled from
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Parameter names in capture order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(AsRef::as_ref)
    }

    /// Segment shapes, used to rank dynamic routes
    #[must_use]
    pub fn shape(&self) -> &[SegmentKind] {
        &self.shape
    }
}

fn split_modifier(param: &str) -> (&str, Option<char>) {
    match param.chars().last() {
        Some(c @ ('?' | '*' | '+')) => (&param[..param.len() - 1], Some(c)),
        _ => (param, None),
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}
