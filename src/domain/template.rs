//! Destination templates.
//!
//! A template is literal text interleaved with `{{ .Name }}` field actions.
//! Whitespace inside the braces is optional. Fields are looked up in a
//! [`ViewBag`] at render time.
//!
//! ```ignore
//! let tmpl = CompiledTemplate::compile("/t", "/?key={{ .Key }}")?;
//! let bag = ViewBag::new().with("Key", "/t");
//! assert_eq!(tmpl.render(&bag)?, "/?key=/t");
//! ```

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

static FIELD_ACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.([A-Za-z_][A-Za-z0-9_]*)$").unwrap());

/// Errors raised while compiling or rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template {name}: unclosed action starting at byte {offset}")]
    Unclosed { name: String, offset: usize },

    #[error("template {name}: unsupported action `{action}`")]
    UnsupportedAction { name: String, action: String },

    #[error("template {name}: no value for field `{field}`")]
    MissingField { name: String, field: String },
}

/// Name/value context a template renders against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ViewBag(BTreeMap<String, String>);

impl ViewBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Copies every entry of `other` into this bag, overwriting on conflict.
    pub fn extend_from(&mut self, other: &ViewBag) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ViewBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A parsed destination template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    name: String,
    source: String,
    segments: Vec<Segment>,
}

impl CompiledTemplate {
    /// Parses `source` once. `name` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Unclosed`] for a `{{` without matching `}}`
    /// and [`TemplateError::UnsupportedAction`] for anything other than a
    /// field reference.
    pub fn compile(name: &str, source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }

            let inner = &rest[start + OPEN.len()..];
            let end = inner.find(CLOSE).ok_or_else(|| TemplateError::Unclosed {
                name: name.to_string(),
                offset: offset + start,
            })?;

            let action = inner[..end].trim();
            let field = FIELD_ACTION
                .captures(action)
                .and_then(|caps| caps.get(1))
                .ok_or_else(|| TemplateError::UnsupportedAction {
                    name: name.to_string(),
                    action: action.to_string(),
                })?;
            segments.push(Segment::Field(field.as_str().to_string()));

            let consumed = start + OPEN.len() + end + CLOSE.len();
            offset += consumed;
            rest = &rest[consumed..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            source: source.to_string(),
            segments,
        })
    }

    /// The text this template was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Renders the template against `bag`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingField`] if a referenced field has no
    /// value in the bag.
    pub fn render(&self, bag: &ViewBag) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => {
                    let value = bag.get(field).ok_or_else(|| TemplateError::MissingField {
                        name: self.name.clone(),
                        field: field.clone(),
                    })?;
                    out.push_str(value);
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_key() {
        let tmpl = CompiledTemplate::compile("/t", "/?key={{.Key}}").unwrap();
        let bag = ViewBag::new().with("Key", "/t");

        assert_eq!(tmpl.render(&bag).unwrap(), "/?key=/t");
    }

    #[test]
    fn test_render_with_whitespace() {
        let tmpl = CompiledTemplate::compile("/t", "/?key={{ .Key }}&foo={{.Foo}}").unwrap();
        let bag = ViewBag::new().with("Key", "/t").with("Foo", "Bar");

        assert_eq!(tmpl.render(&bag).unwrap(), "/?key=/t&foo=Bar");
    }

    #[test]
    fn test_render_plain_text() {
        let tmpl = CompiledTemplate::compile("/plain", "/plain/destination").unwrap();
        assert_eq!(tmpl.render(&ViewBag::new()).unwrap(), "/plain/destination");
        assert_eq!(tmpl.source(), "/plain/destination");
    }

    #[test]
    fn test_adjacent_fields() {
        let tmpl = CompiledTemplate::compile("x", "{{.A}}{{.B}}").unwrap();
        let bag = ViewBag::new().with("A", "1").with("B", "2");
        assert_eq!(tmpl.render(&bag).unwrap(), "12");
    }

    #[test]
    fn test_unclosed_action() {
        let err = CompiledTemplate::compile("/bad", "/?key={{ .Key").unwrap_err();
        assert_eq!(
            err,
            TemplateError::Unclosed {
                name: "/bad".to_string(),
                offset: 6
            }
        );
    }

    #[test]
    fn test_unsupported_action() {
        let err = CompiledTemplate::compile("/bad", "/{{ if .Key }}").unwrap_err();
        assert!(matches!(err, TemplateError::UnsupportedAction { .. }));

        let err = CompiledTemplate::compile("/bad", "/{{}}").unwrap_err();
        assert!(matches!(err, TemplateError::UnsupportedAction { .. }));
    }

    #[test]
    fn test_missing_field() {
        let tmpl = CompiledTemplate::compile("/t", "/{{ .Missing }}").unwrap();
        let err = tmpl.render(&ViewBag::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingField {
                name: "/t".to_string(),
                field: "Missing".to_string()
            }
        );
    }

    #[test]
    fn test_view_bag_extend_overwrites() {
        let mut bag = ViewBag::new().with("Foo", "1").with("Bar", "2");
        bag.extend_from(&ViewBag::new().with("Foo", "3"));

        assert_eq!(bag.get("Foo"), Some("3"));
        assert_eq!(bag.get("Bar"), Some("2"));
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn test_view_bag_from_iter() {
        let bag: ViewBag = vec![("Foo", "Bar")].into_iter().collect();
        assert_eq!(bag.get("Foo"), Some("Bar"));
        assert!(!bag.is_empty());
    }
}
