//! Mapping entity representing a redirect from a request key to a destination.

use std::fmt;
use thiserror::Error;

/// Marker that flags a destination as a template.
pub const TEMPLATE_MARKER: &str = "{{";

/// A redirect mapping.
///
/// `is_template` is derived from `destination` by [`Mapping::validate`] and is
/// never taken from user input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    pub key: String,
    pub destination: String,
    pub permanent: bool,
    pub comment: Option<String>,
    pub is_template: bool,
}

/// Reasons a mapping fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("no key defined")]
    KeyMissing,

    #[error("no destination defined")]
    DestinationMissing,
}

impl Mapping {
    /// Creates a mapping without a comment.
    ///
    /// The template flag is computed immediately, so the result is equal to
    /// the same mapping after [`Mapping::validate`].
    pub fn new(key: impl Into<String>, destination: impl Into<String>, permanent: bool) -> Self {
        let destination = destination.into();
        Self {
            key: key.into(),
            is_template: is_template(&destination),
            destination,
            permanent,
            comment: None,
        }
    }

    /// Attaches a free-text comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Checks that key and destination are present and recomputes
    /// `is_template`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::KeyMissing`] or [`MappingError::DestinationMissing`].
    pub fn validate(&mut self) -> Result<(), MappingError> {
        if self.key.is_empty() {
            return Err(MappingError::KeyMissing);
        }

        if self.destination.is_empty() {
            return Err(MappingError::DestinationMissing);
        }

        self.is_template = is_template(&self.destination);
        Ok(())
    }

    /// Consuming variant of [`Mapping::validate`].
    pub fn validated(mut self) -> Result<Self, MappingError> {
        self.validate()?;
        Ok(self)
    }
}

/// Returns true if the destination contains template markers.
pub fn is_template(destination: &str) -> bool {
    destination.contains(TEMPLATE_MARKER)
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = if self.permanent { "=>" } else { "->" };
        write!(f, "{} {} {}", self.key, arrow, self.destination)
    }
}
