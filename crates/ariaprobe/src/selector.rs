//! Selectors for locating target elements.
//!
//! A selector is carried as the CSS string the browser evaluates. The
//! in-memory fixture page only understands the simple forms checks use in
//! practice (`#id`, `.class`, `tag`), so selectors also parse into
//! [`SimpleSelector`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::result::{AriaError, AriaResult};

/// CSS selector identifying one or more elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(String);

impl Selector {
    /// Create a selector from a CSS string
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    /// Create an id selector (`#id`)
    #[must_use]
    pub fn id(id: &str) -> Self {
        Self(format!("#{id}"))
    }

    /// Create a class selector (`.class`)
    #[must_use]
    pub fn class(class: &str) -> Self {
        Self(format!(".{class}"))
    }

    /// The raw CSS text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the selector holds no text
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Parse into a simple selector form
    pub fn simple(&self) -> AriaResult<SimpleSelector> {
        SimpleSelector::parse(&self.0)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        Self::css(s)
    }
}

/// Single-component selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `tag`
    Tag(String),
}

impl SimpleSelector {
    /// Parse a one-component selector
    pub fn parse(raw: &str) -> AriaResult<Self> {
        let raw = raw.trim();
        let unsupported = || AriaError::UnsupportedSelector {
            selector: raw.to_string(),
        };

        let (ctor, name): (fn(String) -> Self, &str) = if let Some(rest) = raw.strip_prefix('#') {
            (Self::Id, rest)
        } else if let Some(rest) = raw.strip_prefix('.') {
            (Self::Class, rest)
        } else {
            (Self::Tag, raw)
        };

        if name.is_empty() || !name.chars().all(is_ident_char) {
            return Err(unsupported());
        }
        Ok(ctor(name.to_string()))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
