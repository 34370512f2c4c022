//! Placeholder allocation.

use crate::dialect::{Dialect, PlaceholderStyle};

/// Hands out placeholders for one statement and records which field each
/// one stands for.
///
/// Numbered placeholders count up across the whole statement, so a SET
/// clause followed by a WHERE clause yields `$1, $2, $3` and never repeats
/// an index.
#[derive(Debug)]
pub struct Placeholders {
    style: PlaceholderStyle,
    bindings: Vec<String>,
}

impl Placeholders {
    /// Creates an allocator for the given dialect.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self {
            style: dialect.placeholder_style(),
            bindings: Vec::new(),
        }
    }

    /// Allocates the placeholder for `field`.
    pub fn next(&mut self, field: &str) -> String {
        self.bindings.push(String::from(field));
        match self.style {
            PlaceholderStyle::Named(prefix) => format!("{prefix}{field}"),
            PlaceholderStyle::Anonymous => String::from("?"),
            PlaceholderStyle::Numbered => format!("${}", self.bindings.len()),
        }
    }

    /// Returns the number of placeholders allocated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns whether nothing has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Consumes the allocator, returning field names in placeholder order.
    #[must_use]
    pub fn into_bindings(self) -> Vec<String> {
        self.bindings
    }
}
