//! Names as written in source.
//!
//! A `Name` keeps the exact spelling of a (possibly qualified) name:
//!
//! | Form | Example | Resolution |
//! |------|---------|------------|
//! | Fully qualified | `\Foo\Bar` | Used as-is (leading `\` dropped) |
//! | Qualified | `Foo\Bar` | First segment may be an import alias |
//! | Unqualified | `Bar` | Import alias, else current namespace |
//! | Relative | `namespace\Bar` | Current namespace |
//!
//! Resolution itself happens in `prism-types::context`; this type only
//! answers structural questions about the spelling.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Name(String);

impl Name {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The name exactly as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `\Foo\Bar`
    pub fn is_fully_qualified(&self) -> bool {
        self.0.starts_with('\\')
    }

    /// `namespace\Foo`
    pub fn is_relative(&self) -> bool {
        self.0.len() > 10 && self.0[..10].eq_ignore_ascii_case("namespace\\")
    }

    /// `Foo\Bar` (neither fully qualified nor relative).
    pub fn is_qualified(&self) -> bool {
        !self.is_fully_qualified() && !self.is_relative() && self.0.contains('\\')
    }

    /// `Bar`
    pub fn is_unqualified(&self) -> bool {
        !self.0.contains('\\')
    }

    /// The name without a leading `\` or `namespace\` prefix.
    pub fn without_prefix(&self) -> &str {
        if self.is_fully_qualified() {
            &self.0[1..]
        } else if self.is_relative() {
            &self.0[10..]
        } else {
            &self.0
        }
    }

    /// First namespace segment (`Foo` in `Foo\Bar\Baz`).
    pub fn first_segment(&self) -> &str {
        let bare = self.without_prefix();
        bare.split('\\').next().unwrap_or(bare)
    }

    /// Everything after the first segment (`Bar\Baz` in `Foo\Bar\Baz`).
    pub fn rest_after_first(&self) -> Option<&str> {
        let bare = self.without_prefix();
        bare.split_once('\\').map(|(_, rest)| rest)
    }

    /// Last segment (`Baz` in `Foo\Bar\Baz`).
    pub fn last_segment(&self) -> &str {
        let bare = self.without_prefix();
        bare.rsplit('\\').next().unwrap_or(bare)
    }

    /// Case-insensitive comparison against a keyword such as `self` or `int`.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.is_unqualified() && self.0.eq_ignore_ascii_case(keyword)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
#[path = "../tests/name_tests.rs"]
mod tests;
