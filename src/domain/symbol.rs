//! Target symbol identity: package path, optional receiver type, member name.

use std::fmt;

use crate::error::{Error, Result};

/// A function (`pkg.Name`) or method (`pkg.Type#Name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub package: String,
    pub receiver: Option<String>,
    pub name: String,
}

impl Symbol {
    pub fn function(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            receiver: None,
            name: name.into(),
        }
    }

    pub fn method(
        package: impl Into<String>,
        receiver: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            receiver: Some(receiver.into()),
            name: name.into(),
        }
    }

    /// Parse `package/path.Name` or `package/path.Type#Name`.
    ///
    /// The package is split off at the last `.`, so package paths may
    /// themselves contain dots and slashes (`example.com/app/foo.Run`).
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidTarget {
            target: text.to_string(),
            reason,
        };

        let (package, rest) = text
            .rsplit_once('.')
            .ok_or_else(|| invalid("missing package separator `.`"))?;
        if package.is_empty() {
            return Err(invalid("empty package path"));
        }
        if rest.is_empty() {
            return Err(invalid("empty function or method name"));
        }

        match rest.split_once('#') {
            Some((receiver, name)) => {
                if receiver.is_empty() || name.is_empty() {
                    return Err(invalid("empty receiver type or method name"));
                }
                Ok(Self::method(package, receiver, name))
            }
            None => Ok(Self::function(package, rest)),
        }
    }

    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }

    /// Canonical form with the receiver separator rewritten to `.`,
    /// i.e. how a qualified call site spells the callee.
    pub fn dotted(&self) -> String {
        match &self.receiver {
            Some(recv) => format!("{}.{}.{}", self.package, recv, self.name),
            None => format!("{}.{}", self.package, self.name),
        }
    }

    /// Bare member name as it appears at an unqualified call site.
    pub fn base_name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.receiver {
            Some(recv) => write!(f, "{}.{}#{}", self.package, recv, self.name),
            None => write!(f, "{}.{}", self.package, self.name),
        }
    }
}

impl std::str::FromStr for Symbol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Symbol::parse(s)
    }
}
