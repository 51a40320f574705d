//! Warning signatures.
//!
//! A signature decides which compiler output lines start a warning we
//! care about. The set is fixed; each variant owns a compiled regex that
//! is built once and cached for the life of the process.

use std::sync::OnceLock;

use regex::Regex;

/// Which warning lines count as the start of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signature {
    /// `warning: <call> is undefined or private` (the line must end there).
    UndefinedOrPrivate,
    /// `warning: unused alias <Name>` (prefix match).
    UnusedAlias,
}

static UNDEFINED_OR_PRIVATE: OnceLock<Regex> = OnceLock::new();
static UNUSED_ALIAS: OnceLock<Regex> = OnceLock::new();

impl Signature {
    /// All supported signatures, in display order.
    pub fn all() -> &'static [Signature] {
        &[Signature::UndefinedOrPrivate, Signature::UnusedAlias]
    }

    /// Stable name used on the command line and in config files.
    pub fn name(&self) -> &'static str {
        match self {
            Signature::UndefinedOrPrivate => "undefined-private",
            Signature::UnusedAlias => "unused-alias",
        }
    }

    /// Short human description.
    pub fn description(&self) -> &'static str {
        match self {
            Signature::UndefinedOrPrivate => "'... is undefined or private' warnings",
            Signature::UnusedAlias => "'unused alias ...' warnings",
        }
    }

    fn regex(&self) -> &'static Regex {
        match self {
            Signature::UndefinedOrPrivate => UNDEFINED_OR_PRIVATE.get_or_init(|| {
                Regex::new(r"^\s*warning: .* is undefined or private$")
                    .expect("static pattern is valid")
            }),
            Signature::UnusedAlias => UNUSED_ALIAS.get_or_init(|| {
                Regex::new(r"^\s*warning: unused alias ").expect("static pattern is valid")
            }),
        }
    }

    /// Does `line` start a warning of this kind?
    ///
    /// `line` must already have its terminator stripped.
    pub fn matches(&self, line: &str) -> bool {
        self.regex().is_match(line)
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Signature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "undefined-private" | "undefined" => Ok(Signature::UndefinedOrPrivate),
            "unused-alias" | "aliases" | "alias" => Ok(Signature::UnusedAlias),
            _ => Err(format!("unknown warning signature: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_or_private_requires_suffix() {
        let sig = Signature::UndefinedOrPrivate;
        assert!(sig.matches("warning: Foo.bar/1 is undefined or private"));
        assert!(sig.matches("    warning: Foo.bar/1 is undefined or private"));
        assert!(!sig.matches("warning: Foo.bar/1 is undefined or private."));
        assert!(!sig.matches("warning: Foo.bar/1 is undefined (module Foo is not available)"));
        assert!(!sig.matches("error: Foo.bar/1 is undefined or private"));
    }

    #[test]
    fn test_unused_alias_is_prefix() {
        let sig = Signature::UnusedAlias;
        assert!(sig.matches("warning: unused alias Repo"));
        assert!(sig.matches("  warning: unused alias Repo, trailing text"));
        assert!(!sig.matches("warning: unused alias"));
        assert!(!sig.matches("warning: unused variable \"x\""));
    }

    #[test]
    fn test_signature_names_round_trip() {
        for sig in Signature::all() {
            assert_eq!(sig.name().parse::<Signature>().unwrap(), *sig);
            assert_eq!(sig.to_string(), sig.name());
        }
    }

    #[test]
    fn test_signature_aliases() {
        assert_eq!("undefined".parse::<Signature>().unwrap(), Signature::UndefinedOrPrivate);
        assert_eq!("UNUSED_ALIAS".parse::<Signature>().unwrap(), Signature::UnusedAlias);
        assert!("deprecated".parse::<Signature>().is_err());
    }
}
