//! Requirement strings.
//!
//! A requirement names a package and, optionally, a list of version
//! specifiers. Both conda (`numpy=1.26`, `numpy >=1.20`) and pip
//! (`numpy>=1.20,<2`, `astropy[all]>=5`) spellings are accepted.
//!
//! Only the minimum-version floor is ever enforced. Upper bounds, exact
//! pins and exclusions parse fine but are not checked. Anything after the
//! name and constraint that the grammar does not cover (conda's
//! `numpy 1.20.*`, PEP 508 `name @ url`, markers) is ignored.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use super::version::Version;
use crate::error::Result;

const OPERATOR: &str = r"~=|==|!=|<=|>=|<|>|=|\^|~";

static REQUIREMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let specifier = format!(r"(?:{})\s*[A-Za-z0-9.*+!_-]*", OPERATOR);
    Regex::new(&format!(
        r"^\s*(?:[A-Za-z0-9._-]+::)?(?P<name>[A-Za-z0-9][A-Za-z0-9._-]*)\s*(?:\[[^\]]*\])?\s*(?P<constraint>{spec}(?:\s*,\s*{spec})*)?(?P<tail>\s*[;@=].*|\s+\S.*)?\s*$",
        spec = specifier
    ))
    .unwrap()
});

static SPECIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(?P<op>{})\s*(?P<version>\S*)$", OPERATOR)).unwrap()
});

static NAME_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").unwrap());

/// Normalize a package name for lookups: lowercase, with runs of `-`, `_`
/// and `.` collapsed to a single `-`.
pub fn normalize_name(name: &str) -> String {
    NAME_SEPARATORS
        .replace_all(&name.to_lowercase(), "-")
        .into_owned()
}

/// Comparison operator of a version specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Less,
    LessEqual,
    /// `==` (pip) or `=` (conda).
    Equal,
    NotEqual,
    GreaterEqual,
    Greater,
    /// `~=`
    Compatible,
    /// `^`
    Caret,
    /// `~`
    Tilde,
}

impl Operator {
    fn parse(op: &str) -> Option<Self> {
        Some(match op {
            "<" => Self::Less,
            "<=" => Self::LessEqual,
            "=" | "==" => Self::Equal,
            "!=" => Self::NotEqual,
            ">=" => Self::GreaterEqual,
            ">" => Self::Greater,
            "~=" => Self::Compatible,
            "^" => Self::Caret,
            "~" => Self::Tilde,
            _ => return None,
        })
    }

    /// Whether the specifier's version acts as a lower bound.
    pub fn sets_floor(self) -> bool {
        matches!(
            self,
            Self::GreaterEqual | Self::Greater | Self::Compatible | Self::Caret | Self::Tilde
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterEqual => ">=",
            Self::Greater => ">",
            Self::Compatible => "~=",
            Self::Caret => "^",
            Self::Tilde => "~",
        }
    }
}

/// One `operator version` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    pub operator: Operator,
    /// Version literal exactly as written.
    pub version: String,
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator.as_str(), self.version)
    }
}

/// A named dependency with an optional version constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Package name as written.
    pub name: String,
    /// Version specifiers; empty means any version is acceptable.
    pub specifiers: Vec<Specifier>,
}

impl Requirement {
    /// Parse a requirement string.
    ///
    /// Returns `None` if the string is not a recognizable requirement.
    pub fn parse(input: &str) -> Option<Self> {
        let caps = REQUIREMENT_PATTERN.captures(input)?;
        let name = caps["name"].to_string();

        if let Some(tail) = caps.name("tail") {
            tracing::debug!("{}: ignoring '{}'", name, tail.as_str().trim());
        }

        let mut specifiers = Vec::new();
        if let Some(constraint) = caps.name("constraint") {
            for part in constraint.as_str().split(',') {
                let part_caps = SPECIFIER_PATTERN.captures(part.trim())?;
                let operator = Operator::parse(&part_caps["op"])?;
                let version = &part_caps["version"];
                // A bare operator carries no bound.
                if version.is_empty() {
                    continue;
                }
                specifiers.push(Specifier {
                    operator,
                    version: version.to_string(),
                });
            }
        }

        Some(Self { name, specifiers })
    }

    /// Normalized lookup key.
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    /// Whether any version constraint was given.
    pub fn has_constraint(&self) -> bool {
        !self.specifiers.is_empty()
    }

    /// The constraint as written, e.g. `>=1.20,<2`.
    pub fn constraint(&self) -> Option<String> {
        if self.specifiers.is_empty() {
            return None;
        }
        let parts: Vec<String> = self.specifiers.iter().map(ToString::to_string).collect();
        Some(parts.join(","))
    }

    /// The enforced minimum version, if any.
    ///
    /// With several lower bounds the highest one wins. Returns the literal
    /// alongside its parsed form so reports can echo what was written.
    pub fn minimum(&self) -> Result<Option<(String, Version)>> {
        let mut floor: Option<(String, Version)> = None;
        for spec in self.specifiers.iter().filter(|s| s.operator.sets_floor()) {
            let version = Version::parse(&spec.version)?;
            let higher = match &floor {
                Some((_, current)) => version > *current,
                None => true,
            };
            if higher {
                floor = Some((spec.version.clone(), version));
            }
        }
        Ok(floor)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(constraint) = self.constraint() {
            write!(f, "{}", constraint)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Requirement {
        Requirement::parse(s).unwrap_or_else(|| panic!("failed to parse {:?}", s))
    }

    #[test]
    fn bare_name() {
        let req = parse("scipy");
        assert_eq!(req.name, "scipy");
        assert!(!req.has_constraint());
        assert!(req.minimum().unwrap().is_none());
    }

    #[test]
    fn pip_minimum() {
        let req = parse("numpy>=1.20");
        assert_eq!(req.name, "numpy");
        assert_eq!(req.constraint().as_deref(), Some(">=1.20"));
        let (literal, version) = req.minimum().unwrap().unwrap();
        assert_eq!(literal, "1.20");
        assert_eq!(version, Version::parse("1.20.0").unwrap());
    }

    #[test]
    fn name_stops_at_whitespace() {
        let req = parse("astropy >= 5.3");
        assert_eq!(req.name, "astropy");
        assert_eq!(req.minimum().unwrap().unwrap().0, "5.3");
    }

    #[test]
    fn conda_single_equals_is_not_a_floor() {
        let req = parse("jupyterlab=4.0");
        assert_eq!(req.specifiers[0].operator, Operator::Equal);
        assert!(req.minimum().unwrap().is_none());
    }

    #[test]
    fn upper_bound_only_has_no_floor() {
        let req = parse("matplotlib<3.9");
        assert!(req.has_constraint());
        assert!(req.minimum().unwrap().is_none());
    }

    #[test]
    fn compatible_release_sets_floor() {
        let req = parse("asdf~=3.0");
        assert_eq!(req.specifiers[0].operator, Operator::Compatible);
        assert_eq!(req.minimum().unwrap().unwrap().0, "3.0");
    }

    #[test]
    fn strict_greater_floor_is_inclusive_literal() {
        let req = parse("photutils>1.9");
        assert_eq!(req.minimum().unwrap().unwrap().0, "1.9");
    }

    #[test]
    fn highest_floor_wins() {
        let req = parse("numpy>=1.20, >=1.22.4,<2");
        assert_eq!(req.specifiers.len(), 3);
        assert_eq!(req.minimum().unwrap().unwrap().0, "1.22.4");
    }

    #[test]
    fn extras_channel_and_marker_are_ignored() {
        let req = parse("astropy[all]>=6.0");
        assert_eq!(req.name, "astropy");
        assert_eq!(req.constraint().as_deref(), Some(">=6.0"));

        let req = parse("conda-forge::romancal");
        assert_eq!(req.name, "romancal");

        let req = parse("tomli>=1.1; python_version < \"3.11\"");
        assert_eq!(req.name, "tomli");
        assert_eq!(req.minimum().unwrap().unwrap().0, "1.1");
    }

    #[test]
    fn dotted_names_are_kept_whole() {
        let req = parse("ruamel.yaml>=0.17");
        assert_eq!(req.name, "ruamel.yaml");
    }

    #[test]
    fn malformed_strings_are_rejected() {
        assert!(Requirement::parse("").is_none());
        assert!(Requirement::parse("# comment").is_none());
        assert!(Requirement::parse("git+https://github.com/spacetelescope/romancal").is_none());
        assert!(Requirement::parse("=1.20").is_none());
    }

    #[test]
    fn conda_space_separated_version_keeps_name() {
        let req = parse("numpy 1.20.*");
        assert_eq!(req.name, "numpy");
        assert!(!req.has_constraint());

        let req = parse("numpy 1.26");
        assert_eq!(req.name, "numpy");
        assert!(req.minimum().unwrap().is_none());
    }

    #[test]
    fn direct_url_reference_keeps_name() {
        let req = parse("stcal @ git+https://github.com/spacetelescope/stcal.git");
        assert_eq!(req.name, "stcal");
        assert!(!req.has_constraint());

        assert_eq!(parse("stcal@https://example.org/stcal.tar.gz").name, "stcal");
    }

    #[test]
    fn conda_build_string_is_ignored() {
        let req = parse("numpy=1.26.4=py311h64a7726_0");
        assert_eq!(req.name, "numpy");
        assert_eq!(req.constraint().as_deref(), Some("==1.26.4"));
    }

    #[test]
    fn trailing_text_after_constraint_keeps_floor() {
        let req = parse("numpy>=1.20 # pinned for the tutorials");
        assert_eq!(req.name, "numpy");
        assert_eq!(req.minimum().unwrap().unwrap().0, "1.20");
    }

    #[test]
    fn bare_operator_has_no_floor() {
        let req = parse("numpy>=");
        assert_eq!(req.name, "numpy");
        assert!(!req.has_constraint());
        assert!(req.minimum().unwrap().is_none());
    }

    #[test]
    fn unparseable_floor_is_an_error() {
        let req = parse("numpy>=latest");
        assert!(req.minimum().is_err());
    }

    #[test]
    fn normalization_folds_case_and_separators() {
        assert_eq!(normalize_name("PyYAML"), "pyyaml");
        assert_eq!(normalize_name("ruamel.yaml"), "ruamel-yaml");
        assert_eq!(normalize_name("Jupyter__Server--Proxy"), "jupyter-server-proxy");
        assert_eq!(parse("Stpsf").key(), "stpsf");
    }

    #[test]
    fn display_round_trips_the_constraint() {
        assert_eq!(parse("numpy >=1.20, <2").to_string(), "numpy>=1.20,<2");
        assert_eq!(parse("scipy").to_string(), "scipy");
    }
}
