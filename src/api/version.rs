//! Server API versions and version gating
//!
//! Every operation may declare constraints like `">=0.6.1"` or `"<0.7"`.
//! A constraint is compared at the precision it is written with: `"<0.7"`
//! looks at `major.minor` only, `">=0.6.1"` at all three components. This
//! matches how the server reports compatibility ranges (`0.6.1` and `0.6.3`
//! both belong to the `0.6` line).

use super::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Version of this client, reported to the server in the User-Agent
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A `major.minor.patch` API version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl ApiVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    fn components(&self) -> [u64; 3] {
        [self.major, self.minor, self.patch]
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parse up to three dot-separated numeric components.
/// Returns the components (missing ones are 0) and how many were written.
fn parse_components(input: &str) -> Result<([u64; 3], usize)> {
    let trimmed = input.trim().trim_start_matches(['v', 'V']);
    // Pre-release and build metadata do not take part in gating
    let core = trimmed
        .split(['-', '+'])
        .next()
        .unwrap_or_default();

    if core.is_empty() {
        return Err(Error::InvalidVersion(input.to_string()));
    }

    let mut components = [0u64; 3];
    let mut count = 0;
    for part in core.split('.') {
        if count == 3 {
            return Err(Error::InvalidVersion(input.to_string()));
        }
        components[count] = part
            .parse()
            .map_err(|_| Error::InvalidVersion(input.to_string()))?;
        count += 1;
    }

    Ok((components, count))
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let ([major, minor, patch], _) = parse_components(s)?;
        Ok(Self::new(major, minor, patch))
    }
}

/// Comparison operator of a version constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparator {
    fn symbol(self) -> &'static str {
        match self {
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
        }
    }

    fn matches(self, ordering: Ordering) -> bool {
        match self {
            Comparator::Eq => ordering == Ordering::Equal,
            Comparator::Ne => ordering != Ordering::Equal,
            Comparator::Gt => ordering == Ordering::Greater,
            Comparator::Ge => ordering != Ordering::Less,
            Comparator::Lt => ordering == Ordering::Less,
            Comparator::Le => ordering != Ordering::Greater,
        }
    }
}

/// A single constraint such as `>=0.6.1` or `!=0.6`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionConstraint {
    pub comparator: Comparator,
    components: [u64; 3],
    precision: usize,
}

impl VersionConstraint {
    /// Whether `version` satisfies this constraint, compared only on the
    /// components the constraint spells out.
    pub fn matches(&self, version: &ApiVersion) -> bool {
        let actual = &version.components()[..self.precision];
        let wanted = &self.components[..self.precision];
        self.comparator.matches(actual.cmp(wanted))
    }
}

impl FromStr for VersionConstraint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (comparator, rest) = if let Some(rest) = s.strip_prefix(">=") {
            (Comparator::Ge, rest)
        } else if let Some(rest) = s.strip_prefix("<=") {
            (Comparator::Le, rest)
        } else if let Some(rest) = s.strip_prefix("!=") {
            (Comparator::Ne, rest)
        } else if let Some(rest) = s.strip_prefix("==") {
            (Comparator::Eq, rest)
        } else if let Some(rest) = s.strip_prefix('>') {
            (Comparator::Gt, rest)
        } else if let Some(rest) = s.strip_prefix('<') {
            (Comparator::Lt, rest)
        } else {
            (Comparator::Eq, s)
        };

        let (components, precision) = parse_components(rest)?;
        Ok(Self {
            comparator,
            components,
            precision,
        })
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components[..self.precision]
            .iter()
            .map(|c| c.to_string())
            .collect();
        write!(f, "{}{}", self.comparator.symbol(), parts.join("."))
    }
}

/// Check an operation's declared constraints against the negotiated server
/// version. All constraints must hold; an unknown version fails any gated
/// operation.
pub fn check_accepted(
    operation: &'static str,
    accepted: &[&str],
    actual: Option<ApiVersion>,
) -> Result<()> {
    if accepted.is_empty() {
        return Ok(());
    }

    let constraints = accepted
        .iter()
        .map(|c| c.parse::<VersionConstraint>())
        .collect::<Result<Vec<_>>>()?;

    let unsupported = || Error::UnsupportedVersion {
        operation,
        required: accepted.join(", "),
        actual,
    };

    let Some(version) = actual else {
        return Err(unsupported());
    };

    if constraints.iter().all(|c| c.matches(&version)) {
        Ok(())
    } else {
        tracing::debug!(
            "{} rejected: server {} does not satisfy {}",
            operation,
            version,
            accepted.join(", ")
        );
        Err(unsupported())
    }
}
