//! Domain types for trajdiff-metrics.

use std::fmt;
use std::str::FromStr;

use crate::error::MetricError;

/// A measured kinematic quantity of the ego vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quantity {
    /// Scalar speed.
    Speed,
    /// Heading angle in degrees, after branch correction.
    Heading,
    /// Longitudinal position.
    X,
    /// Lateral position.
    Y,
}

impl Quantity {
    /// Every quantity, in report order.
    pub const ALL: [Quantity; 4] = [Quantity::Speed, Quantity::Heading, Quantity::X, Quantity::Y];

    /// Lower-case name used in reports and fused column headers.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Heading => "heading",
            Self::X => "x",
            Self::Y => "y",
        }
    }

    /// Position in [`Quantity::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Quantity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quantity::ALL
            .into_iter()
            .find(|q| q.name() == s)
            .ok_or_else(|| format!("unknown quantity \"{s}\""))
    }
}

/// Name of one simulation source, e.g. `sumo`, `carla` or `cosim`.
///
/// Must match `[a-zA-Z0-9_-]+` so it can be used in file names and CSV
/// headers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId(String);

impl SourceId {
    /// Parse and validate a source name.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::InvalidSourceId`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: impl Into<String>) -> Result<Self, MetricError> {
        let name = name.into();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(MetricError::InvalidSourceId { name });
        }
        Ok(Self(name))
    }

    /// Return the source name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// An ordered comparison of two sources. `second` is the normalizing
/// reference for magnitude and topology error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourcePair {
    /// Compared source, sequence `A`.
    pub first: SourceId,
    /// Reference source, sequence `B`.
    pub second: SourceId,
}

impl SourcePair {
    /// Every pair `(s_i, s_j)` with `i < j`, in input order.
    ///
    /// For `[a, b, c]` this is `a-b`, `a-c`, `b-c`.
    #[must_use]
    pub fn all(sources: &[SourceId]) -> Vec<SourcePair> {
        let mut pairs = Vec::new();
        for (i, first) in sources.iter().enumerate() {
            for second in &sources[i + 1..] {
                pairs.push(SourcePair {
                    first: first.clone(),
                    second: second.clone(),
                });
            }
        }
        pairs
    }
}

impl fmt::Display for SourcePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<SourceId> {
        names.iter().map(|n| SourceId::new(*n).unwrap()).collect()
    }

    #[test]
    fn quantity_names_round_trip() {
        for q in Quantity::ALL {
            assert_eq!(q.name().parse::<Quantity>().unwrap(), q);
            assert_eq!(Quantity::ALL[q.index()], q);
        }
        assert!("velocity".parse::<Quantity>().is_err());
    }

    #[test]
    fn source_id_validation() {
        assert!(SourceId::new("carla_2").is_ok());
        assert!(SourceId::new("co-sim").is_ok());
        assert!(SourceId::new("").is_err());
        assert!(SourceId::new("a b").is_err());
        assert!(SourceId::new("../x").is_err());
    }

    #[test]
    fn pairs_in_input_order() {
        let pairs = SourcePair::all(&ids(&["carla", "sumo", "cosim"]));
        let names: Vec<String> = pairs.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["carla-sumo", "carla-cosim", "sumo-cosim"]);
    }

    #[test]
    fn two_sources_one_pair() {
        assert_eq!(SourcePair::all(&ids(&["a", "b"])).len(), 1);
        assert!(SourcePair::all(&ids(&["a"])).is_empty());
    }
}
