//! IATA airport codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Why a string is not an airport code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAirportCode {
    #[error("invalid airport code {code:?}: expected 3 letters, got {len}")]
    WrongLength { code: String, len: usize },

    #[error("invalid airport code {code:?}: {found:?} is not an uppercase letter")]
    NotUppercase { code: String, found: char },
}

/// Three-letter IATA code such as `BOS`.
///
/// Stored inline as ASCII bytes, so it is `Copy` and cheap to keep in the
/// search's visited sets. Ordering is alphabetical.
///
/// ```
/// use itinerary_planner::domain::AirportCode;
///
/// let pvd: AirportCode = "PVD".parse().unwrap();
/// assert_eq!(pvd.to_string(), "PVD");
/// assert!("pvd".parse::<AirportCode>().is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AirportCode([u8; 3]);

impl AirportCode {
    /// Strict parse: exactly three ASCII capitals.
    pub fn parse(s: &str) -> Result<Self, InvalidAirportCode> {
        if let Some(found) = s.chars().find(|c| !c.is_ascii_uppercase()) {
            return Err(InvalidAirportCode::NotUppercase {
                code: s.to_string(),
                found,
            });
        }

        let bytes: [u8; 3] = s
            .as_bytes()
            .try_into()
            .map_err(|_| InvalidAirportCode::WrongLength {
                code: s.to_string(),
                len: s.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Lenient parse for schedule files: trims and uppercases first.
    ///
    /// ```
    /// use itinerary_planner::domain::AirportCode;
    ///
    /// assert_eq!(AirportCode::parse_normalized(" pvd ").unwrap().as_str(), "PVD");
    /// ```
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidAirportCode> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        // Construction admits ASCII only
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl FromStr for AirportCode {
    type Err = InvalidAirportCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AirportCode({})", self.as_str())
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for AirportCode {
    type Error = InvalidAirportCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AirportCode> for String {
    fn from(code: AirportCode) -> Self {
        code.as_str().to_string()
    }
}
