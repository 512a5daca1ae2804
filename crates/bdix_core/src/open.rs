use std::fmt;
use std::str::FromStr;

/// Which reachable servers to open in the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenTarget {
    All,
    /// 1-based position in the result listing.
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOpenTargetError(pub String);

impl fmt::Display for ParseOpenTargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid open target '{}' (expected a number from 1 or 'all')", self.0)
    }
}

impl std::error::Error for ParseOpenTargetError {}

impl FromStr for OpenTarget {
    type Err = ParseOpenTargetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(OpenTarget::All);
        }
        match trimmed.parse::<usize>() {
            Ok(index) if index >= 1 => Ok(OpenTarget::Index(index)),
            _ => Err(ParseOpenTargetError(trimmed.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_or_positive_index() {
        assert_eq!("ALL".parse::<OpenTarget>(), Ok(OpenTarget::All));
        assert_eq!(" 3 ".parse::<OpenTarget>(), Ok(OpenTarget::Index(3)));
        assert!("0".parse::<OpenTarget>().is_err());
        assert!("first".parse::<OpenTarget>().is_err());
    }
}
