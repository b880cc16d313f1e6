//! Whitespace settings shared by every rule

use serde::{Deserialize, Serialize};

/// Line ending style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// Parse a config string: `"lf"`, `"crlf"`, or an escaped/raw ending
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("crlf") || s.contains("\\r\\n") || s.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_ending_parse() {
        assert_eq!(LineEnding::parse("lf"), LineEnding::Lf);
        assert_eq!(LineEnding::parse("CRLF"), LineEnding::CrLf);
        assert_eq!(LineEnding::parse("\\r\\n"), LineEnding::CrLf);
        assert_eq!(LineEnding::CrLf.as_str(), "\r\n");
    }
}
