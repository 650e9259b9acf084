use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Regime {
    Old,
    New,
}

impl Regime {
    pub const ALL: [Regime; 2] = [Regime::Old, Regime::New];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Old => "OLD",
            Self::New => "NEW",
        }
    }

    /// Accepts the stored code (`OLD`/`NEW`) in any letter case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OLD" => Some(Self::Old),
            "NEW" => Some(Self::New),
            _ => None,
        }
    }

    /// Value of the `OptOutNewTaxRegime` flag in the return document.
    pub fn opt_out_flag(&self) -> &'static str {
        match self {
            Self::Old => "Y",
            Self::New => "N",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
