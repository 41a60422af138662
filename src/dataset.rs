//! Dataset profiles: which JSON keys hold user, item, value and time.

use crate::error::ConvertError;
use std::fmt;
use std::str::FromStr;

/// The supported source datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    /// Amazon product reviews (McAuley et al.)
    Amazon,
    /// Google Local reviews, after `googlelocal-clean`
    GoogleLocal,
}

/// Key names of the four projected fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetProfile {
    pub user: &'static str,
    pub item: &'static str,
    pub value: &'static str,
    pub time: &'static str,
}

const AMAZON: DatasetProfile = DatasetProfile {
    user: "reviewerID",
    item: "asin",
    value: "overall",
    time: "unixReviewTime",
};

const GOOGLE_LOCAL: DatasetProfile = DatasetProfile {
    user: "gPlusUserId",
    item: "gPlusPlaceId",
    value: "rating",
    time: "unixReviewTime",
};

impl Dataset {
    /// All dataset names accepted on the command line.
    pub const NAMES: [&'static str; 2] = ["amazon", "googlelocal"];

    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Amazon => "amazon",
            Dataset::GoogleLocal => "googlelocal",
        }
    }

    pub fn profile(&self) -> DatasetProfile {
        match self {
            Dataset::Amazon => AMAZON,
            Dataset::GoogleLocal => GOOGLE_LOCAL,
        }
    }
}

impl FromStr for Dataset {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amazon" => Ok(Dataset::Amazon),
            "googlelocal" => Ok(Dataset::GoogleLocal),
            _ => Err(ConvertError::UnsupportedDataset(s.to_string())),
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl DatasetProfile {
    /// Keys in output order: user, item, value, time.
    pub fn keys(&self) -> [&'static str; 4] {
        [self.user, self.item, self.value, self.time]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amazon_profile() {
        let profile = "amazon".parse::<Dataset>().unwrap().profile();
        assert_eq!(
            profile.keys(),
            ["reviewerID", "asin", "overall", "unixReviewTime"]
        );
    }

    #[test]
    fn test_googlelocal_profile() {
        let profile = "googlelocal".parse::<Dataset>().unwrap().profile();
        assert_eq!(
            profile.keys(),
            ["gPlusUserId", "gPlusPlaceId", "rating", "unixReviewTime"]
        );
    }

    #[test]
    fn test_unsupported_dataset() {
        let err = "foo".parse::<Dataset>().unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedDataset(ref s) if s == "foo"));

        // Names are case-sensitive
        assert!("Amazon".parse::<Dataset>().is_err());
    }

    #[test]
    fn test_names_round_trip() {
        for name in Dataset::NAMES {
            assert_eq!(name.parse::<Dataset>().unwrap().name(), name);
        }
    }
}
