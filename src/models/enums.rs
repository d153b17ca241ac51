use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(RiskLevel {
    Unknown => "unknown",
    Low => "low",
    Medium => "medium",
    High => "high",
});

impl RiskLevel {
    /// Normalize a classifier-supplied risk string. The external engine emits
    /// a wider vocabulary ("moderate", "critical"); anything unrecognized
    /// degrades to `Unknown` rather than failing the call.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "medium" | "moderate" => Self::Medium,
            "high" | "critical" => Self::High,
            _ => Self::Unknown,
        }
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        Self::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn risk_level_round_trips_through_str() {
        for level in [
            RiskLevel::Unknown,
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
        ] {
            assert_eq!(RiskLevel::from_str(level.as_str()).unwrap(), level);
        }
    }

    #[test]
    fn from_str_rejects_unknown_value() {
        let result = RiskLevel::from_str("catastrophic");
        assert!(result.is_err());
    }

    #[test]
    fn normalize_maps_engine_vocabulary() {
        assert_eq!(RiskLevel::normalize("moderate"), RiskLevel::Medium);
        assert_eq!(RiskLevel::normalize("critical"), RiskLevel::High);
        assert_eq!(RiskLevel::normalize("LOW"), RiskLevel::Low);
        assert_eq!(RiskLevel::normalize("  high "), RiskLevel::High);
    }

    #[test]
    fn normalize_degrades_to_unknown() {
        assert_eq!(RiskLevel::normalize(""), RiskLevel::Unknown);
        assert_eq!(RiskLevel::normalize("banana"), RiskLevel::Unknown);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&RiskLevel::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
