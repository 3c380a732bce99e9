use crate::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The lifecycle status of an order.
///
/// The set of statuses is owned by the order-management system, so any value
/// that is not one of the well-known variants is kept in `Other` instead of
/// being rejected. `Other` holds trimmed upper-case text that names no
/// well-known status; `FromStr` always produces it that way, and
/// [`OrderStatus::normalized`] repairs values built by hand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    /// The canonical upper-case text stored in the database.
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Other(s) => s,
        }
    }

    /// Maps an `Other` that spells a well-known status (in any case) onto
    /// that variant, and upper-cases the rest.
    pub fn normalized(self) -> Self {
        match self {
            OrderStatus::Other(text) => text.parse().unwrap_or(OrderStatus::Other(text)),
            known => known,
        }
    }

    /// Every upper-case spelling that parses to this status.
    pub fn spellings(&self) -> Vec<String> {
        match self.clone().normalized() {
            OrderStatus::Cancelled => vec!["CANCELLED".to_string(), "CANCELED".to_string()],
            status => vec![status.as_str().to_string()],
        }
    }

    /// Only completed orders count towards revenue.
    pub fn is_revenue(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidInput(
                "order status".to_string(),
                "status must not be empty".to_string(),
            ));
        }
        let status = match trimmed.to_ascii_uppercase().as_str() {
            "PENDING" => OrderStatus::Pending,
            "PREPARING" => OrderStatus::Preparing,
            "READY" => OrderStatus::Ready,
            "COMPLETED" => OrderStatus::Completed,
            "CANCELLED" | "CANCELED" => OrderStatus::Cancelled,
            other => OrderStatus::Other(other.to_string()),
        };
        Ok(status)
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_statuses_case_insensitively() {
        assert_eq!("completed".parse::<OrderStatus>().unwrap(), OrderStatus::Completed);
        assert_eq!(" Pending ".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!("canceled".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
    }

    #[test]
    fn keeps_unknown_statuses() {
        let status: OrderStatus = "refunded".parse().unwrap();
        assert_eq!(status, OrderStatus::Other("REFUNDED".to_string()));
        assert_eq!(status.to_string(), "REFUNDED");
        assert!(!status.is_revenue());
    }

    #[test]
    fn hand_built_other_values_normalize() {
        assert_eq!(OrderStatus::Other("PENDING".to_string()).normalized(), OrderStatus::Pending);
        assert_eq!(OrderStatus::Other("completed".to_string()).normalized(), OrderStatus::Completed);
        assert_eq!(
            OrderStatus::Other(" refunded".to_string()).normalized(),
            OrderStatus::Other("REFUNDED".to_string())
        );
        assert_eq!(OrderStatus::Ready.normalized(), OrderStatus::Ready);
    }

    #[test]
    fn cancelled_has_both_spellings() {
        assert_eq!(OrderStatus::Cancelled.spellings(), vec!["CANCELLED", "CANCELED"]);
        assert_eq!(OrderStatus::Other("done".to_string()).spellings(), vec!["DONE"]);
    }

    #[test]
    fn rejects_blank_status() {
        assert!("   ".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn serializes_as_upper_case_text() {
        let json = serde_json::to_string(&OrderStatus::Completed).unwrap();
        assert_eq!(json, "\"COMPLETED\"");
        let back: OrderStatus = serde_json::from_str("\"ready\"").unwrap();
        assert_eq!(back, OrderStatus::Ready);
    }
}
