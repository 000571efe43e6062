//! Status and method enums for orders.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Orders are recorded as paid at checkout and no further transitions exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Paid,
}

impl OrderStatus {
    /// The stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "Paid",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Paid" => Ok(Self::Paid),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment method chosen at checkout.
///
/// Recorded as given; no payment processor verifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Paypal,
    Applepay,
    Googlepay,
    Bank,
    /// Cash on delivery.
    Cod,
}

impl PaymentMethod {
    /// Every accepted payment method.
    pub const ALL: [Self; 6] = [
        Self::Card,
        Self::Paypal,
        Self::Applepay,
        Self::Googlepay,
        Self::Bank,
        Self::Cod,
    ];

    /// The wire and storage form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Paypal => "paypal",
            Self::Applepay => "applepay",
            Self::Googlepay => "googlepay",
            Self::Bank => "bank",
            Self::Cod => "cod",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let accepted: Vec<&str> = Self::ALL.iter().map(Self::as_str).collect();
                format!(
                    "invalid payment method '{s}' (expected one of: {})",
                    accepted.join(", ")
                )
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_round_trips_through_str() {
        for method in PaymentMethod::ALL {
            assert_eq!(method.as_str().parse::<PaymentMethod>(), Ok(method));
        }
        assert_eq!("  PayPal ".parse::<PaymentMethod>(), Ok(PaymentMethod::Paypal));
    }

    #[test]
    fn test_payment_method_rejects_unknown() {
        let err = "bitcoin".parse::<PaymentMethod>().unwrap_err();
        assert!(err.contains("bitcoin"));
        assert!(err.contains("googlepay"));
    }

    #[test]
    fn test_order_status_defaults_to_paid() {
        assert_eq!(OrderStatus::default(), OrderStatus::Paid);
        assert_eq!("Paid".parse::<OrderStatus>(), Ok(OrderStatus::Paid));
    }
}
