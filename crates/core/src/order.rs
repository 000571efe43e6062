//! Order drafts and total settlement.
//!
//! A checkout request is parsed into an [`OrderDraft`], which is then
//! *settled* against a [`TotalPolicy`] to produce the snapshot and total that
//! get written to the ledger.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::cart::Cart;
use crate::{PaymentMethod, Price, PriceError, ProductId};

/// Errors raised while validating or settling an order.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("shipping address is required")]
    EmptyAddress,
    #[error("cannot place an order with an empty cart")]
    EmptyCart,
    #[error("product {0} not found")]
    UnknownProduct(ProductId),
    #[error("submitted total {submitted} does not match computed total {computed}")]
    TotalMismatch { submitted: Price, computed: Price },
    #[error("order total {total} exceeds the maximum of {max}")]
    TotalTooLarge { total: Price, max: Decimal },
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// Largest total the ledger's `NUMERIC(12, 2)` column can hold.
#[must_use]
pub fn max_order_total() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

fn check_total(total: Price) -> Result<Price, OrderError> {
    let max = max_order_total();
    if total.amount() > max {
        return Err(OrderError::TotalTooLarge { total, max });
    }
    Ok(total)
}

/// How the stored order total is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalPolicy {
    /// Store the client's total and snapshot as submitted.
    TrustClient,
    /// Reprice every line from the catalog and reject client totals that
    /// differ from the computed one by more than `tolerance`.
    Recompute { tolerance: Decimal },
}

impl Default for TotalPolicy {
    fn default() -> Self {
        Self::Recompute {
            tolerance: Decimal::new(1, 2),
        }
    }
}

/// A validated checkout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    payment_method: PaymentMethod,
    address: String,
    items: Cart,
    client_total: Price,
}

/// The snapshot and total that will be written to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledOrder {
    pub payment_method: PaymentMethod,
    pub address: String,
    pub items: Cart,
    pub total: Price,
}

impl OrderDraft {
    /// Validate the checkout preconditions.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyAddress` if the address is blank and
    /// `OrderError::EmptyCart` if there are no lines.
    pub fn new(
        payment_method: PaymentMethod,
        address: &str,
        items: Cart,
        client_total: Price,
    ) -> Result<Self, OrderError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(OrderError::EmptyAddress);
        }
        if items.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        Ok(Self {
            payment_method,
            address: address.to_owned(),
            items,
            client_total,
        })
    }

    #[must_use]
    pub const fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub const fn items(&self) -> &Cart {
        &self.items
    }

    #[must_use]
    pub const fn client_total(&self) -> Price {
        self.client_total
    }

    /// Produce the ledger entry under `policy`.
    ///
    /// `prices` maps product IDs to their current catalog price and is only
    /// consulted under [`TotalPolicy::Recompute`].
    ///
    /// # Errors
    ///
    /// Under `Recompute`, returns `OrderError::UnknownProduct` for a line
    /// whose product is not in `prices` and `OrderError::TotalMismatch` if
    /// the client total is outside the tolerance. Under either policy,
    /// returns `OrderError::TotalTooLarge` if the stored total would exceed
    /// [`max_order_total`].
    pub fn settle(
        self,
        policy: TotalPolicy,
        prices: &HashMap<ProductId, Price>,
    ) -> Result<SettledOrder, OrderError> {
        match policy {
            TotalPolicy::TrustClient => Ok(SettledOrder {
                payment_method: self.payment_method,
                address: self.address,
                total: check_total(self.client_total)?,
                items: self.items,
            }),
            TotalPolicy::Recompute { tolerance } => {
                let items = self.items.try_reprice(|product_id| {
                    prices
                        .get(&product_id)
                        .copied()
                        .ok_or(OrderError::UnknownProduct(product_id))
                })?;
                let computed = check_total(items.subtotal()?)?;
                if computed.abs_diff(self.client_total) > tolerance {
                    return Err(OrderError::TotalMismatch {
                        submitted: self.client_total,
                        computed,
                    });
                }

                Ok(SettledOrder {
                    payment_method: self.payment_method,
                    address: self.address,
                    items,
                    total: computed,
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::cart::{CartLineItem, ProductSnapshot};

    fn cart_with_stale_price() -> Cart {
        let mut cart = Cart::new();
        let dress = ProductSnapshot {
            id: ProductId::new(1),
            name: "Fallon Dress".to_string(),
            unit_price: Price::from_cents(15_000).unwrap(),
            image_path: None,
        };
        cart.add_item(&dress, Some("M"), None);
        cart.add_item(&dress, Some("M"), None);
        cart
    }

    fn catalog() -> HashMap<ProductId, Price> {
        HashMap::from([(ProductId::new(1), Price::from_cents(16_800).unwrap())])
    }

    #[test]
    fn test_draft_rejects_blank_address_and_empty_cart() {
        let total = Price::ZERO;
        assert_eq!(
            OrderDraft::new(PaymentMethod::Card, "   ", cart_with_stale_price(), total),
            Err(OrderError::EmptyAddress)
        );
        assert_eq!(
            OrderDraft::new(PaymentMethod::Card, "1 Main St", Cart::new(), total),
            Err(OrderError::EmptyCart)
        );
    }

    #[test]
    fn test_trusted_total_is_stored_as_given() {
        let cart = cart_with_stale_price();
        let bogus = Price::from_cents(100).unwrap();
        let draft = OrderDraft::new(PaymentMethod::Cod, " 1 Main St ", cart.clone(), bogus).unwrap();

        let settled = draft.settle(TotalPolicy::TrustClient, &HashMap::new()).unwrap();
        assert_eq!(settled.total, bogus);
        assert_eq!(settled.items, cart);
        assert_eq!(settled.address, "1 Main St");
    }

    #[test]
    fn test_recompute_uses_catalog_prices() {
        let draft = OrderDraft::new(
            PaymentMethod::Paypal,
            "1 Main St",
            cart_with_stale_price(),
            Price::from_cents(33_600).unwrap(),
        )
        .unwrap();

        let settled = draft.settle(TotalPolicy::default(), &catalog()).unwrap();
        assert_eq!(settled.total, Price::from_cents(33_600).unwrap());
        assert_eq!(
            settled.items.lines()[0].unit_price,
            Price::from_cents(16_800).unwrap()
        );
    }

    #[test]
    fn test_recompute_rejects_mismatched_total() {
        let draft = OrderDraft::new(
            PaymentMethod::Card,
            "1 Main St",
            cart_with_stale_price(),
            Price::from_cents(30_000).unwrap(),
        )
        .unwrap();

        let err = draft.settle(TotalPolicy::default(), &catalog()).unwrap_err();
        assert!(matches!(err, OrderError::TotalMismatch { .. }));
    }

    #[test]
    fn test_recompute_accepts_total_within_tolerance() {
        let draft = OrderDraft::new(
            PaymentMethod::Card,
            "1 Main St",
            cart_with_stale_price(),
            Price::from_cents(33_601).unwrap(),
        )
        .unwrap();

        let settled = draft.settle(TotalPolicy::default(), &catalog()).unwrap();
        assert_eq!(settled.total, Price::from_cents(33_600).unwrap());
    }

    #[test]
    fn test_total_beyond_ledger_precision_is_rejected() {
        let huge = CartLineItem {
            product_id: ProductId::new(1),
            size: None,
            color: None,
            quantity: u32::MAX,
            name: "Fallon Dress".to_string(),
            unit_price: Price::from_cents(16_800).unwrap(),
            image_path: None,
        };
        let cart = Cart::from_lines(vec![huge]).unwrap();
        let exact = cart.subtotal().unwrap();

        let draft = OrderDraft::new(PaymentMethod::Card, "1 Main St", cart, exact).unwrap();
        assert!(matches!(
            draft.clone().settle(TotalPolicy::default(), &catalog()),
            Err(OrderError::TotalTooLarge { .. })
        ));
        assert!(matches!(
            draft.settle(TotalPolicy::TrustClient, &HashMap::new()),
            Err(OrderError::TotalTooLarge { .. })
        ));
    }

    #[test]
    fn test_total_at_ledger_maximum_is_accepted() {
        let max = Price::new(max_order_total()).unwrap();
        let draft =
            OrderDraft::new(PaymentMethod::Card, "1 Main St", cart_with_stale_price(), max).unwrap();

        let settled = draft.settle(TotalPolicy::TrustClient, &HashMap::new()).unwrap();
        assert_eq!(settled.total, max);
    }

    #[test]
    fn test_recompute_rejects_unknown_product() {
        let draft = OrderDraft::new(
            PaymentMethod::Bank,
            "1 Main St",
            cart_with_stale_price(),
            Price::ZERO,
        )
        .unwrap();

        assert_eq!(
            draft.settle(TotalPolicy::default(), &HashMap::new()),
            Err(OrderError::UnknownProduct(ProductId::new(1)))
        );
    }
}
