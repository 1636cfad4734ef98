//! Simulated checkout wizard.
//!
//! Steps run strictly in order: shipping, payment, review, complete. No
//! payment is taken; placing the order snapshots the cart, clears it and
//! issues a `MED-` order number.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use medicart_core::{CartLine, CheckoutStep, Email, format_money};

use crate::cart::CartStore;

/// Flat shipping charge, in cents.
const SHIPPING_CENTS: i64 = 500;

/// Sales tax rate, as a percentage of the subtotal.
const TAX_PERCENT: i64 = 8;

/// Errors returned by [`CheckoutWizard`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("cannot {action} during the {current} step")]
    WrongStep {
        action: &'static str,
        current: CheckoutStep,
    },

    #[error("cart is empty")]
    EmptyCart,

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

/// Delivery address and contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
}

impl ShippingInfo {
    fn validate(&self) -> Result<(), CheckoutError> {
        let required = [
            ("full name", &self.full_name),
            ("email", &self.email),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip code", &self.zip_code),
            ("phone", &self.phone),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingField { field });
            }
        }
        Email::parse(&self.email).map_err(|e| CheckoutError::InvalidField {
            field: "email",
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

/// How the order is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "credit")]
    Credit,
    #[serde(rename = "paypal")]
    PayPal,
    #[serde(rename = "cod")]
    CashOnDelivery,
}

impl PaymentMethod {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Credit => "Credit / Debit Card",
            Self::PayPal => "PayPal",
            Self::CashOnDelivery => "Cash on Delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "paypal" => Ok(Self::PayPal),
            "cod" => Ok(Self::CashOnDelivery),
            _ => Err(format!("invalid payment method: {s} (expected credit, paypal or cod)")),
        }
    }
}

/// Card fields, required for [`PaymentMethod::Credit`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CardDetails {
    pub name: String,
    pub number: String,
    /// `MM/YY`
    pub expiry: String,
    pub cvv: String,
}

// Only the last four digits are ever shown.
impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("name", &self.name)
            .field("number", &format_args!("****{}", self.last_four()))
            .finish_non_exhaustive()
    }
}

impl CardDetails {
    fn digits(&self) -> String {
        self.number
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect()
    }

    /// Last four digits of the card number.
    #[must_use]
    pub fn last_four(&self) -> String {
        let digits = self.digits();
        let skip = digits.chars().count().saturating_sub(4);
        digits.chars().skip(skip).collect()
    }

    fn validate(&self) -> Result<(), CheckoutError> {
        if self.name.trim().is_empty() {
            return Err(CheckoutError::MissingField {
                field: "name on card",
            });
        }

        let digits = self.digits();
        if !digits.chars().all(|c| c.is_ascii_digit()) || !(13..=19).contains(&digits.len()) {
            return Err(CheckoutError::InvalidField {
                field: "card number",
                reason: "must be 13 to 19 digits".to_string(),
            });
        }

        let valid_expiry = self.expiry.trim().split_once('/').is_some_and(|(mm, yy)| {
            mm.len() == 2
                && yy.len() == 2
                && yy.chars().all(|c| c.is_ascii_digit())
                && mm.parse::<u8>().is_ok_and(|m| (1..=12).contains(&m))
        });
        if !valid_expiry {
            return Err(CheckoutError::InvalidField {
                field: "expiry date",
                reason: "expected MM/YY".to_string(),
            });
        }

        let cvv = self.cvv.trim();
        if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(CheckoutError::InvalidField {
                field: "CVV",
                reason: "must be 3 or 4 digits".to_string(),
            });
        }
        Ok(())
    }
}

/// Payment step input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    pub card: Option<CardDetails>,
}

impl PaymentInfo {
    fn validate(&self) -> Result<(), CheckoutError> {
        match (self.method, &self.card) {
            (PaymentMethod::Credit, Some(card)) => card.validate(),
            (PaymentMethod::Credit, None) => Err(CheckoutError::MissingField {
                field: "card details",
            }),
            (PaymentMethod::PayPal | PaymentMethod::CashOnDelivery, _) => Ok(()),
        }
    }
}

/// Order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderSummary {
    /// Flat shipping plus tax on `subtotal`, rounded to cents.
    #[must_use]
    pub fn for_subtotal(subtotal: Decimal) -> Self {
        let shipping = Decimal::new(SHIPPING_CENTS, 2);
        let tax = (subtotal * Decimal::new(TAX_PERCENT, 2))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal.saturating_add(shipping).saturating_add(tax),
        }
    }
}

impl fmt::Display for OrderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Subtotal  {}", format_money(self.subtotal))?;
        writeln!(f, "Shipping  {}", format_money(self.shipping))?;
        writeln!(f, "Tax       {}", format_money(self.tax))?;
        write!(f, "Total     {}", format_money(self.total))
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    /// `MED-` followed by a number below 10000.
    pub order_number: String,
    pub lines: Vec<CartLine>,
    pub summary: OrderSummary,
    pub shipping: ShippingInfo,
    pub payment_method: PaymentMethod,
    pub placed_at: DateTime<Utc>,
}

fn order_number() -> String {
    let n: u32 = rand::rng().random_range(0..10_000);
    format!("MED-{n}")
}

/// Checkout flow state.
#[derive(Debug, Default)]
pub struct CheckoutWizard {
    step: CheckoutStep,
    shipping: Option<ShippingInfo>,
    payment: Option<PaymentInfo>,
    confirmation: Option<OrderConfirmation>,
}

impl CheckoutWizard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the shipping form pre-filled from the signed-in user.
    #[must_use]
    pub fn prefilled(full_name: &str, email: &Email) -> Self {
        Self {
            shipping: Some(ShippingInfo {
                full_name: full_name.to_string(),
                email: email.to_string(),
                ..ShippingInfo::default()
            }),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub const fn shipping(&self) -> Option<&ShippingInfo> {
        self.shipping.as_ref()
    }

    #[must_use]
    pub const fn payment(&self) -> Option<&PaymentInfo> {
        self.payment.as_ref()
    }

    #[must_use]
    pub const fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }

    fn expect_step(&self, step: CheckoutStep, action: &'static str) -> Result<(), CheckoutError> {
        if self.step == step {
            Ok(())
        } else {
            Err(CheckoutError::WrongStep {
                action,
                current: self.step,
            })
        }
    }

    /// Record shipping details and move to payment.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` if not on the shipping step or a field is invalid.
    pub fn submit_shipping(&mut self, info: ShippingInfo) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Shipping, "submit shipping")?;
        info.validate()?;
        self.shipping = Some(info);
        self.step = CheckoutStep::Payment;
        Ok(())
    }

    /// Record payment details and move to review.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` if not on the payment step or a field is invalid.
    pub fn submit_payment(&mut self, info: PaymentInfo) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Payment, "submit payment")?;
        info.validate()?;
        self.payment = Some(info);
        self.step = CheckoutStep::Review;
        Ok(())
    }

    /// Return to the previous step, keeping entered data. Returns `false` if
    /// there is no previous step.
    pub fn back(&mut self) -> bool {
        match self.step.previous() {
            Some(previous) => {
                self.step = previous;
                true
            }
            None => false,
        }
    }

    /// Place the order: snapshot the cart, clear it and complete.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::WrongStep` unless on the review step, and
    /// `CheckoutError::EmptyCart` if there is nothing to order.
    #[instrument(skip_all)]
    pub fn place_order(&mut self, cart: &mut CartStore) -> Result<&OrderConfirmation, CheckoutError> {
        self.expect_step(CheckoutStep::Review, "place order")?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let (Some(shipping), Some(payment)) = (self.shipping.clone(), self.payment.as_ref()) else {
            return Err(CheckoutError::WrongStep {
                action: "place order",
                current: self.step,
            });
        };

        let confirmation = OrderConfirmation {
            order_number: order_number(),
            lines: cart.items().to_vec(),
            summary: OrderSummary::for_subtotal(cart.cart_total()),
            shipping,
            payment_method: payment.method,
            placed_at: Utc::now(),
        };
        cart.clear_cart();
        self.step = CheckoutStep::Complete;

        info!(
            order_number = %confirmation.order_number,
            total = %confirmation.summary.total,
            "order placed"
        );
        Ok(self.confirmation.insert(confirmation))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use medicart_core::{Price, Product, ProductId};

    use super::*;
    use crate::storage::MemoryStorage;

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            full_name: "Abdi Hassan".to_string(),
            email: "abdi@gmail.com".to_string(),
            address: "12 Market St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_code: "62701".to_string(),
            phone: "555-0100".to_string(),
        }
    }

    fn card() -> CardDetails {
        CardDetails {
            name: "Abdi Hassan".to_string(),
            number: "4111 1111 1111 1111".to_string(),
            expiry: "08/28".to_string(),
            cvv: "123".to_string(),
        }
    }

    fn cart_with(cents: u32, quantity: u32) -> CartStore {
        let mut cart = CartStore::load(Arc::new(MemoryStorage::new()));
        let product = Product {
            id: ProductId::new("1"),
            name: "Ibuprofen 200mg".to_string(),
            description: String::new(),
            price: Price::from_cents(cents),
            image: String::new(),
            category: "Pain Relief".to_string(),
            in_stock: true,
            dosage: "200mg".to_string(),
            brand: "MediPharm".to_string(),
            requires_prescription: false,
        };
        cart.add_item(&product, quantity);
        cart
    }

    fn at_review(method: PaymentMethod) -> CheckoutWizard {
        let mut wizard = CheckoutWizard::new();
        wizard.submit_shipping(shipping()).unwrap();
        let card = (method == PaymentMethod::Credit).then(card);
        wizard.submit_payment(PaymentInfo { method, card }).unwrap();
        wizard
    }

    #[test]
    fn test_order_summary() {
        let summary = OrderSummary::for_subtotal(Decimal::new(2547, 2));
        assert_eq!(summary.shipping, Decimal::new(500, 2));
        // 25.47 * 0.08 = 2.0376
        assert_eq!(summary.tax, Decimal::new(204, 2));
        assert_eq!(summary.total, Decimal::new(3251, 2));
    }

    #[test]
    fn test_out_of_order_steps_rejected() {
        let mut wizard = CheckoutWizard::new();
        let err = wizard
            .submit_payment(PaymentInfo {
                method: PaymentMethod::CashOnDelivery,
                card: None,
            })
            .unwrap_err();
        assert!(matches!(err, CheckoutError::WrongStep { current: CheckoutStep::Shipping, .. }));

        let mut cart = cart_with(899, 1);
        assert!(matches!(
            wizard.place_order(&mut cart),
            Err(CheckoutError::WrongStep { .. })
        ));
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_shipping_validation() {
        let mut wizard = CheckoutWizard::new();
        let info = ShippingInfo {
            city: "  ".to_string(),
            ..shipping()
        };
        assert_eq!(
            wizard.submit_shipping(info),
            Err(CheckoutError::MissingField { field: "city" })
        );

        let info = ShippingInfo {
            email: "abdi.gmail.com".to_string(),
            ..shipping()
        };
        assert!(matches!(
            wizard.submit_shipping(info),
            Err(CheckoutError::InvalidField { field: "email", .. })
        ));
        assert_eq!(wizard.step(), CheckoutStep::Shipping);
    }

    #[test]
    fn test_card_validation() {
        let mut wizard = CheckoutWizard::new();
        wizard.submit_shipping(shipping()).unwrap();

        let short = CardDetails {
            number: "4111 1111".to_string(),
            ..card()
        };
        assert!(matches!(
            wizard.submit_payment(PaymentInfo {
                method: PaymentMethod::Credit,
                card: Some(short),
            }),
            Err(CheckoutError::InvalidField { field: "card number", .. })
        ));

        let bad_expiry = CardDetails {
            expiry: "13/28".to_string(),
            ..card()
        };
        assert!(matches!(
            wizard.submit_payment(PaymentInfo {
                method: PaymentMethod::Credit,
                card: Some(bad_expiry),
            }),
            Err(CheckoutError::InvalidField { field: "expiry date", .. })
        ));

        assert_eq!(
            wizard.submit_payment(PaymentInfo {
                method: PaymentMethod::Credit,
                card: None,
            }),
            Err(CheckoutError::MissingField {
                field: "card details"
            })
        );

        // No card needed for cash on delivery
        wizard
            .submit_payment(PaymentInfo {
                method: PaymentMethod::CashOnDelivery,
                card: None,
            })
            .unwrap();
        assert_eq!(wizard.step(), CheckoutStep::Review);
    }

    #[test]
    fn test_back_keeps_entered_data() {
        let mut wizard = at_review(PaymentMethod::PayPal);
        assert!(wizard.back());
        assert_eq!(wizard.step(), CheckoutStep::Payment);
        assert!(wizard.back());
        assert_eq!(wizard.step(), CheckoutStep::Shipping);
        assert!(!wizard.back());
        assert_eq!(wizard.shipping(), Some(&shipping()));
        assert_eq!(wizard.payment().unwrap().method, PaymentMethod::PayPal);
    }

    #[test]
    fn test_place_order_clears_cart() {
        let mut wizard = at_review(PaymentMethod::Credit);
        let mut cart = cart_with(899, 2);

        let confirmation = wizard.place_order(&mut cart).unwrap().clone();
        assert!(confirmation.order_number.starts_with("MED-"));
        let n: u32 = confirmation.order_number.trim_start_matches("MED-").parse().unwrap();
        assert!(n < 10_000);
        assert_eq!(confirmation.lines.len(), 1);
        assert_eq!(confirmation.summary.subtotal, Decimal::new(1798, 2));
        assert_eq!(confirmation.payment_method, PaymentMethod::Credit);

        assert!(cart.is_empty());
        assert_eq!(wizard.step(), CheckoutStep::Complete);
        assert!(!wizard.back());

        // Completed checkout cannot be placed twice
        assert!(matches!(
            wizard.place_order(&mut cart),
            Err(CheckoutError::WrongStep { .. })
        ));
    }

    #[test]
    fn test_place_order_requires_items() {
        let mut wizard = at_review(PaymentMethod::CashOnDelivery);
        let mut cart = CartStore::load(Arc::new(MemoryStorage::new()));
        assert_eq!(
            wizard.place_order(&mut cart).unwrap_err(),
            CheckoutError::EmptyCart
        );
        assert_eq!(wizard.step(), CheckoutStep::Review);
    }

    #[test]
    fn test_card_debug_is_masked() {
        let debug = format!("{:?}", card());
        assert!(debug.contains("****1111"));
        assert!(!debug.contains("4111 1111"));
        assert!(!debug.contains("123"));
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("cod".parse::<PaymentMethod>(), Ok(PaymentMethod::CashOnDelivery));
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }
}
