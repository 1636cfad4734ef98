//! Checkout: shipping, payment and review in one command.
//!
//! Name and email default to the signed-in account.
//!
//! ```bash
//! medicart checkout --address "12 Main St" --city Austin --state TX --zip 78701 \
//!     --phone 555-0100 --payment cod
//! MEDICART_CARD_CVV=123 medicart checkout ... --payment credit \
//!     --card-name "Abdi Hassan" --card-number "4111 1111 1111 1111" --expiry 12/29
//! ```

use std::fmt::Write as _;

use clap::Args;

use medicart_client::AppContext;
use medicart_client::checkout::{
    CardDetails, OrderConfirmation, PaymentInfo, PaymentMethod, ShippingInfo,
};
use medicart_core::format_money;

use super::CliError;

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Full name (defaults to the signed-in account)
    #[arg(long)]
    pub name: Option<String>,

    /// Contact email (defaults to the signed-in account)
    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub address: String,

    #[arg(long)]
    pub city: String,

    #[arg(long)]
    pub state: String,

    #[arg(long)]
    pub zip: String,

    #[arg(long)]
    pub phone: String,

    /// `credit`, `paypal` or `cod`
    #[arg(long, default_value = "credit")]
    pub payment: PaymentMethod,

    #[arg(long)]
    pub card_name: Option<String>,

    #[arg(long)]
    pub card_number: Option<String>,

    /// `MM/YY`
    #[arg(long)]
    pub expiry: Option<String>,

    #[arg(long, env = "MEDICART_CARD_CVV", hide_env_values = true)]
    pub cvv: Option<String>,
}

impl CheckoutArgs {
    fn card(&self) -> Option<CardDetails> {
        (self.payment == PaymentMethod::Credit).then(|| CardDetails {
            name: self.card_name.clone().unwrap_or_default(),
            number: self.card_number.clone().unwrap_or_default(),
            expiry: self.expiry.clone().unwrap_or_default(),
            cvv: self.cvv.clone().unwrap_or_default(),
        })
    }
}

pub fn run(ctx: &mut AppContext, args: CheckoutArgs) -> Result<String, CliError> {
    let mut wizard = ctx.start_checkout();
    let prefill = wizard.shipping().cloned().unwrap_or_default();

    let card = args.card();
    wizard.submit_shipping(ShippingInfo {
        full_name: args.name.unwrap_or(prefill.full_name),
        email: args.email.unwrap_or(prefill.email),
        address: args.address,
        city: args.city,
        state: args.state,
        zip_code: args.zip,
        phone: args.phone,
    })?;
    wizard.submit_payment(PaymentInfo {
        method: args.payment,
        card,
    })?;

    let confirmation = wizard.place_order(ctx.cart_mut())?;
    Ok(render(confirmation))
}

fn render(order: &OrderConfirmation) -> String {
    let mut out = format!("Order {} placed.\n\n", order.order_number);
    for line in &order.lines {
        let _ = writeln!(
            out,
            "  {:<22} {:>3} x {:>7}",
            line.name,
            line.quantity,
            line.unit_price.display()
        );
    }
    let _ = writeln!(out, "\n{}\n", order.summary);
    let _ = writeln!(
        out,
        "Ship to: {}, {}, {}, {} {}",
        order.shipping.full_name,
        order.shipping.address,
        order.shipping.city,
        order.shipping.state,
        order.shipping.zip_code
    );
    let _ = write!(
        out,
        "Payment: {} ({})",
        order.payment_method,
        format_money(order.summary.total)
    );
    out
}
