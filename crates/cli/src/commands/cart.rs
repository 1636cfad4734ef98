//! Cart commands.
//!
//! ```bash
//! medicart cart add 1 --quantity 2
//! medicart cart update 1 5
//! medicart cart remove 1
//! medicart cart show
//! medicart cart clear
//! ```

use std::fmt::Write as _;

use clap::Subcommand;

use medicart_client::AppContext;
use medicart_client::cart::CartStore;
use medicart_core::{ProductId, format_money};

use super::CliError;

#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// Show cart contents and total
    Show,
    /// Add a product, merging with an existing line
    Add {
        /// Product ID (see `medicart products`)
        id: String,

        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Remove a product's line
    Remove { id: String },
    /// Set a line's quantity; zero or less removes it
    Update {
        id: String,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

pub fn run(ctx: &mut AppContext, action: CartAction) -> Result<String, CliError> {
    match action {
        CartAction::Show => {}
        CartAction::Add { id, quantity } => {
            let product = ctx
                .catalog()
                .product(&ProductId::new(id.as_str()))
                .cloned()
                .ok_or(CliError::UnknownProduct(id))?;
            ctx.cart_mut().add_item(&product, quantity);
        }
        CartAction::Remove { id } => {
            let id = ProductId::new(id);
            if ctx.cart().line(&id).is_none() {
                return Err(CliError::Invalid(format!("product {id} is not in the cart")));
            }
            ctx.cart_mut().remove_item(&id);
        }
        CartAction::Update { id, quantity } => {
            let id = ProductId::new(id);
            if ctx.cart().line(&id).is_none() {
                return Err(CliError::Invalid(format!("product {id} is not in the cart")));
            }
            ctx.cart_mut().update_quantity(&id, quantity);
        }
        CartAction::Clear => ctx.cart_mut().clear_cart(),
    }

    Ok(render(ctx.cart()))
}

/// Cart contents, one line per item, followed by the count and total.
pub fn render(cart: &CartStore) -> String {
    if cart.is_empty() {
        return "Your cart is empty.".to_string();
    }

    let mut out = String::new();
    for line in cart.items() {
        let _ = writeln!(
            out,
            "{:>3}  {:<22} {:>3} x {:>7} = {:>8}",
            line.id.as_str(),
            line.name,
            line.quantity,
            line.unit_price.display(),
            line.line_total().map_or_else(|| "-".to_string(), format_money),
        );
    }
    let _ = write!(
        out,
        "{} item(s), total {}",
        cart.item_count(),
        format_money(cart.cart_total())
    );
    out
}
