//! Catalog listing.
//!
//! ```bash
//! medicart products
//! medicart products --search headache --price under10
//! medicart products --category Allergy --rx
//! medicart products --categories
//! ```

use std::fmt::Write as _;

use clap::Args;

use medicart_client::catalog::{Catalog, ProductFilter};
use medicart_core::{PriceBucket, Product};

#[derive(Debug, Args)]
pub struct ProductsArgs {
    /// Match name or description, ignoring case
    #[arg(short, long)]
    pub search: Option<String>,

    /// Exact category name
    #[arg(short, long)]
    pub category: Option<String>,

    /// Price range (`under10`, `10to15`, `over15`)
    #[arg(short, long)]
    pub price: Option<PriceBucket>,

    /// Only prescription medicines
    #[arg(long)]
    pub rx: bool,

    /// List categories instead of products
    #[arg(long, conflicts_with_all = ["search", "category", "price", "rx"])]
    pub categories: bool,
}

impl ProductsArgs {
    fn filter(&self) -> ProductFilter {
        ProductFilter {
            search: self.search.clone(),
            category: self.category.clone(),
            price: self.price,
            prescription_only: self.rx,
        }
    }
}

pub fn run(catalog: &Catalog, args: &ProductsArgs) -> String {
    if args.categories {
        return catalog.categories().join("\n");
    }

    let products = catalog.filter(&args.filter());
    if products.is_empty() {
        return "No products match.".to_string();
    }

    let mut out = String::new();
    for product in &products {
        let _ = writeln!(out, "{}", product_line(product));
    }
    let _ = write!(out, "{} product(s)", products.len());
    out
}

fn product_line(product: &Product) -> String {
    let rx = if product.requires_prescription {
        "  [Rx]"
    } else {
        ""
    };
    format!(
        "{:>3}  {:<22} {:>7}  {} / {} / {}{rx}",
        product.id.as_str(),
        product.name,
        product.price.display(),
        product.category,
        product.brand,
        product.dosage,
    )
}
