//! MediCart CLI - storefront client and server maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! medicart products --search allergy --price 10to15
//!
//! # Manage the cart
//! medicart cart add 1 --quantity 2
//! medicart cart show
//!
//! # Check out
//! medicart checkout --address "12 Main St" --city Austin --state TX --zip 78701 \
//!     --phone 555-0100 --payment cod
//!
//! # Account and MediBot
//! MEDICART_PASSWORD=... medicart login -e abdi@gmail.com
//! medicart chat send "What is loratadine for?"
//!
//! # Run server database migrations
//! medicart migrate
//! ```
//!
//! Client state (cart, signed-in user) is kept under `MEDICART_DATA_DIR`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use medicart_client::{AppContext, ClientConfig, ClientError};

mod commands;

use commands::CliError;
use commands::cart::CartAction;
use commands::chat::ChatAction;
use commands::checkout::CheckoutArgs;
use commands::products::ProductsArgs;

#[derive(Parser)]
#[command(name = "medicart")]
#[command(author, version, about = "MediCart pharmacy storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Products(ProductsArgs),
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the cart contents
    Checkout(CheckoutArgs),
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "MEDICART_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "MEDICART_PASSWORD", hide_env_values = true)]
        password: String,

        /// Defaults to the password
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Talk to MediBot
    Chat {
        #[command(subcommand)]
        action: ChatAction,
    },
    /// Run server database migrations
    Migrate,
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "medicart_cli=info,medicart_client=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                #[allow(clippy::print_stdout)]
                {
                    println!("{output}");
                }
            }
        }
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<String, CliError> {
    if matches!(cli.command, Commands::Migrate) {
        return commands::migrate::run().await;
    }

    let config = ClientConfig::from_env().map_err(ClientError::from)?;
    let mut ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Products(args) => Ok(commands::products::run(ctx.catalog(), &args)),
        Commands::Cart { action } => commands::cart::run(&mut ctx, action),
        Commands::Checkout(args) => commands::checkout::run(&mut ctx, args),
        Commands::Login { email, password } => {
            commands::account::login(&mut ctx, &email, &password).await
        }
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            commands::account::register(
                &mut ctx,
                &name,
                &email,
                &password,
                confirm_password.as_deref(),
            )
            .await
        }
        Commands::Logout => Ok(commands::account::logout(&mut ctx)),
        Commands::Whoami => Ok(commands::account::whoami(&ctx)),
        Commands::Chat { action } => commands::chat::run(&ctx, action).await,
        Commands::Migrate => commands::migrate::run().await,
    }
}
