use std::fmt::{self, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::admin_tui::ui::truncate;
use crate::api::{ApiClient, CatalogApi, FixtureOrders, FixtureUsers, OrderSource, UserSource};
use crate::config::Config;
use crate::models::{format_money, Order, Product, User};

#[derive(Parser)]
#[command(name = "sneaker-admin")]
#[command(about = "Terminal admin dashboard for a sneaker store")]
#[command(version)]
pub struct Cli {
    /// API origin, overrides SNEAKER_ADMIN_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Terminal width at which the layout switches from cards to tables
    #[arg(long, global = true)]
    pub breakpoint: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Launch the interactive dashboard (default)
    Tui,
    /// Print the product inventory
    Products,
    /// Print recent orders
    Orders,
    /// Print registered users
    Users,
}

impl Cli {
    pub fn config(&self) -> Result<Config> {
        let config = Config::from_env()?
            .with_overrides(self.api_url.as_deref(), self.breakpoint);
        config.validate()?;
        Ok(config)
    }

    pub fn launches_tui(&self) -> bool {
        matches!(self.command, None | Some(Commands::Tui))
    }
}

/// Run a printing subcommand and write its table to stdout
pub async fn run_command(command: &Commands, config: &Config) -> Result<()> {
    let output = match command {
        Commands::Tui => return Ok(()),
        Commands::Products => {
            let api = ApiClient::new(config)?;
            let products = api
                .fetch_products()
                .await
                .with_context(|| format!("Failed to load products from {}", config.api_url))?;
            info!("Fetched {} products", products.len());
            products_table(&products)?
        }
        Commands::Orders => orders_table(&FixtureOrders.list_orders().await?)?,
        Commands::Users => users_table(&FixtureUsers.list_users().await?)?,
    };
    print!("{}", output);
    Ok(())
}

pub fn products_table(products: &[Product]) -> Result<String, fmt::Error> {
    if products.is_empty() {
        return Ok("No products found\n".to_string());
    }

    let mut out = String::new();
    writeln!(
        out,
        "{:<30} {:<8} {:>10} {:>10} {:>8} {:>6}",
        "Name", "Gender", "Price", "Sale", "Variants", "Stock"
    )?;
    writeln!(out, "{}", "-".repeat(77))?;
    for p in products {
        let sale = if p.is_on_sale() {
            format_money(p.sale_price())
        } else {
            "-".to_string()
        };
        writeln!(
            out,
            "{:<30} {:<8} {:>10} {:>10} {:>8} {:>6}",
            truncate(&p.name, 30),
            p.gender.label(),
            format_money(p.price),
            sale,
            p.variants.len(),
            p.total_stock()
        )?;
    }
    writeln!(out, "\nTotal: {} products", products.len())?;
    Ok(out)
}

pub fn orders_table(orders: &[Order]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "{:<9} {:<20} {:<28} {:<10} {:>10} {:>5}",
        "Order ID", "Customer", "Email", "Date", "Total", "Items"
    )?;
    writeln!(out, "{}", "-".repeat(87))?;
    for o in orders {
        writeln!(
            out,
            "{:<9} {:<20} {:<28} {:<10} {:>10} {:>5}",
            o.id,
            truncate(&o.customer_name, 20),
            truncate(&o.customer_email, 28),
            o.created_at,
            format_money(o.total),
            o.item_count()
        )?;
    }
    writeln!(out, "\nTotal: {} orders", orders.len())?;
    Ok(out)
}

pub fn users_table(users: &[User]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{:<4} {:<20} {:<30} {:<10}", "ID", "Name", "Email", "Registered")?;
    writeln!(out, "{}", "-".repeat(67))?;
    for u in users {
        writeln!(
            out,
            "{:<4} {:<20} {:<30} {:<10}",
            u.id,
            truncate(&u.name, 20),
            truncate(&u.email, 30),
            u.registered_at
        )?;
    }
    writeln!(out, "\nTotal: {} users", users.len())?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::product;

    #[test]
    fn test_default_launches_tui() {
        let cli = Cli::parse_from(["sneaker-admin"]);
        assert!(cli.launches_tui());

        let cli = Cli::parse_from(["sneaker-admin", "tui", "--breakpoint", "80"]);
        assert!(cli.launches_tui());
        assert_eq!(cli.breakpoint, Some(80));

        let cli = Cli::parse_from(["sneaker-admin", "--api-url", "http://api.test", "orders"]);
        assert!(!cli.launches_tui());
        assert_eq!(cli.command, Some(Commands::Orders));
        assert_eq!(cli.api_url.as_deref(), Some("http://api.test"));
    }

    #[test]
    fn test_products_table_shows_sale_and_variants() {
        let mut discounted = product("a", "Air Jordan 1", 2);
        discounted.on_sale = 0.8;
        let table = products_table(&[discounted, product("b", "Dunk Low", 0)]).unwrap();

        let rows: Vec<&str> = table.lines().collect();
        assert!(rows[2].starts_with("Air Jordan 1"));
        assert!(rows[2].contains("$150.00"));
        assert!(rows[2].contains("$120.00"));
        assert!(rows[2].contains(" 21"));
        assert!(rows[3].contains(" - "));
        assert!(table.ends_with("Total: 2 products\n"));

        assert_eq!(products_table(&[]).unwrap(), "No products found\n");
    }

    #[test]
    fn test_fixture_tables() {
        let orders = orders_table(&FixtureOrders::orders()).unwrap();
        assert!(orders.contains("ORD-003"));
        assert!(orders.contains("$699.97"));
        assert!(orders.contains("Total: 3 orders"));

        let users = users_table(&FixtureUsers::users()).unwrap();
        assert!(users.contains("sarah.williams@example.com"));
        assert!(users.contains("2025-04-05"));
    }
}
