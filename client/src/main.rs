//! Command-line companion: signs in, prints the marketplace front page and
//! follows the notification channel until Ctrl-C.
//!
//! ```bash
//! NOTEMARKET_EMAIL=ada@uni.edu NOTEMARKET_PASSWORD=Secret123 cargo run --bin notemarket
//! ```

use std::io::Write;

use anyhow::{Context, Result};
use notemarket::{ClientConfig, ClientEvent, Marketplace};
use shared::{format_price, mask_iban, LoginRequest};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let _log = notemarket::debug::init();

    let config = ClientConfig::from_env().context("Invalid configuration")?;
    tracing::info!(api_url = %config.api_url, ws_url = %config.ws_url, "Starting");

    let market = Marketplace::new(&config)?;
    let gc = market.cache().spawn_gc(config.cache.gc_time);
    sign_in(&market).await?;

    let notes = market.notes().list().await?;
    println!("Notes ({} total)", notes.total);
    for note in &notes.items {
        println!("  {:<40} {:>10}  {}", note.title, format_price(note.price), note.course);
    }
    if notes.has_next() {
        println!("  ... {} more page(s)", notes.total_pages() - notes.page);
    }

    if !market.session().is_authenticated() {
        gc.abort();
        return Ok(());
    }

    print_seller_overview(&market).await?;

    let unread = market.notifications().unread_count().await?;
    println!("{unread} unread notification(s)");

    let channel = market.connect_notifications(&config);
    let events = market.events().subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => {
                let Ok(event) = event else { break };
                handle_event(event);
            }
        }
    }

    channel.shutdown().await;
    gc.abort();
    tracing::info!("Stopped");
    Ok(())
}

async fn sign_in(market: &Marketplace) -> Result<()> {
    let (Ok(email), Ok(password)) = (
        std::env::var("NOTEMARKET_EMAIL"),
        std::env::var("NOTEMARKET_PASSWORD"),
    ) else {
        tracing::info!("NOTEMARKET_EMAIL not set, browsing anonymously");
        return Ok(());
    };

    let user = market
        .auth()
        .login(LoginRequest { email, password })
        .await
        .context("Sign-in failed")?;
    println!("Signed in as {}", user.full_name());
    Ok(())
}

async fn print_seller_overview(market: &Marketplace) -> Result<()> {
    let stats = market.sales().stats().await?;
    let summary = market.profits().summary().await?;
    println!(
        "Sales: {}  revenue {}  available {}",
        stats.total_sales,
        format_price(stats.total_revenue),
        format_price(stats.available_balance)
    );
    match summary.growth_percent() {
        Some(growth) => println!("This month {} ({growth:+.1}%)", format_price(summary.this_month)),
        None => println!("This month {}", format_price(summary.this_month)),
    }

    let withdrawals = market.withdrawals().list().await?;
    for withdrawal in &withdrawals.items {
        println!(
            "  {:>10}  {}  {:?}{}",
            format_price(withdrawal.amount),
            mask_iban(&withdrawal.iban),
            withdrawal.status,
            if withdrawal.status.is_editable() { " (editable)" } else { "" }
        );
    }
    Ok(())
}

fn handle_event(event: ClientEvent) {
    match event {
        ClientEvent::NotificationReceived(notification) => {
            print!("\x07");
            println!("[{}] {}: {}", notification.created_at.format("%H:%M"), notification.title, notification.message);
            std::io::stdout().flush().ok();
        }
        ClientEvent::NotificationsCleared => println!("Notifications cleared"),
        ClientEvent::NotificationsRead { ids } => println!("{} notification(s) read", ids.len()),
        ClientEvent::RealtimeStatus(status) => {
            tracing::info!(state = status.state.label(), attempts = status.connection_attempts, "Channel status");
        }
        ClientEvent::SessionExpired => println!("Session expired, sign in again"),
        ClientEvent::MutationFailed { operation, message } => eprintln!("{operation} failed: {message}"),
        ClientEvent::Navigate { path } => println!("-> {path}"),
        ClientEvent::Invalidated(keys) => tracing::debug!(count = keys.len(), "Invalidated"),
    }
}
