use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn, Instrument};

use foodreel_sync::app_system::{setup_tracing, ClientSystem, Command, Config, LineArgs, RecentCommand};
use foodreel_sync::checkout::ComparisonSession;
use foodreel_sync::domain::{CartView, RecentSearch};
use foodreel_sync::messages::ToggleOutcome;
use foodreel_sync::remote::HttpRemoteStore;
use foodreel_sync::session::{Identity, Session};
use foodreel_sync::storage::FileStore;

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = Config::parse();
    info!(api_url = %config.api_url, "Starting foodreel client");

    let remote = HttpRemoteStore::new(config.api_url.clone(), config.token.clone())
        .map_err(|error| format!("failed to build HTTP client: {error}"))?;
    let storage = FileStore::new(&config.storage_dir)
        .map_err(|error| format!("failed to open {}: {error}", config.storage_dir.display()))?;

    let session = match &config.user_id {
        Some(user_id) => {
            let identity = Identity::new(user_id.clone());
            let identity = match &config.user_name {
                Some(name) => identity.with_name(name.clone()),
                None => identity,
            };
            Session::signed_in(identity)
        }
        None => Session::new(),
    };

    let system = ClientSystem::new(Arc::new(remote), Arc::new(storage), session, config.buffer);

    let span = tracing::info_span!("command");
    let result = run(&config, &system).instrument(span).await;
    if let Err(e) = &result {
        error!(error = %e, "Command failed");
    }

    system.shutdown().await?;
    result
}

async fn run(config: &Config, system: &ClientSystem) -> Result<(), String> {
    let cart = &system.cart_client;
    match &config.command {
        Command::Cart => {
            let view = cart.refresh().await.map_err(|e| e.user_message())?;
            report_cart(config, &view);
        }
        Command::Add(LineArgs { reel, platform }) => {
            let view = cart
                .add_or_increment(reel.clone(), platform.clone())
                .await
                .map_err(|e| e.user_message())?;
            report_cart(config, &view);
        }
        Command::Increase(LineArgs { reel, platform }) => {
            let view = cart.increase(reel.clone(), platform.clone()).await.map_err(|e| e.user_message())?;
            report_cart(config, &view);
        }
        Command::Decrease(LineArgs { reel, platform }) => {
            let view = cart.decrease(reel.clone(), platform.clone()).await.map_err(|e| e.user_message())?;
            report_cart(config, &view);
        }
        Command::Remove(LineArgs { reel, platform }) => {
            let view = cart.remove(reel.clone(), platform.clone()).await.map_err(|e| e.user_message())?;
            report_cart(config, &view);
        }
        Command::Clear => {
            let view = cart.clear().await.map_err(|e| e.user_message())?;
            report_cart(config, &view);
        }
        Command::Checkout { server } => {
            let groups = if *server {
                system.fetch_checkout_groups().await.map_err(|e| e.user_message())?
            } else {
                cart.refresh().await.map_err(|e| e.user_message())?;
                cart.checkout_groups().await.map_err(|e| e.user_message())?
            };
            for group in &groups {
                info!(restaurant = %group.restaurant_name, items = group.items.len(), "Checkout group");
                for (platform, available) in &group.platform_available {
                    match group.checkout_links.get(platform) {
                        Some(link) if *available => info!(%platform, %link, "Order here"),
                        _ => info!(%platform, "Not available"),
                    }
                }
            }
        }
        Command::Compare => {
            cart.refresh().await.map_err(|e| e.user_message())?;
            let comparison = cart.begin_comparison().await.map_err(|e| e.user_message())?;
            report_comparison(&comparison)?;
        }
        Command::Like { reel } => {
            system.bootstrap().await?;
            let outcome = system
                .engagement_client
                .toggle_like(reel.clone())
                .await
                .map_err(|e| e.to_string())?;
            settle(system, outcome).await?;
            let liked = system.engagement_client.is_liked(reel.clone()).await.map_err(|e| e.to_string())?;
            let count = system.engagement_client.like_count(reel.clone()).await.map_err(|e| e.to_string())?;
            info!(%reel, liked, count, "Like settled");
        }
        Command::Save { reel } => {
            system.bootstrap().await?;
            let outcome = system
                .engagement_client
                .toggle_save(reel.clone())
                .await
                .map_err(|e| e.to_string())?;
            settle(system, outcome).await?;
            let saved = system.engagement_client.is_saved(reel.clone()).await.map_err(|e| e.to_string())?;
            info!(%reel, saved, "Save settled");
        }
        Command::Follow { restaurant, following } => {
            system.bootstrap().await?;
            let outcome = system
                .engagement_client
                .toggle_follow(restaurant.clone(), *following)
                .await
                .map_err(|e| e.to_string())?;
            settle(system, outcome).await?;
            let following = system
                .engagement_client
                .follow_status(restaurant.clone(), *following)
                .await
                .map_err(|e| e.to_string())?;
            info!(%restaurant, following, "Follow settled");
        }
        Command::Recent(action) => {
            let mut history = system.search_history();
            match action {
                RecentCommand::List => {}
                RecentCommand::Add { id, food_name } => history.add(RecentSearch::new(id.clone(), food_name.clone())),
                RecentCommand::Remove { id } => {
                    if !history.remove(id) {
                        warn!(%id, "No such recent search");
                    }
                }
                RecentCommand::Clear => history.clear(),
            }
            for entry in history.entries() {
                let image = entry.image.as_deref().map(|path| config.asset_url(path)).unwrap_or_default();
                info!(id = %entry.id, food = %entry.food_name, searched_at = entry.searched_at, %image, "Recent search");
            }
        }
    }
    Ok(())
}

async fn settle(system: &ClientSystem, outcome: ToggleOutcome) -> Result<(), String> {
    if outcome == ToggleOutcome::Unauthenticated {
        return Err("sign in first (set FOODREEL_USER_ID)".to_string());
    }
    system.engagement_client.idle().await.map_err(|e| e.to_string())
}

fn report_cart(config: &Config, view: &CartView) {
    for item in &view.items {
        let image = item.image.as_deref().map(|path| config.asset_url(path)).unwrap_or_default();
        info!(
            reel = %item.product_reference,
            platform = %item.platform,
            name = %item.display_name,
            quantity = item.quantity,
            total = %item.line_total(),
            %image,
            "Cart line"
        );
    }
    info!(items = view.total_quantity, total = %view.total_price, "Cart");
}

fn report_comparison(comparison: &ComparisonSession) -> Result<(), String> {
    for item in comparison.items() {
        let offers = comparison.offers(&item.key()).map_err(|e| e.to_string())?;
        for offer in offers {
            let price = offer.price.map(|price| price.to_string()).unwrap_or_else(|| "N/A".to_string());
            info!(
                reel = %item.product_reference,
                platform = %offer.platform,
                %price,
                selected = offer.selected,
                "Offer"
            );
        }
    }
    info!(total = %comparison.selected_total(), "Selected total");
    Ok(())
}
