use std::sync::Arc;
use std::time::Duration;

use testresult::TestResult;
use tokio::time::Instant;

use crate::app_system::ClientSystem;
use crate::domain::{CartLineItem, Comment, LikerRef, Platform, RecentSearch, Reel, ReelRestaurant};
use crate::error::RemoteError;
use crate::feed::{FeedController, TapReaction};
use crate::messages::ToggleOutcome;
use crate::remote::mock::{
    assert_no_request, create_mock_remote, expect_add_item, expect_fetch_cart, expect_fetch_reels, expect_toggle_like,
};
use crate::session::{Identity, Session};
use crate::storage::{store_json, LocalStore, MemoryStore, CART_SNAPSHOT_KEY};

fn feed_reels() -> Vec<Reel> {
    let mut liked = Reel::new("r1");
    liked.likes = vec![
        LikerRef::Id("u1".to_string()),
        LikerRef::User { id: "u2".to_string(), name: Some("Asha".to_string()) },
    ];
    liked.comments = vec![Comment::new("c1", "looks great")];
    liked.is_following = true;
    liked.restaurant = Some(ReelRestaurant {
        id: "rest1".to_string(),
        ..ReelRestaurant::default()
    });

    let mut saved = Reel::new("r2");
    saved.is_saved = true;
    vec![liked, saved]
}

fn signed_in() -> Session {
    Session::signed_in(Identity::new("u1").with_name("Ravi"))
}

#[tokio::test]
async fn bootstrap_seeds_every_engine() -> TestResult {
    let (remote, mut requests) = create_mock_remote();
    let system = ClientSystem::new(remote, Arc::new(MemoryStore::default()), signed_in(), 16);

    let boot = tokio::spawn(async move {
        let reels = system.bootstrap().await;
        (system, reels)
    });

    let _ = expect_fetch_reels(&mut requests).await.send(Ok(feed_reels()));
    let line = CartLineItem::new("r1", Platform::Zomato, "Paneer Tikka", None);
    let _ = expect_fetch_cart(&mut requests).await.send(Ok(vec![line]));

    let (system, reels) = boot.await?;
    assert_eq!(reels?.len(), 2);

    let engagement = &system.engagement_client;
    assert!(engagement.is_liked("r1".to_string()).await?);
    assert_eq!(engagement.like_count("r1".to_string()).await?, 2);
    assert!(engagement.is_saved("r2".to_string()).await?);
    assert!(engagement.follow_status("rest1".to_string(), false).await?);
    assert_eq!(system.comment_client.comment_count("r1".to_string()).await?, 1);
    assert_eq!(system.cart_client.current().total_quantity, 1);

    system.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn failed_cart_refresh_keeps_snapshot() -> TestResult {
    let (remote, mut requests) = create_mock_remote();
    let storage = Arc::new(MemoryStore::default());
    let saved = vec![CartLineItem::new("r9", Platform::Swiggy, "Dosa", None).with_quantity(2)];
    store_json(storage.as_ref(), CART_SNAPSHOT_KEY, &saved)?;

    let system = ClientSystem::new(remote, storage.clone(), signed_in(), 16);
    let boot = tokio::spawn(async move {
        let reels = system.bootstrap().await;
        (system, reels)
    });

    let _ = expect_fetch_reels(&mut requests).await.send(Ok(Vec::new()));
    let _ = expect_fetch_cart(&mut requests)
        .await
        .send(Err(RemoteError::Network("offline".to_string())));

    let (system, reels) = boot.await?;
    assert!(reels?.is_empty());
    let view = system.cart_client.current();
    assert_eq!(view.items, saved);
    assert_eq!(view.total_quantity, 2);

    system.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn feed_double_tap_and_checkout_flow() -> TestResult {
    let (remote, mut requests) = create_mock_remote();
    let system = ClientSystem::new(remote, Arc::new(MemoryStore::default()), signed_in(), 16);
    let mut feed = FeedController::new(
        vec![Reel::new("r1")],
        system.engagement_client.clone(),
        system.cart_client.clone(),
    );

    let start = Instant::now();
    feed.tap(start).await?;
    let reaction = feed.tap(start + Duration::from_millis(120)).await?;
    assert_eq!(
        reaction,
        TapReaction::DoubleTap {
            toggle: Some(ToggleOutcome::Applied { value: true })
        }
    );
    let (reel, reply) = expect_toggle_like(&mut requests).await;
    assert_eq!(reel, "r1");
    let _ = reply.send(Ok(vec!["u1".to_string()]));
    system.engagement_client.idle().await?;
    assert_eq!(system.engagement_client.liked_users("r1".to_string()).await?, vec!["u1".to_string()]);

    let add = tokio::spawn(async move {
        let view = feed.add_to_cart(Some(Platform::Swiggy), start).await;
        (feed, view)
    });
    let (product, platform, reply) = expect_add_item(&mut requests).await;
    assert_eq!((product.as_str(), platform), ("r1", Platform::Swiggy));
    let _ = reply.send(Ok(()));
    let lines = vec![
        CartLineItem::new("r1", Platform::Swiggy, "Biryani", None)
            .with_restaurant("rest1", "Spice Hub")
            .with_link(Platform::Zomato, "zomato.com/spice")
            .with_link(Platform::Swiggy, "https://swiggy.com/spice"),
        CartLineItem::new("r7", Platform::Zomato, "Momos", None).with_restaurant("rest2", "Hill Cafe"),
    ];
    let _ = expect_fetch_cart(&mut requests).await.send(Ok(lines));

    let (_feed, view) = add.await?;
    assert!(view?.panel_open);

    let groups = system.cart_client.checkout_groups().await?;
    let names: Vec<_> = groups.iter().map(|group| group.restaurant_name.as_str()).collect();
    assert_eq!(names, ["Spice Hub", "Hill Cafe"]);
    assert_eq!(
        groups[0].checkout_links.get(&Platform::Zomato).map(String::as_str),
        Some("https://zomato.com/spice")
    );
    assert!(!groups[1].is_available(&Platform::Swiggy));

    system.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn signed_out_toggles_never_reach_the_server() -> TestResult {
    let (remote, mut requests) = create_mock_remote();
    let system = ClientSystem::new(remote, Arc::new(MemoryStore::default()), Session::new(), 16);

    let outcome = system.engagement_client.toggle_save("r1".to_string()).await?;
    assert_eq!(outcome, ToggleOutcome::Unauthenticated);
    assert!(!system.engagement_client.is_saved("r1".to_string()).await?);
    assert_no_request(&mut requests);

    system.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn search_history_survives_a_new_session() -> TestResult {
    let (remote, _requests) = create_mock_remote();
    let storage: Arc<dyn LocalStore> = Arc::new(MemoryStore::default());
    let system = ClientSystem::new(remote.clone(), storage.clone(), signed_in(), 16);

    let mut history = system.search_history();
    history.add(RecentSearch::new("r1", "Biryani"));
    history.add(RecentSearch::new("r2", "Dosa"));
    history.add(RecentSearch::new("r1", "Biryani"));
    system.shutdown().await?;

    let system = ClientSystem::new(remote, storage, Session::new(), 16);
    let ids: Vec<_> = system
        .search_history()
        .entries()
        .iter()
        .map(|entry| entry.id.clone())
        .collect();
    assert_eq!(ids, ["r1", "r2"]);

    system.shutdown().await?;
    Ok(())
}
