use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use super::coordinator::{
    FeedCoordinator, KeyIntent, Overlay, ScrollOutcome, TapOutcome, Transient, WheelOutcome, CART_NOTICE_DURATION,
};
use crate::clients::{CartClient, EngagementClient};
use crate::domain::{CartView, Platform, Reel};
use crate::error::{CartError, EngagementError};
use crate::messages::ToggleOutcome;

/// What a tap on the active reel ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapReaction {
    Playback { playing: bool },
    /// Double tap. `toggle` is `None` when the reel was already liked.
    DoubleTap { toggle: Option<ToggleOutcome> },
}

/// A feed session: the reels on screen plus the coordinator, wired to the
/// engagement and cart services.
pub struct FeedController {
    reels: Vec<Reel>,
    coordinator: FeedCoordinator,
    engagement: EngagementClient,
    cart: CartClient,
    cart_view: watch::Receiver<CartView>,
    cart_notice: Transient,
}

impl FeedController {
    pub fn new(reels: Vec<Reel>, engagement: EngagementClient, cart: CartClient) -> Self {
        let cart_view = cart.subscribe();
        Self {
            coordinator: FeedCoordinator::new(reels.len()),
            reels,
            engagement,
            cart,
            cart_view,
            cart_notice: Transient::default(),
        }
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    pub fn replace_reels(&mut self, reels: Vec<Reel>) {
        self.coordinator.set_len(reels.len());
        self.reels = reels;
    }

    pub fn active_reel(&self) -> Option<&Reel> {
        self.reels.get(self.coordinator.active_index())
    }

    pub fn coordinator(&self) -> &FeedCoordinator {
        &self.coordinator
    }

    pub fn scroll_to(&mut self, index: usize, now: Instant) -> ScrollOutcome {
        self.coordinator.scroll_to(index, now)
    }

    pub fn on_wheel(&mut self, delta_y: f64, now: Instant) -> WheelOutcome {
        self.sync_cart_panel();
        self.coordinator.on_wheel(delta_y, now)
    }

    /// Tap on the active reel's video.
    #[instrument(skip(self))]
    pub async fn tap(&mut self, now: Instant) -> Result<TapReaction, EngagementError> {
        let Some(reel) = self.active_reel().map(|reel| reel.id.clone()) else {
            return Ok(TapReaction::Playback {
                playing: self.coordinator.is_playing(),
            });
        };

        let liked = self.engagement.is_liked(reel.clone()).await?;
        match self.coordinator.on_tap(now, liked) {
            TapOutcome::TogglePlayback { playing } => Ok(TapReaction::Playback { playing }),
            TapOutcome::DoubleTap { like: false } => {
                debug!("Double tap on a liked reel");
                Ok(TapReaction::DoubleTap { toggle: None })
            }
            TapOutcome::DoubleTap { like: true } => {
                let outcome = self.engagement.toggle_like(reel).await?;
                Ok(TapReaction::DoubleTap { toggle: Some(outcome) })
            }
        }
    }

    /// Key press while the feed has focus.
    #[instrument(skip(self))]
    pub async fn key(&mut self, key: &str) -> Result<Option<KeyIntent>, EngagementError> {
        let intent = self.coordinator.on_key(key);
        match intent {
            Some(KeyIntent::ToggleLike) => {
                if let Some(reel) = self.active_reel().map(|reel| reel.id.clone()) {
                    self.engagement.toggle_like(reel).await?;
                }
            }
            Some(KeyIntent::OpenComments) => self.close_cart_panel().await,
            _ => {}
        }
        Ok(intent)
    }

    pub async fn open_comments(&mut self) {
        self.coordinator.overlays_mut().open(Overlay::Comments);
        self.close_cart_panel().await;
    }

    pub async fn open_likes(&mut self) {
        self.coordinator.overlays_mut().open(Overlay::Likes);
        self.close_cart_panel().await;
    }

    pub async fn close_overlay(&mut self, overlay: Overlay) {
        self.coordinator.overlays_mut().close(overlay);
        if overlay == Overlay::CartPanel {
            self.close_cart_panel().await;
        }
    }

    /// Adds the active reel's dish; `ZOMATO` unless another platform is given.
    /// The notification shows immediately, the panel opens once the cart confirms.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&mut self, platform: Option<Platform>, now: Instant) -> Result<CartView, CartError> {
        let Some(reel) = self.active_reel().map(|reel| reel.id.clone()) else {
            return Ok(self.cart.current());
        };

        self.cart_notice.trigger(now, CART_NOTICE_DURATION);
        let view = self
            .cart
            .add_or_increment(reel, platform.unwrap_or(Platform::Zomato))
            .await?;
        self.sync_cart_panel();
        Ok(view)
    }

    pub async fn toggle_save(&mut self) -> Result<Option<ToggleOutcome>, EngagementError> {
        match self.active_reel().map(|reel| reel.id.clone()) {
            Some(reel) => Ok(Some(self.engagement.toggle_save(reel).await?)),
            None => Ok(None),
        }
    }

    /// Follows or unfollows the active reel's restaurant, if it names one. The
    /// reel's own `is_following` is the status for a restaurant not seen yet.
    pub async fn toggle_follow(&mut self) -> Result<Option<ToggleOutcome>, EngagementError> {
        let Some((restaurant, following)) = self
            .active_reel()
            .and_then(|reel| Some((reel.restaurant_id()?.to_string(), reel.is_following)))
        else {
            return Ok(None);
        };
        Ok(Some(self.engagement.toggle_follow(restaurant, following).await?))
    }

    pub fn cart_notice_visible(&self, now: Instant) -> bool {
        self.cart_notice.is_visible(now)
    }

    pub fn heart_visible(&self, now: Instant) -> bool {
        self.coordinator.heart_visible(now)
    }

    pub fn shows_scroll_controls(&mut self) -> bool {
        self.sync_cart_panel();
        self.coordinator.shows_scroll_controls()
    }

    /// Mirrors the cart service's panel flag into the overlay set.
    fn sync_cart_panel(&mut self) {
        let panel_open = self.cart_view.borrow_and_update().panel_open;
        let overlays = self.coordinator.overlays_mut();
        if panel_open && !overlays.cart_panel {
            overlays.open(Overlay::CartPanel);
        } else if !panel_open {
            overlays.close(Overlay::CartPanel);
        }
    }

    async fn close_cart_panel(&mut self) {
        if !self.cart_view.borrow().panel_open {
            return;
        }
        if let Err(e) = self.cart.close_panel().await {
            warn!(error = %e, "Failed to close cart panel");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::cart_actor::CartService;
    use crate::domain::CartLineItem;
    use crate::engagement_actor::EngagementService;
    use crate::remote::mock::{
        assert_no_request, create_mock_remote, expect_add_item, expect_fetch_cart, expect_set_follow, expect_toggle_like,
        RemoteRequest,
    };
    use crate::session::{Identity, Session};
    use crate::storage::MemoryStore;
    use testresult::TestResult;
    use tokio::sync::mpsc;

    fn setup(reels: Vec<Reel>) -> (FeedController, mpsc::UnboundedReceiver<RemoteRequest>) {
        let (remote, requests) = create_mock_remote();
        let session = Session::signed_in(Identity::new("u1"));
        let (engagement_service, engagement) = EngagementService::new(16, remote.clone(), session);
        let (cart_service, cart) = CartService::new(16, remote, Arc::new(MemoryStore::default()));
        tokio::spawn(engagement_service.run());
        tokio::spawn(cart_service.run());
        (FeedController::new(reels, engagement, cart), requests)
    }

    #[tokio::test]
    async fn double_tap_likes_once_and_shows_heart() -> TestResult {
        let (mut feed, mut requests) = setup(vec![Reel::new("r1"), Reel::new("r2")]);
        let start = Instant::now();

        assert_eq!(feed.tap(start).await?, TapReaction::Playback { playing: false });
        let reaction = feed.tap(start + Duration::from_millis(250)).await?;
        assert_eq!(
            reaction,
            TapReaction::DoubleTap {
                toggle: Some(ToggleOutcome::Applied { value: true })
            }
        );
        assert!(feed.heart_visible(start + Duration::from_millis(300)));
        assert!(!feed.heart_visible(start + Duration::from_millis(900)));

        let (reel, reply) = expect_toggle_like(&mut requests).await;
        assert_eq!(reel, "r1");
        let _ = reply.send(Ok(vec!["u1".to_string()]));

        // a second double tap on the now-liked reel does not unlike
        let later = start + Duration::from_secs(2);
        feed.tap(later).await?;
        let reaction = feed.tap(later + Duration::from_millis(100)).await?;
        assert_eq!(reaction, TapReaction::DoubleTap { toggle: None });
        assert_no_request(&mut requests);
        Ok(())
    }

    #[tokio::test]
    async fn add_to_cart_defaults_to_zomato_and_opens_panel() -> TestResult {
        let (mut feed, mut requests) = setup(vec![Reel::new("r1")]);
        let start = Instant::now();
        let controller = tokio::spawn(async move {
            let view = feed.add_to_cart(None, start).await;
            (feed, view)
        });

        let (product, platform, reply) = expect_add_item(&mut requests).await;
        assert_eq!((product.as_str(), &platform), ("r1", &Platform::Zomato));
        let _ = reply.send(Ok(()));
        let line = CartLineItem::new("r1", Platform::Zomato, "Biryani", None);
        let _ = expect_fetch_cart(&mut requests).await.send(Ok(vec![line]));

        let (mut feed, view) = controller.await?;
        assert!(view?.panel_open);
        assert!(feed.cart_notice_visible(start + Duration::from_millis(2999)));
        assert!(!feed.cart_notice_visible(start + CART_NOTICE_DURATION));
        assert!(!feed.shows_scroll_controls());
        assert_eq!(feed.on_wheel(1.0, start), WheelOutcome::PassThrough);

        feed.open_comments().await;
        assert!(feed.coordinator().overlays().comments);
        assert!(!feed.coordinator().overlays().cart_panel);
        Ok(())
    }

    #[tokio::test]
    async fn like_key_toggles_active_reel() -> TestResult {
        let (mut feed, mut requests) = setup(vec![Reel::new("r1"), Reel::new("r2")]);
        feed.scroll_to(1, Instant::now());

        assert_eq!(feed.key("l").await?, Some(KeyIntent::ToggleLike));

        let (reel, _reply) = expect_toggle_like(&mut requests).await;
        assert_eq!(reel, "r2");
        Ok(())
    }

    #[tokio::test]
    async fn follow_starts_from_the_reel_status() -> TestResult {
        let reel = Reel {
            is_following: true,
            restaurant: Some(crate::domain::ReelRestaurant {
                id: "rest_4".to_string(),
                ..Default::default()
            }),
            ..Reel::new("r1")
        };
        let (mut feed, mut requests) = setup(vec![reel]);

        let outcome = feed.toggle_follow().await?;
        assert_eq!(outcome, Some(ToggleOutcome::Applied { value: false }));

        let (restaurant, follow, _reply) = expect_set_follow(&mut requests).await;
        assert_eq!(restaurant, "rest_4");
        assert!(!follow);
        Ok(())
    }

    #[tokio::test]
    async fn follow_without_restaurant_is_skipped() -> TestResult {
        let (mut feed, mut requests) = setup(vec![Reel::new("r1")]);

        assert_eq!(feed.toggle_follow().await?, None);
        assert_no_request(&mut requests);
        Ok(())
    }
}
