use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, instrument, warn, Instrument};

use crate::clients::EngagementClient;
use crate::domain::{PendingToggle, Reel, ReelId, ToggleEvent, ToggleKey, ToggleKind, ToggleLedger, UserId};
use crate::error::{EngagementError, RemoteError};
use crate::messages::{Confirmation, EngagementRequest, ServiceResponse, ToggleOutcome};
use crate::remote::RemoteStore;
use crate::session::Session;

const EVENT_CAPACITY: usize = 64;

pub type RemoteFuture = Pin<Box<dyn Future<Output = Result<Confirmation, RemoteError>> + Send>>;

/// Remote half of a toggle. Receives the new value and confirms it server-side.
pub type RemoteCall = Box<dyn FnOnce(bool) -> RemoteFuture + Send>;

/// Like, save and follow state of the session.
///
/// All three go through [`EngagementService::apply_toggle`]: the new value is
/// visible before the remote call starts, and a failure restores the value held
/// before that invocation. Failures are logged and never returned to the caller.
pub struct EngagementService {
    receiver: mpsc::Receiver<EngagementRequest>,
    settle: mpsc::WeakSender<EngagementRequest>,
    remote: Arc<dyn RemoteStore>,
    session: Session,
    ledger: ToggleLedger,
    likers: HashMap<ReelId, Vec<UserId>>,
    events: broadcast::Sender<ToggleEvent>,
    idle_waiters: Vec<ServiceResponse<(), EngagementError>>,
}

impl EngagementService {
    pub fn new(buffer_size: usize, remote: Arc<dyn RemoteStore>, session: Session) -> (Self, EngagementClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let service = Self {
            receiver,
            settle: sender.downgrade(),
            remote,
            session,
            ledger: ToggleLedger::new(),
            likers: HashMap::new(),
            events: events.clone(),
            idle_waiters: Vec::new(),
        };
        let client = EngagementClient::new(sender, events);
        (service, client)
    }

    #[instrument(name = "engagement_service", skip(self))]
    pub async fn run(mut self) {
        info!("EngagementService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                EngagementRequest::Toggle {
                    key,
                    baseline,
                    respond_to,
                } => {
                    let outcome = self.handle_toggle(key, baseline);
                    let _ = respond_to.send(Ok(outcome));
                }
                EngagementRequest::Settle { pending, outcome } => {
                    self.handle_settle(pending, outcome);
                }
                EngagementRequest::Status { key, respond_to } => {
                    let _ = respond_to.send(Ok(self.ledger.value(&key)));
                }
                EngagementRequest::LikeCount { reel, respond_to } => {
                    let _ = respond_to.send(Ok(self.like_count(&reel)));
                }
                EngagementRequest::LikedUsers { reel, respond_to } => {
                    let users = self.likers.get(&reel).cloned().unwrap_or_default();
                    let _ = respond_to.send(Ok(users));
                }
                EngagementRequest::Seed { reels, respond_to } => {
                    self.handle_seed(reels);
                    let _ = respond_to.send(Ok(()));
                }
                EngagementRequest::Idle { respond_to } => {
                    if self.ledger.in_flight_total() == 0 {
                        let _ = respond_to.send(Ok(()));
                    } else {
                        self.idle_waiters.push(respond_to);
                    }
                }
                EngagementRequest::Shutdown => {
                    info!("EngagementService shutting down");
                    break;
                }
            }
        }

        info!("EngagementService stopped");
    }

    #[instrument(fields(key = %key), skip(self))]
    fn handle_toggle(&mut self, key: ToggleKey, baseline: Option<bool>) -> ToggleOutcome {
        debug!("Processing toggle request");
        let call = self.remote_call(&key);
        self.apply_toggle(key, baseline, |current| !current, call)
    }

    /// Generic optimistic toggle: apply `invert` locally, publish, then run
    /// `call` in the background and settle through the service channel.
    /// `baseline` seeds a key the session has never seen.
    pub fn apply_toggle(
        &mut self,
        key: ToggleKey,
        baseline: Option<bool>,
        invert: impl FnOnce(bool) -> bool,
        call: RemoteCall,
    ) -> ToggleOutcome {
        if !self.session.is_authenticated() {
            debug!("Toggle ignored, no signed-in user");
            return ToggleOutcome::Unauthenticated;
        }

        let pending = self.ledger.begin_with_baseline(key, baseline, invert);
        let value = pending.next;
        self.publish(&pending.key, value, false);

        let settle = self.settle.clone();
        tokio::spawn(
            async move {
                let outcome = call(pending.next).await;
                match settle.upgrade() {
                    Some(sender) => {
                        let _ = sender.send(EngagementRequest::Settle { pending, outcome }).await;
                    }
                    None => debug!("Engagement service stopped, discarding toggle result"),
                }
            }
            .in_current_span(),
        );

        ToggleOutcome::Applied { value }
    }

    fn remote_call(&self, key: &ToggleKey) -> RemoteCall {
        let remote = Arc::clone(&self.remote);
        let subject = key.subject.clone();
        match key.kind {
            ToggleKind::Like => Box::new(move |_: bool| -> RemoteFuture {
                Box::pin(async move {
                    let likers = remote.toggle_like(subject).await?;
                    Ok::<_, RemoteError>(Confirmation { likers: Some(likers) })
                })
            }),
            ToggleKind::Save => Box::new(move |saved: bool| -> RemoteFuture {
                Box::pin(async move {
                    remote.set_saved(subject, saved).await?;
                    Ok::<_, RemoteError>(Confirmation::default())
                })
            }),
            ToggleKind::Follow => Box::new(move |follow: bool| -> RemoteFuture {
                Box::pin(async move {
                    remote.set_follow(subject, follow).await?;
                    Ok::<_, RemoteError>(Confirmation::default())
                })
            }),
        }
    }

    #[instrument(fields(key = %pending.key, next = pending.next), skip(self, pending, outcome))]
    fn handle_settle(&mut self, pending: PendingToggle, outcome: Result<Confirmation, RemoteError>) {
        match outcome {
            Ok(confirmation) => {
                self.ledger.confirm(&pending);
                if let Some(likers) = confirmation.likers {
                    self.likers.insert(pending.key.subject.clone(), likers);
                }
                debug!("Toggle confirmed");
            }
            Err(e) => {
                warn!(error = %e, "Toggle failed, rolling back");
                let restored = self.ledger.rollback(&pending);
                self.publish(&pending.key, restored, true);
            }
        }

        if self.ledger.in_flight_total() == 0 {
            for waiter in self.idle_waiters.drain(..) {
                let _ = waiter.send(Ok(()));
            }
        }
    }

    #[instrument(fields(reels = reels.len()), skip(self, reels))]
    fn handle_seed(&mut self, reels: Vec<Reel>) {
        let user = self.session.user_id();
        for reel in reels {
            let likers = reel.liker_ids();
            let liked = user.as_ref().is_some_and(|user| likers.contains(user));
            self.ledger.seed(ToggleKey::like(reel.id.clone()), liked);
            self.ledger.seed(ToggleKey::save(reel.id.clone()), reel.is_saved);
            if let Some(restaurant) = reel.restaurant_id() {
                self.ledger.seed(ToggleKey::follow(restaurant), reel.is_following);
            }
            self.likers.insert(reel.id, likers);
        }
        info!(likes_known = self.likers.len(), "Engagement state seeded");
    }

    /// Server liker count adjusted for a like still in flight.
    fn like_count(&self, reel: &str) -> usize {
        let likers = self.likers.get(reel).map(Vec::as_slice).unwrap_or_default();
        let base = likers.len();
        let Some(pending) = self.ledger.value(&ToggleKey::like(reel)) else {
            return base;
        };
        let counted = self
            .session
            .user_id()
            .is_some_and(|user| likers.iter().any(|liker| liker == &user));
        match (pending, counted) {
            (true, false) => base + 1,
            (false, true) => base.saturating_sub(1),
            _ => base,
        }
    }

    fn publish(&self, key: &ToggleKey, value: bool, rolled_back: bool) {
        // no subscribers is fine
        let _ = self.events.send(ToggleEvent {
            key: key.clone(),
            value,
            rolled_back,
        });
    }
}
