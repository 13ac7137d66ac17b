use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn, Instrument};

use super::CartLines;
use crate::clients::CartClient;
use crate::domain::{CartLineItem, CartView, Platform, ProductRef};
use crate::error::{CartError, RemoteError};
use crate::messages::{CartRequest, ServiceResponse};
use crate::remote::RemoteStore;
use crate::storage::{load_json, store_json, LocalStore, CART_SNAPSHOT_KEY};

/// Owner of the canonical cart.
///
/// Every remote mutation runs in a background task: write, then refetch the whole
/// cart, then hand the result back as [`CartRequest::Reconcile`]. Reconciles are
/// applied in arrival order and replace the lines unconditionally, so the last
/// refetch to resolve wins. A failed write or refetch leaves the lines untouched.
pub struct CartService {
    receiver: mpsc::Receiver<CartRequest>,
    reconcile: mpsc::WeakSender<CartRequest>,
    lines: CartLines,
    panel_open: bool,
    remote: Arc<dyn RemoteStore>,
    storage: Arc<dyn LocalStore>,
    view: watch::Sender<CartView>,
}

impl CartService {
    pub fn new(buffer_size: usize, remote: Arc<dyn RemoteStore>, storage: Arc<dyn LocalStore>) -> (Self, CartClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let lines = CartLines::new(load_snapshot(storage.as_ref()));
        let (view, view_receiver) = watch::channel(lines.view(false));
        let service = Self {
            receiver,
            reconcile: sender.downgrade(),
            lines,
            panel_open: false,
            remote,
            storage,
            view,
        };
        let client = CartClient::new(sender, view_receiver);
        (service, client)
    }

    #[instrument(name = "cart_service", skip(self))]
    pub async fn run(mut self) {
        info!(lines = self.lines.items().len(), "CartService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CartRequest::View { respond_to } => {
                    let _ = respond_to.send(Ok(self.current_view()));
                }
                CartRequest::Refresh { respond_to } => {
                    self.handle_refresh(respond_to);
                }
                CartRequest::AddOrIncrement {
                    product,
                    platform,
                    respond_to,
                } => {
                    self.handle_add_or_increment(product, platform, respond_to);
                }
                CartRequest::AddLocal { item, respond_to } => {
                    self.handle_add_local(item, respond_to);
                }
                CartRequest::Increase {
                    product,
                    platform,
                    respond_to,
                } => {
                    self.handle_increase(product, platform, respond_to);
                }
                CartRequest::Decrease {
                    product,
                    platform,
                    respond_to,
                } => {
                    self.handle_decrease(product, platform, respond_to);
                }
                CartRequest::Remove {
                    product,
                    platform,
                    respond_to,
                } => {
                    self.handle_remove(product, platform, respond_to);
                }
                CartRequest::Clear { respond_to } => {
                    self.handle_clear(respond_to);
                }
                CartRequest::SetPanel { open, respond_to } => {
                    self.handle_set_panel(open, respond_to);
                }
                CartRequest::Reconcile {
                    items,
                    open_panel,
                    respond_to,
                } => {
                    self.handle_reconcile(items, open_panel, respond_to);
                }
                CartRequest::Shutdown => {
                    info!("CartService shutting down");
                    break;
                }
            }
        }

        info!("CartService stopped");
    }

    #[instrument(skip(self, respond_to))]
    fn handle_refresh(&self, respond_to: ServiceResponse<CartView, CartError>) {
        debug!("Processing refresh request");
        let remote = Arc::clone(&self.remote);
        let reconcile = self.reconcile.clone();
        tokio::spawn(
            async move {
                fetch_and_reconcile(remote, reconcile, false, CartError::Remote, respond_to).await;
            }
            .in_current_span(),
        );
    }

    #[instrument(fields(product = %product, platform = %platform), skip(self, respond_to))]
    fn handle_add_or_increment(
        &self,
        product: ProductRef,
        platform: Platform,
        respond_to: ServiceResponse<CartView, CartError>,
    ) {
        debug!("Processing add_or_increment request");
        let remote = Arc::clone(&self.remote);
        self.spawn_write(async move { remote.add_item(product, platform).await }, true, respond_to);
    }

    #[instrument(fields(product = %item.product_reference, platform = %item.platform), skip(self, item, respond_to))]
    fn handle_add_local(&mut self, item: CartLineItem, respond_to: ServiceResponse<CartView, CartError>) {
        debug!("Processing add_local request");
        self.lines.add_or_increment(item);
        self.panel_open = true;
        self.commit();
        info!(total_quantity = self.lines.total_quantity(), "Item added locally");
        let _ = respond_to.send(Ok(self.current_view()));
    }

    #[instrument(fields(product = %product, platform = %platform), skip(self, respond_to))]
    fn handle_increase(&self, product: ProductRef, platform: Platform, respond_to: ServiceResponse<CartView, CartError>) {
        debug!("Processing increase request");
        let Some(quantity) = self.lines.quantity_after_increase(&product, &platform) else {
            warn!("Increase requested for an item not in the cart");
            let _ = respond_to.send(Err(CartError::NotInCart { product, platform }));
            return;
        };

        let remote = Arc::clone(&self.remote);
        self.spawn_write(
            async move { remote.update_quantity(product, platform, quantity).await },
            false,
            respond_to,
        );
    }

    #[instrument(fields(product = %product, platform = %platform), skip(self, respond_to))]
    fn handle_decrease(&self, product: ProductRef, platform: Platform, respond_to: ServiceResponse<CartView, CartError>) {
        debug!("Processing decrease request");
        let Some(current) = self.lines.find(&product, &platform).map(|item| item.quantity) else {
            warn!("Decrease requested for an item not in the cart");
            let _ = respond_to.send(Err(CartError::NotInCart { product, platform }));
            return;
        };
        let quantity = self
            .lines
            .quantity_after_decrease(&product, &platform)
            .unwrap_or(current);

        // decrease never removes; the line stays at 1 until an explicit remove
        if quantity == current {
            debug!("Quantity already at minimum");
            let _ = respond_to.send(Ok(self.current_view()));
            return;
        }

        let remote = Arc::clone(&self.remote);
        self.spawn_write(
            async move { remote.update_quantity(product, platform, quantity).await },
            false,
            respond_to,
        );
    }

    #[instrument(fields(product = %product, platform = %platform), skip(self, respond_to))]
    fn handle_remove(&self, product: ProductRef, platform: Platform, respond_to: ServiceResponse<CartView, CartError>) {
        debug!("Processing remove request");
        let remote = Arc::clone(&self.remote);
        self.spawn_write(async move { remote.remove_item(product, platform).await }, false, respond_to);
    }

    #[instrument(skip(self, respond_to))]
    fn handle_clear(&mut self, respond_to: ServiceResponse<CartView, CartError>) {
        debug!("Processing clear request");
        self.lines.clear();
        self.commit();
        info!("Cart cleared");
        let _ = respond_to.send(Ok(self.current_view()));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_set_panel(&mut self, open: bool, respond_to: ServiceResponse<CartView, CartError>) {
        debug!("Processing set_panel request");
        self.panel_open = open;
        self.publish();
        let _ = respond_to.send(Ok(self.current_view()));
    }

    #[instrument(fields(incoming = items.len(), open_panel), skip(self, items, respond_to))]
    fn handle_reconcile(
        &mut self,
        items: Vec<CartLineItem>,
        open_panel: bool,
        respond_to: ServiceResponse<CartView, CartError>,
    ) {
        let dropped = self.lines.replace(items);
        if dropped > 0 {
            warn!(dropped, "Ignored zero-quantity or duplicate lines from server");
        }
        if open_panel {
            self.panel_open = true;
        }
        self.commit();
        info!(
            lines = self.lines.items().len(),
            total_quantity = self.lines.total_quantity(),
            total_price = %self.lines.total_price(),
            "Cart reconciled"
        );
        let _ = respond_to.send(Ok(self.current_view()));
    }

    /// Runs `write` in the background; on success refetches the cart and
    /// reconciles. The task owns `respond_to`.
    fn spawn_write<F>(&self, write: F, open_panel: bool, respond_to: ServiceResponse<CartView, CartError>)
    where
        F: Future<Output = Result<(), RemoteError>> + Send + 'static,
    {
        let remote = Arc::clone(&self.remote);
        let reconcile = self.reconcile.clone();
        tokio::spawn(
            async move {
                if let Err(e) = write.await {
                    error!(error = %e, "Cart mutation failed");
                    let _ = respond_to.send(Err(CartError::Remote(e)));
                    return;
                }
                fetch_and_reconcile(remote, reconcile, open_panel, CartError::ReconcileFailed, respond_to).await;
            }
            .in_current_span(),
        );
    }

    fn current_view(&self) -> CartView {
        self.lines.view(self.panel_open)
    }

    /// Persists and publishes a canonical change.
    fn commit(&self) {
        if let Err(e) = store_json(self.storage.as_ref(), CART_SNAPSHOT_KEY, self.lines.items()) {
            warn!(error = %e, "Failed to persist cart snapshot");
        }
        self.publish();
    }

    fn publish(&self) {
        self.view.send_replace(self.current_view());
    }
}

async fn fetch_and_reconcile(
    remote: Arc<dyn RemoteStore>,
    reconcile: mpsc::WeakSender<CartRequest>,
    open_panel: bool,
    on_failure: fn(RemoteError) -> CartError,
    respond_to: ServiceResponse<CartView, CartError>,
) {
    let items = match remote.fetch_cart().await {
        Ok(items) => items,
        Err(e) => {
            error!(error = %e, "Cart refetch failed, keeping previous state");
            let _ = respond_to.send(Err(on_failure(e)));
            return;
        }
    };

    match reconcile.upgrade() {
        Some(sender) => {
            let request = CartRequest::Reconcile {
                items,
                open_panel,
                respond_to,
            };
            if sender.send(request).await.is_err() {
                debug!("Cart service stopped, discarding refetched cart");
            }
        }
        None => debug!("Cart service stopped, discarding refetched cart"),
    }
}

fn load_snapshot(storage: &dyn LocalStore) -> Vec<CartLineItem> {
    match load_json::<Vec<CartLineItem>>(storage, CART_SNAPSHOT_KEY) {
        Ok(Some(items)) => items,
        Ok(None) => Vec::new(),
        Err(e) => {
            error!(error = %e, "Cart data corruption, starting empty");
            Vec::new()
        }
    }
}
