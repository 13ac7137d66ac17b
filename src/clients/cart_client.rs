use tokio::sync::{mpsc, watch};

use crate::checkout::{group_for_checkout, CheckoutGroup, ComparisonSession};
use crate::domain::{CartLineItem, CartView, Platform, ProductRef};
use crate::error::CartError;
use crate::messages::CartRequest;

/// Client for the cart service.
///
/// Mutations resolve once the authoritative cart has been refetched and applied,
/// so the returned [`CartView`] is the new canonical state.
#[derive(Clone, Debug)]
pub struct CartClient {
    sender: mpsc::Sender<CartRequest>,
    view: watch::Receiver<CartView>,
}

impl CartClient {
    pub fn new(sender: mpsc::Sender<CartRequest>, view: watch::Receiver<CartView>) -> Self {
        Self { sender, view }
    }

    /// Latest published view without a round-trip.
    pub fn current(&self) -> CartView {
        self.view.borrow().clone()
    }

    /// Receiver notified on every canonical change or panel toggle.
    pub fn subscribe(&self) -> watch::Receiver<CartView> {
        self.view.clone()
    }

    pub async fn open_panel(&self) -> Result<CartView, CartError> {
        self.set_panel(true).await
    }

    pub async fn close_panel(&self) -> Result<CartView, CartError> {
        self.set_panel(false).await
    }

    /// Restaurant-grouped projection of the current canonical cart.
    pub async fn checkout_groups(&self) -> Result<Vec<CheckoutGroup>, CartError> {
        let view = self.view().await?;
        Ok(group_for_checkout(&view.items))
    }

    /// Fresh price-comparison screen state for the current cart.
    pub async fn begin_comparison(&self) -> Result<ComparisonSession, CartError> {
        let view = self.view().await?;
        Ok(ComparisonSession::new(view.items))
    }
}

client_shutdown!(CartClient, CartRequest);

client_method!(CartClient => fn view() -> CartView as CartRequest::View, Error = CartError);
client_method!(CartClient => fn refresh() -> CartView as CartRequest::Refresh, Error = CartError);
client_method!(CartClient => fn add_or_increment(product: ProductRef, platform: Platform) -> CartView as CartRequest::AddOrIncrement, Error = CartError);
client_method!(CartClient => fn add_local(item: CartLineItem) -> CartView as CartRequest::AddLocal, Error = CartError);
client_method!(CartClient => fn increase(product: ProductRef, platform: Platform) -> CartView as CartRequest::Increase, Error = CartError);
client_method!(CartClient => fn decrease(product: ProductRef, platform: Platform) -> CartView as CartRequest::Decrease, Error = CartError);
client_method!(CartClient => fn remove(product: ProductRef, platform: Platform) -> CartView as CartRequest::Remove, Error = CartError);
client_method!(CartClient => fn clear() -> CartView as CartRequest::Clear, Error = CartError);
client_method!(CartClient => fn set_panel(open: bool) -> CartView as CartRequest::SetPanel, Error = CartError);
