use rust_decimal::Decimal;

use crate::domain::{CartLineItem, CartView, Platform};

/// Canonical cart lines with derived totals.
///
/// Lines are unique per (product, platform) and never hold quantity zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartLines {
    items: Vec<CartLineItem>,
}

impl CartLines {
    pub fn new(items: Vec<CartLineItem>) -> Self {
        let mut lines = Self::default();
        lines.replace(items);
        lines
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn find(&self, product: &str, platform: &Platform) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.matches(product, platform))
    }

    /// Bumps an existing line by one, or appends `item` with quantity 1.
    pub fn add_or_increment(&mut self, mut item: CartLineItem) {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.matches(&item.product_reference, &item.platform))
        {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
            None => {
                item.quantity = 1;
                self.items.push(item);
            }
        }
    }

    /// Replaces every line with `items`, keeping the first occurrence of a
    /// duplicated key. Returns how many incoming lines were dropped.
    pub fn replace(&mut self, items: Vec<CartLineItem>) -> usize {
        let incoming = items.len();
        let mut kept: Vec<CartLineItem> = Vec::with_capacity(incoming);
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            if kept.iter().any(|line| line.matches(&item.product_reference, &item.platform)) {
                continue;
            }
            kept.push(item);
        }
        let dropped = incoming - kept.len();
        self.items = kept;
        dropped
    }

    /// Quantity an increase should write, `None` when the line is absent.
    pub fn quantity_after_increase(&self, product: &str, platform: &Platform) -> Option<u32> {
        self.find(product, platform).map(|item| item.quantity.saturating_add(1))
    }

    /// Quantity a decrease should write. Never below one; removal is explicit.
    pub fn quantity_after_decrease(&self, product: &str, platform: &Platform) -> Option<u32> {
        self.find(product, platform)
            .map(|item| item.quantity.saturating_sub(1).max(1))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of line quantities, saturating at `u32::MAX`.
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |total, item| total.saturating_add(item.quantity))
    }

    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    pub fn view(&self, panel_open: bool) -> CartView {
        CartView {
            items: self.items.clone(),
            total_quantity: self.total_quantity(),
            total_price: self.total_price(),
            panel_open,
        }
    }
}
