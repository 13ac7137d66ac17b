use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::domain::{CartLineItem, LineKey, Platform};
use crate::error::CheckoutError;

use super::normalize_link;

/// One platform's column for an item on the comparison screen.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformOffer {
    pub platform: Platform,
    /// `None` when the platform has no (or a zero) price for the item.
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub selected: bool,
}

impl PlatformOffer {
    pub fn is_available(&self) -> bool {
        self.price.is_some()
    }
}

/// Per-visit platform choice for each cart item.
///
/// Built fresh from the cart every time the comparison screen is entered and
/// dropped when it is left; selections never write back to the cart.
#[derive(Debug, Clone)]
pub struct ComparisonSession {
    items: Vec<CartLineItem>,
    selections: HashMap<LineKey, Platform>,
}

impl ComparisonSession {
    pub fn new(items: Vec<CartLineItem>) -> Self {
        let selections = items
            .iter()
            .map(|item| (item.key(), default_platform(item)))
            .collect();
        Self { items, selections }
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selection(&self, key: &LineKey) -> Option<&Platform> {
        self.selections.get(key)
    }

    pub fn offers(&self, key: &LineKey) -> Result<Vec<PlatformOffer>, CheckoutError> {
        let item = self.item(key)?;
        let selected = self.selections.get(key);
        Ok(Platform::PRIMARY
            .iter()
            .map(|platform| PlatformOffer {
                platform: platform.clone(),
                price: offered_price(item, platform),
                link: item.links.get(platform).map(|link| normalize_link(link)),
                selected: selected == Some(platform),
            })
            .collect())
    }

    /// Selects `platform` for the item, or clears the choice when it is already
    /// selected. Returns the resulting selection.
    pub fn select(&mut self, key: &LineKey, platform: Platform) -> Result<Option<Platform>, CheckoutError> {
        let item = self.item(key)?;
        if self.selections.get(key) == Some(&platform) {
            self.selections.remove(key);
            return Ok(None);
        }
        if offered_price(item, &platform).is_none() {
            return Err(CheckoutError::PriceUnavailable {
                product: item.display_name.clone(),
                platform: platform.label().to_string(),
            });
        }
        self.selections.insert(key.clone(), platform.clone());
        Ok(Some(platform))
    }

    /// Drops the item and its selection. Returns `true` once nothing is left to compare.
    pub fn remove_item(&mut self, key: &LineKey) -> Result<bool, CheckoutError> {
        self.item(key)?;
        self.items.retain(|item| &item.key() != key);
        self.selections.remove(key);
        Ok(self.is_empty())
    }

    /// Sum of the selected prices times quantity. Unselected items count zero.
    pub fn selected_total(&self) -> Decimal {
        self.items
            .iter()
            .filter_map(|item| {
                let platform = self.selections.get(&item.key())?;
                let price = offered_price(item, platform)?;
                Some(price * Decimal::from(item.quantity))
            })
            .sum()
    }

    fn item(&self, key: &LineKey) -> Result<&CartLineItem, CheckoutError> {
        self.items
            .iter()
            .find(|item| &item.key() == key)
            .ok_or_else(|| CheckoutError::NotInComparison(key.to_string()))
    }
}

fn offered_price(item: &CartLineItem, platform: &Platform) -> Option<Decimal> {
    item.comparison_prices
        .get(platform)
        .copied()
        .filter(|price| !price.is_zero())
}

/// Lower of the primary platforms' prices. Ties, including no price anywhere,
/// go to the first primary platform.
fn default_platform(item: &CartLineItem) -> Platform {
    Platform::PRIMARY
        .iter()
        .filter_map(|platform| offered_price(item, platform).map(|price| (platform, price)))
        .fold(None, |best: Option<(&Platform, Decimal)>, (platform, price)| match best {
            Some((_, best_price)) if best_price <= price => best,
            _ => Some((platform, price)),
        })
        .map_or(Platform::Zomato, |(platform, _)| platform.clone())
}
