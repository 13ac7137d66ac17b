//! Restaurant-grouped checkout projection of the cart.
//!
//! Everything here is a pure function of the cart lines: nothing is stored and
//! nothing feeds back into the cart.

mod compare;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{CartLineItem, Platform, RestaurantId};
use crate::error::CheckoutError;
use crate::remote::RemoteCheckoutGroup;

pub use compare::{ComparisonSession, PlatformOffer};

/// One restaurant's share of the cart with its per-platform ordering options.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutGroup {
    pub restaurant_reference: RestaurantId,
    pub restaurant_name: String,
    pub items: Vec<CartLineItem>,
    /// `true` only when every item in the group has a usable link for the platform.
    pub platform_available: BTreeMap<Platform, bool>,
    /// Normalized link per available platform.
    pub checkout_links: BTreeMap<Platform, String>,
}

impl CheckoutGroup {
    pub fn is_available(&self, platform: &Platform) -> bool {
        self.platform_available.get(platform).copied().unwrap_or(false)
    }
}

/// Groups `items` by restaurant in first-seen order.
pub fn group_for_checkout(items: &[CartLineItem]) -> Vec<CheckoutGroup> {
    let mut order: Vec<RestaurantId> = Vec::new();
    let mut buckets: BTreeMap<RestaurantId, Vec<CartLineItem>> = BTreeMap::new();
    for item in items {
        let bucket = buckets.entry(item.restaurant_reference.clone()).or_insert_with(|| {
            order.push(item.restaurant_reference.clone());
            Vec::new()
        });
        bucket.push(item.clone());
    }

    order
        .into_iter()
        .filter_map(|restaurant| {
            let items = buckets.remove(&restaurant)?;
            Some(build_group(restaurant, items))
        })
        .collect()
}

fn build_group(restaurant_reference: RestaurantId, items: Vec<CartLineItem>) -> CheckoutGroup {
    let restaurant_name = items
        .iter()
        .map(|item| item.restaurant_name.as_str())
        .find(|name| !name.is_empty())
        .unwrap_or_default()
        .to_string();

    let mut platforms: Vec<Platform> = Platform::PRIMARY.to_vec();
    for item in &items {
        for platform in item.links.keys() {
            if !platforms.contains(platform) {
                platforms.push(platform.clone());
            }
        }
    }

    let mut platform_available = BTreeMap::new();
    let mut checkout_links = BTreeMap::new();
    for platform in platforms {
        let links: Option<Vec<&str>> = items.iter().map(|item| usable_link(item, &platform)).collect();
        let link = links.and_then(|links| links.first().map(|link| normalize_link(link)));
        platform_available.insert(platform.clone(), link.is_some());
        if let Some(link) = link {
            checkout_links.insert(platform, link);
        }
    }

    CheckoutGroup {
        restaurant_reference,
        restaurant_name,
        items,
        platform_available,
        checkout_links,
    }
}

fn usable_link<'a>(item: &'a CartLineItem, platform: &Platform) -> Option<&'a str> {
    item.links
        .get(platform)
        .map(|link| link.trim())
        .filter(|link| !link.is_empty() && *link != "#")
}

/// Prefixes `https://` unless the link already carries a scheme.
pub fn normalize_link(link: &str) -> String {
    let link = link.trim();
    let has_scheme = link.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c))
    });
    if has_scheme {
        link.to_string()
    } else {
        format!("https://{}", link)
    }
}

/// Link to open for `platform`, or why there is none.
pub fn resolve_checkout_link(group: &CheckoutGroup, platform: &Platform) -> Result<String, CheckoutError> {
    match group.checkout_links.get(platform) {
        Some(link) if group.is_available(platform) => Ok(link.clone()),
        _ => Err(CheckoutError::LinkUnavailable {
            restaurant: group.restaurant_name.clone(),
            platform: platform.label().to_string(),
        }),
    }
}

impl From<RemoteCheckoutGroup> for CheckoutGroup {
    fn from(remote: RemoteCheckoutGroup) -> Self {
        let links = remote.checkout_links;
        let mut platform_available = BTreeMap::new();
        let mut checkout_links = BTreeMap::new();
        for (platform, link, available) in [
            (Platform::Zomato, links.zomato, links.zomato_available),
            (Platform::Swiggy, links.swiggy, links.swiggy_available),
        ] {
            let link = link.filter(|link| available && !link.trim().is_empty() && link.trim() != "#");
            platform_available.insert(platform.clone(), link.is_some());
            if let Some(link) = link {
                checkout_links.insert(platform, normalize_link(&link));
            }
        }

        Self {
            restaurant_reference: remote.restaurant_reference,
            restaurant_name: remote.restaurant_name,
            items: remote.items,
            platform_available,
            checkout_links,
        }
    }
}
