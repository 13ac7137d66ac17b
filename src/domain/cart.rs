use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reference to the dish (reel) a cart line was added from.
pub type ProductRef = String;

/// Reference to the restaurant that serves a dish.
pub type RestaurantId = String;

/// Third-party delivery platform a dish can be ordered through.
///
/// Parsed case-insensitively so both `"ZOMATO"` (cart lines) and `"zomato"`
/// (price and link maps) decode to the same variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    Zomato,
    Swiggy,
    Other(String),
}

impl Platform {
    /// Platforms every checkout group reports availability for.
    pub const PRIMARY: [Platform; 2] = [Platform::Zomato, Platform::Swiggy];

    /// Human-facing name, e.g. `Zomato`.
    pub fn label(&self) -> &str {
        match self {
            Platform::Zomato => "Zomato",
            Platform::Swiggy => "Swiggy",
            Platform::Other(name) => name,
        }
    }
}

impl From<String> for Platform {
    fn from(raw: String) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("zomato") {
            Platform::Zomato
        } else if trimmed.eq_ignore_ascii_case("swiggy") {
            Platform::Swiggy
        } else {
            Platform::Other(trimmed.to_ascii_uppercase())
        }
    }
}

impl From<&str> for Platform {
    fn from(raw: &str) -> Self {
        Platform::from(raw.to_string())
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.to_string()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Zomato => write!(f, "ZOMATO"),
            Platform::Swiggy => write!(f, "SWIGGY"),
            Platform::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Identity of a cart line: the same dish may sit in the cart once per platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    pub product: ProductRef,
    pub platform: Platform,
}

impl LineKey {
    pub fn new(product: impl Into<ProductRef>, platform: Platform) -> Self {
        Self {
            product: product.into(),
            platform,
        }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.product, self.platform)
    }
}

/// One (dish, platform) entry in the cart.
///
/// Field names on the wire follow the backend's JSON (`reelId`, `foodName`, ...),
/// which is also the shape of the persisted cart snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    #[serde(rename = "reelId", default)]
    pub product_reference: ProductRef,
    pub platform: Platform,
    #[serde(rename = "foodName", default)]
    pub display_name: String,
    #[serde(rename = "restaurantId", default)]
    pub restaurant_reference: RestaurantId,
    #[serde(default)]
    pub restaurant_name: String,
    #[serde(rename = "price", alias = "totalPrice", default)]
    pub unit_price: Option<Decimal>,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
    /// Informational per-platform prices, independent of `platform`.
    #[serde(default)]
    pub comparison_prices: BTreeMap<Platform, Decimal>,
    /// Restaurant deep-links per platform, as provided by the backend.
    #[serde(default)]
    pub links: BTreeMap<Platform, String>,
}

impl CartLineItem {
    pub fn new(
        product_reference: impl Into<ProductRef>,
        platform: Platform,
        display_name: impl Into<String>,
        unit_price: Option<Decimal>,
    ) -> Self {
        Self {
            product_reference: product_reference.into(),
            platform,
            display_name: display_name.into(),
            restaurant_reference: RestaurantId::new(),
            restaurant_name: String::new(),
            unit_price,
            quantity: 1,
            image: None,
            comparison_prices: BTreeMap::new(),
            links: BTreeMap::new(),
        }
    }

    pub fn with_restaurant(mut self, id: impl Into<RestaurantId>, name: impl Into<String>) -> Self {
        self.restaurant_reference = id.into();
        self.restaurant_name = name.into();
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_link(mut self, platform: Platform, link: impl Into<String>) -> Self {
        self.links.insert(platform, link.into());
        self
    }

    pub fn with_comparison_price(mut self, platform: Platform, price: Decimal) -> Self {
        self.comparison_prices.insert(platform, price);
        self
    }

    pub fn key(&self) -> LineKey {
        LineKey::new(self.product_reference.clone(), self.platform.clone())
    }

    pub fn matches(&self, product: &str, platform: &Platform) -> bool {
        self.product_reference == product && &self.platform == platform
    }

    /// `unit_price * quantity`; a missing price counts as zero.
    pub fn line_total(&self) -> Decimal {
        self.unit_price.unwrap_or(Decimal::ZERO) * Decimal::from(self.quantity)
    }
}

/// The cart as consumers see it: canonical lines, derived totals and panel visibility.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartView {
    pub items: Vec<CartLineItem>,
    pub total_quantity: u32,
    pub total_price: Decimal,
    pub panel_open: bool,
}

impl CartView {
    pub fn find(&self, product: &str, platform: &Platform) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.matches(product, platform))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_parses_case_insensitively() {
        assert_eq!(Platform::from("zomato"), Platform::Zomato);
        assert_eq!(Platform::from(" SWIGGY "), Platform::Swiggy);
        assert_eq!(Platform::from("magicpin"), Platform::Other("MAGICPIN".to_string()));
        assert_eq!(Platform::Zomato.to_string(), "ZOMATO");
    }

    #[test]
    fn decodes_backend_cart_line() -> testresult::TestResult {
        let json = r#"{
            "reelId": "r1",
            "platform": "ZOMATO",
            "foodName": "Paneer Tikka",
            "restaurantId": "rest_1",
            "restaurantName": "Spice Route",
            "price": 220,
            "quantity": 2,
            "image": "/uploads/paneer.jpg",
            "comparisonPrices": { "zomato": 220, "swiggy": 199 },
            "links": { "zomato": "zomato.com/spice-route" }
        }"#;

        let item: CartLineItem = serde_json::from_str(json)?;

        assert_eq!(item.key(), LineKey::new("r1", Platform::Zomato));
        assert_eq!(item.unit_price, Some(Decimal::from(220)));
        assert_eq!(item.comparison_prices.get(&Platform::Swiggy), Some(&Decimal::from(199)));
        assert_eq!(item.links.get(&Platform::Zomato).map(String::as_str), Some("zomato.com/spice-route"));
        assert_eq!(item.line_total(), Decimal::from(440));
        Ok(())
    }

    #[test]
    fn total_price_alias_and_missing_price() -> testresult::TestResult {
        let with_alias: CartLineItem =
            serde_json::from_str(r#"{"reelId":"a","platform":"SWIGGY","totalPrice":150,"quantity":1}"#)?;
        assert_eq!(with_alias.unit_price, Some(Decimal::from(150)));

        let without: CartLineItem = serde_json::from_str(r#"{"reelId":"b","platform":"SWIGGY","quantity":3}"#)?;
        assert_eq!(without.unit_price, None);
        assert_eq!(without.line_total(), Decimal::ZERO);
        Ok(())
    }

    #[test]
    fn snapshot_shape_survives_serialization() -> testresult::TestResult {
        let item = CartLineItem::new("r9", Platform::Swiggy, "Dosa", Some(Decimal::new(12050, 2)))
            .with_restaurant("rest_9", "Udupi")
            .with_comparison_price(Platform::Zomato, Decimal::from(130));

        let json = serde_json::to_string(&item)?;
        let back: CartLineItem = serde_json::from_str(&json)?;

        assert_eq!(back, item);
        Ok(())
    }
}
