use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Price multiplier stored in `onSale` for a product that is not discounted.
pub const FULL_PRICE_MULTIPLIER: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub gender: Gender,
    #[serde(default)]
    pub image: String,
    #[serde(rename = "onSale", default)]
    pub on_sale: f64,
    #[serde(rename = "productDetails", default)]
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// Any positive multiplier is rendered as a sale, including `1`.
    pub fn is_on_sale(&self) -> bool {
        self.on_sale > 0.0
    }

    pub fn sale_price(&self) -> f64 {
        self.price * self.on_sale
    }

    /// Inverts the `onSale` multiplier back into a fraction off the base price.
    pub fn percent_off(&self) -> f64 {
        FULL_PRICE_MULTIPLIER - self.on_sale
    }

    pub fn total_stock(&self) -> i64 {
        self.variants.iter().map(|v| v.stock).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    #[serde(rename = "_id")]
    pub id: String,
    pub size: f64,
    pub stock: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Gender {
    Men,
    Women,
    Unisex,
    Kids,
    Other(String),
}

impl Gender {
    pub const ALL: [Gender; 4] = [Gender::Men, Gender::Women, Gender::Unisex, Gender::Kids];

    pub fn as_str(&self) -> &str {
        match self {
            Gender::Men => "men",
            Gender::Women => "women",
            Gender::Unisex => "unisex",
            Gender::Kids => "kids",
            Gender::Other(s) => s,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Gender::Men => "Men",
            Gender::Women => "Women",
            Gender::Unisex => "Unisex",
            Gender::Kids => "Kids",
            Gender::Other(s) => s,
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "men" => Gender::Men,
            "women" => Gender::Women,
            "unisex" => Gender::Unisex,
            "kids" => Gender::Kids,
            _ => Gender::Other(value.to_string()),
        }
    }
}

impl Serialize for Gender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Gender::parse(&value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(rename = "customerName")]
    pub customer_name: String,
    #[serde(rename = "customerEmail")]
    pub customer_email: String,
    #[serde(rename = "products")]
    pub lines: Vec<OrderLine>,
    pub total: f64,
    #[serde(rename = "createdAt")]
    pub created_at: NaiveDate,
}

impl Order {
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub size: String,
    pub quantity: u32,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub avatar: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "registeredAt")]
    pub registered_at: NaiveDate,
}

/// Image attached to a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn mime_for(file_name: &str) -> &'static str {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            "gif" => "image/gif",
            _ => "application/octet-stream",
        }
    }
}

/// Scalar fields of the product-creation form, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: String,
    pub gender: Gender,
    pub on_sale: f64,
    pub image: ImageUpload,
}

impl ProductDraft {
    /// Text parts of the multipart body, in submission order after `image`.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("description", self.description.clone()),
            ("price", self.price.clone()),
            ("gender", self.gender.as_str().to_string()),
            ("onSale", format_multiplier(self.on_sale)),
        ]
    }
}

/// Body of a single `addproductdetails` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVariant {
    #[serde(rename = "productID")]
    pub product_id: String,
    pub size: f64,
    pub stock: i64,
}

/// Encodes the sale toggle as the price multiplier the API stores.
///
/// Off yields exactly `1`; on yields `1 - sale_percentage`. The stored value
/// cannot tell "not on sale" apart from a zero percent sale.
pub fn on_sale_multiplier(enabled: bool, sale_percentage: f64) -> f64 {
    if enabled {
        FULL_PRICE_MULTIPLIER - sale_percentage
    } else {
        FULL_PRICE_MULTIPLIER
    }
}

/// Renders a multiplier without float noise (`1 - 0.3` prints as `0.7`).
pub fn format_multiplier(value: f64) -> String {
    let rounded = (value * 1e9).round() / 1e9;
    format!("{}", rounded)
}

pub fn format_money(value: f64) -> String {
    format!("${:.2}", value)
}

pub fn format_size(size: f64) -> String {
    if size.fract() == 0.0 {
        format!("{}", size as i64)
    } else {
        format!("{}", size)
    }
}
