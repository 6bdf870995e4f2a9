use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Prices strictly below this are "cheap".
pub const CHEAP_PRICE_THRESHOLD: f64 = 20.0;

/// How many products the `last` view returns.
pub const LAST_PRODUCTS_COUNT: usize = 3;

/// Name reported by the get-by-id sentinel.
pub const NOT_FOUND_NAME: &str = "not found";

/// Product entity, as held by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned identifier (UUIDv7, so id order is creation order)
    pub id: Uuid,
    pub name: String,
    pub price: f64,
}

impl Product {
    pub fn new(id: Uuid, name: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            price,
        }
    }
}

/// Input to `ProductRepository::save`; the store picks the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
}

impl NewProduct {
    /// Assign `id` and turn this into a stored product.
    pub fn into_product(self, id: Uuid) -> Product {
        Product::new(id, self.name, self.price)
    }
}

/// External representation of a product.
///
/// On input every field is optional. The `id` is ignored since ids are always
/// assigned by the store; a missing `name` or `price` fails validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductDto {
    #[serde(default)]
    #[schema(example = "0192f1c4-7d3a-7c61-9a53-2f6a7b0c1e11")]
    pub id: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Teclado")]
    pub name: String,
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0, message = "price must be greater than zero"))]
    #[schema(example = 30.0)]
    pub price: f64,
}

impl ProductDto {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }

    /// Placeholder returned by get-by-id when nothing matches `id`.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::new(id, NOT_FOUND_NAME, 0.0)
    }

    /// Store input built from this DTO; any `id` on the DTO is dropped.
    pub fn to_new_product(&self) -> NewProduct {
        NewProduct {
            name: self.name.clone(),
            price: self.price,
        }
    }
}

impl From<&Product> for ProductDto {
    fn from(product: &Product) -> Self {
        Self::new(product.id.to_string(), product.name.clone(), product.price)
    }
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self::new(product.id.to_string(), product.name, product.price)
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(
            ValidationError::new("not_blank").with_message(Cow::Borrowed("name must not be blank"))
        );
    }
    Ok(())
}

/// Products served when the catalog is empty, in this order.
pub fn default_products() -> Vec<Product> {
    vec![
        Product::new(Uuid::from_u128(1), "Laptop Gamer", 120.00),
        Product::new(Uuid::from_u128(2), "Teclado", 30.00),
        Product::new(Uuid::from_u128(3), "Mouse", 12.00),
    ]
}

/// Products sharing one exact price.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceGroup {
    pub price: f64,
    pub products: Vec<ProductDto>,
}

/// Products grouped by exact price.
///
/// Groups keep the order in which their price first appeared; members keep
/// repository order. Serialized as a JSON object keyed by the price rendered
/// with a decimal point (`"120.0"`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceGroups(pub Vec<PriceGroup>);

impl PriceGroups {
    pub fn from_products<'a>(products: impl IntoIterator<Item = &'a Product>) -> Self {
        let mut groups: Vec<PriceGroup> = Vec::new();
        for product in products {
            // Exact comparison: grouping is by the stored value, not a tolerance.
            match groups
                .iter_mut()
                .find(|g| g.price.to_bits() == product.price.to_bits())
            {
                Some(group) => group.products.push(product.into()),
                None => groups.push(PriceGroup {
                    price: product.price,
                    products: vec![product.into()],
                }),
            }
        }
        Self(groups)
    }

    pub fn get(&self, price: f64) -> Option<&[ProductDto]> {
        self.0
            .iter()
            .find(|g| g.price.to_bits() == price.to_bits())
            .map(|g| g.products.as_slice())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for PriceGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for group in &self.0 {
            map.serialize_entry(&price_key(group.price), &group.products)?;
        }
        map.end()
    }
}

/// `120` renders as `"120.0"`, `12.5` as `"12.5"`.
fn price_key(price: f64) -> String {
    format!("{price:?}")
}

/// Cheapest and most expensive product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MinMax {
    #[serde(rename = "Min")]
    pub min: ProductDto,
    #[serde(rename = "Max")]
    pub max: ProductDto,
}

fn default_limit() -> usize {
    5
}

/// `?limit=` for the recent and modified views.
#[derive(Debug, Clone, Copy, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    /// Maximum number of products to return (default 5)
    #[serde(default = "default_limit")]
    #[param(default = 5, minimum = 0)]
    pub limit: usize,
}

impl Default for LimitQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}
