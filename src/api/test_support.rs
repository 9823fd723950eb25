//! In-memory `CatalogApi` used by unit tests

use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{CatalogApi, FetchError};
use crate::models::{Gender, NewVariant, Product, ProductDraft, ProductVariant};

#[derive(Default)]
pub struct FakeCatalog {
    products: Vec<Product>,
    fail_fetch: bool,
    fail_delete: bool,
    fail_add_product: bool,
    fail_variant_at: Option<usize>,
    attempted: Mutex<Vec<NewVariant>>,
    sent: Mutex<Vec<NewVariant>>,
    deleted: Mutex<Vec<String>>,
    added: Mutex<Vec<ProductDraft>>,
}

impl FakeCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            ..Default::default()
        }
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn failing_add_product(mut self) -> Self {
        self.fail_add_product = true;
        self
    }

    /// Fail the variant request at this 0-based position in call order
    pub fn fail_variant_at(mut self, index: usize) -> Self {
        self.fail_variant_at = Some(index);
        self
    }

    pub fn attempted_variants(&self) -> Vec<NewVariant> {
        self.attempted.lock().unwrap().clone()
    }

    pub fn sent_variants(&self) -> Vec<NewVariant> {
        self.sent.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn added_products(&self) -> Vec<ProductDraft> {
        self.added.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn fetch_products(&self) -> Result<Vec<Product>, FetchError> {
        if self.fail_fetch {
            return Err(FetchError::status("/product/getallproducts", 500));
        }
        Ok(self.products.clone())
    }

    async fn add_product(&self, draft: ProductDraft) -> Result<(), FetchError> {
        if self.fail_add_product {
            return Err(FetchError::status("/product/addproduct", 400));
        }
        self.added.lock().unwrap().push(draft);
        Ok(())
    }

    async fn delete_product(&self, id: &str) -> Result<(), FetchError> {
        if self.fail_delete {
            return Err(FetchError::status(format!("/product/deleteproduct/{}", id), 404));
        }
        self.deleted.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn add_variant(&self, variant: &NewVariant) -> Result<(), FetchError> {
        let position = {
            let mut attempted = self.attempted.lock().unwrap();
            attempted.push(variant.clone());
            attempted.len() - 1
        };
        if self.fail_variant_at == Some(position) {
            return Err(FetchError::status("/product/addproductdetails", 500));
        }
        self.sent.lock().unwrap().push(variant.clone());
        Ok(())
    }
}

pub fn product(id: &str, name: &str, variants: usize) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{} description", name),
        price: 150.0,
        gender: Gender::Unisex,
        image: String::new(),
        on_sale: 0.0,
        variants: (0..variants)
            .map(|i| ProductVariant {
                id: format!("{}-v{}", id, i),
                size: 40.0 + i as f64,
                stock: 10 + i as i64,
            })
            .collect(),
    }
}
