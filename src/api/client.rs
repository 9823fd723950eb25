//! HTTP client for the store REST API

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::api::errors::FetchError;
use crate::config::Config;
use crate::models::{NewVariant, Product, ProductDraft};

pub mod endpoints {
    pub const LIST_PRODUCTS: &str = "/product/getallproducts";
    pub const ADD_PRODUCT: &str = "/product/addproduct";
    pub const DELETE_PRODUCT: &str = "/product/deleteproduct";
    pub const ADD_VARIANT: &str = "/product/addproductdetails";
}

/// Catalog operations the screens depend on.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn fetch_products(&self) -> Result<Vec<Product>, FetchError>;

    async fn add_product(&self, draft: ProductDraft) -> Result<(), FetchError>;

    async fn delete_product(&self, id: &str) -> Result<(), FetchError>;

    async fn add_variant(&self, variant: &NewVariant) -> Result<(), FetchError>;
}

/// reqwest-backed client bound to one API origin
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: Config,
}

impl ApiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(&config.http.user_agent)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// GET a JSON array from `endpoint`
    pub async fn fetch_collection<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Vec<T>, FetchError> {
        let url = self.config.endpoint(endpoint);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::new(&url, e))?;
        let response = ensure_success(&url, response)?;

        let body = response.bytes().await.map_err(|e| FetchError::new(&url, e))?;
        let items: Vec<T> = serde_json::from_slice(&body).map_err(|e| FetchError::new(&url, e))?;
        info!("Fetched {} items from {}", items.len(), endpoint);
        Ok(items)
    }

    /// POST a JSON body to `endpoint`
    pub async fn submit_json<P: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &P,
    ) -> Result<(), FetchError> {
        let url = self.config.endpoint(endpoint);
        debug!("POST {} (json)", url);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| FetchError::new(&url, e))?;
        ensure_success(&url, response)?;
        Ok(())
    }

    /// POST a multipart form to `endpoint`
    pub async fn submit_multipart(
        &self,
        endpoint: &str,
        form: multipart::Form,
    ) -> Result<(), FetchError> {
        let url = self.config.endpoint(endpoint);
        debug!("POST {} (multipart)", url);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| FetchError::new(&url, e))?;
        ensure_success(&url, response)?;
        Ok(())
    }

    /// DELETE `endpoint/{id}`
    pub async fn delete_resource(&self, endpoint: &str, id: &str) -> Result<(), FetchError> {
        let url = self.config.endpoint(&format!("{}/{}", endpoint.trim_end_matches('/'), id));
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| FetchError::new(&url, e))?;
        ensure_success(&url, response)?;
        Ok(())
    }
}

/// Build the multipart body for a new product: the image first, then the
/// scalar fields.
pub fn product_form(draft: ProductDraft) -> Result<multipart::Form, reqwest::Error> {
    let text_fields = draft.text_fields();
    let image = multipart::Part::bytes(draft.image.bytes)
        .file_name(draft.image.file_name)
        .mime_str(draft.image.mime_type)?;

    let mut form = multipart::Form::new().part("image", image);
    for (name, value) in text_fields {
        form = form.text(name, value);
    }
    Ok(form)
}

fn ensure_success(url: &str, response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        warn!("{} answered with status {}", url, status);
        Err(FetchError::status(url, status.as_u16()))
    }
}

#[async_trait]
impl CatalogApi for ApiClient {
    async fn fetch_products(&self) -> Result<Vec<Product>, FetchError> {
        self.fetch_collection(endpoints::LIST_PRODUCTS).await
    }

    async fn add_product(&self, draft: ProductDraft) -> Result<(), FetchError> {
        info!("Adding product '{}' (onSale={})", draft.name, draft.on_sale);
        let form = product_form(draft)
            .map_err(|e| FetchError::new(self.config.endpoint(endpoints::ADD_PRODUCT), e))?;
        self.submit_multipart(endpoints::ADD_PRODUCT, form).await
    }

    async fn delete_product(&self, id: &str) -> Result<(), FetchError> {
        info!("Deleting product {}", id);
        self.delete_resource(endpoints::DELETE_PRODUCT, id).await
    }

    async fn add_variant(&self, variant: &NewVariant) -> Result<(), FetchError> {
        self.submit_json(endpoints::ADD_VARIANT, variant).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::errors::FetchCause;
    use crate::models::{Gender, ImageUpload};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer one request with `status` and `body`; the handle yields the raw request
    async fn serve_once(status: &'static str, body: &'static str) -> (ApiClient, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
                    let length = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .map(|v| v.trim().parse::<usize>().unwrap())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });

        let config = Config::default().with_overrides(Some(&origin), None);
        (ApiClient::new(&config).unwrap(), handle)
    }

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Air Max 90".to_string(),
            description: "Classic".to_string(),
            price: "129.99".to_string(),
            gender: Gender::Unisex,
            on_sale: 0.7,
            image: ImageUpload {
                file_name: "airmax.png".to_string(),
                mime_type: "image/png",
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
            },
        }
    }

    #[test]
    fn test_product_form_builds() {
        let form = product_form(draft()).unwrap();
        assert!(!form.boundary().is_empty());
    }

    #[test]
    fn test_product_form_field_order() {
        let names: Vec<_> = draft().text_fields().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["name", "description", "price", "gender", "onSale"]);
        let on_sale = draft().text_fields().pop().unwrap();
        assert_eq!(on_sale.1, "0.7");
    }

    #[tokio::test]
    async fn test_unreachable_api_is_fetch_error() {
        let config = Config::default().with_overrides(Some("http://127.0.0.1:9"), None);
        let client = ApiClient::new(&config).unwrap();
        let err = client.fetch_products().await.unwrap_err();
        assert!(err.endpoint.ends_with(endpoints::LIST_PRODUCTS));
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_error() {
        let (client, server) = serve_once("500 Internal Server Error", "{}").await;
        let err = client.fetch_products().await.unwrap_err();
        assert!(matches!(err.cause, FetchCause::Status(500)));
        assert!(server.await.unwrap().starts_with("GET /product/getallproducts HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_fetch_error() {
        let (client, server) = serve_once("200 OK", r#"[{"bad":"#).await;
        let err = client.fetch_products().await.unwrap_err();
        assert!(matches!(err.cause, FetchCause::Body(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_products_decodes_array() {
        let (client, server) = serve_once(
            "200 OK",
            r#"[{"_id":"p1","name":"Dunk Low","price":110,"gender":"men","onSale":1}]"#,
        )
        .await;
        let products = client.fetch_products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "p1");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_targets_product_id() {
        let (client, server) = serve_once("200 OK", "{}").await;
        client.delete_product("abc123").await.unwrap();
        let request = server.await.unwrap();
        assert!(request.starts_with("DELETE /product/deleteproduct/abc123 HTTP/1.1"));

        let (client, _server) = serve_once("404 Not Found", "{}").await;
        let err = client.delete_product("gone").await.unwrap_err();
        assert!(matches!(err.cause, FetchCause::Status(404)));
    }

    #[tokio::test]
    async fn test_add_variant_posts_json() {
        let (client, server) = serve_once("201 Created", "{}").await;
        let variant = NewVariant {
            product_id: "p1".to_string(),
            size: 42.5,
            stock: 3,
        };
        client.add_variant(&variant).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /product/addproductdetails HTTP/1.1"));
        assert!(request.to_lowercase().contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"productID":"p1","size":42.5,"stock":3}"#));
    }
}
