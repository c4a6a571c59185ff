use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
pub use storefront_catalog::{
    CatalogClient,
    CatalogClientConfig,
    CatalogClientError,
    Category,
    DEFAULT_API_URL,
    Product,
    ProductParams,
    StatusCode,
};
use thiserror::Error;

pub const STOREFRONT_CATALOG_MOCK_DATA_VAR: &str = "_STOREFRONT_USE_CATALOG_MOCK";

// Arc allows you to push things into the client from outside the client if necessary
// Mutex allows you to share across threads (necessary because of tokio)
type MockField<T> = Arc<Mutex<T>>;

/// A canned answer of the [MockClient].
///
/// Serialized externally tagged, so a mock data file reads like
/// `[{"categories": [...]}, {"products": [...]}, {"error": 500}]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Products(Vec<Product>),
    Product(Product),
    Categories(Vec<Category>),
    /// The remote source answered with this (non-success) status code
    Error(u16),
}

/// A request received by the [MockClient], recorded in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Products(ProductParams),
    AllProducts,
    Product(u64),
    Categories,
}

#[derive(Debug, Error)]
pub enum MockDataError {
    /// Failed to read the JSON file pointed at by the mock data variable
    #[error("failed to read mock response file")]
    ReadMockFile(#[source] std::io::Error),
    /// Failed to parse the contents of the mock data file as JSON
    #[error("failed to parse mock data as JSON")]
    ParseJson(#[source] serde_json::Error),
}

/// Reads a list of mock responses from disk.
fn read_mock_responses(path: impl AsRef<Path>) -> Result<VecDeque<Response>, MockDataError> {
    let contents = std::fs::read_to_string(path).map_err(MockDataError::ReadMockFile)?;
    let deserialized: Vec<Response> =
        serde_json::from_str(&contents).map_err(MockDataError::ParseJson)?;
    Ok(deserialized.into())
}

/// Either a client for the actual remote catalog,
/// or a mock client for testing.
#[derive(Debug)]
#[enum_dispatch(ClientTrait)]
pub enum Client {
    Catalog(CatalogClient),
    Mock(MockClient),
}

/// The operations of the remote source the reconciliation layer relies on.
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// Fetch a page of products matching the (remote) filter parameters.
    async fn products(&self, params: &ProductParams) -> Result<Vec<Product>, CatalogClientError>;

    /// Fetch the complete, unfiltered product collection.
    async fn all_products(&self) -> Result<Vec<Product>, CatalogClientError>;

    /// Fetch a single product by id.
    async fn product(&self, id: u64) -> Result<Product, CatalogClientError>;

    /// Fetch all categories in remote order.
    async fn categories(&self) -> Result<Vec<Category>, CatalogClientError>;
}

impl ClientTrait for CatalogClient {
    async fn products(&self, params: &ProductParams) -> Result<Vec<Product>, CatalogClientError> {
        CatalogClient::products(self, params).await
    }

    async fn all_products(&self) -> Result<Vec<Product>, CatalogClientError> {
        CatalogClient::all_products(self).await
    }

    async fn product(&self, id: u64) -> Result<Product, CatalogClientError> {
        CatalogClient::product(self, id).await
    }

    async fn categories(&self) -> Result<Vec<Category>, CatalogClientError> {
        CatalogClient::categories(self).await
    }
}

/// A catalog client that can be seeded with mock responses
///
/// Responses are handed out first in, first out, regardless of which
/// operation asks for them, so tests queue them in the order the code under
/// test issues its requests.
#[derive(Debug, Default, Clone)]
pub struct MockClient {
    pub mock_responses: MockField<VecDeque<Response>>,
    pub requests: MockField<Vec<Request>>,
}

impl MockClient {
    /// Create a new mock client, potentially reading mock responses from disk
    pub fn new(mock_data_path: Option<impl AsRef<Path>>) -> Result<Self, MockDataError> {
        let mock_responses = match mock_data_path {
            Some(path) => read_mock_responses(path)?,
            None => VecDeque::new(),
        };
        Ok(Self {
            mock_responses: Arc::new(Mutex::new(mock_responses)),
            requests: Default::default(),
        })
    }

    /// Push a new response into the list of mock responses
    pub fn push_products_response(&mut self, resp: Vec<Product>) {
        self.push_response(Response::Products(resp));
    }

    /// Push a new response into the list of mock responses
    pub fn push_product_response(&mut self, resp: Product) {
        self.push_response(Response::Product(resp));
    }

    /// Push a new response into the list of mock responses
    pub fn push_categories_response(&mut self, resp: Vec<Category>) {
        self.push_response(Response::Categories(resp));
    }

    /// Push an error status into the list of mock responses
    pub fn push_error_response(&mut self, status_code: u16) {
        self.push_response(Response::Error(status_code));
    }

    pub fn push_response(&mut self, resp: Response) {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .push_back(resp);
    }

    /// All requests received so far, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .expect("couldn't acquire mock lock")
            .clone()
    }

    /// Number of queued responses that have not been consumed yet.
    pub fn pending_responses(&self) -> usize {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .len()
    }

    /// Record `request` and pop the next queued response.
    fn respond(&self, request: Request) -> Option<Response> {
        self.requests
            .lock()
            .expect("couldn't acquire mock lock")
            .push(request);
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .pop_front()
    }
}

/// Turn a mocked status code into the error the HTTP client would produce.
fn mock_status_error(endpoint: &str, status: u16) -> CatalogClientError {
    match StatusCode::from_u16(status) {
        Ok(status) => CatalogClientError::Status {
            url: format!("mock:///{endpoint}"),
            status,
        },
        Err(_) => CatalogClientError::Other(format!("invalid mocked status code {status}")),
    }
}

fn unexpected_mock_response(expected: &str, found: Option<Response>) -> CatalogClientError {
    CatalogClientError::Other(format!(
        "mock client expected {expected} response, found {found:?}"
    ))
}

impl ClientTrait for MockClient {
    async fn products(&self, params: &ProductParams) -> Result<Vec<Product>, CatalogClientError> {
        match self.respond(Request::Products(params.clone())) {
            Some(Response::Products(resp)) => Ok(resp),
            Some(Response::Error(status)) => Err(mock_status_error("products", status)),
            other => Err(unexpected_mock_response("products", other)),
        }
    }

    async fn all_products(&self) -> Result<Vec<Product>, CatalogClientError> {
        match self.respond(Request::AllProducts) {
            Some(Response::Products(resp)) => Ok(resp),
            Some(Response::Error(status)) => Err(mock_status_error("products", status)),
            other => Err(unexpected_mock_response("products", other)),
        }
    }

    async fn product(&self, id: u64) -> Result<Product, CatalogClientError> {
        match self.respond(Request::Product(id)) {
            Some(Response::Product(resp)) => Ok(resp),
            Some(Response::Error(400 | 404)) => Err(CatalogClientError::NotFound(id)),
            Some(Response::Error(status)) => {
                Err(mock_status_error(&format!("products/{id}"), status))
            },
            other => Err(unexpected_mock_response("product", other)),
        }
    }

    async fn categories(&self) -> Result<Vec<Category>, CatalogClientError> {
        match self.respond(Request::Categories) {
            Some(Response::Categories(resp)) => Ok(resp),
            Some(Response::Error(status)) => Err(mock_status_error("categories", status)),
            other => Err(unexpected_mock_response("categories", other)),
        }
    }
}
