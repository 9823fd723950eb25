//! Results posted back to the UI loop by request tasks

use crate::admin_tui::app::Route;
use crate::api::{FetchError, VariantBatchReport};
use crate::models::{Order, Product, User};

/// Dashboard cards that carry a live count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountCard {
    Products,
    Orders,
    Users,
}

/// Outcome of a request, tagged with the visit of the screen that issued it
#[derive(Debug)]
pub enum AppEvent {
    CountLoaded {
        visit: u64,
        card: CountCard,
        result: Result<usize, FetchError>,
    },
    ProductsLoaded {
        visit: u64,
        result: Result<Vec<Product>, FetchError>,
    },
    ProductDeleted {
        visit: u64,
        id: String,
        result: Result<(), FetchError>,
    },
    ProductAdded {
        visit: u64,
        result: Result<(), FetchError>,
    },
    /// Product choices for the variant form
    VariantProductsLoaded {
        visit: u64,
        result: Result<Vec<Product>, FetchError>,
    },
    VariantsSubmitted {
        visit: u64,
        report: VariantBatchReport,
    },
    OrdersLoaded {
        visit: u64,
        result: Result<Vec<Order>, FetchError>,
    },
    UsersLoaded {
        visit: u64,
        result: Result<Vec<User>, FetchError>,
    },
}

impl AppEvent {
    /// Screen the event belongs to
    pub fn route(&self) -> Route {
        match self {
            AppEvent::CountLoaded { .. } => Route::Dashboard,
            AppEvent::ProductsLoaded { .. } | AppEvent::ProductDeleted { .. } => Route::Products,
            AppEvent::ProductAdded { .. } => Route::AddProduct,
            AppEvent::VariantProductsLoaded { .. } | AppEvent::VariantsSubmitted { .. } => {
                Route::AddVariant
            }
            AppEvent::OrdersLoaded { .. } => Route::Orders,
            AppEvent::UsersLoaded { .. } => Route::Users,
        }
    }

    pub fn visit(&self) -> u64 {
        match self {
            AppEvent::CountLoaded { visit, .. }
            | AppEvent::ProductsLoaded { visit, .. }
            | AppEvent::ProductDeleted { visit, .. }
            | AppEvent::ProductAdded { visit, .. }
            | AppEvent::VariantProductsLoaded { visit, .. }
            | AppEvent::VariantsSubmitted { visit, .. }
            | AppEvent::OrdersLoaded { visit, .. }
            | AppEvent::UsersLoaded { visit, .. } => *visit,
        }
    }
}
