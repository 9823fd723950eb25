//! Screens mounted at each route

pub mod add_product;
pub mod add_variant;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod users;

pub use add_product::AddProductScreen;
pub use add_variant::AddVariantScreen;
pub use dashboard::DashboardScreen;
pub use orders::OrdersScreen;
pub use products::ProductsScreen;
pub use users::UsersScreen;
