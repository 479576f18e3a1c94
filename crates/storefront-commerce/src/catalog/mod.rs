//! Product catalog: taxonomy, products, listing queries and reviews.

pub mod product;
mod query;
mod review;
mod service;
mod slug;
mod taxonomy;

pub use product::{NewProduct, Product, ProductDetail};
pub use query::{Page, PageRequest, Pagination, ProductFilter, ProductOrdering};
pub use review::{NewReview, Review};
pub use service::Catalog;
pub use slug::slugify;
pub use taxonomy::{Brand, Category, Material, NewCategory, NewTerm};
