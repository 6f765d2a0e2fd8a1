//! Product catalog domain: categories, product records and series
//! resolution.

pub mod category;
pub mod product;
pub mod series;

pub use category::{Category, CategoryGroup, UnknownCategory};
pub use product::{AllProducts, Envelope, NewProduct, Product, SeriesMap};
