//! Core types for the barcode catalog.

pub mod id;
pub mod images;
pub mod number;
pub mod product;

pub use id::*;
pub use images::{ImageSource, Images, normalize_images};
pub use number::{InvalidNumber, NumericInput, number_option};
pub use product::{NewProduct, Product, ProductUpdate};
