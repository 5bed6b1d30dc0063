//! Reference domain module.
//!
//! - `model`: citation types (`EntityType`, `Reference`)
//! - `resolver`: fixed entity table used to build deep links and badge styles

mod model;
pub mod resolver;

pub use model::{EntityType, Reference};
pub use resolver::{DeepLink, EntityStyle, QueryParam, resolve, style};
