//! Built-in compilation passes.

pub mod layout;
pub mod normalize;
pub mod route;

pub use layout::{LayoutPlanner, LayoutStrategy};
pub use normalize::Normalizer;
pub use route::{Router, RoutingStrategy};
