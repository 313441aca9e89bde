//! Collection Route Optimization
//!
//! Consumes an unordered set of bins (location, fill ratio, priority tier)
//! and produces a visitation order, its great-circle length, an efficiency
//! score and a placeholder duration estimate. Entirely algorithmic and
//! stateless.

mod optimizer;

pub use optimizer::{RouteOptimizer, RoutingError};
