//! Shared data structures for the analytics & optimization engine
//!
//! - `reading`: borrowed sensor readings and detector samples
//! - `forecast`: forecast points, tagged outcomes and reports
//! - `route`: collection candidates and route results
//! - `anomaly`: anomaly records and tagged detector outcomes
//! - `health`: composite health score and status labels

mod reading;
mod forecast;
mod route;
mod anomaly;
mod health;

pub use reading::*;
pub use forecast::*;
pub use route::*;
pub use anomaly::*;
pub use health::*;
