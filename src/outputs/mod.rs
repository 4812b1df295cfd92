//! Output generation for discovery reports.
//!
//! One submodule today:
//!
//! - [`json`]: writes a [`crate::models::DiscoveryResult`] as a JSON report
//!   consumed by the downstream verification service
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── nyu/
//!     ├── 2025-01-01_2025-01-07.json
//!     └── 2025-01-08_2025-01-14.json
//! ```

pub mod json;
