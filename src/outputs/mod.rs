//! Persistence of retrieval results.
//!
//! # Submodules
//!
//! - [`table`]: builds the header + data rows of the results sheet
//! - [`json`]: writes that table to a dated JSON workbook file
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── latimes_24-06-10_wildfire_California.json
//! └── images/
//!     ├── Wildfire spreads near Malibu.jpg
//!     └── ...
//! ```

pub mod json;
pub mod table;
