//! Pipeline stages for turning a product list into a card layout.
//!
//! Each submodule implements exactly one transformation step and holds no
//! state between calls, so every stage can be tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ mapper ──▶ validate ──▶ dedup ──▶ layout
//! (CSV/TSV)  (profile)  (URL/name)  (url/code)  (pages/slots)
//! ```
//!
//! 1. [`input`]: read and decode the file, guess the delimiter, split
//!    records into raw fields
//! 2. [`mapper`]: pick id, name, colour and URL by profile index and
//!    build the display name
//! 3. [`validate`]: produce the annotated [`crate::row::Row`] with its
//!    one-time validity verdict
//! 4. [`dedup`]: flag and exclude repeated URLs and product codes
//! 5. [`layout`]: pure page geometry; decides which card lands in which
//!    slot on which page

pub mod dedup;
pub mod input;
pub mod layout;
pub mod mapper;
pub mod validate;
