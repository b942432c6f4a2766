//! Coming Soon Core - Shared types library.
//!
//! This crate provides the pieces of the coming-soon site that carry real
//! logic but no I/O:
//! - `site` - Public landing page, subscribe form and admin surface
//! - `cli` - Command-line tools for migrations and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no database
//! access, no HTTP. This keeps it lightweight and easy to test.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for site ids, subscriber ids, emails and phones
//! - [`content`] - The page content document, its defaults, merge-on-load and sanitizing
//! - [`markdown`] - Restricted markdown to sanitized HTML

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod content;
pub mod markdown;
pub mod types;

pub use content::PageContent;
pub use markdown::{parse_markdown, strip_markdown};
pub use types::*;
