//! Core logic of the ProseFlow download site: visitor platform detection,
//! the download catalog, the latest release lookup and the decorative
//! particle field.

pub mod config;
pub mod download;
pub mod galaxy;
pub mod http;
pub mod platform;
pub mod release;
