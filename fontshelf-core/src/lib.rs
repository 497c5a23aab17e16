//! fontshelf library exports

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod font;
pub mod fontlist;
pub mod library;
pub mod preview;
pub mod render;
pub mod source;
pub mod storage;

pub use error::{FontError, FontResult};
