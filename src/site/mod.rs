//! The generated site: directory layout, the external generator, its live
//! preview, the site configuration document and site-level assets.

mod assets;
mod config;
mod error;
mod generator;
mod layout;
mod preview;

pub use assets::replace_asset;
pub use config::{update_site_config, Author, AuthorPatch, SiteConfig, SiteConfigPatch};
pub use error::{GeneratorError, GeneratorResult, SiteError, SiteResult};
pub use generator::{Hugo, SiteGenerator};
pub use layout::{SiteLayout, IMAGE_PREFIX, INDEX_FILE};
pub use preview::PreviewServer;
