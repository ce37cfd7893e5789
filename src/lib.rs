//! Swallow - a local blog authoring backend
//!
//! Articles live as files with TOML front matter inside a Hugo site tree.
//! A SQLite index keeps their title, tags and timestamps for listing and
//! search, and the generated site is published by force-pushing a git
//! repository kept in the output directory.
//!
//! # Example
//!
//! ```no_run
//! use swallow::app::{App, AppContext};
//! use swallow::config::AppConfig;
//! use swallow::content::Metadata;
//!
//! let ctx = AppContext::open("/tmp/swallow", AppConfig::default()).unwrap();
//! let app = App::new(ctx);
//! let meta = Metadata { title: "Hello".into(), ..Metadata::default() };
//! let resp = app.article_save("", meta, "first post");
//! println!("{}", resp.to_json());
//! ```

pub mod app;
pub mod config;
pub mod content;
pub mod deploy;
pub mod index;
pub mod logging;
pub mod settings;
pub mod site;
