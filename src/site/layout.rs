//! On-disk layout of the generator site.

use std::path::{Path, PathBuf};

use crate::content::ArticleId;

/// Name of the content file inside each article directory.
pub const INDEX_FILE: &str = "index.md";

/// Site-relative prefix of attached images.
pub const IMAGE_PREFIX: &str = "/static/images";

/// Paths inside the site directory.
///
/// ```text
/// <site>/
///   hugo.toml
///   content/post/<id>/index.md
///   content/about/index.md
///   static/images/<id>/<nanos>.png
///   static/CNAME
///   public/            generator output, deployed
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    root: PathBuf,
}

impl SiteLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `content/post`
    pub fn post_root(&self) -> PathBuf {
        self.root.join("content").join("post")
    }

    /// Directory that holds an article's content file.
    pub fn article_dir(&self, id: ArticleId) -> PathBuf {
        match id {
            ArticleId::About => self.root.join("content").join(ArticleId::ABOUT),
            ArticleId::Post(n) => self.post_root().join(n.to_string()),
        }
    }

    /// The content file of an article.
    pub fn article_file(&self, id: ArticleId) -> PathBuf {
        self.article_dir(id).join(INDEX_FILE)
    }

    /// `static/images`
    pub fn image_root(&self) -> PathBuf {
        self.root.join("static").join("images")
    }

    /// Per-article image directory.
    pub fn image_dir(&self, id: ArticleId) -> PathBuf {
        self.image_root().join(id.to_string())
    }

    pub fn cname_file(&self) -> PathBuf {
        self.root.join("static").join("CNAME")
    }

    /// The generator's configuration document.
    pub fn config_file(&self) -> PathBuf {
        self.root.join("hugo.toml")
    }

    /// Generator output, the deployed directory.
    pub fn public_dir(&self) -> PathBuf {
        self.root.join("public")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_paths() {
        let layout = SiteLayout::new("/home/u/.swallow/site");
        assert_eq!(
            layout.article_file(ArticleId::Post(3)),
            PathBuf::from("/home/u/.swallow/site/content/post/3/index.md")
        );
        assert_eq!(
            layout.article_file(ArticleId::About),
            PathBuf::from("/home/u/.swallow/site/content/about/index.md")
        );
        assert_eq!(
            layout.image_dir(ArticleId::Post(3)),
            PathBuf::from("/home/u/.swallow/site/static/images/3")
        );
        assert_eq!(layout.public_dir(), PathBuf::from("/home/u/.swallow/site/public"));
    }
}
