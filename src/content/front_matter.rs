//! Front-matter codec.
//!
//! A content file starts with a TOML metadata block fenced by two `+++`
//! lines; the body follows the closing fence byte for byte:
//!
//! ```text
//! +++
//! title = "First Post"
//! tags = ["a", "b"]
//! +++
//! hello
//! ```
//!
//! Decoding never fails. A document whose block is unterminated or absent,
//! or whose block is not valid TOML, decodes to zero-valued metadata plus
//! whatever body could be recovered, and the problem is logged. One bad file
//! must not keep the rest of the site from loading.

use tracing::warn;

use crate::content::types::Metadata;

/// The fence line around the metadata block.
pub const DELIMITER: &str = "+++";

/// How the fences were laid out in a scanned document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// an opening and a closing fence were found
    Closed,
    /// only the opening fence was found
    Unterminated,
    /// no fence at all
    Missing,
}

/// A document cut into its metadata text and body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    pub meta: &'a str,
    pub body: &'a str,
    pub layout: Layout,
}

/// The result of decoding a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub meta: Metadata,
    pub body: String,
    pub layout: Layout,
    /// false when the metadata text was present but unparsable
    pub meta_parsed: bool,
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

/// Locate the metadata block.
///
/// The first fence opens the block and the next fence closes it; scanning
/// stops there, so fences further down belong to the body.
pub fn split(document: &str) -> Split<'_> {
    let mut offset = 0;
    let mut meta_start: Option<usize> = None;

    for line in document.split_inclusive('\n') {
        let next = offset + line.len();
        if is_fence(line) {
            match meta_start {
                None => meta_start = Some(next),
                Some(start) => {
                    return Split {
                        meta: &document[start..offset],
                        body: &document[next..],
                        layout: Layout::Closed,
                    };
                }
            }
        }
        offset = next;
    }

    match meta_start {
        Some(start) => Split {
            meta: "",
            body: &document[start..],
            layout: Layout::Unterminated,
        },
        None => Split {
            meta: "",
            body: document,
            layout: Layout::Missing,
        },
    }
}

/// Serialize metadata into a fenced block (including both fences).
pub fn encode(meta: &Metadata) -> Result<String, toml::ser::Error> {
    let mut block = String::from(DELIMITER);
    block.push('\n');
    block.push_str(&toml::to_string(meta)?);
    if !block.ends_with('\n') {
        block.push('\n');
    }
    block.push_str(DELIMITER);
    block.push('\n');
    Ok(block)
}

/// Encode metadata and append the body.
pub fn render(meta: &Metadata, body: &str) -> Result<String, toml::ser::Error> {
    let mut document = encode(meta)?;
    document.push_str(body);
    Ok(document)
}

/// Decode a complete document.
pub fn decode(document: &str) -> Decoded {
    let split = split(document);

    match split.layout {
        Layout::Closed => {}
        Layout::Unterminated => warn!("front matter has no closing delimiter, treating it as body"),
        Layout::Missing => warn!("document has no front matter"),
    }

    let (meta, meta_parsed) = match toml::from_str::<Metadata>(split.meta) {
        Ok(meta) => (meta, true),
        Err(e) => {
            warn!(error = %e, "cannot parse front matter, using empty metadata");
            (Metadata::default(), false)
        }
    };

    Decoded {
        meta,
        body: split.body.to_string(),
        layout: split.layout,
        meta_parsed,
    }
}
