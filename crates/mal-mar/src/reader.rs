//! Reading `.mar` archives.

use std::collections::HashMap;
use std::io::Read;

use mal_langspec::doc::LangDoc;
use mal_langspec::{is_identifier, Lang, LangBuilder};

use crate::error::MarError;
use crate::schema;
use crate::zip;

/// One-shot reader for a `.mar` archive.
///
/// `read` consumes the underlying stream and can only be called once;
/// calling it again, or after `close`, is a sequencing error.
pub struct MarReader<R: Read> {
    inner: R,
    is_read: bool,
    is_closed: bool,
}

impl<R: Read> MarReader<R> {
    pub fn new(inner: R) -> Self {
        MarReader {
            inner,
            is_read: false,
            is_closed: false,
        }
    }

    /// Reads the archive, including icons, license, and notice.
    pub fn read(&mut self) -> Result<Lang, MarError> {
        self.read_with(true, true)
    }

    /// Reads the archive. `read_icons` and `read_license` control whether
    /// icon entries and the LICENSE/NOTICE entries are picked up.
    pub fn read_with(&mut self, read_icons: bool, read_license: bool) -> Result<Lang, MarError> {
        if self.is_read {
            return Err(MarError::Sequencing { method: "read" });
        }
        if self.is_closed {
            return Err(MarError::Sequencing { method: "close" });
        }
        self.is_read = true;

        let mut bytes = Vec::new();
        self.inner.read_to_end(&mut bytes)?;

        let mut langspec: Option<Vec<u8>> = None;
        let mut svg_icons: HashMap<String, Vec<u8>> = HashMap::new();
        let mut png_icons: HashMap<String, Vec<u8>> = HashMap::new();
        let mut license: Option<String> = None;
        let mut notice: Option<String> = None;

        for entry in zip::parse(&bytes) {
            if entry.name == "langspec.json" {
                langspec = Some(entry.data);
            } else if read_icons && entry.name.starts_with("icons/") {
                // Icon entries are keyed by asset name; anything that is
                // not a valid asset identifier cannot match an asset.
                if let Some(asset) = entry
                    .name
                    .strip_prefix("icons/")
                    .and_then(|rest| rest.strip_suffix(".svg"))
                {
                    if is_identifier(asset) {
                        svg_icons.insert(asset.to_owned(), entry.data);
                    }
                } else if let Some(asset) = entry
                    .name
                    .strip_prefix("icons/")
                    .and_then(|rest| rest.strip_suffix(".png"))
                {
                    if is_identifier(asset) {
                        png_icons.insert(asset.to_owned(), entry.data);
                    }
                }
            } else if read_license && entry.name == "LICENSE" {
                license = Some(String::from_utf8_lossy(&entry.data).into_owned());
            } else if read_license && entry.name == "NOTICE" {
                notice = Some(String::from_utf8_lossy(&entry.data).into_owned());
            }
        }

        let langspec = langspec.ok_or(MarError::LangspecNotFound)?;
        let document: serde_json::Value =
            serde_json::from_slice(&langspec).map_err(|_| MarError::LangspecParse)?;
        schema::validate(&document)?;
        let doc: LangDoc =
            serde_json::from_value(document).map_err(|_| MarError::LangspecParse)?;

        let mut builder = LangBuilder::from_doc(doc, &svg_icons, &png_icons)?;
        if let Some(license) = license {
            builder = builder.license(license);
        }
        if let Some(notice) = notice {
            builder = builder.notice(notice);
        }
        Ok(Lang::from_builder(&builder)?)
    }

    pub fn close(&mut self) -> Result<(), MarError> {
        if self.is_closed {
            return Err(MarError::Sequencing { method: "close" });
        }
        self.is_closed = true;
        Ok(())
    }
}
