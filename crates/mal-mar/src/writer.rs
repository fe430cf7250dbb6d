//! Writing `.mar` archives.

use std::io::Write;

use mal_langspec::Lang;

use crate::error::MarError;
use crate::zip;

/// One-shot writer for a `.mar` archive.
///
/// Entry order is fixed: `langspec.json`, the `icons/` directory with one
/// entry per locally declared icon, then LICENSE and NOTICE when present.
/// The archive is deterministic, so writing the same specification twice
/// yields identical bytes.
pub struct MarWriter<W: Write> {
    inner: W,
    is_written: bool,
    is_closed: bool,
}

impl<W: Write> MarWriter<W> {
    pub fn new(inner: W) -> Self {
        MarWriter {
            inner,
            is_written: false,
            is_closed: false,
        }
    }

    pub fn write(&mut self, lang: &Lang) -> Result<(), MarError> {
        if self.is_written {
            return Err(MarError::Sequencing { method: "write" });
        }
        if self.is_closed {
            return Err(MarError::Sequencing { method: "close" });
        }
        self.is_written = true;

        let langspec = serde_json::to_vec_pretty(&lang.to_doc())?;
        let mut entries = vec![
            ("langspec.json".to_owned(), langspec),
            ("icons/".to_owned(), Vec::new()),
        ];
        for asset in lang.assets() {
            if let Some(icon) = asset.local_svg_icon() {
                entries.push((format!("icons/{}.svg", asset.name()), icon.to_vec()));
            }
            if let Some(icon) = asset.local_png_icon() {
                entries.push((format!("icons/{}.png", asset.name()), icon.to_vec()));
            }
        }
        if let Some(license) = lang.license() {
            entries.push(("LICENSE".to_owned(), license.as_bytes().to_vec()));
        }
        if let Some(notice) = lang.notice() {
            entries.push(("NOTICE".to_owned(), notice.as_bytes().to_vec()));
        }

        self.inner.write_all(&zip::build(&entries))?;
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), MarError> {
        if self.is_closed {
            return Err(MarError::Sequencing { method: "close" });
        }
        self.inner.flush()?;
        self.is_closed = true;
        Ok(())
    }
}
