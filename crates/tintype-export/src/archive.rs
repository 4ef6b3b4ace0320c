//! Catalog archives: every filter variant as a PNG inside one `.tar.gz`.

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{Builder, Header};
use tintype_pipeline::{CatalogResult, FilterKind};

use crate::ExportError;
use crate::png::encode_png;

/// Archive member name for `kind`: the display name with spaces
/// replaced by underscores, plus `.png`.
///
/// `Vivid (High Contrast)` becomes `Vivid_(High_Contrast).png`.
#[must_use]
pub fn archive_name(kind: FilterKind) -> String {
    format!("{}.png", kind.name().replace(' ', "_"))
}

/// PNG-encode every catalog entry and bundle them into a gzip-compressed
/// tar archive, in catalog order.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if an entry fails to encode and
/// [`ExportError::Archive`] if the archive stream cannot be written.
pub fn bundle_catalog(catalog: &CatalogResult) -> Result<Vec<u8>, ExportError> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = Builder::new(encoder);

    for (kind, image) in catalog.iter() {
        let png = encode_png(image)?;
        let name = archive_name(kind);

        let mut header = Header::new_gnu();
        header.set_size(png.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, &name, png.as_slice())?;
        log::debug!("archived {name} ({} bytes)", png.len());
    }

    let bytes = builder.into_inner()?.finish()?;
    log::info!(
        "catalog archive complete: {} entries, {} bytes",
        catalog.len(),
        bytes.len()
    );
    Ok(bytes)
}
