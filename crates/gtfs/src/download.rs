//! Best-effort downloader/extractor for the static feed ZIP. Ambient
//! wiring so the loader has CSV files to read from in a standalone
//! deployment; not part of the core join/lookup logic.

use std::io::Cursor;
use std::path::Path;

use crate::error::GtfsResult;

/// Downloads the ZIP at `url` and extracts it into `data_dir`, overwriting
/// any files already there.
pub async fn download_and_extract(client: &reqwest::Client, url: &str, data_dir: &Path) -> GtfsResult<()> {
    log::info!("downloading static GTFS feed from {url}");
    let bytes = client.get(url).send().await?.error_for_status()?.bytes().await?;

    std::fs::create_dir_all(data_dir)?;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(name) = entry.enclosed_name() else {
            continue;
        };
        let dest = data_dir.join(name);
        let mut out = std::fs::File::create(&dest)?;
        std::io::copy(&mut entry, &mut out)?;
    }
    log::info!("extracted static GTFS feed to {}", data_dir.display());
    Ok(())
}
