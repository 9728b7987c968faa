use std::{fs, io, path::Path};

use crate::fetch::ClassUrlMap;

/// Writes the map as a JSON object keyed by class name. Unusable records and
/// unavailable classes become `null`.
pub fn write_urls<P: AsRef<Path>>(path: P, urls: &ClassUrlMap) -> io::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(urls).map_err(io::Error::from)?;

    fs::write(path, content)
}
