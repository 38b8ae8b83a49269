//! Blocking HTTP downloads.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::BootstrapError;
use crate::util::shell::Shell;

/// Download `url` to `dest`, showing byte progress on a terminal.
///
/// A non-success HTTP status is a `BootstrapError::Network`; callers
/// decide whether that is fatal.
pub fn download(url: &str, dest: &Path, shell: &Shell) -> Result<()> {
    tracing::debug!("downloading {} to {}", url, dest.display());

    let mut response = reqwest::blocking::get(url).map_err(|e| {
        anyhow::Error::new(e).context(BootstrapError::Network {
            url: url.to_string(),
        })
    })?;

    if !response.status().is_success() {
        return Err(BootstrapError::Network {
            url: url.to_string(),
        })
        .with_context(|| format!("HTTP {}", response.status()));
    }

    let total = response.content_length().unwrap_or(0);
    let pb = shell.bytes_progress(total, "downloading");

    let mut file = File::create(dest)
        .with_context(|| format!("failed to create file: {}", dest.display()))?;

    let mut buf = [0u8; 8192];
    loop {
        let n = response
            .read(&mut buf)
            .with_context(|| format!("failed to read response body from {}", url))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .with_context(|| format!("failed to write file: {}", dest.display()))?;
        pb.inc(n as u64);
    }

    pb.finish_and_clear();
    Ok(())
}
