//! Cryptographic trust for the devkitPro repository.
//!
//! Imports the devkitPro signing key into the pacman keyring, trying a
//! fixed list of keyservers in order, and locally signs it. Nothing here
//! is fatal: a keyring left over from an earlier run can still satisfy
//! the package operations that follow.

use std::time::Duration;

use anyhow::{bail, Result};

use crate::util::process::ProcessBuilder;
use crate::util::shell::{Shell, Status};

/// Fingerprint of the devkitPro package signing key.
pub const DEVKITPRO_KEY_ID: &str = "BC26F752D25B92CE272E0F44F7FD5492264BB9D0";

/// Keyserver candidates, tried in this order.
pub const KEYSERVERS: [&str; 3] = ["keyserver.ubuntu.com", "keys.openpgp.org", "pgp.mit.edu"];

/// Reference for manual key setup when every keyserver fails.
const WIKI_URL: &str = "https://devkitpro.org/wiki/devkitPro_pacman";

/// Upper bound on a single keyserver exchange.
const KEYSERVER_TIMEOUT: Duration = Duration::from_secs(30);

/// Record of the trust-establishment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTrustRecord {
    pub key_id: String,
    pub keyservers: Vec<String>,
    pub imported: bool,
    pub locally_signed: bool,
}

impl KeyTrustRecord {
    fn new(key_id: &str, keyservers: &[&str]) -> Self {
        KeyTrustRecord {
            key_id: key_id.to_string(),
            keyservers: keyservers.iter().map(|s| s.to_string()).collect(),
            imported: false,
            locally_signed: false,
        }
    }
}

/// Import and locally sign the devkitPro key. Never fatal.
pub fn establish_trust(shell: &Shell) -> KeyTrustRecord {
    let mut record = import_key(DEVKITPRO_KEY_ID, &KEYSERVERS, shell, recv_key);

    if record.imported {
        record.locally_signed = lsign_key(shell);
    } else {
        shell.warn("could not import the devkitPro signing key from any keyserver");
        shell.note(format!(
            "import it manually with: sudo pacman-key --keyserver {} --recv-keys {}",
            KEYSERVERS[0], DEVKITPRO_KEY_ID
        ));
        shell.note(format!("see {}", WIKI_URL));
    }

    record
}

/// Try each keyserver in order, stopping at the first success.
///
/// The attempt is injected so keyserver ordering stays testable without a
/// pacman keyring.
pub fn import_key<F>(key_id: &str, keyservers: &[&str], shell: &Shell, mut attempt: F) -> KeyTrustRecord
where
    F: FnMut(&str) -> Result<()>,
{
    let mut record = KeyTrustRecord::new(key_id, keyservers);

    for server in keyservers {
        shell.status(Status::Fetching, format!("signing key from {}", server));
        match attempt(server) {
            Ok(()) => {
                record.imported = true;
                break;
            }
            Err(e) => {
                shell.warn(format!("keyserver {} failed: {:#}", server, e));
            }
        }
    }

    record
}

/// One bounded, non-interactive keyserver exchange.
fn recv_key(server: &str) -> Result<()> {
    let pb = ProcessBuilder::privileged("pacman-key")
        .args(["--keyserver", server, "--recv-keys", DEVKITPRO_KEY_ID]);

    let output = pb.exec_with_timeout(KEYSERVER_TIMEOUT)?;
    if !output.status.success() {
        bail!(
            "`{}` exited with {:?}",
            pb.display_command(),
            output.status.code()
        );
    }
    Ok(())
}

/// Locally sign the imported key. Best-effort.
fn lsign_key(shell: &Shell) -> bool {
    let pb = ProcessBuilder::privileged("pacman-key").args(["--lsign-key", DEVKITPRO_KEY_ID]);

    match pb.exec() {
        Ok(output) if output.status.success() => true,
        Ok(output) => {
            shell.warn(format!(
                "local signing failed with {:?}; continuing",
                output.status.code()
            ));
            false
        }
        Err(e) => {
            shell.warn(format!("local signing failed: {:#}; continuing", e));
            false
        }
    }
}
