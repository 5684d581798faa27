// Copyright 2023 System76 <info@system76.com>
// SPDX-License-Identifier: MPL-2.0

use std::process::Stdio;

use tokio::process::Command;

/// Asks the running i3 instance to restart in place, so that its bars and
/// workspaces follow the new output geometry.
///
/// # Errors
///
/// Returns error if `i3-msg` could not be run or reported a failure.
pub async fn restart(display: &str, search_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let output = Command::new("i3-msg")
        .arg("restart")
        .env_clear()
        .env("DISPLAY", display)
        .env("PATH", search_path)
        .stdin(Stdio::null())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("`i3-msg restart` failed with {}: {}", output.status, stderr.trim()).into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_i3_msg_is_an_error() {
        let err = restart(":0", "/randr-dock/no/such/dir").await.unwrap_err();
        let why = err.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(why.kind(), std::io::ErrorKind::NotFound);
    }
}
