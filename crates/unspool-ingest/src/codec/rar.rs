use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::debug;

use super::{ArchiveCodec, ArchiveFormat};
use crate::error::{IngestError, IngestResult};

/// Tools tried in order when locating a RAR unpacker.
const TOOL_CANDIDATES: [&str; 2] = ["unrar", "rar"];

/// Guidance shown when no RAR unpacker is installed.
pub const RAR_INSTALL_HINT: &str = "Please install 'unrar' or 'rar' and ensure it is in your PATH \
     (Windows builds are available from https://www.rarlab.com/rar_add.htm).";

/// Tool output fragments that mean a volume of a multi-part set is missing.
const MISSING_VOLUME_MARKERS: [&str; 3] = [
    "cannot find volume",
    "previous volume",
    "need to start extraction from",
];

/// RAR reader that drives an external `unrar`/`rar` binary.
#[derive(Debug, Clone, Default)]
pub struct RarCodec {
    tool: Option<PathBuf>,
}

impl RarCodec {
    /// Locate `unrar`, then `rar`, on `PATH`.
    #[must_use]
    pub fn discover() -> Self {
        let tool = TOOL_CANDIDATES
            .iter()
            .find_map(|candidate| which::which(candidate).ok());
        debug!(tool = ?tool, "rar tool discovery");
        Self { tool }
    }

    /// Use a specific tool binary.
    #[must_use]
    pub fn with_tool(tool: impl Into<PathBuf>) -> Self {
        Self {
            tool: Some(tool.into()),
        }
    }

    /// Resolved tool binary, if any.
    #[must_use]
    pub fn tool(&self) -> Option<&Path> {
        self.tool.as_deref()
    }

    fn run(&self, archive: &Path, args: &[OsString]) -> IngestResult<Output> {
        let tool = self.tool.as_deref().ok_or_else(missing_tool)?;
        let output = Command::new(tool)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        let output = match output {
            Ok(output) => output,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(missing_tool()),
            Err(err) => return Err(IngestError::io("rar.spawn", tool, err)),
        };

        if output.status.success() {
            return Ok(output);
        }
        Err(classify_failure(archive, &output))
    }
}

impl ArchiveCodec for RarCodec {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Rar
    }

    fn list_entries(&self, archive: &Path) -> IngestResult<Vec<String>> {
        let args = [
            OsString::from("lb"),
            OsString::from("-p-"),
            OsString::from("--"),
            archive.as_os_str().to_os_string(),
        ];
        let output = self.run(archive, &args)?;
        Ok(normalise_listing(&String::from_utf8_lossy(&output.stdout)))
    }

    fn extract_all(&self, archive: &Path, target: &Path) -> IngestResult<()> {
        fs::create_dir_all(target)
            .map_err(|source_err| IngestError::io("rar.create_target", target, source_err))?;
        let mut destination = target.as_os_str().to_os_string();
        if !destination.to_string_lossy().ends_with(MAIN_SEPARATOR_STR) {
            destination.push(MAIN_SEPARATOR_STR);
        }
        let args = [
            OsString::from("x"),
            OsString::from("-o-"),
            OsString::from("-p-"),
            OsString::from("-y"),
            OsString::from("--"),
            archive.as_os_str().to_os_string(),
            destination,
        ];
        self.run(archive, &args).map(|_| ())
    }
}

const fn missing_tool() -> IngestError {
    IngestError::ToolMissing {
        tool: "unrar",
        hint: RAR_INSTALL_HINT,
    }
}

/// Bare listings carry no directory flag; an entry with children is a directory.
fn normalise_listing(stdout: &str) -> Vec<String> {
    let names: Vec<String> = stdout
        .lines()
        .map(|line| line.trim_end_matches('\r').replace('\\', "/"))
        .filter(|line| !line.trim().is_empty())
        .collect();

    names
        .iter()
        .map(|name| {
            let prefix = format!("{}/", name.trim_end_matches('/'));
            let has_children = names
                .iter()
                .any(|other| other.len() > prefix.len() && other.starts_with(&prefix));
            if has_children && !name.ends_with('/') {
                prefix
            } else {
                name.clone()
            }
        })
        .collect()
}

fn classify_failure(archive: &Path, output: &Output) -> IngestError {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let combined = format!("{stdout}\n{stderr}");
    let lowered = combined.to_ascii_lowercase();
    let detail = combined
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .map_or_else(|| format!("exit status {}", output.status), str::to_string);

    if MISSING_VOLUME_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        return IngestError::IncompleteArchive {
            path: archive.to_path_buf(),
            detail,
        };
    }
    IngestError::CorruptArchive {
        path: archive.to_path_buf(),
        detail,
    }
}
