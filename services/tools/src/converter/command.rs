//! Converter backed by the command-line tools

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::{Output, Stdio},
    time::Duration,
};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info};

use super::{ConversionError, Converter, EncryptionStatus, OfficeTarget};
use crate::{compression::CompressionLevel, page_range::PageRanges};

/// Bytes of stderr kept for the log line
const STDERR_TAIL: usize = 2048;

/// Program names or paths for each converter
#[derive(Debug, Clone)]
pub struct Binaries {
    pub soffice: String,
    pub qpdf: String,
    pub ghostscript: String,
    pub img2pdf: String,
    pub pdftoppm: String,
}

#[derive(Debug, Clone)]
pub struct CommandConverter {
    binaries: Binaries,
    timeout: Duration,
}

impl CommandConverter {
    pub fn new(binaries: Binaries, timeout: Duration) -> Self {
        Self { binaries, timeout }
    }

    /// Run a program to completion, killing it when the timeout expires
    async fn run<I, S>(&self, program: &str, args: I) -> Result<Output, ConversionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        debug!("Running {:?}", command);

        let child = command.spawn().map_err(|source| ConversionError::Spawn {
            program: program.to_string(),
            source,
        })?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => Ok(output?),
            Err(_) => {
                error!("{} timed out after {:?}", program, self.timeout);
                Err(ConversionError::Timeout {
                    program: program.to_string(),
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }

    /// Like `run`, but a non-zero exit is an error
    async fn run_checked<I, S>(&self, program: &str, args: I) -> Result<Output, ConversionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self.run(program, args).await?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(failure(program, &output))
        }
    }
}

fn failure(program: &str, output: &Output) -> ConversionError {
    let stderr = stderr_tail(&output.stderr);
    error!("{} failed ({}): {}", program, output.status, stderr);
    ConversionError::Failed {
        program: program.to_string(),
        status: output.status.to_string(),
        stderr,
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(STDERR_TAIL);
    String::from_utf8_lossy(&stderr[start..]).trim().to_string()
}

async fn ensure_output(path: &Path) -> Result<(), ConversionError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(ConversionError::MissingOutput(path.to_path_buf())),
    }
}

#[async_trait]
impl Converter for CommandConverter {
    async fn office_convert(
        &self,
        input: &Path,
        target: OfficeTarget,
        out_dir: &Path,
    ) -> Result<PathBuf, ConversionError> {
        // A private profile lets concurrent soffice runs coexist
        let profile = format!(
            "-env:UserInstallation=file://{}",
            out_dir.join(".lo-profile").display()
        );
        let from_pdf = input
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        let mut args = vec![OsStr::new(&profile), OsStr::new("--headless")];
        // PDFs open in Draw by default, which has no Word export filter
        let convert_to = match target {
            OfficeTarget::Docx if from_pdf => {
                args.push(OsStr::new("--infilter=writer_pdf_import"));
                "docx:MS Word 2007 XML"
            }
            other => other.extension(),
        };
        args.extend([
            OsStr::new("--convert-to"),
            OsStr::new(convert_to),
            OsStr::new("--outdir"),
            out_dir.as_os_str(),
            input.as_os_str(),
        ]);
        self.run_checked(&self.binaries.soffice, args).await?;

        let stem = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let produced = out_dir.join(format!("{}.{}", stem, target.extension()));
        ensure_output(&produced).await?;
        info!("Converted {} to {}", input.display(), target.extension());
        Ok(produced)
    }

    async fn page_count(&self, input: &Path) -> Result<u32, ConversionError> {
        let output = self
            .run_checked(
                &self.binaries.qpdf,
                [OsStr::new("--show-npages"), input.as_os_str()],
            )
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .trim()
            .parse()
            .map_err(|_| ConversionError::UnexpectedOutput {
                program: self.binaries.qpdf.clone(),
                detail: format!("page count {:?}", stdout.trim()),
            })
    }

    async fn merge_pdfs(&self, inputs: &[PathBuf], output: &Path) -> Result<(), ConversionError> {
        let mut args = vec![OsStr::new("--empty"), OsStr::new("--pages")];
        args.extend(inputs.iter().map(|p| p.as_os_str()));
        args.extend([OsStr::new("--"), output.as_os_str()]);

        self.run_checked(&self.binaries.qpdf, args).await?;
        ensure_output(output).await
    }

    async fn select_pages(
        &self,
        input: &Path,
        ranges: &PageRanges,
        output: &Path,
    ) -> Result<(), ConversionError> {
        let selection = ranges.to_qpdf();
        self.run_checked(
            &self.binaries.qpdf,
            [
                OsStr::new("--empty"),
                OsStr::new("--pages"),
                input.as_os_str(),
                OsStr::new(&selection),
                OsStr::new("--"),
                output.as_os_str(),
            ],
        )
        .await?;
        ensure_output(output).await
    }

    async fn compress_pdf(
        &self,
        input: &Path,
        level: CompressionLevel,
        output: &Path,
    ) -> Result<(), ConversionError> {
        let settings = format!("-dPDFSETTINGS={}", level.pdf_settings());
        let output_file = format!("-sOutputFile={}", output.display());
        self.run_checked(
            &self.binaries.ghostscript,
            [
                OsStr::new("-sDEVICE=pdfwrite"),
                OsStr::new("-dCompatibilityLevel=1.4"),
                OsStr::new(&settings),
                OsStr::new("-dNOPAUSE"),
                OsStr::new("-dQUIET"),
                OsStr::new("-dBATCH"),
                OsStr::new(&output_file),
                input.as_os_str(),
            ],
        )
        .await?;
        ensure_output(output).await
    }

    async fn images_to_pdf(
        &self,
        inputs: &[PathBuf],
        output: &Path,
    ) -> Result<(), ConversionError> {
        let mut args: Vec<&OsStr> = inputs.iter().map(|p| p.as_os_str()).collect();
        args.extend([OsStr::new("-o"), output.as_os_str()]);

        self.run_checked(&self.binaries.img2pdf, args).await?;
        ensure_output(output).await
    }

    async fn pdf_to_images(
        &self,
        input: &Path,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, ConversionError> {
        let prefix = out_dir.join("page");
        self.run_checked(
            &self.binaries.pdftoppm,
            [OsStr::new("-png"), input.as_os_str(), prefix.as_os_str()],
        )
        .await?;

        let mut images = Vec::new();
        let mut entries = tokio::fs::read_dir(out_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_page = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("page") && name.ends_with(".png"));
            if is_page {
                images.push(path);
            }
        }
        // pdftoppm zero-pads page numbers, so name order is page order
        images.sort();

        if images.is_empty() {
            return Err(ConversionError::MissingOutput(prefix));
        }
        Ok(images)
    }

    async fn encryption_status(&self, input: &Path) -> Result<EncryptionStatus, ConversionError> {
        let output = self
            .run(
                &self.binaries.qpdf,
                [OsStr::new("--requires-password"), input.as_os_str()],
            )
            .await?;

        // 0: password required, 2: not encrypted, 3: encrypted without a user password.
        // qpdf also exits 2 on unreadable input, but then it explains on stderr.
        match output.status.code() {
            Some(0) => Ok(EncryptionStatus {
                encrypted: true,
                requires_password: true,
            }),
            Some(2) if !stderr_tail(&output.stderr).is_empty() => {
                Err(failure(&self.binaries.qpdf, &output))
            }
            Some(2) => Ok(EncryptionStatus {
                encrypted: false,
                requires_password: false,
            }),
            Some(3) => Ok(EncryptionStatus {
                encrypted: true,
                requires_password: false,
            }),
            _ => Err(failure(&self.binaries.qpdf, &output)),
        }
    }

    async fn decrypt_pdf(
        &self,
        input: &Path,
        password: Option<&str>,
        output: &Path,
    ) -> Result<(), ConversionError> {
        let password_arg = password.map(|p| format!("--password={p}"));
        let mut args = Vec::new();
        if let Some(arg) = &password_arg {
            args.push(OsStr::new(arg));
        }
        args.extend([
            OsStr::new("--decrypt"),
            input.as_os_str(),
            output.as_os_str(),
        ]);

        let result = self.run(&self.binaries.qpdf, args).await?;
        // Exit 3 means qpdf succeeded with warnings
        match result.status.code() {
            Some(0) | Some(3) => ensure_output(output).await,
            _ if String::from_utf8_lossy(&result.stderr).contains("invalid password") => {
                Err(ConversionError::InvalidPassword)
            }
            _ => Err(failure(&self.binaries.qpdf, &result)),
        }
    }
}
