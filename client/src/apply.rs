//! Applying to a job announcement: upload a resume, then submit.
//!
//! ```text
//! NoFile --select--> Selected --upload--> Uploaded --submit--> Submitted
//!    ^                  |
//!    +--invalid file----+
//! ```
//!
//! Every failure is reported through the [`Notifier`] and leaves the flow
//! in a state the user can retry from.

use std::path::Path;

use bytes::Bytes;
use mime::Mime;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::{raw, Context, Error, Notifier, View};

/// Largest accepted resume, 10 MiB.
pub const MAX_RESUME_SIZE: u64 = 10 * 1024 * 1024;

/// Accepted resume types: pdf, doc, docx and plain text.
pub const ALLOWED_TYPES: [&str; 4] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

const GENERIC_FAILURE: &str = "Failed to apply";

/// A resume picked by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeFile {
    name: String,
    mime: Mime,
    bytes: Bytes,
}

impl ResumeFile {
    pub fn new(name: impl Into<String>, mime: Mime, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, typing it by its extension.
    ///
    /// Unsupported and oversized files are rejected before their contents
    /// are read, and at most one byte past [`MAX_RESUME_SIZE`] is ever
    /// buffered.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_for(&name);

        if !ALLOWED_TYPES.contains(&mime.essence_str()) {
            return Err(Error::UnsupportedFile(mime.essence_str().to_owned()));
        }

        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        if len > MAX_RESUME_SIZE {
            return Err(Error::FileTooLarge(len));
        }

        // The file may have grown since its metadata was read.
        let mut bytes = Vec::with_capacity(len as usize);
        file.take(MAX_RESUME_SIZE + 1)
            .read_to_end(&mut bytes)
            .await?;
        if bytes.len() as u64 > MAX_RESUME_SIZE {
            return Err(Error::FileTooLarge(bytes.len() as u64));
        }

        Ok(Self::new(name, mime, bytes))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn mime(&self) -> &Mime {
        &self.mime
    }

    #[inline]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Checks the type against [`ALLOWED_TYPES`] and the size against
    /// [`MAX_RESUME_SIZE`].
    pub fn validate(&self) -> Result<(), Error> {
        if !ALLOWED_TYPES.contains(&self.mime.essence_str()) {
            return Err(Error::UnsupportedFile(self.mime.essence_str().to_owned()));
        }
        if self.len() > MAX_RESUME_SIZE {
            return Err(Error::FileTooLarge(self.len()));
        }
        Ok(())
    }
}

/// Types a file name by extension, like a browser file picker does.
pub fn mime_for(name: &str) -> Mime {
    let ext = Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

    let essence = match ext.as_deref() {
        Some("pdf") => ALLOWED_TYPES[0],
        Some("doc") => ALLOWED_TYPES[1],
        Some("docx") => ALLOWED_TYPES[2],
        Some("txt") => ALLOWED_TYPES[3],
        _ => return mime::APPLICATION_OCTET_STREAM,
    };
    essence.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

/// A resume accepted by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedResume {
    pub file_name: String,
    /// The backend's reference to the stored file, if it sent one.
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplicationState {
    NoFile,
    Selected(ResumeFile),
    Uploaded(UploadedResume),
    Submitted,
}

/// Result of an upload attempt that passed the eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upload {
    /// No resume is selected, the user should be prompted to pick one.
    NeedsFile,
    Done,
}

/// The application of the current student to one job announcement.
///
/// Actions take `&mut self`, so a second action cannot start while one
/// is in flight.
pub struct JobApplication {
    cx: Context,
    notifier: Notifier,
    announcement_id: String,
    state: ApplicationState,
}

impl JobApplication {
    pub fn new(cx: Context, notifier: Notifier, announcement_id: impl Into<String>) -> Self {
        Self {
            cx,
            notifier,
            announcement_id: announcement_id.into(),
            state: ApplicationState::NoFile,
        }
    }

    #[inline]
    pub fn announcement_id(&self) -> &str {
        &self.announcement_id
    }

    #[inline]
    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    /// Selects a resume.
    ///
    /// An unsupported or oversized file is rejected with a notification and
    /// clears the selection, so the user is prompted to choose again.
    pub fn select(&mut self, file: ResumeFile) -> Result<(), Error> {
        self.check_selectable()?;

        if let Err(err) = file.validate() {
            self.reject(&err);
            return Err(err);
        }

        debug!("selected resume {} ({} bytes)", file.name(), file.len());
        self.state = ApplicationState::Selected(file);
        Ok(())
    }

    /// Selects a resume from disk, with the same rejections as
    /// [`select`](Self::select). Rejected files are never read in full.
    pub async fn select_path(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        self.check_selectable()?;

        match ResumeFile::open(path).await {
            Ok(file) => self.select(file),
            Err(err @ (Error::UnsupportedFile(_) | Error::FileTooLarge(_))) => {
                self.reject(&err);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    fn check_selectable(&self) -> Result<(), Error> {
        match self.state {
            ApplicationState::NoFile | ApplicationState::Selected(_) => Ok(()),
            ApplicationState::Uploaded(_) => Err(Error::FlowState("resume already uploaded")),
            ApplicationState::Submitted => {
                Err(Error::FlowState("application already submitted"))
            }
        }
    }

    /// Checks the announcement still accepts applications and uploads the
    /// selected resume.
    pub async fn upload(&mut self) -> Result<Upload, Error> {
        let file = match self.state {
            ApplicationState::NoFile => None,
            ApplicationState::Selected(ref file) => Some(file.clone()),
            ApplicationState::Uploaded(_) => {
                return Err(Error::FlowState("resume already uploaded"))
            }
            ApplicationState::Submitted => {
                return Err(Error::FlowState("application already submitted"))
            }
        };

        self.require_login()?;

        let announcement = raw::call(
            raw::announcement::Get {
                id: &self.announcement_id,
            },
            &self.cx,
        )
        .await
        .map_err(|err| self.fail(err))?;

        if !announcement.accepts_applications() {
            self.notifier.error(
                "Cannot apply",
                "This announcement does not accept applications",
            );
            return Err(Error::NotEligible);
        }

        let Some(file) = file else {
            return Ok(Upload::NeedsFile);
        };

        if let Err(err) = file.validate() {
            self.reject(&err);
            return Err(err);
        }

        let res = raw::call(
            raw::announcement::UploadResume {
                id: &self.announcement_id,
                file: &file,
            },
            &self.cx,
        )
        .await
        .map_err(|err| self.fail(err))?;

        info!(
            "uploaded resume {} for announcement {}",
            file.name(),
            self.announcement_id
        );
        self.state = ApplicationState::Uploaded(UploadedResume {
            file_name: file.name().to_owned(),
            reference: res.resume,
        });
        self.notifier.success(
            "Resume uploaded",
            "Now click Apply to submit your application",
        );
        Ok(Upload::Done)
    }

    /// Submits the application. Only possible after a successful upload;
    /// on failure the upload is kept so only the submission is retried.
    pub async fn submit(&mut self) -> Result<(), Error> {
        match self.state {
            ApplicationState::Uploaded(_) => {}
            ApplicationState::NoFile | ApplicationState::Selected(_) => {
                return Err(Error::FlowState("resume not uploaded yet"))
            }
            ApplicationState::Submitted => {
                return Err(Error::FlowState("application already submitted"))
            }
        }

        self.require_login()?;

        let res = raw::call(
            raw::announcement::Apply {
                id: &self.announcement_id,
            },
            &self.cx,
        )
        .await
        .map_err(|err| self.fail(err))?;

        info!("applied to announcement {}", self.announcement_id);
        self.state = ApplicationState::Submitted;
        self.notifier.success(
            "Applied",
            res.message
                .unwrap_or_else(|| "Application submitted successfully".to_owned()),
        );
        Ok(())
    }

    fn require_login(&self) -> Result<(), Error> {
        if self.cx.token().is_some() {
            return Ok(());
        }

        self.notifier
            .error("Not logged in", "Please login as a student to apply");
        self.cx.navigator().navigate(View::ENTRY);
        Err(Error::NotLoggedIn)
    }

    fn reject(&mut self, err: &Error) {
        match err {
            Error::FileTooLarge(_) => self.notifier.error(
                "File too large",
                "Max size is 10MB. Please choose a smaller file.",
            ),
            _ => self
                .notifier
                .error("Unsupported file", "Please upload PDF, DOC, DOCX or TXT."),
        };
        self.state = ApplicationState::NoFile;
    }

    fn fail(&self, err: Error) -> Error {
        self.notifier.report("Apply failed", &err, GENERIC_FAILURE);
        err
    }
}
