use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::notify::NotificationQueue;
use super::role::RoleGate;
use crate::api::{ApiError, UploadKind};

/// Upload panel state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPhase {
    NoTypeSelected,
    TypeSelected(UploadKind),
    FileChosen { kind: UploadKind, file: PathBuf },
    Submitting { kind: UploadKind, file: PathBuf },
}

/// A validated upload ready to post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub kind: UploadKind,
    pub file: PathBuf,
}

/// Result of a finished upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFinish {
    /// Reset every view and fetch everything again
    Reload,
    /// The chosen file is kept so the user can resubmit
    Retry,
}

#[derive(Debug)]
pub struct UploadController {
    phase: UploadPhase,
    drag_hover: bool,
}

impl Default for UploadController {
    fn default() -> Self {
        Self {
            phase: UploadPhase::NoTypeSelected,
            drag_hover: false,
        }
    }
}

impl UploadController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &UploadPhase {
        &self.phase
    }

    pub fn selected_kind(&self) -> Option<UploadKind> {
        match &self.phase {
            UploadPhase::NoTypeSelected => None,
            UploadPhase::TypeSelected(kind)
            | UploadPhase::FileChosen { kind, .. }
            | UploadPhase::Submitting { kind, .. } => Some(*kind),
        }
    }

    pub fn selected_file(&self) -> Option<&Path> {
        match &self.phase {
            UploadPhase::FileChosen { file, .. } | UploadPhase::Submitting { file, .. } => {
                Some(file)
            }
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, UploadPhase::Submitting { .. })
    }

    /// Drop zone highlight. Purely visual.
    pub fn drag_hover(&self) -> bool {
        self.drag_hover
    }

    pub fn set_drag_hover(&mut self, hover: bool) {
        self.drag_hover = hover;
    }

    /// Pick an upload type. Any chosen file is discarded.
    pub fn select_type(
        &mut self,
        kind: UploadKind,
        gate: &RoleGate,
        notifications: &mut NotificationQueue,
    ) -> bool {
        if self.is_submitting() {
            return false;
        }
        if !gate.can_upload(kind) {
            warn!("Upload type {} is not available for this role", kind);
            notifications.warning(format!("{} is not available for your role.", kind.caption()));
            return false;
        }
        self.phase = UploadPhase::TypeSelected(kind);
        true
    }

    /// Choose the file to upload, from a path typed or dropped onto the panel.
    pub fn choose_file(&mut self, file: PathBuf, notifications: &mut NotificationQueue) -> bool {
        self.drag_hover = false;
        match &self.phase {
            UploadPhase::TypeSelected(kind) | UploadPhase::FileChosen { kind, .. } => {
                self.phase = UploadPhase::FileChosen { kind: *kind, file };
                true
            }
            UploadPhase::NoTypeSelected => {
                notifications.warning("Please select an upload type first.");
                false
            }
            UploadPhase::Submitting { .. } => false,
        }
    }

    /// Choose a file from dropped text. Terminals deliver a dropped file as a
    /// pasted path, sometimes quoted, escaped or as a `file://` URL.
    pub fn drop_text(&mut self, text: &str, notifications: &mut NotificationQueue) -> bool {
        match dropped_path(text) {
            Some(path) => self.choose_file(path, notifications),
            None => {
                self.drag_hover = false;
                false
            }
        }
    }

    /// Validate and enter `Submitting`. No file means no request.
    pub fn begin_submit(&mut self, notifications: &mut NotificationQueue) -> Option<UploadRequest> {
        match &self.phase {
            UploadPhase::FileChosen { kind, file } => {
                let request = UploadRequest {
                    kind: *kind,
                    file: file.clone(),
                };
                info!("Submitting {} upload from {}", request.kind, request.file.display());
                self.phase = UploadPhase::Submitting {
                    kind: request.kind,
                    file: request.file.clone(),
                };
                Some(request)
            }
            UploadPhase::NoTypeSelected | UploadPhase::TypeSelected(_) => {
                notifications.warning("Please select a file first.");
                None
            }
            UploadPhase::Submitting { .. } => None,
        }
    }

    pub fn finish(
        &mut self,
        outcome: Result<(), ApiError>,
        notifications: &mut NotificationQueue,
    ) -> UploadFinish {
        let phase = std::mem::replace(&mut self.phase, UploadPhase::NoTypeSelected);
        match outcome {
            Ok(()) => {
                notifications.success("File uploaded successfully");
                self.reset();
                UploadFinish::Reload
            }
            Err(e) => {
                warn!("Upload failed: {}", e);
                notifications.error(match e.detail() {
                    Some(detail) => format!("File upload failed: {}", detail),
                    None => "File upload failed".to_string(),
                });
                self.phase = match phase {
                    UploadPhase::Submitting { kind, file } => UploadPhase::FileChosen { kind, file },
                    other => other,
                };
                UploadFinish::Retry
            }
        }
    }

    pub fn reset(&mut self) {
        self.phase = UploadPhase::NoTypeSelected;
        self.drag_hover = false;
    }
}

fn dropped_path(text: &str) -> Option<PathBuf> {
    let trimmed = text.trim();
    let unquoted = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(trimmed);
    let without_scheme = unquoted.strip_prefix("file://").unwrap_or(unquoted);
    let unescaped = without_scheme.replace("\\ ", " ");

    if unescaped.is_empty() {
        None
    } else {
        Some(PathBuf::from(unescaped))
    }
}
