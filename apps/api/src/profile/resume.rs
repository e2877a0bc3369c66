use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::profile::{ResumeDescriptor, ResumeKind};
use crate::profile::gateway::{GatewayError, ProfileGateway};

/// 5 MiB.
pub const MAX_RESUME_BYTES: u64 = 5 * 1024 * 1024;

/// How the file reached us. Both paths run the same checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntakeSource {
    Drop,
    #[default]
    Picker,
}

/// A file as handed over by the client, before any checks.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub name: String,
    pub content_type: String,
    pub contents: Bytes,
    pub last_modified: DateTime<Utc>,
}

impl ResumeFile {
    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResumeRejection {
    #[error("Please upload a PDF or Word document")]
    UnsupportedType { content_type: String },

    #[error("File size must be less than 5MB")]
    TooLarge { size: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Rejected(#[from] ResumeRejection),

    #[error(transparent)]
    Upload(#[from] GatewayError),
}

/// Type first, then size: a PNG is refused whatever its size.
pub fn check_resume(file: &ResumeFile) -> Result<ResumeKind, ResumeRejection> {
    let kind = ResumeKind::from_mime(&file.content_type).ok_or_else(|| {
        ResumeRejection::UnsupportedType {
            content_type: file.content_type.clone(),
        }
    })?;
    let size = file.size();
    if size > MAX_RESUME_BYTES {
        return Err(ResumeRejection::TooLarge { size });
    }
    Ok(kind)
}

/// Descriptor for an accepted file, with a fresh local object reference.
pub fn describe_resume(file: &ResumeFile, kind: ResumeKind) -> ResumeDescriptor {
    ResumeDescriptor {
        name: file.name.clone(),
        size: file.size(),
        kind,
        object_reference: format!("blob:careerbridge/{}", Uuid::new_v4()),
        last_modified: file.last_modified,
    }
}

/// Checks `file` and hands it to the gateway's upload path.
pub async fn intake_resume(
    source: IntakeSource,
    file: &ResumeFile,
    gateway: &dyn ProfileGateway,
) -> Result<ResumeDescriptor, IntakeError> {
    let kind = match check_resume(file) {
        Ok(kind) => kind,
        Err(rejection) => {
            warn!(
                "Rejected resume '{}' ({:?}, {} bytes): {rejection}",
                file.name,
                source,
                file.size()
            );
            return Err(rejection.into());
        }
    };
    let descriptor = gateway.upload_resume(file, kind).await?;
    info!(
        "Accepted resume '{}' via {:?} as {}",
        descriptor.name, source, descriptor.object_reference
    );
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::gateway::InMemoryProfileGateway;
    use std::time::Duration;

    const MIB: usize = 1024 * 1024;

    fn file(name: &str, content_type: &str, size: usize) -> ResumeFile {
        ResumeFile {
            name: name.to_string(),
            content_type: content_type.to_string(),
            contents: Bytes::from(vec![0u8; size]),
            last_modified: Utc::now(),
        }
    }

    #[test]
    fn test_six_mib_pdf_rejected() {
        let f = file("cv.pdf", "application/pdf", 6 * MIB);
        assert_eq!(
            check_resume(&f),
            Err(ResumeRejection::TooLarge {
                size: (6 * MIB) as u64
            })
        );
    }

    #[test]
    fn test_four_mib_docx_accepted() {
        let f = file("cv.docx", ResumeKind::Docx.mime(), 4 * MIB);
        assert_eq!(check_resume(&f), Ok(ResumeKind::Docx));
    }

    #[test]
    fn test_png_rejected_regardless_of_size() {
        for size in [1, MIB, 6 * MIB] {
            let f = file("photo.png", "image/png", size);
            assert!(matches!(
                check_resume(&f),
                Err(ResumeRejection::UnsupportedType { .. })
            ));
        }
    }

    #[test]
    fn test_exactly_five_mib_accepted() {
        let f = file("cv.doc", "application/msword", 5 * MIB);
        assert_eq!(check_resume(&f), Ok(ResumeKind::Doc));
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            ResumeRejection::UnsupportedType {
                content_type: "image/png".to_string()
            }
            .to_string(),
            "Please upload a PDF or Word document"
        );
        assert_eq!(
            ResumeRejection::TooLarge { size: 1 }.to_string(),
            "File size must be less than 5MB"
        );
    }

    #[tokio::test]
    async fn test_drop_and_picker_produce_identical_outcomes() {
        let gateway = InMemoryProfileGateway::new(Duration::ZERO, Duration::ZERO);
        let cases = [
            file("cv.pdf", "application/pdf", MIB),
            file("cv.pdf", "application/pdf", 6 * MIB),
            file("cv.png", "image/png", MIB),
        ];
        for f in &cases {
            let dropped = intake_resume(IntakeSource::Drop, f, &gateway).await;
            let picked = intake_resume(IntakeSource::Picker, f, &gateway).await;
            match (dropped, picked) {
                (Ok(a), Ok(b)) => {
                    assert_eq!(a.name, b.name);
                    assert_eq!(a.size, b.size);
                    assert_eq!(a.kind, b.kind);
                    assert_eq!(a.last_modified, b.last_modified);
                }
                (Err(a), Err(b)) => assert_eq!(a, b),
                (a, b) => panic!("diverging outcomes: {a:?} vs {b:?}"),
            }
        }
    }
}
