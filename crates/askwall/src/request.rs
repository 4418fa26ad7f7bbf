//! Composition of the outbound request for one submitted question.
//!
//! [`PendingRequest::form_fields`] describes the multipart body without
//! tying it to an HTTP client, so the field layout can be checked directly.

use crate::attachment::{Attachment, AttachmentHolder, Slot};
use crate::mode::ModeSpec;

/// Placeholder identity sent with every request.
pub const DEFAULT_IDENTITY: &str = "anonymous_user";

pub const FIELD_USERNAME: &str = "username";
pub const FIELD_QUESTION: &str = "question";
pub const FIELD_OPTION: &str = "option";

/// One in-flight question. Built fresh per submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRequest {
    pub identity: String,
    /// Question text, already trimmed and non-empty.
    pub question: String,
    /// Active mode id.
    pub option: String,
    /// Populated slots, only when the mode takes attachments.
    pub attachments: Vec<(Slot, Attachment)>,
}

/// A single multipart form field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormField {
    Text {
        name: &'static str,
        value: String,
    },
    File {
        name: &'static str,
        attachment: Attachment,
    },
}

impl FormField {
    pub fn name(&self) -> &'static str {
        match self {
            FormField::Text { name, .. } | FormField::File { name, .. } => *name,
        }
    }
}

impl PendingRequest {
    /// Fields in wire order: identity, question, mode, then files.
    pub fn form_fields(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::Text {
                name: FIELD_USERNAME,
                value: self.identity.clone(),
            },
            FormField::Text {
                name: FIELD_QUESTION,
                value: self.question.clone(),
            },
            FormField::Text {
                name: FIELD_OPTION,
                value: self.option.clone(),
            },
        ];
        fields.extend(self.attachments.iter().map(|(slot, att)| FormField::File {
            name: slot.field_name(),
            attachment: att.clone(),
        }));
        fields
    }

    /// Total attachment payload size in bytes.
    pub fn attachment_bytes(&self) -> usize {
        self.attachments.iter().map(|(_, a)| a.len()).sum()
    }
}

/// Build the request for `question` under `mode`.
///
/// Returns `None` when the question is blank after trimming; such a
/// submission is dropped without any error.
pub fn compose(
    identity: &str,
    question: &str,
    mode: &ModeSpec,
    attachments: &AttachmentHolder,
) -> Option<PendingRequest> {
    let question = question.trim();
    if question.is_empty() {
        return None;
    }

    let attachments = if mode.requires_attachments {
        attachments
            .files()
            .into_iter()
            .map(|(slot, att)| (slot, att.clone()))
            .collect()
    } else {
        Vec::new()
    };

    Some(PendingRequest {
        identity: identity.to_string(),
        question: question.to_string(),
        option: mode.id.clone(),
        attachments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ModeCatalog;

    fn mode(id: &str) -> ModeSpec {
        ModeCatalog::default().get(id).unwrap().clone()
    }

    fn names(req: &PendingRequest) -> Vec<&'static str> {
        req.form_fields().iter().map(FormField::name).collect()
    }

    #[test]
    fn blank_question_yields_nothing() {
        let holder = AttachmentHolder::new();
        for q in ["", "   ", "\n\t  \r\n"] {
            assert!(compose(DEFAULT_IDENTITY, q, &mode("1"), &holder).is_none());
        }
    }

    #[test]
    fn question_is_trimmed() {
        let holder = AttachmentHolder::new();
        let req = compose(DEFAULT_IDENTITY, "  What is X?\n", &mode("3"), &holder).unwrap();
        assert_eq!(req.question, "What is X?");
        assert_eq!(req.option, "3");
        assert_eq!(req.identity, DEFAULT_IDENTITY);
    }

    #[test]
    fn mode_one_sends_only_populated_slot() {
        let mut holder = AttachmentHolder::new();
        holder.set_file(Slot::First, Some(Attachment::from_bytes("spec.pdf", "pdf")));

        let req = compose(DEFAULT_IDENTITY, "What is X?", &mode("1"), &holder).unwrap();
        assert_eq!(
            names(&req),
            vec!["username", "question", "option", "uploaded_file1"]
        );
        let fields = req.form_fields();
        assert_eq!(
            fields[1],
            FormField::Text {
                name: "question",
                value: "What is X?".into()
            }
        );
        assert_eq!(
            fields[2],
            FormField::Text {
                name: "option",
                value: "1".into()
            }
        );
        match &fields[3] {
            FormField::File { attachment, .. } => assert_eq!(attachment.file_name, "spec.pdf"),
            other => panic!("expected file field, got {other:?}"),
        }
    }

    #[test]
    fn second_slot_alone_keeps_its_field_name() {
        let mut holder = AttachmentHolder::new();
        holder.set_file(Slot::Second, Some(Attachment::from_bytes("b.csv", "x,y")));

        let req = compose(DEFAULT_IDENTITY, "q", &mode("4"), &holder).unwrap();
        assert_eq!(
            names(&req),
            vec!["username", "question", "option", "uploaded_file2"]
        );
        assert_eq!(req.attachment_bytes(), 3);
    }

    #[test]
    fn mode_two_withholds_files() {
        let mut holder = AttachmentHolder::new();
        holder.set_file(Slot::First, Some(Attachment::from_bytes("a.pdf", "a")));
        holder.set_file(Slot::Second, Some(Attachment::from_bytes("b.pdf", "b")));

        let req = compose(DEFAULT_IDENTITY, "Summarize", &mode("2"), &holder).unwrap();
        assert_eq!(names(&req), vec!["username", "question", "option"]);
        assert!(req.attachments.is_empty());
        // The holder itself is untouched.
        assert_eq!(holder.files().len(), 2);
    }
}
