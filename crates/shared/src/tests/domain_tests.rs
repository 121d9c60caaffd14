use super::*;
use crate::protocol::FormPayload;

fn filled_draft() -> Draft {
    Draft {
        first_name: "Ann".to_string(),
        last_name: "Lee".to_string(),
        email: "a@x.com".to_string(),
        subject: "Hi".to_string(),
        message: "Hello".to_string(),
        attachment: None,
    }
}

#[test]
fn filled_draft_passes_validation() {
    assert_eq!(filled_draft().validate(), Ok(()));
}

#[test]
fn validation_reports_every_blank_field_in_submission_order() {
    let mut draft = filled_draft();
    draft.set_field(FieldName::Message, "");
    draft.set_field(FieldName::FirstName, "   \t");

    let err = draft.validate().expect_err("blank fields");
    assert_eq!(err.missing, vec![FieldName::FirstName, FieldName::Message]);
    assert_eq!(
        err.to_string(),
        "missing required fields: firstName, message"
    );
}

#[test]
fn attachment_does_not_affect_validation() {
    let mut draft = Draft::default();
    draft.attachment = Some(Attachment::new("notes.txt", b"hi".to_vec()));
    let err = draft.validate().expect_err("empty text fields");
    assert_eq!(err.missing.len(), 5);
}

#[test]
fn field_names_round_trip_through_wire_names() {
    for name in FieldName::ALL {
        assert_eq!(name.wire_name().parse::<FieldName>(), Ok(name));
    }
    assert!("first_name".parse::<FieldName>().is_err());
    assert!("attachment".parse::<FieldName>().is_err());
}

#[test]
fn attachment_mime_type_is_guessed_from_filename() {
    let pdf = Attachment::new("report.pdf", vec![1, 2, 3]);
    assert_eq!(pdf.mime_type.as_deref(), Some("application/pdf"));
    assert_eq!(pdf.size_bytes(), 3);

    let unknown = Attachment::new("blob", Vec::new());
    assert_eq!(unknown.mime_type, None);
}

#[test]
fn attachment_from_path_keeps_original_filename() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("photo.png");
    std::fs::write(&path, b"\x89PNG").expect("write file");

    let attachment = Attachment::from_path(&path).expect("read attachment");
    assert_eq!(attachment.filename, "photo.png");
    assert_eq!(attachment.mime_type.as_deref(), Some("image/png"));
    assert_eq!(attachment.bytes, b"\x89PNG");
}

#[test]
fn attachment_from_missing_path_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("missing.txt");
    let err = Attachment::from_path(&path).expect_err("missing file");
    assert!(err.to_string().contains("missing.txt"));
}

#[test]
fn payload_without_attachment_has_only_text_parts() {
    let payload = FormPayload::from_draft(&filled_draft());
    let names: Vec<&str> = payload
        .fields
        .iter()
        .map(|(name, _)| name.wire_name())
        .collect();
    assert_eq!(names, vec!["firstName", "lastName", "email", "subject", "message"]);
    assert_eq!(payload.field(FieldName::Email), Some("a@x.com"));
    assert!(payload.attachment.is_none());
}

#[test]
fn payload_with_attachment_adds_attachment_part() {
    let mut draft = filled_draft();
    draft.attachment = Some(Attachment::new("cv.pdf", b"%PDF".to_vec()));
    let payload = FormPayload::from_draft(&draft);
    assert_eq!(payload.fields.len(), 5);
    assert_eq!(
        payload.attachment.as_ref().map(|a| a.filename.as_str()),
        Some("cv.pdf")
    );
}

#[test]
fn outcome_constructors_use_fixed_status_texts() {
    assert!(SubmissionOutcome::none().is_none());
    assert_eq!(SubmissionOutcome::sent().severity, Severity::Success);
    assert_eq!(SubmissionOutcome::sent().status_text, STATUS_SENT);
    assert_eq!(SubmissionOutcome::failed().status_text, STATUS_FAILED);
    assert_eq!(SubmissionOutcome::incomplete().status_text, STATUS_INCOMPLETE);
    assert_eq!(SubmissionOutcome::incomplete().severity, Severity::Error);
}

#[test]
fn default_draft_is_empty() {
    assert!(Draft::default().is_empty());
    assert!(!filled_draft().is_empty());
}
