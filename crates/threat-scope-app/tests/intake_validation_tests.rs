//! Integration tests for image intake bounds and format sniffing.

use threat_scope_intake::{ImagePayload, IntakeConfig, IntakeError, sniff_format};

#[test]
fn intake_validation_tests_rejects_oversized_payloads() {
    let config = IntakeConfig { max_bytes: 16 };
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.resize(17, 0);

    assert_eq!(
        ImagePayload::from_bytes("big.jpg", bytes, &config),
        Err(IntakeError::OversizedPayload { actual: 17, max: 16 })
    );
}

#[test]
fn intake_validation_tests_accepts_two_megabyte_jpeg() {
    let config = IntakeConfig::default();
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.resize(2 * 1024 * 1024, 0x55);

    let payload =
        ImagePayload::from_bytes("photo.jpg", bytes, &config).expect("payload should build");
    assert_eq!(payload.format.mime_type(), "image/jpeg");
    assert_eq!(payload.len(), 2 * 1024 * 1024);
}

#[test]
fn intake_validation_tests_rejects_non_image_buffers() {
    let config = IntakeConfig::default();
    assert_eq!(
        ImagePayload::from_bytes("doc.pdf", b"%PDF-1.7 ...".to_vec(), &config),
        Err(IntakeError::UnsupportedFormat)
    );
    assert_eq!(sniff_format(b"%PDF-1.7"), None);
}
