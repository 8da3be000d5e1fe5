use chrono::{TimeZone, Utc};
use keymint_types::{decode_document, encode_records, AccessKey, KeyRecord, RoleId, UserId};

fn unredeemed() -> KeyRecord {
    KeyRecord::new(AccessKey::parse("ABC123XYZ789").unwrap(), RoleId::new(555))
}

#[test]
fn unredeemed_line_has_empty_optionals() {
    let line = unredeemed().to_line();
    assert_eq!(line, "ABC123XYZ789,555,,");
}

#[test]
fn redeemed_line_carries_both_fields() {
    let mut record = unredeemed();
    let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
    record.mark_redeemed(UserId::new(42), at);

    let line = record.to_line();
    assert_eq!(line, "ABC123XYZ789,555,42,2026-03-14T09:26:53Z");

    let parsed = KeyRecord::parse_line(&line).unwrap();
    assert_eq!(parsed, record);
    assert!(parsed.is_redeemed());
}

#[test]
fn parse_line_tolerates_trailing_newline() {
    let parsed = KeyRecord::parse_line("ABC123XYZ789,555,,\n").unwrap();
    assert!(!parsed.is_redeemed());
    assert_eq!(parsed.role, RoleId::new(555));
}

#[test]
fn parse_line_rejects_wrong_field_count() {
    assert!(KeyRecord::parse_line("ABC123XYZ789,555").is_err());
    assert!(KeyRecord::parse_line("ABC123XYZ789,555,,,extra").is_err());
    assert!(KeyRecord::parse_line("").is_err());
}

#[test]
fn parse_line_rejects_bad_fields() {
    // bad key
    assert!(KeyRecord::parse_line("short,555,,").is_err());
    // bad role
    assert!(KeyRecord::parse_line("ABC123XYZ789,role,,").is_err());
    // bad redeemer
    assert!(KeyRecord::parse_line("ABC123XYZ789,555,bob,2026-03-14T09:26:53Z").is_err());
    // bad timestamp
    assert!(KeyRecord::parse_line("ABC123XYZ789,555,42,yesterday").is_err());
}

#[test]
fn parse_line_rejects_half_redeemed_records() {
    // redeemer without timestamp
    assert!(KeyRecord::parse_line("ABC123XYZ789,555,42,").is_err());
    // timestamp without redeemer
    assert!(KeyRecord::parse_line("ABC123XYZ789,555,,2026-03-14T09:26:53Z").is_err());
}

#[test]
fn encode_empty_set_is_empty_document() {
    assert_eq!(encode_records(&[]), "");
}

#[test]
fn decode_document_skips_malformed_lines() {
    let doc = "ABC123XYZ789,555,,\n\
               not a record\n\
               \n\
               DEF456UVW012,777,42,2026-03-14T09:26:53Z\n";
    let (records, skipped) = decode_document(doc);
    assert_eq!(records.len(), 2);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].0, 2);
    assert_eq!(records[1].redeemed_by, Some(UserId::new(42)));
}

#[test]
fn encode_decode_document() {
    let mut second = KeyRecord::new(
        AccessKey::parse("DEF456UVW012").unwrap(),
        RoleId::new(777),
    );
    second.mark_redeemed(
        UserId::new(42),
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
    );
    let records = vec![unredeemed(), second];

    let doc = encode_records(&records);
    let (decoded, skipped) = decode_document(&doc);
    assert!(skipped.is_empty());
    assert_eq!(decoded, records);
}
