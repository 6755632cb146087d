use super::*;
use crate::model::TypeTag;
use crate::store::MemoryStore;

fn updater_with_patients(tag: TypeTag, ids: &[i64]) -> (BatchUpdater<MemoryStore>, MemoryStore) {
    let store = MemoryStore::default();
    for id in ids {
        store.insert_subject(tag.update_target(), *id, "before");
    }
    (BatchUpdater::new(store.clone()), store)
}

#[test]
fn test_parse_keeps_required_columns() {
    let csv = b"patientid,name,ethnicity\n123,Ann,Hispanic\n456,Bob,Asian\n";
    let rows = parse_corrections(csv, "ethnicity").unwrap();
    assert_eq!(
        rows,
        vec![
            CorrectionRow {
                subject_id: Some(123),
                value: Some("Hispanic".to_string())
            },
            CorrectionRow {
                subject_id: Some(456),
                value: Some("Asian".to_string())
            },
        ]
    );
}

#[test]
fn test_parse_blank_cells_are_none() {
    let csv = b"patientid,ethnicity\n,Asian\n789,\n  10 ,  White - Irish  \n";
    let rows = parse_corrections(csv, "ethnicity").unwrap();
    assert_eq!(rows[0].subject_id, None);
    assert_eq!(rows[1].value, None);
    assert_eq!(rows[2].subject_id, Some(10));
    assert_eq!(rows[2].value.as_deref(), Some("White - Irish"));
}

#[test]
fn test_parse_accepts_integral_floats() {
    let csv = b"patientid,reason_for_admission\n123.0,Stroke\n";
    let rows = parse_corrections(csv, "reason_for_admission").unwrap();
    assert_eq!(rows[0].subject_id, Some(123));
}

#[test]
fn test_parse_rejects_non_numeric_ids() {
    for bad in ["abc", "12.5", "NaN", "inf"] {
        let csv = format!("patientid,ethnicity\n1,Asian\n{bad},Asian\n");
        let err = parse_corrections(csv.as_bytes(), "ethnicity").unwrap_err();
        match err {
            UpdateError::MalformedInput { reason } => {
                assert!(reason.contains("line 3"), "{reason}");
                assert!(reason.contains(bad), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[test]
fn test_parse_requires_columns() {
    let err = parse_corrections(b"id,ethnicity\n1,Asian\n", "ethnicity").unwrap_err();
    assert!(matches!(err, UpdateError::MalformedInput { ref reason } if reason.contains("patientid")));

    let err = parse_corrections(b"patientid,ethnicity\n1,Asian\n", "sexual_orientation").unwrap_err();
    assert!(
        matches!(err, UpdateError::MalformedInput { ref reason } if reason.contains("sexual_orientation"))
    );
}

#[test]
fn test_parse_header_only_file_is_empty() {
    let rows = parse_corrections(b"patientid,ethnicity\n", "ethnicity").unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_apply_two_ethnicity_corrections() {
    let (updater, store) = updater_with_patients(TypeTag::Ethnicity, &[123, 456]);
    let csv = b"patientid,ethnicity\n123,Hispanic\n456,Asian\n";

    let applied = updater.apply_file(csv, "/ethnicity").await.unwrap();

    assert_eq!(applied.len(), 2);
    assert_eq!(applied[0].subject_id, 123);
    assert_eq!(applied[0].column, "ethnicity");
    assert_eq!(applied[0].value, "Hispanic");
    assert_eq!(applied[1].subject_id, 456);
    assert_eq!(applied[1].value, "Asian");

    let target = TypeTag::Ethnicity.update_target();
    assert_eq!(store.field(target, 123).as_deref(), Some("Hispanic"));
    assert_eq!(store.field(target, 456).as_deref(), Some("Asian"));
}

#[tokio::test]
async fn test_apply_skips_incomplete_rows() {
    let (updater, store) = updater_with_patients(TypeTag::SexualOrientation, &[1, 2, 3]);
    let rows = vec![
        CorrectionRow {
            subject_id: Some(1),
            value: Some("Bisexual".to_string()),
        },
        CorrectionRow {
            subject_id: None,
            value: Some("Gay or Lesbian".to_string()),
        },
        CorrectionRow {
            subject_id: Some(3),
            value: None,
        },
    ];

    let applied = updater.apply(rows, TypeTag::SexualOrientation).await.unwrap();

    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].column, "sexual_orientation");
    let target = TypeTag::SexualOrientation.update_target();
    assert_eq!(store.field(target, 1).as_deref(), Some("Bisexual"));
    assert_eq!(store.field(target, 3).as_deref(), Some("before"));
}

#[tokio::test]
async fn test_apply_diagnosis_targets_registration() {
    let (updater, store) = updater_with_patients(TypeTag::Diagnosis, &[42]);
    let csv = b"patientid,reason_for_admission\n42,Acute myocardial infarction\n";

    let applied = updater.apply_file(csv, "/icd11").await.unwrap();

    assert_eq!(applied[0].column, "reason_for_admission");
    let target = TypeTag::Diagnosis.update_target();
    assert_eq!(target.table, "registration");
    assert_eq!(
        store.field(target, 42).as_deref(),
        Some("Acute myocardial infarction")
    );
}

#[tokio::test]
async fn test_unsupported_type_is_rejected() {
    let (updater, _store) = updater_with_patients(TypeTag::Ethnicity, &[1]);
    let csv = b"patientid,ethnicity\n1,Asian\n";

    for type_id in ["/name", "", "ethnicity"] {
        let err = updater.apply_file(csv, type_id).await.unwrap_err();
        assert!(
            matches!(err, UpdateError::UnsupportedType { .. }),
            "{type_id:?} gave {err:?}"
        );
    }
}

#[tokio::test]
async fn test_store_failure_is_persistence_error() {
    let (updater, store) = updater_with_patients(TypeTag::Ethnicity, &[1]);
    store.set_unavailable(true);

    let err = updater
        .apply_file(b"patientid,ethnicity\n1,Asian\n", "/ethnicity")
        .await
        .unwrap_err();

    assert!(matches!(err, UpdateError::Persistence(_)));
}

#[tokio::test]
async fn test_nothing_to_apply_skips_store() {
    let (updater, store) = updater_with_patients(TypeTag::Ethnicity, &[1]);
    store.set_unavailable(true);

    let applied = updater
        .apply_file(b"patientid,ethnicity\n,\n", "/ethnicity")
        .await
        .unwrap();

    assert!(applied.is_empty());
}
