//! Record encoding and row decoding through the engine.

use std::sync::Arc;
use std::thread;

use ntest::timeout;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use uuid::Uuid;

use sqlmap_core::{DecodeError, Error, SqlArgument, SqlValue};

use super::helpers::{engine, sample_user, Address, Audit, User};

/// Turns encoded arguments into the values a driver would read back.
fn wire_row(columns: Vec<(String, SqlArgument)>) -> (Vec<String>, Vec<SqlValue>) {
    columns
        .into_iter()
        .map(|(name, arg)| {
            let wire = match arg {
                SqlArgument::Value(value) => value,
                SqlArgument::Call { args, .. } => args
                    .into_iter()
                    .next()
                    .and_then(|inner| inner.as_value().cloned())
                    .unwrap_or(SqlValue::Null),
                SqlArgument::Raw(_) => SqlValue::Null,
            };
            (name, wire)
        })
        .unzip()
}

#[test]
fn test_encode_record_columns() {
    let engine = engine();
    let user = sample_user();
    let columns = engine.encode_record(&user).unwrap();
    let names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec!["ID", "Name", "Active", "Score", "Address", "Tags", "Nickname", "CreatedBy"]
    );
    assert_eq!(
        columns[0].1,
        SqlArgument::call(
            "UUID_TO_BIN",
            vec![SqlArgument::bind("0b6f4a1e-3c2d-4e5f-8a9b-1c2d3e4f5a6b")]
        )
    );
    assert_eq!(columns[2].1, SqlArgument::bind(true));
    assert_eq!(
        columns[4].1,
        SqlArgument::bind(r#"{"city":"Ipoh","zip":30000}"#)
    );
    assert_eq!(columns[5].1, SqlArgument::bind(r#"["admin","ops"]"#));
    assert_eq!(columns[6].1, SqlArgument::null());
    assert_eq!(columns[7].1, SqlArgument::bind("seed"));
}

#[test]
fn test_nil_uuid_is_generated() {
    let engine = engine();
    let user = User::default();
    let columns = engine.encode_record(&user).unwrap();
    let SqlArgument::Call { func, args } = &columns[0].1 else {
        panic!("expected UUID_TO_BIN call, got {:?}", columns[0].1);
    };
    assert_eq!(func, "UUID_TO_BIN");
    let text = match args[0].as_value() {
        Some(SqlValue::Text(text)) => text.clone(),
        other => panic!("expected text argument, got {other:?}"),
    };
    let id = Uuid::parse_str(&text).unwrap();
    assert!(!id.is_nil());

    // The caller's record is left untouched
    assert!(user.id.is_nil());
}

#[test]
fn test_row_round_trip() {
    let engine = engine();
    let user = sample_user();
    let (names, row) = wire_row(engine.encode_record(&user).unwrap());
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let decoded: User = engine.decode_row(&names, row).unwrap();
    assert_eq!(decoded, user);
}

#[test]
fn test_decode_from_text_protocol() {
    let engine = engine();
    let columns = [
        "ID", "Name", "Active", "Score", "Address", "Nickname", "CreatedBy", "Unknown",
    ];
    let row = vec![
        SqlValue::Text("0b6f4a1e-3c2d-4e5f-8a9b-1c2d3e4f5a6b".into()),
        SqlValue::Text("Lin".into()),
        SqlValue::Text("true".into()),
        SqlValue::Text("2.25".into()),
        SqlValue::Bytes(br#"{"city":"Penang","extra":[1,2]}"#.to_vec()),
        SqlValue::Null,
        SqlValue::Text("import".into()),
        SqlValue::Text("ignored".into()),
    ];
    let user: User = engine.decode_row(&columns, row).unwrap();
    assert_eq!(
        user,
        User {
            id: Uuid::parse_str("0b6f4a1e-3c2d-4e5f-8a9b-1c2d3e4f5a6b").unwrap(),
            name: "Lin".into(),
            active: true,
            score: 2.25,
            address: Address {
                city: "Penang".into(),
                zip: None,
            },
            tags: Vec::new(),
            nickname: None,
            audit: Audit {
                created_by: "import".into(),
            },
            scratch: String::new(),
        }
    );
}

#[test]
fn test_decode_rejects_bad_values() {
    let engine = engine();
    let err = engine
        .decode_row::<User>(&["Active"], vec![SqlValue::Text("abc".into())])
        .unwrap_err();
    assert!(matches!(err, Error::Decode(DecodeError::InvalidValue { .. })), "{err:?}");

    let err = engine
        .decode_row::<User>(&["Name", "Active"], vec![SqlValue::Null])
        .unwrap_err();
    assert_eq!(
        err,
        Error::Decode(DecodeError::RowShape {
            columns: 2,
            values: 1
        })
    );
}

#[test]
#[timeout(10000)]
fn test_shared_engine_across_threads() {
    let engine = Arc::new(engine());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let mut user = sample_user();
                user.name = format!("user-{i}");
                let (names, row) = wire_row(engine.encode_record(&user).unwrap());
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                let decoded: User = engine.decode_row(&names, row).unwrap();
                assert_eq!(decoded.name, user.name);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert!(engine.schemas().len() >= 1);
}

proptest! {
    #[test]
    fn prop_text_columns_round_trip(name in ".*", city in "[a-zA-Z \"\\\\]{0,24}") {
        let engine = engine();
        let mut user = sample_user();
        user.name = name;
        user.address.city = city;
        let (names, row) = wire_row(engine.encode_record(&user).unwrap());
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let decoded: User = engine.decode_row(&names, row).unwrap();
        prop_assert_eq!(decoded, user);
    }
}
