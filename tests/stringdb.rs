//! String table decoding against the sample tables in `tests/samples`.
//!
//! `string_db.txt` and `string_db.bin` hold the same five entries, once in the comma-separated
//! signed decimal form found in application resources and once in the raw layout:
//!
//! | index | offset | length | value |
//! |-------|--------|--------|-------|
//! | 1 | 0  | 6  | `Hello` |
//! | 2 | 5  | 6  | `World` |
//! | 3 | 10 | 1  | (empty) |
//! | 4 | 10 | 21 | `Grüße aus München` |
//! | 5 | 30 | 11 | `✓ 世界` |

use std::{
    path::PathBuf,
    sync::{Arc, Barrier},
    thread,
};

use strscope::{
    file::{text, TableEncoding},
    Error, SharedDatabase, StringDatabase, StringTableBuilder,
};

const EXPECTED: [&str; 5] = ["Hello", "World", "", "Grüße aus München", "✓ 世界"];

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/samples")
        .join(name)
}

fn verify(db: &StringDatabase) {
    assert_eq!(db.entry_count(), 5);
    assert_eq!(db.index_size(), 40);
    assert_eq!(db.payload_start(), 44);
    for (i, expected) in EXPECTED.iter().enumerate() {
        assert_eq!(db.resolve(i as u32 + 1).unwrap(), *expected, "entry {}", i + 1);
    }
}

#[test]
fn text_sample() {
    let db = StringDatabase::from_path_with_encoding(sample("string_db.txt"), TableEncoding::Text)
        .unwrap();
    verify(&db);
}

#[test]
fn binary_sample() {
    let db =
        StringDatabase::from_path_with_encoding(sample("string_db.bin"), TableEncoding::Binary)
            .unwrap();
    verify(&db);
}

#[test]
fn auto_detected_samples_agree() {
    let text = StringDatabase::from_file(sample("string_db.txt")).unwrap();
    let binary = StringDatabase::from_file(sample("string_db.bin")).unwrap();
    assert_eq!(text.data(), binary.data());
    verify(&text);
}

#[test]
fn text_sample_matches_builder_output() {
    let mut builder = StringTableBuilder::new();
    for s in EXPECTED {
        builder.push(s).unwrap();
    }
    let built = builder.build().unwrap();

    let bytes = std::fs::read(sample("string_db.bin")).unwrap();
    assert_eq!(built, bytes);

    let canonical = text::encode(&built);
    let db = StringDatabase::from_text(&canonical).unwrap();
    verify(&db);
}

#[test]
fn every_entry_resolves_to_its_byte_range() {
    let db = StringDatabase::from_file(sample("string_db.bin")).unwrap();
    for entry in db.entries() {
        let entry = entry.unwrap();
        let start = db.payload_start() + entry.offset as usize;
        let end = start + entry.length as usize - 1;
        let expected = std::str::from_utf8(&db.data()[start..end]).unwrap();
        assert_eq!(db.resolve(entry.index).unwrap(), expected);
    }
}

#[test]
fn bounds_are_one_based() {
    let db = StringDatabase::from_file(sample("string_db.bin")).unwrap();
    assert!(matches!(
        db.resolve(0),
        Err(Error::IndexOutOfRange { index: 0, count: 5 })
    ));
    assert!(matches!(
        db.resolve(6),
        Err(Error::IndexOutOfRange { index: 6, count: 5 })
    ));
    assert!(matches!(
        db.resolve_key("-3"),
        Err(Error::IndexOutOfRange { index: -3, .. })
    ));
    assert!(matches!(db.resolve_key("0x1"), Err(Error::InvalidKey(_))));
}

#[test]
fn truncated_sample_is_malformed() {
    let bytes = std::fs::read(sample("string_db.bin")).unwrap();

    // header claims 40 index bytes, only 20 present
    let db = StringDatabase::from_mem(bytes[..24].to_vec());
    assert!(matches!(db, Err(Error::Malformed { .. })));

    // index intact, payload cut short
    let db = StringDatabase::from_mem(bytes[..50].to_vec()).unwrap();
    assert_eq!(db.resolve(1).unwrap(), "Hello");
    assert!(matches!(db.resolve(2), Err(Error::Malformed { .. })));
    assert!(matches!(db.resolve(4), Err(Error::Malformed { .. })));
}

#[test]
fn split_multibyte_sequence_is_invalid_encoding() {
    let mut builder = StringTableBuilder::new();
    builder.push("ü").unwrap();
    let mut bytes = builder.build().unwrap();
    // shorten the stored length so only the lead byte of 'ü' is covered
    bytes[8] = 2;

    let db = StringDatabase::from_mem(bytes).unwrap();
    assert!(matches!(
        db.resolve(1),
        Err(Error::InvalidEncoding { index: 1, .. })
    ));
}

#[test]
fn text_rejects_out_of_range_token() {
    let result = StringDatabase::from_text("8, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 300");
    match result {
        Err(Error::Malformed { message, .. }) => assert!(message.contains("position 12")),
        other => panic!("Expected Malformed, got {other:?}"),
    }
}

#[test]
fn shared_sample_loads_once_across_threads() {
    let shared = Arc::new(SharedDatabase::from_path(
        sample("string_db.txt"),
        TableEncoding::Auto,
    ));
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16u32)
        .map(|i| {
            let shared = Arc::clone(&shared);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let db = shared.get().unwrap();
                (Arc::as_ptr(&db) as usize, db.resolve(i % 5 + 1).unwrap())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let first = results[0].0;
    for (i, (ptr, value)) in results.iter().enumerate() {
        assert_eq!(*ptr, first);
        assert_eq!(value.as_str(), EXPECTED[i % 5]);
    }
    assert!(shared.is_loaded());
}
