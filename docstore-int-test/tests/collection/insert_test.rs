use docstore::collection::{Document, PkInjector};
use docstore::errors::{DocStoreResult, ErrorKind};
use docstore::filter::{all, field};
use docstore::{doc, ObjectId, Value};
use docstore_int_test::test_util::{cleanup, create_test_context, read_all, run_test};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

#[test]
fn test_round_trip_keeps_content() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            let original = doc! {
                name: "Alice",
                age: 30,
                score: 9.5,
                active: true,
                tags: ["a", "b", { nested: [1, 2] }],
                address: { city: "Paris", zip: "75001" },
                nothing: (Value::Null)
            };
            collection.insert(&original)?;

            let stored = collection.find_one(all())?.expect("document");
            let mut without_id = stored.clone();
            without_id.remove("_id");
            assert_eq!(without_id, original);
            let keys: Vec<&String> = without_id.keys().collect();
            let expected: Vec<&String> = original.keys().collect();
            assert_eq!(keys, expected);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_mutate_then_insert_stores_two_documents() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            let mut document = doc! { a: 1 };
            collection.insert(&document)?;
            document.put("a", 2)?;
            collection.insert(&document)?;
            document.put("a", 3)?;

            let values: Vec<Value> = read_all(&collection)?.iter().map(|d| d.get("a")).collect();
            assert_eq!(values, vec![Value::I32(1), Value::I32(2)]);
            assert!(!document.has_id());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_identical_documents_are_both_stored() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            let first = collection.insert(doc! { a: 1 })?;
            let second = collection.insert(doc! { a: 1 })?;
            assert_ne!(first.first_id(), second.first_id());
            assert_eq!(collection.count_matching(field("a").eq(1))?, 2);

            let id = ObjectId::new();
            collection.insert(doc! { _id: id, a: 2 })?;
            collection.insert(doc! { _id: id, a: 3 })?;
            assert_eq!(collection.count_matching(field("_id").eq(id))?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_document_like_inputs() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            let mut map = BTreeMap::new();
            map.insert("b", 2);
            map.insert("a", 1);
            collection.insert(map)?;
            collection.insert(vec![("x", "y")])?;
            collection.insert_many([[("n", 1)], [("n", 2)]])?;

            let documents = read_all(&collection)?;
            assert_eq!(documents.len(), 4);
            let keys: Vec<&str> = documents[0].keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["_id", "a", "b"]);
            assert_eq!(documents[1].get("x"), Value::from("y"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unsupported_documents_are_rejected() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            let invalid: Vec<Document> = vec![
                doc! { "$set": 1 },
                doc! { outer: { "a.b": 1 } },
                doc! { list: [{ "$x": 1 }] },
                doc! { value: (Value::Unknown) },
                doc! { _id: [1, 2] },
            ];
            for document in invalid {
                let err = collection.insert(document).unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::ValidationError);
            }
            assert_eq!(collection.count()?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_oversized_document_is_rejected() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            let big = "x".repeat(5 * 1024 * 1024);
            let err = collection.insert(doc! { big: big }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_clear() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            collection.clear()?;
            for i in 0..20 {
                collection.insert(doc! { i: i })?;
            }
            collection.clear()?;
            assert!(collection.find(all())?.next().is_none());
            collection.clear()?;
            assert_eq!(collection.count()?, 0);
            Ok(())
        },
        cleanup,
    )
}

struct Sequence(AtomicI64);

impl PkInjector for Sequence {
    fn inject_pk(&self, document: &mut Document) -> DocStoreResult<bool> {
        if document.has_id() {
            return Ok(false);
        }
        document.put("_id", self.0.fetch_add(1, Ordering::Relaxed))?;
        Ok(true)
    }
}

#[test]
fn test_custom_pk_injector() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            collection.set_pk_injector(Arc::new(Sequence(AtomicI64::new(1))));

            collection.insert_many(vec![doc! { a: 1 }, doc! { a: 2 }])?;
            collection.insert(doc! { _id: "explicit", a: 3 })?;
            collection.upsert(field("a").eq(4), doc! { a: 4 })?;

            let ids: Vec<Value> = read_all(&collection)?.iter().map(|d| d.get("_id")).collect();
            assert_eq!(
                ids,
                vec![Value::I64(1), Value::I64(2), Value::from("explicit"), Value::I64(3)]
            );

            let fresh = ctx.client().collection("t1")?;
            let result = fresh.insert(doc! { a: 5 })?;
            assert!(result.first_id().and_then(Value::as_object_id).is_some());
            Ok(())
        },
        cleanup,
    )
}
