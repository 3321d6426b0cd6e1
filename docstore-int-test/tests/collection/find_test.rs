use docstore::collection::{limit_to, order_by, project, skip_by, FindOptions};
use docstore::common::SortOrder;
use docstore::errors::ErrorKind;
use docstore::filter::{all, field, query};
use docstore::{doc, Value};
use docstore_int_test::test_util::{cleanup, create_test_context, insert_numbered, run_test};

fn values(cursor: docstore::DocumentCursor, field_name: &str) -> Vec<Value> {
    cursor.map(|document| document.map(|d| d.get(field_name))).collect::<Result<_, _>>().unwrap()
}

#[test]
fn test_limit_and_skip() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 100)?;

            assert_eq!(collection.find_with_options(all(), limit_to(10))?.count(), 10);

            let mut skipped = collection.find_with_options(all(), skip_by(10))?;
            assert_eq!(skipped.next_document()?.get("a"), Value::I32(10));
            assert_eq!(skipped.count(), 89);

            let page = collection.find_with_options(all(), skip_by(95).limit(10))?;
            assert_eq!(values(page, "a"), (95..100).map(Value::I32).collect::<Vec<_>>());

            assert_eq!(collection.find_with_options(all(), skip_by(200))?.count(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 9)?;

            let cursor = collection
                .find_with_options(field("b").eq(1), order_by("a", SortOrder::Descending))?;
            assert_eq!(values(cursor, "a"), vec![Value::I32(7), Value::I32(4), Value::I32(1)]);

            let options = order_by("b", SortOrder::Descending)
                .sort_by("a", SortOrder::Ascending)
                .skip(1)
                .limit(3);
            let cursor = collection.find_with_options(all(), options)?;
            assert_eq!(values(cursor, "a"), vec![Value::I32(5), Value::I32(8), Value::I32(1)]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_projection() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("people")?;
            collection.insert(doc! {
                name: "Alice",
                address: { city: "Paris", zip: "75001" },
                age: 30
            })?;

            let mut cursor =
                collection.find_with_options(all(), project(&["address.city", "age"]))?;
            let document = cursor.next_document()?;
            let keys: Vec<&str> = document.keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["_id", "address", "age"]);
            assert_eq!(document.get("address"), Value::Document(doc! { city: "Paris" }));
            assert_eq!(document.get("name"), Value::Null);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_filters() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("people")?;
            collection.insert_many(vec![
                doc! { name: "Alice", age: 30, tags: ["admin", "dev"] },
                doc! { name: "Bob", age: 25, tags: ["dev"] },
                doc! { name: "Carol", age: 35.5 },
                doc! { name: "Dave" },
            ])?;

            assert_eq!(collection.count_matching(field("age").gte(30))?, 2);
            assert_eq!(collection.count_matching(field("tags").eq("dev"))?, 2);
            assert_eq!(collection.count_matching(field("age").eq(Value::Null))?, 1);
            assert_eq!(collection.count_matching(field("name").regex("^[AB]"))?, 2);
            assert_eq!(collection.count_matching(field("name").in_array(vec!["Bob", "Dave"]))?, 2);
            assert_eq!(collection.count_matching(field("age").lt(30).or(field("age").gt(35)))?, 2);
            assert_eq!(collection.count_matching(field("tags").eq("admin").not())?, 3);

            let filter = query(&doc! { age: { "$gt": 26, "$lt": 40 }, tags: "dev" })?;
            let found = collection.find_one(filter)?.expect("match");
            assert_eq!(found.get("name"), Value::from("Alice"));

            let err = collection.count_matching(field("name").regex("(")).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::FilterError);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_one() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            assert!(collection.find_one(all())?.is_none());
            insert_numbered(&collection, 5)?;
            let found = collection.find_one(field("a").gt(2))?.expect("match");
            assert_eq!(found.get("a"), Value::I32(3));
            assert_eq!(ctx.server().open_cursor_count(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_batch_size_override() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 10)?;
            let cursor = collection.find_with_options(all(), FindOptions::new().batch_size(3))?;
            assert_eq!(cursor.batch_size(), 3);
            assert_eq!(collection.find(all())?.batch_size(), ctx.client().config().batch_size());
            Ok(())
        },
        cleanup,
    )
}
