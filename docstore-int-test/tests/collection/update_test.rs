use docstore::collection::{multi, upsert, UpdateOptions};
use docstore::errors::ErrorKind;
use docstore::filter::field;
use docstore::{doc, Value};
use docstore_int_test::test_util::{
    cleanup, create_test_context, insert_numbered, read_all, run_test,
};

#[test]
fn test_set_and_inc() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("people")?;
            collection.insert(doc! { name: "Alice", visits: 1 })?;

            let modifier = doc! {
                "$set": { status: "active", "address.city": "Paris" },
                "$inc": { visits: 2 }
            };
            let result =
                collection.update(field("name").eq("Alice"), &modifier, UpdateOptions::default())?;
            assert_eq!(result.affected_count(), 1);

            let alice = collection.find_one(field("name").eq("Alice"))?.expect("alice");
            assert_eq!(alice.get("status"), Value::from("active"));
            assert_eq!(alice.get("visits"), Value::I32(3));
            assert_eq!(alice.lookup("address.city"), Some(&Value::from("Paris")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_first_or_all() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 9)?;
            let modifier = doc! { "$set": { flagged: true } };

            let result = collection.update(field("b").eq(1), &modifier, UpdateOptions::default())?;
            assert_eq!(result.affected_count(), 1);
            assert_eq!(collection.count_matching(field("flagged").eq(true))?, 1);

            let result = collection.update(field("b").eq(1), &modifier, multi())?;
            assert_eq!(result.affected_count(), 3);
            assert_eq!(collection.count_matching(field("flagged").eq(true))?, 3);

            // updates keep the original order
            let order: Vec<Value> = read_all(&collection)?.iter().map(|d| d.get("a")).collect();
            assert_eq!(order, (0..9).map(Value::I32).collect::<Vec<_>>());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_upsert() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            let modifier = doc! { "$set": { name: "Bob" }, "$inc": { visits: 1 } };

            let result =
                collection.update(field("name").eq("Bob"), &modifier, UpdateOptions::default())?;
            assert_eq!(result.affected_count(), 0);
            assert_eq!(collection.count()?, 0);

            let result = collection.update(field("name").eq("Bob"), &modifier, upsert())?;
            assert_eq!(result.affected_count(), 1);
            let bob = collection.find_one(field("name").eq("Bob"))?.expect("bob");
            assert_eq!(bob.get("visits"), Value::I32(1));
            assert!(bob.has_id());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_modifier() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 3)?;

            for modifier in [
                doc! { "$push": { a: 1 } },
                doc! { a: 1 },
                doc! { "$inc": { a: "one" } },
                doc! { "$set": { _id: 1 } },
                doc! {},
            ] {
                let err = collection.update(field("a").eq(0), &modifier, multi()).unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::ValidationError);
            }
            assert_eq!(collection.count_matching(field("a").eq(0))?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_replace_and_upsert() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 3)?;
            let before = collection.find_one(field("a").eq(1))?.expect("document");

            let result = collection.replace(field("a").eq(1), doc! { a: 10, replaced: true })?;
            assert_eq!(result.affected_count(), 1);

            let after = collection.find_one(field("a").eq(10))?.expect("replaced");
            assert_eq!(after.id(), before.id());
            assert_eq!(after.get("name"), Value::Null);
            assert_eq!(after.keys().next().map(String::as_str), Some("_id"));

            let result = collection.replace(field("a").eq(99), doc! { a: 99 })?;
            assert_eq!(result.affected_count(), 0);

            let result = collection.upsert(field("a").eq(99), doc! { a: 99 })?;
            assert_eq!(result.affected_count(), 1);
            assert_eq!(collection.count()?, 4);
            Ok(())
        },
        cleanup,
    )
}
