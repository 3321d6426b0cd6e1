use docstore::errors::ErrorKind;
use docstore::filter::{all, by_id, field};
use docstore::{doc, Value};
use docstore_int_test::test_util::{
    cleanup, create_test_context, insert_numbered, read_all, run_test,
};

#[test]
fn test_remove_one_at_a_time() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 10)?;

            for i in 0..10 {
                let result = collection.remove(field("a").eq(i))?;
                assert_eq!(result.affected_count(), 1);
                assert_eq!(collection.count()?, (9 - i) as u64);
            }
            assert_eq!(collection.remove(all())?.affected_count(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_many() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 9)?;

            let result = collection.remove(field("b").eq(0))?;
            assert_eq!(result.affected_count(), 3);

            let remaining: Vec<Value> = read_all(&collection)?.iter().map(|d| d.get("a")).collect();
            assert_eq!(remaining, [1, 2, 4, 5, 7, 8].map(Value::I32).to_vec());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_one() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 9)?;

            let result = collection.remove_one(field("b").eq(2))?;
            assert_eq!(result.affected_count(), 1);
            assert_eq!(collection.count_matching(field("b").eq(2))?, 2);
            assert!(collection.find_one(field("a").eq(2))?.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_by_id() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            let result = collection.insert(doc! { a: 1 })?;
            collection.insert(doc! { a: 1 })?;

            let id = result
                .first_id()
                .and_then(Value::as_object_id)
                .copied()
                .expect("generated id");
            assert_eq!(collection.remove(by_id(id))?.affected_count(), 1);
            assert_eq!(collection.count()?, 1);
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
            insert_numbered(&collection, 5)?;
            collection.clear()?;
            assert_eq!(collection.count()?, 0);
            assert!(ctx.client().has_collection("t1")?);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_while_unavailable() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 3)?;

            ctx.server().shutdown();
            let err = collection.remove(all()).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StoreUnavailable);

            ctx.server().start();
            assert_eq!(collection.count()?, 3);
            Ok(())
        },
        cleanup,
    )
}
