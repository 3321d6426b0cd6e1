use docstore::errors::ErrorKind;
use docstore::{doc, CollectionOptions, Value};
use docstore_int_test::test_util::{
    cleanup, create_test_context, insert_numbered, read_all, run_test,
};

#[test]
fn test_capped_keeps_newest() {
    run_test(
        create_test_context,
        |ctx| {
            let options = CollectionOptions::new().capped(2000).max_documents(10);
            let collection = ctx.client().create_collection("capped", options)?;

            insert_numbered(&collection, 20)?;
            assert!(collection.count()? <= 10);

            let retained = read_all(&collection)?;
            assert_eq!(retained.last().map(|d| d.get("a")), Some(Value::I32(19)));
            assert!(retained.windows(2).all(|pair| pair[0].get("a") < pair[1].get("a")));

            let reported = collection.options()?;
            assert!(reported.is_capped());
            assert_eq!(reported.size_limit(), Some(2000));
            assert_eq!(reported.get_max_documents(), Some(10));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_capped_by_size() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx
                .client()
                .create_collection("capped", CollectionOptions::new().capped(2000))?;

            for i in 0..100 {
                collection.insert(doc! { a: i, padding: ("x".repeat(50)) })?;
            }
            let retained = read_all(&collection)?;
            assert!(retained.len() < 100);
            assert_eq!(retained.last().map(|d| d.get("a")), Some(Value::I32(99)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_document_larger_than_cap() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx
                .client()
                .create_collection("capped", CollectionOptions::new().capped(100))?;
            let err = collection.insert(doc! { padding: ("x".repeat(500)) }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);
            assert_eq!(collection.count()?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_uncapped_options() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("plain")?;
            assert!(!collection.options()?.is_capped());

            let err = ctx
                .client()
                .create_collection("bad", CollectionOptions::new().max_documents(5))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);
            Ok(())
        },
        cleanup,
    )
}
