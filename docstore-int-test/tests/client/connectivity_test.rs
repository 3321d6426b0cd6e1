use docstore::errors::ErrorKind;
use docstore::filter::all;
use docstore::{doc, DocStoreClient};
use docstore_int_test::test_util::{cleanup, create_test_context, insert_numbered, run_test};

#[test]
fn test_operations_fail_while_unavailable() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            collection.insert(doc! { a: 1 })?;

            ctx.server().shutdown();
            assert_eq!(collection.clear().unwrap_err().kind(), &ErrorKind::StoreUnavailable);
            let err = collection.insert(doc! { a: 2 }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StoreUnavailable);
            assert_eq!(collection.count().unwrap_err().kind(), &ErrorKind::StoreUnavailable);

            let err = DocStoreClient::connect(ctx.server(), "test").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ConnectionError);

            ctx.server().start();
            assert_eq!(collection.count()?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_iteration_ends_after_connectivity_loss() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 50)?;

            let mut cursor = collection
                .find_with_options(all(), docstore::collection::FindOptions::new().batch_size(10))?;
            for _ in 0..10 {
                cursor.next_document()?;
            }

            ctx.server().shutdown();
            let err = cursor.next().unwrap().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StoreUnavailable);
            assert!(cursor.next().is_none());

            ctx.server().start();
            assert!(cursor.next().is_none());
            assert_eq!(cursor.next_document().unwrap_err().kind(), &ErrorKind::CursorExhausted);
            assert_eq!(collection.find(all())?.count(), 50);
            Ok(())
        },
        cleanup,
    )
}
