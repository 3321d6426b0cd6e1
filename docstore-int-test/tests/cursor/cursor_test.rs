use docstore::collection::FindOptions;
use docstore::errors::ErrorKind;
use docstore::filter::{all, field};
use docstore::{doc, CursorState, Value};
use docstore_int_test::test_util::{cleanup, create_test_context, insert_numbered, run_test};

#[test]
fn test_large_result_in_small_batches() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 1000)?;

            let mut cursor = collection.find_with_options(all(), FindOptions::new().batch_size(7))?;
            let mut expected = 0;
            while let Some(document) = cursor.next() {
                assert!(cursor.buffered() <= 7);
                assert_eq!(document?.get("a"), Value::I32(expected));
                expected += 1;
            }
            assert_eq!(expected, 1000);
            assert_eq!(ctx.server().open_cursor_count(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_cursor_is_single_pass() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 5)?;

            let mut cursor = collection.find(all())?;
            assert_eq!(cursor.by_ref().count(), 5);
            assert_eq!(cursor.by_ref().count(), 0);

            let err = cursor.next_document().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::CursorExhausted);

            // a fresh query starts over
            assert_eq!(collection.find(all())?.count(), 5);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_state_transitions() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 4)?;

            let mut cursor = collection.find_with_options(all(), FindOptions::new().batch_size(2))?;
            assert_eq!(cursor.state(), CursorState::Created);
            assert_eq!(cursor.cursor_id(), 0);

            cursor.next_document()?;
            assert_eq!(cursor.state(), CursorState::Iterating);
            assert_ne!(cursor.cursor_id(), 0);

            for _ in 0..3 {
                cursor.next_document()?;
            }
            assert!(!cursor.has_next()?);
            assert_eq!(cursor.state(), CursorState::Exhausted);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_abandoned_cursors_are_released() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 50)?;
            let options = || FindOptions::new().batch_size(5);

            let mut first = collection.find_with_options(all(), options())?;
            let mut second = collection.find_with_options(field("b").eq(0), options())?;
            first.next_document()?;
            second.next_document()?;
            assert_eq!(ctx.server().open_cursor_count(), 2);

            drop(first);
            assert_eq!(ctx.server().open_cursor_count(), 1);

            second.close()?;
            assert_eq!(ctx.server().open_cursor_count(), 0);
            assert!(second.next().is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_snapshot_at_first_fetch() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 10)?;

            let mut unopened = collection.find(all())?;
            let mut opened = collection.find_with_options(all(), FindOptions::new().batch_size(3))?;
            opened.next_document()?;

            collection.insert(doc! { a: 10 })?;

            assert_eq!(opened.count(), 9);
            assert_eq!(unopened.by_ref().count(), 11);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_closed_client_stops_cursor() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 10)?;

            let mut cursor = collection.find_with_options(all(), FindOptions::new().batch_size(2))?;
            cursor.next_document()?;
            cursor.next_document()?;

            ctx.client().close()?;
            assert_eq!(ctx.server().open_cursor_count(), 0);

            let err = cursor.next().expect("error item").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
            assert!(cursor.next().is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_server_restart_ends_cursor() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            insert_numbered(&collection, 10)?;

            let mut cursor = collection.find_with_options(all(), FindOptions::new().batch_size(2))?;
            cursor.next_document()?;
            cursor.next_document()?;

            ctx.server().shutdown();
            ctx.server().start();

            let err = cursor.next().expect("error item").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::CursorExhausted);
            assert!(cursor.next().is_none());
            Ok(())
        },
        cleanup,
    )
}
