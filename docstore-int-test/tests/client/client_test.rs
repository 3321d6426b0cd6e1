use docstore::collection::CollectionOptions;
use docstore::errors::ErrorKind;
use docstore::filter::all;
use docstore::{doc, CollectionMode, DocStoreClient, Value};
use docstore_int_test::test_util::{
    cleanup, create_named_test_context, create_test_context, read_all, run_test,
};

#[test]
fn test_connect_clear_insert_find_script() {
    run_test(
        || create_named_test_context("test"),
        |ctx| {
            let collection = ctx.client().collection("t1")?;
            collection.clear()?;

            let mut built = docstore::Document::new();
            built.put("a", 1)?;
            collection.insert(built)?;
            collection.insert([("a", 2)])?;

            let documents = read_all(&collection)?;
            assert_eq!(documents.len(), 2);
            assert_eq!(documents[0].get("a"), Value::I32(1));
            assert_eq!(documents[1].get("a"), Value::I32(2));
            for document in &documents {
                println!("{}", document);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_missing_collection_is_created_empty() {
    run_test(
        create_test_context,
        |ctx| {
            let client = ctx.client();
            assert!(!client.has_collection("fresh")?);
            let collection = client.collection("fresh")?;
            assert!(client.has_collection("fresh")?);
            assert!(collection.find(all())?.next().is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_strict_mode() {
    run_test(
        create_test_context,
        |ctx| {
            let client = ctx.client();
            let err = client.collection_with_mode("missing", CollectionMode::Strict).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::NotFound);

            let strict = DocStoreClient::builder()
                .strict_mode(true)
                .connect(ctx.server(), ctx.database_name())?;
            assert_eq!(strict.collection("missing").unwrap_err().kind(), &ErrorKind::NotFound);

            strict.create_collection("created", CollectionOptions::default())?;
            let err = strict
                .create_collection("created", CollectionOptions::default())
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);

            let collection = strict.collection("created")?;
            collection.insert(doc! { a: 1 })?;
            assert_eq!(collection.count()?, 1);
            strict.close()?;
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_collection_names() {
    run_test(
        create_test_context,
        |ctx| {
            let client = ctx.client();
            for name in ["orders", "customers", "audit.log"] {
                client.collection(name)?;
            }
            assert_eq!(client.collection_names()?, vec!["audit.log", "customers", "orders"]);

            client.drop_collection("orders")?;
            client.drop_collection("orders")?;
            assert_eq!(client.collection_names()?, vec!["audit.log", "customers"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_databases_are_isolated() {
    run_test(
        create_test_context,
        |ctx| {
            let other = DocStoreClient::connect(ctx.server(), "other")?;
            other.collection("shared")?.insert(doc! { a: 1 })?;
            ctx.client().collection("shared")?.insert(doc! { a: 2 })?;

            ctx.client().drop_database()?;
            assert!(ctx.client().collection_names()?.is_empty());
            assert_eq!(other.collection("shared")?.count()?, 1);
            other.close()?;
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_names() {
    run_test(
        create_test_context,
        |ctx| {
            let err = DocStoreClient::connect(ctx.server(), "my db").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ConnectionError);

            let err = ctx.client().collection("$cmd").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_closed_client() {
    run_test(
        create_test_context,
        |ctx| {
            let client = DocStoreClient::connect(ctx.server(), ctx.database_name())?;
            let collection = client.collection("t1")?;
            client.close()?;
            assert!(client.is_closed());

            assert_eq!(client.collection_names().unwrap_err().kind(), &ErrorKind::InvalidOperation);
            let err = collection.insert(doc! { a: 1 }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
            assert!(!ctx.client().is_closed());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_database_names_and_validation() {
    run_test(
        || create_named_test_context("test"),
        |ctx| {
            let client = ctx.client();
            assert!(client.database_names()?.is_empty());

            let collection = client.collection("users")?;
            collection.insert(doc! { name: "Alice" })?;
            let other = DocStoreClient::connect(ctx.server(), "archive")?;
            other.collection("old")?;
            assert_eq!(client.database_names()?, vec!["archive", "test"]);

            assert!(client.validate_collection("users")?);
            assert!(!client.validate_collection("missing")?);

            other.drop_database()?;
            other.close()?;
            assert_eq!(client.database_names()?, vec!["test"]);
            Ok(())
        },
        cleanup,
    )
}
