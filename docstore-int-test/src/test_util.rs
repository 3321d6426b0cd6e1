use docstore::collection::Document;
use docstore::errors::{DocStoreError, DocStoreResult, ErrorKind};
use docstore::filter::all;
use docstore::store::InMemoryServer;
use docstore::{doc, DocStoreClient, DocStoreCollection};
use std::backtrace::Backtrace;
use std::thread;
use std::time::{Duration, Instant};

/// Runs a test with retry logic and error handling.
///
/// `after` runs whether or not the test succeeded. A failing attempt is
/// retried a few times before the test panics with the last error.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> DocStoreResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> DocStoreResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> DocStoreResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;
    let mut last_backtrace: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => after(ctx)
                        .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();
        let failure = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => {
                last_backtrace = Some(bt);
                e
            }
            Err(panic_err) => {
                let message = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                last_backtrace = Some(Backtrace::capture().to_string());
                format!("Panic: {}", message)
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("Error: {}", failure);
            eprintln!("Retrying in {}ms...\n", 100 * attempt);
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
        last_error = Some(failure);
    }

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {} attempts", MAX_RETRIES);
    eprintln!("Last error: {}", last_error.as_deref().unwrap_or("Unknown"));
    if let Some(bt) = &last_backtrace {
        if !bt.is_empty() && !bt.contains("disabled") {
            eprintln!("\nBacktrace:\n{}", bt);
        }
    }
    eprintln!("=====================================================\n");

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

/// A private server plus a client connected to a fresh database on it.
#[derive(Clone)]
pub struct TestContext {
    server: InMemoryServer,
    client: DocStoreClient,
}

impl TestContext {
    pub fn new(server: InMemoryServer, client: DocStoreClient) -> Self {
        Self { server, client }
    }

    pub fn server(&self) -> InMemoryServer {
        self.server.clone()
    }

    pub fn client(&self) -> DocStoreClient {
        self.client.clone()
    }

    pub fn database_name(&self) -> &str {
        self.client.database_name()
    }
}

pub fn random_database_name() -> String {
    format!("test_{}", uuid::Uuid::new_v4().simple())
}

pub fn create_test_context() -> DocStoreResult<TestContext> {
    let server = InMemoryServer::new();
    let client = DocStoreClient::connect(server.clone(), &random_database_name())?;
    Ok(TestContext::new(server, client))
}

/// Same as [create_test_context] with a fixed database name.
pub fn create_named_test_context(database: &str) -> DocStoreResult<TestContext> {
    let server = InMemoryServer::new();
    let client = DocStoreClient::connect(server.clone(), database)?;
    Ok(TestContext::new(server, client))
}

/// Brings the server back if a test stopped it, then drops the test database
/// and closes the client.
pub fn cleanup(ctx: TestContext) -> DocStoreResult<()> {
    let server = ctx.server();
    server.start();

    let client = ctx.client();
    if !client.is_closed() {
        if let Err(e) = client.drop_database() {
            eprintln!("Warning: Failed to drop database {}: {:?}", ctx.database_name(), e);
        }
    }
    client.close()?;

    if server.open_cursor_count() != 0 {
        return Err(DocStoreError::new(
            &format!("{} server cursors were left open", server.open_cursor_count()),
            ErrorKind::InternalError,
        ));
    }
    Ok(())
}

/// Inserts `count` documents `{ a: i, b: i % 3, name: "name-i" }`.
pub fn insert_numbered(collection: &DocStoreCollection, count: i32) -> DocStoreResult<()> {
    collection.insert_many(
        (0..count).map(|i| doc! { a: i, b: (i % 3), name: (format!("name-{}", i)) }),
    )?;
    Ok(())
}

/// Reads every document of the collection in store order.
pub fn read_all(collection: &DocStoreCollection) -> DocStoreResult<Vec<Document>> {
    collection.find(all())?.collect()
}
