//! Property tests for query pagination and deletion.

use loginsight_core::{Config, DeleteConditions, LogQuery, LogStore};
use loginsight_storage::{
    FileStat, InMemoryLineStore, LineSnapshot, LineStore, StorageResult, StoreLock,
};
use proptest::prelude::*;
use std::sync::Arc;

/// A line store shared between the test and the store under test.
#[derive(Clone)]
struct Shared(Arc<InMemoryLineStore>);

impl LineStore for Shared {
    fn load_snapshot(&self) -> StorageResult<LineSnapshot> {
        self.0.load_snapshot()
    }
    fn replace_lines(&self, lines: &[String]) -> StorageResult<()> {
        self.0.replace_lines(lines)
    }
    fn replace_since(&self, lines: &[String], loaded_len: u64) -> StorageResult<usize> {
        self.0.replace_since(lines, loaded_len)
    }
    fn append_line(&self, line: &str) -> StorageResult<()> {
        self.0.append_line(line)
    }
    fn stat(&self) -> StorageResult<Option<FileStat>> {
        self.0.stat()
    }
    fn lock_exclusive(&self) -> StorageResult<StoreLock> {
        self.0.lock_exclusive()
    }
}

fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (0u32..40, "[a-z]{0,6}").prop_map(|(day, word)| {
            format!(
                r#"{{"time":"2024-01-{:02}T00:00:00Z","msg":"{word}"}}"#,
                day % 28 + 1
            )
        }),
        1 => "[a-z]{1,6}".prop_map(|word| format!(r#"{{"msg":"{word}"}}"#)),
        1 => "[a-z ]{0,5}[a-z]".prop_map(|junk| format!("junk {junk}")),
    ]
}

fn store_with(lines: &[String]) -> (LogStore, Arc<InMemoryLineStore>) {
    let mut content = lines.join("\n");
    content.push('\n');
    let memory = Arc::new(InMemoryLineStore::with_content(content));
    let shared = Shared(Arc::clone(&memory));
    let store = LogStore::with_stores(Config::default(), move |_| Box::new(shared.clone()));
    (store, memory)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn pages_partition_the_result(
        lines in proptest::collection::vec(line_strategy(), 0..40),
        limit in 1usize..8,
        search in prop_oneof![Just(String::new()), "[a-z]".prop_map(String::from)],
    ) {
        let (store, _) = store_with(&lines);
        let base = LogQuery::new().search(search).limit(usize::MAX);
        let all = store.query("general", &base).unwrap();

        let first = store.query("general", &base.clone().limit(limit)).unwrap();
        prop_assert_eq!(first.total, all.total);

        let mut collected = Vec::new();
        for page in 1..=first.total_pages {
            let result = store
                .query("general", &base.clone().page(page).limit(limit))
                .unwrap();
            prop_assert!(result.entries.len() <= limit);
            collected.extend(result.entries);
        }
        prop_assert_eq!(collected, all.entries);

        let beyond = store
            .query("general", &base.clone().page(first.total_pages + 1).limit(limit))
            .unwrap();
        prop_assert!(beyond.entries.is_empty());
    }

    #[test]
    fn query_is_idempotent(
        lines in proptest::collection::vec(line_strategy(), 0..30),
        page in 1usize..4,
    ) {
        let (store, _) = store_with(&lines);
        let query = LogQuery::new().page(page).limit(3);

        let first = store.query("general", &query).unwrap();
        let second = store.query("general", &query).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn deletes_preserve_opaque_lines(
        lines in proptest::collection::vec(line_strategy(), 1..30),
        search in "[a-z]{1,2}",
    ) {
        let (store, memory) = store_with(&lines);
        let opaque_before: Vec<String> =
            lines.iter().filter(|l| l.starts_with("junk")).cloned().collect();

        let before = store.query("general", &LogQuery::new().limit(usize::MAX)).unwrap().total;
        let outcome = store
            .delete_where("general", &DeleteConditions::new().search(search))
            .unwrap();
        let after = store.query("general", &LogQuery::new().limit(usize::MAX)).unwrap().total;
        prop_assert_eq!(before - outcome.deleted_count, after);

        let opaque_after: Vec<String> = memory
            .load_lines()
            .unwrap()
            .into_iter()
            .filter(|l| l.starts_with("junk"))
            .collect();
        prop_assert_eq!(opaque_before, opaque_after);
    }
}
