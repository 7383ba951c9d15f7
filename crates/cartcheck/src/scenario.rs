//! Scenario data providers.
//!
//! A [`ScenarioSource`] turns some backing store into a lazy sequence of
//! typed scenario records. Calling [`ScenarioSource::scenarios`] again
//! starts a fresh pass, so a source can be replayed. [`CsvSource`] reads a
//! header-first CSV file and refuses rows whose width differs from the
//! header; [`InMemorySource`] serves records built in code.
//!
//! [`ScenarioCache`] guarantees that a suite parses its data file at most
//! once per test process, however many tests consume it.

use crate::result::{CartcheckError, CartcheckResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Lazy iterator over decoded records
pub type Scenarios<'a, R> = Box<dyn Iterator<Item = CartcheckResult<R>> + 'a>;

/// Something that can produce scenario records, restartably
pub trait ScenarioSource<R> {
    /// Human-readable origin (a path, or a name)
    fn origin(&self) -> String;

    /// Start a new pass over the records
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be opened
    fn scenarios(&self) -> CartcheckResult<Scenarios<'_, R>>;

    /// Decode every record, failing on the first bad one
    ///
    /// # Errors
    ///
    /// Returns the first open or decode error
    fn load_all(&self) -> CartcheckResult<Vec<R>> {
        self.scenarios()?.collect()
    }
}

/// A record that names the test case it drives
pub trait Scenario {
    /// Stable case identifier (e.g. `TC_REG_001`)
    fn case_id(&self) -> &str;
}

/// Expected outcome tag shared by most data files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The flow completes
    #[serde(alias = "pass")]
    Success,
    /// The flow is rejected with a visible message
    #[serde(alias = "fail")]
    Error,
}

impl Outcome {
    /// Whether this is the success tag
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// CSV file with a header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    /// Read records from `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn data_error(&self, message: impl Into<String>) -> CartcheckError {
        CartcheckError::DataFile {
            path: self.path.display().to_string(),
            message: message.into(),
        }
    }

    fn describe(&self, err: &csv::Error) -> CartcheckError {
        let message = match err.kind() {
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => {
                let line = pos.as_ref().map_or(0, csv::Position::line);
                format!("line {line} has {len} fields, header has {expected_len}")
            }
            csv::ErrorKind::Deserialize { pos, err } => {
                let line = pos.as_ref().map_or(0, csv::Position::line);
                format!("line {line}: {err}")
            }
            _ => err.to_string(),
        };
        self.data_error(message)
    }
}

impl<R> ScenarioSource<R> for CsvSource
where
    R: DeserializeOwned + 'static,
{
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    fn scenarios(&self) -> CartcheckResult<Scenarios<'_, R>> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.describe(&e))?;
        tracing::debug!(path = %self.path.display(), "reading scenarios");
        Ok(Box::new(
            reader
                .into_deserialize::<R>()
                .map(move |row| row.map_err(|e| self.describe(&e))),
        ))
    }
}

/// Records built in code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemorySource<R> {
    name: String,
    records: Vec<R>,
}

impl<R> InMemorySource<R> {
    /// Serve `records` under `name`
    #[must_use]
    pub fn new(name: impl Into<String>, records: Vec<R>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

impl<R: Clone> ScenarioSource<R> for InMemorySource<R> {
    fn origin(&self) -> String {
        self.name.clone()
    }

    fn scenarios(&self) -> CartcheckResult<Scenarios<'_, R>> {
        Ok(Box::new(self.records.iter().cloned().map(Ok)))
    }
}

/// Once-per-process cache of a loaded data set
///
/// Failures are cached too, so every consumer of a malformed file sees the
/// same `DataFile` error without re-reading it.
#[derive(Debug)]
pub struct ScenarioCache<R> {
    cell: OnceLock<Result<Vec<R>, (String, String)>>,
    loads: AtomicUsize,
}

impl<R> Default for ScenarioCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ScenarioCache<R> {
    /// Create an empty cache (usable in a `static`)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            loads: AtomicUsize::new(0),
        }
    }

    /// Load through `source` on first use, then serve the cached records
    ///
    /// # Errors
    ///
    /// Returns the (cached) `DataFile` error of a malformed source
    pub fn get_or_load<S>(&self, source: &S) -> CartcheckResult<&[R]>
    where
        S: ScenarioSource<R>,
    {
        let loaded = self.cell.get_or_init(|| {
            self.loads.fetch_add(1, Ordering::SeqCst);
            let origin = source.origin();
            match source.load_all() {
                Ok(records) => {
                    tracing::info!(origin = %origin, count = records.len(), "scenarios loaded");
                    Ok(records)
                }
                Err(CartcheckError::DataFile { path, message }) => Err((path, message)),
                Err(other) => Err((origin, other.to_string())),
            }
        });
        match loaded {
            Ok(records) => Ok(records.as_slice()),
            Err((path, message)) => Err(CartcheckError::DataFile {
                path: path.clone(),
                message: message.clone(),
            }),
        }
    }

    /// Number of times the source was actually read
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
    struct LoginRow {
        test_id: String,
        email: String,
        password: String,
        expected_result: Outcome,
        expected_error: Option<String>,
    }

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const GOOD: &str = "test_id,email,password,expected_result,expected_error\n\
TC_LOGIN_001,john.doe@example.com,Test@1234,pass,\n\
TC_LOGIN_002,,validpass,fail,Warning: No match for E-Mail Address and/or Password.\n";

    mod csv_tests {
        use super::*;

        #[test]
        fn test_reads_typed_records() {
            let file = csv_file(GOOD);
            let rows: Vec<LoginRow> = CsvSource::new(file.path()).load_all().unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].expected_result, Outcome::Success);
            assert_eq!(rows[0].expected_error, None);
            assert_eq!(rows[1].email, "");
            assert_eq!(rows[1].expected_result, Outcome::Error);
            assert!(rows[1].expected_error.as_deref().unwrap().contains("No match"));
        }

        #[test]
        fn test_source_is_lazy_and_restartable() {
            let file = csv_file(GOOD);
            let source = CsvSource::new(file.path());
            let mut first = ScenarioSource::<LoginRow>::scenarios(&source).unwrap();
            assert_eq!(first.next().unwrap().unwrap().test_id, "TC_LOGIN_001");
            let again: Vec<LoginRow> = source.load_all().unwrap();
            assert_eq!(again[0].test_id, "TC_LOGIN_001");
            assert_eq!(first.next().unwrap().unwrap().test_id, "TC_LOGIN_002");
        }

        #[test]
        fn test_column_mismatch_fails_fast() {
            let file = csv_file(
                "test_id,email,password,expected_result,expected_error\n\
TC_LOGIN_001,a@b.c,pw,pass,\n\
TC_LOGIN_002,a@b.c,fail\n",
            );
            let err = ScenarioSource::<LoginRow>::load_all(&CsvSource::new(file.path())).unwrap_err();
            match err {
                CartcheckError::DataFile { message, .. } => {
                    assert!(message.contains("line 3"), "{message}");
                    assert!(message.contains("3 fields"), "{message}");
                    assert!(message.contains("header has 5"), "{message}");
                }
                other => panic!("unexpected {other}"),
            }
        }

        #[test]
        fn test_bad_outcome_tag() {
            let file = csv_file(
                "test_id,email,password,expected_result,expected_error\n\
TC_LOGIN_001,a@b.c,pw,maybe,\n",
            );
            let err = ScenarioSource::<LoginRow>::load_all(&CsvSource::new(file.path())).unwrap_err();
            assert!(matches!(err, CartcheckError::DataFile { .. }));
        }

        #[test]
        fn test_missing_file() {
            let err = ScenarioSource::<LoginRow>::load_all(&CsvSource::new("/nonexistent/login.csv"))
                .unwrap_err();
            assert!(err.to_string().contains("/nonexistent/login.csv"));
        }
    }

    mod cache_tests {
        use super::*;

        #[test]
        fn test_loads_once() {
            let file = csv_file(GOOD);
            let source = CsvSource::new(file.path());
            let cache: ScenarioCache<LoginRow> = ScenarioCache::new();
            assert_eq!(cache.get_or_load(&source).unwrap().len(), 2);
            assert_eq!(cache.get_or_load(&source).unwrap().len(), 2);
            assert_eq!(cache.load_count(), 1);
        }

        #[test]
        fn test_failure_is_cached() {
            let cache: ScenarioCache<LoginRow> = ScenarioCache::new();
            let source = CsvSource::new("/nonexistent/login.csv");
            assert!(cache.get_or_load(&source).is_err());
            assert!(cache.get_or_load(&source).is_err());
            assert_eq!(cache.load_count(), 1);
        }

        #[test]
        fn test_in_memory_source() {
            let source = InMemorySource::new("inline", vec![1, 2, 3]);
            let cache = ScenarioCache::new();
            assert_eq!(cache.get_or_load(&source).unwrap(), &[1, 2, 3]);
            assert_eq!(source.origin(), "inline");
        }
    }
}
