// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::Mutex;

use log::Level;
use log::LevelFilter;
use logkeep::Append;
use logkeep::ErrorArchive;
use logkeep::LoggerRepository;
use logkeep::archive::ErrorKind;
use logkeep::dispatch;
use tempfile::TempDir;

#[derive(Debug, Clone)]
struct Line {
    level: Level,
    target: String,
    message: String,
    file: Option<String>,
    kvs: Vec<(String, String)>,
}

impl Line {
    fn kv(&self, key: &str) -> Option<&str> {
        self.kvs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Line>>>);

impl Recorder {
    fn lines(&self) -> Vec<Line> {
        self.0.lock().unwrap().clone()
    }
}

struct KvCollector(Vec<(String, String)>);

impl<'kvs> log::kv::VisitSource<'kvs> for KvCollector {
    fn visit_pair(
        &mut self,
        key: log::kv::Key<'kvs>,
        value: log::kv::Value<'kvs>,
    ) -> Result<(), log::kv::Error> {
        self.0.push((key.to_string(), value.to_string()));
        Ok(())
    }
}

impl Append for Recorder {
    fn append(&self, record: &log::Record) -> anyhow::Result<()> {
        let mut kvs = KvCollector(vec![]);
        record.key_values().visit(&mut kvs)?;
        self.0.lock().unwrap().push(Line {
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            file: record.file().map(ToOwned::to_owned),
            kvs: kvs.0,
        });
        Ok(())
    }
}

#[derive(Debug)]
struct ChargeError {
    source: io::Error,
}

impl fmt::Display for ChargeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("payment gateway unreachable")
    }
}

impl std::error::Error for ChargeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

fn charge_error() -> ChargeError {
    ChargeError {
        source: io::Error::new(io::ErrorKind::TimedOut, "connect timed out"),
    }
}

fn setup(debug: bool) -> (TempDir, Recorder, LoggerRepository) {
    let dir = TempDir::new().expect("failed to create a temporary directory");
    let recorder = Recorder::default();
    let backend = dispatch::builder()
        .filter(LevelFilter::Trace)
        .append(recorder.clone())
        .build();
    let repository =
        LoggerRepository::with_backend(ErrorArchive::new(dir.path().join("errors")), debug, backend);
    (dir, recorder, repository)
}

#[test]
fn test_messages_reach_backend_under_logger_name() {
    let (_dir, recorder, loggers) = setup(false);
    let logger = loggers.get("billing");

    logger.info("charging card");
    logger.warn_with("retrying", &charge_error());

    let lines = recorder.lines();
    assert_eq!(lines.len(), 2);

    assert_eq!(lines[0].level, Level::Info);
    assert_eq!(lines[0].target, "billing");
    assert_eq!(lines[0].message, "charging card");
    assert_eq!(lines[0].file.as_deref(), Some(file!()));
    assert!(lines[0].kvs.is_empty());

    assert_eq!(lines[1].level, Level::Warn);
    assert_eq!(lines[1].kv("error"), Some("payment gateway unreachable"));
    assert!(loggers.errors().is_empty().unwrap());
}

#[test]
fn test_same_name_same_logger() {
    let (_dir, _recorder, loggers) = setup(false);
    let first = loggers.get("db");
    let second = loggers.get("db");
    assert!(Arc::ptr_eq(&first, &second));

    loggers.get("http");
    assert_eq!(loggers.names(), vec!["db".to_string(), "http".to_string()]);

    let typed = loggers.get_for::<ChargeError>();
    assert_eq!(typed.name(), std::any::type_name::<ChargeError>());
}

#[test]
fn test_debug_records_need_debug_mode() {
    let (_dir, recorder, loggers) = setup(false);
    let logger = loggers.get("db");

    logger.debug("query plan");
    logger.debug_with("slow query", &charge_error());
    assert!(recorder.lines().is_empty());

    logger.set_debug(true);
    logger.debug("query plan");
    let lines = recorder.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].level, Level::Debug);
}

#[test]
fn test_error_is_archived_outside_debug_mode() {
    let (_dir, recorder, loggers) = setup(false);
    let logger = loggers.get("billing");

    let id = logger
        .error_with("charge failed", &charge_error())
        .expect("error should be archived");

    let archived = loggers.errors().read(id).unwrap();
    assert_eq!(archived.kind(), ErrorKind::Error);
    assert_eq!(archived.logger(), "billing");
    assert_eq!(archived.context(), Some("charge failed"));
    assert_eq!(archived.message(), "payment gateway unreachable");
    assert_eq!(archived.causes(), ["connect timed out"]);

    let lines = recorder.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].level, Level::Error);
    assert_eq!(lines[0].message, "charge failed");
    assert_eq!(lines[0].kv("error_id"), Some(id.to_string().as_str()));

    let id = logger.error("refund rejected").unwrap();
    assert_eq!(loggers.errors().read(id).unwrap().kind(), ErrorKind::Message);

    let id = logger.error_from(&charge_error()).unwrap();
    assert_eq!(recorder.lines()[2].message, "payment gateway unreachable");
    assert_eq!(loggers.errors().read(id).unwrap().context(), None);

    assert_eq!(loggers.errors().len().unwrap(), 3);
}

#[test]
fn test_error_is_only_logged_in_debug_mode() {
    let (_dir, recorder, loggers) = setup(true);
    let logger = loggers.get("billing");

    assert_eq!(logger.error("card declined"), None);
    assert_eq!(logger.error_from(&charge_error()), None);

    let lines = recorder.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| line.kv("error_id").is_none()));
    assert!(loggers.errors().is_empty().unwrap());
}

#[test]
fn test_archive_failure_is_logged() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("errors");
    std::fs::write(&blocker, "a file where the directory should be").unwrap();

    let recorder = Recorder::default();
    let backend = dispatch::builder().append(recorder.clone()).build();
    let loggers = LoggerRepository::with_backend(ErrorArchive::new(&blocker), false, backend);

    assert_eq!(loggers.get("billing").error("card declined"), None);

    let lines = recorder.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].message, "failed to archive error");
    assert!(lines[0].kv("error").is_some());
    assert_eq!(lines[1].message, "card declined");
}

#[test]
fn test_root_debug_cascades() {
    let (_dir, recorder, loggers) = setup(true);
    let db = loggers.get("db");
    let http = loggers.get("http");

    loggers.root().set_debug(false);
    assert!(!loggers.root().is_debug());
    assert!(!db.is_debug());
    assert!(!http.is_debug());
    assert!(!loggers.is_debug());
    assert!(!loggers.get("cache").is_debug());

    loggers.root().set_debug(true);
    assert!(db.is_debug() && http.is_debug());

    loggers.root().info("switched to debug");
    let lines = recorder.lines();
    assert_eq!(lines.last().unwrap().target, "root");
}

#[test]
fn test_backend_filter_applies() {
    let dir = TempDir::new().unwrap();
    let recorder = Recorder::default();
    let backend = dispatch::builder()
        .filter("warn,billing=info")
        .append(recorder.clone())
        .build();
    let loggers = LoggerRepository::with_backend(ErrorArchive::new(dir.path()), false, backend);

    loggers.get("db").info("dropped");
    loggers.get("billing").info("kept");
    loggers.get("db").warn("kept too");

    let messages = recorder
        .lines()
        .into_iter()
        .map(|line| line.message)
        .collect::<Vec<_>>();
    assert_eq!(messages, ["kept", "kept too"]);
}

#[test]
fn test_run_reports_panics() {
    let (_dir, recorder, loggers) = setup(false);

    assert_eq!(loggers.run(|| 6 * 7), Some(42));
    assert!(recorder.lines().is_empty());

    let value: Option<u32> = loggers.run(|| panic!("worker crashed"));
    assert_eq!(value, None);

    let lines = recorder.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].target, "root");
    assert_eq!(lines[0].message, "panicked: worker crashed");

    let ids = loggers.errors().list().unwrap();
    assert_eq!(ids.len(), 1);
    let archived = loggers.errors().read(ids[0]).unwrap();
    assert_eq!(archived.kind(), ErrorKind::Panic);
    assert_eq!(archived.message(), "worker crashed");
    assert_eq!(archived.logger(), "root");
}

#[test]
fn test_panics_are_only_logged_in_debug_mode() {
    let (_dir, recorder, loggers) = setup(true);

    let value: Option<u32> = loggers.run(|| panic!("worker crashed"));
    assert_eq!(value, None);

    let payload: Box<dyn std::any::Any + Send> = Box::new(format!("job {} failed", 7));
    assert_eq!(loggers.get("jobs").error_panic(&*payload), None);

    let messages = recorder
        .lines()
        .into_iter()
        .map(|line| line.message)
        .collect::<Vec<_>>();
    assert_eq!(messages, ["panicked: worker crashed", "panicked: job 7 failed"]);
    assert!(loggers.errors().is_empty().unwrap());
}

#[test]
fn test_run_result_reports_errors() {
    let (_dir, _recorder, loggers) = setup(false);

    assert_eq!(loggers.run_result(|| Ok::<_, ChargeError>("charged")), Some("charged"));
    assert_eq!(loggers.run_result(|| Err::<(), _>(charge_error())), None);

    let ids = loggers.errors().list().unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(
        loggers.errors().read(ids[0]).unwrap().message(),
        "payment gateway unreachable"
    );
}
