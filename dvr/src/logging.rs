use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Local;
use log::error;

use crate::framework::{LogFactory, RouterLog};
use crate::router::NodeId;

/// Prefixes a message with the local wall-clock time, `[%Y-%m-%d %H:%M:%S] message`
pub fn timestamped(message: &str) -> String {
    format!("[{}] {message}", Local::now().format("%Y-%m-%d %H:%M:%S"))
}

// region File

/// Writes `<dir>/<node>_output.txt` for every router
#[derive(Clone, Debug)]
pub struct FileLogFactory {
    pub dir: PathBuf,
}

impl FileLogFactory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, node: &NodeId) -> PathBuf {
        self.dir.join(format!("{node}_output.txt"))
    }
}

impl LogFactory for FileLogFactory {
    type Log = FileLog;

    fn open(&self, node: &NodeId) -> io::Result<FileLog> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(node);
        // truncate whatever a previous run left behind
        let mut writer = BufWriter::new(File::create(&path)?);
        writeln!(writer, "Router {node} Log")?;
        writeln!(writer, "{}", "=".repeat(20))?;
        writer.flush()?;
        Ok(FileLog {
            path,
            writer,
            failed: false,
        })
    }
}

#[derive(Debug)]
pub struct FileLog {
    path: PathBuf,
    writer: BufWriter<File>,
    failed: bool,
}

impl FileLog {
    fn check(&mut self, res: io::Result<()>) {
        if let Err(err) = res {
            // report once, the router keeps running without its log
            error!("Failed to write router log {}: {err}", self.path.display());
            self.failed = true;
        }
    }
}

impl RouterLog for FileLog {
    fn write_line(&mut self, line: &str) {
        if self.failed {
            return;
        }
        let res = writeln!(self.writer, "{line}");
        self.check(res);
    }

    fn flush(&mut self) {
        if self.failed {
            return;
        }
        let res = self.writer.flush();
        self.check(res);
    }
}

impl Drop for FileLog {
    fn drop(&mut self) {
        RouterLog::flush(self);
    }
}

// endregion

// region Memory

/// Lines collected per router, shared between the factory and every log it opened
pub type SharedLines = Arc<Mutex<BTreeMap<NodeId, Vec<String>>>>;

/// Keeps every router's log in memory
#[derive(Clone, Debug, Default)]
pub struct MemoryLogFactory {
    lines: SharedLines,
}

impl MemoryLogFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything `node` has logged so far
    pub fn lines_of(&self, node: &str) -> Vec<String> {
        let lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        lines.get(node).cloned().unwrap_or_default()
    }

    pub fn nodes(&self) -> Vec<NodeId> {
        let lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        lines.keys().cloned().collect()
    }
}

impl LogFactory for MemoryLogFactory {
    type Log = MemoryLog;

    fn open(&self, node: &NodeId) -> io::Result<MemoryLog> {
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        lines.insert(node.clone(), Vec::new());
        Ok(MemoryLog {
            node: node.clone(),
            lines: self.lines.clone(),
        })
    }
}

#[derive(Debug)]
pub struct MemoryLog {
    node: NodeId,
    lines: SharedLines,
}

impl RouterLog for MemoryLog {
    fn write_line(&mut self, line: &str) {
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        lines.entry(self.node.clone()).or_default().push(line.to_string());
    }
}

// endregion

/// Discards everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLogFactory;

#[derive(Clone, Copy, Debug, Default)]
pub struct NullLog;

impl LogFactory for NullLogFactory {
    type Log = NullLog;

    fn open(&self, _node: &NodeId) -> io::Result<NullLog> {
        Ok(NullLog)
    }
}

impl RouterLog for NullLog {
    fn write_line(&mut self, _line: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_prefix() {
        let line = timestamped("hello");
        // [YYYY-MM-DD HH:MM:SS] hello
        assert_eq!(line.len(), "[2024-01-01 00:00:00] hello".len());
        assert!(line.starts_with('['));
        assert!(line.ends_with("] hello"));
    }

    #[test]
    fn file_log_writes_header_and_lines() {
        let dir = tempfile::tempdir().unwrap();
        let factory = FileLogFactory::new(dir.path());
        let node = "A".to_string();
        let mut log = factory.open(&node).unwrap();
        log.write_line("[2024-01-01 00:00:00] first");
        log.write_line("[2024-01-01 00:00:01] second");
        log.flush();

        let content = fs::read_to_string(factory.path_for(&node)).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Router A Log",
                "====================",
                "[2024-01-01 00:00:00] first",
                "[2024-01-01 00:00:01] second",
            ]
        );
    }

    #[test]
    fn file_log_buffers_until_flushed() {
        let dir = tempfile::tempdir().unwrap();
        let factory = FileLogFactory::new(dir.path());
        let node = "C".to_string();
        let mut log = factory.open(&node).unwrap();
        log.write_line("pending");
        let content = fs::read_to_string(factory.path_for(&node)).unwrap();
        assert!(!content.contains("pending"));

        drop(log);
        let content = fs::read_to_string(factory.path_for(&node)).unwrap();
        assert!(content.ends_with("pending\n"));
    }

    #[test]
    fn file_log_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let factory = FileLogFactory::new(dir.path());
        let node = "B".to_string();
        factory.open(&node).unwrap().write_line("old");
        factory.open(&node).unwrap();

        let content = fs::read_to_string(factory.path_for(&node)).unwrap();
        assert!(!content.contains("old"));
    }

    #[test]
    fn memory_log_is_per_router() {
        let factory = MemoryLogFactory::new();
        let mut a = factory.open(&"A".to_string()).unwrap();
        let mut b = factory.open(&"B".to_string()).unwrap();
        a.write_line("a1");
        b.write_line("b1");
        a.write_line("a2");
        assert_eq!(factory.lines_of("A"), vec!["a1", "a2"]);
        assert_eq!(factory.lines_of("B"), vec!["b1"]);
        assert!(factory.lines_of("C").is_empty());
        assert_eq!(factory.nodes(), vec!["A".to_string(), "B".to_string()]);
    }
}
