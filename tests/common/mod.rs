//! Common test utilities and helpers
#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for a temporary directory of record files
pub struct TestContextBuilder {
    temp_dir: TempDir,
    initial_files: Vec<(PathBuf, String)>,
}

impl TestContextBuilder {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
            initial_files: Vec::new(),
        })
    }

    /// Add a file with literal content
    pub fn with_file(mut self, path: impl AsRef<Path>, content: &str) -> Self {
        self.initial_files
            .push((path.as_ref().to_path_buf(), content.to_string()));
        self
    }

    /// Add a call-record file with one row per user id
    pub fn with_users(self, path: impl AsRef<Path>, user_ids: &[&str]) -> Self {
        let content = call_records(user_ids);
        self.with_file(path, &content)
    }

    /// Add an activity log with one row per `ACTIVITY_TIME` value
    pub fn with_activity_log(self, path: impl AsRef<Path>, times: &[&str]) -> Self {
        let content = activity_log(times);
        self.with_file(path, &content)
    }

    pub fn build(self) -> Result<TestContext> {
        let path = self.temp_dir.path();
        for (file_path, content) in self.initial_files {
            let full_path = path.join(file_path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(full_path, content)?;
        }

        Ok(TestContext {
            temp_dir: self.temp_dir,
        })
    }
}

/// Temporary directory that is removed on drop
pub struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.temp_dir.path().join(path)
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<String> {
        Ok(fs::read_to_string(self.join(path))?)
    }
}

/// `ACCOUNT_ID,ACTIVITY_TIME,STATUS` rows in the activity log layout
pub fn activity_log(times: &[&str]) -> String {
    let mut content = String::from("ACCOUNT_ID,ACTIVITY_TIME,STATUS\n");
    for (i, time) in times.iter().enumerate() {
        content.push_str(&format!("acct-{i},{time} 10.15.00.000000000 AM,ACTIVE\n"));
    }
    content
}

/// `user_id,cell_id,duration` rows, one per user id
pub fn call_records(user_ids: &[&str]) -> String {
    let mut content = String::from("user_id,cell_id,duration\n");
    for (i, user) in user_ids.iter().enumerate() {
        content.push_str(&format!("{user},cell-{},{}\n", i % 7, 30 + i));
    }
    content
}
