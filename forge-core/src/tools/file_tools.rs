//! File tools bound to a project root

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::{parse_args, schema_value, ProjectRoot, Tool};
use crate::{Error, Result};

#[derive(Debug, Deserialize, JsonSchema)]
struct PathArgs {
    /// File path relative to the project root
    path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct WriteArgs {
    /// File path relative to the project root
    path: String,
    /// Full content to write
    content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ListArgs {
    /// Directory relative to the project root
    #[serde(default = "default_directory")]
    directory: String,
}

fn default_directory() -> String {
    ".".to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
struct NoArgs {}

/// Read a file's content; missing files read as empty
#[derive(Debug, Clone)]
pub struct ReadFile {
    root: Arc<ProjectRoot>,
}

impl ReadFile {
    pub fn new(root: Arc<ProjectRoot>) -> Self {
        Self { root }
    }

    /// Read `path`, returning an empty string if it does not exist
    ///
    /// A directory is not a readable file and yields [`Error::Tool`].
    pub async fn read(&self, path: &str) -> Result<String> {
        let resolved = self.root.resolve(path)?;
        if tokio::fs::metadata(&resolved)
            .await
            .is_ok_and(|meta| meta.is_dir())
        {
            return Err(Error::Tool(format!("'{}' is a directory, not a file", path)));
        }
        match tokio::fs::read_to_string(&resolved).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Tool for ReadFile {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Read the content of a file in the project. Returns an empty string if the file does not exist."
    }

    fn parameters(&self) -> Value {
        schema_value::<PathArgs>()
    }

    async fn call(&self, args: Value) -> Result<String> {
        let args: PathArgs = parse_args(self.name(), args)?;
        self.read(&args.path).await
    }
}

/// Write a file, creating parent directories
#[derive(Debug, Clone)]
pub struct WriteFile {
    root: Arc<ProjectRoot>,
}

impl WriteFile {
    pub fn new(root: Arc<ProjectRoot>) -> Self {
        Self { root }
    }

    /// Write `content` to `path`, returning the absolute path written
    pub async fn write(&self, path: &str, content: &str) -> Result<PathBuf> {
        let resolved = self.root.resolve(path)?;
        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&resolved, content).await?;

        tracing::info!(
            path = %self.root.relative(&resolved).display(),
            bytes = content.len(),
            "Wrote file"
        );
        Ok(resolved)
    }
}

#[async_trait]
impl Tool for WriteFile {
    fn name(&self) -> &'static str {
        "write_file"
    }

    fn description(&self) -> &'static str {
        "Write the full content of a file in the project, creating parent directories as needed."
    }

    fn parameters(&self) -> Value {
        schema_value::<WriteArgs>()
    }

    async fn call(&self, args: Value) -> Result<String> {
        let args: WriteArgs = parse_args(self.name(), args)?;
        let written = self.write(&args.path, &args.content).await?;
        Ok(format!("WROTE:{}", written.display()))
    }
}

/// List every file under a directory, recursively
#[derive(Debug, Clone)]
pub struct ListFiles {
    root: Arc<ProjectRoot>,
}

impl ListFiles {
    pub fn new(root: Arc<ProjectRoot>) -> Self {
        Self { root }
    }

    /// Sorted file paths under `directory`, relative to the project root
    pub async fn list(&self, directory: &str) -> Result<Vec<String>> {
        let start = self.root.resolve(directory)?;
        let mut files = Vec::new();

        if !start.is_dir() {
            return Ok(files);
        }

        let mut pending = vec![start];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                let path = entry.path();
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() {
                    files.push(self.root.relative(&path).display().to_string());
                }
            }
        }

        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl Tool for ListFiles {
    fn name(&self) -> &'static str {
        "list_files"
    }

    fn description(&self) -> &'static str {
        "List all files under a directory of the project (default: the project root)."
    }

    fn parameters(&self) -> Value {
        schema_value::<ListArgs>()
    }

    async fn call(&self, args: Value) -> Result<String> {
        let args: ListArgs = parse_args(self.name(), args)?;
        let files = self.list(&args.directory).await?;
        if files.is_empty() {
            Ok("No files found.".to_string())
        } else {
            Ok(files.join("\n"))
        }
    }
}

/// Report the absolute project root
#[derive(Debug, Clone)]
pub struct GetCurrentDirectory {
    root: Arc<ProjectRoot>,
}

impl GetCurrentDirectory {
    pub fn new(root: Arc<ProjectRoot>) -> Self {
        Self { root }
    }
}

#[async_trait]
impl Tool for GetCurrentDirectory {
    fn name(&self) -> &'static str {
        "get_current_directory"
    }

    fn description(&self) -> &'static str {
        "Return the absolute path of the project root."
    }

    fn parameters(&self) -> Value {
        schema_value::<NoArgs>()
    }

    async fn call(&self, args: Value) -> Result<String> {
        let _: NoArgs = parse_args(self.name(), args)?;
        Ok(self.root.path().display().to_string())
    }
}
