//! Tree command - Show the files of a generated project

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use forge_core::{render_tree, Config};

/// Arguments for the tree command
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Directory to show (defaults to the configured output directory)
    pub dir: Option<PathBuf>,
}

impl TreeArgs {
    /// Execute the tree command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let dir = self
            .dir
            .clone()
            .unwrap_or_else(|| config.pipeline.output_dir.clone());

        if !dir.is_dir() {
            println!("No project found at {}", dir.display());
            return Ok(());
        }

        let tree = render_tree(&dir)
            .with_context(|| format!("Failed to read {}", dir.display()))?;
        println!("{}", dir.display());
        print!("{}", tree);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tree_missing_dir_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let args = TreeArgs {
            dir: Some(dir.path().join("absent")),
        };
        assert!(args.execute(&Config::default()).is_ok());
    }

    #[test]
    fn test_tree_existing_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("main.py"), "print(1)").unwrap();
        let args = TreeArgs {
            dir: Some(dir.path().to_path_buf()),
        };
        assert!(args.execute(&Config::default()).is_ok());
    }
}
