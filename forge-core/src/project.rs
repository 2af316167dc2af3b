//! Project directory naming and display
//!
//! Each run writes into `<output_dir>/<slug>`, where the slug comes from the
//! plan's name or, failing that, from the user's prompt.

use std::fs;
use std::path::{Path, PathBuf};

use crate::Result;

/// Slug used when neither the name nor the prompt yields one
pub const FALLBACK_SLUG: &str = "project";

const MAX_SLUG_LEN: usize = 64;
const PROMPT_SLUG_WORDS: usize = 6;

/// Turn free text into a directory-safe name
///
/// Lowercases ASCII letters and digits, joins runs of whitespace, `-` and
/// `_` with a single `_`, and drops everything else. May return an empty
/// string.
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut pending_sep = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_sep = true;
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    slug.trim_end_matches('_').to_string()
}

/// Slug for a project, never empty
///
/// Uses `name` when it slugifies to something, otherwise the first few words
/// of `prompt`, otherwise [`FALLBACK_SLUG`].
pub fn project_slug(name: Option<&str>, prompt: &str) -> String {
    if let Some(slug) = name.map(slugify).filter(|s| !s.is_empty()) {
        return slug;
    }

    let head: Vec<&str> = prompt.split_whitespace().take(PROMPT_SLUG_WORDS).collect();
    let slug = slugify(&head.join(" "));
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Directory a project's files are generated into
pub fn project_dir(output_dir: &Path, name: Option<&str>, prompt: &str) -> PathBuf {
    output_dir.join(project_slug(name, prompt))
}

/// Render a directory as an indented tree
///
/// Directories and files are sorted by name; each directory's files are
/// listed before its subdirectories.
pub fn render_tree(root: &Path) -> Result<String> {
    let mut out = String::new();
    render_dir(root, 0, &mut out)?;
    Ok(out)
}

fn render_dir(dir: &Path, depth: usize, out: &mut String) -> Result<()> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            dirs.push(name);
        } else {
            files.push(name);
        }
    }
    dirs.sort();
    files.sort();

    let indent = "    ".repeat(depth);
    for file in &files {
        out.push_str(&format!("{}📄 {}\n", indent, file));
    }
    for name in &dirs {
        out.push_str(&format!("{}📁 {}\n", indent, name));
        render_dir(&dir.join(name), depth + 1, out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Simple Calculator"), "simple_calculator");
        assert_eq!(slugify("  hello--world__app  "), "hello_world_app");
        assert_eq!(slugify("Todo App (v2)!"), "todo_app_v2");
        assert_eq!(slugify("../../etc"), "etc");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn test_slugify_truncates() {
        let long = "a".repeat(200);
        assert_eq!(slugify(&long).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn test_project_slug_prefers_name() {
        assert_eq!(project_slug(Some("hello"), "anything"), "hello");
    }

    #[test]
    fn test_project_slug_falls_back_to_prompt() {
        assert_eq!(
            project_slug(None, "a single-file hello-world script"),
            "a_single_file_hello_world_script"
        );
        assert_eq!(project_slug(Some("   "), "build a todo app"), "build_a_todo_app");
        assert_eq!(project_slug(Some("!!!"), "build a todo app"), "build_a_todo_app");
    }

    #[test]
    fn test_project_slug_never_empty() {
        assert_eq!(project_slug(None, ""), FALLBACK_SLUG);
        assert_eq!(project_slug(Some("???"), "!!!"), FALLBACK_SLUG);
    }

    #[test]
    fn test_project_dir_deterministic() {
        let base = Path::new("generated_project");
        let a = project_dir(base, Some("Hello"), "x");
        let b = project_dir(base, Some("Hello"), "y");
        assert_eq!(a, b);
        assert_eq!(a, PathBuf::from("generated_project/hello"));
    }

    #[test]
    fn test_render_tree() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/components")).unwrap();
        fs::write(root.join("index.html"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();
        fs::write(root.join("src/app.js"), "").unwrap();
        fs::write(root.join("src/components/button.js"), "").unwrap();

        let tree = render_tree(root).unwrap();
        let expected = "\
📄 README.md
📄 index.html
📁 src
    📄 app.js
    📁 components
        📄 button.js
";
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_render_tree_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(render_tree(&dir.path().join("missing")).is_err());
    }
}
