//! Create a new article

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::ArticleFileName;
use crate::Blog;

/// Create `[title]-[today].md` in the content directory
pub fn create_article(
    blog: &Blog,
    title: &str,
    categories: &[String],
    tags: &[String],
) -> Result<PathBuf> {
    if title.trim().is_empty() || title.contains(['[', ']', '/', '\\']) {
        anyhow::bail!("Invalid article title: {:?}", title);
    }

    let today = chrono::Utc::now().with_timezone(&blog.config.tz()?).date_naive();
    let file_name = ArticleFileName {
        name: title.to_string(),
        date: today,
    }
    .to_file_name();

    fs::create_dir_all(&blog.content_dir)?;
    let file_path = blog.content_dir.join(&file_name);

    // Check if file already exists
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let mut content = String::new();
    if !categories.is_empty() {
        content.push_str(&format!("categories: [{}]\n", categories.join(", ")));
    }
    if !tags.is_empty() {
        content.push_str(&format!("tags: [{}]\n", tags.join(", ")));
    }
    content.push_str(&format!("\n# {}\n", title));

    fs::write(&file_path, content)?;
    tracing::info!("Created article {:?}", file_path);

    Ok(file_path)
}

/// Run the new command
pub fn run(blog: &Blog, title: &str, categories: &[String], tags: &[String]) -> Result<()> {
    let path = create_article(blog, title, categories, tags)?;
    println!("Created: {:?}", path);
    Ok(())
}
