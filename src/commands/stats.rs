//! Show like and read counts

use anyhow::Result;

use crate::Blog;

/// Print every count of one counter store, highest first
pub async fn run(blog: &Blog, kind: &str) -> Result<()> {
    let stores = blog.stores()?;
    let store = match kind {
        "like" | "likes" => &stores.likes,
        "read" | "reads" => &stores.reads,
        _ => anyhow::bail!("Unknown stats: {}. Available: likes, reads", kind),
    };

    let mut counts: Vec<_> = store.all().await.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    println!("{} ({}):", store.label(), counts.len());
    for (title, count) in counts {
        println!("  {} ({})", title, count);
    }

    Ok(())
}
