//! List site content

use anyhow::Result;

use crate::content::Article;
use crate::Blog;

/// List site content by type
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let reader = blog.reader();

    match content_type {
        "article" | "articles" | "post" | "posts" => {
            let articles = reader.list_articles()?;
            println!("Articles ({}):", articles.len());
            print_articles(&articles);
        }
        "category" | "categories" => {
            let groups = reader.categories_with_articles();
            println!("Categories ({}):", groups.len());
            for group in groups {
                println!("  {} ({})", group.category, group.blogs.len());
            }
        }
        "tag" | "tags" => {
            let groups = reader.tags_with_articles();
            println!("Tags ({}):", groups.len());
            for group in groups {
                println!("  {} ({})", group.tag, group.blogs.len());
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: articles, categories, tags",
                content_type
            );
        }
    }

    Ok(())
}

/// Search article titles
pub fn search(blog: &Blog, query: &str) -> Result<()> {
    let articles = blog.reader().search_articles(query);
    println!("Matches ({}):", articles.len());
    print_articles(&articles);
    Ok(())
}

fn print_articles(articles: &[Article]) {
    for article in articles {
        if article.categories.is_empty() {
            println!("  {} - {}", article.date, article.name);
        } else {
            println!(
                "  {} - {} [{}]",
                article.date,
                article.name,
                article.categories.join(", ")
            );
        }
    }
}
