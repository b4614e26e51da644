//! Plain-text conversion summary printed after the document is written.
use crate::export::BlogDocument;
use crate::feed::Entry;

/// Renders the summary: totals, then every post and page as
/// `  - <title> (<slug>)` in document order.
pub fn render_summary(document: &BlogDocument) -> String {
    let mut lines = vec![
        format!(
            "Extracted {} posts and {} pages",
            document.total_posts, document.total_pages
        ),
        String::new(),
        "Posts:".to_string(),
    ];
    lines.extend(document.posts.iter().map(bullet));
    lines.push(String::new());
    lines.push("Pages:".to_string());
    lines.extend(document.pages.iter().map(bullet));

    lines.join("\n")
}

pub fn print_summary(document: &BlogDocument) {
    println!("{}", render_summary(document));
}

fn bullet(entry: &Entry) -> String {
    format!("  - {} ({})", entry.title, entry.slug)
}
