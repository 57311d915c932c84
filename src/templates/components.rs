//! Shared HTML components: navigation bar, base page template, escaping.

use super::styles::STYLE;

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ============================================================================
// Navigation Bar
// ============================================================================

pub fn nav_bar(search_query: Option<&str>, logged_in: bool) -> String {
    if !logged_in {
        return r#"<nav class="nav-bar">
            <a href="/" class="brand">BibleCloud</a>
            <span class="spacer"></span>
            <a href="/login">Ingresar</a>
        </nav>"#
            .to_string();
    }

    format!(
        r#"<nav class="nav-bar">
            <a href="/" class="brand">BibleCloud</a>
            <span class="spacer"></span>
            <form class="search-box" action="/" method="get">
                <input type="text" name="q" placeholder="Buscar..." value="{}">
                <button type="submit">Buscar</button>
            </form>
            <a href="/menu" title="Menú">&#9776;</a>
        </nav>"#,
        html_escape(search_query.unwrap_or(""))
    )
}

// ============================================================================
// Base Template
// ============================================================================

pub fn base_html(title: &str, content: &str, search_query: Option<&str>, logged_in: bool) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    {nav}
    <div class="container">
        {content}
    </div>
</body>
</html>"#,
        title = html_escape(title),
        nav = nav_bar(search_query, logged_in),
        content = content,
    )
}
