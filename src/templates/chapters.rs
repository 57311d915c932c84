//! Chapter list, chapter detail, menu and login views.

use crate::models::{format_timestamp, Chapter, ReadRecord, ReadStatus};

use super::components::{base_html, html_escape};

/// Where to come back to after acting on the list, keeping the search term.
pub fn list_url(search_query: &str, anchor: Option<&str>) -> String {
    let mut url = if search_query.trim().is_empty() {
        "/".to_string()
    } else {
        format!("/?q={}", urlencoding::encode(search_query))
    };
    if let Some(anchor) = anchor {
        url.push('#');
        url.push_str(&urlencoding::encode(anchor));
    }
    url
}

fn chapter_url(chapter: &Chapter) -> String {
    format!("/chapter/{}", urlencoding::encode(&chapter.id))
}

// ============================================================================
// Chapter List
// ============================================================================

pub fn render_chapter_list(
    chapters: &[Chapter],
    status: &ReadStatus,
    search_query: &str,
    banner: Option<&str>,
) -> String {
    let mut html = String::new();

    if let Some(banner) = banner {
        html.push_str(&format!(r#"<div class="message error">{}</div>"#, html_escape(banner)));
    }

    let read_count = chapters.iter().filter(|c| status.contains_key(&c.id)).count();
    html.push_str(&format!(
        r#"<p class="summary">{} capítulos · {} leídos</p>"#,
        chapters.len(),
        read_count
    ));

    if chapters.is_empty() {
        html.push_str(&format!(
            "<p>No hay capítulos que coincidan con \"{}\".</p>",
            html_escape(search_query)
        ));
        return base_html("BibleCloud", &html, Some(search_query), true);
    }

    html.push_str(r#"<ul class="chapter-list">"#);
    for chapter in chapters {
        let entry = status.get(&chapter.id);
        let label = html_escape(&chapter.label());
        let (check_class, check_mark, aria) = match entry {
            Some(_) => ("check read", "&#10003;", format!("Marcar {} como leído nuevamente", label)),
            None => ("check", "", format!("Marcar {} como leído", label)),
        };

        let text = match entry {
            Some(e) if !e.notes.is_empty() => format!(
                r#"<a href="{url}" class="label">{label}</a><span class="notes-preview">{notes}</span>"#,
                url = chapter_url(chapter),
                label = label,
                notes = html_escape(&e.notes),
            ),
            Some(_) => format!(
                r#"<a href="{}" class="label">{}</a>"#,
                chapter_url(chapter),
                label
            ),
            None => format!(r#"<span class="label">{}</span>"#, label),
        };

        let meta = match entry {
            Some(e) => format!(
                r#"<a href="{}" class="meta">({})</a>"#,
                chapter_url(chapter),
                format_timestamp(&e.latest_read_timestamp)
            ),
            None => String::new(),
        };

        html.push_str(&format!(
            r#"<li class="chapter-item" id="{id}">
                <div class="body">
                    <form method="POST" action="{url}/read">
                        <input type="hidden" name="q" value="{q}">
                        <button type="submit" class="{check_class}" aria-label="{aria}">{check_mark}</button>
                    </form>
                    <div>{text}</div>
                </div>
                {meta}
            </li>"#,
            id = html_escape(&chapter.id),
            url = chapter_url(chapter),
            q = html_escape(search_query),
            check_class = check_class,
            aria = aria,
            check_mark = check_mark,
            text = text,
            meta = meta,
        ));
    }
    html.push_str("</ul>");

    base_html("BibleCloud", &html, Some(search_query), true)
}

// ============================================================================
// Chapter Detail
// ============================================================================

pub fn render_chapter_detail(
    chapter: &Chapter,
    record: Option<&ReadRecord>,
    confirm_pending: bool,
    notes_saved: bool,
) -> String {
    let url = chapter_url(chapter);
    let mut html = format!(
        r#"<div class="panel"><h2>{}</h2>"#,
        html_escape(&chapter.label())
    );

    if notes_saved {
        html.push_str(r#"<div class="message success">Notas guardadas!</div>"#);
    }

    if let Some(record) = record {
        html.push_str(r#"<div class="history"><h3>Leído:</h3>"#);
        for ts in &record.all_timestamps {
            html.push_str(&format!("<p>{}</p>", format_timestamp(ts)));
        }
        html.push_str("</div>");
    }

    let notes = record.map(ReadRecord::notes_text).unwrap_or("");
    html.push_str(&format!(
        r#"<form method="POST" action="{url}/notes">
            <h3>Notas:</h3>
            <textarea name="notes" rows="3" placeholder="Escribe tus notas aquí...">{notes}</textarea>
            <button type="submit" class="btn block">Guardar Notas</button>
        </form>"#,
        url = url,
        notes = html_escape(notes),
    ));

    if record.is_some() {
        if confirm_pending {
            html.push_str(&format!(
                r#"<div class="confirm-box">
                    <p>¿Seguro? Se borrará el historial y las notas.</p>
                    <div class="actions">
                        <form method="POST" action="{url}/unread/confirm"><button type="submit" class="btn danger">Sí, No Leído</button></form>
                        <form method="POST" action="{url}/unread/cancel"><button type="submit" class="btn secondary">No</button></form>
                    </div>
                </div>"#,
                url = url
            ));
        } else {
            html.push_str(&format!(
                r#"<form method="POST" action="{url}/unread"><button type="submit" class="btn block danger">Marcar No Leído</button></form>"#,
                url = url
            ));
        }
    }

    html.push_str(&format!(
        r##"<a href="{}" class="btn block">Cerrar</a></div>"##,
        list_url("", Some(&chapter.id))
    ));

    base_html(&chapter.label(), &html, None, true)
}

// ============================================================================
// Menu and Login
// ============================================================================

pub fn render_menu() -> String {
    let html = r#"<div class="panel">
        <a href="/logout" class="btn block">Cerrar Sesión</a>
        <a href="/" class="btn block">Cerrar</a>
    </div>"#;
    base_html("Menú", html, None, true)
}

pub fn render_login(error: Option<&str>, email: &str) -> String {
    let error_html = error
        .map(|e| format!(r#"<div class="message error">{}</div>"#, html_escape(e)))
        .unwrap_or_default();

    let html = format!(
        r#"<div class="login-form">
            <div class="title">BibleCloud</div>
            <div class="welcome">¡Bienvenido!</div>
            <form method="POST" action="/login">
                {error_html}
                <input type="text" name="email" placeholder="Usuario" value="{email}" autofocus required>
                <input type="password" name="password" placeholder="Password" required>
                <button type="submit">Ingresar</button>
            </form>
        </div>"#,
        error_html = error_html,
        email = html_escape(email),
    );

    base_html("Ingresar", &html, None, false)
}
