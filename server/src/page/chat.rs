use axum::{extract::State, response::Html};

use crate::config::PageSettings;
use crate::state::AppState;

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// GET / - The chat room page. Loads /static/chat.js, which opens the
/// WebSocket to /websocket.
pub async fn chat_page(State(state): State<AppState>) -> Html<String> {
    Html(render_chat_page(&state.page))
}

/// Footer line: version, license, and author/project link when configured.
fn render_footer(page: &PageSettings) -> String {
    let mut footer = format!(
        "wschat v{} &middot; License: {}",
        env!("CARGO_PKG_VERSION"),
        html_escape(&page.license)
    );
    if let Some(author) = &page.author {
        footer.push_str(&format!(" &middot; by {}", html_escape(author)));
    }
    if let Some(url) = &page.project_url {
        footer.push_str(&format!(
            r#" &middot; <a href="{url}">{url}</a>"#,
            url = html_escape(url)
        ));
    }
    footer
}

fn render_chat_page(page: &PageSettings) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="/static/chat.css">
</head>
<body>
    <header>
        <h1>{title}</h1>
        <p class="desc">{description}</p>
    </header>
    <main>
        <section id="log" aria-live="polite"></section>
        <aside>
            <h2>Online</h2>
            <ul id="nicks"></ul>
        </aside>
    </main>
    <form id="nick-form">
        <label for="nick">Nick</label>
        <input id="nick" name="nick" value="Anonymous" autocomplete="off">
        <button type="submit">Change</button>
    </form>
    <form id="message-form">
        <input id="message" name="message" placeholder="Say something" autocomplete="off">
        <button type="submit">Send</button>
    </form>
    <footer>{footer}</footer>
    <script src="/static/chat.js" data-socket-path="/websocket"></script>
</body>
</html>"#,
        title = html_escape(&page.title),
        description = html_escape(&page.description),
        footer = render_footer(page),
    )
}
