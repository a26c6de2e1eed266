use chrono::NaiveDate;
use glreport_core::dump::ReportDump;
use pulldown_cmark::{html, Event, Options, Parser};

use super::markdown;

/// Standalone HTML page rendered from the Markdown document
pub fn render(dump: &ReportDump, today: NaiveDate) -> String {
    let source = markdown::render(dump, today);
    // Titles come from GitLab; raw HTML in them is rendered as text
    let parser = Parser::new_ext(&source, Options::ENABLE_TABLES).map(|event| match event {
        Event::Html(text) | Event::InlineHtml(text) => Event::Text(text),
        event => event,
    });

    let mut body = String::new();
    html::push_html(&mut body, parser);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
        body {{
            font-family: Arial, sans-serif;
            margin: 0 auto;
            max-width: 800px;
            padding: 20px;
        }}
        h1 {{
            font-size: 2em;
        }}
        h2 {{
            font-size: 1.5em;
            padding-top: 1em;
        }}
        table {{
            border-collapse: collapse;
            width: 100%;
        }}
        th, td {{
            border: 1px solid #ddd;
            padding: 8px;
        }}
        th, tr:nth-child(even) {{
            background-color: #f2f2f2;
        }}
    </style>
</head>
<body>
{body}</body>
</html>
"#,
        title = html_escape::encode_text(&dump.title),
        body = body,
    )
}
