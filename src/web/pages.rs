//! Shared page chrome and display formatting

use chrono::{DateTime, NaiveDate, Utc};

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Rupee amount with thousands separators; decimals only when needed
pub fn format_rupees(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    let whole = rounded.trunc() as i64;
    let paise = ((rounded - whole as f64).abs() * 100.0).round() as i64;

    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if whole < 0 {
        grouped.insert(0, '-');
    }

    if paise == 0 {
        format!("₹{}", grouped)
    } else {
        format!("₹{}.{:02}", grouped, paise)
    }
}

/// e.g. "Saturday, November 15, 2025"
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Render a `?msg=` notice. A leading `error:` marks it as a failure.
pub fn notice_banner(msg: Option<&str>) -> String {
    match msg {
        None | Some("") => String::new(),
        Some(msg) => match msg.strip_prefix("error:") {
            Some(err) => format!(r#"<div class="message error">{}</div>"#, html_escape(err)),
            None => format!(r#"<div class="message success">{}</div>"#, html_escape(msg)),
        },
    }
}

/// Redirect target carrying a notice in the query string
pub fn with_notice(path: &str, msg: &str) -> String {
    format!("{}?msg={}", path, urlencoding::encode(msg))
}

fn base_css() -> &'static str {
    r#"
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #f7f6fb;
            min-height: 100vh;
            color: #1f1d2b;
        }
        .navbar {
            background: #fff;
            padding: 1rem 2rem;
            display: flex;
            justify-content: space-between;
            align-items: center;
            border-bottom: 1px solid #e6e3f0;
        }
        .navbar h1 { font-size: 1.25rem; }
        .navbar p { color: #6b6880; font-size: 0.85rem; }
        .navbar a { color: #7e69e6; text-decoration: none; }
        .container { max-width: 1200px; margin: 0 auto; padding: 2rem; }
        .hero {
            background: linear-gradient(135deg, #9b87f5 0%, #7e69e6 100%);
            color: #fff;
            text-align: center;
            padding: 4rem 1rem;
        }
        .hero h2 { font-size: 2.25rem; margin-bottom: 1rem; }
        .nav-links { display: flex; gap: 1rem; margin-bottom: 2rem; flex-wrap: wrap; }
        .nav-links a {
            padding: 0.5rem 1rem;
            background: #fff;
            border: 1px solid #e6e3f0;
            border-radius: 8px;
            color: #1f1d2b;
            text-decoration: none;
        }
        .nav-links a.active { background: #9b87f5; color: #fff; border-color: #9b87f5; }
        .cards {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(260px, 1fr));
            gap: 1.5rem;
            margin-bottom: 2rem;
        }
        .card {
            background: #fff;
            border-radius: 12px;
            padding: 1.5rem;
            border: 1px solid #e6e3f0;
        }
        .card h2, .card h3 { margin-bottom: 0.5rem; }
        .card .muted, .muted { color: #6b6880; }
        .card .value { font-size: 2rem; font-weight: bold; }
        .card .fees { font-size: 1.2rem; font-weight: 600; color: #7e69e6; margin: 0.75rem 0; }
        table {
            width: 100%;
            border-collapse: collapse;
            background: #fff;
            border-radius: 12px;
            overflow: hidden;
        }
        th, td { padding: 0.75rem 1rem; text-align: left; border-bottom: 1px solid #eee; }
        th { background: #f1eff8; color: #6b6880; font-weight: 500; }
        tr:last-child td { border-bottom: none; }
        .badge { padding: 2px 8px; border-radius: 4px; font-size: 0.85rem; }
        .badge.pending { background: #fef3c7; color: #92400e; }
        .badge.completed { background: #dcfce7; color: #166534; }
        .btn {
            display: inline-block;
            padding: 0.6rem 1.2rem;
            border-radius: 8px;
            border: none;
            cursor: pointer;
            font-size: 1rem;
            text-decoration: none;
        }
        .btn-primary { background: #9b87f5; color: #fff; }
        .btn-primary:hover { background: #7e69e6; }
        .btn-secondary { background: #fff; color: #1f1d2b; border: 1px solid #e6e3f0; }
        .btn-danger { background: #fee2e2; color: #b91c1c; }
        .inline { display: inline; }
        .message { padding: 1rem; border-radius: 8px; margin-bottom: 1rem; }
        .message.success { background: #dcfce7; border: 1px solid #22c55e; }
        .message.error { background: #fee2e2; border: 1px solid #ef4444; }
        .form-group { margin-bottom: 1rem; }
        .form-group label { display: block; margin-bottom: 0.4rem; color: #6b6880; }
        .form-group input, .form-group textarea, .form-group select {
            width: 100%;
            padding: 0.6rem 0.9rem;
            border-radius: 8px;
            border: 1px solid #d9d5e8;
            font-size: 1rem;
            background: #fff;
        }
        .form-group .field-error { color: #b91c1c; font-size: 0.85rem; margin-top: 0.3rem; }
        .form-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(240px, 1fr)); gap: 0 1rem; }
        .summary { background: #f1eff8; border-radius: 8px; padding: 1rem; margin: 1rem 0; }
        .summary div { display: flex; justify-content: space-between; padding: 0.25rem 0; }
        .activity { font-family: 'SF Mono', 'Fira Code', monospace; font-size: 0.85rem; }
        .activity .WARN { color: #b45309; }
        .activity .ERROR { color: #b91c1c; }
    "#
}

/// Full HTML document around `body`
pub fn page(title: &str, navbar: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - EventHub</title>
    <style>{css}</style>
</head>
<body>
    {navbar}
    {body}
</body>
</html>"#,
        title = html_escape(title),
        css = base_css(),
        navbar = navbar,
        body = body,
    )
}

pub fn public_navbar() -> &'static str {
    r#"<nav class="navbar">
        <div>
            <h1><a href="/" style="color:inherit;">EventHub</a></h1>
            <p>Discover &amp; Register for Amazing Events</p>
        </div>
        <a href="/admin/login" class="btn btn-secondary">Admin</a>
    </nav>"#
}

pub fn admin_navbar() -> &'static str {
    r#"<nav class="navbar">
        <div>
            <h1>Admin Dashboard</h1>
            <p>Manage events and registrations</p>
        </div>
        <form method="post" action="/admin/logout" class="inline">
            <button type="submit" class="btn btn-secondary">Logout</button>
        </form>
    </nav>"#
}

/// Simple page with a heading, message and a link back
pub fn message_page(title: &str, message: &str, back_href: &str, back_label: &str) -> String {
    page(
        title,
        public_navbar(),
        &format!(
            r#"<div class="container">
        <div class="card" style="max-width:520px;margin:2rem auto;text-align:center;">
            <h2>{}</h2>
            <p class="muted" style="margin:1rem 0;">{}</p>
            <a href="{}" class="btn btn-primary">{}</a>
        </div>
    </div>"#,
            html_escape(title),
            message,
            back_href,
            html_escape(back_label)
        ),
    )
}
