//! Admin gate for the back-office views
//!
//! The gate is the stored session flag; see [`crate::session`].

use axum::response::{IntoResponse, Redirect, Response};

use super::pages::{html_escape, page, public_navbar};
use super::server::AppState;

/// Redirect to the login page unless the admin flag is set
pub async fn require_admin(state: &AppState) -> Result<(), Response> {
    if state.session.is_logged_in().await {
        Ok(())
    } else {
        Err(Redirect::to("/admin/login").into_response())
    }
}

/// Admin login page HTML
pub fn login_page(error: Option<&str>, username: &str) -> String {
    let error_html = error
        .map(|e| format!(r#"<div class="message error">{}</div>"#, html_escape(e)))
        .unwrap_or_default();

    page(
        "Admin Login",
        public_navbar(),
        &format!(
            r#"<div class="container">
        <div class="card" style="max-width:420px;margin:2rem auto;">
            <h2>Admin Login</h2>
            <p class="muted" style="margin-bottom:1.5rem;">Enter your credentials to access the admin dashboard</p>
            {error_html}
            <form method="post" action="/admin/login">
                <div class="form-group">
                    <label for="username">Username</label>
                    <input id="username" name="username" value="{username}" placeholder="admin" required>
                </div>
                <div class="form-group">
                    <label for="password">Password</label>
                    <input id="password" name="password" type="password" placeholder="admin123" required>
                </div>
                <button type="submit" class="btn btn-primary" style="width:100%;">Sign In</button>
            </form>
            <p class="muted" style="margin-top:1rem;font-size:0.8rem;text-align:center;">
                Default credentials: username <code>admin</code>, password <code>admin123</code>
            </p>
        </div>
    </div>"#,
            error_html = error_html,
            username = html_escape(username),
        ),
    )
}
