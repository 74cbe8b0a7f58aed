//! Admin panel routes and handlers
//!
//! Provides a web-based back-office for:
//! - Overview figures and recent activity
//! - Adding, editing and deleting events
//! - Viewing registrations and payments

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::error;

use super::auth::{login_page, require_admin};
use super::forms::{EventForm, FormErrors, LoginForm};
use super::pages::{
    admin_navbar, format_rupees, format_short_date, format_timestamp, html_escape,
    notice_banner, page, with_notice,
};
use super::server::AppState;
use crate::error::AppError;
use crate::models::PaymentStatus;

/// Create admin router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/login", get(login).post(submit_login))
        .route("/logout", post(logout))
        .route("/events", get(events_page).post(create_event))
        .route("/events/:id", post(update_event))
        .route("/events/:id/edit", get(edit_event))
        .route("/events/:id/delete", post(delete_event))
        .route("/registrations", get(registrations_page))
        .route("/payments", get(payments_page))
}

#[derive(Deserialize, Default)]
struct NoticeParams {
    msg: Option<String>,
}

/// Tab bar shared by the admin views
fn tabs(active: &str) -> String {
    [
        ("/admin", "Overview"),
        ("/admin/events", "Events"),
        ("/admin/registrations", "Registrations"),
        ("/admin/payments", "Payments"),
    ]
    .iter()
    .map(|(href, label)| {
        let class = if *label == active { " class=\"active\"" } else { "" };
        format!(r#"<a href="{}"{}>{}</a>"#, href, class, label)
    })
    .collect::<Vec<_>>()
    .join("")
}

fn admin_page(title: &str, active_tab: &str, msg: Option<&str>, content: &str) -> Html<String> {
    Html(page(
        title,
        admin_navbar(),
        &format!(
            r#"<div class="container">
        <div class="nav-links">{}</div>
        {}
        {}
    </div>"#,
            tabs(active_tab),
            notice_banner(msg),
            content
        ),
    ))
}

/// GET /admin/login - Show login page
async fn login(State(state): State<AppState>) -> Response {
    if state.session.is_logged_in().await {
        return Redirect::to("/admin").into_response();
    }
    Html(login_page(None, "")).into_response()
}

/// POST /admin/login - Check credentials and set the session flag
async fn submit_login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state.session.login(&form.username, &form.password).await {
        Ok(()) => Redirect::to(&with_notice("/admin", "Login successful!")).into_response(),
        Err(AppError::InvalidCredentials) => (
            StatusCode::UNAUTHORIZED,
            Html(login_page(Some("Invalid credentials"), &form.username)),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to store admin session: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(login_page(Some("Could not start the admin session"), &form.username)),
            )
                .into_response()
        }
    }
}

/// POST /admin/logout - Clear the flag and go back to the listing
async fn logout(State(state): State<AppState>) -> Response {
    if let Err(e) = state.session.logout().await {
        error!("Failed to clear admin session: {}", e);
        return Redirect::to(&with_notice("/admin", "error:Logout failed")).into_response();
    }
    Redirect::to(&with_notice("/", "Logged out successfully")).into_response()
}

/// GET /admin - Overview
async fn dashboard(State(state): State<AppState>, Query(params): Query<NoticeParams>) -> Response {
    if let Err(redirect) = require_admin(&state).await {
        return redirect;
    }

    let stats = state.store.read().await.stats();
    let activity: Vec<_> = state
        .activity
        .recent(25)
        .iter()
        .map(|entry| {
            format!(
                r#"<div class="{}" title="{}">{} {} {}</div>"#,
                entry.level,
                html_escape(&entry.target),
                entry.timestamp.format("%H:%M:%S"),
                entry.level,
                html_escape(&entry.message)
            )
        })
        .collect();
    let activity_html = if activity.is_empty() {
        r#"<p class="muted">Nothing yet</p>"#.to_string()
    } else {
        activity.join("\n")
    };

    let content = format!(
        r#"<div class="cards">
            <div class="card"><h2 class="muted">Total Events</h2><div class="value">{}</div></div>
            <div class="card"><h2 class="muted">Total Registrations</h2><div class="value">{}</div></div>
            <div class="card"><h2 class="muted">Total Revenue</h2><div class="value">{}</div></div>
            <div class="card"><h2 class="muted">Pending Payments</h2><div class="value">{}</div></div>
        </div>
        <div class="card">
            <h3>Recent activity</h3>
            <div class="activity">{}</div>
        </div>"#,
        stats.total_events,
        stats.total_registrations,
        format_rupees(stats.total_revenue),
        stats.pending_payments,
        activity_html
    );

    admin_page("Admin Dashboard", "Overview", params.msg.as_deref(), &content).into_response()
}

fn event_field(
    form: &EventForm,
    errors: Option<&FormErrors>,
    name: &str,
    label: &str,
    input: &str,
) -> String {
    let value = match name {
        "name" => &form.name,
        "location" => &form.location,
        "date" => &form.date,
        "time" => &form.time,
        "fees" => &form.fees,
        _ => &form.description,
    };
    let error = errors
        .and_then(|e| e.for_field(name))
        .map(|m| format!(r#"<div class="field-error">{}</div>"#, html_escape(m)))
        .unwrap_or_default();
    let control = if input == "textarea" {
        format!(
            r#"<textarea id="{0}" name="{0}" rows="3" required>{1}</textarea>"#,
            name,
            html_escape(value)
        )
    } else {
        format!(
            r#"<input id="{0}" name="{0}" type="{1}" value="{2}" required{3}>"#,
            name,
            input,
            html_escape(value),
            if input == "number" { r#" min="0" step="0.01""# } else { "" }
        )
    };
    format!(
        r#"<div class="form-group"><label for="{}">{} *</label>{}{}</div>"#,
        name, label, control, error
    )
}

/// Add form, or edit form when `editing` carries the event id
fn event_form_card(form: &EventForm, errors: Option<&FormErrors>, editing: Option<&str>) -> String {
    let (heading, action, submit, cancel) = match editing {
        Some(id) => (
            "Edit Event",
            format!("/admin/events/{}", urlencoding::encode(id)),
            "Update Event",
            r#"<a href="/admin/events" class="btn btn-secondary">Cancel</a>"#,
        ),
        None => ("Add New Event", "/admin/events".to_string(), "Add Event", ""),
    };

    format!(
        r#"<div class="card" style="margin-bottom:2rem;">
            <h3>{heading}</h3>
            <form method="post" action="{action}">
                <div class="form-grid">
                    {name}
                    {location}
                    {date}
                    {time}
                    {fees}
                </div>
                {description}
                {cancel}
                <button type="submit" class="btn btn-primary">{submit}</button>
            </form>
        </div>"#,
        heading = heading,
        action = action,
        name = event_field(form, errors, "name", "Event Name", "text"),
        location = event_field(form, errors, "location", "Location", "text"),
        date = event_field(form, errors, "date", "Date", "date"),
        time = event_field(form, errors, "time", "Time", "text"),
        fees = event_field(form, errors, "fees", "Registration Fees (₹)", "number"),
        description = event_field(form, errors, "description", "Description", "textarea"),
        cancel = cancel,
        submit = submit,
    )
}

async fn events_table(state: &AppState) -> String {
    let store = state.store.read().await;
    let rows: Vec<_> = store
        .list_events()
        .iter()
        .map(|event| {
            let id = urlencoding::encode(&event.id);
            format!(
                r#"<tr>
                    <td><strong>{}</strong></td>
                    <td>{}</td>
                    <td>{} at {}</td>
                    <td>{}</td>
                    <td>
                        <a href="/admin/events/{id}/edit" class="btn btn-secondary">Edit</a>
                        <form method="post" action="/admin/events/{id}/delete" class="inline"
                              onsubmit="return confirm('Are you sure you want to delete this event?');">
                            <button type="submit" class="btn btn-danger">Delete</button>
                        </form>
                    </td>
                </tr>"#,
                html_escape(&event.name),
                html_escape(&event.location),
                format_short_date(event.date),
                html_escape(&event.time),
                format_rupees(event.fees),
                id = id,
            )
        })
        .collect();

    let body = if rows.is_empty() {
        r#"<tr><td colspan="5" class="muted" style="text-align:center;">No events added yet</td></tr>"#
            .to_string()
    } else {
        rows.join("\n")
    };

    format!(
        r#"<h3 style="margin-bottom:1rem;">All Events</h3>
        <table>
            <thead><tr><th>Event Name</th><th>Location</th><th>Date &amp; Time</th><th>Fees</th><th>Actions</th></tr></thead>
            <tbody>{}</tbody>
        </table>"#,
        body
    )
}

/// GET /admin/events - Event management
async fn events_page(State(state): State<AppState>, Query(params): Query<NoticeParams>) -> Response {
    if let Err(redirect) = require_admin(&state).await {
        return redirect;
    }

    let content = format!(
        "{}{}",
        event_form_card(&EventForm::default(), None, None),
        events_table(&state).await
    );
    admin_page("Events", "Events", params.msg.as_deref(), &content).into_response()
}

async fn invalid_event_form(
    state: &AppState,
    form: &EventForm,
    errors: &FormErrors,
    editing: Option<&str>,
) -> Response {
    let content = format!(
        "{}{}",
        event_form_card(form, Some(errors), editing),
        events_table(state).await
    );
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        admin_page("Events", "Events", Some("error:Please fix the highlighted fields"), &content),
    )
        .into_response()
}

/// POST /admin/events - Add an event
async fn create_event(State(state): State<AppState>, Form(form): Form<EventForm>) -> Response {
    if let Err(redirect) = require_admin(&state).await {
        return redirect;
    }

    match form.validate() {
        Ok(draft) => {
            state.store.write().await.add_event(draft).await;
            Redirect::to(&with_notice("/admin/events", "Event added successfully")).into_response()
        }
        Err(errors) => invalid_event_form(&state, &form, &errors, None).await,
    }
}

/// GET /admin/events/:id/edit - Edit form pre-filled from the event
async fn edit_event(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    if let Err(redirect) = require_admin(&state).await {
        return redirect;
    }

    let form = match state.store.read().await.find_event(&id) {
        Some(event) => EventForm::from_event(event),
        None => {
            return Redirect::to(&with_notice("/admin/events", "error:Event not found"))
                .into_response()
        }
    };

    let content = format!(
        "{}{}",
        event_form_card(&form, None, Some(&id)),
        events_table(&state).await
    );
    admin_page("Edit Event", "Events", None, &content).into_response()
}

/// POST /admin/events/:id - Update an event
async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<EventForm>,
) -> Response {
    if let Err(redirect) = require_admin(&state).await {
        return redirect;
    }

    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => return invalid_event_form(&state, &form, &errors, Some(&id)).await,
    };

    let updated = state.store.write().await.update_event(&id, draft).await;
    let msg = if updated.is_some() {
        "Event updated successfully"
    } else {
        "error:Event not found"
    };
    Redirect::to(&with_notice("/admin/events", msg)).into_response()
}

/// POST /admin/events/:id/delete - Delete an event
async fn delete_event(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    if let Err(redirect) = require_admin(&state).await {
        return redirect;
    }

    let msg = if state.store.write().await.delete_event(&id).await {
        "Event deleted successfully"
    } else {
        "error:Event not found"
    };
    Redirect::to(&with_notice("/admin/events", msg)).into_response()
}

/// GET /admin/registrations - All registrations
async fn registrations_page(
    State(state): State<AppState>,
    Query(params): Query<NoticeParams>,
) -> Response {
    if let Err(redirect) = require_admin(&state).await {
        return redirect;
    }

    let store = state.store.read().await;
    let rows: Vec<_> = store
        .list_registrations()
        .iter()
        .map(|r| {
            format!(
                "<tr><td><strong>{}</strong></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                html_escape(&r.full_name),
                html_escape(&r.event_name),
                html_escape(&r.email),
                html_escape(&r.phone),
                html_escape(&r.college),
                format_timestamp(r.registered_at)
            )
        })
        .collect();
    let body = if rows.is_empty() {
        r#"<tr><td colspan="6" class="muted" style="text-align:center;">No registrations yet</td></tr>"#
            .to_string()
    } else {
        rows.join("\n")
    };

    let content = format!(
        r#"<h3 style="margin-bottom:1rem;">All Registrations</h3>
        <table>
            <thead><tr><th>Name</th><th>Event</th><th>Email</th><th>Phone</th><th>College</th><th>Registered At</th></tr></thead>
            <tbody>{}</tbody>
        </table>"#,
        body
    );
    admin_page("Registrations", "Registrations", params.msg.as_deref(), &content).into_response()
}

/// GET /admin/payments - Payment status per registration
async fn payments_page(State(state): State<AppState>, Query(params): Query<NoticeParams>) -> Response {
    if let Err(redirect) = require_admin(&state).await {
        return redirect;
    }

    let store = state.store.read().await;
    let rows: Vec<_> = store
        .list_registrations()
        .iter()
        .map(|r| {
            let badge = match r.payment_status {
                PaymentStatus::Pending => "pending",
                PaymentStatus::Completed => "completed",
            };
            format!(
                r#"<tr><td><strong>{}</strong></td><td>{}</td><td>{}</td><td>{}</td><td><span class="badge {}">{}</span></td><td>{}</td></tr>"#,
                html_escape(&r.full_name),
                html_escape(&r.event_name),
                format_rupees(store.registration_amount(r)),
                r.payment_option,
                badge,
                r.payment_status,
                format_short_date(r.registered_at.date_naive())
            )
        })
        .collect();
    let body = if rows.is_empty() {
        r#"<tr><td colspan="6" class="muted" style="text-align:center;">No payment records yet</td></tr>"#
            .to_string()
    } else {
        rows.join("\n")
    };

    let content = format!(
        r#"<h3 style="margin-bottom:1rem;">Payment Details</h3>
        <table>
            <thead><tr><th>Name</th><th>Event</th><th>Amount</th><th>Payment Method</th><th>Status</th><th>Date</th></tr></thead>
            <tbody>{}</tbody>
        </table>"#,
        body
    );
    admin_page("Payments", "Payments", params.msg.as_deref(), &content).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{create_activity_log, ActivityEntry};
    use crate::models::{PaymentOption, RegistrationDraft};
    use crate::session::AdminSession;
    use crate::state::{create_shared_event_store, EventStore, Storage};
    use crate::web::server::{build_router, DEFAULT_CHECKOUT_KEY_ID};
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    async fn test_state(dir: &tempfile::TempDir) -> AppState {
        let storage = Storage::new(dir.path());
        let store = create_shared_event_store(EventStore::hydrate(storage.clone()).await);
        AppState::new(
            store,
            AdminSession::new(storage),
            DEFAULT_CHECKOUT_KEY_ID,
            create_activity_log(50),
        )
    }

    async fn logged_in_state(dir: &tempfile::TempDir) -> AppState {
        let state = test_state(dir).await;
        state.session.login("admin", "admin123").await.unwrap();
        state
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Option<String>, String) {
        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, location, String::from_utf8(body.to_vec()).unwrap())
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    const EVENT_FORM: &str =
        "name=Robotics+Expo&description=Bots&location=Hangar+2&date=2025-12-20&time=10%3A00&fees=350";

    #[tokio::test]
    async fn test_admin_views_redirect_when_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        for uri in ["/admin", "/admin/events", "/admin/registrations", "/admin/payments"] {
            let (status, location, _) = send(&state, get_req(uri)).await;
            assert_eq!(status, StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(location.as_deref(), Some("/admin/login"));
        }

        let (status, location, _) = send(&state, post_form("/admin/events", EVENT_FORM)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/admin/login"));
        assert_eq!(state.store.read().await.list_events().len(), 4);
    }

    #[tokio::test]
    async fn test_login_flow() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        let (status, _, body) =
            send(&state, post_form("/admin/login", "username=admin&password=wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Invalid credentials"));
        assert!(!state.session.is_logged_in().await);

        let (status, location, _) =
            send(&state, post_form("/admin/login", "username=admin&password=admin123")).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(location.unwrap().starts_with("/admin?msg="));
        assert!(state.session.is_logged_in().await);

        let (status, _, body) = send(&state, get_req("/admin")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Total Events"));
        assert!(body.contains("Pending Payments"));
        assert!(body.contains(r#"<form method="post" action="/admin/logout""#));

        let (status, _, _) = send(&state, get_req("/admin/logout")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(state.session.is_logged_in().await);

        let (status, location, _) = send(&state, post_form("/admin/logout", "")).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(location.unwrap().starts_with("/?msg="));
        assert!(!state.session.is_logged_in().await);
    }

    #[tokio::test]
    async fn test_overview_lists_recent_activity() {
        let dir = tempfile::tempdir().unwrap();
        let state = logged_in_state(&dir).await;
        state.activity.record(ActivityEntry {
            timestamp: chrono::Utc::now(),
            level: tracing::Level::WARN,
            target: "eventhub::state::event_store".to_string(),
            message: "Deleted event 2 still referenced by 1 registration(s)".to_string(),
        });

        let (status, _, body) = send(&state, get_req("/admin")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<div class="WARN" title="eventhub::state::event_store">"#));
        assert!(body.contains("Deleted event 2 still referenced by 1 registration(s)"));
    }

    #[tokio::test]
    async fn test_event_crud() {
        let dir = tempfile::tempdir().unwrap();
        let state = logged_in_state(&dir).await;

        let (status, location, _) = send(&state, post_form("/admin/events", EVENT_FORM)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(
            location.as_deref(),
            Some("/admin/events?msg=Event%20added%20successfully")
        );
        let added = state.store.read().await.list_events()[4].clone();
        assert_eq!(added.name, "Robotics Expo");
        assert_eq!(added.fees, 350.0);

        let (status, _, body) = send(&state, get_req(&format!("/admin/events/{}/edit", added.id))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Update Event"));
        assert!(body.contains("Hangar 2"));

        let update = EVENT_FORM.replace("fees=350", "fees=400");
        send(&state, post_form(&format!("/admin/events/{}", added.id), &update)).await;
        let store = state.store.read().await;
        let updated = store.find_event(&added.id).unwrap();
        assert_eq!(updated.fees, 400.0);
        drop(store);

        let (_, location, _) = send(&state, post_form("/admin/events/2/delete", "")).await;
        assert_eq!(
            location.as_deref(),
            Some("/admin/events?msg=Event%20deleted%20successfully")
        );
        let ids: Vec<String> = state
            .store
            .read()
            .await
            .list_events()
            .iter()
            .map(|e| e.id.clone())
            .collect();
        assert_eq!(ids, vec!["1".to_string(), "3".to_string(), "4".to_string(), added.id]);
    }

    #[tokio::test]
    async fn test_unknown_event_ids_are_noops() {
        let dir = tempfile::tempdir().unwrap();
        let state = logged_in_state(&dir).await;

        let (_, location, _) = send(&state, post_form("/admin/events/404", EVENT_FORM)).await;
        assert_eq!(location.as_deref(), Some("/admin/events?msg=error%3AEvent%20not%20found"));
        let (_, location, _) = send(&state, post_form("/admin/events/404/delete", "")).await;
        assert_eq!(location.as_deref(), Some("/admin/events?msg=error%3AEvent%20not%20found"));
        assert_eq!(state.store.read().await.list_events().len(), 4);
    }

    #[tokio::test]
    async fn test_invalid_event_form_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = logged_in_state(&dir).await;

        let (status, _, body) = send(
            &state,
            post_form("/admin/events", "name=&description=x&location=y&date=soon&time=1&fees=abc"),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("Event name is required"));
        assert!(body.contains("Fees must be a non-negative number"));
        assert_eq!(state.store.read().await.list_events().len(), 4);
    }

    #[tokio::test]
    async fn test_payments_tolerate_deleted_events() {
        let dir = tempfile::tempdir().unwrap();
        let state = logged_in_state(&dir).await;
        {
            let mut store = state.store.write().await;
            store
                .add_registration(RegistrationDraft {
                    event_id: "2".to_string(),
                    event_name: "Cultural Fest - Harmony".to_string(),
                    full_name: "Farah Ali".to_string(),
                    email: "farah@example.com".to_string(),
                    phone: "9000012345".to_string(),
                    college: "Design".to_string(),
                    payment_option: PaymentOption::CreditCard,
                })
                .await;
            store.delete_event("2").await;
        }

        let (status, _, body) = send(&state, get_req("/admin/payments")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Farah Ali"));
        assert!(body.contains("₹0"));
        assert!(body.contains("Pending"));

        let (_, _, body) = send(&state, get_req("/admin/registrations")).await;
        assert!(body.contains("Cultural Fest - Harmony"));
        assert!(body.contains("farah@example.com"));
    }
}
