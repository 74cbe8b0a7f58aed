//! Web server and the public pages: event listing, registration and checkout

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::admin::admin_router;
use super::forms::{FormErrors, RegistrationForm};
use super::pages::{
    format_long_date, format_rupees, html_escape, message_page, notice_banner, page,
    public_navbar,
};
use crate::logging::SharedActivityLog;
use crate::models::{Event, PaymentOption};
use crate::payment::{CheckoutDesk, CheckoutResult, PaymentOutcome};
use crate::session::AdminSession;
use crate::state::SharedEventStore;

/// Test key used when no checkout key is configured
pub const DEFAULT_CHECKOUT_KEY_ID: &str = "rzp_test_RNh0qZpmrPFLcI";

/// Web server configuration
pub struct WebServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Certificate and key PEM files; HTTPS is used only when both are set
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,
    /// Key id passed to the checkout widget
    pub checkout_key_id: String,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            cert_path: None,
            key_path: None,
            checkout_key_id: DEFAULT_CHECKOUT_KEY_ID.to_string(),
        }
    }
}

impl WebServerConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cert_path: std::env::var("TLS_CERT_PATH").ok().map(PathBuf::from),
            key_path: std::env::var("TLS_KEY_PATH").ok().map(PathBuf::from),
            checkout_key_id: std::env::var("CHECKOUT_KEY_ID")
                .unwrap_or(defaults.checkout_key_id),
        }
    }

    fn tls_paths(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.cert_path.as_ref().zip(self.key_path.as_ref())
    }
}

/// Shared state for web handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SharedEventStore,
    pub session: AdminSession,
    pub checkout: Arc<CheckoutDesk>,
    pub activity: SharedActivityLog,
}

impl AppState {
    pub fn new(
        store: SharedEventStore,
        session: AdminSession,
        checkout_key_id: &str,
        activity: SharedActivityLog,
    ) -> Self {
        Self {
            store,
            session,
            checkout: Arc::new(CheckoutDesk::new(checkout_key_id)),
            activity,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route(
            "/events/:id/register",
            get(registration_form).post(submit_registration),
        )
        .route("/checkout/:order_id", get(checkout_page))
        .route("/checkout/:order_id/pay", post(checkout_pay))
        .route("/checkout/:order_id/dismiss", post(checkout_dismiss))
        .nest("/admin", admin_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start serving until the process is stopped
pub async fn start_web_server(config: WebServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);
    let addr = SocketAddr::new(config.host, config.port);

    if let Some((cert_path, key_path)) = config.tls_paths() {
        info!("Loading TLS certificates:");
        info!("  Certificate: {}", cert_path.display());
        info!("  Private key: {}", key_path.display());

        let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to load TLS certificates: {}\n  Certificate: {}\n  Private key: {}",
                    e,
                    cert_path.display(),
                    key_path.display()
                )
            })?;

        info!("Web server listening on https://{}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await?;
    } else {
        if config.cert_path.is_some() || config.key_path.is_some() {
            warn!("Only one of TLS_CERT_PATH/TLS_KEY_PATH is set, serving plain HTTP");
        }
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Web server listening on http://{}", listener.local_addr()?);
        info!("Admin panel available at http://{}/admin", listener.local_addr()?);
        axum::serve(listener, app).await?;
    }

    Ok(())
}

/// Health check endpoint
async fn health() -> &'static str {
    "EventHub running"
}

#[derive(Deserialize, Default)]
struct IndexParams {
    q: Option<String>,
    msg: Option<String>,
}

fn event_card(event: &Event) -> String {
    format!(
        r#"<div class="card">
            <h3>{name}</h3>
            <p class="muted">{description}</p>
            <p style="margin-top:0.75rem;">📍 {location}</p>
            <p>📅 {date}</p>
            <p>🕒 {time}</p>
            <div class="fees">{fees}</div>
            <a href="/events/{id}/register" class="btn btn-primary">Register Now</a>
        </div>"#,
        name = html_escape(&event.name),
        description = html_escape(&event.description),
        location = html_escape(&event.location),
        date = format_long_date(event.date),
        time = html_escape(&event.time),
        fees = format_rupees(event.fees),
        id = urlencoding::encode(&event.id),
    )
}

/// GET / - Event listing with search
async fn index(State(state): State<AppState>, Query(params): Query<IndexParams>) -> Html<String> {
    let query = params.q.unwrap_or_default();
    let store = state.store.read().await;
    let events = store.search_events(&query);

    let listing = if events.is_empty() {
        r#"<p class="muted" style="text-align:center;padding:3rem 0;">No events found matching your search.</p>"#
            .to_string()
    } else {
        format!(
            r#"<div class="cards">{}</div>"#,
            events
                .iter()
                .map(|e| event_card(e))
                .collect::<Vec<_>>()
                .join("\n")
        )
    };

    Html(page(
        "Events",
        public_navbar(),
        &format!(
            r#"<section class="hero">
        <h2>Discover Events That Matter</h2>
        <p>Register for workshops, hackathons, cultural fests, and tech summits. Join the community and expand your horizons.</p>
    </section>
    <div class="container">
        {notice}
        <form method="get" action="/" style="max-width:420px;margin:0 auto 2rem;" class="form-group">
            <input type="text" name="q" value="{query}" placeholder="Search events by name or location...">
        </form>
        {listing}
    </div>"#,
            notice = notice_banner(params.msg.as_deref()),
            query = html_escape(&query),
            listing = listing,
        ),
    ))
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(message_page("Not Found", &html_escape(message), "/", "Back to events")),
    )
        .into_response()
}

fn field(
    form_value: &str,
    errors: Option<&FormErrors>,
    name: &str,
    label: &str,
    input_type: &str,
    placeholder: &str,
) -> String {
    let error = errors
        .and_then(|e| e.for_field(name))
        .map(|m| format!(r#"<div class="field-error">{}</div>"#, html_escape(m)))
        .unwrap_or_default();
    format!(
        r#"<div class="form-group">
                <label for="{name}">{label} *</label>
                <input id="{name}" name="{name}" type="{input_type}" value="{value}" placeholder="{placeholder}" required>
                {error}
            </div>"#,
        name = name,
        label = label,
        input_type = input_type,
        value = html_escape(form_value),
        placeholder = placeholder,
        error = error,
    )
}

fn registration_page(event: &Event, form: &RegistrationForm, errors: Option<&FormErrors>) -> String {
    let options = PaymentOption::ALL
        .iter()
        .map(|o| {
            let selected = if form.payment_option == o.label() {
                " selected"
            } else {
                ""
            };
            format!(r#"<option value="{0}"{1}>{0}</option>"#, o.label(), selected)
        })
        .collect::<Vec<_>>()
        .join("");
    let payment_error = errors
        .and_then(|e| e.for_field("paymentOption"))
        .map(|m| format!(r#"<div class="field-error">{}</div>"#, html_escape(m)))
        .unwrap_or_default();
    let method_row = if form.payment_option.is_empty() {
        String::new()
    } else {
        format!(
            "<div><span class=\"muted\">Payment Method:</span><span>{}</span></div>",
            html_escape(&form.payment_option)
        )
    };

    page(
        &format!("Register for {}", event.name),
        public_navbar(),
        &format!(
            r#"<div class="container">
        <div class="card" style="max-width:720px;margin:0 auto;">
            <h2>Register for {name}</h2>
            <p class="muted" style="margin-bottom:1.5rem;">Fill in your details to complete the registration</p>
            <form method="post" action="/events/{id}/register">
                {full_name}
                {email}
                {phone}
                {college}
                <div class="form-group">
                    <label for="paymentOption">Payment Option *</label>
                    <select id="paymentOption" name="paymentOption" required>
                        <option value="">Select payment method</option>
                        {options}
                    </select>
                    {payment_error}
                </div>
                <div class="summary">
                    <h4>Payment Summary</h4>
                    <div><span class="muted">Event:</span><span>{name}</span></div>
                    <div><span class="muted">Registration Fees:</span><span>{fees}</span></div>
                    {method_row}
                    <div><span class="muted">Payment Status:</span><span class="badge pending">Pending</span></div>
                </div>
                <a href="/" class="btn btn-secondary">Cancel</a>
                <button type="submit" class="btn btn-primary">Proceed to Pay</button>
            </form>
        </div>
    </div>"#,
            name = html_escape(&event.name),
            id = urlencoding::encode(&event.id),
            full_name = field(&form.full_name, errors, "fullName", "Full Name", "text", "Enter your full name"),
            email = field(&form.email, errors, "email", "Email", "email", "your.email@example.com"),
            phone = field(&form.phone, errors, "phone", "Phone Number", "tel", "+91 XXXXX XXXXX"),
            college = field(&form.college, errors, "college", "College/Department", "text", "Your college or department"),
            options = options,
            payment_error = payment_error,
            fees = format_rupees(event.fees),
            method_row = method_row,
        ),
    )
}

/// GET /events/:id/register - Registration form
async fn registration_form(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let store = state.store.read().await;
    match store.find_event(&id) {
        Some(event) => Html(registration_page(event, &RegistrationForm::default(), None)).into_response(),
        None => not_found("This event does not exist."),
    }
}

/// POST /events/:id/register - Validate and open the checkout widget
async fn submit_registration(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<RegistrationForm>,
) -> Response {
    let event = match state.store.read().await.find_event(&id) {
        Some(event) => event.clone(),
        None => return not_found("This event does not exist."),
    };

    let draft = match form.validate(&event) {
        Ok(draft) => draft,
        Err(errors) => {
            info!(
                "Registration form for '{}' rejected with {} error(s)",
                event.name,
                errors.len()
            );
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(registration_page(&event, &form, Some(&errors))),
            )
                .into_response();
        }
    };

    let request = state.checkout.start(state.store.clone(), &event, draft);
    Redirect::to(&format!("/checkout/{}", request.order_id)).into_response()
}

/// GET /checkout/:order_id - Mock checkout widget
async fn checkout_page(State(state): State<AppState>, Path(order_id): Path<String>) -> Response {
    let Some(request) = state.checkout.widget().request(&order_id) else {
        return not_found("This checkout has expired or was already completed.");
    };

    Html(page(
        "Checkout",
        public_navbar(),
        &format!(
            r#"<div class="container">
        <div class="card" style="max-width:460px;margin:2rem auto;border-top:6px solid {color};">
            <h2>{name}</h2>
            <p class="muted">{description}</p>
            <div class="summary">
                <div><span class="muted">Amount:</span><strong>{display_amount} {currency}</strong></div>
                <div><span class="muted">Name:</span><span>{prefill_name}</span></div>
                <div><span class="muted">Email:</span><span>{prefill_email}</span></div>
                <div><span class="muted">Contact:</span><span>{prefill_contact}</span></div>
                <div><span class="muted">Order:</span><code>{order_id}</code></div>
            </div>
            <form method="post" action="/checkout/{order_id}/pay" class="inline">
                <button type="submit" class="btn btn-primary" style="background:{color};">Pay {display_amount}</button>
            </form>
            <form method="post" action="/checkout/{order_id}/dismiss" class="inline">
                <button type="submit" class="btn btn-secondary">Cancel</button>
            </form>
        </div>
    </div>"#,
            color = html_escape(&request.theme.color),
            name = html_escape(&request.name),
            description = html_escape(&request.description),
            currency = html_escape(&request.currency),
            prefill_name = html_escape(&request.prefill.name),
            prefill_email = html_escape(&request.prefill.email),
            prefill_contact = html_escape(&request.prefill.contact),
            order_id = html_escape(&request.order_id),
            display_amount = format_rupees(request.amount as f64 / 100.0),
        ),
    ))
    .into_response()
}

fn cancelled_page() -> Response {
    Html(message_page(
        "Payment cancelled",
        "No registration was created. You can try again at any time.",
        "/",
        "Back to events",
    ))
    .into_response()
}

/// POST /checkout/:order_id/pay - Widget success callback
async fn checkout_pay(State(state): State<AppState>, Path(order_id): Path<String>) -> Response {
    match state.checkout.finish(&order_id, PaymentOutcome::success()).await {
        Some(CheckoutResult::Registered { registration, tx_ref }) => Html(message_page(
            "Registration Successful!",
            &format!(
                "You have successfully registered for <strong>{}</strong>.<br>Payment reference <code>{}</code>. Check your email for confirmation details.",
                html_escape(&registration.event_name),
                html_escape(&tx_ref)
            ),
            "/",
            "Back to events",
        ))
        .into_response(),
        Some(CheckoutResult::Cancelled) => cancelled_page(),
        None => not_found("This checkout has expired or was already completed."),
    }
}

/// POST /checkout/:order_id/dismiss - Widget dismiss callback
async fn checkout_dismiss(State(state): State<AppState>, Path(order_id): Path<String>) -> Response {
    match state.checkout.finish(&order_id, PaymentOutcome::Cancelled).await {
        Some(_) => cancelled_page(),
        None => not_found("This checkout has expired or was already completed."),
    }
}
