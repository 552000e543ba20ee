use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Deserialize;

use super::success;
use crate::{
    error::AppError,
    services::mailer::EmailMessage,
    state::AppState,
    utils::Validator,
};

/// Contact form router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contact/referent", post(contact_referent))
        .route("/contact", post(contact))
}

#[derive(Debug, Deserialize)]
struct ReferentContactRequest {
    #[serde(default)]
    usr_name: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    ref_email: String,
    #[serde(default)]
    usr_email: String,
    #[serde(default)]
    usr_phone: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ContactRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    message: String,
}

/// `POST /api/contact/referent` — a customer writes to a referent.
async fn contact_referent(
    State(state): State<AppState>,
    Json(req): Json<ReferentContactRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Validator::default();
    v.required("usr_name", &req.usr_name, "Name is required")
        .required("subject", &req.subject, "Subject is required")
        .email("ref_email", &req.ref_email, "A valid referent email is required")
        .email("usr_email", &req.usr_email, "A valid email is required")
        .required("usr_phone", &req.usr_phone, "Phone number is required")
        .min_length("message", &req.message, 20, "Message must be at least 20 characters long");
    v.finish()?;

    let footer = &state.config.frontend_url;
    let message = EmailMessage {
        to: req.ref_email.trim().to_string(),
        reply_to: Some(req.usr_email.trim().to_string()),
        subject: format!("{} | Nouveau message", state.config.app_name),
        text: format!(
            "Vous avez reçu un nouveau message d'un client de la plateforme\n\
             Nom du client: {}\nEmail: {}\nObjet: {}\nTel: {}\nMessage: {}",
            req.usr_name, req.usr_email, req.subject, req.usr_phone, req.message
        ),
        html: format!(
            "<h4>Vous avez reçu un nouveau message d'un client de la plateforme:</h4>\
             <hr/>\
             <p><strong>Nom du client:</strong> {}</p>\
             <p><strong>Email:</strong> {}</p>\
             <p><strong>Objet: {}</strong></p>\
             <p><strong>Tel:</strong> <br/> {}</p>\
             <p><strong>Message:</strong> <br/> {}</p>\
             <hr/>\
             <p>Cet email peut contenir des informations sensibles</p>\
             <p>{}</p>",
            escape_html(&req.usr_name),
            escape_html(&req.usr_email),
            escape_html(&req.subject),
            escape_html(&req.usr_phone),
            escape_html(&req.message),
            escape_html(footer),
        ),
    };

    state
        .mailer
        .send(message)
        .await
        .map_err(AppError::BadGateway)?;

    tracing::info!(to = %req.ref_email, "Referent contact message relayed");
    Ok(success())
}

/// `POST /api/contact` — a visitor writes to the site operators.
async fn contact(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Validator::default();
    v.required("name", &req.name, "Name is required")
        .email("email", &req.email, "A valid email is required")
        .required("subject", &req.subject, "Subject is required")
        .min_length("message", &req.message, 20, "Message must be at least 20 characters long");
    v.finish()?;

    let message = EmailMessage {
        to: state.config.mail.contact_recipient.clone(),
        reply_to: Some(req.email.trim().to_string()),
        subject: format!("{} | Message d'un visiteur", state.config.app_name),
        text: format!(
            "Vous avez reçu un nouveau message d'un visiteur de la plateforme\n\
             Nom du visiteur: {}\nEmail: {}\nObjet: {}\nMessage: {}",
            req.name, req.email, req.subject, req.message
        ),
        html: format!(
            "<h4>Vous avez reçu un nouveau message d'un visiteur de la plateforme.</h4>\
             <hr/>\
             <p><strong>Nom du visiteur:</strong> {}</p>\
             <p><strong>Email:</strong> {}</p>\
             <p><strong>Objet du message: {}</strong></p>\
             <p><strong>Message:</strong> <br/> {}</p>\
             <hr/>\
             <p>Cet email peut contenir des informations sensibles</p>\
             <p>{}</p>",
            escape_html(&req.name),
            escape_html(&req.email),
            escape_html(&req.subject),
            escape_html(&req.message),
            escape_html(&state.config.frontend_url),
        ),
    };

    state
        .mailer
        .send(message)
        .await
        .map_err(AppError::BadGateway)?;

    tracing::info!(from = %req.email, "Visitor contact message relayed");
    Ok(success())
}

/// Escape `&`, `<`, `>`, `"` and `'` before user input is interpolated into the HTML body.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
