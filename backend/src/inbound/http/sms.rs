//! Inbound SMS webhook.
//!
//! The SMS provider posts form fields `From` and `Body`; the reply is TwiML
//! so the provider texts it back to the driver.

use actix_web::{HttpResponse, http::header::ContentType, post, web};
use serde::Deserialize;
use tracing::error;
use utoipa::ToSchema;

use crate::domain::SmsReply;
use crate::domain::ports::InboundSms;
use crate::inbound::http::state::HttpState;

/// Form body posted by the SMS provider.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct InboundSmsForm {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

/// Apply a driver text command and answer with TwiML.
///
/// Every input gets a human-readable reply, including failures.
#[utoipa::path(
    post,
    path = "/api/v1/sms/inbound",
    request_body(content = InboundSmsForm, content_type = "application/x-www-form-urlencoded"),
    responses((status = 200, description = "TwiML reply", content_type = "text/xml", body = String)),
    tags = ["sms"],
    operation_id = "inboundSms",
    security([])
)]
#[post("/sms/inbound")]
pub async fn inbound_sms(
    state: web::Data<HttpState>,
    form: web::Form<InboundSmsForm>,
) -> HttpResponse {
    let InboundSmsForm { from, body } = form.into_inner();
    let reply = match state.queue.handle_sms(InboundSms { from, body }).await {
        Ok(reply) => reply,
        Err(err) => {
            error!(error = %err, "inbound sms failed");
            SmsReply::Error
        }
    };
    HttpResponse::Ok()
        .content_type(ContentType::xml())
        .body(reply.twiml())
}
