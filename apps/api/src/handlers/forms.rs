use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use campaign_application::SubmitSubscription;
use campaign_core::AppError;
use campaign_domain::{ContactId, MailingListId};
use uuid::Uuid;

use crate::dto::{
    GenericMessageResponse, SubscribeRequest, UnsubscribeRequest, VerifySubscribeQuery,
    VerifySubscribeResponse, VerifyUnsubscribeQuery,
};
use crate::error::ApiResult;
use crate::state::AppState;


const SUBSCRIBE_ACCEPTED: &str = "Please check your inbox to confirm your subscription.";
const UNSUBSCRIBE_ACCEPTED: &str =
    "If this address is subscribed, an email with a confirmation link is on its way.";

pub async fn subscribe_handler(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> ApiResult<(StatusCode, Json<GenericMessageResponse>)> {
    let mailing_list_id = parse_mailing_list_id(payload.mailing_list_id.as_str())?;

    state
        .subscription_service
        .submit(SubmitSubscription {
            email: payload.email,
            mailing_list_id,
            source: payload.source.unwrap_or_default(),
            field_data: payload.fields.unwrap_or_default(),
        })
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(GenericMessageResponse::new(SUBSCRIBE_ACCEPTED)),
    ))
}

pub async fn verify_subscribe_handler(
    State(state): State<AppState>,
    Query(query): Query<VerifySubscribeQuery>,
) -> ApiResult<Json<VerifySubscribeResponse>> {
    let confirmed = state
        .subscription_service
        .confirm(query.token.as_str())
        .await?;

    Ok(Json(VerifySubscribeResponse {
        contact_id: confirmed.contact.id().to_string(),
        mailing_list_id: confirmed.mailing_list.id().to_string(),
        message: format!("You are now subscribed to {}.", confirmed.mailing_list.title()),
    }))
}

pub async fn unsubscribe_handler(
    State(state): State<AppState>,
    Json(payload): Json<UnsubscribeRequest>,
) -> ApiResult<Json<GenericMessageResponse>> {
    let mailing_list_id = parse_mailing_list_id(payload.mailing_list_id.as_str())?;

    state
        .subscription_service
        .request_unsubscribe(payload.email.as_str(), mailing_list_id)
        .await?;

    Ok(Json(GenericMessageResponse::new(UNSUBSCRIBE_ACCEPTED)))
}

pub async fn verify_unsubscribe_handler(
    State(state): State<AppState>,
    Query(query): Query<VerifyUnsubscribeQuery>,
) -> ApiResult<Json<GenericMessageResponse>> {
    // Tampered links look exactly like links to unknown contacts.
    let not_found = || AppError::NotFound("contact not found".to_owned());
    let contact_id = Uuid::parse_str(query.uid.as_str())
        .map(ContactId::from_uuid)
        .map_err(|_| not_found())?;
    let mailing_list_id = Uuid::parse_str(query.mlid.as_str())
        .map(MailingListId::from_uuid)
        .map_err(|_| not_found())?;

    state
        .subscription_service
        .verify_unsubscribe(query.cid.as_str(), contact_id, mailing_list_id)
        .await?;

    Ok(Json(GenericMessageResponse::new(
        "You have been unsubscribed.",
    )))
}

fn parse_mailing_list_id(value: &str) -> Result<MailingListId, AppError> {
    Uuid::parse_str(value.trim())
        .map(MailingListId::from_uuid)
        .map_err(|error| AppError::Validation(format!("invalid mailing_list_id: {error}")))
}
