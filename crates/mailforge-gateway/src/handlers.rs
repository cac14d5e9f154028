// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the campaign REST API.
//!
//! Handles POST /campaigns, GET /campaigns, GET /health.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use mailforge_core::traits::ContentParams;
use mailforge_core::types::{Campaign, CampaignId, MailBody, ProgressView};
use mailforge_core::MailforgeError;

use crate::server::GatewayState;

/// Request body for POST /campaigns.
///
/// Recipients come either as an explicit list or as generation parameters
/// (`first_name` + `last_name` + `domain`); the mail body either verbatim
/// or as content generation parameters.
#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    pub user_id: i64,
    pub campaign_name: String,
    /// Explicit recipient list; takes precedence over generation.
    #[serde(default)]
    pub recipients: Option<Vec<String>>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    /// Verbatim mail body; takes precedence over content generation.
    #[serde(default)]
    pub mail_body: Option<MailBody>,
    #[serde(default)]
    pub content: Option<ContentParams>,
}

/// Response body for POST /campaigns.
#[derive(Debug, Serialize)]
pub struct CreateCampaignResponse {
    pub success: bool,
    pub campaign_id: String,
    pub sent_emails: u32,
    pub failed_emails: u32,
    pub total_emails: u32,
    pub errors: Vec<String>,
}

/// Query parameters for GET /campaigns.
#[derive(Debug, Deserialize)]
pub struct CampaignQuery {
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// One campaign in a status or list response.
#[derive(Debug, Serialize)]
pub struct CampaignDetail {
    pub id: String,
    pub name: String,
    pub status: ProgressView,
    pub created_at: String,
}

impl CampaignDetail {
    fn from_campaign(campaign: &Campaign) -> Self {
        Self {
            id: campaign.id.to_string(),
            name: campaign.name.clone(),
            status: ProgressView::from_campaign(campaign),
            created_at: campaign.created_at.to_rfc3339(),
        }
    }
}

/// Response body for GET /campaigns?campaign_id=...
#[derive(Debug, Serialize)]
pub struct CampaignStatusResponse {
    pub success: bool,
    pub campaign: CampaignDetail,
}

/// Response body for GET /campaigns (list form).
#[derive(Debug, Serialize)]
pub struct CampaignListResponse {
    pub success: bool,
    pub campaigns: Vec<CampaignDetail>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// POST /campaigns
///
/// Resolves recipients and mail body (generating either when asked), then
/// runs the campaign to completion and reports the aggregate outcome.
pub async fn post_campaigns(
    State(state): State<GatewayState>,
    Json(body): Json<CreateCampaignRequest>,
) -> Response {
    let recipients = match resolve_recipients(&state, &body).await {
        Ok(recipients) => recipients,
        Err(response) => return response,
    };

    let mail_body = match resolve_mail_body(&state, &body).await {
        Ok(mail_body) => mail_body,
        Err(response) => return response,
    };

    match state
        .service
        .dispatch(body.user_id, body.campaign_name.clone(), recipients, mail_body)
        .await
    {
        Ok(outcome) => Json(CreateCampaignResponse {
            success: outcome.result.success,
            campaign_id: outcome.campaign_id.to_string(),
            sent_emails: outcome.result.sent,
            failed_emails: outcome.result.failed,
            total_emails: outcome.result.total,
            errors: outcome.result.errors,
        })
        .into_response(),
        Err(MailforgeError::QuotaExceeded {
            limit,
            sent_today,
            requested,
            remaining,
        }) => {
            warn!(user_id = body.user_id, limit, sent_today, requested, "quota exceeded");
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": format!(
                        "Daily email limit exceeded. You can send {remaining} more emails today."
                    ),
                    "limit": limit,
                    "sent": sent_today,
                    "requested": requested,
                })),
            )
                .into_response()
        }
        Err(MailforgeError::Config(message)) => {
            warn!(user_id = body.user_id, error = %message, "dispatch rejected");
            error_response(StatusCode::BAD_REQUEST, message)
        }
        Err(e) => {
            error!(user_id = body.user_id, error = %e, "dispatch failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn resolve_recipients(
    state: &GatewayState,
    body: &CreateCampaignRequest,
) -> Result<Vec<String>, Response> {
    if let Some(recipients) = &body.recipients {
        return Ok(recipients.clone());
    }

    let (Some(first_name), Some(last_name), Some(domain)) =
        (&body.first_name, &body.last_name, &body.domain)
    else {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Either recipients or first_name/last_name/domain is required",
        ));
    };

    match state
        .service
        .generate_addresses(first_name, last_name, domain)
        .await
    {
        Ok(addresses) if !addresses.is_empty() => Ok(addresses),
        Ok(_) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate email addresses",
        )),
        Err(e) => {
            error!(error = %e, "address generation failed");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate email addresses",
            ))
        }
    }
}

async fn resolve_mail_body(
    state: &GatewayState,
    body: &CreateCampaignRequest,
) -> Result<MailBody, Response> {
    if let Some(mail_body) = &body.mail_body {
        if mail_body.subject.trim().is_empty() || mail_body.description.trim().is_empty() {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "mail_body requires a non-empty subject and description",
            ));
        }
        return Ok(mail_body.clone());
    }

    let Some(params) = &body.content else {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Either mail_body or content generation parameters are required",
        ));
    };

    // Content generation falls back to a deterministic template internally,
    // so an error here is a programming error rather than an API outage.
    state.service.generate_content(params).await.map_err(|e| {
        error!(error = %e, "content generation failed");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

/// GET /campaigns
///
/// With `campaign_id`: progress for that campaign, 404 when unknown or
/// expired. Without: the owning user's unexpired campaigns, newest first.
pub async fn get_campaigns(
    State(state): State<GatewayState>,
    Query(query): Query<CampaignQuery>,
) -> Response {
    if let Some(campaign_id) = &query.campaign_id {
        let id = CampaignId(campaign_id.clone());
        return match state.service.campaign(&id).await {
            Ok(Some(campaign)) => Json(CampaignStatusResponse {
                success: true,
                campaign: CampaignDetail::from_campaign(&campaign),
            })
            .into_response(),
            Ok(None) => error_response(StatusCode::NOT_FOUND, "Campaign not found"),
            Err(e) => {
                error!(campaign_id = %id, error = %e, "status query failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
    }

    let Some(user_id) = query.user_id else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "campaign_id or user_id is required",
        );
    };

    match state.service.list_campaigns(user_id).await {
        Ok(campaigns) => Json(CampaignListResponse {
            success: true,
            campaigns: campaigns.iter().map(CampaignDetail::from_campaign).collect(),
        })
        .into_response(),
        Err(e) => {
            error!(user_id, error = %e, "campaign list failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
