// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use super::extract::ApiPath;
use crate::{
    error::ApiError,
    models::{TipHistoryResponse, TipJarListResponse, TipJarStatusResponse, WalletAddress},
    state::AppState,
};

fn creator_address(raw: &str) -> Result<WalletAddress, ApiError> {
    WalletAddress::parse(raw).ok_or_else(|| ApiError::bad_request("Invalid address"))
}

#[utoipa::path(
    get,
    path = "/api/tipjars",
    tag = "Tip Jars",
    responses(
        (status = 200, body = TipJarListResponse),
        (status = 503, description = "Blockchain not configured or unreachable")
    )
)]
pub async fn list_tip_jars(State(state): State<AppState>) -> Result<Json<TipJarListResponse>, ApiError> {
    let jars = state.tipjars()?.get_all_tip_jars().await?;
    Ok(Json(TipJarListResponse {
        tip_jars: jars.into_iter().map(|a| a.to_string()).collect(),
    }))
}

/// Whether a creator has a tip jar, and its current totals.
#[utoipa::path(
    get,
    path = "/api/tipjars/{creator}",
    params(("creator" = String, Path, description = "Creator wallet address")),
    tag = "Tip Jars",
    responses(
        (status = 200, body = TipJarStatusResponse),
        (status = 400, description = "Invalid address"),
        (status = 502, description = "Contract read failed"),
        (status = 503, description = "Blockchain not configured or unreachable")
    )
)]
pub async fn get_creator_tip_jar(
    State(state): State<AppState>,
    ApiPath(creator): ApiPath<String>,
) -> Result<Json<TipJarStatusResponse>, ApiError> {
    let creator = creator_address(&creator)?;
    let client = state.tipjars()?;

    let tip_jar = match client.get_tip_jar_address(creator.as_str()).await? {
        Some(jar) => Some(client.get_tip_jar_info(jar).await?),
        None => None,
    };

    Ok(Json(TipJarStatusResponse {
        creator,
        has_tip_jar: tip_jar.is_some(),
        tip_jar,
    }))
}

/// Recent tips received by a creator's tip jar.
#[utoipa::path(
    get,
    path = "/api/tipjars/{creator}/tips",
    params(("creator" = String, Path, description = "Creator wallet address")),
    tag = "Tip Jars",
    responses(
        (status = 200, body = TipHistoryResponse),
        (status = 400, description = "Invalid address"),
        (status = 404, description = "Creator has no tip jar"),
        (status = 503, description = "Blockchain not configured or unreachable")
    )
)]
pub async fn get_creator_tips(
    State(state): State<AppState>,
    ApiPath(creator): ApiPath<String>,
) -> Result<Json<TipHistoryResponse>, ApiError> {
    let creator = creator_address(&creator)?;
    let client = state.tipjars()?;

    let jar = client
        .get_tip_jar_address(creator.as_str())
        .await?
        .ok_or_else(|| ApiError::not_found("Tip jar not found"))?;
    let tips = client.get_recent_tips(jar).await?;

    Ok(Json(TipHistoryResponse {
        creator,
        tip_jar: jar.to_string(),
        tips,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::ALICE;
    use crate::state::test_state;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn unconfigured_chain_is_503() {
        let (state, _dir) = test_state();

        let err = list_tip_jars(State(state.clone())).await.unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);

        let err = get_creator_tip_jar(State(state.clone()), ApiPath(ALICE.into()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);

        let err = get_creator_tips(State(state), ApiPath(ALICE.into())).await.unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn invalid_creator_is_400_before_chain_access() {
        let (state, _dir) = test_state();
        let err = get_creator_tip_jar(State(state), ApiPath("0xnope".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid address");
    }
}
