//! Private-bet endpoints: `create`, `join`, `start_voting`, `cast_vote`,
//! `lookup`, `detail`, `my_bets`.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::api::{
    CastVoteRequest, CreatePrivateBetRequest, JoinPrivateBetRequest, MyBetsQuery,
    PrivateBetResponse, StartVotingRequest,
};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/private-bets",
    request_body = CreatePrivateBetRequest,
    responses((status = 200, description = "Bet created", body = PrivateBetResponse)),
    tag = "private_bets"
)]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreatePrivateBetRequest>,
) -> Result<Json<PrivateBetResponse>, CoreError> {
    let outcome = crate::private_bet::create_bet(
        &state.ledger,
        req.creator_id,
        req.title,
        req.description,
        req.stake_amount,
        req.creator_outcome,
        req.closes_at,
        Utc::now(),
    )
    .await?;
    Ok(Json(PrivateBetResponse(outcome.bet)))
}

#[utoipa::path(
    post,
    path = "/api/private-bets/join",
    request_body = JoinPrivateBetRequest,
    responses((status = 200, description = "Joined bet", body = PrivateBetResponse)),
    tag = "private_bets"
)]
pub async fn join(
    State(state): State<AppState>,
    Json(req): Json<JoinPrivateBetRequest>,
) -> Result<Json<PrivateBetResponse>, CoreError> {
    let bet =
        crate::private_bet::join_bet(&state.ledger, req.user_id, &req.invite_code, req.outcome)
            .await?;
    Ok(Json(PrivateBetResponse(bet)))
}

#[utoipa::path(
    post,
    path = "/api/private-bets/{bet_id}/start-voting",
    params(("bet_id" = Uuid, Path, description = "Bet to move into voting")),
    request_body = StartVotingRequest,
    responses((status = 200, description = "Bet moved to voting", body = PrivateBetResponse)),
    tag = "private_bets"
)]
pub async fn start_voting(
    State(state): State<AppState>,
    Path(bet_id): Path<Uuid>,
    Json(req): Json<StartVotingRequest>,
) -> Result<Json<PrivateBetResponse>, CoreError> {
    let bet =
        crate::private_bet::start_voting(&state.ledger, req.requester_id, bet_id, Utc::now())
            .await?;
    Ok(Json(PrivateBetResponse(bet)))
}

#[utoipa::path(
    post,
    path = "/api/private-bets/{bet_id}/vote",
    params(("bet_id" = Uuid, Path, description = "Bet being voted on")),
    request_body = CastVoteRequest,
    responses((status = 200, description = "Vote recorded")),
    tag = "private_bets"
)]
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(bet_id): Path<Uuid>,
    Json(req): Json<CastVoteRequest>,
) -> Result<Json<serde_json::Value>, CoreError> {
    crate::private_bet::cast_vote(&state.ledger, bet_id, req.user_id, req.vote).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[utoipa::path(
    get,
    path = "/api/private-bets/lookup/{invite_code}",
    params(("invite_code" = String, Path, description = "Six-character invite code")),
    responses((status = 200, description = "Bet found", body = PrivateBetResponse)),
    tag = "private_bets"
)]
pub async fn lookup(
    State(state): State<AppState>,
    Path(invite_code): Path<String>,
) -> Result<Json<PrivateBetResponse>, CoreError> {
    let bet = crate::private_bet::lookup_bet(&state.ledger, &invite_code).await?;
    Ok(Json(PrivateBetResponse(bet)))
}

#[utoipa::path(
    get,
    path = "/api/private-bets/{bet_id}",
    params(("bet_id" = Uuid, Path, description = "Bet id")),
    responses((status = 200, description = "Bet found", body = PrivateBetResponse)),
    tag = "private_bets"
)]
pub async fn detail(
    State(state): State<AppState>,
    Path(bet_id): Path<Uuid>,
) -> Result<Json<PrivateBetResponse>, CoreError> {
    let bet = crate::private_bet::get_bet_detail(&state.ledger, bet_id).await?;
    Ok(Json(PrivateBetResponse(bet)))
}

#[utoipa::path(
    get,
    path = "/api/private-bets/mine",
    params(("user_id" = Uuid, Query, description = "Participant user id")),
    responses((status = 200, description = "Bets the user participates in", body = [crate::models::domain::PrivateBet])),
    tag = "private_bets"
)]
pub async fn my_bets(
    State(state): State<AppState>,
    Query(query): Query<MyBetsQuery>,
) -> Result<Json<Vec<crate::models::domain::PrivateBet>>, CoreError> {
    let bets = crate::private_bet::get_my_bets(&state.ledger, query.user_id).await?;
    Ok(Json(bets))
}
