use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::db::{PrivateBetParticipantRow, PrivateBetRow};
use crate::models::domain::{Outcome, PrivateBet, PrivateBetParticipant, PrivateBetStatus};

pub async fn create<'e, E>(
    exec: E,
    creator_id: Uuid,
    title: &str,
    description: &str,
    stake_amount: Decimal,
    invite_code: &str,
    closes_at: DateTime<Utc>,
    voting_deadline: DateTime<Utc>,
) -> Result<PrivateBet, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, PrivateBetRow>(
        "INSERT INTO private_bets \
         (creator_id, title, description, stake_amount, invite_code, closes_at, voting_deadline) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(creator_id)
    .bind(title)
    .bind(description)
    .bind(stake_amount)
    .bind(invite_code)
    .bind(closes_at)
    .bind(voting_deadline)
    .fetch_one(exec)
    .await?;
    Ok(row.into())
}

pub async fn get_by_invite_code<'e, E>(exec: E, invite_code: &str) -> Result<PrivateBet, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, PrivateBetRow>(
        "SELECT * FROM private_bets WHERE invite_code = $1",
    )
    .bind(invite_code)
    .fetch_optional(exec)
    .await?
    .ok_or(CoreError::InviteCodeNotFound)?;
    Ok(row.into())
}

pub async fn lock_by_invite_code<'e, E>(exec: E, invite_code: &str) -> Result<PrivateBet, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, PrivateBetRow>(
        "SELECT * FROM private_bets WHERE invite_code = $1 FOR UPDATE",
    )
    .bind(invite_code)
    .fetch_optional(exec)
    .await?
    .ok_or(CoreError::InviteCodeNotFound)?;
    Ok(row.into())
}

pub async fn get<'e, E>(exec: E, bet_id: Uuid) -> Result<PrivateBet, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, PrivateBetRow>("SELECT * FROM private_bets WHERE id = $1")
        .bind(bet_id)
        .fetch_optional(exec)
        .await?
        .ok_or(CoreError::PrivateBetNotFound)?;
    Ok(row.into())
}

pub async fn lock_for_update<'e, E>(exec: E, bet_id: Uuid) -> Result<PrivateBet, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, PrivateBetRow>(
        "SELECT * FROM private_bets WHERE id = $1 FOR UPDATE",
    )
    .bind(bet_id)
    .fetch_optional(exec)
    .await?
    .ok_or(CoreError::PrivateBetNotFound)?;
    Ok(row.into())
}

pub async fn list_expired_open<'e, E>(exec: E) -> Result<Vec<PrivateBet>, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, PrivateBetRow>(
        "SELECT * FROM private_bets WHERE status = 'open' AND closes_at <= now() FOR UPDATE",
    )
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn list_expired_voting<'e, E>(exec: E) -> Result<Vec<PrivateBet>, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, PrivateBetRow>(
        "SELECT * FROM private_bets WHERE status = 'voting' AND voting_deadline <= now() \
         FOR UPDATE",
    )
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn join<'e, E>(
    exec: E,
    bet_id: Uuid,
    user_id: Uuid,
    outcome: Outcome,
) -> Result<PrivateBetParticipant, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, PrivateBetParticipantRow>(
        "INSERT INTO private_bet_participants (bet_id, user_id, outcome) \
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(bet_id)
    .bind(user_id)
    .bind(outcome)
    .fetch_one(exec)
    .await?;
    Ok(row.into())
}

pub async fn is_participant<'e, E>(exec: E, bet_id: Uuid, user_id: Uuid) -> Result<bool, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM private_bet_participants WHERE bet_id = $1 AND user_id = $2)",
    )
    .bind(bet_id)
    .bind(user_id)
    .fetch_one(exec)
    .await?;
    Ok(exists)
}

pub async fn increment_side_count<'e, E>(
    exec: E,
    bet_id: Uuid,
    outcome: Outcome,
    stake: Decimal,
) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = match outcome {
        Outcome::Yes => {
            "UPDATE private_bets SET yes_count = yes_count + 1, total_pool = total_pool + $1 \
             WHERE id = $2"
        }
        Outcome::No => {
            "UPDATE private_bets SET no_count = no_count + 1, total_pool = total_pool + $1 \
             WHERE id = $2"
        }
    };
    sqlx::query(query)
        .bind(stake)
        .bind(bet_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn list_participants<'e, E>(
    exec: E,
    bet_id: Uuid,
) -> Result<Vec<PrivateBetParticipant>, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, PrivateBetParticipantRow>(
        "SELECT * FROM private_bet_participants WHERE bet_id = $1 FOR UPDATE",
    )
    .bind(bet_id)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn list_participants_by_outcome<'e, E>(
    exec: E,
    bet_id: Uuid,
    outcome: Outcome,
) -> Result<Vec<PrivateBetParticipant>, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, PrivateBetParticipantRow>(
        "SELECT * FROM private_bet_participants WHERE bet_id = $1 AND outcome = $2 FOR UPDATE",
    )
    .bind(bet_id)
    .bind(outcome)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn cast_vote<'e, E>(
    exec: E,
    bet_id: Uuid,
    user_id: Uuid,
    vote: Outcome,
) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        "UPDATE private_bet_participants SET vote = $1, voted_at = now() \
         WHERE bet_id = $2 AND user_id = $3 AND vote IS NULL",
    )
    .bind(vote)
    .bind(bet_id)
    .bind(user_id)
    .execute(exec)
    .await?;
    if result.rows_affected() == 0 {
        return Err(CoreError::InvalidParameter(
            "user already voted or is not a participant".to_string(),
        ));
    }
    let vote_column = match vote {
        Outcome::Yes => "yes_votes",
        Outcome::No => "no_votes",
    };
    sqlx::query(&format!(
        "UPDATE private_bets SET {vote_column} = {vote_column} + 1 WHERE id = $1"
    ))
    .bind(bet_id)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn set_participant_payout<'e, E>(
    exec: E,
    participant_id: Uuid,
    payout: Decimal,
) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE private_bet_participants SET payout = $1 WHERE id = $2")
        .bind(payout)
        .bind(participant_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn set_status<'e, E>(
    exec: E,
    bet_id: Uuid,
    status: PrivateBetStatus,
) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE private_bets SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(bet_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn resolve<'e, E>(
    exec: E,
    bet_id: Uuid,
    outcome: Outcome,
) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "UPDATE private_bets SET status = 'resolved', resolution_outcome = $1, resolved_at = now() \
         WHERE id = $2",
    )
    .bind(outcome)
    .bind(bet_id)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn cancel<'e, E>(exec: E, bet_id: Uuid) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE private_bets SET status = 'cancelled', resolved_at = now() WHERE id = $1")
        .bind(bet_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn list_for_user<'e, E>(exec: E, user_id: Uuid) -> Result<Vec<PrivateBet>, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, PrivateBetRow>(
        "SELECT pb.* FROM private_bets pb \
         JOIN private_bet_participants p ON p.bet_id = pb.id \
         WHERE p.user_id = $1 ORDER BY pb.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}
