use crate::database::DbPool;
use crate::models::participant::Participant;
use crate::utils::error::{AppError, AppResult};

/// Read-only boundary to the identity store. The core never writes
/// participant records.
pub async fn lookup(pool: &DbPool, participant_id: &str) -> AppResult<Participant> {
    sqlx::query_as::<_, Participant>("SELECT * FROM participants WHERE id = ?")
        .bind(participant_id)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("participant {participant_id} not found")))
}

pub async fn list_peers(pool: &DbPool, participant_id: &str) -> AppResult<Vec<Participant>> {
    let peers = sqlx::query_as::<_, Participant>(
        "SELECT * FROM participants WHERE id != ? ORDER BY username ASC",
    )
    .bind(participant_id)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(peers)
}
