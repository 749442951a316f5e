use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::domain::{MatchSource, MatchView, ProfileSummary};

/// Unordered pair stored as (low, high)
pub fn ordered_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Record a match between `a` and `b`. Returns false when the pair already
/// matched before (from either source).
pub async fn insert<'e, E: PgExecutor<'e>>(
    executor: E,
    a: Uuid,
    b: Uuid,
    source: MatchSource,
    session_id: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    let (low, high) = ordered_pair(a, b);
    let result = sqlx::query(
        r#"
        INSERT INTO matches (id, user_low, user_high, source, session_id)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_low, user_high) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(low)
    .bind(high)
    .bind(source.as_str())
    .bind(session_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[derive(Debug, sqlx::FromRow)]
struct MatchRow {
    id: Uuid,
    source: String,
    created_at: DateTime<Utc>,
    partner_id: Uuid,
    display_name: String,
    avatar_url: Option<String>,
}

/// `user_id`'s matches, newest first, with the other side's profile
pub async fn list_for_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<MatchView>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MatchRow>(
        r#"
        SELECT m.id, m.source, m.created_at, p.id AS partner_id, p.display_name, p.avatar_url
        FROM matches m
        JOIN profiles p
          ON p.id = CASE WHEN m.user_low = $1 THEN m.user_high ELSE m.user_low END
        WHERE m.user_low = $1 OR m.user_high = $1
        ORDER BY m.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await?;

    rows.into_iter()
        .map(|row| {
            let source = row
                .source
                .parse()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
            Ok(MatchView {
                id: row.id,
                source,
                created_at: row.created_at,
                partner: ProfileSummary {
                    id: row.partner_id,
                    display_name: row.display_name,
                    avatar_url: row.avatar_url,
                },
            })
        })
        .collect()
}

pub async fn profile_summary<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
) -> Result<Option<ProfileSummary>, sqlx::Error> {
    sqlx::query_as::<_, ProfileSummary>(
        "SELECT id, display_name, avatar_url FROM profiles WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_pair_is_symmetric() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(ordered_pair(a, b), ordered_pair(b, a));
        let (low, high) = ordered_pair(a, b);
        assert!(low < high);
    }
}
