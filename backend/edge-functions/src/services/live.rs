use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sfu_token::{SfuCredentials, VideoGrant, DEFAULT_TTL_SECS};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::{LiveAccess, LiveRole, LiveStream};
use crate::repository::wallets::TransactionReason;
use crate::repository::{live, wallets};

const MAX_TITLE_LEN: usize = 120;

pub fn room_name(stream_id: Uuid) -> String {
    format!("live-{}", stream_id)
}

#[derive(Debug, Serialize)]
pub struct GiftPurchase {
    pub stream_id: Uuid,
    pub gift_id: Uuid,
    pub coins_paid: i64,
    /// Balance after the debit; unchanged when access already existed
    pub coin_balance: i64,
    pub already_granted: bool,
}

#[derive(Debug, Serialize)]
pub struct LiveToken {
    pub token: String,
    pub url: String,
    pub room: String,
    pub role: LiveRole,
    pub expires_at: DateTime<Utc>,
}

pub struct LiveService {
    pool: PgPool,
    sfu: SfuCredentials,
}

impl LiveService {
    pub fn new(pool: PgPool, sfu: SfuCredentials) -> Self {
        Self { pool, sfu }
    }

    async fn stream(&self, stream_id: Uuid) -> AppResult<LiveStream> {
        live::find_stream(&self.pool, stream_id)
            .await?
            .ok_or_else(|| AppError::NotFound("stream not found".to_string()))
    }

    pub async fn create_stream(
        &self,
        host_id: Uuid,
        title: &str,
        join_gift_id: Option<Uuid>,
    ) -> AppResult<LiveStream> {
        let title = title.trim();
        if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
            return Err(AppError::Validation(format!(
                "title must be 1 to {} characters",
                MAX_TITLE_LEN
            )));
        }

        if let Some(gift_id) = join_gift_id {
            match live::find_gift(&self.pool, gift_id).await? {
                Some(gift) if gift.active => {}
                Some(_) => return Err(AppError::BadRequest("join gift is not available".to_string())),
                None => return Err(AppError::NotFound("gift not found".to_string())),
            }
        }

        if live::host_has_live_stream(&self.pool, host_id).await? {
            return Err(AppError::Conflict("you already have a live stream".to_string()));
        }

        let stream = live::insert_stream(&self.pool, host_id, title, join_gift_id).await?;
        info!(stream_id = %stream.id, host_id = %host_id, gated = !stream.is_free(), "Live stream started");
        Ok(stream)
    }

    /// Host only; ending an already ended stream returns it unchanged
    pub async fn end_stream(&self, host_id: Uuid, stream_id: Uuid) -> AppResult<LiveStream> {
        if let Some(stream) = live::end_stream(&self.pool, stream_id, host_id).await? {
            info!(stream_id = %stream_id, "Live stream ended");
            return Ok(stream);
        }

        let stream = self.stream(stream_id).await?;
        if stream.host_id != host_id {
            return Err(AppError::Forbidden("only the host can end a stream".to_string()));
        }
        Ok(stream)
    }

    pub async fn access(&self, user_id: Uuid, stream_id: Uuid) -> AppResult<LiveAccess> {
        let stream = self.stream(stream_id).await?;
        let role = if stream.host_id == user_id {
            LiveRole::Host
        } else {
            LiveRole::Viewer
        };

        let has_access = role == LiveRole::Host
            || stream.is_free()
            || live::has_grant(&self.pool, stream_id, user_id).await?;

        let join_gift = match stream.join_gift_id {
            Some(gift_id) => live::find_gift(&self.pool, gift_id).await?,
            None => None,
        };

        Ok(LiveAccess {
            stream_id,
            role,
            has_access,
            join_gift,
        })
    }

    /// Buy the stream's join gift: debit the wallet and grant access in one
    /// transaction. Buying again after access was granted charges nothing.
    pub async fn purchase_join_gift(
        &self,
        user_id: Uuid,
        stream_id: Uuid,
        gift_id: Uuid,
    ) -> AppResult<GiftPurchase> {
        let mut tx = self.pool.begin().await?;

        let stream = live::find_stream(&mut *tx, stream_id)
            .await?
            .ok_or_else(|| AppError::NotFound("stream not found".to_string()))?;
        if !stream.is_live() {
            return Err(AppError::Conflict("stream has ended".to_string()));
        }
        if stream.host_id == user_id {
            return Err(AppError::BadRequest("hosts do not need a join gift".to_string()));
        }
        if stream.join_gift_id != Some(gift_id) {
            return Err(AppError::BadRequest("gift is not this stream's join gift".to_string()));
        }

        let gift = live::find_gift(&mut *tx, gift_id)
            .await?
            .ok_or_else(|| AppError::NotFound("gift not found".to_string()))?;
        // a retired gift no longer sells, earlier buyers keep their access
        if !gift.active && !live::has_grant(&mut *tx, stream_id, user_id).await? {
            return Err(AppError::BadRequest("join gift is not available".to_string()));
        }

        if !live::insert_grant(&mut *tx, stream_id, user_id, gift.id, gift.coin_price).await? {
            let balance = wallets::find(&mut *tx, user_id)
                .await?
                .map(|w| w.coin_balance)
                .unwrap_or(0);
            tx.commit().await?;
            return Ok(GiftPurchase {
                stream_id,
                gift_id,
                coins_paid: 0,
                coin_balance: balance,
                already_granted: true,
            });
        }

        let reference = format!("live:{}", stream_id);
        let Some(balance) = wallets::debit(
            &mut *tx,
            user_id,
            gift.coin_price,
            TransactionReason::JoinGift,
            Some(&reference),
        )
        .await?
        else {
            let balance = wallets::find(&mut *tx, user_id)
                .await?
                .map(|w| w.coin_balance)
                .unwrap_or(0);
            // dropping the transaction discards the grant
            return Err(AppError::InsufficientCoins {
                required: gift.coin_price,
                balance,
            });
        };

        tx.commit().await?;
        metrics::record_coins_spent(TransactionReason::JoinGift.as_str(), gift.coin_price);
        info!(stream_id = %stream_id, user_id = %user_id, coins = gift.coin_price, "Join gift purchased");

        Ok(GiftPurchase {
            stream_id,
            gift_id,
            coins_paid: gift.coin_price,
            coin_balance: balance,
            already_granted: false,
        })
    }

    /// Hosts publish camera and microphone; viewers subscribe only and need
    /// access to a gated stream
    pub async fn token(&self, user_id: Uuid, stream_id: Uuid) -> AppResult<LiveToken> {
        let stream = self.stream(stream_id).await?;
        if !stream.is_live() {
            return Err(AppError::Conflict("stream has ended".to_string()));
        }

        let room = room_name(stream.id);
        let (role, grant) = if stream.host_id == user_id {
            (LiveRole::Host, VideoGrant::broadcaster(room.clone()))
        } else {
            let granted =
                stream.is_free() || live::has_grant(&self.pool, stream_id, user_id).await?;
            if !granted {
                return Err(AppError::LiveAccessRequired);
            }
            (LiveRole::Viewer, VideoGrant::viewer(room.clone()))
        };

        let now = Utc::now();
        let ttl = Duration::seconds(DEFAULT_TTL_SECS);
        let token = self
            .sfu
            .token()
            .identity(user_id.to_string())
            .grant(grant)
            .ttl(ttl)
            .to_jwt_at(now)?;

        Ok(LiveToken {
            token,
            url: self.sfu.url.clone(),
            room,
            role,
            expires_at: now + ttl,
        })
    }
}
