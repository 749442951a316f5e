//! End-to-end random-call flows against a real PostgreSQL.
//!
//! Run with `DATABASE_URL=... cargo test -- --ignored`.

mod common;

use async_trait::async_trait;
use matchmaking_service::domain::{Decision, MatchSource, QueueState, SessionStatus};
use matchmaking_service::error::AppError;
use matchmaking_service::services::MatchNotifier;
use matchmaking_service::state::AppState;
use serial_test::serial;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use common::{create_profile, db_pool, test_config};

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<([Uuid; 2], MatchSource)>>,
}

#[async_trait]
impl MatchNotifier for RecordingNotifier {
    async fn new_match(&self, users: [Uuid; 2], source: MatchSource) {
        self.sent.lock().unwrap().push((users, source));
    }
}

async fn setup() -> (sqlx::PgPool, AppState, Arc<RecordingNotifier>) {
    let pool = db_pool().await;
    let url = std::env::var("DATABASE_URL").unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::with_notifier(pool.clone(), &test_config(&url), notifier.clone());
    (pool, state, notifier)
}

/// Pair two fresh users and return (first joiner, second joiner, session)
async fn paired(pool: &sqlx::PgPool, state: &AppState) -> (Uuid, Uuid, Uuid) {
    let alice = create_profile(pool, "Alice").await;
    let bob = create_profile(pool, "Bob").await;

    let first = state.matchmaker.join(alice).await.unwrap();
    assert!(matches!(first, QueueState::Searching { .. }));

    let second = state.matchmaker.join(bob).await.unwrap();
    let QueueState::Matched { session_id } = second else {
        panic!("expected a match, got {:?}", second);
    };
    (alice, bob, session_id)
}

async fn start_call(state: &AppState, a: Uuid, b: Uuid, session_id: Uuid) {
    state.sessions.join(session_id, a).await.unwrap();
    let view = state.sessions.join(session_id, b).await.unwrap();
    assert_eq!(view.status, SessionStatus::Active);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_join_pairs_two_searchers() {
    let (pool, state, _) = setup().await;
    let (alice, _bob, session_id) = paired(&pool, &state).await;

    // the first joiner sees the match on their next poll
    let status = state.matchmaker.status(alice).await.unwrap();
    assert_eq!(status, QueueState::Matched { session_id });

    let view = state.sessions.current(alice).await.unwrap();
    assert_eq!(view.id, session_id);
    assert_eq!(view.you, "stranger-a");
    assert_eq!(view.status, SessionStatus::Matched);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_join_while_in_session_conflicts() {
    let (pool, state, _) = setup().await;
    let (alice, _bob, session_id) = paired(&pool, &state).await;

    match state.matchmaker.join(alice).await {
        Err(AppError::AlreadyInSession { session_id: open }) => assert_eq!(open, session_id),
        other => panic!("expected AlreadyInSession, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
#[serial]
async fn test_concurrent_queue_traffic_keeps_one_session_per_user() {
    let (pool, state, _) = setup().await;

    let mut users = Vec::new();
    for i in 0..12 {
        users.push(create_profile(&pool, &format!("Caller {}", i)).await);
    }

    let mut tasks = Vec::new();
    for round in 0..4 {
        for &user in &users {
            let state = state.clone();
            tasks.push(tokio::spawn(async move {
                let result = match (round + user.as_u128() as usize) % 3 {
                    0 => state.matchmaker.heartbeat(user).await,
                    1 => state.matchmaker.status(user).await,
                    _ => state.matchmaker.join(user).await,
                };
                match result {
                    Ok(_) | Err(AppError::AlreadyInSession { .. }) | Err(AppError::NotInQueue) => {}
                    Err(e) => panic!("unexpected queue error: {}", e),
                }
                state.matchmaker.join(user).await.map(|_| ())
            }));
        }
    }

    for outcome in futures::future::join_all(tasks).await {
        match outcome.expect("queue task panicked") {
            Ok(()) | Err(AppError::AlreadyInSession { .. }) => {}
            Err(e) => panic!("unexpected join error: {}", e),
        }
    }

    // concurrent pairers may skip each other's locked rows; one quiet pass
    // pairs whoever is still searching
    for &user in &users {
        state.matchmaker.status(user).await.unwrap();
    }

    let double_booked: Vec<Uuid> = sqlx::query_scalar(
        r#"
        SELECT u FROM (
            SELECT user_a AS u FROM random_call_sessions WHERE status <> 'completed'
            UNION ALL
            SELECT user_b AS u FROM random_call_sessions WHERE status <> 'completed'
        ) open GROUP BY u HAVING COUNT(*) > 1
        "#,
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert!(double_booked.is_empty(), "users in two open sessions: {:?}", double_booked);

    let searching_while_paired: Vec<Uuid> = sqlx::query_scalar(
        r#"
        SELECT q.user_id FROM random_call_queue q
        WHERE q.status = 'searching'
          AND EXISTS (
              SELECT 1 FROM random_call_sessions s
              WHERE s.status <> 'completed' AND (s.user_a = q.user_id OR s.user_b = q.user_id)
          )
        "#,
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert!(
        searching_while_paired.is_empty(),
        "searching despite an open session: {:?}",
        searching_while_paired
    );

    let open_sessions: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM random_call_sessions WHERE status <> 'completed'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(open_sessions, 6);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_join_waits_for_pairer_holding_the_row() {
    let (pool, state, _) = setup().await;
    let xena = create_profile(&pool, "Xena").await;
    let yuri = create_profile(&pool, "Yuri").await;
    sqlx::query("INSERT INTO random_call_queue (user_id) VALUES ($1), ($2)")
        .bind(xena)
        .bind(yuri)
        .execute(&pool)
        .await
        .unwrap();

    // another pairer has claimed both rows but not committed yet
    let session_id = Uuid::new_v4();
    let mut pairer = pool.begin().await.unwrap();
    sqlx::query("SELECT user_id FROM random_call_queue WHERE user_id = ANY($1) FOR UPDATE")
        .bind(&[xena, yuri][..])
        .execute(&mut *pairer)
        .await
        .unwrap();
    sqlx::query("INSERT INTO random_call_sessions (id, user_a, user_b) VALUES ($1, $2, $3)")
        .bind(session_id)
        .bind(xena)
        .bind(yuri)
        .execute(&mut *pairer)
        .await
        .unwrap();
    sqlx::query(
        "UPDATE random_call_queue SET status = 'matched', session_id = $1 WHERE user_id = ANY($2)",
    )
    .bind(session_id)
    .bind(&[xena, yuri][..])
    .execute(&mut *pairer)
    .await
    .unwrap();

    let joiner = state.clone();
    let pending = tokio::spawn(async move { joiner.matchmaker.join(yuri).await });
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    pairer.commit().await.unwrap();

    match pending.await.unwrap() {
        Err(AppError::AlreadyInSession { session_id: open }) => assert_eq!(open, session_id),
        other => panic!("expected AlreadyInSession, got {:?}", other.map(|_| ())),
    }

    let (status, queued_session): (String, Option<Uuid>) =
        sqlx::query_as("SELECT status, session_id FROM random_call_queue WHERE user_id = $1")
            .bind(yuri)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "matched");
    assert_eq!(queued_session, Some(session_id));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_heartbeat_outside_queue_is_not_found() {
    let (pool, state, _) = setup().await;
    let carol = create_profile(&pool, "Carol").await;

    assert!(matches!(
        state.matchmaker.heartbeat(carol).await,
        Err(AppError::NotInQueue)
    ));
    // leaving when not queued just reports the state
    assert_eq!(state.matchmaker.leave(carol).await.unwrap(), QueueState::Idle);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_mutual_yes_reveals_and_records_match() {
    let (pool, state, notifier) = setup().await;
    let (alice, bob, session_id) = paired(&pool, &state).await;
    start_call(&state, alice, bob, session_id).await;

    let view = state.sessions.end_call(session_id, alice).await.unwrap();
    assert_eq!(view.status, SessionStatus::Deciding);

    let view = state.sessions.decide(session_id, alice, Decision::Yes).await.unwrap();
    assert_eq!(view.status, SessionStatus::Deciding);
    let partner = serde_json::to_value(&view.partner).unwrap();
    assert_eq!(partner["kind"], "anonymous");

    let view = state.sessions.decide(session_id, bob, Decision::Yes).await.unwrap();
    assert_eq!(view.status, SessionStatus::Completed);
    let partner = serde_json::to_value(&view.partner).unwrap();
    assert_eq!(partner["kind"], "revealed");
    assert_eq!(partner["profile"]["display_name"], "Alice");

    let matches = state.likes.matches(alice, 50, 0).await.unwrap();
    assert_eq!(matches.len(), 1);

    // queue rows are gone once the session completes
    assert_eq!(state.matchmaker.status(alice).await.unwrap(), QueueState::Idle);

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, MatchSource::RandomCall);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_changing_decision_is_rejected() {
    let (pool, state, _) = setup().await;
    let (alice, bob, session_id) = paired(&pool, &state).await;
    start_call(&state, alice, bob, session_id).await;
    state.sessions.end_call(session_id, bob).await.unwrap();

    state.sessions.decide(session_id, alice, Decision::Yes).await.unwrap();
    // same answer again is fine
    state.sessions.decide(session_id, alice, Decision::Yes).await.unwrap();
    assert!(state
        .sessions
        .decide(session_id, alice, Decision::No)
        .await
        .is_err());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_continue_starts_another_round() {
    let (pool, state, _) = setup().await;
    let (alice, bob, session_id) = paired(&pool, &state).await;
    start_call(&state, alice, bob, session_id).await;
    state.sessions.end_call(session_id, alice).await.unwrap();

    state.sessions.decide(session_id, alice, Decision::Continue).await.unwrap();
    let view = state.sessions.decide(session_id, bob, Decision::Yes).await.unwrap();

    assert_eq!(view.status, SessionStatus::Active);
    assert_eq!(view.round, 2);
    assert!(view.your_decision.is_none());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_leave_ends_session_for_both() {
    let (pool, state, _) = setup().await;
    let (alice, bob, session_id) = paired(&pool, &state).await;
    start_call(&state, alice, bob, session_id).await;

    let view = state.sessions.leave(session_id, bob).await.unwrap();
    assert_eq!(view.status, SessionStatus::Completed);

    let view = state.sessions.get(session_id, alice).await.unwrap();
    assert_eq!(
        serde_json::to_value(view.end_reason).unwrap(),
        "partner_left"
    );
    assert!(matches!(
        state.sessions.current(alice).await,
        Err(AppError::SessionNotFound)
    ));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_outsider_cannot_read_session() {
    let (pool, state, _) = setup().await;
    let (_alice, _bob, session_id) = paired(&pool, &state).await;
    let mallory = create_profile(&pool, "Mallory").await;

    assert!(state.sessions.get(session_id, mallory).await.is_err());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_expired_call_moves_to_deciding_on_read() {
    let (pool, state, _) = setup().await;
    let (alice, bob, session_id) = paired(&pool, &state).await;
    start_call(&state, alice, bob, session_id).await;

    sqlx::query(
        "UPDATE random_call_sessions SET ends_at = NOW() - INTERVAL '5 seconds' WHERE id = $1",
    )
    .bind(session_id)
    .execute(&pool)
    .await
    .unwrap();

    let view = state.sessions.get(session_id, alice).await.unwrap();
    assert_eq!(view.status, SessionStatus::Deciding);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_reaper_closes_stuck_and_stale() {
    let (pool, state, _) = setup().await;
    let (alice, bob, session_id) = paired(&pool, &state).await;
    start_call(&state, alice, bob, session_id).await;
    state.sessions.end_call(session_id, alice).await.unwrap();

    sqlx::query(
        r#"
        UPDATE random_call_sessions
        SET deciding_started_at = NOW() - INTERVAL '10 minutes',
            decision_deadline = NOW() + INTERVAL '1 hour'
        WHERE id = $1
        "#,
    )
    .bind(session_id)
    .execute(&pool)
    .await
    .unwrap();

    let carol = create_profile(&pool, "Carol").await;
    state.matchmaker.join(carol).await.unwrap();
    sqlx::query(
        "UPDATE random_call_queue SET last_heartbeat_at = NOW() - INTERVAL '1 hour' WHERE user_id = $1",
    )
    .bind(carol)
    .execute(&pool)
    .await
    .unwrap();

    let report = state.reaper.sweep().await.unwrap();
    assert_eq!(report.sessions_closed, 1);
    assert_eq!(report.closed_by_reason.get("decision_stuck"), Some(&1));
    assert_eq!(report.stale_queue_entries, 1);

    let again = state.reaper.sweep().await.unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_no_rematch_within_cooldown() {
    let (pool, state, _) = setup().await;
    let (alice, bob, session_id) = paired(&pool, &state).await;
    state.sessions.leave(session_id, alice).await.unwrap();

    state.matchmaker.join(alice).await.unwrap();
    let again = state.matchmaker.join(bob).await.unwrap();
    assert!(matches!(again, QueueState::Searching { .. }));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_mutual_likes_create_one_match() {
    let (pool, state, notifier) = setup().await;
    let alice = create_profile(&pool, "Alice").await;
    let bob = create_profile(&pool, "Bob").await;

    assert!(!state.likes.like(alice, bob).await.unwrap().matched);
    assert!(state.likes.like(bob, alice).await.unwrap().matched);
    // liking again keeps the single match
    assert!(state.likes.like(alice, bob).await.unwrap().matched);

    assert_eq!(state.likes.matches(bob, 50, 0).await.unwrap().len(), 1);

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(notifier.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_like_validation() {
    let (pool, state, _) = setup().await;
    let alice = create_profile(&pool, "Alice").await;

    assert!(matches!(
        state.likes.like(alice, alice).await,
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        state.likes.like(alice, Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
}
