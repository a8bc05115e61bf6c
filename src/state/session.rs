//! Per-session concurrent state: roster, scoring, connection fan-out and countdown.

use std::{
    collections::{HashMap, HashSet},
    fmt::Debug,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use axum::extract::ws::Message;
use indexmap::IndexMap;
use serde::Serialize;
use tokio::{
    sync::{Mutex, mpsc, watch},
    task::JoinHandle,
    time::{Instant, sleep},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::SessionEvent,
    error::ServiceError,
    state::game::{Player, Question},
};

/// Delay between two countdown ticks.
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Identifier handed out by the registry (32 lowercase hexadecimal characters).
pub type SessionId = String;
/// Identifier of a live connection attached to a session.
pub type ConnectionId = Uuid;

#[derive(Clone, Debug)]
/// Handle used to push frames to a connected client.
///
/// The receiving half is drained by the socket's writer task. Sends never block: a full
/// or closed queue gets the connection evicted from the session.
pub struct SessionConnection {
    /// Key of the connection inside its session.
    pub id: ConnectionId,
    /// Outbound frame queue.
    pub tx: mpsc::Sender<Message>,
}

impl SessionConnection {
    /// Wrap the outbound queue of a freshly accepted socket.
    pub fn new(tx: mpsc::Sender<Message>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx,
        }
    }
}

/// State guarded by the session lock.
#[derive(Default)]
struct SessionInner {
    /// Aggregate score used by single-player games.
    score: i64,
    players: IndexMap<Uuid, Player>,
    /// Join sequence counter; never decremented.
    joined: usize,
    connections: HashMap<ConnectionId, mpsc::Sender<Message>>,
    answered: HashSet<String>,
    countdown_started: bool,
}

impl SessionInner {
    fn high_score(&self) -> i64 {
        self.players
            .values()
            .map(|player| player.score)
            .max()
            .unwrap_or(0)
    }

    /// Enqueue `payload` on every live connection, evicting those that cannot take it.
    fn fan_out(&mut self, session_id: &str, payload: &str) -> usize {
        let message = Message::Text(payload.to_owned().into());
        let mut evicted = Vec::new();

        for (id, tx) in &self.connections {
            if let Err(err) = tx.try_send(message.clone()) {
                warn!(%session_id, connection_id = %id, error = %err, "evicting connection after failed write");
                evicted.push(*id);
            }
        }

        for id in &evicted {
            self.connections.remove(id);
        }

        self.connections.len()
    }
}

/// One trivia game instance.
pub struct Session {
    id: SessionId,
    questions: Vec<Question>,
    inner: Mutex<SessionInner>,
    created_at: Instant,
    /// Milliseconds since `created_at` of the last operation on the session.
    last_activity_ms: AtomicU64,
    closed: watch::Sender<bool>,
}

impl Session {
    /// Build an empty session serving `questions`.
    pub fn new(id: SessionId, questions: Vec<Question>) -> Self {
        let (closed, _rx) = watch::channel(false);
        Self {
            id,
            questions,
            inner: Mutex::new(SessionInner::default()),
            created_at: Instant::now(),
            last_activity_ms: AtomicU64::new(0),
            closed,
        }
    }

    /// Registry identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Questions assigned to the session, in play order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Add a player to the roster and return it.
    ///
    /// Names follow the join sequence ("Player 1", "Player 2", ...). Callers are
    /// expected to broadcast the new player count once this returns.
    pub async fn add_player(&self) -> Player {
        self.touch();
        let mut inner = self.inner.lock().await;
        inner.joined += 1;
        let mut player = Player::joined(inner.joined);
        while inner.players.contains_key(&player.id) {
            player.id = Uuid::new_v4();
        }
        inner.players.insert(player.id, player.clone());
        debug!(session_id = %self.id, player_id = %player.id, name = %player.name, "player joined");
        player
    }

    /// Snapshot of a single player.
    pub async fn player(&self, player_id: &Uuid) -> Option<Player> {
        self.inner.lock().await.players.get(player_id).cloned()
    }

    /// Snapshot of the roster in join order.
    pub async fn players(&self) -> Vec<Player> {
        self.inner.lock().await.players.values().cloned().collect()
    }

    /// Number of players that joined.
    pub async fn player_count(&self) -> usize {
        self.inner.lock().await.players.len()
    }

    /// Current single-player aggregate score.
    pub async fn score(&self) -> i64 {
        self.inner.lock().await.score
    }

    /// Add `delta` to the single-player aggregate score and return the new total.
    pub async fn update_score(&self, delta: i64) -> i64 {
        self.touch();
        let mut inner = self.inner.lock().await;
        inner.score += delta;
        inner.score
    }

    /// Credit `player_id` with `delta` and mark `question_id` answered.
    ///
    /// The question is marked even when the player is unknown. Answer handling goes
    /// through [`Session::try_credit_first_correct_answer`] instead, which checks and
    /// marks in one step.
    pub async fn update_player_score(&self, player_id: &Uuid, question_id: &str, delta: i64) {
        self.touch();
        let mut inner = self.inner.lock().await;
        if let Some(player) = inner.players.get_mut(player_id) {
            player.score += delta;
        }
        inner.answered.insert(question_id.to_owned());
    }

    /// Award `delta` to `player_id` if nobody has answered `question_id` correctly yet.
    ///
    /// Returns whether this call earned the point. An unknown player earns nothing and
    /// leaves the question open for others.
    pub async fn try_credit_first_correct_answer(
        &self,
        player_id: &Uuid,
        question_id: &str,
        delta: i64,
    ) -> bool {
        self.touch();
        let mut inner = self.inner.lock().await;
        if inner.answered.contains(question_id) {
            return false;
        }
        let Some(player) = inner.players.get_mut(player_id) else {
            return false;
        };
        player.score += delta;
        inner.answered.insert(question_id.to_owned());
        true
    }

    /// Whether `question_id` has already been answered correctly in this session.
    pub async fn is_answered(&self, question_id: &str) -> bool {
        self.inner.lock().await.answered.contains(question_id)
    }

    /// Flag `player_id` as done and return its updated snapshot.
    pub async fn mark_finished(&self, player_id: &Uuid) -> Result<Player, ServiceError> {
        self.finish(player_id).await.map(|(player, _)| player)
    }

    /// Like [`Session::mark_finished`], but `None` when the player had already finished.
    pub async fn finish_once(&self, player_id: &Uuid) -> Result<Option<Player>, ServiceError> {
        self.finish(player_id)
            .await
            .map(|(player, newly)| newly.then_some(player))
    }

    async fn finish(&self, player_id: &Uuid) -> Result<(Player, bool), ServiceError> {
        self.touch();
        let mut inner = self.inner.lock().await;
        let player = inner.players.get_mut(player_id).ok_or_else(|| {
            ServiceError::NotFound(format!("player `{player_id}` not found"))
        })?;
        let newly = !player.finished;
        player.finished = true;
        Ok((player.clone(), newly))
    }

    /// True once at least one player joined and every player finished.
    pub async fn check_all_players_finished(&self) -> bool {
        let inner = self.inner.lock().await;
        !inner.players.is_empty() && inner.players.values().all(|player| player.finished)
    }

    /// Highest player score, 0 for an empty roster.
    pub async fn high_score(&self) -> i64 {
        self.inner.lock().await.high_score()
    }

    /// Attach a live connection. Nothing is sent to it until the next broadcast.
    pub async fn add_connection(&self, connection: SessionConnection) {
        self.touch();
        let mut inner = self.inner.lock().await;
        inner.connections.insert(connection.id, connection.tx);
        info!(session_id = %self.id, connection_id = %connection.id, "connection attached");
    }

    /// Detach a connection, returning whether it was still registered.
    pub async fn remove_connection(&self, connection_id: &ConnectionId) -> bool {
        let mut inner = self.inner.lock().await;
        inner.connections.remove(connection_id).is_some()
    }

    /// Number of attached connections.
    pub async fn connection_count(&self) -> usize {
        self.inner.lock().await.connections.len()
    }

    /// Serialize `message` and push it to every live connection.
    ///
    /// Returns how many connections are still attached afterwards. A message that cannot
    /// be serialized is logged and dropped; the count is then taken as is.
    pub async fn broadcast<T>(&self, message: &T) -> usize
    where
        T: ?Sized + Serialize + Debug,
    {
        let payload = match serde_json::to_string(message) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(session_id = %self.id, error = %err, "failed to serialize broadcast `{message:?}`; skipping");
                return self.inner.lock().await.connections.len();
            }
        };

        let mut inner = self.inner.lock().await;
        inner.fan_out(&self.id, &payload)
    }

    /// Push the roster size to every connection.
    pub async fn broadcast_player_count(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let event = SessionEvent::PlayerCount {
            count: inner.players.len(),
        };
        self.fan_out_event(&mut inner, &event)
    }

    /// Push the best player score to every connection.
    pub async fn broadcast_high_score(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let event = SessionEvent::HighScore {
            score: inner.high_score(),
        };
        self.fan_out_event(&mut inner, &event)
    }

    /// Tell every connection that all players are done.
    pub async fn broadcast_session_complete(&self) -> usize {
        self.broadcast(&SessionEvent::SessionComplete).await
    }

    /// Serialize under the lock so the event reflects the state it was computed from.
    fn fan_out_event(&self, inner: &mut SessionInner, event: &SessionEvent) -> usize {
        match serde_json::to_string(event) {
            Ok(payload) => inner.fan_out(&self.id, &payload),
            Err(err) => {
                warn!(session_id = %self.id, error = %err, "failed to serialize {event:?}; skipping");
                inner.connections.len()
            }
        }
    }

    /// Broadcast `from`, `from - 1`, ..., `0`, one tick per [`COUNTDOWN_TICK`].
    ///
    /// Stops early if the session gets closed.
    pub async fn run_countdown(&self, from: u32) {
        let mut closed = self.closed.subscribe();
        for time in (0..=from).rev() {
            if *closed.borrow() {
                break;
            }
            self.broadcast(&SessionEvent::Countdown { time }).await;
            if time == 0 {
                break;
            }
            tokio::select! {
                _ = sleep(COUNTDOWN_TICK) => {}
                _ = closed.wait_for(|closed| *closed) => break,
            }
        }
        debug!(session_id = %self.id, "countdown finished");
    }

    /// Spawn the countdown unless one was already started for this session.
    pub async fn start_countdown(self: &Arc<Self>, from: u32) -> Option<JoinHandle<()>> {
        {
            let mut inner = self.inner.lock().await;
            if inner.countdown_started {
                return None;
            }
            inner.countdown_started = true;
        }

        info!(session_id = %self.id, from, "starting countdown");
        let session = Arc::clone(self);
        Some(tokio::spawn(async move { session.run_countdown(from).await }))
    }

    /// Close the session, ending its countdown and socket loops.
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    /// Whether [`Session::close`] was called.
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Subscribe to the close signal.
    pub fn closed_watcher(&self) -> watch::Receiver<bool> {
        self.closed.subscribe()
    }

    /// Time since the last operation on the session.
    pub fn idle_for(&self) -> Duration {
        let last = Duration::from_millis(self.last_activity_ms.load(Ordering::Relaxed));
        self.created_at.elapsed().saturating_sub(last)
    }

    fn touch(&self) {
        let now = self.created_at.elapsed().as_millis() as u64;
        self.last_activity_ms.fetch_max(now, Ordering::Relaxed);
    }
}
