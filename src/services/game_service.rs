use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::{
        answer::{
            AnswerResponse, AnswerSubmission, MessageResponse, PlayerFinishedRequest,
            QuestionView, QuestionsResponse,
        },
        game::{
            EndGameResponse, FinalScoresResponse, JoinGameResponse, LeaderboardResponse,
            StartGameRequest, StartGameResponse,
        },
    },
    error::ServiceError,
    services::question_bank::check_answer,
    state::{SharedState, session::Session},
};

/// Create a session with the requested (or default) number of questions.
pub fn start_game(
    state: &SharedState,
    request: StartGameRequest,
    host: &str,
) -> Result<StartGameResponse, ServiceError> {
    let count = request
        .num_questions
        .unwrap_or_else(|| state.config().default_question_count());
    let session_id = state.registry().create_session(state.questions(), count)?;

    Ok(StartGameResponse {
        message: "Game session created successfully.".into(),
        shareable_link: format!("{host}/join/{session_id}"),
        session_id,
    })
}

/// Add a player, announce the new roster size and kick off the countdown on the first join.
pub async fn join_game(
    state: &SharedState,
    session_id: &str,
) -> Result<JoinGameResponse, ServiceError> {
    let session = state.require_session(session_id)?;
    let player = session.add_player().await;

    session.broadcast_player_count().await;
    if session
        .start_countdown(state.config().countdown_seconds())
        .await
        .is_some()
    {
        debug!(%session_id, player_id = %player.id, "first player joined");
    }

    Ok(player.into())
}

/// Report the single-player score of a session.
pub async fn end_game(state: &SharedState, session_id: &str) -> Result<EndGameResponse, ServiceError> {
    let session = state.require_session(session_id)?;
    Ok(EndGameResponse {
        message: "Game ended successfully.".into(),
        final_score: session.score().await,
    })
}

/// List the questions assigned to a session.
pub fn session_questions(
    state: &SharedState,
    session_id: &str,
) -> Result<QuestionsResponse, ServiceError> {
    let session = state.require_session(session_id)?;
    Ok(QuestionsResponse {
        questions: session.questions().iter().map(QuestionView::from).collect(),
    })
}

/// Score an answer, in single-player or first-correct-wins multiplayer mode.
pub async fn submit_answer(
    state: &SharedState,
    submission: AnswerSubmission,
) -> Result<AnswerResponse, ServiceError> {
    let session = state.require_session(&submission.session_id)?;
    let correct = check_answer(session.questions(), &submission.question_id, submission.answer)
        .ok_or_else(|| {
            ServiceError::NotFound(format!("question `{}` not found", submission.question_id))
        })?;
    let points = state.config().points_per_answer();

    let Some(player_id) = submission.multiplayer_id() else {
        let current_score = if correct {
            session.update_score(points).await
        } else {
            session.score().await
        };
        return Ok(AnswerResponse {
            correct,
            current_score,
        });
    };

    let player_id = resolve_player(&session, player_id).await?;
    let credited = correct
        && session
            .try_credit_first_correct_answer(&player_id, &submission.question_id, points)
            .await;
    if credited {
        session.broadcast_high_score().await;
    }

    let current_score = session
        .player(&player_id)
        .await
        .map(|player| player.score)
        .unwrap_or_default();

    Ok(AnswerResponse {
        correct: credited,
        current_score,
    })
}

/// Flag a player as finished, feed the leaderboard and announce completion once everyone is done.
///
/// Repeated calls for a finished player are acknowledged without side effects.
pub async fn mark_player_finished(
    state: &SharedState,
    request: PlayerFinishedRequest,
) -> Result<MessageResponse, ServiceError> {
    let session = state.require_session(&request.session_id)?;
    let player_id = resolve_player(&session, &request.player_id).await?;
    let Some(player) = session.finish_once(&player_id).await? else {
        debug!(session_id = %session.id(), %player_id, "player already finished");
        return Ok(MessageResponse::new("Player marked as finished"));
    };

    let points = state.config().points_per_answer().max(1);
    let right_answers = u64::try_from(player.score / points).unwrap_or_default();
    state
        .leaderboard()
        .record(player.id, right_answers, session.questions().len() as u64)
        .await;

    if session.check_all_players_finished().await {
        info!(session_id = %session.id(), "all players finished");
        session.broadcast_session_complete().await;
    }

    Ok(MessageResponse::new("Player marked as finished"))
}

/// Every player's score plus the winners of the session.
pub async fn final_scores(
    state: &SharedState,
    session_id: &str,
) -> Result<FinalScoresResponse, ServiceError> {
    let session = state.require_session(session_id)?;
    Ok(session.players().await.into())
}

/// Global standings across finished sessions.
pub async fn leaderboard(state: &SharedState) -> LeaderboardResponse {
    state.leaderboard().standings().await.into()
}

/// Parse a client-supplied player id and make sure it belongs to `session`.
async fn resolve_player(session: &Session, raw: &str) -> Result<Uuid, ServiceError> {
    let not_found = || ServiceError::NotFound(format!("player `{raw}` not found"));
    let id = Uuid::parse_str(raw.trim()).map_err(|_| not_found())?;
    session.player(&id).await.map(|player| player.id).ok_or_else(not_found)
}

#[cfg(test)]
mod tests {
    use axum::extract::ws::Message;
    use tokio::sync::mpsc;

    use crate::{
        config::AppConfig,
        state::{AppState, game::Question, session::SessionConnection},
    };

    use super::*;

    fn state() -> SharedState {
        let questions = (1..=3)
            .map(|i| Question {
                id: i.to_string(),
                question_text: format!("Question {i}?"),
                options: vec!["right".into(), "wrong".into()],
                correct_index: 0,
            })
            .collect();
        AppState::new(AppConfig::default(), questions)
    }

    fn answer(
        session_id: &str,
        player_id: Option<Uuid>,
        question_id: &str,
        answer: i64,
    ) -> AnswerSubmission {
        AnswerSubmission {
            session_id: session_id.into(),
            player_id: player_id.map(|id| id.to_string()),
            question_id: question_id.into(),
            answer,
        }
    }

    #[tokio::test]
    async fn start_game_uses_default_count_and_builds_link() {
        let state = state();
        let response = start_game(&state, StartGameRequest::default(), "localhost:8080").unwrap();
        assert_eq!(
            response.shareable_link,
            format!("localhost:8080/join/{}", response.session_id)
        );
        let session = state.registry().get_session(&response.session_id).unwrap();
        assert_eq!(session.questions().len(), 3);
    }

    #[tokio::test]
    async fn start_game_rejects_zero_questions() {
        let state = state();
        let err = start_game(
            &state,
            StartGameRequest {
                num_questions: Some(0),
            },
            "host",
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn single_player_answers_accumulate_on_session() {
        let state = state();
        let id = start_game(&state, StartGameRequest::default(), "h").unwrap().session_id;

        let first = submit_answer(&state, answer(&id, None, "1", 0)).await.unwrap();
        assert!(first.correct);
        assert_eq!(first.current_score, 10);

        let wrong = submit_answer(&state, answer(&id, None, "2", 1)).await.unwrap();
        assert!(!wrong.correct);
        assert_eq!(wrong.current_score, 10);

        assert_eq!(end_game(&state, &id).await.unwrap().final_score, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn multiplayer_only_first_correct_answer_scores() {
        let state = state();
        let id = start_game(&state, StartGameRequest::default(), "h").unwrap().session_id;
        let a = join_game(&state, &id).await.unwrap().player_id;
        let b = join_game(&state, &id).await.unwrap().player_id;

        let first = submit_answer(&state, answer(&id, Some(a), "1", 0)).await.unwrap();
        let second = submit_answer(&state, answer(&id, Some(b), "1", 0)).await.unwrap();

        assert!(first.correct);
        assert_eq!(first.current_score, 10);
        assert!(!second.correct);
        assert_eq!(second.current_score, 0);
    }

    #[tokio::test]
    async fn unknown_question_and_player_are_not_found() {
        let state = state();
        let id = start_game(&state, StartGameRequest::default(), "h").unwrap().session_id;

        let missing_question = submit_answer(&state, answer(&id, None, "99", 0)).await;
        assert!(matches!(missing_question, Err(ServiceError::NotFound(_))));

        let missing_player = submit_answer(&state, answer(&id, Some(Uuid::new_v4()), "1", 0)).await;
        assert!(matches!(missing_player, Err(ServiceError::NotFound(_))));

        let missing_session = submit_answer(&state, answer("nope", None, "1", 0)).await;
        assert!(matches!(missing_session, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn finishing_feeds_the_leaderboard() {
        let state = state();
        let id = start_game(&state, StartGameRequest::default(), "h").unwrap().session_id;
        let player = join_game(&state, &id).await.unwrap().player_id;
        submit_answer(&state, answer(&id, Some(player), "1", 0)).await.unwrap();
        submit_answer(&state, answer(&id, Some(player), "2", 0)).await.unwrap();

        mark_player_finished(
            &state,
            PlayerFinishedRequest {
                session_id: id.clone(),
                player_id: player.to_string(),
            },
        )
        .await
        .unwrap();

        let board = leaderboard(&state).await;
        assert_eq!(board.standings.get(&player.to_string()).unwrap(), "66.67%");

        let scores = final_scores(&state, &id).await.unwrap();
        assert_eq!(scores.high_score, 20);
        assert_eq!(scores.winners, ["Player 1"]);
    }

    #[tokio::test]
    async fn repeated_finish_has_no_extra_side_effects() {
        let state = state();
        let id = start_game(&state, StartGameRequest::default(), "h").unwrap().session_id;
        let session = state.registry().get_session(&id).unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        session.add_connection(SessionConnection::new(tx)).await;
        let player = session.add_player().await;

        for _ in 0..3 {
            let request = PlayerFinishedRequest {
                session_id: id.clone(),
                player_id: player.id.to_string(),
            };
            mark_player_finished(&state, request).await.unwrap();
        }

        let mut completions = 0;
        while let Ok(Message::Text(text)) = rx.try_recv() {
            if text.as_str().contains("sessionComplete") {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);

        let standings = state.leaderboard().standings().await;
        assert_eq!(standings.len(), 1);
        assert_eq!(standings[0].1.total_questions, 3);
    }

    #[tokio::test]
    async fn questions_are_listed_without_answers() {
        let state = state();
        let id = start_game(&state, StartGameRequest { num_questions: Some(2) }, "h")
            .unwrap()
            .session_id;
        let listed = session_questions(&state, &id).unwrap();
        assert_eq!(listed.questions.len(), 2);
    }
}
