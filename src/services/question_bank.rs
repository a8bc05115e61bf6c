//! Question bank loading, per-session selection and answer checking.

use std::{collections::HashSet, fs, path::Path};

use anyhow::{Context, bail};
use rand::{Rng, seq::SliceRandom};
use reqwest::Client;
use tracing::info;

use crate::{
    config::{AppConfig, QuestionSource},
    services::opentdb,
    state::game::Question,
};

/// Load and sanity-check the question bank stored at `path`.
pub fn load_questions(path: &Path) -> anyhow::Result<Vec<Question>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading question bank `{}`", path.display()))?;
    let questions: Vec<Question> = serde_json::from_str(&contents)
        .with_context(|| format!("parsing question bank `{}`", path.display()))?;

    check_bank(&questions)?;
    info!(path = %path.display(), count = questions.len(), "loaded question bank");
    Ok(questions)
}

/// Load the question bank from the source selected in `config`.
pub async fn load_question_bank(config: &AppConfig) -> anyhow::Result<Vec<Question>> {
    match config.question_source() {
        QuestionSource::File => load_questions(config.questions_path()),
        QuestionSource::OpenTdb => {
            let client = Client::builder()
                .build()
                .context("building HTTP client")?;
            let questions =
                opentdb::fetch_questions(&client, opentdb::OPENTDB_URL, config.opentdb_amount())
                    .await?;
            check_bank(&questions)?;
            Ok(questions)
        }
    }
}

/// Reject empty banks, duplicate ids and out-of-range correct indexes.
fn check_bank(questions: &[Question]) -> anyhow::Result<()> {
    if questions.is_empty() {
        bail!("question bank is empty");
    }

    let mut seen = HashSet::new();
    for question in questions {
        if !seen.insert(question.id.as_str()) {
            bail!("duplicate question id `{}`", question.id);
        }
        if question.correct_index >= question.options.len() {
            bail!(
                "question `{}` has correct index {} but only {} options",
                question.id,
                question.correct_index,
                question.options.len()
            );
        }
    }
    Ok(())
}

/// Pick up to `count` questions from `pool` in random order.
pub fn select_subset<R>(pool: &[Question], count: usize, rng: &mut R) -> Vec<Question>
where
    R: Rng + ?Sized,
{
    let mut selected = pool.to_vec();
    selected.shuffle(rng);
    selected.truncate(count);
    selected
}

/// Check `answer` against `question_id`.
///
/// Returns `None` when the question is not part of `questions`.
pub fn check_answer(questions: &[Question], question_id: &str, answer: i64) -> Option<bool> {
    questions
        .iter()
        .find(|question| question.id == question_id)
        .map(|question| usize::try_from(answer).is_ok_and(|idx| idx == question.correct_index))
}
