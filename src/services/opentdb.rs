//! Question bank fetched from the Open Trivia Database.

use anyhow::{Context, bail};
use rand::{Rng, seq::SliceRandom};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::state::game::Question;

/// Public OpenTDB endpoint.
pub const OPENTDB_URL: &str = "https://opentdb.com/api.php";

/// Raw OpenTDB envelope. A non-zero `response_code` means the request was refused.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    /// 0 on success.
    #[serde(default)]
    pub response_code: u8,
    /// Questions in response order.
    pub results: Vec<ApiQuestion>,
}

/// One OpenTDB question; text fields are HTML-encoded.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiQuestion {
    /// HTML-encoded prompt.
    pub question: String,
    /// HTML-encoded correct option.
    pub correct_answer: String,
    /// HTML-encoded wrong options.
    pub incorrect_answers: Vec<String>,
}

/// Fetch `amount` multiple-choice questions from `base_url` and turn them into a question bank.
pub async fn fetch_questions(
    client: &Client,
    base_url: &str,
    amount: u32,
) -> anyhow::Result<Vec<Question>> {
    let response = client
        .get(base_url)
        .query(&[("amount", amount.to_string().as_str()), ("type", "multiple")])
        .send()
        .await
        .with_context(|| format!("requesting questions from {base_url}"))?
        .error_for_status()
        .with_context(|| format!("questions request to {base_url} failed"))?;

    let payload: ApiResponse = response
        .json()
        .await
        .context("decoding OpenTDB response")?;
    if payload.response_code != 0 {
        bail!("OpenTDB refused the request (response code {})", payload.response_code);
    }

    let questions = format_questions(payload.results, &mut rand::rng());
    info!(count = questions.len(), "fetched questions from OpenTDB");
    Ok(questions)
}

/// Decode HTML entities, shuffle each question's options and locate the correct one again.
///
/// Identifiers are assigned from 1 in response order.
pub fn format_questions<R>(api_questions: Vec<ApiQuestion>, rng: &mut R) -> Vec<Question>
where
    R: Rng + ?Sized,
{
    api_questions
        .into_iter()
        .enumerate()
        .map(|(idx, api)| {
            let correct = unescape(&api.correct_answer);
            let mut options: Vec<String> =
                api.incorrect_answers.iter().map(|option| unescape(option)).collect();
            options.push(correct.clone());
            options.shuffle(rng);
            let correct_index = options
                .iter()
                .position(|option| *option == correct)
                .unwrap_or(options.len() - 1);

            Question {
                id: (idx + 1).to_string(),
                question_text: unescape(&api.question),
                options,
                correct_index,
            }
        })
        .collect()
}

fn unescape(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn api_question(question: &str, correct: &str, incorrect: &[&str]) -> ApiQuestion {
        ApiQuestion {
            question: question.into(),
            correct_answer: correct.into(),
            incorrect_answers: incorrect.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn formatting_unescapes_and_tracks_the_correct_option() {
        let mut rng = StdRng::seed_from_u64(11);
        let questions = format_questions(
            vec![
                api_question(
                    "Who wrote &quot;Hamlet&quot;?",
                    "Shakespeare",
                    &["Marlowe", "Jonson", "Bacon"],
                ),
                api_question("Tom &amp; Jerry is a&#039;", "cartoon", &["film", "book", "play"]),
            ],
            &mut rng,
        );

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, "1");
        assert_eq!(questions[1].id, "2");
        assert_eq!(questions[0].question_text, "Who wrote \"Hamlet\"?");
        assert_eq!(questions[1].question_text, "Tom & Jerry is a'");

        for (question, correct) in questions.iter().zip(["Shakespeare", "cartoon"]) {
            assert_eq!(question.options.len(), 4);
            assert_eq!(question.options[question.correct_index], correct);
        }
    }

    #[test]
    fn options_are_shuffled_across_questions() {
        let mut rng = StdRng::seed_from_u64(3);
        let batch: Vec<_> = (0..20)
            .map(|_| api_question("?", "right", &["a", "b", "c"]))
            .collect();
        let questions = format_questions(batch, &mut rng);

        let positions: std::collections::HashSet<_> =
            questions.iter().map(|question| question.correct_index).collect();
        assert!(positions.len() > 1, "correct answer never moved: {positions:?}");
    }

    #[test]
    fn option_entities_are_decoded() {
        let mut rng = StdRng::seed_from_u64(5);
        let questions = format_questions(
            vec![api_question("?", "&lt;b&gt;", &["&eacute;t&eacute;"])],
            &mut rng,
        );
        let mut options = questions[0].options.clone();
        options.sort();
        assert_eq!(options, ["<b>", "été"]);
        assert_eq!(questions[0].options[questions[0].correct_index], "<b>");
    }

}
