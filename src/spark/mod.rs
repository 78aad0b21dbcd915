//! Spark generation: one pass from bearer credential to motivational message.
//!
//! Validate the mood, resolve the caller, read their most recent wins, build
//! the prompt, make one provider call, trim the first candidate's text. The
//! two external calls are strictly sequential — the prompt depends on the
//! wins — and nothing is cached or retried.

use tracing::info;

use crate::error::SparkError;
use crate::provider::CompletionProvider;
use crate::repository::{EntriesRepository, Win};

/// How many of the caller's wins feed the prompt. Fewer (including zero) is
/// valid; the prompt simply lists fewer bullets.
pub const RECENT_WINS_LIMIT: usize = 10;

/// Fixed persona instruction plus the caller's literal mood and win history.
///
/// Wins appear as `- ` bullets, most recent first, content exactly as stored
/// — the model is told to reference specific wins, so nothing is paraphrased
/// here. The mood is free text; unrecognized values still steer tone, the
/// persona line carries the generic encouraging framing.
pub fn build_prompt(mood: &str, wins: &[Win]) -> String {
    let mut bullets = String::new();
    for win in wins {
        bullets.push_str("- ");
        bullets.push_str(&win.content);
        bullets.push('\n');
    }

    format!(
        "You are Limmo, a friendly and encouraging \"pocket cheerleader\" for a tech founder.\n\
         The user is feeling: \"{mood}\".\n\
         Based on their past wins below, write a short, personalized, and uplifting message (2-3 sentences).\n\
         Directly reference one or two of their specific wins to remind them of their capabilities.\n\
         Do not be generic. Be specific and empathetic.\n\
         \n\
         Past wins:\n\
         {bullets}"
    )
}

/// Produce one Spark message for the caller behind `bearer`.
///
/// Input checks happen before any outbound call: an empty or missing mood
/// never reaches the auth backend, the repository, or the provider.
pub async fn generate_spark(
    repository: &dyn EntriesRepository,
    provider: &dyn CompletionProvider,
    bearer: &str,
    mood: &str,
) -> Result<String, SparkError> {
    if mood.trim().is_empty() {
        return Err(SparkError::InvalidArgument("Missing mood"));
    }

    let caller = repository.resolve_caller(bearer).await?;
    let wins = repository.recent_wins(&caller, RECENT_WINS_LIMIT).await?;
    info!(owner = %caller.id, wins = wins.len(), mood, "generating spark");

    let prompt = build_prompt(mood, &wins);
    let message = provider.complete(&prompt).await?;
    Ok(message.trim().to_string())
}
