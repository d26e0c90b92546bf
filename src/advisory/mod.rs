//! Fair-assignee suggestions.
//!
//! Advisory only: a suggestion never changes a schedule. Callers go through
//! [`request_suggestion`], which bounds the call with a timeout and turns
//! every failure into [`AdvisoryOutcome::Unavailable`].

use crate::ChoreBoard;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const ADVISOR_URL_ENV: &str = "CHORE_WHEEL_ADVISOR_URL";
pub const ADVISOR_KEY_ENV: &str = "CHORE_WHEEL_ADVISOR_KEY";
pub const ADVISOR_MODEL_ENV: &str = "CHORE_WHEEL_ADVISOR_MODEL";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Message shown to users whenever no suggestion could be produced.
pub const UNAVAILABLE_MESSAGE: &str = "Failed to get a suggestion. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    /// Title of the task to hand out.
    pub task: String,
    pub team_members: Vec<String>,
    /// Completed-task counts per member.
    #[serde(default)]
    pub past_assignments: BTreeMap<String, u32>,
}

impl SuggestionRequest {
    /// Request for `chore_id` using the board's roster and completion counts.
    pub fn from_board(board: &ChoreBoard, chore_id: &str) -> Result<Self, AdvisoryError> {
        let chore = board
            .chores()
            .get(chore_id)
            .ok_or_else(|| AdvisoryError::UnknownChore(chore_id.to_string()))?;
        Ok(Self {
            task: chore.title.clone(),
            team_members: board.roster().iter().cloned().collect(),
            past_assignments: board.past_assignments(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub suggested_assignee: String,
    pub reasoning: String,
}

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("no team members to choose from")]
    EmptyTeam,
    #[error("chore '{0}' not found")]
    UnknownChore(String),
    #[error("advisor request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("advisor returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("advisor answer could not be read: {0}")]
    MalformedAnswer(String),
    #[error("advisor did not answer within {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait FairnessAdvisor: Send + Sync {
    fn name(&self) -> &str;

    async fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SuggestionResponse, AdvisoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdvisoryOutcome {
    Suggested {
        #[serde(flatten)]
        response: SuggestionResponse,
        /// False when the advisor named somebody who is not on the roster.
        #[serde(rename = "onRoster")]
        on_roster: bool,
    },
    Unavailable {
        message: String,
    },
}

impl AdvisoryOutcome {
    pub fn unavailable() -> Self {
        Self::Unavailable {
            message: UNAVAILABLE_MESSAGE.to_string(),
        }
    }

    pub fn suggestion(&self) -> Option<&SuggestionResponse> {
        match self {
            Self::Suggested { response, .. } => Some(response),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Ask `advisor` for a suggestion, giving up after `timeout`.
pub async fn request_suggestion(
    advisor: &dyn FairnessAdvisor,
    request: &SuggestionRequest,
    timeout: Duration,
) -> AdvisoryOutcome {
    if request.team_members.is_empty() {
        warn!(advisor = advisor.name(), "suggestion skipped: empty team");
        return AdvisoryOutcome::unavailable();
    }

    let result = match tokio::time::timeout(timeout, advisor.suggest(request)).await {
        Ok(result) => result,
        Err(_) => Err(AdvisoryError::Timeout(timeout)),
    };

    match result {
        Ok(response) => {
            let on_roster = request
                .team_members
                .iter()
                .any(|member| member == &response.suggested_assignee);
            if !on_roster {
                warn!(
                    advisor = advisor.name(),
                    suggested = %response.suggested_assignee,
                    "advisor suggested someone off the roster"
                );
            }
            info!(
                advisor = advisor.name(),
                task = %request.task,
                suggested = %response.suggested_assignee,
                "suggestion received"
            );
            AdvisoryOutcome::Suggested {
                response,
                on_roster,
            }
        }
        Err(err) => {
            warn!(advisor = advisor.name(), error = %err, "suggestion failed");
            AdvisoryOutcome::unavailable()
        }
    }
}

/// Picks whoever has completed the fewest tasks, earliest roster position
/// on ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastLoadedAdvisor;

#[async_trait]
impl FairnessAdvisor for LeastLoadedAdvisor {
    fn name(&self) -> &str {
        "least-loaded"
    }

    async fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SuggestionResponse, AdvisoryError> {
        let mut best: Option<(&String, u32)> = None;
        for member in &request.team_members {
            let count = request.past_assignments.get(member).copied().unwrap_or(0);
            if best.is_none_or(|(_, lowest)| count < lowest) {
                best = Some((member, count));
            }
        }
        let (member, count) = best.ok_or(AdvisoryError::EmptyTeam)?;
        Ok(SuggestionResponse {
            suggested_assignee: member.clone(),
            reasoning: format!(
                "{member} has completed {count} task(s), the fewest on the team, so '{}' goes to them.",
                request.task
            ),
        })
    }
}

/// Advisor backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiAdvisor {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiAdvisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAdvisor")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiAdvisor {
    /// `base_url` includes any version prefix, e.g. `https://api.openai.com/v1`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    fn build_body(&self, request: &SuggestionRequest) -> serde_json::Value {
        json!({
            "model": self.model,
            "temperature": 0,
            "response_format": {"type": "json_object"},
            "messages": [
                {
                    "role": "system",
                    "content": "You help a household share chores fairly. Answer with a JSON object \
                                with the string fields \"suggestedAssignee\" and \"reasoning\".",
                },
                {"role": "user", "content": build_prompt(request)},
            ],
        })
    }
}

fn build_prompt(request: &SuggestionRequest) -> String {
    let past = request
        .team_members
        .iter()
        .map(|member| {
            let count = request.past_assignments.get(member).copied().unwrap_or(0);
            format!("{member}: {count}")
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Task: {}\nTeam members: {}\nCompleted tasks so far: {}\n\n\
         Pick the team member who should take this task so the load stays even, \
         and explain the choice in one or two sentences.",
        request.task,
        request.team_members.join(", "),
        past
    )
}

/// Pull the `SuggestionResponse` out of a chat completions body.
fn parse_completion(body: &serde_json::Value) -> Result<SuggestionResponse, AdvisoryError> {
    let content = body
        .pointer("/choices/0/message/content")
        .and_then(|content| content.as_str())
        .ok_or_else(|| AdvisoryError::MalformedAnswer("missing message content".into()))?;
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    serde_json::from_str(trimmed).map_err(|err| AdvisoryError::MalformedAnswer(err.to_string()))
}

fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|message| message.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl FairnessAdvisor for OpenAiAdvisor {
    fn name(&self) -> &str {
        "openai"
    }

    async fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SuggestionResponse, AdvisoryError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let mut http = self.client.post(&url).json(&self.build_body(request));
        if !self.api_key.is_empty() {
            http = http.bearer_auth(&self.api_key);
        }

        let response = http.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisoryError::Status {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        let body: serde_json::Value = response.json().await?;
        parse_completion(&body)
    }
}

/// Remote advisor when [`ADVISOR_URL_ENV`] is set, the offline
/// [`LeastLoadedAdvisor`] otherwise.
pub fn advisor_from_env() -> Arc<dyn FairnessAdvisor> {
    match std::env::var(ADVISOR_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => {
            let key = std::env::var(ADVISOR_KEY_ENV).unwrap_or_default();
            let model =
                std::env::var(ADVISOR_MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
            info!(url = %url, model = %model, "using remote fairness advisor");
            Arc::new(OpenAiAdvisor::new(url, key, model))
        }
        _ => Arc::new(LeastLoadedAdvisor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_answer() {
        let body = json!({
            "choices": [{"message": {"content": "```json\n{\"suggestedAssignee\":\"Ana\",\"reasoning\":\"fewest\"}\n```"}}]
        });
        let parsed = parse_completion(&body).unwrap();
        assert_eq!(parsed.suggested_assignee, "Ana");
    }

    #[test]
    fn prompt_lists_every_member_with_a_count() {
        let request = SuggestionRequest {
            task: "Clean Kitchen".into(),
            team_members: vec!["Ana".into(), "Bo".into()],
            past_assignments: BTreeMap::from([("Ana".to_string(), 3)]),
        };
        let prompt = build_prompt(&request);
        assert!(prompt.contains("Ana: 3, Bo: 0"));
        assert!(prompt.contains("Task: Clean Kitchen"));
    }
}
