//! Coach — coordinates the session store, transition predicates, and the
//! completion service.
//!
//! Every action funnels through `invoke`, which holds the session's write
//! lock for the whole call. That lock is the mutual-exclusion boundary the
//! concurrency model requires; the hosting runtime may still serialize
//! actions, but nothing depends on it.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::CoachConfig;
use crate::error::{LlmError, Result, SessionError};
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider, ResponseFormat};

use super::analysis;
use super::phase::Phase;
use super::predicates;
use super::prompts;
use super::session::{
    AtsResult, CandidateProfile, Command, Eligibility, Message, Session, Transition,
};

/// A user-initiated action against the session.
#[derive(Debug, Clone)]
pub enum Action {
    /// A resume was uploaded; `text` is the already-extracted document text.
    FileUploaded { text: String },
    /// The user typed a chat message.
    UserReplied { text: String },
    /// The user invoked a menu command by id.
    CommandInvoked { id: String },
    /// Discard the session and start over.
    Reset,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::FileUploaded { .. } => "file_uploaded",
            Action::UserReplied { .. } => "user_replied",
            Action::CommandInvoked { .. } => "command_invoked",
            Action::Reset => "reset",
        }
    }
}

/// What one `invoke` round produced.
///
/// Collaborator failures land here as `failure` plus a visible notice:
/// they are outcomes, not errors. Only input errors are `Err`.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Phase after the action was applied.
    pub phase: Phase,
    /// Assistant text appended this round (reply, menu, or failure notice).
    pub reply: Option<String>,
    /// Set when a collaborator call failed and was converted to a notice.
    pub failure: Option<String>,
}

/// Orchestrates one coaching session.
pub struct Coach {
    llm: Arc<dyn LlmProvider>,
    config: CoachConfig,
    session: RwLock<Session>,
}

impl Coach {
    pub fn new(llm: Arc<dyn LlmProvider>, config: CoachConfig) -> Self {
        Self {
            llm,
            config,
            session: RwLock::new(Session::new(prompts::session_system_prompt())),
        }
    }

    pub fn config(&self) -> &CoachConfig {
        &self.config
    }

    // ── Read-only surface ────────────────────────────────────────────────
    // These keep working even when invocation preconditions (API key,
    // phase) fail; viewing history is never gated.

    pub async fn current_phase(&self) -> Phase {
        self.session.read().await.phase()
    }

    pub async fn visible_messages(&self) -> Vec<Message> {
        self.session.read().await.visible_messages()
    }

    pub async fn ats_result(&self) -> Option<AtsResult> {
        self.session.read().await.ats_result().cloned()
    }

    pub async fn target_role(&self) -> Option<String> {
        self.session.read().await.target_role().map(String::from)
    }

    pub async fn transition_log(&self) -> Vec<Transition> {
        self.session.read().await.transition_log().to_vec()
    }

    /// The deterministic salary gate. Pure; stores nothing.
    pub fn check_eligibility(&self, profile: &CandidateProfile) -> Eligibility {
        profile.eligibility(self.config.min_monthly_salary)
    }

    /// Gate and, if eligible, record the candidate profile.
    pub async fn set_candidate_profile(&self, profile: CandidateProfile) -> Eligibility {
        let verdict = self.check_eligibility(&profile);
        if verdict.eligible {
            self.session.write().await.set_candidate(profile);
        }
        verdict
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Apply one action. Input errors leave the session untouched;
    /// collaborator failures become a visible notice and never advance the
    /// phase.
    pub async fn invoke(&self, action: Action) -> Result<Outcome> {
        let mut session = self.session.write().await;
        match action {
            Action::FileUploaded { text } => self.file_uploaded(&mut session, text).await,
            Action::UserReplied { text } => self.user_replied(&mut session, text).await,
            Action::CommandInvoked { ref id } => {
                let command = Command::from_id(id)?;
                self.command_invoked(&mut session, &action, command).await
            }
            Action::Reset => {
                tracing::info!(session_id = %session.id(), "Session reset");
                *session = Session::new(prompts::session_system_prompt());
                Ok(Outcome {
                    phase: session.phase(),
                    reply: None,
                    failure: None,
                })
            }
        }
    }

    async fn file_uploaded(&self, session: &mut Session, text: String) -> Result<Outcome> {
        if session.document_loaded() {
            return Err(SessionError::DocumentAlreadyLoaded.into());
        }
        if session.phase() != Phase::Upload {
            return Err(SessionError::InvalidAction {
                action: "file_uploaded".to_string(),
                phase: session.phase(),
            }
            .into());
        }
        // A retry after a failed first call reuses the stored text.
        if session.document_text().is_none() {
            session.set_document_text(text)?;
        }
        debug_assert!(predicates::should_enter_diagnosis(session));

        // The trigger is staged into the request and only committed to the
        // transcript once the completion call succeeds, so a failed round
        // leaves nothing but the notice behind.
        let document = session.document_text().unwrap_or_default();
        let trigger = prompts::diagnosis_trigger(document, self.config.diagnosis_trigger_chars);
        let mut outbound = session.chat_messages();
        outbound.push(ChatMessage::user(trigger.clone()));

        match self.complete_reply(outbound).await {
            Ok(reply) => {
                session.push(Message::trigger(trigger));
                session.push(Message::assistant(reply.clone()));
                self.transition(session, Phase::Diagnosis, "resume loaded");
                session.mark_document_loaded();
                Ok(self.success(session, reply))
            }
            Err(e) => Ok(self.failure(session, e)),
        }
    }

    async fn user_replied(&self, session: &mut Session, text: String) -> Result<Outcome> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage.into());
        }
        session.push(Message::user(text));

        // Structural signals first: a command marker typed in the menu, or
        // a return marker during execution.
        if predicates::should_enter_execution(session, &self.config) {
            return Ok(match self.complete_reply(session.chat_messages()).await {
                Ok(reply) => {
                    session.push(Message::assistant(reply.clone()));
                    self.transition(session, Phase::Execution, "menu command in message");
                    self.success(session, reply)
                }
                Err(e) => self.failure(session, e),
            });
        }
        if predicates::should_return_to_menu(session, &self.config) {
            self.transition(session, Phase::Menu, "returned to menu");
            let menu = prompts::menu_text();
            session.push(Message::assistant(menu.clone()));
            return Ok(self.success(session, menu));
        }

        match self.complete_reply(session.chat_messages()).await {
            Ok(reply) => {
                session.push(Message::assistant(reply.clone()));
                // At most one transition per round; the next round
                // re-evaluates, so a met condition lags by one exchange at
                // worst.
                if predicates::should_enter_diagnosis_in_progress(session, &self.config) {
                    self.transition(session, Phase::DiagnosisInProgress, "diagnosis started");
                } else if predicates::should_enter_menu(session, &self.config) {
                    self.transition(session, Phase::Menu, "diagnostic questions complete");
                    session.push(Message::assistant(prompts::menu_text()));
                }
                Ok(self.success(session, reply))
            }
            Err(e) => Ok(self.failure(session, e)),
        }
    }

    async fn command_invoked(
        &self,
        session: &mut Session,
        action: &Action,
        command: Command,
    ) -> Result<Outcome> {
        if session.phase() != Phase::Menu {
            return Err(SessionError::InvalidAction {
                action: action.name().to_string(),
                phase: session.phase(),
            }
            .into());
        }

        // The ATS command runs its structured analysis first; results are
        // held back and committed with the rest of the round.
        let mut extracted_role: Option<String> = None;
        let mut ats_result: Option<AtsResult> = None;
        if command == Command::AtsScore {
            let Some(document) = session.document_text().map(String::from) else {
                return Err(SessionError::EmptyDocument.into());
            };
            let role = match session.target_role() {
                Some(role) => role.to_string(),
                None => {
                    match self
                        .bounded(analysis::extract_target_role(
                            self.llm.as_ref(),
                            &document,
                            &self.config,
                        ))
                        .await
                    {
                        Ok(role) => {
                            extracted_role = Some(role.clone());
                            role
                        }
                        Err(e) => return Ok(self.failure(session, e)),
                    }
                }
            };
            match self
                .bounded(analysis::score_resume(
                    self.llm.as_ref(),
                    &document,
                    &role,
                    &self.config,
                ))
                .await
            {
                Ok(result) => ats_result = Some(result),
                Err(e) => return Ok(self.failure(session, e)),
            }
        }

        let role_for_prompt = extracted_role
            .as_deref()
            .or(session.target_role())
            .map(String::from);
        let trigger = prompts::command_trigger(command, role_for_prompt.as_deref());
        let mut outbound = session.chat_messages();
        outbound.push(ChatMessage::user(trigger.clone()));

        match self.complete_reply(outbound).await {
            Ok(reply) => {
                session.push(Message::trigger(trigger));
                session.push(Message::assistant(reply.clone()));
                if let Some(role) = extracted_role {
                    session.set_target_role(role);
                }
                if let Some(result) = ats_result {
                    session.set_ats_result(result);
                }
                self.transition(
                    session,
                    Phase::Execution,
                    &format!("command invoked: {command}"),
                );
                Ok(self.success(session, reply))
            }
            Err(e) => Ok(self.failure(session, e)),
        }
    }

    // ── Internals ────────────────────────────────────────────────────────

    /// One conversational completion, timeout-bounded. Empty replies are
    /// failures.
    async fn complete_reply(&self, messages: Vec<ChatMessage>) -> std::result::Result<String, LlmError> {
        let request = CompletionRequest::new(messages)
            .with_temperature(self.config.reply_temperature)
            .with_max_tokens(self.config.reply_max_tokens)
            .with_response_format(ResponseFormat::Text);
        let response = self.bounded(self.llm.complete(request)).await?;
        let content = response.content.trim().to_string();
        if content.is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.llm.model_name().to_string(),
                reason: "completion returned empty content".to_string(),
            });
        }
        Ok(content)
    }

    /// Bound any collaborator future by the configured timeout.
    async fn bounded<T>(
        &self,
        future: impl Future<Output = std::result::Result<T, LlmError>>,
    ) -> std::result::Result<T, LlmError> {
        tokio::time::timeout(self.config.completion_timeout, future)
            .await
            .unwrap_or_else(|_| {
                Err(LlmError::Timeout {
                    provider: self.llm.model_name().to_string(),
                    timeout: self.config.completion_timeout,
                })
            })
    }

    fn transition(&self, session: &mut Session, target: Phase, reason: &str) {
        let from = session.phase();
        if session.transition_to(target, reason) {
            tracing::info!(%from, to = %target, reason, "Phase transition");
        } else {
            tracing::warn!(%from, to = %target, reason, "Transition rejected by table");
        }
    }

    fn success(&self, session: &Session, reply: String) -> Outcome {
        Outcome {
            phase: session.phase(),
            reply: Some(reply),
            failure: None,
        }
    }

    /// Convert a collaborator failure into a visible notice. No phase
    /// transition happens in the same round.
    fn failure(&self, session: &mut Session, error: LlmError) -> Outcome {
        tracing::warn!(error = %error, phase = %session.phase(), "Collaborator call failed; session left retryable");
        let notice = format!(
            "The coaching service could not complete that step ({error}). \
             Nothing was lost; please try again."
        );
        session.push(Message::notice(notice.clone()));
        Outcome {
            phase: session.phase(),
            reply: Some(notice),
            failure: Some(error.to_string()),
        }
    }
}

// The full action flows (upload, interview, menu, execution, failure
// isolation, reset) are exercised in tests/protocol_flow.rs against a
// scripted provider; the pieces they compose are unit-tested in their own
// modules.
