//! Session store — the mutable state for one coaching conversation.
//!
//! One human, one assistant, strictly alternating. The hosting runtime
//! serializes all actions against a session; the store itself has no
//! locking. Fields populate monotonically as phases advance and the whole
//! session is replaced on reset.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::llm::{ChatMessage, Role};

use super::phase::Phase;

/// How a message entered the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Real human input or a real model reply.
    Genuine,
    /// Synthetic protocol-steering text. Hidden from the user, excluded
    /// from transition counting, included in the model request history.
    Trigger,
    /// Failure placeholder shown to the user when a collaborator call
    /// failed. Excluded from transition counting and from model history.
    Notice,
}

/// A message in the session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub kind: MessageKind,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            kind: MessageKind::Genuine,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            kind: MessageKind::Genuine,
        }
    }

    pub fn trigger(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            kind: MessageKind::Trigger,
        }
    }

    pub fn notice(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            kind: MessageKind::Notice,
        }
    }
}

/// One entry in the phase transition audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub reason: String,
    pub at: DateTime<Utc>,
}

/// Structured ATS analysis of a resume against a target role.
///
/// Either fully present or absent; once computed it is stable until an
/// explicit recompute or reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtsResult {
    /// 0-100.
    pub score: u8,
    pub keywords_present: Vec<String>,
    pub keywords_missing: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Position and salary the user reported for the eligibility gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub position: String,
    pub monthly_salary: Decimal,
}

/// Verdict of the deterministic eligibility gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    pub eligible: bool,
    pub message: String,
}

impl CandidateProfile {
    /// The executive gate: salary at or above `minimum` qualifies for the
    /// protocol. Deterministic, not part of the state machine.
    pub fn eligibility(&self, minimum: Decimal) -> Eligibility {
        if self.monthly_salary >= minimum {
            Eligibility {
                eligible: true,
                message: "Profile qualifies for the executive protocol.".to_string(),
            }
        } else {
            Eligibility {
                eligible: false,
                message: format!(
                    "Monthly salary is below the executive minimum ({minimum})."
                ),
            }
        }
    }
}

/// The menu commands a user can invoke once the diagnosis is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Rewrite the resume for the target role.
    Optimizer,
    /// Score the resume against ATS keyword screening.
    AtsScore,
    /// Interactive interrogation about quantified results.
    Metrics,
}

impl Command {
    /// Stable string id used by the UI and the REST surface.
    pub fn id(&self) -> &'static str {
        match self {
            Command::Optimizer => "optimizer",
            Command::AtsScore => "ats_score",
            Command::Metrics => "metrics",
        }
    }

    /// Parse a command id; unknown ids are input errors.
    pub fn from_id(id: &str) -> Result<Self, SessionError> {
        match id {
            "optimizer" => Ok(Command::Optimizer),
            "ats_score" => Ok(Command::AtsScore),
            "metrics" => Ok(Command::Metrics),
            other => Err(SessionError::UnknownCommand(other.to_string())),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// The state of one coaching session.
///
/// `phase` is private: the validated `transition_to` is the only way it
/// moves, and every move lands in `transition_log`.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    phase: Phase,
    messages: Vec<Message>,
    document_text: Option<String>,
    document_loaded: bool,
    target_role: Option<String>,
    candidate: Option<CandidateProfile>,
    ats_result: Option<AtsResult>,
    transition_log: Vec<Transition>,
}

impl Session {
    /// Create a fresh session at `Upload` with the scripted protocol
    /// instructions installed as the single system message.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: Phase::Upload,
            messages: vec![Message {
                role: Role::System,
                content: system_prompt.into(),
                kind: MessageKind::Trigger,
            }],
            document_text: None,
            document_loaded: false,
            target_role: None,
            candidate: None,
            ats_result: None,
            transition_log: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn document_text(&self) -> Option<&str> {
        self.document_text.as_deref()
    }

    pub fn document_loaded(&self) -> bool {
        self.document_loaded
    }

    pub fn target_role(&self) -> Option<&str> {
        self.target_role.as_deref()
    }

    pub fn candidate(&self) -> Option<&CandidateProfile> {
        self.candidate.as_ref()
    }

    pub fn ats_result(&self) -> Option<&AtsResult> {
        self.ats_result.as_ref()
    }

    pub fn transition_log(&self) -> &[Transition] {
        &self.transition_log
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Transition to `target` if the table allows it. Invalid targets are a
    /// recorded no-op, not an error: callers probe before committing UI
    /// actions.
    pub fn transition_to(&mut self, target: Phase, reason: &str) -> bool {
        if !self.phase.can_transition_to(target) {
            return false;
        }
        let from = self.phase;
        self.phase = target;
        self.transition_log.push(Transition {
            from,
            to: target,
            reason: reason.to_string(),
            at: Utc::now(),
        });
        true
    }

    /// Store the extracted resume text. Set at most once per session
    /// lifetime; only reset clears it.
    pub fn set_document_text(&mut self, text: String) -> Result<(), SessionError> {
        if self.document_text.is_some() {
            return Err(SessionError::DocumentAlreadyLoaded);
        }
        if text.trim().is_empty() {
            return Err(SessionError::EmptyDocument);
        }
        self.document_text = Some(text);
        Ok(())
    }

    /// Mark the one-shot upload transition as consumed.
    pub fn mark_document_loaded(&mut self) {
        self.document_loaded = true;
    }

    /// Overwrite the derived target role. Whole-value replacement only.
    pub fn set_target_role(&mut self, role: String) {
        self.target_role = Some(role);
    }

    pub fn set_candidate(&mut self, candidate: CandidateProfile) {
        self.candidate = Some(candidate);
    }

    /// Store a freshly computed ATS result. Only an explicit recompute
    /// lands here again.
    pub fn set_ats_result(&mut self, result: AtsResult) {
        self.ats_result = Some(result);
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Messages a presentation layer may render: system and synthetic
    /// trigger messages are filtered out, failure notices stay.
    pub fn visible_messages(&self) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|m| m.role != Role::System && m.kind != MessageKind::Trigger)
            .cloned()
            .collect()
    }

    /// The history sent to the completion service: system instructions and
    /// triggers included, failure notices left out.
    pub fn chat_messages(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .filter(|m| m.kind != MessageKind::Notice)
            .map(|m| ChatMessage {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }

    /// Content of the most recent message, if any.
    pub fn last_message_content(&self) -> Option<&str> {
        self.messages.last().map(|m| m.content.as_str())
    }

    /// Genuine human messages — triggers and notices never count.
    pub fn genuine_user_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User && m.kind == MessageKind::Genuine)
            .count()
    }

    /// Genuine assistant replies — failure notices never count.
    pub fn genuine_assistant_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant && m.kind == MessageKind::Genuine)
            .count()
    }

    /// Completed human↔assistant exchange pairs.
    pub fn exchange_pairs(&self) -> usize {
        self.genuine_user_count().min(self.genuine_assistant_count())
    }
}
