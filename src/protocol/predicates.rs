//! Transition predicates — pure functions over a session snapshot.
//!
//! Every predicate relies only on structural signals the orchestrator
//! itself controls: message counts, kind tags, and explicit command
//! markers. None of them parse the model's natural-language output; that
//! was the failure mode this design replaces.

use crate::config::CoachConfig;

use super::phase::Phase;
use super::session::Session;

/// Upload → Diagnosis: a resume is loaded and the one-shot guard has not
/// fired yet. Re-evaluation after the transition is a no-op.
pub fn should_enter_diagnosis(session: &Session) -> bool {
    session.phase() == Phase::Upload
        && !session.document_loaded()
        && session
            .document_text()
            .is_some_and(|text| !text.trim().is_empty())
}

/// Diagnosis → DiagnosisInProgress: the assistant's first reply to the
/// upload trigger is proof the scripted diagnosis has started.
pub fn should_enter_diagnosis_in_progress(session: &Session, config: &CoachConfig) -> bool {
    session.phase() == Phase::Diagnosis
        && session.genuine_assistant_count() >= config.diagnosis_started_after
}

/// DiagnosisInProgress → Menu: enough genuine human↔assistant exchange
/// pairs have accumulated, one per scripted diagnostic question.
pub fn should_enter_menu(session: &Session, config: &CoachConfig) -> bool {
    session.phase() == Phase::DiagnosisInProgress
        && session.exchange_pairs() >= config.menu_unlock_pairs
}

/// Menu → Execution: the most recent message carries an explicit command
/// marker.
pub fn should_enter_execution(session: &Session, config: &CoachConfig) -> bool {
    session.phase() == Phase::Menu
        && session
            .last_message_content()
            .is_some_and(|content| contains_any_marker(content, &config.command_markers))
}

/// Execution → Menu: the user asked to return to the menu.
pub fn should_return_to_menu(session: &Session, config: &CoachConfig) -> bool {
    session.phase() == Phase::Execution
        && session
            .last_message_content()
            .is_some_and(|content| contains_any_marker(content, &config.menu_return_markers))
}

fn contains_any_marker(content: &str, markers: &[String]) -> bool {
    let lowered = content.to_lowercase();
    markers
        .iter()
        .any(|marker| !marker.is_empty() && lowered.contains(&marker.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::session::Message;

    fn session_in(phase: Phase) -> Session {
        let mut s = Session::new("instructions");
        match phase {
            Phase::Upload => {}
            Phase::Diagnosis => {
                s.set_document_text("resume".to_string()).unwrap();
                s.transition_to(Phase::Diagnosis, "test");
            }
            Phase::DiagnosisInProgress => {
                s = session_in(Phase::Diagnosis);
                s.transition_to(Phase::DiagnosisInProgress, "test");
            }
            Phase::Menu => {
                s = session_in(Phase::DiagnosisInProgress);
                s.transition_to(Phase::Menu, "test");
            }
            Phase::Execution => {
                s = session_in(Phase::Menu);
                s.transition_to(Phase::Execution, "test");
            }
        }
        s
    }

    #[test]
    fn diagnosis_requires_document() {
        let s = Session::new("instructions");
        assert!(!should_enter_diagnosis(&s));

        let mut loaded = Session::new("instructions");
        loaded.set_document_text("resume text".to_string()).unwrap();
        assert!(should_enter_diagnosis(&loaded));
    }

    #[test]
    fn diagnosis_fires_exactly_once() {
        let mut s = Session::new("instructions");
        s.set_document_text("resume text".to_string()).unwrap();
        assert!(should_enter_diagnosis(&s));

        s.transition_to(Phase::Diagnosis, "resume loaded");
        s.mark_document_loaded();
        assert!(!should_enter_diagnosis(&s));

        // Even if the phase could somehow be Upload again, the guard holds.
        let mut guarded = Session::new("instructions");
        guarded.set_document_text("resume text".to_string()).unwrap();
        guarded.mark_document_loaded();
        assert!(!should_enter_diagnosis(&guarded));
    }

    #[test]
    fn diagnosis_in_progress_counts_assistant_replies() {
        let config = CoachConfig::default();
        let mut s = session_in(Phase::Diagnosis);
        assert!(!should_enter_diagnosis_in_progress(&s, &config));

        s.push(Message::trigger("RESUME UPLOADED"));
        assert!(!should_enter_diagnosis_in_progress(&s, &config));

        s.push(Message::assistant("Question one."));
        assert!(should_enter_diagnosis_in_progress(&s, &config));
    }

    #[test]
    fn diagnosis_in_progress_threshold_is_configurable() {
        let config = CoachConfig {
            diagnosis_started_after: 2,
            ..CoachConfig::default()
        };
        let mut s = session_in(Phase::Diagnosis);
        s.push(Message::assistant("one"));
        assert!(!should_enter_diagnosis_in_progress(&s, &config));
        s.push(Message::assistant("two"));
        assert!(should_enter_diagnosis_in_progress(&s, &config));
    }

    #[test]
    fn menu_unlocks_on_exchange_pairs() {
        let config = CoachConfig::default();
        let mut s = session_in(Phase::DiagnosisInProgress);
        for i in 0..4 {
            assert!(!should_enter_menu(&s, &config), "fired after {i} pairs");
            s.push(Message::assistant("question"));
            s.push(Message::user("answer"));
        }
        assert!(should_enter_menu(&s, &config));
    }

    #[test]
    fn menu_ignores_triggers_and_notices() {
        let config = CoachConfig {
            menu_unlock_pairs: 1,
            ..CoachConfig::default()
        };
        let mut s = session_in(Phase::DiagnosisInProgress);
        s.push(Message::trigger("synthetic"));
        s.push(Message::notice("failure notice"));
        assert!(!should_enter_menu(&s, &config));

        s.push(Message::assistant("question"));
        s.push(Message::user("answer"));
        assert!(should_enter_menu(&s, &config));
    }

    #[test]
    fn menu_requires_the_right_phase() {
        let config = CoachConfig {
            menu_unlock_pairs: 0,
            ..CoachConfig::default()
        };
        let s = session_in(Phase::Diagnosis);
        assert!(!should_enter_menu(&s, &config));
    }

    #[test]
    fn execution_matches_markers_case_insensitively() {
        let config = CoachConfig::default();
        let mut s = session_in(Phase::Menu);
        s.push(Message::user("let's talk"));
        assert!(!should_enter_execution(&s, &config));

        s.push(Message::user("/OPTIMIZE my resume"));
        assert!(should_enter_execution(&s, &config));
    }

    #[test]
    fn execution_never_fires_outside_menu() {
        let config = CoachConfig::default();
        let mut s = session_in(Phase::DiagnosisInProgress);
        s.push(Message::user("/optimize"));
        assert!(!should_enter_execution(&s, &config));
    }

    #[test]
    fn return_to_menu_on_marker() {
        let config = CoachConfig::default();
        let mut s = session_in(Phase::Execution);
        s.push(Message::user("looks great, thanks"));
        assert!(!should_return_to_menu(&s, &config));

        s.push(Message::user("/menu"));
        assert!(should_return_to_menu(&s, &config));
    }
}
