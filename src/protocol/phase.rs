//! Phase state machine — tracks which step of the coaching protocol is active.

use serde::{Deserialize, Serialize};

/// The phases of the coaching conversation.
///
/// Progresses Upload → Diagnosis → DiagnosisInProgress → Menu, then cycles
/// Menu ⇄ Execution for as long as the user keeps invoking commands. Upload
/// is the sole initial phase; there is no terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Upload,
    Diagnosis,
    DiagnosisInProgress,
    Menu,
    Execution,
}

impl Phase {
    /// The phases reachable from `self` in one transition.
    pub fn allowed_targets(&self) -> &'static [Phase] {
        match self {
            Phase::Upload => &[Phase::Diagnosis],
            Phase::Diagnosis => &[Phase::DiagnosisInProgress],
            Phase::DiagnosisInProgress => &[Phase::Menu],
            Phase::Menu => &[Phase::Execution],
            Phase::Execution => &[Phase::Menu],
        }
    }

    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Phase) -> bool {
        self.allowed_targets().contains(&target)
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::Upload
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Upload => "upload",
            Self::Diagnosis => "diagnosis",
            Self::DiagnosisInProgress => "diagnosis_in_progress",
            Self::Menu => "menu",
            Self::Execution => "execution",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Phase; 5] = [
        Phase::Upload,
        Phase::Diagnosis,
        Phase::DiagnosisInProgress,
        Phase::Menu,
        Phase::Execution,
    ];

    #[test]
    fn valid_transitions() {
        let edges = [
            (Phase::Upload, Phase::Diagnosis),
            (Phase::Diagnosis, Phase::DiagnosisInProgress),
            (Phase::DiagnosisInProgress, Phase::Menu),
            (Phase::Menu, Phase::Execution),
            (Phase::Execution, Phase::Menu),
        ];
        for (from, to) in edges {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn every_other_pair_is_rejected() {
        let edges = [
            (Phase::Upload, Phase::Diagnosis),
            (Phase::Diagnosis, Phase::DiagnosisInProgress),
            (Phase::DiagnosisInProgress, Phase::Menu),
            (Phase::Menu, Phase::Execution),
            (Phase::Execution, Phase::Menu),
        ];
        for from in ALL {
            for to in ALL {
                let expected = edges.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "unexpected verdict for {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn no_phase_reaches_upload() {
        for from in ALL {
            assert!(!from.can_transition_to(Phase::Upload));
        }
    }

    #[test]
    fn self_transitions_are_rejected() {
        for phase in ALL {
            assert!(!phase.can_transition_to(phase));
        }
    }

    #[test]
    fn menu_execution_cycle() {
        assert!(Phase::Menu.can_transition_to(Phase::Execution));
        assert!(Phase::Execution.can_transition_to(Phase::Menu));
    }

    #[test]
    fn display_matches_serde() {
        for phase in ALL {
            let display = format!("{phase}");
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }

    #[test]
    fn initial_phase_is_upload() {
        assert_eq!(Phase::default(), Phase::Upload);
    }
}
