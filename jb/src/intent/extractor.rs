//! Intent extraction
//!
//! Pure message -> `Intent` classification. Runs before any model call so
//! fixed commands and explicit directives never cost an LLM round trip.

use regex::Regex;
use tracing::debug;

use crate::domain::ScreenRef;

/// Words that confirm and save the journey
pub const CONFIRM_COMMANDS: &[&str] = &["confirm", "yes", "ok", "finished", "done", "complete", "save", "submit"];

/// Words that discard the journey and start again
pub const CANCEL_COMMANDS: &[&str] = &["cancel", "reset", "restart", "start over", "clear", "begin again"];

/// Words that close the session
pub const QUIT_COMMANDS: &[&str] = &["quit", "exit", "close", "end", "terminate", "goodbye", "bye"];

/// Default under-specified requests ("add 3 screens")
pub const DEFAULT_AMBIGUITY_PATTERNS: &[&str] = &[r"^add \d+ screens?$", r"^create \d+ screens?$", r"^make \d+ screens?$"];

/// A screen token: numeric id or a name
const SCREEN_TOKEN: &str = r"\d+|[a-z][\w-]*";

/// "use trigger component id 13 for screen 1" and paraphrases
const TRIGGER_PATTERNS: &[&str] = &[
    r"\buse\s+trigger\s+(?:component\s+)?(?:id\s+)?(?P<trigger>\d+)\s+for\s+(?:screen\s+)?(?:id\s+)?(?P<screen>{screen})",
    r"\bfor\s+(?:screen\s+)?(?:id\s+)?(?P<screen>{screen})\s*,?\s+use\s+trigger\s+(?:component\s+)?(?:id\s+)?(?P<trigger>\d+)",
    r"\bselect\s+trigger\s+(?:component\s+)?(?:id\s+)?(?P<trigger>\d+)\s+for\s+(?:screen\s+)?(?:id\s+)?(?P<screen>{screen})",
    r"\bchoose\s+trigger\s+(?:component\s+)?(?:id\s+)?(?P<trigger>\d+)\s+for\s+(?:screen\s+)?(?:id\s+)?(?P<screen>{screen})",
];

/// "connect screen 1 to screen 2" and paraphrases
const NAVIGATION_PATTERNS: &[&str] = &[
    r"\b(?:connect|link)\s+(?:screen\s+)?(?:id\s+)?(?P<from>{screen})\s+(?:to|with|and)\s+(?:screen\s+)?(?:id\s+)?(?P<to>{screen})",
    r"\bnavigate\s+(?:from\s+)?(?:screen\s+)?(?:id\s+)?(?P<from>{screen})\s+to\s+(?:screen\s+)?(?:id\s+)?(?P<to>{screen})",
    r"\bfrom\s+(?:screen\s+)?(?:id\s+)?(?P<from>{screen})\s+(?:go|navigate|move)\s+to\s+(?:screen\s+)?(?:id\s+)?(?P<to>{screen})",
];

/// A user's explicit choice of trigger field for a source screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSelection {
    pub screen: ScreenRef,
    pub trigger_component_id: i64,
}

/// A user's explicit request for an edge between two screens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub from: ScreenRef,
    pub to: ScreenRef,
}

/// What a message asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Confirm,
    Cancel,
    Quit,
    /// Matches an under-specified pattern; the caller decides whether the guard applies
    Ambiguous,
    TriggerSelection(Vec<TriggerSelection>),
    NavigationRequest(Vec<NavigationRequest>),
    FreeText,
}

/// Compiled recognizers
#[derive(Debug, Clone)]
pub struct IntentExtractor {
    ambiguity: Vec<Regex>,
    triggers: Vec<Regex>,
    navigation: Vec<Regex>,
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?i){}", pattern.replace("{screen}", SCREEN_TOKEN)))
}

impl IntentExtractor {
    /// Build an extractor with the given ambiguity patterns
    pub fn new<S: AsRef<str>>(ambiguity_patterns: &[S]) -> Result<Self, regex::Error> {
        debug!(pattern_count = ambiguity_patterns.len(), "IntentExtractor::new: called");
        let ambiguity = ambiguity_patterns
            .iter()
            .map(|p| compile(p.as_ref().trim()))
            .collect::<Result<Vec<_>, _>>()?;
        let triggers = TRIGGER_PATTERNS.iter().map(|p| compile(p)).collect::<Result<Vec<_>, _>>()?;
        let navigation = NAVIGATION_PATTERNS
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            ambiguity,
            triggers,
            navigation,
        })
    }

    /// Build an extractor with the default ambiguity patterns
    pub fn with_defaults() -> Result<Self, regex::Error> {
        Self::new(DEFAULT_AMBIGUITY_PATTERNS)
    }

    /// Classify a message
    ///
    /// Precedence: commands, ambiguity guard, trigger selection, navigation
    /// request, free text.
    pub fn classify(&self, message: &str) -> Intent {
        debug!(message_len = message.len(), "classify: called");
        let normalized = message.trim().to_lowercase();

        if let Some(intent) = classify_command(&normalized) {
            debug!(?intent, "classify: matched command");
            return intent;
        }

        if self.is_ambiguous(message) {
            debug!("classify: matched ambiguity pattern");
            return Intent::Ambiguous;
        }

        let selections = self.extract_trigger_selections(message);
        if !selections.is_empty() {
            debug!(count = selections.len(), "classify: matched trigger selection");
            return Intent::TriggerSelection(selections);
        }

        let requests = self.extract_navigation_requests(message);
        if !requests.is_empty() {
            debug!(count = requests.len(), "classify: matched navigation request");
            return Intent::NavigationRequest(requests);
        }

        Intent::FreeText
    }

    /// Whether the whole message matches an under-specified pattern
    pub fn is_ambiguous(&self, message: &str) -> bool {
        let message = message.trim();
        self.ambiguity.iter().any(|re| re.is_match(message))
    }

    /// Every trigger selection in the message, in pattern then position order
    pub fn extract_trigger_selections(&self, message: &str) -> Vec<TriggerSelection> {
        let mut selections = Vec::new();
        for re in &self.triggers {
            for caps in re.captures_iter(message) {
                let Some(trigger_component_id) = caps.name("trigger").and_then(|m| m.as_str().parse::<i64>().ok())
                else {
                    continue;
                };
                let Some(screen) = caps.name("screen").map(|m| ScreenRef::parse(m.as_str())) else {
                    continue;
                };
                let selection = TriggerSelection {
                    screen,
                    trigger_component_id,
                };
                if !selections.contains(&selection) {
                    selections.push(selection);
                }
            }
        }
        debug!(count = selections.len(), "extract_trigger_selections: done");
        selections
    }

    /// Every navigation request in the message
    pub fn extract_navigation_requests(&self, message: &str) -> Vec<NavigationRequest> {
        let mut requests = Vec::new();
        for re in &self.navigation {
            for caps in re.captures_iter(message) {
                let (Some(from), Some(to)) = (caps.name("from"), caps.name("to")) else {
                    continue;
                };
                let request = NavigationRequest {
                    from: ScreenRef::parse(from.as_str()),
                    to: ScreenRef::parse(to.as_str()),
                };
                if !requests.contains(&request) {
                    requests.push(request);
                }
            }
        }
        debug!(count = requests.len(), "extract_navigation_requests: done");
        requests
    }
}

fn classify_command(normalized: &str) -> Option<Intent> {
    if CONFIRM_COMMANDS.contains(&normalized) {
        Some(Intent::Confirm)
    } else if CANCEL_COMMANDS.contains(&normalized) {
        Some(Intent::Cancel)
    } else if QUIT_COMMANDS.contains(&normalized) {
        Some(Intent::Quit)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> IntentExtractor {
        IntentExtractor::with_defaults().unwrap()
    }

    #[test]
    fn test_command_sets_are_disjoint() {
        for c in CONFIRM_COMMANDS {
            assert!(!CANCEL_COMMANDS.contains(c));
            assert!(!QUIT_COMMANDS.contains(c));
        }
        for c in CANCEL_COMMANDS {
            assert!(!QUIT_COMMANDS.contains(c));
        }
    }

    #[test]
    fn test_commands_trim_and_ignore_case() {
        let ex = extractor();
        assert_eq!(ex.classify("  Confirm "), Intent::Confirm);
        assert_eq!(ex.classify("DONE"), Intent::Confirm);
        assert_eq!(ex.classify("Start Over"), Intent::Cancel);
        assert_eq!(ex.classify("bye"), Intent::Quit);
    }

    #[test]
    fn test_commands_require_exact_match() {
        let ex = extractor();
        assert_eq!(ex.classify("yes please add a pan screen"), Intent::FreeText);
        assert_eq!(ex.classify("don't cancel"), Intent::FreeText);
    }

    #[test]
    fn test_ambiguous_patterns() {
        let ex = extractor();
        assert_eq!(ex.classify("add 3 screens"), Intent::Ambiguous);
        assert_eq!(ex.classify("Create 1 screen"), Intent::Ambiguous);
        assert_eq!(ex.classify("make 2 screens"), Intent::Ambiguous);
        assert_eq!(ex.classify("add 2 screens: pan and otp"), Intent::FreeText);
    }

    #[test]
    fn test_custom_ambiguity_patterns() {
        let ex = IntentExtractor::new(&["^do something$"]).unwrap();
        assert_eq!(ex.classify("do something"), Intent::Ambiguous);
        assert_eq!(ex.classify("add 3 screens"), Intent::FreeText);
    }

    #[test]
    fn test_invalid_ambiguity_pattern() {
        assert!(IntentExtractor::new(&["(unclosed"]).is_err());
    }

    #[test]
    fn test_trigger_selection_paraphrases() {
        let ex = extractor();
        let expected = vec![TriggerSelection {
            screen: ScreenRef::Id(1),
            trigger_component_id: 13,
        }];

        for message in [
            "use trigger 13 for screen 1",
            "Use trigger component ID 13 for screen id 1",
            "for screen 1 use trigger 13",
            "select trigger component 13 for screen 1",
            "choose trigger id 13 for 1",
        ] {
            assert_eq!(ex.classify(message), Intent::TriggerSelection(expected.clone()), "{}", message);
        }
    }

    #[test]
    fn test_trigger_selection_by_screen_name() {
        let ex = extractor();
        let selections = ex.extract_trigger_selections("please use trigger 10 for screen CustomerDetails");
        assert_eq!(
            selections,
            vec![TriggerSelection {
                screen: ScreenRef::Name("CustomerDetails".into()),
                trigger_component_id: 10,
            }]
        );
    }

    #[test]
    fn test_multiple_trigger_selections() {
        let ex = extractor();
        let selections = ex.extract_trigger_selections("use trigger 13 for screen 1 and use trigger 16 for screen 2");
        assert_eq!(selections.len(), 2);
        assert_eq!(selections[1].screen, ScreenRef::Id(2));
        assert_eq!(selections[1].trigger_component_id, 16);
    }

    #[test]
    fn test_navigation_paraphrases() {
        let ex = extractor();
        let expected = vec![NavigationRequest {
            from: ScreenRef::Id(1),
            to: ScreenRef::Id(2),
        }];

        for message in [
            "connect screen 1 to screen 2",
            "link 1 to 2",
            "navigate from screen 1 to screen 2",
            "from screen 1 go to screen 2",
        ] {
            assert_eq!(ex.classify(message), Intent::NavigationRequest(expected.clone()), "{}", message);
        }
    }

    #[test]
    fn test_navigation_by_name() {
        let ex = extractor();
        let requests = ex.extract_navigation_requests("Connect pan to otp");
        assert_eq!(
            requests,
            vec![NavigationRequest {
                from: ScreenRef::Name("pan".into()),
                to: ScreenRef::Name("otp".into()),
            }]
        );
    }

    #[test]
    fn test_trigger_selection_takes_precedence_over_navigation() {
        let ex = extractor();
        let intent = ex.classify("use trigger 13 for screen 1 then connect 1 to 2");
        assert!(matches!(intent, Intent::TriggerSelection(_)));
    }

    #[test]
    fn test_free_text() {
        let ex = extractor();
        assert_eq!(ex.classify("Name it LoanJourney, 1 screen"), Intent::FreeText);
    }
}
