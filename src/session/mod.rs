//! Request lifecycle state for the lookup form.
//!
//! All changes go through [`Session::reduce`], one [`Action`] at a time.

/// ID shown in the input when nothing else is configured
pub const DEFAULT_USER_ID: &str = "1";

/// Events that drive the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Input text changed (full new value, not a delta)
    TypeId(String),
    /// Submit pressed, request about to go out
    StartFetch,
    /// Request finished with a pretty-printed body
    FetchSucceeded(String),
    /// Request failed; code is a status number or the raw error text
    FetchFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching,
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id_input: String,
    pub is_fetching: bool,
    pub is_successful: bool,
    pub error_message: String,
    pub result: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_USER_ID)
    }
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id_input: user_id.into(),
            is_fetching: false,
            is_successful: false,
            error_message: String::new(),
            result: String::new(),
        }
    }

    /// Apply one transition and return the next state
    pub fn reduce(self, action: Action) -> Self {
        match action {
            Action::TypeId(value) => Self {
                user_id_input: value,
                ..self
            },
            Action::StartFetch => Self {
                is_fetching: true,
                is_successful: false,
                error_message: String::new(),
                result: String::new(),
                ..self
            },
            Action::FetchSucceeded(payload) => Self {
                is_fetching: false,
                is_successful: true,
                result: payload,
                ..self
            },
            Action::FetchFailed(code) => Self {
                is_fetching: false,
                error_message: format!("Request failed. Error: {}", code),
                ..self
            },
        }
    }

    /// In-place variant of [`Session::reduce`] for owners holding `&mut Session`
    pub fn dispatch(&mut self, action: Action) {
        let current = std::mem::take(self);
        *self = current.reduce(action);
    }

    pub fn phase(&self) -> Phase {
        if self.is_fetching {
            Phase::Fetching
        } else if self.is_successful {
            Phase::Success
        } else if !self.error_message.is_empty() {
            Phase::Failed
        } else {
            Phase::Idle
        }
    }

    /// Whether the Fetch trigger is enabled
    pub fn can_submit(&self) -> bool {
        !self.is_fetching
    }

    /// Whether the ID input accepts edits
    pub fn can_edit(&self) -> bool {
        !self.is_fetching
    }

    pub fn show_error(&self) -> bool {
        !self.is_successful && !self.error_message.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let session = Session::default();
        assert_eq!(session.user_id_input, "1");
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.can_submit());
        assert!(session.result.is_empty());
        assert!(session.error_message.is_empty());
    }

    #[test]
    fn test_typing_is_verbatim() {
        let mut session = Session::default();
        for value in ["", "12", " 7 ", "abc/../x?y=1", "ünï"] {
            session.dispatch(Action::TypeId(value.to_string()));
            assert_eq!(session.user_id_input, value);
            assert_eq!(session.phase(), Phase::Idle);
        }
    }

    #[test]
    fn test_start_fetch_clears_previous_outcome() {
        let session = Session::default()
            .reduce(Action::StartFetch)
            .reduce(Action::FetchFailed("500".to_string()))
            .reduce(Action::StartFetch);

        assert_eq!(session.phase(), Phase::Fetching);
        assert!(session.error_message.is_empty());
        assert!(session.result.is_empty());
        assert!(!session.show_error());
    }

    #[test]
    fn test_success_stores_payload() {
        let payload = "{\n  \"data\": {\n    \"id\": 1\n  }\n}".to_string();
        let session = Session::default()
            .reduce(Action::StartFetch)
            .reduce(Action::FetchSucceeded(payload.clone()));

        assert_eq!(session.phase(), Phase::Success);
        assert_eq!(session.result, payload);
        assert!(!session.is_fetching);
    }

    #[test]
    fn test_failure_embeds_code() {
        let session = Session::default()
            .reduce(Action::StartFetch)
            .reduce(Action::FetchFailed("404".to_string()));

        assert_eq!(session.phase(), Phase::Failed);
        assert_eq!(session.error_message, "Request failed. Error: 404");
        assert!(session.show_error());
        assert!(session.can_submit());
    }

    #[test]
    fn test_refetch_after_success_resets_flag() {
        let session = Session::default()
            .reduce(Action::StartFetch)
            .reduce(Action::FetchSucceeded("{}".to_string()))
            .reduce(Action::StartFetch);

        assert!(!session.is_successful);
        assert!(session.is_fetching);
        assert!(session.result.is_empty());
    }

    #[test]
    fn test_trigger_disabled_only_while_fetching() {
        let mut session = Session::default();
        assert!(session.can_submit());

        session.dispatch(Action::StartFetch);
        assert!(!session.can_submit());
        assert!(!session.can_edit());

        session.dispatch(Action::FetchSucceeded("{}".to_string()));
        assert!(session.can_submit());
        assert!(session.can_edit());
    }

    #[test]
    fn test_typing_during_fetch_keeps_request_alive() {
        let session = Session::new("3")
            .reduce(Action::StartFetch)
            .reduce(Action::TypeId("4".to_string()));

        assert_eq!(session.phase(), Phase::Fetching);
        assert_eq!(session.user_id_input, "4");
    }

    #[test]
    fn test_fetching_never_overlaps_outcome() {
        let actions = [
            Action::StartFetch,
            Action::FetchFailed("boom".to_string()),
            Action::TypeId("2".to_string()),
            Action::StartFetch,
            Action::FetchSucceeded("{}".to_string()),
            Action::StartFetch,
        ];

        let mut session = Session::default();
        for action in actions {
            session.dispatch(action);
            if session.is_fetching {
                assert!(!session.is_successful);
                assert!(session.error_message.is_empty());
            }
        }
    }
}
