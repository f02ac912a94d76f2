//! Keywords and answer classification shared by every prompt.

/// Typed at any prompt to abandon the current operation.
pub const CANCEL_KEYWORD: &str = "back";

/// Required, in any letter case, before a destructive command runs.
pub const CONFIRM_TOKEN: &str = "confirm";

pub const YES: &str = "yes";

/// Printed whenever the cancel keyword aborts an operation.
pub const RETURNING: &str = "Returning to main menu.";

pub fn is_cancel(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(CANCEL_KEYWORD)
}

pub fn is_yes(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(YES)
}

/// Answer to a danger confirmation.
///
/// `Declined` and `Cancelled` both stop the action; they only differ in the message
/// shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
    Cancelled,
}

impl Confirmation {
    pub fn from_input(input: &str) -> Self {
        let input = input.trim();
        if input.eq_ignore_ascii_case(CONFIRM_TOKEN) {
            Confirmation::Confirmed
        } else if is_cancel(input) {
            Confirmation::Cancelled
        } else {
            Confirmation::Declined
        }
    }

    pub fn proceed(self) -> bool {
        self == Confirmation::Confirmed
    }

    /// Line printed after a refusal.
    pub fn message(self) -> Option<&'static str> {
        match self {
            Confirmation::Confirmed => None,
            Confirmation::Declined => Some("Action cancelled."),
            Confirmation::Cancelled => Some(RETURNING),
        }
    }
}

/// Warning shown before a destructive action.
pub fn danger_banner(action: &str) -> String {
    format!(
        "\n!!! DANGER: You are about to {}. This action is IRREVERSIBLE. !!!",
        action
    )
}
