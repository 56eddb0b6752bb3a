//! Terminal presentation: review menu and progress spinner.

pub mod review;
pub mod spinner;

pub use review::{
    Choice, Reviewer, TerminalReviewer, invalid_choice_hint, parse_choice, render_menu,
    render_preview,
};
pub use spinner::Spinner;
