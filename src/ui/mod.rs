pub mod warn;

pub use warn::{confirm, confirm_with, parse_yes, prompt_value_with, warn_print};
