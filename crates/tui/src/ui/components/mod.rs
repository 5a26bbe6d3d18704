pub mod card;
pub mod hints;
pub mod tag_input;
pub mod toast;
