//! Reusable widgets shared by the views.

pub mod badges;
pub mod header;
pub mod rich_text;
pub mod text_input;
