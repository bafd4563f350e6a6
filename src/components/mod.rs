pub mod chat_panel;
pub mod endpoint_card;
pub mod header;
pub mod right_panel;
