// Assignment intake: upload → render → extract → append.

pub mod handlers;
pub mod intake;
