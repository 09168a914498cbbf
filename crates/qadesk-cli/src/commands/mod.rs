pub mod ask;
pub mod chat;
pub mod mask;
pub mod search;
pub mod serve;
