// Bleep: multi-tenant text moderation engine.
//
// This is the library root. The core pipeline (normalize -> tokenize ->
// classify -> match -> censor) is pure and synchronous; the db module holds
// the async storage collaborators around it.

pub mod config;
pub mod db;
pub mod matcher;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod severity;
pub mod status;
pub mod tokenize;
