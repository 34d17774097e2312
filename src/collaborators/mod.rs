//! Wire schemas and thin clients for the two out-of-core collaborators
//! named in spec §1/§6: the event/manifest log writer and the multi-unit
//! fusion server. Only the schemas and thin client calls are part of the
//! core's contract; the servers/UI themselves are out of scope.

pub mod event_log;
pub mod fusion;
