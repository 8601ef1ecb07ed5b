//! Terminal front end for the tagmark core.
pub mod render;
pub mod shell;
pub mod watch;
