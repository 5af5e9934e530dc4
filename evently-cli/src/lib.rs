//! Terminal front-end for the portal. Each subcommand plays the part of
//! one page: it checks the role's session first, then drives the same flows
//! a browser would.

pub mod cli;
pub mod commands;
pub mod devices;
