//! Core library for Helm: the embedded section catalog, address-fragment
//! routing, and the staged navigation state machine, plus the logging and
//! settings infrastructure shared by the shell.

pub mod assets;
pub mod catalog;
pub mod controller;
pub mod helpers;
pub mod host;
pub mod logging;
pub mod routing;
pub mod settings;
pub mod timeline;
