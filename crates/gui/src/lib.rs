// Library crate: exposes testable modules for integration tests.
// GUI-specific modules (app, ui) remain in the binary crate.

pub mod i18n;
pub mod mesh;
pub mod preview;
pub mod state;
