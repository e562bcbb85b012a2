//! # imsg-providers
//!
//! Send provider implementations for imsg: the AppleScript mechanism, the
//! native bridge placeholder, and the fallback chain that composes them.

pub mod applescript;
pub mod fallback;
pub mod launcher;
pub mod native;
pub mod retry;
pub mod runner;

pub use applescript::AppleScriptProvider;
pub use fallback::FallbackProvider;
pub use launcher::{AppLauncher, NoopLauncher, ScriptLauncher};
pub use native::NativeProvider;
pub use retry::RetryPolicy;
pub use runner::{OsaScriptRunner, ScriptRunner};
