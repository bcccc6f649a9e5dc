//! Rendering a resolved configuration into deployment artifacts.
//!
//! Every function here is pure: identical configurations always render
//! identical text and flag sequences.

pub mod dockerfile;
pub mod flags;
pub mod hostname;
pub mod payload;

pub use dockerfile::{RecipeOptions, render_dockerfile};
pub use flags::{LaunchOptions, RenderMode, render_launch_flags, shell_escape};
pub use hostname::{docker_hostname, sanitize_hostname};
pub use payload::render_payload;
