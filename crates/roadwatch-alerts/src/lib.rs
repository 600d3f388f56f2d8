//! Post-run alert channels: authority reports and driver voice alerts

pub mod authority;
pub mod base;
pub mod registry;
pub mod voice;

pub use authority::{authority_email, AuthorityNotifier, AuthorityReport};
pub use base::{is_channel_enabled, AlertChannel, AlertInput};
pub use registry::{duplicate_notice, AlertRegistry};
pub use voice::{alert_text, sign_advisory, SignAdvisory, VoiceNarrator};
