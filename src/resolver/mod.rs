//! Version resolution for the release channels

pub mod channel_bump;
pub mod next_alpha;

pub use channel_bump::next_version;
pub use next_alpha::next_alpha;
