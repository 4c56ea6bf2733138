//! Domain logic - release tags and command templates, independent of git and ssh

pub mod options;
pub mod release;
pub mod tag;
pub mod template;

pub use options::OptionSet;
pub use release::{CandidateTagSet, ReleaseKind};
pub use tag::SemanticTag;
pub use template::CommandTemplate;
