mod user;
pub use user::{ProfileUpdate, User};

mod claims;
pub use claims::{Claims, Identity};

pub mod snippets;
pub use snippets::{
    LikeStatus, LikeToggle, ListParams, NewSnippet, Snippet, SnippetFilter, SnippetPage,
};
