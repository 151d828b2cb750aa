//! Collaborators at the edges of the pipeline:
//! - openBD coverage and detail fetching (`OpenBdClient`)
//! - RSS rendering (`render_feed`)
//! - Social posting (`XClient`) and its OAuth 1.0a signing

pub mod feed;
pub mod oauth;
pub mod openbd;
pub mod social;

pub use feed::render_feed;
pub use oauth::OAuthCredentials;
pub use openbd::{BibliographicSource, OpenBdClient};
pub use social::{SocialPublisher, XClient, format_post, publish_new_books};
