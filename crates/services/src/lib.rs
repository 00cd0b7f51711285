//! # services
//!
//! Use cases of the portal, written against the ports in `domains`.
//! Services validate input, enforce permissions and log what they change;
//! persistence and delivery are left to whatever adapters are injected.

pub mod articles;
pub mod auth;
pub mod authors;
pub mod catalog;
pub mod censor;
pub mod digest;
pub mod news;
pub mod notify;
pub mod schedule;

mod validation;

pub use articles::{ArticleDraft, ArticleService};
pub use auth::{AuthService, Registration};
pub use authors::AuthorService;
pub use catalog::CatalogService;
pub use censor::Censor;
pub use digest::{week_window, DigestReport, DigestService, DigestSettings, DigestWindow};
pub use news::{NewsDraft, NewsService};
pub use notify::ArticleNotifier;
pub use schedule::WeeklySchedule;
