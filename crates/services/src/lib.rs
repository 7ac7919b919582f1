//! Lecture backend collaborators.
//!
//! Defines the [`LectureService`] seam the viewer talks to, with two
//! implementations: [`LectureApi`], a typed HTTP client for the lecture
//! backend, and [`CatalogService`], an offline JSON catalog that answers
//! the same calls locally.

pub mod api;
pub mod catalog;
pub mod error;
pub mod lenient;
pub mod service;

pub use api::LectureApi;
pub use catalog::CatalogService;
pub use error::ServiceError;
pub use service::LectureService;
