//! Client-side logic of the e-learning portal.
//!
//! The crate is organized around one data flow: the [`backend`] fetches
//! loosely shaped JSON from the course REST API, the [`mapper`] normalizes
//! it into the strict [`model`], and the [`store`] owns the resulting
//! collections. [`viewer`] and [`admin`] are state machines layered on top
//! of the store, for watching a course and for editing its curriculum.

pub mod admin;
pub mod backend;
pub mod cfg;
pub mod mapper;
pub mod media;
pub mod model;
pub mod store;
pub mod token;
pub mod viewer;
