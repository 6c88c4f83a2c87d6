//! Test Module
//!
//! Test suite for the ScholarMate backend.
//!
//! ## Test Categories
//! - `database_tests`: CRUD operations for events, flashcards, summaries, plans and logs
//! - `coordinator_tests`: Routing, dispatch and failure handling with mock handlers
//! - `integration_tests`: Full request flows over a temporary database

pub mod coordinator_tests;
pub mod database_tests;
