//! Integration tests for fixturekit-db against file-backed SQLite databases.

mod common;
mod integration;
