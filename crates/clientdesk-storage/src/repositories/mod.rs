//! Repository implementations using SQLite.

mod client_repository;

pub use client_repository::SqliteClientRepository;
