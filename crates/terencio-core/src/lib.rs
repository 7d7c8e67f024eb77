//! Scope engine for the Terencio back-office console.
//!
//! Decides which company and which store the console is looking at, keeps
//! that decision consistent with the URL across navigation, persists it
//! across reloads, and gates scope-dependent views until it exists.
//!
//! This crate is free of HTTP and database dependencies. Durable storage is
//! plugged in through [`persist::ScopeStorage`] and the host's router through
//! [`route::Router`].

pub mod error;
pub mod guard;
pub mod identity;
pub mod persist;
pub mod resolver;
pub mod route;
pub mod scope;
pub mod session;
pub mod store;

pub use error::{Error, Result};
