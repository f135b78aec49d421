//! Async client for the Torjoman collaborative translation platform.
//!
//! # Overview
//! Accounts log in, create projects, split them into sections, fill
//! sections with sentences, and submit translations that other accounts
//! vote on. This crate exposes that resource graph as typed values whose
//! methods perform the matching REST calls.
//!
//! # Design
//! - `http` describes requests/responses as data; `Transport` executes them.
//! - `status` is the single place wire statuses become `ApiError`s.
//! - `Session` owns the token pair; every resource keeps a clone of the
//!   session it was obtained through and is never rebound to another.
//! - Resource modules form a strict chain
//!   `project` → `section` → `sentence` → `translation`; each child module
//!   adds the "create/list children" methods to its parent type.
//! - Nothing retries or refreshes implicitly. A `TokenExpired` error is the
//!   caller's cue to call `Session::refresh` or log in again.
//!
//! ```no_run
//! use torjoman_core::{Account, ApiError, Client, PageRequest};
//!
//! # async fn run() -> Result<(), ApiError> {
//! let client = Client::new("https://torjoman.example.com")?;
//! let account = Account::login(&client, "alice", "secret").await?;
//! let project = account.create_project("Poems").await?;
//! let section = project.create_section("Chapter 1").await?;
//! let sentence = section.create_sentence("Hello, world").await?;
//! let page = sentence.list_translations(PageRequest::default()).await?;
//! println!("{} translations", page.count);
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod pagination;
pub mod project;
pub mod section;
pub mod sentence;
pub mod session;
pub mod status;
pub mod translation;
pub mod types;

#[cfg(test)]
mod testing;

pub use account::Account;
pub use client::{Client, Resource};
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Query, ReqwestTransport, Transport};
pub use pagination::{page_from_link, ModelList, Page, PageRequest};
pub use project::Project;
pub use section::Section;
pub use sentence::{Sentence, SentenceScope};
pub use session::Session;
pub use status::{map_response, Operation, Status};
pub use translation::Translation;
pub use types::{
    AccountRecord, AccountUpdate, Owner, ProjectUpdate, SectionUpdate, SentenceUpdate, Signup, TokenPair,
};
