//! # Gallery Sync
//!
//! Client-side photo filtering for a portfolio gallery, with a grid and a
//! full-screen viewer that always show the same filtered set.
//!
//! # Architecture: One Computation, Two Views
//!
//! A filter change travels one way through the page:
//!
//! ```text
//! FilterControls ──publish──▶ FilterChannel ──▶ SyncBridge
//!                                                  │ apply_filters (once)
//!                                    ┌─────────────┴─────────────┐
//!                                    ▼                           ▼
//!                           GridRenderer::replace_list   LightboxSlot::replace_photos
//! ```
//!
//! The controls never touch the grid or the viewer, and neither view ever
//! filters on its own. Both are fed from the same result, in the same
//! synchronous turn, so they cannot disagree.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `Photo`, `Album`, the viewer's `LightboxPhoto` projection |
//! | [`catalog`] | Immutable per-page photo catalog; JSON loading from a file or album directory |
//! | [`filter`] | `FilterState`, range predicates, the pure `apply_filters`, tag availability |
//! | [`message`] | The typed `filter-changed` message and its JSON wire form |
//! | [`channel`] | Synchronous in-process broadcast of `filter-changed` |
//! | [`controls`] | Filter control surface: owns the state, publishes every change, renders pills |
//! | [`grid`] | Progressive-reveal photo grid with a post-render hook |
//! | [`lightbox`] | Single viewer: open/close/navigate, identity-preserving list replacement |
//! | [`bridge`] | Recompute once per message, feed grid then viewer |
//! | [`session`] | Builds and wires one page view's components |
//! | [`resolve`] | Image reference → URL for a requested width |
//! | [`config`] | `config.toml` loading, validation, merging over stock defaults |
//! | [`prefs`] | Client-local collapsed-section state |
//! | [`naming`] | Tag normalization, labels and slugs |
//! | [`metadata`] | Exposure value parsing and display formatting |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Explicit Wiring Over Globals
//!
//! There is no ambient viewer instance and no global event bus. A
//! [`session::PageSession`] owns the channel and hands each component the
//! handles it needs. The viewer sits behind a [`bridge::LightboxSlot`] that
//! may be empty; pushing a list into an empty slot does nothing.
//!
//! ## Typed Messages
//!
//! [`message::FilterChanged`] is an enum with a `Tags` variant for the
//! album page and an `Advanced` variant for the all-photos explorer. The
//! JSON form is validated once at [`message::FilterChanged::from_json`];
//! everything downstream works with the typed value.
//!
//! ## Identity, Not Index
//!
//! When the list under an open viewer changes, the viewer looks its photo
//! up by id. If the photo is still there it follows it to its new index;
//! if it is gone the viewer closes rather than show whatever now sits at
//! the old index.
//!
//! ## Per-Surface Empty Selection
//!
//! With nothing selected, an album page shows the whole album while the
//! all-photos explorer shows nothing until a filter is picked. This is kept
//! as an explicit [`filter::EmptySelection`] per surface, configurable under
//! `[filters]`.
//!
//! ## Missing Data Never Matches
//!
//! A photo without an ISO value is excluded by any active ISO range, however
//! wide. Absent metadata is not silently treated as a match.
//!
//! ## Maud For Markup
//!
//! Components render with [Maud](https://maud.lambda.xyz/): compile-time
//! checked, auto-escaped, no template files. Viewer stories are Markdown,
//! rendered with `pulldown-cmark`.

pub mod bridge;
pub mod catalog;
pub mod channel;
pub mod config;
pub mod controls;
pub mod filter;
pub mod grid;
pub mod lightbox;
pub mod message;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod prefs;
pub mod resolve;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
