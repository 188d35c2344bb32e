//! Interactive bounding-box annotation canvas.
//!
//! This crate owns everything between raw pointer/keyboard/wheel events and
//! the box overlay drawn over an image: the pan/zoom view, coordinate mapping
//! between screen and image space, hit-testing boxes and their corner handles,
//! the create/move/resize drag state machine, and rendering. It performs no
//! I/O. Finalized mutations come back to the host as [`engine::Action`]s,
//! and the host is responsible for persisting them.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EditorSession`]: drag state machine and session operations |
//! | [`doc`] | Box records, identifiers and the ordered box store |
//! | [`camera`] | View transform and screen/image coordinate conversions |
//! | [`input`] | Input event types, tools and the drag state |
//! | [`hit`] | Hit-testing against boxes and handles |
//! | [`render`] | Frame rendering onto a [`render::Surface`] |
//! | [`consts`] | Shared numeric constants (zoom limits, screen-constant sizes) |
//! | `web` | Browser 2D-context surface (`web` feature) |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
pub mod render;
#[cfg(feature = "web")]
pub mod web;
