//! # Toybrawl Tween
//!
//! Frame-driven animation for card and character effects:
//! - Typed tween requests with exact end values
//! - Named easing table
//! - Sequential chains sharing one cancel handle
//! - Fire-and-forget springs
//! - Element transform helper with compositor hints
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     TWEEN PIPELINE                        │
//! ├──────────────────────────────────────────────────────────┤
//! │  schedule / chain / spring ──> active set ──> tick()      │
//! │          ↑                                      ↓         │
//! │    TweenSpawner <── on_complete <── snap + remove         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The scheduler is single-threaded: targets are `Rc<RefCell<_>>` shared with
//! the effect code that reads them back.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod easing;
pub mod element;
pub mod field;
pub mod request;
pub mod scheduler;
pub mod spring;

pub use config::TweenConfig;
pub use easing::Easing;
pub use element::{
    CompositorHint, ElementProps, ElementTransform, StyledElement, VisualElement,
    DEFAULT_ELEMENT_DURATION_MS,
};
pub use field::{AnimatedNode, Field, StyleProp, StyleRecord, TweenTarget};
pub use request::{ChainStep, TargetRef, TweenHandle, TweenOptions};
pub use scheduler::{TweenScheduler, TweenSpawner};
pub use spring::SpringOptions;
