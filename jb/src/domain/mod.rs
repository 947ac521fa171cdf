//! Domain types for the journey builder
//!
//! The Journey Document is the structured configuration an LLM authors turn by
//! turn: screens built from catalog components, plus navigation edges between
//! them. These types are deliberately lenient on input (every field the model
//! may omit is optional) and the reconciler is what brings them back in line.

mod id;
mod journey;
mod lifecycle;

pub use id::SessionId;
pub use journey::{
    ComponentInstance, DEFAULT_COMPONENT_STYLE, DEFAULT_FIELD_STYLE, DEFAULT_SCREEN_STYLE, DEFAULT_TEMPLATE,
    JourneyDocument, JourneyType, NAVIGATION_BUTTON_CLICK, NavigationEdge, Screen, ScreenRef,
};
pub use lifecycle::{Lifecycle, LifecycleEvent};
