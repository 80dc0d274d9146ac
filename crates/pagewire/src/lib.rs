//! Pagewire: page objects for browser UI tests
//!
//! Tests address widgets through typed components bound to stable test ids,
//! ask them typed conditions, and wait for those conditions with polling
//! that tolerates a page still rendering.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      PAGEWIRE Architecture                     │
//! ├────────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────┐   ┌────────────┐              │
//! │  │ Composite  │   │ Component  │   │ Dispatch   │              │
//! │  │ (fields)   │──►│ (locator + │──►│ (handler   │──► Driver    │
//! │  │            │   │  kind)     │   │  layers)   │              │
//! │  └────────────┘   └─────┬──────┘   └────────────┘              │
//! │                         │ should / should_not                  │
//! │                         ▼                                      │
//! │                   ┌────────────┐                               │
//! │                   │ Wait       │ poll until deadline           │
//! │                   └────────────┘                               │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use pagewire::prelude::*;
//!
//! let session = Session::new(driver);
//! let remember: CheckBox = session.resolve(["form", "rememberMe"])?;
//! remember.set_checked(true)?.should(&checked())?;
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod component;
pub mod components;
pub mod condition;
pub mod config;
pub mod dispatch;
pub mod driver;
pub mod locator;
pub mod logging;
pub mod mock;
pub mod page_object;
mod result;
pub mod session;
pub mod wait;

pub use component::{
    Checkable, Clickable, Collapsible, Component, ComponentCore, HasCaption, HasValue,
};
pub use components::{
    Button, CheckBox, ComboBox, DataGrid, DateField, Label, OptionsPopup, PopupButton,
    PopupContent, Row, SideMenu, Tab, TabSheet, TextArea, TextField, TimeField, Untyped,
};
pub use condition::{Condition, ConditionKind, CustomCondition};
pub use config::{EngineConfig, Markers};
pub use dispatch::{HandlerLayer, HandlerTable, Probe};
pub use driver::{keys, DomHandle, DomRef, Driver, DriverError, DriverResult};
pub use locator::{chain, path, CompositeLocator, LocatorPart, LocatorStep};
pub use page_object::{
    Composite, CompositeSchema, FieldDecl, Nested, ResolvedComposite, WireContext, WireSlot,
    Wired,
};
pub use result::{LastObserved, PagewireError, PagewireResult};
pub use session::{Session, Target};
pub use wait::{Waiter, WaitOptions, WaitResult};

#[cfg(feature = "derive")]
pub use pagewire_derive::Composite;

/// Prelude module for convenient imports
pub mod prelude {
    pub use super::component::*;
    pub use super::components::*;
    pub use super::condition::{
        caption, caption_contains, checked, collapsed, custom, date_value, disabled, editable,
        enabled, expanded, hidden, readonly, required, selected, value, value_contains, visible,
        Condition, ConditionKind,
    };
    pub use super::config::{EngineConfig, Markers};
    pub use super::driver::{keys, Driver, DriverError};
    pub use super::locator::{chain, path, CompositeLocator, LocatorStep};
    pub use super::page_object::{Composite, Nested, Wired};
    pub use super::result::*;
    pub use super::session::Session;
    pub use super::wait::{
        set_default_poll_interval, set_default_timeout, wait_until, WaitOptions, Waiter,
    };
    #[cfg(feature = "derive")]
    pub use pagewire_derive::Composite;
}
