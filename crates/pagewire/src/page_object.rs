//! Composite page objects.
//!
//! A composite is a struct whose fields are component handles. Its
//! [`CompositeSchema`] lists each field with a kind and an optional path
//! override; [`Composite::wire`] builds the struct from a [`WireContext`]
//! without touching the driver. Fields bind lazily: a [`Wired`] handle is
//! created on first access and keeps only locators, so a composite can be
//! wired before its page has rendered.
//!
//! Usually the schema and `wire` come from `#[derive(Composite)]`:
//!
//! ```ignore
//! #[derive(Composite)]
//! struct LoginForm {
//!     username: Wired<TextField>,
//!     #[wire(id = "pwd")]
//!     password: Wired<TextField>,
//!     #[wire(path("footer", "submit"))]
//!     submit: Wired<Button>,
//! }
//!
//! let form: LoginForm = session.resolve_composite();
//! form.username.set_value("ada")?;
//! ```
//!
//! Without the macro, build a schema by hand and read fields through
//! [`ResolvedComposite::field`].

use std::cell::OnceCell;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::component::Component;
use crate::locator::{CompositeLocator, LocatorStep};
use crate::result::{PagewireError, PagewireResult};
use crate::session::Session;

/// One declared field of a composite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    name: String,
    kind: &'static str,
    path: Vec<String>,
}

impl FieldDecl {
    /// Field located by its own name
    #[must_use]
    pub fn new(name: impl Into<String>, kind: &'static str) -> Self {
        Self {
            name: name.into(),
            kind,
            path: Vec::new(),
        }
    }

    /// Locate by a single stable id instead of the field name
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.path = vec![id.into()];
        self
    }

    /// Locate by a path of stable ids
    #[must_use]
    pub fn with_path<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = segments.into_iter().map(Into::into).collect();
        self
    }

    /// Declared field name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Component kind the field holds
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Stable-id segments; the field name when no override is set
    #[must_use]
    pub fn segments(&self) -> Vec<&str> {
        if self.path.is_empty() {
            vec![self.name.as_str()]
        } else {
            self.path.iter().map(String::as_str).collect()
        }
    }

    /// Locator of the field, under `scope` when given
    #[must_use]
    pub fn locator(&self, scope: Option<&CompositeLocator>) -> CompositeLocator {
        let mut segments = self.segments().into_iter();
        let first = segments.next().unwrap_or(self.name.as_str());
        let own = segments.fold(CompositeLocator::stable_id(first), |locator, segment| {
            locator.then(LocatorStep::stable_id(segment))
        });
        match scope {
            Some(scope) => scope.join(&own),
            None => own,
        }
    }
}

/// Field list of a composite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositeSchema {
    name: String,
    fields: Vec<FieldDecl>,
}

impl CompositeSchema {
    /// Empty schema
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field; a field with the same name is replaced
    #[must_use]
    pub fn field(mut self, decl: FieldDecl) -> Self {
        self.fields.retain(|f| f.name != decl.name);
        self.fields.push(decl);
        self
    }

    /// Composite name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields in declaration order
    #[must_use]
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    /// Field names in declaration order
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(FieldDecl::name).collect()
    }
}

/// A struct of component fields that can be wired from a session
pub trait Composite: Sized {
    /// Declared fields
    fn schema() -> CompositeSchema;

    /// Build the struct; must not touch the driver
    fn wire(context: WireContext) -> Self;
}

/// Everything a composite needs to wire its fields
#[derive(Debug, Clone)]
pub struct WireContext {
    session: Session,
    scope: Option<CompositeLocator>,
    schema: Arc<CompositeSchema>,
}

impl WireContext {
    /// Context for `schema`, optionally scoped under a locator
    #[must_use]
    pub fn new(session: Session, scope: Option<CompositeLocator>, schema: CompositeSchema) -> Self {
        Self {
            session,
            scope,
            schema: Arc::new(schema),
        }
    }

    /// Owning session
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Locator every field is scoped under
    #[must_use]
    pub fn scope(&self) -> Option<&CompositeLocator> {
        self.scope.as_ref()
    }

    /// Schema being wired
    #[must_use]
    pub fn schema(&self) -> &CompositeSchema {
        &self.schema
    }

    /// Declaration of `name`; an undeclared name locates by itself
    #[must_use]
    pub fn decl(&self, name: &str, kind: &'static str) -> FieldDecl {
        self.schema
            .get(name)
            .cloned()
            .unwrap_or_else(|| FieldDecl::new(name, kind))
    }

    /// Build the slot for field `name`
    #[must_use]
    pub fn slot<S: WireSlot>(&self, name: &str) -> S {
        S::from_context(self, &self.decl(name, S::KIND))
    }
}

/// A composite field type
pub trait WireSlot {
    /// Kind recorded in the schema
    const KIND: &'static str;

    /// Build the slot for `decl`
    fn from_context(context: &WireContext, decl: &FieldDecl) -> Self;
}

/// Lazily bound component field
#[derive(Debug, Clone)]
pub struct Wired<T> {
    session: Session,
    locator: CompositeLocator,
    handle: OnceCell<T>,
}

impl<T: Component> Wired<T> {
    /// Field at `locator`; nothing is bound yet
    #[must_use]
    pub fn new(session: Session, locator: CompositeLocator) -> Self {
        Self {
            session,
            locator,
            handle: OnceCell::new(),
        }
    }

    /// The component, bound on first call
    pub fn get(&self) -> &T {
        self.handle.get_or_init(|| {
            tracing::trace!(kind = T::KIND, locator = %self.locator, "binding field");
            self.session.bind(self.locator.clone())
        })
    }

    /// Locator the field binds to
    #[must_use]
    pub const fn locator(&self) -> &CompositeLocator {
        &self.locator
    }

    /// Whether `get` has run
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.handle.get().is_some()
    }
}

impl<T: Component> Deref for Wired<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T: Component> WireSlot for Wired<T> {
    const KIND: &'static str = T::KIND;

    fn from_context(context: &WireContext, decl: &FieldDecl) -> Self {
        Self::new(context.session().clone(), decl.locator(context.scope()))
    }
}

/// Composite field holding another composite, wired on first access
pub struct Nested<C> {
    context: WireContext,
    inner: OnceCell<C>,
}

impl<C: Composite> Nested<C> {
    /// Nested composite scoped under `scope`
    #[must_use]
    pub fn new(session: Session, scope: CompositeLocator) -> Self {
        Self {
            context: WireContext::new(session, Some(scope), C::schema()),
            inner: OnceCell::new(),
        }
    }

    /// The composite, wired on first call
    pub fn get(&self) -> &C {
        self.inner.get_or_init(|| C::wire(self.context.clone()))
    }

    /// Locator the nested fields are scoped under
    #[must_use]
    pub fn scope(&self) -> Option<&CompositeLocator> {
        self.context.scope()
    }
}

impl<C> fmt::Debug for Nested<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Nested")
            .field("schema", &self.context.schema().name())
            .field("scope", &self.context.scope())
            .field("wired", &self.inner.get().is_some())
            .finish()
    }
}

impl<C: Composite> Deref for Nested<C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.get()
    }
}

impl<C: Composite> WireSlot for Nested<C> {
    const KIND: &'static str = "Composite";

    fn from_context(context: &WireContext, decl: &FieldDecl) -> Self {
        Self::new(context.session().clone(), decl.locator(context.scope()))
    }
}

/// Hand-built composite whose fields resolve on demand
#[derive(Debug, Clone)]
pub struct ResolvedComposite {
    context: WireContext,
}

impl ResolvedComposite {
    /// Wrap a wiring context
    #[must_use]
    pub const fn new(context: WireContext) -> Self {
        Self { context }
    }

    /// Schema this composite was built from
    #[must_use]
    pub fn schema(&self) -> &CompositeSchema {
        self.context.schema()
    }

    /// Locator a field would bind to
    ///
    /// # Errors
    /// `InvalidLocator` for an undeclared field.
    pub fn locator(&self, name: &str) -> PagewireResult<CompositeLocator> {
        Ok(self.declared(name)?.locator(self.context.scope()))
    }

    /// Bind field `name` as `T`.
    ///
    /// # Errors
    /// `InvalidLocator` when the field is undeclared or declared with a
    /// different kind.
    pub fn field<T: Component>(&self, name: &str) -> PagewireResult<T> {
        let decl = self.declared(name)?;
        if decl.kind() != T::KIND {
            return Err(PagewireError::invalid_locator(format!(
                "field '{name}' of {} is a {}, not a {}",
                self.schema().name(),
                decl.kind(),
                T::KIND
            )));
        }
        Ok(self.context.session().bind(decl.locator(self.context.scope())))
    }

    fn declared(&self, name: &str) -> PagewireResult<&FieldDecl> {
        self.schema().get(name).ok_or_else(|| {
            PagewireError::invalid_locator(format!(
                "{} declares no field '{name}'",
                self.schema().name()
            ))
        })
    }
}
