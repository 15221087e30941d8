// File: src/registry.rs
// Purpose: Controller and object registries the dispatcher resolves handlers through

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use quill_router::{RouteResult, Router};

use crate::controller::Controller;
use crate::descriptor::{HandlerDescriptor, Scaffolder};
use crate::naming::uncapitalize;

/// Suffix scaffolders are registered under, after the controller's full name
pub const SCAFFOLDER_SUFFIX: &str = "Scaffolder";

/// Resolves controller descriptors by request URI or by name
pub trait ControllerRegistry: Send + Sync {
    fn resolve_by_uri(&self, uri: &str) -> Option<Arc<dyn HandlerDescriptor>>;

    fn resolve_by_name(&self, name: &str) -> Option<Arc<dyn HandlerDescriptor>>;
}

/// Produces controller instances and scaffolding delegates by full name
pub trait ObjectRegistry: Send + Sync {
    /// A controller instance for this request
    fn instance(&self, full_name: &str) -> Option<Box<dyn Controller>>;

    fn scaffolder(&self, full_name: &str) -> Option<Arc<dyn Scaffolder>>;
}

/// Controller registry backed by a [`Router`] over every descriptor's URL patterns
#[derive(Debug, Clone, Default)]
pub struct ControllerTable {
    router: Router<Arc<dyn HandlerDescriptor>>,
    by_name: HashMap<String, Arc<dyn HandlerDescriptor>>,
}

impl ControllerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.router = self.router.with_case_insensitive(case_insensitive);
        self
    }

    /// Registers a descriptor (functional builder)
    pub fn with_controller<D>(mut self, descriptor: D) -> RouteResult<Self>
    where
        D: HandlerDescriptor + 'static,
    {
        self.register(Arc::new(descriptor))?;
        Ok(self)
    }

    /// Maps every URL pattern of `descriptor` to it
    ///
    /// # Errors
    ///
    /// [`quill_router::RouteError::InvalidPattern`] when a declared pattern does not
    /// compile. Patterns registered before the failing one stay registered.
    pub fn register(&mut self, descriptor: Arc<dyn HandlerDescriptor>) -> RouteResult<()> {
        for pattern in descriptor.url_patterns() {
            self.router.add_mapping(&pattern, Arc::clone(&descriptor))?;
        }
        self.by_name.insert(descriptor.logical_name(), descriptor);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl ControllerRegistry for ControllerTable {
    fn resolve_by_uri(&self, uri: &str) -> Option<Arc<dyn HandlerDescriptor>> {
        self.router.lookup(uri).cloned()
    }

    fn resolve_by_name(&self, name: &str) -> Option<Arc<dyn HandlerDescriptor>> {
        self.by_name.get(&uncapitalize(name)).cloned()
    }
}

pub type ControllerFactory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

/// Object registry creating a fresh controller per request from registered factories
#[derive(Clone, Default)]
pub struct InstanceRegistry {
    factories: HashMap<String, ControllerFactory>,
    scaffolders: HashMap<String, Arc<dyn Scaffolder>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_factory<F>(mut self, full_name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Controller> + Send + Sync + 'static,
    {
        self.factories.insert(full_name.into(), Arc::new(factory));
        self
    }

    /// Registers a prototype that is cloned for every request
    pub fn with_controller<C>(self, full_name: impl Into<String>, prototype: C) -> Self
    where
        C: Controller + Clone + Sync + 'static,
    {
        self.with_factory(full_name, move || Box::new(prototype.clone()))
    }

    /// Registers the scaffolder of the controller named `full_name`
    pub fn with_scaffolder<S>(mut self, full_name: &str, scaffolder: S) -> Self
    where
        S: Scaffolder + 'static,
    {
        self.scaffolders.insert(
            format!("{}{}", full_name, SCAFFOLDER_SUFFIX),
            Arc::new(scaffolder),
        );
        self
    }
}

impl ObjectRegistry for InstanceRegistry {
    fn instance(&self, full_name: &str) -> Option<Box<dyn Controller>> {
        self.factories.get(full_name).map(|factory| factory())
    }

    fn scaffolder(&self, full_name: &str) -> Option<Arc<dyn Scaffolder>> {
        self.scaffolders
            .get(&format!("{}{}", full_name, SCAFFOLDER_SUFFIX))
            .cloned()
    }
}

impl fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut controllers: Vec<&String> = self.factories.keys().collect();
        controllers.sort_unstable();
        let mut scaffolders: Vec<&String> = self.scaffolders.keys().collect();
        scaffolders.sort_unstable();
        f.debug_struct("InstanceRegistry")
            .field("controllers", &controllers)
            .field("scaffolders", &scaffolders)
            .finish()
    }
}
