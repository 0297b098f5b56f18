use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::module_system::error::Result;
use crate::module_system::initializer::{InitAction, InitializerNode};
use crate::service::Service;

/// Which initializer tree a module runs during one `init` pass.
#[derive(Debug, Clone, Copy)]
pub enum InitPlan<'a> {
    /// Dependencies first, then the main tree; marks the module initialized
    Main,
    /// Only the tree registered for the requested tag, dependencies bypassed
    Tagged(&'a InitializerNode),
}

/// A named unit of server functionality.
///
/// Modules are assembled during the build phase and then handed to a
/// [`DependencyResolver`](crate::module_system::DependencyResolver), which
/// owns them from then on.
pub struct Module {
    name: String,
    description: String,
    dependencies: Vec<String>,
    /// Main initializer tree, rooted at the module name
    main: InitializerNode,
    /// Alternate trees for install/upgrade style actions
    tags: HashMap<String, InitializerNode>,
    initialized: bool,
    /// Services declared by this module, moved to the supervisor on registration
    services: Vec<(String, Arc<dyn Service>)>,
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<&String> = self.tags.keys().collect();
        let services: Vec<&String> = self.services.iter().map(|(title, _)| title).collect();
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("tags", &tags)
            .field("services", &services)
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl Module {
    /// Create a new module with no dependencies and empty initializer trees
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            main: InitializerNode::root(name.clone()),
            name,
            description: description.into(),
            dependencies: Vec::new(),
            tags: HashMap::new(),
            initialized: false,
            services: Vec::new(),
        }
    }

    /// Declare dependencies by module name. Names are validated by the resolver.
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(dependencies.into_iter().map(Into::into));
        self
    }

    /// Declare a single dependency
    pub fn depends_on(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    /// Add a step to the main initializer tree
    pub fn add_init<A>(&mut self, name: impl Into<String>, action: A) -> Result<&mut InitializerNode>
    where
        A: InitAction + 'static,
    {
        self.main.add_child(name, action)
    }

    /// Add a group (a step without an action) to the main initializer tree
    pub fn add_init_group(&mut self, name: impl Into<String>) -> Result<&mut InitializerNode> {
        self.main.add_group(name)
    }

    /// Root of the initializer tree for `tag`, created on first use.
    pub fn tag(&mut self, tag: impl Into<String>) -> &mut InitializerNode {
        let tag = tag.into();
        let root_name = format!("{}[{}]", self.name, tag);
        self.tags
            .entry(tag)
            .or_insert_with(|| InitializerNode::root(root_name))
    }

    /// Declare a background service started by the supervisor
    pub fn add_service<S>(&mut self, title: impl Into<String>, service: S) -> &mut Self
    where
        S: Service + 'static,
    {
        self.services.push((title.into(), Arc::new(service)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    pub fn tags(&self) -> Vec<&str> {
        self.tags.keys().map(String::as_str).collect()
    }

    pub fn main_tree(&self) -> &InitializerNode {
        &self.main
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn service_titles(&self) -> Vec<&str> {
        self.services.iter().map(|(title, _)| title.as_str()).collect()
    }

    /// Select the tree to run for `tag`. An empty tag always selects the main tree.
    pub fn init_plan(&self, tag: &str) -> InitPlan<'_> {
        if tag.is_empty() {
            return InitPlan::Main;
        }
        match self.tags.get(tag) {
            Some(tree) => InitPlan::Tagged(tree),
            None => InitPlan::Main,
        }
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    pub(crate) fn take_services(&mut self) -> Vec<(String, Arc<dyn Service>)> {
        std::mem::take(&mut self.services)
    }
}
