use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::module_system::error::{ModuleSystemError, Result};
use crate::module_system::module::{InitPlan, Module};

/// Validates the module graph and initializes modules in dependency order.
///
/// Validation (missing dependencies, cycles, unknown tags) always completes
/// for the whole graph before the first initialization step runs, so a bad
/// edge anywhere is reported without side effects. Execution is strictly
/// sequential on the calling task.
pub struct DependencyResolver {
    /// Modules in registration order
    modules: Vec<Module>,
    /// Module name -> position in `modules`
    index: HashMap<String, usize>,
    /// Set once `init` has passed validation
    initialized: bool,
    /// Names in the order their main trees completed
    init_order: Vec<String>,
}

impl fmt::Debug for DependencyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyResolver")
            .field("modules", &self.module_names())
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl DependencyResolver {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            index: HashMap::new(),
            initialized: false,
            init_order: Vec::new(),
        }
    }

    /// Register a module without initializing it.
    ///
    /// Dependencies are not checked here; `init` validates the whole graph.
    pub fn insert(&mut self, module: Module) -> Result<()> {
        self.check_insertable(&module)?;
        let name = module.name().to_string();
        log::debug!("Registered module '{}' (depends on: {:?})", name, module.dependencies());
        self.index.insert(name, self.modules.len());
        self.modules.push(module);
        Ok(())
    }

    /// Register a module. After `init` has run, the module is initialized
    /// right away together with any uninitialized dependencies.
    ///
    /// A late module whose dependency closure is incomplete or cyclic is
    /// rejected without being registered. If one of its steps fails, the
    /// module stays registered but is not marked initialized.
    pub async fn add(&mut self, module: Module) -> Result<()> {
        if !self.initialized {
            return self.insert(module);
        }

        self.check_insertable(&module)?;
        self.check_closure(module.name(), module.dependencies())?;
        let name = module.name().to_string();
        self.insert(module)?;
        self.initialize_module(&name).await
    }

    /// Initialize one registered module and its dependencies (main trees only).
    pub async fn initialize_module(&mut self, name: &str) -> Result<()> {
        let idx = self.position(name)?;
        self.check_closure(name, self.modules[idx].dependencies())?;

        let mut tagged_done = HashSet::new();
        self.initialize_recursive(name, "", &mut tagged_done).await
    }

    fn check_insertable(&self, module: &Module) -> Result<()> {
        if module.name().is_empty() {
            return Err(ModuleSystemError::InvalidArgument {
                reason: "module name must not be empty".to_string(),
            });
        }
        if self.index.contains_key(module.name()) {
            return Err(ModuleSystemError::DuplicateModule {
                name: module.name().to_string(),
            });
        }
        Ok(())
    }

    /// Check everything reachable from `dependencies` of module `name`: each
    /// name must be registered and no module on the way may sit on a cycle.
    ///
    /// `name` itself does not need to be registered yet.
    fn check_closure(&self, name: &str, dependencies: &[String]) -> Result<()> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<(&str, &str)> = dependencies.iter().map(|d| (name, d.as_str())).collect();

        while let Some((owner, current)) = stack.pop() {
            if current == name {
                return Err(ModuleSystemError::CircularDependency { module: name.to_string() });
            }
            let Some(&idx) = self.index.get(current) else {
                log::error!("Module '{}' depends on unknown module '{}'", owner, current);
                return Err(ModuleSystemError::MissingDependency {
                    module: owner.to_string(),
                    dependency: current.to_string(),
                });
            };
            if !visited.insert(current) {
                continue;
            }
            if self.is_dep(current, current) {
                return Err(ModuleSystemError::CircularDependency {
                    module: current.to_string(),
                });
            }
            stack.extend(self.modules[idx].dependencies().iter().map(|d| (current, d.as_str())));
        }
        Ok(())
    }

    /// Validate the graph and initialize every module, at most once.
    ///
    /// With an empty `tag` every module runs its main tree after its
    /// dependencies. With a non-empty tag, modules declaring that tag run only
    /// their tagged tree and their dependencies are not walked; modules
    /// without the tag follow the main path.
    ///
    /// The first failure aborts the run. Modules completed before the failure
    /// remain initialized.
    pub async fn init(&mut self, tag: &str) -> Result<()> {
        if self.initialized {
            return Err(ModuleSystemError::AlreadyInitialized);
        }

        self.check_dependencies()?;
        self.check_cycles()?;
        self.check_tag(tag)?;

        self.initialized = true;
        if tag.is_empty() {
            log::info!("Initializing {} modules", self.modules.len());
        } else {
            log::info!("Initializing {} modules for tag '{}'", self.modules.len(), tag);
        }

        let names: Vec<String> = self.modules.iter().map(|m| m.name().to_string()).collect();
        let mut tagged_done = HashSet::new();
        for name in names {
            self.initialize_recursive(&name, tag, &mut tagged_done).await?;
        }

        log::info!("Module initialization complete");
        Ok(())
    }

    fn initialize_recursive<'a>(
        &'a mut self,
        name: &'a str,
        tag: &'a str,
        tagged_done: &'a mut HashSet<String>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let idx = self.position(name)?;

            match self.modules[idx].init_plan(tag) {
                InitPlan::Tagged(tree) => {
                    if tagged_done.insert(name.to_string()) {
                        tree.execute(0).await?;
                    }
                    return Ok(());
                }
                InitPlan::Main => {}
            }

            if self.modules[idx].is_initialized() {
                return Ok(());
            }

            let dependencies = self.modules[idx].dependencies().to_vec();
            for dependency in &dependencies {
                self.initialize_recursive(dependency, tag, tagged_done).await?;
            }

            self.modules[idx].main_tree().execute(0).await?;
            self.modules[idx].mark_initialized();
            self.init_order.push(name.to_string());
            Ok(())
        })
    }

    fn check_dependencies(&self) -> Result<()> {
        for module in &self.modules {
            for dependency in module.dependencies() {
                if !self.index.contains_key(dependency) {
                    log::error!("Module '{}' depends on unknown module '{}'", module.name(), dependency);
                    return Err(ModuleSystemError::MissingDependency {
                        module: module.name().to_string(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_cycles(&self) -> Result<()> {
        for module in &self.modules {
            if self.is_dep(module.name(), module.name()) {
                log::error!("Module '{}' depends on itself", module.name());
                return Err(ModuleSystemError::CircularDependency {
                    module: module.name().to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_tag(&self, tag: &str) -> Result<()> {
        if tag.is_empty() || self.modules.iter().any(|m| m.has_tag(tag)) {
            return Ok(());
        }
        Err(ModuleSystemError::UnknownTag { tag: tag.to_string() })
    }

    /// Whether `to` is reachable from `from` through at least one dependency edge.
    ///
    /// `is_dep(a, a)` is true exactly when `a` sits on a cycle. Unknown names
    /// have no outgoing edges.
    pub fn is_dep(&self, from: &str, to: &str) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = self.dependencies_of(from);

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if visited.insert(current) {
                stack.extend(self.dependencies_of(current));
            }
        }
        false
    }

    fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.index
            .get(name)
            .map(|&idx| self.modules[idx].dependencies().iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ModuleSystemError::ModuleNotFound { name: name.to_string() })
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.index.get(name).map(|&idx| &self.modules[idx])
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Module names in registration order
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(Module::name).collect()
    }

    pub fn is_module_initialized(&self, name: &str) -> bool {
        self.module(name).is_some_and(Module::is_initialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Names of modules whose main tree completed, in completion order
    pub fn initialization_order(&self) -> &[String] {
        &self.init_order
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}
