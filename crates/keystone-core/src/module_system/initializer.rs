use std::fmt;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::module_system::error::{BoxError, ModuleSystemError, Result};

/// A zero-argument fallible initialization step.
#[async_trait]
pub trait InitAction: Send + Sync {
    /// Run the step
    async fn run(&self) -> std::result::Result<(), BoxError>;
}

#[async_trait]
impl<F, Fut> InitAction for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<(), BoxError>> + Send,
{
    async fn run(&self) -> std::result::Result<(), BoxError> {
        (self)().await
    }
}

/// A named node of an initializer tree.
///
/// Nodes are built during the build phase with [`add_child`](Self::add_child)
/// and [`add_group`](Self::add_group) and executed depth-first by
/// [`execute`](Self::execute). A node without an action is a group: it only
/// exists to give its children a common, indented heading in the log.
pub struct InitializerNode {
    /// Step name, never empty
    name: String,
    /// Optional step action
    action: Option<Box<dyn InitAction>>,
    /// Child steps in registration order
    children: Vec<InitializerNode>,
}

// Manual Debug implementation
impl fmt::Debug for InitializerNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitializerNode")
            .field("name", &self.name)
            .field("has_action", &self.action.is_some())
            .field("children", &self.children)
            .finish()
    }
}

impl InitializerNode {
    /// Create the root node of a tree. Roots carry no action.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: None,
            children: Vec::new(),
        }
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(ModuleSystemError::InvalidArgument {
                reason: "initializer name must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Append a child step with an action and return it for nesting.
    pub fn add_child<A>(&mut self, name: impl Into<String>, action: A) -> Result<&mut InitializerNode>
    where
        A: InitAction + 'static,
    {
        let name = name.into();
        Self::validate_name(&name)?;
        Ok(self.push(InitializerNode {
            name,
            action: Some(Box::new(action)),
            children: Vec::new(),
        }))
    }

    /// Append a child group (a step without an action) and return it for nesting.
    pub fn add_group(&mut self, name: impl Into<String>) -> Result<&mut InitializerNode> {
        let name = name.into();
        Self::validate_name(&name)?;
        Ok(self.push(InitializerNode::root(name)))
    }

    fn push(&mut self, node: InitializerNode) -> &mut InitializerNode {
        self.children.push(node);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub fn children(&self) -> &[InitializerNode] {
        &self.children
    }

    /// Number of nodes in this subtree, including this one.
    pub fn step_count(&self) -> usize {
        1 + self.children.iter().map(InitializerNode::step_count).sum::<usize>()
    }

    /// Execute this node and then its children, depth-first.
    ///
    /// The first failing action aborts the rest of the subtree; the error is
    /// returned to the caller unchanged so that every ancestor aborts too.
    pub fn execute(&self, depth: usize) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            log::info!("{:indent$}{}", "", self.name, indent = depth * 2);

            if let Some(action) = &self.action {
                if let Err(source) = action.run().await {
                    log::error!("{:indent$}{} failed: {}", "", self.name, source, indent = depth * 2);
                    return Err(ModuleSystemError::StepFailed {
                        step: self.name.clone(),
                        source,
                    });
                }
            }

            for child in &self.children {
                child.execute(depth + 1).await?;
            }
            Ok(())
        })
    }
}
