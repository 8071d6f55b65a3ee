//! Variable descriptor.

use std::fmt;
use std::sync::Arc;

use crate::domain::listener::VariableListener;
use crate::domain::variable::{ShadowValue, VariableId, VariableType};

/// Builds a fresh listener instance for every score director.
pub type ListenerFactory<S> = Arc<dyn Fn() -> Box<dyn VariableListener<S>> + Send + Sync>;

/// Describes a planning variable at runtime.
///
/// Accessors are plain function pointers taking the solution and the entity
/// position, so a descriptor never borrows or owns entities.
pub struct VariableDescriptor<S> {
    /// Name of the variable (field name).
    pub name: &'static str,
    kind: VariableKind<S>,
}

enum VariableKind<S> {
    Basic {
        is_assigned: fn(&S, usize) -> bool,
        allows_unassigned: bool,
    },
    List {
        list_len: fn(&S, usize) -> usize,
        element_count: fn(&S) -> usize,
        allows_unassigned_values: bool,
    },
    Shadow(ShadowVariableDescriptor<S>),
}

/// Shadow-specific part of a variable descriptor.
pub struct ShadowVariableDescriptor<S> {
    value: fn(&S, usize) -> Box<dyn ShadowValue>,
    declared_sources: Vec<(&'static str, &'static str)>,
    sources: Vec<VariableId>,
    listener: Option<ListenerFactory<S>>,
    global_order: usize,
}

impl<S> ShadowVariableDescriptor<S> {
    /// Snapshot of the shadow value of the entity at `index`.
    pub fn value(&self, solution: &S, index: usize) -> Box<dyn ShadowValue> {
        (self.value)(solution, index)
    }

    /// Source variables, resolved when the solution descriptor is built.
    pub fn sources(&self) -> &[VariableId] {
        &self.sources
    }

    /// Factory of the listener maintaining this variable.
    ///
    /// `None` when another shadow variable's listener updates this one too.
    pub fn listener_factory(&self) -> Option<&ListenerFactory<S>> {
        self.listener.as_ref()
    }

    /// Position of this variable in the dependency-respecting global order.
    pub fn global_order(&self) -> usize {
        self.global_order
    }

    pub(crate) fn declared_sources(&self) -> &[(&'static str, &'static str)] {
        &self.declared_sources
    }

    pub(crate) fn set_sources(&mut self, sources: Vec<VariableId>) {
        self.sources = sources;
    }

    pub(crate) fn set_global_order(&mut self, global_order: usize) {
        self.global_order = global_order;
    }
}

impl<S> VariableDescriptor<S> {
    /// Creates a genuine variable holding at most one value.
    pub fn basic(name: &'static str, is_assigned: fn(&S, usize) -> bool) -> Self {
        VariableDescriptor {
            name,
            kind: VariableKind::Basic {
                is_assigned,
                allows_unassigned: false,
            },
        }
    }

    /// Creates a genuine list variable.
    ///
    /// `element_count` returns the number of values that must end up in some
    /// entity's list for the solution to be initialized.
    pub fn list(
        name: &'static str,
        list_len: fn(&S, usize) -> usize,
        element_count: fn(&S) -> usize,
    ) -> Self {
        VariableDescriptor {
            name,
            kind: VariableKind::List {
                list_len,
                element_count,
                allows_unassigned_values: false,
            },
        }
    }

    /// Creates a shadow variable whose value is read through `value`.
    pub fn shadow(name: &'static str, value: fn(&S, usize) -> Box<dyn ShadowValue>) -> Self {
        VariableDescriptor {
            name,
            kind: VariableKind::Shadow(ShadowVariableDescriptor {
                value,
                declared_sources: Vec::new(),
                sources: Vec::new(),
                listener: None,
                global_order: 0,
            }),
        }
    }

    /// Sets whether an unassigned value (or an unassigned list element) is a
    /// valid final state. Such slots never count towards the init score.
    ///
    /// Has no effect on shadow variables.
    pub fn with_allows_unassigned(mut self, allows: bool) -> Self {
        match &mut self.kind {
            VariableKind::Basic {
                allows_unassigned, ..
            } => *allows_unassigned = allows,
            VariableKind::List {
                allows_unassigned_values,
                ..
            } => *allows_unassigned_values = allows,
            VariableKind::Shadow(_) => {}
        }
        self
    }

    /// Adds a source variable for a shadow variable, by entity type and name.
    pub fn with_source(mut self, entity: &'static str, variable: &'static str) -> Self {
        if let VariableKind::Shadow(shadow) = &mut self.kind {
            shadow.declared_sources.push((entity, variable));
        }
        self
    }

    /// Sets the listener that maintains a shadow variable.
    pub fn with_listener<F, L>(mut self, factory: F) -> Self
    where
        F: Fn() -> L + Send + Sync + 'static,
        L: VariableListener<S> + 'static,
    {
        if let VariableKind::Shadow(shadow) = &mut self.kind {
            shadow.listener = Some(Arc::new(move || {
                Box::new(factory()) as Box<dyn VariableListener<S>>
            }));
        }
        self
    }

    /// Returns the type of this variable.
    pub fn variable_type(&self) -> VariableType {
        match self.kind {
            VariableKind::Basic { .. } => VariableType::Basic,
            VariableKind::List { .. } => VariableType::List,
            VariableKind::Shadow(_) => VariableType::Shadow,
        }
    }

    /// Returns true for basic and list variables.
    pub fn is_genuine(&self) -> bool {
        self.variable_type().is_genuine()
    }

    /// Returns true for list variables.
    pub fn is_list(&self) -> bool {
        self.variable_type().is_list()
    }

    /// Returns true for shadow variables.
    pub fn is_shadow(&self) -> bool {
        self.variable_type().is_shadow()
    }

    /// Whether unassigned slots of this variable are acceptable.
    pub fn allows_unassigned(&self) -> bool {
        match self.kind {
            VariableKind::Basic {
                allows_unassigned, ..
            } => allows_unassigned,
            VariableKind::List {
                allows_unassigned_values,
                ..
            } => allows_unassigned_values,
            VariableKind::Shadow(_) => true,
        }
    }

    /// Whether the basic variable of the entity at `index` holds a value.
    ///
    /// List and shadow variables are always considered assigned.
    pub fn is_assigned(&self, solution: &S, index: usize) -> bool {
        match self.kind {
            VariableKind::Basic { is_assigned, .. } => is_assigned(solution, index),
            _ => true,
        }
    }

    /// Returns true if the basic variable of the entity at `index` counts as
    /// an uninitialized slot.
    pub fn is_uninitialized(&self, solution: &S, index: usize) -> bool {
        match self.kind {
            VariableKind::Basic {
                is_assigned,
                allows_unassigned,
            } => !allows_unassigned && !is_assigned(solution, index),
            _ => false,
        }
    }

    /// Length of the list of the entity at `index`, `0` for other kinds.
    pub fn list_len(&self, solution: &S, index: usize) -> usize {
        match self.kind {
            VariableKind::List { list_len, .. } => list_len(solution, index),
            _ => 0,
        }
    }

    /// Number of values a list variable must distribute, `0` for other kinds.
    pub fn element_count(&self, solution: &S) -> usize {
        match self.kind {
            VariableKind::List { element_count, .. } => element_count(solution),
            _ => 0,
        }
    }

    /// The shadow part of this descriptor, if it is a shadow variable.
    pub fn as_shadow(&self) -> Option<&ShadowVariableDescriptor<S>> {
        match &self.kind {
            VariableKind::Shadow(shadow) => Some(shadow),
            _ => None,
        }
    }

    pub(crate) fn as_shadow_mut(&mut self) -> Option<&mut ShadowVariableDescriptor<S>> {
        match &mut self.kind {
            VariableKind::Shadow(shadow) => Some(shadow),
            _ => None,
        }
    }
}

impl<S> fmt::Debug for VariableDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("VariableDescriptor");
        debug
            .field("name", &self.name)
            .field("variable_type", &self.variable_type())
            .field("allows_unassigned", &self.allows_unassigned());
        if let Some(shadow) = self.as_shadow() {
            debug
                .field("sources", &shadow.sources)
                .field("global_order", &shadow.global_order)
                .field("has_listener", &shadow.listener.is_some());
        }
        debug.finish()
    }
}
