//! Static RPC metadata: which methods mutate and what they are scoped to.

use std::collections::HashMap;

use crate::gitaly::{commit_service_server, operation_service_server, ref_service_server};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Accessor,
    Mutator,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accessor => "accessor",
            Self::Mutator => "mutator",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Repository,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcEntry {
    pub full_method: String,
    pub service: &'static str,
    pub method: &'static str,
    pub operation: Operation,
    pub scope: Scope,
}

const BUILTIN_ENTRIES: &[(&str, &str, Operation)] = &[
    (operation_service_server::SERVICE_NAME, "UserCreateBranch", Operation::Mutator),
    (operation_service_server::SERVICE_NAME, "UserUpdateBranch", Operation::Mutator),
    (operation_service_server::SERVICE_NAME, "UserDeleteBranch", Operation::Mutator),
    (operation_service_server::SERVICE_NAME, "UserCreateTag", Operation::Mutator),
    (operation_service_server::SERVICE_NAME, "UserDeleteTag", Operation::Mutator),
    (ref_service_server::SERVICE_NAME, "FindBranch", Operation::Accessor),
    (ref_service_server::SERVICE_NAME, "FindAllBranchNames", Operation::Accessor),
    (ref_service_server::SERVICE_NAME, "RefExists", Operation::Accessor),
    (commit_service_server::SERVICE_NAME, "FindCommit", Operation::Accessor),
];

#[derive(Debug, Default)]
pub struct RpcRegistry {
    entries: HashMap<String, RpcEntry>,
}

impl RpcRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every RPC this crate defines. All of them are repository scoped.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for &(service, method, operation) in BUILTIN_ENTRIES {
            registry.register(RpcEntry {
                full_method: full_method(service, method),
                service,
                method,
                operation,
                scope: Scope::Repository,
            });
        }

        registry
    }

    pub fn register(&mut self, entry: RpcEntry) -> Option<RpcEntry> {
        self.entries.insert(entry.full_method.clone(), entry)
    }

    #[must_use]
    pub fn lookup(&self, full_method: &str) -> Option<&RpcEntry> {
        self.entries.get(full_method)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `/gitaly.OperationService/UserCreateBranch`
pub fn full_method(service: &str, method: &str) -> String {
    format!("/{service}/{method}")
}
