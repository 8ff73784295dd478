//! Scope types identifying one independent counter.

use std::fmt;

use crate::{Period, ScopeError};

/// Maximum length of a tenant code.
pub const MAX_TENANT_CODE_LEN: usize = 10;

/// Maximum length of a document type code.
pub const MAX_DOCUMENT_TYPE_LEN: usize = 10;

/// Maximum length of a sub-scope (e.g. warehouse number).
pub const MAX_SUB_SCOPE_LEN: usize = 5;

/// The caller-supplied dimensions of a counter scope: tenant, document type,
/// and an optional sub-scope.
///
/// Document types are free-form codes (`"FV"`, `"WZ"`, `"PZ"`, ...) — they do
/// not have to be pre-registered anywhere. An absent sub-scope is a distinct,
/// stable scope value of its own: it is not equivalent to an empty string or
/// to any concrete sub-scope, which is why `Some("")` is rejected outright.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentScope {
    tenant_code: String,
    document_type: String,
    sub_scope: Option<String>,
}

impl DocumentScope {
    /// Validates and builds a scope.
    ///
    /// Tenant existence is deliberately not checked here; that is the
    /// caller's concern. Only shape is enforced: non-empty, within length
    /// caps, and free of the `/` separator.
    pub fn new(
        tenant_code: &str,
        document_type: &str,
        sub_scope: Option<&str>,
    ) -> Result<Self, ScopeError> {
        if tenant_code.is_empty() {
            return Err(ScopeError::EmptyTenantCode);
        }
        check_field("tenant code", tenant_code, MAX_TENANT_CODE_LEN)?;

        if document_type.is_empty() {
            return Err(ScopeError::EmptyDocumentType);
        }
        check_field("document type", document_type, MAX_DOCUMENT_TYPE_LEN)?;

        if let Some(sub) = sub_scope {
            if sub.is_empty() {
                return Err(ScopeError::EmptySubScope);
            }
            check_field("sub-scope", sub, MAX_SUB_SCOPE_LEN)?;
        }

        Ok(Self {
            tenant_code: tenant_code.to_string(),
            document_type: document_type.to_string(),
            sub_scope: sub_scope.map(str::to_string),
        })
    }

    /// The owning tenant's short code.
    pub fn tenant_code(&self) -> &str {
        &self.tenant_code
    }

    /// The document type code.
    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    /// The optional sub-scope (e.g. warehouse number).
    pub fn sub_scope(&self) -> Option<&str> {
        self.sub_scope.as_deref()
    }
}

fn check_field(field: &'static str, value: &str, max: usize) -> Result<(), ScopeError> {
    let len = value.chars().count();
    if len > max {
        return Err(ScopeError::FieldTooLong { field, len, max });
    }
    if value.contains('/') {
        return Err(ScopeError::ContainsSeparator { field });
    }
    Ok(())
}

/// The full 5-tuple identifying one counter row: scope dimensions plus the
/// calendar period.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeKey {
    scope: DocumentScope,
    period: Period,
}

impl ScopeKey {
    /// Combines validated scope dimensions with a period.
    pub fn new(scope: DocumentScope, period: Period) -> Self {
        Self { scope, period }
    }

    pub fn scope(&self) -> &DocumentScope {
        &self.scope
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn tenant_code(&self) -> &str {
        self.scope.tenant_code()
    }

    pub fn document_type(&self) -> &str {
        self.scope.document_type()
    }

    pub fn sub_scope(&self) -> Option<&str> {
        self.scope.sub_scope()
    }
}

impl fmt::Display for ScopeKey {
    /// Renders the scope prefix of a document number:
    /// `tenant/type[/sub]/yyyy/mm`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope.tenant_code, self.scope.document_type)?;
        if let Some(sub) = &self.scope.sub_scope {
            write!(f, "/{sub}")?;
        }
        write!(f, "/{}/{:02}", self.period.year(), self.period.month())
    }
}
