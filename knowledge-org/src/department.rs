//! Department domain model
//!
//! This module provides the core Department entity. Departments are
//! company-scoped organizational units arranged in a forest: roots have no
//! parent, and every child's parent belongs to the same company.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An organizational unit within a company.
///
/// Departments form a tree per company via `parent_id`. The structural
/// invariants (same-company parent, acyclicity) are enforced by
/// [`crate::DepartmentDirectory`], which owns every department; this type is
/// plain data.
///
/// `id` and `company_id` are immutable after creation: a department never
/// changes identity and never migrates tenants. The directory exposes no
/// operation that rewrites either field.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use knowledge_org::Department;
///
/// let company_id = Uuid::now_v7();
/// let owner_id = Uuid::now_v7();
/// let dept = Department::new(company_id, owner_id, None, "Engineering", "Builds the product");
/// assert_eq!(dept.name, "Engineering");
/// assert!(dept.parent_id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Unique identifier for the department
    pub id: Uuid,

    /// Company (tenant) this department belongs to
    pub company_id: Uuid,

    /// User ID of the responsible employee
    pub owner_id: Uuid,

    /// Human-readable name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Parent department, absent for roots
    pub parent_id: Option<Uuid>,

    /// When the department was created
    pub created_at: DateTime<Utc>,

    /// When the department was last updated
    pub updated_at: DateTime<Utc>,
}

impl Department {
    /// Creates a new department.
    ///
    /// The department is created with:
    /// - A newly generated UUID v7 ID
    /// - Current timestamp for created_at and updated_at
    ///
    /// The `parent_id` is taken at face value here; use
    /// [`crate::DepartmentDirectory::create`] to have the parent reference
    /// validated against the hierarchy.
    ///
    /// # Arguments
    ///
    /// * `company_id` - The company this department belongs to
    /// * `owner_id` - The responsible employee
    /// * `parent_id` - Optional parent department
    /// * `name` - The department name
    /// * `description` - Free-form description
    ///
    /// # Examples
    ///
    /// ```
    /// use uuid::Uuid;
    /// use knowledge_org::Department;
    ///
    /// let dept = Department::new(Uuid::now_v7(), Uuid::now_v7(), None, "Sales", "");
    /// assert_eq!(dept.created_at, dept.updated_at);
    /// ```
    pub fn new(
        company_id: Uuid,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            company_id,
            owner_id,
            name: name.into(),
            description: description.into(),
            parent_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this department is a root (has no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
