//! Department directory engine
//!
//! This module provides the thread-safe engine that owns every department
//! and enforces the hierarchy invariants: same-company parents and
//! acyclicity. All structural mutations run under a single write lock, so
//! two concurrent reparents can never each pass an acyclicity check against
//! a stale hierarchy and jointly commit a cycle.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use knowledge_core::stamp::touch_instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::department::Department;
use crate::error::{OrgError, OrgResult};

/// Directory state behind the lock.
#[derive(Default)]
struct Inner {
    /// All departments, across all companies, by ID
    departments: HashMap<Uuid, Department>,
    /// Department IDs in creation order (drives sibling ordering)
    order: Vec<Uuid>,
}

/// In-memory department hierarchy engine.
///
/// This is suitable for single-process applications and testing. A
/// persistence backend only needs to keep departments addressable by ID and
/// replay them in creation order; which engine backs that is out of scope
/// here.
///
/// The directory is cheap to clone: clones share the same underlying state,
/// so one handle can be given to each request handler.
///
/// # Examples
///
/// ```
/// use knowledge_org::DepartmentDirectory;
/// use uuid::Uuid;
///
/// let directory = DepartmentDirectory::new();
/// let company_id = Uuid::now_v7();
/// let root = directory
///     .create(company_id, Uuid::now_v7(), None, "Engineering", "")
///     .unwrap();
/// assert_eq!(directory.get(root.id).unwrap().name, "Engineering");
/// ```
#[derive(Clone, Default)]
pub struct DepartmentDirectory {
    inner: Arc<RwLock<Inner>>,
}

impl std::fmt::Debug for DepartmentDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepartmentDirectory").finish_non_exhaustive()
    }
}

impl DepartmentDirectory {
    /// Create a new, empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the read lock, recovering from poisoning.
    ///
    /// Every mutation leaves the maps consistent before releasing the lock,
    /// so continuing with the inner state after a panicked writer is safe.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Acquire the write lock, recovering from poisoning.
    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a department.
    ///
    /// With `parent_id` absent the department becomes a root of its
    /// company's forest; otherwise the parent must exist and belong to
    /// `company_id`.
    ///
    /// # Errors
    ///
    /// - [`OrgError::NotFound`] if `parent_id` references no department
    /// - [`OrgError::CrossTenant`] if the parent belongs to another company
    pub fn create(
        &self,
        company_id: Uuid,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> OrgResult<Department> {
        let mut inner = self.write();

        if let Some(parent_id) = parent_id {
            let parent = inner
                .departments
                .get(&parent_id)
                .ok_or(OrgError::NotFound(parent_id))?;
            if parent.company_id != company_id {
                return Err(OrgError::CrossTenant {
                    department: parent_id,
                    company: company_id,
                });
            }
        }

        let dept = Department::new(company_id, owner_id, parent_id, name, description);
        inner.order.push(dept.id);
        inner.departments.insert(dept.id, dept.clone());

        info!(department = %dept.id, company = %company_id, "department created");
        Ok(dept)
    }

    /// Get a department by ID.
    pub fn get(&self, department_id: Uuid) -> OrgResult<Department> {
        self.read()
            .departments
            .get(&department_id)
            .cloned()
            .ok_or(OrgError::NotFound(department_id))
    }

    /// Move a department under a new parent (or make it a root).
    ///
    /// The acyclicity check walks from the proposed parent toward its root,
    /// bounded by the company's department count; hitting the department
    /// being moved, or exceeding the bound (a corrupted stored graph), is
    /// [`OrgError::CycleDetected`]. Check and commit happen under one write
    /// lock, which serializes concurrent reparents of the same hierarchy.
    ///
    /// # Errors
    ///
    /// - [`OrgError::NotFound`] if either endpoint is missing
    /// - [`OrgError::CrossTenant`] if the new parent is in another company
    /// - [`OrgError::CycleDetected`] if the new parent is the department
    ///   itself or one of its transitive descendants
    pub fn reparent(&self, department_id: Uuid, new_parent_id: Option<Uuid>) -> OrgResult<()> {
        let mut inner = self.write();

        let company_id = inner
            .departments
            .get(&department_id)
            .ok_or(OrgError::NotFound(department_id))?
            .company_id;

        if let Some(parent_id) = new_parent_id {
            let parent = inner
                .departments
                .get(&parent_id)
                .ok_or(OrgError::NotFound(parent_id))?;
            if parent.company_id != company_id {
                return Err(OrgError::CrossTenant {
                    department: parent_id,
                    company: company_id,
                });
            }

            let bound = inner
                .departments
                .values()
                .filter(|d| d.company_id == company_id)
                .count();
            let mut cursor = Some(parent_id);
            let mut steps = 0;
            while let Some(current) = cursor {
                if current == department_id {
                    return Err(OrgError::CycleDetected(department_id));
                }
                steps += 1;
                if steps > bound {
                    // Ancestor chain longer than the company itself: the
                    // stored graph already contains a cycle.
                    return Err(OrgError::CycleDetected(department_id));
                }
                cursor = inner
                    .departments
                    .get(&current)
                    .and_then(|d| d.parent_id);
            }
        }

        // Invariants hold; commit while still holding the write lock.
        if let Some(dept) = inner.departments.get_mut(&department_id) {
            dept.parent_id = new_parent_id;
            dept.updated_at = touch_instant(dept.updated_at);
        }

        debug!(department = %department_id, parent = ?new_parent_id, "department reparented");
        Ok(())
    }

    /// Rename a department.
    pub fn rename(&self, department_id: Uuid, name: impl Into<String>) -> OrgResult<Department> {
        let mut inner = self.write();
        let dept = inner
            .departments
            .get_mut(&department_id)
            .ok_or(OrgError::NotFound(department_id))?;
        dept.name = name.into();
        dept.updated_at = touch_instant(dept.updated_at);
        Ok(dept.clone())
    }

    /// Replace a department's description.
    pub fn redescribe(
        &self,
        department_id: Uuid,
        description: impl Into<String>,
    ) -> OrgResult<Department> {
        let mut inner = self.write();
        let dept = inner
            .departments
            .get_mut(&department_id)
            .ok_or(OrgError::NotFound(department_id))?;
        dept.description = description.into();
        dept.updated_at = touch_instant(dept.updated_at);
        Ok(dept.clone())
    }

    /// Delete a department.
    ///
    /// Without `cascade` the department must be a leaf. With `cascade` the
    /// whole subtree is removed depth-first, children before parent.
    ///
    /// # Errors
    ///
    /// - [`OrgError::NotFound`] if the department is missing
    /// - [`OrgError::HasChildren`] if `cascade` is false and children exist
    pub fn delete(&self, department_id: Uuid, cascade: bool) -> OrgResult<()> {
        let mut inner = self.write();

        if !inner.departments.contains_key(&department_id) {
            return Err(OrgError::NotFound(department_id));
        }
        if !cascade
            && inner
                .departments
                .values()
                .any(|d| d.parent_id == Some(department_id))
        {
            return Err(OrgError::HasChildren(department_id));
        }

        let doomed = collect_subtree(&inner, department_id)?;
        for dept_id in doomed.iter().rev() {
            inner.departments.remove(dept_id);
        }
        inner.order.retain(|id| !doomed.contains(id));

        info!(department = %department_id, count = doomed.len(), "department deleted");
        Ok(())
    }

    /// List a department's subtree.
    ///
    /// Depth-first pre-order starting at `department_id`, children in
    /// creation order. The traversal is bounded by the total department
    /// count; exceeding it means the stored graph contains a cycle and is
    /// reported as [`OrgError::CycleDetected`] rather than looping forever.
    pub fn subtree(&self, department_id: Uuid) -> OrgResult<Vec<Department>> {
        let inner = self.read();
        if !inner.departments.contains_key(&department_id) {
            return Err(OrgError::NotFound(department_id));
        }
        let ids = collect_subtree(&inner, department_id)?;
        Ok(ids
            .iter()
            .filter_map(|id| inner.departments.get(id).cloned())
            .collect())
    }

    /// List a company's root departments, in creation order.
    pub fn roots(&self, company_id: Uuid) -> Vec<Department> {
        let inner = self.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.departments.get(id))
            .filter(|d| d.company_id == company_id && d.parent_id.is_none())
            .cloned()
            .collect()
    }

    /// Total number of departments, across all companies.
    pub fn len(&self) -> usize {
        self.read().departments.len()
    }

    /// Check whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.read().departments.is_empty()
    }
}

/// Collect `root` and its descendants, depth-first pre-order, children in
/// creation order. Bounded by the department count so a corrupted (cyclic)
/// graph surfaces as an error instead of an endless walk.
fn collect_subtree(inner: &Inner, root: Uuid) -> OrgResult<Vec<Uuid>> {
    let mut result = Vec::new();
    let mut stack = vec![root];
    while let Some(current) = stack.pop() {
        result.push(current);
        if result.len() > inner.departments.len() {
            return Err(OrgError::CycleDetected(root));
        }
        // Reversed so the stack pops siblings in creation order.
        let children: Vec<Uuid> = inner
            .order
            .iter()
            .copied()
            .filter(|id| {
                inner
                    .departments
                    .get(id)
                    .is_some_and(|d| d.parent_id == Some(current))
            })
            .collect();
        stack.extend(children.into_iter().rev());
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company() -> Uuid {
        Uuid::now_v7()
    }

    fn owner() -> Uuid {
        Uuid::now_v7()
    }

    #[test]
    fn test_create_root_and_child() {
        let directory = DepartmentDirectory::new();
        let company_id = company();

        let root = directory
            .create(company_id, owner(), None, "Engineering", "")
            .unwrap();
        let child = directory
            .create(company_id, owner(), Some(root.id), "Platform", "")
            .unwrap();

        assert!(root.is_root());
        assert_eq!(child.parent_id, Some(root.id));
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn test_create_with_missing_parent_fails() {
        let directory = DepartmentDirectory::new();
        let ghost = Uuid::now_v7();

        let err = directory
            .create(company(), owner(), Some(ghost), "Orphan", "")
            .unwrap_err();
        assert_eq!(err, OrgError::NotFound(ghost));
    }

    #[test]
    fn test_create_across_companies_fails() {
        let directory = DepartmentDirectory::new();
        let company_a = company();
        let company_b = company();

        let root = directory
            .create(company_a, owner(), None, "Engineering", "")
            .unwrap();
        let err = directory
            .create(company_b, owner(), Some(root.id), "Intruder", "")
            .unwrap_err();

        assert_eq!(
            err,
            OrgError::CrossTenant {
                department: root.id,
                company: company_b
            }
        );
    }

    #[test]
    fn test_reparent_under_descendant_fails() {
        let directory = DepartmentDirectory::new();
        let company_id = company();

        let d1 = directory
            .create(company_id, owner(), None, "D1", "")
            .unwrap();
        let d2 = directory
            .create(company_id, owner(), Some(d1.id), "D2", "")
            .unwrap();
        let d3 = directory
            .create(company_id, owner(), Some(d2.id), "D3", "")
            .unwrap();

        // Direct child and deeper descendant both detected.
        assert_eq!(
            directory.reparent(d1.id, Some(d2.id)).unwrap_err(),
            OrgError::CycleDetected(d1.id)
        );
        assert_eq!(
            directory.reparent(d1.id, Some(d3.id)).unwrap_err(),
            OrgError::CycleDetected(d1.id)
        );
    }

    #[test]
    fn test_reparent_under_self_fails() {
        let directory = DepartmentDirectory::new();
        let dept = directory.create(company(), owner(), None, "D", "").unwrap();

        assert_eq!(
            directory.reparent(dept.id, Some(dept.id)).unwrap_err(),
            OrgError::CycleDetected(dept.id)
        );
    }

    #[test]
    fn test_reparent_to_sibling_and_to_root() {
        let directory = DepartmentDirectory::new();
        let company_id = company();

        let a = directory.create(company_id, owner(), None, "A", "").unwrap();
        let b = directory.create(company_id, owner(), None, "B", "").unwrap();
        let c = directory
            .create(company_id, owner(), Some(a.id), "C", "")
            .unwrap();

        directory.reparent(c.id, Some(b.id)).unwrap();
        assert_eq!(directory.get(c.id).unwrap().parent_id, Some(b.id));

        directory.reparent(c.id, None).unwrap();
        assert!(directory.get(c.id).unwrap().is_root());
    }

    #[test]
    fn test_reparent_across_companies_fails() {
        let directory = DepartmentDirectory::new();
        let company_a = company();
        let company_b = company();

        let a = directory.create(company_a, owner(), None, "A", "").unwrap();
        let b = directory.create(company_b, owner(), None, "B", "").unwrap();

        assert_eq!(
            directory.reparent(a.id, Some(b.id)).unwrap_err(),
            OrgError::CrossTenant {
                department: b.id,
                company: company_a
            }
        );
    }

    #[test]
    fn test_reparent_missing_endpoints_fail() {
        let directory = DepartmentDirectory::new();
        let dept = directory.create(company(), owner(), None, "D", "").unwrap();
        let ghost = Uuid::now_v7();

        assert_eq!(
            directory.reparent(ghost, Some(dept.id)).unwrap_err(),
            OrgError::NotFound(ghost)
        );
        assert_eq!(
            directory.reparent(dept.id, Some(ghost)).unwrap_err(),
            OrgError::NotFound(ghost)
        );
    }

    #[test]
    fn test_reparent_refreshes_updated_at() {
        let directory = DepartmentDirectory::new();
        let company_id = company();

        let a = directory.create(company_id, owner(), None, "A", "").unwrap();
        let b = directory
            .create(company_id, owner(), Some(a.id), "B", "")
            .unwrap();

        directory.reparent(b.id, None).unwrap();
        let after = directory.get(b.id).unwrap();
        assert!(after.updated_at >= b.updated_at);
    }

    #[test]
    fn test_delete_leaf() {
        let directory = DepartmentDirectory::new();
        let dept = directory.create(company(), owner(), None, "D", "").unwrap();

        directory.delete(dept.id, false).unwrap();
        assert_eq!(directory.get(dept.id).unwrap_err(), OrgError::NotFound(dept.id));
        assert!(directory.is_empty());
    }

    #[test]
    fn test_delete_with_children_requires_cascade() {
        let directory = DepartmentDirectory::new();
        let company_id = company();

        let root = directory
            .create(company_id, owner(), None, "Root", "")
            .unwrap();
        let child = directory
            .create(company_id, owner(), Some(root.id), "Child", "")
            .unwrap();
        directory
            .create(company_id, owner(), Some(child.id), "Grandchild", "")
            .unwrap();

        assert_eq!(
            directory.delete(root.id, false).unwrap_err(),
            OrgError::HasChildren(root.id)
        );

        directory.delete(root.id, true).unwrap();
        assert!(directory.is_empty());
    }

    #[test]
    fn test_delete_cascade_leaves_siblings_alone() {
        let directory = DepartmentDirectory::new();
        let company_id = company();

        let a = directory.create(company_id, owner(), None, "A", "").unwrap();
        let b = directory.create(company_id, owner(), None, "B", "").unwrap();
        directory
            .create(company_id, owner(), Some(a.id), "A1", "")
            .unwrap();

        directory.delete(a.id, true).unwrap();

        assert_eq!(directory.len(), 1);
        assert_eq!(directory.get(b.id).unwrap().name, "B");
    }

    #[test]
    fn test_subtree_preorder_creation_order() {
        let directory = DepartmentDirectory::new();
        let company_id = company();

        let a = directory.create(company_id, owner(), None, "A", "").unwrap();
        let b = directory
            .create(company_id, owner(), Some(a.id), "B", "")
            .unwrap();
        let c = directory
            .create(company_id, owner(), Some(a.id), "C", "")
            .unwrap();
        let d = directory
            .create(company_id, owner(), Some(b.id), "D", "")
            .unwrap();

        let ids: Vec<Uuid> = directory
            .subtree(a.id)
            .unwrap()
            .iter()
            .map(|dept| dept.id)
            .collect();
        assert_eq!(ids, vec![a.id, b.id, d.id, c.id]);
    }

    #[test]
    fn test_subtree_is_idempotent() {
        let directory = DepartmentDirectory::new();
        let company_id = company();

        let root = directory
            .create(company_id, owner(), None, "Root", "")
            .unwrap();
        directory
            .create(company_id, owner(), Some(root.id), "Child", "")
            .unwrap();

        let first = directory.subtree(root.id).unwrap();
        let second = directory.subtree(root.id).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_roots_are_company_scoped() {
        let directory = DepartmentDirectory::new();
        let company_a = company();
        let company_b = company();

        let a = directory.create(company_a, owner(), None, "A", "").unwrap();
        directory.create(company_b, owner(), None, "B", "").unwrap();
        directory
            .create(company_a, owner(), Some(a.id), "A1", "")
            .unwrap();

        let roots = directory.roots(company_a);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, a.id);
    }

    #[test]
    fn test_rename_and_redescribe() {
        let directory = DepartmentDirectory::new();
        let dept = directory
            .create(company(), owner(), None, "Old", "old words")
            .unwrap();

        let renamed = directory.rename(dept.id, "New").unwrap();
        assert_eq!(renamed.name, "New");
        assert!(renamed.updated_at >= dept.updated_at);

        let redescribed = directory.redescribe(dept.id, "new words").unwrap();
        assert_eq!(redescribed.description, "new words");
        assert_eq!(redescribed.name, "New");
    }

    #[test]
    fn test_clones_share_state() {
        let directory = DepartmentDirectory::new();
        let handle = directory.clone();

        let dept = handle.create(company(), owner(), None, "Shared", "").unwrap();
        assert_eq!(directory.get(dept.id).unwrap().name, "Shared");
    }
}
