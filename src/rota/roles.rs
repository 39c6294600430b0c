// src/rota/roles.rs

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::model::{norm, JobRole, JobRoleId, RoleMapping, StaffMember};

/// Job roles for a location plus the title → role reconciliation table.
#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    roles: BTreeMap<JobRoleId, JobRole>,
    by_title: HashMap<String, JobRoleId>,
    mappings: HashMap<String, JobRoleId>,
}

impl RoleCatalog {
    pub fn new(roles: &[JobRole]) -> Self {
        let mut catalog = Self::default();
        for role in roles {
            catalog.by_title.entry(norm(&role.title)).or_insert(role.id);
            catalog.roles.insert(role.id, role.clone());
        }
        catalog
    }

    /// Later mappings for the same title win.
    pub fn set_mappings(&mut self, mappings: &[RoleMapping]) {
        self.mappings = mappings
            .iter()
            .filter(|m| self.roles.contains_key(&m.job_role_id))
            .map(|m| (norm(&m.job_title), m.job_role_id))
            .collect();
    }

    pub fn default_wage_rate(&self, id: JobRoleId) -> f64 {
        self.roles.get(&id).map(|r| r.default_wage_rate).unwrap_or(0.0)
    }

    /// Roles a free-text job title stands for: its mapping and the role of
    /// the same name, when either exists.
    pub fn title_roles(&self, title: &str) -> BTreeSet<JobRoleId> {
        let key = norm(title);
        [self.mappings.get(&key), self.by_title.get(&key)]
            .into_iter()
            .flatten()
            .copied()
            .collect()
    }

    /// Explicit role ids, plus whatever the free-text job title resolves to.
    /// Ids unknown to the catalog are ignored.
    pub fn eligible_roles(&self, staff: &StaffMember) -> BTreeSet<JobRoleId> {
        let mut out: BTreeSet<JobRoleId> = staff
            .job_role_ids
            .iter()
            .copied()
            .filter(|id| self.roles.contains_key(id))
            .collect();
        if let Some(title) = staff.job_title.as_deref() {
            out.extend(self.title_roles(title));
        }
        out
    }

    pub fn is_manager(&self, staff: &StaffMember) -> bool {
        self.eligible_roles(staff)
            .iter()
            .filter_map(|id| self.roles.get(id))
            .any(JobRole::is_manager)
    }
}
