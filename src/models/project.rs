//! Projects and the employee-to-project assignment used for attribution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::employee::EmployeeId;

/// Identifier of a project.
pub type ProjectId = u32;

/// Project id reported for employees that belong to no project.
pub const UNASSIGNED_PROJECT_ID: ProjectId = 0;

/// A project snapshot as sent with a report request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier for the project.
    pub id: ProjectId,
    /// Display name.
    pub name: String,
    /// Employees placed on this project.
    #[serde(default)]
    pub employee_ids: Vec<EmployeeId>,
}

/// Resolves every employee to at most one project.
///
/// Membership arrives as a list per project; attribution needs a single
/// optional project per employee. When an employee is listed under several
/// projects the first project in snapshot order wins.
///
/// # Example
///
/// ```
/// use attendance_report::models::{Project, ProjectAssignments};
///
/// let projects = vec![
///     Project { id: 3, name: "Alpha".to_string(), employee_ids: vec![10, 11] },
///     Project { id: 4, name: "Beta".to_string(), employee_ids: vec![11, 12] },
/// ];
/// let assignments = ProjectAssignments::from_projects(&projects);
///
/// assert_eq!(assignments.project_of(11), Some(3));
/// assert_eq!(assignments.project_id_or_unassigned(99), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectAssignments {
    by_employee: HashMap<EmployeeId, ProjectId>,
}

impl ProjectAssignments {
    /// Builds the assignment map from a project snapshot.
    pub fn from_projects(projects: &[Project]) -> Self {
        let mut by_employee = HashMap::new();
        for project in projects {
            for employee_id in &project.employee_ids {
                by_employee.entry(*employee_id).or_insert(project.id);
            }
        }
        Self { by_employee }
    }

    /// The project an employee is attributed to, if any.
    pub fn project_of(&self, employee_id: EmployeeId) -> Option<ProjectId> {
        self.by_employee.get(&employee_id).copied()
    }

    /// The project id, or [`UNASSIGNED_PROJECT_ID`] when unassigned.
    pub fn project_id_or_unassigned(&self, employee_id: EmployeeId) -> ProjectId {
        self.project_of(employee_id).unwrap_or(UNASSIGNED_PROJECT_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: ProjectId, members: &[EmployeeId]) -> Project {
        Project {
            id,
            name: format!("Project {}", id),
            employee_ids: members.to_vec(),
        }
    }

    #[test]
    fn test_single_membership() {
        let assignments = ProjectAssignments::from_projects(&[project(1, &[5]), project(2, &[6])]);
        assert_eq!(assignments.project_of(5), Some(1));
        assert_eq!(assignments.project_of(6), Some(2));
    }

    #[test]
    fn test_first_project_wins_on_duplicate_membership() {
        let assignments = ProjectAssignments::from_projects(&[project(2, &[5]), project(1, &[5])]);
        assert_eq!(assignments.project_of(5), Some(2));
    }

    #[test]
    fn test_unlisted_employee_is_unassigned() {
        let assignments = ProjectAssignments::from_projects(&[project(1, &[5])]);
        assert_eq!(assignments.project_of(8), None);
        assert_eq!(assignments.project_id_or_unassigned(8), UNASSIGNED_PROJECT_ID);
    }

    #[test]
    fn test_project_deserializes_without_members() {
        let project: Project = serde_json::from_str(r#"{"id": 9, "name": "Ops"}"#).unwrap();
        assert!(project.employee_ids.is_empty());
    }
}
