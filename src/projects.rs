use log::info;

use crate::error::{required, DashboardError, DashboardResult};
use crate::models::{next_id, parse_date, Project, ProjectStatus};

#[derive(Debug, Clone, Default)]
pub struct ProjectForm {
    pub title: String,
    pub description: String,
    pub assigned_to: String,
    pub due_date: String,
}

#[derive(Debug, Clone)]
pub struct ProjectBoard {
    projects: Vec<Project>,
}

impl ProjectBoard {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    pub fn all(&self) -> &[Project] {
        &self.projects
    }

    pub fn assign(&mut self, form: &ProjectForm) -> DashboardResult<&Project> {
        let title = required("project title", &form.title)?.to_string();
        let description = required("description", &form.description)?.to_string();
        let assigned_to = required("assignee", &form.assigned_to)?.to_string();
        let due_date = parse_date("due date", required("due date", &form.due_date)?)?;

        let project = Project {
            id: next_id(self.projects.iter().map(|p| p.id)),
            title,
            description,
            assigned_to,
            due_date,
            status: ProjectStatus::NotStarted,
        };
        info!("project {} assigned to {}", project.id, project.assigned_to);
        self.projects.push(project);
        Ok(&self.projects[self.projects.len() - 1])
    }

    pub fn set_status(&mut self, id: u32, status: ProjectStatus) -> DashboardResult<&Project> {
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DashboardError::not_found("project", id))?;
        project.status = status;
        Ok(project)
    }
}
