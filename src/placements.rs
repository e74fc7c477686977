use chrono::NaiveDate;
use log::info;

use crate::error::{required, DashboardError, DashboardResult};
use crate::models::{
    next_id, parse_date, Application, ApplicationStatus, Opportunity, OpportunityKind,
    StudentProfile,
};

#[derive(Debug, Clone, Default)]
pub struct OpportunityForm {
    pub company: String,
    pub position: String,
    pub salary: String,
    pub deadline: String,
    pub description: String,
    pub location: String,
    pub kind: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardCounts {
    pub internships: usize,
    pub placements: usize,
}

/// Internship and placement postings with the applications they received.
#[derive(Debug, Clone)]
pub struct PlacementBoard {
    opportunities: Vec<Opportunity>,
}

impl PlacementBoard {
    pub fn new(opportunities: Vec<Opportunity>) -> Self {
        Self { opportunities }
    }

    pub fn get(&self, id: u32) -> Option<&Opportunity> {
        self.opportunities.iter().find(|o| o.id == id)
    }

    pub fn filter(&self, kind: Option<OpportunityKind>) -> Vec<&Opportunity> {
        self.opportunities
            .iter()
            .filter(|o| kind.map_or(true, |k| o.kind == k))
            .collect()
    }

    pub fn counts(&self) -> BoardCounts {
        let internships = self
            .opportunities
            .iter()
            .filter(|o| o.kind == OpportunityKind::Internship)
            .count();
        BoardCounts {
            internships,
            placements: self.opportunities.len() - internships,
        }
    }

    pub fn post(&mut self, form: &OpportunityForm) -> DashboardResult<&Opportunity> {
        let company = required("company", &form.company)?.to_string();
        let position = required("position", &form.position)?.to_string();
        let salary = required("salary", &form.salary)?.to_string();
        let deadline = parse_date("deadline", required("deadline", &form.deadline)?)?;
        let kind = match form.kind.trim() {
            "" => OpportunityKind::Placement,
            value => value.parse()?,
        };

        let opportunity = Opportunity {
            id: next_id(self.opportunities.iter().map(|o| o.id)),
            company,
            position,
            salary,
            deadline,
            description: form.description.trim().to_string(),
            location: form.location.trim().to_string(),
            kind,
            applications: Vec::new(),
        };
        info!("opportunity {} posted: {} at {}", opportunity.id, opportunity.position, opportunity.company);
        self.opportunities.push(opportunity);
        Ok(&self.opportunities[self.opportunities.len() - 1])
    }

    pub fn remove(&mut self, id: u32) -> DashboardResult<Opportunity> {
        let index = self
            .opportunities
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| DashboardError::not_found("opportunity", id))?;
        Ok(self.opportunities.remove(index))
    }

    /// Applying twice is a no-op that returns the existing application.
    pub fn apply(
        &mut self,
        opportunity_id: u32,
        student: &StudentProfile,
        today: NaiveDate,
    ) -> DashboardResult<&Application> {
        let opportunity = self
            .opportunities
            .iter_mut()
            .find(|o| o.id == opportunity_id)
            .ok_or_else(|| DashboardError::not_found("opportunity", opportunity_id))?;

        let existing = opportunity
            .applications
            .iter()
            .position(|a| a.student_id == student.id);
        let index = match existing {
            Some(index) => index,
            None => {
                info!("{} applied to opportunity {opportunity_id}", student.id);
                opportunity.applications.push(Application {
                    student_id: student.id.clone(),
                    student_name: student.name.clone(),
                    status: ApplicationStatus::Applied,
                    applied_date: today,
                });
                opportunity.applications.len() - 1
            }
        };
        Ok(&opportunity.applications[index])
    }

    pub fn application_for(&self, opportunity_id: u32, student_id: &str) -> Option<&Application> {
        self.get(opportunity_id)?
            .applications
            .iter()
            .find(|a| a.student_id.as_str() == student_id)
    }

    /// Every application the student has made, paired with its posting.
    pub fn applications_of(&self, student_id: &str) -> Vec<(&Opportunity, &Application)> {
        self.opportunities
            .iter()
            .filter_map(|o| {
                o.applications
                    .iter()
                    .find(|a| a.student_id.as_str() == student_id)
                    .map(|a| (o, a))
            })
            .collect()
    }

    /// Mentors may move an application to any status at any time.
    pub fn set_application_status(
        &mut self,
        opportunity_id: u32,
        student_id: &str,
        status: ApplicationStatus,
    ) -> DashboardResult<&Application> {
        let opportunity = self
            .opportunities
            .iter_mut()
            .find(|o| o.id == opportunity_id)
            .ok_or_else(|| DashboardError::not_found("opportunity", opportunity_id))?;
        let application = opportunity
            .applications
            .iter_mut()
            .find(|a| a.student_id.as_str() == student_id)
            .ok_or_else(|| DashboardError::not_found("application", student_id))?;
        info!(
            "application of {student_id} to opportunity {opportunity_id}: {} -> {status}",
            application.status
        );
        application.status = status;
        Ok(application)
    }
}
