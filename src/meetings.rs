use log::info;

use crate::directory::Directory;
use crate::error::{required, DashboardError, DashboardResult};
use crate::models::{next_id, parse_date, parse_time, Meeting, MeetingStatus, StudentId};

#[derive(Debug, Clone, Default)]
pub struct MeetingForm {
    /// Mentor side only; students always meet their own mentor.
    pub student: String,
    pub date: String,
    pub time: String,
    pub topic: String,
    pub location: String,
}

#[derive(Debug, Clone)]
pub struct MeetingBook {
    meetings: Vec<Meeting>,
}

impl MeetingBook {
    pub fn new(meetings: Vec<Meeting>) -> Self {
        Self { meetings }
    }

    pub fn all(&self) -> &[Meeting] {
        &self.meetings
    }

    #[cfg(test)]
    pub fn get(&self, id: u32) -> Option<&Meeting> {
        self.meetings.iter().find(|m| m.id == id)
    }

    pub fn upcoming(&self) -> Vec<&Meeting> {
        self.with_status(MeetingStatus::Scheduled)
    }

    pub fn completed(&self) -> Vec<&Meeting> {
        self.with_status(MeetingStatus::Completed)
    }

    fn with_status(&self, status: MeetingStatus) -> Vec<&Meeting> {
        self.meetings.iter().filter(|m| m.status == status).collect()
    }

    /// A student's request to meet their mentor.
    pub fn request(&mut self, form: &MeetingForm) -> DashboardResult<&Meeting> {
        self.append(form, None, None)
    }

    /// A mentor scheduling a meeting with one of their mentees. The student
    /// may be named by id or by name; anyone else is `NotMentee`.
    pub fn schedule(
        &mut self,
        form: &MeetingForm,
        directory: &Directory,
        mentees: &[StudentId],
    ) -> DashboardResult<&Meeting> {
        let wanted = required("student name", &form.student)?;
        let student = mentees
            .iter()
            .filter_map(|id| directory.student(id))
            .find(|s| s.id.as_str() == wanted || s.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DashboardError::NotMentee(wanted.to_string()))?;

        self.append(form, Some(student.id.clone()), Some(student.name.clone()))
    }

    fn append(
        &mut self,
        form: &MeetingForm,
        student_id: Option<StudentId>,
        student_name: Option<String>,
    ) -> DashboardResult<&Meeting> {
        let date = required("date", &form.date)?;
        let time = required("time", &form.time)?;
        let topic = required("topic", &form.topic)?;
        let location = required("location", &form.location)?;

        let meeting = Meeting {
            id: next_id(self.meetings.iter().map(|m| m.id)),
            student_id,
            student_name,
            date: parse_date("date", date)?,
            time: parse_time("time", time)?,
            topic: topic.to_string(),
            location: location.to_string(),
            status: MeetingStatus::Scheduled,
            notes: String::new(),
        };
        info!("meeting {} scheduled: {} on {}", meeting.id, meeting.topic, meeting.date);
        self.meetings.push(meeting);
        Ok(&self.meetings[self.meetings.len() - 1])
    }

    /// Records the outcome of a meeting and closes it.
    pub fn save_notes(&mut self, id: u32, notes: &str) -> DashboardResult<&Meeting> {
        let meeting = self
            .meetings
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| DashboardError::not_found("meeting", id))?;
        meeting.notes = notes.trim().to_string();
        meeting.status = MeetingStatus::Completed;
        info!("meeting {id} completed");
        Ok(meeting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MentorId;
    use crate::seed;

    fn form(student: &str) -> MeetingForm {
        MeetingForm {
            student: student.to_string(),
            date: "2025-11-20".to_string(),
            time: "3:30 PM".to_string(),
            topic: "Semester Review".to_string(),
            location: "Office Room 101".to_string(),
        }
    }

    fn mentees(directory: &Directory) -> Vec<StudentId> {
        directory
            .mentees_of(&MentorId::new("M001"))
            .into_iter()
            .map(|s| s.id.clone())
            .collect()
    }

    #[test]
    fn scheduling_appends_exactly_one_scheduled_meeting() {
        let directory = Directory::seeded();
        let mut book = MeetingBook::new(seed::mentor_meetings().expect("meetings"));
        let before = book.all().len();

        let meeting = book
            .schedule(&form("aisha khan"), &directory, &mentees(&directory))
            .expect("schedule")
            .clone();

        assert_eq!(book.all().len(), before + 1);
        assert_eq!(meeting.status, MeetingStatus::Scheduled);
        assert_eq!(meeting.student_id, Some(StudentId::new("205631")));
        assert_eq!(meeting.student_name.as_deref(), Some("Aisha Khan"));
        assert!(meeting.notes.is_empty());
    }

    #[test]
    fn missing_fields_leave_the_book_untouched() {
        let directory = Directory::seeded();
        let mut book = MeetingBook::new(seed::mentor_meetings().expect("meetings"));
        let mut incomplete = form("205631");
        incomplete.location = String::new();

        let err = book
            .schedule(&incomplete, &directory, &mentees(&directory))
            .expect_err("missing location");
        assert_eq!(err, DashboardError::MissingField("location"));
        assert_eq!(book.all().len(), 2);
    }

    #[test]
    fn scheduling_refuses_students_outside_the_roster() {
        let directory = Directory::seeded();
        let mut book = MeetingBook::new(seed::mentor_meetings().expect("meetings"));

        for outsider in ["Priya Sharma", "217123", "Nobody"] {
            let err = book
                .schedule(&form(outsider), &directory, &mentees(&directory))
                .expect_err("not a mentee");
            assert_eq!(err, DashboardError::NotMentee(outsider.to_string()));
        }
        assert_eq!(book.all().len(), 2);
    }

    #[test]
    fn saving_notes_completes_and_preserves_fields() {
        let mut book = MeetingBook::new(seed::mentor_meetings().expect("meetings"));
        let before = book.get(2).expect("meeting 2").clone();

        let after = book.save_notes(2, "Shortlisted three companies").expect("save").clone();
        assert_eq!(after.status, MeetingStatus::Completed);
        assert_eq!(after.notes, "Shortlisted three companies");
        assert_eq!(
            (after.date, after.time, &after.topic, &after.location, &after.student_id),
            (before.date, before.time, &before.topic, &before.location, &before.student_id)
        );
        assert_eq!(book.upcoming().len(), 0);
        assert_eq!(book.completed().len(), 2);
    }

    #[test]
    fn student_requests_have_no_attendee() {
        let mut book = MeetingBook::new(seed::student_meetings().expect("meetings"));
        let meeting = book.request(&form("")).expect("request");
        assert_eq!(meeting.id, 3);
        assert_eq!(meeting.student_name, None);
        assert!(matches!(book.save_notes(9, "x"), Err(DashboardError::NotFound { .. })));
    }
}
