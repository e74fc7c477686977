use chrono::NaiveDate;
use log::debug;

use crate::directory::Directory;
use crate::error::{required, DashboardError, DashboardResult};
use crate::models::{Author, Guidance, MentorId, Message, StudentId};

/// Conversation between a student and their mentor. Nothing is delivered;
/// the thread lives only in this session.
#[derive(Debug, Clone, Default)]
pub struct Thread {
    messages: Vec<Message>,
}

impl Thread {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn send(&mut self, author: Author, text: &str, today: NaiveDate) -> DashboardResult<&Message> {
        let content = required("message", text)?.to_string();
        self.messages.push(Message {
            author,
            content,
            date: today,
        });
        Ok(&self.messages[self.messages.len() - 1])
    }
}

/// Guidance notes a mentor has sent to individual mentees.
#[derive(Debug, Clone)]
pub struct GuidanceLog {
    mentor: MentorId,
    entries: Vec<Guidance>,
}

impl GuidanceLog {
    pub fn new(mentor: MentorId) -> Self {
        Self {
            mentor,
            entries: Vec::new(),
        }
    }

    pub fn send_guidance(
        &mut self,
        directory: &Directory,
        student: &StudentId,
        text: &str,
        today: NaiveDate,
    ) -> DashboardResult<&Guidance> {
        let message = required("guidance", text)?.to_string();
        if !directory.is_mentee(&self.mentor, student) {
            return Err(DashboardError::NotMentee(student.to_string()));
        }

        debug!("guidance for {student} from {}", self.mentor);
        self.entries.push(Guidance {
            student_id: student.clone(),
            message,
            date: today,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn history_for(&self, student: &StudentId) -> Vec<&Guidance> {
        self.entries
            .iter()
            .filter(|g| g.student_id == *student)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 4).expect("date")
    }

    #[test]
    fn blank_messages_are_not_sent() {
        let mut thread = Thread::new(seed::mentor_messages().expect("messages"));
        assert!(thread.send(Author::Student, "   ", today()).is_err());
        thread.send(Author::Student, "See you Tuesday", today()).expect("send");
        assert_eq!(thread.messages().len(), 2);
        assert_eq!(thread.messages()[1].author, Author::Student);
    }

    #[test]
    fn guidance_is_limited_to_mentees() {
        let directory = Directory::seeded();
        let mut log = GuidanceLog::new(MentorId::new("M001"));
        let aisha = StudentId::new("205631");
        let priya = StudentId::new("217123");

        log.send_guidance(&directory, &aisha, "Start the report early", today())
            .expect("send");
        assert_eq!(
            log.send_guidance(&directory, &priya, "Hello", today()),
            Err(DashboardError::NotMentee("217123".to_string()))
        );
        assert_eq!(log.history_for(&aisha).len(), 1);
        assert!(log.history_for(&priya).is_empty());
    }
}
