use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::academics::{
    is_attendance_eligible, is_internship_eligible, AttendanceStanding, INTERNSHIP_MIN_CGPA,
};
use crate::fees::{discount_percent, rupees, FeeBreakdown};
use crate::models::StudentProfile;

pub const SUGGESTED_QUESTIONS: [&str; 6] = [
    "How is my academic performance?",
    "What's my attendance status?",
    "Am I eligible for fee discount?",
    "What internships can I apply for?",
    "How can I improve my grades?",
    "When is my next meeting with mentor?",
];

const GREETING: &str = "Hello! I'm your academic assistant. I can help you with questions about your \
    academic performance, attendance, fees, career guidance, and more. What would you like to know?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Performance,
    Attendance,
    Fees,
    Career,
    Mentor,
    Study,
    Greeting,
    Other,
}

impl Topic {
    /// First matching rule wins, so "attendance fee" is an attendance question.
    pub fn classify(query: &str) -> Self {
        let lower = query.to_lowercase();
        if contains_any(&lower, &["performance", "academic"]) {
            Topic::Performance
        } else if contains_any(&lower, &["attendance"]) {
            Topic::Attendance
        } else if contains_any(&lower, &["fee", "discount"]) {
            Topic::Fees
        } else if contains_any(&lower, &["internship", "placement", "career"]) {
            Topic::Career
        } else if contains_any(&lower, &["mentor", "meeting"]) {
            Topic::Mentor
        } else if contains_any(&lower, &["improve", "study", "help"]) {
            Topic::Study
        } else if contains_word(&lower, &["hello", "hi", "hey"]) {
            Topic::Greeting
        } else {
            Topic::Other
        }
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

fn contains_word(text: &str, words: &[&str]) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| words.contains(&token))
}

/// Templated answer for one question about the given student.
pub fn respond(student: &StudentProfile, base_fee: Decimal, query: &str) -> String {
    let cgpa = student.cgpa;
    match Topic::classify(query) {
        Topic::Performance => {
            // Coarser than GradeBand: everything below 7.0 needs improvement.
            let (standing, advice) = if cgpa >= 8.0 {
                ("excellent", "Keep up the excellent work! You're performing exceptionally well.")
            } else if cgpa >= 7.0 {
                ("good", "You're doing well! Consider focusing on challenging subjects to improve further.")
            } else {
                (
                    "needs improvement",
                    "There's room for improvement. I recommend discussing study strategies with your mentor.",
                )
            };
            format!("Your academic performance is {standing}. Your current CGPA is {cgpa:.2}/10. {advice}")
        }
        Topic::Attendance => {
            let standing = AttendanceStanding::of(student.attendance);
            let advice = match standing {
                AttendanceStanding::Excellent => "Excellent! You're well above the minimum requirement.",
                AttendanceStanding::Good => {
                    "You're meeting the minimum requirement. Try to maintain or improve this."
                }
                AttendanceStanding::AtRisk => {
                    "Your attendance is below the minimum 75% requirement. Please attend more classes to maintain eligibility."
                }
            };
            format!(
                "Your attendance is {} at {}%. {advice}",
                standing.label().to_lowercase(),
                student.attendance
            )
        }
        Topic::Fees => {
            let fee = FeeBreakdown::for_score(base_fee, cgpa);
            format!(
                "Based on your CGPA of {cgpa:.2}, you're eligible for a {}% fee discount. Base fee: {}, Discount: {}, Final fee: {}.",
                discount_percent(cgpa),
                rupees(fee.base_fee),
                rupees(fee.discount_amount),
                rupees(fee.final_fee)
            )
        }
        Topic::Career => {
            if is_internship_eligible(cgpa) {
                format!(
                    "Great news! With your CGPA of {cgpa:.2}, you're eligible for internship opportunities. \
                     Check the placements panel for openings that match your department ({}).",
                    student.department
                )
            } else {
                format!(
                    "Your current CGPA is {cgpa:.2}. Most internships require a minimum CGPA of {INTERNSHIP_MIN_CGPA:.1}. \
                     Focus on improving your grades to become eligible for better opportunities."
                )
            }
        }
        Topic::Mentor => "Your assigned mentor can provide personalized guidance. You can request meetings \
            from the mentor panel of your dashboard. Regular meetings help with academic planning and career guidance."
            .to_string(),
        Topic::Study => "Here are my recommendations: 1) Maintain consistent attendance (aim for 90%+), \
            2) Schedule regular meetings with your mentor, 3) Complete assignments on time, \
            4) Join study groups with classmates, 5) Use the notes panel to track important concepts."
            .to_string(),
        Topic::Greeting => format!(
            "Hello {}! I'm here to help you with your academic journey. Ask me about your performance, \
             attendance, fees, career opportunities, or any other academic concern.",
            student.name
        ),
        Topic::Other => format!(
            "I understand you're asking about \"{}\". I can help with questions about your performance \
             (CGPA: {cgpa:.2}/10), attendance ({}%), fees, mentor guidance, projects, and career opportunities.",
            query.trim(),
            student.attendance
        ),
    }
}

/// One-line readiness check shown beside the chat.
pub fn readiness(student: &StudentProfile) -> &'static str {
    if is_internship_eligible(student.cgpa) && is_attendance_eligible(student.attendance) {
        "Good"
    } else {
        "Check"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub content: String,
    pub at: NaiveTime,
}

#[derive(Debug, Clone)]
pub struct Assistant {
    student: StudentProfile,
    base_fee: Decimal,
    transcript: Vec<ChatTurn>,
}

impl Assistant {
    pub fn new(student: StudentProfile, base_fee: Decimal, at: NaiveTime) -> Self {
        Self {
            student,
            base_fee,
            transcript: vec![ChatTurn {
                speaker: Speaker::Assistant,
                content: GREETING.to_string(),
                at,
            }],
        }
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    /// Suggestions are offered until the first question is asked.
    pub fn suggestions(&self) -> &[&'static str] {
        if self.transcript.len() <= 1 {
            &SUGGESTED_QUESTIONS[..3]
        } else {
            &[]
        }
    }

    /// Records the question and its answer. Blank input is ignored.
    pub fn ask(&mut self, query: &str, at: NaiveTime) -> Option<&ChatTurn> {
        if query.trim().is_empty() {
            return None;
        }
        let answer = respond(&self.student, self.base_fee, query);
        self.transcript.push(ChatTurn {
            speaker: Speaker::User,
            content: query.trim().to_string(),
            at,
        });
        self.transcript.push(ChatTurn {
            speaker: Speaker::Assistant,
            content: answer,
            at,
        });
        self.transcript.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Directory;
    use crate::models::StudentId;

    fn student(id: &str) -> StudentProfile {
        Directory::seeded()
            .student(&StudentId::new(id))
            .expect("seeded student")
            .clone()
    }

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).expect("time")
    }

    #[test]
    fn rules_apply_in_order() {
        assert_eq!(Topic::classify("How is my ACADEMIC standing?"), Topic::Performance);
        assert_eq!(Topic::classify("attendance and fee"), Topic::Attendance);
        assert_eq!(Topic::classify("Any placement news?"), Topic::Career);
        assert_eq!(Topic::classify("hi there"), Topic::Greeting);
        assert_eq!(Topic::classify("what is this"), Topic::Other);
    }

    #[test]
    fn fee_answer_uses_shared_discount() {
        let answer = respond(&student("205631"), Decimal::from(50_000), "Am I eligible for fee discount?");
        assert!(answer.contains("15% fee discount"), "{answer}");
        assert!(answer.contains("Final fee: ₹42,500"), "{answer}");

        let low = respond(&student("216037"), Decimal::from(50_000), "discount?");
        assert!(low.contains("0% fee discount"), "{low}");
        assert!(low.contains("Final fee: ₹50,000"), "{low}");
    }

    #[test]
    fn performance_below_seven_needs_improvement() {
        let answer = respond(&student("217123"), Decimal::from(50_000), "How is my academic performance?");
        assert!(
            answer.starts_with("Your academic performance is needs improvement. Your current CGPA is 6.37/10."),
            "{answer}"
        );

        let good = respond(&student("205631"), Decimal::from(50_000), "my performance?");
        assert!(good.starts_with("Your academic performance is good."), "{good}");
    }

    #[test]
    fn attendance_answer_flags_risk() {
        let answer = respond(&student("216037"), Decimal::from(50_000), "attendance?");
        assert!(answer.starts_with("Your attendance is at risk at 65%"), "{answer}");
    }

    #[test]
    fn blank_questions_do_not_extend_the_transcript() {
        let mut assistant = Assistant::new(student("217123"), Decimal::from(50_000), noon());
        assert_eq!(assistant.suggestions().len(), 3);
        assert!(assistant.ask("   ", noon()).is_none());
        assert_eq!(assistant.transcript().len(), 1);

        let reply = assistant.ask("hello", noon()).expect("reply");
        assert!(reply.content.starts_with("Hello Priya Sharma!"));
        assert_eq!(assistant.transcript().len(), 3);
        assert!(assistant.suggestions().is_empty());
    }

    #[test]
    fn readiness_needs_both_thresholds() {
        assert_eq!(readiness(&student("206206")), "Good");
        assert_eq!(readiness(&student("201788")), "Check");
    }
}
