use chrono::NaiveDate;
use log::debug;

use crate::error::{required, DashboardError, DashboardResult};
use crate::models::{next_id, parse_date, Note, Priority, Todo, TodoCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TodoFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl std::str::FromStr for TodoFilter {
    type Err = DashboardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "" | "all" => Ok(TodoFilter::All),
            "pending" => Ok(TodoFilter::Pending),
            "completed" | "done" => Ok(TodoFilter::Completed),
            other => Err(DashboardError::invalid(
                "filter",
                format!("'{other}' is not one of all, pending, completed"),
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TodoForm {
    pub title: String,
    pub due_date: String,
    pub priority: String,
    pub category: String,
}

#[derive(Debug, Clone, Default)]
pub struct NoteForm {
    pub title: String,
    pub content: String,
}

/// The student's task list and free-form notes.
#[derive(Debug, Clone)]
pub struct Notebook {
    todos: Vec<Todo>,
    notes: Vec<Note>,
}

impl Notebook {
    pub fn new(todos: Vec<Todo>, notes: Vec<Note>) -> Self {
        Self { todos, notes }
    }

    pub fn todos(&self, filter: TodoFilter) -> Vec<&Todo> {
        self.todos
            .iter()
            .filter(|todo| match filter {
                TodoFilter::All => true,
                TodoFilter::Pending => !todo.completed,
                TodoFilter::Completed => todo.completed,
            })
            .collect()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn overdue(&self, today: NaiveDate) -> Vec<&Todo> {
        self.todos
            .iter()
            .filter(|todo| !todo.completed && todo.due_date < today)
            .collect()
    }

    pub fn add_todo(&mut self, form: &TodoForm) -> DashboardResult<&Todo> {
        let title = required("task title", &form.title)?.to_string();
        let due_date = parse_date("due date", required("due date", &form.due_date)?)?;
        let priority = match form.priority.trim() {
            "" => Priority::Medium,
            value => value.parse()?,
        };
        let category = match form.category.trim() {
            "" => TodoCategory::Academic,
            value => value.parse()?,
        };

        self.todos.push(Todo {
            id: next_id(self.todos.iter().map(|t| t.id)),
            title,
            due_date,
            priority,
            category,
            completed: false,
        });
        Ok(&self.todos[self.todos.len() - 1])
    }

    pub fn toggle_todo(&mut self, id: u32) -> DashboardResult<bool> {
        let todo = self
            .todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| DashboardError::not_found("task", id))?;
        todo.completed = !todo.completed;
        debug!("task {id} completed={}", todo.completed);
        Ok(todo.completed)
    }

    pub fn remove_todo(&mut self, id: u32) -> DashboardResult<Todo> {
        let index = self
            .todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| DashboardError::not_found("task", id))?;
        Ok(self.todos.remove(index))
    }

    pub fn add_note(&mut self, form: &NoteForm, today: NaiveDate) -> DashboardResult<&Note> {
        let title = required("note title", &form.title)?.to_string();
        let content = required("note content", &form.content)?.to_string();

        self.notes.push(Note {
            id: next_id(self.notes.iter().map(|n| n.id)),
            title,
            content,
            date: today,
        });
        Ok(&self.notes[self.notes.len() - 1])
    }

    pub fn remove_note(&mut self, id: u32) -> DashboardResult<Note> {
        let index = self
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| DashboardError::not_found("note", id))?;
        Ok(self.notes.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn notebook() -> Notebook {
        Notebook::new(seed::todos().expect("todos"), seed::notes().expect("notes"))
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    #[test]
    fn toggling_twice_restores_the_todo() {
        let mut notebook = notebook();
        let before = notebook.todos(TodoFilter::All)[0].clone();

        assert!(notebook.toggle_todo(before.id).expect("toggle"));
        assert!(!notebook.toggle_todo(before.id).expect("toggle back"));
        assert_eq!(*notebook.todos(TodoFilter::All)[0], before);
    }

    #[test]
    fn filters_split_pending_and_completed() {
        let notebook = notebook();
        assert_eq!(notebook.todos(TodoFilter::All).len(), 4);
        assert_eq!(notebook.todos(TodoFilter::Pending).len(), 3);
        assert_eq!(notebook.todos(TodoFilter::Completed)[0].title, "Submit Assignment");
    }

    #[test]
    fn overdue_ignores_completed_tasks() {
        let notebook = notebook();
        let overdue: Vec<u32> = notebook.overdue(day(2025, 11, 12)).iter().map(|t| t.id).collect();
        assert_eq!(overdue, vec![1]);
        assert!(notebook.overdue(day(2025, 11, 1)).is_empty());
    }

    #[test]
    fn new_todos_get_defaults() {
        let mut notebook = notebook();
        let todo = notebook
            .add_todo(&TodoForm {
                title: "Read chapter 6".to_string(),
                due_date: "2025-12-01".to_string(),
                ..TodoForm::default()
            })
            .expect("add todo");
        assert_eq!(todo.id, 5);
        assert_eq!(todo.priority, Priority::Medium);
        assert_eq!(todo.category, TodoCategory::Academic);
        assert!(!todo.completed);
    }

    #[test]
    fn notes_need_title_and_content() {
        let mut notebook = notebook();
        let err = notebook
            .add_note(
                &NoteForm {
                    title: "Lab".to_string(),
                    content: " ".to_string(),
                },
                day(2025, 11, 3),
            )
            .expect_err("blank content");
        assert_eq!(err, DashboardError::MissingField("note content"));

        let note = notebook
            .add_note(
                &NoteForm {
                    title: "Lab".to_string(),
                    content: "Bring goggles".to_string(),
                },
                day(2025, 11, 3),
            )
            .expect("add note");
        assert_eq!((note.id, note.date), (3, day(2025, 11, 3)));
        notebook.remove_note(3).expect("remove");
        assert!(notebook.remove_note(3).is_err());
    }
}
