use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, DashboardResult};
use crate::models::{MentorProfile, Role, StudentProfile};

/// Editable profile form. Fields listed in `read_only` are shown but cannot
/// be changed from the settings panel.
#[derive(Debug, Clone)]
pub struct ProfileForm {
    pub fields: BTreeMap<String, String>,
    read_only: Vec<&'static str>,
}

impl ProfileForm {
    pub fn for_student(student: &StudentProfile) -> Self {
        let fields = [
            ("name", student.name.clone()),
            ("email", student.email.clone()),
            ("phone", student.phone.clone()),
            ("department", student.department.clone()),
            ("year", student.year.to_string()),
            ("cgpa", format!("{:.2}", student.cgpa)),
        ];
        Self::build(&fields, vec!["department", "cgpa"])
    }

    pub fn for_mentor(mentor: &MentorProfile) -> Self {
        let fields = [
            ("name", mentor.name.clone()),
            ("email", mentor.email.clone()),
            ("phone", mentor.phone.clone()),
            ("department", mentor.department.clone()),
            ("specialization", String::new()),
            ("experience", mentor.experience.clone()),
        ];
        Self::build(&fields, vec!["department"])
    }

    fn build(fields: &[(&str, String)], read_only: Vec<&'static str>) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
            read_only,
        }
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> DashboardResult<()> {
        if self.read_only.contains(&field) {
            return Err(DashboardError::invalid("field", format!("{field} cannot be changed here")));
        }
        let slot = self
            .fields
            .get_mut(field)
            .ok_or_else(|| DashboardError::not_found("profile field", field))?;
        *slot = value.trim().to_string();
        Ok(())
    }
}

/// Boolean notification switches, keyed by their camelCase names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences(BTreeMap<String, bool>);

impl Preferences {
    pub fn for_role(role: Role) -> Self {
        let defaults: &[(&str, bool)] = match role {
            Role::Student => &[
                ("emailNotifications", true),
                ("smsNotifications", false),
                ("meetingReminders", true),
                ("assignmentReminders", true),
                ("feeReminders", true),
            ],
            Role::Mentor => &[
                ("emailNotifications", true),
                ("studentUpdates", true),
                ("meetingReminders", true),
                ("reportNotifications", true),
                ("weeklyDigest", true),
            ],
        };
        Preferences(defaults.iter().map(|(k, v)| (k.to_string(), *v)).collect())
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<bool> {
        self.0.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn toggle(&mut self, key: &str) -> DashboardResult<bool> {
        let value = self
            .0
            .get_mut(key)
            .ok_or_else(|| DashboardError::not_found("preference", key))?;
        *value = !*value;
        Ok(*value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSettings {
    pub max_students: u32,
    pub attendance_threshold: u32,
    pub fee_structure: String,
}

impl Default for ClassSettings {
    fn default() -> Self {
        Self {
            max_students: 50,
            attendance_threshold: 75,
            fee_structure: "Standard".to_string(),
        }
    }
}

impl ClassSettings {
    pub fn set(&mut self, field: &str, value: &str) -> DashboardResult<()> {
        let value = value.trim();
        let number = |field: &'static str| {
            value
                .parse::<u32>()
                .map_err(|_| DashboardError::invalid(field, format!("'{value}' is not a whole number")))
        };
        match field {
            "maxStudents" => self.max_students = number("maxStudents")?,
            "attendanceThreshold" => {
                let threshold = number("attendanceThreshold")?;
                if threshold > 100 {
                    return Err(DashboardError::invalid("attendanceThreshold", "must be a percentage"));
                }
                self.attendance_threshold = threshold;
            }
            "feeStructure" => self.fee_structure = value.to_string(),
            other => return Err(DashboardError::not_found("class setting", other)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SettingsPanel {
    pub role: Role,
    pub owner_id: String,
    pub profile: ProfileForm,
    pub preferences: Preferences,
    pub class_settings: Option<ClassSettings>,
}

impl SettingsPanel {
    pub fn for_student(student: &StudentProfile) -> Self {
        Self {
            role: Role::Student,
            owner_id: student.id.to_string(),
            profile: ProfileForm::for_student(student),
            preferences: Preferences::for_role(Role::Student),
            class_settings: None,
        }
    }

    pub fn for_mentor(mentor: &MentorProfile) -> Self {
        Self {
            role: Role::Mentor,
            owner_id: mentor.id.to_string(),
            profile: ProfileForm::for_mentor(mentor),
            preferences: Preferences::for_role(Role::Mentor),
            class_settings: Some(ClassSettings::default()),
        }
    }

    pub fn export_file_name(&self) -> String {
        format!("{}_data_{}.json", self.role, self.owner_id)
    }

    pub fn export_json(&self, downloaded_at: DateTime<Utc>) -> anyhow::Result<String> {
        let mut data = serde_json::Map::new();
        data.insert("profile".to_string(), serde_json::to_value(&self.profile.fields)?);
        if let Some(class_settings) = &self.class_settings {
            data.insert("classSettings".to_string(), serde_json::to_value(class_settings)?);
        }
        data.insert(
            self.role.id_key().to_string(),
            serde_json::Value::String(self.owner_id.clone()),
        );
        data.insert(
            "downloadDate".to_string(),
            serde_json::Value::String(downloaded_at.to_rfc3339()),
        );
        Ok(serde_json::to_string_pretty(&serde_json::Value::Object(data))?)
    }

    /// Writes the export into `dir` and returns the file path.
    pub fn export_to(&self, dir: &Path, downloaded_at: DateTime<Utc>) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join(self.export_file_name());
        fs::write(&path, self.export_json(downloaded_at)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("exported {} data to {}", self.role, path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Directory;
    use crate::models::{MentorId, StudentId};

    fn student_panel() -> SettingsPanel {
        let directory = Directory::seeded();
        SettingsPanel::for_student(directory.student(&StudentId::new("205631")).expect("student"))
    }

    #[test]
    fn read_only_fields_are_refused() {
        let mut panel = student_panel();
        assert!(panel.profile.set_field("cgpa", "9.9").is_err());
        panel.profile.set_field("phone", " +91-9000000000 ").expect("phone");
        assert_eq!(panel.profile.get("phone"), Some("+91-9000000000"));
        assert!(panel.profile.set_field("nickname", "A").is_err());
    }

    #[test]
    fn preferences_toggle() {
        let mut panel = student_panel();
        assert_eq!(panel.preferences.toggle("smsNotifications"), Ok(true));
        assert_eq!(panel.preferences.get("smsNotifications"), Some(true));
        assert!(panel.preferences.toggle("weeklyDigest").is_err());
    }

    #[test]
    fn class_settings_parse_numbers() {
        let mut settings = ClassSettings::default();
        settings.set("attendanceThreshold", "80").expect("threshold");
        assert_eq!(settings.attendance_threshold, 80);
        assert!(settings.set("attendanceThreshold", "180").is_err());
        assert!(settings.set("maxStudents", "many").is_err());
    }

    #[test]
    fn export_writes_named_json() {
        let directory = Directory::seeded();
        let panel = SettingsPanel::for_mentor(directory.mentor(&MentorId::new("M003")).expect("mentor"));
        let dir = tempfile::tempdir().expect("tempdir");
        let at = DateTime::parse_from_rfc3339("2025-11-03T10:00:00Z")
            .expect("timestamp")
            .with_timezone(&Utc);

        let path = panel.export_to(dir.path(), at).expect("export");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("mentor_data_M003.json"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(json["mentorId"], "M003");
        assert_eq!(json["profile"]["name"], "Dr. Vikram Patel");
        assert_eq!(json["classSettings"]["attendanceThreshold"], 75);
        assert_eq!(json["downloadDate"], "2025-11-03T10:00:00+00:00");
        assert!(json.get("preferences").is_none());
    }

    #[test]
    fn student_export_has_profile_id_and_date_only() {
        let at = DateTime::parse_from_rfc3339("2025-11-03T10:00:00Z")
            .expect("timestamp")
            .with_timezone(&Utc);
        let json: serde_json::Value =
            serde_json::from_str(&student_panel().export_json(at).expect("export")).expect("parse");

        let mut keys: Vec<&str> = json.as_object().expect("object").keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["downloadDate", "profile", "studentId"]);
    }
}
