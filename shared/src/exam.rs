//! Tests (exams) created by teachers.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Quiz,
    #[default]
    Midterm,
    Final,
    Assignment,
    Practical,
}

/// Payload for creating a test.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TestDescriptor {
    pub title: String,
    pub subject: String,
    pub test_type: TestType,
    pub max_marks: u32,
    pub passing_marks: u32,
    pub test_date: chrono::NaiveDate,
    /// Start time in `HH:MM`.
    pub exam_time: String,
    /// Duration in minutes.
    pub duration: u32,
    pub venue: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub syllabus: String,
}

/// Validation failures of a [`TestDescriptor`], in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestValidationErrors(pub Vec<String>);

impl Display for TestValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl std::error::Error for TestValidationErrors {}

impl TestDescriptor {
    /// Checks required fields and that passing marks stay below maximum marks.
    pub fn validate(&self) -> Result<(), TestValidationErrors> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("title", &self.title),
            ("subject", &self.subject),
            ("venue", &self.venue),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("{field} is required"));
            }
        }

        if self.max_marks == 0 {
            errors.push("maxMarks is required".to_owned());
        }

        if self.passing_marks >= self.max_marks {
            errors.push("Passing marks must be less than maximum marks".to_owned());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(TestValidationErrors(errors))
        }
    }

    /// Trims the free-text fields the way they are sent to the backend.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.title,
            &mut self.subject,
            &mut self.venue,
            &mut self.instructions,
            &mut self.syllabus,
        ] {
            *field = field.trim().to_owned();
        }
        self
    }
}

/// A student row offered for marks entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct StudentsQuery {
    pub limit: u32,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StudentsResult {
    #[serde(default)]
    pub students: Vec<StudentSummary>,
}

/// Marks already recorded for one student.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordedMark {
    pub student_id: String,
    pub marks_obtained: f64,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TestMarksResult {
    #[serde(default)]
    pub marks: Vec<RecordedMark>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarkEntry {
    /// Id of the student.
    pub student: String,
    pub marks_obtained: f64,
    pub remarks: String,
}

/// Payload for recording or updating the marks of a test.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct MarksDescriptor {
    pub results: Vec<MarkEntry>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct SubmitMarksResult {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    /// Number of results the backend stored.
    #[serde(default)]
    pub processed: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarksValidationError {
    NoneEntered,
    OutOfRange { max_marks: u32 },
}

impl Display for MarksValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarksValidationError::NoneEntered => {
                f.write_str("Please enter marks for at least one student")
            }
            MarksValidationError::OutOfRange { max_marks } => {
                write!(f, "Marks must be between 0 and {max_marks}")
            }
        }
    }
}

impl std::error::Error for MarksValidationError {}

impl MarksDescriptor {
    /// Requires at least one entry, each within `0..=max_marks`.
    pub fn validate(&self, max_marks: u32) -> Result<(), MarksValidationError> {
        if self.results.is_empty() {
            return Err(MarksValidationError::NoneEntered);
        }

        let range = 0.0..=f64::from(max_marks);
        if self
            .results
            .iter()
            .any(|entry| !range.contains(&entry.marks_obtained))
        {
            return Err(MarksValidationError::OutOfRange { max_marks });
        }

        Ok(())
    }
}

/// Letter grade for a score, by percentage of `max_marks`.
pub fn grade(marks: f64, max_marks: u32) -> Option<&'static str> {
    if max_marks == 0 || !marks.is_finite() {
        return None;
    }

    let percentage = marks / f64::from(max_marks) * 100.0;
    Some(match percentage {
        p if p >= 90.0 => "A+",
        p if p >= 80.0 => "A",
        p if p >= 70.0 => "B+",
        p if p >= 60.0 => "B",
        p if p >= 50.0 => "C+",
        p if p >= 40.0 => "C",
        p if p >= 35.0 => "D",
        _ => "F",
    })
}
