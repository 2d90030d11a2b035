use ams_shared::exam::{MarkEntry, MarksDescriptor, StudentSummary, StudentsQuery, TestDescriptor};
use tracing::{info, warn};

use crate::{raw, Context, Error, Notifier};

/// Validates and creates a test, reporting the outcome as a notification.
///
/// Invalid input is rejected before any request is sent.
pub async fn create_test(
    cx: &Context,
    notifier: &Notifier,
    descriptor: TestDescriptor,
) -> Result<(), Error> {
    let descriptor = descriptor.normalized();

    if let Err(errors) = descriptor.validate() {
        notifier.error("Validation Error", errors.to_string());
        return Err(errors.into());
    }

    match raw::call(raw::exam::CreateTest { descriptor }, cx).await {
        Ok(_) => {
            info!("test created");
            notifier.success("Success", "Test created successfully");
            Ok(())
        }
        Err(err) => {
            notifier.report("Error", &err, "Failed to save test");
            Err(err)
        }
    }
}

/// Upper bound on students fetched for one marks sheet.
const STUDENT_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct MarkRow {
    pub student: StudentSummary,
    /// `None` until marks are entered or loaded.
    pub marks_obtained: Option<f64>,
    pub remarks: String,
}

/// Marks entry for one test: every student with any marks already on record.
#[derive(Debug, Clone)]
pub struct MarkSheet {
    test_id: String,
    max_marks: u32,
    has_recorded: bool,
    rows: Vec<MarkRow>,
}

impl MarkSheet {
    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    pub fn max_marks(&self) -> u32 {
        self.max_marks
    }

    /// Whether the backend already held marks for this test when loaded.
    pub fn has_recorded(&self) -> bool {
        self.has_recorded
    }

    pub fn rows(&self) -> &[MarkRow] {
        &self.rows
    }

    /// Sets or clears the marks of a student. Returns false for unknown ids.
    pub fn set(&mut self, student_id: &str, marks_obtained: Option<f64>, remarks: &str) -> bool {
        match self.rows.iter_mut().find(|row| row.student.id == student_id) {
            Some(row) => {
                row.marks_obtained = marks_obtained;
                row.remarks = remarks.to_owned();
                true
            }
            None => false,
        }
    }

    /// The rows that carry marks, as the submission payload.
    pub fn descriptor(&self) -> MarksDescriptor {
        MarksDescriptor {
            results: self
                .rows
                .iter()
                .filter_map(|row| {
                    row.marks_obtained.map(|marks_obtained| MarkEntry {
                        student: row.student.id.clone(),
                        marks_obtained,
                        remarks: row.remarks.trim().to_owned(),
                    })
                })
                .collect(),
        }
    }
}

/// Loads the students and the marks already recorded for a test.
///
/// Both lists are fetched concurrently. Without students there is nothing
/// to enter, so that failure is reported; a failed marks lookup only means
/// the sheet starts empty.
pub async fn load_marks(
    cx: &Context,
    notifier: &Notifier,
    test_id: &str,
    max_marks: u32,
) -> Result<MarkSheet, Error> {
    let students = raw::call(
        raw::exam::Students {
            query: StudentsQuery {
                limit: STUDENT_LIMIT,
            },
        },
        cx,
    );
    let recorded = raw::call(raw::exam::TestMarks { id: test_id }, cx);
    let (students, recorded) = tokio::join!(students, recorded);

    let students = match students {
        Ok(students) => students,
        Err(err) => {
            notifier.report("Error", &err, "Failed to load students and marks");
            return Err(err);
        }
    };
    let recorded = recorded.unwrap_or_else(|err| {
        warn!("no recorded marks for test {test_id}: {err}");
        Vec::new()
    });

    let rows = students
        .into_iter()
        .map(|student| {
            let mark = recorded.iter().find(|mark| mark.student_id == student.id);
            MarkRow {
                marks_obtained: mark.map(|mark| mark.marks_obtained),
                remarks: mark.map(|mark| mark.remarks.clone()).unwrap_or_default(),
                student,
            }
        })
        .collect();

    Ok(MarkSheet {
        test_id: test_id.to_owned(),
        max_marks,
        has_recorded: !recorded.is_empty(),
        rows,
    })
}

/// Validates and submits a marks sheet. Returns how many results were stored.
pub async fn submit_marks(
    cx: &Context,
    notifier: &Notifier,
    sheet: &MarkSheet,
) -> Result<usize, Error> {
    let descriptor = sheet.descriptor();

    if let Err(err) = descriptor.validate(sheet.max_marks) {
        notifier.error("Error", err.to_string());
        return Err(err.into());
    }

    let req = raw::exam::SubmitMarks {
        id: &sheet.test_id,
        descriptor: &descriptor,
    };
    match raw::call(req, cx).await {
        Ok(res) => {
            let processed = res.processed.unwrap_or(descriptor.results.len());
            let verb = if sheet.has_recorded {
                "updated"
            } else {
                "submitted"
            };
            info!("marks {verb} for test {}", sheet.test_id);
            notifier.success("Success", format!("Marks {verb} for {processed} students"));
            Ok(processed)
        }
        Err(err) => {
            notifier.report("Error", &err, "Failed to submit marks");
            Err(err)
        }
    }
}
