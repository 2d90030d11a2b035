//! A line-oriented frontend over the client.

use ams_client::{
    announcement,
    apply::{ApplicationState, JobApplication, Upload},
    exam::{self, MarkSheet},
    form::RegistrationForm,
    guard::Decision,
    session::AuthOutcome,
    Error, Notifier, Role, SessionStore, View,
};
use ams_shared::account::DEPARTMENTS;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
commands:
  login <email> <password>
  register student <email> <password> <roll-number> <department> <year> <name..>
  register <teacher|admin> <email> <password> <name..>
  logout
  whoami
  open <path>               render a view, e.g. /announcements
  announcements
  applicants <id>
  apply <id> [<file>]       upload a resume for a job announcement
  submit                    submit the uploaded application
  marks <test-id> <max>     load the marks sheet of a test
  mark <student-id> <marks|-> [<remarks..>]
  submit-marks
  notifications
  close <notification-id>
  quit";

pub struct Shell {
    session: SessionStore,
    notifier: Notifier,
    application: Option<JobApplication>,
    marks: Option<MarkSheet>,
    /// Highest notification id already printed.
    seen: Option<u64>,
}

impl Shell {
    pub fn new(session: SessionStore, notifier: Notifier) -> Self {
        Self {
            session,
            notifier,
            application: None,
            marks: None,
            seen: None,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        self.render(self.session.context().navigator().current())
            .await;
        println!("type `help` for commands");

        while let Some(line) = lines.next_line().await? {
            let args: Vec<&str> = line.split_whitespace().collect();
            let Some((&command, args)) = args.split_first() else {
                continue;
            };

            match command {
                "quit" | "exit" => break,
                "help" => println!("{HELP}"),
                _ => {
                    if let Err(err) = self.dispatch(command, args).await {
                        println!("error: {err}");
                    }
                }
            }

            self.flush_notifications();
        }

        Ok(())
    }

    async fn dispatch(&mut self, command: &str, args: &[&str]) -> anyhow::Result<()> {
        debug!("command {command} {args:?}");

        match (command, args) {
            ("login", [email, password]) => {
                match self.session.login(email, password).await? {
                    AuthOutcome::Success(user) => {
                        println!("welcome, {} ({})", user.name, user.role);
                        self.open(View::LANDING).await;
                    }
                    AuthOutcome::Failure(reason) => println!("login failed: {reason}"),
                }
            }
            ("register", [role, email, password, rest @ ..]) => {
                let form = registration(role, email, password, rest)?;
                match self.session.register(&form).await {
                    Ok(AuthOutcome::Success(user)) => {
                        println!("registered {} ({})", user.name, user.role);
                        self.open(View::LANDING).await;
                    }
                    Ok(AuthOutcome::Failure(reason)) => println!("registration failed: {reason}"),
                    Err(ams_client::Error::Registration(errors)) => {
                        for error in errors.0 {
                            println!("  {}: {}", error.field, error.message);
                        }
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            ("logout", []) => {
                self.application = None;
                self.marks = None;
                let cleared = self.session.logout();
                self.render(View::ENTRY).await;
                cleared?;
            }
            ("whoami", []) => match self.session.state().user() {
                Some(user) => println!(
                    "{} <{}> {} {}",
                    user.name,
                    user.email,
                    user.role,
                    user.department.as_deref().unwrap_or("")
                ),
                None => println!("not logged in"),
            },
            ("open", [path]) => match View::from_path(path) {
                Some(view) => self.open(view).await,
                None => println!("no such view: {path}"),
            },
            ("announcements", []) => self.open(View::Announcements).await,
            ("applicants", [id]) => {
                let cx = self.session.context();
                let Ok(applicants) = announcement::applicants(cx, &self.notifier, id).await else {
                    return Ok(());
                };
                if applicants.is_empty() {
                    println!("no applicants yet");
                }
                for applicant in applicants {
                    println!(
                        "{} <{}> {} resume: {} applied {}",
                        applicant.student.name,
                        applicant.student.email,
                        applicant.student.roll_number.as_deref().unwrap_or("-"),
                        applicant.resume.as_deref().unwrap_or("-"),
                        applicant.applied_at.format("%Y-%m-%d"),
                    );
                }
            }
            ("apply", [id, file @ ..]) => {
                let file = file.first().copied();
                self.apply(id, file).await?;
            }
            ("submit", []) => match self.application {
                Some(ref mut application) => {
                    application.submit().await.or_else(unreported)?;
                    if matches!(application.state(), ApplicationState::Submitted) {
                        self.application = None;
                    }
                }
                None => println!("nothing to submit, use `apply` first"),
            },
            ("marks", [test_id, max]) => {
                let max = max.parse()?;
                let cx = self.session.context();
                if let Ok(sheet) = exam::load_marks(cx, &self.notifier, test_id, max).await {
                    print_sheet(&sheet);
                    self.marks = Some(sheet);
                }
            }
            ("mark", [student_id, marks, remarks @ ..]) => {
                let Some(ref mut sheet) = self.marks else {
                    println!("no marks sheet open, use `marks` first");
                    return Ok(());
                };
                let marks = match *marks {
                    "-" => None,
                    marks => Some(marks.parse()?),
                };
                if !sheet.set(student_id, marks, &remarks.join(" ")) {
                    println!("no such student on this sheet");
                }
            }
            ("submit-marks", []) => match self.marks {
                Some(ref sheet) => {
                    let cx = self.session.context();
                    let submitted = exam::submit_marks(cx, &self.notifier, sheet).await;
                    if submitted.is_ok() {
                        self.marks = None;
                    }
                }
                None => println!("no marks sheet open, use `marks` first"),
            },
            ("notifications", []) => {
                for n in self.notifier.active() {
                    println!("#{} [{:?}] {}: {}", n.id, n.kind, n.title, n.message);
                }
            }
            ("close", [id]) => {
                if !self.notifier.close(id.parse()?) {
                    println!("no such notification");
                }
            }
            _ => println!("unknown command, type `help`"),
        }

        Ok(())
    }

    async fn apply(&mut self, id: &str, file: Option<&str>) -> anyhow::Result<()> {
        let reuse = self
            .application
            .as_ref()
            .is_some_and(|a| a.announcement_id() == id);
        if !reuse {
            self.application = Some(JobApplication::new(
                self.session.context().clone(),
                self.notifier.clone(),
                id,
            ));
        }
        let Some(ref mut application) = self.application else {
            return Ok(());
        };

        if let Some(path) = file {
            if let Err(err) = application.select_path(path).await {
                return unreported(err);
            }
        }

        if let ApplicationState::Uploaded(uploaded) = application.state() {
            println!("{} already uploaded, use `submit`", uploaded.file_name);
            return Ok(());
        }

        match application.upload().await {
            Ok(Upload::NeedsFile) => println!("choose a resume: apply {id} <file>"),
            Ok(Upload::Done) => println!("use `submit` to send the application"),
            Err(err) => unreported(err)?,
        }
        Ok(())
    }

    async fn open(&self, view: View) {
        let state = self.session.state();
        let navigator = self.session.context().navigator();
        match navigator.open(view, &state) {
            Decision::Loading => println!("loading..."),
            Decision::Authorized(view) => self.render(view).await,
            Decision::Redirect(to) => {
                println!("{} is not available, redirected", view.path());
                self.render(to).await;
            }
        }
    }

    async fn render(&self, view: View) {
        println!("== {} ==", view.path());

        if view != View::Announcements {
            return;
        }

        match announcement::list(self.session.context(), &self.notifier).await {
            Ok(announcements) if announcements.is_empty() => println!("no announcements"),
            Ok(announcements) => {
                for a in announcements {
                    println!(
                        "{} [{}] {} by {} on {}",
                        a.id,
                        a.kind.as_str(),
                        a.title,
                        a.publisher_name(),
                        a.created_at.format("%Y-%m-%d")
                    );
                    println!("    {}", a.body);
                }
            }
            Err(_) => {}
        }
    }

    fn flush_notifications(&mut self) {
        for n in self.notifier.active() {
            if self.seen.is_some_and(|seen| n.id <= seen) {
                continue;
            }
            println!("[{:?}] {}: {}", n.kind, n.title, n.message);
            self.seen = Some(n.id);
        }
    }
}

/// Passes on the errors that were not already shown as a notification.
fn unreported(err: Error) -> anyhow::Result<()> {
    match err {
        Error::FlowState(_) | Error::Io(_) => Err(err.into()),
        _ => Ok(()),
    }
}

fn print_sheet(sheet: &MarkSheet) {
    let recorded = if sheet.has_recorded() {
        ", marks on record"
    } else {
        ""
    };
    println!("test {} out of {}{recorded}", sheet.test_id(), sheet.max_marks());
    for row in sheet.rows() {
        let marks = row.marks_obtained.map(|marks| marks.to_string());
        let grade = row
            .marks_obtained
            .and_then(|marks| ams_shared::exam::grade(marks, sheet.max_marks()));
        println!(
            "  {} {} {} {} {}",
            row.student.id,
            row.student.name,
            row.student.roll_number.as_deref().unwrap_or("-"),
            marks.as_deref().unwrap_or("-"),
            grade.unwrap_or(""),
        );
    }
}

fn registration(
    role: &str,
    email: &str,
    password: &str,
    rest: &[&str],
) -> anyhow::Result<RegistrationForm> {
    let role: Role = role.parse()?;
    let mut form = RegistrationForm {
        email: email.to_owned(),
        password: password.to_owned(),
        confirm_password: password.to_owned(),
        role,
        ..Default::default()
    };

    let name = match (role, rest) {
        (Role::Student, [roll_number, department, year, name @ ..]) => {
            form.roll_number = (*roll_number).to_owned();
            form.department = department_named(department)?.to_owned();
            form.year = Some(year.parse()?);
            name
        }
        (Role::Student, _) => anyhow::bail!("students need a roll number, department and year"),
        (Role::Teacher | Role::Admin, name) => name,
    };
    form.name = name.join(" ");

    Ok(form)
}

/// Matches a department ignoring case, with `_` standing for a space.
fn department_named(input: &str) -> anyhow::Result<&'static str> {
    let input = input.replace('_', " ");
    DEPARTMENTS
        .into_iter()
        .find(|dept| dept.eq_ignore_ascii_case(&input))
        .ok_or_else(|| anyhow::anyhow!("unknown department, one of: {}", DEPARTMENTS.join(", ")))
}
