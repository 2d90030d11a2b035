//! Client-side validation of the registration form.

use std::fmt::Display;

use ams_shared::account::{
    handle::{RegisterDescriptor, StudentProfile},
    Address, Role,
};

/// A message attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every invalid field of a form, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// The message for a field, if it is invalid.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", err.field, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Raw input of the sign-up form.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
    pub roll_number: String,
    pub department: String,
    pub year: Option<u8>,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            role: Role::Student,
            roll_number: String::new(),
            department: String::new(),
            year: None,
        }
    }
}

impl RegistrationForm {
    /// Validates every field and builds the request payload.
    ///
    /// Students must provide a roll number, department and year.
    pub fn validate(&self) -> Result<RegisterDescriptor, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push("name", "Name is required");
        } else if name.chars().count() < 2 {
            errors.push("name", "Name must be at least 2 characters");
        }

        let email = self.email.trim().to_lowercase();
        let address = if email.is_empty() {
            errors.push("email", "Email is required");
            None
        } else {
            match email.parse::<Address>() {
                Ok(address) => Some(address),
                Err(_) => {
                    errors.push("email", "Please enter a valid email address");
                    None
                }
            }
        };

        if self.password.is_empty() {
            errors.push("password", "Password is required");
        } else if self.password.chars().count() < 6 {
            errors.push("password", "Password must be at least 6 characters");
        }

        if self.password != self.confirm_password {
            errors.push("confirmPassword", "Passwords do not match");
        }

        let student = match self.role {
            Role::Student => {
                let roll_number = self.roll_number.trim();
                if roll_number.is_empty() {
                    errors.push("rollNumber", "Roll number is required");
                }
                if self.department.trim().is_empty() {
                    errors.push("department", "Department is required");
                }
                match self.year {
                    None => errors.push("year", "Year is required"),
                    Some(year) if !(1..=4).contains(&year) => {
                        errors.push("year", "Year must be between 1 and 4")
                    }
                    Some(_) => {}
                }

                Some(StudentProfile {
                    roll_number: roll_number.to_owned(),
                    department: self.department.trim().to_owned(),
                    year: self.year.unwrap_or_default(),
                })
            }
            Role::Admin | Role::Teacher => None,
        };

        match address {
            Some(email) if errors.is_empty() => Ok(RegisterDescriptor {
                name: name.to_owned(),
                email,
                password: self.password.clone(),
                role: self.role,
                student,
            }),
            _ => Err(errors),
        }
    }
}
