use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::users::{
    dto::{CreateUserInput, Patch, UpdateUserInput},
    repo_types::{NewUser, UserChanges},
};

const MIN_TEXT_LEN: usize = 2;

/// One rejected input field. `field` uses the JSON key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn is_valid_e164(phone: &str) -> bool {
    lazy_static! {
        static ref E164_RE: Regex = Regex::new(r"^\+[1-9]?[0-9]{7,14}$").unwrap();
    }
    E164_RE.is_match(phone)
}

// Empty input passes; required-ness is checked separately.
fn email_ok(email: &str) -> bool {
    email.is_empty() || is_valid_email(email)
}

fn phone_ok(phone: &str) -> bool {
    phone.is_empty() || is_valid_e164(phone)
}

fn too_short(s: &str) -> bool {
    s.chars().count() < MIN_TEXT_LEN
}

struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn new() -> Self {
        Self { errors: Vec::new() }
    }

    fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    fn required<T>(&mut self, field: &'static str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.fail(field, format!("{field} is required"));
        }
        value
    }

    /// Absent and empty strings both mean "leave unchanged".
    fn optional_text(&mut self, field: &'static str, value: Patch<String>) -> Option<String> {
        match value {
            Patch::Absent => None,
            Patch::Null => {
                self.fail(field, format!("{field} cannot be null"));
                None
            }
            Patch::Value(v) if v.is_empty() => None,
            Patch::Value(v) => Some(v),
        }
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(self.errors)
        }
    }
}

fn check_name(c: &mut Checker, name: &str) {
    if too_short(name) {
        c.fail("name", "Name should be more than 1 char");
    }
}

fn check_email(c: &mut Checker, email: &str) {
    if !email_ok(email) {
        c.fail("email", "Email is not a valid email address");
    }
}

fn check_address(c: &mut Checker, address: &str) {
    if too_short(address) {
        c.fail("address", "Address should be more than 1 char");
    }
}

fn check_age(c: &mut Checker, age: i16) {
    if age < 0 {
        c.fail("age", "Age cannot be negative");
    }
}

fn check_phone(c: &mut Checker, phone: &str) {
    if !phone_ok(phone) {
        c.fail("phoneNumber", "Phone number is not a valid E.164 number");
    }
}

/// Checks a create body in field declaration order and reports every failure.
pub fn validate_create(input: CreateUserInput) -> Result<NewUser, Vec<FieldError>> {
    let mut c = Checker::new();

    let name = c.required("name", input.name.filter(|s| !s.is_empty()));
    if let Some(name) = &name {
        check_name(&mut c, name);
    }
    let email = c.required("email", input.email.filter(|s| !s.is_empty()));
    if let Some(email) = &email {
        check_email(&mut c, email);
    }
    let address = c.required("address", input.address.filter(|s| !s.is_empty()));
    if let Some(address) = &address {
        check_address(&mut c, address);
    }
    let age = c.required("age", input.age);
    if let Some(age) = age {
        check_age(&mut c, age);
    }
    let phone_number = c.required("phoneNumber", input.phone_number.filter(|s| !s.is_empty()));
    if let Some(phone) = &phone_number {
        check_phone(&mut c, phone);
    }

    c.finish(|| NewUser {
        name: name.unwrap_or_default(),
        email: email.unwrap_or_default(),
        address: address.unwrap_or_default(),
        age: age.unwrap_or_default(),
        phone_number: phone_number.unwrap_or_default(),
    })
}

/// Checks a partial update. Only provided, non-empty fields end up in the changes.
pub fn validate_update(input: UpdateUserInput) -> Result<UserChanges, Vec<FieldError>> {
    let mut c = Checker::new();

    let name = c.optional_text("name", input.name);
    if let Some(name) = &name {
        check_name(&mut c, name);
    }
    let email = c.optional_text("email", input.email);
    if let Some(email) = &email {
        check_email(&mut c, email);
    }
    let address = c.optional_text("address", input.address);
    if let Some(address) = &address {
        check_address(&mut c, address);
    }
    let age = match input.age {
        Patch::Absent => None,
        Patch::Null => {
            c.fail("age", "age cannot be null");
            None
        }
        Patch::Value(age) => {
            check_age(&mut c, age);
            Some(age)
        }
    };
    let phone_number = c.optional_text("phoneNumber", input.phone_number);
    if let Some(phone) = &phone_number {
        check_phone(&mut c, phone);
    }

    c.finish(|| UserChanges {
        name,
        email,
        address,
        age,
        phone_number,
    })
}
