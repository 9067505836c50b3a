use crate::utils::{
    error::AppError,
    validation::{is_valid_email, is_valid_mobile, required},
};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            other => Err(format!("`{}` is not one of Male, Female", other)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Status {
    Active,
    Inactive,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
        }
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Status::Active),
            "Inactive" => Ok(Status::Inactive),
            other => Err(format!("`{}` is not one of Active, Inactive", other)),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User record (armazenado no MongoDB, coleção `users`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
    pub gender: Gender,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub location: String,
}

impl User {
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

/// Raw text fields of a create/update request, before validation.
///
/// Filled either from a JSON body or from the text parts of a multipart form.
/// There is no `profile` field: only an uploaded file sets the profile path.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    #[schema(example = "Male")]
    pub gender: Option<String>,
    #[schema(example = "Active")]
    pub status: Option<String>,
    pub location: Option<String>,
}

impl UserForm {
    /// Sets a field by its wire name. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        match name {
            "firstName" => self.first_name = Some(value),
            "lastName" => self.last_name = Some(value),
            "email" => self.email = Some(value),
            "mobile" => self.mobile = Some(value),
            "gender" => self.gender = Some(value),
            "status" => self.status = Some(value),
            "location" => self.location = Some(value),
            _ => {}
        }
    }

    /// Validates a complete record for creation.
    pub fn into_user(self) -> Result<User, AppError> {
        let mut errors = FieldErrors::default();

        let first_name = errors.require("firstName", self.first_name);
        let last_name = errors.require("lastName", self.last_name);
        let email = errors.require("email", self.email).and_then(|v| errors.email(v));
        let mobile = errors.require("mobile", self.mobile).and_then(|v| errors.mobile(v));
        let gender = errors
            .require("gender", self.gender)
            .and_then(|v| errors.parse::<Gender>("gender", v));
        let status = errors
            .require("status", self.status)
            .and_then(|v| errors.parse::<Status>("status", v));
        let location = errors.require("location", self.location);

        errors.into_result()?;

        match (first_name, last_name, email, mobile, gender, status, location) {
            (
                Some(first_name),
                Some(last_name),
                Some(email),
                Some(mobile),
                Some(gender),
                Some(status),
                Some(location),
            ) => Ok(User {
                id: None,
                first_name,
                last_name,
                email,
                mobile,
                gender,
                status,
                profile: None,
                location,
            }),
            _ => Err(AppError::Validation("User validation failed".to_string())),
        }
    }

    /// Validates only the fields that were supplied.
    pub fn into_changes(self) -> Result<UserChanges, AppError> {
        let mut errors = FieldErrors::default();

        let first_name = self.first_name.and_then(|v| errors.require("firstName", Some(v)));
        let last_name = self.last_name.and_then(|v| errors.require("lastName", Some(v)));
        let email = self
            .email
            .and_then(|v| errors.require("email", Some(v)))
            .and_then(|v| errors.email(v));
        let mobile = self
            .mobile
            .and_then(|v| errors.require("mobile", Some(v)))
            .and_then(|v| errors.mobile(v));
        let gender = self
            .gender
            .and_then(|v| errors.require("gender", Some(v)))
            .and_then(|v| errors.parse::<Gender>("gender", v));
        let status = self
            .status
            .and_then(|v| errors.require("status", Some(v)))
            .and_then(|v| errors.parse::<Status>("status", v));
        let location = self.location.and_then(|v| errors.require("location", Some(v)));

        errors.into_result()?;

        Ok(UserChanges {
            first_name,
            last_name,
            email,
            mobile,
            gender,
            status,
            profile: None,
            location,
        })
    }
}

#[derive(Default)]
struct FieldErrors(Vec<String>);

impl FieldErrors {
    fn require(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let value = required(value);
        if value.is_none() {
            self.0.push(format!("{}: Path `{}` is required.", field, field));
        }
        value
    }

    fn email(&mut self, value: String) -> Option<String> {
        if is_valid_email(&value) {
            Some(value)
        } else {
            self.0.push(format!("email: {} is not a valid email!", value));
            None
        }
    }

    fn mobile(&mut self, value: String) -> Option<String> {
        if is_valid_mobile(&value) {
            Some(value)
        } else {
            self.0.push(format!("mobile: {} is not a valid 10-digit mobile number!", value));
            None
        }
    }

    fn parse<T: FromStr<Err = String>>(&mut self, field: &str, value: String) -> Option<T> {
        match value.parse::<T>() {
            Ok(v) => Some(v),
            Err(e) => {
                self.0.push(format!("{}: {}", field, e));
                None
            }
        }
    }

    fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "User validation failed: {}",
                self.0.join(", ")
            )))
        }
    }
}

/// Partial update: every `Some` field overwrites the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub gender: Option<Gender>,
    pub status: Option<Status>,
    pub profile: Option<String>,
    pub location: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        *self == UserChanges::default()
    }
}

/// User as returned by the API
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
    pub gender: Gender,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub location: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        UserResponse {
            id: u.id_hex(),
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            mobile: u.mobile,
            gender: u.gender,
            status: u.status,
            profile: u.profile,
            location: u.location,
        }
    }
}
