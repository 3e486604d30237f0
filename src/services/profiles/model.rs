/*
 * Responsibility
 * - customer profile のドメイン型
 * - NewProfile / ProfileChanges は検証済みでしか作れない (service には不正値が届かない)
 */
use thiserror::Error;

/// A persisted customer profile. Every field is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::Required(field)),
    }
}

/// Fields for a profile that does not exist yet; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    first_name: String,
    last_name: String,
    email: String,
}

impl NewProfile {
    pub fn new(
        first_name: Option<String>,
        last_name: Option<String>,
        email: Option<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            first_name: required("firstName", first_name)?,
            last_name: required("lastName", last_name)?,
            email: required("email", email)?,
        })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn into_profile(self, id: String) -> Profile {
        Profile {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        }
    }
}

/// Partial update. `None` leaves the stored value untouched.
///
/// There is deliberately no email field: email is fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    first_name: Option<String>,
    last_name: Option<String>,
}

impl ProfileChanges {
    pub fn new(
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Result<Self, ValidationError> {
        if let Some(name) = &first_name
            && name.trim().is_empty()
        {
            return Err(ValidationError::Empty("firstName"));
        }
        if let Some(name) = &last_name
            && name.trim().is_empty()
        {
            return Err(ValidationError::Empty("lastName"));
        }
        Ok(Self {
            first_name,
            last_name,
        })
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none()
    }

    /// Overwrite only the supplied fields of `profile`.
    pub fn apply_to(&self, profile: &mut Profile) {
        if let Some(first_name) = &self.first_name {
            profile.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &self.last_name {
            profile.last_name.clone_from(last_name);
        }
    }
}
