/*
 * Responsibility
 * - customer profiles の request/response DTO
 * - request は検証済みドメイン型 (NewProfile / ProfileChanges) に変換してから service に渡す
 */
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::profiles::{NewProfile, Profile, ProfileChanges, ValidationError};

// Fields are optional on the wire so a missing field is a 400 from validation,
// not a deserialization rejection.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl CreateProfileRequest {
    pub fn into_new_profile(self) -> Result<NewProfile, ValidationError> {
        NewProfile::new(self.first_name, self.last_name, self.email)
    }
}

// `email` is not accepted here; unknown fields are ignored.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ChangeProfileRequest {
    pub fn into_changes(self) -> Result<ProfileChanges, ValidationError> {
        ProfileChanges::new(self.first_name, self.last_name)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            first_name: p.first_name,
            last_name: p.last_name,
            email: p.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_without_email_fails_validation() {
        let req: CreateProfileRequest =
            serde_json::from_str(r#"{"firstName": "Joe", "lastName": "Doe"}"#).unwrap();

        assert_eq!(
            req.into_new_profile(),
            Err(ValidationError::Required("email"))
        );
    }

    #[test]
    fn change_request_ignores_email() {
        let req: ChangeProfileRequest =
            serde_json::from_str(r#"{"firstName": "Jane", "email": "new@test.org"}"#).unwrap();

        let changes = req.into_changes().unwrap();
        assert_eq!(changes.first_name(), Some("Jane"));
        assert_eq!(changes.last_name(), None);
    }

    #[test]
    fn response_uses_camel_case() {
        let res = ProfileResponse {
            id: "profile-id".to_string(),
            first_name: "Joe".to_string(),
            last_name: "Doe".to_string(),
            email: "joe.doe@test.org".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&res).unwrap(),
            serde_json::json!({
                "id": "profile-id",
                "firstName": "Joe",
                "lastName": "Doe",
                "email": "joe.doe@test.org",
            })
        );
    }
}
