//! Domain records and request payloads for the pawlog API.
//!
//! # Design
//! Field names follow the backend's camelCase JSON. Dates are calendar dates
//! (`"2020-05-15"`). Patch payloads carry `Option` fields that are skipped
//! when absent, so a serialized patch contains exactly the fields the caller
//! wants changed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A caregiver account.
///
/// `password` is only ever populated inside the mock store; records handed
/// back to callers have it stripped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl User {
    /// Copy of this user with the credential field removed.
    pub fn sanitized(&self) -> Self {
        Self {
            password: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cat {
    pub id: u64,
    pub name: String,
    pub birth_date: NaiveDate,
    pub breed: String,
    pub temperament: Vec<String>,
    pub profile_picture: String,
}

/// A single health observation. Energy level is 1-5 by convention only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthLog {
    pub id: u64,
    pub date: NaiveDate,
    pub litter_box_habits: String,
    pub energy_level: u8,
    pub skin_condition: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentActivity {
    pub id: u64,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_tried: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enjoyment_rating: Option<u8>,
}

/// Backend-generated idea for a new activity. Never authored by users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnrichmentSuggestion {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub reason: String,
}

/// Returned by login and signup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Uniform error shape surfaced to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Partial update for a user. Only the fields present are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserPatch {
    /// Shallow merge: provided fields replace, omitted fields persist.
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password) = self.password {
            user.password = Some(password);
        }
    }
}

/// Partial update for a cat. Only the fields present are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperament: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl CatPatch {
    pub fn apply(self, cat: &mut Cat) {
        if let Some(name) = self.name {
            cat.name = name;
        }
        if let Some(birth_date) = self.birth_date {
            cat.birth_date = birth_date;
        }
        if let Some(breed) = self.breed {
            cat.breed = breed;
        }
        if let Some(temperament) = self.temperament {
            cat.temperament = temperament;
        }
        if let Some(profile_picture) = self.profile_picture {
            cat.profile_picture = profile_picture;
        }
    }
}

/// Payload for a new health log; the id is assigned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewHealthLog {
    pub date: NaiveDate,
    pub litter_box_habits: String,
    pub energy_level: u8,
    pub skin_condition: String,
    pub notes: String,
}

impl NewHealthLog {
    pub fn with_id(self, id: u64) -> HealthLog {
        HealthLog {
            id,
            date: self.date,
            litter_box_habits: self.litter_box_habits,
            energy_level: self.energy_level,
            skin_condition: self.skin_condition,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewEnrichmentActivity {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_tried: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enjoyment_rating: Option<u8>,
}

impl NewEnrichmentActivity {
    pub fn with_id(self, id: u64) -> EnrichmentActivity {
        EnrichmentActivity {
            id,
            name: self.name,
            description: self.description,
            last_tried: self.last_tried,
            enjoyment_rating: self.enjoyment_rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whiskers() -> Cat {
        Cat {
            id: 1,
            name: "Whiskers".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2020, 5, 15).unwrap(),
            breed: "Domestic Shorthair".to_string(),
            temperament: vec!["calm".to_string(), "affectionate".to_string()],
            profile_picture: "https://example.com/whiskers.jpg".to_string(),
        }
    }

    #[test]
    fn cat_serializes_with_camel_case_fields() {
        let json = serde_json::to_value(whiskers()).unwrap();
        assert_eq!(json["birthDate"], "2020-05-15");
        assert_eq!(json["profilePicture"], "https://example.com/whiskers.jpg");
        assert!(json.get("birth_date").is_none());
    }

    #[test]
    fn user_password_is_omitted_when_absent() {
        let user = User {
            id: 1,
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            password: Some("cat123".to_string()),
        };
        let json = serde_json::to_value(user.sanitized()).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "john@example.com");
    }

    #[test]
    fn cat_patch_only_serializes_present_fields() {
        let patch = CatPatch {
            breed: Some("Tabby".to_string()),
            ..CatPatch::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "breed": "Tabby" }));
    }

    #[test]
    fn cat_patch_preserves_omitted_fields() {
        let mut cat = whiskers();
        CatPatch {
            name: Some("X".to_string()),
            ..CatPatch::default()
        }
        .apply(&mut cat);
        assert_eq!(
            cat,
            Cat {
                name: "X".to_string(),
                ..whiskers()
            }
        );
    }

    #[test]
    fn activity_optional_fields_default_to_none() {
        let activity: EnrichmentActivity = serde_json::from_str(
            r#"{"id":3,"name":"Box","description":"A cardboard box"}"#,
        )
        .unwrap();
        assert!(activity.last_tried.is_none());
        assert!(activity.enjoyment_rating.is_none());
    }

    #[test]
    fn signup_request_uses_password_confirmation_key() {
        let input: SignupRequest = serde_json::from_str(
            r#"{"name":"A","email":"a@b.c","password":"p","passwordConfirmation":"p"}"#,
        )
        .unwrap();
        assert_eq!(input.password_confirmation, "p");
    }
}
