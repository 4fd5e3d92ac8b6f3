use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Why a profile cannot be used for plan generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("profile field `{0}` is missing")]
    Incomplete(&'static str),
    #[error("profile field `{0}` must be positive and non-empty")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DietaryPreference {
    Vegan,
    NonVegan,
}

impl DietaryPreference {
    /// `vegan` or `yes` (any case) means vegan; everything else does not.
    pub fn from_field(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "vegan" | "yes" => Self::Vegan,
            _ => Self::NonVegan,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vegan => "vegan",
            Self::NonVegan => "non_vegan",
        }
    }

    pub fn is_vegan(self) -> bool {
        self == Self::Vegan
    }
}

/// Biometric profile a plan is generated from.
///
/// Gender, activity level and goal keep the user's raw wording: the
/// calculator and prompt builder classify them on the raw string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub age: u32,
    pub gender: String,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub dietary_preference: DietaryPreference,
    pub activity_level: String,
    pub goal: String,
}

/// Row in `user_profiles`. Every column is nullable until the user fills it in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredProfile {
    pub user_id: Uuid,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub dietary_preference: Option<String>,
    pub activity_level: Option<String>,
    pub goal: Option<String>,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<StoredProfile> for UserProfile {
    type Error = ProfileError;

    fn try_from(row: StoredProfile) -> Result<Self, Self::Error> {
        let age = row.age.ok_or(ProfileError::Incomplete("age"))?;
        let weight_kg = row.weight_kg.ok_or(ProfileError::Incomplete("weight_kg"))?;
        let height_cm = row.height_cm.ok_or(ProfileError::Incomplete("height_cm"))?;
        let gender = required_text(row.gender, "gender")?;
        let activity_level = required_text(row.activity_level, "activity_level")?;
        let goal = required_text(row.goal, "goal")?;
        let dietary_preference = row
            .dietary_preference
            .as_deref()
            .map(DietaryPreference::from_field)
            .ok_or(ProfileError::Incomplete("dietary_preference"))?;

        let age = u32::try_from(age)
            .ok()
            .filter(|a| *a > 0)
            .ok_or(ProfileError::Invalid("age"))?;
        ensure_positive(weight_kg, "weight_kg")?;
        ensure_positive(height_cm, "height_cm")?;

        Ok(Self {
            age,
            gender,
            weight_kg,
            height_cm,
            dietary_preference,
            activity_level,
            goal,
        })
    }
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, ProfileError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(ProfileError::Invalid(field)),
        None => Err(ProfileError::Incomplete(field)),
    }
}

fn ensure_positive(value: f64, field: &'static str) -> Result<(), ProfileError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ProfileError::Invalid(field))
    }
}

/// Body of `PUT /profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    pub age: i32,
    pub gender: String,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub dietary_preference: String,
    pub activity_level: String,
    pub goal: String,
}

impl UpdateProfileRequest {
    /// Trims text fields and rejects values the calculator cannot work with.
    ///
    /// The activity level is not checked against the known keys: unknown
    /// levels are stored as given and fall back to sedentary at calculation time.
    pub fn normalize(mut self) -> Result<Self, ProfileError> {
        if self.age <= 0 {
            return Err(ProfileError::Invalid("age"));
        }
        ensure_positive(self.weight_kg, "weight_kg")?;
        ensure_positive(self.height_cm, "height_cm")?;

        self.gender = self.gender.trim().to_string();
        self.activity_level = self.activity_level.trim().to_string();
        self.goal = self.goal.trim().to_string();
        for (value, field) in [
            (&self.gender, "gender"),
            (&self.activity_level, "activity_level"),
            (&self.goal, "goal"),
        ] {
            if value.is_empty() {
                return Err(ProfileError::Invalid(field));
            }
        }
        self.dietary_preference = DietaryPreference::from_field(&self.dietary_preference)
            .as_str()
            .to_string();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> StoredProfile {
        StoredProfile {
            user_id: Uuid::new_v4(),
            age: Some(30),
            gender: Some("female".into()),
            weight_kg: Some(60.0),
            height_cm: Some(165.0),
            dietary_preference: Some("vegan".into()),
            activity_level: Some("moderate".into()),
            goal: Some("weight_loss".into()),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn complete_row_converts() {
        let profile = UserProfile::try_from(row()).expect("complete row");
        assert_eq!(profile.age, 30);
        assert_eq!(profile.dietary_preference, DietaryPreference::Vegan);
        assert_eq!(profile.activity_level, "moderate");
    }

    #[test]
    fn missing_fields_are_reported_by_name() {
        let mut r = row();
        r.height_cm = None;
        assert_eq!(
            UserProfile::try_from(r).unwrap_err(),
            ProfileError::Incomplete("height_cm")
        );

        let mut r = row();
        r.goal = None;
        assert_eq!(
            UserProfile::try_from(r).unwrap_err(),
            ProfileError::Incomplete("goal")
        );
    }

    #[test]
    fn non_positive_numbers_are_invalid() {
        let mut r = row();
        r.weight_kg = Some(0.0);
        assert_eq!(
            UserProfile::try_from(r).unwrap_err(),
            ProfileError::Invalid("weight_kg")
        );

        let mut r = row();
        r.age = Some(-4);
        assert_eq!(UserProfile::try_from(r).unwrap_err(), ProfileError::Invalid("age"));
    }

    #[test]
    fn dietary_preference_accepts_legacy_yes() {
        assert_eq!(DietaryPreference::from_field("Yes"), DietaryPreference::Vegan);
        assert_eq!(DietaryPreference::from_field("VEGAN"), DietaryPreference::Vegan);
        assert_eq!(DietaryPreference::from_field("no"), DietaryPreference::NonVegan);
        assert_eq!(DietaryPreference::from_field(""), DietaryPreference::NonVegan);
    }

    #[test]
    fn normalize_trims_and_keeps_unknown_activity_level() {
        let req = UpdateProfileRequest {
            age: 41,
            gender: " Male ".into(),
            weight_kg: 82.5,
            height_cm: 180.0,
            dietary_preference: "yes".into(),
            activity_level: " couch ".into(),
            goal: "bulk".into(),
        }
        .normalize()
        .expect("valid request");
        assert_eq!(req.gender, "Male");
        assert_eq!(req.activity_level, "couch");
        assert_eq!(req.dietary_preference, "vegan");
    }

    #[test]
    fn normalize_rejects_bad_values() {
        let base = UpdateProfileRequest {
            age: 41,
            gender: "male".into(),
            weight_kg: 82.5,
            height_cm: 180.0,
            dietary_preference: "no".into(),
            activity_level: "light".into(),
            goal: "weight_gain".into(),
        };

        let mut bad = base.clone();
        bad.height_cm = -1.0;
        assert_eq!(bad.normalize().unwrap_err(), ProfileError::Invalid("height_cm"));

        let mut bad = base.clone();
        bad.age = 0;
        assert_eq!(bad.normalize().unwrap_err(), ProfileError::Invalid("age"));

        let mut bad = base;
        bad.goal = "   ".into();
        assert_eq!(bad.normalize().unwrap_err(), ProfileError::Invalid("goal"));
    }
}
