//! Mifflin-St Jeor energy estimates and the fixed macronutrient split.

use tracing::debug;

use crate::profile::UserProfile;

const SEDENTARY_FACTOR: f64 = 1.2;

const CARB_SHARE: f64 = 0.5;
const PROTEIN_SHARE: f64 = 0.2;
const FAT_SHARE: f64 = 0.3;

const KCAL_PER_G_CARB: f64 = 4.0;
const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// Case-insensitive lookup. `very_active`, `very active` and `very-active`
    /// all name the top level.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "sedentary" => Some(Self::Sedentary),
            "light" => Some(Self::Light),
            "moderate" => Some(Self::Moderate),
            "active" => Some(Self::Active),
            "very_active" | "very active" | "very-active" => Some(Self::VeryActive),
            _ => None,
        }
    }

    pub fn factor(self) -> f64 {
        match self {
            Self::Sedentary => SEDENTARY_FACTOR,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
            Self::VeryActive => 1.9,
        }
    }
}

/// Daily macronutrient targets in grams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macros {
    pub carbs_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutritionTargets {
    pub bmr: f64,
    pub tdee: f64,
    pub macros: Macros,
}

impl NutritionTargets {
    pub fn for_profile(profile: &UserProfile) -> Self {
        let bmr = compute_bmr(
            &profile.gender,
            profile.weight_kg,
            profile.height_cm,
            profile.age,
        );
        let tdee = compute_tdee(bmr, &profile.activity_level);
        Self {
            bmr,
            tdee,
            macros: compute_macros(tdee),
        }
    }
}

/// Basal metabolic rate in kcal/day. Only a literal `male` (any case) takes
/// the male constant; every other value takes the female one.
pub fn compute_bmr(gender: &str, weight_kg: f64, height_cm: f64, age: u32) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    if gender.eq_ignore_ascii_case("male") {
        base + 5.0
    } else {
        base - 161.0
    }
}

/// Total daily energy expenditure. Unknown activity keys count as sedentary.
pub fn compute_tdee(bmr: f64, activity_level: &str) -> f64 {
    let factor = match ActivityLevel::from_key(activity_level) {
        Some(level) => level.factor(),
        None => {
            debug!(activity_level, "unknown activity level, using sedentary factor");
            SEDENTARY_FACTOR
        }
    };
    bmr * factor
}

pub fn compute_macros(tdee: f64) -> Macros {
    Macros {
        carbs_g: tdee * CARB_SHARE / KCAL_PER_G_CARB,
        protein_g: tdee * PROTEIN_SHARE / KCAL_PER_G_PROTEIN,
        fat_g: tdee * FAT_SHARE / KCAL_PER_G_FAT,
    }
}
