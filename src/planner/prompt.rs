use std::fmt::{self, Write};

use super::metabolic::NutritionTargets;
use crate::profile::UserProfile;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MEALS: [&str; 4] = ["Breakfast", "Lunch", "Dinner", "Snacks"];

/// One of the two independent plan types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Diet,
    Exercise,
}

impl Vertical {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Diet => "diet",
            Self::Exercise => "exercise",
        }
    }
}

impl fmt::Display for Vertical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalLabel {
    WeightLoss,
    WeightGain,
}

impl GoalLabel {
    /// Exactly `weight_loss` means loss; any other value means gain.
    pub fn from_field(goal: &str) -> Self {
        if goal == "weight_loss" {
            Self::WeightLoss
        } else {
            Self::WeightGain
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WeightLoss => "Weight Loss",
            Self::WeightGain => "Weight Gain",
        }
    }
}

/// Renders the instruction sent to the generation backend.
///
/// The diet prompt needs `targets`; the exercise prompt ignores them.
pub fn build_prompt(
    profile: &UserProfile,
    targets: Option<&NutritionTargets>,
    vertical: Vertical,
) -> String {
    let goal = GoalLabel::from_field(&profile.goal);
    let mut out = String::with_capacity(2048);
    match vertical {
        Vertical::Diet => write_diet(&mut out, profile, targets, goal),
        Vertical::Exercise => write_exercise(&mut out, profile, goal),
    }
    .expect("writing to a String never fails");
    out
}

fn write_diet(
    out: &mut String,
    profile: &UserProfile,
    targets: Option<&NutritionTargets>,
    goal: GoalLabel,
) -> fmt::Result {
    writeln!(
        out,
        "Act as a professional nutritionist. Create a personalized {} diet plan for the person described below.",
        goal.as_str()
    )?;
    write_voice(out)?;
    writeln!(out)?;
    writeln!(out, "Goal: {}", goal.as_str())?;
    writeln!(out)?;
    write_profile(out, profile, true)?;

    if let Some(t) = targets {
        writeln!(out)?;
        writeln!(out, "Calculated nutritional needs:")?;
        writeln!(out, "- Basal Metabolic Rate (BMR): {:.2} kcal/day", t.bmr)?;
        writeln!(
            out,
            "- Total Daily Energy Expenditure (TDEE): {:.2} kcal/day",
            t.tdee
        )?;
        writeln!(out, "- Carbohydrates: {:.0} grams/day", t.macros.carbs_g)?;
        writeln!(out, "- Protein: {:.0} grams/day", t.macros.protein_g)?;
        writeln!(out, "- Fat: {:.0} grams/day", t.macros.fat_g)?;
        let daily = match goal {
            GoalLabel::WeightLoss => "below",
            GoalLabel::WeightGain => "above",
        };
        writeln!(
            out,
            "Set the daily calorie intake moderately {} the TDEE to support {}.",
            daily,
            goal.as_str().to_lowercase()
        )?;
    }

    if profile.dietary_preference.is_vegan() {
        writeln!(out)?;
        writeln!(
            out,
            "The person is vegan: every meal must be fully plant-based, with no meat, fish, dairy, eggs, honey or other animal products, and protein must come from plant sources."
        )?;
    }

    writeln!(out)?;
    write_format_intro(out)?;
    writeln!(out, "<h3>Health Summary</h3>")?;
    writeln!(
        out,
        "<p>Your calorie and macronutrient targets and how this plan reaches your goal.</p>"
    )?;
    writeln!(out, "<h3>Weekly Meal Plan</h3>")?;
    writeln!(out, "<ul>")?;
    for day in WEEKDAYS {
        writeln!(out, "  <li><strong>{day}</strong>")?;
        writeln!(out, "    <ul>")?;
        for meal in MEALS {
            writeln!(
                out,
                "      <li>{meal}: dish, portion size, approximate kcal</li>"
            )?;
        }
        writeln!(out, "    </ul>")?;
        writeln!(out, "  </li>")?;
    }
    writeln!(out, "</ul>")?;
    write_format_outro(out)
}

fn write_exercise(out: &mut String, profile: &UserProfile, goal: GoalLabel) -> fmt::Result {
    writeln!(
        out,
        "Act as a professional fitness trainer. Create a personalized one-week {} exercise plan for the person described below.",
        goal.as_str()
    )?;
    write_voice(out)?;
    writeln!(out)?;
    writeln!(out, "Goal: {}", goal.as_str())?;
    writeln!(out)?;
    write_profile(out, profile, false)?;
    writeln!(out)?;
    writeln!(
        out,
        "Match the intensity to the current activity level. Mix cardio, strength training and flexibility work, and include at least one rest or active-recovery day."
    )?;

    writeln!(out)?;
    write_format_intro(out)?;
    writeln!(out, "<h3>Fitness Summary</h3>")?;
    writeln!(
        out,
        "<p>Your current fitness level and how this week supports your goal.</p>"
    )?;
    writeln!(out, "<h3>Weekly Exercise Plan</h3>")?;
    writeln!(out, "<ul>")?;
    for day in WEEKDAYS {
        writeln!(out, "  <li><strong>{day}</strong>")?;
        writeln!(out, "    <ul>")?;
        writeln!(
            out,
            "      <li>Exercise: type, duration, intensity, notes</li>"
        )?;
        writeln!(out, "    </ul>")?;
        writeln!(out, "  </li>")?;
    }
    writeln!(out, "</ul>")?;
    write_format_outro(out)
}

fn write_voice(out: &mut String) -> fmt::Result {
    writeln!(
        out,
        "Address the person directly in the second person (\"you\", \"your\") and keep a professional tone. Do not open with casual greetings or exclamations such as \"Hey there\", \"Absolutely!\" or \"Great question\"."
    )
}

fn write_profile(out: &mut String, profile: &UserProfile, with_diet: bool) -> fmt::Result {
    writeln!(out, "Profile:")?;
    writeln!(out, "- Age: {} years", profile.age)?;
    writeln!(out, "- Gender: {}", capitalize(&profile.gender))?;
    writeln!(out, "- Weight: {} kg", profile.weight_kg)?;
    writeln!(out, "- Height: {} cm", profile.height_cm)?;
    if with_diet {
        let vegan = if profile.dietary_preference.is_vegan() {
            "Yes"
        } else {
            "No"
        };
        writeln!(out, "- Vegan: {vegan}")?;
    }
    writeln!(out, "- Activity level: {}", capitalize(&profile.activity_level))
}

fn write_format_intro(out: &mut String) -> fmt::Result {
    writeln!(
        out,
        "Respond with an HTML fragment only: no <html>, <head> or <body> tags, no Markdown and no code fences. Use exactly this structure and these tags:"
    )
}

fn write_format_outro(out: &mut String) -> fmt::Result {
    writeln!(
        out,
        "Fill in every day from Monday to Sunday and do not add text outside this structure."
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
