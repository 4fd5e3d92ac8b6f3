use std::sync::Arc;

use tracing::{instrument, warn};

use super::client::{GenerationError, SamplingParams, TextGenerator};
use super::metabolic::NutritionTargets;
use super::prompt::{build_prompt, Vertical};
use super::sanitize::sanitize;
use crate::profile::UserProfile;

/// The two content blocks handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Plans {
    pub diet_content: String,
    pub exercise_content: String,
}

pub struct PlanOrchestrator {
    generator: Arc<dyn TextGenerator>,
    params: SamplingParams,
}

impl PlanOrchestrator {
    pub fn new(generator: Arc<dyn TextGenerator>, params: SamplingParams) -> Self {
        Self { generator, params }
    }

    /// Generates both verticals concurrently. A failing vertical turns into a
    /// placeholder and never affects the other one.
    #[instrument(skip(self, profile), fields(backend = self.generator.backend()))]
    pub async fn produce_plans(&self, profile: &UserProfile) -> Plans {
        let targets = NutritionTargets::for_profile(profile);
        let diet_prompt = build_prompt(profile, Some(&targets), Vertical::Diet);
        let exercise_prompt = build_prompt(profile, None, Vertical::Exercise);

        let (diet, exercise) = tokio::join!(
            self.generate(&diet_prompt, Vertical::Diet),
            self.generate(&exercise_prompt, Vertical::Exercise),
        );

        Plans {
            diet_content: diet,
            exercise_content: exercise,
        }
    }

    async fn generate(&self, prompt: &str, vertical: Vertical) -> String {
        match self.generator.generate(prompt, &self.params).await {
            Ok(text) => sanitize(&text, vertical),
            Err(e) => {
                warn!(%vertical, error = %e, "plan generation failed");
                placeholder(vertical, &e)
            }
        }
    }
}

/// HTML-safe notice shown in place of a plan that could not be generated.
pub fn placeholder(vertical: Vertical, err: &GenerationError) -> String {
    let title = match vertical {
        Vertical::Diet => "Diet",
        Vertical::Exercise => "Exercise",
    };
    format!(
        "<p>{} plan generation is currently unavailable. Please try again later.</p>\n<p><small>Details: {}</small></p>",
        title,
        html_escape::encode_text(&err.to_string())
    )
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedGenerator;
    use super::*;
    use crate::profile::dto::DietaryPreference;

    fn profile() -> UserProfile {
        UserProfile {
            age: 30,
            gender: "female".into(),
            weight_kg: 60.0,
            height_cm: 165.0,
            dietary_preference: DietaryPreference::Vegan,
            activity_level: "moderate".into(),
            goal: "weight_loss".into(),
        }
    }

    fn params() -> SamplingParams {
        SamplingParams {
            max_tokens: 1024,
            temperature: 0.8,
            top_p: 0.9,
            repetition_penalty: None,
        }
    }

    fn orchestrator(gen: ScriptedGenerator) -> PlanOrchestrator {
        PlanOrchestrator::new(Arc::new(gen), params())
    }

    #[tokio::test]
    async fn both_verticals_are_sanitized() {
        let plans = orchestrator(ScriptedGenerator {
            diet: Ok("Absolutely! <h3>Health Summary</h3>".into()),
            exercise: Ok("Your week: <h3>Fitness Summary</h3>".into()),
        })
        .produce_plans(&profile())
        .await;

        assert_eq!(
            plans.diet_content,
            "Based on your health profile, <h3>Health Summary</h3>"
        );
        assert_eq!(plans.exercise_content, "Your week: <h3>Fitness Summary</h3>");
    }

    #[tokio::test]
    async fn diet_failure_leaves_exercise_intact() {
        let plans = orchestrator(ScriptedGenerator {
            diet: Err(GenerationError::Upstream("model loading".into())),
            exercise: Ok("Your week starts gently.".into()),
        })
        .produce_plans(&profile())
        .await;

        assert!(plans.diet_content.contains("Diet plan generation is currently unavailable"));
        assert!(plans.diet_content.contains("model loading"));
        assert_eq!(plans.exercise_content, "Your week starts gently.");
    }

    #[tokio::test]
    async fn total_failure_still_returns_two_placeholders() {
        let plans = orchestrator(ScriptedGenerator {
            diet: Err(GenerationError::Transport {
                message: "connection refused".into(),
                status: None,
            }),
            exercise: Err(GenerationError::MalformedResponse("missing choices".into())),
        })
        .produce_plans(&profile())
        .await;

        assert!(plans.diet_content.starts_with("<p>Diet plan"));
        assert!(plans.diet_content.contains("connection refused"));
        assert!(plans.exercise_content.starts_with("<p>Exercise plan"));
        assert!(plans.exercise_content.contains("unexpected response format"));
    }

    #[test]
    fn placeholder_escapes_error_text() {
        let err = GenerationError::Upstream("<script>alert(1)</script>".into());
        let html = placeholder(Vertical::Exercise, &err);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
