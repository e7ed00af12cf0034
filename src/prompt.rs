//! Prompt rendering for the text and image generation stages.

use serde::{Deserialize, Serialize};

/// Label the recipe generator is asked to put in front of the recipe's name.
pub const RECIPE_NAME_PREFIX: &str = "Recipe Name:";

/// The animal the recipe is written for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectInfo {
    pub breed: String,
    pub age: u32,
}

impl SubjectInfo {
    pub fn new(breed: impl Into<String>, age: u32) -> Self {
        Self {
            breed: breed.into(),
            age,
        }
    }
}

impl Default for SubjectInfo {
    fn default() -> Self {
        Self::new("Golden Retriever", 2)
    }
}

pub fn build_recipe_prompt(ingredients: &[String], subject: &SubjectInfo) -> String {
    let ingredients_text = ingredients.join(", ");

    format!(
        "Given these ingredients: {ingredients_text},\n\
         create a healthy pet food recipe for a {age} year old {breed}.\n\
         Include approximate vitamin and mineral content. Format the response as:\n\
         \n\
         {RECIPE_NAME_PREFIX}\n\
         Ingredients:\n\
         Instructions:\n\
         Nutritional Analysis:\n",
        age = subject.age,
        breed = subject.breed,
    )
}

pub fn build_image_prompt(recipe_title: &str) -> String {
    format!(
        "A appetizing bowl of {recipe_title} pet food, professional food photography style"
    )
}

/// Derives the recipe's name from the first line of the generated document.
///
/// A first line without the expected label is used verbatim (trimmed).
pub fn extract_recipe_title(recipe: &str) -> String {
    let first_line = recipe.split('\n').next().unwrap_or_default();
    first_line.replace(RECIPE_NAME_PREFIX, "").trim().to_string()
}
