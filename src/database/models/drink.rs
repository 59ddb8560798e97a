use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

/// Longest title accepted for a drink
pub const MAX_TITLE_LEN: usize = 80;

/// One recipe entry: an ingredient, its display color and its share of the cup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

/// A persisted drink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Public representation: recipe quantities are withheld
#[derive(Debug, Clone, Serialize)]
pub struct ShortDrink<'a> {
    pub id: i64,
    pub title: &'a str,
    pub recipe: Vec<ShortIngredient<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShortIngredient<'a> {
    pub name: &'a str,
    pub color: &'a str,
}

/// Full representation, including the parts of every ingredient
#[derive(Debug, Clone, Serialize)]
pub struct LongDrink<'a> {
    pub id: i64,
    pub title: &'a str,
    pub recipe: &'a [Ingredient],
}

impl Drink {
    pub fn short(&self) -> ShortDrink<'_> {
        ShortDrink {
            id: self.id,
            title: &self.title,
            recipe: self
                .recipe
                .iter()
                .map(|i| ShortIngredient {
                    name: &i.name,
                    color: &i.color,
                })
                .collect(),
        }
    }

    pub fn long(&self) -> LongDrink<'_> {
        LongDrink {
            id: self.id,
            title: &self.title,
            recipe: &self.recipe,
        }
    }
}

/// Row shape of the `drinks` table; the recipe is stored as JSONB
#[derive(Debug, FromRow)]
pub struct DrinkRow {
    pub id: i64,
    pub title: String,
    pub recipe: sqlx::types::Json<Vec<Ingredient>>,
}

impl From<DrinkRow> for Drink {
    fn from(row: DrinkRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            recipe: row.recipe.0,
        }
    }
}

/// Validated fields for a drink that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrinkDraft {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Validated partial update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrinkUpdate {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

/// Clients may send a single ingredient object where a list is expected
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl From<RecipeInput> for Vec<Ingredient> {
    fn from(input: RecipeInput) -> Self {
        match input {
            RecipeInput::Many(list) => list,
            RecipeInput::One(single) => vec![single],
        }
    }
}

/// POST /drinks body
#[derive(Debug, Clone, Deserialize)]
pub struct NewDrink {
    pub title: String,
    pub recipe: RecipeInput,
}

/// PATCH /drinks/:id body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrinkChanges {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

pub type FieldErrors = HashMap<String, String>;

impl NewDrink {
    pub fn validate(self) -> Result<DrinkDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = check_title(&self.title, &mut errors);
        let recipe = check_recipe(self.recipe.into(), &mut errors);

        if errors.is_empty() {
            Ok(DrinkDraft { title, recipe })
        } else {
            Err(errors)
        }
    }
}

impl DrinkChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.recipe.is_none()
    }

    pub fn validate(self) -> Result<DrinkUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = self.title.map(|t| check_title(&t, &mut errors));
        let recipe = self.recipe.map(|r| check_recipe(r.into(), &mut errors));

        if errors.is_empty() {
            Ok(DrinkUpdate { title, recipe })
        } else {
            Err(errors)
        }
    }
}

fn check_title(title: &str, errors: &mut FieldErrors) -> String {
    let title = title.trim();
    if title.is_empty() {
        errors.insert("title".into(), "Title must not be empty".into());
    } else if title.chars().count() > MAX_TITLE_LEN {
        errors.insert(
            "title".into(),
            format!("Title must be at most {} characters", MAX_TITLE_LEN),
        );
    }
    title.to_string()
}

fn check_recipe(recipe: Vec<Ingredient>, errors: &mut FieldErrors) -> Vec<Ingredient> {
    if recipe.is_empty() {
        errors.insert("recipe".into(), "Recipe needs at least one ingredient".into());
    }
    for (idx, ingredient) in recipe.iter().enumerate() {
        if ingredient.name.trim().is_empty() {
            errors.insert(format!("recipe[{}].name", idx), "Ingredient name must not be empty".into());
        }
        if ingredient.color.trim().is_empty() {
            errors.insert(format!("recipe[{}].color", idx), "Ingredient color must not be empty".into());
        }
        if ingredient.parts == 0 {
            errors.insert(format!("recipe[{}].parts", idx), "Parts must be at least 1".into());
        }
    }
    recipe
}
