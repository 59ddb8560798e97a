pub mod drink;

pub use drink::{
    Drink, DrinkChanges, DrinkDraft, DrinkRow, DrinkUpdate, FieldErrors, Ingredient, LongDrink, NewDrink,
    RecipeInput, ShortDrink, ShortIngredient,
};
